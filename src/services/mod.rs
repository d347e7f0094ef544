//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence concerns so route
//! handlers can stay focused on protocol translation and auth plumbing.

pub mod auth;
pub mod catalog;
pub mod chat_session;
pub mod chat_store;
pub mod insight;
pub mod reading_time;
