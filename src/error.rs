//! Stable error codes shared by service and route error types.
//!
//! Service errors carry a machine-readable code and a retryable hint so the
//! route layer and structured logs can report failures uniformly without
//! matching on every variant.

pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
