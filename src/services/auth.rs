//! Admin role configuration.
//!
//! Identity itself is established upstream; this service only decides which
//! verified emails carry the admin role.

/// Admin email allow-list loaded from environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminConfig {
    emails: Vec<String>,
}

impl AdminConfig {
    /// Load from `ADMIN_EMAILS` (comma-separated). Unset means no admins.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var("ADMIN_EMAILS")
            .map(|raw| Self::from_list(&raw))
            .unwrap_or_default()
    }

    /// Parse a comma-separated list, ignoring blanks and case.
    #[must_use]
    pub fn from_list(raw: &str) -> Self {
        let emails = raw
            .split(',')
            .map(|e| e.trim().to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { emails }
    }

    #[must_use]
    pub fn is_admin(&self, email: &str) -> bool {
        let email = email.trim().to_ascii_lowercase();
        self.emails.iter().any(|e| *e == email)
    }

    #[must_use]
    pub fn admin_count(&self) -> usize {
        self.emails.len()
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
