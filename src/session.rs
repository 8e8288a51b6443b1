//! Run-wide, read-only session values.

use std::fmt;

use crate::fetch::DEFAULT_ADMIN_USER;

/// HTTP Basic credentials sent on every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials for the given account.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates credentials for the default administrative account.
    pub fn admin(password: impl Into<String>) -> Self {
        Self::new(DEFAULT_ADMIN_USER, password)
    }

    /// Returns the account name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

// Password stays out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Immutable description of one export run.
///
/// Constructed once at startup and only ever borrowed afterwards.
#[derive(Debug, Clone)]
pub struct Session {
    base_url: String,
    user_id: String,
    credentials: Credentials,
}

impl Session {
    /// Creates a session. Trailing slashes on `base_url` are dropped so that
    /// endpoint paths can be appended verbatim.
    pub fn new(
        base_url: impl Into<String>,
        user_id: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            user_id: user_id.into(),
            credentials,
        }
    }

    /// Service root, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The library owner being exported.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Credentials applied to every request.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_trims_trailing_slash() {
        let session = Session::new("https://example.edu///", "alice", Credentials::admin("pw"));
        assert_eq!(session.base_url(), "https://example.edu");
        assert_eq!(session.user_id(), "alice");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::admin("hunter2");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("hunter2"), "password leaked: {rendered}");
        assert!(rendered.contains("admin"));
    }
}
