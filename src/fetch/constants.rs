//! Constants for the fetch module (timeouts, redirect cap, credentials).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Maximum redirect hops followed before giving up.
pub const DEFAULT_MAX_REDIRECTS: usize = 20;

/// Administrative account used for HTTP Basic authentication.
pub const DEFAULT_ADMIN_USER: &str = "admin";
