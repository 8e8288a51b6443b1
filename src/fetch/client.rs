//! Authenticated HTTP GET with manual redirect following.
//!
//! The underlying reqwest client never follows redirects on its own: a
//! redirect followed by the client would be issued without the Basic
//! credentials, and the service answers some redirects with an HTML body
//! instead of a `Location` header. Both cases are handled here, one hop at a
//! time, with the credentials attached to every request.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::header::LOCATION;
use reqwest::{Client, Response, redirect};
use tracing::{debug, instrument, warn};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, DEFAULT_MAX_REDIRECTS, READ_TIMEOUT_SECS};
use super::error::FetchError;
use crate::session::Credentials;
use crate::user_agent;

/// First anchor in a redirect body, used when `Location` is missing.
#[allow(clippy::expect_used)]
static ANCHOR_HREF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a href="([^>]+)">"#).expect("anchor regex is valid") // Static pattern, safe to panic
});

/// Network settings for [`AuthenticatedFetcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub read_timeout_secs: u64,
    /// Skip TLS certificate validation. Off unless explicitly requested.
    pub accept_invalid_certs: bool,
    /// Maximum redirect hops followed for a single fetch.
    pub max_redirects: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
            accept_invalid_certs: false,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

/// HTTP client that authenticates every request, including redirect hops.
///
/// Created once per export and reused for every listing, detail and file
/// request so connections are pooled.
#[derive(Debug, Clone)]
pub struct AuthenticatedFetcher {
    client: Client,
    credentials: Credentials,
    max_redirects: usize,
}

impl AuthenticatedFetcher {
    /// Builds a fetcher with the given credentials and network settings.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the HTTP client cannot be
    /// constructed (for example, no TLS backend is available).
    pub fn new(credentials: Credentials, options: FetchOptions) -> Result<Self, FetchError> {
        if options.accept_invalid_certs {
            warn!("TLS certificate validation is disabled");
        }
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(options.connect_timeout_secs))
            .timeout(Duration::from_secs(options.read_timeout_secs))
            .redirect(redirect::Policy::none())
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .gzip(true)
            .user_agent(user_agent::default_export_user_agent())
            .build()
            .map_err(|source| FetchError::ClientBuild { source })?;

        Ok(Self {
            client,
            credentials,
            max_redirects: options.max_redirects,
        })
    }

    /// Fetches `url`, following redirects until a non-redirect response.
    ///
    /// The final response is returned as-is: non-success statuses are not
    /// turned into errors here and the content type is not inspected.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if:
    /// - `url` or a redirect target cannot be parsed
    /// - a request fails (network, TLS, timeout)
    /// - a redirect has neither a `Location` header nor an anchor in its body
    /// - more than the configured number of redirects are encountered
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<Response, FetchError> {
        let mut current = Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;
        let mut hops = 0usize;

        loop {
            let response = self.send(&current).await?;
            let status = response.status();
            if !status.is_redirection() {
                debug!(status = status.as_u16(), hops, "final response");
                return Ok(response);
            }

            if hops >= self.max_redirects {
                return Err(FetchError::too_many_redirects(url, self.max_redirects));
            }
            hops += 1;

            let next = redirect_target(&current, response).await?;
            debug!(from = %current, to = %next, hop = hops, "following redirect");
            current = next;
        }
    }

    async fn send(&self, url: &Url) -> Result<Response, FetchError> {
        self.client
            .get(url.clone())
            .basic_auth(self.credentials.username(), Some(self.credentials.password()))
            .send()
            .await
            .map_err(|e| FetchError::network(url.as_str(), e))
    }
}

/// Resolves the next hop of a redirect response.
///
/// `Location` wins; otherwise the first `<a href="...">` of the body is used.
/// Relative targets are resolved against the URL that produced the redirect.
async fn redirect_target(current: &Url, response: Response) -> Result<Url, FetchError> {
    let status = response.status().as_u16();
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string);

    let raw_target = match location {
        Some(location) => location,
        None => {
            let body = response
                .text()
                .await
                .map_err(|e| FetchError::network(current.as_str(), e))?;
            anchor_href(&body)
                .ok_or_else(|| FetchError::malformed_redirect(current.as_str(), status))?
        }
    };

    current
        .join(&raw_target)
        .map_err(|_| FetchError::invalid_url(raw_target))
}

/// Returns the `href` of the first anchor tag in `body`, if any.
fn anchor_href(body: &str) -> Option<String> {
    ANCHOR_HREF_PATTERN
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
