//! Immutable client configuration.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use corpora_core::{Error, Result};
use reqwest::Url;

/// How the client authenticates.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A bearer token used as-is for every request.
    Token(String),
    /// Email and password exchanged once for a bearer token via `POST login`.
    Login {
        /// Account email
        email: String,
        /// Account password
        password: String,
    },
}

impl Credentials {
    /// Picks credentials from optional sources. A token wins over a login.
    ///
    /// Blank values count as absent.
    pub fn resolve(
        token: Option<String>,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<Self> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        match (present(token), present(email), present(password)) {
            (Some(token), _, _) => Ok(Credentials::Token(token.trim().to_string())),
            (None, Some(email), Some(password)) => Ok(Credentials::Login { email, password }),
            (None, Some(_), None) => Err(Error::config("an email was given without a password")),
            (None, None, Some(_)) => Err(Error::config("a password was given without an email")),
            (None, None, None) => Err(Error::config(
                "no credentials: provide a bearer token or an email and password",
            )),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(***)"),
            Credentials::Login { email, .. } => f
                .debug_struct("Login")
                .field("email", email)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// Connection settings for [`HttpSearchService`](crate::HttpSearchService).
///
/// Built once per run and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    credentials: Credentials,
    accept_invalid_certs: bool,
    request_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Parses the base URL and pairs it with credentials.
    ///
    /// The URL must be `http` or `https`. A trailing `/` is implied so the
    /// `api/` prefix joins under any path the URL already carries.
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(Error::config("the base URL is empty"));
        }

        let normalized = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| Error::config(format!("invalid base URL '{trimmed}': {e}")))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "base URL must use http or https, got '{}'",
                base_url.scheme()
            )));
        }
        if base_url.host_str().is_none() {
            return Err(Error::config(format!("base URL '{trimmed}' has no host")));
        }

        Ok(Self {
            base_url,
            credentials,
            accept_invalid_certs: false,
            request_timeout: None,
        })
    }

    /// Skips TLS certificate validation. Only loopback hosts may do this.
    pub fn with_insecure(mut self, insecure: bool) -> Result<Self> {
        if insecure && !self.is_loopback() {
            return Err(Error::config(format!(
                "certificate validation can only be disabled for loopback hosts, not '{}'",
                self.base_url.host_str().unwrap_or_default()
            )));
        }
        self.accept_invalid_certs = insecure;
        Ok(self)
    }

    /// Bounds every request except the streamed load.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// The normalized base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The configured credentials.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Whether certificate validation is skipped.
    pub fn accept_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }

    /// Per-request timeout, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    /// Whether the base URL points at this machine.
    pub fn is_loopback(&self) -> bool {
        match self.base_url.host_str() {
            Some(host) if host.eq_ignore_ascii_case("localhost") => true,
            Some(host) => host
                .trim_start_matches('[')
                .trim_end_matches(']')
                .parse::<IpAddr>()
                .is_ok_and(|ip| ip.is_loopback()),
            None => false,
        }
    }

    /// Builds `{base}/api/{endpoint}[/{dataset}]`, escaping each segment.
    pub fn api_url(&self, endpoint: &str, dataset: Option<&str>) -> Result<Url> {
        let mut url = self
            .base_url
            .join("api/")
            .map_err(|e| Error::config(format!("invalid base URL: {e}")))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Error::config("base URL cannot carry a path"))?;
            segments.pop_if_empty().push(endpoint);
            if let Some(dataset) = dataset {
                segments.push(dataset);
            }
        }
        Ok(url)
    }
}
