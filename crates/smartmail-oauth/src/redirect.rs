//! Authorization redirect validation.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// A consent URL the browser can be sent to.
///
/// The backend builds this URL (client id, scopes, redirect URI, state) and
/// the client only performs a full top-level redirect to it. It must be an
/// absolute `http`/`https` URL with a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuthorizationRedirect {
    url: Url,
}

impl AuthorizationRedirect {
    /// Parses and validates an authorization URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed, is not `http`/`https`
    /// or has no host.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_redirect("empty URL"));
        }

        let url = Url::parse(trimmed)?;
        Self::try_from(url)
    }

    /// Returns the URL to navigate to.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the `state` parameter if the backend attached one.
    #[must_use]
    pub fn state(&self) -> Option<String> {
        self.query_value("state")
    }

    /// Returns the `redirect_uri` the provider will send the browser back to.
    #[must_use]
    pub fn redirect_uri(&self) -> Option<String> {
        self.query_value("redirect_uri")
    }

    /// Returns the provider host (e.g., `accounts.google.com`).
    #[must_use]
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    fn query_value(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

impl TryFrom<Url> for AuthorizationRedirect {
    type Error = Error;

    fn try_from(url: Url) -> Result<Self> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_redirect(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(Error::invalid_redirect("missing host"));
        }

        Ok(Self { url })
    }
}

impl TryFrom<String> for AuthorizationRedirect {
    type Error = Error;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(&raw)
    }
}

impl From<AuthorizationRedirect> for String {
    fn from(redirect: AuthorizationRedirect) -> Self {
        redirect.url.into()
    }
}

impl std::fmt::Display for AuthorizationRedirect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.url, f)
    }
}
