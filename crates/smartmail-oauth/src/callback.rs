//! Authorization callback parameters.
//!
//! When the provider (or the backend acting on its behalf) sends the browser
//! back, the outcome travels in the query string of the page address:
//! `?code=...&state=...` on success or `?error=...` on failure
//! (RFC 6749 section 4.1.2).

use std::fmt;

use url::Url;

/// Query keys that belong to the authorization response.
///
/// These are removed from the page address once the callback is consumed.
/// `scope`, `authuser`, `prompt` and `hd` are extra keys Google appends.
pub const CALLBACK_KEYS: &[&str] = &[
    "code",
    "state",
    "error",
    "error_description",
    "error_uri",
    "iss",
    "scope",
    "authuser",
    "prompt",
    "hd",
];

/// Authorization response parameters found in a page address.
///
/// Empty values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    /// Authorization code.
    pub code: Option<String>,
    /// Opaque state echoed back by the provider.
    pub state: Option<String>,
    /// Error code (e.g., `access_denied`).
    pub error: Option<String>,
    /// Human-readable error description.
    pub error_description: Option<String>,
    /// Link to a page describing the error.
    pub error_uri: Option<String>,
}

impl CallbackParams {
    /// Collects callback parameters from decoded query pairs.
    ///
    /// The first occurrence of a key wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();

        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "code" => &mut params.code,
                "state" => &mut params.state,
                "error" => &mut params.error,
                "error_description" => &mut params.error_description,
                "error_uri" => &mut params.error_uri,
                _ => continue,
            };

            if slot.is_none() {
                let value = value.into();
                if !value.is_empty() {
                    *slot = Some(value);
                }
            }
        }

        params
    }

    /// Collects callback parameters from the query string of a URL.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        Self::from_pairs(url.query_pairs())
    }

    /// Returns true if neither a code nor an error is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.code.is_none() && self.error.is_none()
    }

    /// Interprets the parameters.
    ///
    /// A code takes precedence over an error when both are present.
    #[must_use]
    pub fn outcome(&self) -> CallbackOutcome {
        if let Some(code) = &self.code {
            return CallbackOutcome::Code {
                code: code.clone(),
                state: self.state.clone(),
            };
        }

        if let Some(error) = &self.error {
            return CallbackOutcome::Error(AuthorizationError {
                code: ErrorCode::from(error.as_str()),
                description: self.error_description.clone(),
                uri: self.error_uri.clone(),
            });
        }

        CallbackOutcome::None
    }
}

/// What a page address says about a pending authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// No authorization response in the address.
    None,
    /// The provider granted a code.
    Code {
        /// Authorization code.
        code: String,
        /// Echoed state, if any.
        state: Option<String>,
    },
    /// The provider refused or failed.
    Error(AuthorizationError),
}

/// Error returned by the provider in the redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationError {
    /// Error code.
    pub code: ErrorCode,
    /// Optional description.
    pub description: Option<String>,
    /// Optional documentation link.
    pub uri: Option<String>,
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code.as_str())
    }
}

impl std::error::Error for AuthorizationError {}

/// Authorization error codes (RFC 6749 section 4.1.2.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed request.
    InvalidRequest,
    /// Client not allowed to use this flow.
    UnauthorizedClient,
    /// The user or the server denied the request.
    AccessDenied,
    /// Response type not supported.
    UnsupportedResponseType,
    /// Requested scope is invalid.
    InvalidScope,
    /// Provider failed internally.
    ServerError,
    /// Provider is overloaded or in maintenance.
    TemporarilyUnavailable,
    /// Any other code, kept verbatim.
    Other(String),
}

impl ErrorCode {
    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::AccessDenied => "access_denied",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::InvalidScope => "invalid_scope",
            Self::ServerError => "server_error",
            Self::TemporarilyUnavailable => "temporarily_unavailable",
            Self::Other(code) => code,
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "invalid_request" => Self::InvalidRequest,
            "unauthorized_client" => Self::UnauthorizedClient,
            "access_denied" => Self::AccessDenied,
            "unsupported_response_type" => Self::UnsupportedResponseType,
            "invalid_scope" => Self::InvalidScope,
            "server_error" => Self::ServerError,
            "temporarily_unavailable" => Self::TemporarilyUnavailable,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drops callback keys from decoded query pairs, keeping everything else in order.
pub fn retain_non_callback<I, K, V>(pairs: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .filter(|(key, _)| !CALLBACK_KEYS.contains(&key.as_str()))
        .collect()
}

/// Removes callback keys from the query string of `url` in place.
///
/// The query is dropped entirely when nothing else remains. Path and fragment
/// are left untouched.
pub fn strip_callback_params(url: &mut Url) {
    let retained = retain_non_callback(url.query_pairs());

    if retained.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut()
            .clear()
            .extend_pairs(retained.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
}
