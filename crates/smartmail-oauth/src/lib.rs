//! # smartmail-oauth
//!
//! Client side of the `OAuth2` authorization-code redirect.
//!
//! The backend owns the actual flow: it builds the provider's consent URL and
//! exchanges the returned code for credentials. What is left for the client is
//! the part that happens in the page address:
//!
//! - **Authorization redirect**: validate the URL handed out by the backend
//!   before leaving the page ([`AuthorizationRedirect`]).
//! - **Callback parameters**: recognise `code`/`error` when the provider sends
//!   the browser back ([`CallbackParams`], [`CallbackOutcome`]).
//! - **Address cleanup**: drop those parameters so a reload does not process
//!   them twice ([`strip_callback_params`]).
//!
//! ## Quick Start
//!
//! ```
//! use smartmail_oauth::{CallbackOutcome, CallbackParams, strip_callback_params};
//! use url::Url;
//!
//! let mut location = Url::parse("http://localhost:5173/?code=ABC&state=xyz").unwrap();
//! let params = CallbackParams::from_url(&location);
//!
//! assert!(matches!(params.outcome(), CallbackOutcome::Code { .. }));
//!
//! strip_callback_params(&mut location);
//! assert_eq!(location.as_str(), "http://localhost:5173/");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod callback;
mod error;
pub mod redirect;

pub use callback::{
    AuthorizationError, CALLBACK_KEYS, CallbackOutcome, CallbackParams, ErrorCode,
    retain_non_callback, strip_callback_params,
};
pub use error::{Error, Result};
pub use redirect::AuthorizationRedirect;
