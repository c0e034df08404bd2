//! Fetch worker: one GET against one URL with one identity/proxy pair.
//!
//! The raw exchange goes through a `Transport` (libcurl in production). The
//! worker classifies the result into an `Outcome` and then sleeps a polite
//! delay, shorter after a 200 than after a failure, inside its own unit of
//! work so the pause throttles that worker only.

mod classify;
mod curl_transport;
mod outcome;
mod transport;
mod worker;

pub use classify::classify_curl_error;
pub use curl_transport::CurlTransport;
pub use outcome::{NetworkCause, NetworkErrorKind, Outcome};
pub use transport::{RawResponse, Transport, TransportError};
pub use worker::{FetchPolicy, FetchWorker};
