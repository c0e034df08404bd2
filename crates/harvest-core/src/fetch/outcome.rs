use serde::{Deserialize, Serialize};

/// Kind of a network-level failure. Kept for observability; retries treat all kinds alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkErrorKind {
    /// Could not connect (refused, DNS, proxy unreachable, reset mid-transfer).
    Connect,
    /// Connect or transfer timed out.
    Timeout,
    /// Any other request-layer error.
    Other,
}

/// Why a request never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkCause {
    pub kind: NetworkErrorKind,
    pub message: String,
}

impl std::fmt::Display for NetworkCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Result of one attempt at one target. Produced exactly once per (target, attempt).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 200 response with its body.
    Success { body: Vec<u8>, status: u32 },
    /// Response with any other status.
    HttpFailure { status: u32 },
    /// No response: connection error, timeout or other request-layer error.
    NetworkFailure(NetworkCause),
    /// The request was never attempted (e.g. the worker died before reaching it).
    Skipped { reason: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// Payload of a successful fetch.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Outcome::Success { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Status code, if a response was received.
    pub fn status(&self) -> Option<u32> {
        match self {
            Outcome::Success { status, .. } | Outcome::HttpFailure { status } => Some(*status),
            _ => None,
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Outcome::Skipped {
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Success { body, status } => write!(f, "HTTP {} ({} bytes)", status, body.len()),
            Outcome::HttpFailure { status } => write!(f, "HTTP {}", status),
            Outcome::NetworkFailure(cause) => write!(f, "network failure ({})", cause),
            Outcome::Skipped { reason } => write!(f, "skipped ({})", reason),
        }
    }
}
