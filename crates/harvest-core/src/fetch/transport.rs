//! Transport seam: the raw HTTP GET the worker wraps.

use std::time::Duration;

use super::outcome::{NetworkCause, NetworkErrorKind};
use crate::identity::{Identity, ProxyEndpoint};

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

/// Request-layer failure (no HTTP response was received).
#[derive(Debug)]
pub struct TransportError {
    pub kind: NetworkErrorKind,
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl TransportError {
    pub fn new<E>(kind: NetworkErrorKind, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self {
            kind,
            source: source.into(),
        }
    }

    pub fn into_cause(self) -> NetworkCause {
        NetworkCause {
            kind: self.kind,
            message: self.source.to_string(),
        }
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.source)
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Issues one blocking GET. Implementations must be shareable across worker threads.
pub trait Transport: Send + Sync {
    fn get(
        &self,
        url: &str,
        identity: &Identity,
        proxy: Option<&ProxyEndpoint>,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn get(
        &self,
        url: &str,
        identity: &Identity,
        proxy: Option<&ProxyEndpoint>,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        (**self).get(url, identity, proxy, timeout)
    }
}
