//! libcurl-backed transport (one Easy handle per request).

use std::time::Duration;

use super::classify::classify_curl_error;
use super::transport::{RawResponse, Transport, TransportError};
use crate::config::HarvestConfig;
use crate::identity::{Identity, ProxyEndpoint};

/// Blocking GET via libcurl. Follows redirects.
#[derive(Debug, Clone, Copy)]
pub struct CurlTransport {
    pub connect_timeout: Duration,
    pub max_redirections: u32,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            max_redirections: 10,
        }
    }
}

impl CurlTransport {
    pub fn from_config(cfg: &HarvestConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.fetch.connect_timeout_secs.max(1)),
            ..Self::default()
        }
    }

    fn perform(
        &self,
        url: &str,
        identity: &Identity,
        proxy: Option<&ProxyEndpoint>,
        timeout: Duration,
    ) -> Result<RawResponse, curl::Error> {
        let mut body = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.max_redirections)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(timeout)?;
        // Let libcurl decode gzip/deflate bodies.
        easy.accept_encoding("")?;
        if let Some(p) = proxy {
            easy.proxy(p.as_str())?;
        }

        let mut list = curl::easy::List::new();
        for (k, v) in identity.headers() {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        if !identity.headers().is_empty() {
            easy.http_headers(list)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        Ok(RawResponse { status, body })
    }
}

impl Transport for CurlTransport {
    fn get(
        &self,
        url: &str,
        identity: &Identity,
        proxy: Option<&ProxyEndpoint>,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        self.perform(url, identity, proxy, timeout)
            .map_err(|e| TransportError::new(classify_curl_error(&e), e))
    }
}
