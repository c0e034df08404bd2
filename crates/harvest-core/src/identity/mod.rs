//! Rotating request identities and proxies.
//!
//! Identities (user-agent header sets) and proxies are two independent cyclic
//! sequences. Assignment is a pure function of a request's position in its
//! batch, so concurrent workers never share iterator state.

mod load;
mod pool;

pub use load::{load_proxies, load_user_agents, parse_proxy_line};
pub use pool::{IdentityCursor, IdentityPool};

use serde::{Deserialize, Serialize};

/// Error raised while building an identity pool.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// No usable identities were loaded; no request can be issued.
    #[error("identity pool is empty: {0}")]
    Exhausted(String),
    #[error("read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// An immutable request header set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    headers: Vec<(String, String)>,
}

impl Identity {
    pub fn from_user_agent(user_agent: &str) -> Self {
        Self {
            headers: vec![("User-Agent".to_string(), user_agent.trim().to_string())],
        }
    }

    pub fn with_headers(headers: Vec<(String, String)>) -> Self {
        Self { headers }
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Value of the `User-Agent` header, if present.
    pub fn user_agent(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("user-agent"))
            .map(|(_, v)| v.as_str())
    }
}

/// A network egress point, as a proxy URL understood by the transport
/// (e.g. `http://10.0.0.1:3128`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProxyEndpoint(String);

impl ProxyEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
