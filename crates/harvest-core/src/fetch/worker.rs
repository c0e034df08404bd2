//! Outcome classification and politeness delays around a transport.

use std::time::Duration;

use super::outcome::Outcome;
use super::transport::Transport;
use crate::config::HarvestConfig;
use crate::identity::{Identity, ProxyEndpoint};
use crate::target::Target;

/// Timing knobs for the fetch worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Pause after a 200.
    pub success_delay: Duration,
    /// Pause after a non-200 status or a network failure.
    pub failure_delay: Duration,
    /// Whole-request timeout handed to the transport.
    pub timeout: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            success_delay: Duration::from_millis(500),
            failure_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(60),
        }
    }
}

impl FetchPolicy {
    pub fn from_config(cfg: &HarvestConfig) -> Self {
        Self {
            success_delay: cfg.success_delay(),
            failure_delay: cfg.failure_delay(),
            timeout: Duration::from_secs(cfg.fetch.timeout_secs.max(1)),
        }
    }

    /// No pauses at all; for tests and local servers.
    pub fn immediate() -> Self {
        Self {
            success_delay: Duration::ZERO,
            failure_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Pause to apply after producing `outcome`.
    pub fn delay_for(&self, outcome: &Outcome) -> Duration {
        match outcome {
            Outcome::Success { .. } => self.success_delay,
            Outcome::HttpFailure { .. } | Outcome::NetworkFailure(_) => self.failure_delay,
            Outcome::Skipped { .. } => Duration::ZERO,
        }
    }
}

/// Performs one GET per call and classifies the result.
pub struct FetchWorker<T> {
    transport: T,
    policy: FetchPolicy,
}

impl<T: Transport> FetchWorker<T> {
    pub fn new(transport: T, policy: FetchPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch `target` with the given identity and proxy, then sleep the delay for the outcome.
    pub fn fetch(
        &self,
        target: &Target,
        identity: &Identity,
        proxy: Option<&ProxyEndpoint>,
    ) -> Outcome {
        let outcome = match self
            .transport
            .get(target.url(), identity, proxy, self.policy.timeout)
        {
            Ok(resp) if resp.status == 200 => Outcome::Success {
                body: resp.body,
                status: resp.status,
            },
            Ok(resp) => {
                tracing::debug!(url = target.url(), status = resp.status, "request failed");
                Outcome::HttpFailure {
                    status: resp.status,
                }
            }
            Err(e) => {
                tracing::debug!(url = target.url(), error = %e, "request error");
                Outcome::NetworkFailure(e.into_cause())
            }
        };

        let delay = self.policy.delay_for(&outcome);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{NetworkErrorKind, RawResponse, TransportError};
    use crate::target::KeyRule;
    use std::sync::Mutex;
    use std::time::Instant;

    /// Replays a fixed response and records the identity/proxy it was called with.
    struct Scripted {
        reply: fn() -> Result<RawResponse, TransportError>,
        seen: Mutex<Vec<(String, Option<String>)>>,
    }

    impl Transport for Scripted {
        fn get(
            &self,
            _url: &str,
            identity: &Identity,
            proxy: Option<&ProxyEndpoint>,
            _timeout: Duration,
        ) -> Result<RawResponse, TransportError> {
            self.seen.lock().unwrap().push((
                identity.user_agent().unwrap_or_default().to_string(),
                proxy.map(|p| p.to_string()),
            ));
            (self.reply)()
        }
    }

    fn target() -> Target {
        Target::new("https://example.com/download/1/x.txt", &KeyRule::after("/download/"))
            .unwrap()
    }

    fn worker(reply: fn() -> Result<RawResponse, TransportError>) -> FetchWorker<Scripted> {
        FetchWorker::new(
            Scripted {
                reply,
                seen: Mutex::new(Vec::new()),
            },
            FetchPolicy::immediate(),
        )
    }

    #[test]
    fn status_200_is_success_with_body() {
        let w = worker(|| {
            Ok(RawResponse {
                status: 200,
                body: b"hello".to_vec(),
            })
        });
        let out = w.fetch(&target(), &Identity::from_user_agent("A"), None);
        assert_eq!(out.body(), Some(&b"hello"[..]));
        assert_eq!(out.status(), Some(200));
    }

    #[test]
    fn other_status_is_http_failure() {
        let w = worker(|| {
            Ok(RawResponse {
                status: 503,
                body: Vec::new(),
            })
        });
        let out = w.fetch(&target(), &Identity::from_user_agent("A"), None);
        assert_eq!(out, Outcome::HttpFailure { status: 503 });
        // 2xx other than 200 is still a failure.
        let w = worker(|| {
            Ok(RawResponse {
                status: 204,
                body: Vec::new(),
            })
        });
        assert!(!w.fetch(&target(), &Identity::from_user_agent("A"), None).is_success());
    }

    #[test]
    fn transport_error_keeps_kind() {
        let w = worker(|| Err(TransportError::new(NetworkErrorKind::Timeout, "timed out")));
        match w.fetch(&target(), &Identity::from_user_agent("A"), None) {
            Outcome::NetworkFailure(cause) => {
                assert_eq!(cause.kind, NetworkErrorKind::Timeout);
                assert!(cause.message.contains("timed out"));
            }
            other => panic!("expected network failure, got {:?}", other),
        }
    }

    #[test]
    fn identity_and_proxy_reach_transport() {
        let w = worker(|| {
            Ok(RawResponse {
                status: 200,
                body: Vec::new(),
            })
        });
        let proxy = ProxyEndpoint::new("http://10.0.0.1:8080");
        w.fetch(&target(), &Identity::from_user_agent("Agent/1"), Some(&proxy));
        let seen = w.transport.seen.lock().unwrap();
        assert_eq!(
            seen[0],
            ("Agent/1".to_string(), Some("http://10.0.0.1:8080".to_string()))
        );
    }

    #[test]
    fn delay_differs_by_outcome() {
        let p = FetchPolicy::default();
        assert_eq!(
            p.delay_for(&Outcome::Success {
                body: Vec::new(),
                status: 200
            }),
            Duration::from_millis(500)
        );
        assert_eq!(p.delay_for(&Outcome::HttpFailure { status: 429 }), Duration::from_secs(1));
        assert_eq!(p.delay_for(&Outcome::skipped("x")), Duration::ZERO);
    }

    #[test]
    fn failure_delay_is_slept_inside_fetch() {
        let mut w = worker(|| {
            Ok(RawResponse {
                status: 500,
                body: Vec::new(),
            })
        });
        w.policy.failure_delay = Duration::from_millis(30);
        let start = Instant::now();
        w.fetch(&target(), &Identity::from_user_agent("A"), None);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
