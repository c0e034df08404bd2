//! Bounded worker pool over one batch of targets.

use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::Mutex;

use super::progress::BatchProgress;
use crate::fetch::{FetchWorker, Outcome, Transport};
use crate::identity::IdentityPool;
use crate::target::Target;

/// Fetch every target in `targets` with at most `pool_size` requests in flight.
///
/// Returns one `(target, outcome)` per input, in input order. Targets whose
/// worker could not run them (thread spawn failure, worker panic) come back as
/// `Outcome::Skipped`.
pub fn run_batch<T: Transport>(
    targets: &[Target],
    identities: &IdentityPool,
    worker: &FetchWorker<T>,
    pool_size: usize,
    progress: Option<&BatchProgress>,
) -> Vec<(Target, Outcome)> {
    let count = targets.len();
    let mut outcomes: Vec<Option<Outcome>> = vec![None; count];
    if count == 0 {
        return Vec::new();
    }

    let work: Mutex<VecDeque<usize>> = Mutex::new((0..count).collect());
    let (tx, rx) = mpsc::channel::<(usize, Outcome)>();
    let num_workers = pool_size.max(1).min(count);

    std::thread::scope(|s| {
        let mut handles = Vec::with_capacity(num_workers);
        for n in 0..num_workers {
            let work = &work;
            let tx = tx.clone();
            let spawned = std::thread::Builder::new()
                .name(format!("fetch-{}", n))
                .spawn_scoped(s, move || loop {
                    let next = work.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
                    let Some(index) = next else {
                        break;
                    };
                    let target = &targets[index];
                    let outcome = worker.fetch(
                        target,
                        identities.identity_at(index),
                        identities.proxy_at(index),
                    );
                    if let Some(p) = progress {
                        p.record(outcome.is_success());
                    }
                    if tx.send((index, outcome)).is_err() {
                        break;
                    }
                });
            match spawned {
                Ok(h) => handles.push(h),
                Err(e) => tracing::warn!("could not spawn fetch worker {}: {}", n, e),
            }
        }
        drop(tx);

        for (index, outcome) in rx.iter() {
            outcomes[index] = Some(outcome);
        }
        for h in handles {
            if h.join().is_err() {
                tracing::warn!("fetch worker panicked; its unfinished targets are skipped");
            }
        }
    });

    targets
        .iter()
        .cloned()
        .zip(outcomes)
        .map(|(target, outcome)| {
            let outcome = outcome.unwrap_or_else(|| {
                if let Some(p) = progress {
                    p.record(false);
                }
                Outcome::skipped("no worker reached this target")
            });
            (target, outcome)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchPolicy, RawResponse, TransportError};
    use crate::identity::{Identity, ProxyEndpoint};
    use crate::target::KeyRule;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    /// Echoes the user agent and proxy into the body; records calls per URL.
    #[derive(Default)]
    struct Echo {
        calls: StdMutex<Vec<String>>,
        panic_on: Option<String>,
    }

    impl Transport for Echo {
        fn get(
            &self,
            url: &str,
            identity: &Identity,
            proxy: Option<&ProxyEndpoint>,
            _timeout: Duration,
        ) -> Result<RawResponse, TransportError> {
            if self.panic_on.as_deref() == Some(url) {
                panic!("transport blew up");
            }
            self.calls.lock().unwrap().push(url.to_string());
            let body = format!(
                "{}|{}",
                identity.user_agent().unwrap_or_default(),
                proxy.map(|p| p.as_str()).unwrap_or("-")
            );
            Ok(RawResponse {
                status: 200,
                body: body.into_bytes(),
            })
        }
    }

    fn targets(n: usize) -> Vec<Target> {
        (0..n)
            .map(|i| {
                Target::new(format!("https://e.com/page/{}", i), &KeyRule::LastSegment).unwrap()
            })
            .collect()
    }

    fn bodies(out: &[(Target, Outcome)]) -> Vec<String> {
        out.iter()
            .map(|(_, o)| String::from_utf8(o.body().unwrap().to_vec()).unwrap())
            .collect()
    }

    #[test]
    fn output_matches_input_order_and_length() {
        let ts = targets(37);
        let pool = IdentityPool::from_user_agents(["A"]).unwrap();
        let worker = FetchWorker::new(Echo::default(), FetchPolicy::immediate());
        let out = run_batch(&ts, &pool, &worker, 8, None);
        assert_eq!(out.len(), ts.len());
        for (i, (t, o)) in out.iter().enumerate() {
            assert_eq!(t, &ts[i]);
            assert!(o.is_success());
        }
        assert_eq!(worker.transport().calls.lock().unwrap().len(), 37);
    }

    #[test]
    fn identities_assigned_by_position() {
        let ts = targets(3);
        let pool = IdentityPool::from_user_agents(["A", "B"]).unwrap();
        let worker = FetchWorker::new(Echo::default(), FetchPolicy::immediate());
        let out = run_batch(&ts, &pool, &worker, 3, None);
        assert_eq!(bodies(&out), vec!["A|-", "B|-", "A|-"]);
    }

    #[test]
    fn assignment_is_reproducible_across_runs_and_pool_sizes() {
        let ts = targets(10);
        let pool = IdentityPool::from_user_agents(["A", "B", "C"])
            .unwrap()
            .with_proxies(vec![
                ProxyEndpoint::new("http://p1:1"),
                ProxyEndpoint::new("http://p2:2"),
            ]);
        let worker = FetchWorker::new(Echo::default(), FetchPolicy::immediate());
        let first = bodies(&run_batch(&ts, &pool, &worker, 4, None));
        let second = bodies(&run_batch(&ts, &pool, &worker, 1, None));
        assert_eq!(first, second);
        assert_eq!(first[3], "A|http://p2:2");
        assert_eq!(first[4], "B|http://p1:1");
    }

    #[test]
    fn empty_batch() {
        let pool = IdentityPool::from_user_agents(["A"]).unwrap();
        let worker = FetchWorker::new(Echo::default(), FetchPolicy::immediate());
        assert!(run_batch(&[], &pool, &worker, 4, None).is_empty());
    }

    #[test]
    fn progress_reaches_total() {
        let ts = targets(12);
        let pool = IdentityPool::from_user_agents(["A"]).unwrap();
        let worker = FetchWorker::new(Echo::default(), FetchPolicy::immediate());
        let progress = BatchProgress::new("test", ts.len(), None);
        run_batch(&ts, &pool, &worker, 5, Some(&progress));
        assert_eq!(progress.completed(), 12);
        assert_eq!(progress.succeeded(), 12);
    }

    #[test]
    fn panicking_worker_yields_skipped_not_missing() {
        let ts = targets(4);
        let pool = IdentityPool::from_user_agents(["A"]).unwrap();
        let echo = Echo {
            panic_on: Some("https://e.com/page/2".to_string()),
            ..Echo::default()
        };
        let worker = FetchWorker::new(echo, FetchPolicy::immediate());
        // One worker: everything after the panic is never attempted.
        let out = run_batch(&ts, &pool, &worker, 1, None);
        assert_eq!(out.len(), 4);
        assert!(out[0].1.is_success());
        assert!(out[1].1.is_success());
        assert!(matches!(out[2].1, Outcome::Skipped { .. }));
        assert!(matches!(out[3].1, Outcome::Skipped { .. }));
    }
}
