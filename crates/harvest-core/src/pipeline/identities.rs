use anyhow::Result;
use std::sync::Arc;

use super::Layout;
use crate::config::HarvestConfig;
use crate::extract::proxy_list_endpoints;
use crate::fetch::{FetchWorker, Outcome, Transport};
use crate::identity::{load_proxies, load_user_agents, Identity, IdentityPool, ProxyEndpoint};
use crate::target::Target;

/// Identity pool from the configured user-agent file, plus proxies from the
/// proxy file and the proxy list page when configured.
pub async fn build_identity_pool<T: Transport + 'static>(
    cfg: &HarvestConfig,
    layout: &Layout,
    worker: &Arc<FetchWorker<T>>,
) -> Result<IdentityPool> {
    let identities = load_user_agents(&layout.resolve(&cfg.user_agents_file))?;

    let mut proxies = match &cfg.proxies_file {
        Some(path) => load_proxies(&layout.resolve(path))?,
        None => Vec::new(),
    };
    if let (Some(url), Some(identity)) = (&cfg.proxy_list_url, identities.first()) {
        proxies.extend(fetch_proxy_list(worker, identity, url).await);
    }

    tracing::info!(
        identities = identities.len(),
        proxies = proxies.len(),
        "identity pool ready"
    );
    Ok(IdentityPool::new(identities, proxies)?)
}

/// Fetch and parse a proxy list page once, without a proxy. Failures give no proxies.
pub async fn fetch_proxy_list<T: Transport + 'static>(
    worker: &Arc<FetchWorker<T>>,
    identity: &Identity,
    url: &str,
) -> Vec<ProxyEndpoint> {
    let worker = Arc::clone(worker);
    let identity = identity.clone();
    let target = Target::from_parts(url, "proxy-list");

    let fetched = tokio::task::spawn_blocking(move || {
        let outcome = worker.fetch(&target, &identity, None);
        (target, outcome)
    })
    .await;

    match fetched {
        Ok((_, Outcome::Success { body, .. })) => proxy_list_endpoints(&body),
        Ok((target, other)) => {
            tracing::warn!(url = target.url(), "could not fetch proxy list: {}", other);
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(url, "proxy list task failed: {}", e);
            Vec::new()
        }
    }
}
