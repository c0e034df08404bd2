use super::{Identity, IdentityError, ProxyEndpoint};

/// Fixed, non-empty identity sequence plus an optional proxy sequence.
///
/// Read-only after construction; share it behind `Arc` across workers.
#[derive(Debug, Clone)]
pub struct IdentityPool {
    identities: Vec<Identity>,
    proxies: Vec<ProxyEndpoint>,
}

impl IdentityPool {
    /// Build a pool. Fails with `IdentityError::Exhausted` when `identities` is empty.
    pub fn new(
        identities: Vec<Identity>,
        proxies: Vec<ProxyEndpoint>,
    ) -> Result<Self, IdentityError> {
        if identities.is_empty() {
            return Err(IdentityError::Exhausted(
                "at least one user agent is required".to_string(),
            ));
        }
        Ok(Self {
            identities,
            proxies,
        })
    }

    /// Convenience: one identity per user-agent string, no proxies.
    pub fn from_user_agents<I, S>(agents: I) -> Result<Self, IdentityError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let identities = agents
            .into_iter()
            .map(|a| Identity::from_user_agent(a.as_ref()))
            .collect();
        Self::new(identities, Vec::new())
    }

    pub fn with_proxies(mut self, proxies: Vec<ProxyEndpoint>) -> Self {
        self.proxies = proxies;
        self
    }

    /// Identity for request position `index` (`index mod N`).
    pub fn identity_at(&self, index: usize) -> &Identity {
        &self.identities[index % self.identities.len()]
    }

    /// Proxy for request position `index` (`index mod P`), or `None` if there are no proxies.
    pub fn proxy_at(&self, index: usize) -> Option<&ProxyEndpoint> {
        if self.proxies.is_empty() {
            return None;
        }
        Some(&self.proxies[index % self.proxies.len()])
    }

    pub fn identity_count(&self) -> usize {
        self.identities.len()
    }

    pub fn proxy_count(&self) -> usize {
        self.proxies.len()
    }

    /// A cursor starting at position 0.
    pub fn cursor(&self) -> IdentityCursor<'_> {
        IdentityCursor {
            pool: self,
            identity_pos: 0,
            proxy_pos: 0,
        }
    }
}

/// Sequential view over a pool: `next_identity` / `next_proxy` wrap around.
/// Owns its positions, so each caller gets an independent rotation.
#[derive(Debug, Clone)]
pub struct IdentityCursor<'a> {
    pool: &'a IdentityPool,
    identity_pos: usize,
    proxy_pos: usize,
}

impl<'a> IdentityCursor<'a> {
    pub fn next_identity(&mut self) -> &'a Identity {
        let identity = self.pool.identity_at(self.identity_pos);
        self.identity_pos = (self.identity_pos + 1) % self.pool.identity_count();
        identity
    }

    pub fn next_proxy(&mut self) -> Option<&'a ProxyEndpoint> {
        let proxy = self.pool.proxy_at(self.proxy_pos)?;
        self.proxy_pos = (self.proxy_pos + 1) % self.pool.proxy_count();
        Some(proxy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ua(pool: &IdentityPool, i: usize) -> &str {
        pool.identity_at(i).user_agent().unwrap()
    }

    #[test]
    fn empty_identities_is_fatal() {
        let err = IdentityPool::new(Vec::new(), Vec::new()).unwrap_err();
        assert!(matches!(err, IdentityError::Exhausted(_)));
    }

    #[test]
    fn identities_wrap_round_robin() {
        let pool = IdentityPool::from_user_agents(["A", "B"]).unwrap();
        let seen: Vec<_> = (0..5).map(|i| ua(&pool, i)).collect();
        assert_eq!(seen, vec!["A", "B", "A", "B", "A"]);
    }

    #[test]
    fn proxies_cycle_independently() {
        let pool = IdentityPool::from_user_agents(["A", "B"])
            .unwrap()
            .with_proxies(vec![
                ProxyEndpoint::new("http://p1:1"),
                ProxyEndpoint::new("http://p2:2"),
                ProxyEndpoint::new("http://p3:3"),
            ]);
        assert_eq!(pool.proxy_at(0).unwrap().as_str(), "http://p1:1");
        assert_eq!(pool.proxy_at(4).unwrap().as_str(), "http://p2:2");
        assert_eq!(ua(&pool, 4), "A");
    }

    #[test]
    fn no_proxies_means_none_forever() {
        let pool = IdentityPool::from_user_agents(["A"]).unwrap();
        let mut cursor = pool.cursor();
        for _ in 0..10 {
            assert!(cursor.next_proxy().is_none());
        }
        assert!(pool.proxy_at(12345).is_none());
    }

    #[test]
    fn cursor_wraps_past_end() {
        let pool = IdentityPool::from_user_agents(["A", "B", "C"])
            .unwrap()
            .with_proxies(vec![ProxyEndpoint::new("http://p:1")]);
        let mut cursor = pool.cursor();
        let seen: Vec<_> = (0..7)
            .map(|_| cursor.next_identity().user_agent().unwrap().to_string())
            .collect();
        assert_eq!(seen, vec!["A", "B", "C", "A", "B", "C", "A"]);
        assert_eq!(cursor.next_proxy().unwrap().as_str(), "http://p:1");
        assert_eq!(cursor.next_proxy().unwrap().as_str(), "http://p:1");
    }

    #[test]
    fn cursors_are_independent() {
        let pool = IdentityPool::from_user_agents(["A", "B"]).unwrap();
        let mut c1 = pool.cursor();
        let mut c2 = pool.cursor();
        c1.next_identity();
        assert_eq!(c2.next_identity().user_agent(), Some("A"));
        assert_eq!(c1.next_identity().user_agent(), Some("B"));
    }
}
