//! Loading identities and proxies from plain text files.

use std::path::Path;

use super::{Identity, IdentityError, ProxyEndpoint};

fn read_lines(path: &Path) -> Result<Vec<String>, IdentityError> {
    let text = std::fs::read_to_string(path).map_err(|source| IdentityError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Read one user agent per line. An empty file yields `IdentityError::Exhausted`.
pub fn load_user_agents(path: &Path) -> Result<Vec<Identity>, IdentityError> {
    let identities: Vec<Identity> = read_lines(path)?
        .iter()
        .map(|line| Identity::from_user_agent(line))
        .collect();
    if identities.is_empty() {
        return Err(IdentityError::Exhausted(format!(
            "no user agents in {}",
            path.display()
        )));
    }
    tracing::debug!("loaded {} user agents from {}", identities.len(), path.display());
    Ok(identities)
}

/// Read proxies, one per line. A missing file is an error; an empty file is not.
pub fn load_proxies(path: &Path) -> Result<Vec<ProxyEndpoint>, IdentityError> {
    let proxies: Vec<ProxyEndpoint> = read_lines(path)?
        .iter()
        .filter_map(|line| {
            let proxy = parse_proxy_line(line);
            if proxy.is_none() {
                tracing::warn!("ignoring proxy line {:?}", line);
            }
            proxy
        })
        .collect();
    tracing::debug!("loaded {} proxies from {}", proxies.len(), path.display());
    Ok(proxies)
}

/// Accepts `host:port` (assumed HTTP proxy) or a full proxy URL.
pub fn parse_proxy_line(line: &str) -> Option<ProxyEndpoint> {
    let line = line.trim();
    if line.contains("://") {
        let parsed = url::Url::parse(line).ok()?;
        parsed.host_str()?;
        return Some(ProxyEndpoint::new(line));
    }
    let (host, port) = line.rsplit_once(':')?;
    if host.is_empty() || port.parse::<u16>().is_err() {
        return None;
    }
    Some(ProxyEndpoint::new(format!("http://{}:{}", host, port)))
}
