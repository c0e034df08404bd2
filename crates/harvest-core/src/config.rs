use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fetch worker timing (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Pause after a 200 response, in seconds.
    pub success_delay_secs: f64,
    /// Pause after a non-200 response or a network error, in seconds.
    pub failure_delay_secs: f64,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            success_delay_secs: 0.5,
            failure_delay_secs: 1.0,
            connect_timeout_secs: 15,
            timeout_secs: 60,
        }
    }
}

/// Retry rounds per stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of rounds a stage runs before giving up on what is left.
    pub retry_budget: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { retry_budget: 3 }
    }
}

/// Search page enumeration for the discovery stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Listing URL with an `{offset}` placeholder.
    pub search_url_template: String,
    pub first_offset: u32,
    pub last_offset: u32,
    pub offset_step: u32,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            search_url_template:
                "https://www.smashwords.com/books/category/1/downloads/0/free/medium/{offset}"
                    .to_string(),
            first_offset: 0,
            last_offset: 30_000,
            offset_step: 20,
        }
    }
}

impl DiscoveryConfig {
    /// All search page URLs, first to last offset inclusive.
    pub fn search_urls(&self) -> Vec<String> {
        let step = self.offset_step.max(1) as usize;
        (self.first_offset..=self.last_offset)
            .step_by(step)
            .map(|offset| {
                self.search_url_template
                    .replace("{offset}", &offset.to_string())
            })
            .collect()
    }
}

/// Text download stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Cap on downloads per run (the catalog blocks an address after roughly 500 requests).
    #[serde(default)]
    pub max_per_run: Option<usize>,
    /// Path delimiter preceding the stable key in download URLs.
    pub key_delimiter: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_per_run: Some(500),
            key_delimiter: "/download/".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/harvest/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Worker threads per batch; None = available parallelism.
    #[serde(default)]
    pub pool_size: Option<usize>,
    /// Root directory for `data/`, `dump/` and stage files; None = current directory.
    #[serde(default)]
    pub root_dir: Option<PathBuf>,
    /// User-agent list, one per line (relative paths resolve against the root dir).
    pub user_agents_file: PathBuf,
    /// Optional proxy list, one `host:port` per line.
    #[serde(default)]
    pub proxies_file: Option<PathBuf>,
    /// Optional free proxy list page; HTTPS-capable rows are added to the proxy pool.
    #[serde(default)]
    pub proxy_list_url: Option<String>,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            pool_size: None,
            root_dir: None,
            user_agents_file: PathBuf::from("user-agents.txt"),
            proxies_file: None,
            proxy_list_url: None,
            fetch: FetchConfig::default(),
            retry: RetryConfig::default(),
            discovery: DiscoveryConfig::default(),
            download: DownloadConfig::default(),
        }
    }
}

impl HarvestConfig {
    /// Configured pool size, or the machine's available parallelism.
    pub fn effective_pool_size(&self) -> usize {
        self.pool_size
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4)
            })
            .max(1)
    }

    /// Negative delays count as zero; delays too large for a `Duration` saturate.
    pub fn success_delay(&self) -> Duration {
        delay_from_secs(self.fetch.success_delay_secs)
    }

    pub fn failure_delay(&self) -> Duration {
        delay_from_secs(self.fetch.failure_delay_secs)
    }

    /// Reject values that parse as TOML but cannot drive a run.
    pub fn validate(&self) -> Result<()> {
        for (name, secs) in [
            ("fetch.success_delay_secs", self.fetch.success_delay_secs),
            ("fetch.failure_delay_secs", self.fetch.failure_delay_secs),
        ] {
            if secs.is_nan() || secs < 0.0 {
                anyhow::bail!("{} must be a non-negative number of seconds, got {}", name, secs);
            }
            Duration::try_from_secs_f64(secs)
                .with_context(|| format!("{} is out of range: {}", name, secs))?;
        }
        Ok(())
    }

    /// Resolve a configured path against `root`, leaving absolute paths alone.
    pub fn resolve(root: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }
}

fn delay_from_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("harvest")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<HarvestConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = HarvestConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit path (no default file is created).
pub fn load_from(path: &Path) -> Result<HarvestConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: HarvestConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = HarvestConfig::default();
        assert_eq!(cfg.retry.retry_budget, 3);
        assert!((cfg.fetch.success_delay_secs - 0.5).abs() < 1e-9);
        assert!((cfg.fetch.failure_delay_secs - 1.0).abs() < 1e-9);
        assert_eq!(cfg.download.max_per_run, Some(500));
        assert_eq!(cfg.download.key_delimiter, "/download/");
        assert!(cfg.proxies_file.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = HarvestConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: HarvestConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.retry.retry_budget, cfg.retry.retry_budget);
        assert_eq!(parsed.user_agents_file, cfg.user_agents_file);
        assert_eq!(
            parsed.discovery.search_url_template,
            cfg.discovery.search_url_template
        );
    }

    #[test]
    fn config_toml_minimal_uses_section_defaults() {
        let toml = r#"
            user_agents_file = "/etc/harvest/agents.txt"
            pool_size = 2
        "#;
        let cfg: HarvestConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.pool_size, Some(2));
        assert_eq!(cfg.effective_pool_size(), 2);
        assert_eq!(cfg.retry.retry_budget, 3);
        assert_eq!(cfg.fetch.timeout_secs, 60);
        assert!(cfg.root_dir.is_none());
    }

    #[test]
    fn config_toml_custom_sections() {
        let toml = r#"
            user_agents_file = "agents.txt"
            proxies_file = "proxies.txt"
            proxy_list_url = "https://free-proxy-list.net/"

            [fetch]
            success_delay_secs = 0.0
            failure_delay_secs = 0.25
            connect_timeout_secs = 5
            timeout_secs = 10

            [retry]
            retry_budget = 5

            [download]
            key_delimiter = "/get/"
        "#;
        let cfg: HarvestConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.success_delay(), Duration::ZERO);
        assert_eq!(cfg.failure_delay(), Duration::from_millis(250));
        assert_eq!(cfg.retry.retry_budget, 5);
        assert_eq!(cfg.download.key_delimiter, "/get/");
        assert!(cfg.download.max_per_run.is_none());
        assert_eq!(cfg.proxies_file.as_deref(), Some(Path::new("proxies.txt")));
        assert_eq!(cfg.proxy_list_url.as_deref(), Some("https://free-proxy-list.net/"));
    }

    #[test]
    fn infinite_delay_is_rejected_on_load() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut f,
            b"user_agents_file = \"agents.txt\"\n[fetch]\nsuccess_delay_secs = inf\nfailure_delay_secs = 1.0\nconnect_timeout_secs = 5\ntimeout_secs = 10\n",
        )
        .unwrap();
        let err = load_from(f.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("fetch.success_delay_secs"));
    }

    #[test]
    fn out_of_range_delays_never_panic() {
        let mut cfg = HarvestConfig::default();
        cfg.fetch.success_delay_secs = f64::INFINITY;
        cfg.fetch.failure_delay_secs = f64::NAN;
        assert_eq!(cfg.success_delay(), Duration::MAX);
        assert_eq!(cfg.failure_delay(), Duration::ZERO);
        assert!(cfg.validate().is_err());

        cfg.fetch.success_delay_secs = -2.0;
        cfg.fetch.failure_delay_secs = 0.25;
        assert_eq!(cfg.success_delay(), Duration::ZERO);
        assert!(cfg.validate().is_err());

        assert!(HarvestConfig::default().validate().is_ok());
    }

    #[test]
    fn search_urls_cover_inclusive_range() {
        let d = DiscoveryConfig {
            search_url_template: "https://example.com/list/{offset}".to_string(),
            first_offset: 0,
            last_offset: 40,
            offset_step: 20,
        };
        assert_eq!(
            d.search_urls(),
            vec![
                "https://example.com/list/0",
                "https://example.com/list/20",
                "https://example.com/list/40",
            ]
        );
        assert_eq!(DiscoveryConfig::default().search_urls().len(), 1501);
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let root = Path::new("/srv/harvest");
        assert_eq!(
            HarvestConfig::resolve(root, Path::new("agents.txt")),
            PathBuf::from("/srv/harvest/agents.txt")
        );
        assert_eq!(
            HarvestConfig::resolve(root, Path::new("/tmp/a.txt")),
            PathBuf::from("/tmp/a.txt")
        );
    }
}
