use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    7001
}

/// Content index configuration: which mirrors to scrape and how.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    /// Mirror base URLs, tried in order until one serves non-blocked content.
    #[serde(default = "default_mirrors")]
    pub mirrors: Vec<String>,
    /// Path prefix of the search page; the url-encoded query is appended.
    #[serde(default = "default_search_path")]
    pub search_path: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_index_timeout")]
    pub timeout_secs: u32,
    /// User-Agent header sent to the index.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            mirrors: default_mirrors(),
            search_path: default_search_path(),
            timeout_secs: default_index_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_mirrors() -> Vec<String> {
    vec![
        "https://prehraj.to".to_string(),
        "https://prehrajto.cz".to_string(),
    ]
}

fn default_search_path() -> String {
    "/hledej/".to_string()
}

fn default_index_timeout() -> u32 {
    25
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120 Safari/537.36"
        .to_string()
}

/// Metadata provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetadataConfig {
    /// Cinemeta base URL.
    #[serde(default = "default_cinemeta_url")]
    pub cinemeta_url: String,
    /// Optional TMDB refinement (richer titles and release years).
    #[serde(default)]
    pub tmdb: Option<TmdbConfig>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_metadata_timeout")]
    pub timeout_secs: u32,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            cinemeta_url: default_cinemeta_url(),
            tmdb: None,
            timeout_secs: default_metadata_timeout(),
        }
    }
}

fn default_cinemeta_url() -> String {
    "https://v3-cinemeta.strem.io".to_string()
}

fn default_metadata_timeout() -> u32 {
    12
}

/// TMDB client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    /// TMDB API key
    pub api_key: String,
    /// API base URL (override for testing)
    #[serde(default = "default_tmdb_url")]
    pub base_url: String,
}

fn default_tmdb_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

/// Resolution engine limits and switches.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Hard cap on returned streams per resolution.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Concurrent search-page fetches per resolution.
    #[serde(default = "default_search_concurrency")]
    pub search_concurrency: usize,
    /// Concurrent detail-page fetches per resolution.
    #[serde(default = "default_extract_concurrency")]
    pub extract_concurrency: usize,
    /// Cap on the merged candidate pool before filtering.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    /// How many deferred candidates the episode fallback pass may try.
    #[serde(default = "default_deferred_retry_limit")]
    pub deferred_retry_limit: usize,
    /// Retry episode-unconfirmed candidates when the strict pass finds nothing.
    #[serde(default = "default_allow_episode_fallback")]
    pub allow_episode_fallback: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            search_concurrency: default_search_concurrency(),
            extract_concurrency: default_extract_concurrency(),
            max_candidates: default_max_candidates(),
            deferred_retry_limit: default_deferred_retry_limit(),
            allow_episode_fallback: default_allow_episode_fallback(),
        }
    }
}

fn default_max_results() -> usize {
    60
}

fn default_search_concurrency() -> usize {
    4
}

fn default_extract_concurrency() -> usize {
    6
}

fn default_max_candidates() -> usize {
    150
}

fn default_deferred_retry_limit() -> usize {
    20
}

fn default_allow_episode_fallback() -> bool {
    true
}

/// Result cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Storage backend for cached search/stream results.
    #[serde(default)]
    pub backend: CacheBackend,
    /// Entry time-to-live in seconds.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    /// Database path (used when backend = "sqlite").
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            ttl_secs: default_cache_ttl(),
            path: default_cache_path(),
        }
    }
}

fn default_cache_ttl() -> u64 {
    1800
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("pramen-cache.db")
}

/// Available cache backends
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    #[default]
    Memory,
    Sqlite,
    Disabled,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub index: IndexConfig,
    pub metadata: SanitizedMetadataConfig,
    pub resolver: ResolverConfig,
    pub cache: CacheConfig,
}

/// Sanitized metadata config (TMDB API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedMetadataConfig {
    pub cinemeta_url: String,
    pub tmdb_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            index: config.index.clone(),
            metadata: SanitizedMetadataConfig {
                cinemeta_url: config.metadata.cinemeta_url.clone(),
                tmdb_configured: config
                    .metadata
                    .tmdb
                    .as_ref()
                    .is_some_and(|t| !t.api_key.is_empty()),
                timeout_secs: config.metadata.timeout_secs,
            },
            resolver: config.resolver.clone(),
            cache: config.cache.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 7001);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.index.mirrors.len(), 2);
        assert_eq!(config.index.search_path, "/hledej/");
        assert_eq!(config.index.timeout_secs, 25);
        assert_eq!(config.resolver.max_results, 60);
        assert_eq!(config.resolver.max_candidates, 150);
        assert!(config.resolver.allow_episode_fallback);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache.ttl_secs, 1800);
        assert!(config.metadata.tmdb.is_none());
    }

    #[test]
    fn test_deserialize_custom_server() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
    }

    #[test]
    fn test_deserialize_custom_mirrors() {
        let toml = r#"
[index]
mirrors = ["https://mirror-a.example", "https://mirror-b.example"]
timeout_secs = 10
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.index.mirrors,
            vec!["https://mirror-a.example", "https://mirror-b.example"]
        );
        assert_eq!(config.index.timeout_secs, 10);
        // Untouched fields keep defaults
        assert_eq!(config.index.search_path, "/hledej/");
    }

    #[test]
    fn test_deserialize_with_tmdb() {
        let toml = r#"
[metadata.tmdb]
api_key = "test-api-key"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let tmdb = config.metadata.tmdb.as_ref().unwrap();
        assert_eq!(tmdb.api_key, "test-api-key");
        assert_eq!(tmdb.base_url, "https://api.themoviedb.org/3");
    }

    #[test]
    fn test_deserialize_sqlite_cache() {
        let toml = r#"
[cache]
backend = "sqlite"
path = "/data/cache.db"
ttl_secs = 600
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cache.backend, CacheBackend::Sqlite);
        assert_eq!(config.cache.path.to_str().unwrap(), "/data/cache.db");
        assert_eq!(config.cache.ttl_secs, 600);
    }

    #[test]
    fn test_sanitized_config_redacts_tmdb_key() {
        let mut config: Config = toml::from_str("").unwrap();
        config.metadata.tmdb = Some(TmdbConfig {
            api_key: "secret-key".to_string(),
            base_url: default_tmdb_url(),
        });

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.metadata.tmdb_configured);
        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-key"));
    }

    #[test]
    fn test_sanitized_config_without_tmdb() {
        let config: Config = toml::from_str("").unwrap();
        let sanitized = SanitizedConfig::from(&config);
        assert!(!sanitized.metadata.tmdb_configured);
        assert_eq!(sanitized.server.port, 7001);
    }
}
