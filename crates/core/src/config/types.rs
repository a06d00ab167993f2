use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::crawler::CrawlerConfig;
use crate::external_catalog::TmdbConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub catalog: TmdbConfig,
    #[serde(default)]
    pub searcher: JackettConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
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
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    3000
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite database file. `DATABASE_URL` overrides it.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// Pool capacity. Sized for the crawler and the read API together.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("trawler.db")
}

fn default_max_connections() -> usize {
    20
}

/// Jackett search backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JackettConfig {
    /// Jackett server URL (e.g., "http://localhost:9117")
    #[serde(default = "default_jackett_url")]
    pub url: String,
    /// Jackett API key
    #[serde(default)]
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for JackettConfig {
    fn default() -> Self {
        Self {
            url: default_jackett_url(),
            api_key: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_jackett_url() -> String {
    "http://localhost:9117".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub catalog: SanitizedCatalogConfig,
    pub searcher: SanitizedJackettConfig,
    pub crawler: CrawlerConfig,
}

/// Sanitized TMDB config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCatalogConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub api_key_configured: bool,
}

/// Sanitized Jackett config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedJackettConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            catalog: SanitizedCatalogConfig {
                base_url: config.catalog.base_url.clone(),
                api_key_configured: !config.catalog.api_key.is_empty(),
            },
            searcher: SanitizedJackettConfig {
                url: config.searcher.url.clone(),
                api_key_configured: !config.searcher.api_key.is_empty(),
                timeout_secs: config.searcher.timeout_secs,
            },
            crawler: config.crawler.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_server_section() {
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
    fn test_deserialize_empty_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.database.path.to_str().unwrap(), "trawler.db");
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.searcher.url, "http://localhost:9117");
        assert_eq!(config.searcher.timeout_secs, 30);
        assert!(config.catalog.api_key.is_empty());
        assert_eq!(config.crawler.max_pages, 20);
    }

    #[test]
    fn test_deserialize_with_custom_database() {
        let toml = r#"
[database]
path = "/data/torrents.sqlite"
max_connections = 4
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.database.path.to_str().unwrap(),
            "/data/torrents.sqlite"
        );
        assert_eq!(config.database.max_connections, 4);
    }

    #[test]
    fn test_deserialize_with_searcher_and_catalog() {
        let toml = r#"
[catalog]
api_key = "tmdb-key"

[searcher]
url = "http://jackett:9117"
api_key = "jackett-key"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.catalog.api_key, "tmdb-key");
        assert_eq!(config.searcher.url, "http://jackett:9117");
        assert_eq!(config.searcher.api_key, "jackett-key");
        assert_eq!(config.searcher.timeout_secs, 30); // default
    }

    #[test]
    fn test_sanitized_config_hides_keys() {
        let mut config = Config::default();
        config.catalog.api_key = "secret-tmdb".to_string();
        config.searcher.api_key = "secret-jackett".to_string();

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.catalog.api_key_configured);
        assert!(sanitized.searcher.api_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-tmdb"));
        assert!(!json.contains("secret-jackett"));
    }

    #[test]
    fn test_sanitized_config_without_keys() {
        let sanitized = SanitizedConfig::from(&Config::default());
        assert!(!sanitized.catalog.api_key_configured);
        assert!(!sanitized.searcher.api_key_configured);
        assert_eq!(sanitized.server.port, 3000);
    }
}
