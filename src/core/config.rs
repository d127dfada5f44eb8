use crate::core::retention::DEFAULT_RETENTION_YEARS;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AlphaVantageConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeRateConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GoldApiConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub alphavantage: Option<AlphaVantageConfig>,
    pub exchange_rate: Option<ExchangeRateConfig>,
    pub gold_api: Option<GoldApiConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            alphavantage: Some(AlphaVantageConfig {
                base_url: "https://www.alphavantage.co".to_string(),
                api_key: None,
            }),
            exchange_rate: Some(ExchangeRateConfig {
                base_url: "https://v6.exchangerate-api.com".to_string(),
                api_key: None,
            }),
            gold_api: Some(GoldApiConfig {
                base_url: "https://api.gold-api.com".to_string(),
            }),
        }
    }
}

fn default_retention_years() -> u32 {
    DEFAULT_RETENTION_YEARS
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub data_path: Option<String>,
    #[serde(default = "default_retention_years")]
    pub retention_years: u32,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            data_path: None,
            retention_years: default_retention_years(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "finboard", "finboard")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "finboard", "finboard")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  alphavantage:
    base_url: "http://example.com/av"
    api_key: "secret"
  exchange_rate:
    base_url: "http://example.com/fx"
  gold_api:
    base_url: "http://example.com/gold"
data_path: "/tmp/finboard"
retention_years: 3
fetch_timeout_secs: 5
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        let av = config.providers.alphavantage.as_ref().unwrap();
        assert_eq!(av.base_url, "http://example.com/av");
        assert_eq!(av.api_key.as_deref(), Some("secret"));
        let fx = config.providers.exchange_rate.as_ref().unwrap();
        assert_eq!(fx.base_url, "http://example.com/fx");
        assert!(fx.api_key.is_none());
        assert_eq!(
            config.providers.gold_api.as_ref().unwrap().base_url,
            "http://example.com/gold"
        );
        assert_eq!(config.data_path.as_deref(), Some("/tmp/finboard"));
        assert_eq!(config.retention_years, 3);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("data_path: ~\n").unwrap();
        assert_eq!(config.retention_years, 5);
        assert_eq!(config.fetch_timeout_secs, 30);
        assert_eq!(
            config.providers.gold_api.as_ref().unwrap().base_url,
            "https://api.gold-api.com"
        );
        assert_eq!(
            AppConfig::default().default_data_path().is_ok(),
            ProjectDirs::from("io", "finboard", "finboard").is_some()
        );
    }

    #[test]
    fn test_custom_data_path_wins() {
        let config = AppConfig {
            data_path: Some("/srv/finboard".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/srv/finboard")
        );
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = AppConfig::load_from_path("/nonexistent/finboard.yaml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/finboard.yaml"));
    }
}
