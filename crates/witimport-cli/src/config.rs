//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable the access token falls back to
pub const TOKEN_ENV: &str = "AZURE_DEVOPS_TOKEN";

/// Global configuration for witimport
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub devops: DevOpsConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DevOpsConfig {
    pub base_url: String,
    pub project: String,
    pub api_version: String,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub token: Option<String>,
}

impl Default for DevOpsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dev.azure.com/".to_string(),
            project: String::new(),
            api_version: witimport_comments::endpoint::DEFAULT_API_VERSION.to_string(),
            token: std::env::var(TOKEN_ENV).ok(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Seconds per attempt
    pub request_timeout: u64,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: 30,
            max_attempts: 5,
            base_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where `import-failed.csv` is written
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    match s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        Some(var_name) => std::env::var(var_name).ok(),
        None => Some(s.to_string()),
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./witimport.toml (current directory)
    /// 2. ~/.config/witimport/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("witimport.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "witimport") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.devops.base_url, "https://dev.azure.com/");
        assert_eq!(config.devops.api_version, "6.0-preview.3");
        assert_eq!(config.http.max_attempts, 5);
        assert_eq!(config.http.base_delay_ms, 1000);
        assert_eq!(config.output.dir, PathBuf::from("."));
    }

    #[test]
    fn expand_env_var_simple() {
        std::env::set_var("WITIMPORT_TEST_VAR", "test_value");
        assert_eq!(
            expand_env_var("${WITIMPORT_TEST_VAR}"),
            Some("test_value".to_string())
        );
        std::env::remove_var("WITIMPORT_TEST_VAR");
    }

    #[test]
    fn expand_env_var_literal() {
        assert_eq!(expand_env_var("literal"), Some("literal".to_string()));
    }

    #[test]
    fn expand_env_var_missing() {
        assert_eq!(expand_env_var("${NONEXISTENT_VAR_12345}"), None);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[devops]
base_url = "https://dev.azure.com/contoso/"
project = "Fabrikam"
token = "literal-pat"

[http]
request_timeout = 10
max_attempts = 3

[output]
dir = "/tmp/failed"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.devops.project, "Fabrikam");
        assert_eq!(config.devops.token.as_deref(), Some("literal-pat"));
        assert_eq!(config.http.request_timeout, 10);
        assert_eq!(config.http.max_attempts, 3);
        // unspecified keys keep defaults
        assert_eq!(config.http.base_delay_ms, 1000);
        assert_eq!(config.devops.api_version, "6.0-preview.3");
        assert_eq!(config.output.dir, PathBuf::from("/tmp/failed"));
    }

    #[test]
    fn from_file_reports_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[http]\nmax_attempts = \"many\"\n").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(format!("{err}").contains("bad.toml"));
    }
}
