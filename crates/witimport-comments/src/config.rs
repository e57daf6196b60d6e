//! Import pipeline configuration

use std::time::Duration;

use witimport_core::{HttpConfig, RetryPolicy};

use crate::endpoint::{DEFAULT_API_VERSION, Endpoint};

/// Runtime configuration for one import run
#[derive(Debug, Clone)]
pub struct Config {
    /// Organization URL, e.g. `https://dev.azure.com/myorg/`
    pub base_url: String,
    pub project: String,
    pub api_version: String,
    /// Bearer token sent with every request
    pub token: String,
    pub retry: RetryPolicy,
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://dev.azure.com/".to_string(),
            project: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            token: String::new(),
            retry: RetryPolicy::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(&self.base_url, &self.project).with_api_version(&self.api_version)
    }

    /// Everything needed to reach the API must be present before a run starts.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.base_url.trim().is_empty(), "base URL is not set");
        anyhow::ensure!(!self.project.trim().is_empty(), "project is not set");
        anyhow::ensure!(!self.token.trim().is_empty(), "access token is not set");
        anyhow::ensure!(
            self.http.request_timeout > Duration::ZERO,
            "request timeout must be positive"
        );
        Ok(())
    }
}
