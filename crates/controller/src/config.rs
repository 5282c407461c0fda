//! Controller Configuration
//!
//! Loaded from a mounted YAML file. Every field has a default, so an empty or
//! missing file yields a working configuration.

use notify::Channel;
use serde::{Deserialize, Serialize};

/// Main controller configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerConfig {
    /// Namespace to watch; all namespaces when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// GitHub API configuration
    #[serde(default)]
    pub github: GitHubConfig,

    /// Enabled notification channels
    #[serde(default)]
    pub channels: ChannelsConfig,

    /// Where to find the Argo CD UI URL
    #[serde(default)]
    pub argocd: ArgoCdConfig,

    /// How often observed states of vanished applications are pruned
    #[serde(default = "default_prune_interval_seconds")]
    pub prune_interval_seconds: u64,

    /// Reporting controller name on Kubernetes events
    #[serde(default = "default_reporter")]
    pub reporter: String,
}

/// GitHub API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubConfig {
    /// REST API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Environment variable holding the API token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Request timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Notification channel toggles
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsConfig {
    #[serde(default = "default_true")]
    pub check_run: bool,

    #[serde(default)]
    pub comment: bool,
}

/// Location of the Argo CD URL
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgoCdConfig {
    /// ConfigMap looked up in the application's namespace
    #[serde(default = "default_config_map_name")]
    pub config_map_name: String,

    /// Key of the URL within the ConfigMap
    #[serde(default = "default_url_key")]
    pub url_key: String,
}

fn default_prune_interval_seconds() -> u64 {
    300
}

fn default_reporter() -> String {
    "sync-notifier".to_string()
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_config_map_name() -> String {
    "argocd-cm".to_string()
}

fn default_url_key() -> String {
    "url".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token_env: default_token_env(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            check_run: true,
            comment: false,
        }
    }
}

impl ChannelsConfig {
    /// Enabled channels in delivery order.
    #[must_use]
    pub fn enabled(&self) -> Vec<Channel> {
        let mut channels = Vec::new();
        if self.check_run {
            channels.push(Channel::CheckRun);
        }
        if self.comment {
            channels.push(Channel::Comment);
        }
        channels
    }
}

impl Default for ArgoCdConfig {
    fn default() -> Self {
        Self {
            config_map_name: default_config_map_name(),
            url_key: default_url_key(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            github: GitHubConfig::default(),
            channels: ChannelsConfig::default(),
            argocd: ArgoCdConfig::default(),
            prune_interval_seconds: default_prune_interval_seconds(),
            reporter: default_reporter(),
        }
    }
}

impl ControllerConfig {
    /// Validate that configuration has required fields
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.channels.enabled().is_empty() {
            return Err(anyhow::anyhow!(
                "No notification channel enabled. Set channels.checkRun or channels.comment."
            ));
        }

        let api_url = self.github.api_url.trim();
        if !(api_url.starts_with("https://") || api_url.starts_with("http://")) {
            return Err(anyhow::anyhow!(
                "github.apiUrl must be an http(s) URL, got '{api_url}'"
            ));
        }

        if self.github.token_env.trim().is_empty() {
            return Err(anyhow::anyhow!("github.tokenEnv must not be empty"));
        }

        if self.github.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("github.timeoutSeconds must be positive"));
        }

        if self.argocd.config_map_name.trim().is_empty() || self.argocd.url_key.trim().is_empty()
        {
            return Err(anyhow::anyhow!(
                "argocd.configMapName and argocd.urlKey must not be empty"
            ));
        }

        if self.prune_interval_seconds == 0 {
            return Err(anyhow::anyhow!("pruneIntervalSeconds must be positive"));
        }

        Ok(())
    }

    /// Load configuration from mounted `ConfigMap` file
    pub fn from_mounted_file(config_path: &str) -> Result<Self, anyhow::Error> {
        let config_str = std::fs::read_to_string(config_path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {config_path}: {e}"))?;

        Self::from_yaml(&config_str)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(config_str: &str) -> Result<Self, anyhow::Error> {
        if config_str.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse config YAML: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = ControllerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.channels.enabled(), vec![Channel::CheckRun]);
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.argocd.config_map_name, "argocd-cm");
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = ControllerConfig::from_yaml(
            r"
namespace: argocd
channels:
  comment: true
github:
  apiUrl: https://ghe.example.com/api/v3
",
        )
        .unwrap();

        assert_eq!(config.namespace.as_deref(), Some("argocd"));
        assert_eq!(
            config.channels.enabled(),
            vec![Channel::CheckRun, Channel::Comment]
        );
        assert_eq!(config.github.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.github.token_env, "GITHUB_TOKEN");
        assert_eq!(config.github.timeout_seconds, 30);
        assert_eq!(config.prune_interval_seconds, 300);
    }

    #[test]
    fn empty_yaml_is_default() {
        let config = ControllerConfig::from_yaml("").unwrap();
        assert!(config.namespace.is_none());
        assert_eq!(config.reporter, "sync-notifier");
    }

    #[test]
    fn validate_rejects_no_channels() {
        let mut config = ControllerConfig::default();
        config.channels.check_run = false;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_api_url() {
        let mut config = ControllerConfig::default();
        config.github.api_url = "api.github.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_from_mounted_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "reporter: notifier-test\npruneIntervalSeconds: 60").unwrap();

        let config = ControllerConfig::from_mounted_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.reporter, "notifier-test");
        assert_eq!(config.prune_interval_seconds, 60);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(ControllerConfig::from_mounted_file("/nonexistent/config.yaml").is_err());
    }
}
