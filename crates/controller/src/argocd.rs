//! Lookup of the Argo CD UI URL.
//!
//! See https://github.com/argoproj/argo-cd/blob/master/docs/operator-manual/argocd-cm.yaml

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{Api, Client};
use tracing::warn;

use crate::config::ArgoCdConfig;
use crate::types::{Error, Result};

/// Source of the Argo CD base URL used in notification links.
#[async_trait]
pub trait ArgoCdUrlSource: Send + Sync {
    /// Best-effort lookup: failures yield an empty URL
    async fn resolve_or_empty(&self, namespace: &str) -> String;
}

/// Resolves the Argo CD base URL from the `argocd-cm` ConfigMap
#[derive(Clone)]
pub struct ArgoCdUrlResolver {
    client: Client,
    config_map_name: String,
    url_key: String,
}

impl ArgoCdUrlResolver {
    #[must_use]
    pub fn new(client: Client, config: &ArgoCdConfig) -> Self {
        Self {
            client,
            config_map_name: config.config_map_name.clone(),
            url_key: config.url_key.clone(),
        }
    }

    /// Read the URL from the ConfigMap in `namespace`
    pub async fn resolve(&self, namespace: &str) -> Result<String> {
        let configmaps: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        let cm = configmaps.get(&self.config_map_name).await?;
        url_from_config_map(&cm, &self.url_key).ok_or_else(|| {
            Error::ConfigError(format!(
                "ConfigMap {}/{} has no '{}' key",
                namespace, self.config_map_name, self.url_key
            ))
        })
    }
}

#[async_trait]
impl ArgoCdUrlSource for ArgoCdUrlResolver {
    async fn resolve_or_empty(&self, namespace: &str) -> String {
        match self.resolve(namespace).await {
            Ok(url) => url,
            Err(e) => {
                warn!(namespace, error = %e, "unable to determine Argo CD URL");
                String::new()
            }
        }
    }
}

/// Extract the URL from the ConfigMap data, without a trailing slash
#[must_use]
pub fn url_from_config_map(cm: &ConfigMap, key: &str) -> Option<String> {
    cm.data
        .as_ref()?
        .get(key)
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .filter(|url| !url.is_empty())
}
