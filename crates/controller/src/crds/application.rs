//! Read model of the Argo CD `Application` custom resource.
//!
//! Only the fields the notifier reads are modelled. Everything else in the
//! Argo CD schema is ignored on deserialization.

use kube::{CustomResource, ResourceExt};
use notify::{ApplicationSnapshot, HealthStatus, Phase};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Source of the manifests of an application
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
pub struct ApplicationSource {
    /// Git or Helm repository URL
    #[serde(default, rename = "repoURL")]
    pub repo_url: String,

    /// Path within the repository
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Revision to sync to (branch, tag or commit)
    #[serde(
        default,
        rename = "targetRevision",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_revision: Option<String>,
}

/// `Application` spec, as far as the notifier is concerned
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
#[kube(group = "argoproj.io", version = "v1alpha1", kind = "Application")]
#[kube(namespaced)]
#[kube(status = "ApplicationStatus")]
pub struct ApplicationSpec {
    /// Single source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ApplicationSource>,

    /// Multiple sources (takes the place of `source` when set)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<ApplicationSource>,

    /// Argo CD project
    #[serde(default)]
    pub project: String,
}

/// Observed state of an application
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
pub struct ApplicationStatus {
    #[serde(default, rename = "operationState", skip_serializing_if = "Option::is_none")]
    pub operation_state: Option<OperationState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ApplicationSummary>,
}

/// State of the last (or current) operation
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
pub struct OperationState {
    /// Running, Succeeded, Failed, Error or Terminating
    #[serde(default)]
    pub phase: String,

    #[serde(default)]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<Operation>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncOperation>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
pub struct SyncOperation {
    #[serde(default)]
    pub revision: String,
}

/// Aggregated health of the application's resources
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
pub struct HealthInfo {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
pub struct ApplicationSummary {
    #[serde(default, rename = "externalURLs")]
    pub external_urls: Vec<String>,
}

impl Application {
    fn operation_state(&self) -> Option<&OperationState> {
        self.status.as_ref()?.operation_state.as_ref()
    }

    fn health(&self) -> Option<&HealthInfo> {
        self.status.as_ref()?.health.as_ref()
    }

    /// Phase of the current operation, empty when there is none.
    #[must_use]
    pub fn operation_phase(&self) -> &str {
        self.operation_state().map_or("", |s| s.phase.as_str())
    }

    /// Revision applied by the most recent sync operation.
    #[must_use]
    pub fn last_sync_revision(&self) -> &str {
        self.operation_state()
            .and_then(|s| s.operation.as_ref())
            .and_then(|o| o.sync.as_ref())
            .map_or("", |s| s.revision.as_str())
    }

    /// Repository URL of the first source.
    #[must_use]
    pub fn repo_url(&self) -> &str {
        self.spec
            .source
            .as_ref()
            .or_else(|| self.spec.sources.first())
            .map_or("", |s| s.repo_url.as_str())
    }

    #[must_use]
    pub fn external_urls(&self) -> &[String] {
        self.status
            .as_ref()
            .and_then(|s| s.summary.as_ref())
            .map(|s| s.external_urls.as_slice())
            .unwrap_or(&[])
    }

    /// Project the fields that drive notifications.
    #[must_use]
    pub fn snapshot(&self) -> ApplicationSnapshot {
        let operation = self.operation_state();
        let health = self.health();
        ApplicationSnapshot {
            name: self.name_any(),
            namespace: self.namespace().unwrap_or_default(),
            deleting: self.metadata.deletion_timestamp.is_some(),
            phase: Phase::parse(self.operation_phase()),
            operation_message: operation.map(|s| s.message.clone()).unwrap_or_default(),
            health_status: HealthStatus::parse(health.map_or("", |h| h.status.as_str())),
            health_message: health.map(|h| h.message.clone()).unwrap_or_default(),
            last_sync_revision: self.last_sync_revision().to_string(),
            external_urls: self.external_urls().to_vec(),
            annotations: self.annotations().clone(),
            repo_url: self.repo_url().to_string(),
        }
    }
}
