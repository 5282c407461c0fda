use kube::Error as KubeError;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] KubeError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
