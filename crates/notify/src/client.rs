//! Interface of the downstream GitHub client.

use async_trait::async_trait;

use crate::error::ClientError;
use crate::events::{CheckRun, Comment};
use crate::reference::{CheckRunId, Repository};

/// Calls made against GitHub when a notification is delivered.
///
/// Implementations should be idempotent for check runs: applying the same
/// payload to the same id twice leaves the same remote state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Update an existing check run.
    async fn update_check_run(
        &self,
        id: &CheckRunId,
        check_run: &CheckRun,
    ) -> Result<(), ClientError>;

    /// Comment on every pull request associated with `revision`.
    async fn comment_on_revision(
        &self,
        repository: &Repository,
        revision: &str,
        comment: &Comment,
    ) -> Result<(), ClientError>;
}
