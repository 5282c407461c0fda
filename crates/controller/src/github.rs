//! # GitHub REST Client
//!
//! Implements [`notify::GitHubApi`] over the GitHub REST API: check run
//! updates and pull request comments on a synced revision.

use async_trait::async_trait;
use notify::{
    CheckRun, CheckRunId, CheckRunStatus, ClientError, Comment, Conclusion, GitHubApi, Repository,
};
use reqwest::{header, Client as HttpClient, Method, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::config::GitHubConfig;

const USER_AGENT: &str = "sync-notifier/1.0";
const API_VERSION: &str = "2022-11-28";

/// GitHub API client for notifications
#[derive(Clone)]
pub struct GitHubClient {
    http_client: HttpClient,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct GitHubError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    number: u64,
}

#[derive(Debug, Serialize)]
struct CheckRunOutput<'a> {
    title: &'a str,
    summary: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateCheckRunRequest<'a> {
    status: CheckRunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    conclusion: Option<Conclusion>,
    output: CheckRunOutput<'a>,
}

#[derive(Debug, Serialize)]
struct CreateCommentRequest<'a> {
    body: &'a str,
}

impl GitHubClient {
    /// Create a client against `base_url` authenticated with `token`
    pub fn new(base_url: &str, token: String, timeout: Duration) -> Result<Self, ClientError> {
        let http_client = HttpClient::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Create a client from configuration, reading the token from the environment
    pub fn from_config(config: &GitHubConfig) -> Result<Self, ClientError> {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                ClientError::NotConfigured(format!("{} is not set", config.token_env))
            })?;

        Self::new(
            &config.api_url,
            token,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    fn repo_url(&self, repository: &Repository) -> String {
        format!(
            "{}/repos/{}/{}",
            self.base_url, repository.owner, repository.name
        )
    }

    async fn make_request<T: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&T>,
    ) -> Result<Response, ClientError> {
        let mut request = self
            .http_client
            .request(method, url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GitHubError>(&text)
            .map(|e| e.message)
            .unwrap_or(text);
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// List pull requests associated with a commit
    #[instrument(skip(self), fields(repository = %repository))]
    pub async fn pull_requests_for_commit(
        &self,
        repository: &Repository,
        sha: &str,
    ) -> Result<Vec<u64>, ClientError> {
        let url = format!("{}/commits/{sha}/pulls", self.repo_url(repository));
        let response = self
            .make_request::<()>(Method::GET, &url, None)
            .await?;
        let pulls: Vec<PullRequest> = response.json().await?;

        debug!("Found {} pull request(s) for {}", pulls.len(), sha);
        Ok(pulls.into_iter().map(|pr| pr.number).collect())
    }

    /// Comment on an issue or pull request
    #[instrument(skip(self, body), fields(repository = %repository))]
    pub async fn create_comment(
        &self,
        repository: &Repository,
        number: u64,
        body: &str,
    ) -> Result<(), ClientError> {
        let url = format!("{}/issues/{number}/comments", self.repo_url(repository));
        self.make_request(Method::POST, &url, Some(&CreateCommentRequest { body }))
            .await?;
        info!("Commented on {}#{}", repository, number);
        Ok(())
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    #[instrument(skip(self, check_run), fields(target = %id))]
    async fn update_check_run(
        &self,
        id: &CheckRunId,
        check_run: &CheckRun,
    ) -> Result<(), ClientError> {
        let url = format!("{}/check-runs/{}", self.repo_url(&id.repository), id.id);
        let request = UpdateCheckRunRequest {
            status: check_run.status,
            conclusion: check_run.conclusion,
            output: CheckRunOutput {
                title: &check_run.title,
                summary: &check_run.summary,
            },
        };

        self.make_request(Method::PATCH, &url, Some(&request)).await?;
        info!(status = ?check_run.status, "Updated check run {}", id);
        Ok(())
    }

    async fn comment_on_revision(
        &self,
        repository: &Repository,
        revision: &str,
        comment: &Comment,
    ) -> Result<(), ClientError> {
        let pulls = self.pull_requests_for_commit(repository, revision).await?;
        if pulls.is_empty() {
            debug!("No pull request associated with {}, nothing to comment", revision);
            return Ok(());
        }

        for number in pulls {
            self.create_comment(repository, number, &comment.body).await?;
        }
        Ok(())
    }
}
