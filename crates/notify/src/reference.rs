//! Parsing of GitHub references stored on an application.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

/// Annotation holding the URL of the check run to update.
pub const CHECK_RUN_URL_ANNOTATION: &str = "argocd-commenter.int128.github.io/check-run-url";

lazy_static! {
    static ref CHECK_RUN_URL: Regex =
        Regex::new(r"^https://api\.[^/]+/repos/([^/]+)/([^/]+)/check-runs/(\d+)$")
            .expect("check run URL pattern is valid");
}

/// A GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Identifier of an existing check run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckRunId {
    pub repository: Repository,
    pub id: i64,
}

impl fmt::Display for CheckRunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repository, self.id)
    }
}

/// Parse a check run API URL.
///
/// For example, `https://api.github.com/repos/int128/sandbox/check-runs/5348989392`.
/// Returns `None` when the URL does not have this shape or the id overflows.
#[must_use]
pub fn parse_check_run_url(url: &str) -> Option<CheckRunId> {
    let captures = CHECK_RUN_URL.captures(url)?;
    let id = captures[3].parse::<i64>().ok()?;
    Some(CheckRunId {
        repository: Repository {
            owner: captures[1].to_string(),
            name: captures[2].to_string(),
        },
        id,
    })
}

/// Parse a GitHub repository URL.
///
/// Supports formats like:
/// - https://github.com/owner/repo
/// - https://github.com/owner/repo.git
/// - git@github.com:owner/repo.git
#[must_use]
pub fn parse_repository_url(url: &str) -> Option<Repository> {
    let cleaned = url.trim().trim_end_matches('/').trim_end_matches(".git");
    let path = cleaned
        .strip_prefix("https://github.com/")
        .or_else(|| cleaned.strip_prefix("git@github.com:"))?;

    let mut parts = path.split('/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let name = parts.next().filter(|s| !s.is_empty())?;
    if parts.next().is_some() {
        return None;
    }

    Some(Repository {
        owner: owner.to_string(),
        name: name.to_string(),
    })
}
