//! Transition detection and notification generation for Argo CD applications.
//!
//! This crate turns an observed change of an `Application` (sync phase or
//! health status) into a GitHub notification: a check run update or a pull
//! request comment.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use notify::{ApplicationSnapshot, Channel, Dispatcher, GitHubApi, ObservedState};
//!
//! # async fn example(client: Arc<dyn GitHubApi>, previous: ObservedState, current: ApplicationSnapshot) {
//! let dispatcher = Dispatcher::new(client);
//! match dispatcher
//!     .dispatch(&previous, &current, "https://argocd.example.com", Channel::CheckRun)
//!     .await
//! {
//!     Ok(outcome) => println!("{outcome:?}"),
//!     Err(e) => eprintln!("notification failed: {e}"),
//! }
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`snapshot`] holds the comparable projection of an application
//! - [`predicate`] decides whether a pair of observations is notable
//! - [`generator`] maps a notable [`TransitionEvent`] to a [`Notification`]
//! - [`reference`] parses the GitHub targets stored on the application
//! - [`Dispatcher`] ties them together and calls a [`GitHubApi`] once

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod generator;
pub mod predicate;
pub mod reference;
pub mod snapshot;

pub use client::GitHubApi;
pub use dispatcher::{Dispatcher, Outcome, SkipReason};
pub use error::{ClientError, DispatchError};
pub use events::{
    Channel, CheckRun, CheckRunStatus, Comment, Conclusion, Notification, TransitionEvent,
};
pub use generator::{generate, generate_check_run, generate_comment};
pub use predicate::{should_process, Transition};
pub use reference::{
    parse_check_run_url, parse_repository_url, CheckRunId, Repository, CHECK_RUN_URL_ANNOTATION,
};
pub use snapshot::{ApplicationSnapshot, HealthStatus, ObservedState, Phase};
