/*
 * Sync Notifier - Argo CD to GitHub status bridge
 * Copyright (C) 2025 Sync Notifier team
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published
 * by the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc, clippy::doc_markdown)]

//! Controller library
//!
//! Watches Argo CD `Application` objects and forwards their sync and health
//! transitions to GitHub check runs and pull request comments.

pub mod argocd;
pub mod config;
pub mod crds;
pub mod github;
pub mod health;
pub mod observed;
pub mod reconcile;
pub mod recorder;
pub mod types;

// Re-export commonly used types
pub use config::ControllerConfig;
pub use crds::{Application, ApplicationSpec, ApplicationStatus};
pub use reconcile::{notify_transition, run_controller, Context};
pub use types::{Error, Result};
