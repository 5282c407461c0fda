//! Error types for notification delivery.

use thiserror::Error;

use crate::events::Channel;

/// Errors returned by a downstream GitHub client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// GitHub answered with a non-success status
    #[error("GitHub API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Client is not configured (e.g. no token)
    #[error("Client not configured: {0}")]
    NotConfigured(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Errors returned by [`crate::Dispatcher`].
///
/// Only the downstream call can fail; everything before it is a skip.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unable to deliver {channel} notification to {target}: {source}")]
    Downstream {
        channel: Channel,
        target: String,
        #[source]
        source: ClientError,
    },
}

impl DispatchError {
    #[must_use]
    pub const fn channel(&self) -> Channel {
        match self {
            Self::Downstream { channel, .. } => *channel,
        }
    }
}
