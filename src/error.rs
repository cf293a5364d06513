//! Error types shared by the API client and the command dispatcher.

use std::path::PathBuf;

use thiserror::Error;

use crate::api::Failure;

/// Fatal client errors. Ordinary API failures (4xx/5xx) are not errors at
/// this level; they come back as [`Failure`] inside a reply.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Auth(String),

    #[error("Invalid API URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read asset {}: {}", .path.display(), .source)]
    AssetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Asset path {} has no file name", .0.display())]
    InvalidAssetPath(PathBuf),
}

/// Errors that end a command with a non-zero exit status.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("no GitHub token given (use --token, GITHUB_TOKEN or the token file)")]
    MissingToken,

    #[error("invalid repo '{0}'")]
    InvalidRepository(String),

    #[error("release '{0}' not found.")]
    ReleaseNotFound(String),

    #[error("failed to {} ({}):\n{}", .action, .failure.status, .failure.payload)]
    Api {
        action: &'static str,
        failure: Failure,
    },

    #[error("asset {} is not a readable file", .0.display())]
    MissingAsset(PathBuf),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
