//! Error types
//!
//! `SimError` is returned from fallible public operations (backend startup,
//! config and course loading). `AssetError` never leaves the terrain loader:
//! a failed asset is logged and treated as absent.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// The rigid-body backend could not be brought up
    #[error("dynamics backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A course area with fewer than three vertices
    #[error("course area {id} has {vertices} vertices (need at least 3)")]
    InvalidPolygon { id: u32, vertices: usize },

    #[error("unknown ball model '{0}'")]
    UnknownBall(String),
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("timed out after {ms}ms loading {path}")]
    Timeout { path: PathBuf, ms: u64 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("loader task for {path} did not complete: {source}")]
    Join {
        path: PathBuf,
        #[source]
        source: tokio::task::JoinError,
    },
}
