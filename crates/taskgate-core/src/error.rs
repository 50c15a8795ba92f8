//! Application-level errors (importer, uploads, gateway).
//!
//! Engine failures stay `EngineError` and are wrapped, never rewritten.

use thiserror::Error;

use crate::domain::EngineError;
use crate::ports::ArtifactSourceError;

#[derive(Debug, Error)]
pub enum ImportError {
    /// The artifact source could not be read at all.
    #[error("artifact source: {0}")]
    Source(#[from] ArtifactSourceError),
}

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("invalid artifact '{name}': {reason}")]
    InvalidArtifact { name: String, reason: String },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("user '{user_id}' is not allowed to {operation}")]
    Forbidden {
        user_id: String,
        operation: &'static str,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Deployment(#[from] DeploymentError),
}
