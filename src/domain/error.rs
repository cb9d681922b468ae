// Errors surfaced by the engine and the model builders

use super::value_objects::SolutionStatus;

/// Errors raised while building, solving or reading an optimization model
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptimizerError {
    /// Operation invoked out of lifecycle order
    #[error("Invalid state: {0}")]
    State(String),

    /// Malformed model: duplicate names, unknown handles, bad bounds
    #[error("Invalid model: {0}")]
    Model(String),

    /// Backend finished without an optimal solution
    #[error("Solve failed with status {status}: {message}")]
    Solve {
        status: SolutionStatus,
        message: String,
    },

    /// Backend reported optimal but the result breaks a hard contract
    #[error("Optimization rejected: {0}")]
    Optimization(String),

    #[error("Insufficient candidates: need at least {required}, got {available}")]
    InsufficientCandidates { required: usize, available: usize },
}

impl OptimizerError {
    pub fn state(message: impl Into<String>) -> Self {
        OptimizerError::State(message.into())
    }

    pub fn model(message: impl Into<String>) -> Self {
        OptimizerError::Model(message.into())
    }
}

pub type OptimizerResult<T> = std::result::Result<T, OptimizerError>;
