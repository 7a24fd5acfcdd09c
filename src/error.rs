use thiserror::Error;

/// Failures raised while running the engine on an already validated request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("simulation cancelled")]
    Cancelled,

    #[error("invalid simulation parameter: {0}")]
    InvalidParameter(String),

    #[error("simulation produced no scores")]
    EmptyDistribution,
}
