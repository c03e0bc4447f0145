use thiserror::Error;

/// Engine error surfaced to callers. Every variant is detected synchronously,
/// before any device work is enqueued.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unsupported tensor shape: {message}")]
    Shape { message: String },

    #[error("kernel plan must contain one or two kernels, got {count}")]
    PlanCardinality { count: usize },

    #[error("only alpha=1 and beta=0 host scaling is supported, got alpha={alpha}, beta={beta}")]
    UnsupportedCoefficients { alpha: f32, beta: f32 },

    #[error("kernel build failed: {message}")]
    Build { message: String },

    #[error("engine execution failure: {message}")]
    Execution { message: String },
}

impl EngineError {
    pub fn shape(message: impl Into<String>) -> Self {
        EngineError::Shape {
            message: message.into(),
        }
    }

    pub fn build(message: impl Into<String>) -> Self {
        EngineError::Build {
            message: message.into(),
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        EngineError::Execution {
            message: message.into(),
        }
    }
}

/// Convenience alias for results returned by engine routines.
pub type EngineResult<T> = Result<T, EngineError>;
