use thiserror::Error;

/// Why a parameter source could not supply its floats.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadFailure {
    /// The source could not be opened or failed mid-read.
    #[error("{0}")]
    Io(String),

    #[error("yielded {found} floats, expected {expected}")]
    ShortRead { expected: usize, found: usize },
}

/// Everything that can abort a single layer invocation.
#[derive(Debug, Error)]
pub enum ConvError {
    #[error("could not load parameter source `{source_id}`: {reason}")]
    ParameterLoad { source_id: String, reason: LoadFailure },

    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("batch-norm variance + epsilon is negative ({value}) for channel {channel}")]
    Numeric { channel: usize, value: f32 },

    #[error("index ({z}, {y}, {x}) out of range for blob {shape}")]
    IndexOutOfRange {
        z: usize,
        y: usize,
        x: usize,
        shape: String,
    },

    #[error("malformed layer configuration: {0}")]
    Config(String),
}

impl ConvError {
    pub(crate) fn load(source_id: &str, reason: LoadFailure) -> Self {
        ConvError::ParameterLoad {
            source_id: source_id.to_string(),
            reason,
        }
    }

    pub(crate) fn io(source_id: &str, e: impl ToString) -> Self {
        ConvError::load(source_id, LoadFailure::Io(e.to_string()))
    }
}

pub type Result<T> = std::result::Result<T, ConvError>;
