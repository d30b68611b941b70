use thiserror::Error;

/// Error type for invalid flux operations.
#[derive(Error, Debug)]
pub enum SeafluxError {
    #[error("{0}")]
    Error(String),
    #[error("Input `{name}` has shape {found:?} which cannot be broadcast to {expected:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    #[error("Input `{name}` is labelled {found:?} but other inputs are labelled {expected:?}")]
    LabelMismatch {
        name: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("Input `{name}` has `{dim}` coordinates that differ from the other inputs")]
    CoordinateMismatch { name: String, dim: String },
    #[error("Flux field carries spatial labels but no area provider is configured")]
    MissingAreaProvider,
    #[error("Field has no coordinate values for dimension `{0}`")]
    MissingCoordinate(String),
    #[error("Input `{name}` value {value} is outside the allowable range [{min}, {max}]")]
    ValueRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<toml::de::Error> for SeafluxError {
    fn from(e: toml::de::Error) -> Self {
        SeafluxError::InvalidConfig(e.to_string())
    }
}

/// Convenience type for `Result<T, SeafluxError>`.
pub type SeafluxResult<T> = Result<T, SeafluxError>;
