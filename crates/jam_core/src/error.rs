use thiserror::Error;

#[derive(Error, Debug)]
pub enum LevelError {
    #[error("Invalid level definition: {reason}")]
    InvalidLevelDefinition { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl LevelError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        LevelError::InvalidLevelDefinition {
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("cell ({row}, {col}) is outside the grid")]
    OutOfBounds { row: i32, col: i32 },
}

pub type LevelResult<T> = Result<T, LevelError>;
