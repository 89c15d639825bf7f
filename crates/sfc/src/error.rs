use crate::descriptor::BlockKind;
use compiler::error::CompilationError;
use compiler::SourceLocation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SfcError {
    /// Malformed component source, or a template that fails to compile.
    #[error("{message}")]
    Parse {
        message: String,
        location: SourceLocation,
    },
    /// Options that cannot work together.
    #[error("{0}")]
    Config(String),
    #[error("no <{kind}> block matches {selector}")]
    NotFound { kind: BlockKind, selector: String },
    #[error("invalid loader options: {0}")]
    Options(#[from] serde_json::Error),
}

impl SfcError {
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            SfcError::Parse { location, .. } => Some(*location),
            _ => None,
        }
    }
}

impl From<CompilationError> for SfcError {
    fn from(err: CompilationError) -> Self {
        SfcError::Parse {
            message: err.to_string(),
            location: err.location,
        }
    }
}

pub type SfcResult<T> = Result<T, SfcError>;
