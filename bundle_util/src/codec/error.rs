use crate::logging::codes::{self, Severity};
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Invalid line length {line_length}: must be 0 or a multiple of 4")]
    InvalidConfiguration { line_length: u32 },

    /// Failure reading the source or writing the sink, passed through as is
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CodecError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            CodecError::InvalidConfiguration { .. } => codes::codec::INVALID_LINE_LENGTH,
            CodecError::Io(_) => codes::codec::SOURCE_IO_ERROR,
        }
    }

    pub fn severity(&self) -> Severity {
        codes::severity(self.error_code())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code())
    }
}

impl From<CodecError> for io::Error {
    fn from(error: CodecError) -> Self {
        match error {
            CodecError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidInput, other),
        }
    }
}

pub type CodecResult<T> = Result<T, CodecError>;
