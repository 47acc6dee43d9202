use crate::config::compile_time::tokenizer::{MAX_TOKEN_COUNT, MAX_VALUE_LENGTH};
use crate::logging::codes::{self, Severity};
use crate::utils::Position;

/// Errors raised while splitting a header value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizerError {
    /// The character is both the quote and a delimiter, so the state machine
    /// cannot decide what it means
    #[error("Malformed input: ambiguous character '{character}' at {position}")]
    MalformedInput { character: char, position: Position },

    #[error("Header value too long: {length} bytes (max {max})")]
    ValueTooLong { length: usize, max: usize },

    #[error("Too many tokens: {count} (max {max})")]
    TooManyTokens { count: usize, max: usize },
}

impl TokenizerError {
    pub(crate) fn value_too_long(length: usize) -> Self {
        TokenizerError::ValueTooLong {
            length,
            max: MAX_VALUE_LENGTH,
        }
    }

    pub(crate) fn too_many_tokens(count: usize) -> Self {
        TokenizerError::TooManyTokens {
            count,
            max: MAX_TOKEN_COUNT,
        }
    }

    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            TokenizerError::MalformedInput { .. } => codes::tokenizer::MALFORMED_INPUT,
            TokenizerError::ValueTooLong { .. } => codes::tokenizer::VALUE_TOO_LONG,
            TokenizerError::TooManyTokens { .. } => codes::tokenizer::TOO_MANY_TOKENS,
        }
    }

    pub fn severity(&self) -> Severity {
        codes::severity(self.error_code())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code())
    }

    /// Position of the offending character, when the error has one
    pub fn position(&self) -> Option<Position> {
        match self {
            TokenizerError::MalformedInput { position, .. } => Some(*position),
            _ => None,
        }
    }
}

pub type TokenizerResult<T> = Result<T, TokenizerError>;
