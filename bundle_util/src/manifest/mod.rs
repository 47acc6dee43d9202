//! Manifest header value tokenization
//!

pub mod error;
pub mod tokenizer;

use crate::config::runtime::TokenizerPreferences;

pub use error::{TokenizerError, TokenizerResult};
pub use tokenizer::{DelimitedTokenizer, Expecting, TokenizerMetrics, QUOTE};

/// Separator between clauses of a header such as `Export-Package`
pub const CLAUSE_DELIMITER: &str = ",";

/// Split a header value on every character of `delimiters`, honoring quotes
pub fn parse_delimited(value: &str, delimiters: &str) -> TokenizerResult<Vec<String>> {
    DelimitedTokenizer::new().tokenize(value, delimiters)
}

/// Same as [`parse_delimited`] with explicit runtime preferences
pub fn parse_delimited_with_preferences(
    value: &str,
    delimiters: &str,
    preferences: TokenizerPreferences,
) -> TokenizerResult<Vec<String>> {
    DelimitedTokenizer::with_preferences(preferences).tokenize(value, delimiters)
}

/// Split a header value into its comma separated clauses
pub fn parse_header_clauses(value: &str) -> TokenizerResult<Vec<String>> {
    parse_delimited(value, CLAUSE_DELIMITER)
}
