//! Quote-aware delimited-string tokenizer
//!
//! Splits header values such as `Import-Package` on a delimiter set while
//! leaving delimiters inside double quotes alone. Quotes stay in the tokens;
//! every token is trimmed of surrounding whitespace.

use super::error::{TokenizerError, TokenizerResult};
use crate::config::compile_time::tokenizer::*;
use crate::config::runtime::{runtime_config, TokenizerPreferences};
use crate::logging::codes;
use crate::utils::Position;
use crate::{log_debug, log_error, log_success, log_warning};

/// The only quote character recognized in header values
pub const QUOTE: char = '"';

/// What the scanner accepts next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expecting {
    /// Between tokens: ordinary chars, a delimiter or an opening quote
    CharDelimiterOrQuote,
    /// Inside a quoted section: ordinary chars (delimiters included) or the closing quote
    CharOrEndQuote,
}

#[derive(Debug, Default, Clone)]
pub struct TokenizerMetrics {
    pub tokens_emitted: usize,
    pub empty_tokens: usize,
    pub quoted_tokens: usize,
    pub max_token_length: usize,
}

impl TokenizerMetrics {
    pub(crate) fn record_token(&mut self, token: &str, preferences: &TokenizerPreferences) {
        self.tokens_emitted += 1;

        if !preferences.collect_metrics {
            return;
        }

        if token.is_empty() {
            self.empty_tokens += 1;
        }
        if token.contains(QUOTE) {
            self.quoted_tokens += 1;
        }
        self.max_token_length = self.max_token_length.max(token.len());

        if preferences.log_token_details {
            log_debug!("Token emitted",
                "index" => self.tokens_emitted - 1,
                "token" => token,
                "length" => token.len()
            );
        }
    }
}

/// Tokenizer carrying preferences and the metrics of its last run
pub struct DelimitedTokenizer {
    metrics: TokenizerMetrics,
    preferences: TokenizerPreferences,
}

impl DelimitedTokenizer {
    pub fn new() -> Self {
        Self {
            metrics: TokenizerMetrics::default(),
            preferences: runtime_config().tokenizer.clone(),
        }
    }

    pub fn with_preferences(preferences: TokenizerPreferences) -> Self {
        Self {
            metrics: TokenizerMetrics::default(),
            preferences,
        }
    }

    /// Split `value` on any character of `delimiters`.
    ///
    /// Adjacent delimiters produce an empty token; a trailing delimiter does
    /// not. An unterminated quote swallows the rest of the value into the last
    /// token. Fails without returning any tokens if the value is over the
    /// configured limits or if `"` is itself used as a delimiter and occurs in
    /// the value.
    pub fn tokenize(&mut self, value: &str, delimiters: &str) -> TokenizerResult<Vec<String>> {
        self.metrics = TokenizerMetrics::default();

        if value.len() > MAX_VALUE_LENGTH {
            let error = TokenizerError::value_too_long(value.len());
            log_error!(error.error_code(), "Header value exceeds length limit",
                "length" => value.len(),
                "limit" => MAX_VALUE_LENGTH
            );
            return Err(error);
        }

        let quote_is_delimiter = delimiters.contains(QUOTE);
        let mut tokens: Vec<String> = Vec::new();
        let mut buffer = String::new();
        let mut expecting = Expecting::CharDelimiterOrQuote;
        let mut position = Position::start();

        for ch in value.chars() {
            let is_delimiter = delimiters.contains(ch);
            let is_quote = ch == QUOTE;

            if is_quote && quote_is_delimiter {
                return Err(self.malformed(ch, position));
            }

            match expecting {
                Expecting::CharDelimiterOrQuote if is_delimiter => {
                    self.emit(&mut tokens, &buffer)?;
                    buffer.clear();
                }
                Expecting::CharDelimiterOrQuote if is_quote => {
                    buffer.push(ch);
                    expecting = Expecting::CharOrEndQuote;
                }
                Expecting::CharOrEndQuote if is_quote => {
                    buffer.push(ch);
                    expecting = Expecting::CharDelimiterOrQuote;
                }
                Expecting::CharDelimiterOrQuote | Expecting::CharOrEndQuote => buffer.push(ch),
            }

            position = position.advance(ch);
        }

        if expecting == Expecting::CharOrEndQuote {
            log_warning!(code = codes::tokenizer::UNTERMINATED_QUOTE,
                "Quoted section not closed, keeping remainder as last token",
                "value_length" => value.len()
            );
        }

        if !buffer.is_empty() {
            self.emit(&mut tokens, &buffer)?;
        }

        log_success!(codes::success::TOKENIZATION_COMPLETE, "Header value tokenized",
            "tokens" => tokens.len(),
            "quoted_tokens" => self.metrics.quoted_tokens,
            "value_length" => value.len()
        );

        Ok(tokens)
    }

    pub fn metrics(&self) -> &TokenizerMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &TokenizerPreferences {
        &self.preferences
    }

    fn emit(&mut self, tokens: &mut Vec<String>, buffer: &str) -> TokenizerResult<()> {
        if tokens.len() >= MAX_TOKEN_COUNT {
            let error = TokenizerError::too_many_tokens(tokens.len() + 1);
            log_error!(error.error_code(), "Token limit exceeded",
                "limit" => MAX_TOKEN_COUNT
            );
            return Err(error);
        }

        let token = buffer.trim().to_string();
        self.metrics.record_token(&token, &self.preferences);
        tokens.push(token);
        Ok(())
    }

    fn malformed(&self, character: char, position: Position) -> TokenizerError {
        let error = TokenizerError::MalformedInput {
            character,
            position,
        };

        if self.preferences.include_position_in_errors {
            log_error!(error.error_code(), "Quote character used as delimiter",
                position = position,
                "character" => character
            );
        } else {
            log_error!(error.error_code(), "Quote character used as delimiter",
                "character" => character
            );
        }

        error
    }
}

impl Default for DelimitedTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn tokenize(value: &str, delimiters: &str) -> Vec<String> {
        crate::logging::init_test_logging();
        DelimitedTokenizer::new().tokenize(value, delimiters).unwrap()
    }

    #[test]
    fn test_simple_split() {
        assert_eq!(tokenize("a,b,c", ","), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_quoted_delimiter_is_not_a_split_point() {
        assert_eq!(tokenize("a,\"b,c\",d", ","), vec!["a", "\"b,c\"", "d"]);
    }

    #[test]
    fn test_empty_value() {
        assert!(tokenize("", ",").is_empty());
    }

    #[test]
    fn test_tokens_are_trimmed() {
        assert_eq!(tokenize("  a  ,  b  ", ","), vec!["a", "b"]);
        assert_eq!(tokenize(" a b , c ", ","), vec!["a b", "c"]);
    }

    #[test]
    fn test_adjacent_and_trailing_delimiters() {
        assert_eq!(tokenize("a,,b", ","), vec!["a", "", "b"]);
        assert_eq!(tokenize(",a", ","), vec!["", "a"]);
        assert_eq!(tokenize("a,", ","), vec!["a"]);
        // A whitespace-only remainder is still a non-empty buffer
        assert_eq!(tokenize("a, ", ","), vec!["a", ""]);
    }

    #[test]
    fn test_multiple_delimiters() {
        assert_eq!(
            tokenize("org.foo; version=1.0, org.bar", ",;"),
            vec!["org.foo", "version=1.0", "org.bar"]
        );
    }

    #[test]
    fn test_text_after_closing_quote_joins_token() {
        assert_eq!(
            tokenize("version=\"[1.0,2.0)\";resolution:=optional", ";"),
            vec!["version=\"[1.0,2.0)\"", "resolution:=optional"]
        );
        assert_eq!(tokenize("x\"a,b\"y,z", ","), vec!["x\"a,b\"y", "z"]);
    }

    #[test]
    fn test_unterminated_quote_keeps_remainder() {
        assert_eq!(tokenize("a,\"b,c", ","), vec!["a", "\"b,c"]);
    }

    #[test]
    fn test_no_delimiters_yields_whole_value() {
        assert_eq!(tokenize("  a,b  ", ""), vec!["a,b"]);
    }

    #[test]
    fn test_quote_as_delimiter_is_malformed() {
        crate::logging::init_test_logging();
        let result = DelimitedTokenizer::new().tokenize("ab,c\"d", ",\"");

        assert_matches!(
            result,
            Err(TokenizerError::MalformedInput { character: '"', position })
                if position == Position::new(4, 1, 5)
        );
    }

    #[test]
    fn test_quote_as_delimiter_without_quotes_in_value() {
        assert_eq!(tokenize("a,b", ",\""), vec!["a", "b"]);
    }

    #[test]
    fn test_value_too_long() {
        crate::logging::init_test_logging();
        let value = "a".repeat(MAX_VALUE_LENGTH + 1);
        let result = DelimitedTokenizer::new().tokenize(&value, ",");

        assert_matches!(
            result,
            Err(TokenizerError::ValueTooLong { length, max })
                if length == MAX_VALUE_LENGTH + 1 && max == MAX_VALUE_LENGTH
        );
    }

    #[test]
    fn test_too_many_tokens() {
        crate::logging::init_test_logging();
        let value = ",".repeat(MAX_TOKEN_COUNT + 1);
        let result = DelimitedTokenizer::new().tokenize(&value, ",");

        assert_matches!(
            result,
            Err(TokenizerError::TooManyTokens { count, max })
                if count == MAX_TOKEN_COUNT + 1 && max == MAX_TOKEN_COUNT
        );
    }

    #[test]
    fn test_unterminated_quote_logs_warning() {
        let logger = crate::logging::init_test_logging();
        let value = format!("head,\"{}", "q".repeat(4321));

        let tokens = tokenize(&value, ",");
        assert_eq!(tokens.len(), 2);

        let length = value.len().to_string();
        let warning = logger
            .events_with_code(codes::tokenizer::UNTERMINATED_QUOTE)
            .into_iter()
            .find(|e| e.get("value_length") == Some(length.as_str()))
            .expect("unterminated quote warning recorded");
        assert_eq!(warning.level, crate::logging::LogLevel::Warning);
    }

    #[test]
    fn test_round_trip_without_quotes() {
        let inputs = ["a,b,c", "one, two ,three", "x,,y", "single", " , a"];

        for input in inputs {
            let first = tokenize(input, ",");
            let rejoined = first.join(",");
            assert_eq!(tokenize(&rejoined, ","), first, "input: {input:?}");
        }
    }

    #[test]
    fn test_deterministic() {
        let value = "a;\"b;c\"; d";
        assert_eq!(tokenize(value, ";"), tokenize(value, ";"));
    }

    #[test]
    fn test_metrics() {
        crate::logging::init_test_logging();
        let mut tokenizer = DelimitedTokenizer::with_preferences(TokenizerPreferences {
            log_token_details: false,
            collect_metrics: true,
            include_position_in_errors: true,
        });

        tokenizer.tokenize("a,\"bb,cc\",,dddd", ",").unwrap();

        let metrics = tokenizer.metrics();
        assert_eq!(metrics.tokens_emitted, 4);
        assert_eq!(metrics.quoted_tokens, 1);
        assert_eq!(metrics.empty_tokens, 1);
        assert_eq!(metrics.max_token_length, 7);
    }

    #[test]
    fn test_multibyte_positions() {
        crate::logging::init_test_logging();
        let result = DelimitedTokenizer::new().tokenize("é,\"", ",\"");

        assert_matches!(
            result,
            Err(TokenizerError::MalformedInput { position, .. })
                if position == Position::new(3, 1, 3)
        );
    }
}
