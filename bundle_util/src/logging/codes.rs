//! Event codes and their classification
//!
//! Every error the tokenizer, the codec and the resolver can raise maps to one
//! registered code. Severity and recoverability are decided here and nowhere
//! else; the error types only name their code.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Short stable identifier carried by every log event, e.g. `E061`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// What the caller of a failed operation can do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Bad input for this call only; other calls are unaffected
    Continue,
    /// The inputs (limits, descriptors, streams) are broken; retrying the same call fails again
    Abort,
}

#[derive(Debug, Clone, Copy)]
pub struct CodeInfo {
    pub severity: Severity,
    pub recovery: Recovery,
    pub description: &'static str,
}

/// Delimited-string tokenizer
pub mod tokenizer {
    use super::Code;

    pub const MALFORMED_INPUT: Code = Code::new("E020");
    pub const VALUE_TOO_LONG: Code = Code::new("E021");
    pub const TOO_MANY_TOKENS: Code = Code::new("E022");

    /// Warning only: the remainder of the value becomes the last token
    pub const UNTERMINATED_QUOTE: Code = Code::new("W020");
}

/// Base64 codec
pub mod codec {
    use super::Code;

    pub const INVALID_LINE_LENGTH: Code = Code::new("E040");
    pub const SOURCE_IO_ERROR: Code = Code::new("E041");
}

/// Type resolution and type graph files
pub mod resolution {
    use super::Code;

    pub const TYPE_NOT_FOUND: Code = Code::new("E060");
    pub const MALFORMED_HIERARCHY: Code = Code::new("E061");
    pub const UNKNOWN_LOADER: Code = Code::new("E062");
    pub const UNKNOWN_TYPE: Code = Code::new("E063");
    pub const INVALID_GRAPH: Code = Code::new("E064");
    pub const TYPE_NAME_TOO_LONG: Code = Code::new("E065");
}

/// Completed operations, logged at info level
pub mod success {
    use super::Code;

    pub const LOGGING_INITIALIZED: Code = Code::new("I001");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const ENCODING_COMPLETE: Code = Code::new("I040");
    pub const TYPE_RESOLVED: Code = Code::new("I060");
    pub const GRAPH_LOADED: Code = Code::new("I061");
}

/// Every error and warning code the crate raises
pub const REGISTERED: [Code; 12] = [
    tokenizer::MALFORMED_INPUT,
    tokenizer::VALUE_TOO_LONG,
    tokenizer::TOO_MANY_TOKENS,
    tokenizer::UNTERMINATED_QUOTE,
    codec::INVALID_LINE_LENGTH,
    codec::SOURCE_IO_ERROR,
    resolution::TYPE_NOT_FOUND,
    resolution::MALFORMED_HIERARCHY,
    resolution::UNKNOWN_LOADER,
    resolution::UNKNOWN_TYPE,
    resolution::INVALID_GRAPH,
    resolution::TYPE_NAME_TOO_LONG,
];

static REGISTRY: OnceLock<HashMap<Code, CodeInfo>> = OnceLock::new();

fn registry() -> &'static HashMap<Code, CodeInfo> {
    use Recovery::{Abort, Continue};
    use Severity::{High, Low, Medium};

    REGISTRY.get_or_init(|| {
        [
            (tokenizer::MALFORMED_INPUT, Medium, Continue,
                "Quote character is also in the delimiter set"),
            (tokenizer::VALUE_TOO_LONG, High, Abort,
                "Header value exceeds tokenizer.max_value_length"),
            (tokenizer::TOO_MANY_TOKENS, High, Abort,
                "Header value splits into more than tokenizer.max_token_count tokens"),
            (tokenizer::UNTERMINATED_QUOTE, Low, Continue,
                "Quoted section not closed; remainder kept as last token"),
            (codec::INVALID_LINE_LENGTH, Medium, Continue,
                "Line length must be 0 or a multiple of 4"),
            (codec::SOURCE_IO_ERROR, High, Abort,
                "Reading the source or writing the sink failed"),
            (resolution::TYPE_NOT_FOUND, Low, Continue,
                "No loader reachable from the root can see the type"),
            (resolution::MALFORMED_HIERARCHY, High, Abort,
                "Type hierarchy is cyclic or exceeds the search bounds"),
            (resolution::UNKNOWN_LOADER, Medium, Abort,
                "Graph type refers to an undeclared loader"),
            (resolution::UNKNOWN_TYPE, Medium, Abort,
                "Graph type refers to an undeclared type"),
            (resolution::INVALID_GRAPH, Medium, Abort,
                "Type graph file is unreadable or not valid TOML"),
            (resolution::TYPE_NAME_TOO_LONG, Medium, Continue,
                "Type name exceeds resolution.max_type_name_length"),
        ]
        .into_iter()
        .map(|(code, severity, recovery, description)| {
            (code, CodeInfo { severity, recovery, description })
        })
        .collect()
    })
}

pub fn info(code: Code) -> Option<&'static CodeInfo> {
    registry().get(&code)
}

/// Unregistered codes count as `Medium`
pub fn severity(code: Code) -> Severity {
    info(code).map_or(Severity::Medium, |info| info.severity)
}

/// Unregistered codes count as recoverable
pub fn is_recoverable(code: Code) -> bool {
    info(code).map_or(true, |info| info.recovery == Recovery::Continue)
}

pub fn description(code: Code) -> &'static str {
    info(code).map_or("Unregistered code", |info| info.description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_raised_code_is_registered() {
        for code in REGISTERED {
            assert!(info(code).is_some(), "missing registry entry for {}", code);
        }
    }

    #[test]
    fn test_not_found_and_malformed_classify_differently() {
        let not_found = resolution::TYPE_NOT_FOUND;
        let malformed = resolution::MALFORMED_HIERARCHY;

        assert_eq!(severity(not_found), Severity::Low);
        assert!(is_recoverable(not_found));
        assert_eq!(severity(malformed), Severity::High);
        assert!(!is_recoverable(malformed));
    }

    #[test]
    fn test_unregistered_code_defaults() {
        let code = Code::new("X999");

        assert_eq!(severity(code), Severity::Medium);
        assert!(is_recoverable(code));
        assert_eq!(description(code), "Unregistered code");
        assert!(info(success::TYPE_RESOLVED).is_none());
    }
}
