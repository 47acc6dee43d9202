//! Shared helper types used by the tokenizer, the logging events and the CLI.

pub mod span;

pub use span::{Position, SourceMap};
