// Internal modules
pub mod codec;
pub mod config;
#[macro_use]
pub mod logging;
pub mod manifest;
pub mod naming;
pub mod resolution;
pub mod utils;

// Re-export key types for library consumers
pub use codec::{encode, encode_stream, Base64Encoder, CodecError};
pub use manifest::{parse_delimited, DelimitedTokenizer, TokenizerError};
pub use resolution::{resolve, ResolutionError, TypeLoader, TypeNode, TypeResolver};
