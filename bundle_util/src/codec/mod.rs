//! Base64 encoding for bundle payloads and credentials
//!
//! Strictly an encoder. Any standard decoder reads the output once line
//! breaks are stripped.

pub mod encoder;
pub mod error;

pub use encoder::{
    encode, encode_str, encode_stream, encode_stream_with_preferences, Base64Encoder,
    EncodeSummary,
};
pub use error::{CodecError, CodecResult};

/// Line length used for MIME style output
pub const MIME_LINE_LENGTH: u32 = 76;
