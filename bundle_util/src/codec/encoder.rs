//! Streaming Base64 encoder with optional CRLF line wrapping
//!
//! Output uses the standard alphabet with `=` padding. When wrapping is on, a
//! `\r\n` follows every `line_length` data characters and the stream ends with
//! a terminating `\r\n` (two if the last line was partial).

use super::error::{CodecError, CodecResult};
use crate::config::compile_time::codec::READ_BUFFER_SIZE;
use crate::config::runtime::{runtime_config, CodecPreferences};
use crate::logging::codes;
use crate::{log_error, log_success};
use serde::Serialize;
use std::io::{self, Read, Write};

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const PAD: u8 = b'=';
const LINE_BREAK: &[u8] = b"\r\n";

/// Counters for one encoding run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncodeSummary {
    pub bytes_read: u64,
    /// Alphabet and padding characters, line breaks excluded
    pub chars_written: u64,
    pub line_breaks: u64,
}

/// Push-based encoder writing into `sink` as bytes arrive.
///
/// Call [`Base64Encoder::finish`] once the input is exhausted; dropping the
/// encoder without it loses the final partial group and the padding.
pub struct Base64Encoder<W: Write> {
    sink: W,
    line_length: u32,
    accumulator: u32,
    bits: u32,
    column: u32,
    staging: Vec<u8>,
    summary: EncodeSummary,
}

impl<W: Write> Base64Encoder<W> {
    /// `line_length` of 0 disables wrapping; anything else must be a multiple of 4
    pub fn new(sink: W, line_length: u32) -> CodecResult<Self> {
        if line_length % 4 != 0 {
            let error = CodecError::InvalidConfiguration { line_length };
            log_error!(error.error_code(), "Rejected Base64 line length",
                "line_length" => line_length
            );
            return Err(error);
        }

        Ok(Self {
            sink,
            line_length,
            accumulator: 0,
            bits: 0,
            column: 0,
            staging: Vec::new(),
            summary: EncodeSummary::default(),
        })
    }

    pub fn line_length(&self) -> u32 {
        self.line_length
    }

    /// Counters so far; final once [`finish_with_summary`](Self::finish_with_summary) returns
    pub fn summary(&self) -> EncodeSummary {
        self.summary
    }

    /// Encode the next slice of input and hand the produced characters to the sink.
    ///
    /// If the sink fails, the encoder returns to its state before the call, so
    /// retrying the same chunk writes its characters once. Bytes the sink
    /// accepted before reporting the error cannot be taken back.
    pub fn encode_chunk(&mut self, bytes: &[u8]) -> CodecResult<()> {
        let checkpoint = (self.accumulator, self.bits, self.column, self.summary);
        self.staging.reserve(bytes.len() / 3 * 4 + 8);

        for &byte in bytes {
            self.accumulator = (self.accumulator << 8) | u32::from(byte);
            self.bits += 8;

            while self.bits >= 6 {
                self.bits -= 6;
                let index = (self.accumulator >> self.bits) & 0x3f;
                self.push_char(ALPHABET[index as usize]);
            }

            // Fewer than 6 bits remain; drop the consumed ones
            self.accumulator &= (1 << self.bits) - 1;
        }

        self.summary.bytes_read += bytes.len() as u64;

        if let Err(e) = self.flush_staging() {
            (self.accumulator, self.bits, self.column, self.summary) = checkpoint;
            return Err(e);
        }
        Ok(())
    }

    /// Flush the trailing bits, padding and line terminators and return the sink
    pub fn finish(self) -> CodecResult<W> {
        self.finish_with_summary().map(|(sink, _)| sink)
    }

    pub fn finish_with_summary(mut self) -> CodecResult<(W, EncodeSummary)> {
        match self.bits {
            2 => {
                self.push_char(ALPHABET[((self.accumulator << 4) & 0x3f) as usize]);
                self.push_padding(2);
            }
            4 => {
                self.push_char(ALPHABET[((self.accumulator << 2) & 0x3f) as usize]);
                self.push_padding(1);
            }
            _ => {}
        }
        self.accumulator = 0;
        self.bits = 0;

        if self.line_length > 0 {
            if self.column != 0 {
                self.push_line_break();
            }
            self.push_line_break();
        }

        self.flush_staging()?;
        self.sink.flush()?;

        Ok((self.sink, self.summary))
    }

    fn push_char(&mut self, ch: u8) {
        self.staging.push(ch);
        self.summary.chars_written += 1;
        self.column += 1;

        if self.line_length > 0 && self.column == self.line_length {
            self.push_line_break();
        }
    }

    /// Padding does not advance the column
    fn push_padding(&mut self, count: usize) {
        self.staging.extend(std::iter::repeat(PAD).take(count));
        self.summary.chars_written += count as u64;
    }

    fn push_line_break(&mut self) {
        self.staging.extend_from_slice(LINE_BREAK);
        self.summary.line_breaks += 1;
        self.column = 0;
    }

    /// Staging is emptied whether or not the sink accepts it
    fn flush_staging(&mut self) -> CodecResult<()> {
        if self.staging.is_empty() {
            return Ok(());
        }
        let written = self.sink.write_all(&self.staging);
        self.staging.clear();
        written.map_err(CodecError::from)
    }
}

impl<W: Write> Write for Base64Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.encode_chunk(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

/// Encode an in-memory byte slice
pub fn encode(bytes: &[u8], line_length: u32) -> CodecResult<String> {
    let mut encoder = Base64Encoder::new(Vec::with_capacity(bytes.len() / 3 * 4 + 4), line_length)?;
    encoder.encode_chunk(bytes)?;
    let output = encoder.finish()?;

    // Output is pure ASCII
    Ok(output.into_iter().map(char::from).collect())
}

/// Encode the UTF-8 bytes of `s` without wrapping
pub fn encode_str(s: &str) -> CodecResult<String> {
    encode(s.as_bytes(), 0)
}

/// Encode `source` into `sink`, reading in bounded chunks
pub fn encode_stream<R: Read, W: Write>(
    source: R,
    sink: W,
    line_length: u32,
) -> CodecResult<EncodeSummary> {
    encode_stream_with_preferences(source, sink, line_length, &runtime_config().codec)
}

pub fn encode_stream_with_preferences<R: Read, W: Write>(
    mut source: R,
    sink: W,
    line_length: u32,
    preferences: &CodecPreferences,
) -> CodecResult<EncodeSummary> {
    let mut encoder = Base64Encoder::new(sink, line_length)?;
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];

    loop {
        let read = match source.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log_error!(codes::codec::SOURCE_IO_ERROR, "Reading Base64 source failed",
                    "error" => e,
                    "bytes_read" => encoder.summary().bytes_read
                );
                return Err(e.into());
            }
        };
        encoder.encode_chunk(&buffer[..read])?;
    }

    let (_, summary) = encoder.finish_with_summary()?;

    if preferences.log_encode_summary {
        log_success!(codes::success::ENCODING_COMPLETE, "Base64 stream encoded",
            "bytes_read" => summary.bytes_read,
            "chars_written" => summary.chars_written,
            "line_breaks" => summary.line_breaks,
            "line_length" => line_length
        );
    }

    Ok(summary)
}
