//! Source location tracking for header values
//!
//! Manifest header values may span several lines once continuation lines are
//! joined, so positions carry line and column alongside the byte offset.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based, counted in chars)
    pub column: u32,
}

impl Position {
    /// Create a new position
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Create the starting position (offset 0, line 1, column 1)
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Advance position past one character
    pub fn advance(self, ch: char) -> Self {
        match ch {
            '\n' => Self {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            },
            _ => Self {
                offset: self.offset + ch.len_utf8(),
                line: self.line,
                column: self.column + 1,
            },
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Line index over a source string, used to render positions with context
#[derive(Debug, Clone)]
pub struct SourceMap<'a> {
    source: &'a str,
    /// Byte offsets of line starts
    line_starts: Vec<usize>,
}

impl<'a> SourceMap<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        for (offset, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            source,
            line_starts,
        }
    }

    /// Get the line and column for a byte offset
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i - 1);

        let line_start = self.line_starts[line];
        let column = self.source[line_start..offset].chars().count();

        Position::new(offset, (line + 1) as u32, (column + 1) as u32)
    }

    /// Get a line of text by line number (1-based)
    pub fn get_line(&self, line_num: u32) -> Option<&'a str> {
        if line_num == 0 {
            return None;
        }

        let line_idx = (line_num - 1) as usize;
        let start = *self.line_starts.get(line_idx)?;
        let end = match self.line_starts.get(line_idx + 1) {
            Some(next) => next - 1,
            None => self.source.len(),
        };

        Some(self.source[start..end].trim_end_matches('\r'))
    }

    /// Format an error message with a caret under the offending column
    pub fn format_error(&self, position: Position, message: &str) -> String {
        let mut result = String::new();

        result.push_str(&format!("Error: {}\n", message));
        result.push_str(&format!("  --> {}\n", position));

        if let Some(line) = self.get_line(position.line) {
            let line_num_str = position.line.to_string();
            let padding = " ".repeat(line_num_str.len());

            result.push_str(&format!("   {} |\n", padding));
            result.push_str(&format!("{} | {}\n", line_num_str, line));
            result.push_str(&format!(
                "   {} | {}^\n",
                padding,
                " ".repeat(position.column.saturating_sub(1) as usize)
            ));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advance() {
        let pos = Position::start().advance('a').advance('é');
        assert_eq!(pos, Position::new(3, 1, 3));

        let pos = pos.advance('\n');
        assert_eq!(pos, Position::new(4, 2, 1));
    }

    #[test]
    fn test_position_at_offsets() {
        let map = SourceMap::new("org.osgi.framework,\n org.osgi.util");
        assert_eq!(map.position_at(0), Position::new(0, 1, 1));
        assert_eq!(map.position_at(18), Position::new(18, 1, 19));
        assert_eq!(map.position_at(21), Position::new(21, 2, 2));
    }

    #[test]
    fn test_format_error_points_at_column() {
        let map = SourceMap::new("a,b\"c");
        let rendered = map.format_error(Position::new(3, 1, 4), "Ambiguous quote");

        assert!(rendered.contains("Error: Ambiguous quote"));
        assert!(rendered.contains("--> 1:4"));
        assert!(rendered.contains("1 | a,b\"c"));
        assert!(rendered.contains("|    ^"));
    }

    #[test]
    fn test_get_line_out_of_range() {
        let map = SourceMap::new("one\ntwo");
        assert_eq!(map.get_line(2), Some("two"));
        assert_eq!(map.get_line(0), None);
        assert_eq!(map.get_line(3), None);
    }
}
