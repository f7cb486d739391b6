//! Text position utilities for byte offset and line:column conversions.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Byte offsets are **0-indexed**
//! - Columns count Unicode scalar values, not bytes

/// Convert a byte offset to 1-indexed line and column (Unicode-aware).
///
/// If `offset` exceeds the content length, returns the position at the end of
/// the content.
pub fn byte_offset_to_position_str(content: &str, offset: usize) -> (u32, u32) {
    let mut line = 1u32;
    let mut col = 1u32;

    for (i, ch) in content.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// Byte offset of the first character of a 1-indexed line.
///
/// Lines at or below 1 map to offset 0; lines past the end map to the content
/// length.
pub fn line_start_offset_str(content: &str, line: u32) -> usize {
    if line <= 1 {
        return 0;
    }
    let mut current = 1u32;
    for (i, ch) in content.char_indices() {
        if ch == '\n' {
            current += 1;
            if current == line {
                return i + 1;
            }
        }
    }
    content.len()
}

/// Count lines in content (a trailing newline does not start a new line).
pub fn line_count(content: &str) -> u32 {
    if content.is_empty() {
        return 0;
    }
    let newlines = content.matches('\n').count() as u32;
    if content.ends_with('\n') {
        newlines
    } else {
        newlines + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_to_position_first_line() {
        assert_eq!(byte_offset_to_position_str("def f():", 4), (1, 5));
    }

    #[test]
    fn offset_to_position_after_newline() {
        let content = "def f():\n    a = 1\n";
        assert_eq!(byte_offset_to_position_str(content, 13), (2, 5));
    }

    #[test]
    fn offset_to_position_counts_chars_not_bytes() {
        let content = "é = 1";
        // 'é' is two bytes; '=' starts at byte 3.
        assert_eq!(byte_offset_to_position_str(content, 3), (1, 3));
    }

    #[test]
    fn offset_past_end_clamps() {
        assert_eq!(byte_offset_to_position_str("ab", 99), (1, 3));
    }

    #[test]
    fn line_start_offsets() {
        let content = "a\nbb\nccc";
        assert_eq!(line_start_offset_str(content, 1), 0);
        assert_eq!(line_start_offset_str(content, 2), 2);
        assert_eq!(line_start_offset_str(content, 3), 5);
        assert_eq!(line_start_offset_str(content, 9), content.len());
    }

    #[test]
    fn line_count_handles_trailing_newline() {
        assert_eq!(line_count(""), 0);
        assert_eq!(line_count("a"), 1);
        assert_eq!(line_count("a\n"), 1);
        assert_eq!(line_count("a\nb"), 2);
    }
}
