//! Byte offset to line/column conversion for parser diagnostics.

/// Byte offsets at which each line starts (line 1 = offset 0).
#[derive(Debug, Clone)]
pub struct LineIndex {
    offsets: Vec<usize>,
}

impl LineIndex {
    /// Index the line starts of `content`.
    #[must_use]
    pub fn new(content: &str) -> Self {
        let mut offsets = vec![0usize];
        for (i, b) in content.bytes().enumerate() {
            if b == b'\n' {
                offsets.push(i + 1);
            }
        }
        Self { offsets }
    }

    /// Convert a byte offset into 1-based `(line, column)`.
    ///
    /// Columns count characters, not bytes, so multi-byte input reports the
    /// position a user sees in an editor.
    #[must_use]
    pub fn locate(&self, content: &str, offset: usize) -> (usize, usize) {
        let offset = offset.min(content.len());
        let line = match self.offsets.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i,
        };
        let line_start = self.offsets[line - 1];
        let column = content
            .get(line_start..offset)
            .map_or(offset - line_start, |s| s.chars().count())
            + 1;
        (line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_first_line() {
        let content = "abc\ndef";
        let index = LineIndex::new(content);
        assert_eq!(index.locate(content, 0), (1, 1));
        assert_eq!(index.locate(content, 2), (1, 3));
    }

    #[test]
    fn test_locate_after_newline() {
        let content = "abc\ndef\n";
        let index = LineIndex::new(content);
        assert_eq!(index.locate(content, 4), (2, 1));
        assert_eq!(index.locate(content, 6), (2, 3));
        assert_eq!(index.locate(content, 8), (3, 1));
    }

    #[test]
    fn test_locate_counts_characters() {
        let content = "\u{e9}\u{e9}x";
        let index = LineIndex::new(content);
        assert_eq!(index.locate(content, 4), (1, 3));
    }

    #[test]
    fn test_offset_past_end_is_clamped() {
        let content = "ab";
        let index = LineIndex::new(content);
        assert_eq!(index.locate(content, 99), (1, 3));
    }
}
