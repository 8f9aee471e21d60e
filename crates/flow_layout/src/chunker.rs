//! Splits text into words, space runs and line breaks.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    /// A run of identical space or tab characters
    Space,
    /// `"\r\n"`, `"\r"` or `"\n"`
    LineBreak,
    Word,
}

/// Byte range `[start, end)` of one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub kind: ChunkKind,
    pub start: usize,
    pub end: usize,
}

impl Chunk {
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Iterator over the chunks of a string. Consecutive chunks are contiguous
/// and together cover the whole input.
#[derive(Debug, Clone)]
pub struct Chunker<'text> {
    text: &'text str,
    pos: usize,
}

impl<'text> Chunker<'text> {
    pub const fn new(text: &'text str) -> Self {
        Self { text, pos: 0 }
    }
}

const fn ends_word(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}

impl Iterator for Chunker<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        let bytes = self.text.as_bytes();
        let start = self.pos;
        let first = *bytes.get(start)?;
        let rest = bytes.get(start..).unwrap_or_default();
        let (kind, len) = match first {
            b' ' | b'\t' => (
                ChunkKind::Space,
                rest.iter().take_while(|&&byte| byte == first).count(),
            ),
            b'\r' if rest.get(1) == Some(&b'\n') => (ChunkKind::LineBreak, 2),
            b'\r' | b'\n' => (ChunkKind::LineBreak, 1),
            _ => (
                ChunkKind::Word,
                rest.iter().take_while(|&&byte| !ends_word(byte)).count(),
            ),
        };
        self.pos = start + len;
        Some(Chunk { kind, start, end: self.pos })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kinds(text: &str) -> Vec<(ChunkKind, usize, usize)> {
        Chunker::new(text)
            .map(|chunk| (chunk.kind, chunk.start, chunk.end))
            .collect()
    }

    /// Words and a single space are separate chunks.
    ///
    /// # Panics
    /// Panics if the chunks do not match.
    #[test]
    fn words_and_space() {
        assert_eq!(
            kinds("ab cd"),
            vec![(ChunkKind::Word, 0, 2), (ChunkKind::Space, 2, 3), (ChunkKind::Word, 3, 5)]
        );
    }

    /// Identical whitespace merges, mixed whitespace does not.
    ///
    /// # Panics
    /// Panics if whitespace runs are split or merged wrongly.
    #[test]
    fn whitespace_runs() {
        assert_eq!(
            kinds("a   \t\tb"),
            vec![
                (ChunkKind::Word, 0, 1),
                (ChunkKind::Space, 1, 4),
                (ChunkKind::Space, 4, 6),
                (ChunkKind::Word, 6, 7),
            ]
        );
    }

    /// `"\r\n"` is one two-byte break, lone `\r` and `\n` are one byte each.
    ///
    /// # Panics
    /// Panics if line breaks have the wrong extent.
    #[test]
    fn line_breaks() {
        assert_eq!(
            kinds("a\r\nb\rc\n\n"),
            vec![
                (ChunkKind::Word, 0, 1),
                (ChunkKind::LineBreak, 1, 3),
                (ChunkKind::Word, 3, 4),
                (ChunkKind::LineBreak, 4, 5),
                (ChunkKind::Word, 5, 6),
                (ChunkKind::LineBreak, 6, 7),
                (ChunkKind::LineBreak, 7, 8),
            ]
        );
        assert!(kinds("").is_empty());
    }

    /// Multi-byte characters stay inside their word.
    ///
    /// # Panics
    /// Panics if a word boundary splits a character.
    #[test]
    fn utf8_words() {
        let text = "héllo wörld";
        for chunk in Chunker::new(text) {
            assert!(text.is_char_boundary(chunk.start));
            assert!(text.is_char_boundary(chunk.end));
        }
        assert_eq!(Chunker::new(text).count(), 3);
    }

    proptest! {
        /// Chunks are non-empty, contiguous and cover the input.
        #[test]
        fn chunks_cover_input(text in "[a-c \t\r\n]{0,40}") {
            let mut expected_start = 0;
            for chunk in Chunker::new(&text) {
                prop_assert_eq!(chunk.start, expected_start);
                prop_assert!(!chunk.is_empty());
                expected_start = chunk.end;
            }
            prop_assert_eq!(expected_start, text.len());
        }
    }
}
