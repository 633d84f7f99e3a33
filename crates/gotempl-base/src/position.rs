use serde::Serialize;

/// A source span recorded by the parser: the exact matched text plus its byte
/// offset into the original source. Line and column are 1-based and refer to
/// the first byte of `text`.
///
/// Invariant: `end_offset() == offset + text.len()`. The text is never
/// normalized or trimmed, so spans can be mapped back onto the source
/// byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RawPosition {
    pub text: String,
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

impl RawPosition {
    pub fn new(text: impl Into<String>, offset: usize, line: u32, column: u32) -> Self {
        Self {
            text: text.into(),
            offset,
            line,
            column,
        }
    }

    pub fn end_offset(&self) -> usize {
        self.offset + self.text.len()
    }

    pub fn end_line(&self) -> u32 {
        self.line + self.text.bytes().filter(|b| *b == b'\n').count() as u32
    }

    pub fn end_column(&self) -> u32 {
        match self.text.rfind('\n') {
            Some(index) => self.text[index + 1..].chars().count() as u32 + 1,
            None => self.column + self.text.chars().count() as u32,
        }
    }

    /// Point query: does this span cover the given byte offset?
    ///
    /// The end offset is included so a cursor sitting just after the last
    /// character of a token still hits it, which is how editors position
    /// hovers at word boundaries.
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.offset <= offset && offset <= self.end_offset()
    }

    pub fn overlaps(&self, other: &RawPosition) -> bool {
        self.offset < other.end_offset() && other.offset < self.end_offset()
    }
}

impl std::fmt::Display for RawPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
