//! # Merge Symbols

use core::ops::Range;

/// A working symbol of the merge engine.
///
/// `span` is the byte range of the source text the symbol covers;
/// sentinels inserted by pre-tokenization cover an empty range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// The symbol text.
    pub text: String,

    /// Source byte range.
    pub span: Range<usize>,
}

impl Symbol {
    /// Create a new symbol.
    pub fn new<S: Into<String>>(
        text: S,
        span: Range<usize>,
    ) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }

    /// Split text into one symbol per code point.
    ///
    /// Spans are byte ranges of `text`, shifted by `offset`.
    pub fn split_chars(
        text: &str,
        offset: usize,
    ) -> Vec<Symbol> {
        text.char_indices()
            .map(|(idx, c)| {
                let start = offset + idx;
                Symbol::new(c, start..start + c.len_utf8())
            })
            .collect()
    }

    /// Append `other` to this symbol, widening the span.
    pub fn absorb(
        &mut self,
        other: Symbol,
    ) {
        self.text.push_str(&other.text);
        self.span = self.span.start.min(other.span.start)..self.span.end.max(other.span.end);
    }
}
