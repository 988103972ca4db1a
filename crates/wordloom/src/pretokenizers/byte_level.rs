//! # Byte-Level Pre-Tokenizer

use crate::pretokenizers::Symbol;

/// Sentinel inserted before the first letter of each word (``Ġ``).
pub const WORD_START_SENTINEL: char = '\u{0120}';

/// Sentinel replacing each literal newline (``Ċ``).
pub const NEWLINE_SENTINEL: char = '\u{010A}';

/// Byte-level pre-tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteLevelPreTokenizer {
    /// Prepend one space to the input before marking.
    pub add_prefix_space: bool,
}

impl ByteLevelPreTokenizer {
    /// Create a new pre-tokenizer.
    pub fn new(add_prefix_space: bool) -> Self {
        Self { add_prefix_space }
    }

    /// Mark word starts and newlines; see [`pretokenize`].
    pub fn pretokenize(
        &self,
        text: &str,
    ) -> String {
        pretokenize(text, self.add_prefix_space)
    }

    /// Mark `text` into single code point merge symbols.
    ///
    /// ## Arguments
    /// * `text` - the segment to mark.
    /// * `offset` - the byte offset of `text` within the full input.
    /// * `add_prefix_space` - overrides the configured value for this segment.
    pub fn pretokenize_symbols(
        &self,
        text: &str,
        offset: usize,
        add_prefix_space: bool,
    ) -> Vec<Symbol> {
        let mut symbols = Vec::with_capacity(text.len() + text.len() / 4 + 1);
        if add_prefix_space {
            mark_char(&mut symbols, None, ' ', offset..offset);
        }

        let mut prev = add_prefix_space.then_some(' ');
        for (idx, c) in text.char_indices() {
            let start = offset + idx;
            mark_char(&mut symbols, prev, c, start..start + c.len_utf8());
            prev = Some(c);
        }
        symbols
    }
}

fn mark_char(
    symbols: &mut Vec<Symbol>,
    prev: Option<char>,
    c: char,
    span: core::ops::Range<usize>,
) {
    if c.is_alphabetic() && !prev.is_some_and(char::is_alphabetic) {
        symbols.push(Symbol::new(WORD_START_SENTINEL, span.start..span.start));
    }
    if c == '\n' {
        symbols.push(Symbol::new(NEWLINE_SENTINEL, span));
    } else {
        symbols.push(Symbol::new(c, span));
    }
}

/// Mark word starts and newlines with sentinels.
///
/// * With `add_prefix_space`, one space is prepended first.
/// * [`WORD_START_SENTINEL`] is inserted before every letter
///   which does not follow another letter.
/// * Every ``'\n'`` is replaced by [`NEWLINE_SENTINEL`].
/// * Everything else passes through.
pub fn pretokenize(
    text: &str,
    add_prefix_space: bool,
) -> String {
    ByteLevelPreTokenizer::new(add_prefix_space)
        .pretokenize_symbols(text, 0, add_prefix_space)
        .into_iter()
        .map(|s| s.text)
        .collect()
}

/// Substitute the sentinels back to display text.
///
/// [`WORD_START_SENTINEL`] becomes a space, [`NEWLINE_SENTINEL`] a newline.
pub fn restore_sentinels(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            WORD_START_SENTINEL => ' ',
            NEWLINE_SENTINEL => '\n',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_word_starts() {
        assert_eq!(pretokenize("ab", false), "Ġab");
        assert_eq!(pretokenize("hello world", false), "Ġhello Ġworld");
        assert_eq!(pretokenize("hello world", true), " Ġhello Ġworld");
        assert_eq!(pretokenize("x1y", false), "Ġx1Ġy");
        assert_eq!(pretokenize("42!", false), "42!");
        assert_eq!(pretokenize("", false), "");
        assert_eq!(pretokenize("", true), " ");
    }

    #[test]
    fn test_newlines() {
        assert_eq!(pretokenize("a\nb", false), "ĠaĊĠb");
        assert_eq!(pretokenize("\n\n", false), "ĊĊ");
    }

    #[test]
    fn test_unicode_letters() {
        assert_eq!(pretokenize("café ñu", false), "Ġcafé Ġñu");
    }

    #[test]
    fn test_symbol_spans() {
        let pre = ByteLevelPreTokenizer::new(true);
        let symbols = pre.pretokenize_symbols("a\n", 3, true);
        assert_eq!(
            symbols,
            vec![
                Symbol::new(" ", 3..3),
                Symbol::new("Ġ", 3..3),
                Symbol::new("a", 3..4),
                Symbol::new("Ċ", 4..5),
            ]
        );

        // The per-segment override wins.
        let symbols = pre.pretokenize_symbols("a", 0, false);
        assert_eq!(symbols, vec![Symbol::new("Ġ", 0..0), Symbol::new("a", 0..1)]);
    }

    #[test]
    fn test_restore_sentinels() {
        assert_eq!(restore_sentinels("ĠhelloĊĠworld"), " hello\n world");
        assert_eq!(restore_sentinels("plain"), "plain");
    }

    proptest! {
        #[test]
        fn test_restore_inverts_marking(text in "[a-zA-Z \n]{0,40}") {
            // Restoring the marked text only adds the spaces standing in for word starts.
            let restored = restore_sentinels(&pretokenize(&text, false));
            let words_added = restored.len() - text.len();
            prop_assert_eq!(restored.replace(' ', ""), text.replace(' ', ""));
            prop_assert_eq!(
                words_added,
                pretokenize(&text, false).matches(WORD_START_SENTINEL).count()
            );
        }
    }
}
