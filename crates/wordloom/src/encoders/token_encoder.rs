//! # Subword to Token Encoder

use core::ops::Range;

use crate::{
    pretokenizers::{Symbol, restore_sentinels},
    types::TokenType,
    vocab::TokenVocab,
};

/// An encoded token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<T: TokenType> {
    /// The token id.
    pub id: T,

    /// The display text; sentinels already substituted.
    pub text: String,

    /// The source byte range, when known.
    pub span: Option<Range<usize>>,
}

impl<T: TokenType> Token<T> {
    /// Create a new token.
    pub fn new<S: Into<String>>(
        id: T,
        text: S,
        span: Option<Range<usize>>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            span,
        }
    }
}

/// Maps merged subwords to [`Token`]s.
///
/// Subwords missing from the vocabulary are dropped.
/// A registered word with id 0 is a normal token.
pub fn encode<T, S>(
    subwords: &[S],
    vocab: &TokenVocab<T>,
) -> Vec<Token<T>>
where
    T: TokenType,
    S: AsRef<str>,
{
    subwords
        .iter()
        .filter_map(|word| lookup(word.as_ref(), None, vocab))
        .collect()
}

/// Maps merged [`Symbol`]s to [`Token`]s, appending to `tokens`.
///
/// Symbol spans become token spans.
pub fn encode_symbols_append<T: TokenType>(
    symbols: Vec<Symbol>,
    vocab: &TokenVocab<T>,
    tokens: &mut Vec<Token<T>>,
) {
    tokens.extend(
        symbols
            .into_iter()
            .filter_map(|sym| lookup(&sym.text, Some(sym.span), vocab)),
    );
}

fn lookup<T: TokenType>(
    word: &str,
    span: Option<Range<usize>>,
    vocab: &TokenVocab<T>,
) -> Option<Token<T>> {
    match vocab.lookup_token(word) {
        Some(id) => Some(Token::new(id, restore_sentinels(word), span)),
        None => {
            log::trace!("Dropping unknown subword {word:?}");
            None
        }
    }
}
