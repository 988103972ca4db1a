//! # Special Words Vocabulary

use core::ops::Range;
use std::sync::OnceLock;

use aho_corasick::{AhoCorasick, MatchKind};

use crate::{
    WLError,
    WLResult,
    types::{TokenType, WLHashMap},
};

/// A span of input text, labeled by how it should be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanRef<T: TokenType> {
    /// Ordinary text; goes through the full pipeline.
    Normal(Range<usize>),

    /// An exact special word, encoded directly as its token.
    Special(Range<usize>, T),
}

/// Token vocabulary for special words.
///
/// This contains no merges; special words are matched verbatim
/// in the input before pre-tokenization.
#[derive(Debug, Clone, Default)]
pub struct SpecialVocab<T: TokenType> {
    /// The special words, in registration order.
    words: Vec<(String, T)>,

    /// Index of ``{ word -> T }``.
    word_map: WLHashMap<String, T>,

    /// Leftmost-longest matcher over `words`, built on first use.
    matcher: OnceLock<Option<AhoCorasick>>,
}

impl<T: TokenType> PartialEq for SpecialVocab<T> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.words == other.words
    }
}

impl<T: TokenType> SpecialVocab<T> {
    /// Get the number of special words in the vocab.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if the vocab is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Add a word to the vocab.
    ///
    /// Empty words are ignored; re-adding a word replaces its token.
    pub fn add_str_word(
        &mut self,
        word: &str,
        token: T,
    ) {
        if word.is_empty() {
            return;
        }
        if let Some(slot) = self.words.iter_mut().find(|(w, _)| w == word) {
            slot.1 = token;
        } else {
            self.words.push((word.to_string(), token));
        }
        self.word_map.insert(word.to_string(), token);
        self.matcher = OnceLock::new();
    }

    /// Extend the vocabulary with the given special words.
    pub fn with_special_words<W, S>(
        self,
        special_words: W,
    ) -> Self
    where
        W: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
    {
        let mut vocab = self;
        for (word, token) in special_words {
            vocab.add_str_word(word.as_ref(), token);
        }
        vocab
    }

    /// Return the associated token for the word, if any.
    pub fn lookup_token(
        &self,
        word: &str,
    ) -> Option<T> {
        self.word_map.get(word).copied()
    }

    /// Iterate over the special words in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, T)> + '_ {
        self.words.iter().map(|(w, t)| (w.as_str(), *t))
    }

    fn matcher(&self) -> WLResult<Option<&AhoCorasick>> {
        let matcher = self.matcher.get_or_init(|| {
            if self.words.is_empty() {
                return None;
            }
            AhoCorasick::builder()
                .match_kind(MatchKind::LeftmostLongest)
                .build(self.words.iter().map(|(w, _)| w.as_str()))
                .map_err(|err| log::error!("special word matcher failed to build: {err}"))
                .ok()
        });
        match matcher {
            Some(m) => Ok(Some(m)),
            None if self.words.is_empty() => Ok(None),
            None => Err(WLError::Parse(
                "special word matcher could not be built".to_string(),
            )),
        }
    }

    /// Split text into normal and special spans.
    ///
    /// Empty normal spans are not emitted.
    pub fn split_spans(
        &self,
        text: &str,
    ) -> WLResult<Vec<SpanRef<T>>> {
        let Some(matcher) = self.matcher()? else {
            return Ok(if text.is_empty() {
                vec![]
            } else {
                vec![SpanRef::Normal(0..text.len())]
            });
        };

        let mut spans = Vec::new();
        let mut last = 0;
        for m in matcher.find_iter(text) {
            if m.start() > last {
                spans.push(SpanRef::Normal(last..m.start()));
            }
            let token = self.words[m.pattern().as_usize()].1;
            spans.push(SpanRef::Special(m.range(), token));
            last = m.end();
        }
        if last < text.len() {
            spans.push(SpanRef::Normal(last..text.len()));
        }
        Ok(spans)
    }
}
