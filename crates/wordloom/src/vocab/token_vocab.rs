//! # Word Map ``{ String -> T }`` Token Vocabulary

use std::sync::OnceLock;

use crate::types::{TokenType, WLHashMap, hash_map_with_capacity};

/// Token vocabulary as a dictionary map of ``{ String -> T }``.
///
/// Words are kept in registration order. The reverse ``{ T -> String }``
/// map is built on first use and cached for the lifetime of the vocab;
/// when several words share a token, the first-registered word wins.
#[derive(Debug, Clone, Default)]
pub struct TokenVocab<T: TokenType> {
    /// Map of ``{ String -> T }``.
    word_map: WLHashMap<String, T>,

    /// Words in registration order.
    order: Vec<String>,

    /// Lazily built ``{ T -> String }`` map.
    token_map: OnceLock<WLHashMap<T, String>>,
}

impl<T: TokenType> PartialEq for TokenVocab<T> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.order == other.order && self.word_map == other.word_map
    }
}

impl<T: TokenType, S: Into<String>> FromIterator<(S, T)> for TokenVocab<T> {
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        let mut vocab = Self::default();
        for (word, token) in iter {
            vocab.register(word, token);
        }
        vocab
    }
}

impl<T: TokenType> TokenVocab<T> {
    /// Create an empty vocab.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a word.
    ///
    /// Re-registering a word replaces its token, but keeps its original
    /// registration position.
    ///
    /// ## Arguments
    /// * `word` - The subword string.
    /// * `token` - The token id to assign to the word.
    pub fn register<S: Into<String>>(
        &mut self,
        word: S,
        token: T,
    ) {
        let word = word.into();
        if self.word_map.insert(word.clone(), token).is_none() {
            self.order.push(word);
        }
        self.token_map = OnceLock::new();
    }

    /// Get the number of words in the vocab.
    pub fn len(&self) -> usize {
        self.word_map.len()
    }

    /// Check if the vocab is empty.
    pub fn is_empty(&self) -> bool {
        self.word_map.is_empty()
    }

    /// Iterate over ``(word, token)`` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, T)> + '_ {
        self.order
            .iter()
            .map(|word| (word.as_str(), self.word_map[word]))
    }

    /// Get the largest token in the vocab, if any.
    pub fn max_token(&self) -> Option<T> {
        self.word_map.values().max().copied()
    }

    /// Return the associated token for the word, if any.
    pub fn lookup_token(
        &self,
        word: &str,
    ) -> Option<T> {
        self.word_map.get(word).copied()
    }

    /// Return the canonical word for the token, if any.
    pub fn lookup_word(
        &self,
        token: T,
    ) -> Option<&str> {
        self.token_map().get(&token).map(String::as_str)
    }

    /// Get the ``{ T -> String }`` map, building it on first use.
    ///
    /// Concurrent first calls are serialized; exactly one map is built.
    pub fn token_map(&self) -> &WLHashMap<T, String> {
        self.token_map.get_or_init(|| {
            log::debug!("Building reverse map for {} words", self.order.len());

            let mut token_map = hash_map_with_capacity(self.order.len());
            for (word, token) in self.iter() {
                token_map.entry(token).or_insert_with(|| word.to_string());
            }
            token_map
        })
    }
}
