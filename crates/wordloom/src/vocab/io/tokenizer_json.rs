//! # `tokenizer.json` Vocabulary Files
//!
//! The document carries the added tokens, the pipeline descriptors
//! (normalizer, pre-tokenizer, post-processor, decoder), and the
//! BPE model block with its vocabulary and ordered merges.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    WLResult,
    types::{TokenType, try_token_from_usize},
    vocab::{MergeRule, MergeTable, SpecialVocab, TokenVocab},
};

/// An added token entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddedTokenJson {
    /// The token id.
    pub id: u64,

    /// The exact token text.
    pub content: String,

    /// Is this a control token, matched verbatim in the input?
    #[serde(default)]
    pub special: bool,

    /// Accepted and ignored.
    #[serde(default)]
    pub single_word: bool,

    /// Accepted and ignored.
    #[serde(default)]
    pub lstrip: bool,

    /// Accepted and ignored.
    #[serde(default)]
    pub rstrip: bool,

    /// Accepted and ignored.
    #[serde(default)]
    pub normalized: bool,
}

/// A pipeline component descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentJson {
    /// The component type, e.g. ``"NFC"`` or ``"ByteLevel"``.
    #[serde(rename = "type")]
    pub kind: String,

    /// Prepend a space before pre-tokenizing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_prefix_space: Option<bool>,

    /// Accepted and ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim_offsets: Option<bool>,
}

impl ComponentJson {
    /// Build a descriptor of the given type.
    pub fn of_kind(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            add_prefix_space: None,
            trim_offsets: None,
        }
    }
}

/// A merge entry; either ``"left right"`` or ``["left", "right"]``.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MergeJson {
    /// ``"left right"``
    Line(String),

    /// ``["left", "right"]``
    Pair(String, String),
}

impl MergeJson {
    /// Convert to a [`MergeRule`].
    pub fn to_rule(&self) -> WLResult<MergeRule> {
        match self {
            MergeJson::Line(line) => MergeRule::parse(line),
            MergeJson::Pair(left, right) => Ok(MergeRule::new(left.as_str(), right.as_str())),
        }
    }
}

/// The model block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelJson {
    /// The model type; only ``"BPE"`` is supported.
    #[serde(rename = "type")]
    pub kind: String,

    /// The ``{ word -> id }`` vocabulary.
    #[serde(default)]
    pub vocab: HashMap<String, u64>,

    /// The merges, in rank order.
    #[serde(default)]
    pub merges: Vec<MergeJson>,

    /// Accepted and ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unk_token: Option<String>,

    /// Accepted and ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dropout: Option<f32>,
}

/// A `tokenizer.json` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizerJson {
    /// Added (special) tokens, in file order.
    #[serde(default)]
    pub added_tokens: Vec<AddedTokenJson>,

    /// The normalizer.
    #[serde(default)]
    pub normalizer: Option<ComponentJson>,

    /// The pre-tokenizer.
    #[serde(default)]
    pub pre_tokenizer: Option<ComponentJson>,

    /// The post-processor.
    #[serde(default)]
    pub post_processor: Option<ComponentJson>,

    /// The decoder.
    #[serde(default)]
    pub decoder: Option<ComponentJson>,

    /// The model block.
    pub model: ModelJson,
}

impl TokenizerJson {
    /// Parse a document from a string.
    pub fn from_json_str(json: &str) -> WLResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a document from a reader.
    pub fn from_reader<R: Read>(reader: R) -> WLResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Load a document from a file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> WLResult<Self> {
        let path = path.as_ref();
        log::debug!("Loading vocabulary file {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        Self::from_reader(reader)
    }

    /// Serialize the document.
    pub fn to_json_string(&self) -> WLResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the [`TokenVocab`].
    ///
    /// Model words are registered in ascending id order, then the
    /// added tokens in file order.
    pub fn to_token_vocab<T: TokenType>(&self) -> WLResult<TokenVocab<T>> {
        let mut entries: Vec<(&String, u64)> =
            self.model.vocab.iter().map(|(w, &id)| (w, id)).collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));

        let mut vocab = TokenVocab::new();
        for (word, id) in entries {
            vocab.register(word.as_str(), try_token_from_u64(id)?);
        }
        for added in &self.added_tokens {
            vocab.register(added.content.as_str(), try_token_from_u64(added.id)?);
        }
        Ok(vocab)
    }

    /// Build the [`MergeTable`].
    pub fn to_merge_table(&self) -> WLResult<MergeTable> {
        let rules = self
            .model
            .merges
            .iter()
            .map(MergeJson::to_rule)
            .collect::<WLResult<Vec<_>>>()?;
        Ok(MergeTable::from_rules(rules))
    }

    /// Build the [`SpecialVocab`] from the added tokens flagged special.
    pub fn to_special_vocab<T: TokenType>(&self) -> WLResult<SpecialVocab<T>> {
        let mut vocab = SpecialVocab::default();
        for added in self.added_tokens.iter().filter(|a| a.special) {
            vocab.add_str_word(&added.content, try_token_from_u64(added.id)?);
        }
        Ok(vocab)
    }
}

fn try_token_from_u64<T: TokenType>(id: u64) -> WLResult<T> {
    let id = usize::try_from(id).map_err(|_| crate::WLError::TokenOutOfRange)?;
    try_token_from_usize(id)
}
