//! # Testing Fixtures
//!
//! A tiny letters-only vocabulary and a scripted [`Evaluator`].

use std::{collections::HashMap, sync::Mutex};

use crate::{
    WLError, WLResult,
    generation::{Evaluation, Evaluator, HiddenState, Logits},
    pretokenizers::{NEWLINE_SENTINEL, WORD_START_SENTINEL},
    tokenizer::{Tokenizer, TokenizerOptions},
    types::{WLHashMap, hash_map_new},
    vocab::io::{AddedTokenJson, ComponentJson, MergeJson, ModelJson, TokenizerJson},
};

/// The end-of-text special word; id ``0``.
pub const END_OF_TEXT: &str = "<|endoftext|>";

/// Whole words the letters vocabulary merges, each with a leading sentinel.
pub const LETTERS_WORDS: &[&str] = &["hello", "world", "hi"];

/// Build the letters-only `tokenizer.json` document.
///
/// * ``<|endoftext|>`` is special word ``0``;
/// * ``a..=z`` are ``1..=26``; then ``Ġ``, ``" "`` and ``Ċ``;
/// * each of [`LETTERS_WORDS`] merges one letter at a time onto ``Ġ``,
///   and every merge result is a word of its own.
pub fn letters_tokenizer_json() -> TokenizerJson {
    let mut vocab: HashMap<String, u64> = HashMap::new();
    let mut next_id = 1;
    let mut add = |vocab: &mut HashMap<String, u64>, word: String| {
        if !vocab.contains_key(&word) {
            vocab.insert(word, next_id);
            next_id += 1;
        }
    };

    for c in 'a'..='z' {
        add(&mut vocab, c.to_string());
    }
    for word in ["Ġ", " ", "Ċ"] {
        add(&mut vocab, word.to_string());
    }

    let mut merges = Vec::new();
    for word in LETTERS_WORDS {
        let mut prefix = WORD_START_SENTINEL.to_string();
        for c in word.chars() {
            let merged = format!("{prefix}{c}");
            if !vocab.contains_key(&merged) {
                merges.push(MergeJson::Line(format!("{prefix} {c}")));
                add(&mut vocab, merged.clone());
            }
            prefix = merged;
        }
    }

    TokenizerJson {
        added_tokens: vec![AddedTokenJson {
            id: 0,
            content: END_OF_TEXT.to_string(),
            special: true,
            single_word: false,
            lstrip: false,
            rstrip: false,
            normalized: false,
        }],
        normalizer: Some(ComponentJson::of_kind("NFC")),
        pre_tokenizer: Some(ComponentJson {
            add_prefix_space: Some(false),
            trim_offsets: Some(true),
            ..ComponentJson::of_kind("ByteLevel")
        }),
        post_processor: None,
        decoder: Some(ComponentJson::of_kind("ByteLevel")),
        model: ModelJson {
            kind: "BPE".to_string(),
            vocab,
            merges,
            unk_token: None,
            dropout: None,
        },
    }
}

/// Build a [`Tokenizer`] over [`letters_tokenizer_json`].
pub fn letters_tokenizer() -> Tokenizer<u32> {
    Tokenizer::from_tokenizer_json(&letters_tokenizer_json(), TokenizerOptions::default())
        .unwrap()
}

/// Look up a word's id in the letters vocabulary.
///
/// Words are given in display form; ``" hello"`` finds ``"Ġhello"``.
pub fn letters_token(
    tokenizer: &Tokenizer<u32>,
    word: &str,
) -> u32 {
    let marked = match word.strip_prefix(' ') {
        Some(rest) if !rest.is_empty() => format!("{WORD_START_SENTINEL}{rest}"),
        _ => word.replace('\n', NEWLINE_SENTINEL.encode_utf8(&mut [0; 4])),
    };
    tokenizer.vocab().lookup_token(&marked).unwrap()
}

/// Assert at compile time that a value is `Send + Sync`.
pub fn static_is_send_sync_check<T: Send + Sync>(_: &T) {}

/// A deterministic [`Evaluator`] driven by a token transition table.
///
/// Logits are one-hot at the successor of the consumed token;
/// the state is ``[steps, last_token]``.
#[derive(Debug)]
pub struct ScriptedEvaluator {
    vocab_size: usize,
    transitions: WLHashMap<u32, u32>,
    default_next: u32,
    fail_on: Option<u32>,
    history: Mutex<Vec<u32>>,
}

impl ScriptedEvaluator {
    /// Create an evaluator which always points at token ``0``.
    pub fn new(vocab_size: usize) -> Self {
        Self {
            vocab_size,
            transitions: hash_map_new(),
            default_next: 0,
            fail_on: None,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Point the logits after `from` at `to`.
    pub fn with_transition(
        mut self,
        from: u32,
        to: u32,
    ) -> Self {
        self.transitions.insert(from, to);
        self
    }

    /// Script a response: tokens not in `script` lead to its first token,
    /// each scripted token leads to the next.
    pub fn with_script(
        mut self,
        script: &[u32],
    ) -> Self {
        if let Some(&first) = script.first() {
            self.default_next = first;
        }
        for pair in script.windows(2) {
            self.transitions.insert(pair[0], pair[1]);
        }
        self
    }

    /// Fail whenever `token` is evaluated.
    pub fn with_fail_on(
        mut self,
        token: u32,
    ) -> Self {
        self.fail_on = Some(token);
        self
    }

    /// Every successfully evaluated token, in order.
    pub fn history(&self) -> Vec<u32> {
        self.history.lock().unwrap().clone()
    }

    fn one_hot(
        &self,
        token: u32,
    ) -> Logits {
        let mut logits = vec![0.0; self.vocab_size];
        if let Some(slot) = logits.get_mut(token as usize) {
            *slot = 20.0;
        }
        logits
    }
}

impl Evaluator<u32> for ScriptedEvaluator {
    fn evaluate(
        &self,
        token: u32,
        prior: Option<&HiddenState>,
    ) -> WLResult<Evaluation> {
        if self.fail_on == Some(token) {
            return Err(WLError::Evaluation(format!(
                "scripted failure on token {token}"
            )));
        }
        self.history.lock().unwrap().push(token);

        let steps = prior.map_or(0.0, |s| s.as_slice()[0]) + 1.0;
        let next = self
            .transitions
            .get(&token)
            .copied()
            .unwrap_or(self.default_next);
        Ok(Evaluation::new(vec![steps, token as f32], self.one_hot(next)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_fixture() {
        let tokenizer = letters_tokenizer();
        static_is_send_sync_check(&tokenizer);

        assert_eq!(tokenizer.vocab().len(), 41);
        assert_eq!(letters_token(&tokenizer, END_OF_TEXT), 0);
        assert_eq!(letters_token(&tokenizer, "a"), 1);
        assert_eq!(letters_token(&tokenizer, "z"), 26);
        assert_eq!(letters_token(&tokenizer, " "), 28);
        assert_eq!(letters_token(&tokenizer, "\n"), 29);
        assert_eq!(letters_token(&tokenizer, " hello"), 34);
        assert_eq!(letters_token(&tokenizer, " hi"), 40);
    }

    #[test]
    fn test_scripted_evaluator() {
        let eval = ScriptedEvaluator::new(4).with_script(&[2, 3]).with_fail_on(1);

        let first = eval.evaluate(0, None).unwrap();
        assert_eq!(first.logits, vec![0.0, 0.0, 20.0, 0.0]);
        let second = eval.evaluate(2, Some(&first.state)).unwrap();
        assert_eq!(second.state.as_slice(), &[2.0, 2.0]);
        assert_eq!(second.logits, vec![0.0, 0.0, 0.0, 20.0]);

        assert!(eval.evaluate(1, None).is_err());
        assert_eq!(eval.history(), vec![0, 2]);
    }
}
