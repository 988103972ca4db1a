use std::{path::Path, sync::Arc};

use crate::{
    WLResult,
    decoders::{decode, decode_append},
    encoders::{BpeMergeEngine, Token, encode_symbols_append},
    tokenizer::{PipelineConfig, TokenizerOptions},
    types::TokenType,
    vocab::{MergeTable, SpanRef, SpecialVocab, TokenVocab, io::TokenizerJson},
};

/// The full text pipeline over a shared vocabulary.
///
/// The vocabulary tables are immutable and shared through `Arc`;
/// cloning a tokenizer is cheap.
#[derive(Debug, Clone)]
pub struct Tokenizer<T: TokenType> {
    vocab: Arc<TokenVocab<T>>,
    merges: Arc<MergeTable>,
    specials: Arc<SpecialVocab<T>>,
    config: PipelineConfig,
    engine: BpeMergeEngine,
    options: TokenizerOptions,
}

impl<T: TokenType> Tokenizer<T> {
    /// Assemble a tokenizer from its parts.
    pub fn new<V, M, S>(
        vocab: V,
        merges: M,
        specials: S,
        config: PipelineConfig,
        options: TokenizerOptions,
    ) -> Self
    where
        V: Into<Arc<TokenVocab<T>>>,
        M: Into<Arc<MergeTable>>,
        S: Into<Arc<SpecialVocab<T>>>,
    {
        let mut config = config;
        if let Some(add_prefix_space) = options.add_prefix_space() {
            config.pre_tokenizer.add_prefix_space = add_prefix_space;
        }

        Self {
            vocab: vocab.into(),
            merges: merges.into(),
            specials: specials.into(),
            config,
            engine: BpeMergeEngine::new(options.merge_policy()),
            options,
        }
    }

    /// Build a tokenizer from a parsed vocabulary file.
    ///
    /// ## Errors
    /// [`crate::WLError::Configuration`] if the file names an unsupported
    /// pipeline component.
    pub fn from_tokenizer_json(
        doc: &TokenizerJson,
        options: TokenizerOptions,
    ) -> WLResult<Self> {
        let config = PipelineConfig::from_tokenizer_json(doc)?;
        let vocab = doc.to_token_vocab()?;
        let merges = doc.to_merge_table()?;
        let specials = doc.to_special_vocab()?;

        log::debug!(
            "Loaded vocabulary: {} words, {} merges, {} special words",
            vocab.len(),
            merges.len(),
            specials.len()
        );

        Ok(Self::new(vocab, merges, specials, config, options))
    }

    /// Load a tokenizer from a vocabulary file path.
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        options: TokenizerOptions,
    ) -> WLResult<Self> {
        Self::from_tokenizer_json(&TokenizerJson::from_path(path)?, options)
    }

    /// The shared vocabulary.
    pub fn vocab(&self) -> &Arc<TokenVocab<T>> {
        &self.vocab
    }

    /// The shared merge table.
    pub fn merges(&self) -> &Arc<MergeTable> {
        &self.merges
    }

    /// The shared special words.
    pub fn special_vocab(&self) -> &Arc<SpecialVocab<T>> {
        &self.specials
    }

    /// The validated pipeline descriptors.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The options this tokenizer was built with.
    pub fn options(&self) -> &TokenizerOptions {
        &self.options
    }

    /// Normalize and pre-tokenize text, without special word splitting.
    pub fn pretokenize(
        &self,
        text: &str,
    ) -> String {
        self.config
            .pre_tokenizer
            .pretokenize(self.config.normalizer.normalize(text))
    }

    /// Encode text into [`Token`]s.
    ///
    /// Unknown subwords are dropped.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, text)))]
    pub fn encode(
        &self,
        text: &str,
    ) -> WLResult<Vec<Token<T>>> {
        let text = self.config.normalizer.normalize(text);
        log::debug!("Normalized input: {text:?}");

        let spans = if self.options.split_special_tokens() {
            self.specials.split_spans(text)?
        } else if text.is_empty() {
            vec![]
        } else {
            vec![SpanRef::Normal(0..text.len())]
        };

        let mut tokens = Vec::with_capacity(text.len() / 3 + 1);
        for span in spans {
            match span {
                SpanRef::Normal(range) => {
                    let add_prefix_space =
                        range.start == 0 && self.config.pre_tokenizer.add_prefix_space;
                    let mut symbols = self.config.pre_tokenizer.pretokenize_symbols(
                        &text[range.clone()],
                        range.start,
                        add_prefix_space,
                    );
                    self.engine.merge_symbols(&mut symbols, &self.merges);
                    if log::log_enabled!(log::Level::Debug) {
                        let merged: Vec<&str> = symbols.iter().map(|s| s.text.as_str()).collect();
                        log::debug!("Merged segment {range:?}: {merged:?}");
                    }
                    encode_symbols_append(symbols, &self.vocab, &mut tokens);
                }
                SpanRef::Special(range, token) => {
                    tokens.push(Token::new(token, &text[range.clone()], Some(range)));
                }
            }
        }
        Ok(tokens)
    }

    /// Encode text into token ids.
    pub fn encode_ids(
        &self,
        text: &str,
    ) -> WLResult<Vec<T>> {
        Ok(self.encode(text)?.into_iter().map(|t| t.id).collect())
    }

    /// Decode token ids to display text; unknown ids are skipped.
    pub fn decode(
        &self,
        tokens: &[T],
    ) -> String {
        decode(tokens, &self.vocab)
    }

    /// Decode a single token id; unknown ids decode to ``""``.
    pub fn decode_token(
        &self,
        token: T,
    ) -> String {
        let mut buf = String::new();
        decode_append(token, &self.vocab, &mut buf);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{WLError, encoders::MergePolicy, testing::letters_tokenizer_json};

    #[test]
    fn test_spec_example() {
        let vocab: TokenVocab<u32> = [("a", 0), ("b", 1), ("ab", 2)].into_iter().collect();
        let merges = MergeTable::parse_lines(["a b"]).unwrap();
        let tokenizer = Tokenizer::new(
            vocab,
            merges,
            SpecialVocab::default(),
            PipelineConfig::default(),
            TokenizerOptions::default(),
        );

        assert_eq!(tokenizer.pretokenize("ab"), "Ġab");
        assert_eq!(tokenizer.encode_ids("ab").unwrap(), vec![2]);
        assert_eq!(tokenizer.decode(&[2, 0]), "aba");
    }

    #[test]
    fn test_encode_from_json() {
        let tokenizer: Tokenizer<u32> =
            Tokenizer::from_tokenizer_json(&letters_tokenizer_json(), Default::default()).unwrap();

        let tokens = tokenizer.encode("hello world\n").unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec![" hello", " ", " world", "\n"]);

        let spans: Vec<_> = tokens.iter().map(|t| t.span.clone().unwrap()).collect();
        assert_eq!(spans, vec![0..5, 5..6, 6..11, 11..12]);

        let ids = tokenizer.encode_ids("hello world\n").unwrap();
        assert_eq!(tokenizer.decode(&ids), " hello  world\n");
    }

    #[test]
    fn test_special_tokens() {
        let tokenizer: Tokenizer<u32> =
            Tokenizer::from_tokenizer_json(&letters_tokenizer_json(), Default::default()).unwrap();

        let tokens = tokenizer.encode("<|endoftext|>hello").unwrap();
        assert_eq!(tokens[0], Token::new(0, "<|endoftext|>", Some(0..13)));
        assert_eq!(tokens[1].text, " hello");
        assert_eq!(tokens[1].span, Some(13..18));
        assert_eq!(tokenizer.decode_token(0), "<|endoftext|>");

        let unsplit: Tokenizer<u32> = Tokenizer::from_tokenizer_json(
            &letters_tokenizer_json(),
            TokenizerOptions::default().with_split_special_tokens(false),
        )
        .unwrap();
        let ids = unsplit.encode_ids("<|endoftext|>").unwrap();
        assert!(!ids.contains(&0));
    }

    #[test]
    fn test_prefix_space_override() {
        let tokenizer: Tokenizer<u32> = Tokenizer::from_tokenizer_json(
            &letters_tokenizer_json(),
            TokenizerOptions::default().with_add_prefix_space(true),
        )
        .unwrap();

        assert_eq!(tokenizer.pretokenize("hi"), " Ġhi");
        let texts: Vec<String> = tokenizer
            .encode("hi")
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec![" ", " hi"]);

        // Only the segment at the start of the input gets the prefix space.
        let texts: Vec<String> = tokenizer
            .encode("<|endoftext|>hi")
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["<|endoftext|>", " hi"]);
    }

    #[test]
    fn test_merge_policy_option() {
        let tokenizer: Tokenizer<u32> = Tokenizer::from_tokenizer_json(
            &letters_tokenizer_json(),
            TokenizerOptions::default().with_merge_policy(MergePolicy::RankOrdered),
        )
        .unwrap();
        assert_eq!(tokenizer.options().merge_policy(), MergePolicy::RankOrdered);
        assert_eq!(tokenizer.decode(&tokenizer.encode_ids("hello").unwrap()), " hello");
    }

    #[test]
    fn test_empty_input() {
        let tokenizer: Tokenizer<u32> =
            Tokenizer::from_tokenizer_json(&letters_tokenizer_json(), Default::default()).unwrap();
        assert!(tokenizer.encode("").unwrap().is_empty());
    }

    #[test]
    fn test_bad_config() {
        let mut doc = letters_tokenizer_json();
        doc.model.kind = "Unigram".to_string();
        assert!(matches!(
            Tokenizer::<u32>::from_tokenizer_json(&doc, Default::default()),
            Err(WLError::Configuration {
                component: "model",
                ..
            })
        ));
    }
}
