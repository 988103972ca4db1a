//! # Conversation Generation
//!
//! A [`Conversation`] owns the hidden state of an external [`Evaluator`],
//! feeds it tokenized input, and samples responses token by token.
//!
//! ## Example
//!
//! ```rust
//! use wordloom::{
//!     generation::{Conversation, Evaluation, FnEvaluator, GenerationOptions, HiddenState},
//!     sampling::SamplerOptions,
//!     tokenizer::Tokenizer,
//!     vocab::{MergeTable, SpecialVocab, TokenVocab},
//!     WLResult,
//! };
//!
//! let vocab: TokenVocab<u32> = [("Ġ", 0), ("a", 1), ("b", 2)].into_iter().collect();
//! let tokenizer = Tokenizer::new(
//!     vocab,
//!     MergeTable::default(),
//!     SpecialVocab::default(),
//!     Default::default(),
//!     Default::default(),
//! );
//!
//! // Always predicts "b".
//! let evaluator = FnEvaluator::new(|_: u32, _: Option<&HiddenState>| -> WLResult<Evaluation> {
//!     Ok(Evaluation::new(vec![0.0], vec![0.0, 0.0, 9.0]))
//! });
//!
//! let mut conv = Conversation::with_seed(tokenizer, evaluator, 0);
//! conv.process_input("a").unwrap();
//!
//! let options = GenerationOptions::default()
//!     .with_max_tokens(3)
//!     .with_sampler(SamplerOptions::greedy());
//! assert_eq!(conv.generate_response(&options, |_| true).unwrap(), "bbb");
//! ```

mod conversation;
mod conversation_log;
mod evaluator;
mod generation_options;

#[doc(inline)]
pub use conversation::*;
#[doc(inline)]
pub use conversation_log::*;
#[doc(inline)]
pub use evaluator::*;
#[doc(inline)]
pub use generation_options::*;
