//! # `wordloom` Byte-Level BPE Tokenizer and Conversation Driver
//!
//! `wordloom` turns text into the token alphabet of a byte-level BPE
//! vocabulary (`tokenizer.json`), turns next-token scores back into
//! chosen text, and drives a turn-by-turn conversation with an external
//! sequence model.
//!
//! See:
//! * [`vocab`] for the vocabulary, merge table, and `tokenizer.json` io.
//! * [`pretokenizers`] for word-start and newline marking.
//! * [`encoders`] to merge marked text and map subwords to tokens.
//! * [`decoders`] to decode tokens into display text.
//! * [`tokenizer`] for the assembled [`Tokenizer`] pipeline.
//! * [`sampling`] to choose a token from logits.
//! * [`generation`] for the [`generation::Conversation`] driver.
//!
//! ## Crate Features
//!
//! #### feature: ``default``
//!
//! * ``ahash``
//!
//! #### feature: ``ahash``
//!
//! This swaps all `HashMap`/`HashSet` implementations for ``ahash``.
//! This is done by the ``types::WLHashMap`` type alias machinery.
//!
//! #### feature: ``tracing``
//!
//! This enables ``tracing`` instrumentation points on the
//! encode, sample, and generation paths.
//!
//! #### feature: ``testing``
//!
//! Exposes the [`testing`] fixtures to downstream tests.
//!
//! ## Example
//!
//! ```rust
//! use wordloom::{Tokenizer, TokenizerOptions, vocab::io::TokenizerJson};
//!
//! let doc = TokenizerJson::from_json_str(r#"{
//!     "added_tokens": [{"id": 0, "content": "<|endoftext|>", "special": true}],
//!     "normalizer": {"type": "NFC"},
//!     "pre_tokenizer": {"type": "ByteLevel", "add_prefix_space": false},
//!     "decoder": {"type": "ByteLevel"},
//!     "model": {
//!         "type": "BPE",
//!         "vocab": {"Ġ": 1, "h": 2, "i": 3, "Ġh": 4, "Ġhi": 5},
//!         "merges": ["Ġ h", "Ġh i"]
//!     }
//! }"#)?;
//!
//! let tokenizer: Tokenizer<u32> = Tokenizer::from_tokenizer_json(&doc, TokenizerOptions::default())?;
//! let ids = tokenizer.encode_ids("hi<|endoftext|>")?;
//! assert_eq!(ids, vec![5, 0]);
//! assert_eq!(tokenizer.decode(&ids), " hi<|endoftext|>");
//! # Ok::<(), wordloom::WLError>(())
//! ```
#![warn(missing_docs, unused)]

pub mod decoders;
pub mod encoders;
pub mod errors;
pub mod generation;
pub mod pretokenizers;
pub mod sampling;
pub mod tokenizer;
pub mod types;
pub mod vocab;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[doc(inline)]
pub use errors::{WLError, WLResult, WordloomError};
#[doc(inline)]
pub use tokenizer::{Tokenizer, TokenizerOptions};
#[doc(inline)]
pub use types::TokenType;
