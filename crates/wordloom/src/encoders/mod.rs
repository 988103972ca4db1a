//! # Token Encoders
//!
//! Encoding runs in two steps: the [`BpeMergeEngine`] merges marked
//! symbols into subwords; [`encode`] maps subwords to [`Token`]s.
//!
//! ## Example
//!
//! ```rust
//! use wordloom::{
//!     encoders::{encode, merge},
//!     pretokenizers::pretokenize,
//!     vocab::{MergeTable, TokenVocab},
//! };
//!
//! let vocab: TokenVocab<u32> = [("a", 0), ("b", 1), ("ab", 2)].into_iter().collect();
//! let merges = MergeTable::parse_lines(["a b"]).unwrap();
//!
//! let subwords = merge(&pretokenize("ab", false), &merges);
//! let tokens = encode(&subwords, &vocab);
//! assert_eq!(tokens.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);
//! ```

mod merge_engine;
mod token_encoder;

#[doc(inline)]
pub use merge_engine::*;
#[doc(inline)]
pub use token_encoder::*;
