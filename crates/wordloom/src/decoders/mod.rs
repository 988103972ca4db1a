//! # Token Decoders
//!
//! ## Example
//!
//! ```rust
//! use wordloom::{decoders::decode, vocab::TokenVocab};
//!
//! let vocab: TokenVocab<u32> = [("Ġhello", 5), ("Ċ", 6)].into_iter().collect();
//! assert_eq!(decode(&[5, 6, 99], &vocab), " hello\n");
//! ```

mod token_decoder;

#[doc(inline)]
pub use token_decoder::*;
