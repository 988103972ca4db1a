//! # Pre-Tokenizers
//!
//! Pre-tokenization marks word starts and newlines with sentinel
//! symbols, producing the exact input of the merge engine.
//!
//! ```rust
//! use wordloom::pretokenizers::pretokenize;
//!
//! assert_eq!(pretokenize("hi\nyou", false), "Ġhi\u{010A}Ġyou");
//! assert_eq!(pretokenize("hi", true), " Ġhi");
//! ```

mod byte_level;
mod symbol;

#[doc(inline)]
pub use byte_level::*;
#[doc(inline)]
pub use symbol::*;
