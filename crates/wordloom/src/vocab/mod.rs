//! # Vocabulary
//!
//! This module provides the vocabulary tables and related io mechanisms.
//!
//! * [`TokenVocab`] - the ``{ String -> T }`` subword vocabulary,
//!   with a cached ``{ T -> String }`` reverse map.
//! * [`MergeTable`] - the ordered ``"left right"`` merge rules.
//! * [`SpecialVocab`] - verbatim special words, matched before pre-tokenization.
//!
//! All three are immutable once loaded, and are shared through `Arc`
//! by any number of tokenizers and conversations.
pub mod io;

mod merge_table;
mod special_vocab;
mod token_vocab;

#[doc(inline)]
pub use merge_table::*;
#[doc(inline)]
pub use special_vocab::*;
#[doc(inline)]
pub use token_vocab::*;
