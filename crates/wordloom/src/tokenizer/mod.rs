//! # Combined Tokenizer
//!
//! [`Tokenizer`] runs the full text pipeline:
//! normalize, split special words, pre-tokenize, merge, and look up ids;
//! and decodes ids back to display text.

mod pipeline_config;
mod tokenizer_impl;
mod tokenizer_options;

#[doc(inline)]
pub use pipeline_config::*;
#[doc(inline)]
pub use tokenizer_impl::*;
#[doc(inline)]
pub use tokenizer_options::*;
