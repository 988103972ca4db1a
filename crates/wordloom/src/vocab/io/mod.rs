//! # Vocabulary IO
//!
//! ## Loading A Vocab
//!
//! ```rust,no_run
//! use wordloom::vocab::io::TokenizerJson;
//!
//! fn example() -> wordloom::WLResult<()> {
//!     let doc = TokenizerJson::from_path("20B_tokenizer.json")?;
//!     let vocab = doc.to_token_vocab::<u32>()?;
//!     let merges = doc.to_merge_table()?;
//!     println!("{} words, {} merges", vocab.len(), merges.len());
//!     Ok(())
//! }
//! ```

mod tokenizer_json;

#[doc(inline)]
pub use tokenizer_json::*;
