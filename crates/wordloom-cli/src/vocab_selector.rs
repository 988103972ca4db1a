use std::path::PathBuf;

use wordloom::{Tokenizer, TokenizerOptions};

/// Vocabulary file arg group.
#[derive(clap::Args, Debug)]
pub struct VocabArgs {
    /// Path to a `tokenizer.json` vocabulary file.
    #[arg(long)]
    vocab: PathBuf,

    /// Override the file's ``add_prefix_space`` setting.
    #[arg(long)]
    add_prefix_space: Option<bool>,

    /// Treat special words in the input as plain text.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    no_split_special: bool,
}

impl VocabArgs {
    /// The tokenizer options selected by the flags.
    pub fn options(&self) -> TokenizerOptions {
        TokenizerOptions::default()
            .with_add_prefix_space(self.add_prefix_space)
            .with_split_special_tokens(!self.no_split_special)
    }

    /// Load the tokenizer.
    pub fn load_tokenizer(&self) -> Result<Tokenizer<u32>, Box<dyn std::error::Error>> {
        let tokenizer = Tokenizer::from_path(&self.vocab, self.options())?;
        log::info!(
            "Loaded {} ({} words)",
            self.vocab.display(),
            tokenizer.vocab().len()
        );
        Ok(tokenizer)
    }
}
