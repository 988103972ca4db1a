//! Tokenizer Options
//!
//! Options for building a [`Tokenizer`](crate::tokenizer::Tokenizer).

use serde::{Deserialize, Serialize};

use crate::encoders::MergePolicy;

/// Options for configuring a [`Tokenizer`](crate::tokenizer::Tokenizer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerOptions {
    /// Overrides the vocabulary file's ``add_prefix_space``, when set.
    pub add_prefix_space: Option<bool>,

    /// Emit special words found in the input directly as their tokens.
    pub split_special_tokens: bool,

    /// The merge loop to use.
    pub merge_policy: MergePolicy,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            add_prefix_space: None,
            split_special_tokens: true,
            merge_policy: MergePolicy::Greedy,
        }
    }
}

impl TokenizerOptions {
    /// Get the ``add_prefix_space`` override.
    pub fn add_prefix_space(&self) -> Option<bool> {
        self.add_prefix_space
    }

    /// Set the ``add_prefix_space`` override.
    pub fn set_add_prefix_space<B>(
        &mut self,
        add_prefix_space: B,
    ) where
        B: Into<Option<bool>>,
    {
        self.add_prefix_space = add_prefix_space.into();
    }

    /// Set the ``add_prefix_space`` override and return the options.
    pub fn with_add_prefix_space<B>(
        mut self,
        add_prefix_space: B,
    ) -> Self
    where
        B: Into<Option<bool>>,
    {
        self.set_add_prefix_space(add_prefix_space);
        self
    }

    /// Are special words split out of the input?
    pub fn split_special_tokens(&self) -> bool {
        self.split_special_tokens
    }

    /// Set whether special words are split out of the input.
    pub fn set_split_special_tokens(
        &mut self,
        split_special_tokens: bool,
    ) {
        self.split_special_tokens = split_special_tokens;
    }

    /// Set whether special words are split out of the input.
    pub fn with_split_special_tokens(
        mut self,
        split_special_tokens: bool,
    ) -> Self {
        self.set_split_special_tokens(split_special_tokens);
        self
    }

    /// Get the configured [`MergePolicy`].
    pub fn merge_policy(&self) -> MergePolicy {
        self.merge_policy
    }

    /// Set the configured [`MergePolicy`].
    pub fn set_merge_policy(
        &mut self,
        merge_policy: MergePolicy,
    ) {
        self.merge_policy = merge_policy;
    }

    /// Set the configured [`MergePolicy`] and return the options.
    pub fn with_merge_policy(
        mut self,
        merge_policy: MergePolicy,
    ) -> Self {
        self.set_merge_policy(merge_policy);
        self
    }
}
