//! # Generation Options

use serde::{Deserialize, Serialize};

use crate::{WLResult, sampling::SamplerOptions};

/// The default cap on generated tokens per response.
pub const DEFAULT_MAX_TOKENS: usize = 100;

/// Options for [`Conversation::generate_response`](crate::generation::Conversation::generate_response).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// The maximum number of tokens to generate.
    pub max_tokens: usize,

    /// Generation stops at the first occurrence of this string,
    /// which is excluded from the response.
    ///
    /// `None` or an empty string disables the check.
    pub stop_string: Option<String>,

    /// The per-step sampler configuration.
    pub sampler: SamplerOptions,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            stop_string: None,
            sampler: SamplerOptions::default(),
        }
    }
}

impl GenerationOptions {
    /// Check the sampler parameters.
    ///
    /// ## Errors
    /// [`crate::WLError::InvalidParameter`] for out-of-range sampler options.
    pub fn validate(&self) -> WLResult<()> {
        self.sampler.validate()
    }

    /// The active stop string; empty strings are ignored.
    pub fn active_stop_string(&self) -> Option<&str> {
        self.stop_string.as_deref().filter(|s| !s.is_empty())
    }

    /// Get the token cap.
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Set the token cap.
    pub fn set_max_tokens(
        &mut self,
        max_tokens: usize,
    ) {
        self.max_tokens = max_tokens;
    }

    /// Set the token cap and return the options.
    pub fn with_max_tokens(
        mut self,
        max_tokens: usize,
    ) -> Self {
        self.set_max_tokens(max_tokens);
        self
    }

    /// Get the stop string.
    pub fn stop_string(&self) -> Option<&str> {
        self.stop_string.as_deref()
    }

    /// Set the stop string.
    pub fn set_stop_string<S>(
        &mut self,
        stop_string: Option<S>,
    ) where
        S: Into<String>,
    {
        self.stop_string = stop_string.map(Into::into);
    }

    /// Set the stop string and return the options.
    pub fn with_stop_string<S>(
        mut self,
        stop_string: S,
    ) -> Self
    where
        S: Into<String>,
    {
        self.set_stop_string(Some(stop_string));
        self
    }

    /// Get the sampler options.
    pub fn sampler(&self) -> &SamplerOptions {
        &self.sampler
    }

    /// Set the sampler options.
    pub fn set_sampler(
        &mut self,
        sampler: SamplerOptions,
    ) {
        self.sampler = sampler;
    }

    /// Set the sampler options and return the options.
    pub fn with_sampler(
        mut self,
        sampler: SamplerOptions,
    ) -> Self {
        self.set_sampler(sampler);
        self
    }
}
