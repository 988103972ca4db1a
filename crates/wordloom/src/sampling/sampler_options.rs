//! # Sampler Options

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{WLError, WLResult};

/// Additive log-probability bias, keyed by token index.
pub type LogitBias = BTreeMap<usize, f32>;

/// Options for [`sample`](crate::sampling::sample).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerOptions {
    /// Sampling temperature; ``0`` selects greedy decoding.
    pub temperature: f32,

    /// Nucleus threshold in ``[0, 1]``; ``0`` is treated as ``1``.
    pub top_p: f32,

    /// Per-token log-probability bias.
    pub logit_bias: LogitBias,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 1.0,
            logit_bias: LogitBias::new(),
        }
    }
}

impl SamplerOptions {
    /// Greedy (arg-max) sampling options.
    pub fn greedy() -> Self {
        Self::default().with_temperature(0.0)
    }

    /// Check the parameter ranges.
    ///
    /// ## Errors
    /// [`WLError::InvalidParameter`] when `temperature` is negative or NaN,
    /// or `top_p` is outside ``[0, 1]``, or a bias is NaN or ``+inf``.
    pub fn validate(&self) -> WLResult<()> {
        if self.temperature.is_nan() || self.temperature < 0.0 {
            return Err(WLError::InvalidParameter(format!(
                "temperature must be non-negative: {}",
                self.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(WLError::InvalidParameter(format!(
                "top_p must be in the range [0, 1]: {}",
                self.top_p
            )));
        }
        if let Some((token, bias)) = self
            .logit_bias
            .iter()
            .find(|(_, b)| b.is_nan() || **b == f32::INFINITY)
        {
            return Err(WLError::InvalidParameter(format!(
                "logit bias for token {token} must be finite or -inf: {bias}"
            )));
        }
        Ok(())
    }

    /// The effective nucleus threshold; ``0`` means no truncation.
    pub fn effective_top_p(&self) -> f32 {
        if self.top_p == 0.0 { 1.0 } else { self.top_p }
    }

    /// Get the temperature.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Set the temperature.
    pub fn set_temperature(
        &mut self,
        temperature: f32,
    ) {
        self.temperature = temperature;
    }

    /// Set the temperature and return the options.
    pub fn with_temperature(
        mut self,
        temperature: f32,
    ) -> Self {
        self.set_temperature(temperature);
        self
    }

    /// Get the nucleus threshold.
    pub fn top_p(&self) -> f32 {
        self.top_p
    }

    /// Set the nucleus threshold.
    pub fn set_top_p(
        &mut self,
        top_p: f32,
    ) {
        self.top_p = top_p;
    }

    /// Set the nucleus threshold and return the options.
    pub fn with_top_p(
        mut self,
        top_p: f32,
    ) -> Self {
        self.set_top_p(top_p);
        self
    }

    /// Get the logit bias.
    pub fn logit_bias(&self) -> &LogitBias {
        &self.logit_bias
    }

    /// Set the bias for one token.
    pub fn set_token_bias(
        &mut self,
        token: usize,
        bias: f32,
    ) {
        self.logit_bias.insert(token, bias);
    }

    /// Replace the logit bias and return the options.
    pub fn with_logit_bias<B>(
        mut self,
        logit_bias: B,
    ) -> Self
    where
        B: IntoIterator<Item = (usize, f32)>,
    {
        self.logit_bias = logit_bias.into_iter().collect();
        self
    }
}
