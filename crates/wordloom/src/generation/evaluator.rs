//! # Evaluator Seam
//!
//! The sequence model is external; the driver only needs
//! "consume one token, return a new hidden state and next-token logits".

use std::sync::Arc;

use crate::{WLResult, types::TokenType};

/// Next-token logits; one score per vocabulary index.
pub type Logits = Vec<f32>;

/// The evaluator's opaque recurrent memory.
///
/// Owned by one driver; each step consumes the prior state by reference
/// and returns a replacement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HiddenState(Vec<f32>);

impl HiddenState {
    /// Wrap a state vector.
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// The state values.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// The number of state values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Is the state vector empty?
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unwrap the state vector.
    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl From<Vec<f32>> for HiddenState {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// The result of a single evaluation step.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// The state after consuming the token.
    pub state: HiddenState,

    /// The scores for the next token.
    pub logits: Logits,
}

impl Evaluation {
    /// Create a new evaluation result.
    pub fn new<S: Into<HiddenState>>(
        state: S,
        logits: Logits,
    ) -> Self {
        Self {
            state: state.into(),
            logits,
        }
    }
}

/// A causal sequence model, one token at a time.
pub trait Evaluator<T: TokenType> {
    /// Consume `token` after `prior` and return the successor state.
    ///
    /// ## Arguments
    /// * `token` - the token to consume.
    /// * `prior` - the state after the previous token; `None` at the start.
    ///
    /// ## Returns
    /// The new state and the next-token logits.
    ///
    /// ## Errors
    /// [`crate::WLError::Evaluation`] when the model fails.
    fn evaluate(
        &self,
        token: T,
        prior: Option<&HiddenState>,
    ) -> WLResult<Evaluation>;
}

impl<T, E> Evaluator<T> for &E
where
    T: TokenType,
    E: Evaluator<T> + ?Sized,
{
    fn evaluate(
        &self,
        token: T,
        prior: Option<&HiddenState>,
    ) -> WLResult<Evaluation> {
        (**self).evaluate(token, prior)
    }
}

impl<T, E> Evaluator<T> for Box<E>
where
    T: TokenType,
    E: Evaluator<T> + ?Sized,
{
    fn evaluate(
        &self,
        token: T,
        prior: Option<&HiddenState>,
    ) -> WLResult<Evaluation> {
        (**self).evaluate(token, prior)
    }
}

impl<T, E> Evaluator<T> for Arc<E>
where
    T: TokenType,
    E: Evaluator<T> + ?Sized,
{
    fn evaluate(
        &self,
        token: T,
        prior: Option<&HiddenState>,
    ) -> WLResult<Evaluation> {
        (**self).evaluate(token, prior)
    }
}

/// Adapts a closure into an [`Evaluator`].
#[derive(Clone)]
pub struct FnEvaluator<F> {
    func: F,
}

impl<F> FnEvaluator<F> {
    /// Wrap a closure.
    pub fn new<T>(func: F) -> Self
    where
        T: TokenType,
        F: Fn(T, Option<&HiddenState>) -> WLResult<Evaluation>,
    {
        Self { func }
    }
}

impl<F> core::fmt::Debug for FnEvaluator<F> {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("FnEvaluator").finish_non_exhaustive()
    }
}

impl<T, F> Evaluator<T> for FnEvaluator<F>
where
    T: TokenType,
    F: Fn(T, Option<&HiddenState>) -> WLResult<Evaluation>,
{
    fn evaluate(
        &self,
        token: T,
        prior: Option<&HiddenState>,
    ) -> WLResult<Evaluation> {
        (self.func)(token, prior)
    }
}
