//! # Logit Sampling
//!
//! Turns a raw logits vector into a token index under
//! temperature, nucleus (top-p) truncation and logit bias.
//!
//! ## Example
//!
//! ```rust
//! use rand::{SeedableRng, rngs::StdRng};
//! use wordloom::sampling::{SamplerOptions, sample, softmax};
//!
//! let probs = softmax(&[2.0, 1.0, 0.1]);
//! assert!((probs[0] - 0.659).abs() < 1e-3);
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let greedy = SamplerOptions::default().with_temperature(0.0);
//! assert_eq!(sample(&[2.0, 1.0, 0.1], &greedy, &mut rng).unwrap(), 0);
//! ```

mod sampler;
mod sampler_options;

#[doc(inline)]
pub use sampler::*;
#[doc(inline)]
pub use sampler_options::*;
