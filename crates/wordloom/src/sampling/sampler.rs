//! # Logit Sampler

use rand::Rng;

use crate::{WLError, WLResult, sampling::SamplerOptions};

/// Numerically stable softmax.
///
/// The maximum logit is subtracted before exponentiating.
/// An empty input yields an empty output.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut probs: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    normalize_in_place(&mut probs);
    probs
}

/// The index of the first maximal value.
///
/// Returns ``0`` for an empty slice.
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (idx, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = idx;
        }
    }
    best
}

fn normalize_in_place(probs: &mut [f32]) -> f32 {
    let sum: f32 = probs.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        probs.iter_mut().for_each(|p| *p /= sum);
    }
    sum
}

/// Sample a token index from raw logits.
///
/// In order:
/// 1. softmax the logits;
/// 2. apply the logit bias in log-space and re-normalize;
/// 3. with ``temperature == 0``, return the arg-max;
/// 4. with ``top_p < 1``, zero every probability below the nucleus cutoff;
/// 5. with ``temperature != 1``, raise probabilities to ``1 / temperature``;
/// 6. re-normalize and draw by inverse CDF.
///
/// The input is not modified.
///
/// ## Errors
/// [`WLError::InvalidParameter`] for invalid options, empty or NaN logits,
/// logits without a finite maximum, a bias index outside the logits,
/// or a bias which removes every token.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(logits, options, rng)))]
pub fn sample<R>(
    logits: &[f32],
    options: &SamplerOptions,
    rng: &mut R,
) -> WLResult<usize>
where
    R: Rng + ?Sized,
{
    if logits.iter().any(|x| x.is_nan()) {
        return Err(WLError::InvalidParameter("logits contain NaN".to_string()));
    }
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !logits.is_empty() && !max.is_finite() {
        return Err(WLError::InvalidParameter(format!(
            "logits must have a finite maximum: {max}"
        )));
    }

    sample_probs(softmax(logits), options, rng)
}

/// Sample a token index from a probability distribution.
///
/// `probs` is consumed as the working buffer; see [`sample`].
///
/// ## Errors
/// [`WLError::InvalidParameter`] for invalid options, an empty or NaN
/// distribution, a bias index outside the distribution, or a bias which
/// removes every token.
pub fn sample_probs<R>(
    mut probs: Vec<f32>,
    options: &SamplerOptions,
    rng: &mut R,
) -> WLResult<usize>
where
    R: Rng + ?Sized,
{
    options.validate()?;
    if probs.is_empty() {
        return Err(WLError::InvalidParameter("logits are empty".to_string()));
    }
    if probs.iter().any(|p| p.is_nan()) {
        return Err(WLError::InvalidParameter(
            "probabilities contain NaN".to_string(),
        ));
    }
    if let Some((&token, _)) = options.logit_bias.range(probs.len()..).next() {
        return Err(WLError::InvalidParameter(format!(
            "logit bias token {token} is outside the {} logits",
            probs.len()
        )));
    }

    let top_p = options.effective_top_p();

    if !options.logit_bias.is_empty() {
        apply_logit_bias(&mut probs, options)?;
    }

    if options.temperature == 0.0 {
        return Ok(argmax(&probs));
    }

    if top_p < 1.0 {
        truncate_top_p(&mut probs, top_p);
    }

    if options.temperature != 1.0 {
        let fallback = argmax(&probs);
        let exponent = 1.0 / options.temperature;
        probs.iter_mut().for_each(|p| *p = p.powf(exponent));

        let sum: f32 = probs.iter().sum();
        if !(sum > 0.0 && sum.is_finite()) {
            // The reshaped distribution under- or overflowed.
            return Ok(fallback);
        }
    }

    normalize_in_place(&mut probs);

    let draw: f32 = rng.random();
    Ok(inverse_cdf(&probs, draw))
}

/// Add the bias to each token's log-probability, then re-normalize.
fn apply_logit_bias(
    probs: &mut [f32],
    options: &SamplerOptions,
) -> WLResult<()> {
    let mut log_probs: Vec<f32> = probs.iter().map(|p| p.ln()).collect();
    for (&token, &bias) in &options.logit_bias {
        log_probs[token] += bias;
    }

    let max = log_probs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max == f32::NEG_INFINITY {
        return Err(WLError::InvalidParameter(
            "logit bias leaves no token with non-zero probability".to_string(),
        ));
    }

    for (p, lp) in probs.iter_mut().zip(log_probs) {
        *p = (lp - max).exp();
    }
    normalize_in_place(probs);
    Ok(())
}

/// Zero every probability strictly below the nucleus cutoff.
///
/// The cutoff is the probability at which the descending cumulative sum
/// first exceeds `top_p`; returns the cutoff.
pub fn truncate_top_p(
    probs: &mut [f32],
    top_p: f32,
) -> f32 {
    let mut sorted = probs.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let mut cumulative = 0.0;
    let mut cutoff = 0.0;
    for p in sorted {
        cumulative += p;
        if cumulative > top_p {
            cutoff = p;
            break;
        }
    }

    probs
        .iter_mut()
        .filter(|p| **p < cutoff)
        .for_each(|p| *p = 0.0);
    cutoff
}

/// Select the first index whose cumulative probability reaches `draw`.
///
/// Zero-probability entries are never selected; if rounding leaves
/// `draw` past the total, the last non-zero entry is returned.
fn inverse_cdf(
    probs: &[f32],
    draw: f32,
) -> usize {
    let mut cumulative = 0.0;
    let mut last = probs.len().saturating_sub(1);
    for (idx, &p) in probs.iter().enumerate() {
        if p <= 0.0 {
            continue;
        }
        cumulative += p;
        last = idx;
        if draw <= cumulative {
            return idx;
        }
    }
    last
}
