//! Additive Gaussian noise over every channel value.
//!
//! Samples come from the polar (Marsaglia) form of the Box–Muller transform.
//! The random source is always passed in, so a seeded `ChaCha8Rng` gives
//! reproducible frames.

use rand::Rng;

use crate::error::SweepError;
use crate::image::ImageBuffer;

/// Standard deviation used by the sweep when nothing else is configured.
pub const DEFAULT_STDDEV: f64 = 30.0;

/// Upper bound on rejected `(u, v)` pairs per sample. Each draw is accepted
/// with probability π/4, so exhausting the cap does not happen in practice;
/// if it does, the sample is `0.0`.
pub const MAX_POLAR_ATTEMPTS: usize = 1_000;

/// One standard-normal sample via polar Box–Muller.
pub fn polar_sample<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    for _ in 0..MAX_POLAR_ATTEMPTS {
        let u: f64 = rng.gen_range(-1.0..1.0);
        let v: f64 = rng.gen_range(-1.0..1.0);
        let s = u * u + v * v;
        // s == 0 would feed ln(0); s >= 1 is outside the unit disc
        if s > 0.0 && s < 1.0 {
            return u * ((-2.0 * s.ln()) / s).sqrt();
        }
    }
    0.0
}

/// Return a copy of `image` with zero-mean Gaussian noise of `stddev` added
/// to each channel value, rounded and clamped to [0, 255].
pub fn add_noise<R: Rng + ?Sized>(
    image: &ImageBuffer,
    stddev: f64,
    rng: &mut R,
) -> Result<ImageBuffer, SweepError> {
    if !stddev.is_finite() || stddev < 0.0 {
        return Err(SweepError::Transform(format!(
            "noise stddev must be finite and >= 0, got {}",
            stddev
        )));
    }
    if stddev == 0.0 {
        return Ok(image.clone());
    }

    let data = image
        .as_bytes()
        .iter()
        .map(|&v| {
            let perturbed = (v as f64 + polar_sample(rng) * stddev).round();
            perturbed.clamp(0.0, 255.0) as u8
        })
        .collect();
    Ok(image.with_data(data))
}

// ── Tests ──────────────────────────────────────────────────────────
