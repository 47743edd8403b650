//! Sweep and batch configuration.
//!
//! `Default` carries the values the sweep is meant to run with; JSON files
//! only need the fields they change (`#[serde(default)]`).

use serde::{Deserialize, Serialize};

use crate::encoder::BarcodeEncoder;
use crate::error::SweepError;
use crate::noise::DEFAULT_STDDEV;

/// Tunables for one 360° sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Standard deviation of the per-channel Gaussian noise.
    pub noise_stddev: f64,
    /// Base seed for the noise. `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Worker threads for the per-angle body. `1` runs inline.
    pub workers: usize,
    /// Upper bound on a single decode call (ms). `None` waits forever.
    ///
    /// A call that overruns is abandoned, not cancelled: its helper thread
    /// keeps running until the oracle returns. See `max_stalled_decodes`.
    pub decode_timeout_ms: Option<u64>,
    /// How many abandoned decodes may still be running before further frames
    /// are skipped as [`DecodeError::Stalled`](crate::DecodeError::Stalled)
    /// instead of spawning yet another helper. Counted per controller, so
    /// the bound holds across every sweep of a batch.
    pub max_stalled_decodes: usize,
    /// Keep every rotated frame on the record.
    pub retain_frames: bool,
    /// Canvas and rotation background, applied to every channel.
    pub background: u8,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            noise_stddev: DEFAULT_STDDEV,
            seed: None,
            workers: 1,
            decode_timeout_ms: Some(5_000),
            max_stalled_decodes: 4,
            retain_frames: false,
            background: 255,
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), SweepError> {
        if !self.noise_stddev.is_finite() || self.noise_stddev < 0.0 {
            return Err(SweepError::Config(format!(
                "noise_stddev must be finite and >= 0, got {}",
                self.noise_stddev
            )));
        }
        if self.workers == 0 {
            return Err(SweepError::Config("workers must be at least 1".to_string()));
        }
        if self.decode_timeout_ms == Some(0) {
            return Err(SweepError::Config(
                "decode_timeout_ms must be positive; use null to disable".to_string(),
            ));
        }
        if self.max_stalled_decodes == 0 {
            return Err(SweepError::Config(
                "max_stalled_decodes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, SweepError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SweepError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Tunables for a batch of sweeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub sweep: SweepConfig,
    pub encoder: BarcodeEncoder,
    /// Resize every base image to the largest encoded size before sweeping,
    /// so different payloads are compared at the same pixel scale.
    pub match_sizes: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            sweep: SweepConfig::default(),
            encoder: BarcodeEncoder::default(),
            match_sizes: true,
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<(), SweepError> {
        self.sweep.validate()?;
        if self.encoder.scale == 0 {
            return Err(SweepError::Config("encoder.scale must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, SweepError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SweepError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
