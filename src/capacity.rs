//! Largest payload a symbology accepts.
//!
//! Grow a `[low, high)` window by `step` until encoding fails, then bisect it
//! down to the exact limit.

use rand::Rng;

use crate::encoder::{SymbolEncoder, SymbolType};
use crate::error::SweepError;

pub const DEFAULT_STEP: usize = 256;

/// Upper bound for encoders that never refuse a payload.
pub const DEFAULT_MAX_LEN: usize = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityProbe {
    pub step: usize,
    pub max_len: usize,
}

impl Default for CapacityProbe {
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP,
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

impl CapacityProbe {
    pub fn with_step(step: usize) -> Self {
        Self {
            step,
            ..Self::default()
        }
    }

    /// Length of the largest random uppercase payload `encoder` accepts for
    /// `symbol`, capped at `max_len`. `0` when no non-empty payload encodes.
    pub fn probe<E, R>(&self, encoder: &E, symbol: SymbolType, rng: &mut R) -> Result<usize, SweepError>
    where
        E: SymbolEncoder + ?Sized,
        R: Rng + ?Sized,
    {
        if self.step == 0 {
            return Err(SweepError::Config("capacity step must be at least 1".to_string()));
        }

        let mut accepts = |len: usize| {
            let payload: Vec<u8> = (0..len).map(|_| rng.gen_range(b'A'..b'Z')).collect();
            let ok = encoder.encode(&payload, symbol).is_ok();
            log::debug!("capacity probe {} len={} -> {}", symbol, len, ok);
            ok
        };

        // `low` is the longest length known to encode, `high` the first to fail.
        let mut low = 0;
        let mut high = self.step.min(self.max_len);
        loop {
            if !accepts(high) {
                break;
            }
            low = high;
            if high == self.max_len {
                log::info!("{} accepted every length up to {}", symbol, self.max_len);
                return Ok(self.max_len);
            }
            high = (high + self.step).min(self.max_len);
        }

        while high - low > 1 {
            let middle = low + (high - low) / 2;
            if accepts(middle) {
                low = middle;
            } else {
                high = middle;
            }
        }

        log::info!("{} capacity: {} bytes", symbol, low);
        Ok(low)
    }
}

// ── Tests ──────────────────────────────────────────────────────────
