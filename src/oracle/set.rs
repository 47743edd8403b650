//! Several oracles behind one [`DecodeOracle`].

use super::{guarded_decode, DataMatrixOracle, DecodeOracle, DecodeResult, RqrrOracle};
use crate::error::DecodeError;
use crate::image::ImageBuffer;

/// Runs every member on each frame and pools what they find.
///
/// A member that fails or panics is logged and skipped; the frame only fails
/// when every member did, with the first member's error.
pub struct OracleSet {
    members: Vec<Box<dyn DecodeOracle>>,
}

impl Default for OracleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl OracleSet {
    /// A set with no members. Decodes nothing until [`with`](Self::with) adds one.
    pub fn empty() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    /// QR through rqrr plus Data Matrix through rxing.
    pub fn standard() -> Self {
        Self::empty()
            .with(RqrrOracle::new())
            .with(DataMatrixOracle::new())
    }

    pub fn with(mut self, oracle: impl DecodeOracle + 'static) -> Self {
        self.members.push(Box::new(oracle));
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl DecodeOracle for OracleSet {
    fn decode(&self, image: &ImageBuffer) -> Result<Vec<DecodeResult>, DecodeError> {
        let mut pooled = Vec::new();
        let mut first_error = None;
        let mut failed = 0;

        for member in &self.members {
            match guarded_decode(member.as_ref(), image) {
                Ok(results) => pooled.extend(results),
                Err(err) => {
                    log::debug!("oracle set member failed: {}", err);
                    failed += 1;
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) if failed == self.members.len() => Err(err),
            _ => Ok(pooled),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
