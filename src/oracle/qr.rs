//! QR decoding through rqrr with an optional preprocessing cascade.
//!
//! A plain sweep only needs [`Strategy::Raw`]: the frames are synthetic, so
//! anything a cleanup pass rescues says more about the pass than about the
//! symbol. The other strategies exist for measuring how much a given pass
//! widens the decodable angle range.

use ::rqrr::PreparedImage;
use serde::{Deserialize, Serialize};

use super::preprocess::{self, GreyPlane};
use super::{count_valid, DecodeOracle, DecodeResult, Point, SymbolFormat};
use crate::error::DecodeError;
use crate::image::ImageBuffer;

/// One preprocessing pass tried before handing the plane to rqrr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    /// Greyscale as-is.
    Raw,
    /// White border of `pad` pixels; helps when the symbol touches the edge.
    QuietZone { pad: usize },
    /// `passes` rounds of the 5-tap Gaussian.
    Blur { passes: usize },
    /// Local-mean binarization.
    AdaptiveThreshold { block: usize, c: i32 },
    /// Global Otsu binarization.
    Otsu,
}

impl Strategy {
    /// Parse CLI shorthand: `raw`, `quiet_zone`, `blur`, `adaptive`, `otsu`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "raw" => Some(Self::Raw),
            "quiet_zone" | "quiet-zone" => Some(Self::QuietZone { pad: 20 }),
            "blur" => Some(Self::Blur { passes: 1 }),
            "adaptive" | "adaptive_threshold" => Some(Self::AdaptiveThreshold { block: 15, c: 8 }),
            "otsu" => Some(Self::Otsu),
            _ => None,
        }
    }

    /// Produce the plane to scan, plus the offset to subtract from detected
    /// coordinates to get back to source space.
    fn apply(&self, grey: &GreyPlane) -> (GreyPlane, i32) {
        match *self {
            Self::Raw => (grey.clone(), 0),
            Self::QuietZone { pad } => (preprocess::add_quiet_zone(grey, pad), pad as i32),
            Self::Blur { passes } => (preprocess::gaussian_blur(grey, passes), 0),
            Self::AdaptiveThreshold { block, c } => {
                (preprocess::adaptive_threshold(grey, block, c), 0)
            }
            Self::Otsu => (preprocess::binarize(grey, preprocess::otsu_threshold(grey)), 0),
        }
    }
}

/// rqrr-backed [`DecodeOracle`].
///
/// Strategies run in order and the first one producing a valid result wins.
/// When none does, the detections of the first strategy that found any grid
/// are returned (all flagged invalid), so callers can still see near misses.
#[derive(Debug, Clone)]
pub struct RqrrOracle {
    strategies: Vec<Strategy>,
}

impl Default for RqrrOracle {
    fn default() -> Self {
        Self {
            strategies: vec![Strategy::Raw],
        }
    }
}

impl RqrrOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty list falls back to `[Raw]`.
    pub fn with_strategies(strategies: Vec<Strategy>) -> Self {
        if strategies.is_empty() {
            return Self::default();
        }
        Self { strategies }
    }

    /// Raw, then the cleanup passes ordered cheapest first.
    pub fn cascade() -> Self {
        Self::with_strategies(vec![
            Strategy::Raw,
            Strategy::Blur { passes: 1 },
            Strategy::AdaptiveThreshold { block: 15, c: 8 },
            Strategy::Otsu,
            Strategy::QuietZone { pad: 20 },
        ])
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }
}

impl DecodeOracle for RqrrOracle {
    fn decode(&self, image: &ImageBuffer) -> Result<Vec<DecodeResult>, DecodeError> {
        let grey = GreyPlane::from_image(image);
        let mut near_miss = None;

        for strategy in &self.strategies {
            let (plane, offset) = strategy.apply(&grey);
            let results = detect(&plane, offset);
            if count_valid(&results) > 0 {
                log::debug!("rqrr decoded {} symbol(s) via {:?}", results.len(), strategy);
                return Ok(results);
            }
            if near_miss.is_none() && !results.is_empty() {
                near_miss = Some(results);
            }
        }

        Ok(near_miss.unwrap_or_default())
    }
}

/// Run rqrr grid detection and turn every grid into a [`DecodeResult`].
fn detect(plane: &GreyPlane, offset: i32) -> Vec<DecodeResult> {
    let mut prepared =
        PreparedImage::prepare_from_greyscale(plane.width, plane.height, |x, y| plane.get(x, y));
    prepared
        .detect_grids()
        .into_iter()
        .map(|grid| {
            let corners = grid.bounds.map(|p| Point::new(p.x - offset, p.y - offset));
            match grid.decode() {
                Ok((_, text)) => DecodeResult {
                    format: SymbolFormat::QrCode,
                    valid: true,
                    text,
                    corners,
                },
                Err(_) => DecodeResult {
                    format: SymbolFormat::QrCode,
                    valid: false,
                    text: String::new(),
                    corners,
                },
            }
        })
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────
