//! Decode oracle seam.
//!
//! The sweep never decodes anything itself. It hands each frame to a
//! [`DecodeOracle`] and counts the results flagged valid. [`RqrrOracle`]
//! reads QR codes, [`DataMatrixOracle`] reads Data Matrix, and [`OracleSet`]
//! runs both; tests plug in stubs.

mod matrix;
mod preprocess;
mod qr;
mod set;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;

use crate::error::DecodeError;
use crate::image::ImageBuffer;

pub use self::preprocess::GreyPlane;
pub use self::matrix::DataMatrixOracle;
pub use self::qr::{RqrrOracle, Strategy};
pub use self::set::OracleSet;

/// Symbology reported by an oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolFormat {
    QrCode,
    DataMatrix,
    Unknown,
}

/// Integer pixel coordinate in the decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One detection. Corners run top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeResult {
    pub format: SymbolFormat,
    pub valid: bool,
    pub text: String,
    pub corners: [Point; 4],
}

impl DecodeResult {
    /// A valid detection with no geometry, for stubs and tests.
    pub fn valid(format: SymbolFormat, text: impl Into<String>) -> Self {
        Self {
            format,
            valid: true,
            text: text.into(),
            corners: [Point::default(); 4],
        }
    }
}

/// Anything that can look at a frame and report barcodes in it.
///
/// Implementations must be shareable across threads: the sweep may call the
/// same oracle from several workers, or from a helper thread that enforces a
/// timeout.
pub trait DecodeOracle: Send + Sync {
    fn decode(&self, image: &ImageBuffer) -> Result<Vec<DecodeResult>, DecodeError>;
}

impl<O: DecodeOracle + ?Sized> DecodeOracle for std::sync::Arc<O> {
    fn decode(&self, image: &ImageBuffer) -> Result<Vec<DecodeResult>, DecodeError> {
        (**self).decode(image)
    }
}

impl<O: DecodeOracle + ?Sized> DecodeOracle for Box<O> {
    fn decode(&self, image: &ImageBuffer) -> Result<Vec<DecodeResult>, DecodeError> {
        (**self).decode(image)
    }
}

/// Number of results flagged valid. Duplicates are counted, not merged.
pub fn count_valid(results: &[DecodeResult]) -> usize {
    results.iter().filter(|r| r.valid).count()
}

/// Call `oracle`, turning a panic inside it into [`DecodeError::Panicked`].
///
/// Every decode the crate issues goes through here, so a decoder that blows
/// up on one frame costs that frame and nothing else.
pub fn guarded_decode<O: DecodeOracle + ?Sized>(
    oracle: &O,
    image: &ImageBuffer,
) -> Result<Vec<DecodeResult>, DecodeError> {
    panic::catch_unwind(AssertUnwindSafe(|| oracle.decode(image)))
        .unwrap_or_else(|payload| Err(DecodeError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// ── Tests ──────────────────────────────────────────────────────────
