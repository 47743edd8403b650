//! Data Matrix decoding through rxing, the Rust port of ZXing.
//!
//! rxing reports a frame without a readable symbol as an error (not found,
//! checksum, format). For a sweep every one of those is a miss, so they come
//! back as an empty result list rather than a [`DecodeError`].

use rxing::BarcodeFormat;

use super::preprocess::GreyPlane;
use super::{DecodeOracle, DecodeResult, SymbolFormat};
use crate::error::DecodeError;
use crate::image::ImageBuffer;

/// rxing-backed [`DecodeOracle`] that only looks for Data Matrix symbols.
///
/// Results carry the decoded text; corners are left at the origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataMatrixOracle;

impl DataMatrixOracle {
    pub fn new() -> Self {
        Self
    }
}

impl DecodeOracle for DataMatrixOracle {
    fn decode(&self, image: &ImageBuffer) -> Result<Vec<DecodeResult>, DecodeError> {
        let grey = GreyPlane::from_image(image);
        let (Ok(width), Ok(height)) = (u32::try_from(grey.width), u32::try_from(grey.height)) else {
            return Err(DecodeError::Backend(format!(
                "{}x{} frame is too large for rxing",
                grey.width, grey.height
            )));
        };

        match rxing::helpers::detect_in_luma(grey.data, width, height, Some(BarcodeFormat::DATA_MATRIX)) {
            Ok(found) => {
                log::debug!("rxing decoded a Data Matrix symbol");
                Ok(vec![DecodeResult::valid(SymbolFormat::DataMatrix, found.getText())])
            }
            Err(miss) => {
                log::trace!("no Data Matrix in frame: {:?}", miss);
                Ok(Vec::new())
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
