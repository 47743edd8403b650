//! Base-image producers.
//!
//! Symbol encoding is an external concern; [`BarcodeEncoder`] only renders
//! the module matrix produced by the `qrcode` or `datamatrix` crate into an
//! RGB buffer.

use std::fmt;

use datamatrix::{DataMatrix, SymbolList};
use qrcode::{Color, EcLevel, QrCode};
use serde::{Deserialize, Serialize};

use crate::error::EncodeError;
use crate::image::{ImageBuffer, PixelMode};

/// Symbology requested from an encoder. Names follow BWIPP/treepoem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolType {
    #[serde(rename = "qrcode")]
    QrCode,
    #[serde(rename = "datamatrix")]
    DataMatrix,
}

impl SymbolType {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "qrcode" | "qr" => Some(Self::QrCode),
            "datamatrix" | "dm" => Some(Self::DataMatrix),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::QrCode => "qrcode",
            Self::DataMatrix => "datamatrix",
        }
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// QR error-correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorCorrection {
    L,
    #[default]
    M,
    Q,
    H,
}

impl ErrorCorrection {
    pub fn parse(level: &str) -> Option<Self> {
        match level.trim().to_ascii_uppercase().as_str() {
            "L" => Some(Self::L),
            "M" => Some(Self::M),
            "Q" => Some(Self::Q),
            "H" => Some(Self::H),
            _ => None,
        }
    }

    fn to_qrcode(self) -> EcLevel {
        match self {
            Self::L => EcLevel::L,
            Self::M => EcLevel::M,
            Self::Q => EcLevel::Q,
            Self::H => EcLevel::H,
        }
    }
}

/// Produces a base image for a payload.
pub trait SymbolEncoder {
    fn encode(&self, payload: &[u8], symbol: SymbolType) -> Result<ImageBuffer, EncodeError>;
}

/// Renders QR codes (through `qrcode`) and Data Matrix symbols (through
/// `datamatrix`): black modules on white, `scale` pixels per module,
/// `quiet_zone` modules of margin on every side. `ec_level` only applies to
/// QR; Data Matrix always uses its fixed ECC 200 scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarcodeEncoder {
    pub scale: u32,
    pub quiet_zone: u32,
    pub ec_level: ErrorCorrection,
}

impl Default for BarcodeEncoder {
    fn default() -> Self {
        Self {
            scale: 4,
            quiet_zone: 4,
            ec_level: ErrorCorrection::M,
        }
    }
}

impl SymbolEncoder for BarcodeEncoder {
    fn encode(&self, payload: &[u8], symbol: SymbolType) -> Result<ImageBuffer, EncodeError> {
        if self.scale == 0 {
            return Err(EncodeError::Payload("scale must be at least 1".to_string()));
        }

        match symbol {
            SymbolType::QrCode => {
                let code = QrCode::with_error_correction_level(payload, self.ec_level.to_qrcode())
                    .map_err(|e| EncodeError::Payload(e.to_string()))?;
                let n = code.width();
                let dark = (0..n)
                    .flat_map(|y| (0..n).map(move |x| (x, y)))
                    .filter(|&(x, y)| code[(x, y)] == Color::Dark);
                self.render(n, n, dark)
            }
            SymbolType::DataMatrix => {
                let code = DataMatrix::encode(payload, SymbolList::default().enforce_square())
                    .map_err(|e| EncodeError::Payload(format!("{:?}", e)))?;
                let bitmap = code.bitmap();
                self.render(bitmap.width(), bitmap.height(), bitmap.pixels())
            }
        }
    }
}

impl BarcodeEncoder {
    /// Paint the `dark` modules of a `modules_w × modules_h` symbol.
    fn render(
        &self,
        modules_w: usize,
        modules_h: usize,
        dark: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<ImageBuffer, EncodeError> {
        let scale = self.scale as usize;
        let margin = self.quiet_zone as usize;
        let width = (modules_w + 2 * margin) * scale;
        let height = (modules_h + 2 * margin) * scale;
        let mut data = vec![255u8; width * height * 3];

        for (mx, my) in dark {
            let px = (margin + mx) * scale;
            let py = (margin + my) * scale;
            for y in py..py + scale {
                let row = (y * width + px) * 3;
                data[row..row + scale * 3].fill(0);
            }
        }

        ImageBuffer::new(width, height, PixelMode::Rgb, data)
            .map_err(|e| EncodeError::Payload(e.to_string()))
    }
}

// ── Tests ──────────────────────────────────────────────────────────
