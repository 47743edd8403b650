//! Owned row-major pixel buffers.
//!
//! Every transform in the crate takes an `&ImageBuffer` and returns a new one;
//! nothing mutates its input. Channel values are `u8`, so the [0, 255]
//! invariant holds by construction.

use ::image::imageops::{self, FilterType};
use ::image::{Luma, Pixel, Rgb, Rgba};
use serde::{Deserialize, Serialize};

use crate::error::SweepError;

/// Channel layout of a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelMode {
    /// 3-channel colour.
    Rgb,
    /// 4-channel colour + alpha.
    Rgba,
    /// Single-channel greyscale.
    #[serde(rename = "l", alias = "luma")]
    Luma,
}

impl PixelMode {
    pub fn channels(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
            Self::Luma => 1,
        }
    }

    /// Parse the short names used by Pillow (`RGB`, `RGBA`, `L`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "rgb" => Some(Self::Rgb),
            "rgba" => Some(Self::Rgba),
            "l" | "luma" | "grey" | "gray" => Some(Self::Luma),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rgb => "rgb",
            Self::Rgba => "rgba",
            Self::Luma => "l",
        }
    }
}

/// A width × height image with interleaved channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: usize,
    height: usize,
    mode: PixelMode,
    data: Vec<u8>,
}

impl ImageBuffer {
    /// Wrap raw channel data. Fails on zero dimensions or a length that does
    /// not match `width * height * channels`.
    pub fn new(
        width: usize,
        height: usize,
        mode: PixelMode,
        data: Vec<u8>,
    ) -> Result<Self, SweepError> {
        if width == 0 || height == 0 {
            return Err(SweepError::InvalidImage(format!(
                "dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        let expected = width
            .checked_mul(height)
            .and_then(|px| px.checked_mul(mode.channels()))
            .ok_or_else(|| {
                SweepError::InvalidImage(format!("{}x{} overflows the address space", width, height))
            })?;
        if data.len() != expected {
            return Err(SweepError::InvalidImage(format!(
                "expected {} bytes for {}x{} {}, got {}",
                expected,
                width,
                height,
                mode.as_str(),
                data.len()
            )));
        }
        Ok(Self { width, height, mode, data })
    }

    /// An image where every channel of every pixel is `value`.
    pub fn filled(
        width: usize,
        height: usize,
        mode: PixelMode,
        value: u8,
    ) -> Result<Self, SweepError> {
        let len = width
            .checked_mul(height)
            .and_then(|px| px.checked_mul(mode.channels()))
            .ok_or_else(|| {
                SweepError::InvalidImage(format!("{}x{} overflows the address space", width, height))
            })?;
        Self::new(width, height, mode, vec![value; len])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn mode(&self) -> PixelMode {
        self.mode
    }

    pub fn channels(&self) -> usize {
        self.mode.channels()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Channel slice of the pixel at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let c = self.channels();
        let base = (y * self.width + x) * c;
        &self.data[base..base + c]
    }

    /// Build a new buffer of the same shape by mapping every channel value.
    pub(crate) fn with_data(&self, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), self.data.len());
        Self {
            width: self.width,
            height: self.height,
            mode: self.mode,
            data,
        }
    }

    /// Paste this image centered onto a `side × side` canvas filled with
    /// `fill`. The source lands at `((side - w) / 2, (side - h) / 2)`.
    pub fn pad_centered(&self, side: usize, fill: u8) -> Result<Self, SweepError> {
        if side < self.width || side < self.height {
            return Err(SweepError::InvalidImage(format!(
                "canvas side {} is smaller than the {}x{} source",
                side, self.width, self.height
            )));
        }
        let c = self.channels();
        let mut canvas = Self::filled(side, side, self.mode, fill)?;
        let (off_x, off_y) = Self::centered_offset(side, self.width, self.height);
        let row_len = self.width * c;
        for y in 0..self.height {
            let src = y * row_len;
            let dst = ((y + off_y) * side + off_x) * c;
            canvas.data[dst..dst + row_len].copy_from_slice(&self.data[src..src + row_len]);
        }
        Ok(canvas)
    }

    /// Top-left offset that centers a `width × height` image on a square of `side`.
    pub fn centered_offset(side: usize, width: usize, height: usize) -> (usize, usize) {
        ((side - width) / 2, (side - height) / 2)
    }

    /// Nearest-neighbour resize to exactly `width × height`.
    pub fn resize_nearest(&self, width: usize, height: usize) -> Result<Self, SweepError> {
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }
        if width == 0 || height == 0 {
            return Err(SweepError::InvalidImage(format!(
                "cannot resize to {}x{}",
                width, height
            )));
        }
        let (w, h) = (to_u32(width)?, to_u32(height)?);
        match self.mode {
            PixelMode::Luma => self.resized::<Luma<u8>>(w, h),
            PixelMode::Rgb => self.resized::<Rgb<u8>>(w, h),
            PixelMode::Rgba => self.resized::<Rgba<u8>>(w, h),
        }
    }

    fn resized<P>(&self, width: u32, height: u32) -> Result<Self, SweepError>
    where
        P: Pixel<Subpixel = u8> + 'static,
    {
        let src = self.to_planar::<P>()?;
        Self::from_planar(self.mode, imageops::resize(&src, width, height, FilterType::Nearest))
    }
}

// ── image crate interop ────────────────────────────────────────────

/// An `image` crate buffer with `u8` channels.
pub(crate) type Planar<P> = ::image::ImageBuffer<P, Vec<u8>>;

impl ImageBuffer {
    /// Copy into an `image` crate buffer. `P` must have as many channels as
    /// this buffer's mode.
    pub(crate) fn to_planar<P: Pixel<Subpixel = u8>>(&self) -> Result<Planar<P>, SweepError> {
        if usize::from(P::CHANNEL_COUNT) != self.channels() {
            return Err(SweepError::InvalidImage(format!(
                "{}-channel pixel type used for a {} image",
                P::CHANNEL_COUNT,
                self.mode.as_str()
            )));
        }
        let (w, h) = (to_u32(self.width)?, to_u32(self.height)?);
        Planar::<P>::from_raw(w, h, self.data.clone()).ok_or_else(|| {
            SweepError::InvalidImage(format!("{}x{} buffer is too short", w, h))
        })
    }

    /// Take back a buffer produced by [`to_planar`](Self::to_planar) or an
    /// `image`/`imageproc` operation on it.
    pub(crate) fn from_planar<P: Pixel<Subpixel = u8>>(
        mode: PixelMode,
        planar: Planar<P>,
    ) -> Result<Self, SweepError> {
        let (w, h) = planar.dimensions();
        Self::new(w as usize, h as usize, mode, planar.into_raw())
    }
}

fn to_u32(len: usize) -> Result<u32, SweepError> {
    u32::try_from(len).map_err(|_| SweepError::InvalidImage(format!("dimension {} is too large", len)))
}

// ── Tests ──────────────────────────────────────────────────────────
