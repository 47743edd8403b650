//! Greyscale planes and the cleanup passes the rqrr oracle can run before
//! detection.
//!
//! Filtering is done by `imageproc` on a borrowed `GrayImage` view of the
//! plane; only the quiet zone and final binarization are plain loops.

use ::image::GrayImage;
use imageproc::{contrast, filter};

use crate::image::{ImageBuffer, PixelMode};

/// Single-channel working image handed to rqrr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreyPlane {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GreyPlane {
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Luminance of any pixel mode. Colour uses BT.601 weights in integer
    /// math, `(77R + 150G + 29B) >> 8`; alpha is ignored.
    pub fn from_image(image: &ImageBuffer) -> Self {
        let bytes = image.as_bytes();
        let data = match image.mode() {
            PixelMode::Luma => bytes.to_vec(),
            mode => bytes
                .chunks_exact(mode.channels())
                .map(|px| {
                    let (r, g, b) = (px[0] as u32, px[1] as u32, px[2] as u32);
                    ((77 * r + 150 * g + 29 * b) >> 8) as u8
                })
                .collect(),
        };
        Self {
            width: image.width(),
            height: image.height(),
            data,
        }
    }

    fn to_gray(&self) -> Option<GrayImage> {
        let w = u32::try_from(self.width).ok()?;
        let h = u32::try_from(self.height).ok()?;
        GrayImage::from_raw(w, h, self.data.clone())
    }

    fn from_gray(img: GrayImage) -> Self {
        let (w, h) = img.dimensions();
        Self {
            width: w as usize,
            height: h as usize,
            data: img.into_raw(),
        }
    }

    /// Run an `imageproc` filter over the plane. A plane that does not fit
    /// a `GrayImage` is returned unfiltered.
    fn map_gray(&self, op: impl FnOnce(&GrayImage) -> GrayImage) -> Self {
        match self.to_gray() {
            Some(img) => Self::from_gray(op(&img)),
            None => {
                log::warn!("{}x{} plane is too large to filter", self.width, self.height);
                self.clone()
            }
        }
    }
}

/// Surround the plane with a white border `pad` pixels wide.
pub fn add_quiet_zone(plane: &GreyPlane, pad: usize) -> GreyPlane {
    let nw = plane.width + 2 * pad;
    let nh = plane.height + 2 * pad;
    let mut data = vec![255u8; nw * nh];
    for y in 0..plane.height {
        let src = &plane.data[y * plane.width..(y + 1) * plane.width];
        let dst = (y + pad) * nw + pad;
        data[dst..dst + plane.width].copy_from_slice(src);
    }
    GreyPlane { width: nw, height: nh, data }
}

/// σ of one blur pass.
pub const BLUR_SIGMA: f32 = 1.5;

/// Gaussian blur equivalent to `passes` rounds of σ = [`BLUR_SIGMA`]
/// (σ grows with the square root of the pass count). Zero passes is a copy.
pub fn gaussian_blur(plane: &GreyPlane, passes: usize) -> GreyPlane {
    if passes == 0 {
        return plane.clone();
    }
    let sigma = BLUR_SIGMA * (passes as f32).sqrt();
    plane.map_gray(|img| filter::gaussian_blur_f32(img, sigma))
}

/// Binarize against the mean of the `(2 * block + 1)²` window around each
/// pixel, minus `c`. Windows at the border replicate the edge pixels.
pub fn adaptive_threshold(plane: &GreyPlane, block: usize, c: i32) -> GreyPlane {
    let radius = block.min(plane.width.max(plane.height)) as u32;
    plane.map_gray(|img| {
        let mut mean = filter::box_filter(img, radius, radius);
        for (local, px) in mean.pixels_mut().zip(img.pixels()) {
            let dark = i32::from(px[0]) < i32::from(local[0]) - c;
            local[0] = if dark { 0 } else { 255 };
        }
        mean
    })
}

/// Otsu's global threshold: the level maximizing between-class variance.
/// Pass it to [`binarize`].
pub fn otsu_threshold(plane: &GreyPlane) -> u8 {
    match plane.to_gray() {
        Some(img) => contrast::otsu_level(&img),
        None => 128,
    }
}

/// Pixels at or below `threshold` become black, the rest white.
pub fn binarize(plane: &GreyPlane, threshold: u8) -> GreyPlane {
    GreyPlane {
        width: plane.width,
        height: plane.height,
        data: plane
            .data
            .iter()
            .map(|&p| if p > threshold { 255 } else { 0 })
            .collect(),
    }
}

// ── Tests ──────────────────────────────────────────────────────────
