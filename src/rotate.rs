//! Counter-clockwise rotation about the image center.
//!
//! Output keeps the input dimensions. Sampling is nearest-neighbour through
//! `imageproc`'s projective warp; pixels whose source falls outside the
//! image take the fill value on every channel.
//!
//! The pivot is the center of the pixel grid, `((w - 1) / 2, (h - 1) / 2)`,
//! so quarter turns of a square and half turns of any image land every
//! pixel exactly on another.

use ::image::{Luma, Pixel, Rgb, Rgba};
use imageproc::geometric_transformations::{self, Interpolation};

use crate::error::SweepError;
use crate::image::{ImageBuffer, PixelMode};

/// Rotate `image` by `degrees` counter-clockwise, filling uncovered pixels
/// with `fill` on every channel. Whole turns return a copy.
pub fn rotate(image: &ImageBuffer, degrees: f64, fill: u8) -> Result<ImageBuffer, SweepError> {
    let angle = degrees.rem_euclid(360.0);
    if angle == 0.0 {
        return Ok(image.clone());
    }
    // imageproc turns clockwise for positive theta (y grows downward)
    let theta = -(angle.to_radians() as f32);

    match image.mode() {
        PixelMode::Luma => turn(image, theta, Luma([fill])),
        PixelMode::Rgb => turn(image, theta, Rgb([fill; 3])),
        PixelMode::Rgba => turn(image, theta, Rgba([fill; 4])),
    }
}

fn turn<P>(image: &ImageBuffer, theta: f32, fill: P) -> Result<ImageBuffer, SweepError>
where
    P: Pixel<Subpixel = u8> + Send + Sync,
{
    let src = image.to_planar::<P>()?;
    let (w, h) = src.dimensions();
    let center = ((w as f32 - 1.0) / 2.0, (h as f32 - 1.0) / 2.0);
    let rotated = geometric_transformations::rotate(&src, center, theta, Interpolation::Nearest, fill);
    ImageBuffer::from_planar(image.mode(), rotated)
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// 4×4 greyscale ramp: value = 10 * (y * 4 + x).
    fn ramp() -> ImageBuffer {
        ImageBuffer::new(4, 4, PixelMode::Luma, (0..16).map(|i| i * 10).collect()).unwrap()
    }

    #[test]
    fn zero_degrees_is_identity() {
        let img = ramp();
        assert_eq!(rotate(&img, 0.0, 255).unwrap(), img);
    }

    #[test]
    fn full_turns_are_periodic() {
        let img = ramp();
        assert_eq!(rotate(&img, 360.0, 255).unwrap(), rotate(&img, 0.0, 255).unwrap());
        assert_eq!(rotate(&img, 720.0, 255).unwrap(), img);
        assert_eq!(rotate(&img, -360.0, 255).unwrap(), img);
        assert_eq!(rotate(&img, 450.0, 255).unwrap(), rotate(&img, 90.0, 255).unwrap());
    }

    #[test]
    fn quarter_turn_is_counter_clockwise() {
        let img = ramp();
        let rot = rotate(&img, 90.0, 255).unwrap();
        // top-right corner moves to top-left
        assert_eq!(rot.pixel(0, 0), img.pixel(3, 0));
        // top-left moves to bottom-left
        assert_eq!(rot.pixel(0, 3), img.pixel(0, 0));
        assert_eq!(rot.pixel(3, 3), img.pixel(0, 3));
    }

    #[test]
    fn negative_angle_matches_complement() {
        let img = ramp();
        assert_eq!(rotate(&img, -90.0, 255).unwrap(), rotate(&img, 270.0, 255).unwrap());
    }

    #[test]
    fn four_quarter_turns_round_trip() {
        let img = ramp();
        let mut cur = img.clone();
        for _ in 0..4 {
            cur = rotate(&cur, 90.0, 255).unwrap();
        }
        assert_eq!(cur, img);
    }

    #[test]
    fn half_turn_on_rectangle() {
        let img = ImageBuffer::new(3, 2, PixelMode::Luma, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let rot = rotate(&img, 180.0, 255).unwrap();
        assert_eq!(rot.as_bytes(), &[6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn oblique_angle_fills_corners() {
        let black = ImageBuffer::filled(20, 20, PixelMode::Rgb, 0).unwrap();
        let rot = rotate(&black, 45.0, 255).unwrap();
        assert_eq!((rot.width(), rot.height()), (20, 20));
        assert_eq!(rot.pixel(0, 0), &[255, 255, 255]);
        assert_eq!(rot.pixel(19, 19), &[255, 255, 255]);
        assert_eq!(rot.pixel(10, 10), &[0, 0, 0]);
    }

    #[test]
    fn rotation_keeps_mode() {
        let img = ImageBuffer::filled(6, 4, PixelMode::Rgba, 9).unwrap();
        let rot = rotate(&img, 33.0, 255).unwrap();
        assert_eq!(rot.mode(), PixelMode::Rgba);
        assert_eq!(rot.as_bytes().len(), img.as_bytes().len());
    }
}
