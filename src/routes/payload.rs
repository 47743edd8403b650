//! JSON wire form of an [`ImageBuffer`]: dimensions, mode and the raw
//! row-major channel bytes as standard base64.

use base64::prelude::*;
use serde::{Deserialize, Serialize};

use crate::image::{ImageBuffer, PixelMode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    pub width: usize,
    pub height: usize,
    pub mode: PixelMode,
    pub pixels: String,
}

impl ImagePayload {
    pub fn from_image(image: &ImageBuffer) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            mode: image.mode(),
            pixels: BASE64_STANDARD.encode(image.as_bytes()),
        }
    }

    pub fn into_image(self) -> Result<ImageBuffer, String> {
        let data = BASE64_STANDARD
            .decode(self.pixels.as_bytes())
            .map_err(|e| format!("pixels are not valid base64: {}", e))?;
        Ok(ImageBuffer::new(self.width, self.height, self.mode, data)?)
    }
}
