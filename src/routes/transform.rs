//! `/api/noise` and `/api/rotate`: single transforms, for previewing what a
//! sweep feeds the decoder.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::noise::{self, DEFAULT_STDDEV};
use crate::rotate;
use crate::routes::payload::ImagePayload;
use crate::routes::util::{error_json, get_param, parse_query, to_json};

// ── POST /api/noise ────────────────────────────────────────────────

#[derive(Deserialize)]
struct NoiseRequest {
    image: ImagePayload,
    #[serde(default)]
    stddev: Option<f64>,
    #[serde(default)]
    seed: Option<u64>,
}

/// Body: `{"image": ImagePayload, "stddev"?: f64, "seed"?: u64}`.
/// Returns the noised image.
pub fn handle_noise_post(body: &str) -> String {
    match noise_post(body) {
        Ok(json) => json,
        Err(e) => error_json(&e),
    }
}

fn noise_post(body: &str) -> Result<String, String> {
    let req: NoiseRequest =
        serde_json::from_str(body).map_err(|e| format!("invalid noise request: {}", e))?;
    let image = req.image.into_image()?;
    let mut rng = ChaCha8Rng::seed_from_u64(req.seed.unwrap_or_else(rand::random));
    let noised = noise::add_noise(&image, req.stddev.unwrap_or(DEFAULT_STDDEV), &mut rng)?;
    Ok(to_json(&ImagePayload::from_image(&noised)))
}

// ── POST /api/rotate ───────────────────────────────────────────────

#[derive(Deserialize)]
struct RotateRequest {
    image: ImagePayload,
    degrees: f64,
}

/// Body: `{"image": ImagePayload, "degrees": f64}`. Query `?fill=0..255`
/// sets the background (default white). Returns the rotated image.
pub fn handle_rotate_post(query: &str, body: &str) -> String {
    match rotate_post(query, body) {
        Ok(json) => json,
        Err(e) => error_json(&e),
    }
}

fn rotate_post(query: &str, body: &str) -> Result<String, String> {
    let params = parse_query(query);
    let fill = match get_param(&params, "fill") {
        Some(raw) => raw
            .parse::<u8>()
            .map_err(|_| format!("fill must be 0-255, got `{}`", raw))?,
        None => 255,
    };
    let req: RotateRequest =
        serde_json::from_str(body).map_err(|e| format!("invalid rotate request: {}", e))?;
    if !req.degrees.is_finite() {
        return Err("degrees must be finite".to_string());
    }
    let image = req.image.into_image()?;
    let rotated = rotate::rotate(&image, req.degrees, fill)?;
    Ok(to_json(&ImagePayload::from_image(&rotated)))
}
