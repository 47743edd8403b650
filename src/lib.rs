//! Barcode robustness sweep.
//!
//! Takes a synthetic barcode image, adds Gaussian noise, rotates it through
//! every integer degree and records how often a decoder still reads it. The
//! pipeline is [`noise`] → [`rotate`] → [`oracle`], driven per image by
//! [`sweep::SweepController`] and per payload list by [`batch::BatchRunner`].
//!
//! Natively the crate is used from the `sweep` binary. In the browser it
//! exports `handle_request(method, path, query, body)` for a Web Worker to
//! call, routed with `matchit` and answering in JSON.

use wasm_bindgen::prelude::*;

pub mod batch;
pub mod capacity;
pub mod clock;
pub mod config;
pub mod encoder;
pub mod error;
pub mod image;
pub mod noise;
pub mod oracle;
pub mod report;
pub mod rotate;
pub mod routes;
pub mod sweep;
#[cfg(not(target_arch = "wasm32"))]
pub mod worker;

pub use batch::{BatchRun, BatchRunner, EncodeJob};
pub use config::{BatchConfig, SweepConfig};
pub use encoder::{BarcodeEncoder, ErrorCorrection, SymbolEncoder, SymbolType};
pub use error::{DecodeError, EncodeError, SweepError};
pub use image::{ImageBuffer, PixelMode};
pub use oracle::{
    DataMatrixOracle, DecodeOracle, DecodeResult, OracleSet, RqrrOracle, SymbolFormat,
};
pub use report::{BatchReport, SweepSummary};
pub use sweep::{AngleSample, SweepController, SweepRecord, FULL_TURN};

/// Process an HTTP-like request and return a JSON body.
///
/// # Arguments
/// * `method` — HTTP method (`GET` or `POST`)
/// * `path`   — URL path (e.g. `/api/sweep`)
/// * `query`  — Query string (e.g. `?fill=0`)
/// * `body`   — Request body, JSON for POST routes. Empty for GET.
#[wasm_bindgen]
pub fn handle_request(method: &str, path: &str, query: &str, body: &str) -> String {
    let mut router = matchit::Router::new();

    router.insert("/api/sweep", "sweep").ok();
    router.insert("/api/sweep/config", "sweep_config").ok();
    router.insert("/api/noise", "noise").ok();
    router.insert("/api/rotate", "rotate").ok();

    match router.at(path) {
        Ok(matched) => match (*matched.value, method) {
            ("sweep_config", "GET") => routes::sweep::handle_config_get(),
            ("sweep", "POST") => routes::sweep::handle_sweep_post(body),
            ("noise", "POST") => routes::transform::handle_noise_post(body),
            ("rotate", "POST") => routes::transform::handle_rotate_post(query, body),
            _ => method_not_allowed(),
        },
        Err(_) => not_found(),
    }
}

fn not_found() -> String {
    routes::util::error_json("404 — route not found")
}

fn method_not_allowed() -> String {
    routes::util::error_json("405 — method not allowed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use routes::payload::ImagePayload;

    fn image_json(img: &ImageBuffer) -> String {
        serde_json::to_string(&ImagePayload::from_image(img)).unwrap()
    }

    #[test]
    fn returns_404_for_unknown_route() {
        let json = handle_request("GET", "/api/nonexistent", "", "");
        assert!(json.contains("404"));
    }

    #[test]
    fn returns_405_for_wrong_method() {
        assert!(handle_request("POST", "/api/sweep/config", "", "").contains("405"));
        assert!(handle_request("GET", "/api/sweep", "", "").contains("405"));
    }

    #[test]
    fn routes_sweep_config() {
        let json = handle_request("GET", "/api/sweep/config", "", "");
        assert!(json.contains("noise_stddev"));
        assert!(json.contains("decode_timeout_ms"));
    }

    #[test]
    fn routes_noise_keeps_shape() {
        let img = ImageBuffer::filled(3, 2, PixelMode::Rgba, 90).unwrap();
        let body = format!(r#"{{"image": {}, "seed": 1}}"#, image_json(&img));
        let out: ImagePayload = serde_json::from_str(&handle_request("POST", "/api/noise", "", &body)).unwrap();
        assert_eq!((out.width, out.height, out.mode), (3, 2, PixelMode::Rgba));
    }

    #[test]
    fn routes_rotate_keeps_size() {
        let img = ImageBuffer::filled(5, 3, PixelMode::Rgb, 0).unwrap();
        let body = format!(r#"{{"image": {}, "degrees": 30}}"#, image_json(&img));
        let out: ImagePayload =
            serde_json::from_str(&handle_request("POST", "/api/rotate", "", &body)).unwrap();
        assert_eq!((out.width, out.height), (5, 3));
    }

    #[test]
    fn routes_sweep_on_blank_image() {
        let img = ImageBuffer::filled(6, 6, PixelMode::Rgb, 255).unwrap();
        let body = format!(r#"{{"image": {}, "config": {{"seed": 2}}}}"#, image_json(&img));
        let summary: serde_json::Value =
            serde_json::from_str(&handle_request("POST", "/api/sweep", "", &body)).unwrap();
        assert_eq!(summary["total_found"], 0);
        assert_eq!(summary["success_ratio"], 0.0);
        assert_eq!(summary["label"], "image");
    }

    #[test]
    fn malformed_body_returns_error_json() {
        let json = handle_request("POST", "/api/noise", "", "not json");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["error"].as_str().unwrap().contains("invalid noise request"));
    }
}
