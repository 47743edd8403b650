//! `/api/sweep/*`: run a full sweep in-page against the bundled QR and Data
//! Matrix oracles.
//!
//! The browser build has no threads, so sweeps here always run on one worker
//! with no decode timeout, whatever the request asks for.

use serde::Deserialize;

use crate::config::SweepConfig;
use crate::oracle::OracleSet;
use crate::report::SweepSummary;
use crate::routes::payload::ImagePayload;
use crate::routes::util::{error_json, to_json};
use crate::sweep::SweepController;

// ── GET /api/sweep/config ──────────────────────────────────────────

/// Default sweep configuration, as JSON.
pub fn handle_config_get() -> String {
    to_json(&SweepConfig::default())
}

// ── POST /api/sweep ────────────────────────────────────────────────

#[derive(Deserialize)]
struct SweepRequest {
    image: ImagePayload,
    #[serde(default)]
    config: SweepConfig,
    #[serde(default)]
    label: Option<String>,
}

/// Body: `{"image": ImagePayload, "config"?: SweepConfig, "label"?: string}`.
/// Returns a [`SweepSummary`].
pub fn handle_sweep_post(body: &str) -> String {
    match sweep_post(body) {
        Ok(json) => json,
        Err(e) => error_json(&e),
    }
}

fn sweep_post(body: &str) -> Result<String, String> {
    let req: SweepRequest =
        serde_json::from_str(body).map_err(|e| format!("invalid sweep request: {}", e))?;
    let image = req.image.into_image()?;
    let config = SweepConfig {
        workers: 1,
        decode_timeout_ms: None,
        ..req.config
    };
    let label = req.label.unwrap_or_else(|| "image".to_string());

    let controller = SweepController::new(OracleSet::standard(), config)?;
    let record = controller.run(&image, &label)?;
    Ok(to_json(&SweepSummary::from(&record)))
}
