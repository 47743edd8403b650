//! Wall-clock stopwatch that also works inside a Web Worker.
//!
//! `std::time::Instant` panics on `wasm32-unknown-unknown`, so the wasm build
//! reads `performance.now()` through wasm-bindgen instead.

use std::time::Duration;

#[cfg(target_arch = "wasm32")]
mod imp {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = performance, js_name = now)]
        fn performance_now() -> f64;
    }

    pub fn now_ms() -> f64 {
        performance_now()
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use std::sync::OnceLock;
    use std::time::Instant;

    static EPOCH: OnceLock<Instant> = OnceLock::new();

    pub fn now_ms() -> f64 {
        EPOCH.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
    }
}

/// Measures elapsed time from [`Stopwatch::start`].
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started_ms: f64,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self { started_ms: imp::now_ms() }
    }

    pub fn elapsed(&self) -> Duration {
        let ms = (imp::now_ms() - self.started_ms).max(0.0);
        Duration::from_secs_f64(ms / 1000.0)
    }
}
