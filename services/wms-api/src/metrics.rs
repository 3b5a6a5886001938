//! Request and render metrics.

use metrics::{counter, histogram};
use std::time::Instant;

/// Record a request against an endpoint group (`api`, `render`, `wms`).
pub fn record_request(endpoint: &'static str) {
    counter!("requests_total", "endpoint" => endpoint).increment(1);
}

/// Record a finished render.
pub fn record_render(duration_ms: f64, success: bool) {
    counter!("render_requests_total").increment(1);
    if !success {
        counter!("render_errors_total").increment(1);
    }
    histogram!("render_duration_ms").record(duration_ms);
}

pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_micros() as f64 / 1000.0
    }
}
