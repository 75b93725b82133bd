#![allow(dead_code)]

use bytes::Bytes;
use std::sync::Once;
use tracing::Level;

/// Global one-time tracing initialization guard for the integration tests.
static INIT_TRACING: Once = Once::new();

/// Install a compact `tracing` subscriber so decoder diagnostics are visible
/// when running with `--nocapture`.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_target(false)
            .without_time()
            .try_init();
    });
}

/// Decode a hex fixture into an owned frame buffer.
pub fn frame(hex_str: &str) -> Bytes {
    Bytes::from(hex::decode(hex_str).expect("fixture hex must be valid"))
}
