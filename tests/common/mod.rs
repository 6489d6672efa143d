//! Shared helpers for the integration suites.

use std::path::PathBuf;

use etalon::pattern::{COMPARE_TOLERANCE, find_mismatch};
use etalon::{EnvironmentSettings, TestEnvironment};

/// Brings up a GPU environment, or returns `None` so the calling test can
/// skip when the host has no usable adapter.
pub fn test_env() -> Option<TestEnvironment> {
    let _ = env_logger::builder().is_test(true).try_init();
    match TestEnvironment::new(&EnvironmentSettings::default()) {
        Ok(env) => Some(env),
        Err(e) => {
            eprintln!("skipping GPU test: {e}");
            None
        }
    }
}

/// Asserts a readback matches the reference model, dumping the actual
/// pixels as a PNG for post-mortem inspection when it does not.
pub fn assert_gradient(pixels: &[u8], width: u32, height: u32, name: &str) {
    if let Some(miss) = find_mismatch(pixels, width, height, COMPARE_TOLERANCE) {
        let path = dump_png(name, width, height, pixels);
        panic!(
            "readback diverged from the model at ({}, {}): expected {:?}, got {:?} (dumped to {})",
            miss.x,
            miss.y,
            miss.expected,
            miss.actual,
            path.display()
        );
    }
}

fn dump_png(name: &str, width: u32, height: u32, pixels: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("etalon_{name}.png"));
    if let Some(img) = image::RgbaImage::from_raw(width, height, pixels.to_vec()) {
        let _ = img.save(&path);
    }
    path
}
