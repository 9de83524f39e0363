use std::path::{Path, PathBuf};

use kernelscope_core::color::Pixel;

/// A warm, mid-saturation colour used across property tests.
pub const WARM_PIXEL: Pixel = [200, 100, 50];

/// A fully saturated primary.
pub const PURE_RED: Pixel = [255, 0, 0];

/// A pixel that is almost, but not quite, neutral grey.
pub const NEAR_GREY: Pixel = [128, 130, 126];

/// A spread of pixels covering black, white, greys, primaries and mixed colours.
pub fn reference_pixels() -> Vec<Pixel> {
    vec![
        [0, 0, 0],
        [255, 255, 255],
        [128, 128, 128],
        [10, 10, 10],
        PURE_RED,
        [0, 255, 0],
        [0, 0, 255],
        WARM_PIXEL,
        NEAR_GREY,
        [30, 160, 220],
        [250, 240, 5],
        [77, 12, 140],
    ]
}

/// The 3x3 grey levels used by the kernel product scenarios.
pub const SCENARIO_PATCH: [[u8; 3]; 3] = [[10, 20, 30], [40, 50, 60], [70, 80, 90]];

/// Write raw JSON to `dir/name` and return the path. Used to craft preset
/// files the public API would never produce.
pub fn write_raw_json(dir: &Path, name: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value).expect("serialize fixture"))
        .expect("failed to write fixture file");
    path
}

/// Get a temporary directory for test fixtures that persists for the test run.
pub fn fixture_dir() -> tempfile::TempDir {
    tempfile::TempDir::new().expect("failed to create temp dir for fixtures")
}
