//! Path utilities for locating fixture documents.

use std::path::PathBuf;

/// Returns the `testdata/` directory of this crate.
pub fn testdata_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// Returns the path of a named fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
    testdata_dir().join(name)
}

/// Reads a fixture file, panicking with the path if it is missing.
pub fn read_fixture(name: &str) -> Vec<u8> {
    let path = fixture_path(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("cannot read {}: {}", path.display(), e))
}
