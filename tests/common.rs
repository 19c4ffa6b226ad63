//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Once;

use cafefs::{Disk, FileSystem};

static LOGGER: Once = Once::new();

pub fn init_logger() {
    LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Per-test image path under the system temp directory.
pub fn image_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("cafefs_{name}.img"))
}

/// Formats and mounts a fresh filesystem on a `blocks`-sized image.
pub fn prepare_fs(name: &str, blocks: u32) -> FileSystem {
    init_logger();
    let disk = Disk::new(image_path(name), blocks);
    let mut fs = FileSystem::new(disk);
    fs.format().unwrap();
    fs.mount().unwrap();
    fs
}
