//! Migration from the position-only file of older releases
//!
//! Earlier versions stored just the window position as `"X Y"` in
//! `window_position.txt`, relative to the working directory. The file is
//! also accepted next to the new config file.

use std::path::Path;

pub const LEGACY_POSITION_FILE: &str = "window_position.txt";

/// Parse `"X Y"`, rejecting anything but exactly two integers
pub fn parse_legacy_position(content: &str) -> Option<(i32, i32)> {
    let parts: Vec<&str> = content.split_whitespace().collect();
    match parts.as_slice() {
        [x, y] => Some((x.parse().ok()?, y.parse().ok()?)),
        _ => None,
    }
}

/// Read the legacy position file if present
pub fn load_legacy_position(path: &Path) -> Option<(i32, i32)> {
    let content = std::fs::read_to_string(path).ok()?;
    let position = parse_legacy_position(&content);
    if position.is_none() {
        log::warn!("Could not load window position from {:?}", path);
    }
    position
}
