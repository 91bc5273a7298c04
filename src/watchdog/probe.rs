//! # Init-system detection.
//!
//! Equivalent of `sd_booted(3)`: the host was booted with systemd when the
//! runtime unit directory exists **and is a directory**. The path itself is
//! not followed, so a symlink or a regular file does not count.

use std::fs;
use std::path::Path;

/// Returns `true` when `dir` exists and is a directory (not a symlink to one).
///
/// # Example
/// ```
/// use unitvisor::is_running_systemd;
///
/// assert!(!is_running_systemd("/definitely/not/here".as_ref()));
/// ```
pub fn is_running_systemd(dir: &Path) -> bool {
    fs::symlink_metadata(dir)
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}
