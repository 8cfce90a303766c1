//! Platform-specific directory utilities
//!
//! Provides consistent directory paths across different operating systems,
//! following platform conventions for cache and data directories.

use std::path::PathBuf;

use runtime::RuntimeConfig;

/// Get the platform-specific log directory for realm
///
/// Follows platform conventions:
/// - macOS: `~/Library/Caches/realm/logs`
/// - Linux: `~/.cache/realm/logs` (or `$XDG_CACHE_HOME/realm/logs`)
/// - Windows: `%LOCALAPPDATA%\realm\logs`
/// - Fallback: `/tmp/realm/logs`
pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "realm")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/realm"))
        .join("logs")
}

/// Get the data directory for realm
///
/// `REALM_DATA_DIR` wins; otherwise the platform data directory, falling
/// back to `./save_data`.
pub fn data_dir() -> PathBuf {
    RuntimeConfig::from_env()
        .data_dir
        .unwrap_or_else(|| PathBuf::from("./save_data"))
}

/// Directory holding `world_{turn}.bin` files.
pub fn save_dir() -> PathBuf {
    data_dir().join("saves")
}
