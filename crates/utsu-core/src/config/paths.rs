//! Path utilities for Utsu configuration files

use std::path::PathBuf;

/// Get the default configuration directory
///
/// Returns: `~/.config/utsu` (platform config dir, falling back to home)
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("utsu")
}

/// Get the default path of a config file
///
/// Returns: `~/.config/utsu/{filename}`
pub fn default_config_path(filename: &str) -> PathBuf {
    default_config_dir().join(filename)
}
