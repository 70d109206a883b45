//! Configuration for Utsu
//!
//! - Generic YAML config loading/saving
//! - Standard config paths
//! - Mixer defaults and deferred-play timing
//!
//! # Usage
//!
//! ```ignore
//! use utsu_core::config::{load_config, default_config_path, MixerConfig};
//!
//! let config: MixerConfig = load_config(&default_config_path("config.yaml"));
//! ```

mod io;
mod mixer;
mod paths;

pub use io::{load_config, read_config, save_config, ConfigError};
pub use mixer::MixerConfig;
pub use paths::{default_config_dir, default_config_path};
