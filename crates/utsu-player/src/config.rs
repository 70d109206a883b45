//! Player configuration for utsu-player
//!
//! Configuration is stored as YAML in the user's config directory.
//! Default location: ~/.config/utsu/config.yaml

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use utsu_core::config::{load_config, MixerConfig};
use utsu_core::graph::LocatorCheck;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Initial mixer values and deferred-play timing
    pub mixer: MixerConfig,
    /// YAML track catalog (None = built-in reference catalog)
    pub catalog_path: Option<PathBuf>,
    /// Directory stem paths are resolved against
    /// (None = accept every locator without checking)
    pub audio_root: Option<PathBuf>,
}

impl PlayerConfig {
    /// Load the player config, clamping out-of-range mixer values
    ///
    /// Missing or unreadable files give the defaults (see [`load_config`]).
    pub fn load(path: &Path) -> Self {
        let mut config: PlayerConfig = load_config(path);
        for note in config.mixer.sanitize() {
            log::warn!("PlayerConfig::load: mixer.{} (out of range)", note);
        }
        config
    }

    /// Locator resolution strategy for the audio graph
    pub fn locator_check(&self) -> LocatorCheck {
        match &self.audio_root {
            Some(root) => LocatorCheck::Filesystem { root: root.clone() },
            None => LocatorCheck::AcceptAll,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use utsu_core::config::save_config;

    #[test]
    fn test_default_config() {
        let config = PlayerConfig::default();
        assert_eq!(config.mixer, MixerConfig::default());
        assert!(config.catalog_path.is_none());
        assert!(matches!(config.locator_check(), LocatorCheck::AcceptAll));
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "mixer:\n  master_volume: 65\naudio_root: /srv/stems\n";
        let config: PlayerConfig = load_yaml(yaml);
        assert_eq!(config.mixer.master_volume, 65.0);
        assert_eq!(config.mixer.channel_volume, 75.0);
        match config.locator_check() {
            LocatorCheck::Filesystem { root } => assert_eq!(root, PathBuf::from("/srv/stems")),
            other => panic!("unexpected locator check {:?}", other),
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let config = PlayerConfig {
            catalog_path: Some(PathBuf::from("/srv/catalog.yaml")),
            ..Default::default()
        };
        save_config(&config, &path).unwrap();

        let loaded = PlayerConfig::load(&path);
        assert_eq!(loaded.catalog_path, config.catalog_path);
        assert_eq!(loaded.mixer, config.mixer);
    }

    #[test]
    fn test_load_clamps_mixer_section() {
        let yaml = "mixer:\n  master_volume: 250\n  channel_volume: -10\n  eq: 60\n";
        let config = load_yaml(yaml);
        assert_eq!(config.mixer.master_volume, 100.0);
        assert_eq!(config.mixer.channel_volume, 0.0);
        assert_eq!(config.mixer.eq, 60.0);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PlayerConfig::load(&dir.path().join("config.yaml"));
        assert_eq!(config.mixer, MixerConfig::default());
        assert!(config.audio_root.is_none());
    }

    fn load_yaml(yaml: &str) -> PlayerConfig {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, yaml).unwrap();
        PlayerConfig::load(&path)
    }
}
