//! Track catalog - the fixed, ordered set of tracks for a session
//!
//! Each track names one audio locator (path or URI) per stem. The catalog is
//! read once at startup and never changes afterwards.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Stem;

/// Errors that can occur while building or loading a catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Track catalog is empty")]
    Empty,

    #[error("Duplicate track id {0} in catalog")]
    DuplicateId(u32),

    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Per-stem audio locators for one track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemSources {
    pub drums: String,
    pub bass: String,
    pub melody: String,
    pub vocals: String,
}

impl StemSources {
    /// Locator for a given stem
    pub fn get(&self, stem: Stem) -> &str {
        match stem {
            Stem::Drums => &self.drums,
            Stem::Bass => &self.bass,
            Stem::Melody => &self.melody,
            Stem::Vocals => &self.vocals,
        }
    }
}

/// A track: identity, display name and its stems
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: u32,
    pub name: String,
    pub stems: StemSources,
}

impl Track {
    /// Locator for the stem feeding channel `stem`
    pub fn source(&self, stem: Stem) -> &str {
        self.stems.get(stem)
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct CatalogFile {
    tracks: Vec<Track>,
}

/// Ordered, non-empty list of tracks
#[derive(Debug, Clone)]
pub struct TrackCatalog {
    tracks: Vec<Track>,
}

impl TrackCatalog {
    /// Build a catalog, rejecting empty lists and duplicate ids
    pub fn new(tracks: Vec<Track>) -> Result<Self, CatalogError> {
        if tracks.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (i, track) in tracks.iter().enumerate() {
            if tracks[..i].iter().any(|t| t.id == track.id) {
                return Err(CatalogError::DuplicateId(track.id));
            }
        }
        Ok(Self { tracks })
    }

    /// The reference 4-track configuration
    ///
    /// Stems live at `/audio/track{n}/{stem}.mp3`.
    pub fn reference() -> Self {
        let tracks = (1..=4)
            .map(|n| {
                let locator = |stem: Stem| format!("/audio/track{}/{}.mp3", n, stem.name());
                Track {
                    id: n,
                    name: format!("TRACK_{:02}", n),
                    stems: StemSources {
                        drums: locator(Stem::Drums),
                        bass: locator(Stem::Bass),
                        melody: locator(Stem::Melody),
                        vocals: locator(Stem::Vocals),
                    },
                }
            })
            .collect();
        Self { tracks }
    }

    /// Parse a catalog from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        Self::new(file.tracks)
    }

    /// Load a catalog from a YAML file
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        log::info!("TrackCatalog::load: Loading from {:?}", path);
        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_yaml(&contents)?;
        log::info!("TrackCatalog::load: {} tracks", catalog.len());
        Ok(catalog)
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Always false: construction rejects empty catalogs
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_YAML: &str = r#"
tracks:
  - id: 7
    name: Night Drive
    stems:
      drums: stems/night/drums.ogg
      bass: stems/night/bass.ogg
      melody: stems/night/melody.ogg
      vocals: stems/night/vocals.ogg
  - id: 9
    name: Daybreak
    stems:
      drums: https://cdn.example.com/daybreak/drums.mp3
      bass: https://cdn.example.com/daybreak/bass.mp3
      melody: https://cdn.example.com/daybreak/melody.mp3
      vocals: https://cdn.example.com/daybreak/vocals.mp3
"#;

    #[test]
    fn test_reference_catalog() {
        let catalog = TrackCatalog::reference();
        assert_eq!(catalog.len(), 4);
        let second = catalog.get(1).unwrap();
        assert_eq!(second.name, "TRACK_02");
        assert_eq!(second.source(Stem::Melody), "/audio/track2/melody.mp3");
        assert!(catalog.get(4).is_none());
    }

    #[test]
    fn test_parse_yaml_catalog() {
        let catalog = TrackCatalog::from_yaml(CATALOG_YAML).unwrap();
        assert_eq!(catalog.len(), 2);
        let names: Vec<_> = catalog.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Night Drive", "Daybreak"]);
        assert_eq!(
            catalog.get(0).unwrap().source(Stem::Vocals),
            "stems/night/vocals.ogg"
        );
    }

    #[test]
    fn test_missing_stem_is_rejected() {
        let yaml = r#"
tracks:
  - id: 1
    name: Broken
    stems:
      drums: a.mp3
      bass: b.mp3
      melody: c.mp3
"#;
        assert!(matches!(
            TrackCatalog::from_yaml(yaml),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_and_duplicate_catalogs_are_rejected() {
        assert!(matches!(TrackCatalog::new(Vec::new()), Err(CatalogError::Empty)));

        let track = TrackCatalog::reference().get(0).unwrap().clone();
        let result = TrackCatalog::new(vec![track.clone(), track]);
        assert!(matches!(result, Err(CatalogError::DuplicateId(1))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.yaml");
        std::fs::write(&path, CATALOG_YAML).unwrap();

        let catalog = TrackCatalog::load(&path).unwrap();
        assert_eq!(catalog.get(1).unwrap().id, 9);

        let missing = TrackCatalog::load(&dir.path().join("nope.yaml"));
        assert!(matches!(missing, Err(CatalogError::Io(_))));
    }
}
