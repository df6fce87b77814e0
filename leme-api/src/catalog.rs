//! Track catalog
//!
//! Static map from track key to track metadata, parsed once at startup from
//! a JSON resource and never mutated afterwards. Lookup is exact,
//! case-sensitive key equality.

use leme_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

/// One unit within a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    #[serde(alias = "titulo")]
    pub title: String,

    #[serde(alias = "url", alias = "link")]
    pub content_url: String,
}

/// Catalog entry for one track
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackEntry {
    #[serde(alias = "nome", alias = "name")]
    pub display_name: String,

    #[serde(default, alias = "id_trilha")]
    pub id: Option<Uuid>,

    #[serde(alias = "modulos")]
    pub modules: Vec<ModuleDescriptor>,
}

/// Read-only track catalog
#[derive(Debug, Clone, Default)]
pub struct TrackCatalog {
    entries: HashMap<String, TrackEntry>,
}

impl TrackCatalog {
    /// Build a catalog from already-parsed entries
    ///
    /// Every entry must carry at least one module so that a catalog hit
    /// always yields a usable module list.
    pub fn new(entries: HashMap<String, TrackEntry>) -> Result<Self> {
        for (key, entry) in &entries {
            if key.is_empty() {
                return Err(Error::invalid_artifact("catalog", "empty track key"));
            }
            if entry.modules.is_empty() {
                return Err(Error::invalid_artifact(
                    "catalog",
                    format!("track {} has no modules", key),
                ));
            }
        }
        Ok(Self { entries })
    }

    /// Parse a catalog from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: HashMap<String, TrackEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    /// Load the catalog JSON resource
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&json)
    }

    /// Look up a track by exact key
    pub fn lookup(&self, key: &str) -> Option<&TrackEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of tracks available
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Track keys in sorted order (for startup logging and diagnostics)
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
