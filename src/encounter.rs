//! Encounters - Reference Lists and Resolution
//!
//! Resolution fails fast: one unknown monster or unloadable library aborts
//! the whole encounter, no partial result is returned.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::{LibraryLoader, LoadError};
use crate::config::SheetConfig;
use crate::monster::MonsterRecord;

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("Could not read encounter {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid encounter JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid encounter YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Encounter monster #{index} has no name")]
    MissingName { index: usize },

    #[error("Quantity of {monster:?} must be at least 1")]
    InvalidQuantity { monster: String },
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Encounter {encounter:?} has no default library source")]
    MissingSource { encounter: String },

    #[error("Could not load library {reference:?}: {source}")]
    Load {
        reference: String,
        #[source]
        source: LoadError,
    },

    #[error("Monster {monster:?} not found in library {library:?}")]
    MonsterNotFound { monster: String, library: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterRef {
    /// Overrides the encounter's default library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 { 1 }

impl MonsterRef {
    pub fn new(name: &str, quantity: u32) -> Self {
        Self {
            source: None,
            name: name.to_string(),
            quantity,
        }
    }

    pub fn from_source(source: &str, name: &str, quantity: u32) -> Self {
        Self {
            source: Some(source.to_string()),
            ..Self::new(name, quantity)
        }
    }

    /// The override when set and non-empty, else `default`.
    pub fn effective_source<'a>(&'a self, default: &'a str) -> &'a str {
        self.source
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(default)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterSpec {
    #[serde(default)]
    pub name: String,
    /// Default library reference. Required at resolution time.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub monsters: Vec<MonsterRef>,
}

impl EncounterSpec {
    pub fn from_json(reader: impl Read) -> Result<Self, SpecError> {
        let spec: Self = serde_json::from_reader(reader)?;
        spec.check()?;
        Ok(spec)
    }

    pub fn from_yaml(reader: impl Read) -> Result<Self, SpecError> {
        let spec: Self = serde_yaml::from_reader(reader)?;
        spec.check()?;
        Ok(spec)
    }

    /// `.yaml`/`.yml` files are read as YAML, everything else as JSON.
    pub fn load(path: &Path) -> Result<Self, SpecError> {
        let file = fs::File::open(path).map_err(|source| SpecError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(file),
            _ => Self::from_json(file),
        }
    }

    fn check(&self) -> Result<(), SpecError> {
        for (index, m) in self.monsters.iter().enumerate() {
            if m.name.trim().is_empty() {
                return Err(SpecError::MissingName { index });
            }
            if m.quantity == 0 {
                return Err(SpecError::InvalidQuantity { monster: m.name.clone() });
            }
        }
        Ok(())
    }
}

/// A MonsterRef bound to the record it names.
#[derive(Debug, Clone)]
pub struct ResolvedRef {
    /// Effective library reference the monster came from.
    pub source: String,
    pub name: String,
    pub quantity: u32,
    pub monster: Arc<MonsterRecord>,
}

#[derive(Debug, Clone)]
pub struct ResolvedEncounter {
    pub name: String,
    pub source: String,
    pub monsters: Vec<ResolvedRef>,
}

impl ResolvedEncounter {
    /// Number of individually tracked creatures.
    pub fn creature_count(&self) -> usize {
        self.monsters.iter().map(|m| m.quantity as usize).sum()
    }
}

/// Bind every reference of `spec` to a record. Each distinct library
/// reference is loaded at most once.
pub fn resolve<L: LibraryLoader + ?Sized>(
    spec: &EncounterSpec,
    loader: &L,
    config: &SheetConfig,
) -> Result<ResolvedEncounter, ResolveError> {
    if spec.source.trim().is_empty() {
        return Err(ResolveError::MissingSource {
            encounter: spec.name.clone(),
        });
    }

    let mut libraries = HashMap::new();
    libraries.insert(spec.source.clone(), load_reference(loader, &spec.source)?);

    let mut monsters = Vec::with_capacity(spec.monsters.len());
    for m in &spec.monsters {
        let reference = m.effective_source(&spec.source);
        let library = match libraries.entry(reference.to_string()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(load_reference(loader, reference)?),
        };

        let record = library
            .find_by_name(&m.name)
            .cloned()
            .ok_or_else(|| ResolveError::MonsterNotFound {
                monster: m.name.clone(),
                library: reference.to_string(),
            })?;

        if config.verbose {
            info!("Resolved {} x{} from {}: {:?}", m.name, m.quantity, reference, record);
        } else {
            debug!("Resolved {} x{} from {}", m.name, m.quantity, reference);
        }

        monsters.push(ResolvedRef {
            source: reference.to_string(),
            name: m.name.clone(),
            quantity: m.quantity,
            monster: record,
        });
    }

    info!(
        "Resolved encounter {:?}: {} entries from {} libraries",
        spec.name,
        monsters.len(),
        libraries.len()
    );

    Ok(ResolvedEncounter {
        name: spec.name.clone(),
        source: spec.source.clone(),
        monsters,
    })
}

fn load_reference<L: LibraryLoader + ?Sized>(
    loader: &L,
    reference: &str,
) -> Result<crate::monster::Library, ResolveError> {
    loader.load(reference).map_err(|source| ResolveError::Load {
        reference: reference.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_spec_defaults() {
        let json = r#"{
            "name": "Ambush",
            "source": "bestiary.xml",
            "monsters": [
                {"name": "Goblin", "quantity": 3},
                {"name": "Orc", "source": "other.xml"}
            ]
        }"#;
        let spec = EncounterSpec::from_json(json.as_bytes()).unwrap();
        assert_eq!(spec.monsters.len(), 2);
        assert_eq!(spec.monsters[0].source, None);
        assert_eq!(spec.monsters[1].quantity, 1);
        assert_eq!(spec.monsters[1].effective_source(&spec.source), "other.xml");
        assert_eq!(spec.monsters[0].effective_source(&spec.source), "bestiary.xml");
    }

    #[test]
    fn test_yaml_spec() {
        let yaml = "name: Crypt\nsource: mm.xml\nmonsters:\n  - name: Skeleton\n    quantity: 4\n";
        let spec = EncounterSpec::from_yaml(yaml.as_bytes()).unwrap();
        assert_eq!(spec.monsters, vec![MonsterRef::new("Skeleton", 4)]);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let json = r#"{"source": "a.xml", "monsters": [{"name": "Rat", "quantity": 0}]}"#;
        let err = EncounterSpec::from_json(json.as_bytes()).unwrap_err();
        assert!(matches!(err, SpecError::InvalidQuantity { .. }));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = EncounterSpec::from_json("{\"source\": ".as_bytes()).unwrap_err();
        assert!(matches!(err, SpecError::Json(_)));
    }

    #[test]
    fn test_empty_override_uses_default() {
        let m = MonsterRef::from_source("", "Rat", 1);
        assert_eq!(m.effective_source("mm.xml"), "mm.xml");
    }
}
