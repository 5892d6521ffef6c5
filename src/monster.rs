//! Monster Records - Immutable Catalog Entries
//!
//! Records are never mutated after parsing. Libraries hand them out as
//! `Arc<MonsterRecord>` so encounters share them instead of copying.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A named trait, action, reaction or legendary action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ability {
    pub name: String,
    pub text: Vec<String>,
    /// Attack roll lines. Parsed and exposed, never rendered.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attacks: Vec<String>,
}

/// A child element the parser did not map to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnrecognizedField {
    pub tag: String,
    /// Raw inner XML, byte-for-byte as it appeared in the document.
    pub content: String,
}

/// One monster entry. Absent fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonsterRecord {
    pub name: String,
    pub size: String,
    #[serde(rename = "type")]
    pub creature_type: String,
    pub alignment: String,
    pub ac: String,
    pub hp: String,
    pub speed: String,
    pub str: String,
    pub dex: String,
    pub con: String,
    pub int: String,
    pub wis: String,
    pub cha: String,
    pub saves: String,
    pub skills: String,
    pub vulnerabilities: String,
    pub resistances: String,
    pub damage_immunities: String,
    pub condition_immunities: String,
    pub senses: String,
    pub passive: String,
    pub languages: String,
    pub cr: String,
    pub traits: Vec<Ability>,
    pub actions: Vec<Ability>,
    pub reactions: Vec<Ability>,
    pub legendary: Vec<Ability>,
    /// Spellcasting summary; the same content also appears in trait text.
    pub spells: String,
    pub slots: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unrecognized: Vec<UnrecognizedField>,
}

impl MonsterRecord {
    /// Ability scores in STR, DEX, CON, INT, WIS, CHA order.
    pub fn ability_scores(&self) -> [(&'static str, &str); 6] {
        [
            ("str", self.str.as_str()),
            ("dex", self.dex.as_str()),
            ("con", self.con.as_str()),
            ("int", self.int.as_str()),
            ("wis", self.wis.as_str()),
            ("cha", self.cha.as_str()),
        ]
    }
}

/// A parsed compendium document. Owns its monsters.
#[derive(Debug, Clone)]
pub struct Library {
    pub path: PathBuf,
    pub name: Option<String>,
    pub monsters: Vec<Arc<MonsterRecord>>,
}

impl Library {
    pub fn new(path: impl Into<PathBuf>, name: Option<String>, monsters: Vec<MonsterRecord>) -> Self {
        Self {
            path: path.into(),
            name,
            monsters: monsters.into_iter().map(Arc::new).collect(),
        }
    }

    /// The `name` attribute of the document, else the file stem.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        file_stem(&self.path)
    }

    /// Exact, case-sensitive match; first occurrence wins.
    pub fn find_by_name(&self, name: &str) -> Option<&Arc<MonsterRecord>> {
        self.monsters.iter().find(|m| m.name == name)
    }

    pub fn len(&self) -> usize {
        self.monsters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monsters.is_empty()
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
