//! Presentation Document - Markup-Free Intermediate Form
//!
//! Renderers decide which sections exist. Writers decide how they look.

use serde::Serialize;

/// A run of paragraph text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "text")]
pub enum Inline {
    Plain(String),
    Emphasis(String),
}

pub type Paragraph = Vec<Inline>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyLine {
    pub label: String,
    pub text: String,
}

impl PropertyLine {
    pub fn new(label: &str, text: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbilityScore {
    /// Upper-case short name, e.g. `STR`.
    pub label: String,
    /// Score with modifier, e.g. `16 (+3)`.
    pub text: String,
}

/// A named sub-block: one trait, action or the description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyBlock {
    /// `"Scimitar."`, or `None` for the unlabeled description.
    pub title: Option<String>,
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockGroup {
    /// Traits carry no heading.
    pub heading: Option<String>,
    pub blocks: Vec<PropertyBlock>,
}

/// One monster, laid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatBlock {
    pub name: String,
    pub subtitle: String,
    /// Armor Class, Hit Points, Speed.
    pub top_stats: Vec<PropertyLine>,
    pub abilities: Vec<AbilityScore>,
    /// Saving throws through Challenge, empty ones already dropped.
    pub details: Vec<PropertyLine>,
    pub groups: Vec<BlockGroup>,
    pub description: Option<PropertyBlock>,
}

/// One tracked creature in the roster table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterRow {
    /// `"Goblin 2"`
    pub label: String,
    pub ac: String,
    pub hp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncounterSheet {
    pub title: String,
    /// Blank initiative slot numbers, highest first.
    pub initiative: Vec<u32>,
    pub roster: Vec<RosterRow>,
    /// Stat blocks broken into display rows.
    pub grid: Vec<Vec<StatBlock>>,
}

impl EncounterSheet {
    pub fn stat_block_count(&self) -> usize {
        self.grid.iter().map(Vec::len).sum()
    }
}
