//! Statblock Core - Monster Stat Blocks and Encounter Sheets
//!
//! # Data Flow
//! 1. Parser turns a compendium document into a Library
//! 2. Catalog loads, looks up and searches libraries
//! 3. Resolver binds an encounter's references to monster records
//! 4. Formatter and renderer turn each record into a stat block
//! 5. Composer lays out the whole encounter sheet
//! 6. A writer serializes the result

pub mod monster;
pub mod parser;
pub mod catalog;
pub mod encounter;
pub mod format;
pub mod document;
pub mod statblock;
pub mod sheet;
pub mod writer;
pub mod validation;
pub mod config;
pub mod pipeline;

pub use monster::{Ability, Library, MonsterRecord, UnrecognizedField};
pub use parser::{parse_library, ParseError};
pub use catalog::{Catalog, FsLoader, LibraryLoader, LoadError};
pub use encounter::{resolve, EncounterSpec, MonsterRef, ResolveError, ResolvedEncounter, SpecError};
pub use document::{EncounterSheet, StatBlock};
pub use statblock::render_stat_block;
pub use sheet::compose;
pub use writer::{DocumentWriter, HtmlWriter, TextWriter};
pub use validation::{ValidationReport, Validator, ViolationSeverity};
pub use config::SheetConfig;
pub use pipeline::{render_monster, Pipeline, PipelineError};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
