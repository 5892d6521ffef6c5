//! Rendering Pipeline - Single Entry Point
//!
//! resolve -> compose -> write. Only resolution touches the filesystem.

use thiserror::Error;
use tracing::{debug, info};
use rand::Rng;

use crate::catalog::{LibraryLoader, LoadError};
use crate::config::SheetConfig;
use crate::document::{EncounterSheet, StatBlock};
use crate::encounter::{resolve, EncounterSpec, ResolveError, ResolvedEncounter, SpecError};
use crate::monster::{Library, MonsterRecord};
use crate::sheet::compose;
use crate::statblock::render_stat_block;
use crate::writer::DocumentWriter;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Could not find monster {monster:?} in {library}")]
    MonsterNotFound { monster: String, library: String },

    #[error("Library {0} has no monsters")]
    EmptyLibrary(String),
}

/// The rendering pipeline over one library source.
pub struct Pipeline<L: LibraryLoader> {
    loader: L,
    config: SheetConfig,
}

impl<L: LibraryLoader> Pipeline<L> {
    pub fn new(loader: L, config: SheetConfig) -> Self {
        Self { loader, config }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn resolve(&self, spec: &EncounterSpec) -> Result<ResolvedEncounter, PipelineError> {
        Ok(resolve(spec, &self.loader, &self.config)?)
    }

    pub fn compose(&self, spec: &EncounterSpec) -> Result<EncounterSheet, PipelineError> {
        let encounter = self.resolve(spec)?;
        let sheet = compose(&encounter, &self.config);
        debug!(
            "Composed {:?}: {} roster rows, {} stat blocks",
            sheet.title,
            sheet.roster.len(),
            sheet.stat_block_count()
        );
        Ok(sheet)
    }

    pub fn render_encounter(
        &self,
        spec: &EncounterSpec,
        writer: &dyn DocumentWriter,
    ) -> Result<String, PipelineError> {
        let sheet = self.compose(spec)?;
        Ok(writer.encounter_page(&sheet))
    }
}

/// Pick a monster by exact name, or at random when `name` is `None`.
pub fn select_monster<'a>(
    library: &'a Library,
    name: Option<&str>,
) -> Result<&'a MonsterRecord, PipelineError> {
    match name {
        Some(name) => {
            info!("Searching for {:?}", name);
            library
                .find_by_name(name)
                .map(|m| m.as_ref())
                .ok_or_else(|| PipelineError::MonsterNotFound {
                    monster: name.to_string(),
                    library: library.display_name(),
                })
        }
        None => {
            if library.is_empty() {
                return Err(PipelineError::EmptyLibrary(library.display_name()));
            }
            let index = rand::rng().random_range(0..library.len());
            Ok(library.monsters[index].as_ref())
        }
    }
}

/// The single-monster path: lookup, render, write. No encounter stages.
pub fn render_monster(
    library: &Library,
    name: Option<&str>,
    writer: &dyn DocumentWriter,
) -> Result<String, PipelineError> {
    let monster = select_monster(library, name)?;
    let block: StatBlock = render_stat_block(monster);
    debug!("Rendering stat block for {:?}", block.name);
    Ok(writer.monster_page(&block))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::TextWriter;

    fn library() -> Library {
        let m = |name: &str| MonsterRecord {
            name: name.into(),
            ..Default::default()
        };
        Library::new("mm.xml", None, vec![m("Orc"), m("Goblin"), m("Wolf")])
    }

    #[test]
    fn test_select_by_name() {
        let lib = library();
        assert_eq!(select_monster(&lib, Some("Goblin")).unwrap().name, "Goblin");
    }

    #[test]
    fn test_select_unknown_name() {
        let err = select_monster(&library(), Some("Dragon")).unwrap_err();
        assert!(err.to_string().contains("Dragon"));
        assert!(err.to_string().contains("mm"));
    }

    #[test]
    fn test_select_random_stays_in_library() {
        let lib = library();
        for _ in 0..20 {
            let m = select_monster(&lib, None).unwrap();
            assert!(lib.find_by_name(&m.name).is_some());
        }
    }

    #[test]
    fn test_select_random_reaches_every_monster() {
        let lib = library();
        let picked: std::collections::HashSet<_> =
            (0..300).map(|_| select_monster(&lib, None).unwrap().name.clone()).collect();
        assert_eq!(picked.len(), lib.len());
    }

    #[test]
    fn test_random_from_empty_library() {
        let lib = Library::new("empty.xml", None, vec![]);
        assert!(matches!(select_monster(&lib, None), Err(PipelineError::EmptyLibrary(_))));
    }

    #[test]
    fn test_render_monster_text() {
        let page = render_monster(&library(), Some("Wolf"), &TextWriter).unwrap();
        assert!(page.starts_with("WOLF\n"));
    }
}
