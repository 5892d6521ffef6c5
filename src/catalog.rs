//! Library Catalog - Loading, Lookup and Search
//!
//! Nothing here caches. Every load re-reads its source document.

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::monster::{Library, MonsterRecord};
use crate::parser::{parse_library, ParseError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Read and parse one library document.
pub fn load(path: &Path) -> Result<Library, LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let library = parse_library(&decode(bytes, path)?, path)?;
    info!("Loaded {} monsters from {}", library.len(), path.display());
    Ok(library)
}

/// Parse a library from any byte stream, e.g. stdin.
pub fn load_reader(mut reader: impl Read, origin: &Path) -> Result<Library, LoadError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(|source| LoadError::Io {
        path: origin.display().to_string(),
        source,
    })?;
    Ok(parse_library(&decode(bytes, origin)?, origin)?)
}

/// Invalid UTF-8 is a malformed document, not an I/O failure.
fn decode(bytes: Vec<u8>, origin: &Path) -> Result<String, ParseError> {
    String::from_utf8(bytes).map_err(|e| ParseError {
        origin: origin.display().to_string(),
        position: e.utf8_error().valid_up_to(),
        message: "document is not valid UTF-8".to_string(),
    })
}

/// Case-insensitive substring search over library display names and
/// monster names. Document order within each library.
pub fn search<'a>(
    libraries: impl IntoIterator<Item = &'a Library>,
    library_filter: &str,
    name_filter: &str,
) -> Vec<Arc<MonsterRecord>> {
    let library_filter = library_filter.to_lowercase();
    let name_filter = name_filter.to_lowercase();

    libraries
        .into_iter()
        .filter(|lib| lib.display_name().to_lowercase().contains(&library_filter))
        .flat_map(|lib| {
            lib.monsters
                .iter()
                .filter(|m| m.name.to_lowercase().contains(&name_filter))
                .cloned()
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Source of libraries for encounter resolution.
pub trait LibraryLoader {
    fn load(&self, reference: &str) -> Result<Library, LoadError>;
}

/// Loads library references as file paths.
#[derive(Debug, Clone, Default)]
pub struct FsLoader {
    base_dir: Option<PathBuf>,
}

impl FsLoader {
    pub fn new() -> Self {
        Self { base_dir: None }
    }

    /// Resolve relative references against `dir`.
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: Some(dir.into()) }
    }

    fn path_for(&self, reference: &str) -> PathBuf {
        let path = PathBuf::from(reference);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }
}

impl LibraryLoader for FsLoader {
    fn load(&self, reference: &str) -> Result<Library, LoadError> {
        load(&self.path_for(reference))
    }
}

/// Every library of a data directory, keyed by display name.
pub struct Catalog {
    libraries: HashMap<String, Library>,
    fallback: FsLoader,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            libraries: HashMap::new(),
            fallback: FsLoader::new(),
        }
    }

    /// Load every `*.xml` directly under `dir`. Unloadable files are skipped.
    pub fn load_dir(dir: &Path) -> Result<Self, std::io::Error> {
        let mut catalog = Self {
            libraries: HashMap::new(),
            fallback: FsLoader::with_base_dir(dir),
        };

        let mut paths = vec![];
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |e| e == "xml") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            match load(&path) {
                Ok(library) => catalog.register(library),
                Err(e) => warn!("Skipping {} because it failed loading: {}", path.display(), e),
            }
        }
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&Library> {
        self.libraries.get(name)
    }

    /// Libraries sorted by display name.
    pub fn list(&self) -> Vec<&Library> {
        let mut libraries: Vec<_> = self.libraries.values().collect();
        libraries.sort_by_key(|lib| lib.display_name());
        libraries
    }

    pub fn register(&mut self, library: Library) {
        let name = library.display_name();
        if self.libraries.contains_key(&name) {
            warn!("Library {:?} registered twice, keeping {}", name, library.path.display());
        }
        self.libraries.insert(name, library);
    }

    pub fn search(&self, library_filter: &str, name_filter: &str) -> Vec<Arc<MonsterRecord>> {
        search(self.list(), library_filter, name_filter)
    }

    /// Exact lookup, optionally scoped to one library. Unscoped lookups scan
    /// libraries in `list()` order.
    pub fn find(&self, library: Option<&str>, name: &str) -> Option<Arc<MonsterRecord>> {
        debug!("Searching for {:?} in {:?}", name, library);
        match library {
            Some(lib) => self.get(lib)?.find_by_name(name).cloned(),
            None => self
                .list()
                .into_iter()
                .find_map(|lib| lib.find_by_name(name).cloned()),
        }
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}

impl LibraryLoader for Catalog {
    /// A registered display name loads that library's file again; any other
    /// reference is treated as a path.
    fn load(&self, reference: &str) -> Result<Library, LoadError> {
        match self.libraries.get(reference) {
            Some(library) => load(&library.path),
            None => self.fallback.load(reference),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn monster(name: &str) -> MonsterRecord {
        MonsterRecord {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn write_library(dir: &Path, file: &str, body: &str) -> PathBuf {
        let path = dir.join(file);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_search_filters_both_names() {
        let mm = Library::new("mm.xml", Some("Monster Manual".into()), vec![
            monster("Goblin"),
            monster("Hobgoblin"),
            monster("Orc"),
        ]);
        let volo = Library::new("volo.xml", Some("Volo".into()), vec![monster("Goblin Boss")]);

        let found = search([&mm, &volo], "", "GOBLIN");
        let names: Vec<_> = found.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Goblin", "Hobgoblin", "Goblin Boss"]);

        let found = search([&mm, &volo], "manual", "goblin");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load(Path::new("/definitely/not/here.xml")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.xml");
        fs::write(&path, b"<compendium><monster><name>Caf\xe9</name></monster></compendium>").unwrap();

        match load(&path).unwrap_err() {
            LoadError::Parse(e) => assert_eq!(e.position, 30),
            other => panic!("expected a parse error, got {:?}", other),
        }

        let err = load_reader(&b"<compendium>\xff</compendium>"[..], Path::new("<stdin>")).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_load_dir_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        write_library(dir.path(), "good.xml", "<compendium><monster><name>Orc</name></monster></compendium>");
        write_library(dir.path(), "bad.xml", "<compendium><monster>");
        write_library(dir.path(), "notes.txt", "not a library");

        let catalog = Catalog::load_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("good").is_some());
        assert_eq!(catalog.find(None, "Orc").unwrap().name, "Orc");
        assert!(catalog.find(Some("bad"), "Orc").is_none());
    }

    #[test]
    fn test_catalog_loads_by_display_name_or_path() {
        let dir = tempfile::tempdir().unwrap();
        write_library(
            dir.path(),
            "mm.xml",
            r#"<compendium name="Monster Manual"><monster><name>Orc</name></monster></compendium>"#,
        );
        let catalog = Catalog::load_dir(dir.path()).unwrap();

        let by_name = LibraryLoader::load(&catalog, "Monster Manual").unwrap();
        assert_eq!(by_name.len(), 1);

        let by_path = LibraryLoader::load(&catalog, "mm.xml").unwrap();
        assert_eq!(by_path.display_name(), "Monster Manual");
    }
}
