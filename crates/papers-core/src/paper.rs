//! Paper type — the bibliographic record stored in a repository.
//!
//! A paper lives on disk as two sibling YAML files sharing its citekey as
//! basename. The bibliography file holds a single entry keyed by citekey:
//!
//! ```yaml
//! entries:
//!   doe2020:
//!     type: article
//!     persons:
//!       author:
//!         - first: Jane
//!           last: Doe
//!     title: On Things
//!     year: 2020
//! ```
//!
//! The metadata file holds free-form bookkeeping (document path, tags, ...).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PapersError, Result};
use crate::files::{read_yaml_file, write_yaml_file};
use crate::record::PaperRecord;

/// Base used when a paper has no author or editor to derive a citekey from.
const ANONYMOUS_BASE: &str = "anon";

/// A person attached to an entry in some role (author, editor, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub first: String,
    pub last: String,
}

impl Person {
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            last: last.into(),
        }
    }
}

/// One bibliography entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BibEntry {
    /// Entry type (e.g., "article", "inproceedings", "book").
    #[serde(rename = "type")]
    pub entry_type: String,

    /// People by role, in citation order.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub persons: BTreeMap<String, Vec<Person>>,

    /// Every other field (title, year, journal, doi, ...).
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_yaml::Value>,
}

impl BibEntry {
    pub fn new(entry_type: impl Into<String>) -> Self {
        Self {
            entry_type: entry_type.into(),
            persons: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields
            .insert(name.to_string(), serde_yaml::Value::String(value.into()));
        self
    }

    pub fn with_person(mut self, role: &str, person: Person) -> Self {
        self.persons.entry(role.to_string()).or_default().push(person);
        self
    }

    /// A scalar field rendered as a string. Numbers and booleans are
    /// stringified; sequences and mappings are not fields in this sense.
    pub fn field(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            serde_yaml::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// First author, falling back to the first editor.
    pub fn first_person(&self) -> Option<&Person> {
        ["author", "editor"]
            .iter()
            .find_map(|role| self.persons.get(*role).and_then(|people| people.first()))
    }
}

/// On-disk shape of a bibliography file.
#[derive(Debug, Serialize, Deserialize)]
struct BibFile {
    entries: BTreeMap<String, BibEntry>,
}

/// Free-form bookkeeping stored next to the bibliography file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A paper: citekey, bibliography entry and metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paper {
    citekey: Option<String>,
    pub entry: BibEntry,
    pub metadata: Metadata,
}

impl Paper {
    /// A fresh paper without a citekey. Give it one (usually from
    /// `Repository::generate_unique_citekey`) before adding it.
    pub fn new(entry: BibEntry) -> Self {
        Self {
            citekey: None,
            entry,
            metadata: Metadata::default(),
        }
    }

    pub fn with_citekey(citekey: impl Into<String>, entry: BibEntry) -> Self {
        Self {
            citekey: Some(citekey.into()),
            entry,
            metadata: Metadata::default(),
        }
    }

    pub fn title(&self) -> Option<String> {
        self.entry.field("title")
    }

    pub fn year(&self) -> Option<String> {
        self.entry.field("year")
    }
}

impl PaperRecord for Paper {
    fn citekey(&self) -> Option<&str> {
        self.citekey.as_deref()
    }

    fn set_citekey(&mut self, citekey: String) {
        self.citekey = Some(citekey);
    }

    fn load(bib_path: &Path, meta_path: Option<&Path>) -> Result<Self> {
        let bib: BibFile = read_yaml_file(bib_path)?;
        let found = bib.entries.len();
        let mut entries = bib.entries.into_iter();
        let (citekey, entry) = match (entries.next(), entries.next()) {
            (Some(only), None) => only,
            _ => {
                return Err(PapersError::Parse {
                    path: bib_path.to_path_buf(),
                    message: format!("expected exactly one bibliography entry, found {found}"),
                })
            }
        };

        let metadata = match meta_path {
            Some(path) => match read_yaml_file::<Metadata>(path) {
                Ok(metadata) => metadata,
                Err(PapersError::NotFound(_)) => {
                    tracing::debug!(path = %path.display(), "no metadata file, using defaults");
                    Metadata::default()
                }
                Err(e) => return Err(e),
            },
            None => Metadata::default(),
        };

        Ok(Self {
            citekey: Some(citekey),
            entry,
            metadata,
        })
    }

    fn save(&self, bib_path: &Path, meta_path: &Path) -> Result<()> {
        let citekey = self
            .citekey
            .clone()
            .ok_or_else(|| PapersError::InvalidCitekey(String::new()))?;

        let mut entries = BTreeMap::new();
        entries.insert(citekey, self.entry.clone());
        write_yaml_file(bib_path, &BibFile { entries })?;
        write_yaml_file(meta_path, &self.metadata)
    }

    fn default_citekey(&self) -> String {
        let name = self
            .entry
            .first_person()
            .map(|p| {
                p.last
                    .chars()
                    .filter(|c| c.is_alphanumeric())
                    .collect::<String>()
                    .to_lowercase()
            })
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| ANONYMOUS_BASE.to_string());
        let year: String = self
            .year()
            .unwrap_or_default()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        format!("{name}{year}")
    }

    fn set_document(&mut self, path: &Path) {
        self.metadata.document = Some(path.to_path_buf());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample_entry() -> BibEntry {
        BibEntry::new("article")
            .with_person("author", Person::new("Jane", "Van der Berg"))
            .with_person("author", Person::new("John", "Smith"))
            .with_field("title", "On Things")
            .with_field("year", "2020")
    }

    #[test]
    fn default_citekey_uses_first_author_and_year() {
        let paper = Paper::new(sample_entry());
        assert_eq!(paper.default_citekey(), "vanderberg2020");
    }

    #[test]
    fn default_citekey_falls_back_to_editor_then_anon() {
        let edited = BibEntry::new("book")
            .with_person("editor", Person::new("", "O'Neil"))
            .with_field("year", "1999");
        assert_eq!(Paper::new(edited).default_citekey(), "oneil1999");

        let bare = BibEntry::new("misc").with_field("title", "Untitled");
        assert_eq!(Paper::new(bare).default_citekey(), "anon");
    }

    #[test]
    fn numeric_year_is_read_as_field() {
        let yaml = "entries:\n  k:\n    type: article\n    year: 2021\n    title: T\n";
        let dir = tempfile::tempdir().unwrap();
        let bib = dir.path().join("k.bibyaml");
        fs::write(&bib, yaml).unwrap();

        let paper = Paper::load(&bib, None).unwrap();
        assert_eq!(paper.citekey(), Some("k"));
        assert_eq!(paper.year().as_deref(), Some("2021"));
        assert_eq!(paper.title().as_deref(), Some("T"));
    }

    #[test]
    fn save_and_load_preserves_entry_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let bib = dir.path().join("doe2020.bibyaml");
        let meta = dir.path().join("doe2020.meta");

        let mut paper = Paper::with_citekey("doe2020", sample_entry());
        paper.set_document(Path::new("/tmp/doe2020.pdf"));
        paper.metadata.tags = vec!["ml".to_string()];
        paper.save(&bib, &meta).unwrap();

        let loaded = Paper::load(&bib, Some(&meta)).unwrap();
        assert_eq!(loaded, paper);
    }

    #[test]
    fn missing_metadata_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let bib = dir.path().join("doe2020.bibyaml");
        let meta = dir.path().join("doe2020.meta");
        Paper::with_citekey("doe2020", sample_entry())
            .save(&bib, &meta)
            .unwrap();
        fs::remove_file(&meta).unwrap();

        let loaded = Paper::load(&bib, Some(&meta)).unwrap();
        assert_eq!(loaded.metadata, Metadata::default());
    }

    #[test]
    fn missing_bibliography_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = Paper::load(&dir.path().join("nope.bibyaml"), None);
        assert!(matches!(result, Err(PapersError::NotFound(_))));
    }

    #[test]
    fn multiple_entries_are_rejected() {
        let yaml = "entries:\n  a:\n    type: misc\n  b:\n    type: misc\n";
        let dir = tempfile::tempdir().unwrap();
        let bib = dir.path().join("two.bibyaml");
        fs::write(&bib, yaml).unwrap();
        assert!(matches!(
            Paper::load(&bib, None),
            Err(PapersError::Parse { .. })
        ));
    }

    #[test]
    fn saving_without_citekey_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = Paper::new(sample_entry()).save(
            &dir.path().join("x.bibyaml"),
            &dir.path().join("x.meta"),
        );
        assert!(matches!(result, Err(PapersError::InvalidCitekey(_))));
    }
}
