//! Repository — the index of known citekeys and the files behind them.
//!
//! Layout under the repository root:
//!
//! ```text
//! <root>/
//!   papers.yaml             index: ordered list of citekeys
//!   bibdata/<key>.bibyaml   bibliography file, one per citekey
//!   meta/<key>.meta         metadata file, optional
//!   doc/                    default document directory
//! ```
//!
//! The index is the single source of truth for which papers exist. It is
//! rewritten after every `add`; in-place updates of a registered paper only
//! touch that paper's files. Nothing here guards against two processes
//! writing the same root at once.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use papers_core::citekey;
use papers_core::files::{read_yaml_file, write_yaml_file};
use papers_core::{Config, PaperRecord, PapersError, Result};

/// On-disk shape of the index file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    citekeys: Vec<String>,
}

/// Outcome of resolving a reference when the caller tolerates a miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(String),
    NotFound,
}

impl Resolution {
    pub fn found(self) -> Option<String> {
        match self {
            Self::Found(key) => Some(key),
            Self::NotFound => None,
        }
    }
}

/// A papers repository rooted at a directory.
#[derive(Debug)]
pub struct Repository {
    root: PathBuf,
    /// Insertion order defines numeric references.
    citekeys: Vec<String>,
}

impl Repository {
    pub const INDEX_FILE: &'static str = "papers.yaml";
    pub const BIB_DIR: &'static str = "bibdata";
    pub const META_DIR: &'static str = "meta";
    pub const DOC_DIR: &'static str = "doc";
    pub const BIB_EXT: &'static str = "bibyaml";
    pub const META_EXT: &'static str = "meta";

    /// Create a new, empty repository at `root`.
    ///
    /// Creates `root` if needed, then the bibliography and metadata
    /// directories, then an empty index.
    ///
    /// # Errors
    ///
    /// Returns [`PapersError::Filesystem`] if a directory cannot be created,
    /// including when the bibliography or metadata directory already exists.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| PapersError::Filesystem {
            path: root.clone(),
            source,
        })?;
        for dir in [Self::BIB_DIR, Self::META_DIR] {
            let path = root.join(dir);
            fs::create_dir(&path).map_err(|source| PapersError::Filesystem { path, source })?;
        }

        let repo = Self {
            root,
            citekeys: Vec::new(),
        };
        repo.persist()?;
        tracing::info!(root = %repo.root.display(), "initialized repository");
        Ok(repo)
    }

    /// Open an existing repository by reading its index.
    ///
    /// # Errors
    ///
    /// Returns [`PapersError::NotFound`] if there is no index file at `root`.
    /// Returns [`PapersError::Parse`] if the index is malformed or lists a
    /// citekey twice.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let index_path = root.join(Self::INDEX_FILE);
        let index: IndexFile = read_yaml_file(&index_path)?;

        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = index.citekeys.iter().find(|key| !seen.insert(key.as_str())) {
            return Err(PapersError::Parse {
                path: index_path,
                message: format!("citekey listed twice: {dup}"),
            });
        }

        tracing::debug!(
            root = %root.display(),
            papers = index.citekeys.len(),
            "opened repository"
        );
        Ok(Self {
            root,
            citekeys: index.citekeys,
        })
    }

    /// Overwrite the index file with the current citekey list.
    ///
    /// # Errors
    ///
    /// Returns [`PapersError::Io`] if the index cannot be written.
    pub fn persist(&self) -> Result<()> {
        let index = IndexFile {
            citekeys: self.citekeys.clone(),
        };
        write_yaml_file(&self.index_path(), &index)?;
        tracing::debug!(papers = self.citekeys.len(), "persisted index");
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn citekeys(&self) -> &[String] {
        &self.citekeys
    }

    pub fn len(&self) -> usize {
        self.citekeys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citekeys.is_empty()
    }

    pub fn contains(&self, citekey: &str) -> bool {
        self.citekeys.iter().any(|k| k == citekey)
    }

    // === Paths ===

    pub fn index_path(&self) -> PathBuf {
        self.root.join(Self::INDEX_FILE)
    }

    pub fn bib_path(&self, citekey: &str) -> PathBuf {
        self.root
            .join(Self::BIB_DIR)
            .join(format!("{citekey}.{}", Self::BIB_EXT))
    }

    pub fn meta_path(&self, citekey: &str) -> PathBuf {
        self.root
            .join(Self::META_DIR)
            .join(format!("{citekey}.{}", Self::META_EXT))
    }

    /// The configured document directory, or `<root>/doc`.
    pub fn document_directory(&self, config: &Config) -> PathBuf {
        config
            .document_directory()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.join(Self::DOC_DIR))
    }

    // === Lookup ===

    /// Resolve a citekey or a positional number to a citekey.
    ///
    /// An exact citekey match wins over a numeric reading, so a paper whose
    /// citekey is `"3"` is found by `"3"` regardless of position. Numbers
    /// index into insertion order and shift meaning as papers are added.
    ///
    /// # Errors
    ///
    /// With `must_exist`, an unresolvable reference is
    /// [`PapersError::ReferenceNotFound`]; without it, it is
    /// `Ok(Resolution::NotFound)`.
    pub fn resolve_reference(&self, reference: &str, must_exist: bool) -> Result<Resolution> {
        if self.contains(reference) {
            return Ok(Resolution::Found(reference.to_string()));
        }
        let positional = reference
            .parse::<usize>()
            .ok()
            .and_then(|n| self.citekeys.get(n));
        match positional {
            Some(key) => Ok(Resolution::Found(key.clone())),
            None if must_exist => Err(PapersError::ReferenceNotFound(reference.to_string())),
            None => Ok(Resolution::NotFound),
        }
    }

    /// [`resolve_reference`](Self::resolve_reference) with `must_exist` set.
    pub fn citekey_from_ref(&self, reference: &str) -> Result<String> {
        match self.resolve_reference(reference, true)? {
            Resolution::Found(key) => Ok(key),
            Resolution::NotFound => Err(PapersError::ReferenceNotFound(reference.to_string())),
        }
    }

    /// Load a paper from its files. Does not check the index.
    pub fn paper_from_citekey<P: PaperRecord>(&self, citekey: &str) -> Result<P> {
        P::load(&self.bib_path(citekey), Some(&self.meta_path(citekey)))
    }

    pub fn paper_from_ref<P: PaperRecord>(&self, reference: &str) -> Result<P> {
        let key = self.citekey_from_ref(reference)?;
        self.paper_from_citekey(&key)
    }

    /// Lazily load every paper in insertion order.
    ///
    /// Each item is read from disk when pulled. Calling again starts over
    /// and reads everything again.
    pub fn all_papers<P: PaperRecord>(&self) -> impl Iterator<Item = Result<P>> + '_ {
        self.citekeys
            .iter()
            .map(move |key| self.paper_from_citekey(key))
    }

    // === Mutation ===

    /// Register a new paper: write its files, then record it in the index.
    ///
    /// Files are written before the citekey is registered, so a failed write
    /// leaves the repository unchanged. If the index cannot be persisted the
    /// in-memory registration is rolled back.
    ///
    /// # Errors
    ///
    /// Returns [`PapersError::InvalidCitekey`] if the paper has no usable
    /// citekey and [`PapersError::DuplicateCitekey`] if it is already known.
    pub fn add<P: PaperRecord>(&mut self, paper: &P) -> Result<()> {
        let citekey = validate_citekey(paper.citekey())?.to_string();
        if self.contains(&citekey) {
            return Err(PapersError::DuplicateCitekey(citekey));
        }

        paper.save(&self.bib_path(&citekey), &self.meta_path(&citekey))?;

        self.citekeys.push(citekey.clone());
        if let Err(e) = self.persist() {
            self.citekeys.pop();
            return Err(e);
        }

        tracing::info!(%citekey, "added paper");
        Ok(())
    }

    /// Add an unknown paper, or overwrite the files of a known one.
    ///
    /// The index is only rewritten on the add path.
    pub fn add_or_update<P: PaperRecord>(&mut self, paper: &P) -> Result<()> {
        match paper.citekey() {
            Some(key) if self.contains(key) => self.save_paper(paper),
            _ => self.add(paper),
        }
    }

    /// Overwrite the files of an already registered paper.
    ///
    /// # Errors
    ///
    /// Returns [`PapersError::NotRegistered`] if the citekey is not in the index.
    pub fn save_paper<P: PaperRecord>(&self, paper: &P) -> Result<()> {
        let citekey = validate_citekey(paper.citekey())?;
        if !self.contains(citekey) {
            return Err(PapersError::NotRegistered(citekey.to_string()));
        }
        paper.save(&self.bib_path(citekey), &self.meta_path(citekey))?;
        tracing::debug!(%citekey, "updated paper");
        Ok(())
    }

    /// Load a paper from an external bibliography file, attach a document,
    /// and add it. Returns the registered citekey.
    pub fn add_from_paths<P: PaperRecord>(
        &mut self,
        bib_path: &Path,
        doc_path: &Path,
    ) -> Result<String> {
        let mut paper = P::load(bib_path, None)?;
        paper.set_document(doc_path);
        self.add(&paper)?;
        Ok(validate_citekey(paper.citekey())?.to_string())
    }

    /// A citekey for `paper` that no registered paper uses.
    ///
    /// Starts from `explicit_base`, or the paper's own default citekey, and
    /// appends a letter suffix on collision. The repository is not modified;
    /// the caller still has to `add` the paper under the returned key.
    pub fn generate_unique_citekey<P: PaperRecord>(
        &self,
        paper: &P,
        explicit_base: Option<&str>,
    ) -> String {
        let base = explicit_base
            .map(str::to_string)
            .unwrap_or_else(|| paper.default_citekey());
        citekey::next_free(&base, |candidate| self.contains(candidate))
    }
}

/// A citekey becomes a file stem, so it must be non-empty and free of
/// separators and whitespace, and must not start with a dot.
fn validate_citekey(citekey: Option<&str>) -> Result<&str> {
    let key = citekey.ok_or_else(|| PapersError::InvalidCitekey(String::new()))?;
    let usable = !key.is_empty()
        && !key.starts_with('.')
        && !key
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control());
    if usable {
        Ok(key)
    } else {
        Err(PapersError::InvalidCitekey(key.to_string()))
    }
}
