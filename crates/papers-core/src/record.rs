//! The contract between a repository and the records it stores.

use std::path::Path;

use crate::error::Result;

/// A bibliographic record that knows how to persist itself as a
/// bibliography file plus an optional metadata file.
///
/// The repository decides *where* the files live; the record decides
/// *what* goes in them.
pub trait PaperRecord: Sized {
    /// The record's citekey, if it has one yet.
    fn citekey(&self) -> Option<&str>;

    fn set_citekey(&mut self, citekey: String);

    /// Load a record from a bibliography file and an optional metadata file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PapersError::NotFound`] if the bibliography file is
    /// absent and [`crate::PapersError::Parse`] if either file is malformed.
    fn load(bib_path: &Path, meta_path: Option<&Path>) -> Result<Self>;

    /// Write the bibliography and metadata files, overwriting both.
    fn save(&self, bib_path: &Path, meta_path: &Path) -> Result<()>;

    /// Derive a citekey from the record's content. Not guaranteed unique.
    fn default_citekey(&self) -> String;

    /// Attach a document (e.g. a PDF) to the record.
    fn set_document(&mut self, path: &Path);
}
