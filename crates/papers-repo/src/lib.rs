//! # papers-repo
//!
//! The on-disk paper repository.
//!
//! The index file is the authoritative list of known citekeys. Each
//! citekey owns a bibliography file and an optional metadata file; their
//! content is written and read by the [`papers_core::PaperRecord`]
//! implementation, the repository only decides where they live.

pub mod repository;

pub use repository::{Repository, Resolution};
