//! # papers-core
//!
//! Core types for the papers repository manager.
//!
//! This crate defines the pieces every other papers crate builds on:
//! - [`PaperRecord`] — what a repository needs from a stored record
//! - [`Paper`] — the bibliography entry + metadata record
//! - Citekey disambiguation ([`citekey::next_free`], [`SuffixCounter`])
//! - Error hierarchy ([`PapersError`])
//! - [`Config`] — user configuration
//! - YAML file primitives ([`files`])

pub mod citekey;
pub mod config;
pub mod error;
pub mod files;
pub mod paper;
pub mod record;

pub use citekey::SuffixCounter;
pub use config::Config;
pub use error::{PapersError, Result};
pub use paper::{BibEntry, Metadata, Paper, Person};
pub use record::PaperRecord;
