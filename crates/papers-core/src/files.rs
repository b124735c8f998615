//! YAML file reading and writing.
//!
//! Every file papers owns (the index, bibliography and metadata files) is a
//! whole-file YAML document. Writes overwrite in place; there is no atomic
//! rename and no fsync.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::PapersError;

/// Read and deserialize a YAML file.
///
/// # Errors
///
/// Returns [`PapersError::NotFound`] if the file does not exist.
/// Returns [`PapersError::Parse`] if the content is not valid YAML for `T`.
pub fn read_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T, PapersError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(PapersError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(PapersError::Io(e)),
    };

    tracing::debug!(path = %path.display(), "read yaml file");
    serde_yaml::from_str(&content).map_err(|e| PapersError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Serialize a value and overwrite `path` with it.
///
/// # Errors
///
/// Returns [`PapersError::Serialization`] if the value cannot be serialized.
/// Returns [`PapersError::Io`] if the file cannot be written.
pub fn write_yaml_file<T: Serialize>(path: &Path, value: &T) -> Result<(), PapersError> {
    let yaml = serde_yaml::to_string(value).map_err(|e| PapersError::Serialization(e.to_string()))?;
    fs::write(path, yaml)?;
    tracing::debug!(path = %path.display(), "wrote yaml file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let result: Result<BTreeMap<String, String>, _> = read_yaml_file(&path);
        assert!(matches!(result, Err(PapersError::NotFound(p)) if p == path));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "key: [unclosed\n").unwrap();
        let result: Result<BTreeMap<String, Vec<String>>, _> = read_yaml_file(&path);
        assert!(matches!(result, Err(PapersError::Parse { .. })));
    }

    #[test]
    fn write_then_read_preserves_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.yaml");
        let mut value = BTreeMap::new();
        value.insert("citekeys".to_string(), vec!["b".to_string(), "a".to_string()]);

        write_yaml_file(&path, &value).unwrap();
        let back: BTreeMap<String, Vec<String>> = read_yaml_file(&path).unwrap();
        assert_eq!(back, value);
    }
}
