//! Record store: flat JSON files holding lists of records (or whole documents).
//!
//! Reads never fail. A missing or empty file is "no data"; a file that can't
//! be read or decoded is also "no data", plus a warning for the caller to
//! show. Writes replace the whole file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info, warn};
use wet_core::{Error, Result};

/// A recoverable problem reading a data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreWarning {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for StoreWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error loading {}: {}", self.path.display(), self.message)
    }
}

/// Result of a read: the data (possibly empty) and an optional warning.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub data: T,
    pub warning: Option<StoreWarning>,
}

impl<T> Loaded<T> {
    fn ok(data: T) -> Self {
        Self { data, warning: None }
    }

    fn warn(data: T, path: &Path, message: impl Into<String>) -> Self {
        let warning = StoreWarning {
            path: path.to_path_buf(),
            message: message.into(),
        };
        warn!("{warning}");
        Self {
            data,
            warning: Some(warning),
        }
    }
}

/// Read a whole JSON document. `None` when the file is absent, empty or unreadable.
pub fn load_value(path: &Path) -> Loaded<Option<Value>> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Loaded::ok(None),
        Err(e) => return Loaded::warn(None, path, e.to_string()),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Loaded::ok(None);
    }
    match serde_json::from_slice(&bytes) {
        Ok(v) => Loaded::ok(Some(v)),
        Err(e) => Loaded::warn(None, path, e.to_string()),
    }
}

/// Read a list of records. An object at the top level yields its values.
pub fn load(path: &Path) -> Loaded<Vec<Value>> {
    let Loaded { data, warning } = load_value(path);
    let records = match data {
        None => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(Value::Object(map)) => {
            debug!("{} holds an object, using its values as records", path.display());
            map.into_iter().map(|(_, v)| v).collect()
        }
        Some(other) => {
            return Loaded::warn(Vec::new(), path, format!("expected a list of records, found {other}"));
        }
    };
    debug!("loaded {} records from {}", records.len(), path.display());
    Loaded { data: records, warning }
}

/// Write `value` as 4-space-indented JSON, replacing the file.
pub fn save_value<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| Error::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;

    fs::write(path, buf).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("saved {}", path.display());
    Ok(())
}

/// Write the full record list.
pub fn save(path: &Path, records: &[Value]) -> Result<()> {
    save_value(path, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_missing_and_empty_files_are_empty() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert_eq!(load(&missing), Loaded::ok(Vec::new()));

        let empty = dir.path().join("empty.json");
        fs::write(&empty, "").unwrap();
        let got = load(&empty);
        assert!(got.data.is_empty());
        assert!(got.warning.is_none());
    }

    #[test]
    fn test_object_top_level_yields_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.json");
        fs::write(&path, r#"{"0": {"category": "Food"}, "1": {"category": "Rent"}}"#).unwrap();
        let got = load(&path);
        assert_eq!(got.data.len(), 2);
        assert!(got.warning.is_none());
    }

    #[test]
    fn test_malformed_json_warns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "[{\"category\": ").unwrap();
        let got = load(&path);
        assert!(got.data.is_empty());
        let w = got.warning.unwrap();
        assert_eq!(w.path, path);
        assert!(w.to_string().starts_with("Error loading"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("saved.json");
        let records = vec![json!({"date": "2024-03-04", "amount(kes)": 1000.0})];
        save(&path, &records).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n    {"), "expected 4-space indent:\n{text}");
        assert_eq!(load(&path).data, records);
    }

    #[test]
    fn test_save_into_unwritable_location_errors() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let err = save(&blocker.join("child.json"), &[]).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
