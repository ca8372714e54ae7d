//! Where snapshots come from: the I/O half of the load-then-compute flow.
//!
//! A [`DataSource`] resolves a path to bytes. [`load_frame`] picks the
//! parser from the file extension and hands back a typed frame, so nothing
//! downstream touches raw files.

use crate::error::{Result, SeriesError};
use crate::ingest::{parse_csv, parse_json, CsvSchema, Ingested, JsonSchema};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::info;

/// Reads snapshot files by path.
pub trait DataSource {
    fn read(&self, path: &str) -> Result<Vec<u8>>;
}

/// Serves files below a base directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join `path` onto the root, refusing anything that could climb out.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || relative.as_os_str().is_empty() {
            return Err(SeriesError::PathOutsideRoot(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl DataSource for DirSource {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.resolve(path)?;
        Ok(std::fs::read(full)?)
    }
}

/// Snapshot format, normally taken from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    Csv,
    Json,
}

impl SnapshotFormat {
    pub fn from_path(path: &str) -> Result<Self> {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(SnapshotFormat::Csv),
            Some("json") => Ok(SnapshotFormat::Json),
            _ => Err(SeriesError::UnsupportedFormat(path.to_string())),
        }
    }
}

/// Schemas for both formats; only the one matching the file is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotSchema {
    pub csv: CsvSchema,
    pub json: JsonSchema,
}

/// Fetch and parse one snapshot.
pub fn load_frame<S: DataSource + ?Sized>(
    source: &S,
    path: &str,
    schema: &SnapshotSchema,
) -> Result<Ingested> {
    let format = SnapshotFormat::from_path(path)?;
    let bytes = source.read(path)?;

    let ingested = match format {
        SnapshotFormat::Csv => parse_csv(bytes.as_slice(), &schema.csv)?,
        SnapshotFormat::Json => parse_json(bytes.as_slice(), &schema.json)?,
    };

    info!(
        path,
        rows = ingested.frame.len(),
        metrics = ingested.frame.width(),
        skipped = ingested.report.issues.len(),
        "loaded snapshot"
    );
    Ok(ingested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MemorySource(HashMap<&'static str, &'static str>);

    impl DataSource for MemorySource {
        fn read(&self, path: &str) -> Result<Vec<u8>> {
            self.0
                .get(path)
                .map(|s| s.as_bytes().to_vec())
                .ok_or_else(|| {
                    SeriesError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, path.to_string()))
                })
        }
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(SnapshotFormat::from_path("a/b.csv").unwrap(), SnapshotFormat::Csv);
        assert_eq!(SnapshotFormat::from_path("B.JSON").unwrap(), SnapshotFormat::Json);
        assert!(matches!(
            SnapshotFormat::from_path("notes.txt"),
            Err(SeriesError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn resolve_rejects_parent_components() {
        let source = DirSource::new("/srv/data");
        assert_eq!(
            source.resolve("oi/2024.csv").unwrap(),
            PathBuf::from("/srv/data/oi/2024.csv")
        );
        assert_eq!(
            source.resolve("/oi.csv").unwrap(),
            PathBuf::from("/srv/data/oi.csv")
        );
        assert!(source.resolve("../etc/passwd").is_err());
        assert!(source.resolve("oi/../../x.csv").is_err());
        assert!(source.resolve("").is_err());
    }

    #[test]
    fn loads_by_extension() {
        let mut files = HashMap::new();
        files.insert("oi.csv", "Date,v\n2024-01-01,1\n");
        files.insert("oi.json", r#"[{"date": "2024-01-01", "value": 2}]"#);
        let source = MemorySource(files);
        let schema = SnapshotSchema::default();

        let csv = load_frame(&source, "oi.csv", &schema).unwrap();
        assert_eq!(csv.frame.column("v").unwrap(), &[Some(1.0)]);

        let json = load_frame(&source, "oi.json", &schema).unwrap();
        assert_eq!(json.frame.column("value").unwrap(), &[Some(2.0)]);

        assert!(matches!(
            load_frame(&source, "missing.csv", &schema),
            Err(SeriesError::Io(_))
        ));
    }
}
