//! Data namespace assembly.
//! Every file below the data directories becomes one entry of the namespace,
//! keyed by its file name without the final extension.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Parsed content of one data file.
///
/// YAML values keep non-string mapping keys and non-finite floats.
pub type DataValue = serde_yaml::Value;

/// Merged data exposed to templates as `data`.
///
/// Keys are data file stems. A key loaded from a later directory replaces the
/// earlier value as a whole; values are never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Namespace(IndexMap<String, DataValue>);

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `key`, returning the previous value.
    pub fn insert(&mut self, key: String, value: DataValue) -> Option<DataValue> {
        self.0.insert(key, value)
    }

    pub fn get(&self, key: &str) -> Option<&DataValue> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, DataValue)> for Namespace {
    fn from_iter<I: IntoIterator<Item = (String, DataValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Returns the namespace key for a data file: its name minus the final extension.
pub fn data_key(path: &Path) -> Option<String> {
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
}

/// Parses one data file.
///
/// `.json` files go through the JSON parser, everything else is read as YAML.
/// A blank file yields `null`.
///
/// # Arguments
/// * `path` - Data file to read
///
/// # Returns
/// * `Result<DataValue>` - The parsed document
///
/// # Errors
/// * `Error::IoError` if the file cannot be read
/// * `Error::DataParseError` if its content is not a valid document
pub fn parse_data_file(path: &Path) -> Result<DataValue> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(DataValue::Null);
    }

    let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed: std::result::Result<DataValue, String> = if is_json {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(&content).map_err(|e| e.to_string())
    };

    parsed.map_err(|message| Error::DataParseError { path: path.display().to_string(), message })
}

/// Loads every data file below `data_dir`, in file name order.
///
/// Symlinks to files are read through the link; a dangling symlink is an
/// error. Directory symlinks are not descended into.
///
/// # Arguments
/// * `data_dir` - Root of the tree to walk
///
/// # Returns
/// * `Result<Vec<(String, DataValue)>>` - `(key, value)` pairs in visit order
pub fn load_data_dir<P: AsRef<Path>>(data_dir: P) -> Result<Vec<(String, DataValue)>> {
    let data_dir = data_dir.as_ref();
    debug!("Loading data from {}", data_dir.display());

    let mut entries = Vec::new();
    for entry in WalkDir::new(data_dir).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if entry.path_is_symlink() {
            // A dangling link fails here instead of being skipped.
            fs::metadata(path)?;
        }
        if !path.is_file() {
            continue;
        }
        let Some(key) = data_key(path) else {
            continue;
        };
        debug!("Parsing data file {} as '{}'", path.display(), key);
        entries.push((key, parse_data_file(path)?));
    }
    Ok(entries)
}

/// Builds the namespace from `data_dirs`, processed in the given order.
///
/// # Arguments
/// * `data_dirs` - Data directories; a later directory wins on key collisions
///
/// # Returns
/// * `Result<Namespace>` - The merged namespace
///
/// # Errors
/// * `Error::WalkDirError` if a directory cannot be walked
/// * `Error::DataParseError` if any data file fails to parse
pub fn load_data<P: AsRef<Path>>(data_dirs: &[P]) -> Result<Namespace> {
    let mut namespace = Namespace::new();
    for data_dir in data_dirs {
        for (key, value) in load_data_dir(data_dir)? {
            if namespace.insert(key.clone(), value).is_some() {
                debug!("Data key '{}' replaced by {}", key, data_dir.as_ref().display());
            }
        }
    }
    Ok(namespace)
}
