//! Template lookup for jgen.
//! Templates and their includes are resolved against an ordered list of
//! directory roots; the first root containing the template wins.

use log::{debug, trace};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Roots consulted before any include directory.
pub const DEFAULT_ROOTS: [&str; 2] = ["./", "/"];

/// Ordered directory roots used to resolve template names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    roots: Vec<PathBuf>,
}

/// Splits a template name into path segments.
///
/// Returns `None` if the name tries to leave its root through `..`.
fn split_template_name(name: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    for segment in name.split(['/', '\\']) {
        match segment {
            ".." => return None,
            "" | "." => continue,
            _ => segments.push(segment),
        }
    }
    Some(segments)
}

impl SearchPath {
    /// Creates a search path of the working directory, the filesystem root
    /// and then `include_dirs` in the given order.
    pub fn new(include_dirs: Vec<PathBuf>) -> Self {
        let roots = DEFAULT_ROOTS.iter().map(PathBuf::from).chain(include_dirs).collect();
        Self { roots }
    }

    /// The roots in lookup order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Finds the first file named `name` under any root.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let segments = split_template_name(name)?;
        if segments.is_empty() {
            return None;
        }
        self.roots.iter().find_map(|root| {
            let candidate = segments.iter().fold(root.to_path_buf(), |path, s| path.join(s));
            trace!("Trying template candidate {}", candidate.display());
            candidate.is_file().then_some(candidate)
        })
    }

    /// Reads the template named `name`, or returns `Ok(None)` if no root has it.
    pub fn load(&self, name: &str) -> io::Result<Option<String>> {
        match self.resolve(name) {
            Some(path) => {
                debug!("Loading template '{}' from {}", name, path.display());
                fs::read_to_string(&path).map(Some)
            }
            None => Ok(None),
        }
    }
}
