//! Identifier case filters exposed to templates.
//!
//! Identifiers are split into subwords on `_`, `.` and space. Each separator
//! counts on its own, so adjacent separators produce empty subwords which are
//! passed through unchanged.

use crate::error::{Error, Result};
use log::trace;
use minijinja::Environment;

/// Characters that separate subwords in an identifier.
pub const SEPARATORS: [char; 3] = ['_', '.', ' '];

/// Signature shared by every case filter.
pub type CaseFilter = fn(&str) -> String;

/// The closed set of filters registered on every engine.
const BUILTIN_FILTERS: [(&str, CaseFilter); 3] =
    [("varify", varify), ("typeify", typeify), ("constify", constify)];

/// Splits an identifier into its subwords.
///
/// An empty identifier yields a single empty subword.
pub fn split_identifier(identifier: &str) -> Vec<&str> {
    identifier.split(SEPARATORS).collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Leaves a variable name untouched: `abc_def` -> `abc_def`.
pub fn varify(name: &str) -> String {
    name.to_string()
}

/// Converts an identifier to a type name: `abc_def` -> `AbcDef`.
pub fn typeify(name: &str) -> String {
    split_identifier(name).into_iter().map(capitalize).collect()
}

/// Converts an identifier to a constant name: `abc_def` -> `ABC_DEF`.
pub fn constify(name: &str) -> String {
    split_identifier(name)
        .into_iter()
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Named, pure string filters installed into a template environment.
#[derive(Debug, Clone)]
pub struct FilterRegistry {
    filters: Vec<(&'static str, CaseFilter)>,
}

impl FilterRegistry {
    /// Builds a registry from `(name, filter)` pairs.
    ///
    /// # Errors
    /// * `Error::ConfigError` if a name is empty or appears twice
    pub fn new(filters: &[(&'static str, CaseFilter)]) -> Result<Self> {
        let mut registered: Vec<(&'static str, CaseFilter)> = Vec::with_capacity(filters.len());
        for &(name, filter) in filters {
            if name.is_empty() {
                return Err(Error::ConfigError("filter name must not be empty".to_string()));
            }
            if registered.iter().any(|(existing, _)| *existing == name) {
                return Err(Error::ConfigError(format!("duplicate filter name '{name}'")));
            }
            registered.push((name, filter));
        }
        Ok(Self { filters: registered })
    }

    /// Builds the registry of `varify`, `typeify` and `constify`.
    ///
    /// # Returns
    /// * `Result<FilterRegistry>` - The validated built-in registry
    pub fn builtin() -> Result<Self> {
        Self::new(&BUILTIN_FILTERS)
    }

    /// Whether a filter is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the filter registered under `name`.
    pub fn get(&self, name: &str) -> Option<CaseFilter> {
        self.filters.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
    }

    /// Names of all registered filters, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.filters.iter().map(|(name, _)| *name)
    }

    /// Installs every filter on the environment.
    pub fn register(&self, env: &mut Environment<'static>) {
        for &(name, filter) in &self.filters {
            trace!("Registering filter '{name}'");
            env.add_filter(name, move |value: String| filter(&value));
        }
    }
}
