//! Engine configuration for jgen.
//! The configuration is built once per invocation and handed to the renderer;
//! nothing in it changes while templates are rendered.

use crate::error::{Error, Result};
use crate::filters::FilterRegistry;
use crate::loader::SearchPath;
use minijinja::syntax::SyntaxConfig;
use std::path::PathBuf;

/// Template extensions that turn on HTML/XML autoescaping.
pub const AUTOESCAPE_EXTENSIONS: [&str; 2] = ["html", "xml"];

/// Whether `name` ends in `.<ext>` for one of `extensions`, ignoring ASCII case.
pub fn has_extension(name: &str, extensions: &[&str]) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Literal markers bounding block, variable and comment directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pub block_start: String,
    pub block_end: String,
    pub variable_start: String,
    pub variable_end: String,
    pub comment_start: String,
    pub comment_end: String,
}

impl Default for Delimiters {
    /// `@[ ... ]` for blocks, `@( ... )` for variables, `@# ... #` for comments.
    fn default() -> Self {
        Self {
            block_start: "@[".to_string(),
            block_end: "]".to_string(),
            variable_start: "@(".to_string(),
            variable_end: ")".to_string(),
            comment_start: "@#".to_string(),
            comment_end: "#".to_string(),
        }
    }
}

impl Delimiters {
    fn markers(&self) -> [(&'static str, &str); 6] {
        [
            ("block start", self.block_start.as_str()),
            ("block end", self.block_end.as_str()),
            ("variable start", self.variable_start.as_str()),
            ("variable end", self.variable_end.as_str()),
            ("comment start", self.comment_start.as_str()),
            ("comment end", self.comment_end.as_str()),
        ]
    }

    /// Checks that the six markers can be matched greedily without ambiguity.
    ///
    /// # Errors
    /// * `Error::ConfigError` if a marker is empty, two markers are equal,
    ///   or a start marker is a prefix of another start marker
    pub fn validate(&self) -> Result<()> {
        let markers = self.markers();
        for (i, (kind, marker)) in markers.iter().enumerate() {
            if marker.is_empty() {
                return Err(Error::ConfigError(format!("{kind} delimiter must not be empty")));
            }
            for (other_kind, other) in &markers[i + 1..] {
                if marker == other {
                    return Err(Error::ConfigError(format!(
                        "{kind} and {other_kind} delimiters are both '{marker}'"
                    )));
                }
            }
        }

        let starts = [&self.block_start, &self.variable_start, &self.comment_start];
        for a in starts {
            for b in starts {
                if a != b && b.starts_with(a.as_str()) {
                    return Err(Error::ConfigError(format!(
                        "start delimiter '{a}' is a prefix of '{b}'"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Converts the markers into the engine's lexer configuration.
    pub fn to_syntax_config(&self) -> Result<SyntaxConfig> {
        self.validate()?;
        Ok(SyntaxConfig::builder()
            .block_delimiters(self.block_start.clone(), self.block_end.clone())
            .variable_delimiters(self.variable_start.clone(), self.variable_end.clone())
            .comment_delimiters(self.comment_start.clone(), self.comment_end.clone())
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?)
    }
}

/// Immutable settings for one template engine instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub delimiters: Delimiters,
    pub search_path: SearchPath,
    pub filters: FilterRegistry,
    /// Drop the first newline after a block tag.
    pub trim_blocks: bool,
    /// Keep the final newline of every template source.
    pub keep_trailing_newline: bool,
    pub autoescape_extensions: Vec<&'static str>,
}

impl EngineConfig {
    /// The fixed jgen configuration with `include_dirs` appended to the search path.
    ///
    /// # Arguments
    /// * `include_dirs` - Directories searched for includes, after `./` and `/`
    ///
    /// # Returns
    /// * `Result<EngineConfig>` - Configuration with the built-in filters registered
    ///
    /// # Errors
    /// * `Error::ConfigError` if the built-in filter table is invalid
    pub fn new(include_dirs: Vec<PathBuf>) -> Result<Self> {
        Ok(Self {
            delimiters: Delimiters::default(),
            search_path: SearchPath::new(include_dirs),
            filters: FilterRegistry::builtin()?,
            trim_blocks: true,
            keep_trailing_newline: true,
            autoescape_extensions: AUTOESCAPE_EXTENSIONS.to_vec(),
        })
    }

    /// Whether output rendered from `template_name` should be HTML/XML escaped.
    pub fn autoescape_for(&self, template_name: &str) -> bool {
        has_extension(template_name, &self.autoescape_extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delimiters_are_valid() {
        let delimiters = Delimiters::default();
        assert!(delimiters.validate().is_ok());
        assert!(delimiters.to_syntax_config().is_ok());
    }

    #[test]
    fn test_duplicate_delimiters_rejected() {
        let delimiters = Delimiters { comment_end: "]".to_string(), ..Delimiters::default() };
        assert!(matches!(delimiters.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_empty_delimiter_rejected() {
        let delimiters = Delimiters { variable_end: String::new(), ..Delimiters::default() };
        assert!(matches!(delimiters.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_prefix_start_delimiters_rejected() {
        let delimiters = Delimiters { block_start: "@".to_string(), ..Delimiters::default() };
        let err = delimiters.validate().unwrap_err();
        assert!(err.to_string().contains("prefix"));
    }

    #[test]
    fn test_autoescape_for() {
        let config = EngineConfig::new(Vec::new()).unwrap();
        assert!(config.autoescape_for("index.html"));
        assert!(config.autoescape_for("INDEX.HTML"));
        assert!(config.autoescape_for("feed.Xml"));
        assert!(config.autoescape_for("templates/feed.xml"));
        assert!(!config.autoescape_for("api.h"));
        assert!(!config.autoescape_for("page.htm"));
        assert!(!config.autoescape_for("html"));
    }

    #[test]
    fn test_engine_config_search_path() {
        let config = EngineConfig::new(vec![PathBuf::from("include")]).unwrap();
        assert_eq!(
            config.search_path.roots(),
            &[PathBuf::from("./"), PathBuf::from("/"), PathBuf::from("include")]
        );
        assert!(config.trim_blocks);
        assert!(config.keep_trailing_newline);
    }
}
