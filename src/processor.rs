//! Render driver: loads data, renders the template and writes the result.
//!
//! Rendering completes before anything is written, so a failed invocation
//! leaves the destination untouched.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;

use crate::cli::Args;
use crate::config::EngineConfig;
use crate::data::load_data;
use crate::error::{Error, Result};
use crate::renderer::{MiniJinjaRenderer, TemplateRenderer};

/// Output argument value selecting standard output.
pub const STDOUT_SENTINEL: &str = "-";

/// Where rendered text goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    /// Parses an output argument; `-` selects standard output.
    ///
    /// # Arguments
    /// * `arg` - Output path from the command line, or `-`
    pub fn from_arg<S: AsRef<str>>(arg: S) -> Self {
        match arg.as_ref() {
            STDOUT_SENTINEL => Output::Stdout,
            path => Output::File(PathBuf::from(path)),
        }
    }

    /// Writes `content`, creating missing parent directories of a file destination.
    ///
    /// # Arguments
    /// * `content` - Rendered text to write
    ///
    /// # Errors
    /// * `Error::IoError` if a directory or the file cannot be created or written
    pub fn write(&self, content: &str) -> Result<()> {
        match self {
            Output::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(content.as_bytes())?;
                stdout.flush()?;
                Ok(())
            }
            Output::File(path) => write_file(content, path),
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stdout => write!(f, "standard output"),
            Output::File(path) => write!(f, "'{}'", path.display()),
        }
    }
}

fn write_file<P: AsRef<Path>>(content: &str, dest_path: P) -> Result<()> {
    let dest_path = dest_path.as_ref();
    if let Some(parent) = dest_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(Error::IoError)?;
    }
    std::fs::write(dest_path, content).map_err(Error::IoError)
}

/// Loads the namespace from `data_dirs` and renders `template` with it.
///
/// # Arguments
/// * `template` - Template name, resolved on the search path
/// * `data_dirs` - Data directories, later ones overriding earlier keys
/// * `include_dirs` - Extra search path roots for the template and its includes
///
/// # Returns
/// * `Result<String>` - The complete rendered text
///
/// # Errors
/// * `Error::DataParseError`/`Error::WalkDirError` before any rendering starts
/// * `Error::TemplateNotFound`/`Error::TemplateSyntaxError` from the renderer
pub fn render<D: AsRef<Path>, I: AsRef<Path>>(
    template: &str,
    data_dirs: &[D],
    include_dirs: &[I],
) -> Result<String> {
    let namespace = load_data(data_dirs)?;
    debug!("Loaded {} data entries", namespace.len());

    let config = EngineConfig::new(
        include_dirs.iter().map(|dir| dir.as_ref().to_path_buf()).collect(),
    )?;
    let renderer = MiniJinjaRenderer::new(&config)?;
    renderer.render(template, &namespace)
}

/// Main application logic execution.
///
/// # Arguments
/// * `args` - Parsed command line arguments
///
/// # Returns
/// * `Result<()>` - Success, or the first error; nothing is written on error
///
/// # Flow
/// 1. Loads every data directory into one namespace
/// 2. Renders the template against it
/// 3. Writes the rendered text to the selected output
pub fn run(args: Args) -> Result<()> {
    let output = Output::from_arg(&args.output);
    let rendered = render(&args.template, &args.data_dirs, &args.include_dirs)?;

    debug!("Writing {} bytes to {}", rendered.len(), output);
    output.write(&rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_from_arg() {
        assert_eq!(Output::from_arg("-"), Output::Stdout);
        assert_eq!(Output::from_arg("out/gen.h"), Output::File(PathBuf::from("out/gen.h")));
    }

    #[test]
    fn test_output_display() {
        assert_eq!(Output::Stdout.to_string(), "standard output");
        assert_eq!(Output::File(PathBuf::from("a/b.h")).to_string(), "'a/b.h'");
    }
}
