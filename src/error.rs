//! Error handling for jgen.
//! Defines the error type and result alias used throughout the crate.

use std::io;
use thiserror::Error;

/// Errors that can occur while loading data or rendering a template.
///
/// Every variant is fatal: the invocation stops and no output is written.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed directive syntax, or a reference to an unknown filter, test or function.
    #[error("{name}:{line}: {message}")]
    TemplateSyntaxError { name: String, line: usize, message: String },

    /// The template or one of its includes is missing from every search path entry.
    #[error("{0}")]
    TemplateNotFound(String),

    /// A data file could not be parsed as a structured document.
    #[error("failed to parse data file '{path}': {message}")]
    DataParseError { path: String, message: String },

    /// Represents errors that occur during file system operations
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// A data directory could not be walked.
    #[error("IO error: {0}")]
    WalkDirError(#[from] walkdir::Error),

    /// Invalid engine configuration (delimiters, filter registry).
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Any other failure reported by the template engine while rendering.
    #[error("{0}")]
    MinijinjaError(minijinja::Error),
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

impl From<minijinja::Error> for Error {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        match err.kind() {
            ErrorKind::SyntaxError
            | ErrorKind::UnknownFilter
            | ErrorKind::UnknownTest
            | ErrorKind::UnknownFunction => Error::TemplateSyntaxError {
                name: err.name().unwrap_or("<unknown>").to_string(),
                line: err.line().unwrap_or(0),
                message: err
                    .detail()
                    .map(str::to_string)
                    .unwrap_or_else(|| err.kind().to_string()),
            },
            ErrorKind::TemplateNotFound => {
                let detail = err.detail().unwrap_or("template not found");
                Error::TemplateNotFound(match (err.name(), err.line()) {
                    (Some(name), Some(line)) => format!("{name}:{line}: {detail}"),
                    _ => detail.to_string(),
                })
            }
            _ => Error::MinijinjaError(err),
        }
    }
}

/// Default error handler that prints the error and exits the program.
///
/// Prints `error: <err>` to stderr and exits with status code 1.
pub fn default_error_handler(err: Error) -> ! {
    eprintln!("error: {err}");
    std::process::exit(1);
}
