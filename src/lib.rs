//! jgen expands a template against a namespace of YAML data.
//! It resolves includes on a search path, renders `@[ ]`, `@( )` and `@# #`
//! directives and provides identifier case filters for code generation.

/// Command-line interface module for the jgen application
pub mod cli;

/// Engine configuration: delimiters, rendering flags, autoescaping
pub mod config;

/// Loading data directories into the template namespace
pub mod data;

/// Error types and handling for the jgen application
pub mod error;

/// Identifier case filters (`varify`, `typeify`, `constify`)
pub mod filters;

/// Search path resolution for templates and includes
pub mod loader;

/// Render driver combining data loading, rendering and output
pub mod processor;

/// Filter and test names referenced by a template source
pub mod references;

/// Template rendering on top of MiniJinja
pub mod renderer;
