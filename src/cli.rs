//! Command-line interface implementation for jgen.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

/// Command-line arguments structure for jgen.
#[derive(Parser, Debug)]
#[command(author, version, about = "jgen: expand a template against YAML data", long_about = None)]
pub struct Args {
    /// Template to render, looked up in ./, / and the include directories
    #[arg(value_name = "TEMPLATE")]
    pub template: String,

    /// Output file, or '-' for standard output
    #[arg(value_name = "OUTPUT", default_value = "-")]
    pub output: String,

    /// Directory containing data files (may be repeated, later ones win)
    #[arg(short = 'd', long = "data-dir", value_name = "DIR")]
    pub data_dirs: Vec<PathBuf>,

    /// Directory searched for included templates (may be repeated)
    #[arg(short = 'i', long = "include-dir", value_name = "DIR")]
    pub include_dirs: Vec<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
