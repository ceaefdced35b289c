//! Command-line argument definitions.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined
//! here, keeping `main.rs` focused on dispatch logic.

use clap::{Parser, Subcommand};

/// Fugata - Deterministic Baroque Score Generation
#[derive(Parser)]
#[command(name = "fugata")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a score from a spec file
    Generate {
        /// Path to the spec file (JSON)
        #[arg(short, long)]
        spec: String,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<String>,

        /// Also write the score as a JSON note dump
        #[arg(long)]
        dump_json: bool,
    },

    /// Validate a spec file without generating a score
    Validate {
        /// Path to the spec file (JSON)
        #[arg(short, long)]
        spec: String,
    },

    /// Generate a score and print quality metrics
    Analyze {
        /// Path to the spec file (JSON)
        #[arg(short, long)]
        spec: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generate_with_output_dir() {
        let cli = Cli::try_parse_from([
            "fugata",
            "generate",
            "--spec",
            "specs/fugue.json",
            "--output",
            "out",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate {
                spec,
                output,
                dump_json,
            } => {
                assert_eq!(spec, "specs/fugue.json");
                assert_eq!(output.as_deref(), Some("out"));
                assert!(!dump_json);
            }
            _ => panic!("expected generate command"),
        }
    }

    #[test]
    fn parses_validate() {
        let cli = Cli::try_parse_from(["fugata", "validate", "-s", "specs/fugue.json"]).unwrap();
        match cli.command {
            Commands::Validate { spec } => assert_eq!(spec, "specs/fugue.json"),
            _ => panic!("expected validate command"),
        }
    }
}
