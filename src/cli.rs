use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "flight-crew-xlsx")]
#[command(version, about = "Read and write flight crew scheduling workbooks")]
pub struct Cli {
    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print debug diagnostics (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read a workbook and report what it contains
    Validate {
        /// Input xlsx workbook
        input: PathBuf,
    },

    /// Read a workbook and write it back out, adding the score view
    Convert {
        /// Input xlsx workbook
        input: PathBuf,

        /// Output xlsx workbook
        output: PathBuf,
    },

    /// Dump the solution read from a workbook as JSON
    Export {
        /// Input xlsx workbook
        input: PathBuf,

        /// Output JSON file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a workbook from a JSON solution, e.g. one returned by a solver
    Import {
        /// Input JSON solution
        input: PathBuf,

        /// Output xlsx workbook
        output: PathBuf,
    },

    /// List the sheets and column headers a readable workbook has
    ListSheets,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_output_is_optional() {
        let cli = Cli::try_parse_from(["flight-crew-xlsx", "export", "in.xlsx"]).unwrap();
        match cli.command {
            Commands::Export { input, output } => {
                assert_eq!(input, PathBuf::from("in.xlsx"));
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["flight-crew-xlsx", "validate", "in.xlsx", "-q"]).unwrap();
        assert!(cli.quiet);
        assert!(!cli.verbose);
    }
}
