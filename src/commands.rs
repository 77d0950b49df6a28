//! CLI command definitions
//!
//! Defines the clap commands for the storefront harness.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run a scenario against the storefront (the default)
    Run {
        /// YAML scenario file; the built-in storefront run when omitted
        #[arg(long, short)]
        scenario: Option<PathBuf>,

        /// Base URL of the storefront, overriding config and environment
        #[arg(long)]
        base_url: Option<String>,

        /// Write a JSON report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print the steps of a scenario without sending any request
    List {
        /// YAML scenario file; the built-in storefront run when omitted
        #[arg(long, short)]
        scenario: Option<PathBuf>,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Run {
            scenario: None,
            base_url: None,
            report: None,
        }
    }
}
