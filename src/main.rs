//! storefront-check - end-to-end conformance harness for a storefront API
//!
//! Running without arguments executes the built-in storefront scenario
//! against the configured server and exits 0 only if every check passed.

use std::path::PathBuf;

use clap::Parser;
use storefront::cli::{self, GlobalOptions};
use storefront::commands::Commands;
use storefront::common::logging;

#[derive(Parser)]
#[command(name = "storefront-check", about = "Storefront API conformance harness")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: platform config dir/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    logging::init_cli(cli.verbose);

    let options = GlobalOptions { config: cli.config };
    let command = cli.command.unwrap_or_default();

    let code = match cli::dispatch(command, &options).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    };

    std::process::exit(code);
}
