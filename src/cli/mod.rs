//! CLI command handling
//!
//! Resolves configuration, builds the runner and maps the run outcome to a
//! process exit code.

use std::path::{Path, PathBuf};

use colored::Colorize;
use tracing::info;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::Result;
use crate::testing::{run_scenario, OnFailure, Scenario, TestRunner};

/// Options shared by every command
#[derive(Debug, Default)]
pub struct GlobalOptions {
    /// Explicit config file instead of the default location
    pub config: Option<PathBuf>,
}

/// Dispatch a CLI command, returning the process exit code
pub async fn dispatch(command: Commands, options: &GlobalOptions) -> Result<i32> {
    match command {
        Commands::Run {
            scenario,
            base_url,
            report,
        } => {
            let mut config = load_config(options)?;
            if let Some(url) = base_url {
                config.target.base_url = url;
            }
            let scenario = load_scenario(scenario.as_deref())?;

            let mut runner = TestRunner::from_config(&config)?;
            let run = run_scenario(&mut runner, &scenario).await;

            if let Some(path) = report {
                run.write_json(&path)?;
                info!(path = %path.display(), "report written");
            }

            Ok(run.exit_code())
        }

        Commands::List { scenario } => {
            let scenario = load_scenario(scenario.as_deref())?;
            print_plan(&scenario);
            Ok(0)
        }
    }
}

fn load_config(options: &GlobalOptions) -> Result<Config> {
    match &options.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn load_scenario(path: Option<&Path>) -> Result<Scenario> {
    match path {
        Some(path) => Scenario::load(path),
        None => Ok(Scenario::storefront()),
    }
}

fn print_plan(scenario: &Scenario) {
    println!("{}", scenario.name.white().bold());
    if let Some(desc) = &scenario.description {
        println!("  {}", desc.dimmed());
    }
    for (i, step) in scenario.steps.iter().enumerate() {
        let gate = match step.on_failure {
            OnFailure::Abort => " (abort on failure)".red().to_string(),
            OnFailure::Continue => String::new(),
        };
        println!("  {:>2}. {}{}", i + 1, step.title, gate);
    }
}
