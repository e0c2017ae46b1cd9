pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commands::CommandResult;
use landed_core::config::{AppConfig, ConfigOverrides, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "landed",
    about = "Landed-cost and investment-cycle simulator",
    long_about = "Compute import landed costs (freight/expense allocation, duty and grossed-up ICMS) \
                  and investment cycle recurrences from scenario files.",
    after_help = "Examples:\n  landed simulate order.json\n  landed cycles plan.toml\n  landed config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to landed.toml (defaults to ./landed.toml)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override output.decimal_places for this run")]
    decimal_places: Option<u32>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run an import-cost simulation from a JSON or TOML scenario file")]
    Simulate {
        #[arg(help = "Scenario file with `config` and `items`")]
        scenario: PathBuf,
    },
    #[command(about = "Run an investment cycle recurrence from a JSON or TOML plan file")]
    Cycles {
        #[arg(help = "Plan file with `initial_balance` and `cycles`")]
        plan: PathBuf,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Simulate { .. } => "simulate",
            Self::Cycles { .. } => "cycles",
            Self::Config => "config",
        }
    }
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                decimal_places: self.decimal_places,
                ..ConfigOverrides::default()
            },
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.load_options()) {
        Ok(config) => config,
        Err(error) => {
            let result = CommandResult::failure(
                cli.command.name(),
                "config_validation",
                error.to_string(),
                commands::EXIT_CONFIG,
            );
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };

    if let Err(error) = logging::init_logging(&config) {
        eprintln!("{error:#}");
    }

    let result = match &cli.command {
        Command::Simulate { scenario } => commands::simulate::run(scenario, &config),
        Command::Cycles { plan } => commands::cycles::run(plan, &config),
        Command::Config => CommandResult {
            exit_code: 0,
            output: commands::config::run(
                &config,
                cli.config.as_deref(),
                &cli.load_options().overrides,
            ),
        },
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
