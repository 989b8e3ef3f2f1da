//! # coldgen
//!
//! CLI tool for generating a Java class library, a TypeScript model library
//! and a mongoose schema library from one domain document.
//!
//! ## Usage
//!
//! ```bash
//! # Generate every target
//! coldgen generate
//!
//! # Generate only the TypeScript models, with debug logging
//! coldgen generate --target model --verbose
//!
//! # Dry run to preview changes
//! coldgen generate --dry-run
//!
//! # Initialize configuration
//! coldgen init
//!
//! # Check the generated trees are up-to-date
//! coldgen check
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use colored::Colorize;

use coldgen::{EmitReport, WriteResult};
use coldgen_cli::{
    config::{CliArgs, Config, ConfigManager},
    error::CliError,
    logging,
    runner::{Project, Stats},
    BarProgress, Target,
};

#[derive(Parser)]
#[command(name = "coldgen")]
#[command(author, version, about = "Generate domain libraries from a domain document", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the selected target libraries
    Generate {
        /// Target to generate (repeatable; all targets when omitted)
        #[arg(short, long, value_enum)]
        target: Vec<Target>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Definition directory (overrides the configuration)
        #[arg(short, long)]
        definition: Option<PathBuf>,

        /// Output base directory (overrides the configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Preview changes without writing files
        #[arg(long)]
        dry_run: bool,

        /// Enable debug logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Initialize a new coldgen configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "coldgen.toml")]
        output: PathBuf,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Check that the generated libraries are up-to-date
    Check {
        /// Target to check (repeatable; all targets when omitted)
        #[arg(short, long, value_enum)]
        target: Vec<Target>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print a summary of the domain document
    Stats {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Generate {
            target,
            config,
            definition,
            output,
            dry_run,
            verbose,
        } => {
            let config = ConfigManager::load(config.as_deref())?;
            let config = ConfigManager::merge_cli_args(
                config,
                &CliArgs {
                    definition_dir: definition,
                    output,
                    ..Default::default()
                },
            );
            cmd_generate(config, &target, dry_run, verbose)
        }

        Commands::Init { output, force } => cmd_init(output, force),

        Commands::Check { target, config } => {
            cmd_check(ConfigManager::load(config.as_deref())?, &target)
        }

        Commands::Stats { config } => cmd_stats(ConfigManager::load(config.as_deref())?),
    }
}

/// Generate command implementation.
fn cmd_generate(
    config: Config,
    targets: &[Target],
    dry_run: bool,
    verbose: bool,
) -> Result<(), CliError> {
    let _log = logging::init(&config.log, verbose)?;
    let started = Instant::now();

    println!("{}", "Loading definitions...".cyan());
    let project = Project::load(config)?;
    print_banner(&project.stats());

    let mut progress = BarProgress::new();
    let reports = project.generate(targets, dry_run, &mut progress)?;

    for report in &reports {
        print_report(report);
    }

    let failures: usize = reports.iter().map(|r| r.failures.len()).sum();
    println!(
        "\n{} Finished in {:.2?}",
        if failures == 0 { "✓".green() } else { "!".yellow() },
        started.elapsed()
    );

    if failures > 0 {
        println!(
            "{} {} file(s) could not be written",
            "Warning:".yellow(),
            failures
        );
    }

    Ok(())
}

/// Init command implementation.
fn cmd_init(output: PathBuf, force: bool) -> Result<(), CliError> {
    if output.exists() && !force {
        println!(
            "{} Configuration file already exists: {}",
            "Error:".red(),
            output.display()
        );
        println!("  Use --force to overwrite");
        return Err(CliError::Validation(
            "Configuration file already exists".to_string(),
        ));
    }

    std::fs::write(&output, ConfigManager::default_config_content())?;

    println!(
        "{} Created configuration file: {}",
        "✓".green(),
        output.display()
    );

    Ok(())
}

/// Check command implementation.
fn cmd_check(config: Config, targets: &[Target]) -> Result<(), CliError> {
    let _log = logging::init(&config.log, false)?;
    println!("{}", "Checking generated libraries...".cyan());

    let project = Project::load(config)?;
    let drift = project.check(targets)?;

    if drift.is_empty() {
        println!("{} Generated libraries are up-to-date", "✓".green());
        return Ok(());
    }

    println!("{} Generated libraries are out of date", "✗".red());
    for item in &drift {
        println!("  {item}");
    }
    println!("  Run 'coldgen generate' to update");
    Err(CliError::Validation(format!(
        "{} file(s) out of date",
        drift.len()
    )))
}

/// Stats command implementation.
fn cmd_stats(config: Config) -> Result<(), CliError> {
    let project = Project::load(config)?;
    let stats = project.stats();

    println!("{}", "Domain summary".cyan().bold());
    println!("  Library version: {}", stats.lib_version.green());
    println!("  Classes:         {}", stats.classes.to_string().green());
    println!("  Enums:           {}", stats.enums.to_string().green());
    println!("  Packages:        {}", stats.packages.to_string().green());
    Ok(())
}

fn print_banner(stats: &Stats) {
    println!(
        "  Library version {} with {} class(es) in {} package(s)",
        stats.lib_version.green(),
        stats.classes.to_string().green(),
        stats.packages.to_string().green()
    );
}

fn print_report(report: &EmitReport) {
    let dry_runs: Vec<_> = report
        .written
        .iter()
        .filter_map(|result| match result {
            WriteResult::DryRun { path, .. } => Some(path),
            WriteResult::Written { .. } => None,
        })
        .collect();

    if dry_runs.is_empty() {
        println!(
            "{} {:<7} {} class(es), {} file(s), {} bytes in {:.2?}",
            "✓".green(),
            report.target,
            report.processed,
            report.written.len(),
            report.bytes(),
            report.elapsed
        );
    } else {
        println!(
            "{} {:<7} {} class(es), would write {} file(s):",
            "[dry-run]".yellow(),
            report.target,
            report.processed,
            dry_runs.len()
        );
        for path in dry_runs {
            println!("    {}", path.display().to_string().dimmed());
        }
    }

    for failure in &report.failures {
        println!("  {} {}", "✗".red(), failure);
    }
}

/// Print an error with formatting.
fn print_error(error: &CliError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}
