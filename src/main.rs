//! Persona Builder - CLI entry point
//!
//! Dispatches subcommands to the build pipeline: assess and build persona
//! definitions, inspect the on-disk version catalog, and manage
//! configuration.

use std::fs;
use std::path::Path;

use clap::Parser;
use tracing::info;

use persona_builder::builder::{BuildOutcome, PersonaBuilder};
use persona_builder::config::{self, BuilderConfig};
use persona_builder::error::{Error, Result};
use persona_builder::logging::{self, LogGuards};
use persona_builder::spec::RawPersona;
use persona_builder::version;
use persona_builder::versioning::{list_personas, persona_versions};

mod cli;

use cli::{Cli, Commands, ConfigSubcommand};

fn main() {
    if let Err(e) = run() {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Light commands skip config loading and the full logging stack
    match &cli.command {
        Commands::Version => {
            version::print_version();
            return Ok(());
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            return handle_config_command(subcommand.clone(), cli.config.as_deref());
        }
        _ => {}
    }

    let mut config = BuilderConfig::load(cli.config.as_deref())?;

    // --output-root beats the configured tree for this one build
    if let Commands::Build {
        output_root: Some(ref root),
        ..
    } = cli.command
    {
        config.storage.output_root = root.clone();
    }

    // Guards flush file logs on drop; keep them for the whole run
    let _log_guards: LogGuards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

    let build = version::build_info();
    info!(
        version = %build.full_version(),
        profile = %build.profile,
        "Starting persona builder"
    );

    match cli.command {
        Commands::Assess { file } => {
            let raw = read_raw_persona(&file)?;
            let builder = PersonaBuilder::new(config);
            let assessment = builder.assess(&raw);
            print_json(&assessment)
        }
        Commands::Build { file, .. } => {
            let raw = read_raw_persona(&file)?;
            let builder = PersonaBuilder::new(config);
            match builder.build(&raw)? {
                BuildOutcome::Built(report) => print_json(&report),
                BuildOutcome::Rejected(rejection) => {
                    print_json(&rejection)?;
                    std::process::exit(1);
                }
            }
        }
        Commands::TestSuite { file } => {
            let raw = read_raw_persona(&file)?;
            let builder = PersonaBuilder::new(config);
            print_json(&builder.test_suite(&raw))
        }
        Commands::List => {
            let personas = list_personas(&config.output_root())?;
            print_json(&personas)
        }
        Commands::Versions { slug } => {
            let info = persona_versions(&config.output_root(), &slug)?;
            if info.total_versions == 0 {
                return Err(Error::persona_not_found(slug));
            }
            print_json(&info)
        }
        // Handled before config loading
        Commands::Version | Commands::Config { .. } => unreachable!(),
    }
}

/// Handle config subcommands
fn handle_config_command(subcommand: ConfigSubcommand, config_path: Option<&str>) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Init { path, force } => config::init_config(path.as_deref(), force),
        ConfigSubcommand::Show => {
            let config = BuilderConfig::load(config_path)?;
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigSubcommand::Validate => {
            let config = BuilderConfig::load(config_path)?;
            println!(
                "Configuration OK (output root: {})",
                config.output_root().display()
            );
            Ok(())
        }
    }
}

/// Read and parse a raw persona definition from a JSON file
fn read_raw_persona(file: &str) -> Result<RawPersona> {
    let path = Path::new(file);
    let content =
        fs::read_to_string(path).map_err(|e| Error::io_read(path.to_path_buf(), e))?;
    RawPersona::from_json(&content)
}

/// Print a result as pretty JSON on stdout
fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
