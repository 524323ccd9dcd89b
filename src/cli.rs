//! Command-line interface definition (clap derive).

use clap::{Parser, Subcommand};

/// Persona Builder - Deterministic persona build pipeline
///
/// Turns loosely-structured persona definitions into validated, versioned
/// specifications plus derived artifacts (system prompt, platform configs,
/// test scenarios).
#[derive(Parser, Debug)]
#[command(name = "persona-builder")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, env = "PERSONA_CONFIG", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the builder
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assess a persona definition (validate + score, writes nothing)
    Assess {
        /// Path to a persona definition JSON file
        file: String,
    },

    /// Run the full build pipeline and package a new version
    Build {
        /// Path to a persona definition JSON file
        file: String,

        /// Override the output root for this build
        #[arg(long, env = "PERSONA_OUTPUT_ROOT")]
        output_root: Option<String>,
    },

    /// Generate the test scenario suite for a persona (writes nothing)
    TestSuite {
        /// Path to a persona definition JSON file
        file: String,
    },

    /// List all personas that have versions on disk
    List,

    /// List all stored versions of one persona
    Versions {
        /// Persona slug (kebab-case)
        slug: String,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Show version and build metadata
    Version,
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Create a default configuration file
    Init {
        /// Destination path (default: ~/.persona-builder/config.toml)
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Check the configuration file for errors
    Validate,
}
