//! gmlfmt CLI
//!
//! Command-line interface for the gmlfmt GameMaker Language formatter

mod commands;
mod console;
mod output;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use gml_core::{init_tracing, init_tracing_with_default};

use crate::console::Console;

#[derive(Parser)]
#[command(name = "gmlfmt")]
#[command(about = "gmlfmt: an opinionated formatter for GameMaker Language")]
#[command(version = gml_core::VERSION)]
#[command(
    long_about = "gmlfmt rewrites GameMaker Language (GML) sources into one canonical layout.\n\
\n\
Examples:\n  \
gmlfmt fmt scripts/player.gml      # Print the formatted file\n  \
gmlfmt fmt --write .               # Format every .gml file in place\n  \
gmlfmt fmt --check --diff objects  # Show what would change\n  \
gmlfmt config init                 # Write a default .gmlfmtrc.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (.gmlfmtrc.json/.gmlfmtrc.toml/gmlfmt.yaml)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Format GML files
    #[command(alias = "format")]
    Fmt {
        /// Files or directories to format
        #[arg(help = "Files or directories to process (default: current directory)")]
        paths: Vec<PathBuf>,

        /// Write formatted output back to the files
        #[arg(short, long, help = "Write formatted files in place")]
        write: bool,

        /// Exit with status 1 if any file would change
        #[arg(long, help = "Check formatting without writing", conflicts_with = "write")]
        check: bool,

        /// Show a diff of the changes
        #[arg(long, help = "Print a diff for files that would change")]
        diff: bool,

        /// Override the maximum line width
        #[arg(long, help = "Maximum line width (default: 80)")]
        line_width: Option<usize>,

        /// Override the indent width
        #[arg(long, help = "Spaces per indentation level (default: 2)")]
        indent_size: Option<usize>,

        /// Indent with tabs
        #[arg(long, help = "Indent with tabs instead of spaces")]
        use_tabs: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the JSON Schema of the configuration file
    Schema,

    /// Write a default .gmlfmtrc.json
    Init {
        /// Directory to create the file in
        #[arg(help = "Target directory (default: current directory)")]
        dir: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long, help = "Overwrite an existing configuration file")]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity; RUST_LOG still wins when set
    match cli.verbose {
        0 => init_tracing_with_default("gml=warn"),
        1 => init_tracing(),
        2 => init_tracing_with_default("gml=debug"),
        _ => init_tracing_with_default("gml=trace"),
    }

    let console = if cli.no_color {
        Console::no_colors()
    } else {
        Console::new()
    };

    let status = match cli.command {
        Commands::Fmt {
            paths,
            write,
            check,
            diff,
            line_width,
            indent_size,
            use_tabs,
        } => commands::format_command(
            commands::FormatArgs {
                paths,
                write,
                check,
                diff,
                line_width,
                indent_size,
                use_tabs,
                config_path: cli.config,
            },
            &console,
        )?,
        Commands::Config { action } => match action {
            ConfigAction::Schema => commands::config_schema_command()?,
            ConfigAction::Init { dir, force } => commands::config_init_command(dir, force)?,
        },
    };

    if status != commands::ExitStatus::Success {
        process::exit(status.code());
    }
    Ok(())
}
