// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # jsoncodec CLI
//!
//! Command-line access to plan generation and type-directed JSON rewriting.
//!
//! ## Usage
//!
//! ```sh
//! # Generate the encode plan for a type and show where it is cached
//! jsoncodec plan --schema schema.toml --type "list<Dummy>"
//!
//! # Print the stream-mode decode plan
//! jsoncodec plan --schema schema.toml --type Dummy --decode --mode stream --show
//!
//! # Decode a file through a type and re-encode it
//! jsoncodec normalize --schema schema.toml --type "list<Dummy>" input.json -o output.json
//! ```

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{NormalizeCmd, PlanCmd};
use common::Result;

/// jsoncodec - type-directed JSON codec generator
///
/// Class declarations are read from a TOML schema file.
#[derive(Parser, Clone)]
#[command(name = "jsoncodec")]
#[command(about = "Type-directed JSON codec generator with cached plans", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Generate or show the plan for a type
    Plan(PlanCmd),

    /// Decode a JSON file through a type and re-encode it
    Normalize(NormalizeCmd),
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Plan(cmd) => cmd.run(),
        Commands::Normalize(cmd) => cmd.run(),
    }
}

fn main() {
    let result = run();

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
