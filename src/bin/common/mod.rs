// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Args;
use serde::Serialize;

use jsoncodec::{parse_type, ClassRegistry, CodecConfig, TypeDescriptor};

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Options shared by every command that builds plans.
#[derive(Args, Clone, Debug)]
pub struct CodecArgs {
    /// TOML file declaring classes and enums
    #[arg(short, long, value_name = "FILE")]
    pub schema: PathBuf,

    /// Plan cache directory (default: <tmp>/jsoncodec)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// TOML codec configuration
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Regenerate plans even when cached
    #[arg(long)]
    pub force: bool,
}

impl CodecArgs {
    pub fn classes(&self) -> Result<Arc<ClassRegistry>> {
        let classes = ClassRegistry::from_file(&self.schema)
            .with_context(|| format!("loading schema {}", self.schema.display()))?;
        Ok(Arc::new(classes))
    }

    pub fn config(&self) -> Result<CodecConfig> {
        let config = match &self.config {
            Some(path) => CodecConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => CodecConfig::default(),
        };
        Ok(if self.force {
            config.with_force_generation(true)
        } else {
            config
        })
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("jsoncodec"))
    }
}

/// Parse a type signature argument.
pub fn parse_type_arg(signature: &str) -> Result<TypeDescriptor> {
    parse_type(signature).with_context(|| format!("invalid type \"{signature}\""))
}

/// Print `value` as JSON, or run the human-readable printer.
pub fn output_json_or<T>(
    json: bool,
    value: &T,
    human_fn: impl FnOnce() -> std::io::Result<()>,
) -> Result<()>
where
    T: Serialize,
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human_fn()?;
    }
    Ok(())
}
