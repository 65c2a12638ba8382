// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Normalize command - decode a JSON file through a type and re-encode it.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;

use crate::common::{parse_type_arg, CodecArgs, Result};
use jsoncodec::{JsonDecoder, JsonEncoder};

/// Stream-decode a JSON file and write it back in canonical form.
///
/// Unknown keys are dropped and every value goes through the type's
/// formatters, so the output is what the encoder produces for the type.
#[derive(Args, Clone, Debug)]
pub struct NormalizeCmd {
    #[command(flatten)]
    codec: CodecArgs,

    /// Type signature of the document
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    ty: String,

    /// Input JSON file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl NormalizeCmd {
    pub fn run(self) -> Result<()> {
        let ty = parse_type_arg(&self.ty)?;
        let classes = self.codec.classes()?;
        let config = self.codec.config()?;
        let cache_dir = self.codec.cache_dir();

        let decoder = JsonDecoder::create(classes.clone(), &cache_dir)?.with_config(config.clone());
        let encoder = JsonEncoder::create(classes, &cache_dir)?.with_config(config);

        let value = decoder
            .decode_file(&self.input, &ty)
            .with_context(|| format!("decoding {}", self.input.display()))?;

        let mut handle: Box<dyn Write> = match &self.output {
            Some(path) => Box::new(BufWriter::new(
                File::create(path).with_context(|| format!("creating {}", path.display()))?,
            )),
            None => Box::new(io::stdout().lock()),
        };
        encoder.encode_to_writer(&value, &ty, handle.as_mut())?;
        if self.output.is_none() {
            writeln!(handle)?;
        }
        handle.flush()?;
        Ok(())
    }
}
