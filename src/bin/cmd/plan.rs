// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Plan command - generate and inspect cached plans.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::common::{output_json_or, parse_type_arg, CodecArgs, Result};
use jsoncodec::encoding::PlanKind;
use jsoncodec::{JsonDecoder, JsonEncoder, Mode, PlanCache};

/// Generate the plan for a type, or show the cached one.
#[derive(Args, Clone, Debug)]
pub struct PlanCmd {
    #[command(flatten)]
    codec: CodecArgs,

    /// Type signature, e.g. "list<Dummy|null>"
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    ty: String,

    /// Build the decode plan instead of the encode plan
    #[arg(long)]
    decode: bool,

    /// I/O mode: string, stream or resource
    #[arg(short, long, default_value = "string")]
    mode: Mode,

    /// Print the plan itself
    #[arg(long)]
    show: bool,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,
}

#[derive(Serialize)]
struct PlanSummary {
    kind: &'static str,
    signature: String,
    mode: Mode,
    path: PathBuf,
    size: usize,
}

impl PlanCmd {
    pub fn run(self) -> Result<()> {
        let ty = parse_type_arg(&self.ty)?;
        let classes = self.codec.classes()?;
        let config = self.codec.config()?;
        let cache_dir = self.codec.cache_dir();
        let cache = PlanCache::new(&cache_dir);

        let (kind, size, plan) = if self.decode {
            let decoder = JsonDecoder::create(classes, &cache_dir)?.with_config(config);
            let plan = decoder.plan(&ty, self.mode)?;
            (
                PlanKind::Decoder,
                plan.providers.len(),
                serde_json::to_string_pretty(plan.as_ref())?,
            )
        } else {
            let encoder = JsonEncoder::create(classes, &cache_dir)?.with_config(config);
            let plan = encoder.plan(&ty, self.mode)?;
            (
                PlanKind::Encoder,
                plan.op_count(),
                serde_json::to_string_pretty(plan.as_ref())?,
            )
        };

        if self.show {
            println!("{plan}");
            return Ok(());
        }

        let signature = ty.to_string();
        let summary = PlanSummary {
            kind: kind.as_str(),
            path: cache.path(kind, &signature, self.mode),
            signature,
            mode: self.mode,
            size,
        };
        output_json_or(self.json, &summary, || {
            let unit = if self.decode { "providers" } else { "ops" };
            println!("{} plan for {} ({})", summary.kind, summary.signature, summary.mode.as_str());
            println!("  path: {}", summary.path.display());
            println!("  {unit}: {}", summary.size);
            Ok(())
        })
    }
}
