// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI subcommands.

mod normalize;
mod plan;

pub use normalize::NormalizeCmd;
pub use plan::PlanCmd;
