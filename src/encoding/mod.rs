// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Plan generation and execution.
//!
//! This module turns data model graphs into cached plans and runs them:
//! - [`encode`] - Encode plans, the literal-write optimizer and [`JsonEncoder`]
//! - [`decode`] - Decode plans, materializers and [`JsonDecoder`]
//! - [`guard`] - Runtime type tests selecting union branches
//! - [`cache`] - On-disk plan cache

pub mod cache;
pub mod decode;
pub mod encode;
pub mod guard;

pub use cache::{PlanCache, PlanKind, CACHE_NAMESPACE};
pub use decode::{
    DecodePlan, DecodePlanBuilder, EagerMaterializer, JsonDecoder, LazyMaterializer, Provider,
};
pub use encode::{optimize, EncodeOp, EncodePlan, EncodePlanBuilder, Encoded, JsonEncoder};
pub use guard::Guard;
