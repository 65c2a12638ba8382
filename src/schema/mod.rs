// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Type descriptors and class declarations.
//!
//! - [`descriptor`] - Algebraic type descriptors and their canonical form
//! - [`parser`] - Pest grammar for canonical type signatures
//! - [`class`] - Class/enum declarations and their registry

pub mod class;
pub mod descriptor;
pub mod parser;

pub use class::{ClassDefinition, ClassRegistry, EnumDefinition, MaxDepth, PropertyDefinition};
pub use descriptor::{ScalarKind, TypeDescriptor, DATE_TIME_CLASS};
pub use parser::parse_type;
