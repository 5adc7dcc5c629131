// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Instruction-set core of the Hack assembler.
//!
//! # Components
//!
//! - [`text_utils`] - Line filtering and symbol character classes
//! - [`classify`] - Lexical classification of instruction lines
//! - [`encoding`] - Compute/destination/jump tables and word encoders
//! - [`symbol_table`] - Predefined, label and variable symbols
//! - [`assembler`] - Errors, diagnostics and listing output

pub mod assembler;
pub mod classify;
pub mod encoding;
pub mod symbol_table;
pub mod text_utils;

// Re-exports for convenience
pub use classify::{classify, LineKind};
pub use encoding::{encode_address, encode_compute, encode_immediate, Field, Register};
pub use symbol_table::{SymbolKind, SymbolTable, SymbolTableResult};
