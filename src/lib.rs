// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Library entry exposing the Hack assembler.
pub mod assembler;
pub mod core;

pub use assembler::{assemble_file, assemble_lines, assemble_source, Assembler, Assembly};
