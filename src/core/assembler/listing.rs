// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Listing file generation.

use std::io::Write;

use crate::core::symbol_table::SymbolTable;

use super::error::{build_context_lines, PassCounts};

/// Data for a single listing line.
pub struct ListingLine<'a> {
    pub addr: u32,
    pub word: &'a str,
    pub line_num: u32,
    pub source: &'a str,
}

/// Writer for listing file output.
pub struct ListingWriter<W: Write> {
    out: W,
}

impl<W: Write> ListingWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn header(&mut self, title: &str) -> std::io::Result<()> {
        writeln!(self.out, "{title}")?;
        writeln!(self.out, "ADDR    WORD              LINE  SOURCE")?;
        writeln!(self.out, "------  ----------------  ----  ------")?;
        Ok(())
    }

    pub fn write_line(&mut self, line: ListingLine<'_>) -> std::io::Result<()> {
        writeln!(
            self.out,
            "{:04X}    {:<16}  {:>4}  {}",
            line.addr, line.word, line.line_num, line.source
        )
    }

    pub fn write_diagnostic(
        &mut self,
        kind: &str,
        msg: &str,
        line_num: u32,
        column: Option<usize>,
        source_lines: &[String],
    ) -> std::io::Result<()> {
        let context = build_context_lines(line_num, column, Some(source_lines), false);
        for line in context {
            writeln!(self.out, "{line}")?;
        }
        writeln!(self.out, "{kind}: {msg}")
    }

    pub fn footer(&mut self, counts: &PassCounts, symbols: &SymbolTable) -> std::io::Result<()> {
        writeln!(
            self.out,
            "\nLines: {}  Instructions: {}  Errors: {}  Warnings: {}",
            counts.lines, counts.instructions, counts.errors, counts.warnings
        )?;
        writeln!(self.out, "\nSYMBOL TABLE\n")?;
        symbols.dump(&mut self.out)?;
        Ok(())
    }
}
