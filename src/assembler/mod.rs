// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Hack assembler - pass pipeline and entry point.
//!
//! Source lines flow through four in-memory passes:
//!
//! 1. filter: drop blank lines and comments, trim indentation
//! 2. labels: bind `(NAME)` declarations to ROM addresses
//! 3. variables: bind unknown `@name` references to RAM from address 16
//! 4. encode: turn every remaining instruction into a 16-bit word
//!
//! Each pass collects every diagnostic it finds. The run stops after the
//! first pass that reported an error, so no output is produced for a broken
//! program.

pub mod cli;

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use log::{debug, info, trace};

use crate::core::assembler::error::{
    AsmError, AsmErrorKind, AsmRunError, AsmRunReport, Diagnostic, LineError, PassCounts, Severity,
};
use crate::core::assembler::listing::{ListingLine, ListingWriter};
use crate::core::classify::{classify, LineKind};
use crate::core::encoding::{encode_compute, encode_immediate, ADDRESS_MAX};
use crate::core::symbol_table::{
    SymbolKind, SymbolTable, SymbolTableResult, SCREEN_BASE, VARIABLE_BASE,
};
use crate::core::text_utils::clean_line;

use cli::{init_logging, validate_cli, Cli, CliConfig};

// Re-export public types
pub use crate::core::assembler::error::{AsmRunError as RunError, AsmRunReport as RunReport};
pub use cli::VERSION;

/// Run the assembler with command-line arguments.
pub fn run() -> Result<AsmRunReport, AsmRunError> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = validate_cli(&cli)?;
    run_one(&config)
}

/// Assemble one input file and write the requested outputs.
pub fn run_one(config: &CliConfig) -> Result<AsmRunReport, AsmRunError> {
    info!(
        "assembling {} into {}",
        config.input.display(),
        config.output.display()
    );
    let assembly = assemble_file(&config.input)?;

    let text = assembly.to_text();
    write_atomic(&config.output, text.as_bytes()).map_err(|err| {
        output_error(&config.output, err, &assembly)
    })?;

    if let Some(list_path) = &config.list {
        let mut listing = Vec::new();
        assembly
            .write_listing(&mut listing, &format!("hackforge Hack Assembler v{VERSION}"))
            .and_then(|_| write_atomic(list_path, &listing))
            .map_err(|err| output_error(list_path, err, &assembly))?;
    }

    let counts = assembly.counts();
    info!(
        "wrote {} instructions to {} ({} warnings)",
        counts.instructions,
        config.output.display(),
        counts.warnings
    );
    Ok(AsmRunReport::new(
        assembly.diagnostics().to_vec(),
        assembly.source_lines().to_vec(),
    ))
}

fn output_error(path: &Path, err: io::Error, assembly: &Assembly) -> AsmRunError {
    AsmRunError::new(
        AsmError::new(
            AsmErrorKind::Io,
            &format!("Error writing {}", path.display()),
            Some(&err.to_string()),
        ),
        assembly.diagnostics().to_vec(),
        assembly.source_lines().to_vec(),
    )
}

/// Write a file through a temporary sibling so the target is never left
/// half-written.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Read and assemble a source file.
pub fn assemble_file(path: &Path) -> Result<Assembly, AsmRunError> {
    let contents = fs::read_to_string(path).map_err(|err| {
        AsmRunError::bare(
            AsmErrorKind::Io,
            &format!("Error reading {}", path.display()),
            Some(&err.to_string()),
        )
    })?;
    let lines: Vec<String> = contents.lines().map(|s| s.to_string()).collect();
    Assembler::new()
        .with_file(Some(path.to_string_lossy().to_string()))
        .assemble(lines)
}

/// Assemble source text held in memory.
pub fn assemble_source(source: &str) -> Result<Assembly, AsmRunError> {
    assemble_lines(source.lines().map(|s| s.to_string()).collect())
}

/// Assemble a sequence of raw source lines.
pub fn assemble_lines(lines: Vec<String>) -> Result<Assembly, AsmRunError> {
    Assembler::new().assemble(lines)
}

/// A source line that carries an instruction, with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number in the original source.
    pub line_num: u32,
    /// Bytes of indentation removed from the original line.
    pub indent: usize,
    pub text: String,
}

/// One encoded instruction word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedLine {
    pub line_num: u32,
    pub word: String,
}

/// Drop blank lines, whitespace-only lines and comments; trim the rest.
///
/// Order is preserved and every kept line remembers where it came from.
pub fn filter_lines<S: AsRef<str>>(lines: &[S]) -> Vec<SourceLine> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let raw = raw.as_ref();
            clean_line(raw).map(|text| SourceLine {
                line_num: idx as u32 + 1,
                indent: raw.len() - raw.trim_start().len(),
                text: text.to_string(),
            })
        })
        .collect()
}

/// Result of a successful assembly run.
#[derive(Debug)]
pub struct Assembly {
    words: Vec<EncodedLine>,
    symbols: SymbolTable,
    diagnostics: Vec<Diagnostic>,
    source_lines: Vec<String>,
    counts: PassCounts,
}

impl Assembly {
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(|line| line.word.as_str())
    }

    pub fn encoded(&self) -> &[EncodedLine] {
        &self.words
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Warnings raised while assembling.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn source_lines(&self) -> &[String] {
        &self.source_lines
    }

    pub fn counts(&self) -> PassCounts {
        self.counts
    }

    /// The program as `.hack` text: one newline-terminated word per line.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.words.len() * 17);
        for line in &self.words {
            out.push_str(&line.word);
            out.push('\n');
        }
        out
    }

    pub fn write_listing<W: Write>(&self, out: W, title: &str) -> io::Result<()> {
        let mut listing = ListingWriter::new(out);
        listing.header(title)?;
        for (addr, line) in self.words.iter().enumerate() {
            let source = self
                .source_lines
                .get(line.line_num.saturating_sub(1) as usize)
                .map(|s| s.as_str())
                .unwrap_or("");
            listing.write_line(ListingLine {
                addr: addr as u32,
                word: &line.word,
                line_num: line.line_num,
                source,
            })?;
        }
        for diag in &self.diagnostics {
            let kind = match diag.severity() {
                Severity::Warning => "WARNING",
                Severity::Error => "ERROR",
            };
            listing.write_diagnostic(
                kind,
                diag.error().message(),
                diag.line(),
                diag.column(),
                &self.source_lines,
            )?;
        }
        listing.footer(&self.counts, &self.symbols)
    }
}

/// Core assembler state for one run.
///
/// The symbol table is written by the label and variable passes and only
/// read by the encoding pass.
pub struct Assembler {
    symbols: SymbolTable,
    diagnostics: Vec<Diagnostic>,
    file: Option<String>,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::with_predefined(),
            diagnostics: Vec::new(),
            file: None,
        }
    }

    /// Name the source file in diagnostics.
    pub fn with_file(mut self, file: Option<String>) -> Self {
        self.file = file;
        self
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Run all passes over the raw source lines.
    pub fn assemble(mut self, source_lines: Vec<String>) -> Result<Assembly, AsmRunError> {
        let clean = filter_lines(&source_lines);
        debug!(
            "filter: kept {} of {} lines",
            clean.len(),
            source_lines.len()
        );

        let (label_free, pass1) = self.resolve_labels(clean);
        self.check_pass("labels", &pass1, &source_lines)?;

        let (resolved, pass2) = self.resolve_variables(label_free);
        self.check_pass("variables", &pass2, &source_lines)?;

        let (words, pass3) = self.encode(&resolved);
        self.check_pass("encode", &pass3, &source_lines)?;

        let counts = PassCounts {
            lines: source_lines.len() as u32,
            instructions: words.len() as u32,
            errors: 0,
            warnings: pass1.warnings + pass2.warnings + pass3.warnings,
        };
        debug!(
            "assembled {} instructions, {} symbols",
            counts.instructions,
            self.symbols.len()
        );

        Ok(Assembly {
            words,
            diagnostics: self.take_diagnostics(),
            symbols: self.symbols,
            source_lines,
            counts,
        })
    }

    fn check_pass(
        &mut self,
        name: &str,
        counts: &PassCounts,
        source_lines: &[String],
    ) -> Result<(), AsmRunError> {
        debug!(
            "{name}: {} lines, {} errors, {} warnings",
            counts.lines, counts.errors, counts.warnings
        );
        if counts.errors == 0 {
            return Ok(());
        }
        Err(AsmRunError::new(
            AsmError::new(
                AsmErrorKind::Assembler,
                "Errors detected in source. No output file created.",
                None,
            ),
            self.take_diagnostics(),
            source_lines.to_vec(),
        ))
    }

    fn report(
        &mut self,
        line: &SourceLine,
        severity: Severity,
        err: LineError,
        counts: &mut PassCounts,
    ) {
        let column = line.indent + err.offset + 1;
        self.diagnostics.push(
            Diagnostic::new(line.line_num, severity, err.error)
                .with_column(Some(column))
                .with_file(self.file.clone()),
        );
        match severity {
            Severity::Error => counts.errors += 1,
            Severity::Warning => counts.warnings += 1,
        }
    }

    /// Bind labels to the index of the next instruction and drop them.
    pub fn resolve_labels(&mut self, lines: Vec<SourceLine>) -> (Vec<SourceLine>, PassCounts) {
        let mut counts = PassCounts::new();
        let mut out = Vec::with_capacity(lines.len());
        let mut rom_addr: u32 = 0;

        for line in lines {
            counts.lines += 1;
            let label = classify(&line.text).map(|kind| match kind {
                LineKind::Label(name) => Some(name.to_string()),
                _ => None,
            });
            let name = match label {
                Ok(Some(name)) => name,
                Ok(None) => {
                    out.push(line);
                    rom_addr += 1;
                    continue;
                }
                Err(err) => {
                    self.report(&line, Severity::Error, err, &mut counts);
                    rom_addr += 1;
                    continue;
                }
            };

            if rom_addr > ADDRESS_MAX {
                let err = LineError::new(
                    AsmErrorKind::Range,
                    "Label address out of range (0-32767)",
                    Some(&name),
                    1,
                );
                self.report(&line, Severity::Error, err, &mut counts);
                continue;
            }
            match self.symbols.bind(&name, rom_addr, SymbolKind::Label) {
                SymbolTableResult::Ok => trace!("label {name} = {rom_addr}"),
                SymbolTableResult::Duplicate => {
                    let msg = match self.symbols.entry(&name).map(|e| e.kind) {
                        Some(SymbolKind::Predefined) => "Label redefines predefined symbol",
                        _ => "Duplicate label",
                    };
                    let err = LineError::new(AsmErrorKind::Symbol, msg, Some(&name), 1);
                    self.report(&line, Severity::Error, err, &mut counts);
                }
            }
        }

        (out, counts)
    }

    /// Allocate RAM for unknown symbols and rewrite symbolic addresses as
    /// immediates.
    pub fn resolve_variables(&mut self, lines: Vec<SourceLine>) -> (Vec<SourceLine>, PassCounts) {
        let mut counts = PassCounts::new();
        let mut out = Vec::with_capacity(lines.len());
        let mut next_var = VARIABLE_BASE;

        for mut line in lines {
            counts.lines += 1;
            let symbol = match classify(&line.text) {
                Ok(LineKind::AddressSymbolic(name)) => Some(name.to_string()),
                _ => None,
            };
            let Some(name) = symbol else {
                out.push(line);
                continue;
            };

            let addr = match self.symbols.lookup(&name) {
                Some(addr) => addr,
                None => {
                    if next_var > ADDRESS_MAX {
                        let err = LineError::new(
                            AsmErrorKind::Range,
                            "Out of variable memory",
                            Some(&name),
                            1,
                        );
                        self.report(&line, Severity::Error, err, &mut counts);
                        continue;
                    }
                    if next_var == SCREEN_BASE {
                        let err = LineError::new(
                            AsmErrorKind::Range,
                            "Variable allocated in screen memory",
                            Some(&name),
                            1,
                        );
                        self.report(&line, Severity::Warning, err, &mut counts);
                    }
                    let addr = next_var;
                    let bound = self.symbols.bind(&name, addr, SymbolKind::Variable);
                    debug_assert_eq!(bound, SymbolTableResult::Ok);
                    trace!("variable {name} = {addr}");
                    next_var += 1;
                    addr
                }
            };
            line.text = format!("@{addr}");
            out.push(line);
        }

        (out, counts)
    }

    /// Encode every instruction into a 16-bit word.
    ///
    /// The program must fit the 32768-word ROM; the first instruction past
    /// the end is reported once.
    pub fn encode(&mut self, lines: &[SourceLine]) -> (Vec<EncodedLine>, PassCounts) {
        let mut counts = PassCounts::new();
        let mut words = Vec::with_capacity(lines.len());

        for (rom_addr, line) in lines.iter().enumerate() {
            counts.lines += 1;
            if rom_addr == ADDRESS_MAX as usize + 1 {
                let err = LineError::new(
                    AsmErrorKind::Range,
                    "Program exceeds ROM size (32768 words)",
                    None,
                    0,
                );
                self.report(line, Severity::Error, err, &mut counts);
            }
            let encoded = classify(&line.text).and_then(|kind| match kind {
                LineKind::AddressImmediate(digits) => encode_immediate(digits),
                LineKind::Compute(text) => encode_compute(text),
                LineKind::AddressSymbolic(name) | LineKind::Label(name) => Err(LineError::new(
                    AsmErrorKind::Instruction,
                    "Unresolved symbol",
                    Some(name),
                    0,
                )),
            });
            match encoded {
                Ok(word) => {
                    counts.instructions += 1;
                    words.push(EncodedLine {
                        line_num: line.line_num,
                        word,
                    });
                }
                Err(err) => self.report(line, Severity::Error, err, &mut counts),
            }
        }

        (words, counts)
    }
}

#[cfg(test)]
mod tests;
