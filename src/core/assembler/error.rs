// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Error types, diagnostics, and reporting for the assembler.

use std::fmt;

/// Categories of assembler errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsmErrorKind {
    /// Pass-level failure summary.
    Assembler,
    Cli,
    /// Malformed instruction or unknown mnemonic.
    Instruction,
    Io,
    /// Address or literal outside the 15-bit range.
    Range,
    /// Duplicate binding of a symbol.
    Symbol,
}

/// An assembler error with a kind and message.
#[derive(Debug, Clone)]
pub struct AsmError {
    kind: AsmErrorKind,
    message: String,
}

impl AsmError {
    pub fn new(kind: AsmErrorKind, msg: &str, param: Option<&str>) -> Self {
        Self {
            kind,
            message: format_error(msg, param),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> AsmErrorKind {
        self.kind
    }
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AsmError {}

/// An error found while scanning a single instruction.
///
/// `offset` is the byte offset of the offending text within the trimmed
/// instruction, so the caller can turn it into a source column.
#[derive(Debug, Clone)]
pub struct LineError {
    pub error: AsmError,
    pub offset: usize,
}

impl LineError {
    pub fn new(kind: AsmErrorKind, msg: &str, param: Option<&str>, offset: usize) -> Self {
        Self {
            error: AsmError::new(kind, msg, param),
            offset,
        }
    }

    pub fn kind(&self) -> AsmErrorKind {
        self.error.kind()
    }
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for LineError {}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A diagnostic message with location and context.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub(crate) line: u32,
    pub(crate) column: Option<usize>,
    pub(crate) severity: Severity,
    pub(crate) error: AsmError,
    pub(crate) file: Option<String>,
}

impl Diagnostic {
    pub fn new(line: u32, severity: Severity, error: AsmError) -> Self {
        Self {
            line,
            column: None,
            severity,
            error,
            file: None,
        }
    }

    pub fn with_column(mut self, column: Option<usize>) -> Self {
        self.column = column;
        self
    }

    pub fn with_file(mut self, file: Option<String>) -> Self {
        self.file = file;
        self
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> Option<usize> {
        self.column
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn error(&self) -> &AsmError {
        &self.error
    }

    pub fn format(&self) -> String {
        format!(
            "{}: {} - {}",
            self.line,
            severity_label(self.severity),
            self.error.message()
        )
    }

    pub fn format_with_context(&self, lines: Option<&[String]>, use_color: bool) -> String {
        let sev = severity_label(self.severity);
        let header = match &self.file {
            Some(file) => format!("{file}:{}: {sev}", self.line),
            None => format!("{}: {sev}", self.line),
        };

        let mut out = String::new();
        out.push_str(&header);
        out.push('\n');

        for line in build_context_lines(self.line, self.column, lines, use_color) {
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str(&format!("{sev}: {}", self.error.message()));
        out
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Warning => "WARNING",
        Severity::Error => "ERROR",
    }
}

/// Report from a successful assembly run.
#[derive(Debug)]
pub struct AsmRunReport {
    diagnostics: Vec<Diagnostic>,
    source_lines: Vec<String>,
}

impl AsmRunReport {
    pub fn new(diagnostics: Vec<Diagnostic>, source_lines: Vec<String>) -> Self {
        Self {
            diagnostics,
            source_lines,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn source_lines(&self) -> &[String] {
        &self.source_lines
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

/// Error from a failed assembly run.
#[derive(Debug)]
pub struct AsmRunError {
    error: AsmError,
    diagnostics: Vec<Diagnostic>,
    source_lines: Vec<String>,
}

impl AsmRunError {
    pub fn new(error: AsmError, diagnostics: Vec<Diagnostic>, source_lines: Vec<String>) -> Self {
        Self {
            error,
            diagnostics,
            source_lines,
        }
    }

    /// Shorthand for errors that have no source location.
    pub fn bare(kind: AsmErrorKind, msg: &str, param: Option<&str>) -> Self {
        Self::new(AsmError::new(kind, msg, param), Vec::new(), Vec::new())
    }

    pub fn error(&self) -> &AsmError {
        &self.error
    }

    pub fn kind(&self) -> AsmErrorKind {
        self.error.kind()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn source_lines(&self) -> &[String] {
        &self.source_lines
    }

    /// Kind of the first located diagnostic, falling back to the summary kind.
    pub fn first_kind(&self) -> AsmErrorKind {
        self.diagnostics
            .iter()
            .find(|d| d.severity == Severity::Error)
            .map(|d| d.error.kind())
            .unwrap_or(self.error.kind())
    }
}

impl fmt::Display for AsmRunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for AsmRunError {}

/// Pass statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassCounts {
    pub lines: u32,
    pub instructions: u32,
    pub errors: u32,
    pub warnings: u32,
}

impl PassCounts {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Build context lines for error display.
pub fn build_context_lines(
    line_num: u32,
    column: Option<usize>,
    lines: Option<&[String]>,
    use_color: bool,
) -> Vec<String> {
    let mut out = Vec::new();
    let line_idx = line_num.saturating_sub(1) as usize;

    let line = match lines.and_then(|lines| lines.get(line_idx)) {
        Some(line) => line,
        None => {
            out.push(format!("{:>5} | <source unavailable>", line_num));
            return out;
        }
    };

    let display = highlight_line(line, column, use_color);
    out.push(format!("{:>5} | {}", line_num, display));

    out
}

/// Mark the character at a 1-based column, in red when color is enabled.
pub fn highlight_line(line: &str, column: Option<usize>, use_color: bool) -> String {
    let Some(column) = column.filter(|&c| c > 0) else {
        return line.to_string();
    };
    let idx = column - 1;
    if idx >= line.len() || !line.is_char_boundary(idx) {
        if use_color {
            return format!("{line}\x1b[31m^\x1b[0m");
        }
        return format!("{line}^");
    }
    if !use_color {
        return line.to_string();
    }
    let (head, tail) = line.split_at(idx);
    let ch = tail.chars().next().unwrap_or(' ');
    let rest = &tail[ch.len_utf8()..];
    format!("{head}\x1b[31m{ch}\x1b[0m{rest}")
}

/// Format an error message with an optional parameter.
pub fn format_error(msg: &str, param: Option<&str>) -> String {
    match param {
        Some(p) => format!("{msg}: {p}"),
        None => msg.to_string(),
    }
}
