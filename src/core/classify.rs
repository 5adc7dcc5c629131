// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Lexical classification of a single instruction line.
//!
//! The classifier only looks at the shape of the line. Resolving symbols and
//! encoding bits happen in later passes.

use crate::core::assembler::error::{AsmErrorKind, LineError};
use crate::core::text_utils::{is_symbol, is_symbol_char};

/// Category of a trimmed, non-empty instruction line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `@` followed by decimal digits. The digits are kept as text; range
    /// checking is the encoder's job.
    AddressImmediate(&'a str),
    /// `@` followed by a symbol name.
    AddressSymbolic(&'a str),
    /// `(NAME)` label declaration.
    Label(&'a str),
    /// `[dest=]comp[;jump]`.
    Compute(&'a str),
}

/// Classify a trimmed instruction line.
pub fn classify(line: &str) -> Result<LineKind<'_>, LineError> {
    match line.as_bytes().first() {
        Some(b'@') => classify_address(&line[1..]),
        Some(b'(') => classify_label(line),
        Some(_) => Ok(LineKind::Compute(line)),
        None => Err(LineError::new(
            AsmErrorKind::Instruction,
            "Empty instruction",
            None,
            0,
        )),
    }
}

fn classify_address(operand: &str) -> Result<LineKind<'_>, LineError> {
    let Some(first) = operand.bytes().next() else {
        return Err(LineError::new(
            AsmErrorKind::Instruction,
            "Missing address operand after '@'",
            None,
            1,
        ));
    };
    if first.is_ascii_digit() {
        if let Some(bad) = operand.bytes().position(|c| !c.is_ascii_digit()) {
            return Err(LineError::new(
                AsmErrorKind::Instruction,
                "Invalid decimal address",
                Some(operand),
                1 + bad,
            ));
        }
        return Ok(LineKind::AddressImmediate(operand));
    }
    if !is_symbol(operand) {
        let bad = operand
            .bytes()
            .position(|c| !is_symbol_char(c))
            .unwrap_or(0);
        return Err(LineError::new(
            AsmErrorKind::Instruction,
            "Invalid symbol name",
            Some(operand),
            1 + bad,
        ));
    }
    Ok(LineKind::AddressSymbolic(operand))
}

fn classify_label(line: &str) -> Result<LineKind<'_>, LineError> {
    let Some(close) = line.find(')') else {
        return Err(LineError::new(
            AsmErrorKind::Instruction,
            "Missing ')' in label declaration",
            Some(line),
            line.len(),
        ));
    };
    let name = &line[1..close];
    if name.is_empty() {
        return Err(LineError::new(
            AsmErrorKind::Instruction,
            "Empty label name",
            None,
            1,
        ));
    }
    if !is_symbol(name) {
        return Err(LineError::new(
            AsmErrorKind::Instruction,
            "Invalid label name",
            Some(name),
            1,
        ));
    }
    let trailing = &line[close + 1..];
    if !trailing.trim().is_empty() {
        return Err(LineError::new(
            AsmErrorKind::Instruction,
            "Unexpected text after label declaration",
            Some(trailing.trim()),
            close + 1,
        ));
    }
    Ok(LineKind::Label(name))
}
