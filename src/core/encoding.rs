// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Encoding tables and word encoders for the Hack instruction set.
//!
//! Address instructions encode as `0` followed by a 15-bit value. Compute
//! instructions encode as `111a cccccc ddd jjj`, where `a` selects the
//! M-register compute table and the remaining fields come from literal
//! table lookups.

use crate::core::assembler::error::{AsmErrorKind, LineError};

/// Largest value an address instruction can load.
pub const ADDRESS_MAX: u32 = 0x7fff;

/// Width of an encoded instruction word in bits.
pub const WORD_BITS: usize = 16;

/// Mnemonic used for an absent destination or jump field.
pub const NULL_MNEMONIC: &str = "null";

/// A mnemonic and its fixed-width bit pattern.
pub struct CodeEntry {
    pub mnemonic: &'static str,
    pub bits: &'static str,
}

/// Register operand selected by the compute expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// Expression uses the A register (a-bit 0).
    A,
    /// Expression uses memory at A (a-bit 1).
    M,
}

impl Register {
    pub fn a_bit(self) -> char {
        match self {
            Register::A => '0',
            Register::M => '1',
        }
    }
}

/// Instruction field whose mnemonic is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Comp(Register),
    Dest,
    Jump,
}

impl Field {
    pub fn table(self) -> &'static [CodeEntry] {
        match self {
            Field::Comp(Register::A) => COMP_A_TABLE,
            Field::Comp(Register::M) => COMP_M_TABLE,
            Field::Dest => DEST_TABLE,
            Field::Jump => JUMP_TABLE,
        }
    }

    pub fn width(self) -> usize {
        match self {
            Field::Comp(_) => 6,
            Field::Dest | Field::Jump => 3,
        }
    }

    fn unknown_message(self) -> &'static str {
        match self {
            Field::Comp(_) => "Unknown compute expression",
            Field::Dest => "Unknown destination",
            Field::Jump => "Unknown jump condition",
        }
    }
}

/// Compute table for expressions that do not reference M.
pub static COMP_A_TABLE: &[CodeEntry] = &[
    CodeEntry { mnemonic: "0", bits: "101010" },
    CodeEntry { mnemonic: "1", bits: "111111" },
    CodeEntry { mnemonic: "-1", bits: "111010" },
    CodeEntry { mnemonic: "D", bits: "001100" },
    CodeEntry { mnemonic: "A", bits: "110000" },
    CodeEntry { mnemonic: "!D", bits: "001101" },
    CodeEntry { mnemonic: "!A", bits: "110001" },
    CodeEntry { mnemonic: "-D", bits: "001111" },
    CodeEntry { mnemonic: "-A", bits: "110011" },
    CodeEntry { mnemonic: "D+1", bits: "011111" },
    CodeEntry { mnemonic: "A+1", bits: "110111" },
    CodeEntry { mnemonic: "D-1", bits: "001110" },
    CodeEntry { mnemonic: "A-1", bits: "110010" },
    CodeEntry { mnemonic: "D+A", bits: "000010" },
    CodeEntry { mnemonic: "D-A", bits: "010011" },
    CodeEntry { mnemonic: "A-D", bits: "000111" },
    CodeEntry { mnemonic: "D&A", bits: "000000" },
    CodeEntry { mnemonic: "D|A", bits: "010101" },
];

/// Compute table for expressions that reference M.
pub static COMP_M_TABLE: &[CodeEntry] = &[
    CodeEntry { mnemonic: "M", bits: "110000" },
    CodeEntry { mnemonic: "!M", bits: "110001" },
    CodeEntry { mnemonic: "-M", bits: "110011" },
    CodeEntry { mnemonic: "M+1", bits: "110111" },
    CodeEntry { mnemonic: "M-1", bits: "110010" },
    CodeEntry { mnemonic: "D+M", bits: "000010" },
    CodeEntry { mnemonic: "D-M", bits: "010011" },
    CodeEntry { mnemonic: "M-D", bits: "000111" },
    CodeEntry { mnemonic: "D&M", bits: "000000" },
    CodeEntry { mnemonic: "D|M", bits: "010101" },
];

pub static DEST_TABLE: &[CodeEntry] = &[
    CodeEntry { mnemonic: "null", bits: "000" },
    CodeEntry { mnemonic: "M", bits: "001" },
    CodeEntry { mnemonic: "D", bits: "010" },
    CodeEntry { mnemonic: "MD", bits: "011" },
    CodeEntry { mnemonic: "A", bits: "100" },
    CodeEntry { mnemonic: "AM", bits: "101" },
    CodeEntry { mnemonic: "AD", bits: "110" },
    CodeEntry { mnemonic: "AMD", bits: "111" },
];

pub static JUMP_TABLE: &[CodeEntry] = &[
    CodeEntry { mnemonic: "null", bits: "000" },
    CodeEntry { mnemonic: "JGT", bits: "001" },
    CodeEntry { mnemonic: "JEQ", bits: "010" },
    CodeEntry { mnemonic: "JGE", bits: "011" },
    CodeEntry { mnemonic: "JLT", bits: "100" },
    CodeEntry { mnemonic: "JNE", bits: "101" },
    CodeEntry { mnemonic: "JLE", bits: "110" },
    CodeEntry { mnemonic: "JMP", bits: "111" },
];

/// Look up the bit pattern for a mnemonic in the given field's table.
pub fn lookup(field: Field, mnemonic: &str) -> Option<&'static str> {
    field
        .table()
        .iter()
        .find(|entry| entry.mnemonic == mnemonic)
        .map(|entry| entry.bits)
}

/// Register selected by a compute expression.
pub fn register_for(comp: &str) -> Register {
    if comp.contains('M') {
        Register::M
    } else {
        Register::A
    }
}

/// Encode an address value as `0` plus 15 bits.
pub fn encode_address(value: u32) -> Result<String, LineError> {
    if value > ADDRESS_MAX {
        return Err(LineError::new(
            AsmErrorKind::Range,
            "Address out of range (0-32767)",
            Some(&value.to_string()),
            1,
        ));
    }
    Ok(format!("0{value:015b}"))
}

/// Encode the decimal digits of an immediate address instruction.
pub fn encode_immediate(digits: &str) -> Result<String, LineError> {
    let value: u32 = digits.parse().map_err(|_| {
        LineError::new(
            AsmErrorKind::Range,
            "Address out of range (0-32767)",
            Some(digits),
            1,
        )
    })?;
    encode_address(value)
}

/// The three fields of a compute instruction with their offsets in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeParts<'a> {
    pub dest: (&'a str, usize),
    pub comp: (&'a str, usize),
    pub jump: (&'a str, usize),
}

/// Longest mnemonic in the jump table.
const JUMP_MNEMONIC_MAX: usize = 3;

fn trim_at(text: &str, base: usize) -> (&str, usize) {
    let lead = text.len() - text.trim_start().len();
    (text.trim(), base + lead)
}

/// The jump mnemonic is at most three non-whitespace characters; anything
/// after it on the line is ignored.
fn jump_at(text: &str, base: usize) -> (&str, usize) {
    let tail = text.trim_start();
    let lead = text.len() - tail.len();
    let end = tail
        .char_indices()
        .take(JUMP_MNEMONIC_MAX)
        .take_while(|(_, c)| !c.is_whitespace())
        .last()
        .map_or(0, |(idx, c)| idx + c.len_utf8());
    (&tail[..end], base + lead)
}

/// Split `[dest=]comp[;jump]` into its fields. Absent fields become `null`.
pub fn split_compute(text: &str) -> Result<ComputeParts<'_>, LineError> {
    let (body, jump) = match text.find(';') {
        Some(semi) => {
            let jump = jump_at(&text[semi + 1..], semi + 1);
            if jump.0.is_empty() {
                return Err(LineError::new(
                    AsmErrorKind::Instruction,
                    "Missing jump condition after ';'",
                    None,
                    semi,
                ));
            }
            (&text[..semi], jump)
        }
        None => (text, (NULL_MNEMONIC, text.len())),
    };

    let (dest, comp) = match body.find('=') {
        Some(eq) => {
            let dest = trim_at(&body[..eq], 0);
            if dest.0.is_empty() {
                return Err(LineError::new(
                    AsmErrorKind::Instruction,
                    "Missing destination before '='",
                    None,
                    eq,
                ));
            }
            (dest, trim_at(&body[eq + 1..], eq + 1))
        }
        None => ((NULL_MNEMONIC, 0), trim_at(body, 0)),
    };

    if comp.0.is_empty() {
        return Err(LineError::new(
            AsmErrorKind::Instruction,
            "Missing compute expression",
            Some(text),
            comp.1,
        ));
    }

    Ok(ComputeParts { dest, comp, jump })
}

fn lookup_field(
    field: Field,
    (mnemonic, offset): (&str, usize),
) -> Result<&'static str, LineError> {
    lookup(field, mnemonic).ok_or_else(|| {
        LineError::new(
            AsmErrorKind::Instruction,
            field.unknown_message(),
            Some(mnemonic),
            offset,
        )
    })
}

/// Encode a compute/jump instruction as `111` + a + comp + dest + jump.
pub fn encode_compute(text: &str) -> Result<String, LineError> {
    let parts = split_compute(text)?;
    let (comp, comp_offset) = parts.comp;
    let register = register_for(comp);
    if register == Register::M && comp.contains('A') {
        return Err(LineError::new(
            AsmErrorKind::Instruction,
            "Compute expression mixes A and M",
            Some(comp),
            comp_offset,
        ));
    }

    let comp_bits = lookup_field(Field::Comp(register), parts.comp)?;
    let dest_bits = lookup_field(Field::Dest, parts.dest)?;
    let jump_bits = lookup_field(Field::Jump, parts.jump)?;

    let mut word = String::with_capacity(WORD_BITS);
    word.push_str("111");
    word.push(register.a_bit());
    word.push_str(comp_bits);
    word.push_str(dest_bits);
    word.push_str(jump_bits);
    debug_assert_eq!(word.len(), WORD_BITS);
    Ok(word)
}
