// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Symbol table for predefined names, labels and variables.

use std::collections::HashMap;
use std::io::{self, Write};

/// Where a symbol binding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Predefined,
    Label,
    Variable,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Predefined => "predefined",
            SymbolKind::Label => "label",
            SymbolKind::Variable => "variable",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SymbolTableEntry {
    pub name: String,
    pub val: u32,
    pub kind: SymbolKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum SymbolTableResult {
    Ok,
    Duplicate,
}

/// Base address of the memory-mapped screen.
pub const SCREEN_BASE: u32 = 16384;
/// Address of the memory-mapped keyboard.
pub const KBD_ADDR: u32 = 24576;
/// First RAM address handed out to variables.
pub const VARIABLE_BASE: u32 = 16;

const PREDEFINED_NAMED: &[(&str, u32)] = &[
    ("SCREEN", SCREEN_BASE),
    ("KBD", KBD_ADDR),
    ("SP", 0),
    ("LCL", 1),
    ("ARG", 2),
    ("THIS", 3),
    ("THAT", 4),
];

/// Symbol table keyed by case-sensitive name.
///
/// Entries keep insertion order for dumps; the index gives constant-time
/// lookup. A name is bound at most once per table.
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: Vec<SymbolTableEntry>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    /// Create an empty table without the predefined symbols.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create a table holding the 23 predefined symbols.
    #[must_use]
    pub fn with_predefined() -> Self {
        let mut table = Self::new();
        for reg in 0..16u32 {
            let bound = table.bind(&format!("R{reg}"), reg, SymbolKind::Predefined);
            debug_assert_eq!(bound, SymbolTableResult::Ok);
        }
        for (name, val) in PREDEFINED_NAMED {
            let bound = table.bind(name, *val, SymbolKind::Predefined);
            debug_assert_eq!(bound, SymbolTableResult::Ok);
        }
        table
    }

    pub fn bind(&mut self, name: &str, val: u32, kind: SymbolKind) -> SymbolTableResult {
        if self.index.contains_key(name) {
            return SymbolTableResult::Duplicate;
        }
        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push(SymbolTableEntry {
            name: name.to_string(),
            val,
            kind,
        });
        SymbolTableResult::Ok
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<u32> {
        self.entry(name).map(|entry| entry.val)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&SymbolTableEntry> {
        self.index.get(name).map(|&idx| &self.entries[idx])
    }

    pub fn entries(&self) -> impl Iterator<Item = &SymbolTableEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dump<W: Write>(&self, mut out: W) -> io::Result<()> {
        for entry in &self.entries {
            writeln!(
                out,
                "{:<16}: {:04x} ({}) {}",
                entry.name,
                entry.val,
                entry.val,
                entry.kind.as_str()
            )?;
        }
        Ok(())
    }
}
