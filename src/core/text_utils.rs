// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Shared text utilities for line filtering and symbol scanning.

/// Marker that starts a whole-line comment.
pub const COMMENT_MARKER: &str = "//";

/// Check if a byte may start a symbol (anything but a digit).
#[inline]
pub fn is_symbol_start(c: u8) -> bool {
    is_symbol_char(c) && !c.is_ascii_digit()
}

/// Check if a byte is a valid symbol continuation character.
#[inline]
pub fn is_symbol_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'_' | b'.' | b'$' | b':')
}

/// Check if a whole string is a well-formed symbol name.
pub fn is_symbol(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.split_first() {
        Some((&first, rest)) => is_symbol_start(first) && rest.iter().all(|&c| is_symbol_char(c)),
        None => false,
    }
}

/// Check if a line is a whole-line comment once leading whitespace is removed.
#[inline]
pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with(COMMENT_MARKER)
}

/// Strip surrounding whitespace (including a stray `\r`) from a source line.
///
/// Returns `None` for lines that carry no instruction: blank lines,
/// whitespace-only lines and comments.
pub fn clean_line(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || is_comment(trimmed) {
        None
    } else {
        Some(trimmed)
    }
}
