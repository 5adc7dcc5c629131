// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing and argument validation.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};

use crate::core::assembler::error::{AsmErrorKind, AsmRunError};

pub const VERSION: &str = "1.0";

/// Environment variable that overrides the log filter.
pub const LOG_ENV: &str = "HACKFORGE_LOG";
/// Environment variable that overrides log coloring.
pub const LOG_STYLE_ENV: &str = "HACKFORGE_LOG_STYLE";

const LONG_ABOUT: &str = "Two-pass assembler for the 16-bit Hack CPU.

Reads a .asm source file and writes one 16-character binary word per
instruction. By default the output is written next to the input with a
.hack extension. Use -o/--outfile to choose another path and -l/--list
to also emit a listing with the resolved symbol table.";

#[derive(Parser, Debug)]
#[command(
    name = "hackforge",
    version = VERSION,
    about = "Two-pass assembler for the 16-bit Hack CPU",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    #[arg(
        short = 'i',
        long = "infile",
        visible_alias = "input",
        value_name = "FILE",
        long_help = "Input assembly file. Must end with .asm."
    )]
    pub infile: PathBuf,
    #[arg(
        short = 'o',
        long = "outfile",
        value_name = "FILE",
        long_help = "Output file for the binary words. Defaults to the input path with a .hack extension."
    )]
    pub outfile: Option<PathBuf>,
    #[arg(
        short = 'l',
        long = "list",
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = "",
        long_help = "Emit a listing file. FILE is optional; when omitted, the output base is used and a .lst extension is added."
    )]
    pub list_name: Option<String>,
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        long_help = "Increase log verbosity (repeatable: -v info, -vv debug, -vvv trace)."
    )]
    pub verbose: u8,
}

/// Validated CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub list: Option<PathBuf>,
}

/// Log filter used when the environment does not set one.
pub fn default_log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the logger. Safe to call more than once.
pub fn init_logging(verbose: u8) {
    let env = env_logger::Env::default()
        .filter_or(LOG_ENV, default_log_filter(verbose))
        .write_style_or(LOG_STYLE_ENV, "auto");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

/// Check the input name and return its base path (without `.asm`).
pub fn input_base_from_path(path: &Path) -> Result<PathBuf, AsmRunError> {
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(name) => name,
        None => {
            return Err(AsmRunError::bare(
                AsmErrorKind::Cli,
                "Invalid input file name",
                None,
            ))
        }
    };
    if !file_name.ends_with(".asm") || file_name == ".asm" {
        return Err(AsmRunError::bare(
            AsmErrorKind::Cli,
            "Input file must end with .asm",
            None,
        ));
    }
    Ok(path.with_extension(""))
}

/// Resolve an optional output name against the base path.
///
/// An empty name means "use the base"; a name without an extension gets
/// `extension` appended.
pub fn resolve_output_path(base: &Path, name: Option<&str>, extension: &str) -> Option<PathBuf> {
    let name = name?;
    if name.is_empty() {
        return Some(base.with_extension(extension));
    }
    let path = PathBuf::from(name);
    if path.extension().is_none() {
        return Some(path.with_extension(extension));
    }
    Some(path)
}

/// Validate CLI arguments and return parsed configuration.
pub fn validate_cli(cli: &Cli) -> Result<CliConfig, AsmRunError> {
    let base = input_base_from_path(&cli.infile)?;
    let output = match &cli.outfile {
        Some(out) => out.clone(),
        None => base.with_extension("hack"),
    };
    if output == cli.infile {
        return Err(AsmRunError::bare(
            AsmErrorKind::Cli,
            "Output file would overwrite the input",
            Some(&output.to_string_lossy()),
        ));
    }

    let list_base = output.with_extension("");
    let list = resolve_output_path(&list_base, cli.list_name.as_deref(), "lst");
    if list.as_ref().is_some_and(|list| *list == output || *list == cli.infile) {
        return Err(AsmRunError::bare(
            AsmErrorKind::Cli,
            "Listing file must differ from the input and output files",
            None,
        ));
    }

    Ok(CliConfig {
        input: cli.infile.clone(),
        output,
        list,
    })
}
