use super::{
    assemble_file, assemble_lines, assemble_source, filter_lines, run_one, write_atomic,
    Assembler, SourceLine,
};
use crate::assembler::cli::CliConfig;
use crate::core::assembler::error::{AsmErrorKind, Severity};
use crate::core::symbol_table::SymbolKind;
use std::fs;

fn lines(src: &str) -> Vec<String> {
    src.lines().map(|s| s.to_string()).collect()
}

fn words(src: &str) -> Vec<String> {
    let assembly = assemble_source(src).expect("assemble");
    assembly.words().map(|w| w.to_string()).collect()
}

const MAX_ASM: &str = "\
// Computes R2 = max(R0, R1)

   @R0
   D=M
   @R1
   D=D-M
   @OUTPUT_FIRST
   D;JGT
   @R1
   D=M
   @OUTPUT_D
   0;JMP
(OUTPUT_FIRST)
   @R0
   D=M
(OUTPUT_D)
   @R2
   M=D
(INFINITE_LOOP)
   @INFINITE_LOOP
   0;JMP
";

const MAX_HACK: &str = "\
0000000000000000
1111110000010000
0000000000000001
1111010011010000
0000000000001010
1110001100000001
0000000000000001
1111110000010000
0000000000001100
1110101010000111
0000000000000000
1111110000010000
0000000000000010
1110001100001000
0000000000001110
1110101010000111
";

#[test]
fn assembles_add_program() {
    let out = words("@2\nD=A\n@3\nD=D+A\n@0\nM=D");
    assert_eq!(
        out,
        vec![
            "0000000000000010",
            "1110110000010000",
            "0000000000000011",
            "1110000010010000",
            "0000000000000000",
            "1110001100001000",
        ]
    );
}

#[test]
fn assembles_max_program_with_labels() {
    let assembly = assemble_source(MAX_ASM).expect("assemble");
    assert_eq!(assembly.to_text(), MAX_HACK);
    assert_eq!(assembly.symbols().lookup("OUTPUT_FIRST"), Some(10));
    assert_eq!(assembly.symbols().lookup("OUTPUT_D"), Some(12));
    assert_eq!(assembly.symbols().lookup("INFINITE_LOOP"), Some(14));
    assert!(assembly.diagnostics().is_empty());
}

#[test]
fn assembly_is_deterministic() {
    let first = assemble_source(MAX_ASM).expect("assemble").to_text();
    let second = assemble_source(MAX_ASM).expect("assemble").to_text();
    assert_eq!(first, second);
}

#[test]
fn every_word_is_sixteen_binary_digits() {
    let assembly = assemble_source(MAX_ASM).expect("assemble");
    for word in assembly.words() {
        assert_eq!(word.len(), 16);
        assert!(word.chars().all(|c| c == '0' || c == '1'), "{word}");
    }
}

#[test]
fn labels_bind_to_next_instruction_index() {
    let assembly = assemble_source("(LOOP)\n@0\nM=1\n(END)").expect("assemble");
    assert_eq!(assembly.symbols().lookup("LOOP"), Some(0));
    assert_eq!(assembly.symbols().lookup("END"), Some(2));
    assert_eq!(
        assembly.symbols().entry("END").map(|e| e.kind),
        Some(SymbolKind::Label)
    );
    assert_eq!(assembly.words().count(), 2);
}

#[test]
fn consecutive_labels_share_an_address() {
    let assembly = assemble_source("@1\n(A1)\n(A2)\nD=A").expect("assemble");
    assert_eq!(assembly.symbols().lookup("A1"), Some(1));
    assert_eq!(assembly.symbols().lookup("A2"), Some(1));
}

#[test]
fn variables_are_allocated_in_first_use_order() {
    let assembly = assemble_source("@foo\n@bar\n@foo").expect("assemble");
    assert_eq!(assembly.symbols().lookup("foo"), Some(16));
    assert_eq!(assembly.symbols().lookup("bar"), Some(17));
    let out: Vec<&str> = assembly.words().collect();
    assert_eq!(
        out,
        vec!["0000000000010000", "0000000000010001", "0000000000010000"]
    );
}

#[test]
fn labels_win_over_forward_references() {
    // LOOP is used before its declaration and must not become a variable.
    let assembly = assemble_source("@LOOP\n0;JMP\n(LOOP)\n@x\nM=0").expect("assemble");
    assert_eq!(assembly.symbols().lookup("LOOP"), Some(2));
    assert_eq!(assembly.symbols().lookup("x"), Some(16));
    assert_eq!(assembly.words().next(), Some("0000000000000010"));
}

#[test]
fn predefined_symbols_keep_their_addresses() {
    let out = words("@i\n@SCREEN\n@KBD\n@R15\n@THAT");
    assert_eq!(out[0], "0000000000010000");
    assert_eq!(out[1], "0100000000000000");
    assert_eq!(out[2], "0110000000000000");
    assert_eq!(out[3], "0000000000001111");
    assert_eq!(out[4], "0000000000000100");
}

#[test]
fn symbols_are_case_sensitive() {
    let assembly = assemble_source("@screen\n@SCREEN").expect("assemble");
    assert_eq!(assembly.symbols().lookup("screen"), Some(16));
    assert_eq!(assembly.symbols().lookup("SCREEN"), Some(16384));
}

#[test]
fn address_bounds() {
    assert_eq!(words("@32767"), vec!["0111111111111111"]);
    let err = assemble_source("@32768").unwrap_err();
    assert_eq!(err.first_kind(), AsmErrorKind::Range);
    assert_eq!(err.diagnostics()[0].line(), 1);
}

#[test]
fn filter_drops_comments_blank_and_whitespace_lines() {
    let src = lines("// header\n\n   \n\t@1\n  // indented comment\nD=A  \r\n");
    let clean = filter_lines(&src);
    assert_eq!(
        clean,
        vec![
            SourceLine {
                line_num: 4,
                indent: 1,
                text: "@1".to_string(),
            },
            SourceLine {
                line_num: 6,
                indent: 0,
                text: "D=A".to_string(),
            },
        ]
    );
}

#[test]
fn filter_is_idempotent() {
    let once: Vec<String> = filter_lines(&lines(MAX_ASM))
        .into_iter()
        .map(|line| line.text)
        .collect();
    let twice: Vec<String> = filter_lines(&once)
        .into_iter()
        .map(|line| line.text)
        .collect();
    assert_eq!(once, twice);
}

#[test]
fn label_pass_drops_labels_and_keeps_order() {
    let mut asm = Assembler::new();
    let clean = filter_lines(&lines("(START)\n@1\n(MID)\nD=A\n"));
    let (out, counts) = asm.resolve_labels(clean);
    let texts: Vec<&str> = out.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["@1", "D=A"]);
    assert_eq!(counts.errors, 0);
    assert_eq!(asm.symbols().lookup("START"), Some(0));
    assert_eq!(asm.symbols().lookup("MID"), Some(1));
}

#[test]
fn variable_pass_rewrites_symbolic_addresses() {
    let mut asm = Assembler::new();
    let clean = filter_lines(&lines("@n\nD=M\n@SP\n@n"));
    let (out, counts) = asm.resolve_variables(clean);
    let texts: Vec<&str> = out.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["@16", "D=M", "@0", "@16"]);
    assert_eq!(counts.warnings, 0);
    assert_eq!(out[3].line_num, 4);
}

#[test]
fn duplicate_label_is_rejected() {
    let err = assemble_source("(LOOP)\n@0\n(LOOP)\nD=A").unwrap_err();
    assert_eq!(err.first_kind(), AsmErrorKind::Symbol);
    let diag = &err.diagnostics()[0];
    assert_eq!(diag.line(), 3);
    assert_eq!(diag.error().message(), "Duplicate label: LOOP");
    assert_eq!(
        err.to_string(),
        "Errors detected in source. No output file created."
    );
}

#[test]
fn label_cannot_rebind_predefined_symbol() {
    let err = assemble_source("(SCREEN)\n@0").unwrap_err();
    assert_eq!(err.first_kind(), AsmErrorKind::Symbol);
    assert_eq!(
        err.diagnostics()[0].error().message(),
        "Label redefines predefined symbol: SCREEN"
    );
}

#[test]
fn unknown_mnemonics_abort_with_line_and_column() {
    let src = "@1\n  D=Q\n  D;JXX\nM=1";
    let err = assemble_source(src).unwrap_err();
    assert_eq!(err.diagnostics().len(), 2);

    let first = &err.diagnostics()[0];
    assert_eq!(first.line(), 2);
    assert_eq!(first.column(), Some(5));
    assert_eq!(first.error().kind(), AsmErrorKind::Instruction);
    assert_eq!(first.error().message(), "Unknown compute expression: Q");

    let second = &err.diagnostics()[1];
    assert_eq!(second.line(), 3);
    assert_eq!(second.error().message(), "Unknown jump condition: JXX");
    assert_eq!(err.source_lines()[1], "  D=Q");
}

#[test]
fn mixed_registers_are_malformed() {
    let err = assemble_source("D=A+M").unwrap_err();
    assert_eq!(
        err.diagnostics()[0].error().message(),
        "Compute expression mixes A and M: A+M"
    );
}

#[test]
fn malformed_lines_are_reported_before_encoding() {
    let err = assemble_source("@\n(BROKEN\n@12x").unwrap_err();
    let messages: Vec<&str> = err
        .diagnostics()
        .iter()
        .map(|d| d.error().message())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Missing address operand after '@'",
            "Missing ')' in label declaration: (BROKEN",
            "Invalid decimal address: 12x",
        ]
    );
}

#[test]
fn variable_in_screen_memory_warns() {
    let mut src = String::new();
    for idx in 0..(16384 - 16 + 1) {
        src.push_str(&format!("@v{idx}\n"));
    }
    let assembly = assemble_source(&src).expect("assemble");
    assert_eq!(assembly.symbols().lookup("v16368"), Some(16384));
    assert_eq!(assembly.counts().warnings, 1);
    let diag = &assembly.diagnostics()[0];
    assert_eq!(diag.severity(), Severity::Warning);
    assert_eq!(diag.line(), 16369);
}

#[test]
fn variable_memory_is_limited_to_fifteen_bits() {
    // 32752 variables fill 16..=32767; one more does not fit.
    let src: String = (0..=32752).map(|idx| format!("@v{idx}\n")).collect();
    let err = assemble_source(&src).unwrap_err();
    assert_eq!(err.first_kind(), AsmErrorKind::Range);
    let diag = err
        .diagnostics()
        .iter()
        .find(|d| d.severity() == Severity::Error)
        .expect("range error");
    assert_eq!(diag.error().message(), "Out of variable memory: v32752");
    assert_eq!(diag.line(), 32753);
}

#[test]
fn label_past_end_of_rom_is_out_of_range() {
    let mut src = "@0\n".repeat(32768);
    src.push_str("(END)\n");
    let err = assemble_source(&src).unwrap_err();
    assert_eq!(err.first_kind(), AsmErrorKind::Range);
    let diag = &err.diagnostics()[0];
    assert_eq!(diag.line(), 32769);
    assert_eq!(
        diag.error().message(),
        "Label address out of range (0-32767): END"
    );
}

#[test]
fn program_must_fit_in_rom() {
    assert_eq!(assemble_source(&"@0\n".repeat(32768)).expect("assemble").words().count(), 32768);

    let err = assemble_source(&"@0\n".repeat(32770)).unwrap_err();
    assert_eq!(err.diagnostics().len(), 1);
    let diag = &err.diagnostics()[0];
    assert_eq!(diag.error().kind(), AsmErrorKind::Range);
    assert_eq!(diag.error().message(), "Program exceeds ROM size (32768 words)");
    assert_eq!(diag.line(), 32769);
}

#[test]
fn jump_text_after_mnemonic_is_ignored() {
    let out = words("0;JMP // loop forever\nD;JGT   x\n0;JMPX");
    assert_eq!(
        out,
        vec!["1110101010000111", "1110001100000001", "1110101010000111"]
    );
}

#[test]
fn empty_source_assembles_to_nothing() {
    let assembly = assemble_lines(Vec::new()).expect("assemble");
    assert_eq!(assembly.to_text(), "");
    assert_eq!(assembly.counts().instructions, 0);
}

#[test]
fn listing_shows_words_and_symbols() {
    let assembly =
        assemble_source("(LOOP)\n   @i\n   M=M+1\n   @LOOP\n   0;JMP").expect("assemble");
    let mut out = Vec::new();
    assembly
        .write_listing(&mut out, "hackforge test")
        .expect("listing");
    let text = String::from_utf8(out).expect("utf8");
    assert!(text.starts_with("hackforge test\n"));
    assert!(text.contains("0000    0000000000010000     2     @i"));
    assert!(text.contains("0003    1110101010000111     5     0;JMP"));
    assert!(text.contains("Lines: 5  Instructions: 4  Errors: 0  Warnings: 0"));
    assert!(text.contains("LOOP            : 0000 (0) label"));
    assert!(text.contains("i               : 0010 (16) variable"));
}

#[test]
fn assemble_file_reads_source_and_names_file_in_diagnostics() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("Bad.asm");
    fs::write(&path, "@1\nD=Q\n").expect("write");
    let err = assemble_file(&path).unwrap_err();
    let text = err.diagnostics()[0].format_with_context(Some(err.source_lines()), false);
    assert!(text.starts_with(&format!("{}:2: ERROR", path.display())));
    assert!(text.ends_with("ERROR: Unknown compute expression: Q"));
}

#[test]
fn assemble_file_reports_missing_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = assemble_file(&dir.path().join("missing.asm")).unwrap_err();
    assert_eq!(err.kind(), AsmErrorKind::Io);
}

#[test]
fn run_one_writes_output_and_listing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("Max.asm");
    fs::write(&input, MAX_ASM).expect("write");
    let config = CliConfig {
        input: input.clone(),
        output: dir.path().join("Max.hack"),
        list: Some(dir.path().join("Max.lst")),
    };
    let report = run_one(&config).expect("run");
    assert_eq!(report.error_count(), 0);
    assert_eq!(report.warning_count(), 0);
    assert_eq!(
        fs::read_to_string(dir.path().join("Max.hack")).expect("read"),
        MAX_HACK
    );
    let listing = fs::read_to_string(dir.path().join("Max.lst")).expect("read listing");
    assert!(listing.contains("SYMBOL TABLE"));
}

#[test]
fn run_one_leaves_existing_output_untouched_on_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("Bad.asm");
    let output = dir.path().join("Bad.hack");
    fs::write(&input, "@1\nD=Q\n").expect("write");
    fs::write(&output, "previous\n").expect("write");
    let config = CliConfig {
        input,
        output: output.clone(),
        list: None,
    };
    assert!(run_one(&config).is_err());
    assert_eq!(fs::read_to_string(&output).expect("read"), "previous\n");
}

#[test]
fn write_atomic_replaces_target() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("out.hack");
    fs::write(&target, "old").expect("write");
    write_atomic(&target, b"new\n").expect("atomic write");
    assert_eq!(fs::read_to_string(&target).expect("read"), "new\n");
    let entries = fs::read_dir(dir.path()).expect("read dir").count();
    assert_eq!(entries, 1);
}
