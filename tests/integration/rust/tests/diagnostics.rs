//! Diagnostics Integration Tests
//!
//! Verifies the two failure channels: soft diagnostics that accumulate
//! across a pass and gate code generation, and hard errors that abort
//! generation with a single actionable message.

use jay_core::ErrorReporter;
use jay_compiler::{CodeGenerator, Parser, Program, Scanner};

fn parse(source: &str) -> (Program, ErrorReporter) {
    let mut reporter = ErrorReporter::new();
    let tokens = Scanner::new(source).scan_tokens(&mut reporter);
    let program = Parser::new(tokens, &mut reporter).parse();
    (program, reporter)
}

/// Test: A syntax error in the middle statement leaves its neighbors intact
#[test]
fn test_error_in_statement_two_of_three() {
    let (program, reporter) = parse("jj a = 1; jj b = ; jj c = 3;");

    assert_eq!(reporter.diagnostics().len(), 1);
    assert_eq!(program.statements.len(), 2);

    // the surviving statements still generate
    let mut generator = CodeGenerator::new(&program.ast);
    let fragment = generator.generate(&program.statements).unwrap();
    assert!(fragment.code.contains("dstore 0"));
    assert!(fragment.code.contains("dstore 1"));
}

/// Test: Multiple soft errors surface in one pass
#[test]
fn test_multiple_diagnostics_in_one_pass() {
    let (_, reporter) = parse("jj = 1; lg ; jj x = 2;");
    assert!(reporter.diagnostics().len() >= 2);
}

/// Test: Lexical and syntactic diagnostics share the reporter
#[test]
fn test_lexical_and_syntax_diagnostics_combined() {
    let (_, reporter) = parse("jj a = @; lg a");
    // one unexpected-character error, plus the parse fallout
    assert!(reporter.had_error());
    assert!(reporter
        .diagnostics()
        .iter()
        .any(|d| d.message.contains("Unexpected character")));
}

/// Test: Diagnostics carry line numbers
#[test]
fn test_diagnostics_carry_lines() {
    let (_, reporter) = parse("jj a = 1;\njj b = ;\n");
    assert_eq!(reporter.diagnostics().len(), 1);
    assert_eq!(reporter.diagnostics()[0].line, 2);
}

/// Test: A soft-error run never reaches code generation
#[test]
fn test_soft_errors_gate_generation() {
    let (_, reporter) = parse("lg 1");
    // the driver contract: check the flag before generating
    assert!(reporter.had_error());
}

/// Test: Hard errors stop with one actionable message
#[test]
fn test_hard_error_message_content() {
    let (program, reporter) = parse("jj x = 1; lg x + nil;");
    assert!(!reporter.had_error());

    let mut generator = CodeGenerator::new(&program.ast);
    let error = generator.generate(&program.statements).unwrap_err();
    let message = error.to_string();
    assert!(message.contains("'+'"));
    assert!(message.contains("number"));
    assert!(message.contains("nil"));
}

/// Test: Redefinition reports the offending name and line
#[test]
fn test_redefinition_message() {
    let (program, reporter) = parse("jj x = 1;\njj x = 2;");
    assert!(!reporter.had_error());

    let mut generator = CodeGenerator::new(&program.ast);
    let error = generator.generate(&program.statements).unwrap_err();
    assert_eq!(
        error.to_string(),
        "line 2: cannot redefine 'x' in the same scope"
    );
}

/// Test: Unterminated constructs are reported but scanning finishes
#[test]
fn test_unterminated_constructs() {
    let (_, reporter) = parse("jj a = 1; /* no end");
    assert!(reporter
        .diagnostics()
        .iter()
        .any(|d| d.message.contains("Unterminated block comment")));

    let (_, reporter) = parse("jj a = \"no end");
    assert!(reporter
        .diagnostics()
        .iter()
        .any(|d| d.message.contains("Unterminated string")));
}
