//! Full Pipeline Integration Tests
//!
//! Tests the complete flow: Source -> Scanner -> Parser -> AST ->
//! CodeGenerator -> Assembly text. This is the most critical integration
//! test suite.

use jay_asm::{AssemblyFragment, StaticType};
use jay_core::ErrorReporter;
use jay_compiler::{CodeGenerator, Parser, Scanner};

/// Helper function to compile jay source code to assembly.
fn compile(source: &str) -> Result<AssemblyFragment, String> {
    let mut reporter = ErrorReporter::new();
    let tokens = Scanner::new(source).scan_tokens(&mut reporter);
    let program = Parser::new(tokens, &mut reporter).parse();
    if reporter.had_error() {
        return Err(format!("Syntax errors: {:?}", reporter.diagnostics()));
    }

    let mut generator = CodeGenerator::new(&program.ast);
    generator
        .generate(&program.statements)
        .map_err(|e| format!("Generation error: {}", e))
}

/// Test: Number literal lowers to a typed constant push
#[test]
fn test_pipeline_number_literal() {
    let fragment = compile("42;").expect("Compilation failed");
    assert_eq!(fragment.code, "ldc2_w 42.0\n");
    assert_eq!(fragment.ty, StaticType::Double);
    assert_eq!(fragment.max_stack_depth, 2);
}

/// Test: Arithmetic expression selects numeric instructions
#[test]
fn test_pipeline_arithmetic() {
    let fragment = compile("lg 1 + 2 * 3 - 4 / 2;").expect("Compilation failed");
    for instruction in ["dadd", "dmul", "dsub", "ddiv"] {
        assert!(
            fragment.code.contains(instruction),
            "missing {}",
            instruction
        );
    }
}

/// Test: Precedence is reflected in emission order
#[test]
fn test_pipeline_precedence_order() {
    let fragment = compile("1 + 2 * 3;").expect("Compilation failed");
    // the product is computed before the sum consumes it
    let mul = fragment.code.find("dmul").unwrap();
    let add = fragment.code.find("dadd").unwrap();
    assert!(mul < add);
}

/// Test: Declare, declare, print the sum
#[test]
fn test_pipeline_declare_and_print_sum() {
    let fragment = compile("jj x = 1; jj y = 2; lg x + y;").expect("Compilation failed");
    assert!(fragment.code.contains("dstore 0"));
    assert!(fragment.code.contains("dstore 1"));
    assert!(fragment.code.contains("dload 0"));
    assert!(fragment.code.contains("dload 1"));
    assert!(fragment.code.contains("dadd"));
    assert!(fragment
        .code
        .contains("invokevirtual java/io/PrintStream/println(Ljava/lang/String;)V"));
    assert!(fragment.max_stack_depth >= 2);
}

/// Test: String concatenation with implicit conversion
#[test]
fn test_pipeline_string_building() {
    let fragment = compile("jj label = \"n=\"; lg label + 3;").expect("Compilation failed");
    assert!(fragment
        .code
        .contains("invokestatic java/lang/String/valueOf(D)Ljava/lang/String;"));
    assert!(fragment
        .code
        .contains("invokevirtual java/lang/String/concat(Ljava/lang/String;)Ljava/lang/String;"));
}

/// Test: Shadowing resolves inner, restores outer
#[test]
fn test_pipeline_shadowing() {
    let fragment = compile("jj x = 1; { jj x = 2; lg x; } lg x;").expect("Compilation failed");
    let inner = fragment.code.find("dload 1").expect("inner load");
    let outer = fragment.code.rfind("dload 0").expect("outer load");
    assert!(inner < outer);
}

/// Test: Conditional flow lowers to compare, branch, and converge
#[test]
fn test_pipeline_if_else() {
    let fragment = compile("jj x = 1; if (x < 2) { lg \"small\"; } else { lg \"big\"; }")
        .expect("Compilation failed");
    assert!(fragment.code.contains("dcmpg"));
    assert!(fragment.code.contains("ifeq"));
    assert!(fragment.code.contains("goto"));
}

/// Test: While loop jumps back to its condition label
#[test]
fn test_pipeline_while_loop() {
    let fragment = compile("jj i = 0; while (i < 3) { i = i + 1; }").expect("Compilation failed");
    // the first placed label is the condition; the body must jump back to it
    let placement = fragment
        .code
        .lines()
        .find(|line| line.ends_with(':'))
        .expect("a label placement")
        .trim_end_matches(':')
        .to_string();
    assert!(fragment.code.contains(&format!("goto {}", placement)));
}

/// Test: Logical operators evaluate both operands
#[test]
fn test_pipeline_logical_operators() {
    let fragment = compile("lg true and false or true;").expect("Compilation failed");
    assert!(fragment.code.contains("iand"));
    assert!(fragment.code.contains("ior"));
}

/// Test: Builtin interop call round-trips through the host boundary
#[test]
fn test_pipeline_interop_call() {
    let fragment =
        compile("lg JavaStaticCall(\"Interop/Host\", \"version\");").expect("Compilation failed");
    assert!(fragment
        .code
        .contains("invokestatic Interop/Host/version()Ljava/lang/Object;"));
    assert!(fragment
        .code
        .contains("invokestatic java/lang/String/valueOf(Ljava/lang/Object;)Ljava/lang/String;"));
}

/// Test: The whole pipeline keeps the stack accounting invariant
#[test]
fn test_pipeline_stack_invariant() {
    let sources = [
        "jj a = 1; jj b = a + 2; lg a * b;",
        "lg \"x\" + 1 + true;",
        "jj n = 0; while (n < 4) { if (n == 2) { lg n; } n = n + 1; }",
        "lg 1 < 2 ? \"yes\" : \"no\";",
    ];
    for source in sources {
        let fragment = compile(source).expect("Compilation failed");
        assert!(
            fragment.max_stack_depth >= fragment.current_depth,
            "invariant violated for {:?}",
            source
        );
    }
}

/// Test: Debug ranges cover block-declared names
#[test]
fn test_pipeline_debug_table() {
    let mut reporter = ErrorReporter::new();
    let tokens = Scanner::new("{ jj x = 1; jj msg = \"hi\"; }").scan_tokens(&mut reporter);
    let program = Parser::new(tokens, &mut reporter).parse();
    let mut generator = CodeGenerator::new(&program.ast);
    generator.generate(&program.statements).unwrap();

    let table = generator.local_variable_table();
    assert!(table.contains("0 is x D from"));
    assert!(table.contains("1 is msg Ljava/lang/String; from"));
}
