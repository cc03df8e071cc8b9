use garuda::interpreter::Interpreter;
use garuda::parser::Parser;
use garuda::{GarudaError, scanner};

fn run_fixture(source: &str) -> Vec<String> {
    let tokens = scanner::scan(source).expect("scan should succeed");
    let program = Parser::new(tokens).parse().expect("parse should succeed");
    let mut interp = Interpreter::with_writer(Box::new(std::io::sink()));
    interp
        .interpret(&program)
        .expect("interpret should succeed");
    interp.output().to_vec()
}

fn quiet() -> Interpreter {
    Interpreter::with_writer(Box::new(std::io::sink()))
}

#[test]
fn fixture_arithmetic() {
    let source = include_str!("../fixtures/arithmetic.gar");
    let expected = include_str!("../fixtures/arithmetic.expected");
    let output = run_fixture(source);
    let expected_lines: Vec<&str> = expected.lines().collect();
    assert_eq!(output, expected_lines);
}

#[test]
fn fixture_countdown() {
    let source = include_str!("../fixtures/countdown.gar");
    let expected = include_str!("../fixtures/countdown.expected");
    let output = run_fixture(source);
    let expected_lines: Vec<&str> = expected.lines().collect();
    assert_eq!(output, expected_lines);
}

#[test]
fn fixture_scoping() {
    let source = include_str!("../fixtures/scoping.gar");
    let expected = include_str!("../fixtures/scoping.expected");
    let output = run_fixture(source);
    let expected_lines: Vec<&str> = expected.lines().collect();
    assert_eq!(output, expected_lines);
}

#[test]
fn fixture_functions() {
    let source = include_str!("../fixtures/functions.gar");
    let expected = include_str!("../fixtures/functions.expected");
    let output = run_fixture(source);
    let expected_lines: Vec<&str> = expected.lines().collect();
    assert_eq!(output, expected_lines);
}

#[test]
fn fixture_unicode_names() {
    let source = include_str!("../fixtures/unicode_names.gar");
    let expected = include_str!("../fixtures/unicode_names.expected");
    let output = run_fixture(source);
    let expected_lines: Vec<&str> = expected.lines().collect();
    assert_eq!(output, expected_lines);
}

#[test]
fn bindings_persist_across_runs_on_one_interpreter() {
    let mut interp = quiet();
    for source in ["चर क = 2", "प्रत्याययतु दुगुना(x) प्रत्यावर्तयतु x * 2", "लिखतु(दुगुना(क))"] {
        let tokens = scanner::scan(source).expect("scan should succeed");
        let program = Parser::new(tokens).parse().expect("parse should succeed");
        interp.interpret(&program).expect("interpret should succeed");
    }
    assert_eq!(interp.output(), ["4"]);
    assert!(interp.environment().contains("क"));
    assert!(interp.environment().contains("दुगुना"));
}

#[test]
fn output_before_runtime_error_is_kept() {
    let mut interp = quiet();
    let tokens = scanner::scan("लिखतु(1); लिखतु(1 / 0); लिखतु(2)").expect("scan should succeed");
    let program = Parser::new(tokens).parse().expect("parse should succeed");
    let err = interp.interpret(&program).unwrap_err();
    assert_eq!(err.message, "division by zero");
    assert_eq!(interp.output(), ["1"]);
}

#[test]
fn run_with_reports_each_stage() {
    assert!(matches!(
        garuda::run_with(quiet(), "लिखतु(\"खुला"),
        Err(GarudaError::Lex(_))
    ));
    assert!(matches!(
        garuda::run_with(quiet(), "चर = 1"),
        Err(GarudaError::Parse(_))
    ));
    assert!(matches!(
        garuda::run_with(quiet(), "लिखतु(अज्ञात)"),
        Err(GarudaError::Runtime(_))
    ));
    assert_eq!(
        garuda::run_with(quiet(), "लिखतु(\"नमस्ते\", 3)").expect("run should succeed"),
        ["नमस्ते 3"]
    );
}

#[test]
fn runtime_error_reports_line_and_column() {
    let source = "चर क = 1\nलिखतु(क + ख)";
    let Err(GarudaError::Runtime(err)) = garuda::run_with(quiet(), source) else {
        panic!("expected a runtime error");
    };
    assert_eq!(
        err.display_with_line(source),
        "Error: line 2, column 11: undefined name 'ख'"
    );
}
