use stepwise::interpreter::{compile, ExceptionKind, Interpreter, Pause, Resume, RunOutcome};

fn run(source: &str) -> (RunOutcome, String) {
    let program = compile(source).expect("Compilation failed");
    let mut hook = |_: &mut Pause<'_>| Resume::Continue;
    let mut interpreter = Interpreter::new(&program, &mut hook);
    let outcome = interpreter.run();
    (outcome, interpreter.into_output().into_transcript())
}

fn printed(expr: &str) -> String {
    let (outcome, output) = run(&format!("print({})\n", expr));
    assert!(
        matches!(outcome, RunOutcome::Completed),
        "{} failed: {:?}",
        expr,
        outcome
    );
    output.trim_end_matches('\n').to_string()
}

fn raises(expr: &str) -> ExceptionKind {
    match run(&format!("x = {}\n", expr)).0 {
        RunOutcome::Raised(err) => err.kind,
        other => panic!("{} should raise, got {:?}", expr, other),
    }
}

#[test]
fn test_int_and_float_coercion() {
    assert_eq!(printed("1 + 2"), "3");
    assert_eq!(printed("1 + 2.5"), "3.5");
    assert_eq!(printed("7 / 2"), "3.5");
    assert_eq!(printed("6 / 3"), "2.0");
    assert_eq!(printed("True + True"), "2");
    assert_eq!(printed("0.1 + 0.2"), "0.30000000000000004");
    assert_eq!(printed("1e3"), "1000.0");
}

#[test]
fn test_float_exponent_form() {
    assert_eq!(printed("1e20"), "1e+20");
    assert_eq!(printed("1e15"), "1000000000000000.0");
    assert_eq!(printed("0.00001"), "1e-05");
    assert_eq!(printed("-1.5e300"), "-1.5e+300");
    assert_eq!(printed("[1e16, 0.001]"), "[1e+16, 0.001]");
}

#[test]
fn test_floor_division_and_modulo_follow_divisor_sign() {
    assert_eq!(printed("7 // 2"), "3");
    assert_eq!(printed("-7 // 2"), "-4");
    assert_eq!(printed("7 // -2"), "-4");
    assert_eq!(printed("-7 % 3"), "2");
    assert_eq!(printed("7 % -3"), "-2");
    assert_eq!(printed("7.5 // 2"), "3.0");
    assert_eq!(printed("-7.5 % 2"), "0.5");
}

#[test]
fn test_power() {
    assert_eq!(printed("2 ** 10"), "1024");
    assert_eq!(printed("2 ** 3 ** 2"), "512");
    assert_eq!(printed("-2 ** 2"), "-4");
    assert_eq!(printed("2 ** -1"), "0.5");
    assert_eq!(printed("4 ** 0.5"), "2.0");
}

#[test]
fn test_precedence() {
    assert_eq!(printed("1 + 2 * 3"), "7");
    assert_eq!(printed("(1 + 2) * 3"), "9");
    assert_eq!(printed("10 - 4 - 3"), "3");
    assert_eq!(printed("not 1 == 2"), "True");
    assert_eq!(printed("1 < 2 < 3"), "True");
    assert_eq!(printed("3 > 2 > 2"), "False");
}

#[test]
fn test_boolean_operators_return_operands() {
    assert_eq!(printed("0 or 'fallback'"), "fallback");
    assert_eq!(printed("[] and 1"), "[]");
    assert_eq!(printed("2 and 3"), "3");
}

#[test]
fn test_sequence_operators() {
    assert_eq!(printed("'ab' * 3"), "ababab");
    assert_eq!(printed("[0] * 3"), "[0, 0, 0]");
    assert_eq!(printed("[1] + [2]"), "[1, 2]");
    assert_eq!(printed("'a' + 'b'"), "ab");
    assert_eq!(printed("'ell' in 'hello'"), "True");
    assert_eq!(printed("3 not in [1, 2]"), "True");
    assert_eq!(printed("[1, 2] < [1, 3]"), "True");
}

#[test]
fn test_arithmetic_errors() {
    assert_eq!(raises("1 / 0"), ExceptionKind::ZeroDivisionError);
    assert_eq!(raises("1 // 0"), ExceptionKind::ZeroDivisionError);
    assert_eq!(raises("1 % 0"), ExceptionKind::ZeroDivisionError);
    assert_eq!(raises("1.0 / 0"), ExceptionKind::ZeroDivisionError);
    assert_eq!(raises("'a' + 1"), ExceptionKind::TypeError);
    assert_eq!(raises("'a' < 1"), ExceptionKind::TypeError);
    assert_eq!(raises("-'a'"), ExceptionKind::TypeError);
    assert_eq!(raises("9223372036854775807 + 1"), ExceptionKind::OverflowError);
    assert_eq!(raises("'x' * 100000000"), ExceptionKind::OverflowError);
}

#[test]
fn test_augmented_assignment() {
    let source = r#"
n = 10
n += 5
n -= 3
n *= 2
n //= 5
n %= 3
f = 1
f /= 4
s = 'a'
s += 'b'
xs = [1]
alias = xs
xs += [2]
print(n, f, s, alias)
"#;
    let (outcome, output) = run(source);
    assert!(matches!(outcome, RunOutcome::Completed), "{:?}", outcome);
    assert_eq!(output, "1 0.25 ab [1, 2]\n");
}
