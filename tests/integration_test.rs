// Integration tests for the script interpreter and its statement hook

use pretty_assertions::assert_eq;
use stepwise::interpreter::{compile, ExceptionKind, Interpreter, Pause, Resume, RunOutcome};

/// What the hook saw at one boundary
#[derive(Debug, Clone, PartialEq)]
struct Stop {
    line: usize,
    function: String,
    vars: Vec<(String, String)>,
}

fn trace(source: &str) -> (RunOutcome, Vec<Stop>, String) {
    let program = compile(source).expect("Compilation failed");
    let mut stops = Vec::new();
    let mut hook = |pause: &mut Pause<'_>| {
        stops.push(Stop {
            line: pause.line(),
            function: pause.function_name().to_string(),
            vars: pause
                .bindings()
                .filter(|(name, value)| !name.starts_with("__") && !value.is_callable())
                .map(|(name, value)| (name.to_string(), value.repr().unwrap_or_default()))
                .collect(),
        });
        Resume::Step
    };
    let mut interpreter = Interpreter::new(&program, &mut hook);
    let outcome = interpreter.run();
    let output = interpreter.into_output().into_transcript();
    (outcome, stops, output)
}

fn lines(stops: &[Stop]) -> Vec<usize> {
    stops.iter().map(|s| s.line).collect()
}

#[test]
fn test_boundaries_follow_statement_order() {
    let source = "a = 1\na = a + 1\n";
    let (outcome, stops, output) = trace(source);

    assert!(matches!(outcome, RunOutcome::Completed), "{:?}", outcome);
    assert_eq!(lines(&stops), vec![1, 2]);
    assert_eq!(stops[0].vars, vec![("a".to_string(), "1".to_string())]);
    assert_eq!(stops[1].vars, vec![("a".to_string(), "2".to_string())]);
    assert_eq!(output, "");
}

#[test]
fn test_function_call() {
    let source = r#"
def add(a, b):
    c = a + b
    return c

x = add(3, 4)
print(x)
"#;
    let (outcome, stops, output) = trace(source);

    assert!(matches!(outcome, RunOutcome::Completed), "{:?}", outcome);
    assert_eq!(lines(&stops), vec![2, 3, 4, 6, 7]);
    assert_eq!(stops[1].function, "add");
    assert_eq!(
        stops[1].vars,
        vec![
            ("a".to_string(), "3".to_string()),
            ("b".to_string(), "4".to_string()),
            ("c".to_string(), "7".to_string()),
        ]
    );
    assert_eq!(stops[3].function, "<module>");
    assert_eq!(stops[3].vars, vec![("x".to_string(), "7".to_string())]);
    assert_eq!(output, "7\n");
}

#[test]
fn test_loop_headers_are_boundaries() {
    let source = r#"
total = 0
for i in range(3):
    total += i
n = 2
while n > 0:
    n -= 1
print(total, n)
"#;
    let (outcome, stops, output) = trace(source);

    assert!(matches!(outcome, RunOutcome::Completed), "{:?}", outcome);
    assert_eq!(
        lines(&stops),
        vec![2, 3, 4, 3, 4, 3, 4, 5, 6, 7, 6, 7, 6, 8]
    );
    assert_eq!(output, "3 0\n");
}

#[test]
fn test_if_elif_else() {
    let source = r#"
x = 5
if x < 0:
    kind = 'negative'
elif x == 0:
    kind = 'zero'
else:
    kind = 'positive'
print(kind)
"#;
    let (_, stops, output) = trace(source);

    assert_eq!(lines(&stops), vec![2, 3, 5, 8, 9]);
    assert_eq!(output, "positive\n");
}

#[test]
fn test_break_and_continue() {
    let source = r#"
found = []
for n in [1, 2, 3, 4, 5, 6]:
    if n % 2 == 0:
        continue
    if n > 4:
        break
    found.append(n)
print(found)
"#;
    let (outcome, _, output) = trace(source);
    assert!(matches!(outcome, RunOutcome::Completed), "{:?}", outcome);
    assert_eq!(output, "[1, 3]\n");
}

#[test]
fn test_recursion() {
    let source = r#"
def fact(n):
    if n <= 1:
        return 1
    return n * fact(n - 1)

print(fact(10))
"#;
    let (outcome, _, output) = trace(source);
    assert!(matches!(outcome, RunOutcome::Completed), "{:?}", outcome);
    assert_eq!(output, "3628800\n");
}

#[test]
fn test_globals_and_locals() {
    let source = r#"
count = 0

def bump():
    global count
    count += 1

def shadow():
    count = 100
    return count

bump()
bump()
print(count, shadow(), count)
"#;
    let (outcome, _, output) = trace(source);
    assert!(matches!(outcome, RunOutcome::Completed), "{:?}", outcome);
    assert_eq!(output, "2 100 2\n");
}

#[test]
fn test_unbound_local() {
    let source = r#"
x = 1

def f():
    y = x
    x = 2

f()
"#;
    let (outcome, _, _) = trace(source);
    match outcome {
        RunOutcome::Raised(err) => assert_eq!(err.kind, ExceptionKind::UnboundLocalError),
        other => panic!("expected UnboundLocalError, got {:?}", other),
    }
}

#[test]
fn test_uncaught_exception_has_traceback() {
    let source = r#"
def divide(a, b):
    return a / b

result = divide(1, 0)
"#;
    let program = compile(source).expect("Compilation failed");
    let mut hook = |_: &mut Pause<'_>| Resume::Step;
    let mut interpreter = Interpreter::new(&program, &mut hook);

    match interpreter.run() {
        RunOutcome::Raised(err) => {
            assert_eq!(err.kind, ExceptionKind::ZeroDivisionError);
            let rendered = err.render(&program);
            assert_eq!(
                rendered,
                "Traceback (most recent call last):\n\
                 \x20 File \"<source>\", line 5, in <module>\n\
                 \x20   result = divide(1, 0)\n\
                 \x20 File \"<source>\", line 3, in divide\n\
                 \x20   return a / b\n\
                 ZeroDivisionError: division by zero"
            );
        }
        other => panic!("expected an exception, got {:?}", other),
    }
}

#[test]
fn test_abort_stops_at_boundary() {
    let program = compile("a = 1\nprint('never')\n").expect("Compilation failed");
    let mut seen = Vec::new();
    let mut hook = |pause: &mut Pause<'_>| {
        seen.push(pause.line());
        Resume::Abort
    };
    let mut interpreter = Interpreter::new(&program, &mut hook);
    let outcome = interpreter.run();
    let output = interpreter.into_output().into_transcript();

    assert!(matches!(outcome, RunOutcome::Aborted));
    assert_eq!(seen, vec![1]);
    assert_eq!(output, "");
}

#[test]
fn test_output_visible_at_pause() {
    let program = compile("print('a')\nprint('b', end='')\n").expect("Compilation failed");
    let mut outputs = Vec::new();
    let mut hook = |pause: &mut Pause<'_>| {
        outputs.push(pause.output().contents().to_string());
        Resume::Continue
    };
    let mut interpreter = Interpreter::new(&program, &mut hook);
    interpreter.run();

    assert_eq!(outputs, vec!["a\n".to_string(), "a\nb".to_string()]);
}

#[test]
fn test_syntax_error_is_reported_at_compile_time() {
    let err = compile("x = 1\nif x\n    y = 2\n").unwrap_err();
    let trace = err.trace();
    assert!(trace.contains("line 2"), "{}", trace);
    assert!(trace.ends_with(&err.to_string()), "{}", trace);
    assert!(err.to_string().starts_with("SyntaxError: "));
}

#[test]
fn test_cyclic_comparisons_raise_recursion_error() {
    let setup = "a = []\na.append(a)\nb = []\nb.append(b)\n";
    for expr in ["a == b", "a != b", "a < b", "a in [b]", "max(a, b)"] {
        let source = format!("{}x = {}\n", setup, expr);
        let (outcome, _, _) = trace(&source);
        match outcome {
            RunOutcome::Raised(err) => {
                assert_eq!(err.kind, ExceptionKind::RecursionError, "{}", expr);
                assert!(err.message.contains("in comparison"), "{}", err.message);
            }
            other => panic!("{} should raise, got {:?}", expr, other),
        }
    }

    let (outcome, _, output) = trace(&format!("{}print(a == a, a is b)\n", setup));
    assert!(matches!(outcome, RunOutcome::Completed), "{:?}", outcome);
    assert_eq!(output, "True False\n");
}

#[test]
fn test_containers_share_references() {
    let source = r#"
a = [1, 2]
b = a
b.append(3)
d = {'k': a}
d['k'][0] = 9
print(a, len(d), 'k' in d)
"#;
    let (outcome, _, output) = trace(source);
    assert!(matches!(outcome, RunOutcome::Completed), "{:?}", outcome);
    assert_eq!(output, "[9, 2, 3] 1 True\n");
}
