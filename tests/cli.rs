use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn rox() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("rox"))
}

fn script(source: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", source).unwrap();
    file
}

#[test]
fn runs_file_successfully() {
    let file = script("var greeting = \"hello\";\nprint greeting + \" world\";\n");

    rox()
        .arg("run")
        .arg(file.path())
        .assert()
        .success()
        .stdout("hello world\n");
}

#[test]
fn static_error_exits_65() {
    let file = script("print 1;\nprint ;\n");

    rox()
        .arg("run")
        .arg(file.path())
        .assert()
        .code(65)
        .stdout("")
        .stderr(predicate::str::contains(
            "[line 2] Error at ';': Expected expression.",
        ));
}

#[test]
fn runtime_error_exits_70() {
    let file = script("print \"before\";\nprint -nil;\nprint \"after\";\n");

    rox()
        .arg("run")
        .arg(file.path())
        .assert()
        .code(70)
        .stdout("before\n")
        .stderr("[line 2] RuntimeError: Operand must be a number.\n");
}

#[test]
fn warnings_do_not_fail_the_run() {
    let file = script("{\n  var unused = 1;\n}\nprint \"ok\";\n");

    rox()
        .arg("run")
        .arg(file.path())
        .assert()
        .success()
        .stdout("ok\n")
        .stderr("[line 2] Warning: Variable 'unused' declared but never used.\n");
}

#[test]
fn exits_66_for_missing_file() {
    rox()
        .args(["run", "no_such_script.lox"])
        .assert()
        .code(66)
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn tokenize_prints_tokens() {
    let file = script("var x = 1.5;");

    rox()
        .arg("tokenize")
        .arg(file.path())
        .assert()
        .success()
        .stdout("VAR var null\nIDENTIFIER x null\nEQUAL = null\nNUMBER 1.5 1.5\nSEMICOLON ; null\nEOF  null\n");
}

#[test]
fn tokenize_json_emits_one_object_per_line() {
    let file = script("x");

    rox()
        .args(["tokenize", "--json"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"lexeme\":\"x\""))
        .stdout(predicate::str::contains("\"line\":1"));
}

#[test]
fn tokenize_reports_lex_errors() {
    let file = script("1 # 2");

    rox()
        .arg("tokenize")
        .arg(file.path())
        .assert()
        .code(65)
        .stdout(predicate::str::contains("NUMBER 2 2.0"))
        .stderr("[line 1] Error: Unexpected character: #\n");
}

#[test]
fn parse_prints_statements() {
    let file = script("print 1 + 2;\nvar a = \"s\";");

    rox()
        .arg("parse")
        .arg(file.path())
        .assert()
        .success()
        .stdout("(print (+ 1.0 2.0))\n(var a s)\n");
}

#[test]
fn parse_reports_errors() {
    let file = script("print (1;");

    rox()
        .arg("parse")
        .arg(file.path())
        .assert()
        .code(65)
        .stderr(predicate::str::contains("Expected ')' after expression."));
}

#[test]
fn repl_exits_on_eof() {
    // With stdin piped and empty, rustyline reports EOF straight away.
    rox().write_stdin("").assert().success();
}

#[test]
fn repl_keeps_state_between_lines() {
    rox()
        .arg("run")
        .write_stdin("var a = 1;\nfun inc() { a = a + 1; }\ninc();\nprint a;\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("2"));
}

#[test]
fn repl_continues_after_errors() {
    rox()
        .write_stdin("print ;\nprint nope;\nprint \"alive\";\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("alive"))
        .stderr(predicate::str::contains("Expected expression."))
        .stderr(predicate::str::contains("Undefined variable 'nope'."));
}

#[test]
fn log_flag_writes_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("rox.log");
    let file = script("print 1;");

    rox()
        .arg("--log")
        .arg("--log-file")
        .arg(&log)
        .arg("run")
        .arg(file.path())
        .assert()
        .success()
        .stdout("1\n");

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.contains("Logger initialized"));
}
