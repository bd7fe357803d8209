use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn write_source(dir: &TempDir, name: &str, source: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, source).unwrap();
    path
}

fn yaplc(args: &[&str], file: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_yaplc"))
        .arg("--no-color")
        .args(args)
        .arg(file)
        .output()
        .expect("Failed to execute yaplc")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

const WELL_TYPED: &str = r#"
class Main inherits IO {
    count : Int <- 0;
    ready : Boolean;
    step() : Int { count <- 1 };
    check() : Boolean { not ready };
};
"#;

const TYPE_ERROR: &str = r#"
class A {
    x : Int;
    f() : Int { x <- "hello" };
};
"#;

const SYNTAX_ERROR: &str = r#"
class A {
    x : Int
};
"#;

#[test]
fn test_check_clean_program() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "main.yapl", WELL_TYPED);

    let output = yaplc(&["check", "--plain"], &file);

    assert!(output.status.success(), "yaplc check failed: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("No errors found"));
}

#[test]
fn test_type_errors_do_not_fail_by_default() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "types.yapl", TYPE_ERROR);

    let output = yaplc(&["check", "--plain"], &file);
    let out = stdout(&output);

    assert!(output.status.success());
    assert!(out.contains("type error: expected 'Int' but found 'String'"), "got: {}", out);
    assert!(out.contains("0 syntax error(s), 1 type error(s)"), "got: {}", out);
}

#[test]
fn test_deny_type_errors() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "types.yapl", TYPE_ERROR);

    let output = yaplc(&["check", "--plain", "--deny-type-errors"], &file);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_rich_reports_go_to_stderr() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "types.yapl", TYPE_ERROR);

    let output = yaplc(&["check"], &file);
    let err = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success());
    assert!(err.contains("Type mismatch"), "got: {}", err);
    assert!(err.contains("expected 'Int' but found 'String'"), "got: {}", err);
}

#[test]
fn test_syntax_errors_fail_check() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "broken.yapl", SYNTAX_ERROR);

    let output = yaplc(&["check", "--plain"], &file);
    let out = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(
        out.contains("syntax error at line 4, column 0: expected ';' after feature, found '}'"),
        "got: {}",
        out
    );
}

#[test]
fn test_propagate_types_flag() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "sum.yapl", "total : Int;\nf() : Int { total <- 1 + 2 };\n");

    let strict = yaplc(&["check", "--plain"], &file);
    assert!(stdout(&strict).contains("expected 'Int' but found '<unknown>'"));

    let propagated = yaplc(&["check", "--plain", "--propagate-types"], &file);
    assert!(stdout(&propagated).contains("No errors found"));
}

#[test]
fn test_check_initializers_flag() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "init.yapl", "class A { x : Int <- \"one\"; };\n");

    let default = yaplc(&["check", "--plain"], &file);
    assert!(stdout(&default).contains("No errors found"));

    let checked = yaplc(&["check", "--plain", "--check-initializers"], &file);
    let out = stdout(&checked);
    assert!(out.contains("type error: expected 'Int' but found 'String'"), "got: {}", out);
}

#[test]
fn test_tree_prints_textual_form_and_dot() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "tree.yapl", "x : Int <- 1 + 2;\n");
    let dot = dir.path().join("tree.dot");

    let output = yaplc(&["tree", "--dot", dot.to_str().unwrap()], &file);

    assert!(output.status.success());
    assert!(stdout(&output).contains("(program (attribute x Int (+ 1 2)))"));
    let graph = fs::read_to_string(&dot).unwrap();
    assert!(graph.starts_with("digraph \"syntax tree\" {"));
    assert!(graph.contains("[label=\"+\"]"));
}

#[test]
fn test_tree_is_skipped_after_syntax_errors() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "broken.yapl", SYNTAX_ERROR);
    let dot = dir.path().join("tree.dot");

    let output = yaplc(&["tree", "--dot", dot.to_str().unwrap()], &file);
    let out = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(out.contains("errors were found during analysis; no tree will be generated"));
    assert!(!out.contains("(program"));
    assert!(!dot.exists());
}

#[test]
fn test_symbols_listing() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "symbols.yapl", r#"
class B { z : String; };
class A { y : Int; x : Boolean; };
flag : Boolean;
"#);

    let output = yaplc(&["symbols"], &file);

    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "class A\n  x : Boolean\n  y : Int\nclass B\n  z : String\ntop level\n  flag : Boolean\n"
    );
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.yapl");

    let output = yaplc(&["check"], &missing);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("File not found"));
}

#[test]
fn test_wrong_extension() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "main.txt", WELL_TYPED);

    let output = yaplc(&["check"], &file);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("must have .yapl extension"));
}
