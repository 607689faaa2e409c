//! Integration tests for file loading and include resolution.

use beanbook_core::Directive;
use beanbook_loader::{load, LoadError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn narrations(directives: &[Directive]) -> Vec<&str> {
    directives
        .iter()
        .filter_map(|d| match d {
            Directive::Transaction(t) => Some(t.narration.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_load_single_file() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "main.bean",
        "2024-01-01 open Assets:Bank\n2024-01-02 * \"deposit\"\n  Assets:Bank 10 USD\n  Income:Job\n",
    );

    let result = load(&dir.path().join("main.bean")).unwrap();
    assert!(result.errors.is_empty());
    assert_eq!(result.directives.len(), 2);
    assert_eq!(result.directives[0].type_name(), "open");
}

#[test]
fn test_include_is_depth_first() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "main.bean",
        "2024-01-01 * \"first\"\ninclude \"other.bean\"\n2024-01-01 * \"third\"\n",
    );
    write(dir.path(), "other.bean", "2024-01-01 * \"second\"\n");

    let result = load(&dir.path().join("main.bean")).unwrap();
    assert!(result.errors.is_empty());
    // Same date, same priority: the stable sort preserves the depth-first
    // load order.
    assert_eq!(narrations(&result.directives), ["first", "second", "third"]);
}

#[test]
fn test_include_in_subdirectory_resolves_relative() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    write(dir.path(), "main.bean", "include \"sub/accounts.bean\"\n");
    write(
        &dir.path().join("sub"),
        "accounts.bean",
        "2024-01-01 open Assets:Bank\n",
    );

    let result = load(&dir.path().join("main.bean")).unwrap();
    assert!(result.errors.is_empty());
    assert_eq!(result.directives.len(), 1);
}

#[test]
fn test_directives_sorted_across_files() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "main.bean",
        "2024-03-01 * \"late\"\ninclude \"early.bean\"\n",
    );
    write(dir.path(), "early.bean", "2024-01-01 * \"early\"\n");

    let result = load(&dir.path().join("main.bean")).unwrap();
    assert_eq!(narrations(&result.directives), ["early", "late"]);
}

#[test]
fn test_missing_include_is_collected_not_fatal() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "main.bean",
        "include \"missing.bean\"\n2024-01-01 open Assets:Bank\n",
    );

    let result = load(&dir.path().join("main.bean")).unwrap();
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(result.errors[0], LoadError::Io { .. }));
    assert_eq!(result.directives.len(), 1);
}

#[test]
fn test_include_cycle_is_detected() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.bean", "include \"b.bean\"\n");
    write(dir.path(), "b.bean", "include \"a.bean\"\n");

    let result = load(&dir.path().join("a.bean")).unwrap();
    assert!(result
        .errors
        .iter()
        .any(|e| matches!(e, LoadError::IncludeCycle { .. })));
}

#[test]
fn test_options_collected_from_includes() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "main.bean",
        "option \"operating_currency\" \"EUR\"\ninclude \"other.bean\"\n",
    );
    write(
        dir.path(),
        "other.bean",
        "option \"operating_currency\" \"USD\"\n",
    );

    let result = load(&dir.path().join("main.bean")).unwrap();
    assert_eq!(result.options.operating_currency, vec!["EUR", "USD"]);
}

#[test]
fn test_parse_errors_carry_their_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "main.bean", "include \"bad.bean\"\n");
    write(dir.path(), "bad.bean", "2024-01-01 balance Assets:Bank oops USD\n");

    let result = load(&dir.path().join("main.bean")).unwrap();
    assert_eq!(result.errors.len(), 1);
    match &result.errors[0] {
        LoadError::Parse(err) => {
            assert!(err.file.ends_with("bad.bean"));
            assert_eq!(err.line, 1);
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_missing_root_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let err = load(&dir.path().join("nope.bean")).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}
