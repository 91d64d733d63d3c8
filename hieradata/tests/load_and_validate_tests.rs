//! Integration tests for loading a hieradata tree and validating it.

use std::fs;
use std::path::Path;

use hieradata::{
    DocumentStore, LoadErrorKind, LoadOptions, RuleOutcome, RuleSet, SourceId, StoreConfig,
    ValidateError, ValueKind, check,
};
use regex::Regex;
use serde_json::{Value, json};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn valid_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "valid.yaml", "string-value: a string\nport: 8080\n");
    write(tmp.path(), "sub/nested.yaml", "nested: true\n");
    write(tmp.path(), "other.foo", "other: value\n");
    write(tmp.path(), "notes.txt", "not: loaded\n");
    tmp
}

fn load(root: &Path, options: LoadOptions) -> DocumentStore {
    let mut store = DocumentStore::new(StoreConfig::new(root)).unwrap();
    store.load(options);
    store
}

fn ids(store: &DocumentStore) -> Vec<&str> {
    store.data().keys().map(SourceId::as_str).collect()
}

fn pass(_: &Value) -> Result<(), hieradata::CheckFailure> {
    Ok(())
}

#[test]
fn test_well_formed_tree_loads_cleanly() {
    let tmp = valid_tree();
    let store = load(tmp.path(), LoadOptions::default());

    assert!(store.load_errors().is_empty(), "{:?}", store.load_errors());
    assert_eq!(ids(&store), vec!["sub/nested.yaml", "valid.yaml"]);
    assert_eq!(
        store.data()[&SourceId::from("valid.yaml")]["string-value"],
        json!("a string")
    );
}

#[test]
fn test_extra_extensions() {
    let tmp = valid_tree();
    let config = StoreConfig::new(tmp.path()).with_extensions(["yaml", "foo"]);
    let mut store = DocumentStore::new(config).unwrap();
    store.load(LoadOptions::default());

    assert_eq!(store.extensions().to_vec(), vec![".yaml".to_owned(), ".foo".to_owned()]);
    assert_eq!(ids(&store), vec!["other.foo", "sub/nested.yaml", "valid.yaml"]);
}

#[test]
fn test_same_stem_different_extension_do_not_collide() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "common.yaml", "a: 1\n");
    write(tmp.path(), "common.yml", "a: 2\n");
    write(tmp.path(), "x/common.yaml", "a: 3\n");
    let store = load(tmp.path(), LoadOptions::default());

    assert_eq!(ids(&store), vec!["common.yaml", "common.yml", "x/common.yaml"]);
}

#[test]
fn test_empty_extension_list_rejected() {
    let config = StoreConfig::new("meh").with_extensions(Vec::<String>::new());
    let err = DocumentStore::new(config).unwrap_err();
    assert!(matches!(err, ValidateError::InvalidArgument(_)));
}

#[test]
fn test_parse_failure_is_one_diagnostic_and_absent_from_data() {
    let tmp = valid_tree();
    write(tmp.path(), "invalid.yaml", "key: [unclosed\nother: : :\n");
    let store = load(tmp.path(), LoadOptions::default());

    assert_eq!(store.load_errors().len(), 1);
    let err = &store.load_errors()[0];
    assert_eq!(err.kind, LoadErrorKind::ParseError);
    let msg = err.to_string();
    assert!(msg.starts_with("Error in file "), "got: {msg}");
    assert!(msg.contains("invalid.yaml"), "got: {msg}");
    assert!(!store.data().contains_key(&SourceId::from("invalid.yaml")));
    // Other files still load.
    assert_eq!(ids(&store), vec!["sub/nested.yaml", "valid.yaml"]);
}

#[test]
fn test_empty_file_is_reported_unless_ignored() {
    let tmp = valid_tree();
    write(tmp.path(), "empty.yaml", "");

    let store = load(tmp.path(), LoadOptions::default());
    assert_eq!(store.load_errors().len(), 1);
    let msg = store.load_errors()[0].to_string();
    assert!(msg.starts_with("Yaml file is empty: "), "got: {msg}");
    assert!(msg.ends_with("empty.yaml"), "got: {msg}");

    let store = load(tmp.path(), LoadOptions::ignore_empty());
    assert!(store.load_errors().is_empty());
    assert!(!store.data().contains_key(&SourceId::from("empty.yaml")));
}

#[test]
fn test_reload_replaces_state() {
    let tmp = valid_tree();
    write(tmp.path(), "broken.yaml", "a: [\n");
    let mut store = DocumentStore::new(StoreConfig::new(tmp.path())).unwrap();
    store.load(LoadOptions::default());
    assert_eq!(store.load_errors().len(), 1);

    fs::remove_file(tmp.path().join("broken.yaml")).unwrap();
    store.load(LoadOptions::default());
    assert!(store.load_errors().is_empty());
    assert_eq!(store.data().len(), 2);
}

#[test]
#[allow(deprecated)]
fn test_load_strict_fails_with_first_diagnostic() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "empty.yaml", "");
    let mut store = DocumentStore::new(StoreConfig::new(tmp.path())).unwrap();

    let err = store.load_strict(false).unwrap_err();
    assert!(err.to_string().contains("Yaml file is empty"), "got: {err}");

    assert!(store.load_strict(true).is_ok());
}

#[test]
fn test_validate_refuses_while_load_errors_exist() {
    let tmp = valid_tree();
    write(tmp.path(), "invalid.yaml", "key: [unclosed\n");
    let store = load(tmp.path(), LoadOptions::default());

    let err = store.validate("port", &[], pass).unwrap_err();
    assert!(matches!(err, ValidateError::DataIntegrity { .. }));
    assert!(err.to_string().contains("invalid.yaml"));
}

#[test]
fn test_validate_before_load_reports_no_data() {
    let tmp = valid_tree();
    let store = DocumentStore::new(StoreConfig::new(tmp.path())).unwrap();
    let err = store.validate("port", &[], pass).unwrap_err();
    assert!(matches!(err, ValidateError::NoData));
}

#[test]
fn test_key_present_everywhere_passes() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.yaml", "host: a.example.com\n");
    write(tmp.path(), "b.yaml", "host: b.example.com\n");
    let store = load(tmp.path(), LoadOptions::default());

    store
        .validate("host", &[], check::is_kind(ValueKind::String))
        .unwrap();
}

#[test]
fn test_failure_names_only_the_failing_source() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.yaml", "port: http\n");
    write(tmp.path(), "b.yaml", "other: 1\n");
    let store = load(tmp.path(), LoadOptions::default());

    let err = store
        .validate("port", &[], check::is_kind(ValueKind::Integer))
        .unwrap_err();
    let msg = err.to_string();
    assert!(matches!(err, ValidateError::Validation { .. }));
    assert!(msg.contains("port"), "got: {msg}");
    assert!(msg.contains("a.yaml"), "got: {msg}");
    assert!(!msg.contains("b.yaml"), "got: {msg}");
}

#[test]
fn test_required_source_without_key_fails_even_when_found_elsewhere() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "web.yaml", "host: web.example.com\n");
    write(tmp.path(), "db.yaml", "port: 5432\n");
    let store = load(tmp.path(), LoadOptions::default());

    let err = store
        .validate("host", &[SourceId::from("db.yaml")], pass)
        .unwrap_err();
    match &err {
        ValidateError::RequiredSourcesUnsatisfied { missing, .. } => {
            assert_eq!(missing, &vec![SourceId::from("db.yaml")]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("db.yaml"));
}

#[test]
fn test_two_source_scenario() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.yaml", "env: prod\n");
    write(tmp.path(), "b.yaml", "env: dev\nregion: eu\n");
    let store = load(tmp.path(), LoadOptions::default());
    let a = SourceId::from("a.yaml");

    store
        .validate("env", &[], check::is_kind(ValueKind::String))
        .unwrap();

    let err = store.validate("region", &[a], pass).unwrap_err();
    assert!(matches!(
        err,
        ValidateError::RequiredSourcesUnsatisfied { ref missing, .. } if missing == &vec![SourceId::from("a.yaml")]
    ));

    store
        .validate(Regex::new("^reg").unwrap(), &[], pass)
        .unwrap();
}

#[test]
fn test_pattern_matching_nothing() {
    let tmp = valid_tree();
    let store = load(tmp.path(), LoadOptions::default());
    let err = store
        .validate(Regex::new("^nothing").unwrap(), &[], pass)
        .unwrap_err();
    assert!(matches!(err, ValidateError::NoMatch { .. }));
    assert!(err.to_string().contains("/^nothing/"));
}

#[test]
fn test_rule_file_against_loaded_tree() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "data/common.yaml", "ntp::servers: [0.pool.ntp.org]\nenv: prod\n");
    write(tmp.path(), "data/nodes/web.yaml", "env: staging\n");
    write(
        tmp.path(),
        "rules.yaml",
        r"
rules:
  - key: ntp::servers
    required_sources: [common.yaml]
    expect:
      - type: array
      - non_empty: true
  - key: env
    expect:
      - one_of: [prod, dev]
",
    );

    let store = load(&tmp.path().join("data"), LoadOptions::default());
    let rules = RuleSet::from_file(&tmp.path().join("rules.yaml")).unwrap();
    let report = rules.run(store.dataset()).unwrap();

    assert!(!report.ok);
    assert_eq!(report.sources_loaded, 2);
    assert_eq!(report.rule_results[0].outcome, RuleOutcome::Passed);
    match &report.rule_results[1].outcome {
        RuleOutcome::Failed(msg) => assert!(msg.contains("env is invalid in nodes/web.yaml")),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn test_symlink_escaping_root_blocks_validation() {
    let outside = TempDir::new().unwrap();
    write(outside.path(), "secret.yaml", "host: leaked.example.com\n");

    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "common.yaml", "host: db.example.com\n");
    std::os::unix::fs::symlink(outside.path().join("secret.yaml"), tmp.path().join("link.yaml"))
        .unwrap();
    let store = load(tmp.path(), LoadOptions::default());

    assert_eq!(store.load_errors().len(), 1, "{:?}", store.load_errors());
    assert_eq!(store.load_errors()[0].kind, LoadErrorKind::OutsideRoot);
    assert_eq!(ids(&store), vec!["common.yaml"]);

    let err = store.validate("host", &[], pass).unwrap_err();
    assert!(matches!(err, ValidateError::DataIntegrity { .. }));
    assert!(err.to_string().contains("link.yaml"), "got: {err}");
}

// Non-UTF-8 file names are rejected by some filesystems (APFS), so this runs on Linux only.
#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_file_names_are_diagnostics_not_collisions() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "common.yaml", "a: 0\n");
    fs::write(tmp.path().join(OsStr::from_bytes(b"\xff.yaml")), "a: 1\n").unwrap();
    fs::write(tmp.path().join(OsStr::from_bytes(b"\xfe.yaml")), "a: 2\n").unwrap();
    let store = load(tmp.path(), LoadOptions::default());

    assert_eq!(ids(&store), vec!["common.yaml"]);
    assert_eq!(store.load_errors().len(), 2, "{:?}", store.load_errors());
    assert!(
        store
            .load_errors()
            .iter()
            .all(|e| e.kind == LoadErrorKind::InvalidEncoding)
    );
}
