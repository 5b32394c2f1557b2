//! Resolution tests for the layered configuration store.
//!
//! Files go through `tempfile`; argv and environment are injected directly so
//! nothing depends on the test runner's own process state.

use std::fs;
use std::path::PathBuf;

use serde_json::{json, Value};
use tempfile::TempDir;

use super::*;

fn write_rc(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join(".leptonrc");
    fs::write(&path, contents).unwrap();
    path
}

/// Every leaf key path in a tree, `:`-joined.
fn leaf_paths(value: &Value, prefix: &str, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}:{}", prefix, key)
                };
                out.push(path.clone());
                leaf_paths(child, &path, out);
            }
        },
        _ => {},
    }
}

#[test]
fn test_every_default_key_resolves() {
    let store = ConfigResolver::new().resolve();
    let mut paths = Vec::new();
    leaf_paths(&default_config(), "", &mut paths);
    assert!(!paths.is_empty());

    for path in paths {
        assert!(store.get(&path).is_some(), "default key {} did not resolve", path);
    }
}

#[test]
fn test_defaults_stay_total_under_hostile_overlays() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_rc(&dir, r#"{ "logger": "loud", "window": { "minWidth": null } }"#);
    let store = ConfigResolver::new()
        .with_args(["--shortcuts=none", "--editor:tabSize=8"])
        .with_env([("LEPTON_PROXY", "off")])
        .with_file(file)
        .resolve();

    let mut paths = Vec::new();
    leaf_paths(&default_config(), "", &mut paths);
    for path in paths {
        assert!(store.get(&path).is_some(), "default key {} lost", path);
    }
    assert_eq!(store.get("editor:tabSize"), Some(&json!(8)));
    assert_eq!(store.get("logger:level"), Some(&json!("info")));
    assert_eq!(store.get("window:minWidth"), Some(&json!(1000)));
    assert_eq!(store.warnings().len(), 4);
}

#[test]
fn test_unknown_key_is_absent() {
    let store = ConfigResolver::new().resolve();
    assert_eq!(store.get("does:not:exist"), None);
    assert_eq!(store.get("logger:colour"), None);
    assert_eq!(store.get(""), None);
    assert_eq!(store.origin("does:not:exist"), None);
}

#[test]
fn test_keys_only_present_in_higher_layers_resolve() {
    let store = ConfigResolver::new()
        .with_args(["--experimental:sync=true"])
        .resolve();
    assert_eq!(store.get_bool("experimental:sync"), Some(true));
    assert_eq!(store.origin("experimental:sync"), Some(SourceKind::Argv));
}

#[test]
fn test_argv_beats_every_other_layer() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_rc(&dir, r#"{ "theme": "file" }"#);
    let store = ConfigResolver::new()
        .with_args(["--theme=argv"])
        .with_env([("LEPTON_THEME", "env")])
        .with_file(file)
        .resolve();

    assert_eq!(store.get_str("theme"), Some("argv"));
    assert_eq!(store.origin("theme"), Some(SourceKind::Argv));
}

/// Each pair of layers, the higher one wins.
#[test]
fn test_pairwise_precedence() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_rc(&dir, r#"{ "theme": "file" }"#);

    // argv over env
    let store = ConfigResolver::new()
        .with_args(["--theme", "argv"])
        .with_env([("LEPTON_THEME", "env")])
        .resolve();
    assert_eq!(store.get_str("theme"), Some("argv"));

    // argv over file
    let store = ConfigResolver::new()
        .with_args(["--theme=argv"])
        .with_file(&file)
        .resolve();
    assert_eq!(store.get_str("theme"), Some("argv"));

    // argv over defaults
    let store = ConfigResolver::new().with_args(["--theme=argv"]).resolve();
    assert_eq!(store.get_str("theme"), Some("argv"));

    // env over file
    let store = ConfigResolver::new()
        .with_env([("LEPTON_THEME", "env")])
        .with_file(&file)
        .resolve();
    assert_eq!(store.get_str("theme"), Some("env"));
    assert_eq!(store.origin("theme"), Some(SourceKind::Env));

    // env over defaults
    let store = ConfigResolver::new()
        .with_env([("LEPTON_THEME", "env")])
        .resolve();
    assert_eq!(store.get_str("theme"), Some("env"));

    // file over defaults
    let store = ConfigResolver::new().with_file(&file).resolve();
    assert_eq!(store.get_str("theme"), Some("file"));
    assert_eq!(store.origin("theme"), Some(SourceKind::File));

    // defaults alone
    let store = ConfigResolver::new().resolve();
    assert_eq!(store.get_str("theme"), Some("light"));
    assert_eq!(store.origin("theme"), Some(SourceKind::Defaults));
}

#[test]
fn test_nested_sections_merge_across_layers() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_rc(&dir, r#"{ "proxy": { "enable": true } }"#);
    let store = ConfigResolver::new()
        .with_env([("LEPTON_PROXY__ADDRESS", "http://corp:3128")])
        .with_file(file)
        .resolve();

    assert_eq!(store.get_bool("proxy:enable"), Some(true));
    assert_eq!(store.get_str("proxy:address"), Some("http://corp:3128"));
    assert_eq!(store.origin("proxy"), None);
}

#[test]
fn test_malformed_file_contributes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_rc(&dir, r#"{ "theme": "dark", "#);
    let store = ConfigResolver::new()
        .with_args(["--logger:level=debug"])
        .with_file(&file)
        .resolve();

    assert_eq!(store.get_str("theme"), Some("light"));
    assert_eq!(store.get_str("logger:level"), Some("debug"));
    assert_eq!(store.errors().len(), 1);
    assert!(store.errors()[0]
        .to_string()
        .contains(&file.display().to_string()));
    assert!(store.sources().iter().all(|s| s.kind != SourceKind::File));
}

#[test]
fn test_missing_file_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigResolver::new()
        .with_file(dir.path().join(".leptonrc"))
        .resolve();
    assert!(store.errors().is_empty());
    assert_eq!(store.get_str("theme"), Some("light"));
}

#[test]
fn test_log_level_parsing() {
    let store = ConfigResolver::new().resolve();
    assert_eq!(store.log_level(), LevelFilter::Info);

    let store = ConfigResolver::new()
        .with_args(["--logger:level=DEBUG"])
        .resolve();
    assert_eq!(store.log_level(), LevelFilter::Debug);

    let store = ConfigResolver::new()
        .with_args(["--logger:level=chatty"])
        .resolve();
    assert_eq!(store.log_level(), LevelFilter::Info);
}

#[test]
fn test_typed_fallback_to_defaults() {
    let store = ConfigResolver::new()
        .with_args(["--window:minWidth=wide", "--autoUpdate=maybe"])
        .resolve();
    assert_eq!(store.get_u64("window:minWidth"), None);
    assert_eq!(store.get_u32_or_default("window:minWidth"), Some(1000));
    assert_eq!(store.get_bool_or_default("autoUpdate"), Some(true));
}

#[test]
fn test_resolved_defaults_lists_every_top_level_key() {
    let store = ConfigResolver::new().with_args(["--theme=dark"]).resolve();
    let resolved = store.resolved_defaults();
    let keys: Vec<&str> = resolved.iter().map(|(k, _)| k.as_str()).collect();

    let defaults = default_config();
    for key in defaults.as_object().unwrap().keys() {
        assert!(keys.contains(&key.as_str()), "missing {}", key);
    }
    let theme = resolved.iter().find(|(k, _)| k == "theme").unwrap();
    assert_eq!(theme.1, json!("dark"));
}

#[test]
fn test_resolved_defaults_redacts_tokens() {
    let store = ConfigResolver::new()
        .with_env([("LEPTON_ENTERPRISE__TOKEN", "ghp_secret")])
        .resolve();
    assert_eq!(store.get_str("enterprise:token"), Some("ghp_secret"));

    let resolved = store.resolved_defaults();
    let enterprise = resolved.iter().find(|(k, _)| k == "enterprise").unwrap();
    assert_eq!(enterprise.1["token"], json!("***"));
}

#[test]
fn test_custom_defaults() {
    let store = ConfigResolver::new()
        .with_defaults(json!({ "a": { "b": 1 } }))
        .resolve();
    assert_eq!(store.get_u64("a:b"), Some(1));
    assert_eq!(store.get("theme"), None);
}
