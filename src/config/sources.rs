//! Parsers that turn raw process inputs into nested value trees.
//!
//! Each parser produces a `serde_json` object keyed the same way as the
//! defaults tree, so merging is a plain recursive overlay.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::{Map, Number, Value};

use crate::error::{LeptonError, LeptonResult};

/// Separator between segments of a key path (`logger:level`).
pub const KEY_SEPARATOR: char = ':';

/// Only environment variables with this prefix are configuration.
pub const ENV_PREFIX: &str = "LEPTON_";

/// Separates nested segments inside an environment variable name.
const ENV_SEGMENT_SEPARATOR: &str = "__";

/// Prefixed variables that mean something else and never enter the store.
const RESERVED_ENV: &[&str] = &["LEPTON_LOG"];

/// Type a raw string from argv or the environment.
pub fn parse_scalar(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {},
    }

    if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }

    if let Ok(float) = raw.parse::<f64>() {
        if let Some(number) = Number::from_f64(float) {
            return Value::Number(number);
        }
    }

    Value::String(raw.to_string())
}

/// Insert `value` at a `:`-separated path, creating intermediate objects.
///
/// Returns false when the path has no usable segment.
pub fn insert_path(tree: &mut Map<String, Value>, path: &str, value: Value) -> bool {
    let segments: Vec<&str> = path
        .split(KEY_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let Some((last, parents)) = segments.split_last() else {
        return false;
    };

    let mut node = tree;
    for segment in parents {
        let entry = node
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(map) = entry else {
            return false;
        };
        node = map;
    }
    node.insert(last.to_string(), value);
    true
}

/// Walk a `:`-separated path through a value tree.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    path.split(KEY_SEPARATOR)
        .try_fold(root, |node, segment| node.as_object()?.get(segment))
}

/// Parse command-line arguments (program name already stripped).
///
/// Accepted forms: `--key:path=value`, `--key:path value`, `--flag` (true)
/// and `--no-flag` (false). A lone `--` ends option parsing.
pub fn parse_args<I, S>(args: I) -> Map<String, Value>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let tokens: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
    let mut tree = Map::new();
    let mut index = 0;

    while index < tokens.len() {
        let token = &tokens[index];
        index += 1;

        let Some(body) = token.strip_prefix("--") else {
            continue;
        };
        if body.is_empty() {
            break;
        }

        if let Some((key, raw)) = body.split_once('=') {
            insert_path(&mut tree, key, parse_scalar(raw));
            continue;
        }

        if let Some(key) = body.strip_prefix("no-") {
            insert_path(&mut tree, key, Value::Bool(false));
            continue;
        }

        match tokens.get(index) {
            Some(next) if is_option_value(next) => {
                insert_path(&mut tree, body, parse_scalar(next));
                index += 1;
            },
            _ => {
                insert_path(&mut tree, body, Value::Bool(true));
            },
        }
    }

    tree
}

fn is_option_value(token: &str) -> bool {
    !token.starts_with('-') || token.parse::<f64>().is_ok()
}

/// Parse `LEPTON_`-prefixed environment variables.
///
/// `LEPTON_LOGGER__LEVEL=debug` becomes `logger:level = "debug"`. Segment
/// names are matched case-insensitively against `defaults` so camelCase keys
/// like `autoUpdate` are reachable from upper-case variable names.
pub fn parse_env<I, K, V>(vars: I, defaults: &Value) -> Map<String, Value>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut tree = Map::new();

    for (name, raw) in vars {
        let name = name.as_ref();
        if RESERVED_ENV.contains(&name) {
            continue;
        }
        let Some(rest) = name.strip_prefix(ENV_PREFIX) else {
            continue;
        };

        let segments: Vec<&str> = rest.split(ENV_SEGMENT_SEPARATOR).collect();
        if segments.iter().any(|s| s.is_empty()) {
            continue;
        }

        let path = canonical_path(&segments, defaults);
        insert_path(&mut tree, &path, parse_scalar(raw.as_ref()));
    }

    tree
}

fn canonical_path(segments: &[&str], defaults: &Value) -> String {
    let mut node = Some(defaults);
    let mut resolved = Vec::with_capacity(segments.len());

    for segment in segments {
        let matched = node
            .and_then(Value::as_object)
            .and_then(|map| map.iter().find(|(key, _)| key.eq_ignore_ascii_case(segment)));
        match matched {
            Some((key, child)) => {
                resolved.push(key.clone());
                node = Some(child);
            },
            None => {
                resolved.push(segment.to_ascii_lowercase());
                node = None;
            },
        }
    }

    resolved.join(&KEY_SEPARATOR.to_string())
}

/// Read the user configuration file.
///
/// `Ok(None)` means the file does not exist. An empty file is an empty
/// object. Anything that is not a JSON object is a `ConfigSource` error.
pub fn read_config_file(path: &Path) -> LeptonResult<Option<Map<String, Value>>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(LeptonError::ConfigSource {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        },
    };

    if raw.trim().is_empty() {
        return Ok(Some(Map::new()));
    }

    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(other) => Err(LeptonError::ConfigSource {
            path: path.to_path_buf(),
            reason: format!("expected an object at the top level, found {}", kind_name(&other)),
        }),
        Err(e) => Err(LeptonError::ConfigSource {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_scalar_types() {
        assert_eq!(parse_scalar("true"), json!(true));
        assert_eq!(parse_scalar("false"), json!(false));
        assert_eq!(parse_scalar("42"), json!(42));
        assert_eq!(parse_scalar("-3"), json!(-3));
        assert_eq!(parse_scalar("1.5"), json!(1.5));
        assert_eq!(parse_scalar("debug"), json!("debug"));
        assert_eq!(parse_scalar("NaN"), json!("NaN"));
        assert_eq!(parse_scalar("True"), json!("True"));
    }

    #[test]
    fn test_args_forms() {
        let tree = parse_args([
            "--logger:level=debug",
            "--theme",
            "dark",
            "--autoUpdate",
            "--no-snippet:expanded",
            "positional",
            "--window:minWidth",
            "900",
        ]);
        let tree = Value::Object(tree);
        assert_eq!(lookup(&tree, "logger:level"), Some(&json!("debug")));
        assert_eq!(lookup(&tree, "theme"), Some(&json!("dark")));
        assert_eq!(lookup(&tree, "autoUpdate"), Some(&json!(true)));
        assert_eq!(lookup(&tree, "snippet:expanded"), Some(&json!(false)));
        assert_eq!(lookup(&tree, "window:minWidth"), Some(&json!(900)));
        assert_eq!(lookup(&tree, "positional"), None);
    }

    #[test]
    fn test_args_flag_before_flag_is_true() {
        let tree = Value::Object(parse_args(["--autoUpdate", "--theme=dark"]));
        assert_eq!(lookup(&tree, "autoUpdate"), Some(&json!(true)));
        assert_eq!(lookup(&tree, "theme"), Some(&json!("dark")));
    }

    #[test]
    fn test_args_negative_number_is_a_value() {
        let tree = Value::Object(parse_args(["--offset", "-5"]));
        assert_eq!(lookup(&tree, "offset"), Some(&json!(-5)));
    }

    #[test]
    fn test_args_double_dash_stops_parsing() {
        let tree = Value::Object(parse_args(["--theme=dark", "--", "--theme=light"]));
        assert_eq!(lookup(&tree, "theme"), Some(&json!("dark")));
    }

    #[test]
    fn test_args_ignore_single_dash_tokens() {
        let tree = parse_args(["-psn_0_12345"]);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_env_prefix_and_nesting() {
        let defaults = json!({ "logger": { "level": "info" }, "autoUpdate": true });
        let tree = Value::Object(parse_env(
            [
                ("LEPTON_LOGGER__LEVEL", "debug"),
                ("LEPTON_AUTOUPDATE", "false"),
                ("LEPTON_CUSTOM__KEY", "x"),
                ("LEPTON_LOG", "trace"),
                ("HOME", "/home/me"),
                ("LEPTON_BROKEN____KEY", "ignored"),
            ],
            &defaults,
        ));
        assert_eq!(lookup(&tree, "logger:level"), Some(&json!("debug")));
        assert_eq!(lookup(&tree, "autoUpdate"), Some(&json!(false)));
        assert_eq!(lookup(&tree, "custom:key"), Some(&json!("x")));
        assert_eq!(lookup(&tree, "log"), None);
        assert_eq!(lookup(&tree, "HOME"), None);
        assert_eq!(lookup(&tree, "broken"), None);
    }

    #[test]
    fn test_insert_path_replaces_scalar_parent() {
        let mut tree = Map::new();
        insert_path(&mut tree, "theme", json!("dark"));
        insert_path(&mut tree, "theme:accent", json!("blue"));
        assert_eq!(Value::Object(tree), json!({ "theme": { "accent": "blue" } }));
    }

    #[test]
    fn test_insert_path_rejects_empty_path() {
        let mut tree = Map::new();
        assert!(!insert_path(&mut tree, ":::", json!(1)));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_lookup_missing_and_empty() {
        let tree = json!({ "a": { "b": 1 } });
        assert_eq!(lookup(&tree, "a:b"), Some(&json!(1)));
        assert_eq!(lookup(&tree, "a:c"), None);
        assert_eq!(lookup(&tree, "a:b:c"), None);
        assert_eq!(lookup(&tree, ""), None);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_config_file(&dir.path().join(".leptonrc")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_read_empty_file_is_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".leptonrc");
        fs::write(&path, "  \n").unwrap();
        assert_eq!(read_config_file(&path).unwrap(), Some(Map::new()));
    }

    #[test]
    fn test_read_malformed_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".leptonrc");
        fs::write(&path, "{ \"theme\": ").unwrap();
        let err = read_config_file(&path).unwrap_err();
        assert!(matches!(err, LeptonError::ConfigSource { .. }));
        assert!(err.to_string().contains(".leptonrc"));
    }

    #[test]
    fn test_read_non_object_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".leptonrc");
        fs::write(&path, "[1, 2]").unwrap();
        let err = read_config_file(&path).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }
}
