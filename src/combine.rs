//! Token combiner
//!
//! Expands token file globs, parses every matched file and deep-merges the
//! results into one tree. Each token is tagged with the file it came from and
//! whether that file is a source or an included base file.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::tokens::TokenGroup;
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// What a custom parser receives.
pub struct ParserInput<'a> {
    pub contents: &'a str,
    pub file_path: &'a Path,
}

pub type ParseFn = Arc<dyn Fn(&ParserInput<'_>) -> std::result::Result<Value, String> + Send + Sync>;

/// Custom parser for token files whose path matches `pattern`.
#[derive(Clone)]
pub struct Parser {
    pub pattern: Regex,
    parse: ParseFn,
}

impl Parser {
    pub fn new<F>(pattern: Regex, parse: F) -> Self
    where
        F: Fn(&ParserInput<'_>) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            pattern,
            parse: Arc::new(parse),
        }
    }

    pub fn matches(&self, path: &Path) -> bool {
        self.pattern.is_match(&path.to_string_lossy())
    }

    pub fn parse(&self, input: &ParserInput<'_>) -> std::result::Result<Value, String> {
        (self.parse)(input)
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Combine `include` files, then `source` files, then inline tokens.
pub fn combine(config: &Config, base_dir: &Path, parsers: &[Parser]) -> Result<TokenGroup> {
    let mut tree = Value::Object(Map::new());

    let included = combine_files(&config.include, base_dir, false, parsers)?;
    deep_merge(&mut tree, included)?;

    let sources = combine_files(&config.source, base_dir, true, parsers)?;
    deep_merge(&mut tree, sources)?;

    if let Some(tokens) = &config.tokens {
        deep_merge(&mut tree, tokens.clone())?;
    }

    Ok(TokenGroup::from_json(&tree))
}

/// Expand `patterns` and merge every matched file.
///
/// Matches of each pattern are merged in reverse glob order; later patterns
/// override earlier ones.
pub fn combine_files(
    patterns: &[String],
    base_dir: &Path,
    is_source: bool,
    parsers: &[Parser],
) -> Result<Value> {
    let mut files = Vec::new();
    for pattern in patterns {
        let mut matched = expand_pattern(pattern, base_dir)?;
        debug!("Pattern {} matched {} files", pattern, matched.len());
        matched.reverse();
        files.extend(matched);
    }

    let mut combined = Value::Object(Map::new());
    for path in files {
        let mut content = load_file(&path, parsers)?;
        let display = path.strip_prefix(base_dir).unwrap_or(&path);
        tag_provenance(&mut content, &display.to_string_lossy(), is_source);
        deep_merge(&mut combined, content)?;
    }
    Ok(combined)
}

fn expand_pattern(pattern: &str, base_dir: &Path) -> Result<Vec<PathBuf>> {
    let full = if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        base_dir.join(pattern).to_string_lossy().to_string()
    };

    let mut paths = Vec::new();
    for entry in glob::glob(&full)? {
        let path = entry.map_err(glob::GlobError::into_error)?;
        if path.is_file() {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// Read and parse one token file. A matching custom parser (the last
/// registered one wins) replaces the extension-based loader.
pub fn load_file(path: &Path, parsers: &[Parser]) -> Result<Value> {
    let parse_error = |message: String| Error::Parse {
        path: path.to_path_buf(),
        message,
    };
    let contents = fs::read_to_string(path).map_err(|e| parse_error(e.to_string()))?;

    if let Some(parser) = parsers.iter().rev().find(|parser| parser.matches(path)) {
        trace!("Parsing {} with custom parser {}", path.display(), parser.pattern);
        return parser
            .parse(&ParserInput {
                contents: &contents,
                file_path: path,
            })
            .map_err(parse_error);
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&contents).map_err(|e| parse_error(e.to_string())),
        Some("yaml" | "yml") => {
            serde_yaml::from_str(&contents).map_err(|e| parse_error(e.to_string()))
        }
        Some("toml") => toml::from_str(&contents).map_err(|e| parse_error(e.to_string())),
        _ => Err(parse_error("unsupported token file extension".to_string())),
    }
}

/// Tag every token object lacking provenance with `filePath` and `isSource`.
fn tag_provenance(value: &mut Value, file_path: &str, is_source: bool) {
    let Value::Object(object) = value else {
        return;
    };
    if object.contains_key("value") {
        if !object.contains_key("filePath") {
            object.insert("filePath".into(), Value::String(file_path.to_string()));
            object.insert("isSource".into(), Value::Bool(is_source));
        }
        return;
    }
    for child in object.values_mut() {
        tag_provenance(child, file_path, is_source);
    }
}

/// Deep-merge `incoming` into `target`. Objects merge key by key, scalars and
/// arrays replace each other. Merging an object with anything else fails.
pub fn deep_merge(target: &mut Value, incoming: Value) -> Result<()> {
    merge_at(target, incoming, &mut Vec::new())
}

fn merge_at(target: &mut Value, incoming: Value, path: &mut Vec<String>) -> Result<()> {
    match (target, incoming) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(slot) => {
                        path.push(key);
                        merge_at(slot, value, path)?;
                        path.pop();
                    }
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
            Ok(())
        }
        (existing, incoming) if existing.is_object() || incoming.is_object() => {
            Err(Error::MergeType {
                path: path.join("."),
                existing: type_name(existing),
                incoming: type_name(&incoming),
            })
        }
        (existing, incoming) => {
            if *existing != incoming {
                debug!("Value collision at {}: {} replaced by {}", path.join("."), existing, incoming);
            }
            *existing = incoming;
            Ok(())
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) {
        let path = dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_deep_merge_objects() {
        let mut target = json!({"color": {"red": {"value": "#f00"}}});
        deep_merge(&mut target, json!({"color": {"blue": {"value": "#00f"}, "red": {"value": "#e00"}}}))
            .unwrap();
        assert_eq!(target["color"]["red"]["value"], json!("#e00"));
        assert_eq!(target["color"]["blue"]["value"], json!("#00f"));
    }

    #[test]
    fn test_merge_type_error_names_path() {
        let mut target = json!({"color": {"red": "flat"}});
        let err = deep_merge(&mut target, json!({"color": {"red": {"value": "#f00"}}})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Merge error at 'color.red': cannot merge object into string"
        );
    }

    #[test]
    fn test_combine_tags_provenance() {
        let dir = TempDir::new().unwrap();
        write(&dir, "base/color.json", r##"{"color": {"red": {"value": "#f00"}}}"##);
        write(&dir, "tokens/color.yaml", "color:\n  blue:\n    value: \"#00f\"\n");

        let config = Config::new()
            .with_include("base/**/*.json")
            .with_source("tokens/**/*.yaml");
        let tree = combine(&config, dir.path(), &[]).unwrap();

        let red = tree.lookup(&["color", "red"]).unwrap();
        assert!(!red.is_source);
        assert_eq!(red.file_path.as_deref(), Some(Path::new("base/color.json")));

        let blue = tree.lookup(&["color", "blue"]).unwrap();
        assert!(blue.is_source);
        assert_eq!(blue.value, json!("#00f"));
    }

    #[test]
    fn test_source_overrides_include_and_inline_overrides_all() {
        let dir = TempDir::new().unwrap();
        write(&dir, "base.json", r#"{"size": {"a": {"value": 1}, "b": {"value": 1}, "c": {"value": 1}}}"#);
        write(&dir, "source.json", r#"{"size": {"b": {"value": 2}, "c": {"value": 2}}}"#);

        let config = Config::new()
            .with_include("base.json")
            .with_source("source.json")
            .with_tokens(json!({"size": {"c": {"value": 3}}}));
        let tree = combine(&config, dir.path(), &[]).unwrap();

        assert_eq!(tree.lookup(&["size", "a"]).unwrap().value, json!(1));
        assert_eq!(tree.lookup(&["size", "b"]).unwrap().value, json!(2));
        let c = tree.lookup(&["size", "c"]).unwrap();
        assert_eq!(c.value, json!(3));
        // inline tokens carry no provenance of their own
        assert_eq!(c.file_path.as_deref(), Some(Path::new("source.json")));
        assert!(c.is_source);
    }

    #[test]
    fn test_glob_matches_merge_in_reverse_order() {
        let dir = TempDir::new().unwrap();
        write(&dir, "tokens/a.json", r#"{"size": {"base": {"value": "a"}}}"#);
        write(&dir, "tokens/b.json", r#"{"size": {"base": {"value": "b"}}}"#);

        let config = Config::new().with_source("tokens/*.json");
        let tree = combine(&config, dir.path(), &[]).unwrap();
        assert_eq!(tree.lookup(&["size", "base"]).unwrap().value, json!("a"));
    }

    #[test]
    fn test_custom_parser_last_match_wins() {
        let dir = TempDir::new().unwrap();
        write(&dir, "tokens/colors.txt", "red=#f00\nblue=#00f\n");

        let generic = Parser::new(Regex::new(r"\.txt$").unwrap(), |_| Err("wrong parser".into()));
        let pairs = Parser::new(Regex::new(r"colors\.txt$").unwrap(), |input| {
            let mut colors = Map::new();
            for line in input.contents.lines() {
                let (name, value) = line.split_once('=').ok_or("missing '='")?;
                colors.insert(name.to_string(), json!({"value": value}));
            }
            Ok(json!({"color": colors}))
        });

        let config = Config::new().with_source("tokens/*.txt");
        let tree = combine(&config, dir.path(), &[generic, pairs]).unwrap();
        assert_eq!(tree.lookup(&["color", "blue"]).unwrap().value, json!("#00f"));
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "broken.json", "{ not json");

        let err = combine(&Config::new().with_source("broken.json"), dir.path(), &[]).unwrap_err();
        match err {
            Error::Parse { path, .. } => assert!(path.ends_with("broken.json")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unreadable_file_names_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("latin1.json"), [b'{', b'"', 0xE9, b'"', b':', b'1', b'}']).unwrap();

        let err = combine(&Config::new().with_source("latin1.json"), dir.path(), &[]).unwrap_err();
        match err {
            Error::Parse { path, message } => {
                assert!(path.ends_with("latin1.json"));
                assert!(message.contains("UTF-8"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(combine(&Config::new().with_source("latin1.json"), dir.path(), &[])
            .unwrap_err()
            .to_string()
            .contains("latin1.json"));
    }

    #[test]
    fn test_unmatched_pattern_is_empty() {
        let dir = TempDir::new().unwrap();
        let tree = combine(&Config::new().with_source("missing/*.json"), dir.path(), &[]).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_toml_tokens() {
        let dir = TempDir::new().unwrap();
        write(&dir, "tokens.toml", "[size.small]\nvalue = \"4px\"\n");
        let tree = combine(&Config::new().with_source("tokens.toml"), dir.path(), &[]).unwrap();
        assert_eq!(tree.lookup(&["size", "small"]).unwrap().value, json!("4px"));
    }
}
