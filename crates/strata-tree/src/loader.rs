//! Document loading and serialization
//!
//! Turns a single structured text document into a configuration tree. The
//! format is detected from the file extension; anything that isn't `.json`
//! or `.toml` is read as YAML. No merging or caching happens here.

use crate::error::{Error, Result};
use crate::kind::ValueKind;
use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;
use std::fs;
use std::path::Path;

/// Document formats the loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
    Toml,
}

impl Format {
    /// Detect the format from a file extension:
    /// - `.json` -> JSON
    /// - `.toml` -> TOML
    /// - anything else -> YAML
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match extension.as_str() {
            "json" => Format::Json,
            "toml" => Format::Toml,
            _ => Format::Yaml,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Yaml => "YAML",
            Format::Json => "JSON",
            Format::Toml => "TOML",
        }
    }
}

/// Load a document from disk.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the file can't be read and
/// [`Error::Parse`] if it is malformed or its top level isn't a mapping.
pub fn load(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| Error::not_found(path, e))?;
    let format = Format::from_path(path);
    tracing::debug!(path = %path.display(), format = format.name(), "Loading document");
    parse_str(&content, format, path)
}

/// Parse a document held in memory. `origin` is only used in error messages.
///
/// An empty document is an empty mapping.
pub fn parse_str(source: &str, format: Format, origin: &Path) -> Result<Value> {
    let parse_err = |message: String| Error::parse(origin, format.name(), message);

    let tree = match format {
        Format::Yaml => {
            let raw: YamlValue = serde_yaml::from_str(source).map_err(|e| parse_err(e.to_string()))?;
            yaml_to_tree(raw).map_err(parse_err)?
        }
        Format::Json => {
            if source.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(source).map_err(|e| parse_err(e.to_string()))?
            }
        }
        Format::Toml => {
            let raw: toml::Table = toml::from_str(source).map_err(|e| parse_err(e.to_string()))?;
            toml_to_tree(toml::Value::Table(raw)).map_err(parse_err)?
        }
    };

    match tree {
        Value::Object(_) => Ok(tree),
        Value::Null => Ok(Value::Object(Map::new())),
        other => Err(parse_err(format!(
            "top level must be a mapping, found a {}",
            ValueKind::of(&other)
        ))),
    }
}

/// Serialize a tree as YAML.
pub fn to_yaml_string(tree: &Value) -> Result<String> {
    serde_yaml::to_string(tree).map_err(|e| Error::Serialize {
        format: "YAML".into(),
        message: e.to_string(),
    })
}

/// Serialize a tree as pretty-printed JSON.
pub fn to_json_string_pretty(tree: &Value) -> Result<String> {
    serde_json::to_string_pretty(tree).map_err(|e| Error::Serialize {
        format: "JSON".into(),
        message: e.to_string(),
    })
}

fn yaml_to_tree(value: YamlValue) -> std::result::Result<Value, String> {
    Ok(match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                Value::Number(
                    Number::from_f64(f).ok_or_else(|| format!("non-finite number {n}"))?,
                )
            }
        }
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_tree)
                .collect::<std::result::Result<_, _>>()?,
        ),
        YamlValue::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                map.insert(yaml_key(key)?, yaml_to_tree(value)?);
            }
            Value::Object(map)
        }
        YamlValue::Tagged(tagged) => yaml_to_tree(tagged.value)?,
    })
}

/// Mapping keys must be scalars; numbers and booleans are stringified.
fn yaml_key(key: YamlValue) -> std::result::Result<String, String> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        YamlValue::Tagged(tagged) => yaml_key(tagged.value),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => {
            Err("mapping keys must be scalars".to_string())
        }
    }
}

fn toml_to_tree(value: toml::Value) -> std::result::Result<Value, String> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => {
            Value::Number(Number::from_f64(f).ok_or_else(|| format!("non-finite number {f}"))?)
        }
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(toml_to_tree)
                .collect::<std::result::Result<_, _>>()?,
        ),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| Ok((k, toml_to_tree(v)?)))
                .collect::<std::result::Result<_, String>>()?,
        ),
    })
}
