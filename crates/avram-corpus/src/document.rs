//! # Document Loading
//!
//! Reads JSON and YAML files into [`serde_json::Value`] with key order
//! preserved. YAML goes through an explicit conversion so that mapping keys
//! are checked: JSON object keys are strings, and an unquoted YAML key such
//! as `041` or `yes` has already been resolved to a number or boolean by the
//! time it reaches us, with its spelling lost. Such keys are rejected, and
//! field tags must be quoted (`"041":`).

use std::path::Path;

use serde_json::Value;

use crate::error::CorpusError;

/// Load a `.json`, `.yaml` or `.yml` file.
pub fn load_document(path: &Path) -> Result<Value, CorpusError> {
    let content = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&content).map_err(|e| e.to_string()),
        Some("yaml") | Some("yml") => parse_yaml(&content),
        _ => {
            return Err(CorpusError::UnsupportedExtension {
                path: path.to_path_buf(),
            })
        }
    };
    tracing::debug!(path = %path.display(), "loaded document");
    parsed.map_err(|reason| CorpusError::Parse {
        path: path.to_path_buf(),
        reason,
    })
}

/// Parse YAML text into a JSON value.
pub fn parse_yaml(content: &str) -> Result<Value, String> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
    yaml_to_json_value(&yaml)
}

/// Returns true for file names the loader understands.
pub(crate) fn is_document(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("json") | Some("yaml") | Some("yml")
    )
}

/// Convert a YAML value to JSON. Mapping keys must be strings.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent {n} in JSON"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => {
                        return Err(format!("mapping key {n} must be quoted to be read as a string"))
                    }
                    serde_yaml::Value::Bool(b) => {
                        return Err(format!("mapping key {b} must be quoted to be read as a string"))
                    }
                    other => return Err(format!("unsupported mapping key: {other:?}")),
                };
                object.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
