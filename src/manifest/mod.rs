mod schema;

pub use schema::*;

use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::paths::{GLOBAL_ARGS_KEY, GLOBAL_ENV_KEY};

/// Load a manifest from disk (JSON, or YAML for `.yaml`/`.yml` files)
pub fn load(path: &Path) -> Result<Manifest> {
    let content = fs::read_to_string(path).map_err(|source| Error::ManifestNotFound {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let document = match extension {
        "yaml" | "yml" => parse_yaml(&content),
        _ => parse_json(&content),
    };

    let manifest = document
        .and_then(from_document)
        .map_err(|reason| Error::ManifestInvalid {
            path: path.to_path_buf(),
            reason,
        })?;

    tracing::debug!(
        "Loaded {} service(s) from {}",
        manifest.services.len(),
        path.display()
    );

    Ok(manifest)
}

fn parse_json(content: &str) -> Result<Value, String> {
    serde_json::from_str(content).map_err(|e| e.to_string())
}

fn parse_yaml(content: &str) -> Result<Value, String> {
    serde_yaml::from_str(content).map_err(|e| e.to_string())
}

/// Split a parsed document into global overrides and service entries
fn from_document(document: Value) -> Result<Manifest, String> {
    let Value::Object(entries) = document else {
        return Err("top level must be a mapping of service names".into());
    };

    let mut manifest = Manifest::default();

    for (key, value) in entries {
        match key.as_str() {
            GLOBAL_ENV_KEY => {
                if !value.is_null() {
                    manifest.env = env_from_value(value)?;
                }
            }
            GLOBAL_ARGS_KEY => {
                if !value.is_null() {
                    manifest.args = args_from_value(value)?;
                }
            }
            _ => {
                if !value.is_object() {
                    return Err(format!("service {} must be a mapping", key));
                }
                let raw: RawServiceConfig = serde_json::from_value(value)
                    .map_err(|e| format!("service {}: {}", key, e))?;
                manifest.services.push((key, raw));
            }
        }
    }

    Ok(manifest)
}

/// Write a starter manifest with one empty entry per dependency listed in
/// `package_json`. An existing manifest is never overwritten.
pub fn init_from_package(package_json: &Path, manifest_path: &Path) -> Result<usize> {
    if manifest_path.exists() {
        return Err(Error::io(
            format!("refusing to overwrite {}", manifest_path.display()),
            std::io::Error::from(std::io::ErrorKind::AlreadyExists),
        ));
    }

    let content = fs::read_to_string(package_json)
        .map_err(|e| Error::io(format!("reading {}", package_json.display()), e))?;
    let package: Value = serde_json::from_str(&content).map_err(|e| Error::ManifestInvalid {
        path: package_json.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut document = Map::new();
    if let Some(Value::Object(deps)) = package.get("dependencies") {
        for name in deps.keys() {
            document.insert(name.clone(), Value::Object(Map::new()));
        }
    }
    let count = document.len();
    document.insert(GLOBAL_ENV_KEY.into(), Value::Object(Map::new()));
    document.insert(GLOBAL_ARGS_KEY.into(), Value::Array(Vec::new()));

    let mut rendered = serde_json::to_string_pretty(&Value::Object(document))
        .map_err(|e| Error::io("serializing manifest", e.into()))?;
    rendered.push('\n');
    fs::write(manifest_path, rendered)
        .map_err(|e| Error::io(format!("writing {}", manifest_path.display()), e))?;

    tracing::info!("Wrote {} with {} service(s)", manifest_path.display(), count);

    Ok(count)
}
