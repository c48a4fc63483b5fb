use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Environment variables, sorted so rendered scripts are stable
pub type EnvMap = BTreeMap<String, String>;

/// A parsed manifest: global overrides plus per-service entries in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    /// Global environment shared by every service
    pub env: EnvMap,

    /// Global arguments appended to every service's own arguments
    pub args: Vec<String>,

    /// Per-service entries keyed by manifest key
    pub services: Vec<(String, RawServiceConfig)>,
}

impl Manifest {
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.iter().map(|(key, _)| key.as_str())
    }
}

/// One manifest entry as written. Anything unset falls back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawServiceConfig {
    #[serde(default)]
    pub module: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub platform: Option<String>,

    #[serde(default)]
    pub sudo: Option<bool>,

    #[serde(default)]
    pub template: Option<String>,

    #[serde(default)]
    pub daemons_directory: Option<String>,

    #[serde(default)]
    pub daemon_extension: Option<String>,

    #[serde(default)]
    pub base_working_directory: Option<String>,

    #[serde(default, deserialize_with = "deserialize_env")]
    pub env: Option<EnvMap>,

    #[serde(default, deserialize_with = "deserialize_args")]
    pub args: Option<Vec<String>>,

    /// Fields this crate does not interpret, handed to the template as-is
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Stringify a scalar manifest value; `None` for arrays and objects
fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Accept scalar environment values (`"PORT": 8080`) and stringify them
pub(crate) fn env_from_value(value: Value) -> Result<EnvMap, String> {
    let Value::Object(map) = value else {
        return Err("env must be a mapping".into());
    };

    map.into_iter()
        .map(|(key, value)| match scalar_to_string(value) {
            Some(value) => Ok((key, value)),
            None => Err(format!("env value for {} must be a scalar", key)),
        })
        .collect()
}

/// Accept scalar arguments (`["--port", 8080]`) and stringify them
pub(crate) fn args_from_value(value: Value) -> Result<Vec<String>, String> {
    let Value::Array(items) = value else {
        return Err("args must be a list".into());
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            scalar_to_string(item).ok_or_else(|| format!("args[{}] must be a scalar", i))
        })
        .collect()
}

fn deserialize_env<'de, D>(deserializer: D) -> Result<Option<EnvMap>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => env_from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn deserialize_args<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => args_from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_entry_is_all_unset() {
        let raw: RawServiceConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(raw, RawServiceConfig::default());
    }

    #[test]
    fn camel_case_fields() {
        let raw: RawServiceConfig = serde_json::from_value(json!({
            "daemonsDirectory": "/etc/init",
            "daemonExtension": ".conf",
            "baseWorkingDirectory": "/srv/app",
            "sudo": true
        }))
        .unwrap();
        assert_eq!(raw.daemons_directory.as_deref(), Some("/etc/init"));
        assert_eq!(raw.daemon_extension.as_deref(), Some(".conf"));
        assert_eq!(raw.base_working_directory.as_deref(), Some("/srv/app"));
        assert_eq!(raw.sudo, Some(true));
        assert!(raw.extra.is_empty());
    }

    #[test]
    fn unknown_fields_pass_through() {
        let raw: RawServiceConfig = serde_json::from_value(json!({
            "description": "web frontend",
            "bin": "./bin/server.js"
        }))
        .unwrap();
        assert_eq!(raw.extra["description"], json!("web frontend"));
        assert_eq!(raw.extra["bin"], json!("./bin/server.js"));
    }

    #[test]
    fn scalar_env_values_are_stringified() {
        let env = env_from_value(json!({"PORT": 8080, "DEBUG": true, "NAME": "web"})).unwrap();
        assert_eq!(env["PORT"], "8080");
        assert_eq!(env["DEBUG"], "true");
        assert_eq!(env["NAME"], "web");
    }

    #[test]
    fn nested_env_values_are_rejected() {
        assert!(env_from_value(json!({"A": {"B": 1}})).is_err());
        assert!(env_from_value(json!(["A"])).is_err());
    }

    #[test]
    fn scalar_args_are_stringified() {
        let raw: RawServiceConfig =
            serde_json::from_value(json!({"args": ["--port", 80, true]})).unwrap();
        assert_eq!(
            raw.args,
            Some(vec!["--port".to_string(), "80".to_string(), "true".to_string()])
        );
    }

    #[test]
    fn nested_args_are_rejected() {
        assert!(args_from_value(json!([["--port"]])).is_err());
        assert!(args_from_value(json!([{"port": 80}])).is_err());
        assert!(args_from_value(json!("--port")).is_err());
    }
}
