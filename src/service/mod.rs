//! Service descriptors
//!
//! A [`Service`] is one manifest entry merged over the process defaults, with
//! its filesystem locations derived on demand so they always track the
//! current field values.

mod command;
mod script;

pub use command::{build_command, Verb};

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cmd;
use crate::config::Defaults;
use crate::error::Result;
use crate::manifest::{EnvMap, RawServiceConfig};
use crate::paths::{self, LOGS_DIR, MODULES_DIR};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub name: String,
    pub module: String,
    pub platform: String,
    pub sudo: bool,
    pub template: String,
    pub daemons_directory: String,
    pub daemon_extension: String,
    pub base_working_directory: PathBuf,
    pub env: EnvMap,
    pub args: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Service {
    /// Merge one manifest entry over `defaults`.
    ///
    /// Precedence, lowest first: defaults, `{name: key, module: key}`, the
    /// entry's own fields. The entry's `env` is layered over `global_env` and
    /// its `args` come before `global_args`. A relative `baseWorkingDirectory`
    /// in the entry is joined onto the default base directory, not the
    /// current directory.
    pub fn build(
        defaults: &Defaults,
        key: &str,
        raw: RawServiceConfig,
        global_env: &EnvMap,
        global_args: &[String],
    ) -> Self {
        let mut env = global_env.clone();
        env.extend(raw.env.unwrap_or_default());

        let mut args = raw.args.unwrap_or_default();
        args.extend(global_args.iter().cloned());

        let base_working_directory = match raw.base_working_directory {
            Some(dir) => defaults.base_working_directory.join(dir),
            None => defaults.base_working_directory.clone(),
        };

        let service = Self {
            name: raw.name.unwrap_or_else(|| key.to_string()),
            module: raw.module.unwrap_or_else(|| key.to_string()),
            platform: raw.platform.unwrap_or_else(|| defaults.platform.clone()),
            sudo: raw.sudo.unwrap_or(defaults.sudo),
            template: raw.template.unwrap_or_else(|| defaults.template.clone()),
            daemons_directory: raw
                .daemons_directory
                .unwrap_or_else(|| defaults.daemons_directory.clone()),
            daemon_extension: raw
                .daemon_extension
                .unwrap_or_else(|| defaults.daemon_extension.clone()),
            base_working_directory,
            env,
            args,
            extra: raw.extra,
        };

        tracing::debug!(
            "Built service {} (module {}, platform {})",
            service.name,
            service.module,
            service.platform
        );

        service
    }

    /// `<base>/node_modules/<module>`, where the service's script runs
    pub fn working_directory(&self) -> PathBuf {
        paths::absolute(
            &self
                .base_working_directory
                .join(MODULES_DIR)
                .join(&self.module),
        )
    }

    /// `<base>/logs/<name>.log`
    pub fn log_file(&self) -> PathBuf {
        paths::absolute(
            &self
                .base_working_directory
                .join(LOGS_DIR)
                .join(format!("{}.log", self.name)),
        )
    }

    /// Where the wrapper script lives, e.g. `/etc/init/<name>.conf`
    pub fn script_path(&self) -> PathBuf {
        // Without a home directory the marker stays literal and resolves
        // under the current directory.
        match paths::home_dir() {
            Some(home) => self.script_path_in(&home),
            None => paths::absolute(
                &Path::new(&self.daemons_directory).join(self.script_file_name()),
            ),
        }
    }

    /// [`Service::script_path`] with an explicit home directory
    pub fn script_path_in(&self, home: &Path) -> PathBuf {
        let dir = paths::expand_home(&self.daemons_directory, home);
        paths::absolute(&dir.join(self.script_file_name()))
    }

    fn script_file_name(&self) -> String {
        format!("{}{}", self.name, self.daemon_extension)
    }

    /// Shell command for `verb`, `sudo`-prefixed when required
    pub fn command(&self, verb: Verb) -> String {
        build_command(verb, self)
    }

    /// Dispatch `verb` to the host service manager
    pub fn run_command(&self, verb: Verb) -> Result<()> {
        let command = self.command(verb);
        tracing::info!("{} {}: {}", verb, self.name, command);
        cmd::dispatch(&command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Defaults {
        Defaults::for_platform("linux", Path::new("/srv/app"))
    }

    fn env(pairs: &[(&str, &str)]) -> EnvMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_entry_takes_identity_and_defaults() {
        let d = defaults();
        let svc = Service::build(&d, "web", RawServiceConfig::default(), &EnvMap::new(), &[]);

        assert_eq!(svc.name, "web");
        assert_eq!(svc.module, "web");
        assert_eq!(svc.platform, d.platform);
        assert_eq!(svc.sudo, d.sudo);
        assert_eq!(svc.template, d.template);
        assert_eq!(svc.daemons_directory, d.daemons_directory);
        assert_eq!(svc.daemon_extension, d.daemon_extension);
        assert_eq!(svc.base_working_directory, d.base_working_directory);
        assert!(svc.env.is_empty());
        assert!(svc.args.is_empty());
        assert!(svc.extra.is_empty());
    }

    #[test]
    fn entry_fields_override_identity_and_defaults() {
        let raw = RawServiceConfig {
            name: Some("frontend".into()),
            module: Some("web-app".into()),
            platform: Some("darwin".into()),
            sudo: Some(true),
            daemon_extension: Some(".agent".into()),
            ..Default::default()
        };
        let svc = Service::build(&defaults(), "web", raw, &EnvMap::new(), &[]);

        assert_eq!(svc.name, "frontend");
        assert_eq!(svc.module, "web-app");
        assert_eq!(svc.platform, "darwin");
        assert!(svc.sudo);
        assert_eq!(svc.daemon_extension, ".agent");
        assert_eq!(svc.daemons_directory, "/etc/init");
    }

    #[test]
    fn service_env_wins_over_global() {
        let raw = RawServiceConfig {
            env: Some(env(&[("A", "2"), ("B", "3")])),
            ..Default::default()
        };
        let svc = Service::build(&defaults(), "web", raw, &env(&[("A", "1")]), &[]);
        assert_eq!(svc.env, env(&[("A", "2"), ("B", "3")]));
    }

    #[test]
    fn global_env_fills_gaps() {
        let svc = Service::build(
            &defaults(),
            "web",
            RawServiceConfig::default(),
            &env(&[("NODE_ENV", "production")]),
            &[],
        );
        assert_eq!(svc.env, env(&[("NODE_ENV", "production")]));
    }

    #[test]
    fn service_args_come_first() {
        let raw = RawServiceConfig {
            args: Some(vec!["x".into()]),
            ..Default::default()
        };
        let svc = Service::build(&defaults(), "web", raw, &EnvMap::new(), &["y".to_string()]);
        assert_eq!(svc.args, vec!["x", "y"]);
    }

    #[test]
    fn derived_paths() {
        let raw = RawServiceConfig {
            module: Some("web-app".into()),
            ..Default::default()
        };
        let svc = Service::build(&defaults(), "web", raw, &EnvMap::new(), &[]);
        assert_eq!(
            svc.working_directory(),
            PathBuf::from("/srv/app/node_modules/web-app")
        );
        assert_eq!(svc.log_file(), PathBuf::from("/srv/app/logs/web.log"));
    }

    #[test]
    fn derived_paths_track_field_changes() {
        let mut svc = Service::build(
            &defaults(),
            "web",
            RawServiceConfig::default(),
            &EnvMap::new(),
            &[],
        );
        svc.name = "api".into();
        svc.module = "api-server".into();
        svc.base_working_directory = PathBuf::from("/opt/node");

        assert_eq!(
            svc.working_directory(),
            PathBuf::from("/opt/node/node_modules/api-server")
        );
        assert_eq!(svc.log_file(), PathBuf::from("/opt/node/logs/api.log"));
        assert_eq!(
            svc.script_path_in(Path::new("/root")),
            PathBuf::from("/etc/init/api.conf")
        );
    }

    #[test]
    fn relative_base_directory_is_joined_to_default() {
        let raw = RawServiceConfig {
            base_working_directory: Some("../shared".into()),
            ..Default::default()
        };
        let svc = Service::build(&defaults(), "web", raw, &EnvMap::new(), &[]);
        assert_eq!(svc.log_file(), PathBuf::from("/srv/shared/logs/web.log"));
    }

    #[test]
    fn script_path_expands_home() {
        let d = Defaults::for_platform("darwin", Path::new("/srv/app"));
        let raw = RawServiceConfig {
            daemons_directory: Some("~/Library/LaunchAgents".into()),
            daemon_extension: Some(".plist".into()),
            ..Default::default()
        };
        let svc = Service::build(&d, "app", raw, &EnvMap::new(), &[]);
        assert_eq!(
            svc.script_path_in(Path::new("/Users/bob")),
            PathBuf::from("/Users/bob/Library/LaunchAgents/app.plist")
        );
    }

    #[test]
    fn script_path_normalizes() {
        let raw = RawServiceConfig {
            daemons_directory: Some("/etc/init/../init.d/".into()),
            daemon_extension: Some(String::new()),
            ..Default::default()
        };
        let svc = Service::build(&defaults(), "web", raw, &EnvMap::new(), &[]);
        assert_eq!(
            svc.script_path_in(Path::new("/home/bob")),
            PathBuf::from("/etc/init.d/web")
        );
    }

    #[test]
    fn serialized_context_uses_manifest_names() {
        let mut raw = RawServiceConfig::default();
        raw.extra
            .insert("description".into(), Value::String("web frontend".into()));
        let svc = Service::build(&defaults(), "web", raw, &EnvMap::new(), &[]);
        let value = serde_json::to_value(&svc).unwrap();

        assert_eq!(value["daemonsDirectory"], "/etc/init");
        assert_eq!(value["baseWorkingDirectory"], "/srv/app");
        assert_eq!(value["description"], "web frontend");
    }
}
