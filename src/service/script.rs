use serde_json::Value;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use super::Service;
use crate::error::{Error, Result};

const BUILTIN_PREFIX: &str = "builtin:";
const LAUNCHD_TEMPLATE: &str = include_str!("../../templates/launchd.plist.j2");
const UPSTART_TEMPLATE: &str = include_str!("../../templates/upstart.conf.j2");

/// Look up a template compiled into the binary
fn builtin_template(name: &str) -> Option<&'static str> {
    match name {
        "launchd" => Some(LAUNCHD_TEMPLATE),
        "upstart" => Some(UPSTART_TEMPLATE),
        _ => None,
    }
}

impl Service {
    fn template_source(&self) -> Result<String> {
        if let Some(name) = self.template.strip_prefix(BUILTIN_PREFIX) {
            return builtin_template(name)
                .map(str::to_string)
                .ok_or_else(|| Error::Template {
                    template: self.template.clone(),
                    reason: "no such builtin template (expected launchd or upstart)".into(),
                });
        }

        fs::read_to_string(&self.template).map_err(|e| Error::Template {
            template: self.template.clone(),
            reason: e.to_string(),
        })
    }

    /// Template variables: every descriptor field plus the derived paths
    fn template_context(&self) -> Result<Value> {
        let mut context = serde_json::to_value(self).map_err(|e| Error::Template {
            template: self.template.clone(),
            reason: e.to_string(),
        })?;

        if let Value::Object(map) = &mut context {
            let derived = [
                ("workingDirectory", self.working_directory()),
                ("logFile", self.log_file()),
                ("scriptPath", self.script_path()),
            ];
            for (key, path) in derived {
                map.insert(
                    key.to_string(),
                    Value::String(path.to_string_lossy().into_owned()),
                );
            }
        }

        Ok(context)
    }

    /// Render the wrapper script without touching the filesystem
    pub fn render_script(&self) -> Result<String> {
        let source = self.template_source()?;
        let context = self.template_context()?;

        let mut rendered = minijinja::Environment::new()
            .render_str(&source, context)
            .map_err(|e| Error::Template {
                template: self.template.clone(),
                reason: e.to_string(),
            })?;

        if !rendered.ends_with('\n') {
            rendered.push('\n');
        }

        Ok(rendered)
    }

    /// Render the wrapper script and write it to [`Service::script_path`]
    /// with mode 0755. Also creates the log directory the script writes to.
    pub fn generate_script(&self) -> Result<PathBuf> {
        let script = self.render_script()?;
        let path = self.script_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::io(format!("creating {}", parent.display()), e))?;
        }

        if let Some(log_dir) = self.log_file().parent() {
            fs::create_dir_all(log_dir)
                .map_err(|e| Error::io(format!("creating {}", log_dir.display()), e))?;
        }

        fs::write(&path, script).map_err(|e| Error::io(format!("writing {}", path.display()), e))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .map_err(|e| Error::io(format!("setting mode on {}", path.display()), e))?;

        tracing::info!("Generated {} for {}", path.display(), self.name);

        Ok(path)
    }
}
