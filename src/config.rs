//! Process-wide defaults every service descriptor starts from
//!
//! Defaults come from the host platform, then an optional override file in the
//! base working directory, then a couple of environment variables.

use serde::Deserialize;
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths::{self, CONFIG_FILE, MANIFEST_FILE};
use crate::platform::{self, Platform};

/// Environment variable overriding the manifest location
pub const MANIFEST_ENV: &str = "NODESVC_MANIFEST";

/// Environment variable overriding the detected platform
pub const PLATFORM_ENV: &str = "NODESVC_PLATFORM";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub platform: String,
    pub sudo: bool,
    pub template: String,
    pub daemons_directory: String,
    pub daemon_extension: String,
    pub base_working_directory: PathBuf,
    pub manifest_path: PathBuf,
}

/// Override file contents; every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConfigFile {
    platform: Option<String>,
    sudo: Option<bool>,
    template: Option<String>,
    daemons_directory: Option<String>,
    daemon_extension: Option<String>,
    base_working_directory: Option<PathBuf>,
    #[serde(alias = "serviceJson")]
    manifest: Option<PathBuf>,
}

impl Defaults {
    /// Platform defaults rooted at `base_dir`
    pub fn for_platform(platform: &str, base_dir: &Path) -> Self {
        let kind = Platform::from_tag(platform);
        let base_dir = paths::absolute(base_dir);

        Self {
            platform: platform.to_string(),
            sudo: false,
            template: kind.default_template().into(),
            daemons_directory: kind.default_daemons_directory().into(),
            daemon_extension: kind.default_daemon_extension().into(),
            manifest_path: base_dir.join(MANIFEST_FILE),
            base_working_directory: base_dir,
        }
    }

    /// Host defaults rooted at the current directory, with overrides applied
    pub fn detect(config_file: Option<&Path>) -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| Error::io("reading current directory", e))?;
        Self::load(&cwd, config_file)
    }

    /// Host defaults rooted at `base_dir`, with overrides applied.
    ///
    /// `config_file` defaults to `nodesvc.yaml` in `base_dir`; it is only
    /// required to exist when given explicitly.
    pub fn load(base_dir: &Path, config_file: Option<&Path>) -> Result<Self> {
        let mut defaults = Self::load_with(base_dir, config_file, env::var(PLATFORM_ENV).ok())?;

        if let Some(manifest) = env::var_os(MANIFEST_ENV) {
            defaults.manifest_path = paths::absolute(Path::new(&manifest));
        }

        Ok(defaults)
    }

    /// Host defaults, then the override file, then `platform` on top of both
    fn load_with(
        base_dir: &Path,
        config_file: Option<&Path>,
        platform: Option<String>,
    ) -> Result<Self> {
        let mut defaults = Self::for_platform(&platform::detect_host(), base_dir);

        let (path, required) = match config_file {
            Some(path) => (path.to_path_buf(), true),
            None => (defaults.base_working_directory.join(CONFIG_FILE), false),
        };

        let mut overrides = match fs::read_to_string(&path) {
            Ok(content) => {
                tracing::debug!("Applying config overrides from {}", path.display());
                parse_config(&path, &content)?
            }
            Err(e) if e.kind() == ErrorKind::NotFound && !required => ConfigFile::default(),
            Err(e) => {
                return Err(Error::Config {
                    path,
                    reason: e.to_string(),
                })
            }
        };

        if platform.is_some() {
            overrides.platform = platform;
        }
        defaults.apply(overrides);

        Ok(defaults)
    }

    fn apply(&mut self, file: ConfigFile) {
        // A platform override also moves the platform-derived defaults, unless
        // the same file pins them.
        if let Some(platform) = file.platform {
            let kind = Platform::from_tag(&platform);
            self.template = kind.default_template().into();
            self.daemons_directory = kind.default_daemons_directory().into();
            self.daemon_extension = kind.default_daemon_extension().into();
            self.platform = platform;
        }
        if let Some(sudo) = file.sudo {
            self.sudo = sudo;
        }
        if let Some(template) = file.template {
            self.template = template;
        }
        if let Some(dir) = file.daemons_directory {
            self.daemons_directory = dir;
        }
        if let Some(ext) = file.daemon_extension {
            self.daemon_extension = ext;
        }
        if let Some(base) = file.base_working_directory {
            let base = paths::absolute(&self.base_working_directory.join(base));
            if file.manifest.is_none() {
                self.manifest_path = base.join(MANIFEST_FILE);
            }
            self.base_working_directory = base;
        }
        if let Some(manifest) = file.manifest {
            self.manifest_path = paths::absolute(&self.base_working_directory.join(manifest));
        }
    }
}

fn parse_config(path: &Path, content: &str) -> Result<ConfigFile> {
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");

    let parsed = if is_json {
        serde_json::from_str(content).map_err(|e| e.to_string())
    } else if content.trim().is_empty() {
        Ok(ConfigFile::default())
    } else {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    };

    parsed.map_err(|reason| Error::Config {
        path: path.to_path_buf(),
        reason,
    })
}
