use normalize_path::NormalizePath;
use std::env;
use std::path::{Path, PathBuf};

/// Default manifest file name, looked up in the base working directory
pub const MANIFEST_FILE: &str = "service.json";

/// Optional defaults override file, looked up in the base working directory
pub const CONFIG_FILE: &str = "nodesvc.yaml";

/// Manifest key holding the global environment
pub const GLOBAL_ENV_KEY: &str = "env";

/// Manifest key holding the global arguments
pub const GLOBAL_ARGS_KEY: &str = "args";

/// Leading marker expanded to the user's home directory
pub const HOME_MARKER: &str = "~/";

/// Dependency directory under the base working directory
pub const MODULES_DIR: &str = "node_modules";

/// Log directory under the base working directory
pub const LOGS_DIR: &str = "logs";

/// Home directory of the invoking user
///
/// `$HOME` wins; otherwise the passwd entry of the current uid.
pub fn home_dir() -> Option<PathBuf> {
    if let Some(home) = env::var_os("HOME").filter(|h| !h.is_empty()) {
        return Some(PathBuf::from(home));
    }

    nix::unistd::User::from_uid(nix::unistd::Uid::current())
        .ok()
        .flatten()
        .map(|user| user.dir)
}

/// Replace a leading `~/` with `home`. Any other `~` is left alone.
pub fn expand_home(dir: &str, home: &Path) -> PathBuf {
    match dir.strip_prefix(HOME_MARKER) {
        Some(rest) => home.join(rest),
        None => PathBuf::from(dir),
    }
}

/// Make `path` absolute against the current directory and fold `.`/`..`
pub fn absolute(path: &Path) -> PathBuf {
    let path = if path.is_relative() {
        match env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    } else {
        path.to_path_buf()
    };

    path.normalize()
}
