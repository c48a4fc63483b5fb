use std::path::Path;

/// Service manager family a platform tag maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Upstart via `initctl`
    Centos,
    /// launchd via `launchctl`
    Darwin,
    /// SysV-style `service` wrapper; anything unrecognised lands here
    Other,
}

impl Platform {
    /// Map a manifest platform tag. Unknown tags are `Other`, not an error.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "centos" => Platform::Centos,
            "darwin" => Platform::Darwin,
            _ => Platform::Other,
        }
    }

    /// Builtin wrapper template for this service manager
    pub fn default_template(&self) -> &'static str {
        match self {
            Platform::Darwin => "builtin:launchd",
            Platform::Centos | Platform::Other => "builtin:upstart",
        }
    }

    /// Directory wrapper scripts are written to
    pub fn default_daemons_directory(&self) -> &'static str {
        match self {
            Platform::Darwin => "~/Library/LaunchAgents",
            Platform::Centos | Platform::Other => "/etc/init",
        }
    }

    /// File extension of wrapper scripts
    pub fn default_daemon_extension(&self) -> &'static str {
        match self {
            Platform::Darwin => ".plist",
            Platform::Centos | Platform::Other => ".conf",
        }
    }
}

/// Detect the platform tag of the running host
pub fn detect_host() -> String {
    if cfg!(target_os = "macos") {
        return "darwin".into();
    }

    if Path::new("/etc/centos-release").exists() || Path::new("/etc/redhat-release").exists() {
        return "centos".into();
    }

    std::env::consts::OS.into()
}
