use std::fmt;
use std::str::FromStr;

use super::Service;
use crate::platform::Platform;

/// Lifecycle verbs understood by every service manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Start,
    Stop,
    Restart,
}

impl Verb {
    pub const ALL: [Verb; 3] = [Verb::Start, Verb::Stop, Verb::Restart];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Start => "start",
            Verb::Stop => "stop",
            Verb::Restart => "restart",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Verb::Start),
            "stop" => Ok(Verb::Stop),
            "restart" => Ok(Verb::Restart),
            other => Err(format!(
                "unknown command: {}. Supported: start, stop, restart",
                other
            )),
        }
    }
}

/// Shell command that applies `verb` to `service` on its platform.
/// One arm per verb and service manager.
pub fn build_command(verb: Verb, service: &Service) -> String {
    let name = &service.name;

    let command = match (verb, Platform::from_tag(&service.platform)) {
        (Verb::Start, Platform::Centos) => format!("initctl start {}", name),
        (Verb::Stop, Platform::Centos) => format!("initctl stop {}", name),
        (Verb::Restart, Platform::Centos) => format!("initctl restart {}", name),
        (Verb::Start, Platform::Darwin) => {
            format!("launchctl load {}", service.script_path().display())
        }
        (Verb::Stop, Platform::Darwin) => {
            format!("launchctl unload {}", service.script_path().display())
        }
        (Verb::Restart, Platform::Darwin) => {
            let script = service.script_path();
            format!(
                "launchctl unload {};launchctl load {}",
                script.display(),
                script.display()
            )
        }
        (Verb::Start, Platform::Other) => format!("service {} start", name),
        (Verb::Stop, Platform::Other) => format!("service {} stop", name),
        (Verb::Restart, Platform::Other) => format!("service {} restart", name),
    };

    if service.sudo {
        format!("sudo {}", command)
    } else {
        command
    }
}
