//! nodesvc - init scripts and launch agents for Node.js services
//!
//! A `service.json` manifest lists the services; each entry is merged over
//! platform defaults into a [`Service`], which knows where its wrapper script
//! lives, how to render it, and which service manager command starts, stops or
//! restarts it.

pub mod cmd;
pub mod config;
pub mod error;
pub mod manifest;
pub mod paths;
pub mod platform;
pub mod registry;
pub mod service;

pub use config::Defaults;
pub use error::{Error, Result};
pub use registry::Registry;
pub use service::{build_command, Service, Verb};
