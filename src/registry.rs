//! Lookup over the services a manifest declares
//!
//! Nothing is cached: every query reads the manifest again and builds fresh
//! descriptors, so edits to the file are picked up on the next call.

use crate::config::Defaults;
use crate::error::Result;
use crate::manifest;
use crate::service::Service;

#[derive(Debug, Clone)]
pub struct Registry {
    defaults: Defaults,
}

impl Registry {
    pub fn new(defaults: Defaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Every service in the manifest, in document order
    pub fn all_services(&self) -> Result<Vec<Service>> {
        let manifest = manifest::load(&self.defaults.manifest_path)?;

        Ok(manifest
            .services
            .into_iter()
            .map(|(key, raw)| {
                Service::build(&self.defaults, &key, raw, &manifest.env, &manifest.args)
            })
            .collect())
    }

    /// The first service whose resolved name is `name`
    pub fn get_service(&self, name: &str) -> Result<Option<Service>> {
        Ok(self
            .all_services()?
            .into_iter()
            .find(|service| service.name == name))
    }
}
