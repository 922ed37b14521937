//! End-to-end generation: validate, collect, merge, render, write

use std::collections::HashSet;
use std::path::Path;

use sshgen_netbox::{InventoryApi, ObjectClass};
use tracing::{debug, info, instrument};

use crate::collector::{CollectOptions, Collector, Skipped};
use crate::error::GenerateError;
use crate::output::{LockFile, write_managed};
use crate::render::Renderer;
use crate::settings::Settings;
use crate::validator::QueryValidator;

/// Counters from one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub devices: usize,
    pub virtual_machines: usize,
    /// Records left out, devices first
    pub skipped: Vec<Skipped>,
    pub overrides_applied: usize,
    /// Overrides whose parent was not among the collected assets
    pub orphan_overrides: usize,
}

impl RunSummary {
    /// Number of stanzas written
    #[must_use]
    pub fn hosts(&self) -> usize {
        self.devices + self.virtual_machines
    }
}

/// Rendered file contents and how they were produced
#[derive(Debug, Clone)]
pub struct Generated {
    pub contents: String,
    pub summary: RunSummary,
}

/// Drives one generation run against an inventory
pub struct Generator<'a, A: ?Sized> {
    api: &'a A,
    settings: &'a Settings,
    renderer: Renderer,
}

impl<'a, A: InventoryApi + ?Sized> Generator<'a, A> {
    pub fn new(api: &'a A, settings: &'a Settings, renderer: Renderer) -> Self {
        Self {
            api,
            settings,
            renderer,
        }
    }

    /// Validate every query, collect, merge overrides and render
    ///
    /// Nothing is written; all three queries are validated before the first
    /// record is fetched.
    ///
    /// # Errors
    /// Returns the first validation or collection error.
    #[instrument(skip_all)]
    pub async fn generate(&self) -> Result<Generated, GenerateError> {
        let validator = QueryValidator::new(self.api);
        let devices_query = validator
            .validate(self.settings.host_query(ObjectClass::Device))
            .await?;
        let vms_query = validator
            .validate(self.settings.host_query(ObjectClass::VirtualMachine))
            .await?;
        let services_query = validator.validate(self.settings.service_query()).await?;

        let collector = Collector::new(self.api, CollectOptions::from(self.settings));

        let mut aliases = HashSet::new();
        let mut devices = collector.collect(&devices_query).await?;
        devices.claim_aliases(&mut aliases);
        let mut overrides = collector.collect_overrides(&services_query).await?;
        let mut overrides_applied = overrides.apply(&mut devices.assets);

        let mut vms = collector.collect(&vms_query).await?;
        vms.claim_aliases(&mut aliases);
        overrides_applied += overrides.apply(&mut vms.assets);

        let mut orphan_overrides = 0;
        for (kind, name) in overrides.orphans() {
            debug!(%kind, name, "ignoring override for asset that was not collected");
            orphan_overrides += 1;
        }

        let summary = RunSummary {
            devices: devices.assets.len(),
            virtual_machines: vms.assets.len(),
            skipped: devices.skipped.into_iter().chain(vms.skipped).collect(),
            overrides_applied,
            orphan_overrides,
        };
        info!(
            "collected from netbox - [{}] devices and virtual machines",
            summary.hosts()
        );

        let contents = self
            .renderer
            .render(devices.assets.iter().chain(vms.assets.iter()));

        Ok(Generated { contents, summary })
    }

    /// Generate and replace the file at `path`
    ///
    /// A hidden lock file next to `path` is held for the whole run. The destination
    /// is only touched once rendering has succeeded.
    ///
    /// # Errors
    /// Returns an error if the lock is held, generation fails, or the file
    /// cannot be written.
    pub async fn run(&self, path: &Path) -> Result<RunSummary, GenerateError> {
        let _lock = LockFile::acquire(path)?;
        let generated = self.generate().await?;
        write_managed(path, &generated.contents)?;
        info!(path = %path.display(), hosts = generated.summary.hosts(), "SSH config successfully created");
        Ok(generated.summary)
    }
}
