//! Asset and override collection

use std::collections::HashSet;
use std::net::IpAddr;

use futures::TryStreamExt;
use sshgen_netbox::{DEFAULT_PAGE_SIZE, HostRecord, InventoryApi, ObjectClass, ServiceRecord, paginate};
use tracing::{debug, info, instrument, warn};

use crate::asset::{Asset, AssetKind, Overrides, SshOverride, is_config_token};
use crate::error::CollectError;
use crate::settings::Settings;
use crate::validator::ValidQuery;

/// Collection knobs taken from [`Settings`]
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub page_size: u64,
    pub short_names: bool,
    /// Allowed statuses (empty = any)
    pub statuses: Vec<String>,
    /// Service names treated as SSH
    pub service_names: Vec<String>,
    /// Service custom field holding a username
    pub user_field: String,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            short_names: true,
            statuses: Vec::new(),
            service_names: vec!["ssh".to_string(), "sshd".to_string()],
            user_field: "ssh_user".to_string(),
        }
    }
}

impl From<&Settings> for CollectOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            page_size: settings.page_size,
            short_names: settings.short_names,
            statuses: settings.statuses.clone(),
            service_names: settings.service_names.clone(),
            user_field: settings.user_field.clone(),
        }
    }
}

/// Why a record did not become an asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No primary IP assigned
    NoAddress,
    /// Primary IP present but not parseable
    BadAddress(String),
    /// Record has no name to use as host alias
    Unnamed,
    /// Name cannot be written as a single `host` pattern
    InvalidName,
    /// Alias already taken by an earlier asset
    DuplicateAlias(String),
    /// Status outside the configured list
    Status(String),
}

/// A record left out of the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub kind: AssetKind,
    /// Inventory name, or `#<id>` for unnamed records
    pub name: String,
    pub reason: SkipReason,
}

/// Result of walking one host collection
#[derive(Debug, Default)]
pub struct Collection {
    /// Usable assets in upstream order
    pub assets: Vec<Asset>,
    pub skipped: Vec<Skipped>,
}

impl Collection {
    /// Keep only assets whose alias no earlier asset claimed
    ///
    /// A repeated short alias falls back to the full inventory name; if that
    /// is taken too the asset is skipped. ssh matches `host` patterns without
    /// regard to case, so `seen` holds lowercased aliases.
    pub fn claim_aliases(&mut self, seen: &mut HashSet<String>) {
        let mut kept = Vec::with_capacity(self.assets.len());
        for mut asset in self.assets.drain(..) {
            if !seen.insert(asset.alias.to_lowercase()) {
                if asset.alias != asset.name && seen.insert(asset.name.to_lowercase()) {
                    warn!(
                        kind = %asset.kind,
                        alias = %asset.alias,
                        "[{}] shares its short name, using the full name",
                        asset.name
                    );
                    asset.alias = asset.name.clone();
                } else {
                    let skipped = Skipped {
                        kind: asset.kind,
                        name: asset.name.clone(),
                        reason: SkipReason::DuplicateAlias(asset.alias.clone()),
                    };
                    log_skip(&skipped);
                    self.skipped.push(skipped);
                    continue;
                }
            }
            kept.push(asset);
        }
        self.assets = kept;
    }
}

/// Walks validated queries and turns records into assets
pub struct Collector<'a, A: ?Sized> {
    api: &'a A,
    options: CollectOptions,
}

impl<'a, A: InventoryApi + ?Sized> Collector<'a, A> {
    pub fn new(api: &'a A, options: CollectOptions) -> Self {
        Self { api, options }
    }

    /// Collect devices or virtual machines
    ///
    /// Records without a usable address, name or allowed status are logged
    /// and skipped; everything else becomes an [`Asset`] in upstream order.
    ///
    /// # Errors
    /// Returns an error if the query targets services or any page request
    /// fails.
    #[instrument(skip_all, fields(class = %query.class()))]
    pub async fn collect(&self, query: &ValidQuery) -> Result<Collection, CollectError> {
        let class = query.class();
        let kind = AssetKind::try_from(class).map_err(CollectError::WrongClass)?;
        info!("collecting {class} from netbox");

        let transport = |source| CollectError::Transport { class, source };
        let records = paginate::<HostRecord, _>(self.api, query.query(), self.options.page_size);
        let mut records = std::pin::pin!(records);

        let mut collection = Collection::default();
        while let Some(record) = records.try_next().await.map_err(transport)? {
            match self.admit(kind, record) {
                Ok(asset) => collection.assets.push(asset),
                Err(skipped) => {
                    log_skip(&skipped);
                    collection.skipped.push(skipped);
                }
            }
        }

        info!(
            collected = collection.assets.len(),
            skipped = collection.skipped.len(),
            "collected {class}"
        );
        Ok(collection)
    }

    /// Collect SSH overrides from tagged services
    ///
    /// Services whose name is not an SSH service name, that have no parent,
    /// or that carry neither a port nor a username are ignored.
    ///
    /// # Errors
    /// Returns an error if the query does not target services or any page
    /// request fails.
    #[instrument(skip_all)]
    pub async fn collect_overrides(&self, query: &ValidQuery) -> Result<Overrides, CollectError> {
        let class = query.class();
        if class != ObjectClass::Service {
            return Err(CollectError::WrongClass(class));
        }
        info!("collecting services from netbox");

        let transport = |source| CollectError::Transport { class, source };
        let services = paginate::<ServiceRecord, _>(self.api, query.query(), self.options.page_size);
        let mut services = std::pin::pin!(services);

        let mut overrides = Overrides::default();
        while let Some(service) = services.try_next().await.map_err(transport)? {
            if !self.is_ssh_service(&service) {
                debug!(service = %service.name, id = service.id, "not an SSH service");
                continue;
            }
            let Some((parent, name)) = service.parent() else {
                debug!(service = %service.name, id = service.id, "service has no parent");
                continue;
            };
            let user = match service.custom_str(&self.options.user_field) {
                Some(user) if !is_config_token(user) => {
                    warn!(service = %service.name, user, "[{name}] has an unusable SSH user, ignoring it");
                    None
                }
                user => user.map(str::to_string),
            };
            let ssh = SshOverride {
                port: service.ports.first().copied(),
                user,
            };
            if ssh.is_empty() {
                continue;
            }
            let kind = AssetKind::from(parent);
            if !overrides.insert(kind, name, ssh) {
                debug!(%kind, name, id = service.id, "override already recorded, keeping first");
            }
        }

        info!(overrides = overrides.len(), "services are collected");
        Ok(overrides)
    }

    fn is_ssh_service(&self, service: &ServiceRecord) -> bool {
        self.options
            .service_names
            .iter()
            .any(|name| name.eq_ignore_ascii_case(service.name.trim()))
    }

    fn admit(&self, kind: AssetKind, record: HostRecord) -> Result<Asset, Skipped> {
        let skip = |name: String, reason| Skipped { kind, name, reason };

        let Some(name) = record.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
            return Err(skip(format!("#{}", record.id), SkipReason::Unnamed));
        };
        if !is_config_token(name) {
            return Err(skip(name.to_string(), SkipReason::InvalidName));
        }

        if !self.options.statuses.is_empty() {
            let status = record.status_value().unwrap_or_default();
            if !self.options.statuses.iter().any(|s| s == status) {
                return Err(skip(name.to_string(), SkipReason::Status(status.to_string())));
            }
        }

        let Some(raw) = record.primary_address() else {
            return Err(skip(name.to_string(), SkipReason::NoAddress));
        };
        let address: IpAddr = raw
            .parse()
            .map_err(|_| skip(name.to_string(), SkipReason::BadAddress(raw.to_string())))?;

        let asset = Asset::new(kind, name, address);
        Ok(if self.options.short_names {
            asset.shortened()
        } else {
            asset
        })
    }
}

fn log_skip(skipped: &Skipped) {
    let Skipped { kind, name, reason } = skipped;
    match reason {
        SkipReason::NoAddress => warn!(%kind, "[{name}] has no IP-address, skipping"),
        SkipReason::BadAddress(raw) => {
            warn!(%kind, address = %raw, "[{name}] has an unusable IP-address, skipping");
        }
        SkipReason::Unnamed => warn!(%kind, "[{name}] has no name, skipping"),
        SkipReason::InvalidName => {
            warn!(%kind, "[{name}] is not usable as an SSH host name, skipping");
        }
        SkipReason::DuplicateAlias(alias) => {
            warn!(%kind, alias = %alias, "[{name}] would repeat host {alias}, skipping");
        }
        SkipReason::Status(status) => {
            warn!(%kind, status = %status, "[{name}] doesn't have the desired status, skipping");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(kind: AssetKind, names: &[&str]) -> Collection {
        let assets = names
            .iter()
            .map(|name| Asset::new(kind, *name, "10.0.0.1".parse().unwrap()).shortened())
            .collect();
        Collection {
            assets,
            skipped: Vec::new(),
        }
    }

    #[test]
    fn test_repeated_short_alias_uses_full_name() {
        let mut devices = collection(AssetKind::Device, &["web1.dc1", "web1.dc2"]);
        let mut seen = HashSet::new();

        devices.claim_aliases(&mut seen);

        let aliases: Vec<_> = devices.assets.iter().map(|a| a.alias.as_str()).collect();
        assert_eq!(aliases, vec!["web1", "web1.dc2"]);
        assert!(devices.skipped.is_empty());
    }

    #[test]
    fn test_alias_taken_across_kinds_is_skipped() {
        let mut seen = HashSet::new();
        let mut devices = collection(AssetKind::Device, &["db1"]);
        let mut vms = collection(AssetKind::VirtualMachine, &["DB1"]);

        devices.claim_aliases(&mut seen);
        vms.claim_aliases(&mut seen);

        assert_eq!(devices.assets.len(), 1);
        assert!(vms.assets.is_empty());
        assert_eq!(
            vms.skipped,
            vec![Skipped {
                kind: AssetKind::VirtualMachine,
                name: "DB1".to_string(),
                reason: SkipReason::DuplicateAlias("DB1".to_string()),
            }]
        );
    }
}
