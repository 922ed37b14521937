//! Assets and per-asset SSH overrides

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::IpAddr;

use sshgen_netbox::{ObjectClass, ParentKind};

/// Port used when no override exists
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Kind of inventory object an asset was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetKind {
    Device,
    VirtualMachine,
}

impl AssetKind {
    /// Collection holding this kind
    #[must_use]
    pub fn class(self) -> ObjectClass {
        match self {
            AssetKind::Device => ObjectClass::Device,
            AssetKind::VirtualMachine => ObjectClass::VirtualMachine,
        }
    }
}

impl TryFrom<ObjectClass> for AssetKind {
    type Error = ObjectClass;

    fn try_from(class: ObjectClass) -> Result<Self, Self::Error> {
        match class {
            ObjectClass::Device => Ok(AssetKind::Device),
            ObjectClass::VirtualMachine => Ok(AssetKind::VirtualMachine),
            other => Err(other),
        }
    }
}

impl From<ParentKind> for AssetKind {
    fn from(kind: ParentKind) -> Self {
        match kind {
            ParentKind::Device => AssetKind::Device,
            ParentKind::VirtualMachine => AssetKind::VirtualMachine,
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Device => f.write_str("device"),
            AssetKind::VirtualMachine => f.write_str("virtual machine"),
        }
    }
}

/// Custom SSH settings taken from a service record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SshOverride {
    pub port: Option<u16>,
    pub user: Option<String>,
}

impl SshOverride {
    /// Whether the override changes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.port.is_none() && self.user.is_none()
    }
}

/// A device or virtual machine with a usable address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub kind: AssetKind,
    /// Name as stored in the inventory
    pub name: String,
    /// Name written after `host`
    pub alias: String,
    pub address: IpAddr,
    pub ssh: SshOverride,
}

impl Asset {
    /// Create an asset whose alias is its inventory name
    pub fn new(kind: AssetKind, name: impl Into<String>, address: IpAddr) -> Self {
        let name = name.into();
        Self {
            kind,
            alias: name.clone(),
            name,
            address,
            ssh: SshOverride::default(),
        }
    }

    /// Replace the alias with the first DNS label of the name
    #[must_use]
    pub fn shortened(mut self) -> Self {
        self.alias = short_name(&self.name).to_string();
        self
    }

    /// Port to connect to
    #[must_use]
    pub fn port(&self) -> u16 {
        self.ssh.port.unwrap_or(DEFAULT_SSH_PORT)
    }

    /// User to log in as
    #[must_use]
    pub fn user<'a>(&'a self, default: &'a str) -> &'a str {
        self.ssh.user.as_deref().unwrap_or(default)
    }
}

/// First DNS label of `name`
///
/// IP literals are returned whole.
#[must_use]
pub fn short_name(name: &str) -> &str {
    if name.parse::<IpAddr>().is_ok() {
        return name;
    }
    match name.split_once('.') {
        Some((label, _)) if !label.is_empty() => label,
        _ => name,
    }
}

/// Whether `value` can stand as one `ssh_config` argument
///
/// Whitespace would split it and pattern characters would change what a
/// `host` line matches.
#[must_use]
pub fn is_config_token(value: &str) -> bool {
    !value.is_empty()
        && !value.chars().any(|c| {
            c.is_whitespace() || c.is_control() || matches!(c, '"' | '*' | '?' | '!' | ',')
        })
}

/// Overrides keyed by the asset they belong to
///
/// Keys are ordered so leftover entries are reported deterministically.
#[derive(Debug, Default)]
pub struct Overrides {
    entries: BTreeMap<(AssetKind, String), SshOverride>,
    matched: BTreeSet<(AssetKind, String)>,
}

impl Overrides {
    /// Record an override; the first one recorded for an asset wins
    ///
    /// Returns `false` if the asset already had one.
    pub fn insert(&mut self, kind: AssetKind, name: impl Into<String>, ssh: SshOverride) -> bool {
        use std::collections::btree_map::Entry;

        match self.entries.entry((kind, name.into())) {
            Entry::Vacant(slot) => {
                slot.insert(ssh);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Override for an asset, if any
    #[must_use]
    pub fn get(&self, kind: AssetKind, name: &str) -> Option<&SshOverride> {
        self.entries.get(&(kind, name.to_string()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy matching overrides onto `assets`, returning how many matched
    pub fn apply(&mut self, assets: &mut [Asset]) -> usize {
        let mut applied = 0;
        for asset in assets {
            let key = (asset.kind, asset.name.clone());
            if let Some(ssh) = self.entries.get(&key) {
                asset.ssh = ssh.clone();
                self.matched.insert(key);
                applied += 1;
            }
        }
        applied
    }

    /// Overrides that no applied asset claimed
    pub fn orphans(&self) -> impl Iterator<Item = (AssetKind, &str)> {
        self.entries
            .keys()
            .filter(|key| !self.matched.contains(*key))
            .map(|(kind, name)| (*kind, name.as_str()))
    }
}
