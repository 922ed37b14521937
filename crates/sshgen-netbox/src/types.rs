//! Netbox record types
//!
//! Only the fields the generator reads are modelled. Every field is optional
//! or defaulted so a sparse or older Netbox still decodes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Paginated list envelope returned by every Netbox list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of matching objects
    #[serde(default)]
    pub count: u64,
    /// URL of the next page, `None` on the last page
    #[serde(default)]
    pub next: Option<String>,
    /// URL of the previous page
    #[serde(default)]
    pub previous: Option<String>,
    /// Objects on this page
    #[serde(default)]
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Whether another page follows this one
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Choice field (`{"value": "active", "label": "Active"}`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub label: String,
}

/// Nested IP address reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpAddressRef {
    #[serde(default)]
    pub id: Option<u64>,
    /// CIDR notation, e.g. `10.226.251.17/24`
    pub address: String,
}

impl IpAddressRef {
    /// Address without the prefix length
    #[must_use]
    pub fn host(&self) -> &str {
        self.address
            .split_once('/')
            .map_or(self.address.as_str(), |(host, _)| host)
    }
}

/// Nested reference to a device or virtual machine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Device or virtual machine
///
/// Both collections expose the same addressing fields, so one record
/// type serves both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostRecord {
    #[serde(default)]
    pub id: u64,
    /// Devices may be unnamed in Netbox
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<Choice>,
    #[serde(default)]
    pub primary_ip: Option<IpAddressRef>,
    #[serde(default)]
    pub primary_ip4: Option<IpAddressRef>,
    #[serde(default)]
    pub primary_ip6: Option<IpAddressRef>,
}

impl HostRecord {
    /// Primary address without prefix length
    ///
    /// Falls back to the family-specific fields when `primary_ip` is absent.
    #[must_use]
    pub fn primary_address(&self) -> Option<&str> {
        self.primary_ip
            .as_ref()
            .or(self.primary_ip4.as_ref())
            .or(self.primary_ip6.as_ref())
            .map(IpAddressRef::host)
    }

    /// Status value (`active`, `offline`, ...)
    #[must_use]
    pub fn status_value(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.value.as_str())
    }
}

/// Parent of a service record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentKind {
    Device,
    VirtualMachine,
}

fn ref_name(r: &Option<ObjectRef>) -> Option<&str> {
    r.as_ref().and_then(|o| o.name.as_deref())
}

/// Service attached to a device or virtual machine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceRecord {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub protocol: Option<Choice>,
    #[serde(default)]
    pub ports: Vec<u16>,
    /// Netbox 3.x parent fields
    #[serde(default)]
    pub device: Option<ObjectRef>,
    #[serde(default)]
    pub virtual_machine: Option<ObjectRef>,
    /// Netbox 4.x generic parent (`dcim.device` / `virtualization.virtualmachine`)
    #[serde(default)]
    pub parent_object_type: Option<String>,
    #[serde(default)]
    pub parent: Option<ObjectRef>,
    #[serde(default)]
    pub custom_fields: Option<Map<String, Value>>,
}

impl ServiceRecord {
    /// Parent kind and name, whichever API generation produced the record
    #[must_use]
    pub fn parent(&self) -> Option<(ParentKind, &str)> {
        if let Some(name) = ref_name(&self.device) {
            return Some((ParentKind::Device, name));
        }
        if let Some(name) = ref_name(&self.virtual_machine) {
            return Some((ParentKind::VirtualMachine, name));
        }

        let kind = match self.parent_object_type.as_deref()? {
            "dcim.device" => ParentKind::Device,
            "virtualization.virtualmachine" => ParentKind::VirtualMachine,
            _ => return None,
        };
        ref_name(&self.parent).map(|name| (kind, name))
    }

    /// String custom field, ignoring empty values
    #[must_use]
    pub fn custom_str(&self, field: &str) -> Option<&str> {
        self.custom_fields
            .as_ref()?
            .get(field)?
            .as_str()
            .filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_decode() {
        let page: Page<HostRecord> = serde_json::from_value(json!({
            "count": 3,
            "next": "http://netbox/api/dcim/devices/?limit=2&offset=2",
            "previous": null,
            "results": [{"id": 1, "name": "x1"}, {"id": 2, "name": "x2"}]
        }))
        .unwrap();

        assert_eq!(page.count, 3);
        assert!(page.has_next());
        assert_eq!(page.results.len(), 2);
    }

    #[test]
    fn test_primary_address_strips_prefix() {
        let host: HostRecord = serde_json::from_value(json!({
            "id": 7,
            "name": "x1",
            "status": {"value": "active", "label": "Active"},
            "primary_ip": {"id": 11, "address": "10.226.251.17/24"}
        }))
        .unwrap();

        assert_eq!(host.primary_address(), Some("10.226.251.17"));
        assert_eq!(host.status_value(), Some("active"));
    }

    #[test]
    fn test_primary_address_fallback_and_absence() {
        let v6: HostRecord = serde_json::from_value(json!({
            "name": "x2",
            "primary_ip": null,
            "primary_ip6": {"address": "2001:db8::5/64"}
        }))
        .unwrap();
        assert_eq!(v6.primary_address(), Some("2001:db8::5"));

        let none: HostRecord = serde_json::from_value(json!({"name": "x3", "primary_ip": null})).unwrap();
        assert_eq!(none.primary_address(), None);
    }

    #[test]
    fn test_service_parent_legacy_fields() {
        let svc: ServiceRecord = serde_json::from_value(json!({
            "id": 1,
            "name": "ssh",
            "ports": [2200],
            "device": {"id": 4, "name": "x1"},
            "virtual_machine": null
        }))
        .unwrap();
        assert_eq!(svc.parent(), Some((ParentKind::Device, "x1")));
    }

    #[test]
    fn test_service_parent_generic_fields() {
        let svc: ServiceRecord = serde_json::from_value(json!({
            "name": "sshd",
            "ports": [22],
            "parent_object_type": "virtualization.virtualmachine",
            "parent": {"id": 9, "name": "vm1"}
        }))
        .unwrap();
        assert_eq!(svc.parent(), Some((ParentKind::VirtualMachine, "vm1")));
    }

    #[test]
    fn test_service_custom_field() {
        let svc: ServiceRecord = serde_json::from_value(json!({
            "name": "ssh",
            "custom_fields": {"ssh_user": "deploy", "blank": "  ", "num": 3}
        }))
        .unwrap();
        assert_eq!(svc.custom_str("ssh_user"), Some("deploy"));
        assert_eq!(svc.custom_str("blank"), None);
        assert_eq!(svc.custom_str("num"), None);
        assert_eq!(svc.custom_str("missing"), None);
    }
}
