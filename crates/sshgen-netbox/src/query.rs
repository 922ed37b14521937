//! Filter builder for Netbox list endpoints

use std::fmt;

/// Netbox object collections the generator reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    /// `dcim.devices`
    Device,
    /// `virtualization.virtual-machines`
    VirtualMachine,
    /// `ipam.services`
    Service,
}

impl ObjectClass {
    /// REST path of the list endpoint, relative to the Netbox base URL
    #[must_use]
    pub fn endpoint(self) -> &'static str {
        match self {
            ObjectClass::Device => "api/dcim/devices/",
            ObjectClass::VirtualMachine => "api/virtualization/virtual-machines/",
            ObjectClass::Service => "api/ipam/services/",
        }
    }

    /// Human-readable collection name used in logs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectClass::Device => "devices",
            ObjectClass::VirtualMachine => "virtual-machines",
            ObjectClass::Service => "services",
        }
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filtered list query
///
/// Filters are kept in insertion order so the generated URL is stable
/// across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    class: ObjectClass,
    filters: Vec<(String, String)>,
}

impl Query {
    /// Create an unfiltered query for a collection
    #[must_use]
    pub fn new(class: ObjectClass) -> Self {
        Self {
            class,
            filters: Vec::new(),
        }
    }

    /// Require a tag (repeatable for AND logic)
    #[must_use]
    pub fn tag(self, tag: impl Into<String>) -> Self {
        self.filter("tag", tag)
    }

    /// Allow a status (repeatable for OR logic)
    #[must_use]
    pub fn status(self, status: impl Into<String>) -> Self {
        self.filter("status", status)
    }

    /// Allow each of the given statuses
    #[must_use]
    pub fn statuses<S: AsRef<str>>(self, statuses: &[S]) -> Self {
        statuses
            .iter()
            .fold(self, |query, status| query.status(status.as_ref()))
    }

    /// Add an arbitrary field filter
    #[must_use]
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Collection this query targets
    #[must_use]
    pub fn class(&self) -> ObjectClass {
        self.class
    }

    /// Filter pairs in insertion order
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.filters
    }

    /// Tag values this query requires
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.values("tag")
    }

    /// Status values this query allows
    pub fn status_values(&self) -> impl Iterator<Item = &str> {
        self.values("status")
    }

    fn values<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.filters
            .iter()
            .filter(move |(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class.endpoint())?;
        for (i, (field, value)) in self.filters.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{field}={value}")?;
        }
        Ok(())
    }
}
