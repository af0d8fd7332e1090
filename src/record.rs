//! The DNS configuration record and the changes which can be applied to it.

use std::{fmt, net::IpAddr};

use serde::{Deserialize, Serialize};

use crate::{Error, database::FromRow};

/// A named DNS server configuration.
///
/// The identifier is the user-chosen key for the record. The primary address
/// is required and is expected to be an IP literal, though this is only
/// checked advisorily (see [`is_ip_literal`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsConfig {
    identifier: String,
    primary_address: String,
    #[serde(default)]
    secondary_address: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl DnsConfig {
    /// Create a record with only the required fields set.
    pub fn new(identifier: impl Into<String>, primary_address: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            primary_address: primary_address.into(),
            secondary_address: None,
            description: None,
        }
    }

    /// Set the secondary address. A blank address leaves the record without one.
    pub fn with_secondary_address(mut self, address: impl Into<String>) -> Self {
        self.secondary_address = present(address.into());
        self
    }

    /// Set the description. A blank description leaves the record without one.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = present(description.into());
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn primary_address(&self) -> &str {
        &self.primary_address
    }

    pub fn secondary_address(&self) -> Option<&str> {
        self.secondary_address.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Check the invariants the store enforces on every record.
    pub fn validate(&self) -> Result<(), Error> {
        require_non_empty("identifier", &self.identifier)?;
        require_non_empty("primary address", &self.primary_address)?;
        Ok(())
    }

    /// Addresses on this record which do not parse as IP literals.
    pub fn suspicious_addresses(&self) -> Vec<&str> {
        std::iter::once(self.primary_address.as_str())
            .chain(self.secondary_address.as_deref())
            .filter(|address| !is_ip_literal(address))
            .collect()
    }

    /// Apply a set of changes in place.
    pub(crate) fn apply(&mut self, changes: &Modification) {
        if let Some(identifier) = &changes.identifier {
            self.identifier.clone_from(identifier);
        }
        if let Some(address) = &changes.primary_address {
            self.primary_address.clone_from(address);
        }
        if let Some(address) = changes.secondary_address.clone().and_then(present) {
            self.secondary_address = Some(address);
        }
        if let Some(description) = changes.description.clone().and_then(present) {
            self.description = Some(description);
        }
    }
}

impl fmt::Display for DnsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}", self.identifier, self.primary_address)?;
        if let Some(secondary) = &self.secondary_address {
            write!(f, ", {secondary}")?;
        }
        write!(f, ")")
    }
}

impl FromRow for DnsConfig {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self>
    where
        Self: Sized,
    {
        Ok(DnsConfig {
            identifier: row.get("identifier")?,
            primary_address: row.get("primary_address")?,
            secondary_address: row.get("secondary_address")?,
            description: row.get("description")?,
        })
    }
}

/// Fields to update on an existing record. `None` leaves the field as it is.
///
/// The setters treat a blank value as "not supplied", so positional CLI
/// arguments can be skipped by passing `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modification {
    pub identifier: Option<String>,
    pub primary_address: Option<String>,
    pub secondary_address: Option<String>,
    pub description: Option<String>,
}

impl Modification {
    pub fn is_empty(&self) -> bool {
        self.identifier.is_none()
            && self.primary_address.is_none()
            && self.secondary_address.is_none()
            && self.description.is_none()
    }

    pub fn rename(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = present(identifier.into());
        self
    }

    pub fn primary_address(mut self, address: impl Into<String>) -> Self {
        self.primary_address = present(address.into());
        self
    }

    pub fn secondary_address(mut self, address: impl Into<String>) -> Self {
        self.secondary_address = present(address.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = present(description.into());
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if let Some(identifier) = &self.identifier {
            require_non_empty("identifier", identifier)?;
        }
        if let Some(address) = &self.primary_address {
            require_non_empty("primary address", address)?;
        }
        Ok(())
    }
}

/// Whether `address` is an IPv4 or IPv6 literal.
pub fn is_ip_literal(address: &str) -> bool {
    address.parse::<IpAddr>().is_ok()
}

/// `None` for a blank value, the value itself otherwise.
pub fn present(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}

fn require_non_empty(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArgument(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_optional_fields() {
        let record = DnsConfig::new("cloudflare", "1.1.1.1");
        assert_eq!(record.identifier(), "cloudflare");
        assert_eq!(record.primary_address(), "1.1.1.1");
        assert_eq!(record.secondary_address(), None);
        assert_eq!(record.description(), None);
    }

    #[test]
    fn test_validate_rejects_empty_primary() {
        let record = DnsConfig::new("broken", "  ");
        assert!(matches!(record.validate(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_validate_rejects_empty_identifier() {
        let record = DnsConfig::new("", "8.8.8.8");
        assert!(matches!(record.validate(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_ip_literal_detection() {
        assert!(is_ip_literal("8.8.8.8"));
        assert!(is_ip_literal("2001:4860:4860::8888"));
        assert!(!is_ip_literal("dns.google"));
        assert!(!is_ip_literal("8.8.8"));
    }

    #[test]
    fn test_suspicious_addresses() {
        let record = DnsConfig::new("mixed", "8.8.8.8").with_secondary_address("dns.google");
        assert_eq!(record.suspicious_addresses(), vec!["dns.google"]);
    }

    #[test]
    fn test_apply_only_supplied_fields() {
        let mut record = DnsConfig::new("google", "8.8.8.8")
            .with_secondary_address("8.8.4.4")
            .with_description("Google DNS");

        record.apply(&Modification::default().primary_address("1.1.1.1"));

        assert_eq!(record.identifier(), "google");
        assert_eq!(record.primary_address(), "1.1.1.1");
        assert_eq!(record.secondary_address(), Some("8.8.4.4"));
        assert_eq!(record.description(), Some("Google DNS"));
    }

    #[test]
    fn test_blank_optional_fields_are_absent() {
        let record = DnsConfig::new("quad9", "9.9.9.9")
            .with_secondary_address("")
            .with_description("  ");
        assert_eq!(record.secondary_address(), None);
        assert_eq!(record.description(), None);
        assert!(record.suspicious_addresses().is_empty());
    }

    #[test]
    fn test_blank_modification_fields_are_not_supplied() {
        let changes = Modification::default()
            .rename("")
            .primary_address("1.1.1.1")
            .secondary_address(" ");
        assert_eq!(changes.identifier, None);
        assert_eq!(changes.secondary_address, None);
        assert_eq!(changes.primary_address.as_deref(), Some("1.1.1.1"));
        assert!(changes.validate().is_ok());
    }

    #[test]
    fn test_apply_ignores_blank_fields() {
        let mut record = DnsConfig::new("google", "8.8.8.8").with_secondary_address("8.8.4.4");
        record.apply(&Modification {
            secondary_address: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(record.secondary_address(), Some("8.8.4.4"));
    }

    #[test]
    fn test_modification_is_empty() {
        assert!(Modification::default().is_empty());
        assert!(!Modification::default().rename("g").is_empty());
    }

    #[test]
    fn test_display() {
        let record = DnsConfig::new("google", "8.8.8.8").with_secondary_address("8.8.4.4");
        assert_eq!(record.to_string(), "google (8.8.8.8, 8.8.4.4)");
    }

    #[test]
    fn test_serialize_shape() {
        let record = DnsConfig::new("google", "8.8.8.8");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["identifier"], "google");
        assert_eq!(value["secondary_address"], serde_json::Value::Null);
    }
}
