//! Core types for casillero
//!
//! This module defines the foundational types:
//! - TenantId / IdentityId / TrackingId: store-assigned document identifiers
//! - Role: the recognized privilege tiers and their string forms
//! - Claims / Identity: what the signed credential carries
//! - TrackingRecord / TenantRecord / ProfileRecord: persisted document shapes
//!
//! Persisted shapes serialize with the document store's camelCase field names
//! (`trackingTokens`, `managedTenantIds`, `managerId`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Set of searchable substring tokens derived from one indexed dimension.
///
/// No duplicates, order irrelevant; `BTreeSet` keeps the persisted form stable.
pub type TokenSet = BTreeSet<String>;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw document ID
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The raw ID string
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Identifier of a tenant (client) document — the unit of multi-tenant isolation
    TenantId
);
string_id!(
    /// Stable identifier of a caller, shared by the credential and the profile record
    IdentityId
);
string_id!(
    /// Identifier of a tracking (package) document
    TrackingId
);

/// Recognized privilege tiers, from highest to lowest.
///
/// `Superadmin`, `Admin` and `Operator` form the administrative tier with
/// unrestricted tenant access. `Partner` and `PartnerAdmin` are the elevated
/// tenant-manager roles; they are profile-authoritative during resolution
/// because claims can go stale after a promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access, granted via the legacy boolean claim or an explicit role
    Superadmin,
    /// Back-office administrator
    Admin,
    /// Warehouse operator
    Operator,
    /// Partner managing one or more tenants, with admin rights over them
    PartnerAdmin,
    /// Partner managing one or more tenants
    Partner,
    /// End client, scoped to its own tenant
    Client,
}

impl Role {
    /// Parse a role from its stored string form.
    ///
    /// Returns `None` for unrecognized values; resolution treats those the
    /// same as an absent role.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "superadmin" => Some(Role::Superadmin),
            "admin" => Some(Role::Admin),
            "operator" => Some(Role::Operator),
            "partner_admin" => Some(Role::PartnerAdmin),
            "partner" => Some(Role::Partner),
            "client" => Some(Role::Client),
            _ => None,
        }
    }

    /// The stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::Operator => "operator",
            Role::PartnerAdmin => "partner_admin",
            Role::Partner => "partner",
            Role::Client => "client",
        }
    }

    /// Administrative tier: bypasses the tenant scope entirely
    pub fn is_admin_tier(&self) -> bool {
        matches!(self, Role::Superadmin | Role::Admin | Role::Operator)
    }

    /// Partner tier: profile-authoritative during role resolution
    pub fn is_partner_tier(&self) -> bool {
        matches!(self, Role::Partner | Role::PartnerAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Custom claims embedded in the signed credential.
///
/// Set by privileged operations and only effective after the caller refreshes
/// its credential, so they can be stale relative to the profile record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Claims {
    /// Role claim as stored; may be absent or an unrecognized value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Legacy superadmin grant; highest privilege always wins when set
    pub superadmin: bool,
}

/// A verified caller: stable ID plus the claims decoded from its credential
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// Stable caller identifier
    pub id: IdentityId,
    /// Claims decoded from the bearer credential
    pub claims: Claims,
}

impl Identity {
    /// Build an identity from an ID and decoded claims
    pub fn new(id: impl Into<IdentityId>, claims: Claims) -> Self {
        Identity {
            id: id.into(),
            claims,
        }
    }
}

/// Persisted tracking (package) document.
///
/// `tracking_tokens` is owned by whichever process last wrote `tracking` and
/// is rebuilt in full on every change, never partially patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackingRecord {
    /// Raw tracking code as entered or imported
    pub tracking: String,
    /// Owning tenant; used to scope reads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
    /// Search token set; absent on records that predate indexing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_tokens: Option<TokenSet>,
}

/// Persisted tenant (client) document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TenantRecord {
    /// Display name, indexed per word
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Short client code, unique at creation time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Contact email; only the local part is searchable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// The "managed-by" relationship used by the scope fallback query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<IdentityId>,
    /// Search token set over name, code and email local part
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_tokens: Option<TokenSet>,
}

/// Mutable per-identity profile document, keyed by the identity ID.
///
/// Immediately consistent, unlike claims. `managed_tenant_ids` is a
/// denormalized cache of the `managerId` relationship on tenant records and
/// is reconciled by an explicit sync operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileRecord {
    /// Role as stored on the profile; may lag or lead the claim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Cached list of managed tenant IDs; empty means "use the fallback query"
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub managed_tenant_ids: Vec<TenantId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_id_roundtrip() {
        let id = TenantId::new("t-001");
        assert_eq!(id.as_str(), "t-001");
        assert_eq!(id.to_string(), "t-001");
        assert_eq!(TenantId::from("t-001"), id);
    }

    #[test]
    fn test_role_parse_known() {
        assert_eq!(Role::parse("superadmin"), Some(Role::Superadmin));
        assert_eq!(Role::parse("partner_admin"), Some(Role::PartnerAdmin));
        assert_eq!(Role::parse("client"), Some(Role::Client));
    }

    #[test]
    fn test_role_parse_unknown() {
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::parse(""), None);
        assert_eq!(Role::parse("Partner"), None); // stored form is lowercase
    }

    #[test]
    fn test_role_parse_as_str_roundtrip() {
        for role in [
            Role::Superadmin,
            Role::Admin,
            Role::Operator,
            Role::PartnerAdmin,
            Role::Partner,
            Role::Client,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_role_tiers() {
        assert!(Role::Superadmin.is_admin_tier());
        assert!(Role::Operator.is_admin_tier());
        assert!(!Role::Partner.is_admin_tier());
        assert!(Role::Partner.is_partner_tier());
        assert!(Role::PartnerAdmin.is_partner_tier());
        assert!(!Role::Client.is_partner_tier());
    }

    #[test]
    fn test_tracking_record_wire_field_names() {
        let record = TrackingRecord {
            tracking: "1Z999AA10123456784".to_string(),
            tenant_id: Some(TenantId::new("t1")),
            tracking_tokens: Some(["1Z9".to_string()].into_iter().collect()),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("trackingTokens").is_some());
        assert!(json.get("tenantId").is_some());
        assert!(json.get("tracking_tokens").is_none());
    }

    #[test]
    fn test_profile_record_wire_field_names() {
        let record = ProfileRecord {
            role: Some("partner".to_string()),
            managed_tenant_ids: vec![TenantId::new("t1")],
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("managedTenantIds").is_some());
    }

    #[test]
    fn test_tenant_record_defaults_on_missing_fields() {
        let record: TenantRecord = serde_json::from_str("{}").unwrap();
        assert!(record.name.is_none());
        assert!(record.manager_id.is_none());
        assert!(record.client_tokens.is_none());
    }

    #[test]
    fn test_claims_default_is_unprivileged() {
        let claims = Claims::default();
        assert!(claims.role.is_none());
        assert!(!claims.superadmin);
    }

    #[test]
    fn test_claims_deserialize_legacy_superadmin() {
        let claims: Claims = serde_json::from_str(r#"{"superadmin": true}"#).unwrap();
        assert!(claims.superadmin);
        assert!(claims.role.is_none());
    }
}
