//! Identifier types for ledger records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{LedgerError, Result};

/// Store-assigned identifier of a transaction record.
/// Uses UUID v7 so identifiers sort in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Create a new transaction ID.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse from string, rejecting anything that is not a UUID.
    pub fn parse(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| LedgerError::InvalidIdentifier {
                value: s.to_string(),
                reason: e.to_string(),
            })
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for TransactionId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque address identifying an account.
///
/// The format is owned by whoever writes the ledger; nothing here validates it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountAddress(String);

impl AccountAddress {
    /// Create a new address.
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// Get the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AccountAddress {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for AccountAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_id_creation() {
        let id1 = TransactionId::new();
        let id2 = TransactionId::new();
        assert_ne!(id1, id2);
        assert!(id1 < id2);
    }

    #[test]
    fn test_transaction_id_parse() {
        let uuid_str = "019456ab-1234-7def-8901-234567890abc";
        let id = TransactionId::parse(uuid_str).unwrap();
        assert_eq!(id.to_string(), uuid_str);
    }

    #[test]
    fn test_transaction_id_rejects_garbage() {
        let err = TransactionId::parse("64b7f0c2e4b0a1a2b3c4d5e6").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidIdentifier { .. }));
        assert_eq!(err.error_code(), "INVALID_IDENTIFIER");
    }

    #[test]
    fn test_address_is_opaque() {
        let addr = AccountAddress::from("not a valid anything!");
        assert_eq!(addr.as_str(), "not a valid anything!");
        assert_eq!(
            serde_json::to_string(&addr).unwrap(),
            "\"not a valid anything!\""
        );
    }
}
