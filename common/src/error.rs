//! Error types for LedgerView read operations.

use thiserror::Error;

/// Main error type for ledger reads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The transaction store or account directory could not be reached.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A single-record lookup found nothing.
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// An identifier is not well-formed for the store's identifier type.
    #[error("Invalid identifier {value:?}: {reason}")]
    InvalidIdentifier { value: String, reason: String },

    /// An account with this address already exists.
    #[error("Duplicate account address: {0}")]
    DuplicateAccount(String),

    /// Balance accumulation left the representable decimal range.
    #[error("Balance overflow for {0}")]
    BalanceOverflow(String),

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// The caller's deadline elapsed before the store answered.
    #[error("Deadline exceeded after {elapsed_ms}ms")]
    DeadlineExceeded { elapsed_ms: u64 },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LedgerError {
    /// Shorthand for a missing transaction.
    pub fn transaction_not_found(key: impl ToString) -> Self {
        LedgerError::NotFound {
            kind: "Transaction",
            key: key.to_string(),
        }
    }

    /// Shorthand for a missing account.
    pub fn account_not_found(key: impl ToString) -> Self {
        LedgerError::NotFound {
            kind: "Account",
            key: key.to_string(),
        }
    }

    /// Check if a calling layer may retry this error.
    ///
    /// The engine itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::StoreUnavailable(_) | LedgerError::DeadlineExceeded { .. }
        )
    }

    /// Whether the error means "no such record" rather than a service fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::NotFound { .. })
    }

    /// Get error code for presentation layers.
    pub fn error_code(&self) -> &'static str {
        match self {
            LedgerError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            LedgerError::NotFound { .. } => "NOT_FOUND",
            LedgerError::InvalidIdentifier { .. } => "INVALID_IDENTIFIER",
            LedgerError::DuplicateAccount(_) => "DUPLICATE_ACCOUNT",
            LedgerError::BalanceOverflow(_) => "BALANCE_OVERFLOW",
            LedgerError::Cancelled => "CANCELLED",
            LedgerError::DeadlineExceeded { .. } => "DEADLINE_EXCEEDED",
            LedgerError::ConfigurationError(_) => "CONFIGURATION_ERROR",
        }
    }
}

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
