//! Wallet Error Types
//!
//! Every public operation returns `Result<_, WalletError>`. A returned error means
//! the call had no effect: no ledger write, no event, no approver-list change.

use std::fmt;

use thiserror::Error;

/// Role a guarded operation requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Owner,
    PlatformAdmin,
    Approver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::PlatformAdmin => "platform admin",
            Role::Approver => "approver",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What an offered amount was being drawn down for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OfferUse {
    Cancel,
    Clear,
}

impl OfferUse {
    /// Revert text when the offer is too small for this use
    pub fn shortfall_message(&self) -> &'static str {
        match self {
            OfferUse::Cancel => "Amount requested to be canceled is more than offered",
            OfferUse::Clear => "Investor does not have sufficient balance of token",
        }
    }
}

/// Wallet error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    // === Access Errors ===
    #[error("This action is only for {0}")]
    Unauthorized(Role),

    // === Ledger Errors ===
    #[error("Investor does not have sufficient balance of token")]
    InsufficientBalance,

    #[error("{}", .0.shortfall_message())]
    InsufficientOffered(OfferUse),

    #[error("Amount would cause overflow")]
    Overflow,

    // === Custody Errors ===
    #[error("Token transfer failed: {0}")]
    TransferFailed(String),

    // === Enumeration Errors ===
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid range: begin {begin} > end {end}")]
    InvalidRange { begin: usize, end: usize },

    // === Approval Errors ===
    #[error("Quorum of {required} unreachable with {approvers} approvers")]
    QuorumUnreachable { required: usize, approvers: usize },
}

impl WalletError {
    /// Stable error code for logs and script output
    pub fn code(&self) -> &'static str {
        match self {
            WalletError::Unauthorized(_) => "UNAUTHORIZED",
            WalletError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            WalletError::InsufficientOffered(_) => "INSUFFICIENT_OFFERED",
            WalletError::Overflow => "OVERFLOW",
            WalletError::TransferFailed(_) => "TRANSFER_FAILED",
            WalletError::IndexOutOfRange { .. } => "INDEX_OUT_OF_RANGE",
            WalletError::InvalidRange { .. } => "INVALID_RANGE",
            WalletError::QuorumUnreachable { .. } => "QUORUM_UNREACHABLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            WalletError::Unauthorized(Role::Owner).code(),
            "UNAUTHORIZED"
        );
        assert_eq!(
            WalletError::InsufficientBalance.code(),
            "INSUFFICIENT_BALANCE"
        );
        assert_eq!(
            WalletError::TransferFailed("allowance".into()).code(),
            "TRANSFER_FAILED"
        );
    }

    #[test]
    fn test_revert_messages() {
        assert_eq!(
            WalletError::Unauthorized(Role::PlatformAdmin).to_string(),
            "This action is only for platform admin"
        );
        assert_eq!(
            WalletError::InsufficientBalance.to_string(),
            "Investor does not have sufficient balance of token"
        );
        assert_eq!(
            WalletError::InsufficientOffered(OfferUse::Cancel).to_string(),
            "Amount requested to be canceled is more than offered"
        );
        assert_eq!(
            WalletError::InsufficientOffered(OfferUse::Clear).to_string(),
            "Investor does not have sufficient balance of token"
        );
        assert_eq!(
            WalletError::InsufficientOffered(OfferUse::Clear).code(),
            "INSUFFICIENT_OFFERED"
        );
    }
}
