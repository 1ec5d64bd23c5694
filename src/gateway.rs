//! Token Gateway - boundary to the external token-transfer mechanism
//!
//! The wallet never moves tokens itself. Deposits pull from the investor into
//! the custody account and approved withdrawals push from custody back out,
//! both through a [`TokenGateway`].
//!
//! # Contract
//!
//! 1. `transfer` is synchronous-or-fails: on `Err` nothing moved
//! 2. Every transfer carries a [`TransferId`]; `rollback` reverses a transfer
//!    that succeeded, used only to compensate a multi-transfer batch that
//!    failed part-way
//! 3. Pulling from an account other than custody consumes that account's
//!    allowance to custody (ERC-20 `transferFrom` semantics)

use std::fmt;

use thiserror::Error;

use crate::core_types::{AccountId, TokenId};

/// Unique identifier of one external transfer - ULID-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransferId(ulid::Ulid);

impl TransferId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("insufficient token balance: has {has}, needs {needs}")]
    InsufficientFunds { has: u64, needs: u64 },

    #[error("insufficient allowance: has {has}, needs {needs}")]
    InsufficientAllowance { has: u64, needs: u64 },

    #[error("transfer not found: {0}")]
    UnknownTransfer(TransferId),

    #[error("token transfer rejected: {0}")]
    Rejected(String),
}

/// External token-transfer capability
pub trait TokenGateway: Send + Sync {
    /// Gateway name for logging
    fn name(&self) -> &'static str;

    /// Account that holds all custodied tokens
    fn custody(&self) -> AccountId;

    /// Move `amount` of `token` from `from` to `to`
    fn transfer(
        &self,
        id: TransferId,
        token: TokenId,
        from: AccountId,
        to: AccountId,
        amount: u64,
    ) -> Result<(), GatewayError>;

    /// Reverse a previously successful transfer
    fn rollback(&self, id: TransferId) -> Result<(), GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_ids_are_distinct_ulids() {
        let a = TransferId::new();
        let b = TransferId::default();
        assert_ne!(a, b);
        assert_eq!(a.to_string().len(), 26);
        assert_eq!(
            GatewayError::UnknownTransfer(a).to_string(),
            format!("transfer not found: {}", a)
        );
    }
}
