//! Core types used throughout the wallet
//!
//! These are fundamental type aliases used by all modules.
//! They provide semantic meaning and enable future type evolution.

/// Account ID - identity of any party (investor, owner, admin, approver, custody).
///
/// # Usage:
/// - Caller identity on every public operation
/// - Key component of ledger entries and approver queues
pub type AccountId = u64;

/// Token ID - identifies one custodied token contract.
///
/// # Constraints:
/// - **Immutable**: Once assigned, NEVER changes
/// - A token never seen by the wallet reads as zero everywhere
pub type TokenId = u32;

/// Withdrawal request ID - unique within the wallet, assigned sequentially
pub type RequestId = u64;

/// Sequence number stamped on every emitted event
pub type SeqNum = u64;
