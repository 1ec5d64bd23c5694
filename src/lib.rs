//! Brokerage Wallet - custodial token ledger
//!
//! Investors deposit tokens into custody, post offers against their
//! balance, get matched off-book by the platform admin, and withdraw through
//! an N-of-M approver quorum.
//!
//! # Modules
//!
//! - [`core_types`] - Core type definitions (AccountId, TokenId, etc.)
//! - [`balance`] - Enforced balance type
//! - [`ledger`] - Per (token, investor) balances and mutation primitives
//! - [`access`] - Owner / platform admin roles
//! - [`approvers`] - Enumerable approver set
//! - [`withdrawal`] - Withdrawal records, approver queues, quorum
//! - [`wallet`] - The wallet itself; operations live in [`custody`],
//!   [`trading`] and [`approval`]
//! - [`gateway`] - External token movement seam
//! - [`token_bank`] - In-memory token bank behind the gateway
//! - [`events`] / [`journal`] - Emitted events and their JSON-lines log
//! - [`script`] - YAML-scripted sessions

// Core types - must be first!
pub mod core_types;

pub mod error;

// Wallet state
pub mod access;
pub mod approvers;
pub mod balance;
pub mod ledger;
pub mod withdrawal;

// Wallet and its operations
pub mod approval;
pub mod custody;
pub mod trading;
pub mod wallet;

// External side
pub mod events;
pub mod gateway;
pub mod journal;
pub mod token_bank;

// Runtime
pub mod config;
pub mod logging;
pub mod script;

// Convenient re-exports at crate root
pub use balance::Balance;
pub use core_types::{AccountId, RequestId, SeqNum, TokenId};
pub use error::{OfferUse, Role, WalletError};
pub use events::WalletEvent;
pub use gateway::{GatewayError, TokenGateway, TransferId};
pub use ledger::{Holding, Ledger};
pub use token_bank::MemoryTokenBank;
pub use wallet::BrokerageWallet;
pub use withdrawal::{QuorumPolicy, WithdrawalRequest, WithdrawalView};
