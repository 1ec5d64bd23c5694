//! Wallet events
//!
//! One event per committed mutation, carrying the operation's key
//! parameters for external observers and auditors. Failed calls emit nothing.

use serde::{Deserialize, Serialize};

use crate::core_types::{AccountId, RequestId, SeqNum, TokenId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum WalletEvent {
    Deposit {
        seq: SeqNum,
        token: TokenId,
        investor: AccountId,
        amount: u64,
    },
    TokensOffered {
        seq: SeqNum,
        token: TokenId,
        investor: AccountId,
        amount: u64,
    },
    TokenOfferCanceled {
        seq: SeqNum,
        token: TokenId,
        investor: AccountId,
        amount: u64,
    },
    TokenOfferCleared {
        seq: SeqNum,
        token: TokenId,
        src: AccountId,
        dst: AccountId,
        amount: u64,
    },
    WithdrawalRequested {
        seq: SeqNum,
        request_id: RequestId,
        token: TokenId,
        investor: AccountId,
        amount: u64,
        approvers: usize,
        required: usize,
    },
    WithdrawalApproved {
        seq: SeqNum,
        request_id: RequestId,
        approver: AccountId,
        approvals: usize,
    },
    WithdrawalExecuted {
        seq: SeqNum,
        request_id: RequestId,
        token: TokenId,
        investor: AccountId,
        amount: u64,
    },
    ApproverAdded {
        seq: SeqNum,
        approver: AccountId,
    },
    ApproverRemoved {
        seq: SeqNum,
        approver: AccountId,
    },
    OwnershipTransferred {
        seq: SeqNum,
        previous_owner: AccountId,
        new_owner: AccountId,
    },
    PlatformAdminChanged {
        seq: SeqNum,
        previous_admin: AccountId,
        new_admin: AccountId,
    },
}

impl WalletEvent {
    pub fn seq(&self) -> SeqNum {
        match self {
            WalletEvent::Deposit { seq, .. }
            | WalletEvent::TokensOffered { seq, .. }
            | WalletEvent::TokenOfferCanceled { seq, .. }
            | WalletEvent::TokenOfferCleared { seq, .. }
            | WalletEvent::WithdrawalRequested { seq, .. }
            | WalletEvent::WithdrawalApproved { seq, .. }
            | WalletEvent::WithdrawalExecuted { seq, .. }
            | WalletEvent::ApproverAdded { seq, .. }
            | WalletEvent::ApproverRemoved { seq, .. }
            | WalletEvent::OwnershipTransferred { seq, .. }
            | WalletEvent::PlatformAdminChanged { seq, .. } => *seq,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WalletEvent::Deposit { .. } => "LogDeposit",
            WalletEvent::TokensOffered { .. } => "LogTokensOffered",
            WalletEvent::TokenOfferCanceled { .. } => "LogTokenOfferCanceled",
            WalletEvent::TokenOfferCleared { .. } => "LogTokenOfferCleared",
            WalletEvent::WithdrawalRequested { .. } => "LogWithdrawalRequested",
            WalletEvent::WithdrawalApproved { .. } => "LogWithdrawalApproved",
            WalletEvent::WithdrawalExecuted { .. } => "LogWithdrawalExecuted",
            WalletEvent::ApproverAdded { .. } => "LogApproverAdded",
            WalletEvent::ApproverRemoved { .. } => "LogApproverRemoved",
            WalletEvent::OwnershipTransferred { .. } => "OwnershipTransferred",
            WalletEvent::PlatformAdminChanged { .. } => "LogPlatformAdminChanged",
        }
    }
}
