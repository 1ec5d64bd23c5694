//! In-memory token bank
//!
//! A [`TokenGateway`] that keeps ERC-20-like balances and allowances in RAM.
//! Used by the script runner and by tests; behaves like a mock token
//! contract where the wallet's custody account is the only spender.

use std::sync::Mutex;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::core_types::{AccountId, TokenId};
use crate::gateway::{GatewayError, TokenGateway, TransferId};

#[derive(Debug, Clone, Copy)]
struct TransferRecord {
    token: TokenId,
    from: AccountId,
    to: AccountId,
    amount: u64,
    /// Allowance consumed by the transfer, restored on rollback
    allowance_used: bool,
}

#[derive(Debug, Default)]
struct BankState {
    balances: FxHashMap<(TokenId, AccountId), u64>,
    /// (token, owner) → amount custody may pull
    allowances: FxHashMap<(TokenId, AccountId), u64>,
    transfers: FxHashMap<TransferId, TransferRecord>,
    /// Reject every transfer leaving custody
    fail_outbound: bool,
}

pub struct MemoryTokenBank {
    custody: AccountId,
    state: Mutex<BankState>,
}

impl MemoryTokenBank {
    pub fn new(custody: AccountId) -> Self {
        Self {
            custody,
            state: Mutex::new(BankState::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BankState> {
        // state is never left half-written, so a poisoned lock is still usable
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create `amount` of `token` out of thin air for `to`
    pub fn mint(&self, token: TokenId, to: AccountId, amount: u64) {
        let mut state = self.lock();
        let bal = state.balances.entry((token, to)).or_default();
        *bal = bal.saturating_add(amount);
    }

    /// Allow custody to pull `amount` more of `token` from `owner`
    pub fn increase_allowance(&self, token: TokenId, owner: AccountId, amount: u64) {
        let mut state = self.lock();
        let allowance = state.allowances.entry((token, owner)).or_default();
        *allowance = allowance.saturating_add(amount);
    }

    pub fn balance_of(&self, token: TokenId, account: AccountId) -> u64 {
        self.lock()
            .balances
            .get(&(token, account))
            .copied()
            .unwrap_or(0)
    }

    pub fn allowance(&self, token: TokenId, owner: AccountId) -> u64 {
        self.lock()
            .allowances
            .get(&(token, owner))
            .copied()
            .unwrap_or(0)
    }

    pub fn set_fail_outbound(&self, fail: bool) {
        self.lock().fail_outbound = fail;
    }

    pub fn transfer_count(&self) -> usize {
        self.lock().transfers.len()
    }
}

impl TokenGateway for MemoryTokenBank {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn custody(&self) -> AccountId {
        self.custody
    }

    fn transfer(
        &self,
        id: TransferId,
        token: TokenId,
        from: AccountId,
        to: AccountId,
        amount: u64,
    ) -> Result<(), GatewayError> {
        let mut state = self.lock();

        if from == self.custody && state.fail_outbound {
            return Err(GatewayError::Rejected("outbound transfers disabled".into()));
        }

        // Validate everything first
        let has = state.balances.get(&(token, from)).copied().unwrap_or(0);
        if has < amount {
            return Err(GatewayError::InsufficientFunds { has, needs: amount });
        }
        let allowance_used = from != self.custody;
        if allowance_used {
            let allowed = state.allowances.get(&(token, from)).copied().unwrap_or(0);
            if allowed < amount {
                return Err(GatewayError::InsufficientAllowance {
                    has: allowed,
                    needs: amount,
                });
            }
        }

        // Apply
        if allowance_used {
            *state.allowances.entry((token, from)).or_default() -= amount;
        }
        *state.balances.entry((token, from)).or_default() -= amount;
        let to_bal = state.balances.entry((token, to)).or_default();
        *to_bal = to_bal.saturating_add(amount);
        state.transfers.insert(
            id,
            TransferRecord {
                token,
                from,
                to,
                amount,
                allowance_used,
            },
        );

        debug!(transfer_id = %id, token, from, to, amount, "Token transfer");
        Ok(())
    }

    fn rollback(&self, id: TransferId) -> Result<(), GatewayError> {
        let mut state = self.lock();
        let record = state
            .transfers
            .remove(&id)
            .ok_or(GatewayError::UnknownTransfer(id))?;

        let to_bal = state.balances.entry((record.token, record.to)).or_default();
        *to_bal = to_bal.saturating_sub(record.amount);
        let from_bal = state
            .balances
            .entry((record.token, record.from))
            .or_default();
        *from_bal = from_bal.saturating_add(record.amount);
        if record.allowance_used {
            let allowance = state
                .allowances
                .entry((record.token, record.from))
                .or_default();
            *allowance = allowance.saturating_add(record.amount);
        }

        debug!(transfer_id = %id, "Token transfer rolled back");
        Ok(())
    }
}
