//! Custody - deposits into the wallet
//!
//! The ONLY path that brings tokens into custody. Credit-after-confirm:
//!
//! ```text
//! pre-check credit → gateway.transfer(investor → custody) → ledger.credit → LogDeposit
//!                              ↓
//!                    Err(TransferFailed), ledger untouched
//! ```

use tracing::info;

use crate::core_types::{AccountId, TokenId};
use crate::error::WalletError;
use crate::events::WalletEvent;
use crate::gateway::TransferId;
use crate::wallet::{BrokerageWallet, reject};

impl BrokerageWallet {
    /// Pull `amount` of `token` from `caller` into custody and credit their ledger.
    pub fn deposit(
        &mut self,
        caller: AccountId,
        token: TokenId,
        amount: u64,
    ) -> Result<WalletEvent, WalletError> {
        self.deposit_inner(caller, token, amount)
            .inspect_err(|e| reject("deposit", caller, e))
    }

    fn deposit_inner(
        &mut self,
        caller: AccountId,
        token: TokenId,
        amount: u64,
    ) -> Result<WalletEvent, WalletError> {
        // 1. Pre-check: the credit must be applicable once the tokens arrive
        self.ledger.get(token, caller).check_credit(amount)?;

        // 2. External transfer
        let transfer_id = TransferId::new();
        let custody = self.gateway.custody();
        self.gateway
            .transfer(transfer_id, token, caller, custody, amount)
            .map_err(|e| WalletError::TransferFailed(e.to_string()))?;

        // 3. Commit
        self.ledger.credit(token, caller, amount)?;

        let (balance, offered) = self.ledger.balance_of(token, caller);
        info!(
            token,
            investor = caller,
            amount,
            balance,
            offered,
            transfer_id = %transfer_id,
            "Deposit credited"
        );
        Ok(self.emit(|seq| WalletEvent::Deposit {
            seq,
            token,
            investor: caller,
            amount,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::core_types::{AccountId, TokenId};
    use crate::error::WalletError;
    use crate::events::WalletEvent;
    use crate::token_bank::MemoryTokenBank;
    use crate::wallet::BrokerageWallet;
    use crate::withdrawal::QuorumPolicy;

    const CUSTODY: AccountId = 0;
    const OWNER: AccountId = 1;
    const INVESTOR: AccountId = 1001;
    const TOKEN: TokenId = 5;

    fn setup() -> (BrokerageWallet, Arc<MemoryTokenBank>) {
        let bank = Arc::new(MemoryTokenBank::new(CUSTODY));
        bank.mint(TOKEN, INVESTOR, 1000);
        let wallet = BrokerageWallet::new(OWNER, OWNER, QuorumPolicy::Majority, bank.clone());
        (wallet, bank)
    }

    #[test]
    fn test_deposit_credits_and_moves_tokens() {
        let (mut w, bank) = setup();
        bank.increase_allowance(TOKEN, INVESTOR, 100);

        let ev = w.deposit(INVESTOR, TOKEN, 100).unwrap();
        assert_eq!(
            ev,
            WalletEvent::Deposit {
                seq: 1,
                token: TOKEN,
                investor: INVESTOR,
                amount: 100
            }
        );
        assert_eq!(w.balance_of(TOKEN, INVESTOR), (100, 0));
        assert_eq!(bank.balance_of(TOKEN, INVESTOR), 900);
        assert_eq!(bank.balance_of(TOKEN, CUSTODY), 100);
    }

    #[test]
    fn test_failed_transfer_leaves_no_trace() {
        let (mut w, bank) = setup();
        bank.increase_allowance(TOKEN, INVESTOR, 100);

        let err = w.deposit(INVESTOR, TOKEN, 150).unwrap_err();
        assert!(matches!(err, WalletError::TransferFailed(_)));

        assert_eq!(w.balance_of(TOKEN, INVESTOR), (0, 0));
        assert!(w.ledger().entries().is_empty());
        assert!(w.events().is_empty());
        assert_eq!(bank.balance_of(TOKEN, INVESTOR), 1000);
        assert_eq!(bank.balance_of(TOKEN, CUSTODY), 0);
    }

    #[test]
    fn test_overflowing_credit_is_rejected_before_transfer() {
        let (mut w, bank) = setup();
        bank.mint(TOKEN, INVESTOR, u64::MAX - 1000);
        bank.increase_allowance(TOKEN, INVESTOR, u64::MAX);
        w.deposit(INVESTOR, TOKEN, u64::MAX).unwrap();

        let before = bank.transfer_count();
        assert_eq!(w.deposit(INVESTOR, TOKEN, 1), Err(WalletError::Overflow));
        assert_eq!(bank.transfer_count(), before);
    }
}
