//! Trading - escrowed offers and admin-cleared settlement
//!
//! Tokens never leave custody here. Offering moves spendable balance into
//! `offered`; cancelling moves it back; clearing (platform admin only) moves
//! it from a seller's `offered` into a buyer's `balance`.

use tracing::info;

use crate::core_types::{AccountId, TokenId};
use crate::error::WalletError;
use crate::events::WalletEvent;
use crate::wallet::{BrokerageWallet, reject};

impl BrokerageWallet {
    /// Commit `amount` of the caller's spendable balance to an offer.
    ///
    /// Offers accumulate: the total offered must still fit under balance.
    pub fn offer_tokens(
        &mut self,
        caller: AccountId,
        token: TokenId,
        amount: u64,
    ) -> Result<WalletEvent, WalletError> {
        self.ledger
            .reserve(token, caller, amount)
            .inspect_err(|e| reject("offer_tokens", caller, e))?;

        let (balance, offered) = self.ledger.balance_of(token, caller);
        info!(token, investor = caller, amount, balance, offered, "Tokens offered");
        Ok(self.emit(|seq| WalletEvent::TokensOffered {
            seq,
            token,
            investor: caller,
            amount,
        }))
    }

    pub fn cancel_offer(
        &mut self,
        caller: AccountId,
        token: TokenId,
        amount: u64,
    ) -> Result<WalletEvent, WalletError> {
        self.ledger
            .release(token, caller, amount)
            .inspect_err(|e| reject("cancel_offer", caller, e))?;

        let (balance, offered) = self.ledger.balance_of(token, caller);
        info!(token, investor = caller, amount, balance, offered, "Token offer canceled");
        Ok(self.emit(|seq| WalletEvent::TokenOfferCanceled {
            seq,
            token,
            investor: caller,
            amount,
        }))
    }

    /// Settle an off-book trade: `src.offered -= amount`, `dst.balance += amount`.
    pub fn clear_tokens(
        &mut self,
        caller: AccountId,
        token: TokenId,
        src: AccountId,
        dst: AccountId,
        amount: u64,
    ) -> Result<WalletEvent, WalletError> {
        self.access
            .only_platform_admin(caller)
            .and_then(|_| self.ledger.settle(token, src, dst, amount))
            .inspect_err(|e| reject("clear_tokens", caller, e))?;

        info!(token, src, dst, amount, "Token offer cleared");
        Ok(self.emit(|seq| WalletEvent::TokenOfferCleared {
            seq,
            token,
            src,
            dst,
            amount,
        }))
    }
}
