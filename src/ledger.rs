//! Ledger - custodied holdings keyed by (token, investor)
//!
//! Entries are created lazily: a pair never touched reads as an all-zero
//! [`Balance`], and a pair brought back to zero is indistinguishable from one
//! never touched.
//!
//! Every primitive validates ALL involved entries before writing any of them,
//! so a failed call leaves the ledger byte-for-byte unchanged.

use rustc_hash::FxHashMap;

use crate::balance::Balance;
use crate::core_types::{AccountId, TokenId};
use crate::error::{OfferUse, WalletError};

/// Read projection of one ledger entry: (held balance, offered)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Holding {
    pub token: TokenId,
    pub investor: AccountId,
    pub balance: u64,
    pub offered: u64,
}

#[derive(Debug, Default, Clone)]
pub struct Ledger {
    entries: FxHashMap<(TokenId, AccountId), Balance>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    // ============================================================
    // QUERY OPERATIONS (Read-Only)
    // ============================================================

    /// Entry for the pair, zero if never touched
    #[inline]
    pub fn get(&self, token: TokenId, investor: AccountId) -> Balance {
        self.entries
            .get(&(token, investor))
            .copied()
            .unwrap_or_default()
    }

    /// `(balance, offered)` for the pair
    #[inline]
    pub fn balance_of(&self, token: TokenId, investor: AccountId) -> (u64, u64) {
        let bal = self.get(token, investor);
        (bal.held(), bal.offered())
    }

    /// All non-zero entries sorted by (token, investor)
    pub fn entries(&self) -> Vec<Holding> {
        let mut out: Vec<Holding> = self
            .entries
            .iter()
            .filter(|(_, bal)| !bal.is_zero())
            .map(|(&(token, investor), bal)| Holding {
                token,
                investor,
                balance: bal.held(),
                offered: bal.offered(),
            })
            .collect();
        out.sort_by_key(|h| (h.token, h.investor));
        out
    }

    // ============================================================
    // MUTATION PRIMITIVES
    // ============================================================

    pub fn credit(
        &mut self,
        token: TokenId,
        investor: AccountId,
        amount: u64,
    ) -> Result<(), WalletError> {
        self.get(token, investor).check_credit(amount)?;
        self.entry_mut(token, investor).credit(amount)
    }

    pub fn debit(
        &mut self,
        token: TokenId,
        investor: AccountId,
        amount: u64,
    ) -> Result<(), WalletError> {
        self.get(token, investor).check_spendable(amount)?;
        self.entry_mut(token, investor).debit(amount)
    }

    /// balance → offered
    pub fn reserve(
        &mut self,
        token: TokenId,
        investor: AccountId,
        amount: u64,
    ) -> Result<(), WalletError> {
        self.get(token, investor).check_spendable(amount)?;
        self.entry_mut(token, investor).reserve(amount)
    }

    /// offered → balance
    pub fn release(
        &mut self,
        token: TokenId,
        investor: AccountId,
        amount: u64,
    ) -> Result<(), WalletError> {
        self.get(token, investor).check_offered(amount, OfferUse::Cancel)?;
        self.entry_mut(token, investor).release(amount)
    }

    /// Atomic clearing: seller `offered -= amount`, buyer `balance += amount`.
    ///
    /// Both sides are validated before either is written. A self-trade
    /// (`seller == buyer`) is validated against the single shared entry.
    pub fn settle(
        &mut self,
        token: TokenId,
        seller: AccountId,
        buyer: AccountId,
        amount: u64,
    ) -> Result<(), WalletError> {
        self.get(token, seller).check_offered(amount, OfferUse::Clear)?;
        self.get(token, buyer).check_credit(amount)?;

        self.entry_mut(token, seller).spend_offered(amount)?;
        self.entry_mut(token, buyer).credit(amount)
    }

    /// Overwrite the pair with a balance already validated elsewhere
    pub(crate) fn store(&mut self, token: TokenId, investor: AccountId, balance: Balance) {
        self.entries.insert((token, investor), balance);
    }

    fn entry_mut(&mut self, token: TokenId, investor: AccountId) -> &mut Balance {
        self.entries.entry((token, investor)).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: TokenId = 7;
    const ALICE: AccountId = 1001;
    const BOB: AccountId = 1002;

    #[test]
    fn test_untouched_pair_reads_zero() {
        let ledger = Ledger::new();
        assert_eq!(ledger.balance_of(TOKEN, ALICE), (0, 0));
        assert!(ledger.entries().is_empty());
    }

    #[test]
    fn test_failed_reserve_creates_no_entry() {
        let mut ledger = Ledger::new();
        assert_eq!(
            ledger.reserve(TOKEN, ALICE, 1),
            Err(WalletError::InsufficientBalance)
        );
        assert!(ledger.entries.is_empty());
    }

    #[test]
    fn test_settle_moves_offered_to_buyer_balance() {
        let mut ledger = Ledger::new();
        ledger.credit(TOKEN, ALICE, 100).unwrap();
        ledger.reserve(TOKEN, ALICE, 100).unwrap();

        ledger.settle(TOKEN, ALICE, BOB, 100).unwrap();

        assert_eq!(ledger.balance_of(TOKEN, ALICE), (100, 0));
        assert_eq!(ledger.balance_of(TOKEN, BOB), (100, 0));
    }

    #[test]
    fn test_settle_insufficient_offered_is_untouched() {
        let mut ledger = Ledger::new();
        ledger.credit(TOKEN, ALICE, 100).unwrap();
        ledger.reserve(TOKEN, ALICE, 40).unwrap();
        let alice_before = ledger.get(TOKEN, ALICE);

        assert_eq!(
            ledger.settle(TOKEN, ALICE, BOB, 41),
            Err(WalletError::InsufficientOffered(OfferUse::Clear))
        );
        assert_eq!(ledger.get(TOKEN, ALICE), alice_before);
        assert_eq!(ledger.get(TOKEN, BOB), Balance::default());
    }

    #[test]
    fn test_settle_buyer_overflow_leaves_seller_untouched() {
        let mut ledger = Ledger::new();
        ledger.credit(TOKEN, ALICE, 10).unwrap();
        ledger.reserve(TOKEN, ALICE, 10).unwrap();
        ledger.credit(TOKEN, BOB, u64::MAX).unwrap();
        let alice_before = ledger.get(TOKEN, ALICE);

        assert_eq!(
            ledger.settle(TOKEN, ALICE, BOB, 10),
            Err(WalletError::Overflow)
        );
        assert_eq!(ledger.get(TOKEN, ALICE), alice_before);
        assert_eq!(ledger.balance_of(TOKEN, BOB), (u64::MAX, 0));
    }

    #[test]
    fn test_tokens_are_isolated() {
        let mut ledger = Ledger::new();
        ledger.credit(TOKEN, ALICE, 100).unwrap();
        assert_eq!(ledger.balance_of(TOKEN + 1, ALICE), (0, 0));
        assert_eq!(
            ledger.debit(TOKEN + 1, ALICE, 1),
            Err(WalletError::InsufficientBalance)
        );
    }

    #[test]
    fn test_entries_sorted_and_skip_zero() {
        let mut ledger = Ledger::new();
        ledger.credit(2, BOB, 5).unwrap();
        ledger.credit(1, BOB, 3).unwrap();
        ledger.credit(1, ALICE, 4).unwrap();
        ledger.debit(1, ALICE, 4).unwrap();

        let entries = ledger.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!((entries[0].token, entries[0].investor), (1, BOB));
        assert_eq!((entries[1].token, entries[1].investor), (2, BOB));
    }
}
