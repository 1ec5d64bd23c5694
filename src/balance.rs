/// ENFORCED BALANCE TYPE - one ledger entry per (token, investor)
///
/// ALL balance mutations MUST go through these methods.
///
/// # Enforcement Strategy:
/// 1. Fields are PRIVATE - no direct access
/// 2. All mutations return Result - errors are explicit
/// 3. Every mutation validates before writing - a failed call leaves the entry untouched
/// 4. checked_add/sub - overflow protection
/// 5. Version auto-increments - audit trail
use serde::{Deserialize, Serialize};

use crate::error::{OfferUse, WalletError};

/// Custodied holding of one token for one investor
///
/// # Invariants (ENFORCED by private fields):
/// - offered <= held (offered is the escrowed part of held, not an addition to it)
/// - No overflow/underflow (checked arithmetic)
/// - All state changes return Result
///
/// # Usage:
/// ```ignore
/// let mut bal = Balance::default();
/// bal.credit(100)?;        // held = 100, offered = 0
/// bal.reserve(60)?;        // held = 100, offered = 60, spendable = 40
/// bal.spend_offered(50)?;  // held = 100, offered = 10 (clearing)
/// bal.release(10)?;        // held = 100, offered = 0
/// bal.debit(30)?;          // held = 70 (withdrawal)
/// ```
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Balance {
    held: u64,    // PRIVATE - modified through credit/debit
    offered: u64, // PRIVATE - modified through reserve/release/spend_offered
    version: u64, // PRIVATE - incremented on every successful mutation
}

impl Balance {
    // ============================================================
    // READ-ONLY GETTERS
    // ============================================================

    /// Tokens held in custody for the investor (includes offered)
    #[inline(always)]
    pub const fn held(&self) -> u64 {
        self.held
    }

    /// Part of `held` committed to an open offer
    #[inline(always)]
    pub const fn offered(&self) -> u64 {
        self.offered
    }

    /// Part of `held` that may be offered or withdrawn
    #[inline(always)]
    pub const fn spendable(&self) -> u64 {
        // offered <= held is an invariant of this type
        self.held - self.offered
    }

    #[inline(always)]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// True if this entry is indistinguishable from one never touched
    #[inline(always)]
    pub const fn is_zero(&self) -> bool {
        self.held == 0 && self.offered == 0
    }

    // ============================================================
    // PRE-CHECKS (no mutation)
    // ============================================================

    pub fn check_credit(&self, amount: u64) -> Result<(), WalletError> {
        self.held
            .checked_add(amount)
            .map(|_| ())
            .ok_or(WalletError::Overflow)
    }

    pub fn check_spendable(&self, amount: u64) -> Result<(), WalletError> {
        if self.spendable() < amount {
            return Err(WalletError::InsufficientBalance);
        }
        Ok(())
    }

    pub fn check_offered(&self, amount: u64, usage: OfferUse) -> Result<(), WalletError> {
        if self.offered < amount {
            return Err(WalletError::InsufficientOffered(usage));
        }
        Ok(())
    }

    // ============================================================
    // VALIDATED MUTATIONS
    // ============================================================

    /// Add to held balance (deposit, clearing buyer side)
    pub fn credit(&mut self, amount: u64) -> Result<(), WalletError> {
        self.held = self.held.checked_add(amount).ok_or(WalletError::Overflow)?;
        self.bump();
        Ok(())
    }

    /// Remove from held balance; only the spendable part can leave
    pub fn debit(&mut self, amount: u64) -> Result<(), WalletError> {
        self.check_spendable(amount)?;
        self.held -= amount;
        self.bump();
        Ok(())
    }

    /// Commit spendable tokens to an offer
    pub fn reserve(&mut self, amount: u64) -> Result<(), WalletError> {
        self.check_spendable(amount)?;
        self.offered += amount;
        self.bump();
        Ok(())
    }

    /// Return offered tokens to spendable
    pub fn release(&mut self, amount: u64) -> Result<(), WalletError> {
        self.check_offered(amount, OfferUse::Cancel)?;
        self.offered -= amount;
        self.bump();
        Ok(())
    }

    /// Consume offered tokens during clearing.
    ///
    /// Only `offered` shrinks; `held` stays as it was.
    pub fn spend_offered(&mut self, amount: u64) -> Result<(), WalletError> {
        self.check_offered(amount, OfferUse::Clear)?;
        self.offered -= amount;
        self.bump();
        Ok(())
    }

    #[inline(always)]
    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit() {
        let mut bal = Balance::default();
        assert!(bal.is_zero());

        bal.credit(100).unwrap();
        assert_eq!(bal.held(), 100);
        assert_eq!(bal.version(), 1);

        bal.credit(50).unwrap();
        assert_eq!(bal.held(), 150);
        assert_eq!(bal.version(), 2);
    }

    #[test]
    fn test_credit_overflow() {
        let mut bal = Balance::default();
        bal.credit(u64::MAX).unwrap();

        assert_eq!(bal.credit(1), Err(WalletError::Overflow));
        assert_eq!(bal.held(), u64::MAX);
        assert_eq!(bal.version(), 1);
    }

    #[test]
    fn test_reserve_is_cumulative() {
        let mut bal = Balance::default();
        bal.credit(100).unwrap();

        bal.reserve(60).unwrap();
        assert_eq!(bal.spendable(), 40);

        // second offer must still fit under held
        assert_eq!(bal.reserve(60), Err(WalletError::InsufficientBalance));
        assert_eq!(bal.offered(), 60);

        bal.reserve(40).unwrap();
        assert_eq!(bal.offered(), 100);
        assert_eq!(bal.spendable(), 0);
    }

    #[test]
    fn test_release() {
        let mut bal = Balance::default();
        bal.credit(100).unwrap();
        bal.reserve(100).unwrap();

        assert_eq!(
            bal.release(101),
            Err(WalletError::InsufficientOffered(OfferUse::Cancel))
        );
        bal.release(100).unwrap();
        assert_eq!(bal.offered(), 0);
        assert_eq!(bal.held(), 100);
    }

    #[test]
    fn test_debit_cannot_touch_offered() {
        let mut bal = Balance::default();
        bal.credit(100).unwrap();
        bal.reserve(70).unwrap();

        let before = bal;
        assert_eq!(bal.debit(31), Err(WalletError::InsufficientBalance));
        assert_eq!(bal, before);

        bal.debit(30).unwrap();
        assert_eq!(bal.held(), 70);
        assert_eq!(bal.offered(), 70);
    }

    #[test]
    fn test_spend_offered_keeps_held() {
        let mut bal = Balance::default();
        bal.credit(100).unwrap();
        bal.reserve(100).unwrap();

        bal.spend_offered(100).unwrap();
        assert_eq!(bal.offered(), 0);
        assert_eq!(bal.held(), 100);
    }

    #[test]
    fn test_offered_never_exceeds_held() {
        let mut bal = Balance::default();
        let ops: [(u8, u64); 8] = [
            (0, 50),
            (1, 30),
            (1, 30),
            (3, 25),
            (2, 10),
            (3, 40),
            (1, 5),
            (4, 20),
        ];
        for (op, amount) in ops {
            let _ = match op {
                0 => bal.credit(amount),
                1 => bal.reserve(amount),
                2 => bal.release(amount),
                3 => bal.debit(amount),
                _ => bal.spend_offered(amount),
            };
            assert!(bal.offered() <= bal.held());
        }
    }
}
