//! Approver Registry - enumerable approver set
//!
//! # Data Structure
//!
//! ```text
//! list:  [A, B, C, D]        ordered, duplicate-free, used for fan-out
//! index: {A:0, B:1, C:2, D:3} identity → position in `list`
//! ```
//!
//! Removal swaps the last identity into the freed slot and pops, fixing up
//! that identity's index. Both structures change together or not at all, so
//! `index.contains_key(x) <=> list.contains(&x)` always holds.
//! Order among remaining approvers is NOT preserved across removals.

use rustc_hash::FxHashMap;

use crate::core_types::AccountId;
use crate::error::WalletError;

#[derive(Debug, Default, Clone)]
pub struct ApproverRegistry {
    list: Vec<AccountId>,
    index: FxHashMap<AccountId, usize>,
}

impl ApproverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_approver(&self, id: AccountId) -> bool {
        self.index.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn approver_at(&self, index: usize) -> Result<AccountId, WalletError> {
        self.list
            .get(index)
            .copied()
            .ok_or(WalletError::IndexOutOfRange {
                index,
                len: self.list.len(),
            })
    }

    /// Current approvers in enumeration order
    #[inline]
    pub fn as_slice(&self) -> &[AccountId] {
        &self.list
    }

    /// Returns false if `id` was already an approver.
    pub fn insert(&mut self, id: AccountId) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id, self.list.len());
        self.list.push(id);
        true
    }

    /// Returns false if `id` was not an approver.
    pub fn remove(&mut self, id: AccountId) -> bool {
        let Some(pos) = self.index.remove(&id) else {
            return false;
        };
        self.list.swap_remove(pos);
        if let Some(&moved) = self.list.get(pos) {
            self.index.insert(moved, pos);
        }
        true
    }

    /// Flips membership. Returns the new membership state.
    pub fn toggle(&mut self, id: AccountId) -> bool {
        if self.remove(id) {
            false
        } else {
            self.insert(id)
        }
    }
}
