//! Withdrawal Approval - quorum-gated release of custodied tokens
//!
//! # State Machine (per logical request)
//!
//! ```text
//! request_withdrawal → REQUESTED ──approve──▶ (approvals < required)
//!                          │                        │
//!                          └──────approve───────────┴──▶ EXECUTED (terminal)
//! ```
//!
//! # Data Structure
//!
//! One [`WithdrawalRequest`] record per logical request, shared by every
//! approver queue it was fanned out to. A queue holds [`QueueSlot`] handles
//! (request id + this approver's own sign-off flag), so approvals from
//! different queues all land on the same counter and the `executed` flag is
//! checked in exactly one place.
//!
//! # Approval Flow
//!
//! 1. [`WithdrawalBook::plan_approvals`] - validation only, NO state mutation
//! 2. Wallet checks the ledger and performs the outbound transfers
//! 3. [`WithdrawalBook::commit`] - apply the plan (cannot fail)

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core_types::{AccountId, RequestId, TokenId};
use crate::error::WalletError;

// ============================================================
// QUORUM POLICY
// ============================================================

/// How many distinct approvals a request needs before it executes.
///
/// Evaluated once, against the approver count at request time, and stored in
/// the request. Later changes to the approver set do not move the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QuorumPolicy {
    /// More than half of the approvers the request was fanned out to
    #[default]
    Majority,
    /// A fixed number of approvals (at least 1)
    Fixed(usize),
}

impl QuorumPolicy {
    /// `None` means majority
    pub fn from_threshold(threshold: Option<usize>) -> Self {
        match threshold {
            Some(n) => QuorumPolicy::Fixed(n),
            None => QuorumPolicy::Majority,
        }
    }

    pub fn required(&self, approvers: usize) -> usize {
        match *self {
            QuorumPolicy::Majority => approvers / 2 + 1,
            QuorumPolicy::Fixed(n) => n.max(1),
        }
    }
}

// ============================================================
// RECORDS
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawalRequest {
    pub id: RequestId,
    pub requester: AccountId,
    pub token: TokenId,
    pub amount: u64,
    /// Approvals needed, fixed at creation
    pub required: usize,
    pub approval_count: usize,
    pub executed: bool,
}

/// One approver's handle on a shared request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSlot {
    pub request_id: RequestId,
    pub approved: bool,
}

/// What one approver sees at one position of their queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WithdrawalView {
    pub request_id: RequestId,
    pub requester: AccountId,
    pub token: TokenId,
    pub amount: u64,
    pub approval_count: usize,
    pub approved_by_me: bool,
    pub executed: bool,
}

/// A request that reaches quorum and must be paid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Release {
    pub request_id: RequestId,
    pub token: TokenId,
    pub requester: AccountId,
    pub amount: u64,
}

/// Effects of one `approve_withdrawals` call, computed before anything moves
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovalPlan {
    pub approver: AccountId,
    /// (queue position, request id, approval count after this call)
    pub approvals: Vec<(usize, RequestId, usize)>,
    /// Requests that reach quorum in this call, in approval order
    pub executions: Vec<Release>,
}

impl ApprovalPlan {
    pub fn executed_ids(&self) -> Vec<RequestId> {
        self.executions.iter().map(|r| r.request_id).collect()
    }
}

// ============================================================
// WITHDRAWAL BOOK
// ============================================================

#[derive(Debug, Default, Clone)]
pub struct WithdrawalBook {
    policy: QuorumPolicy,
    /// Indexed by RequestId
    requests: Vec<WithdrawalRequest>,
    queues: FxHashMap<AccountId, Vec<QueueSlot>>,
}

impl WithdrawalBook {
    pub fn new(policy: QuorumPolicy) -> Self {
        Self {
            policy,
            requests: Vec::new(),
            queues: FxHashMap::default(),
        }
    }

    pub fn policy(&self) -> QuorumPolicy {
        self.policy
    }

    pub fn get(&self, id: RequestId) -> Option<&WithdrawalRequest> {
        self.requests.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn queue_len(&self, approver: AccountId) -> usize {
        self.queues.get(&approver).map_or(0, Vec::len)
    }

    pub fn view(&self, approver: AccountId, index: usize) -> Result<WithdrawalView, WalletError> {
        let queue = self.queue(approver);
        let slot = queue.get(index).ok_or(WalletError::IndexOutOfRange {
            index,
            len: queue.len(),
        })?;
        let req = &self.requests[slot.request_id as usize];
        Ok(WithdrawalView {
            request_id: req.id,
            requester: req.requester,
            token: req.token,
            amount: req.amount,
            approval_count: req.approval_count,
            approved_by_me: slot.approved,
            executed: req.executed,
        })
    }

    /// Approvals needed for a request fanned out to `approvers` identities
    pub fn check_quorum(&self, approvers: usize) -> Result<usize, WalletError> {
        let required = self.policy.required(approvers);
        if approvers == 0 || required > approvers {
            return Err(WalletError::QuorumUnreachable {
                required,
                approvers,
            });
        }
        Ok(required)
    }

    /// Create one shared record and push a handle onto every approver's queue
    pub fn create(
        &mut self,
        requester: AccountId,
        token: TokenId,
        amount: u64,
        approvers: &[AccountId],
    ) -> Result<&WithdrawalRequest, WalletError> {
        let required = self.check_quorum(approvers.len())?;

        let id = self.requests.len() as RequestId;
        self.requests.push(WithdrawalRequest {
            id,
            requester,
            token,
            amount,
            required,
            approval_count: 0,
            executed: false,
        });
        for &approver in approvers {
            self.queues.entry(approver).or_default().push(QueueSlot {
                request_id: id,
                approved: false,
            });
        }
        Ok(&self.requests[id as usize])
    }

    /// Validate `[begin, end)` of `approver`'s queue and compute the effects.
    ///
    /// Slots this approver already signed and requests already executed are
    /// skipped, so approving the same range twice is harmless.
    pub fn plan_approvals(
        &self,
        approver: AccountId,
        begin: usize,
        end: usize,
    ) -> Result<ApprovalPlan, WalletError> {
        if begin > end {
            return Err(WalletError::InvalidRange { begin, end });
        }
        let queue = self.queue(approver);
        if end > queue.len() {
            return Err(WalletError::IndexOutOfRange {
                index: end,
                len: queue.len(),
            });
        }

        let mut plan = ApprovalPlan {
            approver,
            ..Default::default()
        };
        for (pos, slot) in queue.iter().enumerate().take(end).skip(begin) {
            let req = &self.requests[slot.request_id as usize];
            if slot.approved || req.executed {
                continue;
            }
            // an approver holds at most one slot per request, so +1 is exact
            let count = req.approval_count + 1;
            plan.approvals.push((pos, req.id, count));
            if count >= req.required {
                plan.executions.push(Release {
                    request_id: req.id,
                    token: req.token,
                    requester: req.requester,
                    amount: req.amount,
                });
            }
        }
        Ok(plan)
    }

    /// Apply a plan produced by `plan_approvals` against the current state
    pub fn commit(&mut self, plan: &ApprovalPlan) {
        if let Some(queue) = self.queues.get_mut(&plan.approver) {
            for &(pos, _, _) in &plan.approvals {
                queue[pos].approved = true;
            }
        }
        for &(_, id, count) in &plan.approvals {
            self.requests[id as usize].approval_count = count;
        }
        for release in &plan.executions {
            self.requests[release.request_id as usize].executed = true;
        }
    }

    fn queue(&self, approver: AccountId) -> &[QueueSlot] {
        self.queues.get(&approver).map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVESTOR: AccountId = 1001;
    const A1: AccountId = 7;
    const A2: AccountId = 8;
    const A3: AccountId = 9;

    #[test]
    fn test_quorum_policy() {
        assert_eq!(QuorumPolicy::Majority.required(1), 1);
        assert_eq!(QuorumPolicy::Majority.required(3), 2);
        assert_eq!(QuorumPolicy::Majority.required(4), 3);
        assert_eq!(QuorumPolicy::Fixed(0).required(3), 1);
        assert_eq!(QuorumPolicy::from_threshold(Some(2)), QuorumPolicy::Fixed(2));
        assert_eq!(QuorumPolicy::from_threshold(None), QuorumPolicy::Majority);
    }

    #[test]
    fn test_unreachable_quorum() {
        let mut book = WithdrawalBook::new(QuorumPolicy::Fixed(3));
        assert_eq!(
            book.create(INVESTOR, 1, 100, &[A1, A2]).unwrap_err(),
            WalletError::QuorumUnreachable {
                required: 3,
                approvers: 2
            }
        );
        assert_eq!(
            book.create(INVESTOR, 1, 100, &[]).unwrap_err(),
            WalletError::QuorumUnreachable {
                required: 3,
                approvers: 0
            }
        );
        assert!(book.is_empty());
        assert_eq!(book.queue_len(A1), 0);
    }

    #[test]
    fn test_fan_out_shares_one_record() {
        let mut book = WithdrawalBook::new(QuorumPolicy::Majority);
        let req = book.create(INVESTOR, 1, 100, &[A1, A2, A3]).unwrap();
        assert_eq!(req.required, 2);

        for approver in [A1, A2, A3] {
            let view = book.view(approver, 0).unwrap();
            assert_eq!(view.request_id, 0);
            assert_eq!(view.requester, INVESTOR);
            assert_eq!(view.amount, 100);
            assert_eq!(view.approval_count, 0);
        }
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_plan_range_validation() {
        let mut book = WithdrawalBook::new(QuorumPolicy::Majority);
        book.create(INVESTOR, 1, 100, &[A1]).unwrap();

        assert_eq!(
            book.plan_approvals(A1, 1, 0),
            Err(WalletError::InvalidRange { begin: 1, end: 0 })
        );
        assert_eq!(
            book.plan_approvals(A1, 0, 2),
            Err(WalletError::IndexOutOfRange { index: 2, len: 1 })
        );
        // empty range is fine
        assert!(book.plan_approvals(A1, 1, 1).unwrap().approvals.is_empty());
    }

    #[test]
    fn test_plan_then_commit_reaches_quorum_once() {
        let mut book = WithdrawalBook::new(QuorumPolicy::Majority);
        book.create(INVESTOR, 1, 100, &[A1, A2, A3]).unwrap();

        let plan = book.plan_approvals(A1, 0, 1).unwrap();
        assert_eq!(plan.approvals, vec![(0, 0, 1)]);
        assert!(plan.executions.is_empty());
        book.commit(&plan);

        // re-approving the same slot is a no-op
        assert!(book.plan_approvals(A1, 0, 1).unwrap().approvals.is_empty());

        let plan = book.plan_approvals(A2, 0, 1).unwrap();
        assert_eq!(plan.executed_ids(), vec![0]);
        book.commit(&plan);
        assert!(book.get(0).unwrap().executed);

        // third approver arrives after execution
        assert!(book.plan_approvals(A3, 0, 1).unwrap().approvals.is_empty());
        assert_eq!(book.get(0).unwrap().approval_count, 2);
    }

    #[test]
    fn test_plan_does_not_mutate() {
        let mut book = WithdrawalBook::new(QuorumPolicy::Fixed(1));
        book.create(INVESTOR, 1, 100, &[A1]).unwrap();

        let plan = book.plan_approvals(A1, 0, 1).unwrap();
        assert_eq!(plan.executed_ids(), vec![0]);
        assert_eq!(book.get(0).unwrap().approval_count, 0);
        assert!(!book.view(A1, 0).unwrap().approved_by_me);
    }
}
