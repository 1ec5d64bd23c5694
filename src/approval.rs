//! Withdrawal operations on the wallet
//!
//! `approve_withdrawals` may release several requests in one call. Each
//! release is an outbound transfer the wallet cannot undo on its own, so the
//! call runs as a compensated batch:
//!
//! ```text
//! plan (no mutation) → stage debits → transfer #1..#n ──all ok──▶ commit ledger + book → emit
//!                                          │
//!                                     #k fails → rollback #k-1..#1 → Err(TransferFailed)
//! ```

use rustc_hash::FxHashMap;
use tracing::{debug, error, info};

use crate::balance::Balance;
use crate::core_types::{AccountId, TokenId};
use crate::error::WalletError;
use crate::events::WalletEvent;
use crate::gateway::TransferId;
use crate::wallet::{BrokerageWallet, TARGET, reject};
use crate::withdrawal::ApprovalPlan;

impl BrokerageWallet {
    /// Open a withdrawal request and fan it out to every current approver.
    ///
    /// No funds move and nothing is reserved: the spendable balance is
    /// checked now and again when the request reaches quorum.
    pub fn request_withdrawal(
        &mut self,
        caller: AccountId,
        token: TokenId,
        amount: u64,
    ) -> Result<WalletEvent, WalletError> {
        self.request_inner(caller, token, amount)
            .inspect_err(|e| reject("request_withdrawal", caller, e))
    }

    fn request_inner(
        &mut self,
        caller: AccountId,
        token: TokenId,
        amount: u64,
    ) -> Result<WalletEvent, WalletError> {
        self.ledger.get(token, caller).check_spendable(amount)?;

        let req = self
            .withdrawals
            .create(caller, token, amount, self.approvers.as_slice())?;
        let (request_id, required) = (req.id, req.required);
        let approvers = self.approvers.len();

        info!(
            request_id,
            token,
            investor = caller,
            amount,
            approvers,
            required,
            "Withdrawal requested"
        );
        Ok(self.emit(|seq| WalletEvent::WithdrawalRequested {
            seq,
            request_id,
            token,
            investor: caller,
            amount,
            approvers,
            required,
        }))
    }

    /// Approve positions `[begin, end)` of the caller's own queue.
    ///
    /// Returns the emitted events: one `WithdrawalApproved` per new approval,
    /// followed directly by `WithdrawalExecuted` when that approval completed
    /// the quorum.
    pub fn approve_withdrawals(
        &mut self,
        caller: AccountId,
        begin: usize,
        end: usize,
    ) -> Result<Vec<WalletEvent>, WalletError> {
        self.approve_inner(caller, begin, end)
            .inspect_err(|e| reject("approve_withdrawals", caller, e))
    }

    fn approve_inner(
        &mut self,
        caller: AccountId,
        begin: usize,
        end: usize,
    ) -> Result<Vec<WalletEvent>, WalletError> {
        // 1. Guard + plan (no mutation)
        self.only_approver(caller)?;
        let plan = self.withdrawals.plan_approvals(caller, begin, end)?;
        debug!(
            target: TARGET,
            approver = caller,
            begin,
            end,
            approvals = plan.approvals.len(),
            executions = plan.executions.len(),
            "Approval plan"
        );

        // 2. Debit copies of the ledger entries; any shortfall fails here
        let debited = self.stage_debits(&plan)?;

        // 3. Outbound transfers
        let transfers = self.release_all(&plan)?;

        // 4. Commit (infallible from here on)
        for ((token, requester), balance) in debited {
            self.ledger.store(token, requester, balance);
        }
        self.withdrawals.commit(&plan);

        Ok(self.emit_plan(&plan, &transfers))
    }

    /// Post-withdrawal balance of every requester in the plan. Several
    /// releases for one pair are debited in turn from the same copy.
    fn stage_debits(
        &self,
        plan: &ApprovalPlan,
    ) -> Result<FxHashMap<(TokenId, AccountId), Balance>, WalletError> {
        let mut staged: FxHashMap<(TokenId, AccountId), Balance> = FxHashMap::default();
        for r in &plan.executions {
            staged
                .entry((r.token, r.requester))
                .or_insert_with(|| self.ledger.get(r.token, r.requester))
                .debit(r.amount)?;
        }
        Ok(staged)
    }

    /// Push every executed request out of custody. On failure, reverse the
    /// transfers already made and report the first error.
    fn release_all(&self, plan: &ApprovalPlan) -> Result<Vec<TransferId>, WalletError> {
        let custody = self.gateway.custody();
        let mut done: Vec<TransferId> = Vec::with_capacity(plan.executions.len());

        for r in &plan.executions {
            let transfer_id = TransferId::new();
            match self
                .gateway
                .transfer(transfer_id, r.token, custody, r.requester, r.amount)
            {
                Ok(()) => done.push(transfer_id),
                Err(e) => {
                    self.compensate(&done);
                    return Err(WalletError::TransferFailed(format!(
                        "withdrawal {}: {}",
                        r.request_id, e
                    )));
                }
            }
        }
        Ok(done)
    }

    fn compensate(&self, done: &[TransferId]) {
        for transfer_id in done.iter().rev() {
            if let Err(e) = self.gateway.rollback(*transfer_id) {
                error!(
                    transfer_id = %transfer_id,
                    gateway = self.gateway.name(),
                    error = %e,
                    "CRITICAL: failed to roll back withdrawal transfer"
                );
            }
        }
    }

    fn emit_plan(&mut self, plan: &ApprovalPlan, transfers: &[TransferId]) -> Vec<WalletEvent> {
        let mut events = Vec::with_capacity(plan.approvals.len() + plan.executions.len());
        let mut executed = plan.executions.iter().zip(transfers).peekable();

        for &(_, request_id, approvals) in &plan.approvals {
            let approver = plan.approver;
            debug!(target: TARGET, request_id, approver, approvals, "Withdrawal approved");
            events.push(self.emit(|seq| WalletEvent::WithdrawalApproved {
                seq,
                request_id,
                approver,
                approvals,
            }));

            if let Some((release, transfer_id)) =
                executed.next_if(|(r, _)| r.request_id == request_id)
            {
                let (token, investor, amount) = (release.token, release.requester, release.amount);
                info!(
                    request_id,
                    token,
                    investor,
                    amount,
                    approvals,
                    transfer_id = %transfer_id,
                    "Withdrawal executed"
                );
                events.push(self.emit(|seq| WalletEvent::WithdrawalExecuted {
                    seq,
                    request_id,
                    token,
                    investor,
                    amount,
                }));
            }
        }
        events
    }
}
