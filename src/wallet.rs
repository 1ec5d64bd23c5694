//! Brokerage Wallet - the custodial core
//!
//! ALL ledger, role and approval state lives in one [`BrokerageWallet`].
//!
//! # Thread Safety
//!
//! Every mutating operation takes `&mut self`, so operations are strictly
//! sequential and no caller ever observes a half-applied mutation. A
//! multi-threaded host shares the wallet behind a `Mutex`.
//!
//! # Operation Flow (CRITICAL ordering)
//!
//! ```text
//! guard (role) → pre-check (no mutation) → external transfer → commit → emit
//!                      ↓                          ↓
//!                 Err(WalletError)        Err(TransferFailed)
//! ```
//!
//! A returned error means nothing changed.
//!
//! Operations are spread over several files by concern:
//! - this file: roles, approver set, reads
//! - [`crate::custody`]: deposit
//! - [`crate::trading`]: offer / cancel / clear
//! - [`crate::approval`]: request / approve, on top of [`crate::withdrawal`]

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::access::AccessControl;
use crate::approvers::ApproverRegistry;
use crate::config::WalletConfig;
use crate::core_types::{AccountId, RequestId, SeqNum, TokenId};
use crate::error::{Role, WalletError};
use crate::events::WalletEvent;
use crate::gateway::TokenGateway;
use crate::journal::EventJournal;
use crate::ledger::Ledger;
use crate::withdrawal::{QuorumPolicy, WithdrawalBook, WithdrawalRequest, WithdrawalView};

pub(crate) const TARGET: &str = "BWALLET";

pub struct BrokerageWallet {
    pub(crate) access: AccessControl,
    pub(crate) approvers: ApproverRegistry,
    pub(crate) ledger: Ledger,
    pub(crate) withdrawals: WithdrawalBook,
    pub(crate) gateway: Arc<dyn TokenGateway>,
    events: Vec<WalletEvent>,
    journal: Option<EventJournal>,
    next_seq: SeqNum,
}

impl BrokerageWallet {
    pub fn new(
        owner: AccountId,
        platform_admin: AccountId,
        policy: QuorumPolicy,
        gateway: Arc<dyn TokenGateway>,
    ) -> Self {
        info!(
            owner,
            platform_admin,
            gateway = gateway.name(),
            custody = gateway.custody(),
            ?policy,
            "Brokerage wallet created"
        );
        Self {
            access: AccessControl::new(owner, platform_admin),
            approvers: ApproverRegistry::new(),
            ledger: Ledger::new(),
            withdrawals: WithdrawalBook::new(policy),
            gateway,
            events: Vec::new(),
            journal: None,
            next_seq: 1,
        }
    }

    /// Build a wallet from config: roles, quorum policy, initial approvers
    /// (added by the owner, so they are journaled like any other addition).
    pub fn from_config(
        config: &WalletConfig,
        gateway: Arc<dyn TokenGateway>,
    ) -> std::io::Result<Self> {
        let mut wallet = Self::new(
            config.owner,
            config.platform_admin,
            QuorumPolicy::from_threshold(config.quorum_threshold),
            gateway,
        );
        if let Some(path) = &config.journal_path {
            wallet.set_journal(EventJournal::open(path)?);
        }
        for &approver in &config.approvers {
            if let Err(e) = wallet.add_approver(config.owner, approver) {
                error!(approver, error = %e, "Failed to add configured approver");
            }
        }
        Ok(wallet)
    }

    pub fn set_journal(&mut self, journal: EventJournal) {
        self.journal = Some(journal);
    }

    // ============================================================
    // QUERY OPERATIONS (Read-Only)
    // ============================================================

    #[inline]
    pub fn owner(&self) -> AccountId {
        self.access.owner()
    }

    #[inline]
    pub fn platform_admin(&self) -> AccountId {
        self.access.platform_admin()
    }

    /// `(balance, offered)` for the pair, zero if never touched
    #[inline]
    pub fn balance_of(&self, token: TokenId, investor: AccountId) -> (u64, u64) {
        self.ledger.balance_of(token, investor)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    #[inline]
    pub fn is_approver(&self, id: AccountId) -> bool {
        self.approvers.is_approver(id)
    }

    pub fn approver_at(&self, index: usize) -> Result<AccountId, WalletError> {
        self.approvers.approver_at(index)
    }

    pub fn approver_count(&self) -> usize {
        self.approvers.len()
    }

    pub fn approvers(&self) -> &[AccountId] {
        self.approvers.as_slice()
    }

    pub fn quorum_policy(&self) -> QuorumPolicy {
        self.withdrawals.policy()
    }

    /// Request at `index` of `approver`'s private queue
    pub fn approver_request(
        &self,
        approver: AccountId,
        index: usize,
    ) -> Result<WithdrawalView, WalletError> {
        self.withdrawals.view(approver, index)
    }

    pub fn approver_request_count(&self, approver: AccountId) -> usize {
        self.withdrawals.queue_len(approver)
    }

    pub fn withdrawal(&self, id: RequestId) -> Option<&WithdrawalRequest> {
        self.withdrawals.get(id)
    }

    /// Every event emitted since construction, in order
    pub fn events(&self) -> &[WalletEvent] {
        &self.events
    }

    pub fn gateway(&self) -> &Arc<dyn TokenGateway> {
        &self.gateway
    }

    // ============================================================
    // ACCESS CONTROL (owner-gated)
    // ============================================================

    pub fn transfer_ownership(
        &mut self,
        caller: AccountId,
        new_owner: AccountId,
    ) -> Result<WalletEvent, WalletError> {
        let previous_owner = self
            .access
            .transfer_ownership(caller, new_owner)
            .inspect_err(|e| reject("transfer_ownership", caller, e))?;

        info!(previous_owner, new_owner, "Ownership transferred");
        Ok(self.emit(|seq| WalletEvent::OwnershipTransferred {
            seq,
            previous_owner,
            new_owner,
        }))
    }

    pub fn set_platform_admin(
        &mut self,
        caller: AccountId,
        admin: AccountId,
    ) -> Result<WalletEvent, WalletError> {
        let previous_admin = self
            .access
            .set_platform_admin(caller, admin)
            .inspect_err(|e| reject("set_platform_admin", caller, e))?;

        info!(previous_admin, new_admin = admin, "Platform admin changed");
        Ok(self.emit(|seq| WalletEvent::PlatformAdminChanged {
            seq,
            previous_admin,
            new_admin: admin,
        }))
    }

    // ============================================================
    // APPROVER SET (owner-gated)
    // ============================================================

    /// Returns `None` if `approver` was already in the set.
    pub fn add_approver(
        &mut self,
        caller: AccountId,
        approver: AccountId,
    ) -> Result<Option<WalletEvent>, WalletError> {
        self.access
            .only_owner(caller)
            .inspect_err(|e| reject("add_approver", caller, e))?;

        if !self.approvers.insert(approver) {
            debug!(target: TARGET, approver, "Approver already present");
            return Ok(None);
        }
        info!(approver, approvers = self.approvers.len(), "Approver added");
        Ok(Some(
            self.emit(|seq| WalletEvent::ApproverAdded { seq, approver }),
        ))
    }

    /// Returns `None` if `approver` was not in the set.
    pub fn remove_approver(
        &mut self,
        caller: AccountId,
        approver: AccountId,
    ) -> Result<Option<WalletEvent>, WalletError> {
        self.access
            .only_owner(caller)
            .inspect_err(|e| reject("remove_approver", caller, e))?;

        if !self.approvers.remove(approver) {
            debug!(target: TARGET, approver, "Approver not present");
            return Ok(None);
        }
        info!(approver, approvers = self.approvers.len(), "Approver removed");
        Ok(Some(
            self.emit(|seq| WalletEvent::ApproverRemoved { seq, approver }),
        ))
    }

    /// Flip membership of `approver`.
    pub fn toggle_approver(
        &mut self,
        caller: AccountId,
        approver: AccountId,
    ) -> Result<WalletEvent, WalletError> {
        self.access
            .only_owner(caller)
            .inspect_err(|e| reject("toggle_approver", caller, e))?;

        let event = if self.approvers.toggle(approver) {
            info!(approver, "Approver toggled on");
            self.emit(|seq| WalletEvent::ApproverAdded { seq, approver })
        } else {
            info!(approver, "Approver toggled off");
            self.emit(|seq| WalletEvent::ApproverRemoved { seq, approver })
        };
        Ok(event)
    }

    pub(crate) fn only_approver(&self, caller: AccountId) -> Result<(), WalletError> {
        if !self.approvers.is_approver(caller) {
            return Err(WalletError::Unauthorized(Role::Approver));
        }
        Ok(())
    }

    // ============================================================
    // EVENTS
    // ============================================================

    /// Stamp, record and journal one event. Call only after the mutation
    /// it describes has been committed.
    pub(crate) fn emit(&mut self, make: impl FnOnce(SeqNum) -> WalletEvent) -> WalletEvent {
        let event = make(self.next_seq);
        self.next_seq += 1;

        if let Some(journal) = self.journal.as_mut()
            && let Err(e) = journal.append(&event).and_then(|_| journal.flush())
        {
            error!(seq = event.seq(), error = %e, "Failed to journal event");
        }
        debug!(target: TARGET, seq = event.seq(), name = event.name(), "Event emitted");

        self.events.push(event.clone());
        event
    }
}

/// Log a rejected call; used with `inspect_err`
pub(crate) fn reject(op: &'static str, caller: AccountId, err: &WalletError) {
    warn!(op, caller, code = err.code(), "Rejected: {}", err);
}
