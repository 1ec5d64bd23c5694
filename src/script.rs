//! Scripted sessions
//!
//! A script is a YAML list of steps run in order against one wallet and the
//! in-memory token bank behind it. Bank steps (`mint`, `allow`,
//! `fail_outbound`) stand in for what investors do on the token side; every
//! other step is a wallet call made by `caller`.
//!
//! ```yaml
//! steps:
//!   - { op: mint, token: 5, to: 1001, amount: 1000 }
//!   - { op: allow, token: 5, owner: 1001, amount: 1000 }
//!   - { op: deposit, caller: 1001, token: 5, amount: 100 }
//! ```
//!
//! A rejected call does not stop the run; its error code is recorded in the
//! step's outcome, like a reverted transaction in a block.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core_types::{AccountId, TokenId};
use crate::error::WalletError;
use crate::events::WalletEvent;
use crate::token_bank::MemoryTokenBank;
use crate::wallet::BrokerageWallet;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Mint {
        token: TokenId,
        to: AccountId,
        amount: u64,
    },
    Allow {
        token: TokenId,
        owner: AccountId,
        amount: u64,
    },
    FailOutbound {
        fail: bool,
    },
    Deposit {
        caller: AccountId,
        token: TokenId,
        amount: u64,
    },
    Offer {
        caller: AccountId,
        token: TokenId,
        amount: u64,
    },
    Cancel {
        caller: AccountId,
        token: TokenId,
        amount: u64,
    },
    Clear {
        caller: AccountId,
        token: TokenId,
        src: AccountId,
        dst: AccountId,
        amount: u64,
    },
    RequestWithdrawal {
        caller: AccountId,
        token: TokenId,
        amount: u64,
    },
    ApproveWithdrawals {
        caller: AccountId,
        begin: usize,
        end: usize,
    },
    AddApprover {
        caller: AccountId,
        approver: AccountId,
    },
    RemoveApprover {
        caller: AccountId,
        approver: AccountId,
    },
    ToggleApprover {
        caller: AccountId,
        approver: AccountId,
    },
    TransferOwnership {
        caller: AccountId,
        new_owner: AccountId,
    },
    SetPlatformAdmin {
        caller: AccountId,
        admin: AccountId,
    },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Mint { .. } => "mint",
            Step::Allow { .. } => "allow",
            Step::FailOutbound { .. } => "fail_outbound",
            Step::Deposit { .. } => "deposit",
            Step::Offer { .. } => "offer",
            Step::Cancel { .. } => "cancel",
            Step::Clear { .. } => "clear",
            Step::RequestWithdrawal { .. } => "request_withdrawal",
            Step::ApproveWithdrawals { .. } => "approve_withdrawals",
            Step::AddApprover { .. } => "add_approver",
            Step::RemoveApprover { .. } => "remove_approver",
            Step::ToggleApprover { .. } => "toggle_approver",
            Step::TransferOwnership { .. } => "transfer_ownership",
            Step::SetPlatformAdmin { .. } => "set_platform_admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read script: {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse script: {}", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: usize,
    pub op: &'static str,
    /// Error code of a rejected call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<WalletEvent>,
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Run every step; returns one outcome per step.
pub fn run(wallet: &mut BrokerageWallet, bank: &MemoryTokenBank, script: &Script) -> Vec<StepOutcome> {
    let outcomes: Vec<StepOutcome> = script
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let result = apply(wallet, bank, step);
            StepOutcome {
                step: i,
                op: step.name(),
                error: result.as_ref().err().map(WalletError::code),
                events: result.unwrap_or_default(),
            }
        })
        .collect();

    let rejected = outcomes.iter().filter(|o| !o.is_ok()).count();
    info!(steps = outcomes.len(), rejected, "Script finished");
    outcomes
}

fn apply(
    wallet: &mut BrokerageWallet,
    bank: &MemoryTokenBank,
    step: &Step,
) -> Result<Vec<WalletEvent>, WalletError> {
    let events = match *step {
        Step::Mint { token, to, amount } => {
            bank.mint(token, to, amount);
            vec![]
        }
        Step::Allow {
            token,
            owner,
            amount,
        } => {
            bank.increase_allowance(token, owner, amount);
            vec![]
        }
        Step::FailOutbound { fail } => {
            bank.set_fail_outbound(fail);
            vec![]
        }
        Step::Deposit {
            caller,
            token,
            amount,
        } => vec![wallet.deposit(caller, token, amount)?],
        Step::Offer {
            caller,
            token,
            amount,
        } => vec![wallet.offer_tokens(caller, token, amount)?],
        Step::Cancel {
            caller,
            token,
            amount,
        } => vec![wallet.cancel_offer(caller, token, amount)?],
        Step::Clear {
            caller,
            token,
            src,
            dst,
            amount,
        } => vec![wallet.clear_tokens(caller, token, src, dst, amount)?],
        Step::RequestWithdrawal {
            caller,
            token,
            amount,
        } => vec![wallet.request_withdrawal(caller, token, amount)?],
        Step::ApproveWithdrawals { caller, begin, end } => {
            wallet.approve_withdrawals(caller, begin, end)?
        }
        Step::AddApprover { caller, approver } => {
            wallet.add_approver(caller, approver)?.into_iter().collect()
        }
        Step::RemoveApprover { caller, approver } => {
            wallet.remove_approver(caller, approver)?.into_iter().collect()
        }
        Step::ToggleApprover { caller, approver } => {
            vec![wallet.toggle_approver(caller, approver)?]
        }
        Step::TransferOwnership { caller, new_owner } => {
            vec![wallet.transfer_ownership(caller, new_owner)?]
        }
        Step::SetPlatformAdmin { caller, admin } => {
            vec![wallet.set_platform_admin(caller, admin)?]
        }
    };
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::withdrawal::QuorumPolicy;
    use std::sync::Arc;

    const SCRIPT: &str = r#"
steps:
  - { op: mint, token: 5, to: 1001, amount: 1000 }
  - { op: allow, token: 5, owner: 1001, amount: 1000 }
  - { op: deposit, caller: 1001, token: 5, amount: 100 }
  - { op: offer, caller: 1001, token: 5, amount: 100 }
  - { op: clear, caller: 1001, token: 5, src: 1001, dst: 1002, amount: 100 }
  - { op: clear, caller: 2, token: 5, src: 1001, dst: 1002, amount: 100 }
  - { op: add_approver, caller: 1, approver: 11 }
  - { op: request_withdrawal, caller: 1002, token: 5, amount: 40 }
  - { op: approve_withdrawals, caller: 11, begin: 0, end: 1 }
"#;

    #[test]
    fn test_parse_steps() {
        let script: Script = serde_yaml::from_str(SCRIPT).unwrap();
        assert_eq!(script.steps.len(), 9);
        assert_eq!(
            script.steps[4],
            Step::Clear {
                caller: 1001,
                token: 5,
                src: 1001,
                dst: 1002,
                amount: 100
            }
        );
        assert_eq!(script.steps[8].name(), "approve_withdrawals");
    }

    #[test]
    fn test_unknown_op_is_a_parse_error() {
        let yaml = "steps:\n  - { op: burn, token: 5 }\n";
        assert!(serde_yaml::from_str::<Script>(yaml).is_err());
    }

    #[test]
    fn test_run_continues_past_rejections() {
        let script: Script = serde_yaml::from_str(SCRIPT).unwrap();
        let bank = Arc::new(MemoryTokenBank::new(0));
        let mut wallet = BrokerageWallet::new(1, 2, QuorumPolicy::Majority, bank.clone());

        let outcomes = run(&mut wallet, &bank, &script);
        assert_eq!(outcomes.len(), 9);
        assert!(outcomes[0].is_ok() && outcomes[0].events.is_empty());
        assert_eq!(outcomes[4].error, Some("UNAUTHORIZED"));
        assert!(outcomes[5].is_ok());

        // single approver: majority of one executes immediately
        assert_eq!(outcomes[8].events.len(), 2);
        assert_eq!(wallet.balance_of(5, 1002), (60, 0));
        assert_eq!(bank.balance_of(5, 1002), 40);
    }
}
