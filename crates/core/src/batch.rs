//! Command objects for atomic two-step vault batches.
//!
//! A batch always pairs a token transfer with exactly one vault action. The
//! injected facility executes the pair all-or-nothing; call encoding is its
//! concern, not ours.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// First step of every batch: move tokens to the facility's intermediary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStep {
    pub token: String,
    pub amount: Decimal,
}

/// Second step: the vault action the intermediary performs with the tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultAction {
    /// Deposit assets, crediting shares back to `receiver`. No price ceiling
    /// is enforced on deposits.
    Deposit {
        vault: String,
        amount: Decimal,
        receiver: String,
    },
    /// Redeem shares, crediting underlying assets back to `receiver`. No
    /// price floor either; slippage protection lives in the swap router.
    Redeem {
        vault: String,
        shares: Decimal,
        receiver: String,
    },
}

/// The semantic (transfer, action) pair submitted to the batch facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultBatch {
    pub transfer: TransferStep,
    pub action: VaultAction,
}

impl VaultBatch {
    /// Deposit flow: transfer `amount` of the vault's asset, then deposit.
    #[must_use]
    pub fn deposit(vault: &str, asset: &str, amount: Decimal, receiver: &str) -> Self {
        Self {
            transfer: TransferStep {
                token: asset.to_string(),
                amount,
            },
            action: VaultAction::Deposit {
                vault: vault.to_string(),
                amount,
                receiver: receiver.to_string(),
            },
        }
    }

    /// Redemption flow: transfer `shares` of the vault's share token, then
    /// redeem.
    #[must_use]
    pub fn redeem(vault: &str, share_token: &str, shares: Decimal, receiver: &str) -> Self {
        Self {
            transfer: TransferStep {
                token: share_token.to_string(),
                amount: shares,
            },
            action: VaultAction::Redeem {
                vault: vault.to_string(),
                shares,
                receiver: receiver.to_string(),
            },
        }
    }

    /// The vault this batch acts against.
    #[must_use]
    pub fn vault(&self) -> &str {
        match &self.action {
            VaultAction::Deposit { vault, .. } | VaultAction::Redeem { vault, .. } => vault,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn deposit_flow_transfers_the_vault_asset() {
        let batch = VaultBatch::deposit("0xvault", "USDC", dec!(1000), "0xself");
        assert_eq!(batch.transfer.token, "USDC");
        assert_eq!(batch.transfer.amount, dec!(1000));
        assert!(matches!(
            batch.action,
            VaultAction::Deposit { amount, .. } if amount == dec!(1000)
        ));
        assert_eq!(batch.vault(), "0xvault");
    }

    #[test]
    fn redeem_flow_transfers_the_share_token() {
        let batch = VaultBatch::redeem("0xvault", "0xshare", dec!(50), "0xself");
        assert_eq!(batch.transfer.token, "0xshare");
        assert!(matches!(
            batch.action,
            VaultAction::Redeem { shares, .. } if shares == dec!(50)
        ));
    }
}
