//! Atomic two-step execution against external vaults.
//!
//! Each flow pairs a token transfer with a vault action and hands the pair
//! to an injected batch facility. The facility's contract is all-or-nothing:
//! either both steps land or neither does, so no intermediate custody state
//! is ever observable. This component trusts the facility's reported outcome
//! and signals failure upward; callers write ledger state only after success.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;
use vault_manager_core::batch::VaultBatch;
use vault_manager_core::error::ManagerError;
use vault_manager_core::traits::{BatchExecutor, VaultVenue};

pub struct AtomicExecutor {
    facility: Arc<dyn BatchExecutor>,
}

impl AtomicExecutor {
    #[must_use]
    pub fn new(facility: Arc<dyn BatchExecutor>) -> Self {
        Self { facility }
    }

    /// Deposit flow: transfer `amount` of the vault's asset to the
    /// intermediary, then deposit into the vault crediting shares back to
    /// `receiver`. Deposits are never rejected on price grounds here.
    ///
    /// # Errors
    /// `Execution` if the batch fails; nothing has moved in that case.
    pub async fn deposit(
        &self,
        vault: &dyn VaultVenue,
        amount: Decimal,
        receiver: &str,
    ) -> Result<Decimal, ManagerError> {
        if amount <= Decimal::ZERO {
            return Err(ManagerError::ZeroAmount);
        }
        let asset = vault.asset().await?;
        let batch = VaultBatch::deposit(vault.address(), &asset, amount, receiver);
        self.submit(batch).await
    }

    /// Redemption flow: transfer `shares` of the vault's share token to the
    /// intermediary, then redeem crediting underlying assets back to
    /// `receiver`. No price floor is enforced; slippage protection belongs
    /// to the swap router downstream.
    ///
    /// # Errors
    /// `Execution` if the batch fails; nothing has moved in that case.
    pub async fn redeem(
        &self,
        vault: &dyn VaultVenue,
        shares: Decimal,
        receiver: &str,
    ) -> Result<Decimal, ManagerError> {
        if shares <= Decimal::ZERO {
            return Err(ManagerError::ZeroAmount);
        }
        let share_token = vault.share_token().await?;
        let batch = VaultBatch::redeem(vault.address(), &share_token, shares, receiver);
        self.submit(batch).await
    }

    async fn submit(&self, batch: VaultBatch) -> Result<Decimal, ManagerError> {
        let vault = batch.vault().to_string();
        debug!(vault = %vault, ?batch, "submitting atomic batch");
        self.facility
            .multicall(batch)
            .await
            .map_err(|e| ManagerError::BatchFailed {
                vault,
                reason: e.to_string(),
            })
    }
}
