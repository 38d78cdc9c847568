use crate::batch::VaultBatch;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// External swap liquidity: pool discovery, quoting, and execution.
///
/// `get_amounts_out` may fail on insufficient depth; callers treat that
/// failure as a zero quote only when comparing alternatives, never when
/// executing.
#[async_trait]
pub trait LiquidityVenue: Send + Sync {
    /// Looks up the pool for a pair in the given style (`stable` flag), if
    /// one exists.
    async fn get_pool(&self, token_a: &str, token_b: &str, stable: bool)
        -> Result<Option<String>>;

    /// Expected output for `amount_in` through `pool`.
    async fn get_amounts_out(
        &self,
        pool: &str,
        amount_in: Decimal,
        token_in: &str,
        token_out: &str,
    ) -> Result<Decimal>;

    /// Executes the swap; fails hard if `min_out` cannot be met before
    /// `deadline`.
    #[allow(clippy::too_many_arguments)]
    async fn swap_exact_tokens_for_tokens(
        &self,
        pool: &str,
        amount_in: Decimal,
        min_out: Decimal,
        token_in: &str,
        token_out: &str,
        recipient: &str,
        deadline: DateTime<Utc>,
    ) -> Result<Decimal>;
}

/// A yield-bearing vault following the deposit/redeem share standard.
#[async_trait]
pub trait VaultVenue: Send + Sync {
    fn address(&self) -> &str;
    async fn asset(&self) -> Result<String>;
    async fn share_token(&self) -> Result<String>;
    async fn balance_of(&self, holder: &str) -> Result<Decimal>;
    async fn convert_to_assets(&self, shares: Decimal) -> Result<Decimal>;
    async fn preview_redeem(&self, shares: Decimal) -> Result<Decimal>;
}

/// Facility executing a (transfer, vault action) pair atomically.
///
/// Returns the amount credited back to the receiver: shares for deposit
/// flows, underlying assets for redemption flows. On error nothing in the
/// batch has taken effect.
#[async_trait]
pub trait BatchExecutor: Send + Sync {
    async fn multicall(&self, batch: VaultBatch) -> Result<Decimal>;
}
