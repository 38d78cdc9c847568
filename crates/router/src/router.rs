//! Optimal-venue swap routing.
//!
//! Conversions go through the better of two external pool styles for the
//! pair. A fixed 0.1% bias is applied to the stable-style quote before
//! comparison, breaking near-ties toward the typically lower-impact venue.
//! Execution is bounded by a 5% slippage tolerance and a 5-minute deadline;
//! the preview path reuses the identical selection and quoting logic without
//! trading.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};
use vault_manager_core::error::ManagerError;
use vault_manager_core::events::SwapSummary;
use vault_manager_core::fees::BPS_DENOMINATOR;
use vault_manager_core::traits::LiquidityVenue;

/// Bias applied to the stable-style quote before comparison: 0.1%.
pub const STABLE_BIAS_BPS: u32 = 10;

/// Slippage tolerance on execution: 5%.
pub const SLIPPAGE_TOLERANCE_BPS: u32 = 500;

/// Execution deadline, bounding quote staleness.
pub const SWAP_DEADLINE_SECS: i64 = 300;

/// A discovered pool together with its comparative quote.
///
/// `quoted` distinguishes a failed quote (treated as zero for comparison
/// only) from a genuine zero-value quote.
#[derive(Debug, Clone)]
struct PoolQuote {
    pool: String,
    stable: bool,
    expected_out: Decimal,
    quoted: bool,
}

pub struct SwapRouter {
    liquidity: Arc<dyn LiquidityVenue>,
    recipient: String,
}

impl SwapRouter {
    #[must_use]
    pub fn new(liquidity: Arc<dyn LiquidityVenue>, recipient: String) -> Self {
        Self {
            liquidity,
            recipient,
        }
    }

    /// Converts `amount_in` of `token_in` into `token_out` through the
    /// selected pool, under the slippage bound and deadline.
    ///
    /// # Errors
    /// `Policy` on identical tokens or zero input, `Liquidity` when no pool
    /// exists for the pair or the selected pool failed to quote, `Execution`
    /// when the selected pool cannot meet `min_out` before the deadline. The
    /// conversion fails atomically; there is no partial swap.
    pub async fn convert(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: Decimal,
    ) -> Result<SwapSummary, ManagerError> {
        let quote = self.select_pool(token_in, token_out, amount_in).await?;
        if !quote.quoted {
            // The zero stand-in exists for comparison only; executing on it
            // would set min_out to zero and void the slippage bound.
            return Err(ManagerError::UnquotablePool {
                pool: quote.pool,
                token_in: token_in.to_string(),
                token_out: token_out.to_string(),
            });
        }
        let min_out = apply_slippage(quote.expected_out);
        let deadline = Utc::now() + Duration::seconds(SWAP_DEADLINE_SECS);

        let amount_out = self
            .liquidity
            .swap_exact_tokens_for_tokens(
                &quote.pool,
                amount_in,
                min_out,
                token_in,
                token_out,
                &self.recipient,
                deadline,
            )
            .await
            .map_err(|e| ManagerError::SwapFailed {
                pool: quote.pool.clone(),
                reason: e.to_string(),
            })?;

        info!(
            pool = %quote.pool,
            stable = quote.stable,
            %token_in,
            %token_out,
            %amount_in,
            %amount_out,
            %min_out,
            "swap executed"
        );

        Ok(SwapSummary {
            token_in: token_in.to_string(),
            token_out: token_out.to_string(),
            amount_in,
            amount_out,
        })
    }

    /// Read-only preview of a conversion: identical pool selection and
    /// quoting, no trade.
    ///
    /// # Errors
    /// Same as [`SwapRouter::convert`], minus execution failures.
    pub async fn preview(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: Decimal,
    ) -> Result<Decimal, ManagerError> {
        let quote = self.select_pool(token_in, token_out, amount_in).await?;
        Ok(quote.expected_out)
    }

    /// Discovers both pool styles for the pair and picks one.
    ///
    /// With a single pool it is used unconditionally. With both, each is
    /// quoted independently; a failed quote counts as zero for comparison
    /// only, and the stable quote gets the fixed bias before the larger
    /// biased value wins.
    async fn select_pool(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: Decimal,
    ) -> Result<PoolQuote, ManagerError> {
        if token_in == token_out {
            return Err(ManagerError::IdenticalTokens(token_in.to_string()));
        }
        if amount_in <= Decimal::ZERO {
            return Err(ManagerError::ZeroAmount);
        }

        let stable_pool = self.liquidity.get_pool(token_in, token_out, true).await?;
        let volatile_pool = self.liquidity.get_pool(token_in, token_out, false).await?;

        match (stable_pool, volatile_pool) {
            (None, None) => Err(ManagerError::NoLiquidity {
                token_in: token_in.to_string(),
                token_out: token_out.to_string(),
            }),
            (Some(pool), None) => Ok(self.quote(pool, true, token_in, token_out, amount_in).await),
            (None, Some(pool)) => Ok(self.quote(pool, false, token_in, token_out, amount_in).await),
            (Some(stable), Some(volatile)) => {
                let stable = self.quote(stable, true, token_in, token_out, amount_in).await;
                let volatile = self
                    .quote(volatile, false, token_in, token_out, amount_in)
                    .await;

                let bias = Decimal::from(BPS_DENOMINATOR + STABLE_BIAS_BPS);
                let biased_stable = stable.expected_out * bias / Decimal::from(BPS_DENOMINATOR);

                debug!(
                    stable_pool = %stable.pool,
                    volatile_pool = %volatile.pool,
                    stable_out = %stable.expected_out,
                    volatile_out = %volatile.expected_out,
                    %biased_stable,
                    "comparing pool quotes"
                );

                if biased_stable >= volatile.expected_out {
                    Ok(stable)
                } else {
                    Ok(volatile)
                }
            }
        }
    }

    /// Quotes a pool; a failed quote reflects insufficient depth, not a
    /// broken venue, so it becomes a zero comparison value rather than an
    /// error.
    async fn quote(
        &self,
        pool: String,
        stable: bool,
        token_in: &str,
        token_out: &str,
        amount_in: Decimal,
    ) -> PoolQuote {
        match self
            .liquidity
            .get_amounts_out(&pool, amount_in, token_in, token_out)
            .await
        {
            Ok(expected_out) => PoolQuote {
                pool,
                stable,
                expected_out,
                quoted: true,
            },
            Err(e) => {
                debug!(pool = %pool, error = %e, "quote failed, comparing as zero");
                PoolQuote {
                    pool,
                    stable,
                    expected_out: Decimal::ZERO,
                    quoted: false,
                }
            }
        }
    }
}

fn apply_slippage(expected_out: Decimal) -> Decimal {
    expected_out * Decimal::from(BPS_DENOMINATOR - SLIPPAGE_TOLERANCE_BPS)
        / Decimal::from(BPS_DENOMINATOR)
}
