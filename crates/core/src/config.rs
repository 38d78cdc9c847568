use crate::error::ManagerError;
use crate::fees::MAX_FEE_BPS;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// The reference currency all principal and fee accounting uses.
    pub base_asset: String,
    /// Address this instance holds venue shares under.
    pub self_address: String,
    pub owner: String,
    pub admin: String,
    /// Required size of the very first deposit; later deposits may be any
    /// positive amount.
    pub min_initial_deposit: Decimal,
    pub rebalance_cooldown_secs: u64,
    /// Rate charged on profit during a manual rebalance, in basis points.
    pub rebalance_fee_bps: u32,
    pub fee: FeeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    pub rate_bps: u32,
    pub min_profit_threshold: Decimal,
    pub recipient: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            base_asset: "USDC".to_string(),
            self_address: "0xmanager".to_string(),
            owner: "0xowner".to_string(),
            admin: "0xadmin".to_string(),
            min_initial_deposit: Decimal::from(1000),
            rebalance_cooldown_secs: 86_400,
            rebalance_fee_bps: 1000,
            fee: FeeConfig {
                rate_bps: 500,
                min_profit_threshold: Decimal::from(10),
                recipient: "0xtreasury".to_string(),
            },
        }
    }
}

impl ManagerConfig {
    /// Checks policy bounds: both fee rates capped, positive minimum deposit.
    ///
    /// # Errors
    /// Returns a `Policy` error on the first violated bound.
    pub fn validate(&self) -> Result<(), ManagerError> {
        if self.fee.rate_bps > MAX_FEE_BPS {
            return Err(ManagerError::FeeRateAboveCap {
                rate_bps: self.fee.rate_bps,
                max_bps: MAX_FEE_BPS,
            });
        }
        if self.rebalance_fee_bps > MAX_FEE_BPS {
            return Err(ManagerError::FeeRateAboveCap {
                rate_bps: self.rebalance_fee_bps,
                max_bps: MAX_FEE_BPS,
            });
        }
        if self.min_initial_deposit <= Decimal::ZERO {
            return Err(ManagerError::ZeroAmount);
        }
        Ok(())
    }
}
