//! Profit-only fee computation.
//!
//! Fees are charged exclusively on realized profit over tracked principal.
//! Losses and break-even settlements are never taxed, and profit at or below
//! the configured threshold passes through untouched.

use crate::error::ManagerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Hard cap on any fee rate, in basis points (10%).
pub const MAX_FEE_BPS: u32 = 1000;

/// Basis-point denominator: rates are expressed out of 10 000.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Fee parameters applied on withdrawal and emergency exit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeePolicy {
    /// Fee rate on profit, in basis points. Always `<= MAX_FEE_BPS`.
    pub rate_bps: u32,
    /// Profit at or below this amount (base-asset units) is not taxed.
    pub min_profit_threshold: Decimal,
    /// Address receiving collected fees.
    pub recipient: String,
}

impl FeePolicy {
    /// Builds a policy, rejecting rates above the cap.
    ///
    /// # Errors
    /// Returns `FeeRateAboveCap` if `rate_bps > MAX_FEE_BPS`.
    pub fn new(
        rate_bps: u32,
        min_profit_threshold: Decimal,
        recipient: String,
    ) -> Result<Self, ManagerError> {
        if rate_bps > MAX_FEE_BPS {
            return Err(ManagerError::FeeRateAboveCap {
                rate_bps,
                max_bps: MAX_FEE_BPS,
            });
        }
        Ok(Self {
            rate_bps,
            min_profit_threshold,
            recipient,
        })
    }
}

/// Result of splitting a settlement into fee and net payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub fee: Decimal,
    pub net: Decimal,
}

/// Splits `settlement` into `(fee, net)` against tracked `principal`.
///
/// Zero fee whenever `settlement <= principal` or the profit does not exceed
/// `min_profit_threshold`; otherwise `fee = floor(profit * rate_bps / 10000)`.
/// Pure and side-effect free, so preview callers reuse it directly.
#[must_use]
pub fn fee_split(
    settlement: Decimal,
    principal: Decimal,
    rate_bps: u32,
    min_profit_threshold: Decimal,
) -> FeeSplit {
    if settlement <= principal {
        return FeeSplit {
            fee: Decimal::ZERO,
            net: settlement,
        };
    }

    let profit = settlement - principal;
    if profit <= min_profit_threshold {
        return FeeSplit {
            fee: Decimal::ZERO,
            net: settlement,
        };
    }

    let fee = (profit * Decimal::from(rate_bps) / Decimal::from(BPS_DENOMINATOR)).floor();
    FeeSplit {
        fee,
        net: settlement - fee,
    }
}

/// Running total of fees collected over the lifetime of the position.
///
/// Monotone non-decreasing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeeLedger {
    total_fees_collected: Decimal,
}

impl FeeLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a collected fee. Negative amounts are ignored rather than
    /// allowed to shrink the total.
    pub fn record(&mut self, fee: Decimal) {
        if fee > Decimal::ZERO {
            self.total_fees_collected += fee;
        }
    }

    #[must_use]
    pub const fn total_fees_collected(&self) -> Decimal {
        self.total_fees_collected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // ============================================================
    // fee_split laws
    // ============================================================

    #[test]
    fn loss_is_never_taxed() {
        let split = fee_split(dec!(900), dec!(1000), 1000, dec!(10));
        assert_eq!(split.fee, dec!(0));
        assert_eq!(split.net, dec!(900));
    }

    #[test]
    fn break_even_is_never_taxed() {
        let split = fee_split(dec!(1000), dec!(1000), 1000, dec!(0));
        assert_eq!(split.fee, dec!(0));
        assert_eq!(split.net, dec!(1000));
    }

    #[test]
    fn profit_at_threshold_is_not_taxed() {
        // profit = 10 == threshold: still passes through
        let split = fee_split(dec!(1010), dec!(1000), 1000, dec!(10));
        assert_eq!(split.fee, dec!(0));
        assert_eq!(split.net, dec!(1010));
    }

    #[test]
    fn profit_above_threshold_is_taxed_at_rate() {
        // profit = 50, 1000 bps -> fee 5, net 1045
        let split = fee_split(dec!(1050), dec!(1000), 1000, dec!(10));
        assert_eq!(split.fee, dec!(5));
        assert_eq!(split.net, dec!(1045));
    }

    #[test]
    fn fee_is_floored() {
        // profit = 33, 1000 bps -> 3.3 floors to 3
        let split = fee_split(dec!(1033), dec!(1000), 1000, dec!(0));
        assert_eq!(split.fee, dec!(3));
        assert_eq!(split.net, dec!(1030));
    }

    #[test]
    fn fee_never_reaches_profit() {
        // even at the 1000 bps cap the fee is a tenth of profit
        for profit in [dec!(1), dec!(7), dec!(99), dec!(100_000)] {
            let split = fee_split(dec!(1000) + profit, dec!(1000), MAX_FEE_BPS, dec!(0));
            assert!(split.fee < profit, "fee {} >= profit {}", split.fee, profit);
        }
    }

    #[test]
    fn fee_is_monotone_in_profit() {
        let mut last = Decimal::MIN;
        for settlement in [dec!(1011), dec!(1020), dec!(1100), dec!(2000), dec!(9999)] {
            let split = fee_split(settlement, dec!(1000), 300, dec!(10));
            assert!(split.fee >= last);
            last = split.fee;
        }
    }

    #[test]
    fn fee_plus_net_equals_settlement() {
        let split = fee_split(dec!(1234), dec!(1000), 750, dec!(10));
        assert_eq!(split.fee + split.net, dec!(1234));
    }

    #[test]
    fn zero_rate_charges_nothing() {
        let split = fee_split(dec!(2000), dec!(1000), 0, dec!(0));
        assert_eq!(split.fee, dec!(0));
        assert_eq!(split.net, dec!(2000));
    }

    // ============================================================
    // FeePolicy
    // ============================================================

    #[test]
    fn policy_rejects_rate_above_cap() {
        let err = FeePolicy::new(1001, dec!(10), "0xfee".to_string()).unwrap_err();
        assert!(matches!(err, ManagerError::FeeRateAboveCap { .. }));
    }

    #[test]
    fn policy_accepts_rate_at_cap() {
        let policy = FeePolicy::new(MAX_FEE_BPS, dec!(10), "0xfee".to_string()).unwrap();
        assert_eq!(policy.rate_bps, 1000);
    }

    // ============================================================
    // FeeLedger
    // ============================================================

    #[test]
    fn ledger_accumulates_monotonically() {
        let mut ledger = FeeLedger::new();
        ledger.record(dec!(5));
        ledger.record(dec!(0));
        ledger.record(dec!(3));
        assert_eq!(ledger.total_fees_collected(), dec!(8));
    }

    #[test]
    fn ledger_ignores_negative_amounts() {
        let mut ledger = FeeLedger::new();
        ledger.record(dec!(10));
        ledger.record(dec!(-4));
        assert_eq!(ledger.total_fees_collected(), dec!(10));
    }
}
