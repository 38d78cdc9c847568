use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The single custodial position this instance manages.
///
/// `principal` is tracked purely in base-asset units, regardless of which
/// venue asset the funds currently sit in. It only grows on deposit and only
/// shrinks on withdrawal or exit, floored at zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Position {
    pub principal: Decimal,
    pub current_venue: Option<String>,
    pub initialized: bool,
    pub last_rebalance_time: Option<DateTime<Utc>>,
}

impl Position {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increases principal by a deposit amount (base-asset terms).
    pub fn credit_principal(&mut self, amount: Decimal) {
        self.principal += amount;
    }

    /// Decreases principal by a redeemed amount, floored at zero.
    pub fn debit_principal(&mut self, amount: Decimal) {
        self.principal = (self.principal - amount).max(Decimal::ZERO);
    }

    /// Seconds remaining until the cooldown elapses, zero if never rebalanced
    /// or already elapsed.
    #[must_use]
    pub fn cooldown_remaining_secs(&self, now: DateTime<Utc>, cooldown_secs: u64) -> i64 {
        match self.last_rebalance_time {
            None => 0,
            Some(last) => {
                let elapsed = now.signed_duration_since(last).num_seconds();
                (cooldown_secs as i64 - elapsed).max(0)
            }
        }
    }
}
