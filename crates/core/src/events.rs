use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One asset conversion performed during an operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapSummary {
    pub token_in: String,
    pub token_out: String,
    pub amount_in: Decimal,
    pub amount_out: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositReceipt {
    pub venue: String,
    pub amount: Decimal,
    pub principal: Decimal,
    pub swaps: Vec<SwapSummary>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceReceipt {
    pub from_venue: Option<String>,
    pub to_venue: String,
    pub redeemed: Decimal,
    pub fee: Decimal,
    pub redeployed: Decimal,
    pub swaps: Vec<SwapSummary>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawReceipt {
    pub venue: String,
    pub redeemed: Decimal,
    pub fee: Decimal,
    pub paid_out: Decimal,
    pub principal_remaining: Decimal,
    pub swaps: Vec<SwapSummary>,
    pub timestamp: DateTime<Utc>,
}

/// Structured per-operation events for off-chain observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LedgerEvent {
    Deposited(DepositReceipt),
    Rebalanced(RebalanceReceipt),
    Withdrawn(WithdrawReceipt),
    EmergencyExited(WithdrawReceipt),
    VenueApproved { venue: String },
    VenueRemoved { venue: String },
    FeePolicyUpdated { rate_bps: u32, min_profit_threshold: Decimal, recipient: String },
    Paused,
    Unpaused,
}
