use rust_decimal::Decimal;
use thiserror::Error;

/// Broad classification of a [`ManagerError`], mirroring the operational
/// taxonomy: who may call, what policy allows, whether liquidity exists,
/// whether an external call kept its guarantee, and ledger-state mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authorization,
    Policy,
    Liquidity,
    Execution,
    State,
}

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("caller {caller} lacks the {required} role")]
    Unauthorized { caller: String, required: &'static str },

    #[error("operations are paused")]
    Paused,

    #[error("operation is only permitted while paused")]
    NotPaused,

    #[error("venue {0} is not whitelisted")]
    VenueNotApproved(String),

    #[error("deposit of {amount} is below the required minimum {minimum}")]
    BelowMinimumDeposit { amount: Decimal, minimum: Decimal },

    #[error("rebalance cooldown has {remaining_secs}s remaining")]
    CooldownActive { remaining_secs: i64 },

    #[error("position is not initialized")]
    NotInitialized,

    #[error("fee rate {rate_bps} bps exceeds the {max_bps} bps cap")]
    FeeRateAboveCap { rate_bps: u32, max_bps: u32 },

    #[error("amount must be positive")]
    ZeroAmount,

    #[error("identical token {0} on both sides of a swap")]
    IdenticalTokens(String),

    #[error("no liquidity pool for {token_in} -> {token_out}")]
    NoLiquidity { token_in: String, token_out: String },

    #[error("pool {pool} cannot quote {token_in} -> {token_out}")]
    UnquotablePool {
        pool: String,
        token_in: String,
        token_out: String,
    },

    #[error("swap on pool {pool} failed: {reason}")]
    SwapFailed { pool: String, reason: String },

    #[error("atomic batch against vault {vault} failed: {reason}")]
    BatchFailed { vault: String, reason: String },

    #[error("venue {0} is not the active venue")]
    VenueNotActive(String),

    #[error("cannot remove the active venue {0}")]
    RemoveActiveVenue(String),

    #[error("source and target venue are both {0}")]
    SameVenue(String),

    #[error("no shares to redeem at venue {0}")]
    NothingToRedeem(String),

    #[error("no active position")]
    NoActivePosition,

    /// A collaborator view call (vault balance, asset lookup, pool discovery)
    /// failed outright.
    #[error(transparent)]
    Venue(#[from] anyhow::Error),
}

impl ManagerError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Authorization,
            Self::Paused
            | Self::NotPaused
            | Self::VenueNotApproved(_)
            | Self::BelowMinimumDeposit { .. }
            | Self::CooldownActive { .. }
            | Self::NotInitialized
            | Self::FeeRateAboveCap { .. }
            | Self::ZeroAmount
            | Self::IdenticalTokens(_)
            | Self::SameVenue(_) => ErrorKind::Policy,
            Self::NoLiquidity { .. } | Self::UnquotablePool { .. } => ErrorKind::Liquidity,
            Self::SwapFailed { .. } | Self::BatchFailed { .. } | Self::Venue(_) => {
                ErrorKind::Execution
            }
            Self::VenueNotActive(_)
            | Self::RemoveActiveVenue(_)
            | Self::NothingToRedeem(_)
            | Self::NoActivePosition => ErrorKind::State,
        }
    }
}
