//! In-memory venue doubles shared by the ledger integration tests.

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vault_manager_core::batch::{VaultAction, VaultBatch};
use vault_manager_core::config::{FeeConfig, ManagerConfig};
use vault_manager_core::traits::{BatchExecutor, LiquidityVenue, VaultVenue};

pub const OWNER: &str = "0xowner";
pub const ADMIN: &str = "0xadmin";
pub const SELF: &str = "0xmanager";

pub fn config() -> ManagerConfig {
    ManagerConfig {
        base_asset: "USDC".to_string(),
        self_address: SELF.to_string(),
        owner: OWNER.to_string(),
        admin: ADMIN.to_string(),
        min_initial_deposit: Decimal::from(1000),
        rebalance_cooldown_secs: 0,
        rebalance_fee_bps: 500,
        fee: FeeConfig {
            rate_bps: 1000,
            min_profit_threshold: Decimal::from(10),
            recipient: "0xtreasury".to_string(),
        },
    }
}

struct VaultState {
    shares: Decimal,
    rate: Decimal,
    redeem_rate: Option<Decimal>,
}

/// Share-standard vault: one holder, value = shares * rate.
pub struct MockVault {
    address: String,
    asset: String,
    state: Mutex<VaultState>,
}

impl MockVault {
    pub fn new(address: &str, asset: &str) -> Arc<Self> {
        Arc::new(Self {
            address: address.to_string(),
            asset: asset.to_string(),
            state: Mutex::new(VaultState {
                shares: Decimal::ZERO,
                rate: Decimal::ONE,
                redeem_rate: None,
            }),
        })
    }

    /// Simulates yield by changing the per-share asset value.
    pub fn set_rate(&self, rate: Decimal) {
        self.state.lock().unwrap().rate = rate;
    }

    /// Makes the redemption preview diverge from the spot rate, as a vault
    /// with an exit haircut would.
    pub fn set_redeem_rate(&self, rate: Decimal) {
        self.state.lock().unwrap().redeem_rate = Some(rate);
    }

    pub fn shares(&self) -> Decimal {
        self.state.lock().unwrap().shares
    }
}

#[async_trait]
impl VaultVenue for MockVault {
    fn address(&self) -> &str {
        &self.address
    }
    async fn asset(&self) -> Result<String> {
        Ok(self.asset.clone())
    }
    async fn share_token(&self) -> Result<String> {
        Ok(format!("{}-share", self.address))
    }
    async fn balance_of(&self, _holder: &str) -> Result<Decimal> {
        Ok(self.state.lock().unwrap().shares)
    }
    async fn convert_to_assets(&self, shares: Decimal) -> Result<Decimal> {
        Ok(shares * self.state.lock().unwrap().rate)
    }
    async fn preview_redeem(&self, shares: Decimal) -> Result<Decimal> {
        let state = self.state.lock().unwrap();
        Ok(shares * state.redeem_rate.unwrap_or(state.rate))
    }
}

/// Batch facility over the mock vaults. Failure is checked before any state
/// change, matching the all-or-nothing multicall contract.
#[derive(Default)]
pub struct MockFacility {
    vaults: Mutex<HashMap<String, Arc<MockVault>>>,
    pub fail_next: AtomicBool,
    pub batches_run: AtomicUsize,
}

impl MockFacility {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn register(&self, vault: Arc<MockVault>) {
        self.vaults
            .lock()
            .unwrap()
            .insert(vault.address.clone(), vault);
    }
}

#[async_trait]
impl BatchExecutor for MockFacility {
    async fn multicall(&self, batch: VaultBatch) -> Result<Decimal> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            bail!("batch reverted");
        }
        let vault = self
            .vaults
            .lock()
            .unwrap()
            .get(batch.vault())
            .cloned()
            .expect("batch against unregistered vault");
        let mut state = vault.state.lock().unwrap();
        let credited = match batch.action {
            VaultAction::Deposit { amount, .. } => {
                let shares = amount / state.rate;
                state.shares += shares;
                shares
            }
            VaultAction::Redeem { shares, .. } => {
                if shares > state.shares {
                    bail!("insufficient shares");
                }
                state.shares -= shares;
                shares * state.rate
            }
        };
        self.batches_run.fetch_add(1, Ordering::SeqCst);
        Ok(credited)
    }
}

/// Pool liquidity keyed by (in, out, stable); swaps convert at a fixed rate.
#[derive(Default)]
pub struct MockLiquidity {
    pools: Mutex<HashMap<(String, String, bool), (String, Decimal)>>,
    pub swaps_run: AtomicUsize,
}

impl MockLiquidity {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_pool(&self, token_in: &str, token_out: &str, stable: bool, rate: Decimal) {
        let pool = format!("{token_in}/{token_out}");
        self.pools
            .lock()
            .unwrap()
            .insert((token_in.to_string(), token_out.to_string(), stable), (pool, rate));
    }
}

#[async_trait]
impl LiquidityVenue for MockLiquidity {
    async fn get_pool(&self, token_a: &str, token_b: &str, stable: bool) -> Result<Option<String>> {
        Ok(self
            .pools
            .lock()
            .unwrap()
            .get(&(token_a.to_string(), token_b.to_string(), stable))
            .map(|(pool, _)| pool.clone()))
    }

    async fn get_amounts_out(
        &self,
        pool: &str,
        amount_in: Decimal,
        _token_in: &str,
        _token_out: &str,
    ) -> Result<Decimal> {
        let rate = self.rate_of(pool)?;
        Ok(amount_in * rate)
    }

    async fn swap_exact_tokens_for_tokens(
        &self,
        pool: &str,
        amount_in: Decimal,
        min_out: Decimal,
        _token_in: &str,
        _token_out: &str,
        _recipient: &str,
        _deadline: DateTime<Utc>,
    ) -> Result<Decimal> {
        let rate = self.rate_of(pool)?;
        let out = amount_in * rate;
        if out < min_out {
            bail!("min_out unmet");
        }
        self.swaps_run.fetch_add(1, Ordering::SeqCst);
        Ok(out)
    }
}

impl MockLiquidity {
    fn rate_of(&self, pool: &str) -> Result<Decimal> {
        let pools = self.pools.lock().unwrap();
        for (p, rate) in pools.values() {
            if p == pool {
                return Ok(*rate);
            }
        }
        bail!("unknown pool {pool}");
    }
}
