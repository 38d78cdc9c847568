//! The position ledger: a single-owner state machine orchestrating deposits,
//! rebalances, withdrawals, and emergency exits across whitelisted venues.
//!
//! Every public operation runs serialized end-to-end. All ledger writes
//! (principal, active venue, timestamps, fee totals) happen strictly after
//! the external swap and batch calls return success, so a failed external
//! call leaves the ledger exactly as it was.

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use vault_manager_core::config::ManagerConfig;
use vault_manager_core::error::ManagerError;
use vault_manager_core::events::{
    DepositReceipt, LedgerEvent, RebalanceReceipt, SwapSummary, WithdrawReceipt,
};
use vault_manager_core::fees::{fee_split, FeeLedger, FeePolicy, FeeSplit};
use vault_manager_core::position::Position;
use vault_manager_core::traits::{BatchExecutor, LiquidityVenue, VaultVenue};
use vault_manager_execution::AtomicExecutor;
use vault_manager_router::SwapRouter;

use crate::guard::RoleGate;
use crate::whitelist::VenueWhitelist;

pub struct PositionLedger {
    config: ManagerConfig,
    gate: RoleGate,
    position: Position,
    whitelist: VenueWhitelist,
    fee_policy: FeePolicy,
    fee_ledger: FeeLedger,
    paused: bool,
    router: SwapRouter,
    executor: AtomicExecutor,
    events: Vec<LedgerEvent>,
}

impl PositionLedger {
    /// Builds a ledger over the injected liquidity venue and batch facility.
    ///
    /// # Errors
    /// `Policy` if the configuration violates fee or deposit bounds.
    pub fn new(
        config: ManagerConfig,
        liquidity: Arc<dyn LiquidityVenue>,
        facility: Arc<dyn BatchExecutor>,
    ) -> Result<Self, ManagerError> {
        config.validate()?;
        let fee_policy = FeePolicy::new(
            config.fee.rate_bps,
            config.fee.min_profit_threshold,
            config.fee.recipient.clone(),
        )?;
        let gate = RoleGate::new(config.owner.clone(), config.admin.clone());
        let router = SwapRouter::new(liquidity, config.self_address.clone());
        let executor = AtomicExecutor::new(facility);
        Ok(Self {
            config,
            gate,
            position: Position::new(),
            whitelist: VenueWhitelist::new(),
            fee_policy,
            fee_ledger: FeeLedger::new(),
            paused: false,
            router,
            executor,
            events: Vec::new(),
        })
    }

    // ============================================================
    // Economic operations
    // ============================================================

    /// Deposits `amount` of the base asset into `venue`.
    ///
    /// The first qualifying deposit initializes the position and must meet
    /// the configured minimum; later deposits accept any positive amount.
    /// Depositing into a venue other than the active one first redeems the
    /// active venue in full and folds the proceeds into the new deposit.
    /// Principal grows by `amount`, always in base-asset terms.
    ///
    /// # Errors
    /// Owner-only. `Policy`, `Liquidity`, or `Execution` per the operation's
    /// failure taxonomy; on any error the ledger is unchanged.
    pub async fn initial_deposit(
        &mut self,
        caller: &str,
        venue: &str,
        amount: Decimal,
    ) -> Result<DepositReceipt, ManagerError> {
        self.gate.ensure_owner(caller)?;
        self.ensure_not_paused()?;
        let vault = self.vault(venue)?;
        if amount <= Decimal::ZERO {
            return Err(ManagerError::ZeroAmount);
        }
        if !self.position.initialized && amount < self.config.min_initial_deposit {
            return Err(ManagerError::BelowMinimumDeposit {
                amount,
                minimum: self.config.min_initial_deposit,
            });
        }

        // The owner's base-asset transfer in is the batch facility's concern;
        // from here on `amount` is custodied base asset.
        let mut swaps = Vec::new();
        let mut total_base = amount;

        if let Some(active) = self.position.current_venue.clone() {
            if active != venue {
                let active_vault = self.vault(&active)?;
                let shares = active_vault.balance_of(&self.config.self_address).await?;
                if shares > Decimal::ZERO {
                    let redeemed = self
                        .executor
                        .redeem(active_vault.as_ref(), shares, &self.config.self_address)
                        .await?;
                    let (base, swap) = self.settle_to_base(&active_vault, redeemed).await?;
                    swaps.extend(swap);
                    total_base += base;
                }
            }
        }

        let deployed = self.deploy(&vault, total_base, &mut swaps).await?;

        self.position.initialized = true;
        self.position.credit_principal(amount);
        self.position.current_venue = Some(venue.to_string());
        let now = Utc::now();
        self.position.last_rebalance_time = Some(now);

        info!(
            %venue,
            %amount,
            %deployed,
            principal = %self.position.principal,
            "deposit settled"
        );
        let receipt = DepositReceipt {
            venue: venue.to_string(),
            amount,
            principal: self.position.principal,
            swaps,
            timestamp: now,
        };
        self.events.push(LedgerEvent::Deposited(receipt.clone()));
        Ok(receipt)
    }

    /// Moves the whole position to `target_venue`, respecting the cooldown.
    ///
    /// Rebalancing to the venue that is already active refreshes the
    /// timestamp and does nothing else: no swap, no batch. No fee is charged
    /// on a periodic rebalance and principal is unchanged.
    ///
    /// # Errors
    /// Owner-or-admin. `CooldownActive` inside the interval (waived before
    /// the first rebalance), `State` errors when nothing is deployed.
    pub async fn periodic_rebalance(
        &mut self,
        caller: &str,
        target_venue: &str,
    ) -> Result<RebalanceReceipt, ManagerError> {
        self.gate.ensure_owner_or_admin(caller)?;
        self.ensure_not_paused()?;
        if !self.position.initialized {
            return Err(ManagerError::NotInitialized);
        }
        if self.position.principal <= Decimal::ZERO {
            return Err(ManagerError::NoActivePosition);
        }
        let target_vault = self.vault(target_venue)?;

        let now = Utc::now();
        let remaining = self
            .position
            .cooldown_remaining_secs(now, self.config.rebalance_cooldown_secs);
        if remaining > 0 {
            return Err(ManagerError::CooldownActive {
                remaining_secs: remaining,
            });
        }

        if self.position.current_venue.as_deref() == Some(target_venue) {
            self.position.last_rebalance_time = Some(now);
            info!(venue = %target_venue, "rebalance to active venue, timestamp refreshed");
            let receipt = RebalanceReceipt {
                from_venue: Some(target_venue.to_string()),
                to_venue: target_venue.to_string(),
                redeemed: Decimal::ZERO,
                fee: Decimal::ZERO,
                redeployed: Decimal::ZERO,
                swaps: Vec::new(),
                timestamp: now,
            };
            self.events.push(LedgerEvent::Rebalanced(receipt.clone()));
            return Ok(receipt);
        }

        let active = self
            .position
            .current_venue
            .clone()
            .ok_or(ManagerError::NoActivePosition)?;
        let active_vault = self.vault(&active)?;
        let shares = active_vault.balance_of(&self.config.self_address).await?;
        if shares <= Decimal::ZERO {
            return Err(ManagerError::NothingToRedeem(active));
        }

        let redeemed = self
            .executor
            .redeem(active_vault.as_ref(), shares, &self.config.self_address)
            .await?;

        let mut swaps = Vec::new();
        let from_asset = active_vault.asset().await?;
        let target_asset = target_vault.asset().await?;
        let redeploy_amount = if from_asset == target_asset {
            redeemed
        } else {
            let swap = self
                .router
                .convert(&from_asset, &target_asset, redeemed)
                .await?;
            let out = swap.amount_out;
            swaps.push(swap);
            out
        };
        self.executor
            .deposit(target_vault.as_ref(), redeploy_amount, &self.config.self_address)
            .await?;

        self.position.current_venue = Some(target_venue.to_string());
        self.position.last_rebalance_time = Some(now);

        info!(
            from = %active,
            to = %target_venue,
            %redeemed,
            %redeploy_amount,
            "periodic rebalance settled"
        );
        let receipt = RebalanceReceipt {
            from_venue: Some(active),
            to_venue: target_venue.to_string(),
            redeemed,
            fee: Decimal::ZERO,
            redeployed: redeploy_amount,
            swaps,
            timestamp: now,
        };
        self.events.push(LedgerEvent::Rebalanced(receipt.clone()));
        Ok(receipt)
    }

    /// Admin-initiated move from the active venue to another, collecting the
    /// separate rebalance-rate fee on positive profit only. Funds stay
    /// invested and principal is unchanged.
    ///
    /// # Errors
    /// Admin-only. `SameVenue` when source equals target, `State` errors when
    /// the source is not active or holds nothing.
    pub async fn manual_rebalance(
        &mut self,
        caller: &str,
        from_venue: &str,
        to_venue: &str,
    ) -> Result<RebalanceReceipt, ManagerError> {
        self.gate.ensure_admin(caller)?;
        self.ensure_not_paused()?;
        if !self.position.initialized {
            return Err(ManagerError::NotInitialized);
        }
        if from_venue == to_venue {
            return Err(ManagerError::SameVenue(from_venue.to_string()));
        }
        if self.position.current_venue.as_deref() != Some(from_venue) {
            return Err(ManagerError::VenueNotActive(from_venue.to_string()));
        }
        let from_vault = self.vault(from_venue)?;
        let to_vault = self.vault(to_venue)?;

        let shares = from_vault.balance_of(&self.config.self_address).await?;
        if shares <= Decimal::ZERO {
            return Err(ManagerError::NothingToRedeem(from_venue.to_string()));
        }

        let redeemed = self
            .executor
            .redeem(from_vault.as_ref(), shares, &self.config.self_address)
            .await?;
        let mut swaps = Vec::new();
        let (settlement, swap) = self.settle_to_base(&from_vault, redeemed).await?;
        swaps.extend(swap);

        // Profit-only fee at the rebalance rate; no threshold applies here.
        let split = fee_split(
            settlement,
            self.position.principal,
            self.config.rebalance_fee_bps,
            Decimal::ZERO,
        );

        let redeployed = self.deploy(&to_vault, split.net, &mut swaps).await?;

        self.fee_ledger.record(split.fee);
        self.position.current_venue = Some(to_venue.to_string());
        let now = Utc::now();
        self.position.last_rebalance_time = Some(now);

        info!(
            from = %from_venue,
            to = %to_venue,
            %settlement,
            fee = %split.fee,
            fee_recipient = %self.fee_policy.recipient,
            %redeployed,
            "manual rebalance settled"
        );
        let receipt = RebalanceReceipt {
            from_venue: Some(from_venue.to_string()),
            to_venue: to_venue.to_string(),
            redeemed: settlement,
            fee: split.fee,
            redeployed: split.net,
            swaps,
            timestamp: now,
        };
        self.events.push(LedgerEvent::Rebalanced(receipt.clone()));
        Ok(receipt)
    }

    /// Redeems `shares` from the active venue and pays out with the standard
    /// profit-fee split. A zero or oversized `shares` means the full balance.
    /// Principal shrinks by the pre-fee settlement, floored at zero.
    ///
    /// # Errors
    /// Owner-only. `VenueNotActive` unless `venue` is the active venue.
    pub async fn withdraw(
        &mut self,
        caller: &str,
        venue: &str,
        shares: Decimal,
    ) -> Result<WithdrawReceipt, ManagerError> {
        self.gate.ensure_owner(caller)?;
        self.ensure_not_paused()?;
        let receipt = self.redeem_and_pay_out(venue, shares).await?;
        self.events.push(LedgerEvent::Withdrawn(receipt.clone()));
        Ok(receipt)
    }

    /// Full exit while paused: redeems everything from the active venue,
    /// applies the standard fee policy, and zeroes principal.
    ///
    /// # Errors
    /// Owner-only; `NotPaused` unless the pause switch is on.
    pub async fn emergency_exit(
        &mut self,
        caller: &str,
        venue: &str,
    ) -> Result<WithdrawReceipt, ManagerError> {
        self.gate.ensure_owner(caller)?;
        if !self.paused {
            return Err(ManagerError::NotPaused);
        }
        let receipt = self.redeem_and_pay_out(venue, Decimal::ZERO).await?;
        self.position.principal = Decimal::ZERO;
        self.position.current_venue = None;
        self.events.push(LedgerEvent::EmergencyExited(receipt.clone()));
        Ok(receipt)
    }

    // ============================================================
    // Administration
    // ============================================================

    /// Whitelists a venue (admin). Re-approval refreshes the handle.
    ///
    /// # Errors
    /// `Unauthorized` for non-admin callers.
    pub fn approve_venue(
        &mut self,
        caller: &str,
        vault: Arc<dyn VaultVenue>,
    ) -> Result<(), ManagerError> {
        self.gate.ensure_admin(caller)?;
        let venue = vault.address().to_string();
        self.whitelist.approve(&venue, vault);
        info!(%venue, "venue approved");
        self.events.push(LedgerEvent::VenueApproved { venue });
        Ok(())
    }

    /// Removes a venue from the whitelist (admin). The active venue cannot
    /// be removed.
    ///
    /// # Errors
    /// `Unauthorized`, `RemoveActiveVenue`, or `VenueNotApproved`.
    pub fn remove_venue(&mut self, caller: &str, venue: &str) -> Result<(), ManagerError> {
        self.gate.ensure_admin(caller)?;
        self.whitelist
            .remove(venue, self.position.current_venue.as_deref())?;
        info!(%venue, "venue removed");
        self.events.push(LedgerEvent::VenueRemoved {
            venue: venue.to_string(),
        });
        Ok(())
    }

    /// Replaces the fee policy (admin), validating the rate cap.
    ///
    /// # Errors
    /// `Unauthorized` or `FeeRateAboveCap`.
    pub fn set_fee_policy(
        &mut self,
        caller: &str,
        rate_bps: u32,
        min_profit_threshold: Decimal,
        recipient: String,
    ) -> Result<(), ManagerError> {
        self.gate.ensure_admin(caller)?;
        self.fee_policy = FeePolicy::new(rate_bps, min_profit_threshold, recipient)?;
        info!(rate_bps, %min_profit_threshold, "fee policy updated");
        self.events.push(LedgerEvent::FeePolicyUpdated {
            rate_bps,
            min_profit_threshold,
            recipient: self.fee_policy.recipient.clone(),
        });
        Ok(())
    }

    /// Engages the pause switch (admin). While paused only emergency exit
    /// proceeds.
    ///
    /// # Errors
    /// `Unauthorized` for non-admin callers.
    pub fn pause(&mut self, caller: &str) -> Result<(), ManagerError> {
        self.gate.ensure_admin(caller)?;
        self.paused = true;
        self.events.push(LedgerEvent::Paused);
        Ok(())
    }

    /// Releases the pause switch (admin).
    ///
    /// # Errors
    /// `Unauthorized` for non-admin callers.
    pub fn unpause(&mut self, caller: &str) -> Result<(), ManagerError> {
        self.gate.ensure_admin(caller)?;
        self.paused = false;
        self.events.push(LedgerEvent::Unpaused);
        Ok(())
    }

    // ============================================================
    // Read-only queries
    // ============================================================

    /// Current position value in base-asset terms, using the router's
    /// preview path when the venue asset differs.
    ///
    /// # Errors
    /// Propagates collaborator view failures.
    pub async fn position_value(&self) -> Result<Decimal, ManagerError> {
        let Some(venue) = self.position.current_venue.as_deref() else {
            return Ok(Decimal::ZERO);
        };
        let vault = self.vault(venue)?;
        let shares = vault.balance_of(&self.config.self_address).await?;
        if shares <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        let value = vault.convert_to_assets(shares).await?;
        let asset = vault.asset().await?;
        if asset == self.config.base_asset {
            Ok(value)
        } else {
            self.router
                .preview(&asset, &self.config.base_asset, value)
                .await
        }
    }

    /// Fee/net split a full withdrawal would produce right now, based on the
    /// vault's redemption preview rather than the spot share valuation.
    ///
    /// # Errors
    /// Propagates collaborator view failures.
    pub async fn preview_fee(&self) -> Result<FeeSplit, ManagerError> {
        let settlement = self.redeemable_value().await?;
        Ok(fee_split(
            settlement,
            self.position.principal,
            self.fee_policy.rate_bps,
            self.fee_policy.min_profit_threshold,
        ))
    }

    /// Expected base-asset proceeds of redeeming the full share balance
    /// right now, per the vault's own redemption preview.
    async fn redeemable_value(&self) -> Result<Decimal, ManagerError> {
        let Some(venue) = self.position.current_venue.as_deref() else {
            return Ok(Decimal::ZERO);
        };
        let vault = self.vault(venue)?;
        let shares = vault.balance_of(&self.config.self_address).await?;
        if shares <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        let expected = vault.preview_redeem(shares).await?;
        let asset = vault.asset().await?;
        if asset == self.config.base_asset {
            Ok(expected)
        } else {
            self.router
                .preview(&asset, &self.config.base_asset, expected)
                .await
        }
    }

    /// Seconds until the next periodic rebalance is allowed; zero when the
    /// cooldown is elapsed or was never started.
    #[must_use]
    pub fn time_until_next_rebalance(&self) -> i64 {
        self.position
            .cooldown_remaining_secs(Utc::now(), self.config.rebalance_cooldown_secs)
    }

    #[must_use]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    #[must_use]
    pub const fn fee_policy(&self) -> &FeePolicy {
        &self.fee_policy
    }

    #[must_use]
    pub const fn total_fees_collected(&self) -> Decimal {
        self.fee_ledger.total_fees_collected()
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Approved venues in insertion order.
    #[must_use]
    pub fn approved_venues(&self) -> Vec<String> {
        self.whitelist.addresses()
    }

    /// Drains accumulated structured events for off-chain observers.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    // ============================================================
    // Internals
    // ============================================================

    fn ensure_not_paused(&self) -> Result<(), ManagerError> {
        if self.paused {
            Err(ManagerError::Paused)
        } else {
            Ok(())
        }
    }

    fn vault(&self, venue: &str) -> Result<Arc<dyn VaultVenue>, ManagerError> {
        self.whitelist
            .get(venue)
            .ok_or_else(|| ManagerError::VenueNotApproved(venue.to_string()))
    }

    /// Converts a redeemed amount into base-asset terms, swapping only when
    /// the venue asset differs.
    async fn settle_to_base(
        &self,
        vault: &Arc<dyn VaultVenue>,
        amount: Decimal,
    ) -> Result<(Decimal, Option<SwapSummary>), ManagerError> {
        let asset = vault.asset().await?;
        if asset == self.config.base_asset {
            return Ok((amount, None));
        }
        let swap = self
            .router
            .convert(&asset, &self.config.base_asset, amount)
            .await?;
        Ok((swap.amount_out, Some(swap)))
    }

    /// Converts a base-asset amount into the vault's asset if needed and
    /// deposits it atomically. Returns the amount deposited in venue-asset
    /// terms.
    async fn deploy(
        &self,
        vault: &Arc<dyn VaultVenue>,
        base_amount: Decimal,
        swaps: &mut Vec<SwapSummary>,
    ) -> Result<Decimal, ManagerError> {
        let asset = vault.asset().await?;
        let amount = if asset == self.config.base_asset {
            base_amount
        } else {
            let swap = self
                .router
                .convert(&self.config.base_asset, &asset, base_amount)
                .await?;
            let out = swap.amount_out;
            swaps.push(swap);
            out
        };
        self.executor
            .deposit(vault.as_ref(), amount, &self.config.self_address)
            .await?;
        Ok(amount)
    }

    /// Shared redemption path for withdraw and emergency exit: redeem,
    /// settle to base, split via the standard fee policy, debit principal.
    async fn redeem_and_pay_out(
        &mut self,
        venue: &str,
        shares: Decimal,
    ) -> Result<WithdrawReceipt, ManagerError> {
        if !self.position.initialized {
            return Err(ManagerError::NotInitialized);
        }
        if self.position.current_venue.as_deref() != Some(venue) {
            return Err(ManagerError::VenueNotActive(venue.to_string()));
        }
        let vault = self.vault(venue)?;
        let balance = vault.balance_of(&self.config.self_address).await?;
        if balance <= Decimal::ZERO {
            return Err(ManagerError::NothingToRedeem(venue.to_string()));
        }
        // Zero or oversized request means the full balance.
        let shares = if shares <= Decimal::ZERO || shares > balance {
            balance
        } else {
            shares
        };

        let redeemed = self
            .executor
            .redeem(vault.as_ref(), shares, &self.config.self_address)
            .await?;
        let mut swaps = Vec::new();
        let (settlement, swap) = self.settle_to_base(&vault, redeemed).await?;
        swaps.extend(swap);

        let split = fee_split(
            settlement,
            self.position.principal,
            self.fee_policy.rate_bps,
            self.fee_policy.min_profit_threshold,
        );

        self.fee_ledger.record(split.fee);
        self.position.debit_principal(settlement);

        info!(
            %venue,
            %settlement,
            fee = %split.fee,
            fee_recipient = %self.fee_policy.recipient,
            paid_out = %split.net,
            owner = %self.config.owner,
            principal = %self.position.principal,
            "withdrawal settled"
        );
        Ok(WithdrawReceipt {
            venue: venue.to_string(),
            redeemed: settlement,
            fee: split.fee,
            paid_out: split.net,
            principal_remaining: self.position.principal,
            swaps,
            timestamp: Utc::now(),
        })
    }
}
