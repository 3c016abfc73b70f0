//! Compounding orchestrator
//!
//! One cycle: read claimable rewards, claim when worth it, swap half of the
//! base balance for the quote asset, add both as liquidity in the pool's
//! proportion, and stake the resulting LP tokens. Nothing is carried between
//! cycles; every decision is made from balances re-read on-chain, so a cycle
//! that fails halfway is repaired by the next one observing where funds are.

use crate::balance::{AccountBalance, BalanceSource};
use crate::config::{CompoundingConfig, TimingConfig};
use crate::contracts::{LiquidityRouter, RewardGauge};
use crate::tron::TxId;
use crate::{Error, Result};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// What a finished cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Base balance too small to be worth swapping; nothing else was sent
    BelowThreshold {
        claimed: Option<TxId>,
        base_balance: Decimal,
    },
    /// The full sequence ran. A `None` step was skipped or not sent.
    Compounded {
        claimed: Option<TxId>,
        swapped: Option<TxId>,
        liquidity_added: Option<TxId>,
        staked: Option<TxId>,
    },
}

/// Amounts of each side to provide as liquidity.
///
/// `price` is quote per base. The side held in short supply relative to the
/// pool ratio is contributed in full and the other side is scaled to match.
pub fn allocate_liquidity(
    base_held: Decimal,
    quote_held: Decimal,
    price: f64,
) -> Result<(Decimal, Decimal)> {
    let price = Decimal::try_from(price)
        .map_err(|e| Error::Math(format!("price {}: {}", price, e)))?;
    if price <= Decimal::ZERO {
        return Err(Error::Math(format!("price must be positive, got {}", price)));
    }

    let overflow = || Error::Math(format!("allocation overflow at price {}", price));
    let base_value = base_held.checked_mul(price).ok_or_else(overflow)?;

    if quote_held < base_value {
        let base = quote_held.checked_div(price).ok_or_else(overflow)?;
        Ok((base.min(base_held), quote_held))
    } else {
        Ok((base_held, base_value))
    }
}

/// Drives the claim -> swap -> add liquidity -> stake cycle
pub struct AutoCompounder {
    gauge: Arc<dyn RewardGauge>,
    router: Arc<dyn LiquidityRouter>,
    balances: Arc<dyn BalanceSource>,
    claim_threshold: Decimal,
    timing: TimingConfig,
    cancel: CancellationToken,
}

impl AutoCompounder {
    pub fn new(
        gauge: Arc<dyn RewardGauge>,
        router: Arc<dyn LiquidityRouter>,
        balances: Arc<dyn BalanceSource>,
        config: &CompoundingConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            gauge,
            router,
            balances,
            claim_threshold: config.claim_threshold,
            timing: config.timing,
            cancel,
        }
    }

    /// Run cycles until cancelled.
    ///
    /// A failed cycle is logged and followed by the usual pause; only
    /// cancellation ends the loop.
    pub async fn run(&self) -> Result<()> {
        info!(
            claim_threshold = %self.claim_threshold,
            cycle_interval_secs = self.timing.cycle_interval_secs,
            "Starting compounder"
        );

        loop {
            match self.run_cycle().await {
                Ok(outcome) => info!(?outcome, "Cycle finished"),
                Err(Error::Cancelled) => break,
                Err(e) => error!(error = %e, "Cycle aborted"),
            }

            if self.pause(self.timing.cycle_interval()).await.is_err() {
                break;
            }
        }

        info!("Compounder stopped");
        Ok(())
    }

    /// One pass of the compounding sequence
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        self.checkpoint()?;
        let claimable = self.gauge.claimable_rewards().await?;
        info!(claimable = %claimable, threshold = %self.claim_threshold, "Claimable rewards");

        let claimed = if claimable < self.claim_threshold {
            info!("Claimable below threshold, not claiming this cycle");
            None
        } else {
            self.checkpoint()?;
            // A failed claim still leaves earlier balances worth compounding
            let claimed = self.gauge.claim_rewards().await.ok();
            if claimed.is_some() {
                self.pause(self.timing.settlement_delay()).await?;
            }
            claimed
        };

        let balance = self.snapshot().await?;
        if balance.base < self.claim_threshold {
            info!(
                base = %balance.base,
                threshold = %self.claim_threshold,
                "Base balance below threshold, skipping cycle"
            );
            return Ok(CycleOutcome::BelowThreshold {
                claimed,
                base_balance: balance.base,
            });
        }

        self.checkpoint()?;
        let swap_amount = balance.base / Decimal::TWO;
        let swapped = self.router.swap_base_for_quote(swap_amount).await.ok();
        if swapped.is_some() {
            self.pause(self.timing.settlement_delay()).await?;
        }

        self.checkpoint()?;
        let reserves = self.router.reserves().await?;
        let price = reserves.price()?;
        info!(
            base_reserve = %reserves.base,
            quote_reserve = %reserves.quote,
            price,
            "Pool price"
        );

        let balance = self.snapshot().await?;
        let (base_amount, quote_amount) = allocate_liquidity(balance.base, balance.quote, price)?;

        let liquidity_added = if base_amount.is_zero() || quote_amount.is_zero() {
            warn!(
                base = %base_amount,
                quote = %quote_amount,
                "Nothing to pair, not adding liquidity"
            );
            None
        } else {
            self.checkpoint()?;
            let txid = self
                .router
                .add_liquidity(base_amount, quote_amount)
                .await
                .ok();
            if txid.is_some() {
                self.pause(self.timing.settlement_delay()).await?;
            }
            txid
        };

        let balance = self.snapshot().await?;
        let staked = if balance.lp > Decimal::ZERO {
            self.checkpoint()?;
            self.gauge.deposit(balance.lp).await.ok()
        } else {
            info!("No LP tokens to stake");
            None
        };

        Ok(CycleOutcome::Compounded {
            claimed,
            swapped,
            liquidity_added,
            staked,
        })
    }

    async fn snapshot(&self) -> Result<AccountBalance> {
        self.checkpoint()?;
        self.balances.snapshot().await
    }

    fn checkpoint(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    async fn pause(&self, duration: Duration) -> Result<()> {
        if duration.is_zero() {
            return self.checkpoint();
        }
        tokio::select! {
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}
