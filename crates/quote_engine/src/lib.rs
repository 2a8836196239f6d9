//! Last-input-wins redemption quoting over an asynchronous reserve source.
//!
//! The consuming side (a form, a CLI command) calls [`QuoteEngine::request`]
//! whenever the burn amount or the slippage tolerance changes. A snapshot
//! read may still be in flight when a newer request arrives; every request
//! carries a version and a resolved read only commits if no newer request has
//! committed since. Superseding a request is the only cancellation signal;
//! there is no timeout, and an unresolved read simply leaves the quote in its
//! last-known (or initial pending) state.

use std::sync::atomic::{AtomicU64, Ordering};

use dex_math::{redemption_quote, OwedDebt, PoolReserves, RedemptionQuote, RedemptionRequest};
use log::trace;
use tokio::sync::Mutex;

/// Which half-dex a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DexSide {
    /// The pool selling ctez; its proceeds are tez.
    SellCtez,
    /// The pool selling tez; its proceeds are ctez.
    SellTez,
}

impl DexSide {
    /// Storage field name of this half-dex in the contract.
    pub fn storage_field(&self) -> &'static str {
        match self {
            DexSide::SellCtez => "sell_ctez",
            DexSide::SellTez => "sell_tez",
        }
    }

    /// The asset this half-dex holds as self reserves.
    pub fn self_asset(&self) -> &'static str {
        match self {
            DexSide::SellCtez => "ctez",
            DexSide::SellTez => "tez",
        }
    }

    /// The asset this half-dex accumulates as proceeds.
    pub fn proceeds_asset(&self) -> &'static str {
        match self {
            DexSide::SellCtez => "tez",
            DexSide::SellTez => "ctez",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    /// The snapshot source failed; the previous quote, if any, stands.
    #[error("reserve snapshot unavailable: {0}")]
    Source(String),
    #[error(transparent)]
    Math(#[from] dex_math::MathError),
}

/// Pull-based snapshot source for pool reserves and per-owner debt.
///
/// A missing owner record is not an error: it reads as all-zero debt.
#[allow(async_fn_in_trait)]
pub trait ReserveSource {
    async fn pool_reserves(&self, side: DexSide) -> Result<PoolReserves, QuoteError>;
    async fn owed_debt(&self, side: DexSide, owner: &str) -> Result<OwedDebt, QuoteError>;
}

/// The single quote value owned by the consuming form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteState {
    /// No snapshot has resolved yet; the quote is not computable.
    #[default]
    Pending,
    Ready(RedemptionQuote),
}

impl QuoteState {
    pub fn ready(&self) -> Option<RedemptionQuote> {
        match self {
            QuoteState::Ready(quote) => Some(*quote),
            QuoteState::Pending => None,
        }
    }
}

struct Slot {
    version: u64,
    state: QuoteState,
}

/// Versioned recompute-on-input-change driver for one (side, owner) pair.
pub struct QuoteEngine<S> {
    source: S,
    side: DexSide,
    owner: String,
    latest: AtomicU64,
    slot: Mutex<Slot>,
}

impl<S: ReserveSource> QuoteEngine<S> {
    pub fn new(source: S, side: DexSide, owner: impl Into<String>) -> Self {
        Self {
            source,
            side,
            owner: owner.into(),
            latest: AtomicU64::new(0),
            slot: Mutex::new(Slot {
                version: 0,
                state: QuoteState::Pending,
            }),
        }
    }

    pub fn side(&self) -> DexSide {
        self.side
    }

    /// The committed quote, `Pending` until a first request resolves.
    pub async fn quote(&self) -> QuoteState {
        self.slot.lock().await.state
    }

    /// Recompute for a changed burn amount or slippage tolerance.
    ///
    /// Returns the state as committed after this request resolved, which is
    /// the fresher request's output if this one was superseded in flight. A
    /// zero burn commits the all-zero quote without touching the source.
    pub async fn request(&self, request: RedemptionRequest) -> Result<QuoteState, QuoteError> {
        let version = self.latest.fetch_add(1, Ordering::Relaxed) + 1;

        if request.liquidity_burned() == 0 {
            return Ok(self.commit(version, RedemptionQuote::default()).await);
        }

        let reserves = self.source.pool_reserves(self.side).await?;
        let debt = self.source.owed_debt(self.side, &self.owner).await?;
        let quote = redemption_quote(request, reserves, debt)?;
        Ok(self.commit(version, quote).await)
    }

    async fn commit(&self, version: u64, quote: RedemptionQuote) -> QuoteState {
        let mut slot = self.slot.lock().await;
        if version > slot.version {
            slot.version = version;
            slot.state = QuoteState::Ready(quote);
        } else {
            trace!(
                "discarding stale quote v{} (committed v{})",
                version,
                slot.version
            );
        }
        slot.state
    }
}
