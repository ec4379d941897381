use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Stellar ledger observation oracle: used only to fetch confirmation time
/// for a given on-chain transaction hash. The dispatcher does not call this
/// automatically — `notify_onchain_funds_received` falls back to
/// `Utc::now()`, and callers that have already resolved a real
/// confirmation time can bypass it entirely by populating the request
/// themselves.
#[async_trait]
pub trait Horizon: Send + Sync {
    async fn confirmation_time(&self, stellar_transaction_id: &str) -> Option<DateTime<Utc>>;
}

/// Reference stub: always reports "unknown", forcing the `now()` fallback.
/// A real implementation would query Horizon's `/transactions/{hash}`.
pub struct StubHorizon;

#[async_trait]
impl Horizon for StubHorizon {
    async fn confirmation_time(&self, _stellar_transaction_id: &str) -> Option<DateTime<Utc>> {
        None
    }
}
