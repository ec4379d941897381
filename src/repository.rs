//! Transaction repository facade and an in-memory reference store
//! implementing the optimistic-concurrency option (CAS on `updated_at`).
use crate::domain::{Protocol, Transaction};
use crate::error::DispatchError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A single SEP-24 or SEP-31 transaction store, keyed by opaque id.
///
/// `save` must set `updated_at` to the current instant before persisting,
/// and must be the last side effect of a handler invocation.
/// `expected_updated_at` implements optimistic concurrency: a mismatch
/// means another call already saved over the row the caller read, and is
/// reported as `DispatchError::Conflict`.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn lookup(&self, id: &str) -> Result<Option<Transaction>, DispatchError>;

    async fn save(
        &self,
        txn: Transaction,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<Transaction, DispatchError>;
}

/// In-memory `TransactionStore`, one per protocol, treating
/// `TransactionStore24`/`TransactionStore31` as opaque key/value-by-id
/// stores with atomic save.
pub struct InMemoryStore {
    rows: RwLock<HashMap<String, Transaction>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Test/seed helper — not part of the store's RPC-facing surface.
    pub async fn seed(&self, txn: Transaction) {
        self.rows.write().await.insert(txn.id.clone(), txn);
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionStore for InMemoryStore {
    async fn lookup(&self, id: &str) -> Result<Option<Transaction>, DispatchError> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn save(
        &self,
        mut txn: Transaction,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<Transaction, DispatchError> {
        let mut rows = self.rows.write().await;
        match rows.get(&txn.id) {
            Some(current) if current.updated_at != expected_updated_at => {
                return Err(DispatchError::Conflict(txn.id.clone()));
            }
            None => return Err(DispatchError::NotFound(txn.id.clone())),
            _ => {}
        }
        txn.updated_at = Utc::now();
        rows.insert(txn.id.clone(), txn.clone());
        Ok(txn)
    }
}

/// Consults both the SEP-24 and SEP-31 stores; whichever yields a row wins.
/// They are disjoint by construction, so ordering only matters when both
/// happen to hold the same id, in which case 24 wins.
pub struct RepositoryFacade {
    pub store24: Arc<dyn TransactionStore>,
    pub store31: Arc<dyn TransactionStore>,
}

impl RepositoryFacade {
    pub fn new(store24: Arc<dyn TransactionStore>, store31: Arc<dyn TransactionStore>) -> Self {
        Self { store24, store31 }
    }

    pub async fn lookup(&self, id: &str) -> Result<Transaction, DispatchError> {
        if let Some(txn) = self.store24.lookup(id).await? {
            return Ok(txn);
        }
        if let Some(txn) = self.store31.lookup(id).await? {
            return Ok(txn);
        }
        Err(DispatchError::NotFound(id.to_string()))
    }

    /// Routes the save to the store matching the transaction's protocol.
    pub async fn save(
        &self,
        txn: Transaction,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<Transaction, DispatchError> {
        match txn.protocol {
            Protocol::Sep24 => self.store24.save(txn, expected_updated_at).await,
            Protocol::Sep31 => self.store31.save(txn, expected_updated_at).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Kind, SepTransactionStatus};

    fn txn(id: &str) -> Transaction {
        Transaction::new(id, Protocol::Sep24, Kind::Deposit, SepTransactionStatus::Incomplete)
    }

    #[tokio::test]
    async fn facade_prefers_24_then_31() {
        let store24 = Arc::new(InMemoryStore::new());
        let store31 = Arc::new(InMemoryStore::new());
        store31.seed(txn("only-in-31")).await;
        let facade = RepositoryFacade::new(store24.clone(), store31.clone());

        assert!(facade.lookup("only-in-31").await.is_ok());
        assert!(matches!(
            facade.lookup("missing").await,
            Err(DispatchError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn save_conflicts_on_stale_version() {
        let store = InMemoryStore::new();
        let t = txn("t1");
        let created_at = t.updated_at;
        store.seed(t.clone()).await;

        // Someone else saves first, advancing updated_at.
        store.save(t.clone(), created_at).await.unwrap();

        // Our stale expected_updated_at now conflicts.
        let err = store.save(t, created_at).await.unwrap_err();
        assert!(matches!(err, DispatchError::Conflict(_)));
    }

    #[tokio::test]
    async fn save_advances_updated_at() {
        let store = InMemoryStore::new();
        let t = txn("t1");
        let created_at = t.updated_at;
        store.seed(t.clone()).await;

        let saved = store.save(t, created_at).await.unwrap();
        assert!(saved.updated_at >= created_at);
    }
}
