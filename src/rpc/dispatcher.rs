//! Wires the transaction repository, asset catalog, and handler registry
//! together behind a single `dispatch(method, params)` entry point.
use crate::domain::AssetService;
use crate::error::DispatchError;
use crate::handlers::requests::{
    ActionRequest, NotifyOnchainFundsReceivedRequest, NotifyRefundInitiatedRequest,
    NotifyRefundSentRequest, NotifyTransactionExpiredRequest,
};
use crate::handlers::{self, ActionHandler};
use crate::projection::GetTransactionResponse;
use crate::repository::RepositoryFacade;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub struct Dispatcher {
    repository: RepositoryFacade,
    assets: Arc<dyn AssetService>,
    handlers: HashMap<&'static str, Arc<dyn ActionHandler>>,
}

impl Dispatcher {
    pub fn new(repository: RepositoryFacade, assets: Arc<dyn AssetService>) -> Self {
        Self {
            repository,
            assets,
            handlers: handlers::registry(),
        }
    }

    /// Deserializes `params` against the shape `method` expects, then runs
    /// the full handler pipeline. An unknown method is an `INVALID_REQUEST`
    /// error rather than a panic — operators can send arbitrary strings.
    pub async fn dispatch(&self, method: &str, params: Value) -> Result<GetTransactionResponse, DispatchError> {
        let handler = self
            .handlers
            .get(method)
            .ok_or_else(|| DispatchError::InvalidRequest(format!("unknown method '{method}'")))?;

        let request = decode_request(method, params)?;
        handlers::handle(handler.as_ref(), &self.repository, self.assets.as_ref(), request).await
    }
}

fn decode_request(method: &str, params: Value) -> Result<ActionRequest, DispatchError> {
    let map_err = |e: serde_json::Error| DispatchError::InvalidParams(e.to_string());
    match method {
        "notify_onchain_funds_received" => {
            let req: NotifyOnchainFundsReceivedRequest =
                serde_json::from_value(params).map_err(map_err)?;
            Ok(ActionRequest::NotifyOnchainFundsReceived(req))
        }
        "notify_refund_initiated" => {
            let req: NotifyRefundInitiatedRequest = serde_json::from_value(params).map_err(map_err)?;
            Ok(ActionRequest::NotifyRefundInitiated(req))
        }
        "notify_refund_sent" => {
            let req: NotifyRefundSentRequest = serde_json::from_value(params).map_err(map_err)?;
            Ok(ActionRequest::NotifyRefundSent(req))
        }
        "notify_transaction_expired" => {
            let req: NotifyTransactionExpiredRequest = serde_json::from_value(params).map_err(map_err)?;
            Ok(ActionRequest::NotifyTransactionExpired(req))
        }
        other => Err(DispatchError::InvalidRequest(format!("unknown method '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InMemoryAssetService, Kind, Protocol, SepTransactionStatus, Transaction};
    use crate::repository::InMemoryStore;
    use serde_json::json;
    use std::collections::HashMap as StdHashMap;

    async fn dispatcher_with_txn(txn: Transaction) -> Dispatcher {
        let store24 = Arc::new(InMemoryStore::new());
        let store31 = Arc::new(InMemoryStore::new());
        store24.seed(txn).await;
        let mut seed = StdHashMap::new();
        seed.insert("stellar:USDC:GA".to_string(), 7);
        seed.insert("iso4217:USD".to_string(), 2);
        let assets = Arc::new(InMemoryAssetService::new(seed));
        Dispatcher::new(RepositoryFacade::new(store24, store31), assets)
    }

    #[tokio::test]
    async fn dispatches_known_method() {
        let txn = Transaction::new(
            "T",
            Protocol::Sep24,
            Kind::Deposit,
            SepTransactionStatus::PendingUserTransferStart,
        );
        let dispatcher = dispatcher_with_txn(txn).await;

        let resp = dispatcher
            .dispatch(
                "notify_onchain_funds_received",
                json!({"transaction_id": "T", "stellar_transaction_id": "abc"}),
            )
            .await
            .unwrap();

        assert_eq!(resp.status, "pending_anchor");
    }

    #[tokio::test]
    async fn rejects_unknown_method() {
        let txn = Transaction::new(
            "T",
            Protocol::Sep24,
            Kind::Deposit,
            SepTransactionStatus::PendingUserTransferStart,
        );
        let dispatcher = dispatcher_with_txn(txn).await;

        let err = dispatcher
            .dispatch("notify_something_else", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidRequest(_)));
    }
}
