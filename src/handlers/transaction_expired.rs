//! `notify_transaction_expired`: applicable to any non-terminal transaction,
//! protocol-independent.
use crate::domain::{AssetService, Protocol, SepTransactionStatus, Transaction};
use crate::error::DispatchError;
use crate::handlers::base::{ActionHandler, ActionType};
use crate::handlers::requests::ActionRequest;
use async_trait::async_trait;

pub struct NotifyTransactionExpired;

const NON_TERMINAL_STATUSES: &[SepTransactionStatus] = &[
    SepTransactionStatus::Incomplete,
    SepTransactionStatus::PendingUserTransferStart,
    SepTransactionStatus::PendingUserTransferComplete,
    SepTransactionStatus::PendingExternal,
    SepTransactionStatus::PendingAnchor,
    SepTransactionStatus::PendingStellar,
    SepTransactionStatus::PendingReceiver,
    SepTransactionStatus::PendingCustomerInfoUpdate,
    SepTransactionStatus::PendingTrust,
];

#[async_trait]
impl ActionHandler for NotifyTransactionExpired {
    fn action_type(&self) -> ActionType {
        ActionType::NotifyTransactionExpired
    }

    fn supported_protocols(&self) -> &'static [Protocol] {
        &[Protocol::Sep24, Protocol::Sep31]
    }

    fn supported_statuses(&self, _txn: &Transaction) -> Vec<SepTransactionStatus> {
        NON_TERMINAL_STATUSES.to_vec()
    }

    async fn validate(
        &self,
        _txn: &Transaction,
        req: &ActionRequest,
        _assets: &dyn AssetService,
    ) -> Result<(), DispatchError> {
        let req = req.as_transaction_expired()?;
        if req.message.trim().is_empty() {
            return Err(DispatchError::InvalidParams("message is required".to_string()));
        }
        Ok(())
    }

    async fn next_status(
        &self,
        _txn: &Transaction,
        _req: &ActionRequest,
        _assets: &dyn AssetService,
    ) -> Result<SepTransactionStatus, DispatchError> {
        Ok(SepTransactionStatus::Expired)
    }

    async fn mutate(
        &self,
        txn: &mut Transaction,
        req: &ActionRequest,
        _assets: &dyn AssetService,
    ) -> Result<(), DispatchError> {
        let req = req.as_transaction_expired()?;
        txn.message = Some(req.message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InMemoryAssetService, Kind};
    use crate::handlers::requests::NotifyTransactionExpiredRequest;

    fn assets() -> InMemoryAssetService {
        InMemoryAssetService::new(Default::default())
    }

    #[tokio::test]
    async fn expires_and_sets_message() {
        let handler = NotifyTransactionExpired;
        let assets = assets();
        let mut txn = Transaction::new(
            "T",
            Protocol::Sep24,
            Kind::Deposit,
            SepTransactionStatus::PendingAnchor,
        );
        let req = ActionRequest::NotifyTransactionExpired(NotifyTransactionExpiredRequest {
            transaction_id: "T".to_string(),
            message: "timed out".to_string(),
        });

        handler.validate(&txn, &req, &assets).await.unwrap();
        let next = handler.next_status(&txn, &req, &assets).await.unwrap();
        handler.mutate(&mut txn, &req, &assets).await.unwrap();
        txn.status = next;

        assert_eq!(txn.status, SepTransactionStatus::Expired);
        assert_eq!(txn.message, Some("timed out".to_string()));
    }

    #[tokio::test]
    async fn rejects_empty_message() {
        let handler = NotifyTransactionExpired;
        let assets = assets();
        let txn = Transaction::new(
            "T",
            Protocol::Sep24,
            Kind::Deposit,
            SepTransactionStatus::PendingAnchor,
        );
        let req = ActionRequest::NotifyTransactionExpired(NotifyTransactionExpiredRequest {
            transaction_id: "T".to_string(),
            message: "".to_string(),
        });

        let err = handler.validate(&txn, &req, &assets).await.unwrap_err();
        assert_eq!(err, DispatchError::InvalidParams("message is required".to_string()));
    }

    #[test]
    fn terminal_statuses_are_excluded() {
        let handler = NotifyTransactionExpired;
        let txn = Transaction::new(
            "T",
            Protocol::Sep24,
            Kind::Deposit,
            SepTransactionStatus::Completed,
        );
        assert!(!handler.supported_statuses(&txn).contains(&SepTransactionStatus::Completed));
    }
}
