//! `notify_refund_initiated`: SEP-24 deposit only, once funds have been
//! observed on-chain. Records (or re-records) a single pending refund
//! payment and checks it doesn't overrun the deposited amount.
use crate::domain::{AssetService, Kind, Protocol, Refunds, SepTransactionStatus, Transaction};
use crate::error::DispatchError;
use crate::handlers::base::{ActionHandler, ActionType};
use crate::handlers::requests::ActionRequest;
use crate::refunds::{recalculate, upsert_payment};
use crate::validation::validate_amount_asset;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::str::FromStr;

pub struct NotifyRefundInitiated;

#[async_trait]
impl ActionHandler for NotifyRefundInitiated {
    fn action_type(&self) -> ActionType {
        ActionType::NotifyRefundInitiated
    }

    fn supported_protocols(&self) -> &'static [Protocol] {
        &[Protocol::Sep24]
    }

    fn supported_statuses(&self, txn: &Transaction) -> Vec<SepTransactionStatus> {
        if txn.kind != Kind::Deposit || txn.transfer_received_at.is_none() {
            return Vec::new();
        }
        vec![SepTransactionStatus::PendingAnchor]
    }

    async fn validate(
        &self,
        txn: &Transaction,
        req: &ActionRequest,
        assets: &dyn AssetService,
    ) -> Result<(), DispatchError> {
        let req = req.as_refund_initiated()?;
        let refund = req
            .refund
            .as_ref()
            .ok_or_else(|| DispatchError::InvalidParams("refund is required".to_string()))?;

        let amount_in = txn.amount_in.as_ref().ok_or_else(|| {
            DispatchError::InvalidRequest("transaction has no amount_in".to_string())
        })?;

        validate_amount_asset("refund.amount", &refund.amount, &amount_in.asset, assets, false)
            .await?;
        validate_amount_asset(
            "refund.amount_fee",
            &refund.amount_fee,
            &amount_in.asset,
            assets,
            true,
        )
        .await?;

        let new_amount = Decimal::from_str(&refund.amount)
            .map_err(|_| DispatchError::Internal("re-parse of validated amount failed".to_string()))?;
        let new_fee = Decimal::from_str(&refund.amount_fee)
            .map_err(|_| DispatchError::Internal("re-parse of validated amount failed".to_string()))?;

        let projected_total = projected_total_excluding(txn, &refund.id) + new_amount + new_fee;
        if projected_total > amount_in.amount {
            return Err(DispatchError::InvalidParams(
                "Refund amount exceeds amount_in".to_string(),
            ));
        }

        Ok(())
    }

    async fn next_status(
        &self,
        _txn: &Transaction,
        _req: &ActionRequest,
        _assets: &dyn AssetService,
    ) -> Result<SepTransactionStatus, DispatchError> {
        Ok(SepTransactionStatus::PendingExternal)
    }

    async fn mutate(
        &self,
        txn: &mut Transaction,
        req: &ActionRequest,
        assets: &dyn AssetService,
    ) -> Result<(), DispatchError> {
        let req = req.as_refund_initiated()?;
        let refund = req
            .refund
            .as_ref()
            .ok_or_else(|| DispatchError::InvalidParams("refund is required".to_string()))?;

        let amount = Decimal::from_str(&refund.amount)
            .map_err(|_| DispatchError::Internal("re-parse of validated amount failed".to_string()))?;
        let fee = Decimal::from_str(&refund.amount_fee)
            .map_err(|_| DispatchError::Internal("re-parse of validated amount failed".to_string()))?;

        let amount_in = txn.amount_in.as_ref().ok_or_else(|| {
            DispatchError::InvalidRequest("transaction has no amount_in".to_string())
        })?;
        let precision = assets.precision(&amount_in.asset).await.ok_or_else(|| {
            DispatchError::Internal(format!("unknown asset '{}'", amount_in.asset))
        })?;

        let current = txn.refunds.clone().unwrap_or_default();
        let mut updated = upsert_payment(
            &current,
            crate::domain::RefundPayment {
                id: refund.id.clone(),
                amount,
                fee,
            },
        );
        recalculate(&mut updated, precision);
        txn.refunds = Some(updated);

        Ok(())
    }
}

/// Sum of `amount + fee` across existing payments, with the payment
/// matching `id` (if any) excluded — the caller adds its own contribution
/// back in, so a re-initiation doesn't double-count itself.
fn projected_total_excluding(txn: &Transaction, id: &str) -> Decimal {
    match &txn.refunds {
        None => Decimal::ZERO,
        Some(Refunds { payments, .. }) => payments
            .iter()
            .filter(|p| p.id != id)
            .map(|p| p.amount + p.fee)
            .sum(),
    }
}
