//! `notify_refund_sent`: SEP-24 (deposit/withdrawal) and SEP-31. Records a
//! completed refund payment and decides whether the transaction is now
//! fully refunded.
use crate::domain::{AssetService, Kind, Protocol, SepTransactionStatus, Transaction};
use crate::error::DispatchError;
use crate::handlers::base::{ActionHandler, ActionType};
use crate::handlers::requests::ActionRequest;
use crate::refunds::{recalculate, upsert_payment};
use crate::validation::validate_amount_asset;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::str::FromStr;

pub struct NotifyRefundSent;

#[async_trait]
impl ActionHandler for NotifyRefundSent {
    fn action_type(&self) -> ActionType {
        ActionType::NotifyRefundSent
    }

    fn supported_protocols(&self) -> &'static [Protocol] {
        &[Protocol::Sep24, Protocol::Sep31]
    }

    fn supported_statuses(&self, txn: &Transaction) -> Vec<SepTransactionStatus> {
        match (txn.protocol, txn.kind) {
            (Protocol::Sep24, Kind::Deposit) => {
                let mut statuses = vec![SepTransactionStatus::PendingExternal];
                if txn.transfer_received_at.is_some() {
                    statuses.push(SepTransactionStatus::PendingAnchor);
                }
                statuses
            }
            (Protocol::Sep24, Kind::Withdrawal) => {
                let mut statuses = vec![SepTransactionStatus::PendingStellar];
                if txn.transfer_received_at.is_some() {
                    statuses.push(SepTransactionStatus::PendingAnchor);
                }
                statuses
            }
            (Protocol::Sep31, Kind::Receive) => vec![
                SepTransactionStatus::PendingStellar,
                SepTransactionStatus::PendingReceiver,
            ],
            _ => Vec::new(),
        }
    }

    async fn validate(
        &self,
        txn: &Transaction,
        req: &ActionRequest,
        assets: &dyn AssetService,
    ) -> Result<(), DispatchError> {
        let req = req.as_refund_sent()?;

        let refund_required = matches!(
            (txn.protocol, txn.status),
            (Protocol::Sep24, SepTransactionStatus::PendingAnchor)
                | (Protocol::Sep31, SepTransactionStatus::PendingReceiver)
        );
        if refund_required && req.refund.is_none() {
            return Err(DispatchError::InvalidParams("refund is required".to_string()));
        }

        if txn.protocol == Protocol::Sep31 {
            let existing = txn.refunds.as_ref().map(|r| r.payments.len()).unwrap_or(0);
            match txn.status {
                SepTransactionStatus::PendingReceiver if existing != 0 => {
                    return Err(DispatchError::InvalidParams(
                        "multiple refunds are not supported".to_string(),
                    ));
                }
                SepTransactionStatus::PendingStellar if existing == 0 => {
                    return Err(DispatchError::InvalidParams(
                        "Custody payment hasn't been completed yet".to_string(),
                    ));
                }
                _ => {}
            }
        }

        if let Some(refund) = &req.refund {
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
        }

        Ok(())
    }

    async fn next_status(
        &self,
        txn: &Transaction,
        req: &ActionRequest,
        _assets: &dyn AssetService,
    ) -> Result<SepTransactionStatus, DispatchError> {
        let req = req.as_refund_sent()?;
        let amount_in = txn
            .amount_in
            .as_ref()
            .ok_or_else(|| DispatchError::InvalidRequest("transaction has no amount_in".to_string()))?;

        let total = total_refunded(txn, req)?;

        match total.cmp(&amount_in.amount) {
            Ordering::Equal => Ok(SepTransactionStatus::Refunded),
            Ordering::Less => Ok(SepTransactionStatus::PendingAnchor),
            Ordering::Greater => Err(DispatchError::InvalidParams(
                "Refund amount exceeds amount_in".to_string(),
            )),
        }
    }

    async fn mutate(
        &self,
        txn: &mut Transaction,
        req: &ActionRequest,
        assets: &dyn AssetService,
    ) -> Result<(), DispatchError> {
        let req = req.as_refund_sent()?;
        let Some(refund) = &req.refund else {
            return Ok(());
        };

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

/// The protocol/status-dependent `totalRefunded` computation (authoritative
/// per-action rule table). Returns `INVALID_PARAMS` when `refund.id` doesn't
/// match the prior payment it's meant to replace.
fn total_refunded(txn: &Transaction, req: &crate::handlers::requests::NotifyRefundSentRequest) -> Result<Decimal, DispatchError> {
    let payments: &[crate::domain::RefundPayment] =
        txn.refunds.as_ref().map(|r| r.payments.as_slice()).unwrap_or(&[]);

    let refund_amount_fee = |p: &crate::handlers::requests::RefundParam| -> Result<Decimal, DispatchError> {
        let amount = Decimal::from_str(&p.amount)
            .map_err(|_| DispatchError::Internal("re-parse of validated amount failed".to_string()))?;
        let fee = Decimal::from_str(&p.amount_fee)
            .map_err(|_| DispatchError::Internal("re-parse of validated amount failed".to_string()))?;
        Ok(amount + fee)
    };

    match (txn.protocol, payments.is_empty(), txn.status, &req.refund) {
        (Protocol::Sep24, true, _, Some(refund)) => refund_amount_fee(refund),

        (Protocol::Sep24, false, SepTransactionStatus::PendingAnchor, Some(refund)) => {
            let existing = txn
                .refunds
                .as_ref()
                .map(|r| r.amount_refunded)
                .unwrap_or(Decimal::ZERO);
            Ok(existing + refund_amount_fee(refund)?)
        }

        (Protocol::Sep24, false, SepTransactionStatus::PendingExternal, None) => Ok(txn
            .refunds
            .as_ref()
            .map(|r| r.amount_refunded)
            .unwrap_or(Decimal::ZERO)),

        (Protocol::Sep24, false, SepTransactionStatus::PendingExternal, Some(refund)) => {
            if !payments.iter().any(|p| p.id == refund.id) {
                return Err(DispatchError::InvalidParams("Invalid refund id".to_string()));
            }
            let mut total = Decimal::ZERO;
            for p in payments {
                if p.id == refund.id {
                    total += refund_amount_fee(refund)?;
                } else {
                    total += p.amount + p.fee;
                }
            }
            Ok(total)
        }

        (Protocol::Sep31, _, SepTransactionStatus::PendingReceiver, Some(refund)) => {
            refund_amount_fee(refund)
        }

        (Protocol::Sep31, _, SepTransactionStatus::PendingStellar, None) => Ok(txn
            .refunds
            .as_ref()
            .map(|r| r.amount_refunded)
            .unwrap_or(Decimal::ZERO)),

        (Protocol::Sep31, _, SepTransactionStatus::PendingStellar, Some(refund)) => {
            if payments.len() != 1 || payments[0].id != refund.id {
                return Err(DispatchError::InvalidParams("Invalid refund id".to_string()));
            }
            refund_amount_fee(refund)
        }

        _ => Err(DispatchError::InvalidRequest(
            "unsupported refund-sent state".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InMemoryAssetService;
    use crate::handlers::requests::{NotifyRefundSentRequest, RefundParam};
    use std::collections::HashMap;

    fn assets() -> InMemoryAssetService {
        let mut seed = HashMap::new();
        seed.insert("iso4217:USD".to_string(), 2);
        InMemoryAssetService::new(seed)
    }

    fn sep31_pending_stellar_with_payment() -> Transaction {
        let mut txn = Transaction::new(
            "T",
            Protocol::Sep31,
            Kind::Receive,
            SepTransactionStatus::PendingStellar,
        )
        .with_amount_in(Decimal::from_str("10").unwrap(), "iso4217:USD");
        txn.refunds = Some(crate::domain::Refunds {
            payments: vec![crate::domain::RefundPayment {
                id: "r".to_string(),
                amount: Decimal::from_str("9").unwrap(),
                fee: Decimal::from_str("1").unwrap(),
            }],
            amount_refunded: Decimal::from_str("10").unwrap(),
            amount_fee: Decimal::from_str("1").unwrap(),
        });
        txn
    }

    #[tokio::test]
    async fn sep31_refund_sent_completes_transaction() {
        let handler = NotifyRefundSent;
        let assets = assets();
        let mut txn = sep31_pending_stellar_with_payment();
        let req = ActionRequest::NotifyRefundSent(NotifyRefundSentRequest {
            transaction_id: "T".to_string(),
            refund: Some(RefundParam {
                id: "r".to_string(),
                amount: "9".to_string(),
                amount_fee: "1".to_string(),
            }),
        });

        handler.validate(&txn, &req, &assets).await.unwrap();
        let next = handler.next_status(&txn, &req, &assets).await.unwrap();
        handler.mutate(&mut txn, &req, &assets).await.unwrap();
        txn.status = next;

        assert_eq!(txn.status, SepTransactionStatus::Refunded);
    }

    #[tokio::test]
    async fn sep31_pending_stellar_rejects_mismatched_refund_id() {
        let handler = NotifyRefundSent;
        let assets = assets();
        let txn = sep31_pending_stellar_with_payment();
        let req = ActionRequest::NotifyRefundSent(NotifyRefundSentRequest {
            transaction_id: "T".to_string(),
            refund: Some(RefundParam {
                id: "wrong".to_string(),
                amount: "9".to_string(),
                amount_fee: "1".to_string(),
            }),
        });

        handler.validate(&txn, &req, &assets).await.unwrap();
        let err = handler.next_status(&txn, &req, &assets).await.unwrap_err();
        assert_eq!(err, DispatchError::InvalidParams("Invalid refund id".to_string()));
    }

    #[tokio::test]
    async fn sep31_pending_receiver_rejects_second_refund() {
        let handler = NotifyRefundSent;
        let mut txn = sep31_pending_stellar_with_payment();
        txn.status = SepTransactionStatus::PendingReceiver;
        let assets = assets();
        let req = ActionRequest::NotifyRefundSent(NotifyRefundSentRequest {
            transaction_id: "T".to_string(),
            refund: Some(RefundParam {
                id: "second".to_string(),
                amount: "1".to_string(),
                amount_fee: "0".to_string(),
            }),
        });

        let err = handler.validate(&txn, &req, &assets).await.unwrap_err();
        assert_eq!(
            err,
            DispatchError::InvalidParams("multiple refunds are not supported".to_string())
        );
    }

    #[tokio::test]
    async fn sep31_pending_stellar_without_prior_payment_is_rejected() {
        let handler = NotifyRefundSent;
        let mut txn = Transaction::new(
            "T",
            Protocol::Sep31,
            Kind::Receive,
            SepTransactionStatus::PendingStellar,
        )
        .with_amount_in(Decimal::from_str("10").unwrap(), "iso4217:USD");
        txn.refunds = None;
        let assets = assets();
        let req = ActionRequest::NotifyRefundSent(NotifyRefundSentRequest {
            transaction_id: "T".to_string(),
            refund: None,
        });

        let err = handler.validate(&txn, &req, &assets).await.unwrap_err();
        assert_eq!(
            err,
            DispatchError::InvalidParams("Custody payment hasn't been completed yet".to_string())
        );
    }

    #[test]
    fn sep24_withdrawal_supported_statuses() {
        let handler = NotifyRefundSent;
        let txn = Transaction::new(
            "T",
            Protocol::Sep24,
            Kind::Withdrawal,
            SepTransactionStatus::PendingStellar,
        );
        assert!(handler
            .supported_statuses(&txn)
            .contains(&SepTransactionStatus::PendingStellar));
        assert!(!handler
            .supported_statuses(&txn)
            .contains(&SepTransactionStatus::PendingAnchor));
    }
}
