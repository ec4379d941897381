//! `notify_onchain_funds_received`: SEP-24 deposit only. Records the
//! on-chain transaction hash and, on first observation, the instant the
//! transfer was credited.
use crate::domain::{AssetService, Kind, Protocol, SepTransactionStatus, Transaction};
use crate::error::DispatchError;
use crate::handlers::base::{ActionHandler, ActionType};
use crate::handlers::requests::ActionRequest;
use crate::validation::validate_amount_asset;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::str::FromStr;

pub struct NotifyOnchainFundsReceived;

#[async_trait]
impl ActionHandler for NotifyOnchainFundsReceived {
    fn action_type(&self) -> ActionType {
        ActionType::NotifyOnchainFundsReceived
    }

    fn supported_protocols(&self) -> &'static [Protocol] {
        &[Protocol::Sep24]
    }

    fn supported_statuses(&self, txn: &Transaction) -> Vec<SepTransactionStatus> {
        if txn.kind != Kind::Deposit {
            return Vec::new();
        }
        let mut statuses = vec![SepTransactionStatus::PendingUserTransferStart];
        if txn.transfer_received_at.is_none() {
            statuses.push(SepTransactionStatus::PendingExternal);
        }
        statuses
    }

    async fn validate(
        &self,
        txn: &Transaction,
        req: &ActionRequest,
        assets: &dyn AssetService,
    ) -> Result<(), DispatchError> {
        let req = req.as_onchain_funds_received()?;

        if req.stellar_transaction_id.is_none() && txn.stellar_transaction_id.is_none() {
            return Err(DispatchError::InvalidParams(
                "stellar_transaction_id is required".to_string(),
            ));
        }

        let triple = (&req.amount_in, &req.amount_out, &req.amount_fee);
        match triple {
            (None, None, None) => {}
            (Some(_), Some(_), Some(_)) => {}
            _ => {
                return Err(DispatchError::InvalidParams(
                    "All or none of the amount_in, amount_out, and amount_fee should be set"
                        .to_string(),
                ))
            }
        }

        if let Some(amount_in) = &req.amount_in {
            validate_amount_asset("amount_in", &amount_in.amount, &amount_in.asset, assets, false)
                .await?;
        }
        if let Some(amount_out) = &req.amount_out {
            validate_amount_asset("amount_out", &amount_out.amount, &amount_out.asset, assets, false)
                .await?;
        }
        if let Some(amount_fee) = &req.amount_fee {
            validate_amount_asset("amount_fee", &amount_fee.amount, &amount_fee.asset, assets, true)
                .await?;
        }

        Ok(())
    }

    async fn next_status(
        &self,
        _txn: &Transaction,
        _req: &ActionRequest,
        _assets: &dyn AssetService,
    ) -> Result<SepTransactionStatus, DispatchError> {
        Ok(SepTransactionStatus::PendingAnchor)
    }

    async fn mutate(
        &self,
        txn: &mut Transaction,
        req: &ActionRequest,
        _assets: &dyn AssetService,
    ) -> Result<(), DispatchError> {
        let req = req.as_onchain_funds_received()?;

        if let Some(id) = &req.stellar_transaction_id {
            txn.stellar_transaction_id = Some(id.clone());
        }
        if txn.transfer_received_at.is_none() {
            txn.transfer_received_at = Some(Utc::now());
        }

        if let (Some(amount_in), Some(amount_out), Some(amount_fee)) =
            (&req.amount_in, &req.amount_out, &req.amount_fee)
        {
            txn.amount_in = Some(parse_amount_field(amount_in)?);
            txn.amount_out = Some(parse_amount_field(amount_out)?);
            txn.amount_fee = Some(parse_amount_field(amount_fee)?);
        }

        Ok(())
    }
}

/// `validate` already confirmed the amount parses and fits the asset's
/// precision; re-parsing here just converts the already-checked string.
fn parse_amount_field(
    param: &crate::handlers::requests::AmountParam,
) -> Result<crate::domain::transaction::AmountField, DispatchError> {
    let amount = Decimal::from_str(&param.amount)
        .map_err(|_| DispatchError::Internal("re-parse of validated amount failed".to_string()))?;
    Ok(crate::domain::transaction::AmountField {
        amount,
        asset: param.asset.clone(),
    })
}
