//! Public projection: maps the internal `Transaction` to the stable
//! `GetTransactionResponse` JSON shape returned by every action.
use crate::domain::{RefundPayment, Transaction};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountAsset {
    pub amount: Decimal,
    pub asset: String,
}

/// `(null, requestAssetCode)` shape for an amount that hasn't been set yet,
/// preserving the asset hint even when the amount itself is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountExpected {
    pub amount: Option<Decimal>,
    pub asset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundPaymentView {
    pub id: String,
    pub amount: Decimal,
    pub fee: Decimal,
}

impl From<&RefundPayment> for RefundPaymentView {
    fn from(p: &RefundPayment) -> Self {
        Self {
            id: p.id.clone(),
            amount: p.amount,
            fee: p.fee,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundsView {
    pub amount_refunded: Decimal,
    pub amount_fee: Decimal,
    pub payments: Vec<RefundPaymentView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetTransactionResponse {
    pub sep: String,
    pub kind: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_expected: Option<AmountExpected>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_in: Option<AmountAsset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_out: Option<AmountAsset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_fee: Option<AmountAsset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunds: Option<RefundsView>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_received_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Projects a transaction to its public response. `amount_expected` is only
/// populated when the caller supplies the requested-asset hint (the asset a
/// client expects to eventually see in `amount_in`) — the dispatcher has no
/// independent source for it once `amount_in` itself is already set.
pub fn project(txn: &Transaction, amount_expected_asset: Option<&str>) -> GetTransactionResponse {
    let amount_expected = match (&txn.amount_in, amount_expected_asset) {
        (Some(_), _) => None,
        (None, Some(asset)) => Some(AmountExpected {
            amount: None,
            asset: asset.to_string(),
        }),
        (None, None) => None,
    };

    GetTransactionResponse {
        sep: txn.protocol.to_string(),
        kind: format!("{:?}", txn.kind).to_lowercase(),
        status: serde_json::to_value(txn.status)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default(),
        amount_expected,
        amount_in: txn.amount_in.as_ref().map(|a| AmountAsset {
            amount: a.amount,
            asset: a.asset.clone(),
        }),
        amount_out: txn.amount_out.as_ref().map(|a| AmountAsset {
            amount: a.amount,
            asset: a.asset.clone(),
        }),
        amount_fee: txn.amount_fee.as_ref().map(|a| AmountAsset {
            amount: a.amount,
            asset: a.asset.clone(),
        }),
        refunds: txn.refunds.as_ref().map(|r| RefundsView {
            amount_refunded: r.amount_refunded,
            amount_fee: r.amount_fee,
            payments: r.payments.iter().map(RefundPaymentView::from).collect(),
        }),
        updated_at: txn.updated_at,
        transfer_received_at: txn.transfer_received_at,
        message: txn.message.clone(),
    }
}
