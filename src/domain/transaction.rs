use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// SEP family a transaction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    #[serde(rename = "24")]
    Sep24,
    #[serde(rename = "31")]
    Sep31,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Sep24 => write!(f, "24"),
            Protocol::Sep31 => write!(f, "31"),
        }
    }
}

/// Transfer direction. `{deposit, withdrawal}` iff protocol is 24,
/// `{receive}` iff protocol is 31 — enforced by `Transaction::new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Deposit,
    Withdrawal,
    Receive,
}

impl Kind {
    pub fn protocol(&self) -> Protocol {
        match self {
            Kind::Deposit | Kind::Withdrawal => Protocol::Sep24,
            Kind::Receive => Protocol::Sep31,
        }
    }
}

/// The closed set of SEP transaction statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SepTransactionStatus {
    Incomplete,
    PendingUserTransferStart,
    PendingUserTransferComplete,
    PendingExternal,
    PendingAnchor,
    PendingStellar,
    PendingReceiver,
    PendingCustomerInfoUpdate,
    PendingTrust,
    Completed,
    Refunded,
    Expired,
    Error,
}

impl SepTransactionStatus {
    /// No further transitions are permitted from a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SepTransactionStatus::Completed
                | SepTransactionStatus::Refunded
                | SepTransactionStatus::Expired
                | SepTransactionStatus::Error
        )
    }
}

/// A single refund payment within a `Refunds` aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundPayment {
    pub id: String,
    pub amount: Decimal,
    pub fee: Decimal,
}

/// Refund aggregate attached to a transaction.
///
/// `amount_refunded` and `amount_fee` are derived from `payments` and must be
/// recomputed via [`recalculate`](crate::refunds::recalculate) after every
/// mutation — this type does not recompute them itself to avoid silently
/// stale totals when a caller edits `payments` directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Refunds {
    pub payments: Vec<RefundPayment>,
    pub amount_refunded: Decimal,
    pub amount_fee: Decimal,
}

/// The outgoing amount triple: `amount_out`/`amount_fee` set atomically as a
/// triple alongside `amount_in`, or not set at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountField {
    pub amount: Decimal,
    pub asset: String,
}

/// A SEP-24/SEP-31 transaction driven through its lifecycle by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub protocol: Protocol,
    pub kind: Kind,
    pub status: SepTransactionStatus,

    pub amount_in: Option<AmountField>,
    pub amount_out: Option<AmountField>,
    pub amount_fee: Option<AmountField>,

    pub stellar_transaction_id: Option<String>,
    pub transfer_received_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub message: Option<String>,
    pub refunds: Option<Refunds>,
}

impl Transaction {
    /// Constructs a new transaction. Panics if `kind` doesn't match
    /// `protocol` — this invariant is immutable and checked at every
    /// construction site, never at the RPC boundary.
    pub fn new(id: impl Into<String>, protocol: Protocol, kind: Kind, status: SepTransactionStatus) -> Self {
        assert_eq!(
            kind.protocol(),
            protocol,
            "kind {kind:?} is not valid for protocol {protocol:?}"
        );
        Self {
            id: id.into(),
            protocol,
            kind,
            status,
            amount_in: None,
            amount_out: None,
            amount_fee: None,
            stellar_transaction_id: None,
            transfer_received_at: None,
            updated_at: Utc::now(),
            message: None,
            refunds: None,
        }
    }

    pub fn with_amount_in(mut self, amount: Decimal, asset: impl Into<String>) -> Self {
        self.amount_in = Some(AmountField {
            amount,
            asset: asset.into(),
        });
        self
    }

    /// Sum of prior refund payments' principal, ignoring fee — used by the
    /// amount-exceeds check in `notify_refund_initiated`.
    pub fn existing_refund_total(&self) -> Decimal {
        self.refunds
            .as_ref()
            .map(|r| r.amount_refunded)
            .unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn kind_protocol_pairing() {
        assert_eq!(Kind::Deposit.protocol(), Protocol::Sep24);
        assert_eq!(Kind::Withdrawal.protocol(), Protocol::Sep24);
        assert_eq!(Kind::Receive.protocol(), Protocol::Sep31);
    }

    #[test]
    #[should_panic]
    fn new_rejects_mismatched_kind_and_protocol() {
        Transaction::new(
            "t1",
            Protocol::Sep31,
            Kind::Deposit,
            SepTransactionStatus::Incomplete,
        );
    }

    #[test]
    fn terminal_statuses() {
        assert!(SepTransactionStatus::Completed.is_terminal());
        assert!(SepTransactionStatus::Refunded.is_terminal());
        assert!(SepTransactionStatus::Expired.is_terminal());
        assert!(SepTransactionStatus::Error.is_terminal());
        assert!(!SepTransactionStatus::PendingAnchor.is_terminal());
    }

    #[test]
    fn serde_status_round_trip() {
        let json = serde_json::to_string(&SepTransactionStatus::PendingUserTransferStart).unwrap();
        assert_eq!(json, "\"pending_user_transfer_start\"");
        let back: SepTransactionStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SepTransactionStatus::PendingUserTransferStart);
    }

    #[test]
    fn serde_protocol_round_trip() {
        let json = serde_json::to_string(&Protocol::Sep24).unwrap();
        assert_eq!(json, "\"24\"");
    }

    #[test]
    fn existing_refund_total_defaults_to_zero() {
        let txn = Transaction::new("t1", Protocol::Sep24, Kind::Deposit, SepTransactionStatus::PendingAnchor);
        assert_eq!(txn.existing_refund_total(), dec!(0));
    }
}
