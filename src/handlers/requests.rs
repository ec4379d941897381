//! Per-action request payloads. Each maps 1:1 to an RPC `params` object;
//! structural validation (presence/shape) happens in
//! `ActionRequest::validate_structure`, strictly before any domain
//! validation runs.
use crate::validation::require_non_empty;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountParam {
    pub amount: String,
    pub asset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundParam {
    pub id: String,
    pub amount: String,
    pub amount_fee: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyOnchainFundsReceivedRequest {
    pub transaction_id: String,
    #[serde(default)]
    pub stellar_transaction_id: Option<String>,
    #[serde(default)]
    pub amount_in: Option<AmountParam>,
    #[serde(default)]
    pub amount_out: Option<AmountParam>,
    #[serde(default)]
    pub amount_fee: Option<AmountParam>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyRefundInitiatedRequest {
    pub transaction_id: String,
    #[serde(default)]
    pub refund: Option<RefundParam>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyRefundSentRequest {
    pub transaction_id: String,
    #[serde(default)]
    pub refund: Option<RefundParam>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyTransactionExpiredRequest {
    pub transaction_id: String,
    #[serde(default)]
    pub message: String,
}

/// A typed, already-deserialized RPC request. Variants carry the per-action
/// payload; the dispatcher picks the variant matching `method` before
/// construction, so a handler seeing the wrong variant is an internal bug,
/// never something an operator can trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ActionRequest {
    NotifyOnchainFundsReceived(NotifyOnchainFundsReceivedRequest),
    NotifyRefundInitiated(NotifyRefundInitiatedRequest),
    NotifyRefundSent(NotifyRefundSentRequest),
    NotifyTransactionExpired(NotifyTransactionExpiredRequest),
}

impl ActionRequest {
    pub fn transaction_id(&self) -> &str {
        match self {
            ActionRequest::NotifyOnchainFundsReceived(r) => &r.transaction_id,
            ActionRequest::NotifyRefundInitiated(r) => &r.transaction_id,
            ActionRequest::NotifyRefundSent(r) => &r.transaction_id,
            ActionRequest::NotifyTransactionExpired(r) => &r.transaction_id,
        }
    }

    /// C2: structural validation — presence, not domain semantics.
    pub fn validate_structure(&self) -> Result<(), crate::validation::RequestValidationError> {
        require_non_empty("transaction_id", self.transaction_id())?;
        if let ActionRequest::NotifyTransactionExpired(r) = self {
            require_non_empty("message", &r.message)?;
        }
        Ok(())
    }

    /// Narrows to the variant a handler expects. A mismatch can only occur
    /// if the dispatcher mis-wires a method name to the wrong handler — an
    /// internal bug, not something an operator's request can trigger.
    pub fn as_onchain_funds_received(
        &self,
    ) -> Result<&NotifyOnchainFundsReceivedRequest, crate::error::DispatchError> {
        match self {
            ActionRequest::NotifyOnchainFundsReceived(r) => Ok(r),
            _ => Err(crate::error::DispatchError::Internal(
                "handler/request variant mismatch".to_string(),
            )),
        }
    }

    pub fn as_refund_initiated(
        &self,
    ) -> Result<&NotifyRefundInitiatedRequest, crate::error::DispatchError> {
        match self {
            ActionRequest::NotifyRefundInitiated(r) => Ok(r),
            _ => Err(crate::error::DispatchError::Internal(
                "handler/request variant mismatch".to_string(),
            )),
        }
    }

    pub fn as_refund_sent(&self) -> Result<&NotifyRefundSentRequest, crate::error::DispatchError> {
        match self {
            ActionRequest::NotifyRefundSent(r) => Ok(r),
            _ => Err(crate::error::DispatchError::Internal(
                "handler/request variant mismatch".to_string(),
            )),
        }
    }

    pub fn as_transaction_expired(
        &self,
    ) -> Result<&NotifyTransactionExpiredRequest, crate::error::DispatchError> {
        match self {
            ActionRequest::NotifyTransactionExpired(r) => Ok(r),
            _ => Err(crate::error::DispatchError::Internal(
                "handler/request variant mismatch".to_string(),
            )),
        }
    }
}
