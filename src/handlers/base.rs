//! Action handler base: the generic pre-/post-condition machinery shared
//! by every action. `handle` is a free function over the `ActionHandler`
//! interface rather than an abstract base class.
use crate::domain::{AssetService, Protocol, SepTransactionStatus, Transaction};
use crate::error::DispatchError;
use crate::handlers::requests::ActionRequest;
use crate::projection::{project, GetTransactionResponse};
use crate::repository::RepositoryFacade;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    NotifyOnchainFundsReceived,
    NotifyRefundInitiated,
    NotifyRefundSent,
    NotifyTransactionExpired,
}

impl ActionType {
    pub fn method_name(&self) -> &'static str {
        match self {
            ActionType::NotifyOnchainFundsReceived => "notify_onchain_funds_received",
            ActionType::NotifyRefundInitiated => "notify_refund_initiated",
            ActionType::NotifyRefundSent => "notify_refund_sent",
            ActionType::NotifyTransactionExpired => "notify_transaction_expired",
        }
    }
}

/// The five operations every per-action handler supplies.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    fn action_type(&self) -> ActionType;

    fn supported_protocols(&self) -> &'static [Protocol];

    /// Depends on the transaction's current kind/protocol and auxiliary
    /// state (e.g. whether `transfer_received_at` is set).
    fn supported_statuses(&self, txn: &Transaction) -> Vec<SepTransactionStatus>;

    async fn validate(
        &self,
        txn: &Transaction,
        req: &ActionRequest,
        assets: &dyn AssetService,
    ) -> Result<(), DispatchError>;

    /// Pure function of `(txn, req)` (aside from asset-precision lookups)
    /// computing the post-status.
    async fn next_status(
        &self,
        txn: &Transaction,
        req: &ActionRequest,
        assets: &dyn AssetService,
    ) -> Result<SepTransactionStatus, DispatchError>;

    /// Applies mutations in-memory only; saving happens centrally in
    /// `handle`, never inside a handler. Takes `assets` because refund
    /// aggregates must round to the asset catalog's registered precision,
    /// never to a scale inferred from the current call's decimal strings.
    async fn mutate(
        &self,
        txn: &mut Transaction,
        req: &ActionRequest,
        assets: &dyn AssetService,
    ) -> Result<(), DispatchError>;
}

/// Runs the full pre-condition/mutate/post-condition pipeline for a single
/// action invocation. Any error before the save step aborts the call; no
/// partial state persists.
pub async fn handle(
    handler: &dyn ActionHandler,
    repository: &RepositoryFacade,
    assets: &dyn AssetService,
    req: ActionRequest,
) -> Result<GetTransactionResponse, DispatchError> {
    // 1. lookup
    let txn = repository.lookup(req.transaction_id()).await?;
    let expected_updated_at = txn.updated_at;

    // 2. structural validation
    req.validate_structure()?;

    // 3. protocol gate
    if !handler.supported_protocols().contains(&txn.protocol) {
        return Err(gate_error(handler, &txn));
    }

    // 4. status gate
    if !handler.supported_statuses(&txn).contains(&txn.status) {
        return Err(gate_error(handler, &txn));
    }

    // 5. domain validation
    handler.validate(&txn, &req, assets).await?;

    // 6. compute next status
    let next = handler.next_status(&txn, &req, assets).await?;

    // 7. mutate in-memory
    let mut txn = txn;
    handler.mutate(&mut txn, &req, assets).await?;
    txn.status = next;

    // 8-9. save (repository sets updated_at itself)
    let saved = repository.save(txn, expected_updated_at).await?;

    // 10. project
    Ok(project(&saved, None))
}

/// Builds the gate-rejection error using the same wire-format strings the
/// rest of the system emits (snake_case status, lowercase kind, `"24"`/
/// `"31"` protocol) rather than Rust's Debug spelling of the enums.
fn gate_error(handler: &dyn ActionHandler, txn: &Transaction) -> DispatchError {
    let status = serde_json::to_value(txn.status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let kind = format!("{:?}", txn.kind).to_lowercase();
    let protocol = txn.protocol.to_string();

    DispatchError::unsupported_action(handler.action_type().method_name(), &status, &kind, &protocol)
}
