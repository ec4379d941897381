//! Action handler registry: binds each `ActionType` to its handler
//! implementation and resolves an RPC method name to the pair.
pub mod base;
pub mod onchain_funds_received;
pub mod refund_initiated;
pub mod refund_sent;
pub mod requests;
pub mod transaction_expired;

pub use base::{handle, ActionHandler, ActionType};
pub use requests::ActionRequest;

use std::collections::HashMap;
use std::sync::Arc;

/// Builds the full registry of action handlers, keyed by method name.
/// Handlers are stateless, so one instance each is shared across calls.
pub fn registry() -> HashMap<&'static str, Arc<dyn ActionHandler>> {
    let handlers: Vec<Arc<dyn ActionHandler>> = vec![
        Arc::new(onchain_funds_received::NotifyOnchainFundsReceived),
        Arc::new(refund_initiated::NotifyRefundInitiated),
        Arc::new(refund_sent::NotifyRefundSent),
        Arc::new(transaction_expired::NotifyTransactionExpired),
    ];
    handlers
        .into_iter()
        .map(|h| (h.action_type().method_name(), h))
        .collect()
}
