use thiserror::Error;

/// Error taxonomy for the action dispatcher.
///
/// Each variant maps to exactly one JSON-RPC error code; `rpc_code` and
/// `rpc_message` are the only place that mapping happens, so status codes
/// never get scattered through the handlers themselves.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Amount parsing/precision violation.
    #[error("{0}")]
    BadRequest(String),

    /// Business-rule or schema violation.
    #[error("{0}")]
    InvalidParams(String),

    /// Action/status/protocol gate mismatch.
    #[error("{0}")]
    InvalidRequest(String),

    /// No transaction with the given id.
    #[error("transaction '{0}' not found")]
    NotFound(String),

    /// Optimistic-concurrency save conflict.
    #[error("concurrent modification of transaction '{0}'")]
    Conflict(String),

    /// Persistence/IO failure; never leaks the raw driver message.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DispatchError {
    /// Action[a] is not supported for status[s], kind[k] and protocol[p].
    ///
    /// `status`/`kind`/`protocol` must already be the wire-format strings
    /// (snake_case status, lowercase kind, `"24"`/`"31"` protocol) — this
    /// never formats a Rust enum's Debug representation itself.
    pub fn unsupported_action(action: &str, status: &str, kind: &str, protocol: &str) -> Self {
        DispatchError::InvalidRequest(format!(
            "Action[{action}] is not supported for status[{status:?}], kind[{kind:?}] and protocol[{protocol:?}]"
        ))
    }

    pub fn rpc_code(&self) -> i64 {
        match self {
            DispatchError::InvalidParams(_) => -32602,
            DispatchError::Internal(_) => -32603,
            DispatchError::Conflict(_) => -32603,
            DispatchError::InvalidRequest(_) => -32600,
            DispatchError::NotFound(_) => -32001,
            DispatchError::BadRequest(_) => -32002,
        }
    }

    pub fn rpc_message(&self) -> String {
        self.to_string()
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_codes_match_error_table() {
        assert_eq!(DispatchError::InvalidParams("x".into()).rpc_code(), -32602);
        assert_eq!(DispatchError::Internal("x".into()).rpc_code(), -32603);
        assert_eq!(DispatchError::InvalidRequest("x".into()).rpc_code(), -32600);
        assert_eq!(DispatchError::NotFound("x".into()).rpc_code(), -32001);
        assert_eq!(DispatchError::BadRequest("x".into()).rpc_code(), -32002);
    }

    #[test]
    fn unsupported_action_message_matches_template() {
        let err = DispatchError::unsupported_action(
            "notify_refund_sent",
            "pending_anchor",
            "deposit",
            "24",
        );
        assert_eq!(
            err.to_string(),
            "Action[notify_refund_sent] is not supported for status[\"pending_anchor\"], kind[\"deposit\"] and protocol[\"24\"]"
        );
    }
}
