pub mod asset;
pub mod horizon;
pub mod transaction;

pub use asset::{AssetInfo, AssetService, InMemoryAssetService};
pub use horizon::{Horizon, StubHorizon};
pub use transaction::{
    Kind, Protocol, RefundPayment, Refunds, SepTransactionStatus, Transaction,
};
