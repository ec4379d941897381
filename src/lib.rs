pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod observability;
pub mod projection;
pub mod refunds;
pub mod repository;
pub mod rpc;
pub mod validation;

pub mod api;

pub use error::{DispatchError, Result};
