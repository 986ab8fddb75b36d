//! Exchange REST gateway adapter.
//!
//! - [`client`] - Signed, retrying request pipeline
//! - [`ledger`] - Sub-ledger balance endpoints
//! - [`nonce`] - Strictly increasing nonces
//! - [`retry`] - Retry state machine and backoff
//! - [`signer`] - Request signatures

pub mod client;
pub mod ledger;
pub mod nonce;
pub mod retry;
pub mod signer;

pub use client::ExchangeClient;
pub use retry::RetryPolicy;
pub use signer::RequestSigner;
