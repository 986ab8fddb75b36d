//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`transport`] - Mock [`Transport`](crate::port::outbound::Transport)
//!   implementations: `ScriptedTransport`, `RoutedTransport`.
//! - [`fixtures`] - Canned exchange responses and client builders.

pub mod fixtures;
pub mod transport;
