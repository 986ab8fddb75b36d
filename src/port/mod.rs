//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points that adapters implement to integrate
//! with external systems.
//!
//! # Available Ports
//!
//! - [`outbound::transport::Transport`] - HTTP delivery for the exchange client

pub mod outbound;
