//! Outbound ports (driven side): interfaces implemented by outbound adapters.

pub mod transport;

pub use transport::{HttpRequest, HttpResponse, Transport, TransportError};
