// Application layer - the ledger service and its thread-safe handle.
// Clients (console, tests) talk to `Ledger` or `SharedLedger`, never to the registry.

pub mod error;
mod service;
mod shared;

pub use error::*;
pub use service::*;
pub use shared::*;
