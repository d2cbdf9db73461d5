//! Common test infrastructure
//!
//! Provides the scripted transport used by the integration tests. Tests
//! should only import from this module, not from internal submodules.

mod transport;

#[allow(unused_imports)]
pub use transport::{online_peer, ScriptedTransport};
