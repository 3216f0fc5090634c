//! Tagged payload decoding and callable dispatch for native hosts.
//!
//! A host process passes a pointer to a tagged payload plus a top-level tag;
//! [`payload`] turns it into an owned [`payload::Value`] graph and [`bridge`]
//! forwards that value to a method resolved by module, type, and method name.

/// Callable resolution, handle registry, and invocation.
pub mod bridge;
/// Environment-driven runtime configuration.
pub mod config;
/// Process-wide debug-mode switch.
pub mod debug;
/// C ABI entry points exported to the host.
pub mod ffi;
/// Tracing subscriber setup.
pub mod logging;
/// Wire format, memory views, and the recursive payload decoder.
pub mod payload;

mod error;

/// Error and result aliases.
pub use error::{BridgeError, CalleeError, ErrorKind, Result};
