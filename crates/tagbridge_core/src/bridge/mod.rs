mod callable;
mod dispatch;
mod global;
mod handles;
mod registry;

/// Module, loader, and exported-method abstractions.
pub use callable::{ExportedMethod, MethodBody, Module, ModuleLoader, StaticModule};
/// Handle-based resolver and invoker.
pub use dispatch::Bridge;
/// Process-wide registry and bridge.
pub use global::{bridge, registry};
/// Opaque callable handle.
pub use handles::CallableHandle;
/// In-process module loader.
pub use registry::{ModuleFactory, ModuleRegistry};
