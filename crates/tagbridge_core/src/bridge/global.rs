use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::bridge::{Bridge, ModuleRegistry};
use crate::config::BridgeConfig;

static REGISTRY: Lazy<Arc<ModuleRegistry>> = Lazy::new(|| Arc::new(ModuleRegistry::new()));

static BRIDGE: Lazy<Bridge> = Lazy::new(|| {
	let config = BridgeConfig::from_env();
	crate::debug::seed_debug_mode(config.debug);
	tracing::debug!(target: "bridge", max_depth = config.decode.max_depth, "process bridge initialized");
	Bridge::with_options(Arc::<ModuleRegistry>::clone(&REGISTRY), config.decode)
});

/// Module registry consulted by the process-wide bridge.
///
/// The hosted runtime registers its modules here before the host resolves
/// anything through the C ABI.
pub fn registry() -> &'static ModuleRegistry {
	&REGISTRY
}

/// Process-wide bridge used by the C ABI.
pub fn bridge() -> &'static Bridge {
	&BRIDGE
}
