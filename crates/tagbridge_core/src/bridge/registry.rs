use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::bridge::{Module, ModuleLoader, StaticModule};
use crate::{BridgeError, CalleeError, Result};

/// Factory that builds a module on first resolution.
pub type ModuleFactory = dyn Fn() -> std::result::Result<StaticModule, CalleeError> + Send + Sync;

/// [`ModuleLoader`] backed by factories registered in-process.
///
/// The embedding runtime registers each module under the path hosts pass to
/// resolution. Factories are not cached here; the [`crate::bridge::Bridge`]
/// memoizes loaded modules.
#[derive(Default)]
pub struct ModuleRegistry {
	factories: DashMap<String, Arc<ModuleFactory>>,
}

impl ModuleRegistry {
	/// Create an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Register `factory` under `path`, replacing any previous registration.
	pub fn register(&self, path: impl Into<String>, factory: impl Fn() -> std::result::Result<StaticModule, CalleeError> + Send + Sync + 'static) {
		let path = path.into();
		tracing::debug!(target: "bridge", module = %path, "module registered");
		self.factories.insert(path, Arc::new(factory));
	}

	/// Register an already built module under `path`.
	pub fn register_module(&self, path: impl Into<String>, module: StaticModule) {
		self.register(path, move || Ok(module.clone()));
	}

	/// Remove the registration for `path`.
	pub fn unregister(&self, path: &str) -> bool {
		self.factories.remove(path).is_some()
	}

	/// Whether `path` is registered.
	pub fn contains(&self, path: &str) -> bool {
		self.factories.contains_key(path)
	}
}

impl ModuleLoader for ModuleRegistry {
	fn load(&self, module: &str) -> Result<Arc<dyn Module>> {
		let factory = self
			.factories
			.get(module)
			.map(|entry| Arc::clone(entry.value()))
			.ok_or_else(|| BridgeError::ModuleLoadFailed {
				module: module.to_owned(),
				reason: "module is not registered".to_owned(),
			})?;
		let built = factory().map_err(|err| BridgeError::ModuleLoadFailed {
			module: module.to_owned(),
			reason: err.to_string(),
		})?;
		Ok(Arc::new(built))
	}
}

impl fmt::Debug for ModuleRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut paths: Vec<String> = self.factories.iter().map(|entry| entry.key().clone()).collect();
		paths.sort();
		f.debug_struct("ModuleRegistry").field("modules", &paths).finish()
	}
}
