use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::payload::Value;
use crate::{CalleeError, Result};

/// Signature of an exported method body.
///
/// Arguments arrive positionally; the return value of the method is not
/// observable to the host, only success or failure.
pub type MethodBody = dyn Fn(&[Value]) -> std::result::Result<(), CalleeError> + Send + Sync;

/// A method a module exposes to the bridge.
#[derive(Clone)]
pub struct ExportedMethod {
	arity: usize,
	body: Arc<MethodBody>,
}

impl ExportedMethod {
	/// Export `body` with `arity` declared parameters.
	pub fn new(arity: usize, body: impl Fn(&[Value]) -> std::result::Result<(), CalleeError> + Send + Sync + 'static) -> Self {
		Self { arity, body: Arc::new(body) }
	}

	/// Export a single-parameter method.
	pub fn unary(body: impl Fn(&Value) -> std::result::Result<(), CalleeError> + Send + Sync + 'static) -> Self {
		Self::new(1, move |args| match args {
			[value] => body(value),
			_ => Err(format!("expected 1 argument, got {}", args.len()).into()),
		})
	}

	/// Declared parameter count.
	pub fn arity(&self) -> usize {
		self.arity
	}

	pub(crate) fn body(&self) -> Arc<MethodBody> {
		Arc::clone(&self.body)
	}
}

impl fmt::Debug for ExportedMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ExportedMethod").field("arity", &self.arity).finish_non_exhaustive()
	}
}

/// A loaded unit of code that exposes methods by type and method name.
pub trait Module: Send + Sync {
	/// Look up `type_name.method`; names are case-sensitive.
	fn method(&self, type_name: &str, method: &str) -> Option<ExportedMethod>;
}

/// Source of modules for the bridge.
pub trait ModuleLoader: Send + Sync {
	/// Load the module identified by `module`.
	///
	/// Failures must be reported as [`crate::BridgeError::ModuleLoadFailed`].
	fn load(&self, module: &str) -> Result<Arc<dyn Module>>;
}

/// In-memory [`Module`] built from closures.
#[derive(Debug, Clone, Default)]
pub struct StaticModule {
	types: HashMap<String, HashMap<String, ExportedMethod>>,
}

impl StaticModule {
	/// Create an empty module.
	pub fn new() -> Self {
		Self::default()
	}

	/// Add `type_name.method`, replacing an earlier export of the same name.
	pub fn export(mut self, type_name: impl Into<String>, method: impl Into<String>, exported: ExportedMethod) -> Self {
		self.types.entry(type_name.into()).or_default().insert(method.into(), exported);
		self
	}

	/// Add a single-parameter method.
	pub fn unary(
		self,
		type_name: impl Into<String>,
		method: impl Into<String>,
		body: impl Fn(&Value) -> std::result::Result<(), CalleeError> + Send + Sync + 'static,
	) -> Self {
		self.export(type_name, method, ExportedMethod::unary(body))
	}

	/// Number of exported methods across all types.
	pub fn method_count(&self) -> usize {
		self.types.values().map(HashMap::len).sum()
	}
}

impl Module for StaticModule {
	fn method(&self, type_name: &str, method: &str) -> Option<ExportedMethod> {
		self.types.get(type_name)?.get(method).cloned()
	}
}
