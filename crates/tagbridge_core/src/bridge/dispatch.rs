use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;

use crate::bridge::handles::{BoundCall, Callable, HandleTable};
use crate::bridge::{CallableHandle, Module, ModuleLoader};
use crate::debug::debug_message;
use crate::payload::{DecodeOptions, PayloadMemory, Value, decode_payload};
use crate::{BridgeError, Result};

/// Resolves methods to handles and forwards decoded payloads to them.
///
/// Every method is safe to call from many threads at once, including from
/// inside a method the bridge is currently running.
pub struct Bridge {
	loader: Arc<dyn ModuleLoader>,
	modules: DashMap<String, Arc<OnceCell<Arc<dyn Module>>>>,
	handles: HandleTable,
	options: DecodeOptions,
}

impl Bridge {
	/// Create a bridge with default decoder limits.
	pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
		Self::with_options(loader, DecodeOptions::default())
	}

	/// Create a bridge with explicit decoder limits.
	pub fn with_options(loader: Arc<dyn ModuleLoader>, options: DecodeOptions) -> Self {
		Self {
			loader,
			modules: DashMap::new(),
			handles: HandleTable::new(),
			options,
		}
	}

	/// Decoder limits applied by [`Bridge::invoke`].
	pub fn options(&self) -> &DecodeOptions {
		&self.options
	}

	/// Number of live handles.
	pub fn handle_count(&self) -> usize {
		self.handles.len()
	}

	/// Resolve `type_name.method` in `module` to a new handle.
	///
	/// The module is loaded at most once per bridge. The method must take
	/// exactly one parameter. Each call returns a fresh handle, even for a
	/// target that was resolved before.
	pub fn resolve(&self, module: &str, type_name: &str, method: &str) -> Result<CallableHandle> {
		for (what, text) in [("module path", module), ("type name", type_name), ("method name", method)] {
			if text.trim().is_empty() {
				return Err(BridgeError::InvalidTarget { reason: format!("{what} is empty") });
			}
		}

		let loaded = self.module(module)?;
		let exported = loaded.method(type_name, method).ok_or_else(|| BridgeError::MethodNotFound {
			module: module.to_owned(),
			type_name: type_name.to_owned(),
			method: method.to_owned(),
		})?;
		if exported.arity() != 1 {
			return Err(BridgeError::MethodIncompatible {
				type_name: type_name.to_owned(),
				method: method.to_owned(),
				arity: exported.arity(),
			});
		}
		debug_message!("Method {}.{}() loaded successfully", type_name, method);

		let body = exported.body();
		let call: Arc<BoundCall> = Arc::new(move |value: Value| body(std::slice::from_ref(&value)));
		let target: Arc<str> = format!("{module}:{type_name}.{method}").into();
		let handle = self.handles.insert(Callable {
			target: Arc::clone(&target),
			call,
		});
		tracing::debug!(target: "bridge", handle = handle.get(), callable = %target, "callable resolved");
		Ok(handle)
	}

	/// Decode the payload at `addr` and call `handle` with it.
	///
	/// Nothing is called when decoding fails. Errors returned by the method
	/// surface as [`BridgeError::CallFailed`].
	pub fn invoke<M: PayloadMemory + ?Sized>(&self, handle: CallableHandle, memory: &M, addr: u64, tag: i32) -> Result<()> {
		let callable = self.callable(handle)?;
		let value = decode_payload(memory, addr, tag, &self.options)?;
		Self::call(handle, &callable, value)
	}

	/// Call `handle` with an already decoded value.
	pub fn invoke_value(&self, handle: CallableHandle, value: Value) -> Result<()> {
		let callable = self.callable(handle)?;
		Self::call(handle, &callable, value)
	}

	/// Drop `handle`; later use fails with [`BridgeError::UnknownHandle`].
	pub fn release(&self, handle: CallableHandle) -> Result<()> {
		match self.handles.remove(handle) {
			Some(callable) => {
				tracing::debug!(target: "bridge", handle = handle.get(), callable = %callable.target, "callable released");
				Ok(())
			}
			None => Err(BridgeError::UnknownHandle { handle: handle.get() }),
		}
	}

	fn callable(&self, handle: CallableHandle) -> Result<Callable> {
		self.handles.get(handle).ok_or(BridgeError::UnknownHandle { handle: handle.get() })
	}

	fn call(handle: CallableHandle, callable: &Callable, value: Value) -> Result<()> {
		tracing::trace!(target: "bridge", handle = handle.get(), tag = value.tag().as_str(), "invoking callable");
		(callable.call)(value).map_err(|source| {
			tracing::debug!(target: "bridge", handle = handle.get(), callable = %callable.target, error = %source, "callable failed");
			BridgeError::CallFailed {
				target: callable.target.to_string(),
				source,
			}
		})
	}

	fn module(&self, path: &str) -> Result<Arc<dyn Module>> {
		let cell = Arc::clone(self.modules.entry(path.to_owned()).or_default().value());
		let loaded = cell.get_or_try_init(|| {
			let module = self.loader.load(path)?;
			debug_message!("Module {} loaded successfully", path);
			Ok::<_, BridgeError>(module)
		});
		match loaded {
			Ok(module) => Ok(Arc::clone(module)),
			Err(err) => {
				// Drop the empty cell unless another caller is still waiting on it.
				self.modules
					.remove_if(path, |_, entry| entry.get().is_none() && Arc::strong_count(entry) == 2);
				Err(err)
			}
		}
	}
}

impl fmt::Debug for Bridge {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Bridge")
			.field("modules", &self.modules.len())
			.field("handles", &self.handles.len())
			.field("options", &self.options)
			.finish_non_exhaustive()
	}
}
