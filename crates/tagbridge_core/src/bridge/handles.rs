use std::fmt;
use std::num::NonZeroU64;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::CalleeError;
use crate::payload::Value;

/// Opaque reference to a resolved method.
///
/// The raw id is what crosses the C ABI; `0` is never a valid handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallableHandle(NonZeroU64);

impl CallableHandle {
	/// Rebuild a handle from its raw id.
	pub fn from_raw(raw: u64) -> Option<Self> {
		NonZeroU64::new(raw).map(Self)
	}

	/// Raw id.
	pub fn get(self) -> u64 {
		self.0.get()
	}
}

impl fmt::Display for CallableHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

pub(crate) type BoundCall = dyn Fn(Value) -> std::result::Result<(), CalleeError> + Send + Sync;

/// Bound method stored behind a handle.
#[derive(Clone)]
pub(crate) struct Callable {
	pub target: Arc<str>,
	pub call: Arc<BoundCall>,
}

/// Concurrent handle id -> bound method table.
pub(crate) struct HandleTable {
	next: AtomicU64,
	entries: DashMap<u64, Callable>,
}

impl HandleTable {
	pub fn new() -> Self {
		Self {
			next: AtomicU64::new(1),
			entries: DashMap::new(),
		}
	}

	pub fn insert(&self, callable: Callable) -> CallableHandle {
		let handle = loop {
			if let Some(handle) = CallableHandle::from_raw(self.next.fetch_add(1, Ordering::Relaxed)) {
				break handle;
			}
		};
		self.entries.insert(handle.get(), callable);
		handle
	}

	/// Clone the entry out so no shard lock is held while it runs.
	pub fn get(&self, handle: CallableHandle) -> Option<Callable> {
		self.entries.get(&handle.get()).map(|entry| entry.value().clone())
	}

	pub fn remove(&self, handle: CallableHandle) -> Option<Callable> {
		self.entries.remove(&handle.get()).map(|(_, callable)| callable)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}
}
