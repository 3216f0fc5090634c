use std::fs;
use std::marker::PhantomData;
use std::path::Path;

use crate::payload::Layout;
use crate::{BridgeError, Result};

/// Read-only, address-addressed view over payload memory.
///
/// Implementations must reject null addresses and must never hand out bytes
/// they cannot vouch for.
pub trait PayloadMemory {
	/// Pointer width and byte order of the mapped memory.
	fn layout(&self) -> Layout;

	/// Borrow exactly `len` bytes starting at `addr`.
	fn read(&self, addr: u64, len: usize) -> Result<&[u8]>;

	/// Borrow the bytes of a NUL-terminated string at `addr`, without the terminator.
	///
	/// Scanning stops with [`BridgeError::UnterminatedString`] after `max_len` bytes.
	fn read_cstr(&self, addr: u64, max_len: usize) -> Result<&[u8]>;
}

/// Owned byte buffer mapped at a fixed base address.
#[derive(Debug, Clone)]
pub struct PayloadImage {
	base: u64,
	bytes: Vec<u8>,
	layout: Layout,
}

impl PayloadImage {
	/// Map `bytes` at `base`.
	pub fn new(base: u64, bytes: Vec<u8>, layout: Layout) -> Self {
		Self { base, bytes, layout }
	}

	/// Read a raw memory dump from disk and map it at `base`.
	pub fn open(path: impl AsRef<Path>, base: u64, layout: Layout) -> Result<Self> {
		let bytes = fs::read(path)?;
		Ok(Self::new(base, bytes, layout))
	}

	/// First mapped address.
	pub fn base(&self) -> u64 {
		self.base
	}

	/// Exclusive end of the mapped range.
	pub fn end(&self) -> u64 {
		self.base.saturating_add(self.bytes.len() as u64)
	}

	/// Mapped bytes.
	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Number of mapped bytes.
	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	/// Whether nothing is mapped.
	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	fn offset_of(&self, addr: u64, need: usize) -> Result<usize> {
		let out_of_bounds = || BridgeError::OutOfBounds {
			addr,
			need,
			base: self.base,
			end: self.end(),
		};
		if addr < self.base {
			return Err(out_of_bounds());
		}
		let offset = usize::try_from(addr - self.base).map_err(|_| out_of_bounds())?;
		if offset > self.bytes.len() {
			return Err(out_of_bounds());
		}
		Ok(offset)
	}
}

impl PayloadMemory for PayloadImage {
	fn layout(&self) -> Layout {
		self.layout
	}

	fn read(&self, addr: u64, len: usize) -> Result<&[u8]> {
		if addr == 0 {
			return Err(BridgeError::NullPointer { what: "payload read" });
		}
		let start = self.offset_of(addr, len)?;
		let end = start.checked_add(len).ok_or(BridgeError::AddressOverflow { addr, len })?;
		self.bytes.get(start..end).ok_or(BridgeError::OutOfBounds {
			addr,
			need: len,
			base: self.base,
			end: self.end(),
		})
	}

	fn read_cstr(&self, addr: u64, max_len: usize) -> Result<&[u8]> {
		if addr == 0 {
			return Err(BridgeError::NullPointer { what: "string" });
		}
		let start = self.offset_of(addr, 1)?;
		let window = &self.bytes[start..];
		let limit = window.len().min(max_len.saturating_add(1));
		match window[..limit].iter().position(|byte| *byte == 0) {
			Some(len) => Ok(&window[..len]),
			None if limit > max_len => Err(BridgeError::UnterminatedString { addr, scanned: limit }),
			None => Err(BridgeError::OutOfBounds {
				addr,
				need: limit + 1,
				base: self.base,
				end: self.end(),
			}),
		}
	}
}

/// View over the live address space of the current process.
///
/// Reads are unchecked beyond null, overflow, and string-length guards, so
/// constructing one is `unsafe`.
#[derive(Debug, Clone, Copy)]
pub struct HostMemory<'a> {
	layout: Layout,
	_borrow: PhantomData<&'a [u8]>,
}

impl<'a> HostMemory<'a> {
	/// Create a view of host memory.
	///
	/// # Safety
	///
	/// Every address reachable from the payload being decoded (headers,
	/// parallel arrays, strings up to their terminator, scalars) must be
	/// readable for `'a` and must not be mutated while the view is alive.
	pub unsafe fn new() -> Self {
		Self {
			layout: Layout::native(),
			_borrow: PhantomData,
		}
	}

	fn check_range(addr: u64, len: usize) -> Result<*const u8> {
		let ptr = usize::try_from(addr).map_err(|_| BridgeError::AddressOverflow { addr, len })?;
		if ptr.checked_add(len).is_none() || len > isize::MAX as usize {
			return Err(BridgeError::AddressOverflow { addr, len });
		}
		Ok(ptr as *const u8)
	}
}

impl PayloadMemory for HostMemory<'_> {
	fn layout(&self) -> Layout {
		self.layout
	}

	fn read(&self, addr: u64, len: usize) -> Result<&[u8]> {
		if addr == 0 {
			return Err(BridgeError::NullPointer { what: "payload read" });
		}
		let ptr = Self::check_range(addr, len)?;
		// SAFETY: readability of the range is the contract of `HostMemory::new`;
		// null and overflow were rejected above.
		Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
	}

	fn read_cstr(&self, addr: u64, max_len: usize) -> Result<&[u8]> {
		if addr == 0 {
			return Err(BridgeError::NullPointer { what: "string" });
		}
		let ptr = Self::check_range(addr, 0)?;
		let mut len = 0_usize;
		loop {
			if len > max_len {
				return Err(BridgeError::UnterminatedString { addr, scanned: len });
			}
			Self::check_range(addr, len + 1)?;
			// SAFETY: bytes up to and including the terminator are readable per the
			// `HostMemory::new` contract; the scan stops at the first NUL.
			let byte = unsafe { ptr.add(len).read() };
			if byte == 0 {
				break;
			}
			len += 1;
		}
		// SAFETY: the `len` bytes before the terminator were just read one by one.
		Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
	}
}
