use crate::{BridgeError, Result};

/// Byte order of multi-byte payload fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
	/// Little-endian byte order.
	Little,
	/// Big-endian byte order.
	Big,
}

impl Endianness {
	/// Byte order of the running process.
	pub const fn native() -> Self {
		if cfg!(target_endian = "big") { Self::Big } else { Self::Little }
	}

	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Little => "little",
			Self::Big => "big",
		}
	}
}

/// Pointer width and byte order used to interpret payload memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
	/// Pointer width in bytes (4 or 8).
	pub pointer_size: usize,
	/// Byte order of integers, doubles, and pointers.
	pub endianness: Endianness,
}

impl Layout {
	/// Layout of the running process.
	pub const fn native() -> Self {
		Self {
			pointer_size: std::mem::size_of::<usize>(),
			endianness: Endianness::native(),
		}
	}

	/// Build a layout, rejecting pointer widths other than 4 and 8.
	pub fn new(pointer_size: usize, endianness: Endianness) -> Result<Self> {
		match pointer_size {
			4 | 8 => Ok(Self { pointer_size, endianness }),
			size => Err(BridgeError::UnsupportedPointerSize { size }),
		}
	}

	/// Size of `{ i32 count; ptr types; ptr values }` with sequential C layout.
	pub fn array_header_size(self) -> usize {
		self.pointer_size + 2 * self.pointer_size
	}

	/// Size of `{ i32 count; ptr types; ptr names; ptr values }` with sequential C layout.
	pub fn object_header_size(self) -> usize {
		self.pointer_size + 3 * self.pointer_size
	}
}

impl Default for Layout {
	fn default() -> Self {
		Self::native()
	}
}

/// Simple bounded cursor over an immutable byte slice.
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
	layout: Layout,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8], layout: Layout) -> Self {
		Self { bytes, pos: 0, layout }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(BridgeError::UnexpectedEof {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let raw = self.read_exact(N)?;
		let mut buf = [0_u8; N];
		buf.copy_from_slice(raw);
		Ok(buf)
	}

	/// Read one byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		let [byte] = self.read_array::<1>()?;
		Ok(byte)
	}

	/// Read an `i32` in layout byte order.
	pub fn read_i32(&mut self) -> Result<i32> {
		let buf = self.read_array::<4>()?;
		Ok(match self.layout.endianness {
			Endianness::Little => i32::from_le_bytes(buf),
			Endianness::Big => i32::from_be_bytes(buf),
		})
	}

	/// Read a `u32` in layout byte order.
	pub fn read_u32(&mut self) -> Result<u32> {
		let buf = self.read_array::<4>()?;
		Ok(match self.layout.endianness {
			Endianness::Little => u32::from_le_bytes(buf),
			Endianness::Big => u32::from_be_bytes(buf),
		})
	}

	/// Read a `u64` in layout byte order.
	pub fn read_u64(&mut self) -> Result<u64> {
		let buf = self.read_array::<8>()?;
		Ok(match self.layout.endianness {
			Endianness::Little => u64::from_le_bytes(buf),
			Endianness::Big => u64::from_be_bytes(buf),
		})
	}

	/// Read an IEEE-754 double in layout byte order.
	pub fn read_f64(&mut self) -> Result<f64> {
		Ok(f64::from_bits(self.read_u64()?))
	}

	/// Read a pointer-sized unsigned integer and widen to `u64`.
	pub fn read_ptr(&mut self) -> Result<u64> {
		match self.layout.pointer_size {
			4 => Ok(u64::from(self.read_u32()?)),
			8 => self.read_u64(),
			size => Err(BridgeError::UnsupportedPointerSize { size }),
		}
	}

	/// Advance to the next multiple of `align` (a power of two).
	pub fn align_to(&mut self, align: usize) -> Result<()> {
		let aligned = (self.pos + align - 1) & !(align - 1);
		let skip = aligned.saturating_sub(self.pos);
		let _ = self.read_exact(skip)?;
		Ok(())
	}

	/// Advance to the next pointer-aligned position.
	pub fn align_ptr(&mut self) -> Result<()> {
		self.align_to(self.layout.pointer_size)
	}
}
