use crate::payload::{Endianness, Layout, PayloadImage, Tag, Value};

/// Base address used when none is given.
const DEFAULT_BASE: u64 = 0x1000;

/// Lays out wire-format payloads inside a [`PayloadImage`].
///
/// Every method appends to the image and returns the address of what it
/// wrote. Addresses stay valid in the finished image.
#[derive(Debug, Clone)]
pub struct ImageBuilder {
	base: u64,
	layout: Layout,
	bytes: Vec<u8>,
}

impl ImageBuilder {
	/// Start an image mapped at `base` (must be non-zero).
	pub fn new(base: u64, layout: Layout) -> Self {
		let base = if base == 0 { DEFAULT_BASE } else { base };
		Self {
			base,
			layout,
			bytes: Vec::new(),
		}
	}

	/// Start an image at the default base with the native layout.
	pub fn native() -> Self {
		Self::new(DEFAULT_BASE, Layout::native())
	}

	/// Layout the image is written with.
	pub fn layout(&self) -> Layout {
		self.layout
	}

	/// Address one past the last written byte.
	pub fn cursor(&self) -> u64 {
		self.base + self.bytes.len() as u64
	}

	/// Finish and map the image.
	pub fn finish(self) -> PayloadImage {
		PayloadImage::new(self.base, self.bytes, self.layout)
	}

	fn alloc(&mut self, bytes: &[u8], align: usize) -> u64 {
		while self.cursor() % align as u64 != 0 {
			self.bytes.push(0);
		}
		let addr = self.cursor();
		self.bytes.extend_from_slice(bytes);
		addr
	}

	fn u32_bytes(&self, value: u32) -> [u8; 4] {
		match self.layout.endianness {
			Endianness::Little => value.to_le_bytes(),
			Endianness::Big => value.to_be_bytes(),
		}
	}

	fn u64_bytes(&self, value: u64) -> [u8; 8] {
		match self.layout.endianness {
			Endianness::Little => value.to_le_bytes(),
			Endianness::Big => value.to_be_bytes(),
		}
	}

	fn ptr_bytes(&self, value: u64) -> Vec<u8> {
		match self.layout.pointer_size {
			4 => self.u32_bytes(value as u32).to_vec(),
			_ => self.u64_bytes(value).to_vec(),
		}
	}

	/// Write raw bytes with the given alignment.
	pub fn raw(&mut self, bytes: &[u8], align: usize) -> u64 {
		self.alloc(bytes, align.max(1))
	}

	/// Write a NUL-terminated string.
	pub fn string(&mut self, value: &str) -> u64 {
		let mut bytes = Vec::with_capacity(value.len() + 1);
		bytes.extend_from_slice(value.as_bytes());
		bytes.push(0);
		self.alloc(&bytes, 1)
	}

	/// Write a one-byte boolean.
	pub fn boolean(&mut self, value: bool) -> u64 {
		self.alloc(&[u8::from(value)], 1)
	}

	/// Write a 4-byte signed integer.
	pub fn int32(&mut self, value: i32) -> u64 {
		let bytes = self.u32_bytes(value as u32);
		self.alloc(&bytes, 4)
	}

	/// Write a 4-byte unsigned integer.
	pub fn uint32(&mut self, value: u32) -> u64 {
		let bytes = self.u32_bytes(value);
		self.alloc(&bytes, 4)
	}

	/// Write an 8-byte double.
	pub fn number(&mut self, value: f64) -> u64 {
		let bytes = self.u64_bytes(value.to_bits());
		self.alloc(&bytes, 8)
	}

	/// Write a date as epoch milliseconds.
	pub fn date_millis(&mut self, millis: f64) -> u64 {
		self.number(millis)
	}

	/// Write an `i32[]` table.
	pub fn i32_table(&mut self, values: &[i32]) -> u64 {
		let bytes: Vec<u8> = values.iter().flat_map(|value| self.u32_bytes(*value as u32)).collect();
		self.alloc(&bytes, 4)
	}

	/// Write a pointer table.
	pub fn ptr_table(&mut self, values: &[u64]) -> u64 {
		let bytes: Vec<u8> = values.iter().flat_map(|value| self.ptr_bytes(*value)).collect();
		self.alloc(&bytes, self.layout.pointer_size)
	}

	/// Write an array header with caller-provided table addresses.
	pub fn raw_array(&mut self, count: i32, types: u64, values: u64) -> u64 {
		let mut bytes = self.u32_bytes(count as u32).to_vec();
		bytes.resize(self.layout.pointer_size, 0);
		bytes.extend(self.ptr_bytes(types));
		bytes.extend(self.ptr_bytes(values));
		self.alloc(&bytes, self.layout.pointer_size)
	}

	/// Write an object header with caller-provided table addresses.
	pub fn raw_object(&mut self, count: i32, types: u64, names: u64, values: u64) -> u64 {
		let mut bytes = self.u32_bytes(count as u32).to_vec();
		bytes.resize(self.layout.pointer_size, 0);
		bytes.extend(self.ptr_bytes(types));
		bytes.extend(self.ptr_bytes(names));
		bytes.extend(self.ptr_bytes(values));
		self.alloc(&bytes, self.layout.pointer_size)
	}

	/// Write an array of already written `(tag, address)` elements.
	pub fn array(&mut self, items: &[(Tag, u64)]) -> u64 {
		let tags: Vec<i32> = items.iter().map(|(tag, _)| tag.code()).collect();
		let values: Vec<u64> = items.iter().map(|(_, addr)| *addr).collect();
		let count = i32::try_from(items.len()).unwrap_or(i32::MAX);
		let types = self.i32_table(&tags);
		let values = self.ptr_table(&values);
		self.raw_array(count, types, values)
	}

	/// Write an object of already written `(tag, name, address)` properties.
	pub fn object(&mut self, properties: &[(Tag, &str, u64)]) -> u64 {
		let tags: Vec<i32> = properties.iter().map(|(tag, _, _)| tag.code()).collect();
		let names: Vec<u64> = properties.iter().map(|(_, name, _)| self.string(name)).collect();
		let values: Vec<u64> = properties.iter().map(|(_, _, addr)| *addr).collect();
		let count = i32::try_from(properties.len()).unwrap_or(i32::MAX);
		let types = self.i32_table(&tags);
		let names = self.ptr_table(&names);
		let values = self.ptr_table(&values);
		self.raw_object(count, types, names, values)
	}

	/// Write a whole value tree and return its top-level tag and address.
	///
	/// [`Value::Null`] writes nothing and is addressed as `0`.
	pub fn value(&mut self, value: &Value) -> (Tag, u64) {
		let addr = match value {
			Value::Null => 0,
			Value::Bool(v) => self.boolean(*v),
			Value::Int32(v) => self.int32(*v),
			Value::UInt32(v) => self.uint32(*v),
			Value::Number(v) => self.number(*v),
			Value::Date(v) => self.date_millis(v.timestamp_millis() as f64),
			Value::String(v) => self.string(v),
			Value::Array(items) => {
				let written: Vec<(Tag, u64)> = items.iter().map(|item| self.value(item)).collect();
				self.array(&written)
			}
			Value::Object(object) => {
				let written: Vec<(Tag, Box<str>, u64)> = object
					.iter()
					.map(|property| {
						let (tag, addr) = self.value(&property.value);
						(tag, property.name.clone(), addr)
					})
					.collect();
				let borrowed: Vec<(Tag, &str, u64)> = written.iter().map(|(tag, name, addr)| (*tag, name.as_ref(), *addr)).collect();
				self.object(&borrowed)
			}
		};
		(value.tag(), addr)
	}
}

impl Default for ImageBuilder {
	fn default() -> Self {
		Self::native()
	}
}
