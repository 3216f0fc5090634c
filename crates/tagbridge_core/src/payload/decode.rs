use chrono::{DateTime, Utc};

use crate::payload::bytes::Cursor;
use crate::payload::value::{ObjectValue, Value};
use crate::payload::{PayloadMemory, Tag};
use crate::{BridgeError, Result};

/// Milliseconds of 0001-01-01T00:00:00Z relative to the Unix epoch.
const MIN_DATE_MILLIS: i64 = -62_135_596_800_000;
/// Milliseconds of 9999-12-31T23:59:59.999Z relative to the Unix epoch.
const MAX_DATE_MILLIS: i64 = 253_402_300_799_999;
/// Upper bound on speculative allocation for a single composite.
const PREALLOC_LIMIT: usize = 1024;

/// Runtime limits for payload decoding.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
	/// Maximum number of nested arrays/objects.
	pub max_depth: u32,
	/// Maximum element count of one array or object.
	pub max_elements: usize,
	/// Maximum byte length of one string, excluding the terminator.
	pub max_string_len: usize,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_depth: 64,
			max_elements: 1 << 20,
			max_string_len: 16 << 20,
		}
	}
}

/// Decode the payload at `addr` described by raw wire tag `tag`.
pub fn decode_payload<M: PayloadMemory + ?Sized>(memory: &M, addr: u64, tag: i32, opt: &DecodeOptions) -> Result<Value> {
	let tag = Tag::try_from(tag)?;
	decode_tagged(memory, addr, tag, opt)
}

/// Decode the payload at `addr` with an already validated tag.
pub fn decode_tagged<M: PayloadMemory + ?Sized>(memory: &M, addr: u64, tag: Tag, opt: &DecodeOptions) -> Result<Value> {
	let value = decode_impl(memory, addr, tag, opt, 0)?;
	tracing::trace!(target: "payload", tag = tag.as_str(), addr, "payload decoded");
	Ok(value)
}

fn decode_impl<M: PayloadMemory + ?Sized>(memory: &M, addr: u64, tag: Tag, opt: &DecodeOptions, depth: u32) -> Result<Value> {
	match tag {
		Tag::Null => Ok(Value::Null),
		Tag::String => decode_string(memory, addr, opt),
		Tag::Boolean => Ok(Value::Bool(read_scalar(memory, addr, 1)?.read_u8()? != 0)),
		Tag::Int32 => Ok(Value::Int32(read_scalar(memory, addr, 4)?.read_i32()?)),
		Tag::UInt32 => {
			let raw = read_scalar(memory, addr, 4)?.read_i32()?;
			Ok(Value::UInt32(raw as u32))
		}
		Tag::Number => Ok(Value::Number(read_scalar(memory, addr, 8)?.read_f64()?)),
		Tag::Date => {
			let millis = read_scalar(memory, addr, 8)?.read_f64()?;
			Ok(Value::Date(date_from_millis(millis)?))
		}
		Tag::Array => decode_array(memory, addr, opt, depth),
		Tag::Object => decode_object(memory, addr, opt, depth),
		Tag::Function | Tag::Buffer => Err(BridgeError::UnsupportedTag { tag: tag.code() }),
	}
}

fn read_scalar<M: PayloadMemory + ?Sized>(memory: &M, addr: u64, size: usize) -> Result<Cursor<'_>> {
	let bytes = memory.read(addr, size)?;
	Ok(Cursor::new(bytes, memory.layout()))
}

fn decode_string<M: PayloadMemory + ?Sized>(memory: &M, addr: u64, opt: &DecodeOptions) -> Result<Value> {
	if addr == 0 {
		return Ok(Value::Null);
	}
	Ok(Value::String(read_text(memory, addr, opt)?))
}

fn read_text<M: PayloadMemory + ?Sized>(memory: &M, addr: u64, opt: &DecodeOptions) -> Result<Box<str>> {
	let bytes = memory.read_cstr(addr, opt.max_string_len)?;
	Ok(String::from_utf8_lossy(bytes).into_owned().into_boxed_str())
}

/// Convert JS-style epoch milliseconds to a UTC instant.
///
/// Fractional milliseconds round to nearest, ties to even. The accepted range
/// is 0001-01-01 through 9999-12-31.
pub fn date_from_millis(millis: f64) -> Result<DateTime<Utc>> {
	let rounded = millis.round_ties_even();
	if !rounded.is_finite() || rounded < MIN_DATE_MILLIS as f64 || rounded > MAX_DATE_MILLIS as f64 {
		return Err(BridgeError::InvalidDate { millis });
	}
	DateTime::from_timestamp_millis(rounded as i64).ok_or(BridgeError::InvalidDate { millis })
}

struct CompositeHeader {
	count: usize,
	types: u64,
	names: u64,
	values: u64,
}

fn read_header<M: PayloadMemory + ?Sized>(memory: &M, addr: u64, tag: Tag, opt: &DecodeOptions) -> Result<CompositeHeader> {
	let layout = memory.layout();
	let with_names = tag == Tag::Object;
	let size = if with_names { layout.object_header_size() } else { layout.array_header_size() };

	let mut cursor = Cursor::new(memory.read(addr, size)?, layout);
	let raw_count = cursor.read_i32()?;
	cursor.align_ptr()?;
	let types = cursor.read_ptr()?;
	let names = if with_names { cursor.read_ptr()? } else { 0 };
	let values = cursor.read_ptr()?;

	let count = usize::try_from(raw_count).map_err(|_| BridgeError::NegativeCount {
		tag: tag.as_str(),
		count: raw_count,
		addr,
	})?;
	if count > opt.max_elements {
		return Err(BridgeError::TooManyElements {
			tag: tag.as_str(),
			count,
			max: opt.max_elements,
		});
	}

	Ok(CompositeHeader { count, types, names, values })
}

/// Read `count` tags and `count` pointers from each of `pointer_tables`.
fn read_tables<M: PayloadMemory + ?Sized>(memory: &M, count: usize, types: u64, pointer_tables: &[(u64, &'static str)]) -> Result<(Vec<i32>, Vec<Vec<u64>>)> {
	if count == 0 {
		return Ok((Vec::new(), vec![Vec::new(); pointer_tables.len()]));
	}

	let layout = memory.layout();
	if types == 0 {
		return Err(BridgeError::NullPointer { what: "element type table" });
	}
	let type_bytes = count.checked_mul(4).ok_or(BridgeError::AddressOverflow { addr: types, len: usize::MAX })?;
	let mut cursor = Cursor::new(memory.read(types, type_bytes)?, layout);
	let mut tags = Vec::with_capacity(count);
	for _ in 0..count {
		tags.push(cursor.read_i32()?);
	}

	let mut tables = Vec::with_capacity(pointer_tables.len());
	for &(table, what) in pointer_tables {
		if table == 0 {
			return Err(BridgeError::NullPointer { what });
		}
		let table_bytes = count
			.checked_mul(layout.pointer_size)
			.ok_or(BridgeError::AddressOverflow { addr: table, len: usize::MAX })?;
		let mut cursor = Cursor::new(memory.read(table, table_bytes)?, layout);
		let mut pointers = Vec::with_capacity(count);
		for _ in 0..count {
			pointers.push(cursor.read_ptr()?);
		}
		tables.push(pointers);
	}

	Ok((tags, tables))
}

fn decode_array<M: PayloadMemory + ?Sized>(memory: &M, addr: u64, opt: &DecodeOptions, depth: u32) -> Result<Value> {
	if depth >= opt.max_depth {
		return Err(BridgeError::DepthExceeded { max_depth: opt.max_depth });
	}

	let header = read_header(memory, addr, Tag::Array, opt)?;
	let (tags, tables) = read_tables(memory, header.count, header.types, &[(header.values, "array value table")])?;
	let values = &tables[0];

	let mut items = Vec::with_capacity(header.count.min(PREALLOC_LIMIT));
	for (raw_tag, value_ptr) in tags.iter().zip(values) {
		let tag = Tag::try_from(*raw_tag)?;
		items.push(decode_impl(memory, *value_ptr, tag, opt, depth + 1)?);
	}
	Ok(Value::Array(items))
}

fn decode_object<M: PayloadMemory + ?Sized>(memory: &M, addr: u64, opt: &DecodeOptions, depth: u32) -> Result<Value> {
	if depth >= opt.max_depth {
		return Err(BridgeError::DepthExceeded { max_depth: opt.max_depth });
	}

	let header = read_header(memory, addr, Tag::Object, opt)?;
	let (tags, tables) = read_tables(
		memory,
		header.count,
		header.types,
		&[(header.names, "property name table"), (header.values, "property value table")],
	)?;
	let (names, values) = (&tables[0], &tables[1]);

	let mut object = ObjectValue::with_capacity(header.count.min(PREALLOC_LIMIT));
	for ((raw_tag, name_ptr), value_ptr) in tags.iter().zip(names).zip(values) {
		if *name_ptr == 0 {
			return Err(BridgeError::NullPointer { what: "property name" });
		}
		let name = read_text(memory, *name_ptr, opt)?;
		let tag = Tag::try_from(*raw_tag)?;
		let value = decode_impl(memory, *value_ptr, tag, opt, depth + 1)?;
		object.insert(name, value);
	}
	Ok(Value::Object(object))
}
