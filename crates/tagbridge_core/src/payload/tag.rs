use crate::{BridgeError, Result};

/// Wire discriminator selecting how the bytes at an address are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Tag {
	/// Callable reference; not decodable as a value.
	Function = 1,
	/// Raw byte buffer; not decodable as a value.
	Buffer = 2,
	/// `{ count, types, values }` sequence header.
	Array = 3,
	/// 8-byte double holding milliseconds since the Unix epoch.
	Date = 4,
	/// `{ count, types, names, values }` property header.
	Object = 5,
	/// NUL-terminated byte string.
	String = 6,
	/// One byte, nonzero is true.
	Boolean = 7,
	/// 4-byte signed integer.
	Int32 = 8,
	/// 4-byte integer reinterpreted as unsigned.
	UInt32 = 9,
	/// 8-byte IEEE-754 double.
	Number = 10,
	/// No payload bytes.
	Null = 11,
}

impl Tag {
	/// Every defined tag in wire order.
	pub const ALL: [Tag; 11] = [
		Tag::Function,
		Tag::Buffer,
		Tag::Array,
		Tag::Date,
		Tag::Object,
		Tag::String,
		Tag::Boolean,
		Tag::Int32,
		Tag::UInt32,
		Tag::Number,
		Tag::Null,
	];

	/// Raw wire value.
	pub fn code(self) -> i32 {
		self as i32
	}

	/// Stable label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Function => "Function",
			Self::Buffer => "Buffer",
			Self::Array => "Array",
			Self::Date => "Date",
			Self::Object => "Object",
			Self::String => "String",
			Self::Boolean => "Boolean",
			Self::Int32 => "Int32",
			Self::UInt32 => "UInt32",
			Self::Number => "Number",
			Self::Null => "Null",
		}
	}

	/// Parse a label (case-insensitive) or a decimal wire value.
	pub fn parse(input: &str) -> Result<Self> {
		if let Ok(code) = input.parse::<i32>() {
			return Self::try_from(code);
		}
		Self::ALL
			.into_iter()
			.find(|tag| tag.as_str().eq_ignore_ascii_case(input))
			.ok_or_else(|| BridgeError::InvalidTagLiteral { value: input.to_owned() })
	}
}

impl TryFrom<i32> for Tag {
	type Error = BridgeError;

	fn try_from(value: i32) -> Result<Self> {
		Ok(match value {
			1 => Self::Function,
			2 => Self::Buffer,
			3 => Self::Array,
			4 => Self::Date,
			5 => Self::Object,
			6 => Self::String,
			7 => Self::Boolean,
			8 => Self::Int32,
			9 => Self::UInt32,
			10 => Self::Number,
			11 => Self::Null,
			tag => return Err(BridgeError::UnsupportedTag { tag }),
		})
	}
}

impl std::fmt::Display for Tag {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
