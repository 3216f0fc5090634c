use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Boxed error returned by a bound method.
pub type CalleeError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced while decoding payloads and resolving or invoking callables.
#[derive(Debug, Error)]
pub enum BridgeError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Tag outside the wire format, or a tag that is not decodable as a value.
	#[error("unsupported payload type: {tag}")]
	UnsupportedTag {
		/// Raw tag value.
		tag: i32,
	},
	/// Tag label did not name a wire tag.
	#[error("invalid tag literal: {value}")]
	InvalidTagLiteral {
		/// User-provided text.
		value: String,
	},
	/// Address was null where a readable region was required.
	#[error("null pointer for {what}")]
	NullPointer {
		/// Payload part that was being read.
		what: &'static str,
	},
	/// Read fell outside the mapped payload memory.
	#[error("read out of bounds at 0x{addr:016x}: need {need} bytes, mapped 0x{base:016x}..0x{end:016x}")]
	OutOfBounds {
		/// Address of the attempted read.
		addr: u64,
		/// Requested bytes.
		need: usize,
		/// First mapped address.
		base: u64,
		/// Exclusive end of mapped addresses.
		end: u64,
	},
	/// Address arithmetic overflowed.
	#[error("address overflow at 0x{addr:016x} + {len}")]
	AddressOverflow {
		/// Start address.
		addr: u64,
		/// Length added to the start address.
		len: usize,
	},
	/// Header cursor ran past the bytes it was given.
	#[error("unexpected end of header at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// No NUL terminator was found within the string limit.
	#[error("unterminated string at 0x{addr:016x} (scanned {scanned} bytes)")]
	UnterminatedString {
		/// Start address of the string.
		addr: u64,
		/// Bytes scanned before giving up.
		scanned: usize,
	},
	/// Composite header declared a negative element count.
	#[error("negative element count {count} in {tag} header at 0x{addr:016x}")]
	NegativeCount {
		/// Tag name of the composite.
		tag: &'static str,
		/// Declared count.
		count: i32,
		/// Header address.
		addr: u64,
	},
	/// Composite header declared more elements than allowed.
	#[error("element count {count} exceeds limit {max} in {tag} header")]
	TooManyElements {
		/// Tag name of the composite.
		tag: &'static str,
		/// Declared count.
		count: usize,
		/// Configured maximum.
		max: usize,
	},
	/// Date payload does not map to a representable instant.
	#[error("invalid date value {millis} ms")]
	InvalidDate {
		/// Raw milliseconds since the Unix epoch.
		millis: f64,
	},
	/// Memory layout declared an unsupported pointer width.
	#[error("unsupported pointer size {size} (expected 4 or 8)")]
	UnsupportedPointerSize {
		/// Declared pointer width in bytes.
		size: usize,
	},
	/// Composite nesting exceeded the configured limit.
	#[error("payload depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Resolution target was empty or not valid text.
	#[error("invalid call target: {reason}")]
	InvalidTarget {
		/// Description of the rejected input.
		reason: String,
	},
	/// Module loader could not provide the requested module.
	#[error("failed to load module '{module}': {reason}")]
	ModuleLoadFailed {
		/// Requested module identifier.
		module: String,
		/// Loader-provided reason.
		reason: String,
	},
	/// Module has no method with the requested type and name.
	#[error("method {type_name}.{method}() not found in module '{module}'")]
	MethodNotFound {
		/// Module identifier.
		module: String,
		/// Type name.
		type_name: String,
		/// Method name.
		method: String,
	},
	/// Method exists but cannot take a single payload argument.
	#[error("method {type_name}.{method}() takes {arity} parameters, expected 1")]
	MethodIncompatible {
		/// Type name.
		type_name: String,
		/// Method name.
		method: String,
		/// Declared parameter count.
		arity: usize,
	},
	/// Handle id is not registered.
	#[error("unknown callable handle {handle}")]
	UnknownHandle {
		/// Raw handle id.
		handle: u64,
	},
	/// Bound method returned an error.
	#[error("call to {target} failed: {source}")]
	CallFailed {
		/// Rendered `module:type.method` target.
		target: String,
		/// Error returned by the method.
		#[source]
		source: CalleeError,
	},
}

/// Coarse error classification used at the C ABI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// Unknown or non-value tag.
	UnsupportedTag,
	/// Module or method lookup failure.
	Resolution,
	/// Bad pointer, bounds, count, or scalar encoding.
	MalformedPayload,
	/// Recursion guard tripped.
	DepthExceeded,
	/// Unknown handle or failing callee.
	Invocation,
	/// Local IO failure.
	Io,
}

impl BridgeError {
	/// Classify this error.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Io(_) => ErrorKind::Io,
			Self::UnsupportedTag { .. } | Self::InvalidTagLiteral { .. } => ErrorKind::UnsupportedTag,
			Self::NullPointer { .. }
			| Self::OutOfBounds { .. }
			| Self::AddressOverflow { .. }
			| Self::UnexpectedEof { .. }
			| Self::UnterminatedString { .. }
			| Self::NegativeCount { .. }
			| Self::TooManyElements { .. }
			| Self::InvalidDate { .. }
			| Self::UnsupportedPointerSize { .. } => ErrorKind::MalformedPayload,
			Self::DepthExceeded { .. } => ErrorKind::DepthExceeded,
			Self::InvalidTarget { .. } | Self::ModuleLoadFailed { .. } | Self::MethodNotFound { .. } | Self::MethodIncompatible { .. } => {
				ErrorKind::Resolution
			}
			Self::UnknownHandle { .. } | Self::CallFailed { .. } => ErrorKind::Invocation,
		}
	}
}
