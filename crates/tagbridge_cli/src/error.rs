use thiserror::Error;

/// CLI result type.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
	/// Decoder, layout, or tag failure from the library.
	#[error(transparent)]
	Bridge(#[from] tagbridge::BridgeError),
	/// Filesystem failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// JSON parse or render failure.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
	/// Address argument was not decimal or `0x` hex.
	#[error("invalid address literal: {value}")]
	InvalidAddress {
		/// User-provided text.
		value: String,
	},
	/// JSON input has no wire representation.
	#[error("cannot encode {path}: {reason}")]
	Unencodable {
		/// JSON path of the offending value.
		path: String,
		/// Why it cannot be written.
		reason: &'static str,
	},
}
