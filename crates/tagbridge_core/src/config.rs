//! Environment-driven runtime configuration.

use crate::payload::DecodeOptions;

/// Settings for the process-wide bridge.
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
	/// Decoder limits applied to every invocation.
	pub decode: DecodeOptions,
	/// Initial debug-mode state.
	pub debug: bool,
}

impl BridgeConfig {
	/// Read `TAGBRIDGE_DEBUG`, `TAGBRIDGE_MAX_DEPTH`, `TAGBRIDGE_MAX_ELEMENTS`,
	/// and `TAGBRIDGE_MAX_STRING_LEN`.
	pub fn from_env() -> Self {
		Self::from_lookup(env_lookup)
	}

	/// Build from an arbitrary variable lookup.
	///
	/// Unparseable values are logged and ignored.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
		let mut config = Self::default();
		if let Some(debug) = read(&lookup, "TAGBRIDGE_DEBUG", parse_flag) {
			config.debug = debug;
		}
		if let Some(depth) = read(&lookup, "TAGBRIDGE_MAX_DEPTH", |value| value.parse::<u32>().ok()) {
			config.decode.max_depth = depth;
		}
		if let Some(count) = read(&lookup, "TAGBRIDGE_MAX_ELEMENTS", |value| value.parse::<usize>().ok()) {
			config.decode.max_elements = count;
		}
		if let Some(len) = read(&lookup, "TAGBRIDGE_MAX_STRING_LEN", |value| value.parse::<usize>().ok()) {
			config.decode.max_string_len = len;
		}
		config
	}
}

fn read<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
	let raw = lookup(key)?;
	let parsed = parse(raw.trim());
	if parsed.is_none() {
		tracing::warn!(target: "config", key, value = %raw, "ignoring invalid setting");
	}
	parsed
}

pub(crate) fn env_lookup(key: &str) -> Option<String> {
	std::env::var(key).ok()
}

/// Parse a boolean switch such as `1`, `true`, `on`, `0`, `false`, or `off`.
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Some(true),
		"0" | "false" | "no" | "off" | "" => Some(false),
		_ => None,
	}
}
