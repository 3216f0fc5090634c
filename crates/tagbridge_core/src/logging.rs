//! Tracing subscriber setup.
//!
//! Library code only emits `tracing` events. A subscriber is installed either
//! by the embedding host, by the CLI, or lazily by the bridge the first time
//! debug mode is switched on. Installation is attempted at most once per
//! process and never replaces a subscriber the host already set.

use once_cell::sync::OnceCell;
use tracing::Level;
use tracing_subscriber::filter::{EnvFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

use crate::config::{env_lookup, parse_flag};

/// Target of diagnostic messages that debug mode prints to standard output.
pub const DEBUG_TARGET: &str = "tagbridge::debug";

/// Filter used when `TAGBRIDGE_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "warn";

static INSTALLED: OnceCell<bool> = OnceCell::new();

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
	/// `EnvFilter` directives for diagnostic logs on standard error.
	pub filter: String,
	/// Emit standard-error logs as JSON lines.
	pub json: bool,
}

impl Default for LogConfig {
	fn default() -> Self {
		Self {
			filter: DEFAULT_FILTER.to_owned(),
			json: false,
		}
	}
}

impl LogConfig {
	/// Read `TAGBRIDGE_LOG` and `TAGBRIDGE_LOG_JSON`.
	pub fn from_env() -> Self {
		Self::from_lookup(env_lookup)
	}

	/// Build from an arbitrary variable lookup.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
		let mut config = Self::default();
		if let Some(filter) = lookup("TAGBRIDGE_LOG").filter(|value| !value.trim().is_empty()) {
			config.filter = filter;
		}
		if let Some(json) = lookup("TAGBRIDGE_LOG_JSON").as_deref().and_then(parse_flag) {
			config.json = json;
		}
		config
	}

	/// Override the filter directives.
	pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
		self.filter = filter.into();
		self
	}

	/// Toggle JSON output.
	pub fn with_json(mut self, json: bool) -> Self {
		self.json = json;
		self
	}

	fn env_filter(&self) -> EnvFilter {
		let filter = EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
		match format!("{DEBUG_TARGET}=off").parse() {
			Ok(directive) => filter.add_directive(directive),
			Err(_) => filter,
		}
	}
}

/// Install the process subscriber from the environment.
///
/// Returns `true` when this call (or an earlier one) installed the subscriber.
pub fn init() -> bool {
	init_with_config(&LogConfig::from_env())
}

/// Install the process subscriber with `config`.
///
/// Diagnostic logs go to standard error through `config.filter`; debug-mode
/// messages go to standard output. Only the first call has any effect.
pub fn init_with_config(config: &LogConfig) -> bool {
	*INSTALLED.get_or_init(|| {
		let general = if config.json {
			fmt::layer().json().with_writer(std::io::stderr).with_filter(config.env_filter()).boxed()
		} else {
			fmt::layer().with_writer(std::io::stderr).with_filter(config.env_filter()).boxed()
		};

		tracing_subscriber::registry().with(general).with(debug_layer()).try_init().is_ok()
	})
}

/// Install a subscriber that prints debug-mode messages and nothing else.
///
/// Used when debug mode is switched on before anyone installed a subscriber.
/// A later [`init`] is then a no-op.
pub(crate) fn init_debug_output() -> bool {
	*INSTALLED.get_or_init(|| tracing_subscriber::registry().with(debug_layer()).try_init().is_ok())
}

fn debug_targets() -> Targets {
	Targets::new().with_target(DEBUG_TARGET, Level::INFO)
}

fn debug_layer<S>() -> Box<dyn Layer<S> + Send + Sync>
where
	S: tracing::Subscriber + for<'span> LookupSpan<'span> + 'static,
{
	fmt::layer()
		.with_writer(std::io::stdout)
		.without_time()
		.with_level(false)
		.with_target(false)
		.with_filter(debug_targets())
		.boxed()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lookup_overrides_defaults() {
		let config = LogConfig::from_lookup(|key| match key {
			"TAGBRIDGE_LOG" => Some("bridge=debug".to_owned()),
			"TAGBRIDGE_LOG_JSON" => Some("yes".to_owned()),
			_ => None,
		});
		assert_eq!(config, LogConfig::default().with_filter("bridge=debug").with_json(true));
	}

	#[test]
	fn blank_filter_keeps_default() {
		let config = LogConfig::from_lookup(|key| (key == "TAGBRIDGE_LOG").then(|| "  ".to_owned()));
		assert_eq!(config, LogConfig::default());
	}

	#[test]
	fn debug_output_passes_only_debug_messages() {
		let targets = debug_targets();
		assert!(targets.would_enable(DEBUG_TARGET, &Level::INFO));
		assert!(!targets.would_enable("bridge", &Level::ERROR));
		assert!(!targets.would_enable("tagbridge::payload", &Level::WARN));
	}

	#[test]
	fn init_is_idempotent() {
		let first = init_with_config(&LogConfig::default());
		assert_eq!(init(), first);
	}
}
