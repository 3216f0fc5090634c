//! Process-wide debug-mode switch.
//!
//! Diagnostic messages from the bridge are written to standard output only
//! while debug mode is on. The flag is read on every resolution, so it is a
//! single atomic rather than part of [`crate::config::BridgeConfig`].
//!
//! The host decides. `TAGBRIDGE_DEBUG` only seeds the flag when the process
//! bridge starts and the host has not called [`set_debug_mode`] yet.

use std::sync::atomic::{AtomicU8, Ordering};

const UNSET: u8 = 0;
const OFF: u8 = 1;
const ON: u8 = 2;

static DEBUG_MODE: AtomicU8 = AtomicU8::new(UNSET);

const fn state(enabled: bool) -> u8 {
	if enabled { ON } else { OFF }
}

/// Turn diagnostic output on or off.
///
/// When no tracing subscriber is installed yet, turning debug mode on
/// installs one that only prints debug messages to standard output.
pub fn set_debug_mode(enabled: bool) {
	if enabled {
		crate::logging::init_debug_output();
	}
	DEBUG_MODE.store(state(enabled), Ordering::Release);
}

/// Seed the flag unless the host already set it.
pub(crate) fn seed_debug_mode(enabled: bool) -> bool {
	let seeded = DEBUG_MODE
		.compare_exchange(UNSET, state(enabled), Ordering::AcqRel, Ordering::Acquire)
		.is_ok();
	if seeded && enabled {
		crate::logging::init_debug_output();
	}
	seeded
}

/// Whether diagnostic output is on.
pub fn debug_mode() -> bool {
	DEBUG_MODE.load(Ordering::Acquire) == ON
}

/// Emit a diagnostic message when debug mode is on.
macro_rules! debug_message {
	($($arg:tt)*) => {
		if $crate::debug::debug_mode() {
			tracing::info!(target: $crate::logging::DEBUG_TARGET, $($arg)*);
		}
	};
}

pub(crate) use debug_message;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn explicit_setting_wins_over_seed() {
		set_debug_mode(false);
		assert!(!seed_debug_mode(true));
		assert!(!debug_mode());

		set_debug_mode(true);
		assert!(debug_mode());
		debug_message!("debug output {}", 1);
		assert!(!seed_debug_mode(false));
		assert!(debug_mode());

		set_debug_mode(false);
		assert!(!debug_mode());
	}
}
