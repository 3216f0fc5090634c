#![allow(missing_docs)]

use tagbridge::bridge::bridge;
use tagbridge::debug::{debug_mode, set_debug_mode};

#[test]
fn env_seeds_flag_when_host_is_silent() {
	// SAFETY: this binary runs a single test, so no other thread reads the environment.
	unsafe { std::env::set_var("TAGBRIDGE_DEBUG", "on") };

	assert!(!debug_mode());
	assert_eq!(bridge().handle_count(), 0);
	assert!(debug_mode());

	set_debug_mode(false);
	assert_eq!(bridge().handle_count(), 0);
	assert!(!debug_mode());
}
