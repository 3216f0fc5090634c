use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::OnceLock;

use tagbridge_testkit::{fixture_path as shared_fixture_path, scratch_path as shared_scratch_path, target_dir as workspace_target_dir};

static TAGBRIDGE_BIN: OnceLock<PathBuf> = OnceLock::new();

pub(crate) fn fixture_path(name: &str) -> String {
	shared_fixture_path(name).to_string_lossy().into_owned()
}

pub(crate) fn scratch_path(name: &str) -> String {
	shared_scratch_path(name).to_string_lossy().into_owned()
}

pub(crate) fn run_tagbridge(args: &[&str]) -> Output {
	Command::new(tagbridge_bin()).args(args).output().expect("tagbridge command executes")
}

pub(crate) fn run_tagbridge_json(args: &[&str]) -> serde_json::Value {
	let output = run_tagbridge(args);
	assert!(
		output.status.success(),
		"tagbridge command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

/// Encode a fixture into a scratch image and return `(image path, encode report)`.
pub(crate) fn encode_fixture(fixture: &str, image_name: &str, extra: &[&str]) -> (String, serde_json::Value) {
	let input = fixture_path(fixture);
	let image = scratch_path(image_name);
	let mut args = vec!["encode", input.as_str(), "--out", image.as_str(), "--json"];
	args.extend_from_slice(extra);
	let report = run_tagbridge_json(&args);
	(image, report)
}

fn tagbridge_bin() -> &'static PathBuf {
	TAGBRIDGE_BIN.get_or_init(resolve_tagbridge_bin)
}

fn resolve_tagbridge_bin() -> PathBuf {
	if let Ok(path) = std::env::var("CARGO_BIN_EXE_tagbridge") {
		return PathBuf::from(path);
	}

	let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
	let target_dir = workspace_target_dir();

	let mut bin = target_dir.join("debug");
	bin.push(if cfg!(windows) { "tagbridge.exe" } else { "tagbridge" });

	let status = Command::new("cargo")
		.current_dir(&manifest_dir)
		.args(["build", "--quiet", "--bin", "tagbridge"])
		.status()
		.expect("cargo build executes");
	assert!(status.success(), "failed to build tagbridge binary at {}", bin.display());

	bin
}
