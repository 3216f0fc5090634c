use tagbridge_testkit::fixture_json;

use crate::cmd::test_support::{encode_fixture, run_tagbridge, run_tagbridge_json};

fn decode_json(image: &str, report: &serde_json::Value, extra: &[&str]) -> serde_json::Value {
	let root = report["root"].as_str().expect("root");
	let tag = report["tag"].as_str().expect("tag");
	let base = report["base"].as_str().expect("base");
	let mut args = vec!["decode", image, "--root", root, "--tag", tag, "--base", base, "--json"];
	args.extend_from_slice(extra);
	run_tagbridge_json(&args)
}

#[test]
fn decode_reproduces_encoded_fixture() {
	let (image, report) = encode_fixture("service.json", "decode-native.img", &[]);
	let decoded = decode_json(&image, &report, &[]);

	assert_eq!(decoded["tag"], "Object");
	assert_eq!(decoded["root"], report["root"]);
	assert_eq!(decoded["value"], fixture_json("service.json"));
}

#[test]
fn decode_handles_narrow_big_endian_layout() {
	let layout = ["--pointer-size", "4", "--endian", "big", "--base", "0x20000"];
	let (image, report) = encode_fixture("service.json", "decode-be32.img", &layout);
	assert_eq!(report["pointer_size"], 4);

	let decoded = decode_json(&image, &report, &["--pointer-size", "4", "--endian", "big"]);
	assert_eq!(decoded["value"], fixture_json("service.json"));
}

#[test]
fn depth_limit_is_reported() {
	let (image, report) = encode_fixture("deep.json", "decode-deep.img", &[]);
	let root = report["root"].as_str().expect("root");
	let output = run_tagbridge(&["decode", &image, "--root", root, "--tag", "array", "--max-depth", "4"]);

	assert!(!output.status.success());
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("error: payload depth exceeded (max=4)"), "{stderr}");

	let decoded = decode_json(&image, &report, &["--max-depth", "9"]);
	assert_eq!(decoded["value"], fixture_json("deep.json"));
}

#[test]
fn unknown_tag_fails() {
	let (image, report) = encode_fixture("service.json", "decode-bad-tag.img", &[]);
	let root = report["root"].as_str().expect("root");
	let output = run_tagbridge(&["decode", &image, "--root", root, "--tag", "99"]);

	assert!(!output.status.success());
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("error: unsupported payload type: 99"), "{stderr}");
}

#[test]
fn root_outside_image_is_malformed() {
	let (image, _) = encode_fixture("service.json", "decode-oob.img", &[]);
	let output = run_tagbridge(&["decode", &image, "--root", "0x10", "--tag", "Object"]);

	assert!(!output.status.success());
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("error: read out of bounds at 0x0000000000000010"), "{stderr}");
}

#[test]
fn text_output_prints_tree() {
	let (image, report) = encode_fixture("service.json", "decode-text.img", &[]);
	let root = report["root"].as_str().expect("root");
	let output = run_tagbridge(&["decode", &image, "--root", root, "--tag", "3"]);
	assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains("tag: Object"), "{stdout}");
	assert!(stdout.contains("  name = \"edge-proxy\""), "{stdout}");
	assert!(stdout.contains("  quota = 4000000000u"), "{stdout}");
	assert!(stdout.contains("  started = 2023-11-14T22:13:20.000Z"), "{stdout}");
}
