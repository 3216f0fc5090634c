use chrono::DateTime;
use tagbridge::BridgeError;
use tagbridge::payload::{ObjectValue, Value};

use super::{json_to_value, value_to_json};
use crate::error::CliError;

#[test]
fn integers_pick_the_narrowest_tag() {
	let value = json_to_value(&serde_json::json!([-5, 2147483647, 2147483648_u64, 4294967296_u64, 1.5, -2147483649_i64])).expect("convert");
	assert_eq!(
		value,
		Value::Array(vec![
			Value::Int32(-5),
			Value::Int32(i32::MAX),
			Value::UInt32(2_147_483_648),
			Value::Number(4_294_967_296.0),
			Value::Number(1.5),
			Value::Number(-2_147_483_649.0),
		])
	);
}

#[test]
fn date_literal_becomes_date() {
	let value = json_to_value(&serde_json::json!({ "$date": 1_700_000_000_000_i64 })).expect("convert");
	let expected = DateTime::from_timestamp_millis(1_700_000_000_000).expect("valid instant");
	assert_eq!(value, Value::Date(expected));
	assert_eq!(value_to_json(&value), serde_json::json!({ "$date": 1_700_000_000_000_i64 }));
}

#[test]
fn date_key_with_siblings_is_a_plain_object() {
	let value = json_to_value(&serde_json::json!({ "$date": 1, "other": true })).expect("convert");
	assert_eq!(value.as_object().map(ObjectValue::len), Some(2));
}

#[test]
fn bad_date_literals_fail() {
	let err = json_to_value(&serde_json::json!({ "when": { "$date": "soon" } })).expect_err("string date");
	assert!(matches!(err, CliError::Unencodable { ref path, .. } if path == "$.when"));

	let err = json_to_value(&serde_json::json!({ "$date": 1e300 })).expect_err("out of range");
	assert!(matches!(err, CliError::Bridge(BridgeError::InvalidDate { .. })));
}

#[test]
fn nul_in_text_is_rejected() {
	let err = json_to_value(&serde_json::json!({ "list": ["ok", "bad\u{0}"] })).expect_err("nul");
	assert!(matches!(err, CliError::Unencodable { ref path, .. } if path == "$.list[1]"));
}

#[test]
fn object_order_is_preserved() {
	let json = serde_json::json!({ "zeta": 1, "alpha": null, "mid": "x" });
	let value = json_to_value(&json).expect("convert");
	let keys: Vec<&str> = value.as_object().expect("object").keys().collect();
	assert_eq!(keys, ["zeta", "alpha", "mid"]);
	assert_eq!(value_to_json(&value), json);
}

#[test]
fn non_finite_numbers_render_as_null() {
	assert_eq!(value_to_json(&Value::Number(f64::NAN)), serde_json::Value::Null);
	assert_eq!(value_to_json(&Value::UInt32(u32::MAX)), serde_json::json!(4294967295_u64));
}
