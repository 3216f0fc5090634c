use chrono::DateTime;

use crate::payload::{ObjectValue, Tag, Value};

#[test]
fn repeated_key_keeps_position_and_takes_last_value() {
	let mut object = ObjectValue::new();
	assert!(object.insert("a", Value::Int32(1)).is_none());
	assert!(object.insert("b", Value::Bool(true)).is_none());
	let previous = object.insert("a", Value::Int32(2));

	assert_eq!(previous, Some(Value::Int32(1)));
	assert_eq!(object.len(), 2);
	assert_eq!(object.keys().collect::<Vec<_>>(), vec!["a", "b"]);
	assert_eq!(object.get("a"), Some(&Value::Int32(2)));
}

#[test]
fn from_iterator_applies_last_wins() {
	let object: ObjectValue = [("x", Value::from("first")), ("y", Value::Null), ("x", Value::from("second"))].into_iter().collect();

	assert_eq!(object.len(), 2);
	assert_eq!(object.get("x").and_then(Value::as_str), Some("second"));
	assert!(object.get("y").is_some_and(Value::is_null));
	assert!(object.get("z").is_none());
}

#[test]
fn value_tags_match_variants() {
	let epoch = DateTime::from_timestamp_millis(0).expect("epoch is representable");
	let cases = [
		(Value::Null, Tag::Null),
		(Value::from(true), Tag::Boolean),
		(Value::from(-1_i32), Tag::Int32),
		(Value::from(7_u32), Tag::UInt32),
		(Value::from(1.5_f64), Tag::Number),
		(Value::from(epoch), Tag::Date),
		(Value::from("s"), Tag::String),
		(Value::Array(Vec::new()), Tag::Array),
		(Value::Object(ObjectValue::new()), Tag::Object),
	];
	for (value, tag) in cases {
		assert_eq!(value.tag(), tag);
	}
}

#[test]
fn get_reaches_into_objects_only() {
	let object: ObjectValue = [("k", Value::from(3_i32))].into_iter().collect();
	let value = Value::Object(object);

	assert_eq!(value.get("k"), Some(&Value::Int32(3)));
	assert!(Value::Array(vec![Value::Null]).get("k").is_none());
}
