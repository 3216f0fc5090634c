use serde_json::{Map, Value as JsonValue};
use tagbridge::payload::{ObjectValue, Value, date_from_millis};

use crate::error::{CliError, Result};

/// Object key that marks a JSON object as a Date.
pub const DATE_KEY: &str = "$date";

/// Render a decoded value as JSON.
///
/// Dates become `{"$date": <epoch ms>}`; non-finite numbers become `null`.
pub fn value_to_json(value: &Value) -> JsonValue {
	match value {
		Value::Null => JsonValue::Null,
		Value::Bool(v) => serde_json::json!(v),
		Value::Int32(v) => serde_json::json!(v),
		Value::UInt32(v) => serde_json::json!(v),
		Value::Number(v) => serde_json::json!(v),
		Value::Date(v) => serde_json::json!({ DATE_KEY: v.timestamp_millis() }),
		Value::String(v) => JsonValue::String(v.to_string()),
		Value::Array(items) => JsonValue::Array(items.iter().map(value_to_json).collect()),
		Value::Object(object) => {
			let fields: Map<String, JsonValue> = object
				.iter()
				.map(|property| (property.name.to_string(), value_to_json(&property.value)))
				.collect();
			JsonValue::Object(fields)
		}
	}
}

/// Convert parsed JSON into a value the image builder can write.
///
/// Integers in `i32` range map to Int32, the rest of `u32` to UInt32, and
/// every other number to Number.
pub fn json_to_value(json: &JsonValue) -> Result<Value> {
	convert(json, "$")
}

fn convert(json: &JsonValue, path: &str) -> Result<Value> {
	Ok(match json {
		JsonValue::Null => Value::Null,
		JsonValue::Bool(v) => Value::Bool(*v),
		JsonValue::Number(number) => {
			if let Some(v) = number.as_i64().and_then(|v| i32::try_from(v).ok()) {
				Value::Int32(v)
			} else if let Some(v) = number.as_u64().and_then(|v| u32::try_from(v).ok()) {
				Value::UInt32(v)
			} else {
				Value::Number(number.as_f64().unwrap_or(f64::NAN))
			}
		}
		JsonValue::String(text) => Value::String(encodable_text(text, path)?.into()),
		JsonValue::Array(items) => Value::Array(
			items
				.iter()
				.enumerate()
				.map(|(idx, item)| convert(item, &format!("{path}[{idx}]")))
				.collect::<Result<_>>()?,
		),
		JsonValue::Object(fields) => {
			if let Some(date) = date_literal(fields, path)? {
				return Ok(date);
			}
			let mut object = ObjectValue::with_capacity(fields.len());
			for (name, item) in fields {
				let child = format!("{path}.{name}");
				encodable_text(name, &child)?;
				object.insert(name.as_str(), convert(item, &child)?);
			}
			Value::Object(object)
		}
	})
}

fn date_literal(fields: &Map<String, JsonValue>, path: &str) -> Result<Option<Value>> {
	if fields.len() != 1 {
		return Ok(None);
	}
	let Some(raw) = fields.get(DATE_KEY) else {
		return Ok(None);
	};
	let millis = raw.as_f64().ok_or_else(|| CliError::Unencodable {
		path: path.to_owned(),
		reason: "$date must be a number of epoch milliseconds",
	})?;
	Ok(Some(Value::Date(date_from_millis(millis)?)))
}

fn encodable_text<'a>(text: &'a str, path: &str) -> Result<&'a str> {
	if text.contains('\0') {
		return Err(CliError::Unencodable {
			path: path.to_owned(),
			reason: "strings are NUL-terminated on the wire",
		});
	}
	Ok(text)
}

#[cfg(test)]
mod tests;
