use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::payload::Tag;

/// Owned dynamic value produced by the decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Null tag, or a null string pointer.
	Null,
	/// Boolean tag.
	Bool(bool),
	/// Int32 tag.
	Int32(i32),
	/// UInt32 tag.
	UInt32(u32),
	/// Number tag.
	Number(f64),
	/// Date tag as an absolute UTC instant.
	Date(DateTime<Utc>),
	/// String tag.
	String(Box<str>),
	/// Array tag.
	Array(Vec<Value>),
	/// Object tag.
	Object(ObjectValue),
}

impl Value {
	/// Wire tag that encodes this value.
	pub fn tag(&self) -> Tag {
		match self {
			Self::Null => Tag::Null,
			Self::Bool(_) => Tag::Boolean,
			Self::Int32(_) => Tag::Int32,
			Self::UInt32(_) => Tag::UInt32,
			Self::Number(_) => Tag::Number,
			Self::Date(_) => Tag::Date,
			Self::String(_) => Tag::String,
			Self::Array(_) => Tag::Array,
			Self::Object(_) => Tag::Object,
		}
	}

	/// Whether this is [`Value::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Borrow string contents.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value),
			_ => None,
		}
	}

	/// Borrow array items.
	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Self::Array(items) => Some(items),
			_ => None,
		}
	}

	/// Borrow object properties.
	pub fn as_object(&self) -> Option<&ObjectValue> {
		match self {
			Self::Object(object) => Some(object),
			_ => None,
		}
	}

	/// Look up a property when this value is an object.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.as_object().and_then(|object| object.get(name))
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Self::Int32(value)
	}
}

impl From<u32> for Value {
	fn from(value: u32) -> Self {
		Self::UInt32(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.into())
	}
}

impl From<DateTime<Utc>> for Value {
	fn from(value: DateTime<Utc>) -> Self {
		Self::Date(value)
	}
}

/// Insertion-ordered string-keyed property bag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectValue {
	properties: Vec<Property>,
	index: HashMap<Box<str>, usize>,
}

/// One named property of an [`ObjectValue`].
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
	/// Property name.
	pub name: Box<str>,
	/// Property value.
	pub value: Value,
}

impl ObjectValue {
	/// Create an empty object.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create an empty object with room for `capacity` properties.
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			properties: Vec::with_capacity(capacity),
			index: HashMap::with_capacity(capacity),
		}
	}

	/// Set `name` to `value`.
	///
	/// A repeated name keeps its original position and takes the new value;
	/// the previous value is returned.
	pub fn insert(&mut self, name: impl Into<Box<str>>, value: Value) -> Option<Value> {
		let name = name.into();
		if let Some(&slot) = self.index.get(&name) {
			return Some(std::mem::replace(&mut self.properties[slot].value, value));
		}
		self.index.insert(name.clone(), self.properties.len());
		self.properties.push(Property { name, value });
		None
	}

	/// Look up a property by name.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.index.get(name).map(|slot| &self.properties[*slot].value)
	}

	/// Number of distinct properties.
	pub fn len(&self) -> usize {
		self.properties.len()
	}

	/// Whether no properties are set.
	pub fn is_empty(&self) -> bool {
		self.properties.is_empty()
	}

	/// Iterate properties in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = &Property> {
		self.properties.iter()
	}

	/// Property names in insertion order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.properties.iter().map(|item| item.name.as_ref())
	}
}

impl<K: Into<Box<str>>> FromIterator<(K, Value)> for ObjectValue {
	fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
		let mut object = Self::new();
		for (name, value) in iter {
			object.insert(name, value);
		}
		object
	}
}

#[cfg(test)]
mod tests;
