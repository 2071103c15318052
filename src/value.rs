//! The Avro generic in-memory representation

use std::collections::BTreeMap;

/// Any valid Avro value, in the generic in-memory form the wire layer
/// reads and writes
///
/// Records are ordered name/value pairs indexed by field position, enums
/// carry their symbol position and name, unions carry the member index
/// that was (or will be) written. Maps are ordered so that equal values
/// encode to identical bytes.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
	/// A `null` Avro value.
	Null,
	/// A `boolean` Avro value.
	Boolean(bool),
	/// An `int` Avro value.
	Int(i32),
	/// A `long` Avro value.
	Long(i64),
	/// A `float` Avro value.
	Float(f32),
	/// A `double` Avro value.
	Double(f64),
	/// A `bytes` Avro value.
	Bytes(Vec<u8>),
	/// A `string` Avro value.
	String(String),
	/// A `fixed` Avro value: declared size and raw bytes.
	Fixed(usize, Vec<u8>),
	/// An `enum` Avro value: symbol position and symbol name.
	Enum(u32, String),
	/// A `union` Avro value: member index and member value.
	Union(u32, Box<Value>),
	/// An `array` Avro value.
	Array(Vec<Value>),
	/// A `map` Avro value.
	Map(BTreeMap<String, Value>),
	/// A `record` Avro value: field name/value pairs in field order.
	Record(Vec<(String, Value)>),
}

impl Value {
	/// The Avro JSON representation of this value, as used for record
	/// field defaults
	///
	/// Per the Avro specification, `bytes` and `fixed` defaults are
	/// strings whose code points are the byte values, and a union default
	/// is represented as a default of the union's first member (no
	/// wrapping).
	pub(crate) fn to_default_json(&self) -> serde_json::Value {
		use serde_json::Value as Json;
		match self {
			Value::Null => Json::Null,
			Value::Boolean(b) => Json::Bool(*b),
			Value::Int(n) => Json::from(*n),
			Value::Long(n) => Json::from(*n),
			Value::Float(n) => Json::from(f64::from(*n)),
			Value::Double(n) => Json::from(*n),
			Value::Bytes(bytes) | Value::Fixed(_, bytes) => {
				Json::String(bytes.iter().map(|&b| b as char).collect())
			}
			Value::String(s) => Json::String(s.clone()),
			Value::Enum(_, symbol) => Json::String(symbol.clone()),
			Value::Union(_, inner) => inner.to_default_json(),
			Value::Array(items) => {
				Json::Array(items.iter().map(Value::to_default_json).collect())
			}
			Value::Map(entries) => Json::Object(
				entries
					.iter()
					.map(|(key, value)| (key.clone(), value.to_default_json()))
					.collect(),
			),
			Value::Record(fields) => Json::Object(
				fields
					.iter()
					.map(|(name, value)| (name.clone(), value.to_default_json()))
					.collect(),
			),
		}
	}
}
