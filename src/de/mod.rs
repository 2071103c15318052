//! The Avro binary decoder for the generic form
//!
//! Decodes a datum against the schema it was written with, and optionally
//! performs standard Avro schema resolution against a distinct reader
//! schema: primitive promotions, union re-matching, record field matching
//! by name and aliases with defaults for missing fields, enum symbol
//! re-mapping. Nothing beyond what the Avro specification's resolution
//! rules allow.

mod error;

pub use error::DeError;

use crate::{
	schema::{RegularType, Schema},
	value::Value,
};

use {integer_encoding::VarIntReader, std::collections::BTreeMap, std::io::Read};

/// Decode a single datum from `reader`
///
/// The datum is decoded with `writer_schema`; when `reader_schema` is
/// supplied and differs, the decoded value is resolved to it.
pub fn read_datum<R: Read>(
	reader: &mut R,
	writer_schema: &Schema,
	reader_schema: Option<&Schema>,
) -> Result<Value, DeError> {
	let value = decode(reader, writer_schema)?;
	match reader_schema {
		Some(reader_schema) if reader_schema != writer_schema => resolve(value, reader_schema),
		_ => Ok(value),
	}
}

fn decode<R: Read>(reader: &mut R, schema: &Schema) -> Result<Value, DeError> {
	match schema.type_ {
		RegularType::Null => Ok(Value::Null),
		RegularType::Boolean => match read_byte(reader)? {
			0 => Ok(Value::Boolean(false)),
			1 => Ok(Value::Boolean(true)),
			other => Err(DeError::msg(format_args!(
				"Invalid boolean byte: {other:#x}"
			))),
		},
		RegularType::Int => reader.read_varint::<i32>().map_err(DeError::io).map(Value::Int),
		RegularType::Long => reader
			.read_varint::<i64>()
			.map_err(DeError::io)
			.map(Value::Long),
		RegularType::Float => {
			let mut buf = [0u8; 4];
			reader.read_exact(&mut buf).map_err(DeError::io)?;
			Ok(Value::Float(f32::from_le_bytes(buf)))
		}
		RegularType::Double => {
			let mut buf = [0u8; 8];
			reader.read_exact(&mut buf).map_err(DeError::io)?;
			Ok(Value::Double(f64::from_le_bytes(buf)))
		}
		RegularType::Bytes => read_len_prefixed(reader).map(Value::Bytes),
		RegularType::String => {
			let bytes = read_len_prefixed(reader)?;
			String::from_utf8(bytes)
				.map_err(|e| DeError::msg(format_args!("String is not valid UTF-8: {e}")))
				.map(Value::String)
		}
		RegularType::Fixed(ref fixed) => {
			let mut bytes = vec![0u8; fixed.size];
			reader.read_exact(&mut bytes).map_err(DeError::io)?;
			Ok(Value::Fixed(fixed.size, bytes))
		}
		RegularType::Enum(ref enum_) => {
			let position: i32 = reader.read_varint().map_err(DeError::io)?;
			let symbol = usize::try_from(position)
				.ok()
				.and_then(|position| enum_.symbols.get(position))
				.ok_or_else(|| {
					DeError::msg(format_args!(
						"Enum position {position} out of bounds for {:?}",
						enum_.name
					))
				})?;
			Ok(Value::Enum(position as u32, symbol.clone()))
		}
		RegularType::Union(ref union) => {
			let index: i64 = reader.read_varint().map_err(DeError::io)?;
			let member = usize::try_from(index)
				.ok()
				.and_then(|index| union.variants.get(index))
				.ok_or_else(|| {
					DeError::msg(format_args!(
						"Union member index {index} out of bounds ({} members)",
						union.variants.len()
					))
				})?;
			Ok(Value::Union(index as u32, Box::new(decode(reader, member)?)))
		}
		RegularType::Array(ref array) => {
			let mut items = Vec::new();
			loop {
				let count = read_block_count(reader)?;
				if count == 0 {
					break;
				}
				items.reserve(count);
				for _ in 0..count {
					items.push(decode(reader, &array.items)?);
				}
			}
			Ok(Value::Array(items))
		}
		RegularType::Map(ref map) => {
			let mut entries = BTreeMap::new();
			loop {
				let count = read_block_count(reader)?;
				if count == 0 {
					break;
				}
				for _ in 0..count {
					let key_bytes = read_len_prefixed(reader)?;
					let key = String::from_utf8(key_bytes).map_err(|e| {
						DeError::msg(format_args!("Map key is not valid UTF-8: {e}"))
					})?;
					entries.insert(key, decode(reader, &map.values)?);
				}
			}
			Ok(Value::Map(entries))
		}
		RegularType::Record(ref record) => {
			let mut fields = Vec::with_capacity(record.fields.len());
			for field in &record.fields {
				fields.push((field.name.clone(), decode(reader, &field.schema)?));
			}
			Ok(Value::Record(fields))
		}
	}
}

fn read_byte<R: Read>(reader: &mut R) -> Result<u8, DeError> {
	let mut buf = [0u8; 1];
	reader.read_exact(&mut buf).map_err(DeError::io)?;
	Ok(buf[0])
}

fn read_len_prefixed<R: Read>(reader: &mut R) -> Result<Vec<u8>, DeError> {
	let len: i64 = reader.read_varint().map_err(DeError::io)?;
	let len = usize::try_from(len)
		.map_err(|_| DeError::msg(format_args!("Negative length prefix: {len}")))?;
	let mut bytes = vec![0u8; len];
	reader.read_exact(&mut bytes).map_err(DeError::io)?;
	Ok(bytes)
}

/// A negative block count carries the block byte size after it
fn read_block_count<R: Read>(reader: &mut R) -> Result<usize, DeError> {
	let count: i64 = reader.read_varint().map_err(DeError::io)?;
	let count = if count < 0 {
		let _block_byte_size: i64 = reader.read_varint().map_err(DeError::io)?;
		count
			.checked_neg()
			.ok_or_else(|| DeError::new("Invalid block count"))?
	} else {
		count
	};
	usize::try_from(count).map_err(|_| DeError::new("Invalid block count"))
}

/// Resolve a decoded value to a distinct reader schema, per the Avro
/// specification's schema resolution rules
fn resolve(value: Value, reader: &Schema) -> Result<Value, DeError> {
	// A union-typed writer value resolving against a non-union reader
	// resolves its member value directly
	let value = match (value, &reader.type_) {
		(value @ Value::Union(..), RegularType::Union(_)) => value,
		(Value::Union(_, inner), _) => *inner,
		(value, _) => value,
	};

	match reader.type_ {
		RegularType::Null => match value {
			Value::Null => Ok(Value::Null),
			other => Err(mismatch(&other, reader)),
		},
		RegularType::Boolean => match value {
			Value::Boolean(b) => Ok(Value::Boolean(b)),
			other => Err(mismatch(&other, reader)),
		},
		RegularType::Int => match value {
			Value::Int(n) => Ok(Value::Int(n)),
			other => Err(mismatch(&other, reader)),
		},
		RegularType::Long => match value {
			Value::Int(n) => Ok(Value::Long(n.into())),
			Value::Long(n) => Ok(Value::Long(n)),
			other => Err(mismatch(&other, reader)),
		},
		RegularType::Float => match value {
			Value::Int(n) => Ok(Value::Float(n as f32)),
			Value::Long(n) => Ok(Value::Float(n as f32)),
			Value::Float(n) => Ok(Value::Float(n)),
			other => Err(mismatch(&other, reader)),
		},
		RegularType::Double => match value {
			Value::Int(n) => Ok(Value::Double(n.into())),
			Value::Long(n) => Ok(Value::Double(n as f64)),
			Value::Float(n) => Ok(Value::Double(n.into())),
			Value::Double(n) => Ok(Value::Double(n)),
			other => Err(mismatch(&other, reader)),
		},
		RegularType::Bytes => match value {
			Value::Bytes(bytes) => Ok(Value::Bytes(bytes)),
			Value::String(s) => Ok(Value::Bytes(s.into_bytes())),
			other => Err(mismatch(&other, reader)),
		},
		RegularType::String => match value {
			Value::String(s) => Ok(Value::String(s)),
			Value::Bytes(bytes) => String::from_utf8(bytes)
				.map_err(|e| DeError::msg(format_args!("Bytes are not valid UTF-8: {e}")))
				.map(Value::String),
			other => Err(mismatch(&other, reader)),
		},
		RegularType::Fixed(ref fixed) => match value {
			Value::Fixed(size, bytes) if size == fixed.size => Ok(Value::Fixed(size, bytes)),
			other => Err(mismatch(&other, reader)),
		},
		RegularType::Enum(ref enum_) => match value {
			Value::Enum(_, symbol) | Value::String(symbol) => {
				let position = enum_
					.symbols
					.iter()
					.position(|candidate| *candidate == symbol)
					.ok_or_else(|| {
						DeError::msg(format_args!(
							"Symbol {symbol:?} is not part of enum {:?}",
							enum_.name
						))
					})?;
				Ok(Value::Enum(position as u32, symbol))
			}
			other => Err(mismatch(&other, reader)),
		},
		RegularType::Union(ref union) => {
			let inner = match value {
				Value::Union(_, inner) => *inner,
				other => other,
			};
			union
				.variants
				.iter()
				.enumerate()
				.find_map(|(index, member)| {
					resolve(inner.clone(), member)
						.ok()
						.map(|resolved| Value::Union(index as u32, Box::new(resolved)))
				})
				.ok_or_else(|| {
					DeError::msg(format_args!(
						"Value {inner:?} matches no member of the reader union"
					))
				})
		}
		RegularType::Array(ref array) => match value {
			Value::Array(items) => items
				.into_iter()
				.map(|item| resolve(item, &array.items))
				.collect::<Result<Vec<_>, _>>()
				.map(Value::Array),
			other => Err(mismatch(&other, reader)),
		},
		RegularType::Map(ref map) => match value {
			Value::Map(entries) => entries
				.into_iter()
				.map(|(key, value)| Ok((key, resolve(value, &map.values)?)))
				.collect::<Result<BTreeMap<_, _>, DeError>>()
				.map(Value::Map),
			other => Err(mismatch(&other, reader)),
		},
		RegularType::Record(ref record) => match value {
			Value::Record(entries) => {
				let mut by_name: BTreeMap<String, Value> = entries.into_iter().collect();
				let mut fields = Vec::with_capacity(record.fields.len());
				for field in &record.fields {
					let written = by_name.remove(&field.name).or_else(|| {
						field
							.aliases
							.iter()
							.find_map(|alias| by_name.remove(alias))
					});
					let resolved = match written {
						Some(written) => resolve(written, &field.schema)?,
						None => match field.default {
							Some(ref default) => default_value(default, &field.schema)?,
							None => {
								return Err(DeError::msg(format_args!(
									"Writer value carries no field {:?} and the reader \
									 schema declares no default for it",
									field.name
								)))
							}
						},
					};
					fields.push((field.name.clone(), resolved));
				}
				Ok(Value::Record(fields))
			}
			other => Err(mismatch(&other, reader)),
		},
	}
}

/// Materialize an Avro JSON default against the schema it defaults
///
/// A union default belongs to the union's first member.
pub(crate) fn default_value(
	json: &serde_json::Value,
	schema: &Schema,
) -> Result<Value, DeError> {
	use serde_json::Value as Json;
	let bad = || {
		DeError::msg(format_args!(
			"Default {json} does not fit schema {schema:?}"
		))
	};
	match schema.type_ {
		RegularType::Null => match json {
			Json::Null => Ok(Value::Null),
			_ => Err(bad()),
		},
		RegularType::Boolean => json.as_bool().map(Value::Boolean).ok_or_else(bad),
		RegularType::Int => json
			.as_i64()
			.and_then(|n| i32::try_from(n).ok())
			.map(Value::Int)
			.ok_or_else(bad),
		RegularType::Long => json.as_i64().map(Value::Long).ok_or_else(bad),
		RegularType::Float => json.as_f64().map(|n| Value::Float(n as f32)).ok_or_else(bad),
		RegularType::Double => json.as_f64().map(Value::Double).ok_or_else(bad),
		RegularType::Bytes => json
			.as_str()
			.map(|s| Value::Bytes(s.chars().map(|c| c as u8).collect()))
			.ok_or_else(bad),
		RegularType::String => json
			.as_str()
			.map(|s| Value::String(s.to_owned()))
			.ok_or_else(bad),
		RegularType::Fixed(ref fixed) => {
			let bytes: Vec<u8> = json.as_str().ok_or_else(bad)?.chars().map(|c| c as u8).collect();
			if bytes.len() != fixed.size {
				return Err(bad());
			}
			Ok(Value::Fixed(fixed.size, bytes))
		}
		RegularType::Enum(ref enum_) => {
			let symbol = json.as_str().ok_or_else(bad)?;
			let position = enum_
				.symbols
				.iter()
				.position(|candidate| candidate == symbol)
				.ok_or_else(bad)?;
			Ok(Value::Enum(position as u32, symbol.to_owned()))
		}
		RegularType::Union(ref union) => {
			let first = union.variants.first().ok_or_else(bad)?;
			Ok(Value::Union(0, Box::new(default_value(json, first)?)))
		}
		RegularType::Array(ref array) => json
			.as_array()
			.ok_or_else(bad)?
			.iter()
			.map(|item| default_value(item, &array.items))
			.collect::<Result<Vec<_>, _>>()
			.map(Value::Array),
		RegularType::Map(ref map) => json
			.as_object()
			.ok_or_else(bad)?
			.iter()
			.map(|(key, value)| Ok((key.clone(), default_value(value, &map.values)?)))
			.collect::<Result<BTreeMap<_, _>, DeError>>()
			.map(Value::Map),
		RegularType::Record(ref record) => {
			let object = json.as_object().ok_or_else(bad)?;
			let mut fields = Vec::with_capacity(record.fields.len());
			for field in &record.fields {
				let field_json = match object.get(&field.name) {
					Some(field_json) => field_json,
					None => field.default.as_ref().ok_or_else(bad)?,
				};
				fields.push((field.name.clone(), default_value(field_json, &field.schema)?));
			}
			Ok(Value::Record(fields))
		}
	}
}

fn mismatch(value: &Value, reader: &Schema) -> DeError {
	DeError::msg(format_args!(
		"Writer value {value:?} cannot be resolved to reader schema {reader:?}"
	))
}
