//! The Avro binary encoder for the generic form
//!
//! Writes a [`Value`] against a [`Schema`] in the Avro binary encoding:
//! zig-zag varints for `int`/`long` and all length prefixes, little-endian
//! floats, block-encoded arrays and maps, the union member index as a
//! `long` before the member value. No framing, no header: just the datum.

mod error;

pub use error::SerError;

use crate::{
	schema::{RegularType, Schema},
	value::Value,
};

use {integer_encoding::VarIntWriter, std::io::Write};

/// Encode `value` against `schema` into `writer`
///
/// The writer is not flushed; buffering policy stays with the caller.
pub fn write_datum<W: Write>(
	value: &Value,
	schema: &Schema,
	writer: &mut W,
) -> Result<(), SerError> {
	match (&schema.type_, value) {
		(RegularType::Null, Value::Null) => Ok(()),
		(RegularType::Boolean, Value::Boolean(b)) => {
			writer.write_all(&[*b as u8]).map_err(SerError::io)
		}
		(RegularType::Int, Value::Int(n)) => {
			writer.write_varint(*n).map_err(SerError::io).map(drop)
		}
		(RegularType::Long, Value::Long(n)) => {
			writer.write_varint(*n).map_err(SerError::io).map(drop)
		}
		(RegularType::Long, Value::Int(n)) => writer
			.write_varint(i64::from(*n))
			.map_err(SerError::io)
			.map(drop),
		(RegularType::Float, Value::Float(n)) => {
			writer.write_all(&n.to_le_bytes()).map_err(SerError::io)
		}
		(RegularType::Double, Value::Double(n)) => {
			writer.write_all(&n.to_le_bytes()).map_err(SerError::io)
		}
		(RegularType::Bytes, Value::Bytes(bytes)) => write_len_prefixed(bytes, writer),
		(RegularType::String, Value::String(s)) => write_len_prefixed(s.as_bytes(), writer),
		(RegularType::Fixed(ref fixed), Value::Fixed(size, bytes)) => {
			if *size != fixed.size || bytes.len() != fixed.size {
				return Err(SerError::msg(format_args!(
					"Fixed value size {} does not match schema size {} for {:?}",
					bytes.len(),
					fixed.size,
					fixed.name
				)));
			}
			writer.write_all(bytes).map_err(SerError::io)
		}
		(RegularType::Fixed(ref fixed), Value::Bytes(bytes)) => {
			if bytes.len() != fixed.size {
				return Err(SerError::msg(format_args!(
					"Fixed value size {} does not match schema size {} for {:?}",
					bytes.len(),
					fixed.size,
					fixed.name
				)));
			}
			writer.write_all(bytes).map_err(SerError::io)
		}
		(RegularType::Enum(ref enum_), value) => {
			let position = match value {
				Value::Enum(position, symbol) => {
					match enum_.symbols.get(*position as usize) {
						Some(at_position) if at_position == symbol => *position as usize,
						// The position belongs to another schema: re-match on
						// the symbol
						_ => symbol_position(enum_, symbol)?,
					}
				}
				Value::String(symbol) => symbol_position(enum_, symbol)?,
				other => {
					return Err(SerError::msg(format_args!(
						"Expected an enum value for {:?}, got {other:?}",
						enum_.name
					)))
				}
			};
			writer
				.write_varint(position as i32)
				.map_err(SerError::io)
				.map(drop)
		}
		(RegularType::Union(ref union), Value::Union(index, inner)) => {
			let member = union.variants.get(*index as usize).ok_or_else(|| {
				SerError::msg(format_args!(
					"Union member index {index} out of bounds ({} members)",
					union.variants.len()
				))
			})?;
			writer
				.write_varint(i64::from(*index))
				.map_err(SerError::io)?;
			write_datum(inner, member, writer)
		}
		(RegularType::Union(ref union), Value::Null) => {
			let index = union
				.null_index()
				.ok_or_else(|| SerError::new("Union has no null member to hold a null value"))?;
			writer
				.write_varint(index as i64)
				.map_err(SerError::io)
				.map(drop)
		}
		(RegularType::Array(ref array), Value::Array(items)) => {
			if !items.is_empty() {
				writer
					.write_varint(items.len() as i64)
					.map_err(SerError::io)?;
				for item in items {
					write_datum(item, &array.items, writer)?;
				}
			}
			writer.write_varint(0i64).map_err(SerError::io).map(drop)
		}
		(RegularType::Map(ref map), Value::Map(entries)) => {
			if !entries.is_empty() {
				writer
					.write_varint(entries.len() as i64)
					.map_err(SerError::io)?;
				for (key, value) in entries {
					write_len_prefixed(key.as_bytes(), writer)?;
					write_datum(value, &map.values, writer)?;
				}
			}
			writer.write_varint(0i64).map_err(SerError::io).map(drop)
		}
		(RegularType::Record(ref record), Value::Record(fields)) => {
			if fields.len() != record.fields.len() {
				return Err(SerError::msg(format_args!(
					"Record value has {} fields but schema {:?} declares {}",
					fields.len(),
					record.name,
					record.fields.len()
				)));
			}
			for ((_, value), schema_field) in fields.iter().zip(&record.fields) {
				write_datum(value, &schema_field.schema, writer)?;
			}
			Ok(())
		}
		(_, value) => Err(SerError::msg(format_args!(
			"Value {value:?} does not fit schema {schema:?}"
		))),
	}
}

fn write_len_prefixed<W: Write>(bytes: &[u8], writer: &mut W) -> Result<(), SerError> {
	writer
		.write_varint(bytes.len() as i64)
		.map_err(SerError::io)?;
	writer.write_all(bytes).map_err(SerError::io)
}

fn symbol_position(enum_: &crate::schema::Enum, symbol: &str) -> Result<usize, SerError> {
	enum_
		.symbols
		.iter()
		.position(|candidate| candidate == symbol)
		.ok_or_else(|| {
			SerError::msg(format_args!(
				"Symbol {symbol:?} is not part of enum {:?}",
				enum_.name
			))
		})
}
