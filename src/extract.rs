//! Extraction of host values into the Avro generic form
//!
//! Dispatch is on the runtime shape of the [`HostValue`]; a union schema
//! hands the extractor the list of member schemas it is allowed to
//! resolve to, and the chosen member index is recorded on the produced
//! [`Value`].

use crate::{
	host::HostValue,
	schema::{Fixed, LogicalType, RegularType, Schema},
	ser::SerError,
	value::Value,
};

use std::collections::BTreeMap;

/// Produce the generic form of `value` against `schema`
pub(crate) fn extract(value: &HostValue, schema: &Schema) -> Result<Value, SerError> {
	// Newtype wrappers round-trip as their inner primitive
	let value = match value {
		HostValue::Newtype { value, .. } => &**value,
		value => value,
	};

	match (&schema.type_, value) {
		(RegularType::Union(ref union), value) => extract_union(value, &union.variants),
		(RegularType::Null, HostValue::Null | HostValue::Optional(None)) => Ok(Value::Null),
		(_, HostValue::Optional(Some(inner))) => extract(inner, schema),
		(RegularType::Boolean, HostValue::Boolean(b)) => Ok(Value::Boolean(*b)),
		(RegularType::Int, HostValue::Int(n)) => Ok(Value::Int(*n)),
		(RegularType::Long, HostValue::Int(n)) => Ok(Value::Long(i64::from(*n))),
		(RegularType::Long, HostValue::Long(n)) => Ok(Value::Long(*n)),
		(RegularType::Float, HostValue::Float(n)) => Ok(Value::Float(*n)),
		(RegularType::Float, HostValue::Int(n)) => Ok(Value::Float(*n as f32)),
		(RegularType::Double, HostValue::Double(n)) => Ok(Value::Double(*n)),
		(RegularType::Double, HostValue::Float(n)) => Ok(Value::Double(f64::from(*n))),
		(RegularType::Double, HostValue::Int(n)) => Ok(Value::Double(f64::from(*n))),
		(RegularType::Double, HostValue::Long(n)) => Ok(Value::Double(*n as f64)),
		(RegularType::String, HostValue::Str(s)) => Ok(Value::String(s.clone())),
		(RegularType::Bytes, HostValue::Bytes(bytes)) => Ok(Value::Bytes(bytes.clone())),
		(RegularType::Fixed(ref fixed), value) => extract_fixed(value, fixed),
		(RegularType::Array(ref array), HostValue::Sequence(_, items)) => items
			.iter()
			.map(|item| extract(item, &array.items))
			.collect::<Result<Vec<_>, _>>()
			.map(Value::Array),
		(RegularType::Map(ref map), HostValue::Map(entries)) => entries
			.iter()
			.map(|(key, value)| Ok((key.clone(), extract(value, &map.values)?)))
			.collect::<Result<BTreeMap<_, _>, SerError>>()
			.map(Value::Map),
		(RegularType::Enum(ref enum_), HostValue::Enum { symbol, .. }) => {
			let position = enum_
				.symbols
				.iter()
				.position(|candidate| candidate == symbol)
				.ok_or_else(|| {
					SerError::msg(format_args!(
						"Symbol {symbol:?} is not part of enum {:?}",
						enum_.name
					))
				})?;
			Ok(Value::Enum(position as u32, symbol.clone()))
		}
		(RegularType::Record(ref record), HostValue::Record { name, fields }) => {
			if fields.len() != record.fields.len() {
				return Err(SerError::msg(format_args!(
					"Record value {name:?} has {} fields but schema {:?} declares {}",
					fields.len(),
					record.name,
					record.fields.len()
				)));
			}
			fields
				.iter()
				.zip(&record.fields)
				.map(|(value, schema_field)| {
					Ok((
						schema_field.name.clone(),
						extract(value, &schema_field.schema)?,
					))
				})
				.collect::<Result<Vec<_>, SerError>>()
				.map(Value::Record)
		}
		(_, value) => Err(SerError::msg(format_args!(
			"Value {value:?} does not fit schema {schema:?}"
		))),
	}
}

/// Resolve `value` against the member schemas it is allowed to match,
/// recording the chosen member index
fn extract_union(value: &HostValue, members: &[Schema]) -> Result<Value, SerError> {
	let (index, member, value) = match value {
		HostValue::Null | HostValue::Optional(None) => {
			let index = members
				.iter()
				.position(|member| matches!(member.type_, RegularType::Null))
				.ok_or_else(|| SerError::new("Union has no null member to hold a null value"))?;
			return Ok(Value::Union(index as u32, Box::new(Value::Null)));
		}
		HostValue::Optional(Some(inner)) => {
			let (index, member) = select(inner, members)?;
			(index, member, &**inner)
		}
		value => {
			let (index, member) = select(value, members)?;
			(index, member, value)
		}
	};
	Ok(Value::Union(index as u32, Box::new(extract(value, member)?)))
}

/// The first member the value's runtime shape can resolve to
fn select<'s>(value: &HostValue, members: &'s [Schema]) -> Result<(usize, &'s Schema), SerError> {
	members
		.iter()
		.enumerate()
		.find(|(_, member)| matches(value, member))
		.ok_or_else(|| {
			SerError::msg(format_args!(
				"Value {value:?} does not match any member of the union"
			))
		})
}

fn matches(value: &HostValue, schema: &Schema) -> bool {
	match (value, &schema.type_) {
		(HostValue::Null | HostValue::Optional(None), RegularType::Null) => true,
		(HostValue::Optional(Some(inner)), _) => matches(inner, schema),
		(HostValue::Boolean(_), RegularType::Boolean) => true,
		(HostValue::Int(_), RegularType::Int | RegularType::Long) => true,
		(HostValue::Long(_), RegularType::Long) => true,
		(HostValue::Float(_), RegularType::Float | RegularType::Double) => true,
		(HostValue::Double(_), RegularType::Double) => true,
		(HostValue::Str(_), RegularType::String) => true,
		(HostValue::Str(_), RegularType::Fixed(_)) => true,
		(HostValue::Bytes(bytes), RegularType::Fixed(fixed)) => bytes.len() == fixed.size,
		(HostValue::Bytes(_), RegularType::Bytes) => true,
		(HostValue::Int(_), RegularType::Fixed(fixed)) => fixed.size == 4,
		(HostValue::Long(_), RegularType::Fixed(fixed)) => fixed.size == 8,
		(HostValue::Uuid(_), RegularType::Fixed(fixed)) => fixed.size == 16,
		(HostValue::Sequence(..), RegularType::Array(_)) => true,
		(HostValue::Map(_), RegularType::Map(_)) => true,
		(HostValue::Enum { name, symbol }, RegularType::Enum(enum_)) => {
			let stripped = name.strip_suffix(".Value").unwrap_or(name);
			enum_.name.fully_qualified() == stripped
				|| enum_.symbols.iter().any(|candidate| candidate == symbol)
		}
		(HostValue::Record { name, .. }, RegularType::Record(record)) => {
			record.name.fully_qualified() == *name
		}
		(HostValue::Newtype { name, value }, _) => match schema.logical_type {
			Some(LogicalType::Named(ref tagged)) => tagged == name,
			_ => matches(value, schema),
		},
		_ => false,
	}
}

/// Fixed-size encodings: big-endian integers, zero-padded strings, raw
/// 16-byte UUIDs
fn extract_fixed(value: &HostValue, fixed: &Fixed) -> Result<Value, SerError> {
	let bytes = match value {
		HostValue::Int(n) => {
			require_size(fixed, 4)?;
			n.to_be_bytes().to_vec()
		}
		HostValue::Long(n) => {
			require_size(fixed, 8)?;
			n.to_be_bytes().to_vec()
		}
		HostValue::Uuid(uuid) => {
			require_size(fixed, 16)?;
			uuid.as_bytes().to_vec()
		}
		HostValue::Str(s) => {
			if s.len() > fixed.size {
				return Err(SerError::msg(format_args!(
					"String of {} bytes does not fit fixed {:?} of {} bytes",
					s.len(),
					fixed.name,
					fixed.size
				)));
			}
			let mut bytes = s.as_bytes().to_vec();
			bytes.resize(fixed.size, 0);
			bytes
		}
		HostValue::Bytes(bytes) => {
			if bytes.len() != fixed.size {
				return Err(SerError::msg(format_args!(
					"Byte array of {} bytes does not fit fixed {:?} of {} bytes",
					bytes.len(),
					fixed.name,
					fixed.size
				)));
			}
			bytes.clone()
		}
		other => {
			return Err(SerError::msg(format_args!(
				"Value {other:?} does not fit fixed schema {:?}",
				fixed.name
			)))
		}
	};
	Ok(Value::Fixed(fixed.size, bytes))
}

fn require_size(fixed: &Fixed, required: usize) -> Result<(), SerError> {
	if fixed.size != required {
		return Err(SerError::msg(format_args!(
			"Fixed {:?} is declared {} bytes but the value requires {required}",
			fixed.name, fixed.size
		)));
	}
	Ok(())
}
