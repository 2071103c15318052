//! Materialization of the Avro generic form into host values
//!
//! Dispatch is on the reader schema's top-level type. Record and variant
//! descriptors are discovered from the schema's full name through the
//! registry, so a decoded datum can be materialized with no descriptor in
//! hand; logical types on fixed and primitive schemas select the decoded
//! host representation.

use crate::{
	cache,
	de::DeError,
	descriptor::{self, ContainerShape, Descriptor},
	host::HostValue,
	schema::{LogicalType, RegularType, Schema, Union},
	value::Value,
};

use std::{collections::BTreeMap, sync::Arc};

/// How a union datum maps back onto its host descriptor
pub(crate) enum UnionPlan {
	/// The descriptor is an option: the null member decodes to `None`,
	/// the other member to `Some`
	Optional(Arc<Descriptor>),
	/// Member descriptors are discovered from member schema full names
	ByName,
}

/// Converts the items of a decoded array into the host-side container
pub(crate) type Coercer = Arc<dyn Fn(Vec<HostValue>) -> HostValue + Send + Sync>;

fn union_plan(descriptor: &Arc<Descriptor>) -> Arc<UnionPlan> {
	cache::union_plan(descriptor, || {
		Arc::new(match &**descriptor {
			Descriptor::Option(inner) => UnionPlan::Optional(inner.clone()),
			_ => UnionPlan::ByName,
		})
	})
}

fn coercer(descriptor: &Arc<Descriptor>) -> Coercer {
	cache::coercer(descriptor, || {
		let shape = match &**descriptor {
			Descriptor::Sequence(sequence) => sequence.shape,
			_ => ContainerShape::List,
		};
		Arc::new(move |items: Vec<HostValue>| match shape {
			ContainerShape::List | ContainerShape::Deque => HostValue::Sequence(shape, items),
			ContainerShape::Set => {
				let mut deduplicated: Vec<HostValue> = Vec::with_capacity(items.len());
				for item in items {
					if !deduplicated.contains(&item) {
						deduplicated.push(item);
					}
				}
				HostValue::Sequence(shape, deduplicated)
			}
		})
	})
}

/// Materialize a decoded value against its reader schema
///
/// `descriptor` is the declared host type when one is known from the
/// enclosing record; named schemas resolve their own descriptor from the
/// registry.
pub(crate) fn materialize(
	value: Value,
	schema: &Schema,
	descriptor: Option<&Arc<Descriptor>>,
) -> Result<HostValue, DeError> {
	match schema.type_ {
		RegularType::Null => match value {
			Value::Null => Ok(HostValue::Null),
			other => Err(shape_mismatch(&other, schema)),
		},
		RegularType::Boolean => match value {
			Value::Boolean(b) => Ok(HostValue::Boolean(b)),
			other => Err(shape_mismatch(&other, schema)),
		},
		RegularType::Int => match value {
			Value::Int(n) => Ok(wrap_newtype(
				match descriptor.map(|descriptor| &**descriptor) {
					Some(Descriptor::Long) => HostValue::Long(n.into()),
					_ => HostValue::Int(n),
				},
				schema,
			)),
			other => Err(shape_mismatch(&other, schema)),
		},
		RegularType::Long => match value {
			Value::Long(n) => Ok(wrap_newtype(HostValue::Long(n), schema)),
			Value::Int(n) => Ok(wrap_newtype(HostValue::Long(n.into()), schema)),
			other => Err(shape_mismatch(&other, schema)),
		},
		RegularType::Float => match value {
			Value::Float(n) => Ok(wrap_newtype(
				match descriptor.map(|descriptor| &**descriptor) {
					Some(Descriptor::Double) => HostValue::Double(n.into()),
					_ => HostValue::Float(n),
				},
				schema,
			)),
			other => Err(shape_mismatch(&other, schema)),
		},
		RegularType::Double => match value {
			Value::Double(n) => Ok(wrap_newtype(HostValue::Double(n), schema)),
			Value::Float(n) => Ok(wrap_newtype(HostValue::Double(n.into()), schema)),
			other => Err(shape_mismatch(&other, schema)),
		},
		RegularType::String => match value {
			Value::String(s) => Ok(wrap_newtype(HostValue::Str(s), schema)),
			other => Err(shape_mismatch(&other, schema)),
		},
		RegularType::Bytes => match value {
			Value::Bytes(bytes) => Ok(wrap_newtype(HostValue::Bytes(bytes), schema)),
			other => Err(shape_mismatch(&other, schema)),
		},
		RegularType::Fixed(_) => match value {
			Value::Fixed(_, bytes) | Value::Bytes(bytes) => materialize_fixed(bytes, schema),
			other => Err(shape_mismatch(&other, schema)),
		},
		RegularType::Enum(ref enum_) => {
			let symbol = match value {
				Value::Enum(_, symbol) => symbol,
				Value::String(symbol) => symbol,
				other => return Err(shape_mismatch(&other, schema)),
			};
			let enum_descriptor = match descriptor.map(|descriptor| &**descriptor) {
				Some(Descriptor::Enum(enum_descriptor)) => Some(enum_descriptor.clone()),
				_ => match descriptor::lookup(&enum_.name.fully_qualified()) {
					Some(found) => match &*found {
						Descriptor::Enum(enum_descriptor) => Some(enum_descriptor.clone()),
						_ => None,
					},
					None => None,
				},
			};
			match enum_descriptor {
				Some(enum_descriptor) => {
					if !enum_descriptor.symbols.iter().any(|s| *s == symbol) {
						return Err(DeError::msg(format_args!(
							"Symbol {symbol:?} is not part of host enum {:?}",
							enum_descriptor.name
						)));
					}
					Ok(HostValue::Enum {
						name: enum_descriptor.name.clone(),
						symbol,
					})
				}
				None => Ok(HostValue::Enum {
					name: enum_.name.fully_qualified(),
					symbol,
				}),
			}
		}
		RegularType::Array(ref array) => {
			let items = match value {
				Value::Array(items) => items,
				other => return Err(shape_mismatch(&other, schema)),
			};
			let item_descriptor = match descriptor.map(|descriptor| &**descriptor) {
				Some(Descriptor::Sequence(sequence)) => Some(sequence.item.clone()),
				_ => None,
			};
			let materialized = items
				.into_iter()
				.map(|item| materialize(item, &array.items, item_descriptor.as_ref()))
				.collect::<Result<Vec<_>, _>>()?;
			Ok(match descriptor {
				Some(descriptor) => coercer(descriptor)(materialized),
				None => HostValue::Sequence(ContainerShape::List, materialized),
			})
		}
		RegularType::Map(ref map) => {
			let entries = match value {
				Value::Map(entries) => entries,
				other => return Err(shape_mismatch(&other, schema)),
			};
			let value_descriptor = match descriptor.map(|descriptor| &**descriptor) {
				Some(Descriptor::Map(values)) => Some(values.clone()),
				_ => None,
			};
			entries
				.into_iter()
				.map(|(key, value)| {
					Ok((key, materialize(value, &map.values, value_descriptor.as_ref())?))
				})
				.collect::<Result<BTreeMap<_, _>, DeError>>()
				.map(HostValue::Map)
		}
		RegularType::Union(ref union) => materialize_union(value, union, descriptor),
		RegularType::Record(ref record) => {
			let entries = match value {
				Value::Record(entries) => entries,
				other => return Err(shape_mismatch(&other, schema)),
			};
			let full_name = record.name.fully_qualified();
			let record_descriptor = match descriptor::lookup(&full_name) {
				Some(found) => match &*found {
					Descriptor::Record(record_descriptor) => Some(record_descriptor.clone()),
					_ => None,
				},
				None => match descriptor.map(|descriptor| &**descriptor) {
					Some(Descriptor::Record(record_descriptor)) => {
						Some(record_descriptor.clone())
					}
					_ => None,
				},
			};
			let record_descriptor = match record_descriptor {
				Some(record_descriptor) => record_descriptor,
				// No host type is known for this record: keep the dynamic form
				None => {
					let fields = entries
						.into_iter()
						.map(|(_, value)| materialize_anonymous(value))
						.collect::<Result<Vec<_>, _>>()?;
					return Ok(HostValue::Record {
						name: full_name,
						fields,
					});
				}
			};
			if entries.len() != record.fields.len() {
				return Err(DeError::msg(format_args!(
					"Datum has {} fields but schema {:?} declares {}",
					entries.len(),
					record.name,
					record.fields.len()
				)));
			}
			if record_descriptor.fields.len() != record.fields.len() {
				return Err(DeError::msg(format_args!(
					"Host type {:?} declares {} fields but schema {:?} has {}",
					record_descriptor.name,
					record_descriptor.fields.len(),
					record.name,
					record.fields.len()
				)));
			}
			let mut arguments = Vec::with_capacity(entries.len());
			for ((_, value), (schema_field, field_descriptor)) in entries
				.into_iter()
				.zip(record.fields.iter().zip(&record_descriptor.fields))
			{
				arguments.push(materialize(
					value,
					&schema_field.schema,
					Some(&field_descriptor.descriptor),
				)?);
			}
			match record_descriptor.construct {
				Some(ref construct) => construct(arguments),
				None => Ok(HostValue::Record {
					name: record_descriptor.name.clone(),
					fields: arguments,
				}),
			}
		}
	}
}

fn materialize_union(
	value: Value,
	union: &Union,
	descriptor: Option<&Arc<Descriptor>>,
) -> Result<HostValue, DeError> {
	let plan = descriptor.map(union_plan);
	let (index, inner) = match value {
		Value::Union(index, inner) => (index as usize, *inner),
		// Resolution may have unwrapped the member; re-match it
		Value::Null => match union.null_index() {
			Some(index) => (index, Value::Null),
			None => return Err(DeError::new("Union has no null member for a null datum")),
		},
		other => {
			return Err(DeError::msg(format_args!(
				"Expected a union-indexed datum, got {other:?}"
			)))
		}
	};
	let member = union.variants.get(index).ok_or_else(|| {
		DeError::msg(format_args!(
			"Union member index {index} out of bounds ({} members)",
			union.variants.len()
		))
	})?;

	if let Some(plan) = plan {
		if let UnionPlan::Optional(ref item) = *plan {
			if union.is_optional() {
				return Ok(match member.type_ {
					RegularType::Null => HostValue::Optional(None),
					_ => HostValue::Optional(Some(Box::new(materialize(
						inner,
						member,
						Some(item),
					)?))),
				});
			}
		}
	}

	// Sealed-sum members carry their own host descriptor, found by name
	let member_descriptor = member
		.name()
		.and_then(|name| descriptor::lookup(&name.fully_qualified()));
	materialize(inner, member, member_descriptor.as_ref())
}

/// Materialize with no declared host type at all
fn materialize_anonymous(value: Value) -> Result<HostValue, DeError> {
	Ok(match value {
		Value::Null => HostValue::Null,
		Value::Boolean(b) => HostValue::Boolean(b),
		Value::Int(n) => HostValue::Int(n),
		Value::Long(n) => HostValue::Long(n),
		Value::Float(n) => HostValue::Float(n),
		Value::Double(n) => HostValue::Double(n),
		Value::Bytes(bytes) | Value::Fixed(_, bytes) => HostValue::Bytes(bytes),
		Value::String(s) => HostValue::Str(s),
		Value::Enum(_, symbol) => HostValue::Enum {
			name: String::new(),
			symbol,
		},
		Value::Union(_, inner) => materialize_anonymous(*inner)?,
		Value::Array(items) => HostValue::Sequence(
			ContainerShape::List,
			items
				.into_iter()
				.map(materialize_anonymous)
				.collect::<Result<Vec<_>, _>>()?,
		),
		Value::Map(entries) => HostValue::Map(
			entries
				.into_iter()
				.map(|(key, value)| Ok((key, materialize_anonymous(value)?)))
				.collect::<Result<BTreeMap<_, _>, DeError>>()?,
		),
		Value::Record(fields) => HostValue::Record {
			name: String::new(),
			fields: fields
				.into_iter()
				.map(|(_, value)| materialize_anonymous(value))
				.collect::<Result<Vec<_>, _>>()?,
		},
	})
}

/// Interpret fixed bytes per the schema's logical tag
fn materialize_fixed(bytes: Vec<u8>, schema: &Schema) -> Result<HostValue, DeError> {
	Ok(match schema.logical_type {
		Some(LogicalType::Int) => {
			HostValue::Int(bytes.iter().fold(0i64, |acc, &b| (acc << 8) | i64::from(b)) as i32)
		}
		Some(LogicalType::Long) => {
			HostValue::Long(bytes.iter().fold(0i64, |acc, &b| (acc << 8) | i64::from(b)))
		}
		Some(LogicalType::Text) => {
			let end = bytes
				.iter()
				.rposition(|&b| b != 0)
				.map_or(0, |position| position + 1);
			HostValue::Str(
				std::str::from_utf8(&bytes[..end])
					.map_err(|e| {
						DeError::msg(format_args!("Fixed string is not valid UTF-8: {e}"))
					})?
					.to_owned(),
			)
		}
		Some(LogicalType::Uuid) => HostValue::Uuid(
			uuid::Uuid::from_slice(&bytes)
				.map_err(|e| DeError::msg(format_args!("Fixed is not a valid UUID: {e}")))?,
		),
		// An unresolvable tag is not an error: keep the raw bytes
		Some(LogicalType::Named(_)) | None => HostValue::Bytes(bytes),
	})
}

/// A primitive tagged with a newtype name rebuilds the newtype when the
/// host type is registered, and stays the raw primitive when it is not
fn wrap_newtype(value: HostValue, schema: &Schema) -> HostValue {
	let name = match schema.logical_type {
		Some(LogicalType::Named(ref name)) => name,
		_ => return value,
	};
	match descriptor::lookup(name) {
		Some(found) if matches!(&*found, Descriptor::Newtype(_)) => HostValue::Newtype {
			name: name.clone(),
			value: Box::new(value),
		},
		_ => value,
	}
}

fn shape_mismatch(value: &Value, schema: &Schema) -> DeError {
	DeError::msg(format_args!(
		"Datum {value:?} does not have the shape of schema {schema:?}"
	))
}
