//! Schema inference from type descriptors, sample values and registered
//! names

use crate::{
	cache,
	descriptor::{self, Descriptor, FieldDescriptor, FixedHint},
	extract,
	host::HostValue,
	schema::{
		Array, Enum, Fixed, LogicalType, Map, Name, Record, RecordField, RegularType, Schema,
		SchemaError, SchemaNode, Union,
	},
};

use std::sync::Arc;

/// Infer the Avro schema of a descriptor
///
/// Memoized on the descriptor allocation: repeated inference of the same
/// descriptor is a thread-local map hit.
pub(crate) fn schema_for(descriptor: &Arc<Descriptor>) -> Result<Schema, SchemaError> {
	cache::schema(descriptor, || infer(descriptor))
}

/// Infer the Avro schema of a registered type by fully qualified name
pub(crate) fn schema_for_name(fully_qualified_name: &str) -> Result<Schema, SchemaError> {
	let descriptor = descriptor::lookup(fully_qualified_name).ok_or_else(|| {
		SchemaError::msg(format_args!(
			"No descriptor registered under {fully_qualified_name:?}"
		))
	})?;
	schema_for(&descriptor)
}

/// Infer an Avro schema from a sample value
///
/// Collections infer their element schema from their first element; named
/// values defer to their registered descriptor. An unregistered newtype
/// infers as its inner value tagged with the newtype's name.
pub(crate) fn schema_for_value(value: &HostValue) -> Result<Schema, SchemaError> {
	Ok(match value {
		HostValue::Null | HostValue::Optional(None) => RegularType::Null.into(),
		HostValue::Boolean(_) => RegularType::Boolean.into(),
		HostValue::Int(_) => RegularType::Int.into(),
		HostValue::Long(_) => RegularType::Long.into(),
		HostValue::Float(_) => RegularType::Float.into(),
		HostValue::Double(_) => RegularType::Double.into(),
		HostValue::Str(_) => RegularType::String.into(),
		HostValue::Bytes(_) => RegularType::Bytes.into(),
		HostValue::Uuid(_) => uuid_schema(),
		HostValue::Optional(Some(inner)) => Union::new(vec![
			RegularType::Null.into(),
			schema_for_value(inner)?,
		])
		.into(),
		HostValue::Sequence(_, items) => Array::new(match items.first() {
			Some(first) => schema_for_value(first)?,
			None => RegularType::Null.into(),
		})
		.into(),
		HostValue::Map(entries) => Map::new(match entries.values().next() {
			Some(first) => schema_for_value(first)?,
			None => RegularType::Null.into(),
		})
		.into(),
		HostValue::Enum { name, .. }
		| HostValue::Record { name, .. } => match descriptor::lookup(name) {
			Some(descriptor) => schema_for(&descriptor)?,
			None => {
				return Err(SchemaError::msg(format_args!(
					"No descriptor registered under {name:?}"
				)))
			}
		},
		HostValue::Newtype { name, value } => match descriptor::lookup(name) {
			Some(descriptor) => schema_for(&descriptor)?,
			None => {
				let inner = schema_for_value(value)?;
				Schema::new(SchemaNode {
					type_: inner.type_.clone(),
					logical_type: Some(LogicalType::Named(name.clone())),
					properties: inner.properties.clone(),
				})
			}
		},
	})
}

fn infer(descriptor: &Arc<Descriptor>) -> Result<Schema, SchemaError> {
	Ok(match &**descriptor {
		Descriptor::Null => RegularType::Null.into(),
		Descriptor::Boolean => RegularType::Boolean.into(),
		Descriptor::Int => RegularType::Int.into(),
		Descriptor::Long => RegularType::Long.into(),
		Descriptor::Float => RegularType::Float.into(),
		Descriptor::Double => RegularType::Double.into(),
		Descriptor::Str => RegularType::String.into(),
		Descriptor::Bytes => RegularType::Bytes.into(),
		Descriptor::Uuid => uuid_schema(),
		Descriptor::Option(inner) => Union::new(vec![
			RegularType::Null.into(),
			schema_for(inner)?,
		])
		.into(),
		Descriptor::Sequence(sequence) => Array::new(schema_for(&sequence.item)?).into(),
		Descriptor::Map(values) => Map::new(schema_for(values)?).into(),
		Descriptor::Enum(enum_) => {
			// Enumeration host types are conventionally named `<Type>.Value`;
			// the schema is named after the type itself
			let name = enum_.name.strip_suffix(".Value").unwrap_or(&enum_.name);
			RegularType::Enum(Enum::new(
				Name::from_fully_qualified(name),
				enum_.symbols.clone(),
			))
			.into()
		}
		Descriptor::Newtype(newtype) => {
			let inner = schema_for(&newtype.inner)?;
			match inner.type_ {
				RegularType::Boolean
				| RegularType::Int
				| RegularType::Long
				| RegularType::Float
				| RegularType::Double
				| RegularType::Bytes
				| RegularType::String => {}
				_ => {
					return Err(SchemaError::msg(format_args!(
						"Newtype {:?} must wrap a primitive",
						newtype.name
					)))
				}
			}
			Schema::new(SchemaNode {
				type_: inner.type_.clone(),
				logical_type: Some(LogicalType::Named(newtype.name.clone())),
				properties: inner.properties.clone(),
			})
		}
		Descriptor::Sum(sum) => {
			let mut variants: Vec<(u32, &Arc<Descriptor>)> = sum
				.variants
				.iter()
				.map(|(index, variant)| (*index, variant))
				.collect();
			variants.sort_by_key(|(index, _)| *index);
			if let Some(window) = variants.windows(2).find(|w| w[0].0 == w[1].0) {
				return Err(SchemaError::msg(format_args!(
					"Duplicate variant index {} on sum type {:?}",
					window[0].0, sum.name
				)));
			}
			let members = variants
				.into_iter()
				.map(|(_, variant)| schema_for(variant))
				.collect::<Result<Vec<_>, _>>()?;
			Union::new(members).into()
		}
		Descriptor::Record(record) => {
			let name = Name::from_fully_qualified(&record.name);
			let mut fields = Vec::with_capacity(record.fields.len());
			for (position, field) in record.fields.iter().enumerate() {
				if field.position != position {
					return Err(SchemaError::msg(format_args!(
						"Field {:?} of record {:?} declares position {} but sits at {}",
						field.name, record.name, field.position, position
					)));
				}
				fields.push(field_schema(&record.name, field)?);
			}
			RegularType::Record(Record::new(name, fields)).into()
		}
		Descriptor::Fixed(fixed) => {
			if let Some(required) = match fixed.logical {
				Some(LogicalType::Int) => Some(4),
				Some(LogicalType::Long) => Some(8),
				Some(LogicalType::Uuid) => Some(16),
				_ => None,
			} {
				if fixed.size != required {
					return Err(SchemaError::msg(format_args!(
						"Fixed type {:?} tagged {:?} must be {} bytes, not {}",
						fixed.name,
						fixed.logical.as_ref().map(LogicalType::as_str),
						required,
						fixed.size
					)));
				}
			}
			let node = RegularType::Fixed(Fixed::new(
				Name::from_fully_qualified(&fixed.name),
				fixed.size,
			));
			match fixed.logical.clone() {
				Some(logical) => Schema::new(SchemaNode::with_logical_type(node, logical)),
				None => node.into(),
			}
		}
	})
}

fn uuid_schema() -> Schema {
	Schema::new(SchemaNode::with_logical_type(
		RegularType::Fixed(Fixed::new(Name::new("UUID", None), 16)),
		LogicalType::Uuid,
	))
}

fn field_schema(record_name: &str, field: &FieldDescriptor) -> Result<RecordField, SchemaError> {
	let mut schema = match field.fixed {
		Some(hint) => fixed_field_schema(record_name, field, hint)?,
		None => schema_for(&field.descriptor)?,
	};

	let mut default_json = None;
	if let Some(produce_default) = &field.default {
		let default = produce_default();
		schema = adapt_for_default(schema, &default, &field.name)?;
		let generic = extract::extract(&default, &schema).map_err(|e| {
			SchemaError::msg(format_args!(
				"Default of field {:?} does not fit its schema: {e}",
				field.name
			))
		})?;
		default_json = Some(generic.to_default_json());
	}

	let mut record_field = RecordField::new(field.name.clone(), schema);
	record_field.aliases = field.aliases.clone();
	record_field.doc = field.doc.clone();
	record_field.default = default_json;
	Ok(record_field)
}

/// Fixed-size annotations override primitive inference: the byte size is
/// dictated by the type for int, long and uuid fields, and must be
/// user-supplied for string and bytes fields
fn fixed_field_schema(
	record_name: &str,
	field: &FieldDescriptor,
	hint: FixedHint,
) -> Result<Schema, SchemaError> {
	let missing_size = || {
		SchemaError::msg(format_args!(
			"Field {:?} of record {record_name:?} carries a fixed annotation with no size",
			field.name
		))
	};
	let (size, logical) = match &*field.descriptor {
		Descriptor::Int => (4, Some(LogicalType::Int)),
		Descriptor::Long => (8, Some(LogicalType::Long)),
		Descriptor::Uuid => (16, Some(LogicalType::Uuid)),
		Descriptor::Str => (hint.size.ok_or_else(missing_size)?, Some(LogicalType::Text)),
		Descriptor::Bytes => (hint.size.ok_or_else(missing_size)?, None),
		other => {
			return Err(SchemaError::msg(format_args!(
				"Field {:?} of record {record_name:?} cannot carry a fixed annotation: {other:?}",
				field.name
			)))
		}
	};
	let type_ = RegularType::Fixed(Fixed::new(Name::new(field.name.clone(), None), size));
	Ok(match logical {
		Some(logical) => Schema::new(SchemaNode::with_logical_type(type_, logical)),
		None => type_.into(),
	})
}

/// The Avro specification requires a union field's default to belong to
/// the union's first member: reorder the union so that the member
/// matching the default comes first
///
/// An empty map default selects the map member and an empty list default
/// the array member; any other default selects the member matching its
/// inferred schema. A non-empty seed collection re-infers the member's
/// element or value schema from its first element.
fn adapt_for_default(
	schema: Schema,
	default: &HostValue,
	field_name: &str,
) -> Result<Schema, SchemaError> {
	let union = match schema.type_ {
		RegularType::Union(ref union) => union,
		_ => return Ok(schema),
	};

	// A present optional selects the member its inner value matches
	let default = match default {
		HostValue::Optional(Some(inner)) => inner,
		other => other,
	};

	let position = default_member_position(union, default).ok_or_else(|| {
		SchemaError::msg(format_args!(
			"Default of field {field_name:?} matches no member of its union"
		))
	})?;

	let mut variants = union.variants.clone();
	let chosen = refine_from_seed(variants.remove(position), default)?;
	variants.insert(0, chosen);
	Ok(Union::new(variants).into())
}

fn default_member_position(
	union: &Union,
	default: &HostValue,
) -> Option<usize> {
	let position_of = |wanted: fn(&RegularType) -> bool| {
		union
			.variants
			.iter()
			.position(|member| wanted(&member.type_))
	};
	match default {
		HostValue::Map(entries) if entries.is_empty() => {
			position_of(|type_| matches!(type_, RegularType::Map(_)))
		}
		HostValue::Sequence(_, items) if items.is_empty() => {
			position_of(|type_| matches!(type_, RegularType::Array(_)))
		}
		HostValue::Null | HostValue::Optional(None) => {
			position_of(|type_| matches!(type_, RegularType::Null))
		}
		other => {
			let inferred = schema_for_value(other).ok()?;
			union
				.variants
				.iter()
				.position(|member| same_member_kind(member, &inferred))
		}
	}
}

fn same_member_kind(member: &Schema, inferred: &Schema) -> bool {
	match (&member.type_, &inferred.type_) {
		(RegularType::Record(a), RegularType::Record(b)) => a.name == b.name,
		(RegularType::Enum(a), RegularType::Enum(b)) => a.name == b.name,
		(RegularType::Fixed(a), RegularType::Fixed(b)) => a.size == b.size,
		(a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
	}
}

fn refine_from_seed(member: Schema, default: &HostValue) -> Result<Schema, SchemaError> {
	Ok(match (&member.type_, default) {
		(RegularType::Array(_), HostValue::Sequence(_, items)) => match items.first() {
			Some(first) => Array::new(schema_for_value(first)?).into(),
			None => member,
		},
		(RegularType::Map(_), HostValue::Map(entries)) => match entries.values().next() {
			Some(first) => Map::new(schema_for_value(first)?).into(),
			None => member,
		},
		_ => member,
	})
}
