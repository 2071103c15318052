//! Parsing of standard Avro JSON schemas into [`Schema`]

use super::*;

use {serde::Deserialize, std::collections::HashMap};

impl std::str::FromStr for Schema {
	type Err = SchemaError;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let raw: RawSchema = serde_json::from_str(s).map_err(SchemaError::serde_json)?;
		let mut names = HashMap::new();
		build(&raw, None, &mut names)
	}
}

/// The JSON surface of a schema node: a type name (or named-type
/// reference), a union array, or a type object
#[derive(serde_derive::Deserialize)]
#[serde(untagged)]
enum RawSchema {
	Name(String),
	Union(Vec<RawSchema>),
	Object(Box<RawObject>),
}

#[derive(serde_derive::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawObject {
	#[serde(rename = "type")]
	type_: RawSchema,
	logical_type: Option<String>,
	/// For named types
	name: Option<String>,
	/// For named types
	namespace: Option<String>,
	/// For record type
	fields: Option<Vec<RawField>>,
	/// For enum type
	symbols: Option<Vec<String>>,
	/// For array type
	items: Option<RawSchema>,
	/// For map type
	values: Option<RawSchema>,
	/// For fixed type
	size: Option<usize>,
	#[serde(flatten)]
	other: BTreeMap<String, serde_json::Value>,
}

#[derive(serde_derive::Deserialize)]
struct RawField {
	name: String,
	#[serde(rename = "type")]
	type_: RawSchema,
	#[serde(default)]
	aliases: Option<Vec<String>>,
	#[serde(default)]
	doc: Option<String>,
	/// `Some(Value::Null)` and absent are distinct: `"default": null` is
	/// a valid default for a null-first union
	#[serde(default, deserialize_with = "json_present")]
	default: Option<serde_json::Value>,
}

fn json_present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	serde_json::Value::deserialize(deserializer).map(Some)
}

fn primitive(name: &str) -> Option<RegularType> {
	Some(match name {
		"null" => RegularType::Null,
		"boolean" => RegularType::Boolean,
		"int" => RegularType::Int,
		"long" => RegularType::Long,
		"float" => RegularType::Float,
		"double" => RegularType::Double,
		"bytes" => RegularType::Bytes,
		"string" => RegularType::String,
		_ => return None,
	})
}

/// Resolve a possibly-unqualified name against the enclosing namespace
fn qualify(name: &str, namespace: Option<&str>, enclosing: Option<&str>) -> Name {
	if name.contains('.') {
		Name::from_fully_qualified(name)
	} else {
		Name::new(
			name,
			namespace
				.or(enclosing)
				.filter(|namespace| !namespace.is_empty())
				.map(str::to_owned),
		)
	}
}

fn build(
	raw: &RawSchema,
	enclosing_namespace: Option<&str>,
	names: &mut HashMap<String, Schema>,
) -> Result<Schema, SchemaError> {
	match raw {
		RawSchema::Name(name) => match primitive(name) {
			Some(regular_type) => Ok(Schema::from(regular_type)),
			None => {
				let full = qualify(name, None, enclosing_namespace).fully_qualified();
				names.get(&full).cloned().ok_or_else(|| {
					SchemaError::msg(format_args!("Unknown schema reference: {full:?}"))
				})
			}
		},
		RawSchema::Union(members) => {
			let variants = members
				.iter()
				.map(|member| build(member, enclosing_namespace, names))
				.collect::<Result<Vec<_>, _>>()?;
			Ok(Schema::from(Union::new(variants)))
		}
		RawSchema::Object(object) => build_object(object, enclosing_namespace, names),
	}
}

fn build_object(
	object: &RawObject,
	enclosing_namespace: Option<&str>,
	names: &mut HashMap<String, Schema>,
) -> Result<Schema, SchemaError> {
	let type_name = match &object.type_ {
		RawSchema::Name(type_name) => type_name.as_str(),
		// An object whose `type` is itself an object or a union only
		// carries annotations: build the inner schema and re-attach them
		nested => {
			let inner = build(nested, enclosing_namespace, names)?;
			return Ok(annotate(inner.node().clone(), object));
		}
	};

	let regular_type = match type_name {
		"array" => {
			let items = object
				.items
				.as_ref()
				.ok_or_else(|| SchemaError::new("Array schema is missing `items`"))?;
			RegularType::Array(Array::new(build(items, enclosing_namespace, names)?))
		}
		"map" => {
			let values = object
				.values
				.as_ref()
				.ok_or_else(|| SchemaError::new("Map schema is missing `values`"))?;
			RegularType::Map(Map::new(build(values, enclosing_namespace, names)?))
		}
		"record" => {
			let name = named(object, enclosing_namespace, "record")?;
			let child_namespace = name.namespace().map(str::to_owned);
			let fields = object
				.fields
				.as_ref()
				.ok_or_else(|| SchemaError::new("Record schema is missing `fields`"))?
				.iter()
				.map(|raw_field| {
					let mut field = RecordField::new(
						raw_field.name.clone(),
						build(&raw_field.type_, child_namespace.as_deref(), names)?,
					);
					field.aliases = raw_field.aliases.clone().unwrap_or_default();
					field.doc = raw_field.doc.clone();
					field.default = raw_field.default.clone();
					Ok(field)
				})
				.collect::<Result<Vec<_>, SchemaError>>()?;
			RegularType::Record(Record::new(name, fields))
		}
		"enum" => {
			let name = named(object, enclosing_namespace, "enum")?;
			let symbols = object
				.symbols
				.clone()
				.ok_or_else(|| SchemaError::new("Enum schema is missing `symbols`"))?;
			RegularType::Enum(Enum::new(name, symbols))
		}
		"fixed" => {
			let name = named(object, enclosing_namespace, "fixed")?;
			let size = object
				.size
				.ok_or_else(|| SchemaError::new("Fixed schema is missing `size`"))?;
			RegularType::Fixed(Fixed::new(name, size))
		}
		other => match primitive(other) {
			Some(regular_type) => regular_type,
			None => {
				return build(
					&RawSchema::Name(other.to_owned()),
					enclosing_namespace,
					names,
				)
			}
		},
	};

	let schema = annotate(SchemaNode::new(regular_type), object);
	if let Some(name) = schema.name() {
		names.insert(name.fully_qualified(), schema.clone());
	}
	Ok(schema)
}

fn named(
	object: &RawObject,
	enclosing_namespace: Option<&str>,
	what: &str,
) -> Result<Name, SchemaError> {
	let name = object
		.name
		.as_deref()
		.ok_or_else(|| SchemaError::msg(format_args!("{what} schema is missing `name`")))?;
	Ok(qualify(name, object.namespace.as_deref(), enclosing_namespace))
}

fn annotate(mut node: SchemaNode, object: &RawObject) -> Schema {
	node.logical_type = object
		.logical_type
		.as_deref()
		.map(LogicalType::from_name)
		.or(node.logical_type);
	node.properties.extend(
		object
			.other
			.iter()
			.map(|(key, value)| (key.clone(), value.clone())),
	);
	Schema::new(node)
}
