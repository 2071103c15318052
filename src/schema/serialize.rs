//! Rendering of a [`Schema`] as standard Avro JSON

use super::*;

use {
	serde_json::{json, Value as Json},
	std::collections::HashSet,
};

impl std::fmt::Display for Schema {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut emitted_names = HashSet::new();
		let json = json_value(self, &mut emitted_names);
		match serde_json::to_string(&json) {
			Ok(rendered) => f.write_str(&rendered),
			Err(_) => Err(std::fmt::Error),
		}
	}
}

fn json_value(schema: &Schema, emitted_names: &mut HashSet<String>) -> Json {
	// A named type is defined at its first occurrence and referenced by
	// full name afterwards
	if let Some(name) = schema.name() {
		let full = name.fully_qualified();
		if !emitted_names.insert(full.clone()) {
			return Json::String(full);
		}
	}

	let type_name = |name: &str| Json::String(name.to_owned());
	let mut object = serde_json::Map::new();
	match schema.type_ {
		RegularType::Null => object.insert("type".to_owned(), type_name("null")),
		RegularType::Boolean => object.insert("type".to_owned(), type_name("boolean")),
		RegularType::Int => object.insert("type".to_owned(), type_name("int")),
		RegularType::Long => object.insert("type".to_owned(), type_name("long")),
		RegularType::Float => object.insert("type".to_owned(), type_name("float")),
		RegularType::Double => object.insert("type".to_owned(), type_name("double")),
		RegularType::Bytes => object.insert("type".to_owned(), type_name("bytes")),
		RegularType::String => object.insert("type".to_owned(), type_name("string")),
		RegularType::Array(ref array) => {
			object.insert("type".to_owned(), type_name("array"));
			object.insert("items".to_owned(), json_value(&array.items, emitted_names))
		}
		RegularType::Map(ref map) => {
			object.insert("type".to_owned(), type_name("map"));
			object.insert("values".to_owned(), json_value(&map.values, emitted_names))
		}
		RegularType::Union(ref union) => {
			return Json::Array(
				union
					.variants
					.iter()
					.map(|variant| json_value(variant, emitted_names))
					.collect(),
			);
		}
		RegularType::Record(ref record) => {
			object.insert("type".to_owned(), type_name("record"));
			insert_name(&mut object, &record.name);
			object.insert(
				"fields".to_owned(),
				Json::Array(
					record
						.fields
						.iter()
						.map(|field| field_json(field, emitted_names))
						.collect(),
				),
			)
		}
		RegularType::Enum(ref enum_) => {
			object.insert("type".to_owned(), type_name("enum"));
			insert_name(&mut object, &enum_.name);
			object.insert("symbols".to_owned(), json!(enum_.symbols))
		}
		RegularType::Fixed(ref fixed) => {
			object.insert("type".to_owned(), type_name("fixed"));
			insert_name(&mut object, &fixed.name);
			object.insert("size".to_owned(), json!(fixed.size))
		}
	};

	if let Some(ref logical_type) = schema.logical_type {
		object.insert(
			"logicalType".to_owned(),
			Json::String(logical_type.as_str().to_owned()),
		);
	}
	for (key, value) in &schema.properties {
		object.insert(key.clone(), value.clone());
	}

	// A bare primitive renders as its type name
	if object.len() == 1 {
		if let Some(Json::String(only_type)) = object.get("type") {
			if primitive_name(&schema.type_).is_some() {
				return Json::String(only_type.clone());
			}
		}
	}
	Json::Object(object)
}

fn field_json(field: &RecordField, emitted_names: &mut HashSet<String>) -> Json {
	let mut object = serde_json::Map::new();
	object.insert("name".to_owned(), Json::String(field.name.clone()));
	object.insert("type".to_owned(), json_value(&field.schema, emitted_names));
	if !field.aliases.is_empty() {
		object.insert("aliases".to_owned(), json!(field.aliases));
	}
	if let Some(ref doc) = field.doc {
		object.insert("doc".to_owned(), Json::String(doc.clone()));
	}
	if let Some(ref default) = field.default {
		object.insert("default".to_owned(), default.clone());
	}
	Json::Object(object)
}

fn insert_name(object: &mut serde_json::Map<String, Json>, name: &Name) {
	object.insert("name".to_owned(), Json::String(name.name().to_owned()));
	if let Some(namespace) = name.namespace() {
		object.insert("namespace".to_owned(), Json::String(namespace.to_owned()));
	}
}

fn primitive_name(regular_type: &RegularType) -> Option<&'static str> {
	Some(match regular_type {
		RegularType::Null => "null",
		RegularType::Boolean => "boolean",
		RegularType::Int => "int",
		RegularType::Long => "long",
		RegularType::Float => "float",
		RegularType::Double => "double",
		RegularType::Bytes => "bytes",
		RegularType::String => "string",
		_ => return None,
	})
}
