//! # A type-directed Avro codec
//!
//! Maps between host values described by a [`Descriptor`] and the Avro
//! binary format: infers an Avro [`Schema`] from a type description,
//! extracts host values into the Avro generic form and back, and projects
//! data between a writer schema and a reader schema when decoding.
//!
//! # Getting started
//!
//! ```
//! use avro_reflect::{Descriptor, FieldDescriptor, HostValue, RecordDescriptor};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let point = Arc::new(Descriptor::from(RecordDescriptor::new(
//! 	"geo.Pt",
//! 	vec![
//! 		FieldDescriptor::new(0, "x", Arc::new(Descriptor::Int)),
//! 		FieldDescriptor::new(1, "y", Arc::new(Descriptor::Int)),
//! 	],
//! )));
//! avro_reflect::register(&point);
//!
//! let schema = avro_reflect::infer_schema(&point)?;
//! assert_eq!(
//! 	schema.json().parse::<serde_json::Value>()?,
//! 	serde_json::json!({
//! 		"type": "record",
//! 		"name": "Pt",
//! 		"namespace": "geo",
//! 		"fields": [
//! 			{ "name": "x", "type": "int" },
//! 			{ "name": "y", "type": "int" },
//! 		],
//! 	}),
//! );
//!
//! let value = HostValue::Record {
//! 	name: "geo.Pt".to_owned(),
//! 	fields: vec![HostValue::Int(1), HostValue::Int(2)],
//! };
//!
//! let encoded = avro_reflect::write(&value, &schema)?;
//! assert_eq!(encoded, &[2, 4]);
//!
//! let decoded = avro_reflect::read(&encoded, &schema, Some(&schema), 0)?;
//! assert_eq!(decoded.into_host(), Some(value));
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//!
//! The reflective core is split in two directions. On encode, the
//! extractors walk the host value against the target schema and produce
//! the generic form, which the binary encoder writes out. On decode, the
//! binary decoder yields the generic form against the writer schema,
//! resolves it to the reader schema when one is given, and the readers
//! materialize the host value, discovering record and variant types from
//! the registry by schema full name.
//!
//! Descriptors and schemas are built once and immutable afterwards; every
//! pure derivation (descriptor to schema, schema pair to projector, and
//! the per-descriptor union and container plans) is memoized in
//! per-thread, grow-only caches, so the hot path takes no locks.
//!
//! All entry points are synchronous; errors surface directly to the
//! caller. There are no retries and no logging: recovery policy belongs
//! to the caller.

pub mod de;
pub mod schema;
pub mod ser;

mod cache;
mod descriptor;
mod extract;
mod host;
mod infer;
mod project;
mod read;
mod value;

pub use {
	descriptor::{
		lookup, register, ContainerShape, Constructor, DefaultProducer, Descriptor,
		EnumDescriptor, FieldDescriptor, FixedDescriptor, FixedHint, NewtypeDescriptor,
		RecordDescriptor, SequenceDescriptor, SumDescriptor,
	},
	host::{HostType, HostValue},
	project::{Decoded, Projector},
	schema::Schema,
	value::Value,
};

use {
	de::DeError,
	schema::SchemaError,
	ser::SerError,
	std::{
		io::{Read, Write},
		sync::Arc,
	},
};

/// Infer the Avro schema of a descriptor
///
/// Referentially transparent: equivalent descriptors infer equal schemas,
/// including field order and properties. Memoized per thread on the
/// descriptor allocation.
pub fn infer_schema(descriptor: &Arc<Descriptor>) -> Result<Schema, SchemaError> {
	infer::schema_for(descriptor)
}

/// Infer an Avro schema from a sample value
pub fn infer_schema_for_value(value: &HostValue) -> Result<Schema, SchemaError> {
	infer::schema_for_value(value)
}

/// Infer the Avro schema of a [registered](register) type by fully
/// qualified name
pub fn infer_schema_by_name(fully_qualified_name: &str) -> Result<Schema, SchemaError> {
	infer::schema_for_name(fully_qualified_name)
}

/// Encode `value` against `schema` into a new buffer
pub fn write(value: &HostValue, schema: &Schema) -> Result<Vec<u8>, SerError> {
	project::projector(schema, None).write(value)
}

/// Encode `value` against `schema` into a caller-supplied sink
///
/// The sink is flushed but not closed.
pub fn write_to<W: Write>(value: &HostValue, schema: &Schema, sink: &mut W) -> Result<(), SerError> {
	project::projector(schema, None).write_to(value, sink)
}

/// Decode one datum from `bytes` starting at `offset`
///
/// The datum is decoded with `writer`; with a `reader` schema the datum is
/// resolved to it and materialized as a host value, without one the raw
/// generic form is returned.
pub fn read(
	bytes: &[u8],
	writer: &Schema,
	reader: Option<&Schema>,
	offset: usize,
) -> Result<Decoded, DeError> {
	project::projector(writer, reader).read(bytes, offset)
}

/// Decode one datum from a caller-supplied stream
///
/// The stream is read but not closed.
pub fn read_from<R: Read>(
	stream: &mut R,
	writer: &Schema,
	reader: Option<&Schema>,
) -> Result<Decoded, DeError> {
	project::projector(writer, reader).read_from(stream)
}

/// Encode a statically typed host value against its own inferred schema
pub fn to_bytes<T: HostType>(value: &T) -> Result<Vec<u8>, SerError> {
	let descriptor = T::descriptor();
	register(&descriptor);
	let schema = infer_schema(&descriptor)
		.map_err(|e| SerError::msg(format_args!("Schema inference failed: {e}")))?;
	write(&value.to_host(), &schema)
}

/// Decode a statically typed host value written with its own inferred
/// schema
pub fn from_bytes<T: HostType>(bytes: &[u8]) -> Result<T, DeError> {
	let descriptor = T::descriptor();
	register(&descriptor);
	let schema = infer_schema(&descriptor)
		.map_err(|e| DeError::msg(format_args!("Schema inference failed: {e}")))?;
	match read(bytes, &schema, Some(&schema), 0)? {
		Decoded::Host(value) => T::from_host(value),
		Decoded::Generic(_) => Err(DeError::new("Decoding produced no host value")),
	}
}
