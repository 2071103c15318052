//! The projector: a cached pairing of writer and reader schemas

use crate::{
	cache,
	de::{self, DeError},
	extract,
	host::HostValue,
	read,
	schema::Schema,
	ser::{self, SerError},
	value::Value,
};

use std::{
	io::{Read, Write},
	sync::Arc,
};

/// A value object over a `(writer schema, reader schema)` pair exposing
/// encode and decode
///
/// With no reader schema, decoding stops at the generic form; with one,
/// the datum is resolved to it and materialized into a host value.
/// Projectors are cached per thread by schema identity pair.
pub struct Projector {
	writer: Schema,
	reader: Option<Schema>,
}

/// What a projector's decode produced: the raw generic form when the
/// projector has no reader schema, a host value otherwise
#[derive(Debug, PartialEq)]
pub enum Decoded {
	/// The raw generic form, untouched by host materialization
	Generic(Value),
	/// The materialized host value
	Host(HostValue),
}

impl Decoded {
	/// The generic form, if that is what decoding produced
	pub fn into_generic(self) -> Option<Value> {
		match self {
			Decoded::Generic(value) => Some(value),
			Decoded::Host(_) => None,
		}
	}

	/// The host value, if that is what decoding produced
	pub fn into_host(self) -> Option<HostValue> {
		match self {
			Decoded::Host(value) => Some(value),
			Decoded::Generic(_) => None,
		}
	}
}

impl Projector {
	/// Pair a writer schema with an optional reader schema
	pub fn new(writer: Schema, reader: Option<Schema>) -> Self {
		Self { writer, reader }
	}

	/// The schema data is written with
	pub fn writer_schema(&self) -> &Schema {
		&self.writer
	}

	/// The schema data is projected onto when decoding, if any
	pub fn reader_schema(&self) -> Option<&Schema> {
		self.reader.as_ref()
	}

	/// The schema encoding runs against: the reader schema when present,
	/// the writer schema otherwise
	fn projected(&self) -> &Schema {
		self.reader.as_ref().unwrap_or(&self.writer)
	}

	/// Encode `value` into a new buffer
	pub fn write(&self, value: &HostValue) -> Result<Vec<u8>, SerError> {
		let mut buffer = Vec::new();
		let schema = self.projected();
		let generic = extract::extract(value, schema)?;
		ser::write_datum(&generic, schema, &mut buffer)?;
		Ok(buffer)
	}

	/// Encode `value` into a caller-supplied sink
	///
	/// The sink is flushed on completion but never closed; its lifecycle
	/// stays with the caller.
	pub fn write_to<W: Write>(&self, value: &HostValue, sink: &mut W) -> Result<(), SerError> {
		let schema = self.projected();
		let generic = extract::extract(value, schema)?;
		ser::write_datum(&generic, schema, sink)?;
		sink.flush().map_err(SerError::io)
	}

	/// Decode one datum from `bytes`, starting at `offset`
	pub fn read(&self, bytes: &[u8], offset: usize) -> Result<Decoded, DeError> {
		let mut slice = bytes.get(offset..).ok_or_else(|| {
			DeError::msg(format_args!(
				"Offset {offset} is past the end of the {}-byte buffer",
				bytes.len()
			))
		})?;
		self.read_from(&mut slice)
	}

	/// Decode one datum from a caller-supplied stream
	///
	/// The stream is read but not closed; its lifecycle stays with the
	/// caller.
	pub fn read_from<R: Read>(&self, stream: &mut R) -> Result<Decoded, DeError> {
		let generic = de::read_datum(stream, &self.writer, self.reader.as_ref())?;
		match self.reader {
			None => Ok(Decoded::Generic(generic)),
			Some(ref reader) => {
				read::materialize(generic, reader, None).map(Decoded::Host)
			}
		}
	}
}

/// The per-thread projector for a `(writer, reader)` schema pair
pub(crate) fn projector(writer: &Schema, reader: Option<&Schema>) -> Arc<Projector> {
	cache::projector(writer, reader, || {
		Arc::new(Projector::new(writer.clone(), reader.cloned()))
	})
}
