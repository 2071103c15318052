//! Host-side type descriptors
//!
//! A [`Descriptor`] is the static description of a host type that drives
//! schema inference, extraction and reading. Descriptors are built once
//! (by hand, by a generator, or through [`HostType`](crate::HostType)),
//! wrapped in [`Arc`] and then immutable for the process lifetime; the
//! per-thread caches key on that allocation identity.

use crate::{de::DeError, host::HostValue, schema::LogicalType};

use std::{
	collections::HashMap,
	sync::{Arc, OnceLock, RwLock},
};

/// Builds a host value from the positionally ordered field values of a
/// decoded record
pub type Constructor = Arc<dyn Fn(Vec<HostValue>) -> Result<HostValue, DeError> + Send + Sync>;

/// Produces the default value of a record field
pub type DefaultProducer = Arc<dyn Fn() -> HostValue + Send + Sync>;

/// Tagged description of a host type
#[derive(Clone, Debug)]
pub enum Descriptor {
	/// The unit/absent type, mapping to Avro `null`
	Null,
	/// `bool`, mapping to Avro `boolean`
	Boolean,
	/// `i32`, mapping to Avro `int`
	Int,
	/// `i64`, mapping to Avro `long`
	Long,
	/// `f32`, mapping to Avro `float`
	Float,
	/// `f64`, mapping to Avro `double`
	Double,
	/// `String`, mapping to Avro `string`
	Str,
	/// `Vec<u8>`, mapping to Avro `bytes`
	Bytes,
	/// [`uuid::Uuid`], mapping to a 16-byte Avro `fixed` with the `uuid`
	/// logical type
	Uuid,
	/// An optional value, mapping to the Avro union `[null, T]`
	Option(Arc<Descriptor>),
	/// A homogeneous sequence, mapping to an Avro `array`
	Sequence(SequenceDescriptor),
	/// A string-keyed map, mapping to an Avro `map`; the descriptor is
	/// the value type
	Map(Arc<Descriptor>),
	/// A C-style enumeration, mapping to an Avro `enum`
	Enum(EnumDescriptor),
	/// A labeled wrapper around a single primitive, mapping to the
	/// primitive schema tagged with `logicalType = <fqn>`
	Newtype(NewtypeDescriptor),
	/// A product type with named fields, mapping to an Avro `record`
	Record(RecordDescriptor),
	/// A sealed sum type, mapping to an Avro `union` ordered by variant
	/// index
	Sum(SumDescriptor),
	/// A fixed-size byte encoding, optionally tagged with how to
	/// interpret the bytes
	Fixed(FixedDescriptor),
}

impl Descriptor {
	/// The fully qualified host name, if this is a named descriptor
	pub fn fully_qualified_name(&self) -> Option<&str> {
		match self {
			Descriptor::Enum(enum_) => Some(&enum_.name),
			Descriptor::Newtype(newtype) => Some(&newtype.name),
			Descriptor::Record(record) => Some(&record.name),
			Descriptor::Sum(sum) => Some(&sum.name),
			Descriptor::Fixed(fixed) => Some(&fixed.name),
			_ => None,
		}
	}
}

/// The concrete container a decoded Avro array is coerced back into
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContainerShape {
	/// `Vec`
	List,
	/// `VecDeque`
	Deque,
	/// A set: duplicates removed, first occurrence order kept
	Set,
}

/// Component of a [`Descriptor`]
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct SequenceDescriptor {
	/// Container the host side uses
	pub shape: ContainerShape,
	/// Descriptor of each item
	pub item: Arc<Descriptor>,
}
impl SequenceDescriptor {
	/// `shape` is the host-side container, `item` describes each element
	pub fn new(shape: ContainerShape, item: Arc<Descriptor>) -> Self {
		Self { shape, item }
	}
}

/// Component of a [`Descriptor`]
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct EnumDescriptor {
	/// Fully qualified host name
	pub name: String,
	/// Symbol names in declaration order
	pub symbols: Vec<String>,
}
impl EnumDescriptor {
	/// `name` is the fully qualified host name, `symbols` the symbol
	/// names in declaration order
	pub fn new(name: impl Into<String>, symbols: Vec<String>) -> Self {
		Self {
			name: name.into(),
			symbols,
		}
	}
}

/// Component of a [`Descriptor`]
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct NewtypeDescriptor {
	/// Fully qualified host name of the wrapper
	pub name: String,
	/// Descriptor of the wrapped primitive
	pub inner: Arc<Descriptor>,
}
impl NewtypeDescriptor {
	/// `name` is the fully qualified host name of the wrapper, `inner`
	/// describes the wrapped primitive
	pub fn new(name: impl Into<String>, inner: Arc<Descriptor>) -> Self {
		Self {
			name: name.into(),
			inner,
		}
	}
}

/// Component of a [`Descriptor`]
#[derive(Clone)]
#[non_exhaustive]
pub struct RecordDescriptor {
	/// Fully qualified host name
	pub name: String,
	/// Ordered fields
	pub fields: Vec<FieldDescriptor>,
	/// Builds the host value from positionally ordered field values; when
	/// absent, decoding produces the dynamic record form
	pub construct: Option<Constructor>,
}
impl RecordDescriptor {
	/// A record built from its fully qualified host name and ordered
	/// fields, decoding to the dynamic record form
	pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
		Self {
			name: name.into(),
			fields,
			construct: None,
		}
	}

	/// Attach a constructor invoked with the decoded field values in
	/// positional order
	pub fn with_constructor(mut self, construct: Constructor) -> Self {
		self.construct = Some(construct);
		self
	}
}

impl std::fmt::Debug for RecordDescriptor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RecordDescriptor")
			.field("name", &self.name)
			.field("fields", &self.fields)
			.finish_non_exhaustive()
	}
}

/// A single field of a [`RecordDescriptor`]
#[derive(Clone)]
#[non_exhaustive]
pub struct FieldDescriptor {
	/// Zero-based position in the record
	pub position: usize,
	/// Field name
	pub name: String,
	/// Descriptor of the field type
	pub descriptor: Arc<Descriptor>,
	/// Alternate names carried into the schema
	pub aliases: Vec<String>,
	/// Documentation carried into the schema
	pub doc: Option<String>,
	/// Produces the field default, materialized into the schema at
	/// inference time
	pub default: Option<DefaultProducer>,
	/// Fixed-size encoding annotation overriding primitive inference
	pub fixed: Option<FixedHint>,
}
impl FieldDescriptor {
	/// A plain field with no aliases, doc, default or fixed annotation
	pub fn new(position: usize, name: impl Into<String>, descriptor: Arc<Descriptor>) -> Self {
		Self {
			position,
			name: name.into(),
			descriptor,
			aliases: Vec::new(),
			doc: None,
			default: None,
			fixed: None,
		}
	}

	/// Attach alternate names
	pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
		self.aliases = aliases;
		self
	}

	/// Attach documentation
	pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
		self.doc = Some(doc.into());
		self
	}

	/// Attach a default producer
	pub fn with_default(mut self, default: DefaultProducer) -> Self {
		self.default = Some(default);
		self
	}

	/// Annotate the field with a fixed-size encoding
	pub fn with_fixed(mut self, fixed: FixedHint) -> Self {
		self.fixed = Some(fixed);
		self
	}
}

impl std::fmt::Debug for FieldDescriptor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FieldDescriptor")
			.field("position", &self.position)
			.field("name", &self.name)
			.field("descriptor", &self.descriptor)
			.finish_non_exhaustive()
	}
}

/// Fixed-size encoding annotation on a record field
///
/// The byte size is mandatory for string and bytes fields and ignored for
/// int, long and uuid fields, whose sizes are fixed by their type.
#[derive(Copy, Clone, Debug, Default)]
#[non_exhaustive]
pub struct FixedHint {
	/// User-supplied byte size
	pub size: Option<usize>,
}
impl FixedHint {
	/// An annotation with an explicit byte size
	pub fn sized(size: usize) -> Self {
		Self { size: Some(size) }
	}
}

/// Component of a [`Descriptor`]
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct SumDescriptor {
	/// Fully qualified host name of the sealed type
	pub name: String,
	/// `(variant_index, variant)` pairs; indices must be unique, and the
	/// union member order is their ascending order
	pub variants: Vec<(u32, Arc<Descriptor>)>,
}
impl SumDescriptor {
	/// `name` is the fully qualified host name, `variants` the
	/// `(variant_index, variant)` pairs
	pub fn new(name: impl Into<String>, variants: Vec<(u32, Arc<Descriptor>)>) -> Self {
		Self {
			name: name.into(),
			variants,
		}
	}
}

/// Component of a [`Descriptor`]
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct FixedDescriptor {
	/// Fully qualified host name
	pub name: String,
	/// Byte size of every value
	pub size: usize,
	/// How the bytes are interpreted when reading, if at all
	pub logical: Option<LogicalType>,
}
impl FixedDescriptor {
	/// `name` is the fully qualified host name, `size` the byte size
	pub fn new(name: impl Into<String>, size: usize) -> Self {
		Self {
			name: name.into(),
			size,
			logical: None,
		}
	}

	/// Tag the bytes with an interpretation
	pub fn with_logical(mut self, logical: LogicalType) -> Self {
		self.logical = Some(logical);
		self
	}
}

macro_rules! impl_froms_for_descriptor {
	($($component: ty => $variant: ident,)*) => {
		$(
			impl From<$component> for Descriptor {
				fn from(component: $component) -> Self {
					Self::$variant(component)
				}
			}
		)*
	};
}
impl_froms_for_descriptor! {
	SequenceDescriptor => Sequence,
	EnumDescriptor => Enum,
	NewtypeDescriptor => Newtype,
	RecordDescriptor => Record,
	SumDescriptor => Sum,
	FixedDescriptor => Fixed,
}

fn registry() -> &'static RwLock<HashMap<String, Arc<Descriptor>>> {
	static REGISTRY: OnceLock<RwLock<HashMap<String, Arc<Descriptor>>>> = OnceLock::new();
	REGISTRY.get_or_init(Default::default)
}

/// Record every named type reachable from `descriptor` in the process-wide
/// name table, so that decoding can resolve record, variant and newtype
/// descriptors from schema full names
///
/// Registration is idempotent; racing registrations of equivalent
/// descriptors are harmless.
pub fn register(descriptor: &Arc<Descriptor>) {
	let mut table = registry().write().unwrap_or_else(|e| e.into_inner());
	walk(descriptor, &mut table);
}

fn walk(descriptor: &Arc<Descriptor>, table: &mut HashMap<String, Arc<Descriptor>>) {
	match &**descriptor {
		Descriptor::Record(record) => {
			table.insert(record.name.clone(), descriptor.clone());
			for field in &record.fields {
				walk(&field.descriptor, table);
			}
		}
		Descriptor::Sum(sum) => {
			table.insert(sum.name.clone(), descriptor.clone());
			for (_, variant) in &sum.variants {
				walk(variant, table);
			}
		}
		Descriptor::Enum(enum_) => {
			table.insert(enum_.name.clone(), descriptor.clone());
			// Enumerations are also findable under the schema-side name,
			// which drops a trailing `.Value` segment
			if let Some(stripped) = enum_.name.strip_suffix(".Value") {
				table.insert(stripped.to_owned(), descriptor.clone());
			}
		}
		Descriptor::Newtype(newtype) => {
			table.insert(newtype.name.clone(), descriptor.clone());
			walk(&newtype.inner, table);
		}
		Descriptor::Fixed(fixed) => {
			table.insert(fixed.name.clone(), descriptor.clone());
		}
		Descriptor::Option(inner) | Descriptor::Map(inner) => walk(inner, table),
		Descriptor::Sequence(sequence) => walk(&sequence.item, table),
		Descriptor::Null
		| Descriptor::Boolean
		| Descriptor::Int
		| Descriptor::Long
		| Descriptor::Float
		| Descriptor::Double
		| Descriptor::Str
		| Descriptor::Bytes
		| Descriptor::Uuid => {}
	}
}

/// Look up a registered descriptor by fully qualified name
pub fn lookup(fully_qualified_name: &str) -> Option<Arc<Descriptor>> {
	registry()
		.read()
		.unwrap_or_else(|e| e.into_inner())
		.get(fully_qualified_name)
		.cloned()
}
