//! Build, navigate, parse and render the Avro [`Schema`]

mod error;
mod parsing;
mod serialize;

pub use error::SchemaError;

use std::{collections::BTreeMap, sync::Arc};

/// An immutable, cheaply clonable handle on an Avro schema node
///
/// Schemas are built once (inferred from a
/// [`Descriptor`](crate::Descriptor) or parsed from JSON) and then shared
/// freely across threads. Two clones of the same `Schema` share the same
/// allocation, which is what the per-thread caches key on.
#[derive(Clone)]
pub struct Schema {
	node: Arc<SchemaNode>,
}

impl Schema {
	/// Wrap a [`SchemaNode`] into a shareable `Schema`
	pub fn new(node: SchemaNode) -> Self {
		Self {
			node: Arc::new(node),
		}
	}

	/// The node this handle points to
	pub fn node(&self) -> &SchemaNode {
		&self.node
	}

	/// If this schema is a named type, its [`Name`]
	pub fn name(&self) -> Option<&Name> {
		self.node.type_.name()
	}

	/// Render the schema as standard Avro JSON
	pub fn json(&self) -> String {
		self.to_string()
	}

	/// Stable identity of the underlying allocation, used as cache key
	pub(crate) fn identity(&self) -> usize {
		Arc::as_ptr(&self.node) as usize
	}
}

impl std::ops::Deref for Schema {
	type Target = SchemaNode;
	fn deref(&self) -> &SchemaNode {
		&self.node
	}
}

impl PartialEq for Schema {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.node, &other.node) || *self.node == *other.node
	}
}
impl Eq for Schema {}

impl std::fmt::Debug for Schema {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		std::fmt::Debug::fmt(&self.node, f)
	}
}

/// A node of an Avro schema: a regular type, an optional logical type
/// annotation, and any free-form properties carried along from the JSON
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct SchemaNode {
	/// The underlying regular type of this node
	pub type_: RegularType,
	/// Logical type the regular type is annotated with, if any
	pub logical_type: Option<LogicalType>,
	/// Free-form schema properties other than `logicalType`
	pub properties: BTreeMap<String, serde_json::Value>,
}

impl SchemaNode {
	/// Build a new [`SchemaNode`] from the given regular type, with no
	/// logical type
	pub fn new(type_: RegularType) -> Self {
		Self {
			type_,
			logical_type: None,
			properties: BTreeMap::new(),
		}
	}

	/// Build a new [`SchemaNode`] from the given regular type and logical
	/// type
	pub fn with_logical_type(type_: RegularType, logical_type: LogicalType) -> Self {
		Self {
			type_,
			logical_type: Some(logical_type),
			properties: BTreeMap::new(),
		}
	}
}

/// A primitive or complex type of an Avro schema, stored in a
/// [`SchemaNode`]
#[derive(Clone, Debug, PartialEq)]
pub enum RegularType {
	/// A `null` Avro schema.
	Null,
	/// A `boolean` Avro schema.
	Boolean,
	/// An `int` Avro schema.
	Int,
	/// A `long` Avro schema.
	Long,
	/// A `float` Avro schema.
	Float,
	/// A `double` Avro schema.
	Double,
	/// A `bytes` Avro schema: a sequence of 8-bit unsigned bytes.
	Bytes,
	/// A `string` Avro schema: a unicode character sequence.
	String,
	/// An `array` Avro schema. All elements share the same item schema.
	Array(Array),
	/// A `map` Avro schema. Keys are assumed to be strings.
	Map(Map),
	/// A `union` Avro schema. Member order is significant.
	Union(Union),
	/// A `record` Avro schema.
	Record(Record),
	/// An `enum` Avro schema.
	Enum(Enum),
	/// A `fixed` Avro schema.
	Fixed(Fixed),
}

impl RegularType {
	/// If the type is a named type, returns the name of the type
	pub fn name(&self) -> Option<&Name> {
		match self {
			RegularType::Record(record) => Some(&record.name),
			RegularType::Enum(enum_) => Some(&enum_.name),
			RegularType::Fixed(fixed) => Some(&fixed.name),
			RegularType::Null
			| RegularType::Boolean
			| RegularType::Int
			| RegularType::Long
			| RegularType::Float
			| RegularType::Double
			| RegularType::Bytes
			| RegularType::String
			| RegularType::Array(_)
			| RegularType::Map(_)
			| RegularType::Union(_) => None,
		}
	}
}

/// Name of a `record`, `enum` or `fixed` schema, split into simple name
/// and optional namespace
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Name {
	name: String,
	namespace: Option<String>,
}

impl Name {
	/// Build a [`Name`] from a simple name and an optional namespace
	pub fn new(name: impl Into<String>, namespace: Option<String>) -> Self {
		Self {
			name: name.into(),
			namespace,
		}
	}

	/// Build a [`Name`] from a dot-separated fully qualified name
	///
	/// Everything up to the last `.` becomes the namespace.
	pub fn from_fully_qualified(fully_qualified: &str) -> Self {
		match fully_qualified.rfind('.') {
			None | Some(0) => Self {
				name: fully_qualified.trim_start_matches('.').to_owned(),
				namespace: None,
			},
			Some(idx) => Self {
				name: fully_qualified[idx + 1..].to_owned(),
				namespace: Some(fully_qualified[..idx].to_owned()),
			},
		}
	}

	/// The simple name, e.g. in `a.b.c` it is `c`
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The namespace, e.g. in `a.b.c` it is `a.b`
	pub fn namespace(&self) -> Option<&str> {
		self.namespace.as_deref()
	}

	/// The dot-joined fully qualified name
	pub fn fully_qualified(&self) -> String {
		match self.namespace {
			None => self.name.clone(),
			Some(ref namespace) => format!("{}.{}", namespace, self.name),
		}
	}
}

impl std::fmt::Debug for Name {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		std::fmt::Debug::fmt(&self.fully_qualified(), f)
	}
}

/// Logical type annotation recognized by this codec
///
/// On a `fixed` schema the tags `int`, `long`, `string` and `uuid` select
/// how the raw bytes are interpreted when reading. On a primitive schema
/// a [`Named`](LogicalType::Named) tag marks a newtype wrapper by the
/// fully qualified name of the host type.
///
/// Comparisons are value comparisons of the underlying tag string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogicalType {
	/// Big-endian integer stored in a 4-byte `fixed`
	Int,
	/// Big-endian integer stored in an 8-byte `fixed`
	Long,
	/// UTF-8 text stored zero-padded in a `fixed`
	Text,
	/// A universally unique identifier stored in a 16-byte `fixed`
	Uuid,
	/// A newtype wrapper, tagged with the fully qualified host type name
	///
	/// An unresolvable name is not an error at decode time: the value
	/// decodes as the underlying type and is returned unchanged.
	Named(String),
}

impl LogicalType {
	/// The tag as it appears under the `logicalType` schema property
	pub fn as_str(&self) -> &str {
		match self {
			LogicalType::Int => "int",
			LogicalType::Long => "long",
			LogicalType::Text => "string",
			LogicalType::Uuid => "uuid",
			LogicalType::Named(name) => name,
		}
	}

	/// Interpret a `logicalType` property value
	pub fn from_name(name: &str) -> Self {
		match name {
			"int" => LogicalType::Int,
			"long" => LogicalType::Long,
			"string" => LogicalType::Text,
			"uuid" => LogicalType::Uuid,
			_ => LogicalType::Named(name.to_owned()),
		}
	}
}

/// Component of a [`Schema`]
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct Array {
	/// The schema of each item of the array
	pub items: Schema,
}
impl Array {
	/// `items` is the schema of each item of the array
	pub fn new(items: Schema) -> Self {
		Self { items }
	}
}

/// Component of a [`Schema`]
///
/// An Avro map is a collection of key-value pairs where keys are strings.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct Map {
	/// The schema of each value of the map
	pub values: Schema,
}
impl Map {
	/// `values` is the schema of each value of the map
	pub fn new(values: Schema) -> Self {
		Self { values }
	}
}

/// Component of a [`Schema`]
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct Union {
	/// The member schemas of this union, in significant order
	pub variants: Vec<Schema>,
}
impl Union {
	/// `variants` is the member schemas of this union, in significant
	/// order
	pub fn new(variants: Vec<Schema>) -> Self {
		Self { variants }
	}

	/// Position of the `null` member, if any
	pub fn null_index(&self) -> Option<usize> {
		self.variants
			.iter()
			.position(|variant| matches!(variant.type_, RegularType::Null))
	}

	/// Whether this union has exactly the shape of an optional value:
	/// two members, one of which is `null`
	pub fn is_optional(&self) -> bool {
		self.variants.len() == 2 && self.null_index().is_some()
	}
}

/// Component of a [`Schema`]
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct Record {
	/// The name of the record (including namespace)
	pub name: Name,
	/// The ordered list of fields of this record
	pub fields: Vec<RecordField>,
}
impl Record {
	/// `name` is the name of the record (including namespace) and
	/// `fields` is the ordered list of fields
	pub fn new(name: Name, fields: Vec<RecordField>) -> Self {
		Self { name, fields }
	}
}

/// Component of a [`Schema`]
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct RecordField {
	/// Name of the field
	pub name: String,
	/// The schema of the type of this field
	pub schema: Schema,
	/// Alternate names this field is known under
	pub aliases: Vec<String>,
	/// Documentation carried on the field
	pub doc: Option<String>,
	/// Default value of the field, in the Avro JSON representation
	///
	/// When the field schema is a union, the default belongs to the first
	/// member of the union.
	pub default: Option<serde_json::Value>,
}
impl RecordField {
	/// A plain field with no aliases, doc or default
	pub fn new(name: impl Into<String>, schema: Schema) -> Self {
		Self {
			name: name.into(),
			schema,
			aliases: Vec::new(),
			doc: None,
			default: None,
		}
	}
}

/// Component of a [`Schema`]
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct Enum {
	/// The name of the enum (including namespace)
	pub name: Name,
	/// All the symbols of the enum, in declaration order
	pub symbols: Vec<String>,
}
impl Enum {
	/// `name` is the name of the enum (including namespace) and `symbols`
	/// is the list of symbols in declaration order
	pub fn new(name: Name, symbols: Vec<String>) -> Self {
		Self { name, symbols }
	}
}

/// Component of a [`Schema`]
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct Fixed {
	/// The name of the fixed type (including namespace)
	pub name: Name,
	/// The size in bytes of every value of this type
	pub size: usize,
}
impl Fixed {
	/// `name` is the name of the fixed type (including namespace) and
	/// `size` is the size in bytes of every value
	pub fn new(name: Name, size: usize) -> Self {
		Self { name, size }
	}
}

impl From<RegularType> for SchemaNode {
	fn from(regular_type: RegularType) -> Self {
		SchemaNode::new(regular_type)
	}
}

impl From<RegularType> for Schema {
	fn from(regular_type: RegularType) -> Self {
		Schema::new(SchemaNode::new(regular_type))
	}
}

impl From<SchemaNode> for Schema {
	fn from(node: SchemaNode) -> Self {
		Schema::new(node)
	}
}

macro_rules! impl_froms_for_regular_type {
	($($variant: ident)*) => {
		$(
			impl From<$variant> for RegularType {
				fn from(variant: $variant) -> Self {
					Self::$variant(variant)
				}
			}
			impl From<$variant> for Schema {
				fn from(variant: $variant) -> Self {
					Schema::new(SchemaNode::new(RegularType::$variant(variant)))
				}
			}
		)*
	};
}
impl_froms_for_regular_type! { Array Map Union Record Enum Fixed }
