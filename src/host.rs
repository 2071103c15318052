//! The dynamic host value form and the [`HostType`] trait
//!
//! [`HostValue`] is the currency between host types and the codec: the
//! extractors consume it and the readers produce it. Statically typed
//! hosts implement [`HostType`] to describe themselves and convert; the
//! dynamic form alone is enough to drive every codec operation.

use crate::{
	de::DeError,
	descriptor::{ContainerShape, Descriptor, SequenceDescriptor},
};

use std::{collections::BTreeMap, sync::Arc};

/// A host value, described by a parallel [`Descriptor`]
#[derive(Clone, Debug, PartialEq)]
pub enum HostValue {
	/// The absent value
	Null,
	/// A boolean
	Boolean(bool),
	/// A 32-bit integer
	Int(i32),
	/// A 64-bit integer
	Long(i64),
	/// A 32-bit float
	Float(f32),
	/// A 64-bit float
	Double(f64),
	/// A string
	Str(String),
	/// A byte array
	Bytes(Vec<u8>),
	/// A universally unique identifier
	Uuid(uuid::Uuid),
	/// An optional value
	Optional(Option<Box<HostValue>>),
	/// A sequence, tagged with its host-side container shape
	Sequence(ContainerShape, Vec<HostValue>),
	/// A string-keyed map
	Map(BTreeMap<String, HostValue>),
	/// A value of a C-style enumeration
	Enum {
		/// Fully qualified host name of the enumeration
		name: String,
		/// The symbol this value holds
		symbol: String,
	},
	/// A record value; also how a sum variant instance presents itself
	Record {
		/// Fully qualified host name of the record type
		name: String,
		/// Field values in positional order
		fields: Vec<HostValue>,
	},
	/// A newtype wrapper around a primitive
	Newtype {
		/// Fully qualified host name of the wrapper
		name: String,
		/// The wrapped value
		value: Box<HostValue>,
	},
}

/// A statically typed host value: knows its [`Descriptor`] and converts
/// to and from the dynamic form
pub trait HostType: Sized {
	/// The descriptor driving schema inference for this type
	fn descriptor() -> Arc<Descriptor>;
	/// Convert into the dynamic form
	fn to_host(&self) -> HostValue;
	/// Rebuild from the dynamic form
	fn from_host(value: HostValue) -> Result<Self, DeError>;
}

macro_rules! impl_host_primitive {
	($($ty: ty => $descriptor: ident, $variant: ident;)*) => {
		$(
			impl HostType for $ty {
				fn descriptor() -> Arc<Descriptor> {
					Arc::new(Descriptor::$descriptor)
				}
				fn to_host(&self) -> HostValue {
					HostValue::$variant(self.clone())
				}
				fn from_host(value: HostValue) -> Result<Self, DeError> {
					match value {
						HostValue::$variant(v) => Ok(v),
						other => Err(DeError::msg(format_args!(
							concat!("Expected ", stringify!($variant), ", got {:?}"),
							other
						))),
					}
				}
			}
		)*
	};
}
impl_host_primitive! {
	bool => Boolean, Boolean;
	i32 => Int, Int;
	f32 => Float, Float;
	String => Str, Str;
	uuid::Uuid => Uuid, Uuid;
}

impl HostType for i64 {
	fn descriptor() -> Arc<Descriptor> {
		Arc::new(Descriptor::Long)
	}
	fn to_host(&self) -> HostValue {
		HostValue::Long(*self)
	}
	fn from_host(value: HostValue) -> Result<Self, DeError> {
		match value {
			HostValue::Long(v) => Ok(v),
			HostValue::Int(v) => Ok(v.into()),
			other => Err(DeError::msg(format_args!("Expected Long, got {other:?}"))),
		}
	}
}

impl HostType for f64 {
	fn descriptor() -> Arc<Descriptor> {
		Arc::new(Descriptor::Double)
	}
	fn to_host(&self) -> HostValue {
		HostValue::Double(*self)
	}
	fn from_host(value: HostValue) -> Result<Self, DeError> {
		match value {
			HostValue::Double(v) => Ok(v),
			HostValue::Float(v) => Ok(v.into()),
			other => Err(DeError::msg(format_args!("Expected Double, got {other:?}"))),
		}
	}
}

impl<T: HostType> HostType for Option<T> {
	fn descriptor() -> Arc<Descriptor> {
		Arc::new(Descriptor::Option(T::descriptor()))
	}
	fn to_host(&self) -> HostValue {
		HostValue::Optional(self.as_ref().map(|value| Box::new(value.to_host())))
	}
	fn from_host(value: HostValue) -> Result<Self, DeError> {
		match value {
			HostValue::Null | HostValue::Optional(None) => Ok(None),
			HostValue::Optional(Some(inner)) => T::from_host(*inner).map(Some),
			other => T::from_host(other).map(Some),
		}
	}
}

impl<T: HostType> HostType for Vec<T> {
	fn descriptor() -> Arc<Descriptor> {
		Arc::new(Descriptor::Sequence(SequenceDescriptor::new(
			ContainerShape::List,
			T::descriptor(),
		)))
	}
	fn to_host(&self) -> HostValue {
		HostValue::Sequence(
			ContainerShape::List,
			self.iter().map(HostType::to_host).collect(),
		)
	}
	fn from_host(value: HostValue) -> Result<Self, DeError> {
		match value {
			HostValue::Sequence(_, items) => items.into_iter().map(T::from_host).collect(),
			other => Err(DeError::msg(format_args!(
				"Expected Sequence, got {other:?}"
			))),
		}
	}
}

impl<T: HostType> HostType for BTreeMap<String, T> {
	fn descriptor() -> Arc<Descriptor> {
		Arc::new(Descriptor::Map(T::descriptor()))
	}
	fn to_host(&self) -> HostValue {
		HostValue::Map(
			self.iter()
				.map(|(key, value)| (key.clone(), value.to_host()))
				.collect(),
		)
	}
	fn from_host(value: HostValue) -> Result<Self, DeError> {
		match value {
			HostValue::Map(entries) => entries
				.into_iter()
				.map(|(key, value)| Ok((key, T::from_host(value)?)))
				.collect(),
			other => Err(DeError::msg(format_args!("Expected Map, got {other:?}"))),
		}
	}
}
