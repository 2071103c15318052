use std::borrow::Cow;

/// Any error that may happen while decoding
///
/// Decoding errors are fatal for the call: malformed Avro bytes, a
/// writer/reader schema mismatch that standard resolution cannot bridge,
/// or an illegal top-level type all surface here.
#[derive(thiserror::Error)]
pub struct DeError {
	inner: Box<ErrorInner>,
}

enum ErrorInner {
	Io(std::io::Error),
	Other(Cow<'static, str>),
}

impl DeError {
	/// If you need a dynamic string use `DeError::msg(format_args!(...))`
	pub(crate) fn new(s: &'static str) -> Self {
		Self {
			inner: Box::new(ErrorInner::Other(Cow::Borrowed(s))),
		}
	}

	pub(crate) fn msg(s: std::fmt::Arguments<'_>) -> Self {
		Self {
			inner: Box::new(ErrorInner::Other(Cow::Owned(s.to_string()))),
		}
	}

	pub(crate) fn io(io_error: std::io::Error) -> Self {
		Self {
			inner: Box::new(ErrorInner::Io(io_error)),
		}
	}
}

impl std::fmt::Debug for DeError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match *self.inner {
			ErrorInner::Io(ref e) => std::fmt::Debug::fmt(e, f),
			ErrorInner::Other(ref s) => std::fmt::Debug::fmt(&**s, f),
		}
	}
}

impl std::fmt::Display for DeError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match *self.inner {
			ErrorInner::Io(ref e) => {
				write!(f, "Encountered IO error when attempting to read: {e}")
			}
			ErrorInner::Other(ref s) => std::fmt::Display::fmt(&**s, f),
		}
	}
}
