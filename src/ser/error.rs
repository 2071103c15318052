use std::borrow::Cow;

/// Any error that may happen while encoding
///
/// Encoding errors are fatal for the call: a value that matches no union
/// member or does not fit the target schema surfaces here, as do I/O
/// errors from the caller-supplied sink.
#[derive(thiserror::Error)]
pub struct SerError {
	inner: Box<ErrorInner>,
}

enum ErrorInner {
	Io(std::io::Error),
	Other(Cow<'static, str>),
}

impl SerError {
	/// If you need a dynamic string use `SerError::msg(format_args!(...))`
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

impl std::fmt::Debug for SerError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match *self.inner {
			ErrorInner::Io(ref e) => std::fmt::Debug::fmt(e, f),
			ErrorInner::Other(ref s) => std::fmt::Debug::fmt(&**s, f),
		}
	}
}

impl std::fmt::Display for SerError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match *self.inner {
			ErrorInner::Io(ref e) => {
				write!(f, "Encountered IO error when attempting to write: {e}")
			}
			ErrorInner::Other(ref s) => std::fmt::Display::fmt(&**s, f),
		}
	}
}
