//! Error handling.
//!
//! Decoding can fail for exactly one semantic reason: the data was not
//! correctly encoded. The [`ContentError`] type carries the specific
//! reason as a message, [`DecodeError`] combines it with the position at
//! which decoding gave up. Operations reading from an [`io::Read`] source
//! can additionally fail with an I/O error which [`DecodeError`] wraps as
//! well.

use std::{error, fmt, io, ops};


//------------ ContentError --------------------------------------------------

/// An error signalling that data was not correctly encoded.
///
/// The error carries a human-readable reason. It does not carry a
/// position; [`DecodeError`] adds that.
pub struct ContentError {
    message: ErrorMessage,
}

impl ContentError {
    /// Creates a content error from a static string.
    pub fn from_static(message: &'static str) -> Self {
        ContentError {
            message: ErrorMessage::Static(message)
        }
    }
}

impl From<&'static str> for ContentError {
    fn from(message: &'static str) -> Self {
        ContentError::from_static(message)
    }
}

impl From<String> for ContentError {
    fn from(message: String) -> Self {
        ContentError {
            message: ErrorMessage::Owned(message.into())
        }
    }
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.message {
            ErrorMessage::Static(message) => f.write_str(message),
            ErrorMessage::Owned(ref message) => f.write_str(message),
        }
    }
}

impl fmt::Debug for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ContentError")
            .field(&format_args!("{}", self))
            .finish()
    }
}

impl error::Error for ContentError { }


//------------ ErrorMessage --------------------------------------------------

/// The message carried by a content error.
enum ErrorMessage {
    Static(&'static str),
    Owned(Box<str>),
}


//------------ Pos -----------------------------------------------------------

/// The position within decoded data.
///
/// Values of this type are only useful for diagnostics. They refer to an
/// offset within the unit of data a decoding operation was started on,
/// which is why the type does not allow conversion back into an integer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Pos(usize);

impl From<usize> for Pos {
    fn from(pos: usize) -> Pos {
        Pos(pos)
    }
}

impl ops::Add for Pos {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Pos(self.0 + rhs.0)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}


//------------ DecodeError ---------------------------------------------------

/// An error happened while decoding data.
///
/// This is either a content error at a certain position or, for
/// operations that read from an [`io::Read`] source, an I/O error.
pub struct DecodeError {
    inner: Inner,
}

enum Inner {
    /// The data was not correctly encoded.
    Content {
        error: ContentError,
        pos: Pos,
    },

    /// Reading from the underlying source failed.
    Io(io::Error),
}

impl DecodeError {
    /// Creates a decode error from a content error at a position.
    pub fn content(
        error: impl Into<ContentError>, pos: impl Into<Pos>
    ) -> Self {
        DecodeError {
            inner: Inner::Content {
                error: error.into(),
                pos: pos.into(),
            }
        }
    }

    /// Returns the position of the error if it is a content error.
    pub fn pos(&self) -> Option<Pos> {
        match self.inner {
            Inner::Content { pos, .. } => Some(pos),
            Inner::Io(_) => None,
        }
    }

    /// Returns whether the error stems from the underlying source.
    pub fn is_io(&self) -> bool {
        matches!(self.inner, Inner::Io(_))
    }
}

impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> Self {
        DecodeError { inner: Inner::Io(err) }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.inner {
            Inner::Content { ref error, pos } => {
                write!(f, "{} (at position {})", error, pos)
            }
            Inner::Io(ref err) => err.fmt(f),
        }
    }
}

impl fmt::Debug for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "DecodeError({})", self)
    }
}

impl error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.inner {
            Inner::Content { ref error, .. } => Some(error),
            Inner::Io(ref err) => Some(err),
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display() {
        let err = DecodeError::content("unexpected end of data", 12);
        assert_eq!(
            format!("{}", err),
            "unexpected end of data (at position 12)"
        );
        assert_eq!(err.pos(), Some(Pos::from(12)));
        assert!(!err.is_io());
    }

    #[test]
    fn io() {
        let err = DecodeError::from(
            io::Error::new(io::ErrorKind::UnexpectedEof, "eof")
        );
        assert!(err.is_io());
        assert!(err.pos().is_none());
    }

    #[test]
    fn owned_message() {
        let err = ContentError::from(String::from("boom"));
        assert_eq!(format!("{}", err), "boom");
    }
}
