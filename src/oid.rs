//! ASN.1 object identifiers.
//!
//! This module provides the [`Oid`] type keeping an object identifier in
//! its encoded form, an iterator over its components, and rendering in
//! the familiar dotted-decimal notation.

use std::{fmt, hash};
use bytes::Bytes;
use crate::error::ContentError;


//------------ Oid -----------------------------------------------------------

/// An object identifier.
///
/// Object identifiers are globally unique, hierarchical values used to
/// identify objects or their type, written as a sequence of integers
/// separated by dots such as `1.3.6.1.5.5.7.1`.
///
/// Values of this type keep the identifier in its encoded form: a
/// sequence of base-128 subidentifiers, seven bits per octet, most
/// significant first, with the top bit of every octet except the last of
/// a subidentifier set. The first subidentifier packs the first two
/// components as `40 * first + second`.
///
/// The type is generic over anything that can be referenced as a byte
/// slice so that well-known identifiers can be kept as constants of the
/// alias [`ConstOid`] and compared against decoded values directly.
#[derive(Clone, Debug)]
pub struct Oid<T: AsRef<[u8]> = Bytes>(T);

/// A type alias for `Oid<&'static [u8]>`.
///
/// This is useful when defining object identifier constants.
pub type ConstOid = Oid<&'static [u8]>;

impl Oid<Bytes> {
    /// Creates an object identifier from its encoded content octets.
    ///
    /// Checks that the octets are a well-formed sequence of minimally
    /// encoded subidentifiers.
    pub fn from_bytes(bytes: Bytes) -> Result<Self, ContentError> {
        Self::check(bytes.as_ref())?;
        Ok(Oid(bytes))
    }

    fn check(slice: &[u8]) -> Result<(), ContentError> {
        if slice.is_empty() {
            return Err(ContentError::from_static(
                "empty object identifier"
            ))
        }
        if slice[slice.len() - 1] & 0x80 != 0 {
            return Err(ContentError::from_static(
                "truncated object identifier"
            ))
        }
        let mut at_start = true;
        let mut len = 0;
        for &octet in slice {
            if at_start && octet == 0x80 {
                return Err(ContentError::from_static(
                    "non-minimal subidentifier in object identifier"
                ))
            }
            len += 1;
            if len > 18 {
                return Err(ContentError::from_static(
                    "excessive subidentifier in object identifier"
                ))
            }
            at_start = octet & 0x80 == 0;
            if at_start {
                len = 0;
            }
        }
        Ok(())
    }
}

impl Oid<&'static [u8]> {
    /// Creates an object identifier constant.
    ///
    /// The octets are trusted to be well-formed.
    pub const fn from_static(slice: &'static [u8]) -> Self {
        Oid(slice)
    }
}

impl<T: AsRef<[u8]>> Oid<T> {
    /// Returns the encoded octets of the identifier.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns an iterator over the components of the identifier.
    ///
    /// The iterator undoes the packing of the first two components into
    /// the leading subidentifier, so iterating over `1.3.6.1` yields
    /// four items.
    pub fn components(&self) -> Components<'_> {
        Components {
            slice: self.0.as_ref(),
            first: true,
            pending: None,
        }
    }
}


//--- AsRef

impl<T: AsRef<[u8]>> AsRef<[u8]> for Oid<T> {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}


//--- PartialEq and Eq

impl<T: AsRef<[u8]>, U: AsRef<[u8]>> PartialEq<Oid<U>> for Oid<T> {
    fn eq(&self, other: &Oid<U>) -> bool {
        self.0.as_ref() == other.0.as_ref()
    }
}

impl<T: AsRef<[u8]>> Eq for Oid<T> { }


//--- Hash

impl<T: AsRef<[u8]>> hash::Hash for Oid<T> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.0.as_ref().hash(state)
    }
}


//--- Display

impl<T: AsRef<[u8]>> fmt::Display for Oid<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut components = self.components();
        if let Some(first) = components.next() {
            write!(f, "{}", first)?;
        }
        for component in components {
            write!(f, ".{}", component)?;
        }
        Ok(())
    }
}


//------------ Components ----------------------------------------------------

/// An iterator over the components of an object identifier.
///
/// Expects well-formed input as guaranteed by [`Oid::from_bytes`]; a
/// trailing incomplete subidentifier is silently dropped.
pub struct Components<'a> {
    /// The not yet processed octets of the identifier.
    slice: &'a [u8],

    /// Whether the next subidentifier is the leading one.
    first: bool,

    /// The second component, unpacked from the leading subidentifier.
    pending: Option<u128>,
}

impl<'a> Iterator for Components<'a> {
    type Item = u128;

    fn next(&mut self) -> Option<u128> {
        if let Some(pending) = self.pending.take() {
            return Some(pending)
        }
        if self.slice.is_empty() {
            return None
        }
        let mut res = 0u128;
        while let Some((&octet, rest)) = self.slice.split_first() {
            self.slice = rest;
            res = (res << 7) | u128::from(octet & 0x7f);
            if octet & 0x80 == 0 {
                break
            }
        }
        if self.first {
            self.first = false;
            if res < 80 {
                self.pending = Some(res % 40);
                Some(res / 40)
            }
            else {
                self.pending = Some(res - 80);
                Some(2)
            }
        }
        else {
            Some(res)
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn oid(octets: &'static [u8]) -> Oid {
        Oid::from_bytes(Bytes::from_static(octets)).unwrap()
    }

    #[test]
    fn display() {
        assert_eq!(
            format!("{}", oid(b"\x2b\x06\x01\x05\x05\x07\x01")),
            "1.3.6.1.5.5.7.1"
        );
        assert_eq!(
            format!("{}", oid(b"\x2a\x86\x48\x86\xf7\x0d")),
            "1.2.840.113549"
        );
        assert_eq!(format!("{}", oid(b"\x81\x34\x03")), "2.100.3");
        assert_eq!(format!("{}", oid(b"\x00")), "0.0");
        assert_eq!(format!("{}", oid(b"\x4f")), "1.39");
        assert_eq!(format!("{}", oid(b"\x50")), "2.0");
    }

    #[test]
    fn components() {
        let oid = oid(b"\x2b\x06\x01");
        let components: Vec<_> = oid.components().collect();
        assert_eq!(components, [1, 3, 6, 1]);
    }

    #[test]
    fn validation() {
        assert!(Oid::from_bytes(Bytes::new()).is_err());
        assert!(
            Oid::from_bytes(Bytes::from_static(b"\x2b\x86")).is_err()
        );
        assert!(
            Oid::from_bytes(Bytes::from_static(b"\x2b\x80\x01")).is_err()
        );
    }

    #[test]
    fn const_comparison() {
        const RSA: ConstOid = Oid::from_static(b"\x2a\x86\x48\x86\xf7\x0d");
        assert_eq!(oid(b"\x2a\x86\x48\x86\xf7\x0d"), RSA);
        assert_ne!(oid(b"\x2b\x06\x01"), RSA);
    }
}
