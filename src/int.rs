//! BER encoded integers.

use bytes::Bytes;


//------------ Integer -------------------------------------------------------

/// The content of a BER encoded INTEGER.
///
/// Integers are variable length in BER, so this type simply wraps the
/// raw content octets, which hold the value as a big-endian two's
/// complement sequence of any length. The most significant bit of the
/// first octet is the sign bit.
///
/// For values that are known to fit a native integer, the conversion
/// methods can be used. They return `None` when the value is out of
/// range. If the value is defined as `INTEGER (0..MAX)`, the sibling
/// type [`Unsigned`] is the better match.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Integer(Bytes);

impl Integer {
    /// Creates a value from content octets.
    ///
    /// The caller has already checked that the content is not empty and
    /// not redundantly encoded.
    pub(crate) fn from_content(content: Bytes) -> Self {
        Integer(content)
    }

    /// Returns the content octets.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns whether the value is negative.
    pub fn is_negative(&self) -> bool {
        self.0.first().map_or(false, |first| first & 0x80 != 0)
    }

    /// Converts the value into an `i32` if it fits.
    pub fn to_i32(&self) -> Option<i32> {
        self.to_i64().and_then(|res| i32::try_from(res).ok())
    }

    /// Converts the value into an `i64` if it fits.
    pub fn to_i64(&self) -> Option<i64> {
        let mut octets = self.0.as_ref();
        // Drop redundant sign extension octets. These only appear in
        // relaxed mode but the value they carry is the same.
        while octets.len() > 1
            && ((octets[0] == 0x00 && octets[1] & 0x80 == 0)
                || (octets[0] == 0xff && octets[1] & 0x80 != 0))
        {
            octets = &octets[1..];
        }
        if octets.len() > 8 {
            return None
        }
        let mut res = i64::from(octets[0] as i8);
        for &octet in &octets[1..] {
            res = (res << 8) | i64::from(octet);
        }
        Some(res)
    }
}

impl AsRef<[u8]> for Integer {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}


//------------ Unsigned ------------------------------------------------------

/// The content of a BER encoded INTEGER forced to be positive.
///
/// The content octets are interpreted as the big-endian magnitude of a
/// non-negative value, disregarding what the sign bit says. This mirrors
/// how certificate code deals with implementations that incorrectly
/// encode serial numbers and similar values as negative.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Unsigned(Bytes);

impl Unsigned {
    /// Creates a value from content octets.
    pub(crate) fn from_content(content: Bytes) -> Self {
        Unsigned(content)
    }

    /// Returns the content octets.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Converts the value into a `u32` if it fits.
    pub fn to_u32(&self) -> Option<u32> {
        self.to_u64().and_then(|res| u32::try_from(res).ok())
    }

    /// Converts the value into a `u64` if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        let mut octets = self.0.as_ref();
        while octets.len() > 1 && octets[0] == 0 {
            octets = &octets[1..];
        }
        if octets.len() > 8 {
            return None
        }
        let mut res = 0u64;
        for &octet in octets {
            res = (res << 8) | u64::from(octet);
        }
        Some(res)
    }
}

impl AsRef<[u8]> for Unsigned {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn int(octets: &'static [u8]) -> Integer {
        Integer::from_content(Bytes::from_static(octets))
    }

    fn uns(octets: &'static [u8]) -> Unsigned {
        Unsigned::from_content(Bytes::from_static(octets))
    }

    #[test]
    fn signed_conversion() {
        assert_eq!(int(b"\x00").to_i32(), Some(0));
        assert_eq!(int(b"\x7f").to_i32(), Some(127));
        assert_eq!(int(b"\x80").to_i32(), Some(-128));
        assert_eq!(int(b"\xff").to_i32(), Some(-1));
        assert_eq!(int(b"\x00\x80").to_i32(), Some(128));
        assert_eq!(int(b"\x7f\xff\xff\xff").to_i32(), Some(i32::MAX));
        assert_eq!(int(b"\x80\x00\x00\x00").to_i32(), Some(i32::MIN));
        assert_eq!(int(b"\x00\x80\x00\x00\x00").to_i32(), None);
        assert_eq!(int(b"\x00\xff\xff\xff\xff").to_i32(), None);
        // Redundant sign extension still converts.
        assert_eq!(int(b"\x00\x00\x7f").to_i32(), Some(127));
        assert_eq!(int(b"\xff\xff\x80").to_i32(), Some(-128));
        assert_eq!(
            int(b"\x7f\xff\xff\xff\xff\xff\xff\xff").to_i64(),
            Some(i64::MAX)
        );
        assert_eq!(
            int(b"\x01\x00\x00\x00\x00\x00\x00\x00\x00").to_i64(),
            None
        );
    }

    #[test]
    fn sign() {
        assert!(!int(b"\x00").is_negative());
        assert!(int(b"\x80").is_negative());
        assert!(!int(b"\x00\xff").is_negative());
    }

    #[test]
    fn unsigned_conversion() {
        assert_eq!(uns(b"\x00").to_u32(), Some(0));
        assert_eq!(uns(b"\xff").to_u32(), Some(255));
        assert_eq!(uns(b"\x00\xff\xff\xff\xff").to_u32(), Some(u32::MAX));
        assert_eq!(uns(b"\x01\x00\x00\x00\x00").to_u32(), None);
        assert_eq!(
            uns(b"\x00\xff\xff\xff\xff\xff\xff\xff\xff").to_u64(),
            Some(u64::MAX)
        );
    }
}
