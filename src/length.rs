//! The length octets.
//!
//! This is a private module. The [`Length`] type defined herein is not
//! publicly exposed.

use std::io;
use smallvec::SmallVec;
use crate::error::{ContentError, DecodeError};
use crate::mode::Mode;


//------------ Length --------------------------------------------------------

/// The length octets of an encoded value.
///
/// A length is either definite, giving the actual number of content
/// octets, or indefinite, in which case the content is delimited by an
/// end-of-contents marker.
///
/// # BER Encoding
///
/// If the most significant bit of the first octet is clear, the remaining
/// seven bits are the definite length themselves. If it is set, the
/// remaining bits give the number of following octets that carry the
/// big-endian definite length -- except that zero following octets, i.e.,
/// the single octet 0x80, signals the indefinite form. At most four
/// length octets may follow and the resulting value must fit a 31 bit
/// integer; anything else is malformed.
///
/// Under DER, a definite length must use the minimum number of octets:
/// the long form must not start with a zero octet and must not encode a
/// value the short form could carry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Length {
    /// A definite length of the given number of content octets.
    Definite(usize),

    /// The indefinite form.
    Indefinite,
}

/// The largest length value we accept.
const MAX_LENGTH: u64 = i32::MAX as u64;

impl Length {
    /// Parses the length octets at the start of `data`.
    ///
    /// Returns the length and the number of octets it occupied. In
    /// relaxed mode, non-minimal encodings are accepted.
    pub fn parse(
        data: &[u8], mode: Mode
    ) -> Result<(Self, usize), ContentError> {
        let first = match data.first() {
            Some(first) => *first,
            None => {
                return Err(ContentError::from_static(
                    "unexpected end of data"
                ))
            }
        };
        if first & 0x80 == 0 {
            return Ok((Length::Definite(first.into()), 1))
        }
        if first == 0x80 {
            return Ok((Length::Indefinite, 1))
        }
        let count = usize::from(first & 0x7f);
        if count > 4 {
            return Err(ContentError::from_static("invalid length octets"))
        }
        let octets = match data.get(1..count + 1) {
            Some(octets) => octets,
            None => {
                return Err(ContentError::from_static(
                    "unexpected end of data"
                ))
            }
        };
        if octets[0] == 0 && !mode.is_relaxed() {
            return Err(ContentError::from_static("redundant length octets"))
        }
        let mut value = 0u64;
        for &octet in octets {
            value = (value << 8) | u64::from(octet);
        }
        if value > MAX_LENGTH {
            return Err(ContentError::from_static("invalid length octets"))
        }
        if value < 0x80 && !mode.is_relaxed() {
            return Err(ContentError::from_static(
                "non-minimal length octets"
            ))
        }
        Ok((Length::Definite(value as usize), count + 1))
    }

    /// Reads the length octets from a byte source.
    ///
    /// The octets are read one at a time without an upper bound on how
    /// many octets the source may still hold. Unlike [`Length::parse`],
    /// this always insists on minimal encoding for the definite form.
    pub fn read_from<R: io::Read>(
        reader: &mut R
    ) -> Result<Self, DecodeError> {
        let first = read_u8(reader)?;
        if first & 0x80 == 0 {
            return Ok(Length::Definite(first.into()))
        }
        if first == 0x80 {
            return Ok(Length::Indefinite)
        }
        let count = usize::from(first & 0x7f);
        if count > 4 {
            return Err(DecodeError::content("invalid length octets", 0));
        }
        let mut value = u64::from(read_u8(reader)?);
        if value == 0 {
            return Err(DecodeError::content("redundant length octets", 0));
        }
        for _ in 1..count {
            value = (value << 8) | u64::from(read_u8(reader)?);
        }
        if value > MAX_LENGTH {
            return Err(DecodeError::content("invalid length octets", 0));
        }
        if value < 0x80 {
            return Err(DecodeError::content(
                "non-minimal length octets", 0
            ));
        }
        Ok(Length::Definite(value as usize))
    }

    /// Returns the length if it is definite.
    pub fn definite(self) -> Option<usize> {
        match self {
            Length::Definite(len) => Some(len),
            Length::Indefinite => None,
        }
    }

    /// Returns the number of octets of the encoded form of the length.
    pub fn encoded_len(self) -> usize {
        match self {
            Length::Definite(len) => {
                if len < 0x80 {
                    1
                }
                else {
                    width(len) + 1
                }
            }
            Length::Indefinite => 1,
        }
    }

    /// Appends the minimal encoded form to the end of `target`.
    pub fn append_encoded(self, target: &mut Vec<u8>) {
        match self {
            Length::Definite(len) => {
                target.extend_from_slice(&minimal_bytes(len))
            }
            Length::Indefinite => target.push(0x80),
        }
    }

    /// Writes the minimal encoded form to the given writer.
    pub fn write_encoded<W: io::Write>(
        self, target: &mut W
    ) -> Result<(), io::Error> {
        match self {
            Length::Definite(len) => {
                target.write_all(&minimal_bytes(len))
            }
            Length::Indefinite => target.write_all(&[0x80]),
        }
    }
}


//------------ Helper Functions ----------------------------------------------

/// Returns the minimal-form encoding of a definite length.
pub fn minimal_bytes(len: usize) -> SmallVec<[u8; 5]> {
    let mut res = SmallVec::new();
    if len < 0x80 {
        res.push(len as u8);
    }
    else {
        let width = width(len);
        res.push(0x80 | width as u8);
        res.extend_from_slice(
            &(len as u64).to_be_bytes()[8 - width..]
        );
    }
    res
}

/// Returns the number of octets needed for the big-endian form of `len`.
///
/// Only called for values of 0x80 and up, so the result is at least 1.
fn width(len: usize) -> usize {
    8 - (len as u64).leading_zeros() as usize / 8
}

/// Takes a single octet from the reader.
pub fn read_u8<R: io::Read>(reader: &mut R) -> Result<u8, io::Error> {
    let mut buf = [0u8];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn parse(
        data: &[u8], mode: Mode
    ) -> Result<Option<usize>, ContentError> {
        let (length, consumed) = Length::parse(data, mode)?;
        assert_eq!(consumed, data.len(), "consumed octet count");
        Ok(length.definite())
    }

    #[test]
    fn parse_ber() {
        assert_eq!(parse(b"\x00", Mode::Ber).unwrap(), Some(0x00));
        assert_eq!(parse(b"\x12", Mode::Ber).unwrap(), Some(0x12));
        assert_eq!(parse(b"\x7f", Mode::Ber).unwrap(), Some(0x7f));
        assert_eq!(parse(b"\x80", Mode::Ber).unwrap(), None);
        assert_eq!(parse(b"\x81\x00", Mode::Ber).unwrap(), Some(0));
        assert_eq!(parse(b"\x81\xf0", Mode::Ber).unwrap(), Some(0xf0));
        assert_eq!(parse(b"\x82\x00\x05", Mode::Ber).unwrap(), Some(5));
        assert_eq!(parse(b"\x82\xf0\x0e", Mode::Ber).unwrap(), Some(0xf00e));
        assert!(parse(b"\x85\x01\x01\x01\x01\x01", Mode::Ber).is_err());
        assert!(parse(b"\x84\xff\xff\xff\xff", Mode::Ber).is_err());
        assert!(parse(b"\x82\x01", Mode::Ber).is_err());
        assert!(parse(b"", Mode::Ber).is_err());
    }

    #[test]
    fn parse_der() {
        assert_eq!(parse(b"\x00", Mode::Der).unwrap(), Some(0x00));
        assert_eq!(parse(b"\x7f", Mode::Der).unwrap(), Some(0x7f));
        assert_eq!(parse(b"\x80", Mode::Der).unwrap(), None);
        assert!(parse(b"\x81\x00", Mode::Der).is_err());
        assert!(parse(b"\x81\x7f", Mode::Der).is_err());
        assert_eq!(parse(b"\x81\x80", Mode::Der).unwrap(), Some(0x80));
        assert!(parse(b"\x82\x00\x05", Mode::Der).is_err());
        assert_eq!(
            parse(b"\x82\xf0\x0e", Mode::Der).unwrap(), Some(0xf00e)
        );
    }

    #[test]
    fn read() {
        fn read(data: &[u8]) -> Result<Option<usize>, DecodeError> {
            Length::read_from(&mut &data[..]).map(Length::definite)
        }

        assert_eq!(read(b"\x26").unwrap(), Some(0x26));
        assert_eq!(read(b"\x80").unwrap(), None);
        assert_eq!(read(b"\x81\x80").unwrap(), Some(0x80));
        assert_eq!(read(b"\x82\xf0\x0e").unwrap(), Some(0xf00e));
        assert!(read(b"\x81\x00").is_err());
        assert!(read(b"\x81\x05").is_err());
        assert!(read(b"\x85\x01\x01\x01\x01\x01").is_err());
        assert!(read(b"\x84\x80\x00\x00\x00").is_err());
        assert!(read(b"\x82\x01").is_err());
        assert!(read(b"").is_err());
    }

    #[test]
    fn encode() {
        fn step(len: Length, expected: &[u8]) {
            let mut vec = Vec::new();
            len.append_encoded(&mut vec);
            assert_eq!(vec.as_slice(), expected, "append failed for {len:?}");
            assert_eq!(len.encoded_len(), expected.len());

            let mut vec = Vec::new();
            len.write_encoded(&mut vec).unwrap();
            assert_eq!(vec.as_slice(), expected, "write failed for {len:?}");
        }

        step(Length::Indefinite, b"\x80");
        step(Length::Definite(0), b"\x00");
        step(Length::Definite(0x12), b"\x12");
        step(Length::Definite(0x7f), b"\x7f");
        step(Length::Definite(0x80), b"\x81\x80");
        step(Length::Definite(0xdead), b"\x82\xde\xad");
        step(Length::Definite(0x01_0000), b"\x83\x01\x00\x00");
        step(Length::Definite(0x0100_0000), b"\x84\x01\x00\x00\x00");
    }

    #[test]
    fn round_trip() {
        for len in [0, 1, 0x7f, 0x80, 0xff, 0x100, 0xffff, 0x1_0000] {
            let mut vec = Vec::new();
            Length::Definite(len).append_encoded(&mut vec);
            assert_eq!(
                Length::parse(&vec, Mode::Der).unwrap(),
                (Length::Definite(len), vec.len())
            );
        }
    }
}
