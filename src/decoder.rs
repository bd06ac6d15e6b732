//! Decoding a sequence of values from a byte range.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use crate::bits::BitArray;
use crate::error::DecodeError;
use crate::int::{Integer, Unsigned};
use crate::mode::Mode;
use crate::oid::Oid;
use crate::tag::Tag;
use crate::value::TaggedValue;


//------------ ValueDecoder --------------------------------------------------

/// A cursor decoding one value after another from a byte range.
///
/// A decoder is bound to a range of a shared buffer, either standalone
/// via [`new`][Self::new] or covering the content of a constructed
/// [`TaggedValue`]. Each call to [`next_value`][Self::next_value]
/// parses the value at the current position and advances past it, so
/// the decoder produces the finite sequence of values the range holds,
/// one at a time. The same sequence is available through the
/// [`Iterator`] implementation.
///
/// The cursor is ordinary owned state. Sharing a decoder between
/// readers is not possible; independent decoders over independent data
/// are fully independent.
#[derive(Clone, Debug)]
pub struct ValueDecoder {
    /// The shared buffer the decoder reads from.
    buffer: Bytes,

    /// The start of the decoder's range.
    start: usize,

    /// The end of the decoder's range.
    end: usize,

    /// The current read position.
    ///
    /// This only ever moves forward and stays within `start..=end`.
    pos: usize,

    /// The decoding mode.
    mode: Mode,
}

/// # General Management
///
impl ValueDecoder {
    /// Creates a decoder over a complete buffer.
    pub fn new(data: impl Into<Bytes>, mode: Mode) -> Self {
        let buffer = data.into();
        let end = buffer.len();
        ValueDecoder { buffer, start: 0, end, pos: 0, mode }
    }

    /// Creates a decoder over part of a shared buffer.
    pub(crate) fn with_range(
        buffer: Bytes, start: usize, end: usize, mode: Mode
    ) -> Self {
        assert!(start <= end && end <= buffer.len());
        ValueDecoder { buffer, start, end, pos: start, mode }
    }

    /// Returns the decoding mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the number of octets left to decode.
    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    /// Moves the position back to the start of the range.
    pub fn reset(&mut self) {
        self.pos = self.start
    }

    /// Moves the position to the end of the range.
    pub(crate) fn reach_end(&mut self) {
        self.pos = self.end
    }
}

/// # Decoding Values
///
impl ValueDecoder {
    /// Returns the octet at the current position without advancing.
    ///
    /// This is the tag octet of the next value if there is one. Fails
    /// at the end of the range.
    pub fn peek_byte(&self) -> Result<u8, DecodeError> {
        if self.pos == self.end {
            Err(DecodeError::content("unexpected end of data", self.pos))
        }
        else {
            Ok(self.buffer[self.pos])
        }
    }

    /// Decodes the value at the current position and advances past it.
    ///
    /// Fails if fewer than two octets remain or the value is malformed.
    /// For a value in indefinite length encoding, the position advances
    /// past everything the value actually occupied in this range,
    /// leaving whatever followed it for the next call.
    pub fn next_value(&mut self) -> Result<TaggedValue, DecodeError> {
        let (res, consumed) = TaggedValue::parse(
            &self.buffer, self.pos, self.end - self.pos, self.mode, false
        )?;
        self.pos += consumed;
        Ok(res)
    }

    /// Decodes the value at the current position and discards it.
    ///
    /// Advances and validates exactly like
    /// [`next_value`][Self::next_value].
    pub fn skip_value(&mut self) -> Result<(), DecodeError> {
        self.next_value().map(|_| ())
    }

    /// Checks that all data has been decoded.
    ///
    /// Returns an error if octets remain before the end of the range.
    pub fn exhausted(&self) -> Result<(), DecodeError> {
        if self.pos == self.end {
            Ok(())
        }
        else {
            Err(DecodeError::content("trailing data", self.pos))
        }
    }
}

/// # Decoding Standard Values
///
/// These methods decode the next value and convert it via the matching
/// [`TaggedValue`] accessor in one step.
impl ValueDecoder {
    /// Decodes the next value as a BOOLEAN.
    pub fn take_bool(&mut self) -> Result<bool, DecodeError> {
        self.next_value()?.to_bool()
    }

    /// Decodes the next value as an INTEGER limited to the `i32` range.
    pub fn take_i32(&mut self) -> Result<i32, DecodeError> {
        self.next_value()?.to_i32()
    }

    /// Decodes the next value as an INTEGER of any length.
    pub fn take_integer(&mut self) -> Result<Integer, DecodeError> {
        self.next_value()?.to_integer()
    }

    /// Decodes the next value as an INTEGER forced to be positive.
    pub fn take_unsigned(&mut self) -> Result<Unsigned, DecodeError> {
        self.next_value()?.to_unsigned()
    }

    /// Decodes the next value as an ENUMERATED.
    pub fn take_enumerated(&mut self) -> Result<i32, DecodeError> {
        self.next_value()?.to_enumerated()
    }

    /// Decodes the next value as an OBJECT IDENTIFIER.
    pub fn take_oid(&mut self) -> Result<Oid, DecodeError> {
        self.next_value()?.to_oid()
    }

    /// Decodes the next value as an OCTET STRING.
    pub fn take_octet_string(&mut self) -> Result<Bytes, DecodeError> {
        self.next_value()?.to_octet_string()
    }

    /// Decodes the next value as a byte-aligned BIT STRING.
    pub fn take_bit_string(&mut self) -> Result<Bytes, DecodeError> {
        self.next_value()?.to_bit_string()
    }

    /// Decodes the next value as a BIT STRING of any bit length.
    pub fn take_bit_array(&mut self) -> Result<BitArray, DecodeError> {
        self.next_value()?.to_bit_array()
    }

    /// Decodes the next value as a NULL.
    pub fn take_null(&mut self) -> Result<(), DecodeError> {
        self.next_value()?.to_null()
    }

    /// Decodes the next value as a PrintableString.
    pub fn take_printable_string(&mut self) -> Result<String, DecodeError> {
        self.next_value()?.to_printable_string()
    }

    /// Decodes the next value as an IA5String.
    pub fn take_ia5_string(&mut self) -> Result<String, DecodeError> {
        self.next_value()?.to_ia5_string()
    }

    /// Decodes the next value as a TeletexString.
    pub fn take_t61_string(&mut self) -> Result<String, DecodeError> {
        self.next_value()?.to_t61_string()
    }

    /// Decodes the next value as a BMPString.
    pub fn take_bmp_string(&mut self) -> Result<String, DecodeError> {
        self.next_value()?.to_bmp_string()
    }

    /// Decodes the next value as a UTF8String.
    pub fn take_utf8_string(&mut self) -> Result<String, DecodeError> {
        self.next_value()?.to_utf8_string()
    }

    /// Decodes the next value as a GeneralString.
    pub fn take_general_string(&mut self) -> Result<String, DecodeError> {
        self.next_value()?.to_general_string()
    }

    /// Decodes the next value as a UniversalString.
    pub fn take_universal_string(&mut self) -> Result<String, DecodeError> {
        self.next_value()?.to_universal_string()
    }

    /// Decodes the next value as a UTCTime.
    pub fn take_utc_time(&mut self) -> Result<DateTime<Utc>, DecodeError> {
        self.next_value()?.to_utc_time()
    }

    /// Decodes the next value as a GeneralizedTime.
    pub fn take_generalized_time(
        &mut self
    ) -> Result<DateTime<Utc>, DecodeError> {
        self.next_value()?.to_generalized_time()
    }

    /// Decodes the next value as a SEQUENCE, returning its elements.
    pub fn take_sequence(
        &mut self
    ) -> Result<Vec<TaggedValue>, DecodeError> {
        self.next_value()?.components(Some(Tag::SEQUENCE))
    }

    /// Decodes the next value as a SET, returning its members.
    pub fn take_set(&mut self) -> Result<Vec<TaggedValue>, DecodeError> {
        self.next_value()?.components(Some(Tag::SET))
    }
}


//--- Iterator

/// Iterating over a decoder yields the values left in its range.
///
/// After an error is yielded the iterator is finished; the position is
/// then at the end of the range.
impl Iterator for ValueDecoder {
    type Item = Result<TaggedValue, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.end {
            return None
        }
        match self.next_value() {
            Ok(value) => Some(Ok(value)),
            Err(err) => {
                self.reach_end();
                Some(Err(err))
            }
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    const PAIR: &[u8] = b"\x04\x02\x61\x62\x02\x01\x2a";

    #[test]
    fn sequential_decoding() {
        let mut decoder = ValueDecoder::new(PAIR, Mode::Der);
        assert_eq!(decoder.remaining(), 7);
        assert_eq!(decoder.peek_byte().unwrap(), 0x04);
        assert_eq!(
            decoder.take_octet_string().unwrap().as_ref(), b"ab"
        );
        assert_eq!(decoder.peek_byte().unwrap(), 0x02);
        assert_eq!(decoder.take_i32().unwrap(), 42);
        assert_eq!(decoder.remaining(), 0);
        assert!(decoder.peek_byte().is_err());
        decoder.exhausted().unwrap();
    }

    #[test]
    fn skip_equals_decode() {
        let mut decoded = ValueDecoder::new(PAIR, Mode::Der);
        let mut skipped = decoded.clone();
        decoded.next_value().unwrap();
        skipped.skip_value().unwrap();
        assert_eq!(decoded.remaining(), skipped.remaining());
        decoded.next_value().unwrap();
        skipped.skip_value().unwrap();
        assert_eq!(decoded.remaining(), skipped.remaining());
        skipped.exhausted().unwrap();
    }

    #[test]
    fn reset() {
        let mut decoder = ValueDecoder::new(PAIR, Mode::Der);
        decoder.skip_value().unwrap();
        decoder.skip_value().unwrap();
        decoder.reset();
        assert_eq!(decoder.remaining(), 7);
        assert_eq!(decoder.take_octet_string().unwrap().as_ref(), b"ab");
    }

    #[test]
    fn iteration() {
        let values: Vec<_> = ValueDecoder::new(PAIR, Mode::Der)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].tag(), Tag::OCTET_STRING);
        assert_eq!(values[1].tag(), Tag::INTEGER);
    }

    #[test]
    fn iteration_stops_after_error() {
        let mut decoder = ValueDecoder::new(
            b"\x04\x02\x61\x62\x02".as_ref(), Mode::Der
        );
        assert!(decoder.next().unwrap().is_ok());
        assert!(decoder.next().unwrap().is_err());
        assert!(decoder.next().is_none());
    }

    #[test]
    fn too_short_input() {
        let mut decoder = ValueDecoder::new(b"\x04".as_ref(), Mode::Der);
        assert!(decoder.next_value().is_err());
        assert!(decoder.exhausted().is_err());
    }

    #[test]
    fn nested_collections() {
        // SEQUENCE { INTEGER 1, SET { BOOLEAN true } }
        let data = b"\x30\x08\x02\x01\x01\x31\x03\x01\x01\xff";
        let mut decoder = ValueDecoder::new(data.as_ref(), Mode::Der);
        let seq = decoder.take_sequence().unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq[0].tag(), Tag::INTEGER);
        let set = seq[1].components(Some(Tag::SET)).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].tag(), Tag::BOOLEAN);
        decoder.exhausted().unwrap();
    }

    //--- The reference behavior for indefinite values inside a stream
    //    of further values: the decoder must advance past exactly the
    //    octets the indefinite value occupied, no matter that the value
    //    itself is backed by a rewritten buffer.

    const INDEF_IN_SEQUENCE: &[u8] =
        b"\x30\x0f\x24\x80\x04\x02\x61\x62\x04\x02\x63\x64\x00\x00\
          \x01\x01\x01";

    #[test]
    fn indefinite_value_inside_sequence() {
        let mut value = TaggedValue::decode(INDEF_IN_SEQUENCE, Mode::Ber)
            .unwrap();
        let data = value.data();
        assert_eq!(
            data.next_value().unwrap().to_octet_string().unwrap().as_ref(),
            b"abcd"
        );
        assert!(data.take_bool().unwrap());
        data.exhausted().unwrap();
    }

    #[test]
    fn indefinite_value_skipped_inside_sequence() {
        let mut value = TaggedValue::decode(INDEF_IN_SEQUENCE, Mode::Ber)
            .unwrap();
        let data = value.data();
        data.skip_value().unwrap();
        assert!(data.take_bool().unwrap());
        data.exhausted().unwrap();
    }
}
