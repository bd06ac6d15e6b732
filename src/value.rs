//! A single decoded value.

use std::{fmt, io};
use bytes::Bytes;
use chrono::{DateTime, Duration, TimeZone, Utc};
use crate::bits::BitArray;
use crate::decoder::ValueDecoder;
use crate::error::{ContentError, DecodeError};
use crate::indef;
use crate::int::{Integer, Unsigned};
use crate::length::{self, Length};
use crate::mode::Mode;
use crate::oid::Oid;
use crate::tag::Tag;


//------------ TaggedValue ---------------------------------------------------

/// A single BER or DER encoded value.
///
/// All encoded data are tag-length-value triples. This type represents
/// one such triple as it has been read or constructed and provides
/// structured access to the content: one accessor per supported
/// universal type, each of which checks the tag at run time before
/// interpreting the content octets. The supported subset is what
/// parsing X.509 certificates and related formats requires.
///
/// A value never owns its content exclusively. It holds a handle to a
/// shared buffer together with the `start..end` range of its content
/// octets, so decoding nested structures never copies data. The buffer
/// is immutable once the value exists. The only mutable state is the
/// value's own content cursor, exposed via [`data`][Self::data]: every
/// typed accessor moves that cursor to the end of the content as a side
/// effect, consuming the content logically.
///
/// Values decoded from an indefinite length encoding are backed by the
/// buffer the normalization pass produced instead of the input buffer;
/// see the [`indef`][crate::indef] module.
#[derive(Clone)]
pub struct TaggedValue {
    /// The tag of the value.
    tag: Tag,

    /// The shared buffer holding the content octets.
    buffer: Bytes,

    /// The start of the content octets within the buffer.
    start: usize,

    /// The end of the content octets within the buffer.
    end: usize,

    /// The decoding mode.
    mode: Mode,

    /// The value's content cursor.
    data: ValueDecoder,
}

/// # Construction
///
impl TaggedValue {
    /// Puts a value together from its parts.
    fn assemble(
        tag: Tag, buffer: Bytes, start: usize, end: usize, mode: Mode
    ) -> Self {
        assert!(start <= end && end <= buffer.len());
        let data = ValueDecoder::with_range(buffer.clone(), start, end, mode);
        TaggedValue { tag, buffer, start, end, mode, data }
    }

    /// Creates a value from a tag and finished content octets.
    ///
    /// The content is used as is without any validation.
    pub fn new(tag: Tag, content: impl Into<Bytes>) -> Self {
        let buffer = content.into();
        let end = buffer.len();
        Self::assemble(tag, buffer, 0, end, Mode::Ber)
    }

    /// Creates a character string value from a tag and a string.
    ///
    /// The string is converted into the byte encoding the tag demands:
    /// ASCII for PrintableString, IA5String, and GeneralString, Latin-1
    /// for TeletexString, UTF-16 big-endian for BMPString, UTF-8 for
    /// UTF8String, and UTF-32 big-endian for UniversalString.
    /// Characters the encoding cannot express become question marks.
    /// Fails for any other tag.
    pub fn from_string(tag: Tag, value: &str) -> Result<Self, DecodeError> {
        let content = encode_string(tag, value)
            .map_err(|err| DecodeError::content(err, 0))?;
        let buffer = Bytes::from(content);
        let end = buffer.len();
        Ok(Self::assemble(tag, buffer, 0, end, Mode::Der))
    }

    /// Decodes a single value from a complete buffer.
    ///
    /// The buffer must hold exactly one value including its tag and
    /// length octets; trailing data is an error. The exception is a
    /// value in indefinite length encoding, where input past the
    /// end-of-contents marker closing the value is tolerated.
    pub fn decode(
        data: impl Into<Bytes>, mode: Mode
    ) -> Result<Self, DecodeError> {
        let buffer = data.into();
        let len = buffer.len();
        Self::parse(&buffer, 0, len, mode, true).map(|(value, _)| value)
    }

    /// Reads a single value from an open byte source.
    ///
    /// The source may hold additional data after the value. Tag and
    /// length octets are read one at a time; the length octets must be
    /// in minimal form. A value in indefinite length encoding is
    /// normalized by reading ahead until all its segments are closed,
    /// which may block; the source should then hold only the one value.
    pub fn read_from<R: io::Read>(
        reader: &mut R, mode: Mode
    ) -> Result<Self, DecodeError> {
        let tag = Tag::from(length::read_u8(reader)?);
        match Length::read_from(reader)? {
            Length::Indefinite => {
                let converted = Bytes::from(
                    indef::convert_reader(reader, tag.to_u8(), 0x80)?
                );
                let (start, end) = Self::check_converted(
                    tag, &converted, mode
                )?;
                let content_len = end - start;
                Ok(Self::assemble(
                    tag, converted.slice(start..end), 0, content_len, mode
                ))
            }
            Length::Definite(len) => {
                let mut content = vec![0u8; len];
                reader.read_exact(&mut content)?;
                Ok(Self::assemble(tag, content.into(), 0, len, mode))
            }
        }
    }

    /// Parses a value from part of a buffer.
    ///
    /// Decodes the value starting at `offset` with at most `len` octets
    /// available to it. With `exact`, octets remaining after a definite
    /// length value are refused. Returns the value and the number of
    /// octets of the input range it consumed.
    pub(crate) fn parse(
        buffer: &Bytes, offset: usize, len: usize, mode: Mode, exact: bool
    ) -> Result<(Self, usize), DecodeError> {
        if len < 2 {
            return Err(DecodeError::content(
                "unexpected end of data", offset
            ))
        }
        let mut pos = offset;
        let tag = Tag::from(buffer[pos]);
        pos += 1;
        let (length, length_len) = Length::parse(
            &buffer[pos..offset + len], mode
        ).map_err(|err| DecodeError::content(err, pos))?;
        pos += length_len;
        match length {
            Length::Indefinite => {
                if !mode.is_relaxed() {
                    return Err(DecodeError::content(
                        "indefinite length encoding not allowed",
                        offset + 1,
                    ))
                }
                let converted = match indef::convert(
                    &buffer[offset..offset + len]
                )? {
                    Some(converted) => Bytes::from(converted),
                    None => {
                        return Err(DecodeError::content(
                            "unexpected end of data", offset + len
                        ))
                    }
                };
                let (start, end) = Self::check_converted(
                    tag, &converted, mode
                )?;
                // Input past the octets closing the value stayed behind
                // the content in the converted buffer. The value consumed
                // everything up to there.
                let consumed = len - (converted.len() - end);
                Ok((
                    Self::assemble(tag, converted, start, end, mode),
                    consumed
                ))
            }
            Length::Definite(content_len) => {
                let head = pos - offset;
                if len - head < content_len {
                    return Err(DecodeError::content(
                        "unexpected end of data", offset + len
                    ))
                }
                if exact && len - head > content_len {
                    return Err(DecodeError::content(
                        "trailing data", pos + content_len
                    ))
                }
                Ok((
                    Self::assemble(
                        tag, buffer.clone(), pos, pos + content_len, mode
                    ),
                    head + content_len
                ))
            }
        }
    }

    /// Checks the outer header of a buffer the normalizer produced.
    ///
    /// The tag must equal the tag originally read and the now definite
    /// length must be covered by the buffer. Returns the content range.
    fn check_converted(
        tag: Tag, converted: &Bytes, mode: Mode
    ) -> Result<(usize, usize), DecodeError> {
        if converted.first() != Some(&tag.to_u8()) {
            return Err(DecodeError::content(
                "malformed indefinite length encoding", 0
            ))
        }
        let (length, length_len) = Length::parse(&converted[1..], mode)
            .map_err(|err| DecodeError::content(err, 1))?;
        let content_len = match length.definite() {
            Some(content_len) => content_len,
            None => {
                return Err(DecodeError::content(
                    "malformed indefinite length encoding", 1
                ))
            }
        };
        let start = 1 + length_len;
        let end = start + content_len;
        if end > converted.len() {
            return Err(DecodeError::content(
                "unexpected end of data", converted.len()
            ))
        }
        Ok((start, end))
    }
}

/// # Access to the Parts
///
impl TaggedValue {
    /// Returns the tag of the value.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the decoding mode of the value.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the number of content octets.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns whether the value has no content octets.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the content octets.
    fn content_slice(&self) -> &[u8] {
        &self.buffer[self.start..self.end]
    }

    /// Returns the content octets as a handle to the shared buffer.
    ///
    /// Like the typed accessors, this consumes the content by moving
    /// the value's cursor to the end.
    pub fn content_bytes(&mut self) -> Bytes {
        self.data.reach_end();
        self.buffer.slice(self.start..self.end)
    }

    /// Returns the value's own cursor over its content.
    ///
    /// The cursor starts out at the beginning of the content and is
    /// moved to the end by every typed accessor. For a constructed
    /// value it can be used to decode the contained values one by one.
    pub fn data(&mut self) -> &mut ValueDecoder {
        &mut self.data
    }

    /// Returns a fresh decoder over the content octets.
    ///
    /// Unlike [`data`][Self::data], the returned decoder has its own
    /// cursor and does not affect the value.
    pub fn content_decoder(&self) -> ValueDecoder {
        ValueDecoder::with_range(
            self.buffer.clone(), self.start, self.end, self.mode
        )
    }

    /// Returns the immediate child values of a constructed value.
    ///
    /// If `expected` is given, the value's tag must equal it. The
    /// content octets are decoded as a sequence of values which is
    /// returned in order.
    pub fn components(
        &self, expected: Option<Tag>
    ) -> Result<Vec<TaggedValue>, DecodeError> {
        if let Some(expected) = expected {
            if expected != self.tag {
                return Err(self.mismatch(expected))
            }
        }
        let mut res = Vec::new();
        let mut decoder = self.content_decoder();
        while decoder.remaining() > 0 {
            res.push(decoder.next_value()?);
        }
        Ok(res)
    }
}

/// # Typed Access to the Content
///
/// Each of these methods checks that the value carries the exact tag of
/// the type in question, validates the content octets, and converts
/// them. As a side effect, the value's cursor is moved to the end of
/// the content.
impl TaggedValue {
    /// Returns the content as a BOOLEAN.
    ///
    /// The content must be a single octet; any non-zero octet is true.
    pub fn to_bool(&mut self) -> Result<bool, DecodeError> {
        self.expect_tag(Tag::BOOLEAN)?;
        if self.len() != 1 {
            return Err(self.content_err("invalid BOOLEAN length"))
        }
        self.data.reach_end();
        Ok(self.buffer[self.start] != 0)
    }

    /// Returns the content as an INTEGER limited to the `i32` range.
    pub fn to_i32(&mut self) -> Result<i32, DecodeError> {
        let res = self.to_integer()?;
        res.to_i32().ok_or_else(|| {
            self.content_err("INTEGER out of range")
        })
    }

    /// Returns the content as an INTEGER of any length.
    pub fn to_integer(&mut self) -> Result<Integer, DecodeError> {
        self.integer_content().map(Integer::from_content)
    }

    /// Returns the content as an INTEGER forced to be positive.
    ///
    /// The content octets are taken as the magnitude of a non-negative
    /// value even if their sign bit is set. This deals with
    /// implementations that incorrectly encode some values as negative.
    pub fn to_unsigned(&mut self) -> Result<Unsigned, DecodeError> {
        self.integer_content().map(Unsigned::from_content)
    }

    /// Checks an INTEGER value and consumes its content octets.
    fn integer_content(&mut self) -> Result<Bytes, DecodeError> {
        self.expect_tag(Tag::INTEGER)?;
        if self.is_empty() {
            return Err(self.content_err("zero length INTEGER"))
        }
        let content = self.content_slice();
        if !self.mode.is_relaxed()
            && content.len() >= 2
            && content[0] == 0
            && content[1] & 0x80 == 0
        {
            return Err(self.content_err(
                "redundant leading octets in INTEGER"
            ))
        }
        self.data.reach_end();
        Ok(self.buffer.slice(self.start..self.end))
    }

    /// Returns the content as an ENUMERATED value.
    ///
    /// The value is taken from the low 32 bits of the content magnitude.
    pub fn to_enumerated(&mut self) -> Result<i32, DecodeError> {
        self.expect_tag(Tag::ENUMERATED)?;
        let mut res = 0u32;
        for &octet in self.content_slice() {
            res = res.wrapping_shl(8) | u32::from(octet);
        }
        self.data.reach_end();
        Ok(res as i32)
    }

    /// Returns the content as an OBJECT IDENTIFIER.
    pub fn to_oid(&mut self) -> Result<Oid, DecodeError> {
        self.expect_tag(Tag::OID)?;
        let res = Oid::from_bytes(self.buffer.slice(self.start..self.end))
            .map_err(|err| DecodeError::content(err, self.start))?;
        self.data.reach_end();
        Ok(res)
    }

    /// Returns the content as an OCTET STRING.
    ///
    /// The value may be primitive, in which case the content octets are
    /// the string, or constructed with the octet string tag number, in
    /// which case the string is the in-order concatenation of the
    /// contained octet string values. The latter supports the chained
    /// form where a long string is delivered in fragments.
    pub fn to_octet_string(&mut self) -> Result<Bytes, DecodeError> {
        if self.tag != Tag::OCTET_STRING
            && !(self.tag.is_constructed()
                && self.tag.number() == Tag::OCTET_STRING.number())
        {
            return Err(self.mismatch(Tag::OCTET_STRING))
        }
        if self.is_empty() {
            return Ok(Bytes::new())
        }
        self.data.reach_end();
        if !self.tag.is_constructed() {
            Ok(self.buffer.slice(self.start..self.end))
        }
        else {
            let mut res = Vec::with_capacity(self.len());
            let mut decoder = self.content_decoder();
            while decoder.remaining() > 0 {
                let mut part = decoder.next_value()?;
                res.extend_from_slice(part.to_octet_string()?.as_ref());
            }
            Ok(res.into())
        }
    }

    /// Returns the content as a byte-aligned BIT STRING.
    ///
    /// The first content octet gives the number of unused bits in the
    /// last octet and must be between 0 and 7. The remaining octets are
    /// returned with the unused bits of the last octet cleared.
    pub fn to_bit_string(&mut self) -> Result<Bytes, DecodeError> {
        self.expect_tag(Tag::BIT_STRING)?;
        if self.is_empty() {
            return Err(self.content_err("empty BIT STRING"))
        }
        let unused = self.buffer[self.start];
        if unused > 7 {
            return Err(self.content_err(
                "invalid number of unused bits"
            ))
        }
        self.data.reach_end();
        if unused == 0 {
            Ok(self.buffer.slice(self.start + 1..self.end))
        }
        else {
            let mut res = self.buffer[self.start + 1..self.end].to_vec();
            if let Some(last) = res.last_mut() {
                *last &= 0xffu8 << unused;
            }
            Ok(res.into())
        }
    }

    /// Returns the content as a BIT STRING of any bit length.
    ///
    /// Content consisting of nothing but the unused bit count is an
    /// empty bit array.
    pub fn to_bit_array(&mut self) -> Result<BitArray, DecodeError> {
        self.expect_tag(Tag::BIT_STRING)?;
        if self.is_empty() {
            return Err(self.content_err("empty BIT STRING"))
        }
        self.data.reach_end();
        if self.len() == 1 {
            return Ok(BitArray::empty())
        }
        let unused = self.buffer[self.start];
        if unused > 7 {
            return Err(self.content_err(
                "invalid number of unused bits"
            ))
        }
        let bits = (self.len() - 1) * 8 - usize::from(unused);
        BitArray::new(bits, self.buffer.slice(self.start + 1..self.end))
            .map_err(|err| DecodeError::content(err, self.start))
    }

    /// Checks that the value is a NULL.
    pub fn to_null(&mut self) -> Result<(), DecodeError> {
        self.expect_tag(Tag::NULL)?;
        if !self.is_empty() {
            return Err(self.content_err("invalid NULL length"))
        }
        Ok(())
    }
}

/// # Character String Content
///
/// The string accessors substitute U+FFFD for octets the character
/// encoding of the type cannot represent rather than failing, matching
/// what certificate processing expects from real-world data.
impl TaggedValue {
    /// Returns the content as a PrintableString.
    pub fn to_printable_string(&mut self) -> Result<String, DecodeError> {
        self.consume_string(Tag::PRINTABLE_STRING)?;
        Ok(decode_ascii(self.content_slice()))
    }

    /// Returns the content as an IA5String.
    pub fn to_ia5_string(&mut self) -> Result<String, DecodeError> {
        self.consume_string(Tag::IA5_STRING)?;
        Ok(decode_ascii(self.content_slice()))
    }

    /// Returns the content as a TeletexString.
    ///
    /// The content is taken to be ISO 8859-1 as common practice has it.
    pub fn to_t61_string(&mut self) -> Result<String, DecodeError> {
        self.consume_string(Tag::T61_STRING)?;
        Ok(self.content_slice().iter().map(|&octet| {
            char::from(octet)
        }).collect())
    }

    /// Returns the content as a BMPString.
    pub fn to_bmp_string(&mut self) -> Result<String, DecodeError> {
        self.consume_string(Tag::BMP_STRING)?;
        Ok(decode_utf16_be(self.content_slice()))
    }

    /// Returns the content as a UTF8String.
    pub fn to_utf8_string(&mut self) -> Result<String, DecodeError> {
        self.consume_string(Tag::UTF8_STRING)?;
        Ok(String::from_utf8_lossy(self.content_slice()).into_owned())
    }

    /// Returns the content as a GeneralString.
    pub fn to_general_string(&mut self) -> Result<String, DecodeError> {
        self.consume_string(Tag::GENERAL_STRING)?;
        Ok(decode_ascii(self.content_slice()))
    }

    /// Returns the content as a UniversalString.
    ///
    /// Content that cannot be interpreted as UTF-32 big-endian results
    /// in an empty string rather than an error.
    pub fn to_universal_string(&mut self) -> Result<String, DecodeError> {
        self.consume_string(Tag::UNIVERSAL_STRING)?;
        Ok(decode_utf32_be(self.content_slice()))
    }

    /// Returns the content of any character string value.
    ///
    /// Dispatches on the tag; returns `None` if the value is not of a
    /// supported character string type.
    pub fn to_text(&mut self) -> Option<String> {
        if self.tag == Tag::UTF8_STRING {
            self.to_utf8_string().ok()
        }
        else if self.tag == Tag::PRINTABLE_STRING {
            self.to_printable_string().ok()
        }
        else if self.tag == Tag::T61_STRING {
            self.to_t61_string().ok()
        }
        else if self.tag == Tag::IA5_STRING {
            self.to_ia5_string().ok()
        }
        else if self.tag == Tag::UNIVERSAL_STRING {
            self.to_universal_string().ok()
        }
        else if self.tag == Tag::BMP_STRING {
            self.to_bmp_string().ok()
        }
        else if self.tag == Tag::GENERAL_STRING {
            self.to_general_string().ok()
        }
        else {
            None
        }
    }

    /// Checks the tag of a string value and consumes the content.
    fn consume_string(&mut self, tag: Tag) -> Result<(), DecodeError> {
        self.expect_tag(tag)?;
        self.data.reach_end();
        Ok(())
    }
}

/// # Time Content
///
impl TaggedValue {
    /// Returns the content as a UTCTime.
    ///
    /// The time is `YYMMDDhhmm`, optionally followed by seconds, and
    /// closed by `Z` or a `+hhmm`/`-hhmm` offset. Years below 50 are
    /// taken to be 20xx, others 19xx.
    pub fn to_utc_time(&mut self) -> Result<DateTime<Utc>, DecodeError> {
        self.expect_tag(Tag::UTC_TIME)?;
        if self.len() < 11 || self.len() > 17 {
            return Err(self.content_err("invalid UTCTime length"))
        }
        self.data.reach_end();
        self.parse_time(false)
    }

    /// Returns the content as a GeneralizedTime.
    ///
    /// Like UTCTime but with a four digit year and optional fractional
    /// seconds, which are kept to millisecond precision. Digits beyond
    /// milliseconds are validated but dropped.
    pub fn to_generalized_time(
        &mut self
    ) -> Result<DateTime<Utc>, DecodeError> {
        self.expect_tag(Tag::GENERALIZED_TIME)?;
        if self.len() < 13 {
            return Err(self.content_err(
                "invalid GeneralizedTime length"
            ))
        }
        self.data.reach_end();
        self.parse_time(true)
    }

    fn parse_time(
        &self, generalized: bool
    ) -> Result<DateTime<Utc>, DecodeError> {
        let content = self.content_slice();
        let invalid = || self.content_err("invalid time encoding");
        let mut pos = 0;
        let mut len = content.len();

        let year = if generalized {
            let high = digits2(content, &mut pos).ok_or_else(invalid)?;
            let low = digits2(content, &mut pos).ok_or_else(invalid)?;
            len -= 2;
            high * 100 + low
        }
        else {
            let year = digits2(content, &mut pos).ok_or_else(invalid)?;
            if year < 50 { year + 2000 } else { year + 1900 }
        };
        let month = digits2(content, &mut pos).ok_or_else(invalid)?;
        let day = digits2(content, &mut pos).ok_or_else(invalid)?;
        let hour = digits2(content, &mut pos).ok_or_else(invalid)?;
        let minute = digits2(content, &mut pos).ok_or_else(invalid)?;
        len -= 10;

        let mut second = 0;
        let mut millis = 0i64;
        if len > 2 {
            second = digits2(content, &mut pos).ok_or_else(invalid)?;
            len -= 2;
            if matches!(content.get(pos), Some(b'.') | Some(b',')) {
                pos += 1;
                len -= 1;
                let mut precision = 0usize;
                loop {
                    match content.get(pos) {
                        Some(b'Z') | Some(b'+') | Some(b'-') => break,
                        _ => {
                            let digit = digit(content, &mut pos)
                                .ok_or_else(invalid)?;
                            precision += 1;
                            match precision {
                                1 => millis += i64::from(digit) * 100,
                                2 => millis += i64::from(digit) * 10,
                                3 => millis += i64::from(digit),
                                _ => { }
                            }
                        }
                    }
                }
                if precision == 0 {
                    return Err(self.content_err(
                        "empty fractional seconds"
                    ))
                }
                len -= precision;
            }
        }

        if month == 0 || day == 0
            || month > 12 || day > 31
            || hour >= 24 || minute >= 60 || second >= 60
        {
            return Err(self.content_err("invalid time"))
        }
        let time = Utc.with_ymd_and_hms(
            year as i32, month, day, hour, minute, second
        ).single().ok_or_else(|| {
            self.content_err("invalid time")
        })? + Duration::milliseconds(millis);

        if len != 1 && len != 5 {
            return Err(self.content_err("invalid time zone offset"))
        }
        let sign = *content.get(pos).ok_or_else(invalid)?;
        pos += 1;
        match sign {
            b'Z' => Ok(time),
            b'+' | b'-' => {
                let hours = digits2(content, &mut pos)
                    .ok_or_else(invalid)?;
                let minutes = digits2(content, &mut pos)
                    .ok_or_else(invalid)?;
                if hours >= 24 || minutes >= 60 {
                    return Err(self.content_err(
                        "invalid time zone offset"
                    ))
                }
                let offset = Duration::minutes(
                    i64::from(hours * 60 + minutes)
                );
                if sign == b'+' {
                    Ok(time - offset)
                }
                else {
                    Ok(time + offset)
                }
            }
            _ => Err(self.content_err("invalid time zone offset"))
        }
    }
}

/// # Canonical Re-encoding
///
/// A value always encodes back into the canonical form: the tag octet,
/// the minimal-form length of the content, and the content octets
/// verbatim, regardless of how it was originally encoded.
impl TaggedValue {
    /// Returns the length of the encoded value.
    pub fn encoded_len(&self) -> usize {
        1 + Length::Definite(self.len()).encoded_len() + self.len()
    }

    /// Appends the encoded value to the end of `target`.
    pub fn append_encoded(&self, target: &mut Vec<u8>) {
        target.push(self.tag.to_u8());
        Length::Definite(self.len()).append_encoded(target);
        target.extend_from_slice(self.content_slice());
    }

    /// Writes the encoded value to the given writer.
    pub fn write_encoded<W: io::Write>(
        &self, target: &mut W
    ) -> Result<(), io::Error> {
        target.write_all(&[self.tag.to_u8()])?;
        Length::Definite(self.len()).write_encoded(target)?;
        target.write_all(self.content_slice())
    }

    /// Returns the encoded value as a vec.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut res = Vec::with_capacity(self.encoded_len());
        self.append_encoded(&mut res);
        res
    }
}

/// # Printable Strings
///
impl TaggedValue {
    /// Returns whether all characters are permissible in PrintableString.
    pub fn is_printable_string(value: &str) -> bool {
        value.chars().all(Self::is_printable_string_char)
    }

    /// Returns whether a character is permissible in PrintableString.
    ///
    /// These are ASCII letters and digits plus space, apostrophe,
    /// parentheses, plus, comma, hyphen, period, slash, colon, equals
    /// sign, and question mark, as given in X.680.
    pub fn is_printable_string_char(ch: char) -> bool {
        ch.is_ascii_alphanumeric() || matches!(
            ch,
            ' ' | '\'' | '(' | ')' | '+' | ',' | '-' | '.' | '/'
                | ':' | '=' | '?'
        )
    }
}

/// # Error Helpers
///
impl TaggedValue {
    fn content_err(&self, msg: &'static str) -> DecodeError {
        DecodeError::content(msg, self.start)
    }

    fn mismatch(&self, expected: Tag) -> DecodeError {
        DecodeError::content(
            format!(
                "tag mismatch: expected {}, found {}", expected, self.tag
            ),
            self.start,
        )
    }

    fn expect_tag(&self, expected: Tag) -> Result<(), DecodeError> {
        if self.tag != expected {
            Err(self.mismatch(expected))
        }
        else {
            Ok(())
        }
    }
}


//--- From

impl From<&str> for TaggedValue {
    /// Creates a PrintableString or UTF8String value from a string.
    ///
    /// PrintableString is used if the string only contains characters
    /// from its repertoire, UTF8String otherwise.
    fn from(value: &str) -> Self {
        let (tag, content) = if Self::is_printable_string(value) {
            (Tag::PRINTABLE_STRING, encode_ascii(value))
        }
        else {
            (Tag::UTF8_STRING, Vec::from(value.as_bytes()))
        };
        let buffer = Bytes::from(content);
        let end = buffer.len();
        Self::assemble(tag, buffer, 0, end, Mode::Der)
    }
}


//--- PartialEq and Eq

impl PartialEq for TaggedValue {
    /// Values are equal if their tags and content octets are equal.
    ///
    /// Two values over the same range of the same buffer are equal
    /// without looking at the octets.
    fn eq(&self, other: &Self) -> bool {
        if self.tag != other.tag {
            return false
        }
        if self.buffer.as_ptr() == other.buffer.as_ptr()
            && self.start == other.start
            && self.end == other.end
        {
            return true
        }
        self.content_slice() == other.content_slice()
    }
}

impl Eq for TaggedValue { }


//--- Debug

impl fmt::Debug for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TaggedValue({}, {} octets)", self.tag, self.len())
    }
}


//------------ String Conversion Helpers -------------------------------------

/// Encodes a string into the byte encoding demanded by the tag.
fn encode_string(tag: Tag, value: &str) -> Result<Vec<u8>, ContentError> {
    if tag == Tag::PRINTABLE_STRING
        || tag == Tag::IA5_STRING
        || tag == Tag::GENERAL_STRING
    {
        Ok(encode_ascii(value))
    }
    else if tag == Tag::T61_STRING {
        Ok(value.chars().map(|ch| {
            if (ch as u32) < 0x100 { ch as u32 as u8 } else { b'?' }
        }).collect())
    }
    else if tag == Tag::BMP_STRING {
        Ok(value.encode_utf16().flat_map(u16::to_be_bytes).collect())
    }
    else if tag == Tag::UTF8_STRING {
        Ok(Vec::from(value.as_bytes()))
    }
    else if tag == Tag::UNIVERSAL_STRING {
        Ok(value.chars().flat_map(|ch| {
            (ch as u32).to_be_bytes()
        }).collect())
    }
    else {
        Err(ContentError::from_static("not a character string tag"))
    }
}

fn encode_ascii(value: &str) -> Vec<u8> {
    value.chars().map(|ch| {
        if ch.is_ascii() { ch as u8 } else { b'?' }
    }).collect()
}

fn decode_ascii(content: &[u8]) -> String {
    content.iter().map(|&octet| {
        if octet.is_ascii() {
            char::from(octet)
        }
        else {
            char::REPLACEMENT_CHARACTER
        }
    }).collect()
}

fn decode_utf16_be(content: &[u8]) -> String {
    let units: Vec<u16> = content.chunks_exact(2).map(|chunk| {
        u16::from_be_bytes([chunk[0], chunk[1]])
    }).collect();
    let mut res = String::from_utf16_lossy(&units);
    if content.len() % 2 != 0 {
        res.push(char::REPLACEMENT_CHARACTER);
    }
    res
}

fn decode_utf32_be(content: &[u8]) -> String {
    if content.len() % 4 != 0 {
        return String::new()
    }
    let mut res = String::with_capacity(content.len() / 4);
    for chunk in content.chunks_exact(4) {
        let unit = u32::from_be_bytes([
            chunk[0], chunk[1], chunk[2], chunk[3]
        ]);
        match char::from_u32(unit) {
            Some(ch) => res.push(ch),
            None => return String::new(),
        }
    }
    res
}


//------------ Time Parsing Helpers ------------------------------------------

fn digit(content: &[u8], pos: &mut usize) -> Option<u32> {
    let res = char::from(*content.get(*pos)?).to_digit(10)?;
    *pos += 1;
    Some(res)
}

fn digits2(content: &[u8], pos: &mut usize) -> Option<u32> {
    let high = digit(content, pos)?;
    let low = digit(content, pos)?;
    Some(high * 10 + low)
}


//============ Tests =========================================================
