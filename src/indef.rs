//! Normalizing indefinite length encodings.
//!
//! BER allows a constructed value to leave its length open and close its
//! content with an end-of-contents marker, the two octets `00 00`,
//! instead. This module rewrites such data into the equivalent
//! definite-length form with all markers removed and every length encoded
//! minimally, which is what the rest of the crate operates on.
//!
//! The conversion runs in two passes. The first pass scans the input TLV
//! by TLV and resolves each indefinite length value into a definite
//! length once its marker is found. The second pass rewrites the input
//! with the resolved lengths substituted. Scanning stops once all
//! indefinite length values opened so far have been closed; anything
//! after that point is trailing data and is preserved verbatim at the
//! end of the output.
//!
//! Since input may arrive incrementally, running out of data mid-value is
//! not an error. [`convert`] signals it by returning `Ok(None)` so a
//! caller holding an open byte source can fetch more input and retry,
//! which is exactly what the crate-internal reader variant does.

use std::io;
use smallvec::SmallVec;
use crate::error::DecodeError;
use crate::length::{self, Length};


//------------ Public Interface ----------------------------------------------

/// Converts a buffer to definite-length encoding.
///
/// On success returns the converted data: the outermost value and every
/// value nested in it in definite-length form, with any input octets
/// following the outermost value appended unchanged. If the input ends
/// before all indefinite length values are closed, returns `Ok(None)`.
/// Structurally invalid input, such as a length field wider than four
/// octets or an end-of-contents marker with no open value, results in an
/// error.
pub fn convert(data: &[u8]) -> Result<Option<Vec<u8>>, DecodeError> {
    Converter::new(data).convert()
}

/// Converts data arriving from a byte source.
///
/// The tag and length octet of the outermost value have already been
/// read by the caller and are passed in separately. The function reads
/// from `reader` until the data converts cleanly, blocking for more
/// input whenever the conversion comes up short. It fails if the source
/// is exhausted while indefinite length values remain open. Input that
/// has been read is never discarded, though the function may read past
/// the end of the outermost value; such excess input ends up preserved
/// at the tail of the returned buffer.
pub(crate) fn convert_reader<R: io::Read>(
    reader: &mut R,
    tag: u8,
    length_octet: u8,
) -> Result<Vec<u8>, DecodeError> {
    let mut data = vec![tag, length_octet];
    loop {
        if let Some(res) = convert(&data)? {
            return Ok(res)
        }
        let mut chunk = [0u8; 4096];
        let read = loop {
            match reader.read(&mut chunk) {
                Ok(read) => break read,
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err.into()),
            }
        };
        if read == 0 {
            return Err(DecodeError::content(
                "unresolved indefinite length value at end of input",
                data.len(),
            ))
        }
        data.extend_from_slice(&chunk[..read]);
    }
}


//------------ Segment -------------------------------------------------------

/// The state of one indefinite length value met during the scan pass.
///
/// Segments are kept in the order their values were opened. An
/// end-of-contents marker always closes the most recently opened value
/// that is still pending.
enum Segment {
    /// The value is open. The position is that of its first content
    /// octet, i.e., right behind the `80` length octet.
    Pending(usize),

    /// The value has been closed and its definite length computed.
    ///
    /// The stored octets are the minimal-form length field that will
    /// replace the indefinite marker during the rewrite pass.
    Resolved(SmallVec<[u8; 5]>),
}


//------------ Converter -----------------------------------------------------

/// State shared between the two conversion passes.
struct Converter<'a> {
    /// The input.
    data: &'a [u8],

    /// The read position within the input.
    pos: usize,

    /// The end of the data that takes part in the conversion.
    ///
    /// Starts out as the input length and is pulled in to the end of the
    /// outermost value once scanning determines it. Input octets between
    /// `size` and the real end are trailing data.
    size: usize,

    /// All indefinite length values met so far, in opening order.
    segments: Vec<Segment>,

    /// The number of segments still pending.
    unresolved: usize,

    /// The growth of the output relative to the input.
    ///
    /// Every resolved segment trades one indefinite length octet and two
    /// end-of-contents octets for its definite length field, changing the
    /// output size by the field's width minus three.
    total_delta: isize,
}

impl<'a> Converter<'a> {
    fn new(data: &'a [u8]) -> Self {
        Converter {
            data,
            pos: 0,
            size: data.len(),
            segments: Vec::new(),
            unresolved: 0,
            total_delta: 0,
        }
    }

    fn convert(mut self) -> Result<Option<Vec<u8>>, DecodeError> {
        // Pass 1: find and resolve all the indefinite lengths.
        let mut trailing = 0;
        while self.pos < self.size {
            if self.pos + 2 > self.size {
                // There should be at least one tag and one length octet.
                return Ok(None)
            }
            self.parse_tag()?;
            match self.parse_length()? {
                Some(len) => self.pos += len,
                None => return Ok(None)
            }
            if self.unresolved == 0 {
                if self.pos > self.size {
                    // The last value claims more content than we have.
                    return Ok(None)
                }
                trailing = self.size - self.pos;
                self.size = self.pos;
                break
            }
        }
        if self.unresolved != 0 {
            return Ok(None)
        }

        // Pass 2: rewrite with the indefinite lengths and all
        // end-of-contents markers replaced.
        let mut res = Vec::with_capacity(
            (self.size as isize + self.total_delta) as usize + trailing
        );
        self.pos = 0;
        let mut resolved = 0;
        while self.pos < self.size {
            self.write_tag(&mut res);
            self.write_length_and_value(&mut res, &mut resolved);
        }
        res.extend_from_slice(&self.data[self.size..self.size + trailing]);
        Ok(Some(res))
    }

    /// Advances over the tag octet at the current position.
    ///
    /// If the tag starts an end-of-contents marker, resolves the
    /// innermost pending segment first.
    fn parse_tag(&mut self) -> Result<(), DecodeError> {
        if self.data[self.pos] == 0 && self.data[self.pos + 1] == 0 {
            self.resolve_innermost()?;
        }
        self.pos += 1;
        Ok(())
    }

    /// Resolves the most recently opened pending segment.
    ///
    /// The definite content length of that segment is the distance from
    /// its first content octet to the current position, corrected by the
    /// size change of every segment nested inside it that has already
    /// been resolved: each of those swapped three octets of marker and
    /// end-of-contents for its definite length field.
    fn resolve_innermost(&mut self) -> Result<(), DecodeError> {
        let mut delta = 0isize;
        let mut innermost = None;
        for (idx, segment) in self.segments.iter().enumerate().rev() {
            match *segment {
                Segment::Pending(start) => {
                    innermost = Some((idx, start));
                    break
                }
                Segment::Resolved(ref octets) => {
                    delta += octets.len() as isize - 3;
                }
            }
        }
        let (idx, start) = match innermost {
            Some(some) => some,
            None => {
                return Err(DecodeError::content(
                    "end-of-contents without an open indefinite length \
                     value",
                    self.pos,
                ))
            }
        };
        let len = self.pos as isize - start as isize + delta;
        let len = usize::try_from(len).map_err(|_| {
            DecodeError::content("invalid length octets", self.pos)
        })?;
        let octets = length::minimal_bytes(len);
        self.total_delta += octets.len() as isize - 3;
        self.segments[idx] = Segment::Resolved(octets);
        self.unresolved -= 1;
        Ok(())
    }

    /// Parses the length field at the current position.
    ///
    /// Returns the number of content octets to skip, which is zero for
    /// the indefinite form since its content consists of further TLVs
    /// that the scan loop walks itself. Returns `None` if the length
    /// field runs past the end of the available data.
    fn parse_length(&mut self) -> Result<Option<usize>, DecodeError> {
        if self.pos == self.size {
            return Ok(Some(0))
        }
        let first = self.data[self.pos];
        self.pos += 1;
        if first == 0x80 {
            self.segments.push(Segment::Pending(self.pos));
            self.unresolved += 1;
            return Ok(Some(0))
        }
        if first & 0x80 == 0 {
            return Ok(Some(first.into()))
        }
        let count = usize::from(first & 0x7f);
        if count > 4 {
            return Err(DecodeError::content(
                "invalid length octets", self.pos - 1
            ))
        }
        if self.size - self.pos < count + 1 {
            return Ok(None)
        }
        let mut value = 0u64;
        for _ in 0..count {
            value = (value << 8) | u64::from(self.data[self.pos]);
            self.pos += 1;
        }
        if value > i32::MAX as u64 {
            return Err(DecodeError::content(
                "invalid length octets", self.pos
            ))
        }
        Ok(Some(value as usize))
    }

    /// Copies the tag at the current position to the output.
    ///
    /// Runs of end-of-contents markers are skipped instead of copied.
    fn write_tag(&mut self, res: &mut Vec<u8>) {
        while self.pos < self.size {
            let tag = self.data[self.pos];
            self.pos += 1;
            if tag == 0
                && self.pos < self.size
                && self.data[self.pos] == 0
            {
                self.pos += 1;
                if self.pos == self.size {
                    return
                }
            }
            else {
                res.push(tag);
                return
            }
        }
    }

    /// Copies the length field and content at the current position.
    ///
    /// An indefinite marker is replaced by the length field resolved for
    /// it during the scan pass. Definite lengths are re-emitted in
    /// minimal form with their content copied verbatim.
    fn write_length_and_value(
        &mut self, res: &mut Vec<u8>, resolved: &mut usize
    ) {
        if self.pos == self.size {
            // Happens when a run of end-of-contents markers reached the
            // end of the data.
            return
        }
        let first = self.data[self.pos];
        self.pos += 1;
        if first == 0x80 {
            match self.segments[*resolved] {
                Segment::Resolved(ref octets) => {
                    res.extend_from_slice(octets)
                }
                Segment::Pending(_) => unreachable!(),
            }
            *resolved += 1;
            return
        }
        let len = if first & 0x80 != 0 {
            let count = usize::from(first & 0x7f);
            let mut value = 0usize;
            for _ in 0..count {
                value = (value << 8) | usize::from(self.data[self.pos]);
                self.pos += 1;
            }
            value
        }
        else {
            usize::from(first)
        };
        Length::Definite(len).append_encoded(res);
        res.extend_from_slice(&self.data[self.pos..self.pos + len]);
        self.pos += len;
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use std::io;
    use super::*;

    fn ok(data: &[u8]) -> Vec<u8> {
        convert(data).unwrap().unwrap()
    }

    #[test]
    fn definite_only_unchanged() {
        let data = b"\x30\x06\x04\x01\x61\x04\x01\x62";
        assert_eq!(ok(data), data);
        let data = b"\x04\x00";
        assert_eq!(ok(data), data);
    }

    #[test]
    fn simple_indefinite() {
        assert_eq!(
            ok(b"\x24\x80\x04\x02\x61\x62\x04\x02\x63\x64\x00\x00"),
            b"\x24\x08\x04\x02\x61\x62\x04\x02\x63\x64"
        );
    }

    #[test]
    fn nested_indefinite() {
        // An indefinite SEQUENCE holding an indefinite constructed octet
        // string. The inner resolution shrinks the outer content by two
        // octets, which the outer length has to account for.
        assert_eq!(
            ok(b"\x30\x80\x24\x80\x04\x02\x61\x62\x00\x00\x00\x00"),
            b"\x30\x06\x24\x04\x04\x02\x61\x62"
        );
    }

    #[test]
    fn long_resolved_length() {
        // 130 octets of content force the resolved length into long form.
        let mut data = vec![0x24, 0x80, 0x04, 0x81, 0x82];
        data.extend_from_slice(&[0x61; 0x82]);
        data.extend_from_slice(b"\x00\x00");
        let mut expected = vec![0x24, 0x81, 0x85, 0x04, 0x81, 0x82];
        expected.extend_from_slice(&[0x61; 0x82]);
        assert_eq!(ok(&data), expected);
    }

    #[test]
    fn trailing_data_preserved() {
        assert_eq!(
            ok(b"\x24\x80\x04\x02\x61\x62\x00\x00\x01\x01\xff"),
            b"\x24\x04\x04\x02\x61\x62\x01\x01\xff"
        );
        // Trailing octets that look like another end-of-contents marker
        // belong to whatever follows the value and are kept as they are.
        assert_eq!(
            ok(b"\x24\x80\x04\x02\x61\x62\x00\x00\x00\x00\x00\x00"),
            b"\x24\x04\x04\x02\x61\x62\x00\x00\x00\x00"
        );
    }

    #[test]
    fn insufficient_data() {
        assert!(convert(b"\x24\x80\x04\x02\x61").unwrap().is_none());
        assert!(convert(b"\x24\x80").unwrap().is_none());
        assert!(convert(b"\x24").unwrap().is_none());
        assert!(
            convert(b"\x30\x80\x24\x80\x00\x00").unwrap().is_none()
        );
        // A truncated long-form length field is not an error either.
        assert!(convert(b"\x24\x80\x04\x82\x01").unwrap().is_none());
    }

    #[test]
    fn unmatched_end_of_contents() {
        assert!(convert(b"\x00\x00").is_err());
        assert!(convert(b"\x00\x00\x04\x02\x61\x62").is_err());
    }

    #[test]
    fn scan_stops_at_outermost_close() {
        // Everything after the octets closing the outermost value is
        // trailing data, even further end-of-contents markers.
        assert_eq!(
            ok(b"\x24\x80\x00\x00\x00\x00\x04\x00"),
            b"\x24\x00\x00\x00\x04\x00"
        );
    }

    #[test]
    fn excessive_length_octets() {
        assert!(
            convert(
                b"\x24\x80\x04\x85\x01\x01\x01\x01\x01\x00\x00"
            ).is_err()
        );
        assert!(
            convert(b"\x24\x80\x04\x84\xff\xff\xff\xff\x00\x00").is_err()
        );
    }

    /// A reader handing out one octet per call.
    struct Trickle<'a>(&'a [u8]);

    impl io::Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.split_first() {
                Some((&first, rest)) => {
                    buf[0] = first;
                    self.0 = rest;
                    Ok(1)
                }
                None => Ok(0)
            }
        }
    }

    #[test]
    fn reader_retries_until_complete() {
        let data = b"\x04\x02\x61\x62\x04\x02\x63\x64\x00\x00";
        let mut reader = Trickle(data);
        assert_eq!(
            convert_reader(&mut reader, 0x24, 0x80).unwrap(),
            b"\x24\x08\x04\x02\x61\x62\x04\x02\x63\x64"
        );
    }

    #[test]
    fn reader_exhausted() {
        let mut reader = Trickle(b"\x04\x02\x61\x62");
        assert!(convert_reader(&mut reader, 0x24, 0x80).is_err());
    }
}
