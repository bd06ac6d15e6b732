//! Decoding of data encoded in BER and DER.
//!
//! All data encoded under the Basic Encoding Rules and their restricted
//! subset, the Distinguished Encoding Rules, consists of nested
//! tag-length-value triples. This crate decodes such data as it appears
//! in X.509 certificates and related cryptographic message formats.
//!
//! The two central types are [`TaggedValue`], a single decoded triple
//! with typed access to its content, and [`ValueDecoder`], a cursor
//! producing the sequence of values a byte range contains. Decoding
//! happens over a shared buffer; nested values are ranges into it and
//! never copies.
//!
//! The BER-only indefinite length encoding is handled by normalizing it
//! into definite-length form up front, see the [`indef`] module. Whether
//! such relaxed encodings are acceptable at all is chosen through
//! [`Mode`].

pub use self::bits::BitArray;
pub use self::decoder::ValueDecoder;
pub use self::error::{ContentError, DecodeError, Pos};
pub use self::int::{Integer, Unsigned};
pub use self::mode::Mode;
pub use self::oid::{ConstOid, Oid};
pub use self::tag::Tag;
pub use self::value::TaggedValue;

pub mod bits;
pub mod decoder;
pub mod error;
pub mod indef;
pub mod int;
pub mod mode;
pub mod oid;
pub mod tag;
pub mod value;

mod length;
