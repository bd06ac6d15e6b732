//! The decoding mode.

/// The encoding rules to apply when decoding data.
///
/// BER and DER share one type system and one tag-length-value layout but
/// differ in how much freedom the sender has. BER permits indefinite
/// length encoding as well as length octets that are longer than
/// necessary. DER allows definite lengths only and requires the shortest
/// possible encoding throughout, so that every value has exactly one
/// representation.
///
/// The mode is selected when constructing a [`TaggedValue`] or a
/// [`ValueDecoder`] and is inherited by all values decoded from it.
///
/// [`TaggedValue`]: crate::TaggedValue
/// [`ValueDecoder`]: crate::ValueDecoder
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Mode {
    /// Basic Encoding Rules.
    ///
    /// These are the most flexible rules, allowing non-minimal length
    /// octets and indefinite length values.
    Ber,

    /// Distinguished Encoding Rules.
    ///
    /// These rules always employ definite length values and require the
    /// shortest possible encoding.
    Der,
}

impl Mode {
    /// Returns whether the mode tolerates BER-only encodings.
    pub fn is_relaxed(self) -> bool {
        matches!(self, Mode::Ber)
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Ber
    }
}
