use crate::{FlakeId, Result, decode_base63, encode_base63};

/// Extension trait for the base63 text form of a [`FlakeId`].
///
/// The encoding is variable-length: it carries no leading zero digits, and
/// the zero identifier encodes as `"0"`.
pub trait Base63Ext: Sized {
    /// Encodes this ID as base63, most significant digit first.
    ///
    /// ```
    /// use flakekey::{Base63Ext, FlakeId};
    ///
    /// assert_eq!(FlakeId::from_raw(63).encode(), "10");
    /// ```
    fn encode(&self) -> String;

    /// Decodes a base63 string back into an ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty, contains a byte outside the
    /// alphabet, or decodes to a value with bits set above the 61-bit layout.
    fn decode(s: &str) -> Result<Self>;
}

impl Base63Ext for FlakeId {
    fn encode(&self) -> String {
        debug_assert!(self.is_valid(), "identifier outside the 61-bit layout");
        encode_base63(self.to_raw())
    }

    fn decode(s: &str) -> Result<Self> {
        FlakeId::try_from(decode_base63(s)?)
    }
}
