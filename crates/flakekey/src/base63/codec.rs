use crate::{Error, Result};

/// The base63 alphabet, in digit order.
///
/// Held fixed forever: reordering it changes the text of every key already
/// issued. Digit order is not ASCII order (lowercase sorts after uppercase in
/// ASCII), so only keys of equal length compare in numeric order byte-wise
/// when both halves of the alphabet are involved.
pub const ALPHABET: &[u8; 63] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_";

/// Radix of the encoding.
pub const BASE: u64 = ALPHABET.len() as u64;

/// Longest encoding of a `u64` (`63^11 > 2^64`).
pub const MAX_ENCODED_LEN: usize = 11;

const NO_VALUE: u8 = 255;

/// Lookup table for base63 decoding
const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        lut[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    lut
};

/// Encodes `value` as base63, most significant digit first.
///
/// Zero encodes as `"0"`, never as an empty string.
///
/// ```
/// use flakekey::{encode_base63, ALPHABET};
///
/// assert_eq!(encode_base63(0), "0");
/// assert_eq!(encode_base63(62), "_");
/// // 63 = 1 * 63 + 0
/// assert_eq!(encode_base63(63).as_bytes(), [ALPHABET[1], ALPHABET[0]]);
/// ```
pub fn encode_base63(mut value: u64) -> String {
    let mut buf = [0_u8; MAX_ENCODED_LEN];
    let mut start = MAX_ENCODED_LEN;
    loop {
        start -= 1;
        buf[start] = ALPHABET[(value % BASE) as usize];
        value /= BASE;
        if value == 0 {
            break;
        }
    }
    buf[start..].iter().map(|&b| char::from(b)).collect()
}

/// Decodes a base63 string produced by [`encode_base63`].
///
/// Leading `'0'` digits are accepted and ignored.
///
/// # Errors
///
/// - [`Error::DecodeEmpty`] for an empty string
/// - [`Error::DecodeInvalidAscii`] for a byte outside [`ALPHABET`]
/// - [`Error::DecodeOverflow`] if the value does not fit in a `u64`
pub fn decode_base63(encoded: &str) -> Result<u64> {
    if encoded.is_empty() {
        return Err(Error::DecodeEmpty);
    }

    let mut acc = 0_u64;
    for (index, byte) in encoded.bytes().enumerate() {
        let digit = LOOKUP[byte as usize];
        if digit == NO_VALUE {
            return Err(Error::DecodeInvalidAscii { byte, index });
        }
        acc = acc
            .checked_mul(BASE)
            .and_then(|acc| acc.checked_add(u64::from(digit)))
            .ok_or(Error::DecodeOverflow)?;
    }
    Ok(acc)
}
