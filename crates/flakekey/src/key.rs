use core::{fmt, str::FromStr};
use std::sync::Arc;

use crate::{Base63Ext, Error, FlakeId, LockFlakeGenerator, Result, TimeSource, WallClock};

/// Separator between a key's prefix and its encoded identifier.
pub const KEY_SEPARATOR: char = '_';

/// Mints primary-key strings from a shared generator.
///
/// Each key is `prefix + "_" + base63(id)`. The minter owns an [`Arc`] of the
/// generator, so it is cheap to clone into every repository or handler that
/// inserts records.
///
/// ```
/// use std::sync::Arc;
/// use flakekey::{KeyMinter, LockFlakeGenerator, Origin, WallClock};
///
/// let generator = Arc::new(LockFlakeGenerator::new(Origin::from_parts(3, 1), WallClock::default()));
/// let minter = KeyMinter::new(generator);
///
/// let a = minter.make_key("Exp").unwrap();
/// let b = minter.make_key("Exp").unwrap();
/// assert!(a.starts_with("Exp_"));
/// assert_ne!(a, b);
/// ```
#[derive(Debug)]
pub struct KeyMinter<T = WallClock>
where
    T: TimeSource,
{
    generator: Arc<LockFlakeGenerator<T>>,
}

impl<T> Clone for KeyMinter<T>
where
    T: TimeSource,
{
    fn clone(&self) -> Self {
        Self {
            generator: Arc::clone(&self.generator),
        }
    }
}

impl<T> KeyMinter<T>
where
    T: TimeSource,
{
    /// Wraps a shared generator, usually the one returned by
    /// [`process_generator`](crate::process_generator).
    pub fn new(generator: Arc<LockFlakeGenerator<T>>) -> Self {
        Self { generator }
    }

    /// The generator every clone of this minter draws from.
    pub fn generator(&self) -> &Arc<LockFlakeGenerator<T>> {
        &self.generator
    }

    /// Returns `prefix + "_" + base63(next id)`.
    ///
    /// Consumes exactly one identifier and may block while the generator is
    /// exhausted for the current millisecond. The prefix is not validated; a
    /// prefix that itself contains `_` cannot be split back by
    /// [`PrimaryKey::parse`].
    ///
    /// # Errors
    ///
    /// Propagates [`LockFlakeGenerator::next_id`] errors unchanged.
    pub fn make_key(&self, prefix: &str) -> Result<String> {
        let id = self.generator.next_id()?;
        Ok(assemble(prefix, id))
    }

    /// Mints `count` keys sharing one prefix, in issuance order.
    ///
    /// # Errors
    ///
    /// Stops at the first generator error; no keys are returned in that case.
    pub fn make_keys(&self, prefix: &str, count: usize) -> Result<Vec<String>> {
        (0..count).map(|_| self.make_key(prefix)).collect()
    }
}

fn assemble(prefix: &str, id: FlakeId) -> String {
    let encoded = id.encode();
    let mut key = String::with_capacity(prefix.len() + 1 + encoded.len());
    key.push_str(prefix);
    key.push(KEY_SEPARATOR);
    key.push_str(&encoded);
    key
}

/// A key split back into its prefix and identifier.
///
/// ```
/// use flakekey::{FlakeId, Origin, PrimaryKey};
///
/// let key: PrimaryKey = "Exp_10".parse().unwrap();
/// assert_eq!(key.prefix(), "Exp");
/// assert_eq!(key.id(), FlakeId::from_raw(63));
/// assert_eq!(key.to_string(), "Exp_10");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrimaryKey {
    prefix: String,
    id: FlakeId,
}

impl PrimaryKey {
    /// Pairs a prefix with an identifier without validating the prefix.
    pub fn new(prefix: impl Into<String>, id: FlakeId) -> Self {
        Self {
            prefix: prefix.into(),
            id,
        }
    }

    /// Splits `key` at its first `_` and decodes the remainder.
    ///
    /// Only the canonical form is accepted, so a parsed key always displays
    /// as the exact input.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingSeparator`] if `key` contains no `_`
    /// - [`Error::NonCanonicalKey`] if the identifier part has a leading `0`
    ///   and is not exactly `"0"`
    /// - any base63 decoding error for the identifier part
    pub fn parse(key: &str) -> Result<Self> {
        let (prefix, encoded) = key
            .split_once(KEY_SEPARATOR)
            .ok_or_else(|| Error::MissingSeparator(key.to_owned()))?;
        let id = FlakeId::decode(encoded)?;
        if encoded.len() > 1 && encoded.starts_with('0') {
            return Err(Error::NonCanonicalKey(key.to_owned()));
        }
        Ok(Self::new(prefix, id))
    }

    /// The text before the first `_`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The decoded identifier.
    pub fn id(&self) -> FlakeId {
        self.id
    }
}

impl FromStr for PrimaryKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix, KEY_SEPARATOR, self.id.encode())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for PrimaryKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PrimaryKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Origin, decode_base63};
    use std::collections::HashSet;

    fn minter() -> KeyMinter {
        let generator = LockFlakeGenerator::new(Origin::from_parts(21, 7), WallClock::default());
        KeyMinter::new(Arc::new(generator))
    }

    #[test]
    fn key_has_prefix_separator_and_suffix() {
        let key = minter().make_key("Exp").unwrap();
        assert!(key.starts_with("Exp_"));
        assert!(key.len() > "Exp_".len());
        assert!(decode_base63(&key["Exp_".len()..]).is_ok());
    }

    #[test]
    fn successive_keys_differ() {
        let minter = minter();
        let a = minter.make_key("Exp").unwrap();
        let b = minter.make_key("Exp").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_prefix_is_allowed() {
        let key = minter().make_key("").unwrap();
        assert!(key.starts_with('_'));
        assert_eq!(PrimaryKey::parse(&key).unwrap().prefix(), "");
    }

    #[test]
    fn parse_recovers_minted_components() {
        let minter = minter();
        let key = minter.make_key("Exp").unwrap();
        let parsed = PrimaryKey::parse(&key).unwrap();

        assert_eq!(parsed.prefix(), "Exp");
        assert_eq!(parsed.id().origin(), Origin::from_parts(21, 7));
        assert_eq!(parsed.to_string(), key);
    }

    #[test]
    fn batch_keys_are_unique_and_ordered() {
        let keys = minter().make_keys("Exp", 500).unwrap();
        assert_eq!(keys.len(), 500);
        assert_eq!(keys.iter().collect::<HashSet<_>>().len(), 500);

        let ids: Vec<_> = keys
            .iter()
            .map(|k| PrimaryKey::parse(k).unwrap().id())
            .collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn clones_share_one_generator() {
        let a = minter();
        let b = a.clone();
        assert!(Arc::ptr_eq(a.generator(), b.generator()));
        assert_ne!(a.make_key("X").unwrap(), b.make_key("X").unwrap());
    }

    #[test]
    fn interrupted_generator_fails_key() {
        let minter = minter();
        minter.generator().interrupt();
        assert_eq!(minter.make_key("Exp"), Err(Error::Interrupted));
    }

    #[test]
    fn parse_rejects_malformed_keys() {
        assert_eq!(
            PrimaryKey::parse("Exp"),
            Err(Error::MissingSeparator("Exp".to_owned()))
        );
        assert_eq!(PrimaryKey::parse("Exp_"), Err(Error::DecodeEmpty));
        assert!(matches!(
            "Exp_ab!".parse::<PrimaryKey>(),
            Err(Error::DecodeInvalidAscii { byte: b'!', .. })
        ));
    }

    #[test]
    fn separator_in_suffix_is_part_of_the_id() {
        // '_' is also the last base63 digit; only the first one separates.
        let key = PrimaryKey::parse("Exp__").unwrap();
        assert_eq!(key.prefix(), "Exp");
        assert_eq!(key.id(), FlakeId::from_raw(62));
    }

    #[test]
    fn parse_rejects_leading_zero_digits() {
        assert_eq!(
            PrimaryKey::parse("Exp_010"),
            Err(Error::NonCanonicalKey("Exp_010".to_owned()))
        );
        assert_eq!(
            PrimaryKey::parse("Exp_00"),
            Err(Error::NonCanonicalKey("Exp_00".to_owned()))
        );

        for key in ["Exp_0", "Exp_10", "Exp_a0"] {
            assert_eq!(PrimaryKey::parse(key).unwrap().to_string(), key);
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_as_string() {
        let key = PrimaryKey::new("Exp", FlakeId::from_raw(63));
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#""Exp_10""#);

        let back: PrimaryKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<PrimaryKey>(r#""nope""#).is_err());
    }
}
