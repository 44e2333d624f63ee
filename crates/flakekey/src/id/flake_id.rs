use crate::{Error, Origin};
use core::fmt;

/// A 61-bit Snowflake-style identifier.
///
/// - 41 bits timestamp (ms since the generator's epoch)
/// - 15 bits [`Origin`] (node ID (10) and process ID (5))
/// - 5 bits sequence
///
/// ```text
///  Bit Index:  63         61 60            20 19          10 9             5 4             0
///              +------------+----------------+--------------+---------------+--------------+
///  Field:      | unused (3) | timestamp (41) | node ID (10) | process ID (5)| sequence (5) |
///              +------------+----------------+--------------+---------------+--------------+
///              |<----------------- MSB ---------- 64 bits ---------- LSB ----------------->|
/// ```
///
/// Identifiers from one generator compare in issuance order, both as
/// integers and through the derived [`Ord`].
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u64", into = "u64")
)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlakeId {
    id: u64,
}

impl FlakeId {
    /// Bitmask for extracting the 41-bit timestamp field. Occupies bits 20
    /// through 60.
    pub const TIMESTAMP_MASK: u64 = (1 << 41) - 1;

    /// Bitmask for extracting the 15-bit origin field. Occupies bits 5
    /// through 19.
    pub const ORIGIN_MASK: u64 = Origin::MASK;

    /// Bitmask for extracting the 5-bit sequence field. Occupies bits 0
    /// through 4.
    pub const SEQUENCE_MASK: u64 = (1 << 5) - 1;

    /// Number of bits to shift the timestamp to its correct position (bit 20).
    pub const TIMESTAMP_SHIFT: u64 = 20;

    /// Number of bits to shift the origin to its correct position (bit 5).
    pub const ORIGIN_SHIFT: u64 = 5;

    /// Number of bits to shift the sequence field (bit 0).
    pub const SEQUENCE_SHIFT: u64 = 0;

    /// Total number of bits an identifier may occupy.
    pub const BITS: u32 = 61;

    /// The largest raw value that respects the layout.
    pub const MAX_RAW: u64 = (1 << Self::BITS) - 1;

    /// Packs the components into an identifier. Each component is masked to
    /// its field width.
    pub const fn from(timestamp: u64, origin: Origin, sequence: u64) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let origin = (origin.to_raw() & Self::ORIGIN_MASK) << Self::ORIGIN_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | origin | sequence,
        }
    }

    /// Packs the components into an identifier.
    ///
    /// Overflowing components are a programming error: they trip a debug
    /// assertion and are masked in release builds.
    pub fn from_components(timestamp: u64, origin: Origin, sequence: u64) -> Self {
        debug_assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
        debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
        Self::from(timestamp, origin, sequence)
    }

    /// Extracts the timestamp from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the origin from the packed ID.
    pub const fn origin(&self) -> Origin {
        Origin::from_raw((self.id >> Self::ORIGIN_SHIFT) & Self::ORIGIN_MASK)
    }

    /// Extracts the node ID from the packed ID.
    pub const fn node_id(&self) -> u64 {
        self.origin().node_id()
    }

    /// Extracts the process ID from the packed ID.
    pub const fn process_id(&self) -> u64 {
        self.origin().process_id()
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Returns the maximum possible value for the timestamp field.
    pub const fn max_timestamp() -> u64 {
        Self::TIMESTAMP_MASK
    }

    /// Returns the maximum possible value for the sequence field.
    pub const fn max_sequence() -> u64 {
        Self::SEQUENCE_MASK
    }

    /// Converts this type into its raw representation.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Converts a raw value into this type without validation. Use
    /// [`FlakeId::try_from`] to reject values with bits above bit 60.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns `true` if no bit above bit 60 is set.
    pub const fn is_valid(&self) -> bool {
        self.id <= Self::MAX_RAW
    }

    /// Returns true if the current sequence value can be incremented.
    pub const fn has_sequence_room(&self) -> bool {
        self.sequence() < Self::SEQUENCE_MASK
    }

    /// Returns a new ID with the sequence incremented.
    pub fn increment_sequence(&self) -> Self {
        Self::from_components(self.timestamp(), self.origin(), self.sequence() + 1)
    }

    /// Returns a new ID for a newer timestamp with sequence reset to zero.
    pub fn rollover_to_timestamp(&self, ts: u64) -> Self {
        Self::from_components(ts, self.origin(), 0)
    }
}

// The fields, shifted into place, must tile the low 61 bits exactly: no
// overlap, no gap.
const _: () = {
    let ts = FlakeId::TIMESTAMP_MASK << FlakeId::TIMESTAMP_SHIFT;
    let origin = FlakeId::ORIGIN_MASK << FlakeId::ORIGIN_SHIFT;
    let seq = FlakeId::SEQUENCE_MASK << FlakeId::SEQUENCE_SHIFT;
    assert!(ts & origin == 0 && ts & seq == 0 && origin & seq == 0);
    assert!(ts | origin | seq == FlakeId::MAX_RAW);
};

impl TryFrom<u64> for FlakeId {
    type Error = Error;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        let id = Self::from_raw(raw);
        if id.is_valid() {
            Ok(id)
        } else {
            Err(Error::DecodeOverflow)
        }
    }
}

impl From<FlakeId> for u64 {
    fn from(id: FlakeId) -> Self {
        id.to_raw()
    }
}

impl fmt::Display for FlakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for FlakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlakeId")
            .field("id", &format_args!("{:#018x}", self.id))
            .field("timestamp", &self.timestamp())
            .field("node_id", &self.node_id())
            .field("process_id", &self.process_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_fields_at_documented_offsets() {
        let origin = Origin::from_parts(0b10_0000_0001, 0b1_0001);
        let id = FlakeId::from_components(3, origin, 7);

        assert_eq!(id.to_raw(), (3 << 20) | (origin.to_raw() << 5) | 7);
        assert_eq!(id.timestamp(), 3);
        assert_eq!(id.origin(), origin);
        assert_eq!(id.node_id(), 0b10_0000_0001);
        assert_eq!(id.process_id(), 0b1_0001);
        assert_eq!(id.sequence(), 7);
    }

    #[test]
    fn max_components_fill_sixty_one_bits() {
        let id = FlakeId::from_components(
            FlakeId::max_timestamp(),
            Origin::from_parts(u64::MAX, u64::MAX),
            FlakeId::max_sequence(),
        );
        assert_eq!(id.to_raw(), FlakeId::MAX_RAW);
        assert_eq!(id.to_raw().leading_zeros(), 3);
        assert!(id.is_valid());
    }

    #[test]
    fn sequence_increments_and_rolls_over() {
        let origin = Origin::from_parts(1, 1);
        let id = FlakeId::from_components(42, origin, 0);

        let next = id.increment_sequence();
        assert_eq!(next.sequence(), 1);
        assert_eq!(next.timestamp(), 42);
        assert!(next > id);

        let full = FlakeId::from_components(42, origin, FlakeId::max_sequence());
        assert!(!full.has_sequence_room());

        let rolled = full.rollover_to_timestamp(43);
        assert_eq!(rolled.timestamp(), 43);
        assert_eq!(rolled.sequence(), 0);
        assert_eq!(rolled.origin(), origin);
        assert!(rolled > full);
    }

    #[test]
    fn later_timestamp_orders_above_any_origin() {
        let low = FlakeId::from_components(10, Origin::from_parts(1023, 31), 31);
        let high = FlakeId::from_components(11, Origin::from_parts(0, 0), 0);
        assert!(high > low);
        assert!(high.to_raw() > low.to_raw());
    }

    #[test]
    fn try_from_rejects_reserved_bits() {
        assert!(FlakeId::try_from(FlakeId::MAX_RAW).is_ok());
        assert_eq!(
            FlakeId::try_from(FlakeId::MAX_RAW + 1),
            Err(Error::DecodeOverflow)
        );
        assert!(!FlakeId::from_raw(u64::MAX).is_valid());
    }

    #[test]
    fn debug_shows_components() {
        let id = FlakeId::from_components(5, Origin::from_parts(2, 3), 4);
        let dbg = format!("{id:?}");
        assert!(dbg.contains("timestamp: 5"));
        assert!(dbg.contains("node_id: 2"));
        assert!(dbg.contains("process_id: 3"));
        assert!(dbg.contains("sequence: 4"));
        assert_eq!(id.to_string(), id.to_raw().to_string());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_as_integer() {
        let id = FlakeId::from_components(9, Origin::from_parts(1, 2), 3);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, id.to_raw().to_string());

        let back: FlakeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let overflow = serde_json::to_string(&(FlakeId::MAX_RAW + 1)).unwrap();
        assert!(serde_json::from_str::<FlakeId>(&overflow).is_err());
    }
}
