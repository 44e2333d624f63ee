use std::sync::OnceLock;

/// The fixed per-process bit pattern embedded in every identifier a
/// generator issues.
///
/// An origin packs a 10-bit node ID and a 5-bit process ID:
///
/// ```text
///  Bit Index:  14            5 4               0
///              +--------------+----------------+
///  Field:      | node ID (10) | process ID (5) |
///              +--------------+----------------+
/// ```
///
/// Uniqueness across processes rests entirely on each process having a
/// distinct origin. Nothing detects two processes that resolve to the same
/// one; assigning hints at deploy time is the caller's concern.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Origin(u16);

impl Origin {
    /// Width of the node ID field.
    pub const NODE_ID_BITS: u32 = 10;

    /// Width of the process ID field.
    pub const PROCESS_ID_BITS: u32 = 5;

    /// Bitmask for the 10-bit node ID.
    pub const NODE_ID_MASK: u64 = (1 << Self::NODE_ID_BITS) - 1;

    /// Bitmask for the 5-bit process ID.
    pub const PROCESS_ID_MASK: u64 = (1 << Self::PROCESS_ID_BITS) - 1;

    /// Bitmask for a whole 15-bit origin.
    pub const MASK: u64 = (1 << (Self::NODE_ID_BITS + Self::PROCESS_ID_BITS)) - 1;

    /// Combines a node ID and a process ID.
    ///
    /// Both inputs are truncated to their field widths, so wider values are
    /// silently masked rather than rejected.
    ///
    /// ```
    /// use flakekey::Origin;
    ///
    /// let origin = Origin::from_parts(2047, 63);
    /// assert_eq!(origin.node_id(), 1023);
    /// assert_eq!(origin.process_id(), 31);
    /// ```
    pub const fn from_parts(node_id: u64, process_id: u64) -> Self {
        let node_id = node_id & Self::NODE_ID_MASK;
        let process_id = process_id & Self::PROCESS_ID_MASK;
        Self(((node_id << Self::PROCESS_ID_BITS) | process_id) as u16)
    }

    /// Resolves the origin for this process.
    ///
    /// An absent `node_hint` falls back to [`default_node_id`], an absent
    /// `process_hint` to [`default_process_id`]. Zero is a valid hint. The
    /// result is deterministic for identical inputs within one process.
    pub fn resolve(node_hint: Option<u64>, process_hint: Option<u64>) -> Self {
        let node_id = node_hint.unwrap_or_else(default_node_id);
        let process_id = process_hint.unwrap_or_else(default_process_id);
        let origin = Self::from_parts(node_id, process_id);

        #[cfg(feature = "tracing")]
        tracing::info!(
            node_id = origin.node_id(),
            process_id = origin.process_id(),
            node_hint = node_hint.is_some(),
            process_hint = process_hint.is_some(),
            "resolved origin"
        );

        origin
    }

    /// Rebuilds an origin from its packed 15-bit value. Higher bits are
    /// dropped.
    pub const fn from_raw(raw: u64) -> Self {
        Self((raw & Self::MASK) as u16)
    }

    /// The packed 15-bit value.
    pub const fn to_raw(&self) -> u64 {
        self.0 as u64
    }

    /// The 10-bit node component.
    pub const fn node_id(&self) -> u64 {
        ((self.0 as u64) >> Self::PROCESS_ID_BITS) & Self::NODE_ID_MASK
    }

    /// The 5-bit process component.
    pub const fn process_id(&self) -> u64 {
        (self.0 as u64) & Self::PROCESS_ID_MASK
    }
}

/// The node ID used when no hint is configured.
///
/// Reads the first non-zero hardware address of a non-loopback interface.
/// When none is available, a random 48-bit value with the multicast bit set
/// is drawn instead, so it can never equal a real hardware address. The value
/// is computed once and cached for the lifetime of the process.
pub fn default_node_id() -> u64 {
    static NODE_ID: OnceLock<u64> = OnceLock::new();
    *NODE_ID.get_or_init(|| hardware_node_id().unwrap_or_else(random_node_id))
}

/// The process ID used when no hint is configured: the OS process identifier.
pub fn default_process_id() -> u64 {
    u64::from(std::process::id())
}

fn random_node_id() -> u64 {
    (rand::random::<u64>() & 0xFFFF_FFFF_FFFF) | (1 << 40)
}

#[cfg(target_os = "linux")]
fn hardware_node_id() -> Option<u64> {
    let mut interfaces: Vec<_> = std::fs::read_dir("/sys/class/net")
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.file_name().is_some_and(|name| name != "lo"))
        .collect();
    // read_dir order is unspecified
    interfaces.sort();

    interfaces
        .iter()
        .filter_map(|path| std::fs::read_to_string(path.join("address")).ok())
        .filter_map(|address| parse_mac(address.trim()))
        .find(|&mac| mac != 0)
}

#[cfg(not(target_os = "linux"))]
fn hardware_node_id() -> Option<u64> {
    None
}

/// Parses a colon-separated 6-octet hardware address.
fn parse_mac(s: &str) -> Option<u64> {
    let mut mac = 0_u64;
    let mut octets = 0;
    for part in s.split(':') {
        if part.len() != 2 {
            return None;
        }
        mac = (mac << 8) | u64::from(u8::from_str_radix(part, 16).ok()?);
        octets += 1;
    }
    (octets == 6).then_some(mac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_oversized_hints() {
        let origin = Origin::resolve(Some(2047), Some(63));
        assert_eq!(origin.node_id(), 2047 & 0x3FF);
        assert_eq!(origin.process_id(), 63 & 0x1F);
        assert_eq!(origin.to_raw(), (1023 << 5) | 31);
    }

    #[test]
    fn eleven_bit_node_masks_to_zero() {
        let origin = Origin::resolve(Some(1024), Some(0));
        assert_eq!(origin.node_id(), 0);
        assert_eq!(origin.process_id(), 0);
        assert_eq!(origin.to_raw(), 0);
    }

    #[test]
    fn origin_fits_fifteen_bits() {
        for (node, process) in [(0, 0), (1, 1), (u64::MAX, u64::MAX), (12345, 678)] {
            assert!(Origin::from_parts(node, process).to_raw() < 1 << 15);
        }
    }

    #[test]
    fn zero_is_a_hint_not_a_fallback() {
        let origin = Origin::resolve(Some(0), Some(0));
        assert_eq!(origin, Origin::from_parts(0, 0));
    }

    #[test]
    fn defaults_are_stable_within_process() {
        assert_eq!(Origin::resolve(None, None), Origin::resolve(None, None));
        assert_eq!(default_node_id(), default_node_id());
        assert_eq!(
            Origin::resolve(None, None).process_id(),
            default_process_id() & Origin::PROCESS_ID_MASK
        );
    }

    #[test]
    fn raw_round_trip_drops_high_bits() {
        let origin = Origin::from_parts(513, 17);
        assert_eq!(Origin::from_raw(origin.to_raw()), origin);
        assert_eq!(Origin::from_raw(origin.to_raw() | 1 << 15), origin);
    }

    #[test]
    fn random_node_has_multicast_bit() {
        let node = random_node_id();
        assert!(node < 1 << 48);
        assert_ne!(node & (1 << 40), 0);
    }

    #[test]
    fn parses_hardware_addresses() {
        assert_eq!(parse_mac("00:1a:2b:3c:4d:5e"), Some(0x001a_2b3c_4d5e));
        assert_eq!(parse_mac("00:00:00:00:00:00"), Some(0));
        assert_eq!(parse_mac("00:1a:2b"), None);
        assert_eq!(parse_mac("zz:1a:2b:3c:4d:5e"), None);
        assert_eq!(parse_mac(""), None);
    }
}
