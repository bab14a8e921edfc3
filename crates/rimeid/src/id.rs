use core::fmt;
use core::time::Duration;

/// A packed 64-bit Snowflake-style identifier.
///
/// The layout is fixed, MSB to LSB:
///
/// ```text
///  Bit Index:  63           63 62            22 21          12 11             0
///              +--------------+----------------+--------------+---------------+
///  Field:      | reserved (1) | timestamp (41) | node ID (10) | sequence (12) |
///              +--------------+----------------+--------------+---------------+
///              |<----------- MSB ---------- 64 bits --------- LSB ---------->|
/// ```
///
/// The reserved bit is always zero, so IDs stay positive when stored in a
/// signed 64-bit column. The timestamp field counts milliseconds since a
/// configurable epoch (see [`DEFAULT_EPOCH`]), giving roughly 69 years of
/// range.
///
/// Field extraction is the exact structural inverse of [`Self::from_parts`]:
///
/// ```
/// use rimeid::SnowflakeId;
///
/// let id = SnowflakeId::from_parts(10, 1, 0);
/// assert_eq!(id.timestamp(), 10);
/// assert_eq!(id.node_id(), 1);
/// assert_eq!(id.sequence(), 0);
/// ```
///
/// [`DEFAULT_EPOCH`]: crate::DEFAULT_EPOCH
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnowflakeId {
    id: u64,
}

const _: () = {
    // The partition must account for every bit of the backing integer.
    assert!(
        SnowflakeId::RESERVED_BITS
            + SnowflakeId::TIMESTAMP_BITS
            + SnowflakeId::NODE_ID_BITS
            + SnowflakeId::SEQUENCE_BITS
            == u64::BITS,
        "Snowflake layout must cover exactly 64 bits"
    );
};

impl SnowflakeId {
    /// Width of the reserved sign bit (always zero).
    pub const RESERVED_BITS: u32 = 1;

    /// Width of the timestamp field in bits.
    pub const TIMESTAMP_BITS: u32 = 41;

    /// Width of the node ID field in bits.
    pub const NODE_ID_BITS: u32 = 10;

    /// Width of the sequence field in bits.
    pub const SEQUENCE_BITS: u32 = 12;

    /// Bitmask for extracting the 41-bit timestamp field. Occupies bits 22
    /// through 62.
    pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;

    /// Bitmask for extracting the 10-bit node ID field. Occupies bits 12
    /// through 21.
    pub const NODE_ID_MASK: u64 = (1 << Self::NODE_ID_BITS) - 1;

    /// Bitmask for extracting the 12-bit sequence field. Occupies bits 0
    /// through 11.
    pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

    /// Number of bits to shift the timestamp to its position (bit 22).
    pub const TIMESTAMP_SHIFT: u32 = Self::NODE_ID_BITS + Self::SEQUENCE_BITS;

    /// Number of bits to shift the node ID to its position (bit 12).
    pub const NODE_ID_SHIFT: u32 = Self::SEQUENCE_BITS;

    /// Number of bits to shift the sequence field (bit 0).
    pub const SEQUENCE_SHIFT: u32 = 0;

    /// Packs a `(timestamp, node_id, sequence)` triple into an ID.
    ///
    /// Each field is debug-asserted against its bit width; in release builds
    /// out-of-range values are masked.
    pub const fn from_parts(timestamp: u64, node_id: u64, sequence: u64) -> Self {
        debug_assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
        debug_assert!(node_id <= Self::NODE_ID_MASK, "node_id overflow");
        debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let node_id = (node_id & Self::NODE_ID_MASK) << Self::NODE_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | node_id | sequence,
        }
    }

    /// Extracts the timestamp (ms since the minting epoch) from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the node ID from the packed ID.
    pub const fn node_id(&self) -> u64 {
        (self.id >> Self::NODE_ID_SHIFT) & Self::NODE_ID_MASK
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Maximum representable timestamp value.
    pub const fn max_timestamp() -> u64 {
        Self::TIMESTAMP_MASK
    }

    /// Maximum representable node ID.
    pub const fn max_node_id() -> u64 {
        Self::NODE_ID_MASK
    }

    /// Maximum representable sequence value.
    pub const fn max_sequence() -> u64 {
        Self::SEQUENCE_MASK
    }

    /// Returns the raw packed integer.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Reinterprets a raw integer as an ID.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Recovers the minting instant as milliseconds since the Unix epoch.
    ///
    /// `epoch` must be the same epoch the minting generator's clock was
    /// configured with.
    ///
    /// ```
    /// use rimeid::{DEFAULT_EPOCH, SnowflakeId};
    ///
    /// let id = SnowflakeId::from_parts(10, 1, 0);
    /// assert_eq!(id.to_unix_millis(DEFAULT_EPOCH), 1_420_070_400_010);
    /// ```
    pub const fn to_unix_millis(&self, epoch: Duration) -> u64 {
        epoch.as_millis() as u64 + self.timestamp()
    }

    /// Returns the ID as a zero-padded 20-digit string, for lexicographic
    /// sorting of the decimal form.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeId")
            .field("id", &self.id)
            .field("timestamp", &self.timestamp())
            .field("node_id", &self.node_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl From<u64> for SnowflakeId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_EPOCH;

    #[test]
    fn fields_round_trip_at_their_bounds() {
        let ts = SnowflakeId::max_timestamp();
        let node = SnowflakeId::max_node_id();
        let seq = SnowflakeId::max_sequence();

        let id = SnowflakeId::from_parts(ts, node, seq);
        assert_eq!(id.timestamp(), ts);
        assert_eq!(id.node_id(), node);
        assert_eq!(id.sequence(), seq);
    }

    #[test]
    fn fields_round_trip_at_low_values() {
        let id = SnowflakeId::from_parts(0, 0, 0);
        assert_eq!(id.to_raw(), 0);

        let id = SnowflakeId::from_parts(1, 1, 1);
        assert_eq!(id.timestamp(), 1);
        assert_eq!(id.node_id(), 1);
        assert_eq!(id.sequence(), 1);
    }

    #[test]
    fn raw_conversion_is_lossless() {
        let id = SnowflakeId::from_parts(123_456, 42, 7);
        assert_eq!(SnowflakeId::from_raw(id.to_raw()), id);
        assert_eq!(u64::from(id), id.to_raw());
        assert_eq!(SnowflakeId::from(id.to_raw()), id);
    }

    #[test]
    fn reserved_bit_is_always_zero() {
        let id = SnowflakeId::from_parts(
            SnowflakeId::max_timestamp(),
            SnowflakeId::max_node_id(),
            SnowflakeId::max_sequence(),
        );
        assert_eq!(id.to_raw() >> 63, 0);
    }

    #[test]
    fn ids_sort_by_timestamp_then_sequence() {
        let a = SnowflakeId::from_parts(10, 1023, 4095);
        let b = SnowflakeId::from_parts(11, 0, 0);
        let c = SnowflakeId::from_parts(11, 0, 1);
        assert!(a < b && b < c);
    }

    #[test]
    fn padded_strings_sort_like_the_ids() {
        let small = SnowflakeId::from_parts(1, 0, 0);
        let large = SnowflakeId::from_parts(2, 0, 0);
        assert_eq!(small.to_padded_string().len(), 20);
        assert!(small.to_padded_string() < large.to_padded_string());
    }

    #[test]
    fn unix_millis_recovers_the_minting_instant() {
        let id = SnowflakeId::from_parts(10, 1, 0);
        assert_eq!(id.to_unix_millis(DEFAULT_EPOCH), 1_420_070_400_010);
    }

    #[test]
    #[should_panic(expected = "timestamp overflow")]
    fn timestamp_overflow_panics() {
        let ts = SnowflakeId::max_timestamp() + 1;
        SnowflakeId::from_parts(ts, 0, 0);
    }

    #[test]
    #[should_panic(expected = "node_id overflow")]
    fn node_id_overflow_panics() {
        let node = SnowflakeId::max_node_id() + 1;
        SnowflakeId::from_parts(0, node, 0);
    }

    #[test]
    #[should_panic(expected = "sequence overflow")]
    fn sequence_overflow_panics() {
        let seq = SnowflakeId::max_sequence() + 1;
        SnowflakeId::from_parts(0, 0, seq);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip() {
        let id = SnowflakeId::from_parts(10, 1, 2);
        let json = serde_json::to_string(&id).unwrap();
        let back: SnowflakeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
