use thiserror::Error;

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `rimeid` can emit.
///
/// The generation hot path performs no I/O, so the taxonomy is small: one
/// construction-time failure and two runtime failures, both of which leave
/// generator state untouched.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error {
    /// The node ID supplied at construction does not fit the node ID field.
    ///
    /// Non-retryable; the deployment configuration must be fixed.
    #[error("node id {node_id} out of range (max {max})")]
    InvalidConfiguration { node_id: u64, max: u64 },

    /// The wall clock was observed earlier than the last recorded timestamp.
    ///
    /// Proceeding would risk minting a duplicate or out-of-order ID, so the
    /// failure is surfaced instead of masked. Whether to retry, alert, or
    /// fence the producer is the caller's policy.
    #[error("clock moved backwards: now {now_ms}ms < last {last_ms}ms since epoch")]
    ClockRegression { now_ms: u64, last_ms: u64 },

    /// The sequence space for the current millisecond was exhausted and the
    /// clock did not advance within the configured wait bound.
    ///
    /// Only produced when a wait timeout was opted into via
    /// [`SnowflakeGenerator::with_wait_timeout`]; without one, exhaustion is
    /// absorbed by waiting for the next millisecond.
    ///
    /// [`SnowflakeGenerator::with_wait_timeout`]: crate::SnowflakeGenerator::with_wait_timeout
    #[error("sequence exhausted at {timestamp_ms}ms; clock did not advance within {waited_ms}ms")]
    SequenceExhaustedTimeout { timestamp_ms: u64, waited_ms: u64 },
}
