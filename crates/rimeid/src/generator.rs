use core::fmt;
use core::hint;
use core::time::Duration;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Error, Result, SnowflakeId, TimeSource, WallClock};

/// Mutable generator state: the timestamp of the most recently minted ID and
/// the sequence value used within it.
///
/// `last_timestamp` starts as `None` ("nothing minted yet") so the first call
/// always takes the fresh-millisecond path regardless of what the clock
/// reads.
#[derive(Copy, Clone, Debug)]
struct State {
    last_timestamp: Option<u64>,
    sequence: u64,
}

/// A lock-guarded Snowflake ID generator, safe for use from any number of
/// concurrent callers.
///
/// Each call to [`Self::next_id`] executes the read-check-increment-commit
/// cycle as one critical section, so concurrent callers observe a total
/// order over the sequence counter. Clones share state: a cloned generator
/// mints from the same timestamp/sequence stream as the original.
///
/// Node IDs must be unique among concurrently running producers sharing an
/// ID space; how they are assigned (registry, static config) is outside
/// this type's contract.
///
/// # Example
///
/// ```
/// use rimeid::{SnowflakeGenerator, WallClock};
///
/// let generator = SnowflakeGenerator::new(1, WallClock::default())?;
/// let a = generator.next_id()?;
/// let b = generator.next_id()?;
/// assert!(a < b);
/// # Ok::<(), rimeid::Error>(())
/// ```
#[derive(Clone)]
pub struct SnowflakeGenerator<T = WallClock>
where
    T: TimeSource,
{
    state: Arc<Mutex<State>>,
    node_id: u64,
    time: T,
    wait_timeout: Option<Duration>,
}

impl<T> SnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator for the given node ID, minting timestamps from
    /// `time`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `node_id` exceeds
    /// [`SnowflakeId::max_node_id`].
    ///
    /// # Example
    ///
    /// ```
    /// use rimeid::{Error, SnowflakeGenerator, WallClock};
    ///
    /// assert!(SnowflakeGenerator::new(1023, WallClock::default()).is_ok());
    /// assert_eq!(
    ///     SnowflakeGenerator::new(1024, WallClock::default()).unwrap_err(),
    ///     Error::InvalidConfiguration { node_id: 1024, max: 1023 },
    /// );
    /// ```
    pub fn new(node_id: u64, time: T) -> Result<Self> {
        Self::from_state(node_id, None, 0, time)
    }

    /// Creates a generator preloaded with explicit state.
    ///
    /// Useful for restoring a producer whose high-water timestamp was
    /// persisted across a restart: seeding `last_timestamp` re-arms the
    /// clock-regression check against IDs minted in the previous life.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `node_id` exceeds
    /// [`SnowflakeId::max_node_id`].
    pub fn from_state(
        node_id: u64,
        last_timestamp: Option<u64>,
        sequence: u64,
        time: T,
    ) -> Result<Self> {
        if node_id > SnowflakeId::max_node_id() {
            return Err(Error::InvalidConfiguration {
                node_id,
                max: SnowflakeId::max_node_id(),
            });
        }
        debug_assert!(sequence <= SnowflakeId::max_sequence(), "sequence overflow");

        Ok(Self {
            state: Arc::new(Mutex::new(State {
                last_timestamp,
                sequence,
            })),
            node_id,
            time,
            wait_timeout: None,
        })
    }

    /// Bounds the wait performed when a millisecond's sequence space is
    /// exhausted.
    ///
    /// Without a bound, [`Self::next_id`] waits for the clock to advance
    /// (in practice at most a few milliseconds). With one, a wait exceeding
    /// `timeout` fails with [`Error::SequenceExhaustedTimeout`] instead,
    /// leaving state untouched.
    #[must_use]
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = Some(timeout);
        self
    }

    /// The node ID embedded into every ID this generator mints.
    pub const fn node_id(&self) -> u64 {
        self.node_id
    }

    /// Mints the next ID.
    ///
    /// Reads the clock and packs `(timestamp, node_id, sequence)` into a
    /// [`SnowflakeId`]. Within a single millisecond the sequence counter
    /// distinguishes up to 4096 IDs; when it wraps, the call waits for the
    /// clock to reach the next millisecond before minting. Successive calls
    /// on one instance (or its clones) return strictly increasing IDs.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the clock reads earlier than the last
    ///   minted timestamp. State is not mutated; recovery policy is the
    ///   caller's.
    /// - [`Error::SequenceExhaustedTimeout`] if a wait bound was configured
    ///   via [`Self::with_wait_timeout`] and the clock failed to advance
    ///   within it. State is not mutated.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<SnowflakeId> {
        let mut state = self.state.lock();
        let mut now = self.time.current_millis();

        let sequence = match state.last_timestamp {
            Some(last) if now < last => {
                return Err(Error::ClockRegression {
                    now_ms: now,
                    last_ms: last,
                });
            }
            Some(last) if now == last => {
                let next = (state.sequence + 1) & SnowflakeId::SEQUENCE_MASK;
                if next == 0 {
                    // Sequence space exhausted for this millisecond: wait for
                    // the clock to move strictly past it, then start over at
                    // sequence zero. State is committed only after the wait
                    // succeeds.
                    now = self.wait_for_millis_after(last)?;
                    0
                } else {
                    next
                }
            }
            _ => 0,
        };

        state.last_timestamp = Some(now);
        state.sequence = sequence;

        Ok(SnowflakeId::from_parts(now, self.node_id, sequence))
    }

    /// Spins until the clock reads strictly later than `last`.
    ///
    /// The expected wait is sub-millisecond, so this stays a spin rather
    /// than a scheduler sleep that could overshoot the boundary. Runs with
    /// the state lock held: no other caller can mint or observe a partial
    /// update while a wait is in progress.
    #[cold]
    #[inline(never)]
    fn wait_for_millis_after(&self, last: u64) -> Result<u64> {
        let deadline = self.wait_timeout.map(|limit| (Instant::now(), limit));

        loop {
            let now = self.time.current_millis();
            if now > last {
                return Ok(now);
            }
            if let Some((started, limit)) = deadline {
                if started.elapsed() >= limit {
                    return Err(Error::SequenceExhaustedTimeout {
                        timestamp_ms: last,
                        waited_ms: limit.as_millis() as u64,
                    });
                }
            }
            hint::spin_loop();
        }
    }
}

impl<T> fmt::Debug for SnowflakeGenerator<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeGenerator")
            .field("node_id", &self.node_id)
            .field("wait_timeout", &self.wait_timeout)
            .finish_non_exhaustive()
    }
}
