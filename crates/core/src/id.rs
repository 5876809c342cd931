//! Inode IDs and the time-ordered ID generator
//!
//! An inode ID is a packed 64-bit value, most significant bits first:
//!
//! ```text
//! | 32-bit timestamp | 4-bit node ID | 4-bit clock seq | 24-bit sequence |
//! ```
//!
//! The timestamp counts seconds since 2025-03-18 00:00:00 UTC, which covers
//! roughly the next 100 years. The node ID distinguishes up to 16 metadata
//! servers; the clock sequence disambiguates restarts within a second. The
//! sequence supports up to 10,000,000 allocations per node per second.
//!
//! Because the sequence occupies the low bits, `next()` is a single
//! `fetch_add` and two IDs allocated under the same prefix compare in
//! generation order; IDs from different seconds compare in time order.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::time::{Clock, SEC_TO_NS};

/// Seconds between the Unix epoch and the ID epoch (2025-03-18 00:00:00 UTC)
pub const ID_EPOCH_UNIX_SECS: i64 = 1_742_256_000;

const NODE_ID_BITS: u32 = 4;
const CLOCK_SEQ_BITS: u32 = 4;
const SEQUENCE_BITS: u32 = 24;

const TIMESTAMP_SHIFT: u32 = NODE_ID_BITS + CLOCK_SEQ_BITS + SEQUENCE_BITS;
const NODE_ID_SHIFT: u32 = CLOCK_SEQ_BITS + SEQUENCE_BITS;
const CLOCK_SEQ_SHIFT: u32 = SEQUENCE_BITS;

const NODE_ID_MAX: u8 = (1 << NODE_ID_BITS) - 1;
const CLOCK_SEQ_MAX: u8 = (1 << CLOCK_SEQ_BITS) - 1;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;

/// Hard ceiling on allocations within one (timestamp, node, clock) prefix
pub const MAX_SEQUENCE_PER_SECOND: u32 = 10_000_000;

/// Identifier of an inode (directory or file)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct InodeId(pub u64);

impl InodeId {
    /// The root directory's well-known ID
    pub const ROOT: InodeId = InodeId(1);

    /// Sentinel for "no inode"
    pub const INVALID: InodeId = InodeId(u64::MAX);

    /// Big-endian key encoding; byte order equals numeric order
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Decode from the big-endian key encoding
    pub fn from_be_bytes(bytes: [u8; 8]) -> Self {
        InodeId(u64::from_be_bytes(bytes))
    }
}

impl std::fmt::Display for InodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decoded fields of a packed ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdParts {
    /// Seconds since the ID epoch
    pub timestamp_secs: u32,
    /// Metadata server number (0..=15)
    pub node_id: u8,
    /// Restart disambiguator (0..=15)
    pub clock_seq: u8,
    /// Intra-second allocation counter
    pub sequence: u32,
}

/// Pack ID fields into a u64
pub fn pack(parts: IdParts) -> u64 {
    debug_assert!(parts.node_id <= NODE_ID_MAX);
    debug_assert!(parts.clock_seq <= CLOCK_SEQ_MAX);
    debug_assert!(u64::from(parts.sequence) <= SEQUENCE_MASK);
    (u64::from(parts.timestamp_secs) << TIMESTAMP_SHIFT)
        | (u64::from(parts.node_id) << NODE_ID_SHIFT)
        | (u64::from(parts.clock_seq) << CLOCK_SEQ_SHIFT)
        | u64::from(parts.sequence)
}

/// Unpack a u64 into its ID fields
pub fn unpack(raw: u64) -> IdParts {
    IdParts {
        timestamp_secs: (raw >> TIMESTAMP_SHIFT) as u32,
        node_id: ((raw >> NODE_ID_SHIFT) as u8) & NODE_ID_MAX,
        clock_seq: ((raw >> CLOCK_SEQ_SHIFT) as u8) & CLOCK_SEQ_MAX,
        sequence: (raw & SEQUENCE_MASK) as u32,
    }
}

/// Lock-free generator of time-ordered inode IDs
///
/// `next()` increments the packed counter; a ticker calls `update()` once per
/// second to advance the timestamp prefix and reset the sequence. Exhausting
/// the sequence within one second is a programmer error and panics, matching
/// the stance taken for version-counter overflow.
pub struct InodeIdGen {
    node_id: u8,
    clock_seq: u8,
    state: AtomicU64,
}

impl InodeIdGen {
    /// Create a generator positioned at `timestamp_secs` (seconds since the
    /// ID epoch)
    ///
    /// # Panics
    ///
    /// Panics if `node_id` or `clock_seq` exceed their 4-bit range.
    pub fn new(timestamp_secs: u32, node_id: u8, clock_seq: u8) -> Self {
        assert!(node_id <= NODE_ID_MAX, "node_id must fit in 4 bits");
        assert!(clock_seq <= CLOCK_SEQ_MAX, "clock_seq must fit in 4 bits");
        InodeIdGen {
            node_id,
            clock_seq,
            state: AtomicU64::new(pack(IdParts {
                timestamp_secs,
                node_id,
                clock_seq,
                sequence: 0,
            })),
        }
    }

    /// Allocate the next ID
    ///
    /// # Panics
    ///
    /// Panics if more than [`MAX_SEQUENCE_PER_SECOND`] IDs are allocated
    /// within one second; callers must back off.
    pub fn next(&self) -> InodeId {
        let raw = self.state.fetch_add(1, Ordering::Relaxed) + 1;
        let parts = unpack(raw);
        assert_eq!(parts.node_id, self.node_id, "inode id generator corrupted");
        assert_eq!(
            parts.clock_seq, self.clock_seq,
            "inode id generator corrupted"
        );
        assert!(
            parts.sequence < MAX_SEQUENCE_PER_SECOND,
            "inode id sequence exhausted within one second"
        );
        InodeId(raw)
    }

    /// Advance the timestamp prefix if `timestamp_secs` is newer, resetting
    /// the sequence
    ///
    /// A stale `timestamp_secs` (same second or clock regression) is a no-op.
    pub fn update(&self, timestamp_secs: u32) {
        loop {
            let current = self.state.load(Ordering::Relaxed);
            let parts = unpack(current);
            if parts.timestamp_secs >= timestamp_secs {
                return;
            }
            let next = pack(IdParts {
                timestamp_secs,
                node_id: self.node_id,
                clock_seq: self.clock_seq,
                sequence: 0,
            });
            if self
                .state
                .compare_exchange(current, next, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                return;
            }
        }
    }

    /// Current seconds-since-ID-epoch according to `clock`
    ///
    /// # Panics
    ///
    /// Panics if the wall clock reads before the ID epoch.
    pub fn epoch_secs_now(clock: &dyn Clock) -> u32 {
        let unix_secs = clock.now_ns() / SEC_TO_NS;
        let since_epoch = unix_secs - ID_EPOCH_UNIX_SECS;
        assert!(since_epoch > 0, "system clock reads before the ID epoch");
        since_epoch as u32
    }
}

/// Handle to the background ticker that advances a generator's timestamp
///
/// Dropping the handle without calling [`TickerHandle::stop`] leaves the
/// ticker running for the life of the process.
pub struct TickerHandle {
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl TickerHandle {
    /// Spawn a ticker that calls `gen.update()` with the current second, once
    /// per second
    pub fn spawn(id_gen: Arc<InodeIdGen>, clock: Arc<dyn Clock>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name("inode-id-ticker".to_string())
            .spawn(move || {
                while !stop_flag.load(Ordering::Relaxed) {
                    id_gen.update(InodeIdGen::epoch_secs_now(clock.as_ref()));
                    thread::sleep(Duration::from_secs(1));
                }
            })
            .expect("failed to spawn inode-id ticker thread");
        TickerHandle {
            stop,
            thread: Some(thread),
        }
    }

    /// Signal the ticker to stop and wait for it to exit
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pack_unpack_round_trip() {
        let parts = IdParts {
            timestamp_secs: 123_456_789,
            node_id: 7,
            clock_seq: 3,
            sequence: 9_999_999,
        };
        assert_eq!(unpack(pack(parts)), parts);
    }

    #[test]
    fn test_sequence_occupies_low_bits() {
        let base = IdParts {
            timestamp_secs: 10,
            node_id: 1,
            clock_seq: 0,
            sequence: 5,
        };
        let next = IdParts {
            sequence: 6,
            ..base
        };
        assert_eq!(pack(next), pack(base) + 1);
    }

    #[test]
    fn test_generation_order_within_second() {
        let id_gen = InodeIdGen::new(100, 2, 1);
        let a = id_gen.next();
        let b = id_gen.next();
        assert!(a < b);
        assert_eq!(unpack(a.0).sequence + 1, unpack(b.0).sequence);
        assert_eq!(unpack(a.0).timestamp_secs, 100);
    }

    #[test]
    fn test_time_order_across_seconds() {
        let id_gen = InodeIdGen::new(100, 2, 1);
        let before = id_gen.next();
        id_gen.update(101);
        let after = id_gen.next();
        assert!(before < after);
        assert_eq!(unpack(after.0).sequence, 1);
        assert_eq!(unpack(after.0).timestamp_secs, 101);
    }

    #[test]
    fn test_update_ignores_stale_timestamp() {
        let id_gen = InodeIdGen::new(100, 0, 0);
        id_gen.next();
        id_gen.update(100);
        id_gen.update(99);
        // Sequence kept: neither call advanced the prefix.
        assert_eq!(unpack(id_gen.next().0).sequence, 2);
    }

    #[test]
    #[should_panic(expected = "sequence exhausted")]
    fn test_sequence_overflow_panics() {
        let id_gen = InodeIdGen::new(50, 0, 0);
        id_gen.state.store(
            pack(IdParts {
                timestamp_secs: 50,
                node_id: 0,
                clock_seq: 0,
                sequence: MAX_SEQUENCE_PER_SECOND - 1,
            }),
            Ordering::Relaxed,
        );
        id_gen.next();
    }

    #[test]
    fn test_ticker_advances_generator() {
        use crate::time::FixedClock;

        let clock = Arc::new(FixedClock::new((ID_EPOCH_UNIX_SECS + 500) * SEC_TO_NS));
        let id_gen = Arc::new(InodeIdGen::new(1, 0, 0));
        let ticker = TickerHandle::spawn(Arc::clone(&id_gen), clock);
        // The first tick runs before the first sleep.
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        loop {
            if unpack(id_gen.next().0).timestamp_secs == 500 {
                break;
            }
            assert!(std::time::Instant::now() < deadline, "ticker never ticked");
            thread::sleep(Duration::from_millis(10));
        }
        ticker.stop();
    }

    proptest! {
        #[test]
        fn prop_pack_unpack_identity(
            timestamp_secs in any::<u32>(),
            node_id in 0u8..16,
            clock_seq in 0u8..16,
            sequence in 0u32..(1 << 24),
        ) {
            let parts = IdParts { timestamp_secs, node_id, clock_seq, sequence };
            prop_assert_eq!(unpack(pack(parts)), parts);
        }

        #[test]
        fn prop_timestamp_dominates_ordering(
            ts_a in any::<u32>(),
            ts_b in any::<u32>(),
            seq_a in 0u32..(1 << 24),
            seq_b in 0u32..(1 << 24),
        ) {
            prop_assume!(ts_a < ts_b);
            let a = pack(IdParts { timestamp_secs: ts_a, node_id: 15, clock_seq: 15, sequence: seq_a });
            let b = pack(IdParts { timestamp_secs: ts_b, node_id: 0, clock_seq: 0, sequence: seq_b });
            prop_assert!(a < b);
        }
    }
}
