//! Time management for the sample pipeline
//!
//! Buffers stamp every sample on arrival, and duration-bounded windows are
//! measured against the same clock. The clock is injected so tests can pin
//! time instead of racing a real one:
//! - `MonotonicTime` for live use (never goes backwards)
//! - `MockTimeSource` for tests (set and advanced by hand)

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Timestamp in milliseconds since the clock's origin
pub type Timestamp = u64;

/// Clock shared between the buffers of one pipeline
pub type SharedClock = Arc<dyn TimeSource + Send + Sync>;

/// Source of time for the system
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs monotonic)
    fn is_wall_clock(&self) -> bool {
        false
    }
}

/// Monotonic time source measured from construction
///
/// Backed by `std::time::Instant`, so it is immune to wall clock adjustments.
#[derive(Debug, Clone)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    /// Clock starting at zero now
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }

    /// Convenience constructor for the shared form buffers expect
    pub fn shared() -> SharedClock {
        Arc::new(Self::new())
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> Timestamp {
        self.origin.elapsed().as_millis() as Timestamp
    }
}

/// Manually driven time source for testing
///
/// Interior mutability lets a test keep one handle while the buffers hold
/// another through `SharedClock`.
#[derive(Debug, Default)]
pub struct MockTimeSource {
    timestamp: AtomicU64,
}

impl MockTimeSource {
    /// Clock frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp: AtomicU64::new(timestamp) }
    }

    /// Jump to `timestamp`
    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.store(timestamp, Ordering::SeqCst);
    }

    /// Move forward by `ms` milliseconds
    pub fn advance(&self, ms: u64) {
        self.timestamp.fetch_add(ms, Ordering::SeqCst);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.timestamp.load(Ordering::SeqCst)
    }
}
