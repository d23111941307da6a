//! Millisecond clock that several devices can align to a shared reference.
//!
//! The first [`SyncedClock::synchronize`] call only records the reference
//! and local times. Every later call sets the offset to the reference drift
//! since then, so animations on all devices land on the same phase.

use core::cell::Cell;

use embassy_time::Instant;

/// Free-running millisecond counter. Wraps after ~49 days.
pub trait MonotonicSource {
    fn now_ms(&self) -> u32;
}

/// Time source backed by the embassy time driver
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbassyMonotonic;

impl MonotonicSource for EmbassyMonotonic {
    #[allow(clippy::cast_possible_truncation)]
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}

/// Hand-driven time source for hosts and tests
#[derive(Debug, Default)]
pub struct ManualMonotonic {
    now: Cell<u32>,
}

impl ManualMonotonic {
    pub const fn new(start_ms: u32) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, now_ms: u32) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, delta_ms: u32) {
        self.now.set(self.now.get().wrapping_add(delta_ms));
    }
}

impl MonotonicSource for ManualMonotonic {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

impl<S: MonotonicSource + ?Sized> MonotonicSource for &S {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

#[derive(Debug)]
pub struct SyncedClock<S: MonotonicSource> {
    source: S,
    offset: u32,
    /// (reference, local) times captured by the first sync
    anchor: Option<(u32, u32)>,
    /// Last 32-bit reading and its widened value, so [`Self::now`] keeps
    /// counting across the counter wrap
    widened: Cell<Option<(u32, u64)>>,
}

impl<S: MonotonicSource> SyncedClock<S> {
    pub const fn new(source: S) -> Self {
        Self {
            source,
            offset: 0,
            anchor: None,
            widened: Cell::new(None),
        }
    }

    /// Local time shifted by the sync offset
    pub fn now_ms(&self) -> u32 {
        self.source.now_ms().wrapping_add(self.offset)
    }

    /// Synchronized time as an [`Instant`].
    ///
    /// Built from wrapping deltas between calls, so it stays monotonic past
    /// the ~49 day wrap of the millisecond counter as long as it is read
    /// more often than every ~24 days. Sync corrections may step it back.
    #[allow(clippy::cast_possible_wrap)]
    pub fn now(&self) -> Instant {
        let ms = self.now_ms();
        let widened = match self.widened.get() {
            None => u64::from(ms),
            Some((last, widened)) => {
                let delta = ms.wrapping_sub(last) as i32;
                widened.saturating_add_signed(i64::from(delta))
            }
        };
        self.widened.set(Some((ms, widened)));
        Instant::from_millis(widened)
    }

    /// Signed offset applied on top of the local time
    #[allow(clippy::cast_possible_wrap)]
    pub fn offset_ms(&self) -> i32 {
        self.offset as i32
    }

    pub fn is_synchronized(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn synchronize(&mut self, reference_ms: u32) {
        let local = self.source.now_ms();
        let Some((initial_reference, initial_local)) = self.anchor else {
            self.anchor = Some((reference_ms, local));
            return;
        };

        let reference_diff = reference_ms.wrapping_sub(initial_reference);
        let local_diff = local.wrapping_sub(initial_local);
        self.offset = reference_diff.wrapping_sub(local_diff);

        #[cfg(feature = "log")]
        log::debug!("clock: offset {} ms", self.offset_ms());
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
