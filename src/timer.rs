// Licensed under the Apache-2.0 license

//! Deadline timers and the bounded polling helper shared by every wait site.

use embedded_hal::delay::DelayNs;
use fugit::MillisDurationU32 as MilliSeconds;

/// Millisecond deadline source.
///
/// `start` arms a deadline and returns a handle for it. `is_elapsed` is
/// polled from busy-wait loops and must eventually return `true` for any
/// finite timeout.
pub trait Timer {
    type Handle;

    fn start(&mut self, timeout: MilliSeconds) -> Self::Handle;

    fn is_elapsed(&mut self, handle: &Self::Handle) -> bool;
}

/// The deadline passed before the polled condition became true.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Elapsed;

/// Busy-poll `ready` until it returns `true` or `timeout` elapses.
///
/// The deadline is checked before each sample, so a zero timeout never
/// samples the condition.
///
/// # Errors
///
/// Returns `Elapsed` if the deadline passed first.
pub fn poll_until<T, F>(timer: &mut T, timeout: MilliSeconds, mut ready: F) -> Result<(), Elapsed>
where
    T: Timer,
    F: FnMut() -> bool,
{
    let deadline = timer.start(timeout);
    loop {
        if timer.is_elapsed(&deadline) {
            return Err(Elapsed);
        }
        if ready() {
            return Ok(());
        }
    }
}

/// Deadline in microseconds of `DelayTimer` time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Deadline(u64);

/// `Timer` for boards without a free-running counter.
///
/// Time advances only while polling: every `is_elapsed` call that does not
/// report expiry blocks for one tick on the wrapped `DelayNs`. The wait is
/// therefore at least as long as requested, plus the time spent in the
/// polled condition.
pub struct DelayTimer<D: DelayNs> {
    delay: D,
    tick_us: u32,
    now_us: u64,
}

impl<D: DelayNs> DelayTimer<D> {
    const DEFAULT_TICK_US: u32 = 10;

    #[must_use]
    pub fn new(delay: D) -> Self {
        Self::with_tick(delay, Self::DEFAULT_TICK_US)
    }

    /// A zero tick is raised to one microsecond.
    #[must_use]
    pub fn with_tick(delay: D, tick_us: u32) -> Self {
        Self {
            delay,
            tick_us: tick_us.max(1),
            now_us: 0,
        }
    }
}

impl<D: DelayNs> Timer for DelayTimer<D> {
    type Handle = Deadline;

    fn start(&mut self, timeout: MilliSeconds) -> Deadline {
        Deadline(self.now_us + u64::from(timeout.to_millis()) * 1000)
    }

    fn is_elapsed(&mut self, handle: &Deadline) -> bool {
        if self.now_us >= handle.0 {
            return true;
        }
        self.delay.delay_us(self.tick_us);
        self.now_us += u64::from(self.tick_us);
        false
    }
}
