//! Tic clock engine
//!
//! Three counters driven by one hardware timer: an optional 8-bit fine counter,
//! a free-running 16-bit milli-tick counter and the 16-bit daily Tic. The timer
//! interrupt is the only writer outside of time hacks; every multi-byte read
//! goes through a critical section so a half-updated value is never observed.

use core::cell::Cell;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicU8, Ordering};

use critical_section::{CriticalSection, Mutex};

use crate::config::{ClockMode, NodeConfig};
use crate::error::{RingError, RingResult};
use crate::platform::constants::{DAYS_PER_WEEK, FINE_TICK_MICROS, TIC_BOUNDARY_MASK};

/// Consistent copy of the clock counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClockSnapshot {
    /// Milli-tick counter
    pub milli: u16,
    /// Daily Tic
    pub tic: u16,
    /// Day of week, `1..=7`
    pub day_of_week: u8,
}

impl ClockSnapshot {
    const START: Self = Self {
        milli: 0,
        tic: 0,
        day_of_week: 1,
    };
}

/// What one timer interrupt changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickOutcome {
    /// The milli-tick counter moved
    pub milli_advanced: bool,
    /// The daily Tic moved
    pub tic_advanced: bool,
    /// The daily Tic wrapped to zero
    pub midnight: bool,
    /// Milli-tick counter after the interrupt
    pub milli: u16,
    /// Daily Tic after the interrupt
    pub tic: u16,
}

/// Multi-resolution daily clock
///
/// # Example
/// ```rust
/// use ticring::clock::ClockEngine;
/// use ticring::configs::GenericNodeConfig;
///
/// let clock = ClockEngine::<GenericNodeConfig>::new();
/// critical_section::with(|cs| {
///     for _ in 0..1024 {
///         clock.advance(cs);
///     }
/// });
/// assert_eq!(clock.now(), 1);
/// assert_eq!(clock.milli_now(), 1024);
/// ```
pub struct ClockEngine<C: NodeConfig> {
    counters: Mutex<Cell<ClockSnapshot>>,
    // Single writer (the timer interrupt), byte-sized: plain load/store suffice.
    fine: AtomicU8,
    _config: PhantomData<fn() -> C>,
}

impl<C: NodeConfig> Default for ClockEngine<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: NodeConfig> ClockEngine<C> {
    /// Creates a clock at Tic 0 on day 1
    pub const fn new() -> Self {
        Self {
            counters: Mutex::new(Cell::new(ClockSnapshot::START)),
            fine: AtomicU8::new(0),
            _config: PhantomData,
        }
    }

    /// Timer interrupt body
    ///
    /// On a fine clock the milli-tick only moves when the fine counter wraps.
    pub fn advance(&self, cs: CriticalSection<'_>) -> TickOutcome {
        if let ClockMode::Fine = C::CLOCK_MODE {
            let fine = self.fine.load(Ordering::Relaxed).wrapping_add(1);
            self.fine.store(fine, Ordering::Relaxed);
            if fine != 0 {
                return TickOutcome::default();
            }
        }

        let cell = self.counters.borrow(cs);
        let mut counters = cell.get();
        let mut outcome = TickOutcome {
            milli_advanced: true,
            ..TickOutcome::default()
        };

        counters.milli = counters.milli.wrapping_add(1);
        if counters.milli & TIC_BOUNDARY_MASK == 0 {
            counters.tic = counters.tic.wrapping_add(1);
            outcome.tic_advanced = true;
            if counters.tic == 0 {
                counters.day_of_week += 1;
                if counters.day_of_week > DAYS_PER_WEEK {
                    counters.day_of_week = 1;
                }
                outcome.midnight = true;
            }
        }

        cell.set(counters);
        outcome.milli = counters.milli;
        outcome.tic = counters.tic;
        outcome
    }

    /// Current daily Tic
    pub fn now(&self) -> u16 {
        self.snapshot().tic
    }

    /// Current milli-tick counter
    pub fn milli_now(&self) -> u16 {
        self.snapshot().milli
    }

    /// Day of week, `1..=7`
    pub fn day_of_week(&self) -> u8 {
        self.snapshot().day_of_week
    }

    /// All counters, read together
    pub fn snapshot(&self) -> ClockSnapshot {
        critical_section::with(|cs| self.counters.borrow(cs).get())
    }

    /// Fine counter in microseconds (5 µs per fine tick)
    pub fn fine_now(&self) -> RingResult<u16> {
        Self::require_fine()?;
        Ok(self.fine.load(Ordering::Relaxed) as u16 * FINE_TICK_MICROS)
    }

    /// Time hack: replaces the daily Tic, milli-tick phase untouched
    pub fn set_now(&self, tic: u16) {
        critical_section::with(|cs| self.set_now_in(cs, tic));
    }

    /// [`set_now`](Self::set_now) for callers already inside a critical section
    pub fn set_now_in(&self, cs: CriticalSection<'_>, tic: u16) {
        let cell = self.counters.borrow(cs);
        let mut counters = cell.get();
        counters.tic = tic;
        cell.set(counters);
    }

    /// Sets the day of week
    pub fn set_day_of_week(&self, day: u8) -> RingResult<()> {
        if !(1..=DAYS_PER_WEEK).contains(&day) {
            return Err(RingError::InvalidWeekday);
        }
        critical_section::with(|cs| {
            let cell = self.counters.borrow(cs);
            let mut counters = cell.get();
            counters.day_of_week = day;
            cell.set(counters);
        });
        Ok(())
    }

    /// Busy-waits until the milli-tick counter has moved on by `milli`
    ///
    /// `on_advance` runs once for every advance observed while waiting; this is
    /// where cooperative work gets its turn. Several milli-ticks may pass between
    /// two observations; all of them count toward `milli`.
    pub fn wait_milli<F>(&self, milli: u16, mut on_advance: F)
    where
        F: FnMut(),
    {
        let mut elapsed = 0u32;
        let mut last = self.milli_now();
        while elapsed < milli as u32 {
            let current = self.milli_now();
            if current == last {
                core::hint::spin_loop();
                continue;
            }
            elapsed += current.wrapping_sub(last) as u32;
            last = current;
            on_advance();
        }
    }

    /// Busy-waits for about `micros` microseconds, rounded to whole fine ticks
    pub fn delay_fine(&self, micros: u16) -> RingResult<()> {
        Self::require_fine()?;
        let ticks = (micros as u32 + 2) / FINE_TICK_MICROS as u32;
        let mut elapsed = 0u32;
        let mut last = self.fine.load(Ordering::Relaxed);
        while elapsed < ticks {
            let current = self.fine.load(Ordering::Relaxed);
            if current == last {
                core::hint::spin_loop();
                continue;
            }
            elapsed += current.wrapping_sub(last) as u32;
            last = current;
        }
        Ok(())
    }

    fn require_fine() -> RingResult<()> {
        match C::CLOCK_MODE {
            ClockMode::Fine => Ok(()),
            ClockMode::Coarse => Err(RingError::ClockModeMismatch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::{FineClockNodeConfig, GenericNodeConfig};

    fn run<C: NodeConfig>(clock: &ClockEngine<C>, interrupts: u32) -> TickOutcome {
        critical_section::with(|cs| {
            let mut last = TickOutcome::default();
            for _ in 0..interrupts {
                last = clock.advance(cs);
            }
            last
        })
    }

    #[test]
    fn test_tic_boundary() {
        let clock = ClockEngine::<GenericNodeConfig>::new();
        let outcome = run(&clock, 1023);
        assert!(outcome.milli_advanced);
        assert!(!outcome.tic_advanced);
        assert_eq!(clock.now(), 0);

        let outcome = run(&clock, 1);
        assert!(outcome.tic_advanced);
        assert_eq!(outcome.tic, 1);
        assert_eq!(clock.now(), 1);
    }

    #[test]
    fn test_midnight_wraps_weekday() {
        let clock = ClockEngine::<GenericNodeConfig>::new();
        clock.set_now(u16::MAX);
        assert!(clock.set_day_of_week(7).is_ok());

        critical_section::with(|cs| {
            let cell = clock.counters.borrow(cs);
            let mut counters = cell.get();
            counters.milli = 1023;
            cell.set(counters);
        });

        let outcome = run(&clock, 1);
        assert!(outcome.midnight);
        assert_eq!(clock.now(), 0);
        assert_eq!(clock.day_of_week(), 1);
    }

    #[test]
    fn test_weekday_bounds() {
        let clock = ClockEngine::<GenericNodeConfig>::new();
        assert_eq!(clock.day_of_week(), 1);
        assert_eq!(clock.set_day_of_week(0), Err(RingError::InvalidWeekday));
        assert_eq!(clock.set_day_of_week(8), Err(RingError::InvalidWeekday));
    }

    #[test]
    fn test_time_hack_keeps_phase() {
        let clock = ClockEngine::<GenericNodeConfig>::new();
        run(&clock, 100);
        clock.set_now(0x4000);
        assert_eq!(clock.now(), 0x4000);
        assert_eq!(clock.milli_now(), 100);
    }

    #[test]
    fn test_fine_mode_divides_by_256() {
        let clock = ClockEngine::<FineClockNodeConfig>::new();
        let outcome = run(&clock, 255);
        assert!(!outcome.milli_advanced);
        assert_eq!(clock.fine_now(), Ok(255 * 5));

        let outcome = run(&clock, 1);
        assert!(outcome.milli_advanced);
        assert_eq!(clock.milli_now(), 1);
        assert_eq!(clock.fine_now(), Ok(0));
    }

    #[test]
    fn test_fine_calls_rejected_on_coarse_clock() {
        let clock = ClockEngine::<GenericNodeConfig>::new();
        assert_eq!(clock.fine_now(), Err(RingError::ClockModeMismatch));
        assert_eq!(clock.delay_fine(10), Err(RingError::ClockModeMismatch));
    }

    #[test]
    fn test_zero_waits_return_at_once() {
        let clock = ClockEngine::<FineClockNodeConfig>::new();
        let mut yields = 0;
        clock.wait_milli(0, || yields += 1);
        assert_eq!(yields, 0);
        // Rounds to zero fine ticks.
        assert_eq!(clock.delay_fine(2), Ok(()));
    }
}
