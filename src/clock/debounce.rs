//! Debounced edge counters
//!
//! Up to four auxiliary input lines are sampled at a slow, fixed cadence from
//! the timer interrupt. Sampling slower than the contact bounce settles is the
//! debounce; each configured line counts rising edges, falling edges or every
//! change.

use core::cell::Cell;
use core::marker::PhantomData;

use critical_section::{CriticalSection, Mutex};

use crate::config::NodeConfig;
use crate::error::{RingError, RingResult};

/// Number of debounced lines
pub const LINE_COUNT: usize = 4;

#[derive(Debug, Clone, Copy)]
struct DebounceState {
    previous: u8,
    counts: [u16; LINE_COUNT],
}

/// Edge counters for the configured lines
pub struct Debouncer<C: NodeConfig> {
    state: Mutex<Cell<DebounceState>>,
    _config: PhantomData<fn() -> C>,
}

impl<C: NodeConfig> Default for Debouncer<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: NodeConfig> Debouncer<C> {
    /// Creates zeroed counters with all lines assumed low
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(DebounceState {
                previous: 0,
                counts: [0; LINE_COUNT],
            })),
            _config: PhantomData,
        }
    }

    /// Records the current line levels without counting anything
    pub fn prime(&self, lines: u8) {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            state.previous = lines & C::debounce_mask();
            cell.set(state);
        });
    }

    /// Compares a sample against the last one and counts qualifying edges
    ///
    /// Bit `n` of `lines` is the level of line `n`. Returns a mask of the lines
    /// whose counter moved.
    pub fn sample(&self, cs: CriticalSection<'_>, lines: u8) -> u8 {
        let mask = C::debounce_mask();
        let cell = self.state.borrow(cs);
        let mut state = cell.get();

        let current = lines & mask;
        let changed = current ^ state.previous;
        let mut counted = 0;

        if changed != 0 {
            for (line, policy) in C::DEBOUNCE.iter().enumerate() {
                let bit = 1 << line;
                if changed & bit == 0 {
                    continue;
                }
                if let Some(policy) = policy {
                    if policy.counts(current & bit != 0) {
                        state.counts[line] = state.counts[line].wrapping_add(1);
                        counted |= bit;
                    }
                }
            }
            state.previous = current;
            cell.set(state);
        }

        counted
    }

    /// Edge count of `line`
    pub fn counter(&self, line: usize) -> RingResult<u16> {
        critical_section::with(|cs| self.counter_in(cs, line))
    }

    /// [`counter`](Self::counter) for callers already inside a critical section
    pub fn counter_in(&self, cs: CriticalSection<'_>, line: usize) -> RingResult<u16> {
        Self::check_line(line)?;
        Ok(self.state.borrow(cs).get().counts[line])
    }

    /// Zeroes the edge count of `line`
    pub fn reset(&self, line: usize) -> RingResult<()> {
        self.take(line).map(|_| ())
    }

    /// Reads and zeroes the edge count of `line` in one step
    pub fn take(&self, line: usize) -> RingResult<u16> {
        critical_section::with(|cs| self.take_in(cs, line))
    }

    /// [`take`](Self::take) for callers already inside a critical section
    pub fn take_in(&self, cs: CriticalSection<'_>, line: usize) -> RingResult<u16> {
        let count = self.counter_in(cs, line)?;
        self.set_in(cs, line, 0)?;
        Ok(count)
    }

    /// Presets the edge count of `line`
    pub fn set_in(&self, cs: CriticalSection<'_>, line: usize, count: u16) -> RingResult<()> {
        Self::check_line(line)?;
        let cell = self.state.borrow(cs);
        let mut state = cell.get();
        state.counts[line] = count;
        cell.set(state);
        Ok(())
    }

    fn check_line(line: usize) -> RingResult<()> {
        match C::DEBOUNCE.get(line) {
            Some(Some(_)) => Ok(()),
            _ => Err(RingError::InvalidLine),
        }
    }
}
