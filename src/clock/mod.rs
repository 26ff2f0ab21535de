//! Clock module
//!
//! The daily Tic clock and the debounced edge counters sampled from the same
//! timer interrupt.

pub mod debounce;
pub mod engine;

// Re-export main types
pub use debounce::{Debouncer, LINE_COUNT};
pub use engine::{ClockEngine, ClockSnapshot, TickOutcome};
