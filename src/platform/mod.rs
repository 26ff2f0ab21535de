//! Platform timing constants
//!
//! This module derives hardware timer settings for the Tic clock without
//! requiring HAL dependencies. One day is 65536 Tics, one Tic is 1024
//! milli-ticks and, on a fine clock, one milli-tick is 256 fine ticks.

/// Clock hierarchy constants
pub mod constants {
    /// CPU clock the reference timings were computed for
    pub const DEFAULT_CPU_HZ: u32 = 16_000_000;

    /// Seconds in a calendar day
    pub const SECONDS_PER_DAY: u64 = 86_400;

    /// Tics in one day (the 16-bit daily counter wraps once per day)
    pub const TICS_PER_DAY: u32 = 1 << 16;

    /// Milli-ticks per Tic
    pub const MILLI_PER_TIC: u32 = 1024;

    /// Low bits of the milli-tick counter that must be zero on a Tic boundary
    pub const TIC_BOUNDARY_MASK: u16 = (MILLI_PER_TIC - 1) as u16;

    /// Fine ticks per milli-tick (one full wrap of the 8-bit fine counter)
    pub const FINE_PER_MILLI: u32 = 256;

    /// Nominal length of one fine tick in microseconds
    pub const FINE_TICK_MICROS: u16 = 5;

    /// Days in a week; the weekday counter runs `1..=DAYS_PER_WEEK`
    pub const DAYS_PER_WEEK: u8 = 7;
}

/// Hardware timer compare values
pub mod timer {
    use super::constants::*;

    /// CPU cycles in one milli-tick, rounded down
    ///
    /// At 16 MHz this is 20599 cycles, which runs about 1.5 s slow per day.
    pub const fn cycles_per_milli_tick(cpu_hz: u32) -> u32 {
        let per_day = cpu_hz as u64 * SECONDS_PER_DAY;
        (per_day / (TICS_PER_DAY as u64 * MILLI_PER_TIC as u64)) as u32
    }

    /// Compare value for a timer that interrupts once per milli-tick
    pub const fn coarse_compare(cpu_hz: u32) -> u32 {
        cycles_per_milli_tick(cpu_hz).saturating_sub(1)
    }

    /// Compare value for a timer that interrupts once per fine tick
    ///
    /// The fine clock trades long-term accuracy for resolution: at 16 MHz it
    /// runs several minutes fast per day and needs regular time hacks.
    pub const fn fine_compare(cpu_hz: u32) -> u32 {
        cycles_per_milli_tick(cpu_hz) / FINE_PER_MILLI
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_timings() {
        assert_eq!(timer::cycles_per_milli_tick(constants::DEFAULT_CPU_HZ), 20_599);
        assert_eq!(timer::coarse_compare(constants::DEFAULT_CPU_HZ), 20_598);
        assert_eq!(timer::fine_compare(constants::DEFAULT_CPU_HZ), 80);
    }

    #[test]
    fn test_hierarchy_constants() {
        assert_eq!(constants::TIC_BOUNDARY_MASK, 0x03FF);
        assert!(constants::MILLI_PER_TIC.is_power_of_two());
        assert_eq!(constants::FINE_PER_MILLI, u8::MAX as u32 + 1);
        assert_eq!(constants::TICS_PER_DAY, u16::MAX as u32 + 1);
    }

    #[test]
    fn test_scaling_with_cpu_clock() {
        let half = timer::cycles_per_milli_tick(8_000_000);
        let full = timer::cycles_per_milli_tick(16_000_000);
        assert!(full - 2 * half <= 1);
    }
}
