//! Node configuration trait and implementations
//!
//! This module defines the NodeConfig trait that fixes a node's identity and
//! timing at compile time.

use crate::config::ConfigValidator;
use crate::error::RingResult;
use crate::platform::timer;
use crate::protocol::NodeId;

/// Timer resolution driving the clock
///
/// The two modes use different hardware timers and are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClockMode {
    /// One interrupt per milli-tick; most accurate over a day
    Coarse,
    /// One interrupt per fine tick (~5 µs); 256 fine ticks per milli-tick
    Fine,
}

/// Which transitions of a debounced input line are counted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgePolicy {
    /// Count low to high transitions
    Rising,
    /// Count high to low transitions
    Falling,
    /// Count every change
    Either,
}

impl EdgePolicy {
    /// Returns true if a change of the line to `level` should be counted
    pub const fn counts(&self, level: bool) -> bool {
        match self {
            Self::Rising => level,
            Self::Falling => !level,
            Self::Either => true,
        }
    }
}

/// Node configuration trait for compile-time setup
///
/// # Example
/// ```rust
/// use ticring::config::{ClockMode, NodeConfig};
/// use ticring::configs::GenericNodeConfig;
///
/// assert!(GenericNodeConfig::validate().is_ok());
/// assert_eq!(GenericNodeConfig::CLOCK_MODE, ClockMode::Coarse);
/// ```
pub trait NodeConfig {
    /// Bus address, high nibble only (`0x10..=0xF0`)
    const NODE_ID: u8;

    /// Serial line speed in bits per second
    const BAUD: u32;

    /// CPU clock in Hz
    const CPU_HZ: u32;

    /// Number of active alarms (0..=4)
    const ALARMS: usize;

    /// Milli-ticks of line silence after which the next byte starts a frame
    const DEAD_TIME: u8;

    /// Clock resolution
    const CLOCK_MODE: ClockMode;

    /// Edge policy per auxiliary counter line, `None` if unused
    const DEBOUNCE: [Option<EdgePolicy>; 4];

    /// Milli-tick mask selecting debounce sample instants (2^k - 1)
    const DEBOUNCE_INTERVAL: u16;

    /// Register mirroring the daily Tic, if any
    const TIME_REGISTER: Option<usize>;

    /// Register mirroring the edge count of line 0, if any
    ///
    /// Only used when line 0 is debounced. A bus write to it presets the count.
    const COUNTER_REGISTER: Option<usize>;

    /// Validates that the configuration is consistent and within bounds
    fn validate() -> RingResult<()> {
        ConfigValidator::validate::<Self>()
    }

    /// Returns this node's bus address
    fn node_id() -> NodeId {
        NodeId::from_address_byte(Self::NODE_ID)
    }

    /// UART baud rate register value for 16x oversampling
    fn baud_divisor() -> u32 {
        (Self::CPU_HZ / (16 * Self::BAUD.max(1))).saturating_sub(1)
    }

    /// Compare value for the clock's hardware timer
    fn timer_compare() -> u32 {
        match Self::CLOCK_MODE {
            ClockMode::Coarse => timer::coarse_compare(Self::CPU_HZ),
            ClockMode::Fine => timer::fine_compare(Self::CPU_HZ),
        }
    }

    /// Bit mask of configured debounce lines
    fn debounce_mask() -> u8 {
        let mut mask = 0;
        for (line, policy) in Self::DEBOUNCE.iter().enumerate() {
            if policy.is_some() {
                mask |= 1 << line;
            }
        }
        mask
    }

    /// Bit mask of the alarms this node runs
    fn alarm_mask() -> u8 {
        ((1u16 << Self::ALARMS.min(4)) - 1) as u8
    }
}

/// Default node configuration for testing and examples
#[derive(Debug, Clone, Copy)]
pub struct DefaultNodeConfig;

impl Default for DefaultNodeConfig {
    fn default() -> Self {
        Self
    }
}

impl NodeConfig for DefaultNodeConfig {
    const NODE_ID: u8 = 0x10;
    const BAUD: u32 = 9600;
    const CPU_HZ: u32 = crate::platform::constants::DEFAULT_CPU_HZ;
    const ALARMS: usize = 4;
    const DEAD_TIME: u8 = 5;
    const CLOCK_MODE: ClockMode = ClockMode::Coarse;
    const DEBOUNCE: [Option<EdgePolicy>; 4] = [None; 4];
    const DEBOUNCE_INTERVAL: u16 = 0x3F;
    const TIME_REGISTER: Option<usize> = Some(7);
    const COUNTER_REGISTER: Option<usize> = Some(5);
}
