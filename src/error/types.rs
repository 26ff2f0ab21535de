//! Core error types for the ring bus
//!
//! This module defines the main error type used throughout the library.

use crate::error::{FrameFault, LineError};

/// Main error type for local node operations
///
/// Bus-side failures are reported on the wire as error replies, so most of
/// these variants describe misuse of the local API or configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RingError {
    // Configuration errors
    /// Node ID does not fit the high-nibble addressing scheme
    InvalidNodeId,
    /// Register index outside the register file
    InvalidRegister,
    /// Alarm ordinal outside `1..=ALARMS`
    InvalidAlarm,
    /// Debounce line outside `0..4` or not configured
    InvalidLine,
    /// Day of week outside `1..=7`
    InvalidWeekday,
    /// Node configuration failed validation; carries the failed check
    InvalidConfiguration(&'static str),

    // Clock errors
    /// Fine-resolution operation requested on a coarse clock
    ClockModeMismatch,

    // Protocol errors
    /// A frame was rejected and answered with an error reply
    Frame(FrameFault),
    /// The serial line reported framing or overrun errors
    Line(LineError),
}

impl RingError {
    /// Returns true if the node can carry on after this error
    pub const fn is_recoverable(&self) -> bool {
        match self {
            // Static misconfiguration
            Self::InvalidConfiguration(_) | Self::ClockModeMismatch => false,

            // Argument or bus errors
            Self::InvalidNodeId
            | Self::InvalidRegister
            | Self::InvalidAlarm
            | Self::InvalidLine
            | Self::InvalidWeekday
            | Self::Frame(_)
            | Self::Line(_) => true,
        }
    }

    /// Returns true if this error originated on the bus
    pub const fn is_protocol_error(&self) -> bool {
        match self {
            Self::Frame(_) | Self::Line(_) => true,
            _ => false,
        }
    }

    /// Returns the error category as a string
    pub const fn category(&self) -> &'static str {
        match self {
            Self::InvalidNodeId
            | Self::InvalidRegister
            | Self::InvalidAlarm
            | Self::InvalidLine
            | Self::InvalidWeekday => "Argument",

            Self::InvalidConfiguration(_) => "Configuration",

            Self::ClockModeMismatch => "Clock",

            Self::Frame(_) | Self::Line(_) => "Protocol",
        }
    }
}

impl From<FrameFault> for RingError {
    fn from(fault: FrameFault) -> Self {
        Self::Frame(fault)
    }
}

impl From<LineError> for RingError {
    fn from(error: LineError) -> Self {
        Self::Line(error)
    }
}

/// Result type for ring bus operations
pub type RingResult<T> = Result<T, RingError>;
