//! Configuration validation utilities
//!
//! Individual checks behind [`NodeConfig::validate`], usable on their own when
//! only part of a configuration matters. All checks are `const fn`, so a node
//! can refuse a bad configuration at compile time.

use crate::config::NodeConfig;
use crate::error::{RingError, RingResult};
use crate::registers::REGISTER_COUNT;

/// Validator for node configurations
pub struct ConfigValidator;

const fn invalid(reason: &'static str) -> RingResult<()> {
    Err(RingError::InvalidConfiguration(reason))
}

impl ConfigValidator {
    /// Runs every check, stopping at the first failure
    pub const fn validate<C: NodeConfig + ?Sized>() -> RingResult<()> {
        let checks = [
            Self::check_node_id::<C>(),
            Self::check_serial::<C>(),
            Self::check_alarms::<C>(),
            Self::check_debounce::<C>(),
            Self::check_registers::<C>(),
        ];
        let mut i = 0;
        while i < checks.len() {
            if let Err(err) = checks[i] {
                return Err(err);
            }
            i += 1;
        }
        Ok(())
    }

    /// Node IDs live in the high nibble and zero is the broadcast address
    pub const fn check_node_id<C: NodeConfig + ?Sized>() -> RingResult<()> {
        if C::NODE_ID & 0x0F != 0 {
            return invalid("NODE_ID must only use the high nibble");
        }
        if C::NODE_ID == 0 {
            return invalid("NODE_ID 0x00 is reserved for broadcast");
        }
        Ok(())
    }

    /// Checks the line speed against the CPU clock
    pub const fn check_serial<C: NodeConfig + ?Sized>() -> RingResult<()> {
        if C::BAUD == 0 {
            return invalid("BAUD must be non-zero");
        }
        if (C::CPU_HZ as u64) < 16 * C::BAUD as u64 {
            return invalid("CPU_HZ too low for the requested BAUD");
        }
        if C::CPU_HZ / (16 * C::BAUD) - 1 > u16::MAX as u32 {
            return invalid("BAUD divisor does not fit the 16-bit rate register");
        }
        if C::DEAD_TIME == 0 {
            return invalid("DEAD_TIME must be at least one milli-tick");
        }
        Ok(())
    }

    /// Alarm thresholds occupy registers 1..=ALARMS
    pub const fn check_alarms<C: NodeConfig + ?Sized>() -> RingResult<()> {
        if C::ALARMS > 4 {
            return invalid("ALARMS cannot exceed 4");
        }
        Ok(())
    }

    /// The sample interval must be a power-of-two mask
    pub const fn check_debounce<C: NodeConfig + ?Sized>() -> RingResult<()> {
        let interval = C::DEBOUNCE_INTERVAL;
        if interval & interval.wrapping_add(1) != 0 {
            return invalid("DEBOUNCE_INTERVAL must be 2^k - 1");
        }
        Ok(())
    }

    /// Mirror registers must not collide with the control or alarm registers,
    /// nor with each other
    pub const fn check_registers<C: NodeConfig + ?Sized>() -> RingResult<()> {
        if let Some(index) = C::TIME_REGISTER {
            if index >= REGISTER_COUNT {
                return invalid("TIME_REGISTER is outside the register file");
            }
            if index == 0 {
                return invalid("TIME_REGISTER cannot be the control register");
            }
            if index <= C::ALARMS {
                return invalid("TIME_REGISTER collides with an alarm threshold register");
            }
        }
        if let Some(index) = C::COUNTER_REGISTER {
            if index >= REGISTER_COUNT {
                return invalid("COUNTER_REGISTER is outside the register file");
            }
            if index == 0 {
                return invalid("COUNTER_REGISTER cannot be the control register");
            }
            if index <= C::ALARMS {
                return invalid("COUNTER_REGISTER collides with an alarm threshold register");
            }
            if let Some(time) = C::TIME_REGISTER {
                if time == index {
                    return invalid("COUNTER_REGISTER and TIME_REGISTER must differ");
                }
            }
        }
        Ok(())
    }
}
