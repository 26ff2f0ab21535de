//! Control/status register
//!
//! Register 0 is eight flag bits in its low byte and a command/status byte in
//! its high byte:
//!
//! | bit | flag |
//! |-----|------|
//! | 0-3 | alarm 1-4 enabled |
//! | 4 | new command (ringmaster to node) |
//! | 5 | new status (node to ringmaster), cleared when the node is read |
//! | 6 | attention |
//! | 7 | node enabled |
//! | 8-15 | command/status byte |

const NEW_COMMAND: u16 = 1 << 4;
const NEW_STATUS: u16 = 1 << 5;
const ATTENTION: u16 = 1 << 6;
const NODE_ENABLED: u16 = 1 << 7;

/// Decoded view of register 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlRegister {
    /// Alarm enable flags, alarm 1 first
    pub alarms_enabled: [bool; 4],
    /// Ringmaster placed a new command in `command_status`
    pub new_command: bool,
    /// Node placed a new status in `command_status`
    pub new_status: bool,
    /// Node wants the ringmaster's attention
    pub attention: bool,
    /// Node is enabled
    pub node_enabled: bool,
    /// Command or status byte
    pub command_status: u8,
}

impl ControlRegister {
    /// Decodes the 16-bit wire value
    pub const fn from_bits(bits: u16) -> Self {
        Self {
            alarms_enabled: [
                bits & 0x01 != 0,
                bits & 0x02 != 0,
                bits & 0x04 != 0,
                bits & 0x08 != 0,
            ],
            new_command: bits & NEW_COMMAND != 0,
            new_status: bits & NEW_STATUS != 0,
            attention: bits & ATTENTION != 0,
            node_enabled: bits & NODE_ENABLED != 0,
            command_status: (bits >> 8) as u8,
        }
    }

    /// Encodes to the 16-bit wire value
    pub const fn to_bits(&self) -> u16 {
        let mut bits = self.alarm_mask() as u16;
        if self.new_command {
            bits |= NEW_COMMAND;
        }
        if self.new_status {
            bits |= NEW_STATUS;
        }
        if self.attention {
            bits |= ATTENTION;
        }
        if self.node_enabled {
            bits |= NODE_ENABLED;
        }
        bits | (self.command_status as u16) << 8
    }

    /// Alarm enable flags as a bit mask, alarm 1 in bit 0
    pub const fn alarm_mask(&self) -> u8 {
        let mut mask = 0;
        let mut i = 0;
        while i < 4 {
            if self.alarms_enabled[i] {
                mask |= 1 << i;
            }
            i += 1;
        }
        mask
    }

    /// Returns the enable flag of alarm `ordinal` (1..=4)
    pub const fn alarm_enabled(&self, ordinal: u8) -> bool {
        match ordinal {
            1..=4 => self.alarms_enabled[ordinal as usize - 1],
            _ => false,
        }
    }

    /// Sets the enable flag of alarm `ordinal` (1..=4); other ordinals are ignored
    pub fn set_alarm_enabled(&mut self, ordinal: u8, enabled: bool) {
        if let 1..=4 = ordinal {
            self.alarms_enabled[ordinal as usize - 1] = enabled;
        }
    }

    /// Posts a status byte for the ringmaster
    pub fn post_status(&mut self, status: u8) {
        self.command_status = status;
        self.new_status = true;
    }

    /// Takes a pending command, clearing the new-command flag
    pub fn take_command(&mut self) -> Option<u8> {
        if self.new_command {
            self.new_command = false;
            Some(self.command_status)
        } else {
            None
        }
    }
}

impl From<u16> for ControlRegister {
    fn from(bits: u16) -> Self {
        Self::from_bits(bits)
    }
}

impl From<ControlRegister> for u16 {
    fn from(control: ControlRegister) -> Self {
        control.to_bits()
    }
}
