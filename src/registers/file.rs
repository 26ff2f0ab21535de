//! Register file storage
//!
//! Sixteen bytes, eight little-endian 16-bit registers. The bytes are the only
//! storage; unsigned, signed and byte-pair views are conversions, never aliases.

use crate::error::{RingError, RingResult};
use crate::registers::ControlRegister;

/// Number of registers in a node's register file
pub const REGISTER_COUNT: usize = 8;

/// Size of the register file in bytes
pub const REGISTER_FILE_BYTES: usize = REGISTER_COUNT * 2;

/// Index of a register, always in `0..REGISTER_COUNT`
///
/// Built either from a checked index or by masking the low three bits of an
/// address byte, so an out-of-range index cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Register(u8);

impl Register {
    /// The control/status register
    pub const CONTROL: Self = Self(0);

    /// Creates a register index, rejecting anything past the file
    pub const fn new(index: usize) -> RingResult<Self> {
        if index < REGISTER_COUNT {
            Ok(Self(index as u8))
        } else {
            Err(RingError::InvalidRegister)
        }
    }

    /// Takes the register index from the low three bits of a byte
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x07)
    }

    /// Returns the index as a usize
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Returns true for register 0
    pub const fn is_control(&self) -> bool {
        self.0 == 0
    }
}

/// A node's shared register file
///
/// # Example
/// ```rust
/// use ticring::registers::{Register, RegisterFile};
///
/// let mut file = RegisterFile::new();
/// let reg = Register::new(3)?;
/// file.set(reg, 0x1234);
/// assert_eq!(file.bytes(reg), [0x34, 0x12]);
///
/// file.set_signed(reg, -2);
/// assert_eq!(file.get(reg), 0xFFFE);
/// # Ok::<(), ticring::error::RingError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegisterFile {
    bytes: [u8; REGISTER_FILE_BYTES],
}

impl RegisterFile {
    /// Creates a zeroed register file
    pub const fn new() -> Self {
        Self {
            bytes: [0; REGISTER_FILE_BYTES],
        }
    }

    /// Creates a register file from its raw bytes
    pub const fn from_bytes(bytes: [u8; REGISTER_FILE_BYTES]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes
    pub const fn as_bytes(&self) -> &[u8; REGISTER_FILE_BYTES] {
        &self.bytes
    }

    /// Reads a register as an unsigned value
    pub const fn get(&self, register: Register) -> u16 {
        u16::from_le_bytes(self.bytes(register))
    }

    /// Reads a register as a signed value
    pub const fn get_signed(&self, register: Register) -> i16 {
        i16::from_le_bytes(self.bytes(register))
    }

    /// Reads a register as `[low, high]`
    pub const fn bytes(&self, register: Register) -> [u8; 2] {
        let offset = register.index() * 2;
        [self.bytes[offset], self.bytes[offset + 1]]
    }

    /// Writes an unsigned value
    pub fn set(&mut self, register: Register, value: u16) {
        self.set_bytes(register, value.to_le_bytes());
    }

    /// Writes a signed value
    pub fn set_signed(&mut self, register: Register, value: i16) {
        self.set_bytes(register, value.to_le_bytes());
    }

    /// Writes `[low, high]`
    pub fn set_bytes(&mut self, register: Register, bytes: [u8; 2]) {
        let offset = register.index() * 2;
        self.bytes[offset] = bytes[0];
        self.bytes[offset + 1] = bytes[1];
    }

    /// Replaces a register and returns what it held before
    pub fn replace(&mut self, register: Register, value: u16) -> u16 {
        let previous = self.get(register);
        self.set(register, value);
        previous
    }

    /// Decodes register 0
    pub const fn control(&self) -> ControlRegister {
        ControlRegister::from_bits(self.get(Register::CONTROL))
    }

    /// Encodes register 0
    pub fn set_control(&mut self, control: ControlRegister) {
        self.set(Register::CONTROL, control.to_bits());
    }

    /// Applies a change to register 0's flags
    pub fn update_control<F>(&mut self, f: F)
    where
        F: FnOnce(&mut ControlRegister),
    {
        let mut control = self.control();
        f(&mut control);
        self.set_control(control);
    }
}
