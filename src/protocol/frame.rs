//! Token frame and address byte
//!
//! A frame is exactly four bytes: `[data_low, data_high, address, crc]`.
//! The address byte packs the target node in bits 7-4, the write flag in bit 3
//! and the register index in bits 2-0.

use crate::error::{FrameFault, LineError, RingError, RingResult};
use crate::protocol::crc;
use crate::registers::Register;

/// Bytes in a frame
pub const FRAME_LEN: usize = 4;

const WRITE_FLAG: u8 = 0x08;

/// A node address, kept in the high nibble
///
/// `0x00` addresses every node at once; `0x10..=0xF0` are individual nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(u8);

impl NodeId {
    /// The broadcast address
    pub const BROADCAST: Self = Self(0x00);

    /// Creates a node ID, rejecting values with low-nibble bits set
    pub const fn new(raw: u8) -> RingResult<Self> {
        if raw & 0x0F != 0 {
            Err(RingError::InvalidNodeId)
        } else {
            Ok(Self(raw))
        }
    }

    /// Takes the node ID from the high nibble of an address byte
    pub const fn from_address_byte(byte: u8) -> Self {
        Self(byte & 0xF0)
    }

    /// Returns the ID as it appears in the address byte
    pub const fn raw(&self) -> u8 {
        self.0
    }

    /// Returns true for the broadcast address
    pub const fn is_broadcast(&self) -> bool {
        self.0 == 0
    }
}

/// Decoded address byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address {
    /// Node the frame is for
    pub target: NodeId,
    /// Store the payload into the register
    pub write: bool,
    /// Register on the target node
    pub register: Register,
}

impl Address {
    /// Builds a read address
    pub const fn read(target: NodeId, register: Register) -> Self {
        Self {
            target,
            write: false,
            register,
        }
    }

    /// Builds a write address
    pub const fn write(target: NodeId, register: Register) -> Self {
        Self {
            target,
            write: true,
            register,
        }
    }

    /// Decodes an address byte; every byte is a valid address
    pub const fn from_byte(byte: u8) -> Self {
        Self {
            target: NodeId::from_address_byte(byte),
            write: byte & WRITE_FLAG != 0,
            register: Register::from_bits(byte),
        }
    }

    /// Encodes the address byte
    pub const fn to_byte(&self) -> u8 {
        let write = if self.write { WRITE_FLAG } else { 0 };
        self.target.raw() | write | self.register.index() as u8
    }
}

impl From<u8> for Address {
    fn from(byte: u8) -> Self {
        Self::from_byte(byte)
    }
}

impl From<Address> for u8 {
    fn from(address: Address) -> Self {
        address.to_byte()
    }
}

/// One token as it travels the ring
///
/// # Example
/// ```rust
/// use ticring::protocol::{Frame, NodeId};
/// use ticring::registers::Register;
///
/// let node = NodeId::new(0x30)?;
/// let frame = Frame::read(node, Register::new(3)?);
/// assert_eq!(frame.address_byte(), 0x33);
/// assert!(frame.is_intact());
/// # Ok::<(), ticring::error::RingError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    bytes: [u8; FRAME_LEN],
}

impl Frame {
    /// Wraps four bytes as received, checksum untouched
    pub const fn from_bytes(bytes: [u8; FRAME_LEN]) -> Self {
        Self { bytes }
    }

    /// Builds a sealed frame from its payload and address
    pub const fn new(data: u16, address: Address) -> Self {
        let data = data.to_le_bytes();
        Self::from_bytes([data[0], data[1], address.to_byte(), 0]).sealed()
    }

    /// Sealed read request
    pub const fn read(target: NodeId, register: Register) -> Self {
        Self::new(0, Address::read(target, register))
    }

    /// Sealed write request
    pub const fn write(target: NodeId, register: Register, value: u16) -> Self {
        Self::new(value, Address::write(target, register))
    }

    /// Returns the raw bytes
    pub const fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }

    /// Returns the byte at `index`, `None` past the end of the frame
    pub const fn byte(&self, index: usize) -> Option<u8> {
        if index < FRAME_LEN {
            Some(self.bytes[index])
        } else {
            None
        }
    }

    /// Stores a byte at `index`; returns false past the end of the frame
    pub fn set_byte(&mut self, index: usize, byte: u8) -> bool {
        match self.bytes.get_mut(index) {
            Some(slot) => {
                *slot = byte;
                true
            }
            None => false,
        }
    }

    /// 16-bit payload, low byte first on the wire
    pub const fn data(&self) -> u16 {
        u16::from_le_bytes([self.bytes[0], self.bytes[1]])
    }

    /// Replaces the payload; the checksum is left stale until [`seal`](Self::seal)
    pub fn set_data(&mut self, data: u16) {
        let [low, high] = data.to_le_bytes();
        self.bytes[0] = low;
        self.bytes[1] = high;
    }

    /// Raw address byte
    pub const fn address_byte(&self) -> u8 {
        self.bytes[2]
    }

    /// Replaces the address byte; the checksum is left stale
    pub fn set_address_byte(&mut self, byte: u8) {
        self.bytes[2] = byte;
    }

    /// Decoded address
    pub const fn address(&self) -> Address {
        Address::from_byte(self.bytes[2])
    }

    /// Checksum byte as carried
    pub const fn crc(&self) -> u8 {
        self.bytes[3]
    }

    /// Checksum computed over the first three bytes
    pub const fn computed_crc(&self) -> u8 {
        crc::checksum(&[self.bytes[0], self.bytes[1], self.bytes[2]])
    }

    /// Returns true if the carried checksum matches the payload
    pub const fn is_intact(&self) -> bool {
        self.computed_crc() == self.bytes[3]
    }

    /// Checks the reply that came back for this request and returns its payload
    ///
    /// A reply mangled on the way back is a CRC mismatch. An error reply from
    /// a node upstream yields its fault; for transport faults the line flags
    /// it reported are returned instead.
    pub fn check_reply(&self, reply: &Frame) -> RingResult<u16> {
        if !reply.is_intact() {
            return Err(RingError::Frame(FrameFault::CrcMismatch));
        }
        match FrameFault::from_reply(self.address_byte(), reply.address_byte()) {
            None => Ok(reply.data()),
            Some(FrameFault::Transport) => Err(RingError::Line(LineError::from_status(reply.bytes[0]))),
            Some(fault) => Err(RingError::Frame(fault)),
        }
    }

    /// Recomputes the checksum byte
    pub fn seal(&mut self) {
        self.bytes[3] = self.computed_crc();
    }

    const fn sealed(mut self) -> Self {
        self.bytes[3] = self.computed_crc();
        self
    }
}

impl From<[u8; FRAME_LEN]> for Frame {
    fn from(bytes: [u8; FRAME_LEN]) -> Self {
        Self::from_bytes(bytes)
    }
}
