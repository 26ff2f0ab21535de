//! Frame fault taxonomy
//!
//! A node that cannot act on a frame answers with an error reply: the high
//! nibble of the address byte becomes the reporting node's ID and the low
//! nibble is XORed with one of the codes below.

/// Wire code for a frame whose byte count did not match the frame length
pub const BUFFER_ERROR: u8 = 0x0B;

/// Wire code for a frame whose checksum did not match
pub const CRC_ERROR: u8 = 0x0C;

/// Wire code for a frame received while the line reported errors
pub const TRANSPORT_ERROR: u8 = 0x0D;

/// Reasons a frame was answered with an error reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrameFault {
    /// Rx position was not exactly one frame when processing started
    BufferOverrun,
    /// Checksum over the first three bytes did not match the fourth
    CrcMismatch,
    /// The serial line latched a framing or overrun error during the frame
    Transport,
}

impl FrameFault {
    /// Returns the code XORed into the address nibble
    pub const fn code(&self) -> u8 {
        match self {
            Self::BufferOverrun => BUFFER_ERROR,
            Self::CrcMismatch => CRC_ERROR,
            Self::Transport => TRANSPORT_ERROR,
        }
    }

    /// Maps a wire code back to a fault
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            BUFFER_ERROR => Some(Self::BufferOverrun),
            CRC_ERROR => Some(Self::CrcMismatch),
            TRANSPORT_ERROR => Some(Self::Transport),
            _ => None,
        }
    }

    /// Encodes the low nibble of an error reply's address byte
    pub const fn mask_nibble(&self, original_address: u8) -> u8 {
        (self.code() ^ (original_address & 0x0F)) & 0x0F
    }

    /// Decodes the fault carried by a reply, given the address byte that was sent
    ///
    /// Returns `None` when the low nibbles agree, meaning the reply is a
    /// regular answer. A requester only needs the address byte it sent.
    pub const fn from_reply(sent_address: u8, reply_address: u8) -> Option<Self> {
        Self::from_code((sent_address ^ reply_address) & 0x0F)
    }
}
