//! Serial line error flags
//!
//! The receive interrupt latches whatever the transport reports alongside each
//! byte. Flags are sticky: once set they stay set until the frame that saw
//! them has been processed.

/// Latched transport status flags
///
/// Bit positions follow the common UART status layout (framing error in bit 4,
/// data overrun in bit 3) so a HAL can pass its status byte straight through
/// with [`LineError::from_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineError(u8);

impl LineError {
    /// No error
    pub const NONE: Self = Self(0);
    /// Stop bit was not where it should be
    pub const FRAMING: Self = Self(1 << 4);
    /// A byte arrived before the previous one was read
    pub const OVERRUN: Self = Self(1 << 3);

    const MASK: u8 = Self::FRAMING.0 | Self::OVERRUN.0;

    /// Extracts the error flags from a raw UART status byte
    pub const fn from_status(status: u8) -> Self {
        Self(status & Self::MASK)
    }

    /// Returns the raw flag bits
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Returns true if no flag is set
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if a framing error was seen
    pub const fn framing(&self) -> bool {
        self.0 & Self::FRAMING.0 != 0
    }

    /// Returns true if a data overrun was seen
    pub const fn overrun(&self) -> bool {
        self.0 & Self::OVERRUN.0 != 0
    }

    /// Merges two sets of flags, keeping everything already latched
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_masks_unrelated_bits() {
        let status = 0xFF;
        let err = LineError::from_status(status);
        assert!(err.framing());
        assert!(err.overrun());
        assert_eq!(err.bits(), 0x18);

        assert!(LineError::from_status(0x20).is_empty());
    }

    #[test]
    fn test_union_is_sticky() {
        let latched = LineError::NONE.union(LineError::FRAMING);
        let latched = latched.union(LineError::NONE);
        assert!(latched.framing());
        assert!(!latched.overrun());

        let latched = latched.union(LineError::OVERRUN);
        assert!(latched.framing() && latched.overrun());
    }
}
