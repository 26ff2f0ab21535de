//! Frame checksum
//!
//! Table-free CRC-8: each input byte is XORed into the running value and the
//! result is reduced with one constant per set bit. Seeded with a non-zero
//! value so an all-zero frame does not check out.

/// Starting value of every frame checksum
pub const CRC_SEED: u8 = 0x88;

const REDUCTION: [u8; 8] = [0x5E, 0xBC, 0x61, 0xC2, 0x9D, 0x23, 0x46, 0x8C];

/// Folds one byte into a running checksum
pub const fn crc8(crc: u8, byte: u8) -> u8 {
    let index = crc ^ byte;
    let mut out = 0;
    let mut bit = 0;
    while bit < 8 {
        if index & (1 << bit) != 0 {
            out ^= REDUCTION[bit];
        }
        bit += 1;
    }
    out
}

/// Checksum over the three payload bytes of a frame
pub const fn checksum(bytes: &[u8; 3]) -> u8 {
    crc8(crc8(crc8(CRC_SEED, bytes[0]), bytes[1]), bytes[2])
}
