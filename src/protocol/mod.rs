//! Ring protocol module
//!
//! Fixed four-byte tokens carry one 16-bit register read or write around the
//! ring. Every node checks the checksum, serves frames addressed to it (or to
//! everyone) from its register file and passes the token on; frames it cannot
//! trust are turned into error replies carrying its own ID.

pub mod crc;
pub mod engine;
pub mod frame;

// Re-export main types
pub use crc::{CRC_SEED, checksum, crc8};
pub use engine::{Disposition, FrameState, RingEngine};
pub use frame::{Address, FRAME_LEN, Frame, NodeId};
