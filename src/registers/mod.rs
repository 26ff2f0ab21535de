//! Register file module
//!
//! Each node exposes eight 16-bit registers that any node on the ring can read
//! or write. Register 0 carries control flags and a command/status byte;
//! registers 1..=4 hold alarm thresholds; register 7 mirrors the daily Tic by
//! default.

pub mod access;
pub mod control;
pub mod file;

// Re-export main types
pub use access::RegisterAccess;
pub use control::ControlRegister;
pub use file::{REGISTER_COUNT, REGISTER_FILE_BYTES, Register, RegisterFile};
