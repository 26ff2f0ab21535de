//! Error handling module for the ring bus
//!
//! This module provides the error types shared by the clock, scheduler and
//! protocol engine. Frame-level faults never abort anything: they are turned
//! into error replies on the bus. The types here exist so that the local API
//! and the requester side can name them.

pub mod protocol;
pub mod transport;
pub mod types;

// Re-export main types
pub use protocol::{BUFFER_ERROR, CRC_ERROR, FrameFault, TRANSPORT_ERROR};
pub use transport::LineError;
pub use types::{RingError, RingResult};
