#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]

//! **Token-ring register bus and daily Tic clock for small embedded nodes**
//!
//! ticring is a `no_std` library for nodes that share one serial line wired as
//! a ring. Fixed four-byte tokens travel from node to node; each token reads or
//! writes one 16-bit register on one node (or on every node at once) and comes
//! back to the requester carrying the answer. The same timer interrupt that
//! keeps the daily clock also runs the line's idle detection, the debounced
//! pulse counters and the once-a-day alarms.
//!
//! ## Features
//!
//! - **Interrupt driven** - byte-level receive/transmit and timer entry points,
//!   all bounded and non-blocking
//! - **Checked frames** - CRC-8 over every token, error replies on the bus
//!   instead of silent drops
//! - **Daily clock** - 65536 Tics per day, 1024 milli-ticks per Tic, optional
//!   5 µs fine ticks
//! - **Alarms** - up to four once-a-day actions programmable over the bus
//! - **No dynamic allocation** - everything is sized at compile time
//!
//! ### Optional features
//! - `defmt` - log through `defmt`
//! - `log` - log through the `log` facade
//! - `serde` - Serde serialization of the plain data types (no_std compatible)
//!
//! Interrupt masking goes through [`critical_section`]; the application picks
//! the implementation for its target.
//!
//! ## Quick Start
//!
//! ```rust
//! use ticring::prelude::*;
//!
//! define_node_config! {
//!     name: MeterNode,
//!     node_id: 0x30,
//!     baud: 9600,
//! }
//!
//! fn example() -> Result<(), RingError> {
//!     let node = Node::<MeterNode>::new(NoLines);
//!     node.start();
//!     node.registers().write(Register::new(3)?, 0x1234);
//!
//!     // Node 0x20 asks node 0x30 for register 3
//!     let request = Frame::read(NodeId::new(0x30)?, Register::new(3)?);
//!     for byte in request.as_bytes() {
//!         node.on_receive(*byte, LineError::NONE);
//!     }
//!     node.service();
//!
//!     let mut reply = [0u8; 4];
//!     for slot in reply.iter_mut() {
//!         *slot = node.on_transmit_ready().unwrap_or_default();
//!     }
//!     assert_eq!(reply[..3], [0x34, 0x12, 0x33]);
//!     assert!(Frame::from_bytes(reply).is_intact());
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! ## Building blocks
//!
//! - [`Node`] - one node: the interrupt entry points and the application API
//! - [`ClockEngine`] - the daily clock
//! - [`Scheduler`] - the daily alarms
//! - [`RingEngine`] - the token protocol
//! - [`RegisterFile`] - the eight shared registers
//!
//! [`Node`]: crate::node::Node
//! [`ClockEngine`]: crate::clock::ClockEngine
//! [`Scheduler`]: crate::scheduler::Scheduler
//! [`RingEngine`]: crate::protocol::RingEngine
//! [`RegisterFile`]: crate::registers::RegisterFile

#![no_std]
#![deny(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::match_like_matches_macro)]
#![allow(clippy::unnecessary_cast)]
#![allow(clippy::collapsible_if)]
#![cfg_attr(test, allow(unused_mut))]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

// Core infrastructure modules
pub mod config;
pub mod error;
pub mod platform;
pub mod traits;

// Node subsystems
pub mod clock;
pub mod protocol;
pub mod registers;
pub mod scheduler;

pub mod node;

// Configuration presets
pub mod configs;

/// Prelude module of ticring
///
/// Convenient re-exports for common ticring types and traits
pub mod prelude {

    // Re-export collaborator traits
    pub use crate::traits::*;

    // Re-export node configuration
    pub use crate::config::{ClockMode, EdgePolicy, NodeConfig, define_node_config};

    // Re-export error types
    pub use crate::error::{FrameFault, LineError, RingError, RingResult};

    // Re-export configuration presets
    pub use crate::configs::*;

    // Re-export node building blocks
    pub use crate::clock::{ClockEngine, Debouncer};
    pub use crate::node::Node;
    pub use crate::protocol::{Address, Disposition, Frame, FrameState, NodeId, RingEngine};
    pub use crate::registers::{ControlRegister, Register, RegisterAccess, RegisterFile};
    pub use crate::scheduler::Scheduler;
}
