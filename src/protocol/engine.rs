//! Ring protocol engine
//!
//! One frame buffer serves both the incoming token and the reply shifted out
//! to the next node: the ring carries a single token at a time, so at most one
//! frame is ever in flight on a node. The receive and transmit halves run in
//! interrupt context and only move bytes; [`RingEngine::process`] runs in the
//! cooperative mainline slot and does the checksum and register work.

use core::cell::RefCell;
use core::marker::PhantomData;

use critical_section::{CriticalSection, Mutex};

use crate::config::NodeConfig;
use crate::error::{FrameFault, LineError};
use crate::protocol::frame::{Address, FRAME_LEN, Frame};
use crate::registers::RegisterAccess;

/// Where the frame buffer is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameState {
    /// Nothing buffered
    Idle,
    /// Bytes of a frame are arriving
    Receiving,
    /// A full frame (or more) is waiting for [`RingEngine::process`]
    Ready,
    /// Mainline is working on the frame; reception is off
    Processing,
    /// The reply is being shifted out
    Transmitting,
}

/// Outcome of processing one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Disposition {
    /// Addressed to this node; the reply carries `previous`
    Served {
        /// Decoded address byte
        address: Address,
        /// Register value before any write
        previous: u16,
        /// Payload the frame arrived with
        payload: u16,
    },
    /// Broadcast; applied locally and passed on unchanged
    Broadcast {
        /// Decoded address byte
        address: Address,
        /// Register value before any write
        previous: u16,
        /// Payload the frame arrived with
        payload: u16,
    },
    /// For another node; passed on unchanged
    Relayed {
        /// Decoded address byte
        address: Address,
    },
    /// Rejected and turned into an error reply from this node
    Fault(FrameFault),
}

impl Disposition {
    /// Address of a frame this node acted on, own or broadcast
    pub const fn local_address(&self) -> Option<Address> {
        match self {
            Self::Served { address, .. } | Self::Broadcast { address, .. } => Some(*address),
            Self::Relayed { .. } | Self::Fault(_) => None,
        }
    }

    /// Value written by a frame this node acted on
    pub const fn written(&self) -> Option<(Address, u16)> {
        match self {
            Self::Served {
                address, payload, ..
            }
            | Self::Broadcast {
                address, payload, ..
            } if address.write => Some((*address, *payload)),
            _ => None,
        }
    }

    /// Returns true if the frame was rejected
    pub const fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }
}

#[derive(Debug, Clone, Copy)]
struct FrameBuffer {
    frame: Frame,
    rx_index: u8,
    tx_index: u8,
    line_error: LineError,
    dead_time: u8,
    processing: bool,
    tx_enabled: bool,
}

impl FrameBuffer {
    const fn new() -> Self {
        Self {
            frame: Frame::from_bytes([0; FRAME_LEN]),
            rx_index: 0,
            tx_index: 0,
            line_error: LineError::NONE,
            dead_time: 0,
            processing: false,
            tx_enabled: false,
        }
    }

    const fn state(&self) -> FrameState {
        if self.processing {
            FrameState::Processing
        } else if self.rx_index as usize >= FRAME_LEN {
            FrameState::Ready
        } else if self.tx_enabled {
            FrameState::Transmitting
        } else if self.rx_index > 0 && self.dead_time > 0 {
            FrameState::Receiving
        } else {
            FrameState::Idle
        }
    }
}

struct Received {
    frame: Frame,
    rx_index: u8,
    tx_index: u8,
    line_error: LineError,
}

/// Per-node protocol state machine
///
/// # Example
/// ```rust
/// use core::cell::Cell;
/// use critical_section::Mutex;
/// use ticring::configs::GenericNodeConfig;
/// use ticring::error::LineError;
/// use ticring::protocol::{Disposition, Frame, NodeId, RingEngine};
/// use ticring::registers::{Register, RegisterAccess, RegisterFile};
///
/// let file = Mutex::new(Cell::new(RegisterFile::new()));
/// let registers = RegisterAccess::new(&file);
/// let ring = RingEngine::<GenericNodeConfig>::new();
///
/// let request = Frame::write(NodeId::new(0x10)?, Register::new(2)?, 500);
/// for byte in request.as_bytes() {
///     ring.receive(*byte, LineError::NONE);
/// }
/// assert!(matches!(ring.process(&registers), Some(Disposition::Served { previous: 0, .. })));
/// assert_eq!(registers.read(Register::new(2)?), 500);
/// # Ok::<(), ticring::error::RingError>(())
/// ```
pub struct RingEngine<C: NodeConfig> {
    buffer: Mutex<RefCell<FrameBuffer>>,
    _config: PhantomData<fn() -> C>,
}

impl<C: NodeConfig> Default for RingEngine<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: NodeConfig> RingEngine<C> {
    /// Creates an idle engine
    pub const fn new() -> Self {
        Self {
            buffer: Mutex::new(RefCell::new(FrameBuffer::new())),
            _config: PhantomData,
        }
    }

    /// Receive interrupt body: stores one byte and the line status seen with it
    pub fn receive(&self, byte: u8, line: LineError) -> FrameState {
        critical_section::with(|cs| self.receive_in(cs, byte, line))
    }

    /// [`receive`](Self::receive) for callers already inside a critical section
    pub fn receive_in(&self, cs: CriticalSection<'_>, byte: u8, line: LineError) -> FrameState {
        let mut buf = self.buffer.borrow_ref_mut(cs);

        if buf.processing {
            // Nowhere to put it; make sure the next frame is reported.
            buf.line_error = buf.line_error.union(line).union(LineError::OVERRUN);
            buf.dead_time = C::DEAD_TIME;
            return FrameState::Processing;
        }

        if buf.dead_time == 0 {
            buf.rx_index = 0;
            buf.line_error = LineError::NONE;
        }
        buf.dead_time = C::DEAD_TIME;
        buf.line_error = buf.line_error.union(line);

        let index = buf.rx_index as usize;
        buf.frame.set_byte(index, byte);
        buf.rx_index = buf.rx_index.saturating_add(1);

        buf.state()
    }

    /// Transmit interrupt body: next reply byte, `None` once the frame is out
    pub fn transmit(&self) -> Option<u8> {
        critical_section::with(|cs| {
            let mut buf = self.buffer.borrow_ref_mut(cs);
            if !buf.tx_enabled {
                return None;
            }
            match buf.frame.byte(buf.tx_index as usize) {
                Some(byte) => {
                    buf.tx_index += 1;
                    if buf.tx_index as usize == FRAME_LEN {
                        buf.tx_enabled = false;
                    }
                    Some(byte)
                }
                None => {
                    buf.tx_enabled = false;
                    None
                }
            }
        })
    }

    /// Counts one milli-tick of line silence
    pub fn tick_dead_time(&self, cs: CriticalSection<'_>) {
        let mut buf = self.buffer.borrow_ref_mut(cs);
        buf.dead_time = buf.dead_time.saturating_sub(1);
    }

    /// Processes a ready frame against the register file and prepares the reply
    ///
    /// Returns `None` when no complete frame is waiting. Reception is off from
    /// the moment the frame is taken until the reply is in place.
    pub fn process(&self, registers: &RegisterAccess<'_>) -> Option<Disposition> {
        let received = critical_section::with(|cs| {
            let mut buf = self.buffer.borrow_ref_mut(cs);
            if buf.processing || (buf.rx_index as usize) < FRAME_LEN {
                return None;
            }
            buf.processing = true;
            let received = Received {
                frame: buf.frame,
                rx_index: buf.rx_index,
                tx_index: buf.tx_index,
                line_error: buf.line_error,
            };
            buf.line_error = LineError::NONE;
            Some(received)
        })?;

        let mut reply = received.frame;
        let disposition = if received.rx_index as usize != FRAME_LEN {
            Self::fault_reply(
                &mut reply,
                FrameFault::BufferOverrun,
                received.rx_index,
                received.tx_index,
            )
        } else if !received.line_error.is_empty() {
            Self::fault_reply(
                &mut reply,
                FrameFault::Transport,
                received.line_error.bits(),
                received.rx_index,
            )
        } else if !reply.is_intact() {
            let computed = reply.computed_crc();
            let carried = reply.crc();
            Self::fault_reply(&mut reply, FrameFault::CrcMismatch, computed, carried)
        } else {
            Self::apply(&mut reply, registers)
        };

        reply.seal();

        critical_section::with(|cs| {
            let mut buf = self.buffer.borrow_ref_mut(cs);
            buf.frame = reply;
            buf.tx_index = 0;
            buf.tx_enabled = true;
            buf.rx_index = 0;
            buf.processing = false;
        });

        Some(disposition)
    }

    fn apply(reply: &mut Frame, registers: &RegisterAccess<'_>) -> Disposition {
        let address = reply.address();
        let own = C::node_id();
        let is_own = address.target == own;

        if !is_own && !address.target.is_broadcast() {
            trace!("relaying frame for {}", address.target.raw());
            return Disposition::Relayed { address };
        }

        let payload = reply.data();
        let previous = registers.modify(|file| {
            let previous = if address.write {
                file.replace(address.register, payload)
            } else {
                file.get(address.register)
            };
            if is_own && address.register.is_control() {
                // The reply carries the status the requester has now seen.
                file.update_control(|control| control.new_status = false);
            }
            previous
        });

        if is_own {
            reply.set_data(previous);
            debug!(
                "served register {} write={} previous={}",
                address.register.index(),
                address.write,
                previous
            );
            Disposition::Served {
                address,
                previous,
                payload,
            }
        } else {
            debug!(
                "broadcast register {} write={}",
                address.register.index(),
                address.write
            );
            Disposition::Broadcast {
                address,
                previous,
                payload,
            }
        }
    }

    fn fault_reply(reply: &mut Frame, fault: FrameFault, low: u8, high: u8) -> Disposition {
        let original = reply.address_byte();
        reply.set_data(u16::from_le_bytes([low, high]));
        reply.set_address_byte(C::node_id().raw() | fault.mask_nibble(original));
        warn!("frame fault {:?} on address {}", fault, original);
        Disposition::Fault(fault)
    }

    /// Current buffer state
    pub fn state(&self) -> FrameState {
        critical_section::with(|cs| self.buffer.borrow_ref(cs).state())
    }

    /// Returns true if a frame is waiting to be processed
    pub fn is_ready(&self) -> bool {
        self.state() == FrameState::Ready
    }

    /// Returns true while reply bytes remain to be sent
    pub fn tx_pending(&self) -> bool {
        critical_section::with(|cs| self.buffer.borrow_ref(cs).tx_enabled)
    }

    /// Returns false while a frame is being processed
    pub fn rx_enabled(&self) -> bool {
        critical_section::with(|cs| !self.buffer.borrow_ref(cs).processing)
    }

    /// Copy of the frame buffer, the reply once processing is done
    pub fn frame(&self) -> Frame {
        critical_section::with(|cs| self.buffer.borrow_ref(cs).frame)
    }

    /// Line errors latched for the frame being received
    pub fn line_error(&self) -> LineError {
        critical_section::with(|cs| self.buffer.borrow_ref(cs).line_error)
    }

    /// Drops any in-flight frame
    pub fn reset(&self) {
        critical_section::with(|cs| *self.buffer.borrow_ref_mut(cs) = FrameBuffer::new());
    }
}
