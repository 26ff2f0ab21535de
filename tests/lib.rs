//! Common utilities and shared code for ring and clock tests
//!
//! This module provides:
//! - Proptest configuration for different test scenarios
//! - Generators for node IDs, registers and frames
//! - A node configuration parameterized by node ID
//! - Helpers that drive a node through its interrupt entry points

#![allow(dead_code)]
#![allow(special_module_name)]
#![allow(unused)]

use proptest::prelude::*;
use ticring::prelude::*;

/// Standard proptest configuration for protocol property tests
pub fn ring_config() -> ProptestConfig {
    ProptestConfig {
        cases: 64,
        max_shrink_iters: 100,
        timeout: 2000,
        ..ProptestConfig::default()
    }
}

/// Clock tests run many interrupts per case, so fewer cases
pub fn clock_config() -> ProptestConfig {
    ProptestConfig {
        cases: 16,
        max_shrink_iters: 50,
        timeout: 5000,
        ..ProptestConfig::default()
    }
}

/// Coarse node with a node ID chosen by the test
#[derive(Debug, Clone, Copy)]
pub struct IdConfig<const ID: u8>;

impl<const ID: u8> NodeConfig for IdConfig<ID> {
    const NODE_ID: u8 = ID;
    const BAUD: u32 = 9600;
    const CPU_HZ: u32 = 16_000_000;
    const ALARMS: usize = 4;
    const DEAD_TIME: u8 = 5;
    const CLOCK_MODE: ClockMode = ClockMode::Coarse;
    const DEBOUNCE: [Option<EdgePolicy>; 4] = [None; 4];
    const DEBOUNCE_INTERVAL: u16 = 0x3F;
    const TIME_REGISTER: Option<usize> = Some(7);
    const COUNTER_REGISTER: Option<usize> = Some(5);
}

/// Individual node IDs, `0x10..=0xF0`
pub fn node_id_strategy() -> impl Strategy<Value = NodeId> {
    (1u8..16).prop_map(|n| NodeId::from_address_byte(n << 4))
}

/// Any register index
pub fn register_strategy() -> impl Strategy<Value = Register> {
    (0u8..8).prop_map(Register::from_bits)
}

/// Registers an application may use freely (not control, not time)
pub fn data_register_strategy() -> impl Strategy<Value = Register> {
    (1u8..7).prop_map(Register::from_bits)
}

/// Any well-formed request frame
pub fn frame_strategy() -> impl Strategy<Value = Frame> {
    (any::<u16>(), any::<u8>()).prop_map(|(data, address)| Frame::new(data, Address::from_byte(address)))
}

/// Lets the line go idle so the next byte starts a new frame
pub fn idle<C: NodeConfig, P: LinePort>(node: &Node<'_, C, P>) {
    for _ in 0..C::DEAD_TIME {
        node.on_timer_interrupt();
    }
}

/// Runs `count` timer interrupts
pub fn run_interrupts<C: NodeConfig, P: LinePort>(node: &Node<'_, C, P>, count: u32) {
    for _ in 0..count {
        node.on_timer_interrupt();
    }
}

/// Feeds raw bytes into the receive interrupt
pub fn feed<C: NodeConfig, P: LinePort>(node: &Node<'_, C, P>, bytes: &[u8]) {
    for byte in bytes {
        node.on_receive(*byte, LineError::NONE);
    }
}

/// Drains the transmit interrupt
pub fn drain<C: NodeConfig, P: LinePort>(node: &Node<'_, C, P>) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(byte) = node.on_transmit_ready() {
        out.push(byte);
    }
    out
}

/// Passes one frame through a node: receive, service, transmit
pub fn pass<C: NodeConfig, P: LinePort>(node: &Node<'_, C, P>, frame: &Frame) -> (Option<Disposition>, Frame) {
    idle(node);
    feed(node, frame.as_bytes());
    let disposition = node.service();
    let bytes = drain(node);
    let mut reply = [0u8; 4];
    reply.copy_from_slice(&bytes[..4]);
    (disposition, Frame::from_bytes(reply))
}

/// Sets the timer interrupt phase so the next `advance` crosses a Tic boundary
pub fn to_tic_boundary<C: NodeConfig, P: LinePort>(node: &Node<'_, C, P>) {
    while node.milli_now() & 0x03FF != 0x03FF {
        node.on_timer_interrupt();
    }
}
