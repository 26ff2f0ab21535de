//! Configuration presets module
//!
//! This module provides pre-defined node configurations for common node roles.
//! Each preset claims a node ID, so a real ring needs its own set; these are
//! starting points and test fixtures.

use crate::config::{ClockMode, EdgePolicy};
use crate::config::define_node_config;

// General purpose nodes
define_node_config! {
    name: GenericNodeConfig,
    node_id: 0x10,
    baud: 9600,
}

define_node_config! {
    name: FastLineNodeConfig,
    node_id: 0x20,
    baud: 57_600,
    dead_time: 2,
}

// Metering nodes count pulses on debounced input lines
define_node_config! {
    name: MeterNodeConfig,
    node_id: 0x30,
    baud: 9600,
    alarms: 2,
    debounce: [
        Some(EdgePolicy::Falling),
        Some(EdgePolicy::Falling),
        Some(EdgePolicy::Either),
        None,
    ],
    debounce_interval: 0x3F,
}

// Fine clock nodes trade daily accuracy for 5 µs resolution
define_node_config! {
    name: FineClockNodeConfig,
    node_id: 0x40,
    baud: 9600,
    clock_mode: ClockMode::Fine,
}

// Testing configurations
define_node_config! {
    name: TestingMinimalConfig,
    node_id: 0x10,
    baud: 9600,
    alarms: 0,
    dead_time: 1,
    time_register: None,
}

define_node_config! {
    name: TestingMaximalConfig,
    node_id: 0xF0,
    baud: 115_200,
    alarms: 4,
    dead_time: 2,
    debounce: [
        Some(EdgePolicy::Rising),
        Some(EdgePolicy::Falling),
        Some(EdgePolicy::Either),
        Some(EdgePolicy::Either),
    ],
    debounce_interval: 0x00,
}
