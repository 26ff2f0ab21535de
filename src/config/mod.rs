//! Node configuration module
//!
//! Everything about a node is decided at compile time: its bus address, line
//! speed, how many alarms it runs, how its auxiliary counter lines are
//! debounced and which timer resolution drives the clock.

pub mod macros;
pub mod node;
pub mod validation;

// Re-export main types
pub use macros::define_node_config;
pub use node::{ClockMode, DefaultNodeConfig, EdgePolicy, NodeConfig};
pub use validation::ConfigValidator;
