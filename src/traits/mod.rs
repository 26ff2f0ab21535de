//! Collaborator traits module
//!
//! The seams where application and board code meet the node: alarm and node
//! actions, and the port the debounced lines are read from.

pub mod hooks;
pub mod port;

// Re-export main traits
pub use hooks::{AlarmAction, NodeAction};
pub use port::{LinePort, NoLines};
