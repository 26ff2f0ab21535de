//! Node configuration macros
//!
//! This module provides the `define_node_config!` macro for easy creation
//! of node configurations.

/// Macro to define a node configuration
///
/// This macro creates a new struct that implements the `NodeConfig` trait
/// with user-specified values. Everything except the node ID and line speed
/// has a default.
///
/// # Example
///
/// ```rust
/// use ticring::config::{define_node_config, ClockMode, EdgePolicy, NodeConfig};
///
/// define_node_config! {
///     name: WaterMeterNode,
///     node_id: 0x40,
///     baud: 19_200,
///     alarms: 2,
///     debounce: [Some(EdgePolicy::Falling), None, None, None],
/// }
///
/// assert!(WaterMeterNode::validate().is_ok());
/// assert_eq!(WaterMeterNode::CLOCK_MODE, ClockMode::Coarse);
/// ```
#[macro_export]
macro_rules! define_node_config {
    (
        name: $name:ident,
        node_id: $node_id:expr,
        baud: $baud:expr
        $(, cpu_hz: $cpu_hz:expr)?
        $(, alarms: $alarms:expr)?
        $(, dead_time: $dead_time:expr)?
        $(, clock_mode: $clock_mode:expr)?
        $(, debounce: $debounce:expr)?
        $(, debounce_interval: $interval:expr)?
        $(, time_register: $time_register:expr)?
        $(, counter_register: $counter_register:expr)?
        $(,)?
    ) => {
        /// Node configuration
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl $crate::config::NodeConfig for $name {
            const NODE_ID: u8 = $node_id;
            const BAUD: u32 = $baud;

            // Optional parameters with defaults
            const CPU_HZ: u32 = $crate::define_node_config!(@default $($cpu_hz)?, $crate::platform::constants::DEFAULT_CPU_HZ);
            const ALARMS: usize = $crate::define_node_config!(@default $($alarms)?, 4);
            const DEAD_TIME: u8 = $crate::define_node_config!(@default $($dead_time)?, 5);
            const CLOCK_MODE: $crate::config::ClockMode =
                $crate::define_node_config!(@default $($clock_mode)?, $crate::config::ClockMode::Coarse);
            const DEBOUNCE: [Option<$crate::config::EdgePolicy>; 4] =
                $crate::define_node_config!(@default $($debounce)?, [None; 4]);
            const DEBOUNCE_INTERVAL: u16 = $crate::define_node_config!(@default $($interval)?, 0x3F);
            const TIME_REGISTER: Option<usize> = $crate::define_node_config!(@default $($time_register)?, Some(7));
            const COUNTER_REGISTER: Option<usize> =
                $crate::define_node_config!(@default $($counter_register)?, Some(5));
        }

        // Note: Call $name::validate() at runtime to check configuration
    };

    // Helper macro for default values
    (@default $value:expr, $default:expr) => { $value };
    (@default , $default:expr) => { $default };
}

// Re-export the macro for convenience
pub use define_node_config;
