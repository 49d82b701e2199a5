//! Device layout configuration.
//!
//! Plain serde structs so a host can load them from whatever format it
//! already uses. The defaults describe a single serial port and the timer
//! unit at its usual address.

use serde::{Serialize, Deserialize};

use crate::peripherals::TIMER_BASE;

/// Cycles per character on the transmit timer.
pub const DEFAULT_CLOCK_TIME: i64 = 5000;
/// Base of the first serial port window.
pub const DEFAULT_SERIAL_BASE: u32 = 0xFF_FFB0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Start of the 8-byte register window (bus routing only)
    pub base: u32,
    /// Added to the RXI/TXI vector numbers
    pub irq_offset: u16,
    /// Transmit timer reload value in cycles
    pub clock_time: i64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            base: DEFAULT_SERIAL_BASE,
            irq_offset: 0,
            clock_time: DEFAULT_CLOCK_TIME,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub timer_base: u32,
    pub serial_ports: Vec<SerialConfig>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            timer_base: TIMER_BASE,
            serial_ports: vec![SerialConfig::default()],
        }
    }
}
