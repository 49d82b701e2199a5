//! H8S peripheral emulation.
//!
//! - [`Timers`] — 5-channel 16-bit timer unit (compare match A/B, overflow)
//! - [`Serial`] — asynchronous serial channel (transmit timer, receive queue)
//! - [`CatchAll`] — fallback for addresses no real device claims

mod timers;
mod serial;
mod catch_all;

pub use timers::{Timers, TimersState, ChannelState, TIMER_BASE, TIMER_WINDOW, CHANNELS};
pub use serial::{Serial, SerialState, SERIAL_WINDOW, TX_NO_DATA};
pub use catch_all::CatchAll;

// H8S interrupt vector numbers.
// Timer channel i raises base + 4*i.
pub const INT_TIMER_COMPA: u16 = 24;
pub const INT_TIMER_COMPB: u16 = 25;
pub const INT_TIMER_OVF: u16 = 26;
// Serial port n raises base + its interrupt offset.
pub const INT_SERIAL_RXI: u16 = 53;
pub const INT_SERIAL_TXI: u16 = 54;
