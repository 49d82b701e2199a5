//! # h8s-core
//!
//! Cycle-accurate models of two H8S on-chip peripherals, reproducing the
//! register-visible behavior firmware observes, interrupt timing included:
//!
//! - [`peripherals::Timers`] — 5-channel 16-bit compare-match timer unit
//! - [`peripherals::Serial`] — single asynchronous serial channel
//! - [`peripherals::CatchAll`] — fallback device that logs unclaimed accesses
//!
//! ## Architecture
//!
//! - [`ExecutionState`] — collaborator supplying the cycle counter and the
//!   interrupt entry point; injected into each device at construction
//! - [`CpuState`] — concrete [`ExecutionState`] (cycle counter + pending
//!   interrupt queue), used by a CPU core or as a fake clock in tests
//! - [`Device`] — `read`/`write`/`tick` contract shared by every peripheral
//! - [`bus`] — address router mapping windows to devices, plus the standard
//!   [`Peripherals`] set built from a [`DeviceConfig`]
//! - [`config`] — serde-derived device layout
//! - [`savestate`] — compressed save/restore of device registers
//!
//! Everything runs on one thread. The driver advances the cycle counter,
//! calls `tick()` on each device, and routes bus accesses in between.

pub mod bus;
pub mod config;
pub mod peripherals;
pub mod savestate;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

pub use bus::{PeripheralBus, Peripherals};
pub use config::{DeviceConfig, SerialConfig};
pub use peripherals::{CatchAll, Serial, Timers};

/// Source of the cycle count and sink for raised interrupts.
///
/// Methods take `&self` so several devices can share one instance behind an
/// `Rc`; implementors use interior mutability for the interrupt side.
pub trait ExecutionState {
    /// Monotonic, non-decreasing cycle counter.
    fn cycles(&self) -> u64;
    /// Raise the interrupt with the given vector number.
    fn interrupt(&self, vector: u16);
}

/// Memory-mapped peripheral.
pub trait Device {
    fn read(&mut self, address: u32) -> u8;
    fn write(&mut self, address: u32, value: u8);
    /// Advance internal state to the current cycle count.
    fn tick(&mut self) {}
}

/// Minimal execution state: a cycle counter and the interrupts raised
/// against it, in raise order.
#[derive(Debug, Default)]
pub struct CpuState {
    cycles: Cell<u64>,
    pending: RefCell<VecDeque<u16>>,
}

impl CpuState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the cycle counter forward by `n`.
    pub fn advance(&self, n: u64) {
        self.cycles.set(self.cycles.get() + n);
    }

    pub fn set_cycles(&self, cycles: u64) {
        self.cycles.set(cycles);
    }

    /// Raised vectors not yet taken, oldest first.
    pub fn pending(&self) -> Vec<u16> {
        self.pending.borrow().iter().copied().collect()
    }

    /// Drain and return all raised vectors, oldest first.
    pub fn take_interrupts(&self) -> Vec<u16> {
        self.pending.borrow_mut().drain(..).collect()
    }
}

impl ExecutionState for CpuState {
    fn cycles(&self) -> u64 {
        self.cycles.get()
    }

    fn interrupt(&self, vector: u16) {
        log::trace!("irq {} at cycle {}", vector, self.cycles.get());
        self.pending.borrow_mut().push_back(vector);
    }
}
