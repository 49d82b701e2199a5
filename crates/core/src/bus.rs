//! Peripheral address routing.
//!
//! [`PeripheralBus`] maps address windows to devices. The first mapping whose
//! window contains an address owns it; everything else goes to the
//! [`CatchAll`] fallback. [`Peripherals`] wires up the standard layout from a
//! [`DeviceConfig`] and keeps typed handles for host-side calls such as
//! [`Serial::send`].

use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use crate::config::DeviceConfig;
use crate::peripherals::{CatchAll, Serial, Timers, SERIAL_WINDOW};
use crate::savestate::SaveState;
use crate::{Device, ExecutionState};

/// Shared handle to a mapped device.
pub type DeviceHandle = Rc<RefCell<dyn Device>>;

struct Mapping {
    window: Range<u32>,
    device: DeviceHandle,
}

#[derive(Default)]
pub struct PeripheralBus {
    mappings: Vec<Mapping>,
    fallback: CatchAll,
}

impl PeripheralBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `device` over `window`. Earlier mappings win on overlap.
    pub fn map(&mut self, window: Range<u32>, device: DeviceHandle) {
        self.mappings.push(Mapping { window, device });
    }

    fn owner(&self, address: u32) -> Option<&DeviceHandle> {
        self.mappings
            .iter()
            .find(|m| m.window.contains(&address))
            .map(|m| &m.device)
    }

    pub fn read(&mut self, address: u32) -> u8 {
        match self.owner(address) {
            Some(dev) => dev.borrow_mut().read(address),
            None => self.fallback.read(address),
        }
    }

    pub fn write(&mut self, address: u32, value: u8) {
        match self.owner(address) {
            Some(dev) => dev.borrow_mut().write(address, value),
            None => self.fallback.write(address, value),
        }
    }

    /// Tick every mapped device, in mapping order.
    pub fn tick(&mut self) {
        for m in &self.mappings {
            m.device.borrow_mut().tick();
        }
    }

    /// Fallback device, for its miss counters.
    pub fn fallback(&self) -> &CatchAll {
        &self.fallback
    }
}

/// Standard device set: timer unit plus serial ports, mapped on one bus.
pub struct Peripherals {
    pub bus: PeripheralBus,
    pub timers: Rc<RefCell<Timers>>,
    pub serial_ports: Vec<Rc<RefCell<Serial>>>,
    state: Rc<dyn ExecutionState>,
}

impl Peripherals {
    pub fn new(state: Rc<dyn ExecutionState>, config: &DeviceConfig) -> Self {
        let mut bus = PeripheralBus::new();

        let timers = Rc::new(RefCell::new(Timers::with_base(state.clone(), config.timer_base)));
        let window = timers.borrow().window();
        bus.map(window, timers.clone());

        let mut serial_ports = Vec::with_capacity(config.serial_ports.len());
        for port in &config.serial_ports {
            let serial = Rc::new(RefCell::new(Serial::new(state.clone(), port.clone())));
            bus.map(port.base..port.base.saturating_add(SERIAL_WINDOW), serial.clone());
            serial_ports.push(serial);
        }
        log::debug!(
            "peripherals: timers at 0x{:06x}, {} serial port(s)",
            config.timer_base,
            serial_ports.len()
        );

        Peripherals { bus, timers, serial_ports, state }
    }

    pub fn reset(&mut self) {
        self.timers.borrow_mut().reset();
        for port in &self.serial_ports {
            port.borrow_mut().reset();
        }
    }

    /// Capture the register state of every device.
    pub fn save_state(&self) -> SaveState {
        SaveState {
            cycles: self.state.cycles(),
            timers: self.timers.borrow().save_state(),
            serial_ports: self.serial_ports.iter().map(|s| s.borrow().save_state()).collect(),
        }
    }

    /// Restore device registers. The caller restores its own cycle counter
    /// from [`SaveState::cycles`]. Ports missing from the save are left as-is.
    pub fn load_state(&mut self, s: &SaveState) {
        self.timers.borrow_mut().load_state(&s.timers);
        for (port, saved) in self.serial_ports.iter().zip(&s.serial_ports) {
            port.borrow_mut().load_state(saved);
        }
    }
}
