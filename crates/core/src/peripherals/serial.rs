//! Asynchronous serial channel emulation.
//!
//! Transmission has zero modeled latency: a write to TDR hands the byte to the
//! output callback before the write returns, then the transmit timer is
//! rearmed and TDRE cleared. The timer models the character time; each expiry
//! raises TXI (when enabled in SCR) so firmware can queue the next byte.
//!
//! Inbound bytes are queued with [`Serial::send`] and delivered one per tick,
//! only while RDRF is clear. Firmware acknowledges a byte by clearing RDRF
//! through a status write.

use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Serialize, Deserialize};

use super::{INT_SERIAL_RXI, INT_SERIAL_TXI};
use crate::config::SerialConfig;
use crate::{Device, ExecutionState};

/// Size of the serial register window in bytes.
pub const SERIAL_WINDOW: u32 = 8;
/// TDR value meaning "nothing to transmit"; written without reaching the output.
///
/// This is -2 as an unsigned byte. Comparing the byte against a signed -2
/// never matches and would forward every byte, so the check is on 0xFE.
pub const TX_NO_DATA: u8 = 0xFE;

const ADDR_MASK: u32 = SERIAL_WINDOW - 1;

// Register offsets
const SCR: u32 = 2; // serial control
const TDR: u32 = 3; // transmit data
const SSR: u32 = 4; // serial status
const RDR: u32 = 5; // receive data

// SCR bits
const SCR_TE: u8 = 0x20; // transmit timer arm
const SCR_TIE: u8 = 0x80; // transmit interrupt enable

// SSR bits
const SSR_RDRF: u8 = 0x40; // receive data full
const SSR_TDRE: u8 = 0x80; // transmit data empty

// Power-on values
const TDR_RESET: u8 = 0xFF;
const SSR_RESET: u8 = SSR_TDRE;

/// Saved register state of a serial channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialState {
    pub scr: u8,
    pub tdr: u8,
    pub ssr: u8,
    pub rdr: u8,
    pub data: [u8; SERIAL_WINDOW as usize],
    pub tx_timer: i64,
    pub last_cycles: u64,
    pub rx_queue: Vec<u8>,
}

pub struct Serial {
    state: Rc<dyn ExecutionState>,
    config: SerialConfig,
    scr: u8,
    tdr: u8,
    ssr: u8,
    rdr: u8,
    /// Unmapped offsets, read and written verbatim
    data: [u8; SERIAL_WINDOW as usize],
    /// Cycles left until TXI; 0 = disarmed
    tx_timer: i64,
    /// Cycle count sampled by the last armed tick
    last_cycles: u64,
    rx_queue: VecDeque<u8>,
    output: Box<dyn FnMut(u8)>,
}

impl Serial {
    pub fn new(state: Rc<dyn ExecutionState>, config: SerialConfig) -> Self {
        Serial {
            state,
            config,
            scr: 0,
            tdr: TDR_RESET,
            ssr: SSR_RESET,
            rdr: 0,
            data: [0; SERIAL_WINDOW as usize],
            tx_timer: 0,
            last_cycles: 0,
            rx_queue: VecDeque::new(),
            output: Box::new(|_| {}),
        }
    }

    /// Serial channel with an output callback installed.
    pub fn with_output(
        state: Rc<dyn ExecutionState>,
        config: SerialConfig,
        output: impl FnMut(u8) + 'static,
    ) -> Self {
        let mut serial = Serial::new(state, config);
        serial.set_output(output);
        serial
    }

    /// Install the callback that receives every transmitted byte.
    pub fn set_output(&mut self, output: impl FnMut(u8) + 'static) {
        self.output = Box::new(output);
    }

    /// Restore power-on registers and drop queued input. The collaborator,
    /// configuration and output callback are kept.
    pub fn reset(&mut self) {
        self.scr = 0;
        self.tdr = TDR_RESET;
        self.ssr = SSR_RESET;
        self.rdr = 0;
        self.data = [0; SERIAL_WINDOW as usize];
        self.tx_timer = 0;
        self.last_cycles = 0;
        self.rx_queue.clear();
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    /// Queue inbound bytes for delivery by [`Serial::tick`], in order.
    pub fn send(&mut self, bytes: &[u8]) {
        self.rx_queue.extend(bytes.iter().copied());
    }

    pub fn has_pending_rx(&self) -> bool {
        !self.rx_queue.is_empty()
    }

    pub fn tick(&mut self) {
        if self.tx_timer != 0 {
            let cycles = self.state.cycles();
            let diff = cycles.saturating_sub(self.last_cycles);
            self.last_cycles = cycles;
            self.tx_timer = self.tx_timer.saturating_sub(i64::try_from(diff).unwrap_or(i64::MAX));
            if self.tx_timer <= 0 {
                self.tx_timer = self.config.clock_time;
                if self.scr & SCR_TIE != 0 {
                    self.state.interrupt(INT_SERIAL_TXI.wrapping_add(self.config.irq_offset));
                }
            }
        }
        if self.ssr & SSR_RDRF == 0 {
            if let Some(byte) = self.rx_queue.pop_front() {
                self.ssr |= SSR_RDRF;
                self.rdr = byte;
                self.state.interrupt(INT_SERIAL_RXI.wrapping_add(self.config.irq_offset));
            }
        }
    }

    pub fn read(&self, address: u32) -> u8 {
        match address & ADDR_MASK {
            SCR => self.scr,
            TDR => self.tdr,
            SSR => self.ssr,
            RDR => self.rdr,
            off => self.data[off as usize],
        }
    }

    pub fn write(&mut self, address: u32, value: u8) {
        match address & ADDR_MASK {
            SCR => {
                if value & SCR_TE != 0 && self.scr & SCR_TE == 0 {
                    self.tx_timer = 1;
                }
                if value & SCR_TE == 0 && self.scr & SCR_TE != 0 {
                    self.tx_timer = 0;
                }
                self.scr = value;
            }
            TDR => {
                self.tdr = value;
                if value != TX_NO_DATA {
                    log::debug!("serial tx: [{:02x}]", value);
                    (self.output)(value);
                }
                self.tx_timer = self.config.clock_time;
                self.ssr &= !SSR_TDRE;
            }
            SSR => self.ssr = value,
            RDR => {}
            off => self.data[off as usize] = value,
        }
    }

    /// Capture state for save state.
    pub fn save_state(&self) -> SerialState {
        SerialState {
            scr: self.scr, tdr: self.tdr, ssr: self.ssr, rdr: self.rdr,
            data: self.data,
            tx_timer: self.tx_timer,
            last_cycles: self.last_cycles,
            rx_queue: self.rx_queue.iter().copied().collect(),
        }
    }

    /// Restore state from save state.
    pub fn load_state(&mut self, s: &SerialState) {
        self.scr = s.scr; self.tdr = s.tdr; self.ssr = s.ssr; self.rdr = s.rdr;
        self.data = s.data;
        self.tx_timer = s.tx_timer;
        self.last_cycles = s.last_cycles;
        self.rx_queue = s.rx_queue.iter().copied().collect();
    }
}

impl Device for Serial {
    fn read(&mut self, address: u32) -> u8 {
        Serial::read(self, address)
    }

    fn write(&mut self, address: u32, value: u8) {
        Serial::write(self, address, value)
    }

    fn tick(&mut self) {
        Serial::tick(self)
    }
}
