//! 16-bit timer unit emulation (5 channels).
//!
//! Each channel counts up at the CPU clock divided by 1/2/4/8 (TCR bits 0-1)
//! and compares against GRA/GRB. A match sets the sticky TSR flag, optionally
//! clears the counter (TCR bits 5-6) and raises the compare interrupt when
//! enabled in TIER. The overflow flag is set on the sub-tick where the
//! counter sits at 0, and only when the overflow interrupt is enabled.
//!
//! Register window (64 bytes from [`TIMER_BASE`]):
//!
//! | Offset      | Content                         |
//! |-------------|---------------------------------|
//! | 0x00–0x03   | TSTR, TSNC, TMDR, TFCR          |
//! | 0x04–0x0D   | channel 0                       |
//! | 0x0E–0x17   | channel 1                       |
//! | 0x18–0x21   | channel 2                       |
//! | 0x22–0x2B   | channel 3                       |
//! | 0x2C–0x31   | unmapped (scratch)              |
//! | 0x32–0x3B   | channel 4                       |
//! | 0x3C–0x3F   | unmapped (scratch)              |

use std::ops::Range;
use std::rc::Rc;

use serde::{Serialize, Deserialize};

use super::{INT_TIMER_COMPA, INT_TIMER_COMPB, INT_TIMER_OVF};
use crate::{Device, ExecutionState};

/// Default base address of the timer window.
pub const TIMER_BASE: u32 = 0xFF_FF60;
/// Size of the timer window in bytes.
pub const TIMER_WINDOW: u32 = 0x40;
/// Number of counting channels.
pub const CHANNELS: usize = 5;

/// Per-channel register blocks, by offset from the window base.
/// 0x2C..0x32 belongs to no channel.
const CHANNEL_BLOCKS: [Range<u32>; CHANNELS] = [
    0x04..0x0E,
    0x0E..0x18,
    0x18..0x22,
    0x22..0x2C,
    0x32..0x3C,
];

// Power-on values
const TSTR_RESET: u8 = 0xC0; // all channels halted
const TSNC_RESET: u8 = 0xC0;
const TMDR_RESET: u8 = 0x80; // no PWM channels
const TFCR_RESET: u8 = 0xC0;
const TCR_RESET: u8 = 0x80; // internal clock / 1, no counter clear
const TSR_RESET: u8 = 0xF8; // flags clear, reserved bits read 1
const TIER_RESET: u8 = 0xF8; // interrupts disabled, reserved bits read 1

// TCR bits
const TCR_CLOCK_DIV: u8 = 0x03;
const TCR_EXT_CLOCK: u8 = 0x04;
const TCR_CCLR: u8 = 0x60;
const CCLR_ON_GRA: u8 = 0x20;
const CCLR_ON_GRB: u8 = 0x40;

// TSR / TIER bits
const IMF_A: u8 = 0x01;
const IMF_B: u8 = 0x02;
const OVF: u8 = 0x04;

/// Registers inside a channel block, in address order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelReg {
    Tcr,
    /// Input capture control; not emulated.
    Tior,
    Tier,
    Tsr,
    TcntH,
    TcntL,
    GraH,
    GraL,
    GrbH,
    GrbL,
}

const CHANNEL_REGS: [ChannelReg; 10] = [
    ChannelReg::Tcr,
    ChannelReg::Tior,
    ChannelReg::Tier,
    ChannelReg::Tsr,
    ChannelReg::TcntH,
    ChannelReg::TcntL,
    ChannelReg::GraH,
    ChannelReg::GraL,
    ChannelReg::GrbH,
    ChannelReg::GrbL,
];

/// Decoded register for an offset inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reg {
    Tstr,
    Tsnc,
    Tmdr,
    Tfcr,
    Channel(usize, ChannelReg),
    Scratch(usize),
}

fn decode(offset: u32) -> Reg {
    match offset {
        0 => return Reg::Tstr,
        1 => return Reg::Tsnc,
        2 => return Reg::Tmdr,
        3 => return Reg::Tfcr,
        _ => {}
    }
    for (ch, block) in CHANNEL_BLOCKS.iter().enumerate() {
        if block.contains(&offset) {
            return Reg::Channel(ch, CHANNEL_REGS[(offset - block.start) as usize]);
        }
    }
    Reg::Scratch(offset as usize)
}

#[inline]
fn set_high(reg: u16, value: u8) -> u16 {
    (reg & 0x00FF) | ((value as u16) << 8)
}

#[inline]
fn set_low(reg: u16, value: u8) -> u16 {
    (reg & 0xFF00) | value as u16
}

/// One counting channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelState {
    pub tcnt: u16,
    pub gra: u16,
    pub grb: u16,
    pub tcr: u8,
    pub tsr: u8,
    pub tier: u8,
}

impl Default for ChannelState {
    fn default() -> Self {
        ChannelState {
            tcnt: 0,
            gra: 0xFFFF,
            grb: 0xFFFF,
            tcr: TCR_RESET,
            tsr: TSR_RESET,
            tier: TIER_RESET,
        }
    }
}

/// Saved register state of the whole unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimersState {
    pub tstr: u8,
    pub tsnc: u8,
    pub tmdr: u8,
    pub tfcr: u8,
    pub channels: [ChannelState; CHANNELS],
    pub scratch: Vec<u8>,
    pub last_cycles: u64,
}

pub struct Timers {
    state: Rc<dyn ExecutionState>,
    base: u32,
    tstr: u8,
    tsnc: u8,
    tmdr: u8,
    tfcr: u8,
    channels: [ChannelState; CHANNELS],
    scratch: [u8; TIMER_WINDOW as usize],
    /// Cycle count at the end of the previous tick, shared by all channels
    last_cycles: u64,
}

impl Timers {
    /// Timer unit at the default [`TIMER_BASE`].
    pub fn new(state: Rc<dyn ExecutionState>) -> Self {
        Self::with_base(state, TIMER_BASE)
    }

    pub fn with_base(state: Rc<dyn ExecutionState>, base: u32) -> Self {
        Timers {
            state,
            base,
            tstr: TSTR_RESET,
            tsnc: TSNC_RESET,
            tmdr: TMDR_RESET,
            tfcr: TFCR_RESET,
            channels: [ChannelState::default(); CHANNELS],
            scratch: [0; TIMER_WINDOW as usize],
            last_cycles: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Timers::with_base(self.state.clone(), self.base);
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    /// Address range claimed by this unit, clamped at the top of the
    /// address space.
    pub fn window(&self) -> Range<u32> {
        self.base..self.base.saturating_add(TIMER_WINDOW)
    }

    pub fn channel(&self, ch: usize) -> &ChannelState {
        &self.channels[ch]
    }

    fn offset(&self, address: u32) -> Option<u32> {
        address.checked_sub(self.base).filter(|off| *off < TIMER_WINDOW)
    }

    /// Advance every running channel to the current cycle count.
    pub fn tick(&mut self) {
        let now = self.state.cycles();
        for i in 0..CHANNELS {
            if self.tstr & (1 << i) == 0 { continue; } // halted
            if self.tmdr & (1 << i) != 0 { continue; } // PWM
            if self.channels[i].tcr & TCR_EXT_CLOCK != 0 { continue; } // external clock

            let shift = self.channels[i].tcr & TCR_CLOCK_DIV;
            // The snapshot is shared, so a divider change between ticks pairs
            // the new shift with the old cycle count.
            let steps = (now >> shift).saturating_sub(self.last_cycles >> shift);
            for _ in 0..steps {
                self.step_channel(i);
            }
        }
        self.last_cycles = now;
    }

    /// One counter increment: compare A, compare B, overflow, in that order.
    fn step_channel(&mut self, i: usize) {
        let vec_offset = 4 * i as u16;
        let c = &mut self.channels[i];
        let mut next = c.tcnt.wrapping_add(1);
        if c.tcnt == c.gra {
            c.tsr |= IMF_A;
            if c.tcr & TCR_CCLR == CCLR_ON_GRA { next = 0; }
            if c.tier & IMF_A != 0 {
                self.state.interrupt(INT_TIMER_COMPA + vec_offset);
            }
        }
        if c.tcnt == c.grb {
            c.tsr |= IMF_B;
            if c.tcr & TCR_CCLR == CCLR_ON_GRB { next = 0; }
            if c.tier & IMF_B != 0 {
                self.state.interrupt(INT_TIMER_COMPB + vec_offset);
            }
        }
        if c.tcnt == 0 && c.tier & OVF != 0 {
            c.tsr |= OVF;
            self.state.interrupt(INT_TIMER_OVF + vec_offset);
        }
        c.tcnt = next;
    }

    pub fn read(&self, address: u32) -> u8 {
        let Some(offset) = self.offset(address) else { return 0 };
        match decode(offset) {
            Reg::Tstr => self.tstr,
            Reg::Tsnc => self.tsnc,
            Reg::Tmdr => self.tmdr,
            Reg::Tfcr => self.tfcr,
            Reg::Scratch(i) => self.scratch[i],
            Reg::Channel(ch, reg) => {
                let c = &self.channels[ch];
                match reg {
                    ChannelReg::Tcr => c.tcr,
                    ChannelReg::Tior => 0,
                    ChannelReg::Tier => c.tier,
                    ChannelReg::Tsr => c.tsr,
                    ChannelReg::TcntH => (c.tcnt >> 8) as u8,
                    ChannelReg::TcntL => c.tcnt as u8,
                    ChannelReg::GraH => (c.gra >> 8) as u8,
                    ChannelReg::GraL => c.gra as u8,
                    ChannelReg::GrbH => (c.grb >> 8) as u8,
                    ChannelReg::GrbL => c.grb as u8,
                }
            }
        }
    }

    pub fn write(&mut self, address: u32, value: u8) {
        let Some(offset) = self.offset(address) else { return };
        match decode(offset) {
            Reg::Tstr => self.tstr = value,
            Reg::Tsnc => self.tsnc = value,
            Reg::Tmdr => self.tmdr = value,
            Reg::Tfcr => self.tfcr = value,
            Reg::Scratch(i) => self.scratch[i] = value,
            Reg::Channel(ch, reg) => {
                let c = &mut self.channels[ch];
                match reg {
                    ChannelReg::Tcr => c.tcr = value,
                    ChannelReg::Tior => {}
                    ChannelReg::Tier => c.tier = value,
                    ChannelReg::Tsr => c.tsr = value,
                    ChannelReg::TcntH => c.tcnt = set_high(c.tcnt, value),
                    ChannelReg::TcntL => c.tcnt = set_low(c.tcnt, value),
                    ChannelReg::GraH => c.gra = set_high(c.gra, value),
                    ChannelReg::GraL => c.gra = set_low(c.gra, value),
                    ChannelReg::GrbH => c.grb = set_high(c.grb, value),
                    ChannelReg::GrbL => c.grb = set_low(c.grb, value),
                }
            }
        }
    }

    /// Capture state for save state.
    pub fn save_state(&self) -> TimersState {
        TimersState {
            tstr: self.tstr, tsnc: self.tsnc, tmdr: self.tmdr, tfcr: self.tfcr,
            channels: self.channels,
            scratch: self.scratch.to_vec(),
            last_cycles: self.last_cycles,
        }
    }

    /// Restore state from save state.
    pub fn load_state(&mut self, s: &TimersState) {
        self.tstr = s.tstr; self.tsnc = s.tsnc; self.tmdr = s.tmdr; self.tfcr = s.tfcr;
        self.channels = s.channels;
        // Bytes missing from a short save read back as 0
        self.scratch = [0; TIMER_WINDOW as usize];
        let len = s.scratch.len().min(self.scratch.len());
        self.scratch[..len].copy_from_slice(&s.scratch[..len]);
        self.last_cycles = s.last_cycles;
    }
}

impl Device for Timers {
    fn read(&mut self, address: u32) -> u8 {
        Timers::read(self, address)
    }

    fn write(&mut self, address: u32, value: u8) {
        Timers::write(self, address, value)
    }

    fn tick(&mut self) {
        Timers::tick(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CpuState;

    const B: u32 = TIMER_BASE;

    fn setup() -> (Rc<CpuState>, Timers) {
        let cpu = Rc::new(CpuState::new());
        let timers = Timers::new(cpu.clone());
        (cpu, timers)
    }

    fn block(ch: usize) -> u32 {
        B + CHANNEL_BLOCKS[ch].start
    }

    fn write16(t: &mut Timers, addr: u32, value: u16) {
        t.write(addr, (value >> 8) as u8);
        t.write(addr + 1, value as u8);
    }

    #[test]
    fn test_reset_values() {
        let (_cpu, t) = setup();
        assert_eq!(t.read(B), 0xC0);
        assert_eq!(t.read(B + 1), 0xC0);
        assert_eq!(t.read(B + 2), 0x80);
        assert_eq!(t.read(B + 3), 0xC0);
        for ch in 0..CHANNELS {
            let a = block(ch);
            assert_eq!(t.read(a), 0x80);
            assert_eq!(t.read(a + 2), 0xF8);
            assert_eq!(t.read(a + 3), 0xF8);
            assert_eq!(t.read(a + 6), 0xFF);
            assert_eq!(t.read(a + 9), 0xFF);
        }
    }

    #[test]
    fn test_compare_a_each_channel() {
        for ch in 0..CHANNELS {
            let (cpu, mut t) = setup();
            let a = block(ch);
            t.write(a, 0x00); // clock / 1
            t.write(a + 2, IMF_A);
            write16(&mut t, a + 6, 9);
            t.write(B, 1 << ch);
            cpu.advance(10);
            t.tick();
            assert_eq!(cpu.take_interrupts(), vec![24 + 4 * ch as u16], "channel {}", ch);
            assert_eq!(t.channel(ch).tsr & IMF_A, IMF_A);
            assert_eq!(t.channel(ch).tcnt, 10);
        }
    }

    #[test]
    fn test_compare_b_clear_on_match() {
        let (cpu, mut t) = setup();
        let a = block(1);
        t.write(a, CCLR_ON_GRB); // clock / 1, clear on GRB
        t.write(a + 2, IMF_B);
        write16(&mut t, a + 8, 4);
        t.write(B, 0b10);
        cpu.advance(5);
        t.tick();
        assert_eq!(cpu.take_interrupts(), vec![29]);
        assert_eq!(t.channel(1).tcnt, 0);
        assert_eq!(t.channel(1).tsr & IMF_B, IMF_B);

        // Counter runs 0..=4 again
        cpu.advance(5);
        t.tick();
        assert_eq!(cpu.take_interrupts(), vec![29]);
    }

    #[test]
    fn test_clock_divider() {
        let (cpu, mut t) = setup();
        let a = block(2);
        t.write(a, 0x03); // clock / 8
        t.write(B, 0b100);
        cpu.advance(80);
        t.tick();
        assert_eq!(t.channel(2).tcnt, 10);
        cpu.advance(7);
        t.tick();
        assert_eq!(t.channel(2).tcnt, 10);
        cpu.advance(1);
        t.tick();
        assert_eq!(t.channel(2).tcnt, 11);
    }

    #[test]
    fn test_overflow_wraparound() {
        let (cpu, mut t) = setup();
        let a = block(0);
        t.write(a, 0x00);
        t.write(a + 2, OVF);
        write16(&mut t, a + 4, 0xFFFF);
        t.write(B, 1);

        cpu.advance(1);
        t.tick();
        assert_eq!(t.channel(0).tcnt, 0);
        // Compare flags set at 0xFFFF (GRA/GRB default), interrupts gated off
        assert_eq!(t.channel(0).tsr & (IMF_A | IMF_B), IMF_A | IMF_B);
        assert!(cpu.pending().is_empty());

        // Overflow is detected on the sub-tick where the counter sits at 0
        cpu.advance(1);
        t.tick();
        assert_eq!(cpu.take_interrupts(), vec![26]);
        assert_eq!(t.channel(0).tsr & OVF, OVF);
        assert_eq!(t.channel(0).tcnt, 1);
    }

    #[test]
    fn test_overflow_flag_needs_enable() {
        let (cpu, mut t) = setup();
        t.write(block(0), 0x00);
        t.write(B, 1);
        cpu.advance(3);
        t.tick();
        assert_eq!(t.channel(0).tsr & OVF, 0);
        assert!(cpu.pending().is_empty());
    }

    #[test]
    fn test_interrupt_order_within_sub_tick() {
        let (cpu, mut t) = setup();
        let a = block(3);
        t.write(a, 0x00);
        t.write(a + 2, IMF_A | IMF_B | OVF);
        write16(&mut t, a + 6, 0);
        write16(&mut t, a + 8, 0);
        t.write(B, 1 << 3);
        cpu.advance(1);
        t.tick();
        assert_eq!(cpu.take_interrupts(), vec![36, 37, 38]);
    }

    #[test]
    fn test_channels_processed_in_index_order() {
        let (cpu, mut t) = setup();
        for ch in [4, 0] {
            let a = block(ch);
            t.write(a, 0x00);
            t.write(a + 2, IMF_A);
            write16(&mut t, a + 6, 0);
        }
        t.write(B, 0b1_0001);
        cpu.advance(1);
        t.tick();
        assert_eq!(cpu.take_interrupts(), vec![24, 40]);
    }

    #[test]
    fn test_skip_halted_pwm_and_external() {
        let (cpu, mut t) = setup();
        for ch in 0..3 {
            t.write(block(ch), 0x00);
        }
        t.write(block(2), TCR_EXT_CLOCK);
        t.write(B, 0b110); // channel 0 halted
        t.write(B + 2, 0b010); // channel 1 PWM
        cpu.advance(100);
        t.tick();
        for ch in 0..3 {
            assert_eq!(t.channel(ch).tcnt, 0, "channel {}", ch);
        }
    }

    #[test]
    fn test_shared_snapshot_ignores_halted_time() {
        let (cpu, mut t) = setup();
        t.write(block(0), 0x00);
        cpu.advance(50);
        t.tick(); // halted, snapshot still moves
        t.write(B, 1);
        cpu.advance(5);
        t.tick();
        assert_eq!(t.channel(0).tcnt, 5);
    }

    #[test]
    fn test_status_sticky_under_read() {
        let (cpu, mut t) = setup();
        let a = block(0);
        t.write(a, 0x00);
        write16(&mut t, a + 6, 0);
        t.write(B, 1);
        cpu.advance(1);
        t.tick();
        for _ in 0..3 {
            assert_eq!(t.read(a + 3) & IMF_A, IMF_A);
        }
        t.write(a + 3, 0xF8);
        assert_eq!(t.read(a + 3), 0xF8);
    }

    #[test]
    fn test_counter_byte_order() {
        let (_cpu, mut t) = setup();
        let a = block(4);
        t.write(a + 4, 0x12);
        t.write(a + 5, 0x34);
        assert_eq!(t.channel(4).tcnt, 0x1234);

        t.write(a + 5, 0x78);
        t.write(a + 4, 0x56);
        assert_eq!(t.channel(4).tcnt, 0x5678);
        assert_eq!(t.read(a + 4), 0x56);
        assert_eq!(t.read(a + 5), 0x78);
    }

    #[test]
    fn test_tior_unimplemented() {
        let (_cpu, mut t) = setup();
        let a = block(1);
        t.write(a + 1, 0x5A);
        assert_eq!(t.read(a + 1), 0);
    }

    #[test]
    fn test_gap_is_scratch() {
        let (_cpu, mut t) = setup();
        for off in 0x2C..0x32 {
            assert_eq!(decode(off), Reg::Scratch(off as usize));
            t.write(B + off, off as u8);
        }
        for off in 0x2C..0x32 {
            assert_eq!(t.read(B + off), off as u8);
        }
        t.write(B + 0x3F, 0xAB);
        assert_eq!(t.read(B + 0x3F), 0xAB);
        // No channel register moved
        for ch in 0..CHANNELS {
            assert_eq!(*t.channel(ch), ChannelState::default());
        }
    }

    #[test]
    fn test_decode_table() {
        assert_eq!(decode(0x04), Reg::Channel(0, ChannelReg::Tcr));
        assert_eq!(decode(0x0D), Reg::Channel(0, ChannelReg::GrbL));
        assert_eq!(decode(0x0E), Reg::Channel(1, ChannelReg::Tcr));
        assert_eq!(decode(0x2B), Reg::Channel(3, ChannelReg::GrbL));
        assert_eq!(decode(0x32), Reg::Channel(4, ChannelReg::Tcr));
        assert_eq!(decode(0x37), Reg::Channel(4, ChannelReg::TcntL));
        assert_eq!(decode(0x3C), Reg::Scratch(0x3C));
    }

    #[test]
    fn test_out_of_window_isolated() {
        let (_cpu, mut t) = setup();
        let before = t.save_state();
        for addr in [B - 1, B + TIMER_WINDOW, 0, 0xFF_FFFF] {
            t.write(addr, 0x55);
            assert_eq!(t.read(addr), 0);
        }
        assert_eq!(t.save_state(), before);
    }

    #[test]
    fn test_compare_a_clear_on_match() {
        let (cpu, mut t) = setup();
        let a = block(2);
        t.write(a, CCLR_ON_GRA); // clock / 1, clear on GRA
        t.write(a + 2, IMF_A);
        write16(&mut t, a + 6, 3);
        t.write(B, 0b100);
        cpu.advance(4);
        t.tick();
        assert_eq!(cpu.take_interrupts(), vec![32]);
        assert_eq!(t.channel(2).tcnt, 0);
        assert_eq!(t.channel(2).tsr & IMF_A, IMF_A);
        assert_eq!(t.channel(2).tsr & IMF_B, 0);
    }

    #[test]
    fn test_divider_change_uses_shared_snapshot() {
        let (cpu, mut t) = setup();
        let a = block(0);
        t.write(a, 0x00); // clock / 1
        t.write(B, 1);
        cpu.advance(13);
        t.tick();
        assert_eq!(t.channel(0).tcnt, 13);

        // Switch to clock / 8: steps are (now >> 3) - (13 >> 3), not a
        // count of whole /8 periods since the switch.
        t.write(a, 0x03);
        cpu.advance(3);
        t.tick();
        assert_eq!(t.channel(0).tcnt, 13 + ((16 >> 3) - (13 >> 3)));
        assert_eq!(t.channel(0).tcnt, 14);
    }

    #[test]
    fn test_base_at_top_of_address_space() {
        let cpu = Rc::new(CpuState::new());
        let mut t = Timers::with_base(cpu, 0xFFFF_FFF0);
        assert_eq!(t.window(), 0xFFFF_FFF0..0xFFFF_FFFF);
        t.write(0xFFFF_FFF0, 0x1F);
        assert_eq!(t.read(0xFFFF_FFF0), 0x1F);
        // Offset 0x0E is channel 1 TCR, 0x0F its TIOR
        t.write(0xFFFF_FFFE, 0x03);
        assert_eq!(t.read(0xFFFF_FFFE), 0x03);
        assert_eq!(t.channel(1).tcr, 0x03);
        t.write(0xFFFF_FFFF, 0x5A);
        assert_eq!(t.read(0xFFFF_FFFF), 0);
        // Addresses below the base do not wrap into the window
        t.write(0x0000_0010, 0x55);
        assert_eq!(t.read(0x0000_0010), 0);
    }

    #[test]
    fn test_load_state_short_scratch() {
        let (_cpu, mut t) = setup();
        t.write(B + 0x2C, 0x11);
        t.write(B + 0x3F, 0x22);
        let mut saved = t.save_state();
        saved.scratch = vec![0; 0x30];
        saved.scratch[0x2C] = 0x33;

        t.load_state(&saved);
        assert_eq!(t.read(B + 0x2C), 0x33);
        assert_eq!(t.read(B + 0x3F), 0);
    }

    #[test]
    fn test_custom_base() {
        let cpu = Rc::new(CpuState::new());
        let mut t = Timers::with_base(cpu, 0x1000);
        assert_eq!(t.window(), 0x1000..0x1040);
        t.write(0x1000, 0x1F);
        assert_eq!(t.read(0x1000), 0x1F);
        assert_eq!(t.read(TIMER_BASE), 0);
    }

    #[test]
    fn test_reset_and_state_roundtrip() {
        let (cpu, mut t) = setup();
        t.write(block(0), 0x01);
        t.write(B, 1);
        t.write(B + 0x2D, 7);
        cpu.advance(20);
        t.tick();
        let saved = t.save_state();

        t.reset();
        assert_eq!(t.read(B), 0xC0);
        assert_eq!(t.channel(0).tcnt, 0);

        t.load_state(&saved);
        assert_eq!(t.channel(0).tcnt, 10);
        assert_eq!(t.read(B + 0x2D), 7);
        assert_eq!(t.save_state(), saved);
    }
}
