//! The Pacific-80 machine: board state, port dispatch, and the
//! cycle-budgeted scheduler surface the host loop drives.

use std::sync::{Arc, Mutex};

use pac80_core::cpu_8080::{Bus8080, Cpu8080};
use pac80_core::psg::Psg;
use pac80_core::types::Frame;

use crate::cf::{CfImage, CompactFlash};
use crate::joypad::Joypad;
use crate::keyboard::Keyboard;
use crate::memory::{MemoryMap, ROM_SIZE};
use crate::ppi::{Ppi, INT_PENDING};
use crate::uart::Uart;
use crate::video;
use crate::{InputEvent, MachineError};

/// Cycle quota awarded per CPU timer tick (320 µs of a ~3.15 MHz clock).
pub const SLICE_CYCLES: u32 = 1007;
/// CPU timer period.
pub const SLICE_INTERVAL_NS: u64 = 320_000;
/// Display timer period (~60 Hz).
pub const FRAME_INTERVAL_NS: u64 = 16_666_666;
/// Nominal chip clock, used for PSG pitch.
pub const CPU_CLOCK_HZ: u32 = 3_125_000;
/// Host audio rate: mono signed-16.
pub const AUDIO_SAMPLE_RATE: u32 = 44_100;

/// Everything on the bus. The CPU owns this and calls back into it for
/// every memory and port access.
pub struct Board {
    pub mem: MemoryMap,
    pub uart: Uart,
    pub cf: CompactFlash,
    pub ppi: Ppi,
    pub pad: Joypad,
    pub kb: Keyboard,
    pub psg: Arc<Mutex<Psg>>,
}

impl Bus8080 for Board {
    fn read_byte(&self, addr: u16) -> u8 {
        self.mem.read(addr)
    }

    fn write_byte(&mut self, addr: u16, val: u8) {
        self.mem.write(addr, val)
    }

    fn port_in(&mut self, port: u8) -> u8 {
        match port & 0x38 {
            // BANK: port bits 7:6 select the bank
            0x08 => self.mem.bank_status((port >> 6) as usize),
            // PPI
            0x18 => match port & 5 {
                0 => self.ppi.read_a(),
                1 => {
                    // Port address bit 1 drives the joypad select line
                    let mut b = self.ppi.b;
                    self.pad.drive_port_b(port & 2 != 0, &mut b);
                    self.ppi.b = b;
                    b
                }
                4 => self.ppi.read_c(),
                _ => 0xFF,
            },
            // UART
            0x28 => {
                if port & 1 == 0 {
                    let byte = self.uart.read_data();
                    let rx_ready = self.uart.rx_ready();
                    self.ppi.sync_uint(rx_ready);
                    byte
                } else {
                    self.uart.status()
                }
            }
            // CF
            0x30 => self.cf.read_reg(port & 7),
            // PSG and the expansion groups have no readable registers
            _ => 0xFF,
        }
    }

    fn port_out(&mut self, port: u8, val: u8) {
        match port & 0x38 {
            0x08 => self.mem.bank_select((port >> 6) as usize, val),
            0x18 => match port & 5 {
                4 => {
                    self.ppi.write_c(val);
                    let rx_ready = self.uart.rx_ready();
                    self.ppi.sync_uint(rx_ready);
                }
                5 => {
                    self.ppi.control(val);
                    let rx_ready = self.uart.rx_ready();
                    self.ppi.sync_uint(rx_ready);
                }
                // Ports A and B are inputs on this board
                _ => {}
            },
            0x28 => {
                if port & 1 == 0 {
                    self.uart.write_data(val);
                }
                // Mode/control words are accepted and dropped
            }
            0x30 => self.cf.write_reg(port & 7, val),
            0x38 => {
                if let Ok(mut psg) = self.psg.lock() {
                    psg.write_io(val);
                }
            }
            _ => {}
        }
    }
}

pub struct Machine {
    cpu: Cpu8080<Board>,
    /// Cycle budget accumulator for the current timeslice.
    cyc: u32,
}

impl Machine {
    /// Build the machine from a boot ROM and a card image. The ROM must be
    /// exactly one bank.
    pub fn new(rom: Vec<u8>, image: CfImage) -> Result<Self, MachineError> {
        if rom.len() != ROM_SIZE {
            return Err(MachineError::RomSize {
                expected: ROM_SIZE,
                actual: rom.len(),
            });
        }
        let board = Board {
            mem: MemoryMap::new(rom),
            uart: Uart::new(),
            cf: CompactFlash::new(image),
            ppi: Ppi::new(),
            pad: Joypad::new(),
            kb: Keyboard::new(),
            psg: Arc::new(Mutex::new(Psg::new(CPU_CLOCK_HZ, AUDIO_SAMPLE_RATE))),
        };
        Ok(Self {
            cpu: Cpu8080::new(board),
            cyc: 0,
        })
    }

    pub fn board(&self) -> &Board {
        &self.cpu.bus
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.cpu.bus
    }

    pub fn cpu(&self) -> &Cpu8080<Board> {
        &self.cpu
    }

    /// Shared PSG handle for the audio thread.
    pub fn psg(&self) -> Arc<Mutex<Psg>> {
        Arc::clone(&self.cpu.bus.psg)
    }

    /// One CPU timer tick: run instructions until the cycle quota is spent,
    /// delivering a pending interrupt before each one, then service the
    /// keyboard latch.
    pub fn step_slice(&mut self) {
        while self.cyc < SLICE_CYCLES {
            if self.cpu.bus.ppi.c & INT_PENDING != 0 {
                self.cyc += self.cpu.interrupt(0xFF);
            }
            if self.cpu.halted {
                self.cyc = SLICE_CYCLES;
                break;
            }
            self.cyc += self.cpu.step();
        }
        self.cyc -= SLICE_CYCLES;

        let Board { kb, ppi, .. } = &mut self.cpu.bus;
        kb.pump(ppi);
    }

    /// Display timer tick: latch VBLANK and age the joypad select sequence.
    pub fn vblank(&mut self) {
        self.cpu.bus.ppi.raise_vint();
        self.cpu.bus.pad.frame_tick();
    }

    /// Host input event.
    pub fn input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key { code, pressed } => self.cpu.bus.kb.key_event(code, pressed),
            InputEvent::PadButton { button, pressed } => {
                self.cpu.bus.pad.set_button(button, pressed)
            }
            InputEvent::PadHat(dirs) => self.cpu.bus.pad.set_hat(dirs),
        }
    }

    /// One byte arrived from the serial line.
    pub fn serial_rx(&mut self, byte: u8) {
        self.cpu.bus.uart.recv(byte);
        let rx_ready = self.cpu.bus.uart.rx_ready();
        self.cpu.bus.ppi.sync_uint(rx_ready);
    }

    /// Drain the transmit holding register toward the serial line.
    pub fn serial_tx(&mut self) -> Option<u8> {
        self.cpu.bus.uart.take_tx()
    }

    /// Decode the framebuffer for the current VA15 bank.
    pub fn render(&self, frame: &mut Frame) {
        video::render(self.cpu.bus.mem.ram(), self.cpu.bus.ppi.va15(), frame);
    }

    /// Warm reset: back to the power-on map and register state without
    /// touching RAM or the card image.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.cyc = 0;
        let board = &mut self.cpu.bus;
        board.mem.reset();
        board.uart.reset();
        board.cf.reset();
        board.ppi.reset();
        board.pad.reset();
        board.kb.clear();
    }
}
