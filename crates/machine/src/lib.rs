//! Pacific-80 board emulation: banked memory, UART, CompactFlash, 8255 PPI
//! with keyboard and joypad, PSG port, framebuffer decoder, and the
//! cycle-budgeted machine scheduler.
//!
//! The [`Machine`] consumes typed events from the host loop (CPU timer
//! ticks, serial bytes, input events, display ticks) and produces frames
//! and serial output; see [`machine`] for the event surface.

use thiserror::Error;

pub mod cf;
pub mod fifo;
pub mod joypad;
pub mod keyboard;
pub mod machine;
pub mod memory;
pub mod ppi;
pub mod uart;
pub mod video;

pub use cf::CfImage;
pub use joypad::PadButton;
pub use machine::Machine;

#[derive(Debug, Error)]
pub enum MachineError {
    #[error("ROM image must be exactly {expected} bytes, got {actual}")]
    RomSize { expected: usize, actual: usize },
    #[error("storage image: {0}")]
    Image(#[from] std::io::Error),
}

/// Host input event, already translated out of the windowing layer's
/// vocabulary: XT scancodes for the keyboard, pad buttons and a hat
/// bitmask for the joypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key { code: u8, pressed: bool },
    PadButton { button: PadButton, pressed: bool },
    PadHat(u8),
}
