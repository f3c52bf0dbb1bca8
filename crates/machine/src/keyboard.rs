//! Keyboard controller.
//!
//! Host key events arrive as XT-style make codes; releases carry bit 7.
//! Codes queue in a small FIFO and are latched one at a time into PPI port
//! A whenever the input buffer is free, raising KIBF (and KINT when the
//! interrupt enable is set). Reading port A reopens the buffer.

use crate::fifo::Fifo;
use crate::ppi::{Ppi, KIBF, KINT};

pub struct Keyboard {
    fifo: Fifo,
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            // 64-entry queue
            fifo: Fifo::new(2),
        }
    }

    pub fn clear(&mut self) {
        self.fifo.clear();
    }

    /// Queue a make or break code; a full queue drops the event.
    pub fn key_event(&mut self, code: u8, pressed: bool) {
        self.fifo.push(if pressed { code } else { code | 0x80 });
    }

    /// Latch the next code into port A if the buffer is free. Runs once per
    /// CPU timeslice.
    pub fn pump(&mut self, ppi: &mut Ppi) {
        if ppi.c & KIBF == 0 && self.fifo.count() > 0 {
            ppi.a = self.fifo.pop();
            ppi.c |= KIBF;
            if ppi.kinte() {
                ppi.c |= KINT;
            }
        }
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}
