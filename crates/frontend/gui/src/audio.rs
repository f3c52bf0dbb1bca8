//! Audio output: a rodio source that pulls samples straight from the
//! shared PSG handle on the audio thread. The PSG is the only state the
//! audio thread touches.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pac80_core::psg::Psg;
use pac80_machine::machine::AUDIO_SAMPLE_RATE;
use rodio::Source;

pub struct PsgSource {
    psg: Arc<Mutex<Psg>>,
}

impl PsgSource {
    pub fn new(psg: Arc<Mutex<Psg>>) -> Self {
        Self { psg }
    }
}

impl Iterator for PsgSource {
    type Item = i16;

    fn next(&mut self) -> Option<i16> {
        // A poisoned lock means the main thread died mid-update; play
        // silence rather than bringing the audio thread down too.
        Some(self.psg.lock().map(|mut psg| psg.sample()).unwrap_or(0))
    }
}

impl Source for PsgSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        AUDIO_SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
