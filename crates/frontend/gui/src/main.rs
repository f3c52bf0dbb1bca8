//! Pacific-80 emulator frontend: minifb window, rodio audio, pty console.
//!
//! The loop runs once per display frame. Each pass it feeds the machine the
//! CPU timer ticks that elapsed on the wall clock, pumps the pty in both
//! directions, applies input, then raises VBLANK and presents the decoded
//! framebuffer. F8 toggles joypad capture, F12 is a warm reset.

mod audio;
mod input;
mod pty;
mod settings;

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use rodio::{OutputStream, Source};

use pac80_core::types::Frame;
use pac80_machine::machine::{FRAME_INTERVAL_NS, SLICE_INTERVAL_NS};
use pac80_machine::video::{HEIGHT, WIDTH};
use pac80_machine::{CfImage, InputEvent, Machine, PadButton};

use audio::PsgSource;
use pty::Pty;
use settings::Settings;

/// Upper bound on CPU ticks delivered in one pass, so a stalled host
/// doesn't spiral trying to catch up.
const MAX_TICKS_PER_PASS: u64 = 4 * FRAME_INTERVAL_NS / SLICE_INTERVAL_NS;

#[derive(Parser)]
#[command(name = "pac80emu", about = "Pacific-80 home computer emulator")]
struct Args {
    /// 16 KiB boot ROM image
    rom: PathBuf,

    /// CompactFlash card image; guest writes persist into the file
    cf_image: PathBuf,

    /// Integer window scale over 320x240 (persisted in the settings file)
    #[arg(long)]
    scale: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = Settings::load();
    if let Some(scale) = args.scale {
        if scale != settings.scale && scale > 0 {
            settings.scale = scale;
            if let Err(e) = settings.save() {
                log::warn!("could not persist settings: {}", e);
            }
        }
    }

    let rom = fs::read(&args.rom).with_context(|| format!("read {}", args.rom.display()))?;
    let image =
        CfImage::open(&args.cf_image).with_context(|| format!("map {}", args.cf_image.display()))?;
    let mut machine = Machine::new(rom, image)?;

    let mut pty = Pty::open().context("open pty master")?;
    println!("{}", pty.slave_name()?);
    let mut pty_connected = false;

    let mut window = Window::new(
        "pac80emu",
        WIDTH * settings.scale.max(1),
        HEIGHT * settings.scale.max(1),
        WindowOptions {
            resize: true,
            ..WindowOptions::default()
        },
    )
    .context("create window")?;

    let (_stream, stream_handle) = OutputStream::try_default().context("open audio device")?;
    stream_handle
        .play_raw(PsgSource::new(machine.psg()).convert_samples())
        .context("start audio playback")?;

    let mut frame = Frame::new(WIDTH as u32, HEIGHT as u32);
    let mut joy_capture = false;
    let mut hat = 0u8;
    let mut last_tick = Instant::now();
    let mut last_frame = Instant::now();
    let target_frame = Duration::from_nanos(FRAME_INTERVAL_NS);

    while window.is_open() {
        // Host control keys first; they are consumed, not forwarded.
        if window.is_key_pressed(Key::F12, KeyRepeat::No) {
            machine.reset();
            log::info!("machine reset");
        }
        if window.is_key_pressed(Key::F8, KeyRepeat::No) {
            joy_capture = !joy_capture;
            // Release everything the pad might still be holding
            for button in [
                PadButton::A,
                PadButton::B,
                PadButton::C,
                PadButton::X,
                PadButton::Y,
                PadButton::Z,
                PadButton::Start,
                PadButton::Mode,
            ] {
                machine.input(InputEvent::PadButton {
                    button,
                    pressed: false,
                });
            }
            machine.input(InputEvent::PadHat(0));
            hat = 0;
            log::info!(
                "joypad capture {}",
                if joy_capture { "on" } else { "off" }
            );
        }

        for key in window.get_keys_pressed(KeyRepeat::No) {
            if matches!(key, Key::F8 | Key::F12) {
                continue;
            }
            if joy_capture {
                if let Some(button) = input::pad_button(key, &settings.joypad) {
                    machine.input(InputEvent::PadButton {
                        button,
                        pressed: true,
                    });
                }
            } else if let Some(code) = input::scancode(key) {
                machine.input(InputEvent::Key {
                    code,
                    pressed: true,
                });
            }
        }
        for key in window.get_keys_released() {
            if matches!(key, Key::F8 | Key::F12) {
                continue;
            }
            if joy_capture {
                if let Some(button) = input::pad_button(key, &settings.joypad) {
                    machine.input(InputEvent::PadButton {
                        button,
                        pressed: false,
                    });
                }
            } else if let Some(code) = input::scancode(key) {
                machine.input(InputEvent::Key {
                    code,
                    pressed: false,
                });
            }
        }
        if joy_capture {
            let held = window.get_keys();
            let new_hat = input::hat_state(&held);
            if new_hat != hat {
                hat = new_hat;
                machine.input(InputEvent::PadHat(hat));
            }
        }

        // CPU timer: award one 1007-cycle slice per elapsed 320 µs.
        let due = last_tick.elapsed().as_nanos() as u64 / SLICE_INTERVAL_NS;
        if due > MAX_TICKS_PER_PASS {
            log::debug!("dropping {} stalled CPU ticks", due - MAX_TICKS_PER_PASS);
            last_tick = Instant::now();
        } else {
            last_tick += Duration::from_nanos(due * SLICE_INTERVAL_NS);
        }
        for _ in 0..due.min(MAX_TICKS_PER_PASS) {
            machine.step_slice();
        }

        // Serial console in both directions, one byte at a time.
        match pump_pty(&pty, &mut machine, &mut pty_connected) {
            Ok(()) => {}
            Err(e) => {
                log::warn!("pty hangup ({}), reopening", e);
                pty = Pty::open().context("reopen pty master")?;
                pty_connected = false;
                println!("{}", pty.slave_name()?);
            }
        }

        // Display timer: VBLANK, decode, present.
        machine.vblank();
        machine.render(&mut frame);
        window
            .update_with_buffer(&frame.pixels, WIDTH, HEIGHT)
            .context("window update")?;

        let frame_dt = last_frame.elapsed();
        if frame_dt < target_frame {
            std::thread::sleep(target_frame - frame_dt);
        }
        last_frame = Instant::now();
    }

    Ok(())
}

/// Move pending bytes between the pty and the UART. An error means the
/// master is dead and the caller should open a fresh one.
fn pump_pty(pty: &Pty, machine: &mut Machine, connected: &mut bool) -> std::io::Result<()> {
    let status = pty.status()?;

    if status.hangup {
        // A fresh master reports hangup until the first terminal attaches;
        // only a lost peer warrants a reopen.
        if *connected {
            return Err(std::io::ErrorKind::BrokenPipe.into());
        }
    } else {
        *connected = true;
    }

    if status.readable {
        // Bounded per frame; the UART FIFO absorbs the burst
        for _ in 0..256 {
            match pty.read_byte()? {
                Some(byte) => machine.serial_rx(byte),
                None => break,
            }
        }
    }

    while let Some(byte) = machine.serial_tx() {
        pty.write_byte(byte)?;
    }

    Ok(())
}
