//! Host input translation.
//!
//! Keyboard keys become XT-style make codes for the machine's keyboard
//! controller. When joypad capture is toggled on, a configurable subset of
//! keys feeds the Sega pad instead (minifb has no gamepad API), with the
//! arrow keys acting as the hat.

use minifb::Key;
use pac80_machine::joypad::{BTN_DOWN, BTN_LEFT, BTN_RIGHT, BTN_UP};
use pac80_machine::PadButton;

use crate::settings::JoypadMapping;

/// XT scancode for a host key. Keys the windowing layer cannot report
/// (PrintScreen, SysRq, the menu-less extras) simply have no entry.
pub fn scancode(key: Key) -> Option<u8> {
    let code = match key {
        Key::A => 0x1E,
        Key::B => 0x30,
        Key::C => 0x2E,
        Key::D => 0x20,
        Key::E => 0x12,
        Key::F => 0x21,
        Key::G => 0x22,
        Key::H => 0x23,
        Key::I => 0x17,
        Key::J => 0x24,
        Key::K => 0x25,
        Key::L => 0x26,
        Key::M => 0x32,
        Key::N => 0x31,
        Key::O => 0x18,
        Key::P => 0x19,
        Key::Q => 0x10,
        Key::R => 0x13,
        Key::S => 0x1F,
        Key::T => 0x14,
        Key::U => 0x16,
        Key::V => 0x2F,
        Key::W => 0x11,
        Key::X => 0x2D,
        Key::Y => 0x15,
        Key::Z => 0x2C,
        Key::Key1 => 0x02,
        Key::Key2 => 0x03,
        Key::Key3 => 0x04,
        Key::Key4 => 0x05,
        Key::Key5 => 0x06,
        Key::Key6 => 0x07,
        Key::Key7 => 0x08,
        Key::Key8 => 0x09,
        Key::Key9 => 0x0A,
        Key::Key0 => 0x0B,
        Key::Enter => 0x1C,
        Key::Escape => 0x01,
        Key::Backspace => 0x0E,
        Key::Tab => 0x0F,
        Key::Space => 0x39,
        Key::Minus => 0x0C,
        Key::Equal => 0x0D,
        Key::LeftBracket => 0x1A,
        Key::RightBracket => 0x1B,
        Key::Backslash => 0x2B,
        Key::Semicolon => 0x27,
        Key::Apostrophe => 0x28,
        Key::Backquote => 0x29,
        Key::Comma => 0x33,
        Key::Period => 0x34,
        Key::Slash => 0x35,
        Key::CapsLock => 0x3A,
        Key::F1 => 0x3B,
        Key::F2 => 0x3C,
        Key::F3 => 0x3D,
        Key::F4 => 0x3E,
        // The board firmware's table has F5 shadowing F3; kept as-is
        Key::F5 => 0x3D,
        Key::F6 => 0x40,
        Key::F7 => 0x41,
        Key::F8 => 0x42,
        Key::F9 => 0x43,
        Key::F10 => 0x44,
        Key::F11 => 0x57,
        Key::F12 => 0x58,
        Key::ScrollLock => 0x46,
        Key::Pause => 0x45,
        Key::Insert => 0x52,
        Key::Home => 0x47,
        Key::PageUp => 0x49,
        Key::Delete => 0x53,
        Key::End => 0x4F,
        Key::PageDown => 0x51,
        Key::Right => 0x4D,
        Key::Left => 0x4B,
        Key::Down => 0x50,
        Key::Up => 0x48,
        Key::NumLock => 0x45,
        Key::NumPadSlash => 0x35,
        Key::NumPadAsterisk => 0x37,
        Key::NumPadMinus => 0x4A,
        Key::NumPadPlus => 0x4E,
        Key::NumPadEnter => 0x1C,
        Key::NumPad1 => 0x4F,
        Key::NumPad2 => 0x50,
        Key::NumPad3 => 0x51,
        Key::NumPad4 => 0x4B,
        Key::NumPad5 => 0x4C,
        Key::NumPad6 => 0x4D,
        Key::NumPad7 => 0x47,
        Key::NumPad8 => 0x48,
        Key::NumPad9 => 0x49,
        Key::NumPad0 => 0x52,
        Key::NumPadDot => 0x53,
        Key::Menu => 0x5D,
        Key::LeftCtrl => 0x1D,
        Key::LeftShift => 0x2A,
        Key::LeftAlt => 0x38,
        Key::LeftSuper => 0x5B,
        Key::RightCtrl => 0x1D,
        Key::RightShift => 0x36,
        Key::RightAlt => 0x38,
        Key::RightSuper => 0x5C,
        _ => return None,
    };
    Some(code)
}

/// Parse a key name from the settings file; `None` hides the binding.
pub fn key_by_name(name: &str) -> Option<Key> {
    let key = match name {
        "A" => Key::A,
        "B" => Key::B,
        "C" => Key::C,
        "D" => Key::D,
        "E" => Key::E,
        "F" => Key::F,
        "G" => Key::G,
        "H" => Key::H,
        "I" => Key::I,
        "J" => Key::J,
        "K" => Key::K,
        "L" => Key::L,
        "M" => Key::M,
        "N" => Key::N,
        "O" => Key::O,
        "P" => Key::P,
        "Q" => Key::Q,
        "R" => Key::R,
        "S" => Key::S,
        "T" => Key::T,
        "U" => Key::U,
        "V" => Key::V,
        "W" => Key::W,
        "X" => Key::X,
        "Y" => Key::Y,
        "Z" => Key::Z,
        "Enter" => Key::Enter,
        "Space" => Key::Space,
        "Tab" => Key::Tab,
        "LeftShift" => Key::LeftShift,
        "RightShift" => Key::RightShift,
        "LeftCtrl" => Key::LeftCtrl,
        "RightCtrl" => Key::RightCtrl,
        _ => return None,
    };
    Some(key)
}

/// Joypad button bound to `key`, if any.
pub fn pad_button(key: Key, mapping: &JoypadMapping) -> Option<PadButton> {
    let pairs = [
        (&mapping.a, PadButton::A),
        (&mapping.b, PadButton::B),
        (&mapping.c, PadButton::C),
        (&mapping.x, PadButton::X),
        (&mapping.y, PadButton::Y),
        (&mapping.z, PadButton::Z),
        (&mapping.start, PadButton::Start),
        (&mapping.mode, PadButton::Mode),
    ];
    pairs
        .into_iter()
        .find(|(name, _)| key_by_name(name.as_str()) == Some(key))
        .map(|(_, button)| button)
}

/// Hat bitmask from the arrow keys currently held.
pub fn hat_state(down: &[Key]) -> u8 {
    let mut dirs = 0u16;
    for key in down {
        dirs |= match key {
            Key::Up => BTN_UP,
            Key::Down => BTN_DOWN,
            Key::Left => BTN_LEFT,
            Key::Right => BTN_RIGHT,
            _ => 0,
        };
    }
    dirs as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_row_translates() {
        assert_eq!(scancode(Key::A), Some(0x1E));
        assert_eq!(scancode(Key::Z), Some(0x2C));
        assert_eq!(scancode(Key::Space), Some(0x39));
    }

    #[test]
    fn f5_shadows_f3() {
        assert_eq!(scancode(Key::F3), scancode(Key::F5));
    }

    #[test]
    fn default_mapping_binds_all_buttons() {
        let mapping = JoypadMapping::default();
        assert_eq!(pad_button(Key::Z, &mapping), Some(PadButton::A));
        assert_eq!(pad_button(Key::Enter, &mapping), Some(PadButton::Start));
        assert_eq!(pad_button(Key::F1, &mapping), None);
    }

    #[test]
    fn hat_combines_arrows() {
        let dirs = hat_state(&[Key::Up, Key::Left, Key::Space]);
        assert_eq!(dirs as u16, BTN_UP | BTN_LEFT);
    }
}
