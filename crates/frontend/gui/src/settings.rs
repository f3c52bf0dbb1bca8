//! Persisted frontend settings: window scale and the joypad key bindings.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoypadMapping {
    pub a: String,
    pub b: String,
    pub c: String,
    pub x: String,
    pub y: String,
    pub z: String,
    pub start: String,
    pub mode: String,
}

impl Default for JoypadMapping {
    fn default() -> Self {
        Self {
            a: "Z".to_string(),
            b: "X".to_string(),
            c: "C".to_string(),
            x: "A".to_string(),
            y: "S".to_string(),
            z: "D".to_string(),
            start: "Enter".to_string(),
            mode: "RightShift".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Integer window scale over the native 320×240.
    #[serde(default = "default_scale")]
    pub scale: usize,
    #[serde(default)]
    pub joypad: JoypadMapping,
}

fn default_scale() -> usize {
    2
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            joypad: JoypadMapping::default(),
        }
    }
}

impl Settings {
    fn config_path() -> PathBuf {
        let mut path = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        path.push("pac80emu.json");
        path
    }

    /// Load from the config file next to the binary, defaults on any error.
    pub fn load() -> Self {
        match fs::read_to_string(Self::config_path()) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("settings file unreadable ({}), using defaults", e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(Self::config_path(), contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.scale, 2);
        assert_eq!(s.joypad.a, "Z");
        assert_eq!(s.joypad.mode, "RightShift");
    }

    #[test]
    fn roundtrips_through_json() {
        let s = Settings::default();
        let text = serde_json::to_string(&s).unwrap();
        let back: Settings = serde_json::from_str(&text).unwrap();
        assert_eq!(back.scale, s.scale);
        assert_eq!(back.joypad.z, s.joypad.z);
    }

    #[test]
    fn missing_fields_fall_back() {
        let back: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(back.scale, 2);
        assert_eq!(back.joypad.start, "Enter");
    }
}
