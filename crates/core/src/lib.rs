//! Core emulation primitives shared by the machine and the frontends:
//! the 8080 CPU interpreter, the PSG kernel, and the frame type.

pub mod cpu_8080;
pub mod psg;

pub mod types {
    use serde::{Deserialize, Serialize};

    /// An ARGB8888 framebuffer handed from the machine to the window backend.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Frame {
        pub width: u32,
        pub height: u32,
        pub pixels: Vec<u32>,
    }

    impl Frame {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                pixels: vec![0; (width * height) as usize],
            }
        }
    }

    pub type AudioSample = i16;
}

#[cfg(test)]
mod tests {
    use super::types::Frame;

    #[test]
    fn frame_initialization() {
        let f = Frame::new(320, 240);
        assert_eq!(f.pixels.len(), 320 * 240);
        assert_eq!(f.width, 320);
        assert_eq!(f.height, 240);
    }
}
