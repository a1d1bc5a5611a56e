//! Lightable colors.
//!
//! A color only knows how to turn itself into bytes. The codec looks at the
//! length of [`Color::as_bytes`] to pick a message shape: one byte goes out as
//! a note-on velocity or control-change value, three bytes go out as an RGB
//! system-exclusive message. Any new color type must keep to those lengths.

use std::fmt::Debug;

use crate::error::{Error, Result};

/// Anything that can be sent to a pad as a color.
pub trait Color: Debug + Send + Sync {
    /// 1 byte for palette colors, 3 bytes (red, green, blue) for RGB colors.
    fn as_bytes(&self) -> Vec<u8>;
}

/// Common indices from the wide-variant (MK2) 128 entry palette.
pub mod palette {
    use super::PaletteColor;

    pub const OFF: PaletteColor = PaletteColor(0);
    pub const DARK_GRAY: PaletteColor = PaletteColor(1);
    pub const LIGHT_GRAY: PaletteColor = PaletteColor(2);
    pub const WHITE: PaletteColor = PaletteColor(3);
    pub const RED: PaletteColor = PaletteColor(5);
    pub const RED_DIM: PaletteColor = PaletteColor(7);
    pub const ORANGE: PaletteColor = PaletteColor(9);
    pub const YELLOW: PaletteColor = PaletteColor(13);
    pub const GREEN: PaletteColor = PaletteColor(21);
    pub const GREEN_DIM: PaletteColor = PaletteColor(23);
    pub const CYAN: PaletteColor = PaletteColor(37);
    pub const BLUE: PaletteColor = PaletteColor(45);
    pub const PURPLE: PaletteColor = PaletteColor(49);
    pub const MAGENTA: PaletteColor = PaletteColor(53);
    pub const PINK: PaletteColor = PaletteColor(57);
}

/// Narrow-variant (Launchpad S) color: a green and a red LED, each 0-3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NarrowColor {
    green: u8,
    red: u8,
}

impl NarrowColor {
    pub const MAX_LEVEL: u8 = 3;

    pub const OFF: NarrowColor = NarrowColor { green: 0, red: 0 };
    pub const RED: NarrowColor = NarrowColor { green: 0, red: 3 };
    pub const GREEN: NarrowColor = NarrowColor { green: 3, red: 0 };
    pub const AMBER: NarrowColor = NarrowColor { green: 3, red: 3 };
    pub const YELLOW: NarrowColor = NarrowColor { green: 2, red: 2 };

    pub fn new(green: u8, red: u8) -> Result<Self> {
        if green > Self::MAX_LEVEL || red > Self::MAX_LEVEL {
            return Err(Error::InvalidColor(format!(
                "green {} / red {} must both be within 0..={}",
                green,
                red,
                Self::MAX_LEVEL
            )));
        }
        Ok(Self { green, red })
    }

    pub fn green(&self) -> u8 {
        self.green
    }

    pub fn red(&self) -> u8 {
        self.red
    }

    /// Velocity byte: green in the upper nibble, red in the lower bits, plus
    /// the copy (8) and clear (4) flags.
    pub fn velocity(&self) -> u8 {
        16 * self.green + self.red + 8 + 4
    }
}

impl Color for NarrowColor {
    fn as_bytes(&self) -> Vec<u8> {
        vec![self.velocity()]
    }
}

/// Wide-variant palette color, index 0-127.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PaletteColor(u8);

impl PaletteColor {
    pub const MAX_INDEX: u8 = 127;

    pub fn new(index: u8) -> Result<Self> {
        if index > Self::MAX_INDEX {
            return Err(Error::InvalidColor(format!(
                "palette index {} exceeds {}",
                index,
                Self::MAX_INDEX
            )));
        }
        Ok(Self(index))
    }

    pub fn index(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for PaletteColor {
    type Error = Error;

    fn try_from(index: u8) -> Result<Self> {
        Self::new(index)
    }
}

impl Color for PaletteColor {
    fn as_bytes(&self) -> Vec<u8> {
        vec![self.0]
    }
}

/// Wide-variant RGB color, each channel 0-63.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RgbColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl RgbColor {
    pub const MAX_CHANNEL: u8 = 63;

    pub fn new(red: u8, green: u8, blue: u8) -> Result<Self> {
        if red > Self::MAX_CHANNEL || green > Self::MAX_CHANNEL || blue > Self::MAX_CHANNEL {
            return Err(Error::InvalidColor(format!(
                "rgb ({}, {}, {}) channels must be within 0..={}",
                red,
                green,
                blue,
                Self::MAX_CHANNEL
            )));
        }
        Ok(Self { red, green, blue })
    }

    pub fn red(&self) -> u8 {
        self.red
    }

    pub fn green(&self) -> u8 {
        self.green
    }

    pub fn blue(&self) -> u8 {
        self.blue
    }
}

impl Color for RgbColor {
    fn as_bytes(&self) -> Vec<u8> {
        vec![self.red, self.green, self.blue]
    }
}
