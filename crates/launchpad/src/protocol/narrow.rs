//! Launchpad S / Mini wire format.
//!
//! # Note layout
//!
//! ```text
//! y=8 (CC 104-112)   104 105 106 107 108 109 110 111 [112]
//! y=7                112 113 114 115 116 117 118 119  120
//! ...
//! y=1                 16  17  18  19  20  21  22  23   24
//! y=0                  0   1   2   3   4   5   6   7    8
//! ```
//!
//! Grid note = `x + 16 * y`. The column at x = 8 holds the round buttons on
//! the right edge. Colors are a single velocity byte, see
//! [`NarrowColor::velocity`](crate::color::NarrowColor::velocity).

use crate::color::Color;
use crate::error::{Error, Result};
use crate::grid::{GridPosition, Hit, GRID_MAX};
use crate::midi::{MidiMessage, CONTROL_CHANGE, DATA_MAX, NOTE_ON};

use super::{decode_scene_button, Protocol, Variant, NOVATION_SYSEX_HEADER, SCENE_CONTROLLER_BASE};

/// Device id byte following the manufacturer id in scroll-text SysEx.
const TEXT_DEVICE_ID: u8 = 0x09;
/// Added to the color byte to make the text loop.
const LOOP_FLAG: u8 = 64;
/// Width of one note row.
const ROW_STRIDE: u8 = 16;

pub struct Narrow;

impl Narrow {
    /// Note number for a grid button below the scene row.
    pub fn note(position: GridPosition) -> u8 {
        position.x() + ROW_STRIDE * position.y()
    }

    fn color_byte(color: &dyn Color) -> Result<u8> {
        match color.as_bytes().as_slice() {
            &[velocity] if velocity <= DATA_MAX => Ok(velocity),
            &[velocity] => Err(Error::InvalidColor(format!(
                "velocity {} is not a MIDI data byte",
                velocity
            ))),
            other => Err(Error::UnsupportedColor {
                variant: Variant::Narrow,
                len: other.len(),
            }),
        }
    }
}

impl Protocol for Narrow {
    const VARIANT: Variant = Variant::Narrow;

    fn light(position: GridPosition, color: &dyn Color) -> Result<Vec<u8>> {
        let velocity = Self::color_byte(color)?;
        if position.is_scene_row() {
            Ok(vec![
                CONTROL_CHANGE,
                SCENE_CONTROLLER_BASE + position.x(),
                velocity,
            ])
        } else {
            Ok(vec![NOTE_ON, Self::note(position), velocity])
        }
    }

    fn clear() -> Vec<u8> {
        vec![CONTROL_CHANGE, 0x00, 0x00]
    }

    fn text_header(color: &dyn Color, looping: bool) -> Result<Vec<u8>> {
        let mut color = Self::color_byte(color)?;
        if looping {
            if color >= LOOP_FLAG {
                return Err(Error::InvalidColor(format!(
                    "color byte {} leaves no room for the loop flag",
                    color
                )));
            }
            color += LOOP_FLAG;
        }
        let mut header = NOVATION_SYSEX_HEADER.to_vec();
        header.extend_from_slice(&[TEXT_DEVICE_ID, color]);
        Ok(header)
    }

    fn decode_hit(message: &MidiMessage) -> Option<Hit> {
        let (key, down) = match message {
            MidiMessage::ControlChange { .. } => return decode_scene_button(message),
            MidiMessage::NoteOn { key, .. } => (*key, true),
            MidiMessage::NoteOff { key, .. } => (*key, false),
            _ => return None,
        };

        let x = key % ROW_STRIDE;
        let y = (key - x) / ROW_STRIDE;
        if x > GRID_MAX {
            return None;
        }
        Some(Hit { x, y, down })
    }
}
