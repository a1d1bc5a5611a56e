//! Launchpad MK2 wire format.
//!
//! # Note layout (session mode)
//!
//! ```text
//! y=8 (CC 104-112)  104 105 106 107 108 109 110 111 [112]
//! y=0                81  82  83  84  85  86  87  88   89
//! y=1                71  72  73  74  75  76  77  78   79
//! ...
//! y=7                11  12  13  14  15  16  17  18   19
//! ```
//!
//! Grid note = `(8 - y) * 10 + x + 1`: rows count down from the top of the
//! matrix in steps of ten. Notes ending in 0 have no button.

use crate::color::Color;
use crate::error::{Error, Result};
use crate::grid::{Hit, GridPosition, GRID_MAX};
use crate::midi::{MidiMessage, CONTROL_CHANGE, DATA_MAX, NOTE_ON, SYSEX_END};

use super::{decode_scene_button, Protocol, Variant, NOVATION_SYSEX_HEADER, SCENE_CONTROLLER_BASE};

/// Device id bytes (MK2) following the manufacturer id.
const DEVICE_ID: [u8; 2] = [0x02, 0x18];
const CMD_LIGHT_RGB: u8 = 0x0B;
const CMD_LIGHT_ALL: u8 = 0x0E;
const CMD_SCROLL_TEXT: u8 = 0x14;
const CMD_SELECT_LAYOUT: u8 = 0x22;
const LAYOUT_SESSION: u8 = 0x00;
const ROW_STRIDE: u8 = 10;

pub struct Wide;

impl Wide {
    /// Note number for a grid button below the scene row.
    pub fn note(position: GridPosition) -> u8 {
        (GRID_MAX - position.y()) * ROW_STRIDE + position.x() + 1
    }

    /// Address byte used by the RGB SysEx, which reaches scene buttons too.
    fn address(position: GridPosition) -> u8 {
        if position.is_scene_row() {
            SCENE_CONTROLLER_BASE + position.x()
        } else {
            Self::note(position)
        }
    }

    fn sysex(command: u8, payload: &[u8]) -> Vec<u8> {
        let mut message = Vec::with_capacity(NOVATION_SYSEX_HEADER.len() + 4 + payload.len());
        message.extend_from_slice(&NOVATION_SYSEX_HEADER);
        message.extend_from_slice(&DEVICE_ID);
        message.push(command);
        message.extend_from_slice(payload);
        message.push(SYSEX_END);
        message
    }

    fn palette_byte(color: &dyn Color) -> Result<u8> {
        match color.as_bytes().as_slice() {
            &[index] if index <= DATA_MAX => Ok(index),
            &[index] => Err(Error::InvalidColor(format!(
                "palette index {} is not a MIDI data byte",
                index
            ))),
            other => Err(Error::UnsupportedColor {
                variant: Variant::Wide,
                len: other.len(),
            }),
        }
    }
}

impl Protocol for Wide {
    const VARIANT: Variant = Variant::Wide;

    fn light(position: GridPosition, color: &dyn Color) -> Result<Vec<u8>> {
        match color.as_bytes().as_slice() {
            &[_] => {
                let index = Self::palette_byte(color)?;
                if position.is_scene_row() {
                    Ok(vec![CONTROL_CHANGE, Self::address(position), index])
                } else {
                    Ok(vec![NOTE_ON, Self::address(position), index])
                }
            }
            &[red, green, blue] => {
                if [red, green, blue].iter().any(|channel| *channel > DATA_MAX) {
                    return Err(Error::InvalidColor(format!(
                        "rgb ({}, {}, {}) is not made of MIDI data bytes",
                        red, green, blue
                    )));
                }
                Ok(Self::sysex(
                    CMD_LIGHT_RGB,
                    &[Self::address(position), red, green, blue],
                ))
            }
            other => Err(Error::UnsupportedColor {
                variant: Variant::Wide,
                len: other.len(),
            }),
        }
    }

    fn clear() -> Vec<u8> {
        Self::sysex(CMD_LIGHT_ALL, &[0x00])
    }

    fn text_header(color: &dyn Color, looping: bool) -> Result<Vec<u8>> {
        let color = Self::palette_byte(color)?;
        let mut header = NOVATION_SYSEX_HEADER.to_vec();
        header.extend_from_slice(&DEVICE_ID);
        header.extend_from_slice(&[CMD_SCROLL_TEXT, color, u8::from(looping)]);
        Ok(header)
    }

    fn decode_hit(message: &MidiMessage) -> Option<Hit> {
        let (key, down) = match message {
            MidiMessage::ControlChange { .. } => return decode_scene_button(message),
            MidiMessage::NoteOn { key, .. } => (*key, true),
            MidiMessage::NoteOff { key, .. } => (*key, false),
            _ => return None,
        };

        // A key ending in 0 decodes to x = -1: a gap in the matrix, not a button.
        let x = (key % ROW_STRIDE).checked_sub(1)?;
        let row = (key - x) / ROW_STRIDE;
        let y = GRID_MAX.checked_sub(row)?;
        if y == GRID_MAX {
            return None;
        }
        Some(Hit { x, y, down })
    }

    fn session_init() -> Option<Vec<u8>> {
        Some(Self::sysex(CMD_SELECT_LAYOUT, &[LAYOUT_SESSION]))
    }
}
