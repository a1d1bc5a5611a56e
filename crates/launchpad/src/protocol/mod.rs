//! Wire codecs for the two launchpad families.
//!
//! Each family gets a unit type implementing [`Protocol`]; the device façade
//! is generic over it so both share one dispatcher and one transmit path.

mod narrow;
mod wide;

pub use narrow::Narrow;
pub use wide::Wide;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::config::LaunchpadConfig;
use crate::error::Result;
use crate::grid::{GridPosition, Hit};
use crate::midi::MidiMessage;

/// Novation manufacturer id that opens every launchpad SysEx message.
pub const NOVATION_SYSEX_HEADER: [u8; 4] = [0xF0, 0x00, 0x20, 0x29];

/// First controller number of the round scene buttons (x = 0).
pub const SCENE_CONTROLLER_BASE: u8 = 104;
/// Last controller number treated as a scene button (x = 8).
pub const SCENE_CONTROLLER_LAST: u8 = 112;
/// Control-change value reporting a pressed scene button.
pub const SCENE_PRESSED: u8 = 127;
/// Control-change value the device sends when a looping text cycle ends.
pub const TEXT_END_MARKER: u8 = 3;

/// Scroll speeds outside this range are clamped, not rejected.
pub const MIN_TEXT_SPEED: u8 = 1;
pub const MAX_TEXT_SPEED: u8 = 7;

/// Hardware family tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// Launchpad S / Mini: red-green LEDs, 16-wide note layout.
    Narrow,
    /// Launchpad MK2: RGB LEDs, row-inverted decimal note layout.
    Wide,
}

impl Variant {
    /// Pick the family from a MIDI port name. The wide keyword wins when a
    /// name happens to contain both.
    pub fn detect(port_name: &str, config: &LaunchpadConfig) -> Option<Self> {
        if port_name.contains(&config.wide_port_keyword) {
            Some(Variant::Wide)
        } else if port_name.contains(&config.narrow_port_keyword) {
            Some(Variant::Narrow)
        } else {
            None
        }
    }
}

/// Encoding and decoding rules for one hardware family.
pub trait Protocol: Send + Sync + 'static {
    const VARIANT: Variant;

    /// Message lighting one button.
    fn light(position: GridPosition, color: &dyn Color) -> Result<Vec<u8>>;

    /// Message turning every LED off.
    fn clear() -> Vec<u8>;

    /// Opening bytes of a scroll-text SysEx, up to and excluding the first
    /// text segment.
    fn text_header(color: &dyn Color, looping: bool) -> Result<Vec<u8>>;

    /// Decode a button transition. Returns `None` for messages that are not
    /// hits, and for notes that map outside the grid.
    fn decode_hit(message: &MidiMessage) -> Option<Hit>;

    /// One-time setup message sent when the device is selected.
    fn session_init() -> Option<Vec<u8>> {
        None
    }

    fn is_text_end_marker(message: &MidiMessage) -> bool {
        matches!(
            message,
            MidiMessage::ControlChange { value, .. } if *value == TEXT_END_MARKER
        )
    }
}

/// Scene buttons share one control-change encoding across both families.
pub(crate) fn decode_scene_button(message: &MidiMessage) -> Option<Hit> {
    match message {
        MidiMessage::ControlChange {
            controller, value, ..
        } if (SCENE_CONTROLLER_BASE..=SCENE_CONTROLLER_LAST).contains(controller) => Some(Hit {
            x: controller - SCENE_CONTROLLER_BASE,
            y: crate::grid::SCENE_ROW,
            down: *value == SCENE_PRESSED,
        }),
        _ => None,
    }
}

pub(crate) fn clamp_speed(speed: u8) -> u8 {
    speed.clamp(MIN_TEXT_SPEED, MAX_TEXT_SPEED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_variant() {
        let config = LaunchpadConfig::default();
        assert_eq!(
            Variant::detect("Launchpad MK2 MIDI 1", &config),
            Some(Variant::Wide)
        );
        assert_eq!(
            Variant::detect("20:0 Launchpad S", &config),
            Some(Variant::Narrow)
        );
        assert_eq!(Variant::detect("Ableton Push 2", &config), None);
    }

    #[test]
    fn test_speed_clamp() {
        assert_eq!(clamp_speed(0), 1);
        assert_eq!(clamp_speed(4), 4);
        assert_eq!(clamp_speed(8), 7);
        assert_eq!(clamp_speed(255), 7);
    }

    #[test]
    fn test_end_marker_is_any_cc_value_three() {
        assert!(Narrow::is_text_end_marker(&MidiMessage::control_change(0, 3)));
        assert!(Wide::is_text_end_marker(&MidiMessage::ControlChange {
            channel: 4,
            controller: 17,
            value: 3
        }));
        assert!(!Wide::is_text_end_marker(&MidiMessage::control_change(0, 4)));
        assert!(!Narrow::is_text_end_marker(&MidiMessage::note_on(3, 3)));
    }

    #[test]
    fn test_scene_button_decode() {
        for controller in SCENE_CONTROLLER_BASE..=SCENE_CONTROLLER_LAST {
            let hit = decode_scene_button(&MidiMessage::control_change(controller, 127)).unwrap();
            assert_eq!(hit.x, controller - 104);
            assert_eq!(hit.y, 8);
            assert!(hit.down);
        }
        let release = decode_scene_button(&MidiMessage::control_change(104, 0)).unwrap();
        assert!(!release.down);
        assert_eq!(decode_scene_button(&MidiMessage::control_change(103, 127)), None);
        assert_eq!(decode_scene_button(&MidiMessage::control_change(113, 127)), None);
    }
}
