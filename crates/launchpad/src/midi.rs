//! Typed MIDI messages exchanged with the transport.

/// Status byte for a note-on on channel 1.
pub const NOTE_ON: u8 = 0x90;
/// Status byte for a note-off on channel 1.
pub const NOTE_OFF: u8 = 0x80;
/// Status byte for a control change on channel 1.
pub const CONTROL_CHANGE: u8 = 0xB0;
/// Largest value a data byte may carry.
pub const DATA_MAX: u8 = 0x7F;
/// System-exclusive start marker.
pub const SYSEX_START: u8 = 0xF0;
/// System-exclusive end marker.
pub const SYSEX_END: u8 = 0xF7;

/// MIDI message types the launchpads send and receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// Complete system-exclusive frame, including the F0/F7 markers.
    SysEx(Vec<u8>),
    /// Anything else, kept verbatim.
    Other(Vec<u8>),
}

impl MidiMessage {
    pub fn note_on(key: u8, velocity: u8) -> Self {
        Self::NoteOn {
            channel: 0,
            key,
            velocity,
        }
    }

    pub fn note_off(key: u8) -> Self {
        Self::NoteOff {
            channel: 0,
            key,
            velocity: 0,
        }
    }

    pub fn control_change(controller: u8, value: u8) -> Self {
        Self::ControlChange {
            channel: 0,
            controller,
            value,
        }
    }

    /// Parse one raw message as delivered by the driver.
    ///
    /// A note-on with velocity 0 is reported as a note-off: the launchpads
    /// signal button releases that way. Returns `None` for an empty buffer.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let status = *bytes.first()?;
        let message = match (status & 0xF0, bytes) {
            (0x90, &[_, key, 0, ..]) => Self::NoteOff {
                channel: status & 0x0F,
                key,
                velocity: 0,
            },
            (0x90, &[_, key, velocity, ..]) => Self::NoteOn {
                channel: status & 0x0F,
                key,
                velocity,
            },
            (0x80, &[_, key, velocity, ..]) => Self::NoteOff {
                channel: status & 0x0F,
                key,
                velocity,
            },
            (0xB0, &[_, controller, value, ..]) => Self::ControlChange {
                channel: status & 0x0F,
                controller,
                value,
            },
            _ if status == SYSEX_START => Self::SysEx(bytes.to_vec()),
            _ => Self::Other(bytes.to_vec()),
        };
        Some(message)
    }

    /// Raw wire form of this message.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::NoteOn {
                channel,
                key,
                velocity,
            } => vec![NOTE_ON | (channel & 0x0F), *key, *velocity],
            Self::NoteOff {
                channel,
                key,
                velocity,
            } => vec![NOTE_OFF | (channel & 0x0F), *key, *velocity],
            Self::ControlChange {
                channel,
                controller,
                value,
            } => vec![CONTROL_CHANGE | (channel & 0x0F), *controller, *value],
            Self::SysEx(bytes) | Self::Other(bytes) => bytes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_channel_messages() {
        assert_eq!(
            MidiMessage::parse(&[0x90, 0x10, 0x7F]),
            Some(MidiMessage::note_on(0x10, 0x7F))
        );
        assert_eq!(
            MidiMessage::parse(&[0x80, 0x10, 0x00]),
            Some(MidiMessage::note_off(0x10))
        );
        assert_eq!(
            MidiMessage::parse(&[0xB1, 104, 127]),
            Some(MidiMessage::ControlChange {
                channel: 1,
                controller: 104,
                value: 127
            })
        );
    }

    #[test]
    fn test_zero_velocity_note_on_is_release() {
        assert_eq!(
            MidiMessage::parse(&[0x90, 0x22, 0x00]),
            Some(MidiMessage::note_off(0x22))
        );
    }

    #[test]
    fn test_parse_sysex_and_other() {
        let sysex = [0xF0, 0x00, 0x20, 0x29, 0x02, 0x18, 0x0E, 0x00, 0xF7];
        assert_eq!(
            MidiMessage::parse(&sysex),
            Some(MidiMessage::SysEx(sysex.to_vec()))
        );
        assert_eq!(
            MidiMessage::parse(&[0xF8]),
            Some(MidiMessage::Other(vec![0xF8]))
        );
        // truncated note-on is kept verbatim rather than guessed at
        assert_eq!(
            MidiMessage::parse(&[0x90, 0x01]),
            Some(MidiMessage::Other(vec![0x90, 0x01]))
        );
        assert_eq!(MidiMessage::parse(&[]), None);
    }

    #[test]
    fn test_to_bytes_keeps_channel() {
        let message = MidiMessage::ControlChange {
            channel: 2,
            controller: 0,
            value: 3,
        };
        assert_eq!(message.to_bytes(), vec![0xB2, 0x00, 0x03]);
    }
}
