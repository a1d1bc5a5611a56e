//! Hardware streams backed by midir.

use std::mem;

use crossbeam_channel::{unbounded, Receiver, Sender};
use midir::{
    MidiInput, MidiInputConnection, MidiInputPort, MidiOutput, MidiOutputConnection,
    MidiOutputPort,
};
use parking_lot::Mutex;

use super::{InputStream, OutputStream};
use crate::error::TransportError;
use crate::midi::MidiMessage;

enum InputState {
    Idle(MidiInput),
    Connected(MidiInputConnection<Sender<MidiMessage>>),
    // closed for good, or mid-swap under the lock
    Gone,
}

/// Input stream reading one midir port.
///
/// The midir callback parses each packet and forwards it through a channel;
/// [`InputStream::receive`] blocks on that channel. Closing drops the
/// connection, which disconnects the channel and ends the stream. A closed
/// stream cannot be reopened.
pub struct MidirInput {
    port: MidiInputPort,
    port_name: String,
    state: Mutex<InputState>,
    messages: Mutex<Option<Receiver<MidiMessage>>>,
}

impl MidirInput {
    pub fn new(midi_in: MidiInput, port: MidiInputPort, port_name: String) -> Self {
        Self {
            port,
            port_name,
            state: Mutex::new(InputState::Idle(midi_in)),
            messages: Mutex::new(None),
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl InputStream for MidirInput {
    fn is_open(&self) -> bool {
        matches!(*self.state.lock(), InputState::Connected(_))
    }

    fn open(&self) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        let midi_in = match mem::replace(&mut *state, InputState::Gone) {
            InputState::Idle(midi_in) => midi_in,
            InputState::Connected(connection) => {
                *state = InputState::Connected(connection);
                return Ok(());
            }
            InputState::Gone => return Err(TransportError::Closed),
        };

        let (tx, rx) = unbounded();
        let connection = match midi_in.connect(
            &self.port,
            "launchpad-input",
            |_timestamp, bytes, tx: &mut Sender<MidiMessage>| {
                if let Some(message) = MidiMessage::parse(bytes) {
                    let _ = tx.send(message);
                }
            },
            tx,
        ) {
            Ok(connection) => connection,
            Err(e) => {
                let reason = e.to_string();
                *state = InputState::Idle(e.into_inner());
                return Err(TransportError::Open(reason));
            }
        };

        *state = InputState::Connected(connection);
        *self.messages.lock() = Some(rx);
        tracing::debug!("Opened MIDI input {}", self.port_name);
        Ok(())
    }

    fn receive(&self) -> Result<Option<MidiMessage>, TransportError> {
        // clone out of the lock so close() is never blocked by a waiting reader
        let messages = match self.messages.lock().as_ref() {
            Some(rx) => rx.clone(),
            None => return Err(TransportError::Read("input port is not open".to_string())),
        };
        Ok(messages.recv().ok())
    }

    fn close(&self) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if let InputState::Connected(connection) = mem::replace(&mut *state, InputState::Gone) {
            // dropping the sender ends the stream for any blocked receive
            drop(connection.close());
            tracing::debug!("Closed MIDI input {}", self.port_name);
        }
        Ok(())
    }
}

enum OutputState {
    Idle(MidiOutput),
    Connected(MidiOutputConnection),
    Gone,
}

/// Output stream writing to one midir port. A closed stream cannot be
/// reopened.
pub struct MidirOutput {
    port: MidiOutputPort,
    port_name: String,
    state: Mutex<OutputState>,
}

impl MidirOutput {
    pub fn new(midi_out: MidiOutput, port: MidiOutputPort, port_name: String) -> Self {
        Self {
            port,
            port_name,
            state: Mutex::new(OutputState::Idle(midi_out)),
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl OutputStream for MidirOutput {
    fn is_open(&self) -> bool {
        matches!(*self.state.lock(), OutputState::Connected(_))
    }

    fn open(&self) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        let midi_out = match mem::replace(&mut *state, OutputState::Gone) {
            OutputState::Idle(midi_out) => midi_out,
            OutputState::Connected(connection) => {
                *state = OutputState::Connected(connection);
                return Ok(());
            }
            OutputState::Gone => return Err(TransportError::Closed),
        };

        let connection = match midi_out.connect(&self.port, "launchpad-output") {
            Ok(connection) => connection,
            Err(e) => {
                let reason = e.to_string();
                *state = OutputState::Idle(e.into_inner());
                return Err(TransportError::Open(reason));
            }
        };
        *state = OutputState::Connected(connection);
        tracing::debug!("Opened MIDI output {}", self.port_name);
        Ok(())
    }

    fn write(&self, bytes: &[u8]) -> Result<usize, TransportError> {
        match &mut *self.state.lock() {
            OutputState::Connected(connection) => {
                connection.send(bytes)?;
                Ok(bytes.len())
            }
            _ => Err(TransportError::Closed),
        }
    }

    fn close(&self) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if let OutputState::Connected(connection) = mem::replace(&mut *state, OutputState::Gone) {
            drop(connection.close());
            tracing::debug!("Closed MIDI output {}", self.port_name);
        }
        Ok(())
    }
}
