//! Byte-stream collaborators consumed by the device.
//!
//! The device never discovers or names ports itself. It is handed an input
//! and an output stream and only relies on the narrow capability sets below.

pub mod memory;
#[cfg(feature = "midi-io")]
pub mod midir;

use crate::error::TransportError;
use crate::midi::MidiMessage;

/// Inbound side of a launchpad connection.
pub trait InputStream: Send + Sync {
    fn is_open(&self) -> bool;

    fn open(&self) -> Result<(), TransportError>;

    /// Block until the next message arrives.
    ///
    /// `Ok(None)` means the stream has ended (closed locally or by the
    /// driver) and no further messages will follow.
    fn receive(&self) -> Result<Option<MidiMessage>, TransportError>;

    fn close(&self) -> Result<(), TransportError>;
}

/// Outbound side of a launchpad connection.
///
/// Implementations must accept concurrent `write` calls as independent
/// whole-buffer sends. Nothing above this layer serializes writers.
pub trait OutputStream: Send + Sync {
    fn is_open(&self) -> bool;

    fn open(&self) -> Result<(), TransportError>;

    /// Send one complete buffer, returning the number of bytes written.
    fn write(&self, bytes: &[u8]) -> Result<usize, TransportError>;

    fn close(&self) -> Result<(), TransportError>;
}

/// Open the output on first use, then write the buffer once.
pub fn transmit(output: &dyn OutputStream, bytes: &[u8]) -> Result<usize, TransportError> {
    if !output.is_open() {
        output.open()?;
    }
    let written = output.write(bytes)?;
    tracing::trace!("Sent {} bytes to launchpad", written);
    Ok(written)
}
