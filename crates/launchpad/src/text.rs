//! Scrolling-text message assembly.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::midi::SYSEX_END;
use crate::protocol::clamp_speed;
use crate::transport::{transmit, OutputStream};

/// Accumulates `(speed, text)` segments behind a variant header and sends
/// them as one SysEx message.
///
/// `perform` consumes the builder, so a sealed message cannot be sent twice.
#[must_use = "scrolling text is only sent by `perform`"]
pub struct ScrollingTextBuilder {
    sequence: Vec<u8>,
    output: Arc<dyn OutputStream>,
    non_ascii: bool,
}

impl ScrollingTextBuilder {
    pub(crate) fn new(header: Vec<u8>, output: Arc<dyn OutputStream>) -> Self {
        Self {
            sequence: header,
            output,
            non_ascii: false,
        }
    }

    /// Append one segment. Speeds outside 1..=7 are clamped.
    pub fn add(mut self, speed: u8, text: &str) -> Self {
        self.sequence.push(clamp_speed(speed));
        self.sequence.extend_from_slice(text.as_bytes());
        self.non_ascii |= !text.is_ascii();
        self
    }

    /// Bytes assembled so far, without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.sequence
    }

    /// Seal the message and write it in one call.
    pub fn perform(mut self) -> Result<()> {
        // bytes above 0x7F would break SysEx framing on the wire
        if self.non_ascii {
            return Err(Error::NonAsciiText);
        }
        self.sequence.push(SYSEX_END);
        transmit(self.output.as_ref(), &self.sequence)?;
        Ok(())
    }
}

impl std::fmt::Debug for ScrollingTextBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollingTextBuilder")
            .field("sequence", &self.sequence)
            .finish()
    }
}
