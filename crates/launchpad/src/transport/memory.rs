//! In-process transport for driving a launchpad without hardware.
//!
//! [`MemoryTransport`] owns both ends: hand [`MemoryTransport::input`] and
//! [`MemoryTransport::output`] to a device, then inject button presses with
//! [`MemoryTransport::send`] and inspect what the device wrote with
//! [`MemoryTransport::sent`].

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{select, unbounded, Receiver, Sender};
use parking_lot::Mutex;

use super::{InputStream, OutputStream};
use crate::error::TransportError;
use crate::midi::MidiMessage;

#[derive(Default)]
struct Faults {
    input_open: Option<String>,
    input_close: Option<String>,
    output_open: Option<String>,
    output_close: Option<String>,
    write: Option<String>,
}

struct Shared {
    inbound_tx: Mutex<Option<Sender<MidiMessage>>>,
    inbound_rx: Receiver<MidiMessage>,
    // dropped on close to wake a blocked receive
    close_tx: Mutex<Option<Sender<()>>>,
    close_rx: Receiver<()>,
    input_open: AtomicBool,
    input_closed: AtomicBool,
    input_opens: AtomicUsize,
    output_open: AtomicBool,
    output_closed: AtomicBool,
    sent: Mutex<Vec<Vec<u8>>>,
    faults: Mutex<Faults>,
}

/// Both ends of a fake launchpad connection.
#[derive(Clone)]
pub struct MemoryTransport {
    shared: Arc<Shared>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = unbounded();
        let (close_tx, close_rx) = unbounded();
        Self {
            shared: Arc::new(Shared {
                inbound_tx: Mutex::new(Some(inbound_tx)),
                inbound_rx,
                close_tx: Mutex::new(Some(close_tx)),
                close_rx,
                input_open: AtomicBool::new(false),
                input_closed: AtomicBool::new(false),
                input_opens: AtomicUsize::new(0),
                output_open: AtomicBool::new(false),
                output_closed: AtomicBool::new(false),
                sent: Mutex::new(Vec::new()),
                faults: Mutex::new(Faults::default()),
            }),
        }
    }

    pub fn input(&self) -> MemoryInput {
        MemoryInput {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn output(&self) -> MemoryOutput {
        MemoryOutput {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Queue a message as if the device had sent it. Returns false once the
    /// stream has ended.
    pub fn send(&self, message: MidiMessage) -> bool {
        match self.shared.inbound_tx.lock().as_ref() {
            Some(tx) => tx.send(message).is_ok(),
            None => false,
        }
    }

    /// Queue raw bytes, parsed the same way a hardware driver would.
    pub fn send_bytes(&self, bytes: &[u8]) -> bool {
        match MidiMessage::parse(bytes) {
            Some(message) => self.send(message),
            None => false,
        }
    }

    /// End the inbound stream after any queued messages are drained.
    pub fn end_of_stream(&self) {
        self.shared.inbound_tx.lock().take();
    }

    /// Every buffer written to the output so far, in order.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.shared.sent.lock().clone()
    }

    pub fn clear_sent(&self) {
        self.shared.sent.lock().clear();
    }

    /// How many times the input stream has been opened.
    pub fn input_open_count(&self) -> usize {
        self.shared.input_opens.load(Ordering::Acquire)
    }

    pub fn is_input_closed(&self) -> bool {
        self.shared.input_closed.load(Ordering::Acquire)
    }

    pub fn is_output_closed(&self) -> bool {
        self.shared.output_closed.load(Ordering::Acquire)
    }

    pub fn fail_input_open(&self, reason: &str) {
        self.shared.faults.lock().input_open = Some(reason.to_string());
    }

    pub fn fail_input_close(&self, reason: &str) {
        self.shared.faults.lock().input_close = Some(reason.to_string());
    }

    pub fn fail_output_open(&self, reason: &str) {
        self.shared.faults.lock().output_open = Some(reason.to_string());
    }

    pub fn fail_output_close(&self, reason: &str) {
        self.shared.faults.lock().output_close = Some(reason.to_string());
    }

    pub fn fail_writes(&self, reason: &str) {
        self.shared.faults.lock().write = Some(reason.to_string());
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Inbound half of a [`MemoryTransport`].
#[derive(Clone)]
pub struct MemoryInput {
    shared: Arc<Shared>,
}

impl InputStream for MemoryInput {
    fn is_open(&self) -> bool {
        self.shared.input_open.load(Ordering::Acquire)
    }

    fn open(&self) -> Result<(), TransportError> {
        if let Some(reason) = self.shared.faults.lock().input_open.clone() {
            return Err(TransportError::Open(reason));
        }
        if self.shared.input_closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }
        self.shared.input_opens.fetch_add(1, Ordering::AcqRel);
        self.shared.input_open.store(true, Ordering::Release);
        Ok(())
    }

    fn receive(&self) -> Result<Option<MidiMessage>, TransportError> {
        if self.shared.input_closed.load(Ordering::Acquire) {
            return Ok(None);
        }
        if !self.is_open() {
            return Err(TransportError::Read("input stream is not open".to_string()));
        }
        select! {
            recv(self.shared.inbound_rx) -> message => Ok(message.ok()),
            recv(self.shared.close_rx) -> _ => Ok(None),
        }
    }

    fn close(&self) -> Result<(), TransportError> {
        if let Some(reason) = self.shared.faults.lock().input_close.clone() {
            return Err(TransportError::Close(reason));
        }
        self.shared.input_open.store(false, Ordering::Release);
        self.shared.input_closed.store(true, Ordering::Release);
        self.shared.close_tx.lock().take();
        Ok(())
    }
}

/// Outbound half of a [`MemoryTransport`].
#[derive(Clone)]
pub struct MemoryOutput {
    shared: Arc<Shared>,
}

impl OutputStream for MemoryOutput {
    fn is_open(&self) -> bool {
        self.shared.output_open.load(Ordering::Acquire)
    }

    fn open(&self) -> Result<(), TransportError> {
        if let Some(reason) = self.shared.faults.lock().output_open.clone() {
            return Err(TransportError::Open(reason));
        }
        if self.shared.output_closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }
        self.shared.output_open.store(true, Ordering::Release);
        Ok(())
    }

    fn write(&self, bytes: &[u8]) -> Result<usize, TransportError> {
        if let Some(reason) = self.shared.faults.lock().write.clone() {
            return Err(TransportError::Write(reason));
        }
        if !self.is_open() {
            return Err(TransportError::Closed);
        }
        self.shared.sent.lock().push(bytes.to_vec());
        Ok(bytes.len())
    }

    fn close(&self) -> Result<(), TransportError> {
        if let Some(reason) = self.shared.faults.lock().output_close.clone() {
            return Err(TransportError::Close(reason));
        }
        self.shared.output_open.store(false, Ordering::Release);
        self.shared.output_closed.store(true, Ordering::Release);
        Ok(())
    }
}
