//! Listener registry and the per-device receive loop.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::{Mutex, RwLock};

use crate::error::{Error, Result};
use crate::listener::Listener;
use crate::midi::MidiMessage;
use crate::transport::InputStream;

/// Fans every inbound message out to the registered listeners.
///
/// Registration takes the write lock and dispatch takes the read lock, so a
/// listener blocked inside dispatch also blocks new registrations.
pub struct Dispatcher {
    listeners: RwLock<Vec<Listener>>,
    listening: Mutex<bool>,
    receiving: AtomicBool,
    loops_started: AtomicUsize,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            listening: Mutex::new(false),
            receiving: AtomicBool::new(false),
            loops_started: AtomicUsize::new(0),
        }
    }

    /// Append a listener. There is no way to remove one.
    pub fn add_listener(&self, listener: Listener) {
        self.listeners.write().push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Run every listener on `message`, synchronously and in registration order.
    pub fn dispatch(&self, message: &MidiMessage) {
        let listeners = self.listeners.read();
        tracing::trace!("Dispatching {:?} to {} listeners", message, listeners.len());
        for listener in listeners.iter() {
            listener(message);
        }
    }

    /// Start the receive loop on first call; later calls do nothing.
    ///
    /// Opens `input` if needed. An open failure is returned unchanged and
    /// leaves the dispatcher idle, so a later call may retry.
    pub fn ensure_listening(self: &Arc<Self>, input: Arc<dyn InputStream>) -> Result<()> {
        let mut listening = self.listening.lock();
        if *listening {
            return Ok(());
        }

        if !input.is_open() {
            input.open()?;
        }
        self.spawn_receive_loop(input)?;
        *listening = true;
        Ok(())
    }

    /// Register `listener` and make sure the receive loop runs.
    ///
    /// On first use the listener is only kept once the loop has started, so
    /// a failed open leaves the registry as it was. It is registered before
    /// the loop spawns and therefore sees the first message.
    pub fn listen(self: &Arc<Self>, listener: Listener, input: Arc<dyn InputStream>) -> Result<()> {
        let mut listening = self.listening.lock();
        if *listening {
            drop(listening);
            self.add_listener(listener);
            return Ok(());
        }

        if !input.is_open() {
            input.open()?;
        }
        let index = {
            let mut listeners = self.listeners.write();
            listeners.push(listener);
            listeners.len() - 1
        };
        if let Err(e) = self.spawn_receive_loop(input) {
            self.listeners.write().remove(index);
            return Err(e);
        }
        *listening = true;
        Ok(())
    }

    fn spawn_receive_loop(self: &Arc<Self>, input: Arc<dyn InputStream>) -> Result<()> {
        let dispatcher = Arc::clone(self);
        self.receiving.store(true, Ordering::Release);
        let spawned = thread::Builder::new()
            .name("launchpad-rx".to_string())
            .spawn(move || dispatcher.receive_loop(input.as_ref()));
        if let Err(e) = spawned {
            self.receiving.store(false, Ordering::Release);
            return Err(Error::Spawn(e));
        }

        self.loops_started.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// True once the receive loop has been started, even after it ended.
    pub fn is_listening(&self) -> bool {
        *self.listening.lock()
    }

    /// True while the receive loop is running.
    pub fn is_receiving(&self) -> bool {
        self.receiving.load(Ordering::Acquire)
    }

    pub(crate) fn loops_started(&self) -> usize {
        self.loops_started.load(Ordering::Acquire)
    }

    fn receive_loop(&self, input: &dyn InputStream) {
        tracing::debug!("Launchpad receive loop started");
        loop {
            match input.receive() {
                Ok(Some(message)) => self.dispatch(&message),
                Ok(None) => {
                    tracing::debug!("Launchpad input stream ended");
                    break;
                }
                Err(e) => {
                    tracing::warn!("Launchpad input stream failed: {}", e);
                    break;
                }
            }
        }
        self.receiving.store(false, Ordering::Release);
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("listeners", &self.listener_count())
            .field("receiving", &self.is_receiving())
            .finish()
    }
}
