//! The launchpad façade.
//!
//! [`Launchpad`] owns one input stream, one output stream and a
//! [`Dispatcher`]. Everything that differs between hardware families lives in
//! the [`Protocol`] type parameter. [`GridController`] is the object-safe view
//! for code that only learns the family at runtime.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

use crate::color::Color;
use crate::config::LaunchpadConfig;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result, TransportError};
use crate::grid::{GridPosition, Hit};
use crate::listener::{end_marker_listener, hit_listener, ChannelSink, Listener, ScrollTextEnded};
use crate::protocol::{Narrow, Protocol, Variant, Wide};
use crate::text::ScrollingTextBuilder;
use crate::transport::{transmit, InputStream, OutputStream};

pub type NarrowLaunchpad = Launchpad<Narrow>;
pub type WideLaunchpad = Launchpad<Wide>;

/// A connected launchpad of family `P`.
///
/// Outgoing calls write straight to the output stream and may run
/// concurrently; nothing here serializes writers. Listening starts the
/// receive loop on first use.
pub struct Launchpad<P: Protocol> {
    input: Arc<dyn InputStream>,
    output: Arc<dyn OutputStream>,
    dispatcher: Arc<Dispatcher>,
    // dropped on close; every channel sink watches the receiver
    shutdown: Mutex<Option<Sender<()>>>,
    shutdown_rx: Receiver<()>,
    hit_capacity: usize,
    marker_capacity: usize,
    closed: AtomicBool,
    protocol: PhantomData<fn() -> P>,
}

impl<P: Protocol> Launchpad<P> {
    pub fn new(input: Arc<dyn InputStream>, output: Arc<dyn OutputStream>) -> Self {
        Self::with_config(input, output, &LaunchpadConfig::default())
    }

    /// Build a device using the channel capacities from `config`.
    pub fn with_config(
        input: Arc<dyn InputStream>,
        output: Arc<dyn OutputStream>,
        config: &LaunchpadConfig,
    ) -> Self {
        let (shutdown, shutdown_rx) = unbounded();
        Self {
            input,
            output,
            dispatcher: Arc::new(Dispatcher::new()),
            shutdown: Mutex::new(Some(shutdown)),
            shutdown_rx,
            hit_capacity: config.hit_channel_capacity,
            marker_capacity: config.marker_channel_capacity,
            closed: AtomicBool::new(false),
            protocol: PhantomData,
        }
    }

    pub fn variant(&self) -> Variant {
        P::VARIANT
    }

    /// Light the button at `(x, y)`. Coordinates outside `[0, 8]` are rejected.
    pub fn light(&self, x: u8, y: u8, color: &dyn Color) -> Result<()> {
        self.light_position(GridPosition::new(x, y)?, color)
    }

    pub fn light_position(&self, position: GridPosition, color: &dyn Color) -> Result<()> {
        let message = P::light(position, color)?;
        self.send(&message)
    }

    /// Turn every LED off.
    pub fn clear(&self) -> Result<()> {
        self.send(&P::clear())
    }

    /// Start a scroll-text message shown once.
    pub fn text(&self, color: &dyn Color) -> Result<ScrollingTextBuilder> {
        self.text_builder(color, false)
    }

    /// Start a scroll-text message that repeats until replaced. The device
    /// reports each finished cycle, see
    /// [`listen_to_scroll_text_end_marker`](Self::listen_to_scroll_text_end_marker).
    pub fn text_loop(&self, color: &dyn Color) -> Result<ScrollingTextBuilder> {
        self.text_builder(color, true)
    }

    /// Channel of button presses and releases.
    ///
    /// With the default capacity of 0 the receive loop waits for each hit to
    /// be taken, so a consumer that stops reading stalls every listener of
    /// this device.
    pub fn listen_to_hits(&self) -> Result<Receiver<Hit>> {
        self.ensure_not_closed()?;
        let (sink, hits) = ChannelSink::new(self.hit_capacity, self.shutdown_rx.clone());
        self.add_listener(hit_listener::<P, _>(sink))?;
        Ok(hits)
    }

    /// Channel signalled each time a looping scroll text completes a cycle.
    pub fn listen_to_scroll_text_end_marker(&self) -> Result<Receiver<ScrollTextEnded>> {
        self.ensure_not_closed()?;
        let (sink, markers) = ChannelSink::new(self.marker_capacity, self.shutdown_rx.clone());
        self.add_listener(end_marker_listener::<P, _>(sink))?;
        Ok(markers)
    }

    /// Register a raw message handler and make sure the receive loop runs.
    ///
    /// If the input fails to open nothing is registered and the error is
    /// returned; a later call retries.
    pub fn add_listener(&self, listener: Listener) -> Result<()> {
        self.ensure_not_closed()?;
        self.dispatcher.listen(listener, Arc::clone(&self.input))
    }

    /// Send the family's one-time setup message, if it has one.
    pub fn enter_session(&self) -> Result<()> {
        match P::session_init() {
            Some(message) => self.send(&message),
            None => Ok(()),
        }
    }

    /// Close both streams. Every later call on this device fails with
    /// [`TransportError::Closed`].
    ///
    /// Hit and marker deliveries still waiting for a consumer are abandoned.
    /// Both streams are always closed; if either fails the error lists every
    /// failure.
    pub fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        self.shutdown.lock().take();

        let mut failures = Vec::new();
        if let Err(e) = self.input.close() {
            failures.push(format!("input: {}", e));
        }
        if let Err(e) = self.output.close() {
            failures.push(format!("output: {}", e));
        }

        if failures.is_empty() {
            tracing::debug!("Closed {:?} launchpad", P::VARIANT);
            Ok(())
        } else {
            Err(Error::Close(failures))
        }
    }

    pub fn output(&self) -> Arc<dyn OutputStream> {
        Arc::clone(&self.output)
    }

    pub fn input(&self) -> Arc<dyn InputStream> {
        Arc::clone(&self.input)
    }

    /// True once a listener has started the receive loop.
    pub fn is_listening(&self) -> bool {
        self.dispatcher.is_listening()
    }

    /// True while the receive loop is running.
    pub fn is_receiving(&self) -> bool {
        self.dispatcher.is_receiving()
    }

    pub fn listener_count(&self) -> usize {
        self.dispatcher.listener_count()
    }

    fn text_builder(&self, color: &dyn Color, looping: bool) -> Result<ScrollingTextBuilder> {
        self.ensure_not_closed()?;
        let header = P::text_header(color, looping)?;
        Ok(ScrollingTextBuilder::new(header, Arc::clone(&self.output)))
    }

    fn send(&self, message: &[u8]) -> Result<()> {
        self.ensure_not_closed()?;
        transmit(self.output.as_ref(), message)?;
        Ok(())
    }

    fn ensure_not_closed(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Transport(TransportError::Closed));
        }
        Ok(())
    }
}

impl<P: Protocol> std::fmt::Debug for Launchpad<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Launchpad")
            .field("variant", &P::VARIANT)
            .field("dispatcher", &self.dispatcher)
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish()
    }
}

/// Uniform operations over either launchpad family.
pub trait GridController: Send + Sync {
    fn variant(&self) -> Variant;

    fn light(&self, x: u8, y: u8, color: &dyn Color) -> Result<()>;

    fn clear(&self) -> Result<()>;

    fn text(&self, color: &dyn Color) -> Result<ScrollingTextBuilder>;

    fn text_loop(&self, color: &dyn Color) -> Result<ScrollingTextBuilder>;

    fn listen_to_hits(&self) -> Result<Receiver<Hit>>;

    fn listen_to_scroll_text_end_marker(&self) -> Result<Receiver<ScrollTextEnded>>;

    fn enter_session(&self) -> Result<()>;

    fn close(&self) -> Result<()>;

    fn output(&self) -> Arc<dyn OutputStream>;

    fn input(&self) -> Arc<dyn InputStream>;

    fn is_receiving(&self) -> bool;
}

impl<P: Protocol> GridController for Launchpad<P> {
    fn variant(&self) -> Variant {
        Launchpad::variant(self)
    }

    fn light(&self, x: u8, y: u8, color: &dyn Color) -> Result<()> {
        Launchpad::light(self, x, y, color)
    }

    fn clear(&self) -> Result<()> {
        Launchpad::clear(self)
    }

    fn text(&self, color: &dyn Color) -> Result<ScrollingTextBuilder> {
        Launchpad::text(self, color)
    }

    fn text_loop(&self, color: &dyn Color) -> Result<ScrollingTextBuilder> {
        Launchpad::text_loop(self, color)
    }

    fn listen_to_hits(&self) -> Result<Receiver<Hit>> {
        Launchpad::listen_to_hits(self)
    }

    fn listen_to_scroll_text_end_marker(&self) -> Result<Receiver<ScrollTextEnded>> {
        Launchpad::listen_to_scroll_text_end_marker(self)
    }

    fn enter_session(&self) -> Result<()> {
        Launchpad::enter_session(self)
    }

    fn close(&self) -> Result<()> {
        Launchpad::close(self)
    }

    fn output(&self) -> Arc<dyn OutputStream> {
        Launchpad::output(self)
    }

    fn input(&self) -> Arc<dyn InputStream> {
        Launchpad::input(self)
    }

    fn is_receiving(&self) -> bool {
        Launchpad::is_receiving(self)
    }
}

/// Build a controller for a family only known at runtime.
pub fn open(
    variant: Variant,
    input: Arc<dyn InputStream>,
    output: Arc<dyn OutputStream>,
) -> Box<dyn GridController> {
    open_with_config(variant, input, output, &LaunchpadConfig::default())
}

pub fn open_with_config(
    variant: Variant,
    input: Arc<dyn InputStream>,
    output: Arc<dyn OutputStream>,
    config: &LaunchpadConfig,
) -> Box<dyn GridController> {
    match variant {
        Variant::Narrow => Box::new(NarrowLaunchpad::with_config(input, output, config)),
        Variant::Wide => Box::new(WideLaunchpad::with_config(input, output, config)),
    }
}
