//! Listeners turning raw inbound messages into typed events.
//!
//! Decoding lives in the [`Protocol`]; delivery lives behind [`EventSink`].
//! The default sink is a channel that blocks the dispatching thread until a
//! consumer takes the event, so one slow consumer holds up every other
//! listener of the same device.

use crossbeam_channel::{bounded, select, Receiver, Sender};

use crate::grid::Hit;
use crate::midi::MidiMessage;
use crate::protocol::Protocol;

/// Handler invoked for every inbound message, in registration order.
pub type Listener = Box<dyn Fn(&MidiMessage) + Send + Sync>;

/// Signal that one cycle of a looping scroll text has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScrollTextEnded;

/// Destination for decoded events.
pub trait EventSink<T>: Send + Sync {
    /// Hand over one event, blocking as the sink requires. Returns false if
    /// the event was dropped because nobody can receive it any more.
    fn deliver(&self, event: T) -> bool;
}

impl<T, F> EventSink<T> for F
where
    F: Fn(T) -> bool + Send + Sync,
{
    fn deliver(&self, event: T) -> bool {
        self(event)
    }
}

/// Channel-backed sink.
///
/// With capacity 0 every delivery is a rendezvous with the consumer. The
/// `shutdown` receiver disconnects when the owning device closes, which
/// abandons any delivery still waiting for a consumer.
pub struct ChannelSink<T> {
    tx: Sender<T>,
    shutdown: Receiver<()>,
}

impl<T> ChannelSink<T> {
    pub fn new(capacity: usize, shutdown: Receiver<()>) -> (Self, Receiver<T>) {
        let (tx, rx) = bounded(capacity);
        (Self { tx, shutdown }, rx)
    }
}

impl<T: Send> EventSink<T> for ChannelSink<T> {
    fn deliver(&self, event: T) -> bool {
        select! {
            send(self.tx, event) -> result => result.is_ok(),
            recv(self.shutdown) -> _ => {
                tracing::warn!("Launchpad closed while an event was waiting for a consumer");
                false
            }
        }
    }
}

/// Listener forwarding button transitions decoded with `P`.
pub fn hit_listener<P, S>(sink: S) -> Listener
where
    P: Protocol,
    S: EventSink<Hit> + 'static,
{
    Box::new(move |message: &MidiMessage| {
        if let Some(hit) = P::decode_hit(message) {
            sink.deliver(hit);
        }
    })
}

/// Listener forwarding scroll-text end markers.
pub fn end_marker_listener<P, S>(sink: S) -> Listener
where
    P: Protocol,
    S: EventSink<ScrollTextEnded> + 'static,
{
    Box::new(move |message: &MidiMessage| {
        if P::is_text_end_marker(message) {
            sink.deliver(ScrollTextEnded);
        }
    })
}
