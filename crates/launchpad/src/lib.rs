//! Novation Launchpad protocol adapter.
//!
//! This crate translates between a 9x9 button grid and the MIDI messages two
//! launchpad families speak:
//! - **Narrow** (Launchpad S / Mini): red-green LEDs, note = `x + 16y`
//! - **Wide** (Launchpad MK2): palette and RGB LEDs, note = `(8 - y) * 10 + x + 1`
//!
//! # Architecture
//!
//! A [`Launchpad`] is handed an [`InputStream`] and an [`OutputStream`].
//! Outgoing calls (`light`, `clear`, scroll text) are encoded by the family's
//! [`Protocol`] and written straight to the output. Incoming messages are
//! read by one receive thread per device, started when the first listener is
//! registered, and fanned out to every listener in registration order.
//!
//! Hits and scroll-text end markers arrive on crossbeam channels. These are
//! unbuffered by default: a consumer that stops reading stalls the whole
//! input pipeline of its device. See [`LaunchpadConfig`] to add buffering.
//!
//! # Hardware
//!
//! With the `midi-io` feature, `discovery::discover` opens the first launchpad found
//! through midir. Without it, drive a device with
//! [`MemoryTransport`](transport::memory::MemoryTransport) or your own
//! stream implementations.

pub mod color;
pub mod config;
pub mod device;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod grid;
pub mod listener;
pub mod midi;
pub mod protocol;
pub mod text;
pub mod transport;

pub use color::{palette, Color, NarrowColor, PaletteColor, RgbColor};
pub use config::{ConfigError, LaunchpadConfig};
pub use device::{open, open_with_config, GridController, Launchpad, NarrowLaunchpad, WideLaunchpad};
#[cfg(feature = "midi-io")]
pub use discovery::discover;
pub use error::{Error, Result, TransportError};
pub use grid::{GridPosition, Hit};
pub use listener::{EventSink, Listener, ScrollTextEnded};
pub use midi::MidiMessage;
pub use protocol::{Narrow, Protocol, Variant, Wide};
pub use text::ScrollingTextBuilder;
pub use transport::{InputStream, OutputStream};
