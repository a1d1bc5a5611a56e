//! Finding a launchpad among the system's MIDI ports.

use crate::config::LaunchpadConfig;
use crate::protocol::Variant;

/// Index and family of the first port name that names a launchpad.
///
/// With `want` set, only ports of that family match.
pub fn select_port<S: AsRef<str>>(
    names: &[S],
    config: &LaunchpadConfig,
    want: Option<Variant>,
) -> Option<(usize, Variant)> {
    names.iter().enumerate().find_map(|(index, name)| {
        let variant = Variant::detect(name.as_ref(), config)?;
        match want {
            Some(wanted) if wanted != variant => None,
            _ => Some((index, variant)),
        }
    })
}

#[cfg(feature = "midi-io")]
pub use self::hardware::discover;

#[cfg(feature = "midi-io")]
mod hardware {
    use std::sync::Arc;

    use midir::{MidiInput, MidiOutput};

    use super::select_port;
    use crate::config::LaunchpadConfig;
    use crate::device::{open_with_config, GridController};
    use crate::error::{Error, Result, TransportError};
    use crate::transport::midir::{MidirInput, MidirOutput};

    /// Connect to the first launchpad found and prepare it for use.
    ///
    /// The output port must belong to the same family as the input port. A
    /// wide device is switched to session layout before it is returned, unless
    /// the config turns that off.
    pub fn discover(config: &LaunchpadConfig) -> Result<Box<dyn GridController>> {
        config.validate()?;

        let midi_in = MidiInput::new(&config.client_name).map_err(TransportError::from)?;
        let midi_out = MidiOutput::new(&config.client_name).map_err(TransportError::from)?;

        let in_ports = midi_in.ports();
        let in_names: Vec<String> = in_ports
            .iter()
            .map(|port| midi_in.port_name(port).unwrap_or_default())
            .collect();
        let (in_index, variant) = select_port(&in_names, config, None)
            .ok_or_else(|| Error::Discovery("no launchpad input port found".to_string()))?;

        let out_ports = midi_out.ports();
        let out_names: Vec<String> = out_ports
            .iter()
            .map(|port| midi_out.port_name(port).unwrap_or_default())
            .collect();
        let (out_index, _) = select_port(&out_names, config, Some(variant)).ok_or_else(|| {
            Error::Discovery(format!("no {:?} launchpad output port found", variant))
        })?;

        let in_name = in_names[in_index].clone();
        let out_name = out_names[out_index].clone();
        tracing::info!(
            "Selected {:?} launchpad (in: {}, out: {})",
            variant,
            in_name,
            out_name
        );

        let input = MidirInput::new(midi_in, in_ports[in_index].clone(), in_name);
        let output = MidirOutput::new(midi_out, out_ports[out_index].clone(), out_name);
        let device = open_with_config(variant, Arc::new(input), Arc::new(output), config);

        if config.enter_session_mode {
            device.enter_session()?;
        }
        Ok(device)
    }
}
