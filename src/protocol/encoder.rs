use std::fmt;

use tracing::info;

use crate::error::LinkError;
use crate::link::Link;
use crate::state::{FlightState, SettingsModel};

const PREAMBLE: &str = "...\r\n#\r\n";
const TERMINATOR: &str = "+\r\n+\r\n";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingCommand {
    Std(bool),
    AltimeterPa(f64),
}

impl fmt::Display for SettingCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Std(on) => write!(f, "!asd={}", u8::from(*on)),
            Self::AltimeterPa(pa) => write!(f, "!atg={pa:.1}"),
        }
    }
}

/// One device-bound frame: preamble, changed settings, double terminator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutboundFrame {
    pub commands: Vec<SettingCommand>,
}

impl OutboundFrame {
    /// Commands for every pilot setting the device has not yet taken.
    pub fn deltas(settings: &SettingsModel, flight: &FlightState) -> Self {
        let mut commands = Vec::new();
        if settings.std_mode_requested != flight.settings.alt_std_active {
            commands.push(SettingCommand::Std(settings.std_mode_requested));
        }
        if !settings.matches_setting(flight.settings.alt_setting_pa) {
            commands.push(SettingCommand::AltimeterPa(settings.commanded_setting_pa()));
        }
        Self { commands }
    }

    pub fn to_wire(&self) -> String {
        let mut out = String::from(PREAMBLE);
        for c in &self.commands {
            out.push_str(&c.to_string());
            out.push_str("\r\n");
        }
        out.push_str(TERMINATOR);
        out
    }
}

/// Sends the per-frame outbound frame and logs each new command once.
#[derive(Default)]
pub struct LinkWriter {
    last_logged: Vec<SettingCommand>,
}

impl LinkWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transmit(
        &mut self,
        link: &mut dyn Link,
        settings: &SettingsModel,
        flight: &FlightState,
    ) -> Result<OutboundFrame, LinkError> {
        let frame = OutboundFrame::deltas(settings, flight);
        link.write_all(frame.to_wire().as_bytes())?;

        if frame.commands != self.last_logged {
            for c in frame.commands.iter().filter(|c| !self.last_logged.contains(c)) {
                info!("sending {c}");
            }
            self.last_logged = frame.commands.clone();
        }
        Ok(frame)
    }
}
