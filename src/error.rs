use thiserror::Error;

/// Failures on the serial link. All of them are recovered by the link
/// supervisor (close, wait, reopen); none is fatal to the display.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("failed to open serial port {port} at {baud} baud: {source}")]
    Open {
        port: String,
        baud: u32,
        #[source]
        source: serialport::Error,
    },

    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serial link closed by peer")]
    Closed,
}

/// A pilot entry rejected at the settings boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("invalid {field} value {value} (allowed {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid {field} value {input:?}")]
    Unparsable { field: &'static str, input: String },
}
