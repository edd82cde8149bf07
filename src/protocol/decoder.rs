use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::LinkError;
use crate::link::{Link, ReadOutcome};
use crate::state::FlightState;

use super::END_OF_FRAME;

// -----------------------------
// Field tables
// -----------------------------

/// Field group selected by the first character of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Rate,     // '/'
    Settings, // '!'
    Health,   // '%'
    Sensor,   // '$'
    Derived,  // '&'
}

impl Marker {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '/' => Some(Self::Rate),
            '!' => Some(Self::Settings),
            '%' => Some(Self::Health),
            '$' => Some(Self::Sensor),
            '&' => Some(Self::Derived),
            _ => None,
        }
    }

    fn fields(self) -> &'static [Field] {
        match self {
            Self::Rate => &RATE_FIELDS,
            Self::Settings => &SETTINGS_FIELDS,
            Self::Health => &HEALTH_FIELDS,
            Self::Sensor => &SENSOR_FIELDS,
            Self::Derived => &DERIVED_FIELDS,
        }
    }
}

#[derive(Clone, Copy)]
enum Setter {
    Bool(fn(&mut FlightState, bool)),
    Float(fn(&mut FlightState, f64)),
    Int(fn(&mut FlightState, i64)),
}

struct Field {
    tag: &'static str,
    set: Setter,
}

static RATE_FIELDS: [Field; 1] = [Field {
    tag: "i",
    set: Setter::Int(|s, v| s.message_interval_ms = v),
}];

static SETTINGS_FIELDS: [Field; 2] = [
    Field {
        tag: "asd",
        set: Setter::Bool(|s, v| s.settings.alt_std_active = v),
    },
    Field {
        tag: "atg",
        set: Setter::Float(|s, v| s.settings.alt_setting_pa = v),
    },
];

static HEALTH_FIELDS: [Field; 4] = [
    Field {
        tag: "imu",
        set: Setter::Bool(|s, v| s.imu.healthy = v),
    },
    Field {
        tag: "mag",
        set: Setter::Bool(|s, v| s.mag.healthy = v),
    },
    Field {
        tag: "prs",
        set: Setter::Bool(|s, v| s.static_pressure.healthy = v),
    },
    Field {
        tag: "dif",
        set: Setter::Bool(|s, v| s.diff_pressure.healthy = v),
    },
];

static SENSOR_FIELDS: [Field; 14] = [
    Field {
        tag: "gn1",
        set: Setter::Bool(|s, v| s.ground.sensor1 = v),
    },
    Field {
        tag: "gn2",
        set: Setter::Bool(|s, v| s.ground.sensor2 = v),
    },
    Field {
        tag: "gn3",
        set: Setter::Bool(|s, v| s.ground.sensor3 = v),
    },
    Field {
        tag: "aoa",
        set: Setter::Float(|s, v| s.aoa_deg = v),
    },
    Field {
        tag: "tat",
        set: Setter::Float(|s, v| s.total_air_temp_c = v),
    },
    Field {
        tag: "ax",
        set: Setter::Float(|s, v| s.imu.ax = v),
    },
    Field {
        tag: "ay",
        set: Setter::Float(|s, v| s.imu.ay = v),
    },
    Field {
        tag: "az",
        set: Setter::Float(|s, v| s.imu.az = v),
    },
    Field {
        tag: "gx",
        set: Setter::Float(|s, v| s.imu.gx = v),
    },
    Field {
        tag: "gy",
        set: Setter::Float(|s, v| s.imu.gy = v),
    },
    Field {
        tag: "gz",
        set: Setter::Float(|s, v| s.imu.gz = v),
    },
    Field {
        tag: "mhd",
        set: Setter::Float(|s, v| s.mag.heading_deg = v),
    },
    Field {
        tag: "prs",
        set: Setter::Float(|s, v| s.static_pressure.pressure_pa = v),
    },
    Field {
        tag: "dif",
        set: Setter::Float(|s, v| s.diff_pressure.pressure_pa = v),
    },
];

static DERIVED_FIELDS: [Field; 14] = [
    Field {
        tag: "pit",
        set: Setter::Float(|s, v| s.derived.pitch_deg = v),
    },
    Field {
        tag: "rol",
        set: Setter::Float(|s, v| s.derived.roll_deg = v),
    },
    Field {
        tag: "trn",
        set: Setter::Float(|s, v| s.derived.turn_rate_dps = v),
    },
    Field {
        tag: "lac",
        set: Setter::Float(|s, v| s.derived.linear_accel_g = v),
    },
    Field {
        tag: "umh",
        set: Setter::Float(|s, v| s.derived.mag_heading_uncorr_deg = v),
    },
    Field {
        tag: "cmh",
        set: Setter::Float(|s, v| s.derived.mag_heading_corr_deg = v),
    },
    Field {
        tag: "sat",
        set: Setter::Float(|s, v| s.derived.outside_air_temp_c = v),
    },
    Field {
        tag: "plt",
        set: Setter::Float(|s, v| s.derived.pressure_alt_ft = v),
    },
    Field {
        tag: "ilt",
        set: Setter::Float(|s, v| s.derived.indicated_alt_ft = v),
    },
    Field {
        tag: "vsp",
        set: Setter::Float(|s, v| s.derived.baro_vspd_fpm = v),
    },
    Field {
        tag: "ias",
        set: Setter::Float(|s, v| s.derived.kias = v),
    },
    Field {
        tag: "cas",
        set: Setter::Float(|s, v| s.derived.kcas = v),
    },
    Field {
        tag: "tas",
        set: Setter::Float(|s, v| s.derived.ktas = v),
    },
    Field {
        tag: "mac",
        set: Setter::Float(|s, v| s.derived.mach = v),
    },
];

fn parse_bool(v: &str) -> Option<bool> {
    match v {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

fn parse_float(v: &str) -> Option<f64> {
    v.parse::<f64>().ok().filter(|x| x.is_finite())
}

fn parse_int(v: &str) -> Option<i64> {
    v.parse::<i64>().ok()
}

// -----------------------------
// Line decoding
// -----------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    Empty,
    UnknownMarker,
    MissingSeparator,
    UnknownTag,
    BadValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEvent {
    Applied,
    Ignored(Ignored),
    EndOfFrame,
}

/// Apply one protocol line to `state`. Bad lines change nothing.
pub fn apply_line(line: &str, state: &mut FlightState) -> LineEvent {
    let line = line.trim();
    if line == END_OF_FRAME {
        return LineEvent::EndOfFrame;
    }
    let mut chars = line.chars();
    let Some(first) = chars.next() else {
        return LineEvent::Ignored(Ignored::Empty);
    };
    let Some(marker) = Marker::from_char(first) else {
        return LineEvent::Ignored(Ignored::UnknownMarker);
    };
    let Some((tag, value)) = chars.as_str().split_once('=') else {
        return LineEvent::Ignored(Ignored::MissingSeparator);
    };
    let Some(field) = marker.fields().iter().find(|f| f.tag == tag) else {
        return LineEvent::Ignored(Ignored::UnknownTag);
    };

    let applied = match field.set {
        Setter::Bool(set) => parse_bool(value).map(|v| set(state, v)),
        Setter::Float(set) => parse_float(value).map(|v| set(state, v)),
        Setter::Int(set) => parse_int(value).map(|v| set(state, v)),
    };
    match applied {
        Some(()) => LineEvent::Applied,
        None => LineEvent::Ignored(Ignored::BadValue),
    }
}

// -----------------------------
// Frame collection
// -----------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkHealth {
    /// No line within the data timeout on the last read.
    pub data_timeout: bool,
    /// Flight computer reports a message interval above threshold.
    pub low_rate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Complete,
    TimedOut,
    /// Line cap reached before the end-of-frame marker.
    Truncated,
}

#[derive(Debug, Clone, Copy)]
pub struct DecoderConfig {
    pub data_timeout: Duration,
    pub low_rate_threshold_ms: i64,
    pub max_lines_per_frame: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            data_timeout: Duration::from_millis(100),
            low_rate_threshold_ms: 100,
            max_lines_per_frame: 512,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    pub lines: u64,
    pub applied: u64,
    pub ignored: u64,
    pub skipped: u64,
    pub frames: u64,
    pub timeouts: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Collecting,
    FrameDone,
}

pub struct FrameDecoder {
    cfg: DecoderConfig,
    phase: Phase,
    data_timeout: bool,
    stats: DecoderStats,
}

impl FrameDecoder {
    pub fn new(cfg: DecoderConfig) -> Self {
        Self {
            cfg,
            phase: Phase::Collecting,
            data_timeout: true,
            stats: DecoderStats::default(),
        }
    }

    /// Decode one received line. Receiving anything clears the data timeout.
    pub fn feed(&mut self, line: &str, state: &mut FlightState) -> LineEvent {
        if self.phase == Phase::FrameDone {
            self.phase = Phase::Collecting;
        }
        self.data_timeout = false;
        self.stats.lines += 1;

        let ev = apply_line(line, state);
        match ev {
            LineEvent::Applied => self.stats.applied += 1,
            LineEvent::Ignored(why) => {
                self.stats.ignored += 1;
                trace!(?why, line, "ignored line");
            }
            LineEvent::EndOfFrame => {
                self.stats.frames += 1;
                self.phase = Phase::FrameDone;
            }
        }
        ev
    }

    /// Read lines into `state` until end-of-frame, a read window passes with
    /// no line, or the per-frame line cap is hit.
    pub fn collect_frame(
        &mut self,
        link: &mut dyn Link,
        state: &mut FlightState,
    ) -> Result<FrameOutcome, LinkError> {
        self.phase = Phase::Collecting;
        let mut lines = 0usize;
        loop {
            let window = Instant::now();
            let line = loop {
                let remaining = self.cfg.data_timeout.saturating_sub(window.elapsed());
                if remaining.is_zero() {
                    break None;
                }
                match link.read_line(remaining)? {
                    ReadOutcome::Line(l) => break Some(l),
                    ReadOutcome::Skipped => self.stats.skipped += 1,
                    ReadOutcome::Timeout => break None,
                }
            };

            let Some(line) = line else {
                self.mark_stale();
                return Ok(FrameOutcome::TimedOut);
            };
            if self.feed(&line, state) == LineEvent::EndOfFrame {
                return Ok(FrameOutcome::Complete);
            }
            lines += 1;
            if lines >= self.cfg.max_lines_per_frame {
                debug!(lines, "frame cut at line cap");
                return Ok(FrameOutcome::Truncated);
            }
        }
    }

    /// No data this cycle (timeout, or no link at all).
    pub fn mark_stale(&mut self) {
        if !self.data_timeout {
            debug!("data timeout");
        }
        self.data_timeout = true;
        self.stats.timeouts += 1;
    }

    pub fn health(&self, state: &FlightState) -> LinkHealth {
        LinkHealth {
            data_timeout: self.data_timeout,
            low_rate: state.message_interval_ms > self.cfg.low_rate_threshold_ms,
        }
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    pub fn data_timeout(&self) -> bool {
        self.data_timeout
    }
}
