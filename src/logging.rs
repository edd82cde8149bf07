//! `tracing` setup: stderr, an optional log file, and an in-memory tail for
//! the log view.

use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tracing_subscriber::fmt::{self, time::ChronoLocal, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

const MAX_LINES: usize = 3000;
const TIME_FORMAT: &str = "%H:%M:%S%.3f";

// -----------------------------
// Log tail
// -----------------------------

#[derive(Default, Clone)]
pub struct LogBuffer {
    inner: Arc<Mutex<Vec<String>>>,
}

impl LogBuffer {
    pub fn push(&self, s: impl Into<String>) {
        let mut g = self.inner.lock();
        g.push(s.into());
        let len = g.len();
        if len > MAX_LINES {
            g.drain(0..(len - MAX_LINES));
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.inner.lock().clone()
    }
}

/// One formatted event; split into lines as it is written.
pub struct LineWriter {
    buf: LogBuffer,
}

impl io::Write for LineWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(bytes);
        for line in text.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
            self.buf.push(line);
        }
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LineWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LineWriter { buf: self.clone() }
    }
}

// -----------------------------
// Subscriber
// -----------------------------

/// Install the global subscriber. `RUST_LOG` wins over `cfg.level`.
pub fn init(cfg: &LogConfig, tail: LogBuffer) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(&cfg.level)
            .with_context(|| format!("bad log level {:?}", cfg.level))?,
    };

    let stderr = fmt::layer()
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_writer(io::stderr);

    let file = match &cfg.file {
        Some(path) => {
            let f = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
                    .with_writer(std::sync::Mutex::new(f)),
            )
        }
        None => None,
    };

    let view = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_timer(ChronoLocal::new("%H:%M:%S".to_string()))
        .with_writer(tail);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file)
        .with(view)
        .try_init()
        .context("installing log subscriber")?;
    Ok(())
}
