use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::time::{Duration, Instant};

use serialport::SerialPort;
use tracing::{error, info, warn};

use crate::error::LinkError;

/// Longest line kept while waiting for its newline.
const MAX_LINE_BYTES: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Nothing arrived within the wait; the link is still usable.
    Timeout,
    /// A line arrived but was not ASCII (or overflowed); drop it.
    Skipped,
}

/// One open, bidirectional line link.
pub trait Link: Send {
    /// Read one line without blocking past `timeout`. The returned text has
    /// surrounding whitespace and the line terminator removed.
    fn read_line(&mut self, timeout: Duration) -> Result<ReadOutcome, LinkError>;

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError>;
}

/// Opens links. The supervisor calls it again after every failure.
pub trait Connector: Send {
    fn connect(&mut self) -> Result<Box<dyn Link>, LinkError>;

    fn describe(&self) -> String;
}

// -----------------------------
// Serial port
// -----------------------------

pub struct SerialConnector {
    pub port: String,
    pub baud_rate: u32,
}

impl Connector for SerialConnector {
    fn connect(&mut self) -> Result<Box<dyn Link>, LinkError> {
        let port = serialport::new(&self.port, self.baud_rate)
            .timeout(Duration::from_millis(100))
            .open()
            .map_err(|source| LinkError::Open {
                port: self.port.clone(),
                baud: self.baud_rate,
                source,
            })?;
        Ok(Box::new(SerialLink::new(port)))
    }

    fn describe(&self) -> String {
        format!("{} @ {} baud", self.port, self.baud_rate)
    }
}

/// Collects raw bytes into lines, dropping lines that never end.
#[derive(Debug, Default)]
pub struct LineAssembler {
    pending: Vec<u8>,
}

impl LineAssembler {
    /// Take bytes from `buf` up to and including the first newline. Returns
    /// how many bytes were used and, when a line ended or overflowed, what to
    /// hand back to the reader.
    pub fn push(&mut self, buf: &[u8]) -> (usize, Option<ReadOutcome>) {
        match buf.iter().position(|&b| b == b'\n') {
            Some(i) => {
                self.pending.extend_from_slice(&buf[..=i]);
                (i + 1, Some(finish_line(std::mem::take(&mut self.pending))))
            }
            None => {
                self.pending.extend_from_slice(buf);
                if self.pending.len() > MAX_LINE_BYTES {
                    self.pending.clear();
                    (buf.len(), Some(ReadOutcome::Skipped))
                } else {
                    (buf.len(), None)
                }
            }
        }
    }
}

pub struct SerialLink {
    reader: BufReader<Box<dyn SerialPort>>,
    assembler: LineAssembler,
}

impl SerialLink {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self {
            reader: BufReader::new(port),
            assembler: LineAssembler::default(),
        }
    }
}

impl Link for SerialLink {
    fn read_line(&mut self, timeout: Duration) -> Result<ReadOutcome, LinkError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(ReadOutcome::Timeout);
            }
            self.reader.get_mut().set_timeout(remaining)?;

            let (used, outcome) = match self.reader.fill_buf() {
                Ok([]) => return Err(LinkError::Closed),
                Ok(buf) => self.assembler.push(buf),
                Err(e) if e.kind() == ErrorKind::TimedOut => return Ok(ReadOutcome::Timeout),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            self.reader.consume(used);

            if let Some(outcome) = outcome {
                return Ok(outcome);
            }
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        let port = self.reader.get_mut();
        port.write_all(bytes)?;
        port.flush()?;
        Ok(())
    }
}

/// Wire text is ASCII only; anything else is line noise.
pub fn finish_line(raw: Vec<u8>) -> ReadOutcome {
    if !raw.is_ascii() {
        return ReadOutcome::Skipped;
    }
    match String::from_utf8(raw) {
        Ok(s) => ReadOutcome::Line(s.trim().to_string()),
        Err(_) => ReadOutcome::Skipped,
    }
}

// -----------------------------
// Reconnect policy
// -----------------------------

/// Owns the single link handle used for both directions and reopens it after
/// failures, no sooner than `retry_delay` after the last one.
pub struct LinkSupervisor<C: Connector> {
    connector: C,
    link: Option<Box<dyn Link>>,
    retry_delay: Duration,
    next_attempt: Instant,
    connected_since: Option<chrono::DateTime<chrono::Local>>,
}

impl<C: Connector> LinkSupervisor<C> {
    pub fn new(connector: C, retry_delay: Duration) -> Self {
        Self {
            connector,
            link: None,
            retry_delay,
            next_attempt: Instant::now(),
            connected_since: None,
        }
    }

    /// The open link, opening it first when a retry is due.
    pub fn link(&mut self) -> Option<&mut (dyn Link + 'static)> {
        if self.link.is_none() && Instant::now() >= self.next_attempt {
            match self.connector.connect() {
                Ok(link) => {
                    info!("serial link open: {}", self.connector.describe());
                    self.link = Some(link);
                    self.connected_since = Some(chrono::Local::now());
                }
                Err(e) => {
                    error!("{e}");
                    self.next_attempt = Instant::now() + self.retry_delay;
                }
            }
        }
        self.link.as_deref_mut()
    }

    /// Drop the link after an error; it is reopened after the retry delay.
    pub fn fail(&mut self, err: &LinkError) {
        error!("serial link error: {err}");
        if self.link.take().is_some() {
            warn!(
                "serial link closed, retrying in {} ms",
                self.retry_delay.as_millis()
            );
        }
        self.connected_since = None;
        self.next_attempt = Instant::now() + self.retry_delay;
    }

    /// Close now and reopen on the next call to [`Self::link`].
    pub fn reconnect(&mut self) {
        if self.link.take().is_some() {
            info!("serial link closed on request");
        }
        self.connected_since = None;
        self.next_attempt = Instant::now();
    }

    pub fn is_open(&self) -> bool {
        self.link.is_some()
    }

    pub fn connected_since(&self) -> Option<chrono::DateTime<chrono::Local>> {
        self.connected_since
    }

    pub fn describe(&self) -> String {
        self.connector.describe()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    #[derive(Debug, Clone)]
    pub enum Step {
        Line(&'static str),
        Timeout,
        Skip,
        Fail,
    }

    /// Plays back a fixed script; an exhausted script reads as timeouts.
    pub struct ScriptedLink {
        pub script: VecDeque<Step>,
        pub written: Arc<Mutex<Vec<u8>>>,
        pub fail_writes: bool,
    }

    impl ScriptedLink {
        pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
            Self {
                script: steps.into_iter().collect(),
                written: Arc::new(Mutex::new(Vec::new())),
                fail_writes: false,
            }
        }

        pub fn lines(lines: &[&'static str]) -> Self {
            Self::new(lines.iter().map(|l| Step::Line(*l)))
        }

        pub fn written_text(&self) -> String {
            String::from_utf8_lossy(&self.written.lock()).into_owned()
        }
    }

    impl Link for ScriptedLink {
        fn read_line(&mut self, _timeout: Duration) -> Result<ReadOutcome, LinkError> {
            match self.script.pop_front() {
                Some(Step::Line(l)) => Ok(ReadOutcome::Line(l.trim().to_string())),
                Some(Step::Skip) => Ok(ReadOutcome::Skipped),
                Some(Step::Fail) => Err(LinkError::Closed),
                Some(Step::Timeout) | None => Ok(ReadOutcome::Timeout),
            }
        }

        fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
            if self.fail_writes {
                return Err(LinkError::Io(std::io::Error::new(
                    ErrorKind::BrokenPipe,
                    "unplugged",
                )));
            }
            self.written.lock().extend_from_slice(bytes);
            Ok(())
        }
    }

    /// A port spewing noise that never forms a line. Each read waits up to
    /// `every` (never past its timeout) and reports a skipped line.
    pub struct NoiseLink {
        pub every: Duration,
        pub reads: usize,
    }

    impl Link for NoiseLink {
        fn read_line(&mut self, timeout: Duration) -> Result<ReadOutcome, LinkError> {
            std::thread::sleep(self.every.min(timeout));
            self.reads += 1;
            Ok(ReadOutcome::Skipped)
        }

        fn write_all(&mut self, _bytes: &[u8]) -> Result<(), LinkError> {
            Ok(())
        }
    }

    /// Hands out prepared links in order; fails once they run out.
    pub struct QueueConnector {
        pub links: VecDeque<ScriptedLink>,
        pub attempts: Arc<Mutex<usize>>,
    }

    impl QueueConnector {
        pub fn new(links: impl IntoIterator<Item = ScriptedLink>) -> Self {
            Self {
                links: links.into_iter().collect(),
                attempts: Arc::new(Mutex::new(0)),
            }
        }
    }

    impl Connector for QueueConnector {
        fn connect(&mut self) -> Result<Box<dyn Link>, LinkError> {
            *self.attempts.lock() += 1;
            match self.links.pop_front() {
                Some(l) => Ok(Box::new(l)),
                None => Err(LinkError::Io(std::io::Error::new(
                    ErrorKind::NotFound,
                    "no such port",
                ))),
            }
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }
}
