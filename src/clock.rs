//! Fixed-rate loop binding reader, decoder, renderer and writer.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::LinkError;
use crate::link::{Connector, LinkSupervisor};
use crate::protocol::{DecoderConfig, DecoderStats, FrameDecoder, FrameOutcome, LinkHealth, LinkWriter};
use crate::render::{DrawList, Renderer};
use crate::state::{Cockpit, SharedCockpit};

/// Requests from the UI thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockCmd {
    /// Close the serial link now and reopen it.
    Reconnect,
}

/// Latest rendered frame.
#[derive(Debug, Clone, Default)]
pub struct PfdFrame {
    pub seq: u64,
    pub draw: DrawList,
}

#[derive(Debug, Clone, Default)]
pub struct LinkStatus {
    pub open: bool,
    pub port: String,
    pub connected_since: Option<DateTime<Local>>,
    pub health: LinkHealth,
    pub last_frame: Option<FrameOutcome>,
    pub stats: DecoderStats,
}

pub type FrameSlot = Arc<Mutex<Option<PfdFrame>>>;
pub type StatusSlot = Arc<Mutex<LinkStatus>>;

const STATS_LOG_EVERY: u64 = 600;

pub struct FrameClock<C: Connector> {
    cockpit: SharedCockpit,
    supervisor: LinkSupervisor<C>,
    decoder: FrameDecoder,
    renderer: Renderer,
    writer: LinkWriter,
    commands: Receiver<ClockCmd>,
    period: Duration,
    seq: u64,
    frame_slot: FrameSlot,
    status_slot: StatusSlot,
}

impl<C: Connector + 'static> FrameClock<C> {
    pub fn new(
        cockpit: SharedCockpit,
        supervisor: LinkSupervisor<C>,
        decoder: DecoderConfig,
        tick_hz: u32,
        commands: Receiver<ClockCmd>,
    ) -> Self {
        Self {
            cockpit,
            supervisor,
            decoder: FrameDecoder::new(decoder),
            renderer: Renderer::new(),
            writer: LinkWriter::new(),
            commands,
            period: Duration::from_secs(1) / tick_hz.max(1),
            seq: 0,
            frame_slot: Arc::new(Mutex::new(None)),
            status_slot: Arc::new(Mutex::new(LinkStatus::default())),
        }
    }

    pub fn frames(&self) -> FrameSlot {
        self.frame_slot.clone()
    }

    pub fn status(&self) -> StatusSlot {
        self.status_slot.clone()
    }

    /// One frame: drain commands, then under the cockpit lock read, render
    /// and write, then publish.
    pub fn cycle(&mut self) {
        while let Ok(cmd) = self.commands.try_recv() {
            match cmd {
                ClockCmd::Reconnect => self.supervisor.reconnect(),
            }
        }

        let mut guard = self.cockpit.lock();
        let Cockpit { flight, settings } = &mut *guard;

        let read = self
            .supervisor
            .link()
            .map(|link| self.decoder.collect_frame(link, flight));
        let last_frame = match read {
            Some(Ok(outcome)) => Some(outcome),
            Some(Err(e)) => {
                self.decoder.mark_stale();
                self.supervisor.fail(&e);
                None
            }
            None => {
                self.decoder.mark_stale();
                None
            }
        };

        let health = self.decoder.health(flight);
        let draw = self.renderer.render(flight, settings, health);

        let written: Option<Result<_, LinkError>> = self
            .supervisor
            .link()
            .map(|link| self.writer.transmit(link, settings, flight));
        if let Some(Err(e)) = written {
            self.supervisor.fail(&e);
        }
        drop(guard);

        self.seq += 1;
        let stats = self.decoder.stats();
        if self.seq % STATS_LOG_EVERY == 0 {
            debug!(?stats, "decoder");
        }

        *self.frame_slot.lock() = Some(PfdFrame {
            seq: self.seq,
            draw,
        });
        *self.status_slot.lock() = LinkStatus {
            open: self.supervisor.is_open(),
            port: self.supervisor.describe(),
            connected_since: self.supervisor.connected_since(),
            health,
            last_frame,
            stats,
        };
    }

    pub fn run(mut self) {
        info!(
            "frame clock running at {:.1} Hz on {}",
            1.0 / self.period.as_secs_f64(),
            self.supervisor.describe()
        );
        loop {
            let start = Instant::now();
            self.cycle();
            if let Some(rest) = self.period.checked_sub(start.elapsed()) {
                thread::sleep(rest);
            }
        }
    }

    pub fn spawn(self) -> std::io::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name("frame-clock".into())
            .spawn(move || self.run())
    }
}
