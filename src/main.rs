#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use efis_pfd::clock::FrameClock;
use efis_pfd::config::{AppConfig, Cli, ConfigSource};
use efis_pfd::link::{LinkSupervisor, SerialConnector};
use efis_pfd::logging::{self, LogBuffer};
use efis_pfd::render::{SCREEN_HEIGHT, SCREEN_WIDTH};
use efis_pfd::settings::CockpitSettings;
use efis_pfd::state::shared_cockpit;
use efis_pfd::ui::PfdApp;

const SETTINGS_PANEL_WIDTH: f32 = 280.0;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (mut config, source) = AppConfig::load(&cli.config)?;
    config.apply_cli(&cli)?;

    let logs = LogBuffer::default();
    logging::init(&config.log, logs.clone())?;
    info!("efis_pfd {}", env!("CARGO_PKG_VERSION"));
    match &source {
        ConfigSource::File(path) => info!("configuration from {}", path.display()),
        ConfigSource::Defaults { missing } => {
            warn!("{} not found, using defaults", missing.display())
        }
    }

    let cockpit = shared_cockpit();
    let (tx_clock, rx_clock) = crossbeam_channel::unbounded();

    let connector = SerialConnector {
        port: config.serial.port.clone(),
        baud_rate: config.serial.baud_rate,
    };
    let supervisor = LinkSupervisor::new(connector, config.link.reconnect_delay());
    let clock = FrameClock::new(
        cockpit.clone(),
        supervisor,
        config.link.decoder(),
        config.pfd.tick_hz,
        rx_clock,
    );
    let frames = clock.frames();
    let status = clock.status();
    clock.spawn().context("starting frame clock")?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("EFIS PFD")
            .with_inner_size([SCREEN_WIDTH + SETTINGS_PANEL_WIDTH, SCREEN_HEIGHT + 40.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    let app = PfdApp::new(
        frames,
        status,
        Box::new(CockpitSettings::new(cockpit)),
        tx_clock,
        logs,
        config.pfd.tick_hz,
    );

    let run = eframe::run_native("EFIS PFD", native_options, Box::new(move |_cc| Box::new(app)));
    run.map_err(|e| anyhow::anyhow!("eframe failed: {e}"))
}
