//! eframe front end: PFD view, settings panel, link status and logs.
//!
//! Nothing here knows about instruments. The PFD view only paints the
//! newest published draw list and the settings panel only talks to a
//! [`SettingsPort`].

pub mod painter;

use std::time::Duration;

use crossbeam_channel::Sender;
use egui::{Color32, RichText, Vec2};
use egui_extras::{Column, TableBuilder};
use tracing::warn;

use crate::clock::{ClockCmd, FrameSlot, LinkStatus, StatusSlot};
use crate::error::SettingsError;
use crate::logging::LogBuffer;
use crate::settings::{parse_entry, SettingsDelta, SettingsPort, SettingsSnapshot};

// -----------------------------
// Status badges
// -----------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkBadge {
    Disconnected,
    /// Port open, nothing arriving.
    NoData,
    Receiving,
}

impl LinkBadge {
    pub fn from_status(status: &LinkStatus) -> Self {
        match (status.open, status.health.data_timeout) {
            (false, _) => Self::Disconnected,
            (true, true) => Self::NoData,
            (true, false) => Self::Receiving,
        }
    }
}

fn circle_indicator_colored(ui: &mut egui::Ui, color: Color32, filled: bool) {
    let h = ui.style().spacing.interact_size.y.max(14.0);
    let (rect, _) = ui.allocate_exact_size(Vec2::new(h, h), egui::Sense::hover());
    let center = rect.center();
    let r = (h * 0.36).max(5.0);
    let fill_color = if filled { color } else { Color32::TRANSPARENT };
    ui.painter().circle_filled(center, r, fill_color);
    ui.painter()
        .circle_stroke(center, r, egui::Stroke::new(1.4, color));
}

fn status_badge(ui: &mut egui::Ui, badge: LinkBadge) {
    let (text, color, filled) = match badge {
        LinkBadge::Disconnected => ("Disconnected", Color32::from_rgb(200, 60, 60), false),
        LinkBadge::NoData => ("No data", Color32::from_rgb(220, 180, 40), false),
        LinkBadge::Receiving => ("Receiving", Color32::from_rgb(30, 180, 90), true),
    };
    ui.horizontal(|ui| {
        circle_indicator_colored(ui, color, filled);
        ui.colored_label(color, text);
    });
}

fn kv_line(ui: &mut egui::Ui, k: &str, v: impl Into<String>) {
    ui.label(RichText::new(format!("{}: {}", k, v.into())).strong());
}

// -----------------------------
// Settings entries
// -----------------------------

/// Text buffers behind the numeric entry boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct Entries {
    pub altimeter: String,
    pub transition_altitude: String,
    pub transition_level: String,
    pub variation: String,
}

impl Entries {
    pub fn from_snapshot(snap: &SettingsSnapshot) -> Self {
        let s = &snap.settings;
        Self {
            altimeter: if s.altimeter_unit_is_hpa {
                s.altimeter_hpa.to_string()
            } else {
                format!("{:.2}", s.altimeter_inhg)
            },
            transition_altitude: s.transition_altitude_ft.to_string(),
            transition_level: s.transition_level_fl.to_string(),
            variation: format!("{:.1}", s.magnetic_variation_deg),
        }
    }
}

/// Build the change for the altimeter entry in the selected unit.
pub fn altimeter_delta(hpa_unit: bool, input: &str) -> Result<SettingsDelta, SettingsError> {
    if hpa_unit {
        parse_entry("altimeter hPa", input).map(SettingsDelta::SetAltimeterHpa)
    } else {
        parse_entry("altimeter inHg", input).map(SettingsDelta::SetAltimeterInHg)
    }
}

/// Label | text box | unit; true when the pilot pressed Enter or "Set".
fn entry_row(ui: &mut egui::Ui, name: &str, buf: &mut String, unit: &str) -> bool {
    let mut submit = false;
    egui::Grid::new(format!("entry_{name}"))
        .num_columns(4)
        .spacing(Vec2::new(8.0, 6.0))
        .show(ui, |ui| {
            ui.label(RichText::new(name).strong());
            let desired_h = ui.style().spacing.interact_size.y;
            let r = ui.add_sized([80.0, desired_h], egui::TextEdit::singleline(buf));
            if r.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submit = true;
            }
            ui.label(unit);
            if ui.button("Set").clicked() {
                submit = true;
            }
            ui.end_row();
        });
    submit
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Pfd,
    Logs,
}

// -----------------------------
// App
// -----------------------------

pub struct PfdApp {
    frames: FrameSlot,
    status: StatusSlot,
    settings: Box<dyn SettingsPort>,
    tx_clock: Sender<ClockCmd>,
    logs: LogBuffer,
    repaint: Duration,

    entries: Entries,
    entry_error: Option<String>,
    active_tab: Tab,
    autoscroll: bool,
    last_log_count: usize,
}

impl PfdApp {
    pub fn new(
        frames: FrameSlot,
        status: StatusSlot,
        settings: Box<dyn SettingsPort>,
        tx_clock: Sender<ClockCmd>,
        logs: LogBuffer,
        tick_hz: u32,
    ) -> Self {
        let entries = Entries::from_snapshot(&settings.read());
        Self {
            frames,
            status,
            settings,
            tx_clock,
            logs,
            repaint: Duration::from_secs(1) / tick_hz.max(1),
            entries,
            entry_error: None,
            active_tab: Tab::Pfd,
            autoscroll: true,
            last_log_count: 0,
        }
    }

    /// Apply a change; refresh the entry boxes on success, keep the
    /// pilot's text and show why on failure.
    fn submit(&mut self, delta: Result<SettingsDelta, SettingsError>) {
        match delta.and_then(|d| self.settings.apply(d)) {
            Ok(()) => {
                self.entries = Entries::from_snapshot(&self.settings.read());
                self.entry_error = None;
            }
            Err(e) => self.entry_error = Some(e.to_string()),
        }
    }

    /// Ask the frame clock to reopen the link. False when the clock is gone.
    fn request_reconnect(&self) -> bool {
        match self.tx_clock.send(ClockCmd::Reconnect) {
            Ok(()) => true,
            Err(_) => {
                warn!("reconnect not sent: frame clock is not running");
                false
            }
        }
    }

    fn top_bar(&mut self, ui: &mut egui::Ui, status: &LinkStatus) {
        ui.horizontal_wrapped(|ui| {
            status_badge(ui, LinkBadge::from_status(status));
            ui.separator();
            ui.label(RichText::new(&status.port).italics());
            if let Some(since) = status.connected_since {
                ui.label(format!("since {}", since.format("%H:%M:%S")));
            }
            if status.health.low_rate {
                ui.separator();
                ui.colored_label(Color32::from_rgb(220, 180, 40), "LOW DATA RATE");
            }

            ui.separator();
            ui.selectable_value(&mut self.active_tab, Tab::Pfd, "PFD");
            ui.selectable_value(&mut self.active_tab, Tab::Logs, "Logs");

            ui.separator();
            if ui.button("🔄 Reconnect").clicked() {
                self.request_reconnect();
            }
        });
    }

    fn settings_panel(&mut self, ui: &mut egui::Ui) {
        let snap = self.settings.read();
        let s = snap.settings;

        ui.heading("Altimeter");
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            let mut hpa = s.altimeter_unit_is_hpa;
            let a = ui.radio_value(&mut hpa, true, "hPa").clicked();
            let b = ui.radio_value(&mut hpa, false, "inHg").clicked();
            if (a || b) && hpa != s.altimeter_unit_is_hpa {
                self.submit(Ok(SettingsDelta::SetAltimeterUnitHpa(hpa)));
            }
        });
        let unit = if s.altimeter_unit_is_hpa { "hPa" } else { "inHg" };
        if entry_row(ui, "Setting", &mut self.entries.altimeter, unit) {
            let d = altimeter_delta(s.altimeter_unit_is_hpa, &self.entries.altimeter);
            self.submit(d);
        }
        let mut std = s.std_mode_requested;
        if ui.checkbox(&mut std, "STD (1013.25 hPa)").changed() {
            self.submit(Ok(SettingsDelta::SetStd(std)));
        }
        let device = if snap.device_std_active {
            "STD".to_string()
        } else if s.altimeter_unit_is_hpa {
            format!("{} hPa", crate::units::pa_to_hpa(snap.device_setting_pa))
        } else {
            format!("{:.2} inHg", crate::units::pa_to_inhg(snap.device_setting_pa))
        };
        kv_line(ui, "Flight computer", device);

        if entry_row(ui, "Transition alt", &mut self.entries.transition_altitude, "ft") {
            let d = parse_entry("transition altitude", &self.entries.transition_altitude)
                .map(SettingsDelta::SetTransitionAltitude);
            self.submit(d);
        }
        if entry_row(ui, "Transition lvl", &mut self.entries.transition_level, "FL") {
            let d = parse_entry("transition level", &self.entries.transition_level)
                .map(SettingsDelta::SetTransitionLevel);
            self.submit(d);
        }

        ui.separator();
        ui.heading("Compass");
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            let mut tru = s.mag_reference_is_true;
            let a = ui.radio_value(&mut tru, false, "Magnetic").clicked();
            let b = ui.radio_value(&mut tru, true, "True").clicked();
            if (a || b) && tru != s.mag_reference_is_true {
                self.submit(Ok(SettingsDelta::SetMagReferenceTrue(tru)));
            }
        });
        let mut tilt = s.mag_tilt_correction_enabled;
        if ui.checkbox(&mut tilt, "Tilt correction").changed() {
            self.submit(Ok(SettingsDelta::SetTiltCorrection(tilt)));
        }
        if entry_row(ui, "Variation", &mut self.entries.variation, "° (W+)") {
            let d = parse_entry("magnetic variation", &self.entries.variation)
                .map(SettingsDelta::SetMagneticVariation);
            self.submit(d);
        }

        ui.separator();
        ui.heading("G meter");
        ui.add_space(4.0);
        kv_line(ui, "Now", format!("{:.2} g", snap.vertical_g));
        if s.g_peak_max >= s.g_peak_min {
            kv_line(ui, "Peaks", format!("{:.1} / {:.1} g", s.g_peak_min, s.g_peak_max));
        } else {
            kv_line(ui, "Peaks", "-");
        }
        if ui.button("Reset peaks").clicked() {
            self.submit(Ok(SettingsDelta::ResetGPeaks));
        }

        if let Some(err) = &self.entry_error {
            ui.separator();
            ui.colored_label(Color32::LIGHT_RED, err.as_str());
        }
    }

    fn logs_view(&mut self, ui: &mut egui::Ui, status: &LinkStatus) {
        ui.horizontal(|ui| {
            ui.heading("Logs");
            ui.separator();
            ui.checkbox(&mut self.autoscroll, "Auto-scroll");
        });
        let st = status.stats;
        ui.label(format!(
            "lines {}  applied {}  ignored {}  skipped {}  frames {}  timeouts {}  last {:?}",
            st.lines, st.applied, st.ignored, st.skipped, st.frames, st.timeouts, status.last_frame
        ));
        ui.separator();

        let logs = self.logs.snapshot();
        let row_height = 16.0;
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(false)
            .show(ui, |ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .cell_layout(egui::Layout::left_to_right(egui::Align::Min))
                    .column(Column::remainder())
                    .body(|body| {
                        body.rows(row_height, logs.len(), |mut row| {
                            let i = row.index();
                            row.col(|ui| {
                                ui.label(RichText::new(&logs[i]).monospace().color(Color32::LIGHT_GRAY));
                            });
                        });
                    });

                if self.autoscroll && logs.len() > self.last_log_count {
                    let _ = ui.label("");
                    ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                }
                self.last_log_count = logs.len();
            });
    }
}

impl eframe::App for PfdApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint_after(self.repaint);

        let mut style = (*ctx.style()).clone();
        style.spacing.item_spacing = Vec2::new(6.0, 6.0);
        ctx.set_style(style);

        let status = self.status.lock().clone();

        egui::TopBottomPanel::top("top").show(ctx, |ui| self.top_bar(ui, &status));

        match self.active_tab {
            Tab::Pfd => {
                egui::SidePanel::right("settings")
                    .resizable(false)
                    .default_width(260.0)
                    .show(ctx, |ui| {
                        egui::ScrollArea::vertical().show(ui, |ui| self.settings_panel(ui));
                    });

                egui::CentralPanel::default()
                    .frame(egui::Frame::none().fill(Color32::BLACK))
                    .show(ctx, |ui| {
                        let frame = self.frames.lock().clone();
                        let (rect, _) = ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
                        match frame {
                            Some(f) => painter::paint(ui.painter(), rect, &f.draw),
                            None => {
                                ui.painter().text(
                                    rect.center(),
                                    egui::Align2::CENTER_CENTER,
                                    "Waiting for first frame",
                                    egui::FontId::proportional(18.0),
                                    Color32::GRAY,
                                );
                            }
                        }
                    });
            }
            Tab::Logs => {
                egui::CentralPanel::default().show(ctx, |ui| self.logs_view(ui, &status));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::LinkHealth;
    use crate::settings::CockpitSettings;
    use crate::state::shared_cockpit;

    #[test]
    fn badge_follows_link_state() {
        let mut st = LinkStatus::default();
        assert_eq!(LinkBadge::from_status(&st), LinkBadge::Disconnected);
        st.open = true;
        st.health = LinkHealth {
            data_timeout: true,
            low_rate: false,
        };
        assert_eq!(LinkBadge::from_status(&st), LinkBadge::NoData);
        st.health.data_timeout = false;
        assert_eq!(LinkBadge::from_status(&st), LinkBadge::Receiving);
    }

    #[test]
    fn altimeter_entry_uses_selected_unit() {
        assert_eq!(altimeter_delta(true, "1020"), Ok(SettingsDelta::SetAltimeterHpa(1020)));
        assert_eq!(altimeter_delta(false, "29.92"), Ok(SettingsDelta::SetAltimeterInHg(29.92)));
        assert!(altimeter_delta(true, "29.92").is_err());
    }

    #[test]
    fn entries_mirror_settings() {
        let port = CockpitSettings::new(shared_cockpit());
        let e = Entries::from_snapshot(&port.read());
        assert_eq!(e.altimeter, "1013");
        assert_eq!(e.transition_altitude, "10000");
        assert_eq!(e.transition_level, "100");
        assert_eq!(e.variation, "0.0");

        port.apply(SettingsDelta::SetAltimeterUnitHpa(false)).unwrap();
        assert_eq!(Entries::from_snapshot(&port.read()).altimeter, "29.92");
    }

    fn app_with_clock(tx: Sender<ClockCmd>) -> PfdApp {
        PfdApp::new(
            Default::default(),
            Default::default(),
            Box::new(CockpitSettings::new(shared_cockpit())),
            tx,
            LogBuffer::default(),
            30,
        )
    }

    #[test]
    fn reconnect_reaches_the_clock() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let app = app_with_clock(tx);
        assert!(app.request_reconnect());
        assert!(matches!(rx.try_recv(), Ok(ClockCmd::Reconnect)));
    }

    #[test]
    fn reconnect_without_clock_is_logged() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);
        let app = app_with_clock(tx);

        let logs = LogBuffer::default();
        let sub = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(logs.clone())
            .finish();
        let sent = tracing::subscriber::with_default(sub, || app.request_reconnect());

        assert!(!sent);
        assert!(logs
            .snapshot()
            .iter()
            .any(|l| l.contains("WARN") && l.contains("frame clock is not running")));
    }

    #[test]
    fn rejected_entry_keeps_text_and_reports() {
        let cockpit = shared_cockpit();
        let (tx, _rx) = crossbeam_channel::unbounded();
        let mut app = PfdApp::new(
            Default::default(),
            Default::default(),
            Box::new(CockpitSettings::new(cockpit.clone())),
            tx,
            LogBuffer::default(),
            30,
        );
        app.entries.altimeter = "900".into();
        let d = altimeter_delta(true, &app.entries.altimeter);
        app.submit(d);
        assert_eq!(app.entries.altimeter, "900");
        assert!(app.entry_error.as_deref().is_some_and(|e| e.contains("altimeter hPa")));
        assert_eq!(cockpit.lock().settings.altimeter_hpa, 1013);

        app.entries.altimeter = "1002".into();
        let d = altimeter_delta(true, &app.entries.altimeter);
        app.submit(d);
        assert!(app.entry_error.is_none());
        assert_eq!(cockpit.lock().settings.altimeter_hpa, 1002);
    }
}
