use crate::state::{FlightState, SettingsModel};
use crate::units;

use super::{pt, Anchor, DrawList, Layer, AMBER, GREEN, WHITE};

/// How the altimeter-setting box should look this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AltimeterIndication {
    pub std: bool,
    /// Reference is appropriate for the current altitude.
    pub green: bool,
    /// Show the device setting under `STD`.
    pub standby: bool,
}

/// Keeps the STD / QNH indication steady around the transition boundaries.
///
/// STD is green above the transition level and stays green until the mode
/// changes. QNH is green below the transition altitude. Inside the band
/// between the two, an amber frame in one mode arms the other, so the
/// pilot's switch shows green at once. Leaving the band clears both.
#[derive(Debug, Clone, Default)]
pub struct TransitionLatch {
    std_sticky: bool,
    /// Armed by amber QNH frames, lets STD show green.
    to_std: bool,
    /// Armed by amber STD frames, lets QNH show green.
    to_qnh: bool,
    standby_armed: bool,
    last_std: Option<bool>,
    prev_setting_pa: Option<f64>,
}

impl TransitionLatch {
    pub fn update(&mut self, flight: &FlightState, settings: &SettingsModel) -> AltimeterIndication {
        let std = flight.settings.alt_std_active;
        let alt = flight.derived.indicated_alt_ft;
        let setting = flight.settings.alt_setting_pa;
        let below_ta = alt < f64::from(settings.transition_altitude_ft);
        let above_tl = alt > f64::from(settings.transition_level_fl) * 100.0;

        if self.last_std != Some(std) {
            self.std_sticky = false;
            self.standby_armed = false;
            self.last_std = Some(std);
        }

        let green = if std {
            if above_tl {
                self.std_sticky = true;
            }
            let moved = self
                .prev_setting_pa
                .is_some_and(|prev| units::round_to(prev, 1) != units::round_to(setting, 1));
            if moved {
                self.standby_armed = true;
            }
            let green = self.std_sticky || self.to_std;
            if !green {
                self.to_qnh = true;
            }
            green
        } else {
            let green = below_ta || self.to_qnh;
            if !green {
                self.to_std = true;
            }
            green
        };

        if below_ta || above_tl {
            self.to_std = false;
            self.to_qnh = false;
        }
        self.prev_setting_pa = Some(setting);

        AltimeterIndication {
            std,
            green,
            standby: std && self.standby_armed,
        }
    }
}

fn setting_text(pa: f64, hpa_unit: bool) -> String {
    if hpa_unit {
        units::pa_to_hpa(pa).to_string()
    } else {
        format!("{:.2}", units::pa_to_inhg(pa))
    }
}

fn unit_text(hpa_unit: bool) -> &'static str {
    if hpa_unit {
        "HPA"
    } else {
        "IN."
    }
}

fn standby_text(pa: f64, hpa_unit: bool) -> String {
    format!("{} {}", setting_text(pa, hpa_unit), unit_text(hpa_unit))
}

pub(super) fn draw(list: &mut DrawList, ind: AltimeterIndication, flight: &FlightState, settings: &SettingsModel) {
    let l = Layer::AltimeterSetting;
    let hpa = settings.altimeter_unit_is_hpa;
    let device_pa = flight.settings.alt_setting_pa;
    let color = if ind.green { GREEN } else { AMBER };
    let standby_at = pt(646.0, 785.0);

    if ind.std {
        list.text(l, "STD", pt(653.0, 755.0), Anchor::TopLeft, 20.0, color);
        if ind.standby {
            list.text(l, standby_text(device_pa, hpa), standby_at, Anchor::TopLeft, 12.0, WHITE);
        }
    } else {
        list.text(l, setting_text(device_pa, hpa), pt(638.0, 760.0), Anchor::TopLeft, 14.0, color);
        list.text(l, unit_text(hpa), pt(720.0, 762.0), Anchor::TopLeft, 12.0, color);
        if !settings.matches_setting(device_pa) {
            // not yet taken by the flight computer
            let pending = settings.commanded_setting_pa();
            list.text(l, standby_text(pending, hpa), standby_at, Anchor::TopLeft, 12.0, WHITE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sim {
        latch: TransitionLatch,
        flight: FlightState,
        settings: SettingsModel,
    }

    impl Sim {
        fn new() -> Self {
            let mut flight = FlightState::default();
            flight.static_pressure.healthy = true;
            Self {
                latch: TransitionLatch::default(),
                flight,
                settings: SettingsModel::default(),
            }
        }

        fn frame(&mut self, alt: f64) -> AltimeterIndication {
            self.flight.derived.indicated_alt_ft = alt;
            self.latch.update(&self.flight, &self.settings)
        }

        fn texts(&mut self) -> Vec<(String, crate::render::Rgb)> {
            let ind = self.latch.update(&self.flight, &self.settings);
            let mut list = DrawList::default();
            draw(&mut list, ind, &self.flight, &self.settings);
            list.texts().map(|(t, c)| (t.to_string(), c)).collect()
        }
    }

    #[test]
    fn std_turns_green_above_transition_level_and_stays() {
        let mut sim = Sim::new();
        sim.flight.settings.alt_std_active = true;

        for alt in [9500.0, 9800.0, 10_000.0] {
            let ind = sim.frame(alt);
            assert!(ind.std && !ind.green, "{alt}");
        }
        assert!(sim.frame(10_001.0).green);
        // dipping back below does not flicker
        assert!(sim.frame(9_990.0).green);
        assert!(sim.frame(9_000.0).green);

        // STD off and on again re-arms from scratch
        sim.flight.settings.alt_std_active = false;
        sim.frame(9_000.0);
        sim.flight.settings.alt_std_active = true;
        assert!(!sim.frame(9_000.0).green);
    }

    #[test]
    fn qnh_turns_amber_climbing_through_transition_altitude() {
        let mut sim = Sim::new();
        assert!(sim.frame(5_000.0).green);
        assert!(sim.frame(9_999.0).green);
        assert!(!sim.frame(10_000.0).green);
        assert!(!sim.frame(15_000.0).green);
        // back below on the way down
        assert!(sim.frame(9_500.0).green);
    }

    #[test]
    fn switching_inside_transition_band_shows_green() {
        let mut sim = Sim::new();
        sim.settings.transition_altitude_ft = 6_000;
        sim.settings.transition_level_fl = 80;

        // climbing on QNH past TA: amber, asking for STD
        assert!(sim.frame(5_000.0).green);
        assert!(!sim.frame(7_000.0).green);
        sim.flight.settings.alt_std_active = true;
        assert!(sim.frame(7_000.0).green);
        assert!(sim.frame(7_500.0).green);
        assert!(sim.frame(8_500.0).green);
    }

    #[test]
    fn switching_back_to_qnh_inside_band_shows_green() {
        let mut sim = Sim::new();
        sim.settings.transition_altitude_ft = 6_000;
        sim.settings.transition_level_fl = 80;
        sim.flight.settings.alt_std_active = true;

        // descending on STD below the level: amber, asking for QNH
        assert!(!sim.frame(7_000.0).green);
        sim.flight.settings.alt_std_active = false;
        assert!(sim.frame(7_000.0).green);
        assert!(sim.frame(6_500.0).green);
    }

    #[test]
    fn leaving_the_band_clears_the_switch_latches() {
        let mut sim = Sim::new();
        sim.settings.transition_altitude_ft = 6_000;
        sim.settings.transition_level_fl = 80;

        assert!(!sim.frame(7_000.0).green);
        // back below TA without switching
        assert!(sim.frame(5_000.0).green);
        sim.flight.settings.alt_std_active = true;
        assert!(!sim.frame(5_000.0).green);
        assert!(!sim.frame(7_000.0).green);
    }

    #[test]
    fn qnh_shows_device_setting_in_selected_unit() {
        let mut sim = Sim::new();
        sim.flight.settings.alt_setting_pa = 101_600.0;
        sim.settings.altimeter_hpa = 1016;
        sim.flight.derived.indicated_alt_ft = 2_000.0;
        let t = sim.texts();
        assert!(t.contains(&("1016".to_string(), GREEN)));
        assert!(t.contains(&("HPA".to_string(), GREEN)));
        assert_eq!(t.len(), 2);

        sim.settings.altimeter_unit_is_hpa = false;
        sim.settings.altimeter_inhg = 30.00;
        let t = sim.texts();
        assert!(t.contains(&("30.00".to_string(), GREEN)));
        assert!(t.contains(&("IN.".to_string(), GREEN)));
    }

    #[test]
    fn pending_setting_shown_until_echoed() {
        let mut sim = Sim::new();
        sim.settings.altimeter_hpa = 1020;
        let t = sim.texts();
        assert!(t.contains(&("1013".to_string(), GREEN)));
        assert!(t.contains(&("1020 HPA".to_string(), WHITE)));

        sim.flight.settings.alt_setting_pa = 102_000.0;
        let t = sim.texts();
        assert!(!t.iter().any(|(s, _)| s.ends_with(" HPA")));
    }

    #[test]
    fn standby_appears_when_setting_changes_under_std() {
        let mut sim = Sim::new();
        sim.flight.settings.alt_std_active = true;
        sim.settings.std_mode_requested = true;
        assert!(!sim.frame(5_000.0).standby);

        sim.flight.settings.alt_setting_pa = 100_900.0;
        assert!(sim.frame(5_000.0).standby);
        // stays up while on STD
        assert!(sim.frame(5_000.0).standby);
        let t = sim.texts();
        assert!(t.contains(&("1009 HPA".to_string(), WHITE)));
        assert!(t.contains(&("STD".to_string(), AMBER)));

        sim.flight.settings.alt_std_active = false;
        assert!(!sim.frame(5_000.0).standby);
    }
}
