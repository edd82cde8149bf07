use crate::state::{FlightState, SettingsModel};

use super::{pt, Anchor, DrawList, Layer, Point, Primitive, Rgb, SymbolKind, AMBER, GRAY, GREEN, WHITE};

pub(super) const DIAL_CENTER: Point = pt(390.0, 968.0);
pub(super) const DIAL_RADIUS: f32 = 257.0;

const SHORT_TICK: f32 = 15.0;
const LONG_TICK: f32 = 25.0;
const TICK_WIDTH: f32 = 4.0;

/// Displayed heading and its status annunciation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompassReading {
    pub heading_deg: f64,
    pub status: &'static str,
    pub status_color: Rgb,
}

/// Tilt correction needs a working IMU; without one the uncorrected heading
/// is shown whatever the pilot selected.
pub fn reading(flight: &FlightState, settings: &SettingsModel) -> CompassReading {
    let corrected = settings.mag_tilt_correction_enabled && flight.imu.healthy;
    let base = if corrected {
        flight.derived.mag_heading_corr_deg
    } else {
        flight.derived.mag_heading_uncorr_deg
    };
    let heading_deg = if settings.mag_reference_is_true {
        base + settings.magnetic_variation_deg
    } else {
        base
    };
    let (status, status_color) = match (settings.mag_reference_is_true, corrected) {
        (false, true) => ("MAG", GREEN),
        (true, true) => ("TRU", GREEN),
        (false, false) => ("MAG UNCORR", AMBER),
        (true, false) => ("TRU UNCORR", AMBER),
    };
    CompassReading {
        heading_deg,
        status,
        status_color,
    }
}

pub(super) fn draw(list: &mut DrawList, flight: &FlightState, settings: &SettingsModel) {
    let l = Layer::Compass;
    let r = reading(flight, settings);
    let heading = r.heading_deg as f32;

    list.push(
        l,
        Primitive::Circle {
            center: DIAL_CENTER,
            radius: DIAL_RADIUS,
            color: GRAY,
        },
    );

    for degree in (0..360).step_by(10) {
        let major = degree % 30 == 0;
        // screen angle, clockwise from +x; the current heading sits at the top
        let a = (degree as f32 - heading - 90.0).to_radians();
        let at = |radius: f32| pt(DIAL_CENTER.x + radius * a.cos(), DIAL_CENTER.y + radius * a.sin());

        let inner = DIAL_RADIUS - if major { LONG_TICK } else { SHORT_TICK };
        list.line(l, at(inner), at(DIAL_RADIUS), TICK_WIDTH, WHITE);

        list.push(
            l,
            Primitive::Text {
                text: (degree / 10).to_string(),
                at: at(DIAL_RADIUS - LONG_TICK - 10.0),
                anchor: Anchor::Center,
                size: if major { 16.0 } else { 12.0 },
                color: WHITE,
                rotation_deg: degree as f32 - heading,
            },
        );
    }
    list.text(l, r.status, pt(446.0, 810.0), Anchor::TopLeft, 10.0, r.status_color);

    list.symbol(Layer::Readouts, SymbolKind::CompassPointer, pt(390.0, 700.0), 0.0, WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight(imu: bool) -> FlightState {
        let mut f = FlightState::default();
        f.imu.healthy = imu;
        f.mag.healthy = true;
        f.derived.mag_heading_corr_deg = 100.0;
        f.derived.mag_heading_uncorr_deg = 95.0;
        f
    }

    #[test]
    fn status_follows_reference_and_correction() {
        let mut s = SettingsModel {
            magnetic_variation_deg: -5.0,
            ..SettingsModel::default()
        };
        assert_eq!(reading(&flight(true), &s).status, "MAG");
        assert_eq!(reading(&flight(true), &s).heading_deg, 100.0);

        s.mag_reference_is_true = true;
        let r = reading(&flight(true), &s);
        assert_eq!((r.status, r.heading_deg, r.status_color), ("TRU", 95.0, GREEN));

        s.mag_tilt_correction_enabled = false;
        let r = reading(&flight(true), &s);
        assert_eq!((r.status, r.heading_deg, r.status_color), ("TRU UNCORR", 90.0, AMBER));
    }

    #[test]
    fn failed_imu_forces_uncorrected_without_touching_settings() {
        let s = SettingsModel::default();
        let r = reading(&flight(false), &s);
        assert_eq!(r.status, "MAG UNCORR");
        assert_eq!(r.heading_deg, 95.0);
        assert!(s.mag_tilt_correction_enabled);
    }

    #[test]
    fn current_heading_label_is_upright_at_the_top() {
        let mut f = flight(true);
        f.derived.mag_heading_corr_deg = 270.0;
        let mut list = DrawList::default();
        draw(&mut list, &f, &SettingsModel::default());

        let label = list.items().iter().find_map(|i| match &i.primitive {
            Primitive::Text {
                text,
                at,
                rotation_deg,
                ..
            } if text == "27" => Some((*at, *rotation_deg)),
            _ => None,
        });
        let (at, rot) = label.expect("27 label");
        assert!((at.x - DIAL_CENTER.x).abs() < 1e-3);
        assert!(at.y < DIAL_CENTER.y);
        assert_eq!(rot, 0.0);
        assert_eq!(list.in_layer(Layer::Compass).filter(|p| matches!(p, Primitive::Line { .. })).count(), 36);
    }
}
