use crate::protocol::LinkHealth;
use crate::state::FlightState;

use super::{pt, Anchor, DrawList, FlagKind, Layer, Point, Primitive, BLACK, RED};

const BANNER_CENTER: Point = pt(429.0, 20.0);
const BANNER_TEXT_SIZE: f32 = 24.0;
const BANNER_BOX: (f32, f32) = (200.0, 34.0);

fn flag_position(kind: FlagKind) -> Point {
    match kind {
        FlagKind::Att => pt(361.0, 350.0),
        FlagKind::AttBorder => pt(0.0, 0.0),
        FlagKind::Hdg => pt(358.0, 815.0),
        FlagKind::Alt => pt(666.0, 373.0),
        FlagKind::Vert => pt(789.0, 359.0),
        FlagKind::Spd => pt(88.0, 373.0),
        FlagKind::DataRate => pt(30.0, 770.0),
    }
}

/// Flags raised for this frame, in drawing order.
pub fn raised(flight: &FlightState, health: LinkHealth) -> Vec<FlagKind> {
    let mut out = Vec::new();
    if !flight.imu.healthy {
        out.extend([FlagKind::AttBorder, FlagKind::Att]);
    }
    if !flight.mag.healthy {
        out.push(FlagKind::Hdg);
    }
    if !flight.static_pressure.healthy {
        out.extend([FlagKind::Alt, FlagKind::Vert]);
    }
    if !flight.diff_pressure.healthy {
        out.push(FlagKind::Spd);
    }
    if health.low_rate {
        out.push(FlagKind::DataRate);
    }
    out
}

pub(super) fn draw(list: &mut DrawList, flight: &FlightState, health: LinkHealth) {
    for kind in raised(flight, health) {
        list.push(
            Layer::Flags,
            Primitive::Flag {
                kind,
                at: flag_position(kind),
            },
        );
    }

    if health.data_timeout {
        let (w, h) = BANNER_BOX;
        list.rect(
            Layer::Banner,
            pt(BANNER_CENTER.x - w / 2.0, BANNER_CENTER.y - h / 2.0),
            pt(BANNER_CENTER.x + w / 2.0, BANNER_CENTER.y + h / 2.0),
            BLACK,
        );
        list.text(Layer::Banner, "DATA TIMEOUT", BANNER_CENTER, Anchor::Center, BANNER_TEXT_SIZE, RED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK: LinkHealth = LinkHealth {
        data_timeout: false,
        low_rate: false,
    };

    #[test]
    fn every_failed_subsystem_raises_its_flag() {
        let f = FlightState::default();
        let flags = raised(&f, LinkHealth { low_rate: true, ..OK });
        assert_eq!(
            flags,
            vec![
                FlagKind::AttBorder,
                FlagKind::Att,
                FlagKind::Hdg,
                FlagKind::Alt,
                FlagKind::Vert,
                FlagKind::Spd,
                FlagKind::DataRate,
            ]
        );
    }

    #[test]
    fn healthy_aircraft_raises_nothing() {
        let mut f = FlightState::default();
        f.imu.healthy = true;
        f.mag.healthy = true;
        f.static_pressure.healthy = true;
        f.diff_pressure.healthy = true;
        assert!(raised(&f, OK).is_empty());

        f.mag.healthy = false;
        assert_eq!(raised(&f, OK), vec![FlagKind::Hdg]);
    }

    #[test]
    fn banner_is_additive() {
        let f = FlightState::default();
        let mut list = DrawList::default();
        draw(&mut list, &f, LinkHealth { data_timeout: true, ..OK });
        assert_eq!(list.flags().count(), 6);
        assert_eq!(list.in_layer(Layer::Banner).count(), 2);
    }
}
