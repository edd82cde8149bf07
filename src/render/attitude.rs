use crate::state::FlightState;

use super::{pt, DrawList, Layer, Point, SymbolKind, AMBER, BLACK, SCREEN_HEIGHT, SCREEN_WIDTH, WHITE};

const CENTER: Point = pt(388.0, 427.0);
const PX_PER_PITCH_DEG: f64 = 8.8;
const BANK_CAUTION_DEG: f64 = 35.0;
const SLIP_PX_PER_G: f64 = 250.0;
const SLIP_SATURATION_G: f64 = 0.2;

/// Visible window of the attitude sphere; everything outside is masked.
const WINDOW_MIN: Point = pt(180.0, 190.0);
const WINDOW_MAX: Point = pt(600.0, 640.0);

/// Fold pitch into the range the sphere artwork can show. Beyond the poles
/// the aircraft is inverted, so the reading is shifted by 180 degrees.
pub fn pitch_offset_deg(pitch: f64) -> f64 {
    if (-90.0..90.0).contains(&pitch) {
        pitch
    } else if (90.0..180.0).contains(&pitch) {
        pitch - 180.0
    } else {
        pitch + 180.0
    }
}

/// Sphere displacement in pixels along the roll-rotated vertical axis.
pub fn sphere_offset(pitch: f64, roll: f64) -> (f64, f64) {
    let axis = (90.0 - roll).to_radians();
    let d = PX_PER_PITCH_DEG * pitch_offset_deg(pitch);
    ((axis.cos() * d).round(), (axis.sin() * d).round())
}

/// Slip ball displacement and whether it has saturated.
fn slip_offset(ax: f64, roll: f64) -> ((f64, f64), bool) {
    let saturated = ax.abs() > SLIP_SATURATION_G;
    let g = if saturated {
        ax.signum() * SLIP_SATURATION_G
    } else {
        ax
    };
    let r = roll.to_radians();
    let dx = (g * SLIP_PX_PER_G * r.cos()).round();
    let dy = -(g * SLIP_PX_PER_G * r.sin()).round();
    ((dx, dy), saturated)
}

pub(super) fn draw(list: &mut DrawList, flight: &FlightState) {
    let roll = flight.derived.roll_deg;
    let turn = -roll as f32;
    let caution = if roll.abs() >= BANK_CAUTION_DEG { AMBER } else { WHITE };

    let (dx, dy) = sphere_offset(flight.derived.pitch_deg, roll);
    let sphere = pt(CENTER.x + dx as f32, CENTER.y + dy as f32);
    list.symbol(Layer::Attitude, SymbolKind::AttitudeSphere, sphere, turn, WHITE);
    list.symbol(Layer::Attitude, SymbolKind::RollPointer, CENTER, turn, caution);

    let ((sx, sy), filled) = slip_offset(flight.imu.ax, roll);
    list.symbol(
        Layer::Attitude,
        SymbolKind::SlipSkid { filled },
        pt(CENTER.x + sx as f32, CENTER.y + sy as f32),
        turn,
        caution,
    );

    list.symbol(Layer::Attitude, SymbolKind::SplitAxisPointer, CENTER, 0.0, WHITE);
    list.symbol(Layer::Attitude, SymbolKind::RollScale, CENTER, 0.0, WHITE);
}

pub(super) fn draw_mask(list: &mut DrawList) {
    let l = Layer::AttitudeMask;
    list.rect(l, pt(0.0, 0.0), pt(SCREEN_WIDTH, WINDOW_MIN.y), BLACK);
    list.rect(l, pt(0.0, WINDOW_MAX.y), pt(SCREEN_WIDTH, SCREEN_HEIGHT), BLACK);
    list.rect(l, pt(0.0, WINDOW_MIN.y), pt(WINDOW_MIN.x, WINDOW_MAX.y), BLACK);
    list.rect(l, pt(WINDOW_MAX.x, WINDOW_MIN.y), pt(SCREEN_WIDTH, WINDOW_MAX.y), BLACK);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Primitive;
    use proptest::prelude::*;

    fn symbols(flight: &FlightState) -> Vec<(SymbolKind, Point, f32, crate::render::Rgb)> {
        let mut list = DrawList::default();
        draw(&mut list, flight);
        list.items()
            .iter()
            .filter_map(|i| match i.primitive {
                Primitive::Symbol {
                    kind,
                    at,
                    rotation_deg,
                    color,
                } => Some((kind, at, rotation_deg, color)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn pitch_folds_past_the_poles() {
        assert_eq!(pitch_offset_deg(-90.0), -90.0);
        assert_eq!(pitch_offset_deg(45.0), 45.0);
        assert_eq!(pitch_offset_deg(90.0), -90.0);
        assert_eq!(pitch_offset_deg(135.0), -45.0);
        assert_eq!(pitch_offset_deg(-135.0), 45.0);
        assert_eq!(pitch_offset_deg(-90.5), 89.5);
    }

    #[test]
    fn nose_up_moves_sphere_down_wings_level() {
        assert_eq!(sphere_offset(10.0, 0.0), (0.0, 88.0));
        assert_eq!(sphere_offset(-5.0, 0.0), (0.0, -44.0));
        // in a 90 degree right bank the pitch axis is horizontal
        assert_eq!(sphere_offset(10.0, 90.0), (88.0, 0.0));
    }

    #[test]
    fn bank_caution_turns_pointer_amber() {
        let mut f = FlightState::default();
        f.derived.roll_deg = -34.9;
        let s = symbols(&f);
        assert_eq!(s[1].0, SymbolKind::RollPointer);
        assert_eq!(s[1].3, WHITE);
        assert_eq!(s[0].2, 34.9f64 as f32);

        f.derived.roll_deg = -35.0;
        let s = symbols(&f);
        assert_eq!(s[1].3, AMBER);
        assert_eq!(s[2].3, AMBER);
    }

    #[test]
    fn slip_ball_saturates_and_fills() {
        let mut f = FlightState::default();
        f.imu.ax = 0.1;
        let s = symbols(&f);
        assert_eq!(s[2].0, SymbolKind::SlipSkid { filled: false });
        assert_eq!(s[2].1, pt(CENTER.x + 25.0, CENTER.y));

        f.imu.ax = -0.6;
        let s = symbols(&f);
        assert_eq!(s[2].0, SymbolKind::SlipSkid { filled: true });
        assert_eq!(s[2].1, pt(CENTER.x - 50.0, CENTER.y));
    }

    #[test]
    fn mask_leaves_the_window_open() {
        let mut list = DrawList::default();
        draw_mask(&mut list);
        let inside = pt(390.0, 415.0);
        for item in list.items() {
            if let Primitive::Rect { min, max, color } = item.primitive {
                assert_eq!(color, BLACK);
                let covers = min.x <= inside.x && inside.x < max.x && min.y <= inside.y && inside.y < max.y;
                assert!(!covers);
            }
        }
        assert_eq!(list.len(), 4);
    }

    proptest! {
        #[test]
        fn level_pitch_range_is_linear(p in -90.0f64..90.0) {
            prop_assert_eq!(pitch_offset_deg(p), p);
        }

        #[test]
        fn sweep_through_inverted_is_continuous(p in 179.0f64..180.0, roll in -180.0f64..180.0) {
            // 180 and -180 are the same attitude
            let a = sphere_offset(p, roll);
            let b = sphere_offset(p - 360.0, roll);
            prop_assert!((a.0 - b.0).abs() <= 1.0 && (a.1 - b.1).abs() <= 1.0);
        }

        #[test]
        fn crossing_the_pole_with_roll_flip_is_continuous(roll in -90.0f64..90.0) {
            let below = sphere_offset(89.999, roll);
            let above = sphere_offset(90.0, roll + 180.0);
            prop_assert!((below.0 - above.0).abs() <= 1.0 && (below.1 - above.1).abs() <= 1.0);
        }
    }
}
