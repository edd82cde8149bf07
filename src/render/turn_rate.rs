use super::compass::{DIAL_CENTER, DIAL_RADIUS};
use super::{DrawList, Layer, GREEN, WHITE};

const SCALE: f64 = 2.0;
const LIMIT_DEG: f64 = 40.0;

/// Arc deflection in dial degrees; right turns sweep clockwise.
pub fn deflection_deg(turn_rate_dps: f64) -> f64 {
    (-turn_rate_dps * SCALE).clamp(-LIMIT_DEG, LIMIT_DEG)
}

pub(super) fn draw(list: &mut DrawList, turn_rate_dps: f64) {
    let l = Layer::TurnRate;
    let lim = LIMIT_DEG as f32;
    let scale = SCALE as f32;

    list.arc(l, DIAL_CENTER, DIAL_RADIUS, (90.0 - lim, 90.0 + lim), 1.0, WHITE);
    list.ticks(l, DIAL_CENTER, DIAL_RADIUS, (90.0 - 20.0 * scale, 90.0 + 20.0 * scale), 5, 10.0, 2.0, WHITE);
    list.ticks(l, DIAL_CENTER, DIAL_RADIUS, (90.0 - 6.0 * scale, 90.0 + 6.0 * scale), 9, 6.0, 2.0, WHITE);
    list.ticks(l, DIAL_CENTER, DIAL_RADIUS, (90.0 - 6.0 * scale, 90.0 + 6.0 * scale), 5, 10.0, 2.0, WHITE);

    let d = deflection_deg(turn_rate_dps) as f32;
    if d != 0.0 {
        list.arc(l, DIAL_CENTER, DIAL_RADIUS, (90.0, 90.0 + d), 2.0, GREEN);
    }
}
