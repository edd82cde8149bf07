use super::{pt, Anchor, DrawList, Layer, Point, SymbolKind, GREEN, WHITE};

const VSI_PIVOT: Point = pt(857.0, 427.0);
const VSI_TIE_X: f32 = 778.0;
const VSI_WIDTH: f32 = 5.0;

/// (upper bound in fpm, fpm per pixel) for each scale segment.
const VSI_SEGMENTS: [(f64, f64); 3] = [(1000.0, 12.19), (2000.0, 16.66), (6000.0, 100.0)];

const READOUT_MIN_FPM: i64 = 300;
const READOUT_LIMIT_FPM: i64 = 9999;

/// Needle tip displacement from centre in pixels; positive is a climb.
pub fn vsi_offset_px(fpm: f64) -> f64 {
    let mut rest = fpm.abs();
    let mut lower = 0.0;
    let mut px = 0.0;
    for (upper, fpm_per_px) in VSI_SEGMENTS {
        let span = rest.min(upper - lower);
        px += span / fpm_per_px;
        rest -= span;
        lower = upper;
    }
    px.round().copysign(fpm)
}

/// Readout text and where it goes, if the rate is worth showing.
pub fn vsi_readout(fpm: f64) -> Option<(String, Point)> {
    let v = ((fpm / 50.0).round() as i64 * 50).clamp(-READOUT_LIMIT_FPM, READOUT_LIMIT_FPM);
    if v >= READOUT_MIN_FPM {
        Some((v.to_string(), pt(752.0, 200.0)))
    } else if v <= -READOUT_MIN_FPM {
        Some((v.to_string(), pt(752.0, 635.0)))
    } else {
        None
    }
}

pub(super) fn draw(list: &mut DrawList, fpm: f64) {
    let l = Layer::VerticalSpeed;
    list.symbol(l, SymbolKind::VsiBackground, VSI_PIVOT, 0.0, WHITE);
    let tie = pt(VSI_TIE_X, VSI_PIVOT.y - vsi_offset_px(fpm) as f32);
    list.line(l, VSI_PIVOT, tie, VSI_WIDTH, WHITE);

    if let Some((text, at)) = vsi_readout(fpm) {
        list.text(Layer::Readouts, text, at, Anchor::TopLeft, 14.0, WHITE);
    }
}

// -----------------------------
// Speed trend
// -----------------------------

const TREND_X: f32 = 128.0;
const TREND_BASE_Y: f64 = 427.0;
const TREND_PX_PER_G: f64 = 2000.0;
const TREND_DEAD_ZONE_PX: f64 = 10.0;
const TREND_TOP_Y: f64 = 427.0 - 318.0;
const TREND_BOTTOM_Y: f64 = 427.0 + 319.0;
const TREND_WIDTH: f32 = 4.0;

/// Arrow tip y for a longitudinal acceleration, or `None` inside the dead zone.
pub fn trend_tip_y(linear_accel_g: f64) -> Option<f64> {
    let tip = TREND_BASE_Y + (-linear_accel_g * TREND_PX_PER_G).round();
    if (tip - TREND_BASE_Y).abs() < TREND_DEAD_ZONE_PX {
        return None;
    }
    Some(tip.clamp(TREND_TOP_Y, TREND_BOTTOM_Y))
}

pub(super) fn draw_speed_trend(list: &mut DrawList, linear_accel_g: f64) {
    let Some(tip) = trend_tip_y(linear_accel_g) else {
        return;
    };
    let l = Layer::SpeedTrend;
    let start = pt(TREND_X, TREND_BASE_Y as f32);
    let end = pt(TREND_X, tip as f32);
    list.line(l, start, end, TREND_WIDTH, GREEN);

    // arrow head, 10 px barbs at 30 degrees
    let heading = f32::atan2(start.y - end.y, end.x - start.x);
    let barb = std::f32::consts::FRAC_PI_6;
    for side in [heading + barb, heading - barb] {
        let to = pt(end.x + 10.0 * side.cos(), end.y + 10.0 * side.sin());
        list.line(l, end, to, TREND_WIDTH, GREEN);
    }
}
