//! Round gauges in the upper corners of the attitude window.

use crate::state::SettingsModel;

use super::{pt, Anchor, DrawList, Layer, Point, GREEN, WHITE};

const GAUGE_RADIUS: f32 = 42.0;
const TICK_LENGTH: f32 = 8.0;
const TICK_WIDTH: f32 = 3.0;
const NEEDLE_WIDTH: f32 = 4.0;

// -----------------------------
// Angle of attack
// -----------------------------

const AOA_CENTER: Point = pt(555.0, 147.0);
const AOA_SCALE: f64 = 4.5;
const AOA_ARC: (f64, f64) = (-90.0, 135.0);

/// Needle angle for an AoA, and the value shown after clamping.
pub fn aoa_needle(aoa_deg: f64) -> (f64, f64) {
    let angle = (aoa_deg * AOA_SCALE).clamp(AOA_ARC.0, AOA_ARC.1);
    (angle, angle / AOA_SCALE)
}

pub(super) fn draw_aoa(list: &mut DrawList, aoa_deg: f64) {
    let l = Layer::AngleOfAttack;
    let arc = (AOA_ARC.0 as f32, AOA_ARC.1 as f32);
    let (angle, shown) = aoa_needle(aoa_deg);

    list.arc(l, AOA_CENTER, GAUGE_RADIUS, arc, 1.0, WHITE);
    list.ticks(l, AOA_CENTER, GAUGE_RADIUS, arc, 6, -TICK_LENGTH, TICK_WIDTH, WHITE);
    list.hand(l, AOA_CENTER, GAUGE_RADIUS, angle as f32, NEEDLE_WIDTH, WHITE);
    list.text(l, format!("{shown:.1}"), pt(513.0, 152.0), Anchor::TopLeft, 10.0, WHITE);
}

// -----------------------------
// Vertical G
// -----------------------------

const G_CENTER: Point = pt(221.0, 147.0);
const G_SCALE: f64 = 67.5;
const G_ARC: (f64, f64) = (45.0, 315.0);

/// 1 g points left; more g turns the needle up, counter-clockwise.
pub fn g_needle(g: f64) -> f64 {
    (-(g - 1.0) * G_SCALE + 180.0).clamp(G_ARC.0, G_ARC.1)
}

/// Track extrema, honouring a pending reset request.
pub fn update_g_peaks(settings: &mut SettingsModel, g: f64) {
    if g > settings.g_peak_max {
        settings.g_peak_max = g;
    }
    if g < settings.g_peak_min {
        settings.g_peak_min = g;
    }
    if settings.g_peak_reset_requested {
        settings.g_peak_max = g;
        settings.g_peak_min = g;
        settings.g_peak_reset_requested = false;
    }
}

pub(super) fn draw_g_meter(list: &mut DrawList, g: f64, settings: &mut SettingsModel) {
    update_g_peaks(settings, g);

    let l = Layer::GMeter;
    let arc = (G_ARC.0 as f32, G_ARC.1 as f32);
    let peaks = (
        g_needle(settings.g_peak_max) as f32,
        g_needle(settings.g_peak_min) as f32,
    );

    list.text(l, "0", pt(211.0, 155.0), Anchor::TopLeft, 14.0, WHITE);
    list.text(l, "2", pt(211.0, 117.0), Anchor::TopLeft, 14.0, WHITE);
    list.ticks(l, G_CENTER, GAUGE_RADIUS, arc, 5, -TICK_LENGTH, TICK_WIDTH, WHITE);
    list.ticks(l, G_CENTER, GAUGE_RADIUS, peaks, 2, TICK_LENGTH, TICK_WIDTH, GREEN);
    list.arc(l, G_CENTER, GAUGE_RADIUS, arc, 1.0, WHITE);
    list.hand(l, G_CENTER, GAUGE_RADIUS, g_needle(g) as f32, NEEDLE_WIDTH, WHITE);
    list.text(l, format!("{g:.1}"), pt(240.0, 135.0), Anchor::TopLeft, 14.0, WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aoa_clamps_to_arc() {
        assert_eq!(aoa_needle(10.0), (45.0, 10.0));
        assert_eq!(aoa_needle(40.0), (135.0, 30.0));
        assert_eq!(aoa_needle(-30.0), (-90.0, -20.0));
    }

    #[test]
    fn aoa_drawn_with_one_decimal() {
        let mut list = DrawList::default();
        draw_aoa(&mut list, 4.44);
        assert!(list.texts().any(|(t, _)| t == "4.4"));
    }

    #[test]
    fn g_needle_positions() {
        assert_eq!(g_needle(1.0), 180.0);
        assert_eq!(g_needle(0.0), 247.5);
        assert_eq!(g_needle(2.0), 112.5);
        assert_eq!(g_needle(5.0), 45.0);
        assert_eq!(g_needle(-3.0), 315.0);
    }

    #[test]
    fn peaks_track_extrema_and_reset() {
        let mut s = SettingsModel::default();
        for g in [1.0, 2.5, -0.5, 1.2] {
            update_g_peaks(&mut s, g);
        }
        assert_eq!((s.g_peak_max, s.g_peak_min), (2.5, -0.5));

        s.g_peak_reset_requested = true;
        update_g_peaks(&mut s, 1.1);
        assert_eq!((s.g_peak_max, s.g_peak_min), (1.1, 1.1));
        assert!(!s.g_peak_reset_requested);

        update_g_peaks(&mut s, 1.4);
        assert_eq!((s.g_peak_max, s.g_peak_min), (1.4, 1.1));
    }

    #[test]
    fn g_meter_draws_peak_ticks_in_green() {
        let mut s = SettingsModel::default();
        let mut list = DrawList::default();
        draw_g_meter(&mut list, 1.3, &mut s);
        let green = list
            .items()
            .iter()
            .filter(|i| matches!(i.primitive, crate::render::Primitive::Line { color, .. } if color == GREEN))
            .count();
        assert_eq!(green, 2);
        assert!(list.texts().any(|(t, _)| t == "1.3"));
    }
}
