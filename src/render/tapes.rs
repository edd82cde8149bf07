use crate::state::Derived;

use super::{pt, Anchor, DrawList, Layer, SymbolKind, GRAY, WHITE};

const POINTER_Y: f64 = 427.0;
const LINE_WIDTH: f32 = 3.0;

/// A moving scale read against a fixed pointer. The tape is laid out in
/// sections of `2 * lapse_px`; the gridlines of one section are drawn around
/// its reference line so the pointer always has labels on both sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tape {
    pub min: f64,
    pub max: f64,
    pub units_per_div: f64,
    pub px_per_div: f64,
    pub lapse_px: f64,
    /// Value span of one section.
    pub section_units: f64,
    /// Gridlines drawn above and below the section reference.
    pub half_lines: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gridline {
    pub y: f64,
    pub value: i64,
    pub labelled: bool,
}

pub const SPEED_TAPE: Tape = Tape {
    min: 30.0,
    max: 220.0,
    units_per_div: 10.0,
    px_per_div: 50.0,
    lapse_px: 250.0,
    section_units: 100.0,
    half_lines: 10,
};

pub const ALTITUDE_TAPE: Tape = Tape {
    min: -2000.0,
    max: 36000.0,
    units_per_div: 100.0,
    px_per_div: 75.0,
    lapse_px: 300.0,
    section_units: 800.0,
    half_lines: 8,
};

impl Tape {
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    fn units_per_px(&self) -> f64 {
        self.units_per_div / self.px_per_div
    }

    /// Signed section holding `value`; sections grow away from zero.
    pub fn section(&self, value: f64) -> i64 {
        let px = value / self.units_per_px();
        let s = if px.abs() < self.lapse_px {
            1
        } else {
            ((px.abs() - self.lapse_px) / (2.0 * self.lapse_px)).ceil() as i64 + 1
        };
        if px < 0.0 {
            -s
        } else {
            s
        }
    }

    /// Gridlines for the (clamped) `value`, top to bottom order not
    /// guaranteed. Lines whose value falls off the scale are skipped.
    pub fn gridlines(&self, value: f64) -> Vec<Gridline> {
        let value = self.clamp(value);
        let s = self.section(value);
        let base = (if s >= 0 { s - 1 } else { s + 1 }) as f64;
        let ref_y = (POINTER_Y + value / self.units_per_px() - base * 2.0 * self.lapse_px).round();
        let ref_value = base * self.section_units;

        (-self.half_lines..=self.half_lines)
            .filter_map(|i| {
                let v = (ref_value + i as f64 * self.units_per_div) as i64;
                let on_scale = self.min as i64 <= v && v <= self.max as i64;
                on_scale.then_some(Gridline {
                    y: ref_y - i as f64 * self.px_per_div,
                    value: v,
                    labelled: i % 2 == 0,
                })
            })
            .collect()
    }
}

pub(super) fn draw_speed(list: &mut DrawList, derived: &Derived) {
    let l = Layer::SpeedTape;
    list.rect(l, pt(45.0, 105.0), pt(155.0, 750.0), GRAY);
    for g in SPEED_TAPE.gridlines(derived.kias) {
        let y = g.y as f32;
        list.line(l, pt(128.0, y), pt(152.0, y), LINE_WIDTH, WHITE);
        if g.labelled {
            list.text(l, g.value.to_string(), pt(118.0, y + 1.0), Anchor::RightCenter, 16.0, WHITE);
        }
    }

    let speed = SPEED_TAPE.clamp(derived.kias);
    list.symbol(Layer::Readouts, SymbolKind::SpeedPointer, pt(82.0, 427.0), 0.0, WHITE);
    list.text(
        Layer::Readouts,
        format!("{}", speed.round() as i64),
        pt(47.0, 409.0),
        Anchor::TopLeft,
        20.0,
        WHITE,
    );
    if let Some(m) = mach_text(derived.kias, derived.mach) {
        list.text(Layer::Readouts, m, pt(71.0, 770.0), Anchor::TopLeft, 20.0, WHITE);
    }
}

/// Mach shows from 100 KIAS, three decimals, no leading zero.
pub fn mach_text(kias: f64, mach: f64) -> Option<String> {
    if kias.trunc() < 100.0 {
        return None;
    }
    let s = format!("{mach:.3}");
    Some(match s.strip_prefix('0') {
        Some(rest) if rest.starts_with('.') => rest.to_string(),
        _ => s,
    })
}

pub(super) fn draw_altitude(list: &mut DrawList, indicated_alt_ft: f64) {
    let l = Layer::AltitudeTape;
    list.rect(l, pt(623.0, 105.0), pt(733.0, 750.0), GRAY);
    for g in ALTITUDE_TAPE.gridlines(indicated_alt_ft) {
        let y = g.y as f32;
        list.line(l, pt(625.0, y), pt(649.0, y), LINE_WIDTH, WHITE);
        if g.labelled {
            list.text(l, g.value.to_string(), pt(653.0, y - 12.0), Anchor::TopLeft, 14.0, WHITE);
        }
    }

    let alt = ALTITUDE_TAPE.clamp(indicated_alt_ft);
    let shown = (alt / 10.0).round() as i64 * 10;
    list.symbol(Layer::Readouts, SymbolKind::AltitudePointer, pt(690.0, 427.0), 0.0, WHITE);
    list.text(Layer::Readouts, shown.to_string(), pt(671.0, 410.0), Anchor::TopLeft, 18.0, WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(lines: &[Gridline], value: i64) -> Option<Gridline> {
        lines.iter().copied().find(|g| g.value == value)
    }

    #[test]
    fn speed_134_kt() {
        let lines = SPEED_TAPE.gridlines(134.2);
        assert_eq!(SPEED_TAPE.section(134.2), 2);
        assert!(lines.iter().all(|g| (30..=220).contains(&g.value)));
        assert_eq!(at(&lines, 130).map(|g| g.y), Some(448.0));
        assert_eq!(at(&lines, 140).map(|g| g.y), Some(398.0));
        assert!(at(&lines, 140).is_some_and(|g| g.labelled));
        assert!(at(&lines, 130).is_some_and(|g| !g.labelled));

        let mut list = DrawList::default();
        let derived = Derived {
            kias: 134.2,
            ..Derived::default()
        };
        draw_speed(&mut list, &derived);
        assert!(list.texts().any(|(t, _)| t == "134"));
    }

    #[test]
    fn speed_below_scale_pins_to_minimum() {
        let lines = SPEED_TAPE.gridlines(5.0);
        let lowest = lines.iter().map(|g| g.value).min();
        assert_eq!(lowest, Some(30));
        assert_eq!(at(&lines, 30).map(|g| g.y), Some(427.0));
    }

    #[test]
    fn negative_altitude_uses_negative_sections() {
        assert_eq!(ALTITUDE_TAPE.section(-1000.0), -2);
        let lines = ALTITUDE_TAPE.gridlines(-1000.0);
        assert_eq!(at(&lines, -1000).map(|g| g.y), Some(427.0));
        assert!(lines.iter().all(|g| g.value >= -2000));

        let lines = ALTITUDE_TAPE.gridlines(0.0);
        assert_eq!(at(&lines, 0).map(|g| g.y), Some(427.0));
        assert_eq!(lines.len(), 17);
    }

    #[test]
    fn altitude_readout_rounds_to_ten_feet() {
        let mut list = DrawList::default();
        draw_altitude(&mut list, 4_536.0);
        assert!(list.texts().any(|(t, _)| t == "4540"));
    }

    #[test]
    fn mach_format() {
        assert_eq!(mach_text(99.9, 0.15), None);
        assert_eq!(mach_text(100.0, 0.8046).as_deref(), Some(".805"));
        assert_eq!(mach_text(180.0, 1.2).as_deref(), Some("1.200"));
    }

    proptest! {
        #[test]
        fn gridlines_sit_where_their_value_is(v in -3000.0f64..40000.0) {
            let t = ALTITUDE_TAPE;
            let shown = t.clamp(v);
            let lines = t.gridlines(v);
            prop_assert!(!lines.is_empty());
            for g in lines {
                prop_assert!(t.min as i64 <= g.value && g.value <= t.max as i64);
                let expect = POINTER_Y + (shown - g.value as f64) / t.units_per_px();
                prop_assert!((g.y - expect).abs() <= 0.5 + 1e-6, "{:?} vs {}", g, expect);
            }
        }

        #[test]
        fn pointer_is_always_bracketed(v in 30.0f64..220.0) {
            let lines = SPEED_TAPE.gridlines(v);
            prop_assert!(lines.iter().any(|g| (g.y - POINTER_Y).abs() <= 26.0));
        }
    }
}
