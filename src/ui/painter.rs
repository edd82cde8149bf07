//! Paints a [`DrawList`] with egui shapes.
//!
//! Fixed artwork (sphere, pointers, bezel) is drawn as vector shapes in
//! the same 858 x 857 pixel space the renderer uses, then scaled to fit.

use egui::epaint::TextShape;
use egui::{Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, Vec2};

use crate::render::{
    polar, pt, vsi_offset_px, Anchor, DrawList, FlagKind, Point, Primitive, Rgb, SymbolKind, SCREEN_HEIGHT,
    SCREEN_WIDTH,
};

const SKY: Color32 = Color32::from_rgb(0, 120, 215);
const GROUND: Color32 = Color32::from_rgb(130, 80, 20);
const FLAG_FILL: Color32 = Color32::from_rgb(20, 20, 20);
const FLAG_TEXT: Color32 = Color32::from_rgb(255, 179, 0);
const VSI_FILL: Color32 = Color32::from_gray(50);

const PX_PER_PITCH_DEG: f32 = 8.8;
const ROLL_SCALE_RADIUS: f32 = 200.0;
const ARC_STEP_DEG: f32 = 2.0;

fn color(c: Rgb) -> Color32 {
    Color32::from_rgb(c.0, c.1, c.2)
}

/// Turn `v` clockwise on a y-down screen.
pub fn rotate(v: Vec2, deg: f32) -> Vec2 {
    let (s, c) = deg.to_radians().sin_cos();
    Vec2::new(v.x * c - v.y * s, v.x * s + v.y * c)
}

/// Uniform scale and offset from PFD pixels to egui points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub origin: Pos2,
    pub scale: f32,
}

impl Viewport {
    /// Largest centred fit of the PFD inside `rect`.
    pub fn fit(rect: Rect) -> Self {
        let scale = (rect.width() / SCREEN_WIDTH).min(rect.height() / SCREEN_HEIGHT).max(0.01);
        let size = Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT) * scale;
        Self {
            origin: rect.center() - size / 2.0,
            scale,
        }
    }

    pub fn pos(&self, p: Point) -> Pos2 {
        self.origin + Vec2::new(p.x, p.y) * self.scale
    }

    pub fn screen(&self) -> Rect {
        Rect::from_min_size(self.origin, Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT) * self.scale)
    }

    /// Local artwork coordinates around `at`, turned by `rot` degrees.
    fn local(&self, at: Point, rot: f32, v: Vec2) -> Pos2 {
        let r = rotate(v, rot);
        self.pos(pt(at.x + r.x, at.y + r.y))
    }

    fn stroke(&self, width: f32, c: Color32) -> Stroke {
        Stroke::new((width * self.scale).max(1.0), c)
    }
}

pub fn paint(painter: &Painter, rect: Rect, list: &DrawList) {
    let vp = Viewport::fit(rect);
    let painter = painter.with_clip_rect(vp.screen());
    painter.rect_filled(vp.screen(), 0.0, Color32::BLACK);

    for item in list.items() {
        match &item.primitive {
            Primitive::Symbol {
                kind,
                at,
                rotation_deg,
                color: c,
            } => symbol(&painter, &vp, *kind, *at, *rotation_deg, color(*c)),
            Primitive::Flag { kind, at } => flag(&painter, &vp, *kind, *at),
            Primitive::Line {
                from,
                to,
                width,
                color: c,
            } => {
                painter.line_segment([vp.pos(*from), vp.pos(*to)], vp.stroke(*width, color(*c)));
            }
            Primitive::Arc {
                center,
                radius,
                start_deg,
                end_deg,
                width,
                color: c,
            } => {
                let steps = (((end_deg - start_deg) / ARC_STEP_DEG).ceil() as usize).max(1);
                let points = (0..=steps)
                    .map(|i| {
                        let a = start_deg + (end_deg - start_deg) * i as f32 / steps as f32;
                        vp.pos(polar(*center, *radius, a))
                    })
                    .collect();
                painter.add(Shape::line(points, vp.stroke(*width, color(*c))));
            }
            Primitive::Circle {
                center,
                radius,
                color: c,
            } => {
                painter.circle_filled(vp.pos(*center), radius * vp.scale, color(*c));
            }
            Primitive::Rect { min, max, color: c } => {
                painter.rect_filled(Rect::from_two_pos(vp.pos(*min), vp.pos(*max)), 0.0, color(*c));
            }
            Primitive::Text {
                text,
                at,
                anchor,
                size,
                color: c,
                rotation_deg,
            } => {
                let galley = painter.layout_no_wrap(text.clone(), FontId::monospace(size * vp.scale), color(*c));
                let g = galley.size();
                let offset = match anchor {
                    Anchor::TopLeft => Vec2::ZERO,
                    Anchor::Center => -g / 2.0,
                    Anchor::RightCenter => Vec2::new(-g.x, -g.y / 2.0),
                };
                let pos = vp.pos(*at) + rotate(offset, *rotation_deg);
                painter.add(TextShape::new(pos, galley, color(*c)).with_angle(rotation_deg.to_radians()));
            }
        }
    }
}

// -----------------------------
// Artwork
// -----------------------------

fn polygon(painter: &Painter, vp: &Viewport, at: Point, rot: f32, pts: &[(f32, f32)], fill: Color32, outline: Stroke) {
    let points = pts.iter().map(|&(x, y)| vp.local(at, rot, Vec2::new(x, y))).collect();
    painter.add(Shape::convex_polygon(points, fill, outline));
}

fn segment(painter: &Painter, vp: &Viewport, at: Point, rot: f32, a: (f32, f32), b: (f32, f32), stroke: Stroke) {
    painter.line_segment(
        [vp.local(at, rot, Vec2::new(a.0, a.1)), vp.local(at, rot, Vec2::new(b.0, b.1))],
        stroke,
    );
}

fn symbol(painter: &Painter, vp: &Viewport, kind: SymbolKind, at: Point, rot: f32, c: Color32) {
    let thin = vp.stroke(2.0, c);
    match kind {
        SymbolKind::AttitudeSphere => sphere(painter, vp, at, rot),
        SymbolKind::RollPointer => {
            let r = ROLL_SCALE_RADIUS;
            polygon(painter, vp, at, rot, &[(0.0, -r), (12.0, 20.0 - r), (-12.0, 20.0 - r)], c, Stroke::NONE);
        }
        SymbolKind::SlipSkid { filled } => {
            let top = 22.0 - ROLL_SCALE_RADIUS;
            let pts = [(-14.0, top), (14.0, top), (14.0, top + 8.0), (-14.0, top + 8.0)];
            let fill = if filled { c } else { Color32::TRANSPARENT };
            polygon(painter, vp, at, rot, &pts, fill, thin);
        }
        SymbolKind::SplitAxisPointer => {
            let bar = vp.stroke(6.0, c);
            for side in [-1.0, 1.0] {
                segment(painter, vp, at, 0.0, (side * 130.0, 0.0), (side * 55.0, 0.0), bar);
                segment(painter, vp, at, 0.0, (side * 55.0, -3.0), (side * 55.0, 18.0), bar);
            }
            painter.rect_filled(
                Rect::from_center_size(vp.pos(at), Vec2::splat(8.0 * vp.scale)),
                0.0,
                c,
            );
        }
        SymbolKind::RollScale => {
            let center = at;
            for (deg, long) in [(10.0, false), (20.0, false), (30.0, true), (45.0, false), (60.0, true)] {
                for a in [90.0 - deg, 90.0 + deg] {
                    let len = if long { 22.0 } else { 12.0 };
                    painter.line_segment(
                        [
                            vp.pos(polar(center, ROLL_SCALE_RADIUS, a)),
                            vp.pos(polar(center, ROLL_SCALE_RADIUS + len, a)),
                        ],
                        thin,
                    );
                }
            }
            let r = ROLL_SCALE_RADIUS;
            polygon(painter, vp, at, 0.0, &[(0.0, -r), (-10.0, -r - 16.0), (10.0, -r - 16.0)], Color32::TRANSPARENT, thin);
        }
        SymbolKind::VsiBackground => {
            let hi = vsi_offset_px(6000.0) as f32;
            let pts = [(-80.0, -hi - 10.0), (0.0, -hi + 60.0), (0.0, hi - 60.0), (-80.0, hi + 10.0)];
            polygon(painter, vp, at, 0.0, &pts, VSI_FILL, Stroke::NONE);
            for (fpm, label) in [(500.0, None), (1000.0, Some("1")), (1500.0, None), (2000.0, Some("2")), (4000.0, None), (6000.0, Some("6"))] {
                let dy = vsi_offset_px(fpm) as f32;
                for sign in [-1.0, 1.0] {
                    let y = sign * dy;
                    segment(painter, vp, at, 0.0, (-80.0, y), (-68.0, y), thin);
                    if let Some(l) = label {
                        painter.text(
                            vp.local(at, 0.0, Vec2::new(-62.0, y)),
                            egui::Align2::LEFT_CENTER,
                            l,
                            FontId::monospace(12.0 * vp.scale),
                            c,
                        );
                    }
                }
            }
        }
        SymbolKind::Bezel => {
            painter.rect_stroke(vp.screen().shrink(2.0 * vp.scale), 6.0 * vp.scale, vp.stroke(4.0, Color32::from_gray(70)));
        }
        SymbolKind::SpeedPointer => {
            let pts = [(-37.0, -22.0), (33.0, -22.0), (33.0, -8.0), (46.0, 0.0), (33.0, 8.0), (33.0, 22.0), (-37.0, 22.0)];
            readout_box(painter, vp, at, &pts, c);
        }
        SymbolKind::AltitudePointer => {
            let pts = [(-50.0, 0.0), (-38.0, -8.0), (-38.0, -22.0), (43.0, -22.0), (43.0, 22.0), (-38.0, 22.0), (-38.0, 8.0)];
            readout_box(painter, vp, at, &pts, c);
        }
        SymbolKind::CompassPointer => {
            polygon(painter, vp, at, 0.0, &[(-11.0, -10.0), (11.0, -10.0), (0.0, 9.0)], c, Stroke::NONE);
        }
    }
}

/// Black box with a notch toward the tape; not convex, so drawn as a
/// closed outline over a filled core.
fn readout_box(painter: &Painter, vp: &Viewport, at: Point, pts: &[(f32, f32)], c: Color32) {
    let (min_x, max_x) = pts.iter().fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.0), hi.max(p.0)));
    let core = Rect::from_two_pos(vp.local(at, 0.0, Vec2::new(min_x + 12.0, -22.0)), vp.local(at, 0.0, Vec2::new(max_x - 12.0, 22.0)));
    painter.rect_filled(core, 0.0, Color32::BLACK);
    let points = pts.iter().map(|&(x, y)| vp.local(at, 0.0, Vec2::new(x, y))).collect();
    painter.add(Shape::closed_line(points, vp.stroke(2.0, c)));
}

/// Horizon, sky, ground and pitch ladder, in sphere-local coordinates
/// where the horizon runs through `at`.
fn sphere(painter: &Painter, vp: &Viewport, at: Point, rot: f32) {
    let (w, h) = (700.0, 1700.0);
    polygon(painter, vp, at, rot, &[(-w, -h), (w, -h), (w, 0.0), (-w, 0.0)], SKY, Stroke::NONE);
    polygon(painter, vp, at, rot, &[(-w, 0.0), (w, 0.0), (w, h), (-w, h)], GROUND, Stroke::NONE);
    segment(painter, vp, at, rot, (-w, 0.0), (w, 0.0), vp.stroke(2.0, Color32::WHITE));

    let rung = vp.stroke(2.0, Color32::WHITE);
    for step in (-18..=18).filter(|s| *s != 0) {
        let pitch = step as f32 * 5.0;
        let y = -pitch * PX_PER_PITCH_DEG;
        let major = step % 2 == 0;
        let half = if major { 60.0 } else { 25.0 };
        segment(painter, vp, at, rot, (-half, y), (half, y), rung);
        if major {
            let label = format!("{}", pitch.abs() as i32);
            for x in [-half - 22.0, half + 22.0] {
                let galley = painter.layout_no_wrap(label.clone(), FontId::monospace(14.0 * vp.scale), Color32::WHITE);
                let offset = rotate(-galley.size() / 2.0, rot);
                let pos = vp.local(at, rot, Vec2::new(x, y)) + offset;
                painter.add(TextShape::new(pos, galley, Color32::WHITE).with_angle(rot.to_radians()));
            }
        }
    }
}

fn flag(painter: &Painter, vp: &Viewport, kind: FlagKind, at: Point) {
    if kind == FlagKind::AttBorder {
        let window = Rect::from_two_pos(vp.pos(pt(180.0, 190.0)), vp.pos(pt(600.0, 640.0)));
        painter.rect_stroke(window, 0.0, vp.stroke(3.0, FLAG_TEXT));
        return;
    }
    let galley = painter.layout_no_wrap(kind.label().to_string(), FontId::monospace(20.0 * vp.scale), FLAG_TEXT);
    let pad = Vec2::splat(4.0 * vp.scale);
    let top_left = vp.pos(at);
    let frame = Rect::from_min_size(top_left, galley.size() + pad * 2.0);
    painter.rect_filled(frame, 2.0, FLAG_FILL);
    painter.rect_stroke(frame, 2.0, vp.stroke(2.0, FLAG_TEXT));
    painter.galley(top_left + pad, galley, FLAG_TEXT);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_fits_and_centres() {
        let vp = Viewport::fit(Rect::from_min_size(Pos2::ZERO, Vec2::new(1716.0, 900.0)));
        assert!((vp.scale - 900.0 / SCREEN_HEIGHT).abs() < 1e-6);
        let screen = vp.screen();
        assert!((screen.center().x - 858.0).abs() < 1e-3);
        assert!((screen.height() - 900.0).abs() < 1e-3);
        assert_eq!(vp.pos(pt(0.0, 0.0)), screen.min);
    }

    #[test]
    fn rotation_is_clockwise_on_screen() {
        let v = rotate(Vec2::new(1.0, 0.0), 90.0);
        assert!(v.x.abs() < 1e-6 && (v.y - 1.0).abs() < 1e-6);
        let v = rotate(Vec2::new(0.0, -1.0), 90.0);
        assert!((v.x - 1.0).abs() < 1e-6 && v.y.abs() < 1e-6);
    }
}
