//! Frame-synchronous instrument pipeline.
//!
//! [`Renderer::render`] maps one flight-state snapshot to a [`DrawList`] of
//! toolkit-independent primitives in screen pixels (858 x 857, y down). The
//! painter on the UI side only walks the list.

mod altimeter;
mod attitude;
mod compass;
mod flags;
mod gauges;
mod tapes;
mod turn_rate;
mod vspeed;

pub use altimeter::{AltimeterIndication, TransitionLatch};
pub use attitude::pitch_offset_deg;
pub use tapes::{Gridline, Tape};
pub use vspeed::vsi_offset_px;

use crate::protocol::LinkHealth;
use crate::state::{FlightState, SettingsModel};

pub const SCREEN_WIDTH: f32 = 858.0;
pub const SCREEN_HEIGHT: f32 = 857.0;

// -----------------------------
// Geometry and colors
// -----------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

pub const fn pt(x: f32, y: f32) -> Point {
    Point { x, y }
}

/// Point on a circle, angle counter-clockwise from +x as seen on screen.
pub fn polar(center: Point, radius: f32, angle_deg: f32) -> Point {
    let a = angle_deg.to_radians();
    pt(center.x + radius * a.cos(), center.y - radius * a.sin())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const WHITE: Rgb = Rgb(255, 255, 255);
pub const BLACK: Rgb = Rgb(0, 0, 0);
pub const GRAY: Rgb = Rgb(104, 104, 104);
pub const GREEN: Rgb = Rgb(0, 255, 0);
pub const AMBER: Rgb = Rgb(255, 179, 0);
pub const RED: Rgb = Rgb(252, 0, 0);

// -----------------------------
// Draw list
// -----------------------------

/// Composition order, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Attitude,
    AttitudeMask,
    SpeedTape,
    AltitudeTape,
    VerticalSpeed,
    SpeedTrend,
    Compass,
    Bezel,
    TurnRate,
    Readouts,
    AltimeterSetting,
    AngleOfAttack,
    GMeter,
    Flags,
    Banner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    Center,
    /// Right edge at `at.x`, vertically centred on `at.y`.
    RightCenter,
}

/// Fixed artwork, drawn by the painter however it likes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    AttitudeSphere,
    RollPointer,
    SlipSkid { filled: bool },
    SplitAxisPointer,
    RollScale,
    VsiBackground,
    Bezel,
    SpeedPointer,
    AltitudePointer,
    CompassPointer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Att,
    AttBorder,
    Hdg,
    Alt,
    Vert,
    Spd,
    DataRate,
}

impl FlagKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Att => "ATT",
            Self::AttBorder => "",
            Self::Hdg => "HDG",
            Self::Alt => "ALT",
            Self::Vert => "VERT",
            Self::Spd => "SPD",
            Self::DataRate => "DATA RATE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Artwork centred on `at`, turned clockwise by `rotation_deg`.
    Symbol {
        kind: SymbolKind,
        at: Point,
        rotation_deg: f32,
        color: Rgb,
    },
    /// Fault flag with its top-left corner at `at`.
    Flag { kind: FlagKind, at: Point },
    Line {
        from: Point,
        to: Point,
        width: f32,
        color: Rgb,
    },
    /// Angles counter-clockwise from +x, `start_deg <= end_deg`.
    Arc {
        center: Point,
        radius: f32,
        start_deg: f32,
        end_deg: f32,
        width: f32,
        color: Rgb,
    },
    Circle {
        center: Point,
        radius: f32,
        color: Rgb,
    },
    Rect {
        min: Point,
        max: Point,
        color: Rgb,
    },
    Text {
        text: String,
        at: Point,
        anchor: Anchor,
        size: f32,
        color: Rgb,
        /// Clockwise, about the anchor point.
        rotation_deg: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub layer: Layer,
    pub primitive: Primitive,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    items: Vec<DrawItem>,
}

impl DrawList {
    pub fn push(&mut self, layer: Layer, primitive: Primitive) {
        self.items.push(DrawItem { layer, primitive });
    }

    pub fn line(&mut self, layer: Layer, from: Point, to: Point, width: f32, color: Rgb) {
        self.push(
            layer,
            Primitive::Line {
                from,
                to,
                width,
                color,
            },
        );
    }

    pub fn text(
        &mut self,
        layer: Layer,
        text: impl Into<String>,
        at: Point,
        anchor: Anchor,
        size: f32,
        color: Rgb,
    ) {
        self.push(
            layer,
            Primitive::Text {
                text: text.into(),
                at,
                anchor,
                size,
                color,
                rotation_deg: 0.0,
            },
        );
    }

    pub fn symbol(&mut self, layer: Layer, kind: SymbolKind, at: Point, rotation_deg: f32, color: Rgb) {
        self.push(
            layer,
            Primitive::Symbol {
                kind,
                at,
                rotation_deg,
                color,
            },
        );
    }

    pub fn rect(&mut self, layer: Layer, min: Point, max: Point, color: Rgb) {
        self.push(layer, Primitive::Rect { min, max, color });
    }

    pub fn arc(&mut self, layer: Layer, center: Point, radius: f32, (start_deg, end_deg): (f32, f32), width: f32, color: Rgb) {
        self.push(
            layer,
            Primitive::Arc {
                center,
                radius,
                start_deg: start_deg.min(end_deg),
                end_deg: start_deg.max(end_deg),
                width,
                color,
            },
        );
    }

    /// `count` evenly spaced radial ticks from `start_deg` to `end_deg`.
    /// Positive `length` points outward, negative inward.
    #[allow(clippy::too_many_arguments)]
    pub fn ticks(
        &mut self,
        layer: Layer,
        center: Point,
        radius: f32,
        (start_deg, end_deg): (f32, f32),
        count: usize,
        length: f32,
        width: f32,
        color: Rgb,
    ) {
        let step = if count > 1 {
            (end_deg - start_deg) / (count - 1) as f32
        } else {
            0.0
        };
        for i in 0..count {
            let a = start_deg + step * i as f32;
            self.line(
                layer,
                polar(center, radius, a),
                polar(center, radius + length, a),
                width,
                color,
            );
        }
    }

    /// Needle from the centre out to `radius`.
    pub fn hand(&mut self, layer: Layer, center: Point, radius: f32, angle_deg: f32, width: f32, color: Rgb) {
        self.line(layer, center, polar(center, radius, angle_deg), width, color);
    }

    /// Back-to-front order; items keep push order within a layer.
    fn finish(mut self) -> Self {
        self.items.sort_by_key(|i| i.layer);
        self
    }

    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn in_layer(&self, layer: Layer) -> impl Iterator<Item = &Primitive> + '_ {
        self.items
            .iter()
            .filter(move |i| i.layer == layer)
            .map(|i| &i.primitive)
    }

    /// Every text item as (text, color).
    pub fn texts(&self) -> impl Iterator<Item = (&str, Rgb)> + '_ {
        self.items.iter().filter_map(|i| match &i.primitive {
            Primitive::Text { text, color, .. } => Some((text.as_str(), *color)),
            _ => None,
        })
    }

    pub fn flags(&self) -> impl Iterator<Item = FlagKind> + '_ {
        self.items.iter().filter_map(|i| match i.primitive {
            Primitive::Flag { kind, .. } => Some(kind),
            _ => None,
        })
    }
}

// -----------------------------
// Renderer
// -----------------------------

/// Holds the only state that outlives a frame: the altimeter transition latch.
#[derive(Debug, Default)]
pub struct Renderer {
    latch: TransitionLatch,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one frame. Mutates only the latch and the G-peak fields of
    /// `settings`.
    pub fn render(
        &mut self,
        flight: &FlightState,
        settings: &mut SettingsModel,
        health: LinkHealth,
    ) -> DrawList {
        let mut list = DrawList::default();

        if flight.imu.healthy {
            attitude::draw(&mut list, flight);
            vspeed::draw_speed_trend(&mut list, flight.derived.linear_accel_g);
            turn_rate::draw(&mut list, flight.derived.turn_rate_dps);
            gauges::draw_g_meter(&mut list, flight.imu.ay, settings);
        }
        attitude::draw_mask(&mut list);

        if flight.diff_pressure.healthy {
            tapes::draw_speed(&mut list, &flight.derived);
        }
        if flight.static_pressure.healthy {
            tapes::draw_altitude(&mut list, flight.derived.indicated_alt_ft);
            vspeed::draw(&mut list, flight.derived.baro_vspd_fpm);
            let ind = self.latch.update(flight, settings);
            altimeter::draw(&mut list, ind, flight, settings);
        }
        if flight.mag.healthy {
            compass::draw(&mut list, flight, settings);
        }
        list.symbol(Layer::Bezel, SymbolKind::Bezel, pt(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0), 0.0, WHITE);
        gauges::draw_aoa(&mut list, flight.aoa_deg);

        flags::draw(&mut list, flight, health);

        list.finish()
    }
}
