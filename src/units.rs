//! Altimeter-setting unit conversions.
//!
//! The wire carries the setting as pressure in pascals; the pilot enters it in
//! whole hPa or in inHg with two decimals.

pub const STD_PRESSURE_PA: f64 = 101_325.0; // ICAO Doc 7488/3
pub const HPA_TO_INHG: f64 = 0.029_529_980_572_284_86;

pub const HPA_RANGE: (i32, i32) = (940, 1050);
pub const INHG_RANGE: (f64, f64) = (27.50, 31.50);

/// Round to `decimals` places, halves away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let p = 10f64.powi(decimals);
    (value * p).round() / p
}

pub fn pa_to_hpa(pa: f64) -> i32 {
    (pa / 100.0).round() as i32
}

pub fn pa_to_inhg(pa: f64) -> f64 {
    round_to(pa / 100.0 * HPA_TO_INHG, 2)
}

pub fn hpa_to_inhg(hpa: i32) -> f64 {
    round_to(hpa as f64 * HPA_TO_INHG, 2)
}

pub fn inhg_to_hpa(inhg: f64) -> i32 {
    (inhg / HPA_TO_INHG).round() as i32
}

/// Pascal value sent for a commanded hPa setting.
pub fn hpa_to_wire_pa(hpa: i32) -> f64 {
    (hpa as f64 * 100.0).trunc()
}

/// Pascal value sent for a commanded inHg setting.
pub fn inhg_to_wire_pa(inhg: f64) -> f64 {
    (inhg / HPA_TO_INHG * 100.0).trunc()
}
