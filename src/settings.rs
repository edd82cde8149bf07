//! Pilot-facing settings boundary. UI toolkits talk to the cockpit only
//! through [`SettingsPort`].

use tracing::{info, warn};

use crate::error::SettingsError;
use crate::state::{SettingsModel, SharedCockpit};
use crate::units;

/// What the settings panel shows: pilot settings plus a few live values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingsSnapshot {
    pub settings: SettingsModel,
    pub device_std_active: bool,
    pub device_setting_pa: f64,
    pub vertical_g: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsDelta {
    SetAltimeterUnitHpa(bool),
    SetAltimeterHpa(i32),
    SetAltimeterInHg(f64),
    SetStd(bool),
    SetTransitionAltitude(i32),
    SetTransitionLevel(i32),
    SetMagReferenceTrue(bool),
    SetTiltCorrection(bool),
    SetMagneticVariation(f64),
    ResetGPeaks,
}

pub trait SettingsPort: Send + Sync {
    fn read(&self) -> SettingsSnapshot;

    /// Validate and apply one change. Rejected values leave settings untouched.
    fn apply(&self, delta: SettingsDelta) -> Result<(), SettingsError>;
}

fn check_range<T: Into<f64> + Copy>(
    field: &'static str,
    value: T,
    (min, max): (T, T),
) -> Result<(), SettingsError> {
    let (v, lo, hi) = (value.into(), min.into(), max.into());
    if v.is_finite() && lo <= v && v <= hi {
        Ok(())
    } else {
        Err(SettingsError::OutOfRange {
            field,
            value: v,
            min: lo,
            max: hi,
        })
    }
}

/// Apply `delta` to `settings`, validating ranges first.
pub fn apply_delta(settings: &mut SettingsModel, delta: &SettingsDelta) -> Result<(), SettingsError> {
    match *delta {
        SettingsDelta::SetAltimeterUnitHpa(hpa) => settings.altimeter_unit_is_hpa = hpa,
        SettingsDelta::SetAltimeterHpa(hpa) => {
            check_range("altimeter hPa", hpa, units::HPA_RANGE)?;
            settings.altimeter_hpa = hpa;
            settings.altimeter_inhg = units::hpa_to_inhg(hpa);
        }
        SettingsDelta::SetAltimeterInHg(inhg) => {
            check_range("altimeter inHg", inhg, units::INHG_RANGE)?;
            settings.altimeter_inhg = units::round_to(inhg, 2);
            let (lo, hi) = units::HPA_RANGE;
            settings.altimeter_hpa = units::inhg_to_hpa(inhg).clamp(lo, hi);
        }
        SettingsDelta::SetStd(on) => settings.std_mode_requested = on,
        SettingsDelta::SetTransitionAltitude(ft) => {
            check_range("transition altitude", ft, SettingsModel::TRANSITION_ALTITUDE_RANGE)?;
            settings.transition_altitude_ft = ft;
        }
        SettingsDelta::SetTransitionLevel(fl) => {
            check_range("transition level", fl, SettingsModel::TRANSITION_LEVEL_RANGE)?;
            settings.transition_level_fl = fl;
        }
        SettingsDelta::SetMagReferenceTrue(on) => settings.mag_reference_is_true = on,
        SettingsDelta::SetTiltCorrection(on) => settings.mag_tilt_correction_enabled = on,
        SettingsDelta::SetMagneticVariation(deg) => {
            check_range("magnetic variation", deg, SettingsModel::MAG_VARIATION_RANGE)?;
            settings.magnetic_variation_deg = deg;
        }
        SettingsDelta::ResetGPeaks => settings.g_peak_reset_requested = true,
    }
    Ok(())
}

/// Parse a pilot text entry for a numeric field.
pub fn parse_entry<T: std::str::FromStr>(field: &'static str, input: &str) -> Result<T, SettingsError> {
    input.trim().parse::<T>().map_err(|_| SettingsError::Unparsable {
        field,
        input: input.to_string(),
    })
}

/// [`SettingsPort`] over the shared cockpit lock. Every call serializes with
/// the frame loop, so changes become visible at the next frame boundary.
#[derive(Clone)]
pub struct CockpitSettings {
    cockpit: SharedCockpit,
}

impl CockpitSettings {
    pub fn new(cockpit: SharedCockpit) -> Self {
        Self { cockpit }
    }
}

impl SettingsPort for CockpitSettings {
    fn read(&self) -> SettingsSnapshot {
        let c = self.cockpit.lock();
        SettingsSnapshot {
            settings: c.settings,
            device_std_active: c.flight.settings.alt_std_active,
            device_setting_pa: c.flight.settings.alt_setting_pa,
            vertical_g: c.flight.imu.ay,
        }
    }

    fn apply(&self, delta: SettingsDelta) -> Result<(), SettingsError> {
        let mut c = self.cockpit.lock();
        match apply_delta(&mut c.settings, &delta) {
            Ok(()) => {
                info!("settings: {delta:?}");
                Ok(())
            }
            Err(e) => {
                warn!("settings rejected: {e}");
                Err(e)
            }
        }
    }
}
