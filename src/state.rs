use std::sync::Arc;

use parking_lot::Mutex;

use crate::units;

// -----------------------------
// Decoded flight data
// -----------------------------

/// Settings as last reported by the flight computer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceSettings {
    pub alt_std_active: bool,
    pub alt_setting_pa: f64, // Pa
}

/// Three redundant weight-on-wheels sensors, reported independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundContact {
    pub sensor1: bool,
    pub sensor2: bool,
    pub sensor3: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Imu {
    pub healthy: bool,
    pub ax: f64, // g
    pub ay: f64, // g
    pub az: f64, // g
    pub gx: f64, // deg/s
    pub gy: f64, // deg/s
    pub gz: f64, // deg/s
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Magnetometer {
    pub healthy: bool,
    pub heading_deg: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PressureSensor {
    pub healthy: bool,
    pub pressure_pa: f64,
}

/// Values computed by the flight computer and received ready to display.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Derived {
    pub pitch_deg: f64,
    pub roll_deg: f64,
    pub turn_rate_dps: f64,
    pub linear_accel_g: f64,
    pub mag_heading_uncorr_deg: f64,
    pub mag_heading_corr_deg: f64,
    pub outside_air_temp_c: f64,
    pub pressure_alt_ft: f64,
    pub baro_vspd_fpm: f64,
    pub indicated_alt_ft: f64,
    pub kias: f64,
    pub ktas: f64,
    pub mach: f64,
    pub kcas: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightState {
    pub message_interval_ms: i64,
    pub settings: DeviceSettings,
    pub ground: GroundContact,
    pub aoa_deg: f64,
    pub total_air_temp_c: f64,
    pub imu: Imu,
    pub mag: Magnetometer,
    pub static_pressure: PressureSensor,
    pub diff_pressure: PressureSensor,
    pub derived: Derived,
}

impl Default for FlightState {
    fn default() -> Self {
        Self {
            message_interval_ms: 0,
            settings: DeviceSettings {
                alt_std_active: false,
                alt_setting_pa: units::hpa_to_wire_pa(SettingsModel::DEFAULT_HPA),
            },
            ground: GroundContact {
                sensor1: true,
                sensor2: true,
                sensor3: true,
            },
            aoa_deg: 0.0,
            total_air_temp_c: 0.0,
            imu: Imu::default(),
            mag: Magnetometer::default(),
            static_pressure: PressureSensor::default(),
            diff_pressure: PressureSensor::default(),
            derived: Derived::default(),
        }
    }
}

// -----------------------------
// Pilot settings
// -----------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingsModel {
    pub altimeter_unit_is_hpa: bool, // false: inHg
    pub altimeter_hpa: i32,
    pub altimeter_inhg: f64,
    pub std_mode_requested: bool,

    pub transition_altitude_ft: i32,
    pub transition_level_fl: i32,

    pub mag_reference_is_true: bool, // false: MAG
    pub mag_tilt_correction_enabled: bool,
    pub magnetic_variation_deg: f64, // W+ E-

    // peak hold, written by the renderer
    pub g_peak_reset_requested: bool,
    pub g_peak_max: f64,
    pub g_peak_min: f64,
}

impl SettingsModel {
    pub const DEFAULT_HPA: i32 = 1013;
    pub const TRANSITION_ALTITUDE_RANGE: (i32, i32) = (100, 99_999);
    pub const TRANSITION_LEVEL_RANGE: (i32, i32) = (1, 999);
    pub const MAG_VARIATION_RANGE: (f64, f64) = (-90.0, 90.0);

    /// Commanded setting in pascals, as it would go on the wire.
    pub fn commanded_setting_pa(&self) -> f64 {
        if self.altimeter_unit_is_hpa {
            units::hpa_to_wire_pa(self.altimeter_hpa)
        } else {
            units::inhg_to_wire_pa(self.altimeter_inhg)
        }
    }

    /// True when `pa` shows as the commanded value in the selected unit.
    pub fn matches_setting(&self, pa: f64) -> bool {
        if self.altimeter_unit_is_hpa {
            units::pa_to_hpa(pa) == self.altimeter_hpa
        } else {
            units::pa_to_inhg(pa) == units::round_to(self.altimeter_inhg, 2)
        }
    }
}

impl Default for SettingsModel {
    fn default() -> Self {
        Self {
            altimeter_unit_is_hpa: true,
            altimeter_hpa: Self::DEFAULT_HPA,
            altimeter_inhg: 29.92,
            std_mode_requested: false,
            transition_altitude_ft: 10_000,
            transition_level_fl: 100,
            mag_reference_is_true: false,
            mag_tilt_correction_enabled: true,
            magnetic_variation_deg: 0.0,
            g_peak_reset_requested: false,
            g_peak_max: -99.9,
            g_peak_min: 99.9,
        }
    }
}

// -----------------------------
// Shared ownership
// -----------------------------

/// Everything guarded by the frame lock.
#[derive(Debug, Clone, Default)]
pub struct Cockpit {
    pub flight: FlightState,
    pub settings: SettingsModel,
}

pub type SharedCockpit = Arc<Mutex<Cockpit>>;

pub fn shared_cockpit() -> SharedCockpit {
    Arc::new(Mutex::new(Cockpit::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_need_no_outbound_setting() {
        let c = Cockpit::default();
        assert!(c.settings.matches_setting(c.flight.settings.alt_setting_pa));
        assert_eq!(c.settings.std_mode_requested, c.flight.settings.alt_std_active);
    }

    #[test]
    fn defaults_mark_every_subsystem_unhealthy() {
        let f = FlightState::default();
        assert!(!f.imu.healthy);
        assert!(!f.mag.healthy);
        assert!(!f.static_pressure.healthy);
        assert!(!f.diff_pressure.healthy);
    }

    #[test]
    fn inhg_match_uses_two_decimals() {
        let s = SettingsModel {
            altimeter_unit_is_hpa: false,
            altimeter_inhg: 29.92,
            ..SettingsModel::default()
        };
        assert!(s.matches_setting(101_325.0));
        assert!(!s.matches_setting(101_000.0));
        assert_eq!(s.commanded_setting_pa(), 101_320.0);
    }
}
