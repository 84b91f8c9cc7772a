use crate::error::ProfileError;
use serde::{Deserialize, Serialize};

// Healthy reference board limits
const DEFAULT_VOLTAGE_MAX_ABSOLUTE: f32 = 60.0;
const DEFAULT_CURRENT_MAX_SAFE: f32 = 150.0;
const DEFAULT_VOLTAGE_MAX_SAFE: f32 = 57.0;
const DEFAULT_HFI_VOLTAGE_SCALE_MAX: f32 = 2.0;
const DEFAULT_HFI_BANDWIDTH_MAX_HZ: f32 = 500.0;
const DEFAULT_TEMP_SAFETY_MARGIN_C: f32 = 5.0;
const DEFAULT_SWITCHING_FREQUENCY_HZ: u32 = 20_000;
const DEFAULT_DEAD_TIME_NS: u32 = 300;

/// Immutable description of a controller board variant.
///
/// Boolean fields describe known manufacturing defects; numeric fields are the
/// conservative operating limits chosen for that board. A profile is supplied
/// once at startup and never mutated by the engine.
///
/// Deserialization fills missing fields from [`Default`], so a JSON document
/// only needs to list what differs from a healthy board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareCapabilityProfile {
    pub phase_filters_present: bool,
    pub single_temperature_sensor: bool,
    pub current_sensing_low_side_only: bool,
    pub current_sensing_limited_accuracy: bool,
    pub mosfet_quality_issues: bool,
    pub capacitor_reliability_issues: bool,
    pub gate_resistor_issues: bool,

    /// Pack voltage the board can ever see (e.g. 84V for a 20S lithium pack).
    pub voltage_max_absolute: f32,

    pub current_max_safe: f32,
    pub voltage_max_safe: f32,
    pub hfi_voltage_scale_max: f32,
    pub hfi_bandwidth_max: f32,
    pub temp_safety_margin: f32,
    pub mosfet_current_limit_conservative: f32,
    pub mosfet_voltage_limit_conservative: f32,
    pub switching_frequency_safe: u32,
    pub dead_time_min_ns: u32,

    // Firmware-side compensations the board variant asks for
    pub temp_estimation_required: bool,
    pub temp_derating_aggressive: bool,
    pub mosfet_failure_detection: bool,
    pub ripple_current_limit_factor: f32,
}

impl Default for HardwareCapabilityProfile {
    fn default() -> Self {
        Self {
            phase_filters_present: true,
            single_temperature_sensor: false,
            current_sensing_low_side_only: false,
            current_sensing_limited_accuracy: false,
            mosfet_quality_issues: false,
            capacitor_reliability_issues: false,
            gate_resistor_issues: false,
            voltage_max_absolute: DEFAULT_VOLTAGE_MAX_ABSOLUTE,
            current_max_safe: DEFAULT_CURRENT_MAX_SAFE,
            voltage_max_safe: DEFAULT_VOLTAGE_MAX_SAFE,
            hfi_voltage_scale_max: DEFAULT_HFI_VOLTAGE_SCALE_MAX,
            hfi_bandwidth_max: DEFAULT_HFI_BANDWIDTH_MAX_HZ,
            temp_safety_margin: DEFAULT_TEMP_SAFETY_MARGIN_C,
            mosfet_current_limit_conservative: DEFAULT_CURRENT_MAX_SAFE,
            mosfet_voltage_limit_conservative: DEFAULT_VOLTAGE_MAX_SAFE,
            switching_frequency_safe: DEFAULT_SWITCHING_FREQUENCY_HZ,
            dead_time_min_ns: DEFAULT_DEAD_TIME_NS,
            temp_estimation_required: false,
            temp_derating_aggressive: false,
            mosfet_failure_detection: false,
            ripple_current_limit_factor: 1.0,
        }
    }
}

impl HardwareCapabilityProfile {
    /// Flipsky 75200 Pro V2.0: no phase filters, one corner-mounted thermistor,
    /// low-side shunts, unreliable MOSFETs, loose bulk capacitors and an EG3112
    /// gate driver with marginal gate resistors, rated for 20S packs.
    pub fn flipsky_75200_pro_v2() -> Self {
        Self {
            phase_filters_present: false,
            single_temperature_sensor: true,
            current_sensing_low_side_only: true,
            current_sensing_limited_accuracy: true,
            mosfet_quality_issues: true,
            capacitor_reliability_issues: true,
            gate_resistor_issues: true,
            voltage_max_absolute: 84.0,
            current_max_safe: 150.0,
            voltage_max_safe: 75.0,
            hfi_voltage_scale_max: 1.5,
            hfi_bandwidth_max: 300.0,
            temp_safety_margin: 10.0,
            mosfet_current_limit_conservative: 180.0,
            mosfet_voltage_limit_conservative: 70.0,
            switching_frequency_safe: 13_000,
            dead_time_min_ns: 500,
            temp_estimation_required: true,
            temp_derating_aggressive: true,
            mosfet_failure_detection: true,
            ripple_current_limit_factor: 0.8,
        }
    }

    /// Parse a profile from JSON and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Parse`] for malformed documents and any error
    /// from [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        let profile: Self = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Check the numeric limits for internal consistency.
    ///
    /// This does not judge whether the limits are conservative enough for the
    /// board's defects; that is the job of
    /// [`audit_safety_mechanisms`](crate::audit::audit_safety_mechanisms).
    ///
    /// # Errors
    ///
    /// Returns the first inconsistent limit found.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let positive_limits = [
            ("voltage_max_absolute", self.voltage_max_absolute),
            ("current_max_safe", self.current_max_safe),
            ("voltage_max_safe", self.voltage_max_safe),
            ("hfi_voltage_scale_max", self.hfi_voltage_scale_max),
            ("hfi_bandwidth_max", self.hfi_bandwidth_max),
            ("mosfet_current_limit_conservative", self.mosfet_current_limit_conservative),
            ("mosfet_voltage_limit_conservative", self.mosfet_voltage_limit_conservative),
        ];
        for (field, value) in positive_limits {
            ProfileError::check_positive(field, value)?;
        }

        if !self.temp_safety_margin.is_finite() {
            return Err(ProfileError::NonFiniteLimit { field: "temp_safety_margin" });
        }
        if self.temp_safety_margin < 0.0 {
            return Err(ProfileError::NonPositiveLimit {
                field: "temp_safety_margin",
                value: self.temp_safety_margin,
            });
        }
        if self.switching_frequency_safe == 0 {
            return Err(ProfileError::NonPositiveLimit {
                field: "switching_frequency_safe",
                value: 0.0,
            });
        }

        if self.voltage_max_safe > self.voltage_max_absolute {
            return Err(ProfileError::SafeVoltageAboveAbsolute {
                safe: self.voltage_max_safe,
                absolute: self.voltage_max_absolute,
            });
        }

        let ripple = self.ripple_current_limit_factor;
        if !ripple.is_finite() || ripple <= 0.0 || ripple > 1.0 {
            return Err(ProfileError::RippleFactorOutOfRange(ripple));
        }

        Ok(())
    }

    /// Number of power-stage temperature sensors fitted.
    pub fn temperature_sensor_count(&self) -> u8 {
        if self.single_temperature_sensor {
            1
        } else {
            2
        }
    }
}
