//! Hardware health scoring.
//!
//! A diagnostics pass starts from a perfect score and subtracts a fixed amount
//! for every static board defect (counted as a warning) and every live
//! telemetry excursion (counted as a fault). The result is clamped to
//! `[0, 100]`.

use crate::profile::HardwareCapabilityProfile;
use crate::telemetry::TelemetrySource;
use serde::{Deserialize, Serialize};

pub const MAX_HARDWARE_SCORE: f32 = 100.0;
pub const MIN_HARDWARE_SCORE: f32 = 0.0;

/// A configuration is accepted only when the score is strictly above this.
pub const CONFIGURATION_SCORE_THRESHOLD: f32 = 60.0;

// Static capability deductions
pub const PHASE_FILTER_DEDUCTION: f32 = 15.0;
pub const TEMPERATURE_SENSOR_DEDUCTION: f32 = 10.0;
pub const CURRENT_SENSING_DEDUCTION: f32 = 8.0;
pub const MOSFET_HEALTH_DEDUCTION: f32 = 12.0;
pub const CAPACITOR_HEALTH_DEDUCTION: f32 = 8.0;
pub const GATE_DRIVER_DEDUCTION: f32 = 7.0;
pub const SINGLE_SENSOR_THERMAL_DEDUCTION: f32 = 5.0;
pub const MOSFET_PROTECTION_DEDUCTION: f32 = 8.0;

// Live telemetry deductions
pub const OVER_TEMPERATURE_DEDUCTION: f32 = 5.0;
pub const VOLTAGE_RANGE_DEDUCTION: f32 = 3.0;
pub const OVER_CURRENT_DEDUCTION: f32 = 3.0;

pub const OVER_TEMPERATURE_LIMIT_C: f32 = 85.0;
pub const INPUT_VOLTAGE_MIN_V: f32 = 10.0;
pub const MIN_TEMPERATURE_SENSORS: u8 = 2;

/// Result of one diagnostics pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsSnapshot {
    pub phase_filter_present: bool,
    pub temperature_sensor_valid: bool,
    pub current_sensing_calibrated: bool,
    pub mosfet_health_ok: bool,
    pub capacitor_health_ok: bool,
    pub gate_driver_ok: bool,
    pub thermal_estimation_enabled: bool,
    pub thermal_protection_enhanced: bool,
    pub mosfet_protection_enhanced: bool,
    pub hardware_score: f32,
    pub fault_count: u32,
    pub warning_count: u32,
}

impl Default for DiagnosticsSnapshot {
    /// Blank state before the first pass: every flag false, score zero.
    fn default() -> Self {
        Self {
            phase_filter_present: false,
            temperature_sensor_valid: false,
            current_sensing_calibrated: false,
            mosfet_health_ok: false,
            capacitor_health_ok: false,
            gate_driver_ok: false,
            thermal_estimation_enabled: false,
            thermal_protection_enhanced: false,
            mosfet_protection_enhanced: false,
            hardware_score: MIN_HARDWARE_SCORE,
            fault_count: 0,
            warning_count: 0,
        }
    }
}

impl DiagnosticsSnapshot {
    pub fn is_configuration_acceptable(&self) -> bool {
        is_configuration_acceptable(self.hardware_score)
    }
}

pub fn is_configuration_acceptable(hardware_score: f32) -> bool {
    hardware_score > CONFIGURATION_SCORE_THRESHOLD
}

struct ScoreTally {
    score: f32,
    warnings: u32,
    faults: u32,
}

impl ScoreTally {
    fn new() -> Self {
        Self {
            score: MAX_HARDWARE_SCORE,
            warnings: 0,
            faults: 0,
        }
    }

    fn warn_if(&mut self, condition: bool, deduction: f32) {
        if condition {
            self.score -= deduction;
            self.warnings += 1;
        }
    }

    fn fault_if(&mut self, condition: bool, deduction: f32) {
        if condition {
            self.score -= deduction;
            self.faults += 1;
        }
    }

    fn clamped_score(&self) -> f32 {
        self.score.clamp(MIN_HARDWARE_SCORE, MAX_HARDWARE_SCORE)
    }
}

/// Score a board profile against the current telemetry.
///
/// Pure: the same inputs always produce the same snapshot. The returned
/// counters cover this pass only.
pub fn run_diagnostics<T>(profile: &HardwareCapabilityProfile, telemetry: &T) -> DiagnosticsSnapshot
where
    T: TelemetrySource + ?Sized,
{
    let mut tally = ScoreTally::new();

    let phase_filter_present = profile.phase_filters_present;
    let temperature_sensor_valid = profile.temperature_sensor_count() >= MIN_TEMPERATURE_SENSORS;
    let current_sensing_calibrated = !profile.current_sensing_limited_accuracy;
    let mosfet_health_ok = !profile.mosfet_quality_issues;
    let capacitor_health_ok = !profile.capacitor_reliability_issues;
    let gate_driver_ok = !profile.gate_resistor_issues;

    tally.warn_if(!phase_filter_present, PHASE_FILTER_DEDUCTION);
    tally.warn_if(!temperature_sensor_valid, TEMPERATURE_SENSOR_DEDUCTION);
    tally.warn_if(!current_sensing_calibrated, CURRENT_SENSING_DEDUCTION);
    tally.warn_if(!mosfet_health_ok, MOSFET_HEALTH_DEDUCTION);
    tally.warn_if(!capacitor_health_ok, CAPACITOR_HEALTH_DEDUCTION);
    tally.warn_if(!gate_driver_ok, GATE_DRIVER_DEDUCTION);
    tally.warn_if(profile.single_temperature_sensor, SINGLE_SENSOR_THERMAL_DEDUCTION);
    tally.warn_if(profile.mosfet_quality_issues, MOSFET_PROTECTION_DEDUCTION);

    tally.fault_if(is_over_temperature(telemetry), OVER_TEMPERATURE_DEDUCTION);
    tally.fault_if(
        is_voltage_out_of_range(telemetry.input_voltage(), profile.voltage_max_safe),
        VOLTAGE_RANGE_DEDUCTION,
    );
    tally.fault_if(
        is_over_current(telemetry.total_current(), profile.current_max_safe),
        OVER_CURRENT_DEDUCTION,
    );

    DiagnosticsSnapshot {
        phase_filter_present,
        temperature_sensor_valid,
        current_sensing_calibrated,
        mosfet_health_ok,
        capacitor_health_ok,
        gate_driver_ok,
        thermal_estimation_enabled: profile.temp_estimation_required,
        thermal_protection_enhanced: profile.temp_derating_aggressive,
        mosfet_protection_enhanced: profile.mosfet_failure_detection,
        hardware_score: tally.clamped_score(),
        fault_count: tally.faults,
        warning_count: tally.warnings,
    }
}

fn is_over_temperature<T: TelemetrySource + ?Sized>(telemetry: &T) -> bool {
    let motor = telemetry.motor_temperature();
    let fet = telemetry.fet_temperature();

    if !motor.is_finite() || !fet.is_finite() {
        tracing::warn!(motor, fet, "Non-finite temperature reading");
        return true;
    }

    motor > OVER_TEMPERATURE_LIMIT_C || fet > OVER_TEMPERATURE_LIMIT_C
}

fn is_voltage_out_of_range(input_voltage: f32, voltage_max_safe: f32) -> bool {
    if !input_voltage.is_finite() {
        tracing::warn!(input_voltage, "Non-finite input voltage reading");
        return true;
    }

    input_voltage > voltage_max_safe || input_voltage < INPUT_VOLTAGE_MIN_V
}

fn is_over_current(total_current: f32, current_max_safe: f32) -> bool {
    if !total_current.is_finite() {
        tracing::warn!(total_current, "Non-finite current reading");
        return true;
    }

    total_current.abs() > current_max_safe
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::TelemetrySample;

    fn nominal() -> TelemetrySample {
        TelemetrySample::new(40.0, 40.0, 48.0, 50.0)
    }

    #[test]
    fn test_healthy_board_scores_full() {
        let snapshot = run_diagnostics(&HardwareCapabilityProfile::default(), &nominal());

        assert_eq!(snapshot.hardware_score, 100.0);
        assert_eq!(snapshot.warning_count, 0);
        assert_eq!(snapshot.fault_count, 0);
        assert!(snapshot.phase_filter_present);
        assert!(snapshot.temperature_sensor_valid);
        assert!(snapshot.current_sensing_calibrated);
        assert!(snapshot.mosfet_health_ok);
        assert!(snapshot.capacitor_health_ok);
        assert!(snapshot.gate_driver_ok);
        assert!(!snapshot.thermal_estimation_enabled);
        assert!(snapshot.is_configuration_acceptable());
    }

    #[test]
    fn test_flipsky_board_deductions() {
        let profile = HardwareCapabilityProfile::flipsky_75200_pro_v2();
        let snapshot = run_diagnostics(&profile, &nominal());

        // 100 - 15 - 10 - 8 - 12 - 8 - 7 - 5 - 8
        assert_eq!(snapshot.hardware_score, 27.0);
        assert_eq!(snapshot.warning_count, 8);
        assert_eq!(snapshot.fault_count, 0);
        assert!(snapshot.thermal_estimation_enabled);
        assert!(snapshot.thermal_protection_enhanced);
        assert!(snapshot.mosfet_protection_enhanced);
        assert!(!snapshot.is_configuration_acceptable());
    }

    #[test]
    fn test_over_temperature_is_fault() {
        let profile = HardwareCapabilityProfile::default();

        let hot_motor = TelemetrySample::new(85.5, 40.0, 48.0, 0.0);
        let snapshot = run_diagnostics(&profile, &hot_motor);
        assert_eq!(snapshot.fault_count, 1);
        assert_eq!(snapshot.hardware_score, 95.0);

        // Both hot still counts once
        let both_hot = TelemetrySample::new(120.0, 999.0, 48.0, 0.0);
        let snapshot = run_diagnostics(&profile, &both_hot);
        assert_eq!(snapshot.fault_count, 1);

        let at_limit = TelemetrySample::new(85.0, 85.0, 48.0, 0.0);
        assert_eq!(run_diagnostics(&profile, &at_limit).fault_count, 0);
    }

    #[test]
    fn test_voltage_window() {
        let profile = HardwareCapabilityProfile::default();

        let low = TelemetrySample::new(25.0, 25.0, 9.9, 0.0);
        assert_eq!(run_diagnostics(&profile, &low).fault_count, 1);

        let high = TelemetrySample::new(25.0, 25.0, profile.voltage_max_safe + 0.5, 0.0);
        let snapshot = run_diagnostics(&profile, &high);
        assert_eq!(snapshot.fault_count, 1);
        assert_eq!(snapshot.hardware_score, 97.0);

        let edges = [INPUT_VOLTAGE_MIN_V, profile.voltage_max_safe];
        for voltage in edges {
            let sample = TelemetrySample::new(25.0, 25.0, voltage, 0.0);
            assert_eq!(run_diagnostics(&profile, &sample).fault_count, 0);
        }
    }

    #[test]
    fn test_regenerative_current_uses_magnitude() {
        let profile = HardwareCapabilityProfile::default();
        let braking = TelemetrySample::new(25.0, 25.0, 48.0, -(profile.current_max_safe + 1.0));
        let snapshot = run_diagnostics(&profile, &braking);
        assert_eq!(snapshot.fault_count, 1);
        assert_eq!(snapshot.hardware_score, 97.0);
    }

    #[test]
    fn test_non_finite_readings_counted_as_faults() {
        let profile = HardwareCapabilityProfile::default();
        let garbage = TelemetrySample::new(f32::NAN, 25.0, f32::INFINITY, f32::NEG_INFINITY);
        let snapshot = run_diagnostics(&profile, &garbage);

        assert_eq!(snapshot.fault_count, 3);
        assert!(snapshot.hardware_score.is_finite());
        assert_eq!(snapshot.hardware_score, 89.0);
    }

    #[test]
    fn test_acceptance_threshold_is_strict() {
        assert!(!is_configuration_acceptable(60.0));
        assert!(is_configuration_acceptable(60.01));
        assert!(!is_configuration_acceptable(0.0));
    }

    #[test]
    fn test_score_of_exactly_sixty_rejected() {
        // 100 - 12 - 8 - 8 - 7 - 5 (over temperature) = 60
        let profile = HardwareCapabilityProfile {
            mosfet_quality_issues: true,
            capacitor_reliability_issues: true,
            gate_resistor_issues: true,
            ..HardwareCapabilityProfile::default()
        };
        let hot = TelemetrySample::new(90.0, 40.0, 48.0, 0.0);
        let snapshot = run_diagnostics(&profile, &hot);

        assert_eq!(snapshot.hardware_score, 60.0);
        assert!(!snapshot.is_configuration_acceptable());
    }
}
