//! Startup self-test of the profile's safety limits.
//!
//! For every defect the board has, the matching conservative limit must sit
//! inside a fixed ceiling. Checks for absent defects pass trivially. The audit
//! looks only at the profile, never at live telemetry.

use crate::profile::HardwareCapabilityProfile;
use heapless::Vec;
use serde::{Deserialize, Serialize};

pub const HFI_VOLTAGE_SCALE_CEILING: f32 = 1.0;
pub const HFI_BANDWIDTH_CEILING_HZ: f32 = 300.0;
pub const TEMP_SAFETY_MARGIN_FLOOR_C: f32 = 5.0;
pub const MOSFET_CURRENT_CEILING_A: f32 = 200.0;
pub const MOSFET_VOLTAGE_CEILING_V: f32 = 75.0;
pub const SWITCHING_FREQUENCY_CEILING_HZ: u32 = 15_000;
pub const DEAD_TIME_FLOOR_NS: u32 = 400;
pub const HIGH_VOLTAGE_AUDIT_THRESHOLD_V: f32 = 80.0;
pub const HIGH_VOLTAGE_SAFE_CEILING_V: f32 = 75.0;

const MAX_AUDIT_VIOLATIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditViolation {
    HfiParametersUnsafe,
    ThermalMarginInsufficient,
    MosfetLimitsNotConservative,
    SwitchingTimingUnsafe,
    HighVoltageLimitNotConservative,
}

impl AuditViolation {
    pub fn code(self) -> &'static str {
        match self {
            AuditViolation::HfiParametersUnsafe => "AUDIT_HFI_PARAMETERS",
            AuditViolation::ThermalMarginInsufficient => "AUDIT_THERMAL_MARGIN",
            AuditViolation::MosfetLimitsNotConservative => "AUDIT_MOSFET_LIMITS",
            AuditViolation::SwitchingTimingUnsafe => "AUDIT_SWITCHING_TIMING",
            AuditViolation::HighVoltageLimitNotConservative => "AUDIT_HIGH_VOLTAGE_LIMIT",
        }
    }
}

impl core::fmt::Display for AuditViolation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AuditViolation::HfiParametersUnsafe => {
                write!(f, "HFI parameters not safe for missing phase filters")
            }
            AuditViolation::ThermalMarginInsufficient => write!(f, "Insufficient thermal safety margin"),
            AuditViolation::MosfetLimitsNotConservative => {
                write!(f, "MOSFET limits not conservative enough")
            }
            AuditViolation::SwitchingTimingUnsafe => write!(f, "Switching frequency/dead time not safe"),
            AuditViolation::HighVoltageLimitNotConservative => {
                write!(f, "High voltage limits not conservative enough")
            }
        }
    }
}

/// Outcome of [`audit_safety_mechanisms`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SafetyAudit {
    violations: Vec<AuditViolation, MAX_AUDIT_VIOLATIONS>,
}

impl SafetyAudit {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[AuditViolation] {
        &self.violations
    }

    pub fn contains(&self, violation: AuditViolation) -> bool {
        self.violations.contains(&violation)
    }

    fn flag(&mut self, violation: AuditViolation) {
        tracing::error!(code = violation.code(), "Safety failure: {}", violation);
        // One slot per check, cannot overflow
        let _ = self.violations.push(violation);
    }
}

pub fn audit_safety_mechanisms(profile: &HardwareCapabilityProfile) -> SafetyAudit {
    let mut audit = SafetyAudit::default();

    if !profile.phase_filters_present
        && (profile.hfi_voltage_scale_max > HFI_VOLTAGE_SCALE_CEILING
            || profile.hfi_bandwidth_max > HFI_BANDWIDTH_CEILING_HZ)
    {
        audit.flag(AuditViolation::HfiParametersUnsafe);
    }

    if profile.single_temperature_sensor && profile.temp_safety_margin < TEMP_SAFETY_MARGIN_FLOOR_C {
        audit.flag(AuditViolation::ThermalMarginInsufficient);
    }

    if profile.mosfet_quality_issues
        && (profile.mosfet_current_limit_conservative > MOSFET_CURRENT_CEILING_A
            || profile.mosfet_voltage_limit_conservative > MOSFET_VOLTAGE_CEILING_V)
    {
        audit.flag(AuditViolation::MosfetLimitsNotConservative);
    }

    if profile.gate_resistor_issues
        && (profile.switching_frequency_safe > SWITCHING_FREQUENCY_CEILING_HZ
            || profile.dead_time_min_ns < DEAD_TIME_FLOOR_NS)
    {
        audit.flag(AuditViolation::SwitchingTimingUnsafe);
    }

    if profile.voltage_max_absolute > HIGH_VOLTAGE_AUDIT_THRESHOLD_V
        && profile.voltage_max_safe > HIGH_VOLTAGE_SAFE_CEILING_V
    {
        audit.flag(AuditViolation::HighVoltageLimitNotConservative);
    }

    if audit.passed() {
        tracing::info!("All safety mechanisms validated");
    } else {
        tracing::error!(violations = audit.violations.len(), "Critical safety failures detected");
    }

    audit
}

/// Boolean form of [`audit_safety_mechanisms`].
pub fn validate_safety_mechanisms(profile: &HardwareCapabilityProfile) -> bool {
    audit_safety_mechanisms(profile).passed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthy_board_passes_vacuously() {
        let profile = HardwareCapabilityProfile {
            hfi_voltage_scale_max: 5.0,
            switching_frequency_safe: 40_000,
            ..HardwareCapabilityProfile::default()
        };
        assert!(validate_safety_mechanisms(&profile));
    }

    #[test]
    fn test_mosfet_current_ceiling() {
        let mut profile = HardwareCapabilityProfile {
            mosfet_quality_issues: true,
            mosfet_voltage_limit_conservative: 70.0,
            mosfet_current_limit_conservative: 210.0,
            ..HardwareCapabilityProfile::default()
        };
        let audit = audit_safety_mechanisms(&profile);
        assert!(!audit.passed());
        assert_eq!(audit.violations(), &[AuditViolation::MosfetLimitsNotConservative]);

        profile.mosfet_current_limit_conservative = 180.0;
        assert!(validate_safety_mechanisms(&profile));
    }

    #[test]
    fn test_flipsky_preset_hfi_scale_too_high() {
        // The board header ships a 1.5 HFI scale, above the 1.0 ceiling
        let audit = audit_safety_mechanisms(&HardwareCapabilityProfile::flipsky_75200_pro_v2());
        assert_eq!(audit.violations(), &[AuditViolation::HfiParametersUnsafe]);
    }

    #[test]
    fn test_gate_driver_timing() {
        let profile = HardwareCapabilityProfile {
            gate_resistor_issues: true,
            switching_frequency_safe: 15_000,
            dead_time_min_ns: 399,
            ..HardwareCapabilityProfile::default()
        };
        assert!(audit_safety_mechanisms(&profile).contains(AuditViolation::SwitchingTimingUnsafe));

        let profile = HardwareCapabilityProfile {
            dead_time_min_ns: 400,
            ..profile
        };
        assert!(validate_safety_mechanisms(&profile));
    }

    #[test]
    fn test_thermal_margin_floor() {
        let profile = HardwareCapabilityProfile {
            single_temperature_sensor: true,
            temp_safety_margin: 4.9,
            ..HardwareCapabilityProfile::default()
        };
        assert!(audit_safety_mechanisms(&profile).contains(AuditViolation::ThermalMarginInsufficient));
    }

    #[test]
    fn test_high_voltage_pack() {
        let profile = HardwareCapabilityProfile {
            voltage_max_absolute: 84.0,
            voltage_max_safe: 78.0,
            ..HardwareCapabilityProfile::default()
        };
        assert!(audit_safety_mechanisms(&profile).contains(AuditViolation::HighVoltageLimitNotConservative));

        // Between the latch and audit thresholds only the latch cares
        let profile = HardwareCapabilityProfile {
            voltage_max_absolute: 78.0,
            voltage_max_safe: 77.0,
            ..HardwareCapabilityProfile::default()
        };
        assert!(validate_safety_mechanisms(&profile));
    }

    #[test]
    fn test_every_violation_reported() {
        let profile = HardwareCapabilityProfile {
            phase_filters_present: false,
            single_temperature_sensor: true,
            mosfet_quality_issues: true,
            gate_resistor_issues: true,
            hfi_bandwidth_max: 500.0,
            temp_safety_margin: 0.0,
            mosfet_voltage_limit_conservative: 90.0,
            dead_time_min_ns: 100,
            voltage_max_absolute: 100.0,
            voltage_max_safe: 90.0,
            ..HardwareCapabilityProfile::default()
        };
        assert_eq!(audit_safety_mechanisms(&profile).violations().len(), MAX_AUDIT_VIOLATIONS);
    }
}
