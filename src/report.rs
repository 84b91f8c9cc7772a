//! Structured hardware warnings and recommendations.
//!
//! The report carries only codes and numbers. Turning them into operator text
//! is left to whoever displays it.

use crate::diagnostics::DiagnosticsSnapshot;
use crate::profile::HardwareCapabilityProfile;
use crate::safety::DefectClass;
use heapless::Vec;
use serde::{Deserialize, Serialize};

pub const VERDICT_CONCERN_THRESHOLD: f32 = 70.0;
pub const VERDICT_ACCEPTABLE_THRESHOLD: f32 = 85.0;

const MAX_WARNINGS: usize = 10;

/// Overall interpretation of a hardware score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScoreVerdict {
    BelowRecommended,
    SomeConcerns,
    Acceptable,
}

impl ScoreVerdict {
    pub fn from_score(hardware_score: f32) -> Self {
        if hardware_score < VERDICT_CONCERN_THRESHOLD {
            ScoreVerdict::BelowRecommended
        } else if hardware_score < VERDICT_ACCEPTABLE_THRESHOLD {
            ScoreVerdict::SomeConcerns
        } else {
            ScoreVerdict::Acceptable
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ScoreVerdict::BelowRecommended => "below recommended threshold",
            ScoreVerdict::SomeConcerns => "some concerns",
            ScoreVerdict::Acceptable => "acceptable",
        }
    }
}

/// Stable identifiers for each hardware warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarningCode {
    /// Critical: HFI must run with reduced injection.
    PhaseFilterAbsent,
    TemperatureSensingInadequate,
    CurrentSensingLimited,
    MosfetReliability,
    CapacitorMounting,
    GateDriverLimited,
    SingleSensorThermalEstimation,
    MosfetProtectionEnhanced,
    /// Informational: pack above the high-voltage latch threshold.
    HighVoltagePack,
    /// Informational: no phase-current shunts on the high side.
    LowSideCurrentSensing,
}

impl WarningCode {
    pub fn code(self) -> &'static str {
        match self {
            WarningCode::PhaseFilterAbsent => "HW_PHASE_FILTER_ABSENT",
            WarningCode::TemperatureSensingInadequate => "HW_TEMP_SENSING_INADEQUATE",
            WarningCode::CurrentSensingLimited => "HW_CURRENT_SENSING_LIMITED",
            WarningCode::MosfetReliability => "HW_MOSFET_RELIABILITY",
            WarningCode::CapacitorMounting => "HW_CAPACITOR_MOUNTING",
            WarningCode::GateDriverLimited => "HW_GATE_DRIVER_LIMITED",
            WarningCode::SingleSensorThermalEstimation => "HW_THERMAL_ESTIMATION",
            WarningCode::MosfetProtectionEnhanced => "HW_MOSFET_PROTECTION",
            WarningCode::HighVoltagePack => "HW_HIGH_VOLTAGE_PACK",
            WarningCode::LowSideCurrentSensing => "HW_LOW_SIDE_CURRENT_SENSING",
        }
    }

    pub fn is_critical(self) -> bool {
        matches!(self, WarningCode::PhaseFilterAbsent)
    }

    /// Whether this code corresponds to a score deduction counted in
    /// `warning_count`.
    pub fn deducts(self) -> bool {
        !matches!(
            self,
            WarningCode::HighVoltagePack | WarningCode::LowSideCurrentSensing
        )
    }
}

/// Standing advice for boards of this family, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    DisablePhaseFilterSetting,
    UseConservativeMotorParameters,
    MonitorTemperatures,
    LimitSwitchingFrequency,
    ConsiderGateResistorModification,
    EnsureThermalManagement,
    RegularHardwareInspection,
}

impl Recommendation {
    pub const ALL: [Recommendation; 7] = [
        Recommendation::DisablePhaseFilterSetting,
        Recommendation::UseConservativeMotorParameters,
        Recommendation::MonitorTemperatures,
        Recommendation::LimitSwitchingFrequency,
        Recommendation::ConsiderGateResistorModification,
        Recommendation::EnsureThermalManagement,
        Recommendation::RegularHardwareInspection,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareReport {
    pub hardware_score: f32,
    pub warning_count: u32,
    pub fault_count: u32,
    pub verdict: ScoreVerdict,
    pub warnings: Vec<WarningCode, MAX_WARNINGS>,
    pub recommendations: [Recommendation; 7],
}

impl HardwareReport {
    /// Builds the report for `profile` from a diagnostics pass over it.
    ///
    /// Codes follow the same conditions that deduct from the score, so a
    /// per-pass snapshot has exactly `warning_count` deducting codes. The
    /// high-voltage and low-side sensing codes are informational.
    pub fn new(profile: &HardwareCapabilityProfile, snapshot: &DiagnosticsSnapshot) -> Self {
        let checks = [
            (!snapshot.phase_filter_present, WarningCode::PhaseFilterAbsent),
            (!snapshot.temperature_sensor_valid, WarningCode::TemperatureSensingInadequate),
            (!snapshot.current_sensing_calibrated, WarningCode::CurrentSensingLimited),
            (!snapshot.mosfet_health_ok, WarningCode::MosfetReliability),
            (!snapshot.capacitor_health_ok, WarningCode::CapacitorMounting),
            (!snapshot.gate_driver_ok, WarningCode::GateDriverLimited),
            (profile.single_temperature_sensor, WarningCode::SingleSensorThermalEstimation),
            (profile.mosfet_quality_issues, WarningCode::MosfetProtectionEnhanced),
            (DefectClass::HighVoltage.is_active(profile), WarningCode::HighVoltagePack),
            (profile.current_sensing_low_side_only, WarningCode::LowSideCurrentSensing),
        ];

        let mut warnings = Vec::new();
        for (active, code) in checks {
            if active {
                // At most one entry per check
                let _ = warnings.push(code);
            }
        }

        Self {
            hardware_score: snapshot.hardware_score,
            warning_count: snapshot.warning_count,
            fault_count: snapshot.fault_count,
            verdict: ScoreVerdict::from_score(snapshot.hardware_score),
            warnings,
            recommendations: Recommendation::ALL,
        }
    }

    pub fn has_critical_warning(&self) -> bool {
        self.warnings.iter().any(|code| code.is_critical())
    }

    /// Serialize for export to a configuration tool or log sink.
    ///
    /// # Errors
    ///
    /// Propagates any `serde_json` serialization failure.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
