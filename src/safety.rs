use crate::profile::HardwareCapabilityProfile;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

pub const DEFECT_CLASS_COUNT: usize = 6;

/// Pack voltage above which the high-voltage protection latch engages.
pub const HIGH_VOLTAGE_LATCH_THRESHOLD_V: f32 = 75.0;

// Phase filter absence: HFI injection limits
pub const HFI_INJECTION_VOLTAGE_SAFE_V: f32 = 0.5;
pub const HFI_BANDWIDTH_SAFE_HZ: f32 = 200.0;

// Single-sensor thermal derating windows
pub const FET_DERATE_START_C: f32 = 80.0;
pub const FET_DERATE_END_C: f32 = 90.0;
pub const MOTOR_DERATE_START_C: f32 = 75.0;
pub const MOTOR_DERATE_END_C: f32 = 85.0;

pub const FIELD_WEAKENING_THRESHOLD_V: f32 = 60.0;

/// Known power-stage defect classes, each with its own protection latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefectClass {
    PhaseFilter,
    Thermal,
    Mosfet,
    Capacitor,
    GateDriver,
    HighVoltage,
}

impl DefectClass {
    pub const ALL: [DefectClass; DEFECT_CLASS_COUNT] = [
        DefectClass::PhaseFilter,
        DefectClass::Thermal,
        DefectClass::Mosfet,
        DefectClass::Capacitor,
        DefectClass::GateDriver,
        DefectClass::HighVoltage,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Whether the board described by `profile` suffers from this defect.
    pub fn is_active(self, profile: &HardwareCapabilityProfile) -> bool {
        match self {
            DefectClass::PhaseFilter => !profile.phase_filters_present,
            DefectClass::Thermal => profile.single_temperature_sensor,
            DefectClass::Mosfet => profile.mosfet_quality_issues,
            DefectClass::Capacitor => profile.capacitor_reliability_issues,
            DefectClass::GateDriver => profile.gate_resistor_issues,
            DefectClass::HighVoltage => profile.voltage_max_absolute > HIGH_VOLTAGE_LATCH_THRESHOLD_V,
        }
    }

    /// Stable identifier for logs and reports.
    pub fn code(self) -> &'static str {
        match self {
            DefectClass::PhaseFilter => "PHASE_FILTER_SAFETY",
            DefectClass::Thermal => "THERMAL_SAFETY",
            DefectClass::Mosfet => "MOSFET_SAFETY",
            DefectClass::Capacitor => "CAPACITOR_SAFETY",
            DefectClass::GateDriver => "GATE_DRIVER_SAFETY",
            DefectClass::HighVoltage => "HIGH_VOLTAGE_SAFETY",
        }
    }
}

// Latch flags are indexed by discriminant
const_assert_eq!(DefectClass::HighVoltage as usize, DEFECT_CLASS_COUNT - 1);

/// Conservative parameter values pushed by the latches.
///
/// These are published for the control loop owner to pick up; nothing here
/// touches the power stage directly. `None` means no latch has overridden
/// that parameter.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SafetyOverrides {
    pub hfi_injection_voltage_max: Option<f32>,
    pub hfi_bandwidth_max_hz: Option<f32>,
    pub hfi_conservative_mode: bool,

    pub temp_estimation_enabled: bool,
    pub aggressive_derating: bool,
    pub temp_safety_margin_c: Option<f32>,
    pub fet_derate_start_c: Option<f32>,
    pub fet_derate_end_c: Option<f32>,
    pub motor_derate_start_c: Option<f32>,
    pub motor_derate_end_c: Option<f32>,

    pub current_max: Option<f32>,
    pub voltage_max: Option<f32>,
    pub mosfet_failure_detection: bool,

    pub ripple_current_limit_factor: Option<f32>,
    pub capacitor_monitoring: bool,

    pub switching_frequency_hz: Option<u32>,
    pub dead_time_ns: Option<u32>,

    pub field_weakening_threshold_v: Option<f32>,
    pub high_voltage_mode: bool,
}

impl SafetyOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_overrides(&self) -> bool {
        *self != Self::default()
    }
}

/// One-shot protective actions, one per [`DefectClass`].
///
/// Each action runs only if its defect is present on the board, and only the
/// first time; later calls are no-ops. Latches stay applied until
/// [`reset`](Self::reset) is called.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SafetyLatchController {
    applied: [bool; DEFECT_CLASS_COUNT],
    overrides: SafetyOverrides,
}

impl SafetyLatchController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_applied(&self, class: DefectClass) -> bool {
        self.applied[class.index()]
    }

    pub fn applied_count(&self) -> usize {
        self.applied.iter().filter(|&&applied| applied).count()
    }

    pub fn overrides(&self) -> &SafetyOverrides {
        &self.overrides
    }

    /// Run the latch for `class`.
    ///
    /// Returns true only when this call performed the protective action.
    pub fn apply(&mut self, class: DefectClass, profile: &HardwareCapabilityProfile) -> bool {
        if !class.is_active(profile) || self.is_applied(class) {
            return false;
        }

        match class {
            DefectClass::PhaseFilter => self.latch_phase_filter(),
            DefectClass::Thermal => self.latch_thermal(profile),
            DefectClass::Mosfet => self.latch_mosfet(profile),
            DefectClass::Capacitor => self.latch_capacitor(profile),
            DefectClass::GateDriver => self.latch_gate_driver(profile),
            DefectClass::HighVoltage => self.latch_high_voltage(),
        }

        self.applied[class.index()] = true;
        true
    }

    /// Run every latch; each checks its own defect flag.
    ///
    /// Returns the number of latches engaged by this call.
    pub fn apply_all(&mut self, profile: &HardwareCapabilityProfile) -> usize {
        DefectClass::ALL
            .into_iter()
            .filter(|&class| self.apply(class, profile))
            .count()
    }

    pub fn apply_phase_filter_safety(&mut self, profile: &HardwareCapabilityProfile) -> bool {
        self.apply(DefectClass::PhaseFilter, profile)
    }

    pub fn apply_thermal_safety(&mut self, profile: &HardwareCapabilityProfile) -> bool {
        self.apply(DefectClass::Thermal, profile)
    }

    pub fn apply_mosfet_safety(&mut self, profile: &HardwareCapabilityProfile) -> bool {
        self.apply(DefectClass::Mosfet, profile)
    }

    pub fn apply_capacitor_safety(&mut self, profile: &HardwareCapabilityProfile) -> bool {
        self.apply(DefectClass::Capacitor, profile)
    }

    pub fn apply_gate_driver_safety(&mut self, profile: &HardwareCapabilityProfile) -> bool {
        self.apply(DefectClass::GateDriver, profile)
    }

    pub fn apply_high_voltage_safety(&mut self, profile: &HardwareCapabilityProfile) -> bool {
        self.apply(DefectClass::HighVoltage, profile)
    }

    /// Release every latch and drop all overrides. Intended for test and
    /// bench isolation; firmware never un-latches.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn latch_phase_filter(&mut self) {
        // HFI injection without phase filters drives ripple straight into the FETs
        self.overrides.hfi_injection_voltage_max = Some(HFI_INJECTION_VOLTAGE_SAFE_V);
        self.overrides.hfi_bandwidth_max_hz = Some(HFI_BANDWIDTH_SAFE_HZ);
        self.overrides.hfi_conservative_mode = true;

        tracing::warn!(
            code = DefectClass::PhaseFilter.code(),
            hfi_voltage_v = HFI_INJECTION_VOLTAGE_SAFE_V,
            hfi_bandwidth_hz = HFI_BANDWIDTH_SAFE_HZ,
            "Applying phase filter absence protection"
        );
    }

    fn latch_thermal(&mut self, profile: &HardwareCapabilityProfile) {
        self.overrides.temp_estimation_enabled = true;
        self.overrides.aggressive_derating = true;
        self.overrides.temp_safety_margin_c = Some(profile.temp_safety_margin);
        self.overrides.fet_derate_start_c = Some(FET_DERATE_START_C);
        self.overrides.fet_derate_end_c = Some(FET_DERATE_END_C);
        self.overrides.motor_derate_start_c = Some(MOTOR_DERATE_START_C);
        self.overrides.motor_derate_end_c = Some(MOTOR_DERATE_END_C);

        tracing::warn!(
            code = DefectClass::Thermal.code(),
            margin_c = profile.temp_safety_margin,
            fet_start_c = FET_DERATE_START_C,
            motor_start_c = MOTOR_DERATE_START_C,
            "Applying thermal protection for single sensor"
        );
    }

    fn latch_mosfet(&mut self, profile: &HardwareCapabilityProfile) {
        self.overrides.current_max = Some(profile.mosfet_current_limit_conservative);
        self.overrides.voltage_max = Some(profile.mosfet_voltage_limit_conservative);
        self.overrides.mosfet_failure_detection = true;

        tracing::warn!(
            code = DefectClass::Mosfet.code(),
            current_max_a = profile.mosfet_current_limit_conservative,
            voltage_max_v = profile.mosfet_voltage_limit_conservative,
            "Applying MOSFET protection limits"
        );
    }

    fn latch_capacitor(&mut self, profile: &HardwareCapabilityProfile) {
        self.overrides.ripple_current_limit_factor = Some(profile.ripple_current_limit_factor);
        self.overrides.capacitor_monitoring = true;

        tracing::warn!(
            code = DefectClass::Capacitor.code(),
            ripple_factor = profile.ripple_current_limit_factor,
            "Applying capacitor protection"
        );
    }

    fn latch_gate_driver(&mut self, profile: &HardwareCapabilityProfile) {
        self.overrides.switching_frequency_hz = Some(profile.switching_frequency_safe);
        self.overrides.dead_time_ns = Some(profile.dead_time_min_ns);

        tracing::warn!(
            code = DefectClass::GateDriver.code(),
            switching_hz = profile.switching_frequency_safe,
            dead_time_ns = profile.dead_time_min_ns,
            "Applying gate driver protection"
        );
    }

    fn latch_high_voltage(&mut self) {
        self.overrides.field_weakening_threshold_v = Some(FIELD_WEAKENING_THRESHOLD_V);
        self.overrides.high_voltage_mode = true;

        tracing::warn!(
            code = DefectClass::HighVoltage.code(),
            field_weakening_v = FIELD_WEAKENING_THRESHOLD_V,
            "Applying high voltage protection"
        );
    }
}
