use crate::audit::{self, SafetyAudit};
use crate::diagnostics::{self, DiagnosticsSnapshot};
use crate::fault::FaultHistoryLog;
use crate::profile::HardwareCapabilityProfile;
use crate::report::HardwareReport;
use crate::safety::{DefectClass, SafetyLatchController, SafetyOverrides};
use crate::scheduler::RateLimiter;
use crate::telemetry::TelemetrySource;

/// Owns every piece of diagnostics state for one controller board.
///
/// All operations take `&mut self`; hosts that share an engine across threads
/// wrap it in a single mutex. Time is a free-running `u32` microsecond counter
/// supplied by the caller.
#[derive(Debug)]
pub struct DiagnosticsEngine<T> {
    profile: HardwareCapabilityProfile,
    telemetry: T,

    snapshot: DiagnosticsSnapshot,
    total_warnings: u32,
    total_faults: u32,

    fault_history: FaultHistoryLog,
    latches: SafetyLatchController,
    refresh: RateLimiter,

    initialized: bool,
    initialization_time_us: u32,
}

impl<T: TelemetrySource> DiagnosticsEngine<T> {
    pub fn new(profile: HardwareCapabilityProfile, telemetry: T) -> Self {
        Self {
            profile,
            telemetry,
            snapshot: DiagnosticsSnapshot::default(),
            total_warnings: 0,
            total_faults: 0,
            fault_history: FaultHistoryLog::new(),
            latches: SafetyLatchController::new(),
            refresh: RateLimiter::default(),
            initialized: false,
            initialization_time_us: 0,
        }
    }

    /// Engage the safety latches for every defect on this board and run the
    /// first diagnostics pass.
    ///
    /// Returns the hardware report for the initial pass, or `None` if the
    /// engine was already initialized (in which case nothing happens).
    pub fn init_adaptations(&mut self, now_us: u32) -> Option<HardwareReport> {
        if self.initialized {
            return None;
        }

        self.snapshot = DiagnosticsSnapshot::default();
        self.initialization_time_us = now_us;

        self.apply_phase_filter_safety();
        self.apply_thermal_safety();
        self.apply_mosfet_safety();
        self.apply_capacitor_safety();
        self.apply_gate_driver_safety();
        self.apply_high_voltage_safety();

        let pass = self.run_diagnostics();
        self.store_snapshot(pass);
        self.refresh.mark(now_us);

        let report = HardwareReport::new(&self.profile, &self.snapshot);
        tracing::info!(
            score = report.hardware_score,
            warnings = report.warning_count,
            faults = report.fault_count,
            verdict = report.verdict.description(),
            latches = self.latches.applied_count(),
            "Hardware adaptations initialized"
        );

        self.initialized = true;
        Some(report)
    }

    /// One diagnostics pass against the current telemetry. Does not touch the
    /// stored snapshot.
    pub fn run_diagnostics(&self) -> DiagnosticsSnapshot {
        diagnostics::run_diagnostics(&self.profile, &self.telemetry)
    }

    /// Periodic refresh, at most once per [`REFRESH_INTERVAL_US`].
    ///
    /// Returns true if the snapshot was recomputed.
    ///
    /// [`REFRESH_INTERVAL_US`]: crate::scheduler::REFRESH_INTERVAL_US
    pub fn update_diagnostics(&mut self, now_us: u32) -> bool {
        if !self.initialized || !self.refresh.try_acquire(now_us) {
            return false;
        }

        let pass = self.run_diagnostics();
        self.store_snapshot(pass);

        tracing::debug!(
            now_us,
            score = self.snapshot.hardware_score,
            faults = pass.fault_count,
            "Diagnostics refreshed"
        );
        true
    }

    /// Re-score the board and decide whether its configuration is acceptable.
    ///
    /// Rejected configurations are recorded in the fault history at `now_us`.
    /// An uninitialized engine always rejects without side effects.
    pub fn validate_configuration(&mut self, now_us: u32) -> bool {
        if !self.initialized {
            return false;
        }

        let pass = self.run_diagnostics();
        self.store_snapshot(pass);

        let valid = self.snapshot.is_configuration_acceptable();
        if !valid {
            self.fault_history.record(now_us);
            tracing::warn!(
                score = self.snapshot.hardware_score,
                now_us,
                history = self.fault_history.len(),
                "Hardware configuration rejected"
            );
        }

        valid
    }

    pub fn validate_safety_mechanisms(&self) -> bool {
        audit::validate_safety_mechanisms(&self.profile)
    }

    pub fn audit_safety_mechanisms(&self) -> SafetyAudit {
        audit::audit_safety_mechanisms(&self.profile)
    }

    /// Zero the warning and fault counters and clear the fault history.
    ///
    /// The stored score is left as is until the next pass; latches stay
    /// engaged.
    pub fn reset_diagnostics(&mut self) {
        self.total_warnings = 0;
        self.total_faults = 0;
        self.snapshot.warning_count = 0;
        self.snapshot.fault_count = 0;
        self.fault_history.reset();
    }

    /// Release all safety latches. For test isolation only.
    pub fn reset_latches(&mut self) {
        self.latches.reset();
    }

    pub fn apply_phase_filter_safety(&mut self) -> bool {
        self.latches.apply(DefectClass::PhaseFilter, &self.profile)
    }

    pub fn apply_thermal_safety(&mut self) -> bool {
        self.latches.apply(DefectClass::Thermal, &self.profile)
    }

    pub fn apply_mosfet_safety(&mut self) -> bool {
        self.latches.apply(DefectClass::Mosfet, &self.profile)
    }

    pub fn apply_capacitor_safety(&mut self) -> bool {
        self.latches.apply(DefectClass::Capacitor, &self.profile)
    }

    pub fn apply_gate_driver_safety(&mut self) -> bool {
        self.latches.apply(DefectClass::GateDriver, &self.profile)
    }

    pub fn apply_high_voltage_safety(&mut self) -> bool {
        self.latches.apply(DefectClass::HighVoltage, &self.profile)
    }

    /// Report built from the stored snapshot.
    pub fn report(&self) -> HardwareReport {
        HardwareReport::new(&self.profile, &self.snapshot)
    }

    pub fn get_diagnostics(&self) -> &DiagnosticsSnapshot {
        &self.snapshot
    }

    pub fn get_fault_count(&self) -> u32 {
        self.snapshot.fault_count
    }

    pub fn get_fault_history(&self) -> &FaultHistoryLog {
        &self.fault_history
    }

    pub fn get_latches(&self) -> &SafetyLatchController {
        &self.latches
    }

    pub fn get_overrides(&self) -> &SafetyOverrides {
        self.latches.overrides()
    }

    pub fn get_profile(&self) -> &HardwareCapabilityProfile {
        &self.profile
    }

    pub fn telemetry(&self) -> &T {
        &self.telemetry
    }

    pub fn telemetry_mut(&mut self) -> &mut T {
        &mut self.telemetry
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn initialization_time_us(&self) -> u32 {
        self.initialization_time_us
    }

    // The stored snapshot carries running totals rather than the per-pass
    // counts; only reset_diagnostics() brings them back to zero.
    fn store_snapshot(&mut self, pass: DiagnosticsSnapshot) {
        self.total_warnings = self.total_warnings.saturating_add(pass.warning_count);
        self.total_faults = self.total_faults.saturating_add(pass.fault_count);

        self.snapshot = DiagnosticsSnapshot {
            warning_count: self.total_warnings,
            fault_count: self.total_faults,
            ..pass
        };
    }
}
