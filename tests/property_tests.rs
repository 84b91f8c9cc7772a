//! Property-based tests for scoring and latching.

use powerstage_health::*;
use proptest::prelude::*;

const DEFECT_FLAGS: usize = 6;

fn profile_with_defects(defects: [bool; DEFECT_FLAGS]) -> HardwareCapabilityProfile {
    HardwareCapabilityProfile {
        phase_filters_present: !defects[0],
        single_temperature_sensor: defects[1],
        current_sensing_limited_accuracy: defects[2],
        mosfet_quality_issues: defects[3],
        capacitor_reliability_issues: defects[4],
        gate_resistor_issues: defects[5],
        ..HardwareCapabilityProfile::default()
    }
}

fn any_reading() -> impl Strategy<Value = f32> {
    prop_oneof![
        8 => -500.0f32..1000.0f32,
        1 => Just(f32::NAN),
        1 => Just(f32::INFINITY),
        1 => Just(f32::NEG_INFINITY),
    ]
}

fn any_telemetry() -> impl Strategy<Value = TelemetrySample> {
    (any_reading(), any_reading(), any_reading(), any_reading())
        .prop_map(|(motor, fet, voltage, current)| TelemetrySample::new(motor, fet, voltage, current))
}

fn any_profile() -> impl Strategy<Value = HardwareCapabilityProfile> {
    (
        proptest::array::uniform6(any::<bool>()),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        1.0f32..400.0f32,
        10.0f32..100.0f32,
    )
        .prop_map(|(defects, estimation, derating, detection, current_max, voltage_max)| {
            HardwareCapabilityProfile {
                temp_estimation_required: estimation,
                temp_derating_aggressive: derating,
                mosfet_failure_detection: detection,
                current_max_safe: current_max,
                voltage_max_safe: voltage_max,
                voltage_max_absolute: voltage_max + 5.0,
                ..profile_with_defects(defects)
            }
        })
}

proptest! {
    #[test]
    fn test_score_always_bounded(profile in any_profile(), telemetry in any_telemetry()) {
        let snapshot = run_diagnostics(&profile, &telemetry);
        prop_assert!(snapshot.hardware_score >= 0.0);
        prop_assert!(snapshot.hardware_score <= 100.0);
        prop_assert!(snapshot.fault_count <= 3);
        prop_assert!(snapshot.warning_count <= 8);
    }

    #[test]
    fn test_adding_defect_never_raises_score(
        defects in proptest::array::uniform6(any::<bool>()),
        extra in 0usize..DEFECT_FLAGS,
        telemetry in any_telemetry(),
    ) {
        let mut worse = defects;
        worse[extra] = true;

        let base = run_diagnostics(&profile_with_defects(defects), &telemetry);
        let degraded = run_diagnostics(&profile_with_defects(worse), &telemetry);
        prop_assert!(degraded.hardware_score <= base.hardware_score);
    }

    #[test]
    fn test_defect_deduction_independent_of_other_flags(
        defects in proptest::array::uniform6(any::<bool>()),
        flag in 0usize..DEFECT_FLAGS,
    ) {
        let telemetry = TelemetrySample::new(40.0, 40.0, 48.0, 50.0);
        let mut with_flag = defects;
        with_flag[flag] = true;
        let mut without_flag = defects;
        without_flag[flag] = false;

        let deduction = run_diagnostics(&profile_with_defects(without_flag), &telemetry).hardware_score
            - run_diagnostics(&profile_with_defects(with_flag), &telemetry).hardware_score;

        let mut alone = [false; DEFECT_FLAGS];
        alone[flag] = true;
        let alone_deduction = 100.0 - run_diagnostics(&profile_with_defects(alone), &telemetry).hardware_score;

        prop_assert_eq!(deduction, alone_deduction);
    }

    #[test]
    fn test_validation_matches_threshold(profile in any_profile(), telemetry in any_telemetry()) {
        let expected = run_diagnostics(&profile, &telemetry).hardware_score > 60.0;
        let mut engine = DiagnosticsEngine::new(profile, telemetry);
        engine.init_adaptations(0);

        prop_assert_eq!(engine.validate_configuration(1), expected);
        prop_assert_eq!(engine.get_fault_history().len(), usize::from(!expected));
    }

    #[test]
    fn test_latches_idempotent(profile in any_profile(), repeats in 1usize..8) {
        let mut latches = SafetyLatchController::new();
        for class in DefectClass::ALL {
            let fired = (0..repeats).filter(|_| latches.apply(class, &profile)).count();
            prop_assert_eq!(fired, usize::from(class.is_active(&profile)));
            prop_assert_eq!(latches.is_applied(class), class.is_active(&profile));
        }
    }

    #[test]
    fn test_refresh_gap(start in any::<u32>(), gap in 0u32..3_000_000) {
        let mut engine = DiagnosticsEngine::new(
            HardwareCapabilityProfile::default(),
            TelemetrySample::default(),
        );
        engine.init_adaptations(start);
        prop_assert_eq!(engine.update_diagnostics(start.wrapping_add(gap)), gap > 1_000_000);
    }
}
