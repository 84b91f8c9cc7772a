use serde::{Deserialize, Serialize};

/// Read-only view of the motor controller's filtered measurements.
///
/// Implementations return the last known filtered value and have no way to
/// signal failure. Readings may be implausible or non-finite; the diagnostics
/// pass treats those as faults.
pub trait TelemetrySource {
    /// Filtered motor winding temperature in degrees Celsius.
    fn motor_temperature(&self) -> f32;
    /// Filtered power-stage (FET) temperature in degrees Celsius.
    fn fet_temperature(&self) -> f32;
    /// Filtered DC input voltage in volts.
    fn input_voltage(&self) -> f32;
    /// Filtered total motor current in amperes; negative while braking.
    fn total_current(&self) -> f32;
}

impl<T: TelemetrySource + ?Sized> TelemetrySource for &T {
    fn motor_temperature(&self) -> f32 {
        (**self).motor_temperature()
    }

    fn fet_temperature(&self) -> f32 {
        (**self).fet_temperature()
    }

    fn input_voltage(&self) -> f32 {
        (**self).input_voltage()
    }

    fn total_current(&self) -> f32 {
        (**self).total_current()
    }
}

/// A captured set of telemetry values.
///
/// Useful for hosts that sample the control loop into a plain struct, and for
/// tests and replay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub motor_temp_c: f32,
    pub fet_temp_c: f32,
    pub input_voltage_v: f32,
    pub total_current_a: f32,
}

impl TelemetrySample {
    pub fn new(motor_temp_c: f32, fet_temp_c: f32, input_voltage_v: f32, total_current_a: f32) -> Self {
        Self {
            motor_temp_c,
            fet_temp_c,
            input_voltage_v,
            total_current_a,
        }
    }

    /// Copy the current readings out of any source.
    pub fn capture<S: TelemetrySource + ?Sized>(source: &S) -> Self {
        Self {
            motor_temp_c: source.motor_temperature(),
            fet_temp_c: source.fet_temperature(),
            input_voltage_v: source.input_voltage(),
            total_current_a: source.total_current(),
        }
    }

    /// True if every reading is a finite number.
    pub fn is_finite(&self) -> bool {
        self.motor_temp_c.is_finite()
            && self.fet_temp_c.is_finite()
            && self.input_voltage_v.is_finite()
            && self.total_current_a.is_finite()
    }
}

impl Default for TelemetrySample {
    /// Idle 48V system at room temperature.
    fn default() -> Self {
        Self::new(25.0, 25.0, 48.0, 0.0)
    }
}

impl TelemetrySource for TelemetrySample {
    fn motor_temperature(&self) -> f32 {
        self.motor_temp_c
    }

    fn fet_temperature(&self) -> f32 {
        self.fet_temp_c
    }

    fn input_voltage(&self) -> f32 {
        self.input_voltage_v
    }

    fn total_current(&self) -> f32 {
        self.total_current_a
    }
}
