//! Errors raised while loading or checking a hardware capability profile.
//!
//! The diagnostics engine itself never fails; only configuration does.

use thiserror::Error;

/// Reasons a [`HardwareCapabilityProfile`](crate::profile::HardwareCapabilityProfile)
/// is rejected.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The profile document is not valid JSON or has the wrong shape.
    #[error("Failed to parse hardware profile: {0}")]
    Parse(#[from] serde_json::Error),

    /// A numeric limit is NaN or infinite.
    #[error("Profile limit '{field}' is not a finite number")]
    NonFiniteLimit {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A numeric limit that must be strictly positive is zero or negative.
    #[error("Profile limit '{field}' must be positive, got {value}")]
    NonPositiveLimit {
        /// Name of the offending field.
        field: &'static str,
        /// Value found in the profile.
        value: f32,
    },

    /// The conservative operating voltage exceeds the absolute pack maximum.
    #[error("Safe voltage {safe}V exceeds absolute maximum {absolute}V")]
    SafeVoltageAboveAbsolute {
        /// Configured `voltage_max_safe`.
        safe: f32,
        /// Configured `voltage_max_absolute`.
        absolute: f32,
    },

    /// Ripple current derating factor outside `(0, 1]`.
    #[error("Ripple current limit factor {0} outside (0, 1]")]
    RippleFactorOutOfRange(f32),
}

impl ProfileError {
    /// Check that `value` is finite and strictly positive.
    pub(crate) fn check_positive(field: &'static str, value: f32) -> Result<(), Self> {
        if !value.is_finite() {
            return Err(ProfileError::NonFiniteLimit { field });
        }
        if value <= 0.0 {
            return Err(ProfileError::NonPositiveLimit { field, value });
        }
        Ok(())
    }
}
