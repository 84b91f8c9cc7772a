//! # Power Stage Health
//!
//! Hardware-health diagnostics and one-shot safety latches for motor
//! controller boards that ship with known manufacturing defects: missing phase
//! filters, a single temperature sensor, low-side-only current sensing and
//! marginal power-stage components.
//!
//! ## Features
//!
//! - **Health scoring**: fixed deductions per board defect and per live
//!   telemetry excursion, clamped to `[0, 100]`
//! - **Configuration verdict**: strict acceptance threshold with a bounded
//!   fault history of rejections
//! - **Safety latches**: idempotent protective overrides, one per defect class
//! - **Self-test**: audit of the profile's conservative limits
//! - **Embedded-friendly**: no heap allocations on the diagnostics path,
//!   wraparound-safe microsecond timing
//!
//! ## Quick Start
//!
//! ```rust
//! use powerstage_health::{DiagnosticsEngine, HardwareCapabilityProfile, TelemetrySample};
//!
//! let profile = HardwareCapabilityProfile::flipsky_75200_pro_v2();
//! let telemetry = TelemetrySample::new(40.0, 40.0, 48.0, 50.0);
//! let mut engine = DiagnosticsEngine::new(profile, telemetry);
//!
//! if let Some(report) = engine.init_adaptations(0) {
//!     for warning in &report.warnings {
//!         println!("{}", warning.code());
//!     }
//! }
//!
//! // Call from the maintenance tick; recomputes at most once per second
//! engine.update_diagnostics(1_500_000);
//!
//! if !engine.validate_configuration(1_600_000) {
//!     // Operate conservatively using engine.get_overrides()
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`engine`] - Owns all state and exposes every operation
//! - [`diagnostics`] - Pure scoring pass
//! - [`safety`] - Per-defect protection latches
//! - [`audit`] - Profile self-test
//! - [`fault`] - Rejection history ring
//! - [`scheduler`] - Refresh rate limiting
//! - [`report`] - Structured warnings and verdict
//! - [`profile`] / [`telemetry`] - Inputs

#![deny(warnings)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::struct_excessive_bools)]

pub mod audit;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod fault;
pub mod profile;
pub mod report;
pub mod safety;
pub mod scheduler;
pub mod telemetry;

// Re-export main public types for convenience
pub use audit::{audit_safety_mechanisms, validate_safety_mechanisms, SafetyAudit};
pub use diagnostics::{run_diagnostics, DiagnosticsSnapshot};
pub use engine::DiagnosticsEngine;
pub use error::ProfileError;
pub use fault::FaultHistoryLog;
pub use profile::HardwareCapabilityProfile;
pub use report::{HardwareReport, ScoreVerdict, WarningCode};
pub use safety::{DefectClass, SafetyLatchController, SafetyOverrides};
pub use scheduler::RateLimiter;
pub use telemetry::{TelemetrySample, TelemetrySource};
