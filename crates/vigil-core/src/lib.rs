// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Vigil Core
//!
//! Foundational crate containing traits, core types, and interface contracts
//! shared by the failure-containment and telemetry subsystems.
//!
//! This crate defines the "common language" of Vigil: the immutable records
//! produced when a rendering failure is captured, the configuration consumed
//! by a recovery boundary, the fallback contract exposed to presenters, and
//! the sample/threshold/alert types of the performance monitor. It contains
//! no timers and no state machines; `vigil-recovery` and `vigil-telemetry`
//! provide the behavior on top of these contracts.

#![warn(missing_docs)]

pub mod recovery;
pub mod telemetry;
pub mod time;

pub use recovery::{
    BoundaryConfig, BoundaryLevel, BoundaryPhase, CaptureContext, CaptureOrigin, ErrorSink,
    FailureCapture, FailureInfo, FailureRecord, FallbackContext, Navigator, RecoveryAction,
    RecoveryOptions, RenderPlan, ResetKey, RootNavigator,
};
pub use telemetry::{
    AlertKind, AlertSeverity, MetricSample, PerformanceSummary, SystemProbe, ThresholdAlert,
    Thresholds, ThresholdsUpdate,
};
