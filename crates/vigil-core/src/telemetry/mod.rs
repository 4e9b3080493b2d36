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

//! Core types for runtime performance telemetry.
//!
//! Defines the sample, threshold, and alert data model. The monitor that
//! collects samples and fans out alerts lives in `vigil-telemetry`.

pub mod probe;
pub mod sample;
pub mod thresholds;

pub use self::probe::SystemProbe;
pub use self::sample::{MetricSample, PerformanceSummary};
pub use self::thresholds::{AlertKind, AlertSeverity, ThresholdAlert, Thresholds, ThresholdsUpdate};
