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

//! Performance observations and their aggregates.

use serde::{Deserialize, Serialize};

/// One timestamped performance observation.
///
/// Samples are immutable once created; the monitor's history accessors hand
/// out owned copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Frames per second at observation time.
    pub frame_rate: f64,
    /// Duration of the operation that produced this sample, in milliseconds.
    /// Zero for periodic system samples.
    pub operation_duration_ms: f64,
    /// Process memory usage in megabytes.
    pub memory_usage_mb: f64,
    /// Wall-clock observation time, milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// Label of the usage site (or "system" for periodic samples).
    pub origin_label: String,
}

/// Averages over the monitor's retained history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Average frame rate, rounded to one decimal.
    pub avg_fps: f64,
    /// Average operation duration in milliseconds, rounded to two decimals.
    pub avg_render_time_ms: f64,
    /// Average memory usage in megabytes.
    pub avg_memory_mb: f64,
    /// Total number of alerts dispatched since construction.
    pub alerts: u64,
}
