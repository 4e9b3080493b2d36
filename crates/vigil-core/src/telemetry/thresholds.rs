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

//! Alert thresholds and their evaluation against a sample.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::telemetry::sample::MetricSample;

/// The metric family an alert was derived from.
///
/// Operation-duration breaches are reported as `Render`, the historical name
/// for that alert family in the consuming application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertKind {
    /// Frame rate fell below the configured minimum.
    FrameRate,
    /// An operation took longer than the configured maximum.
    Render,
    /// Memory usage exceeded the configured maximum.
    Memory,
}

impl Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertKind::FrameRate => write!(f, "frame-rate"),
            AlertKind::Render => write!(f, "render"),
            AlertKind::Memory => write!(f, "memory"),
        }
    }
}

/// How far past the threshold the sample landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Past the configured limit.
    Warning,
    /// Well past the configured limit (see [`Thresholds::evaluate`]).
    Critical,
}

impl Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Warning => write!(f, "warning"),
            AlertSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// A derived signal produced when a sample breaches a configured limit.
///
/// Alerts are transient: they are dispatched to subscribers and never
/// persisted by the monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdAlert {
    /// The metric family that breached.
    pub kind: AlertKind,
    /// Severity of the breach.
    pub severity: AlertSeverity,
    /// Human-readable description of the breach.
    pub message: String,
    /// The sample that triggered the alert.
    pub sample: MetricSample,
}

/// Alert limits evaluated against every appended sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Frame rates below this raise a frame-rate alert.
    pub min_frame_rate: f64,
    /// Operation durations above this raise a render alert, in milliseconds.
    pub max_operation_duration_ms: f64,
    /// Memory usage above this raises a memory alert, in megabytes.
    pub max_memory_mb: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_frame_rate: 55.0,
            max_operation_duration_ms: 16.67,
            max_memory_mb: 100.0,
        }
    }
}

/// Partial update merged into existing [`Thresholds`].
///
/// Absent fields leave the current value untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdsUpdate {
    /// New minimum frame rate, if changing.
    pub min_frame_rate: Option<f64>,
    /// New maximum operation duration, if changing.
    pub max_operation_duration_ms: Option<f64>,
    /// New maximum memory usage, if changing.
    pub max_memory_mb: Option<f64>,
}

impl Thresholds {
    /// Merges a partial update into these thresholds.
    pub fn apply(&mut self, update: ThresholdsUpdate) {
        if let Some(value) = update.min_frame_rate {
            self.min_frame_rate = value;
        }
        if let Some(value) = update.max_operation_duration_ms {
            self.max_operation_duration_ms = value;
        }
        if let Some(value) = update.max_memory_mb {
            self.max_memory_mb = value;
        }
    }

    /// Evaluates a sample against these thresholds.
    ///
    /// At most one alert per kind is produced for a single sample, carrying
    /// the higher severity when both bounds are breached: frame rate is
    /// critical below half the minimum, duration is critical above twice the
    /// maximum, and memory is critical above 1.5 times the maximum.
    pub fn evaluate(&self, sample: &MetricSample) -> Vec<ThresholdAlert> {
        let mut alerts = Vec::new();

        if sample.frame_rate < self.min_frame_rate {
            let severity = if sample.frame_rate < self.min_frame_rate / 2.0 {
                AlertSeverity::Critical
            } else {
                AlertSeverity::Warning
            };
            alerts.push(ThresholdAlert {
                kind: AlertKind::FrameRate,
                severity,
                message: format!(
                    "low frame rate: {:.1} fps (minimum {:.1})",
                    sample.frame_rate, self.min_frame_rate
                ),
                sample: sample.clone(),
            });
        }

        if sample.operation_duration_ms > self.max_operation_duration_ms {
            let severity = if sample.operation_duration_ms > self.max_operation_duration_ms * 2.0 {
                AlertSeverity::Critical
            } else {
                AlertSeverity::Warning
            };
            alerts.push(ThresholdAlert {
                kind: AlertKind::Render,
                severity,
                message: format!(
                    "slow operation: {} took {:.2}ms (limit {:.2}ms)",
                    sample.origin_label, sample.operation_duration_ms, self.max_operation_duration_ms
                ),
                sample: sample.clone(),
            });
        }

        if sample.memory_usage_mb > self.max_memory_mb {
            let severity = if sample.memory_usage_mb > self.max_memory_mb * 1.5 {
                AlertSeverity::Critical
            } else {
                AlertSeverity::Warning
            };
            alerts.push(ThresholdAlert {
                kind: AlertKind::Memory,
                severity,
                message: format!(
                    "high memory usage: {:.1}MB (limit {:.1}MB)",
                    sample.memory_usage_mb, self.max_memory_mb
                ),
                sample: sample.clone(),
            });
        }

        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(frame_rate: f64, duration_ms: f64, memory_mb: f64) -> MetricSample {
        MetricSample {
            frame_rate,
            operation_duration_ms: duration_ms,
            memory_usage_mb: memory_mb,
            timestamp_ms: 0,
            origin_label: "render".to_string(),
        }
    }

    #[test]
    fn healthy_sample_raises_nothing() {
        let thresholds = Thresholds::default();
        assert!(thresholds.evaluate(&sample(60.0, 10.0, 50.0)).is_empty());
    }

    #[test]
    fn duration_twice_the_limit_is_critical() {
        let thresholds = Thresholds::default();
        let alerts = thresholds.evaluate(&sample(60.0, 50.0, 10.0));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Render);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn duration_between_one_and_two_times_is_warning() {
        let thresholds = Thresholds::default();
        let alerts = thresholds.evaluate(&sample(60.0, 20.0, 10.0));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::Warning);
        // Exactly 2x stays a warning; the critical bound is strict.
        let at_double = thresholds.evaluate(&sample(60.0, 16.67 * 2.0, 10.0));
        assert_eq!(at_double[0].severity, AlertSeverity::Warning);
    }

    #[test]
    fn duration_at_the_limit_is_fine() {
        let thresholds = Thresholds::default();
        assert!(thresholds.evaluate(&sample(60.0, 16.67, 10.0)).is_empty());
    }

    #[test]
    fn frame_rate_bounds() {
        let thresholds = Thresholds::default();
        let warning = thresholds.evaluate(&sample(40.0, 0.0, 10.0));
        assert_eq!(warning[0].kind, AlertKind::FrameRate);
        assert_eq!(warning[0].severity, AlertSeverity::Warning);
        let critical = thresholds.evaluate(&sample(20.0, 0.0, 10.0));
        assert_eq!(critical[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn memory_bounds() {
        let thresholds = Thresholds::default();
        let warning = thresholds.evaluate(&sample(60.0, 0.0, 120.0));
        assert_eq!(warning[0].kind, AlertKind::Memory);
        assert_eq!(warning[0].severity, AlertSeverity::Warning);
        let critical = thresholds.evaluate(&sample(60.0, 0.0, 151.0));
        assert_eq!(critical[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn multiple_kinds_fire_from_one_sample() {
        let thresholds = Thresholds::default();
        let alerts = thresholds.evaluate(&sample(10.0, 100.0, 200.0));
        assert_eq!(alerts.len(), 3);
        let kinds: Vec<_> = alerts.iter().map(|a| a.kind).collect();
        assert!(kinds.contains(&AlertKind::FrameRate));
        assert!(kinds.contains(&AlertKind::Render));
        assert!(kinds.contains(&AlertKind::Memory));
    }

    #[test]
    fn partial_update_merges() {
        let mut thresholds = Thresholds::default();
        thresholds.apply(ThresholdsUpdate {
            max_memory_mb: Some(200.0),
            ..Default::default()
        });
        assert_eq!(thresholds.max_memory_mb, 200.0);
        assert_eq!(thresholds.min_frame_rate, 55.0);
        assert_eq!(thresholds.max_operation_duration_ms, 16.67);
    }

    #[test]
    fn kind_display_is_kebab_case() {
        assert_eq!(AlertKind::FrameRate.to_string(), "frame-rate");
        assert_eq!(AlertKind::Render.to_string(), "render");
        assert_eq!(AlertKind::Memory.to_string(), "memory");
        assert_eq!(AlertSeverity::Warning.to_string(), "warning");
        assert_eq!(AlertSeverity::Critical.to_string(), "critical");
    }
}
