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

//! Per-usage-site binding of a UI region's render activity to the monitor.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use vigil_core::telemetry::{MetricSample, ThresholdAlert};

use crate::monitor::{AlertSubscription, PerformanceMonitor};

/// Alerts retained per scope.
const ALERT_BUFFER_CAPACITY: usize = 10;

/// Interval of the local metrics poll.
const POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Per-scope configuration.
#[derive(Debug, Clone)]
pub struct ScopeOptions {
    /// Label forwarded with every recorded render.
    pub label: String,
    /// Whether render durations are forwarded to the monitor.
    pub track_renders: bool,
    /// Whether the scope collects the monitor's alerts.
    pub collect_alerts: bool,
}

impl ScopeOptions {
    /// Render tracking on, alert collection off.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            track_renders: true,
            collect_alerts: false,
        }
    }

    /// Enables or disables render tracking for this scope.
    pub fn with_render_tracking(mut self, enabled: bool) -> Self {
        self.track_renders = enabled;
        self
    }

    /// Enables or disables alert collection for this scope.
    pub fn with_alert_collection(mut self, enabled: bool) -> Self {
        self.collect_alerts = enabled;
        self
    }
}

struct AlertCollector {
    subscription: AlertSubscription,
    buffer: Arc<Mutex<VecDeque<ThresholdAlert>>>,
}

/// Binds one usage-site's render activity to the [`PerformanceMonitor`].
///
/// An active adapter polls the monitor's current metrics on a 1000ms
/// interval, optionally collects the last few alerts, and forwards render
/// durations under its bound label. Deactivation cancels the poll and
/// unsubscribes the alert handler; dropping the adapter deactivates it.
pub struct ScopeAdapter {
    monitor: PerformanceMonitor,
    options: ScopeOptions,
    active: bool,
    latest: Option<MetricSample>,
    next_poll: Option<Instant>,
    alerts: Option<AlertCollector>,
}

impl ScopeAdapter {
    /// Activates a scope at an explicit instant.
    pub fn activate_at(monitor: PerformanceMonitor, options: ScopeOptions, now: Instant) -> Self {
        let alerts = options.collect_alerts.then(|| {
            let buffer: Arc<Mutex<VecDeque<ThresholdAlert>>> =
                Arc::new(Mutex::new(VecDeque::with_capacity(ALERT_BUFFER_CAPACITY)));
            let sink = Arc::clone(&buffer);
            let subscription = monitor.on_performance_alert(move |alert| {
                let mut buffer = sink.lock().unwrap_or_else(PoisonError::into_inner);
                if buffer.len() == ALERT_BUFFER_CAPACITY {
                    buffer.pop_front();
                }
                buffer.push_back(alert.clone());
            });
            AlertCollector {
                subscription,
                buffer,
            }
        });

        let latest = Some(monitor.current_metrics());
        Self {
            monitor,
            options,
            active: true,
            latest,
            next_poll: Some(now + POLL_INTERVAL),
            alerts,
        }
    }

    /// Activates a scope with the real clock.
    pub fn activate(monitor: PerformanceMonitor, options: ScopeOptions) -> Self {
        Self::activate_at(monitor, options, Instant::now())
    }

    /// Refreshes the polled snapshot when the local interval has elapsed.
    pub fn tick_at(&mut self, now: Instant) {
        if let Some(due) = self.next_poll {
            if now >= due {
                self.latest = Some(self.monitor.current_metrics());
                self.next_poll = Some(now + POLL_INTERVAL);
            }
        }
    }

    /// Tick with the real clock.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// The continuously refreshed metrics snapshot.
    pub fn latest(&self) -> Option<MetricSample> {
        self.latest.clone()
    }

    /// The last alerts observed by this scope (≤10), oldest first.
    pub fn recent_alerts(&self) -> Vec<ThresholdAlert> {
        match &self.alerts {
            Some(collector) => collector
                .buffer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Forwards one render duration under the scope's label.
    ///
    /// No-op when render tracking is disabled or the scope is deactivated.
    pub fn record_render(&self, duration_ms: f64) {
        if self.active && self.options.track_renders {
            self.monitor.record_metric(&self.options.label, duration_ms);
        }
    }

    /// Starts an independent measurement at an explicit instant.
    ///
    /// Overlapping tokens on the same scope each produce their own sample.
    pub fn start_measuring_at(&self, now: Instant) -> MeasureToken {
        MeasureToken {
            monitor: self.monitor.clone(),
            label: self.options.label.clone(),
            enabled: self.active && self.options.track_renders,
            start: now,
        }
    }

    /// Starts a measurement with the real clock.
    pub fn start_measuring(&self) -> MeasureToken {
        self.start_measuring_at(Instant::now())
    }

    /// Cancels local polling and unsubscribes the alert handler.
    ///
    /// Idempotent; safe even if activation never completed its options.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.next_poll = None;
        if let Some(collector) = self.alerts.take() {
            collector.subscription.unsubscribe();
        }
    }
}

impl Drop for ScopeAdapter {
    fn drop(&mut self) {
        self.deactivate();
    }
}

impl std::fmt::Debug for ScopeAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeAdapter")
            .field("label", &self.options.label)
            .field("active", &self.active)
            .field("collecting_alerts", &self.alerts.is_some())
            .finish_non_exhaustive()
    }
}

/// One in-flight measurement produced by [`ScopeAdapter::start_measuring`].
#[derive(Debug)]
pub struct MeasureToken {
    monitor: PerformanceMonitor,
    label: String,
    enabled: bool,
    start: Instant,
}

impl MeasureToken {
    /// Stops the measurement at an explicit instant and forwards the elapsed
    /// time as a render duration.
    pub fn finish_at(self, now: Instant) {
        if self.enabled {
            let elapsed_ms = now.saturating_duration_since(self.start).as_secs_f64() * 1000.0;
            self.monitor.record_metric(&self.label, elapsed_ms);
        }
    }

    /// Stops the measurement with the real clock.
    pub fn finish(self) {
        self.finish_at(Instant::now());
    }
}
