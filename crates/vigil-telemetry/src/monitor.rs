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

//! The single process-wide authority for sampling, history, and alerting.

use std::collections::VecDeque;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use vigil_core::telemetry::{
    MetricSample, PerformanceSummary, SystemProbe, ThresholdAlert, Thresholds, ThresholdsUpdate,
};
use vigil_core::time::unix_timestamp_ms;

/// Samples retained in the rolling history.
const HISTORY_CAPACITY: usize = 100;

/// Interval of the periodic sampler.
const SAMPLE_INTERVAL: Duration = Duration::from_millis(1000);

/// Origin label of periodic and snapshot samples.
pub const SYSTEM_ORIGIN_LABEL: &str = "system";

type AlertHandler = Box<dyn Fn(&ThresholdAlert) + Send>;

struct Subscriber {
    id: u64,
    handler: AlertHandler,
}

struct MonitorState {
    thresholds: Thresholds,
    history: VecDeque<MetricSample>,
    subscribers: Vec<Subscriber>,
    next_subscriber_id: u64,
    alerts_dispatched: u64,
    /// Next sampler deadline while monitoring is started.
    sampler_due: Option<Instant>,
}

/// Cloneable handle to the process-wide performance monitor.
///
/// Constructed once by the composition root with its thresholds and probe;
/// thresholds change afterward only through
/// [`update_thresholds`](Self::update_thresholds). Clones share all state.
#[derive(Clone)]
pub struct PerformanceMonitor {
    probe: Arc<dyn SystemProbe>,
    state: Arc<Mutex<MonitorState>>,
}

impl PerformanceMonitor {
    /// Creates a monitor with explicit thresholds.
    pub fn new(thresholds: Thresholds, probe: Arc<dyn SystemProbe>) -> Self {
        Self {
            probe,
            state: Arc::new(Mutex::new(MonitorState {
                thresholds,
                history: VecDeque::with_capacity(HISTORY_CAPACITY),
                subscribers: Vec::new(),
                next_subscriber_id: 0,
                alerts_dispatched: 0,
                sampler_due: None,
            })),
        }
    }

    /// Creates a monitor with the default thresholds.
    pub fn with_default_thresholds(probe: Arc<dyn SystemProbe>) -> Self {
        Self::new(Thresholds::default(), probe)
    }

    /// Arms the periodic sampler at an explicit instant. Idempotent: a
    /// second start while armed is a no-op.
    pub fn start_monitoring_at(&self, now: Instant) {
        let mut state = self.lock();
        if state.sampler_due.is_none() {
            state.sampler_due = Some(now + SAMPLE_INTERVAL);
            log::trace!("performance sampler armed");
        }
    }

    /// Arms the periodic sampler with the real clock.
    pub fn start_monitoring(&self) {
        self.start_monitoring_at(Instant::now());
    }

    /// Disarms the periodic sampler. Idempotent and safe if never started.
    pub fn stop_monitoring(&self) {
        let mut state = self.lock();
        if state.sampler_due.take().is_some() {
            log::trace!("performance sampler disarmed");
        }
    }

    /// Returns `true` while the periodic sampler is armed.
    pub fn is_monitoring(&self) -> bool {
        self.lock().sampler_due.is_some()
    }

    /// Processes the sampler deadline at an explicit instant.
    ///
    /// Appends a system sample (current frame rate and memory, zero
    /// duration) whenever the interval has elapsed.
    pub fn tick_at(&self, now: Instant) {
        let sample = {
            let mut state = self.lock();
            match state.sampler_due {
                Some(due) if now >= due => {
                    state.sampler_due = Some(now + SAMPLE_INTERVAL);
                }
                _ => return,
            }
            self.snapshot(SYSTEM_ORIGIN_LABEL, 0.0)
        };
        let mut state = self.lock();
        Self::append_and_evaluate(&mut state, sample);
    }

    /// Tick with the real clock.
    pub fn tick(&self) {
        self.tick_at(Instant::now());
    }

    /// Records one operation duration under the given label.
    ///
    /// Always appends a sample regardless of the sampler state, evaluates
    /// thresholds immediately, and dispatches any resulting alerts.
    pub fn record_metric(&self, label: &str, duration_ms: f64) {
        let sample = self.snapshot(label, duration_ms);
        let mut state = self.lock();
        Self::append_and_evaluate(&mut state, sample);
    }

    /// Ephemeral snapshot of the current readings; never appended to history.
    pub fn current_metrics(&self) -> MetricSample {
        self.snapshot(SYSTEM_ORIGIN_LABEL, 0.0)
    }

    /// Owned copy of the retained history, oldest first.
    pub fn metrics_history(&self) -> Vec<MetricSample> {
        self.lock().history.iter().cloned().collect()
    }

    /// Current thresholds.
    pub fn thresholds(&self) -> Thresholds {
        self.lock().thresholds
    }

    /// Merges a partial threshold update; absent fields stay unchanged.
    pub fn update_thresholds(&self, update: ThresholdsUpdate) {
        self.lock().thresholds.apply(update);
    }

    /// Registers an alert handler and returns its subscription.
    ///
    /// Handlers run synchronously during dispatch and must not call back
    /// into the monitor. A panicking handler is caught, logged, and does not
    /// block the remaining handlers.
    pub fn on_performance_alert(
        &self,
        handler: impl Fn(&ThresholdAlert) + Send + 'static,
    ) -> AlertSubscription {
        let mut state = self.lock();
        let id = state.next_subscriber_id;
        state.next_subscriber_id += 1;
        state.subscribers.push(Subscriber {
            id,
            handler: Box::new(handler),
        });
        AlertSubscription {
            state: Arc::downgrade(&self.state),
            id,
        }
    }

    /// Averages over the retained history plus the total alert count.
    ///
    /// All-zero when the history is empty.
    pub fn performance_summary(&self) -> PerformanceSummary {
        let state = self.lock();
        if state.history.is_empty() {
            return PerformanceSummary::default();
        }
        let count = state.history.len() as f64;
        let (mut fps, mut duration, mut memory) = (0.0, 0.0, 0.0);
        for sample in &state.history {
            fps += sample.frame_rate;
            duration += sample.operation_duration_ms;
            memory += sample.memory_usage_mb;
        }
        PerformanceSummary {
            avg_fps: round_to(fps / count, 1),
            avg_render_time_ms: round_to(duration / count, 2),
            avg_memory_mb: memory / count,
            alerts: state.alerts_dispatched,
        }
    }

    fn snapshot(&self, label: &str, duration_ms: f64) -> MetricSample {
        MetricSample {
            frame_rate: self.probe.frame_rate(),
            operation_duration_ms: duration_ms,
            memory_usage_mb: self.probe.memory_usage_mb(),
            timestamp_ms: unix_timestamp_ms(),
            origin_label: label.to_string(),
        }
    }

    fn append_and_evaluate(state: &mut MonitorState, sample: MetricSample) {
        if state.history.len() == HISTORY_CAPACITY {
            state.history.pop_front();
        }
        state.history.push_back(sample.clone());

        let alerts = state.thresholds.evaluate(&sample);
        state.alerts_dispatched += alerts.len() as u64;
        for alert in &alerts {
            log::warn!("performance alert [{}/{}]: {}", alert.kind, alert.severity, alert.message);
            for subscriber in &state.subscribers {
                let handler = &subscriber.handler;
                if catch_unwind(AssertUnwindSafe(|| handler(alert))).is_err() {
                    log::error!(
                        "performance alert handler {} panicked; skipping",
                        subscriber.id
                    );
                }
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, MonitorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for PerformanceMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("PerformanceMonitor")
            .field("thresholds", &state.thresholds)
            .field("history_len", &state.history.len())
            .field("subscribers", &state.subscribers.len())
            .field("monitoring", &state.sampler_due.is_some())
            .finish()
    }
}

/// Handle returned from [`PerformanceMonitor::on_performance_alert`].
///
/// Consuming [`unsubscribe`](Self::unsubscribe) guarantees the handler is
/// never invoked by subsequent recordings. Dropping the subscription without
/// unsubscribing leaves the handler registered for the monitor's lifetime.
#[derive(Debug)]
pub struct AlertSubscription {
    state: Weak<Mutex<MonitorState>>,
    id: u64,
}

impl AlertSubscription {
    /// Removes the handler from the monitor's dispatch list.
    pub fn unsubscribe(self) {
        if let Some(state) = self.state.upgrade() {
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            state.subscribers.retain(|s| s.id != self.id);
        }
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::FixedProbe;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vigil_core::telemetry::{AlertKind, AlertSeverity};

    fn monitor_with(frame_rate: f64, memory_mb: f64) -> PerformanceMonitor {
        PerformanceMonitor::with_default_thresholds(Arc::new(FixedProbe::new(
            frame_rate, memory_mb,
        )))
    }

    #[test]
    fn history_retains_the_most_recent_hundred() {
        let monitor = monitor_with(60.0, 10.0);
        for i in 0..150 {
            monitor.record_metric(&format!("Component{i}"), 1.0);
        }
        let history = monitor.metrics_history();
        assert_eq!(history.len(), 100);
        assert_eq!(history.first().unwrap().origin_label, "Component50");
        assert_eq!(history.last().unwrap().origin_label, "Component149");
    }

    #[test]
    fn record_metric_works_without_starting_the_sampler() {
        let monitor = monitor_with(60.0, 10.0);
        assert!(!monitor.is_monitoring());
        monitor.record_metric("render", 5.0);
        assert_eq!(monitor.metrics_history().len(), 1);
    }

    #[test]
    fn critical_render_alert_for_fifty_ms() {
        let monitor = monitor_with(60.0, 10.0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in = seen.clone();
        let _subscription = monitor.on_performance_alert(move |alert| {
            seen_in.lock().unwrap().push(alert.clone());
        });

        monitor.record_metric("render", 50.0);
        let alerts = seen.lock().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Render);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[0].sample.operation_duration_ms, 50.0);
    }

    #[test]
    fn unsubscribed_handlers_are_never_invoked_again() {
        let monitor = monitor_with(60.0, 10.0);
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = calls.clone();
        let subscription = monitor.on_performance_alert(move |_| {
            calls_in.fetch_add(1, Ordering::Relaxed);
        });

        monitor.record_metric("render", 50.0);
        assert_eq!(calls.load(Ordering::Relaxed), 1);

        subscription.unsubscribe();
        monitor.record_metric("render", 50.0);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn panicking_handler_does_not_block_the_others() {
        let monitor = monitor_with(60.0, 10.0);
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = calls.clone();
        let _bad = monitor.on_performance_alert(|_| panic!("handler bug"));
        let _good = monitor.on_performance_alert(move |_| {
            calls_in.fetch_add(1, Ordering::Relaxed);
        });

        monitor.record_metric("render", 50.0);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn summary_is_all_zero_on_empty_history() {
        let monitor = monitor_with(60.0, 10.0);
        assert_eq!(monitor.performance_summary(), PerformanceSummary::default());
    }

    #[test]
    fn summary_averages_and_rounds() {
        let monitor = monitor_with(59.9, 42.0);
        monitor.record_metric("render", 10.0);
        monitor.record_metric("render", 11.0);
        monitor.record_metric("render", 12.005);
        let summary = monitor.performance_summary();
        assert_eq!(summary.avg_fps, 59.9);
        assert_eq!(summary.avg_render_time_ms, 11.0);
        assert!((summary.avg_memory_mb - 42.0).abs() < 1e-9);
        assert_eq!(summary.alerts, 0);
    }

    #[test]
    fn summary_counts_dispatched_alerts() {
        let monitor = monitor_with(60.0, 10.0);
        monitor.record_metric("render", 50.0);
        monitor.record_metric("render", 20.0);
        assert_eq!(monitor.performance_summary().alerts, 2);
    }

    #[test]
    fn sampler_appends_on_the_interval() {
        let monitor = monitor_with(60.0, 10.0);
        let t0 = Instant::now();
        monitor.start_monitoring_at(t0);
        monitor.start_monitoring_at(t0); // double start is a no-op

        monitor.tick_at(t0 + Duration::from_millis(999));
        assert!(monitor.metrics_history().is_empty());

        monitor.tick_at(t0 + Duration::from_millis(1000));
        let history = monitor.metrics_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].origin_label, SYSTEM_ORIGIN_LABEL);
        assert_eq!(history[0].operation_duration_ms, 0.0);

        monitor.stop_monitoring();
        monitor.stop_monitoring(); // idempotent
        monitor.tick_at(t0 + Duration::from_millis(5000));
        assert_eq!(monitor.metrics_history().len(), 1);
    }

    #[test]
    fn stop_without_start_is_safe() {
        let monitor = monitor_with(60.0, 10.0);
        monitor.stop_monitoring();
        assert!(!monitor.is_monitoring());
    }

    #[test]
    fn current_metrics_does_not_touch_history() {
        let monitor = monitor_with(48.0, 75.0);
        let snapshot = monitor.current_metrics();
        assert_eq!(snapshot.frame_rate, 48.0);
        assert_eq!(snapshot.memory_usage_mb, 75.0);
        assert!(monitor.metrics_history().is_empty());
    }

    #[test]
    fn thresholds_update_applies_partially() {
        let monitor = monitor_with(60.0, 10.0);
        monitor.update_thresholds(ThresholdsUpdate {
            min_frame_rate: Some(30.0),
            ..Default::default()
        });
        let thresholds = monitor.thresholds();
        assert_eq!(thresholds.min_frame_rate, 30.0);
        assert_eq!(thresholds.max_memory_mb, 100.0);
    }

    #[test]
    fn clones_share_state() {
        let monitor = monitor_with(60.0, 10.0);
        let clone = monitor.clone();
        monitor.record_metric("render", 1.0);
        assert_eq!(clone.metrics_history().len(), 1);
    }
}
