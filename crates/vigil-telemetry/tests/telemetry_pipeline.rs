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

//! Monitor, scope adapters, and probes driven together from one loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use vigil_core::telemetry::{AlertKind, AlertSeverity, SystemProbe, ThresholdsUpdate};
use vigil_telemetry::{
    FixedProbe, FrameClock, PerformanceMonitor, ScopeAdapter, ScopeOptions, SysinfoProbe,
    SYSTEM_ORIGIN_LABEL,
};

#[test]
fn two_scopes_feed_one_monitor() {
    let monitor =
        PerformanceMonitor::with_default_thresholds(Arc::new(FixedProbe::new(60.0, 20.0)));
    let t0 = Instant::now();
    monitor.start_monitoring_at(t0);

    let sidebar = ScopeAdapter::activate_at(monitor.clone(), ScopeOptions::new("Sidebar"), t0);
    let chart = ScopeAdapter::activate_at(
        monitor.clone(),
        ScopeOptions::new("Chart").with_alert_collection(true),
        t0,
    );

    // A frame's worth of work: the sidebar is fine, the chart is slow.
    sidebar.record_render(4.0);
    chart.record_render(40.0);

    // The periodic sampler contributes a system sample on its interval.
    monitor.tick_at(t0 + Duration::from_millis(1000));

    let history = monitor.metrics_history();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].origin_label, "Sidebar");
    assert_eq!(history[1].origin_label, "Chart");
    assert_eq!(history[2].origin_label, SYSTEM_ORIGIN_LABEL);

    // Only the chart's recording breached a threshold (40ms > 2 * 16.67ms).
    let alerts = chart.recent_alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::Render);
    assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    assert_eq!(alerts[0].sample.origin_label, "Chart");
    assert!(sidebar.recent_alerts().is_empty());

    let summary = monitor.performance_summary();
    assert_eq!(summary.avg_fps, 60.0);
    assert_eq!(summary.alerts, 1);
}

#[test]
fn degrading_frame_rate_escalates_to_critical() {
    let probe = Arc::new(FixedProbe::new(60.0, 20.0));
    let monitor =
        PerformanceMonitor::with_default_thresholds(Arc::clone(&probe) as Arc<dyn SystemProbe>);
    let t0 = Instant::now();
    monitor.start_monitoring_at(t0);

    let dashboard = ScopeAdapter::activate_at(
        monitor.clone(),
        ScopeOptions::new("Dashboard").with_alert_collection(true),
        t0,
    );

    monitor.tick_at(t0 + Duration::from_millis(1000));
    assert!(dashboard.recent_alerts().is_empty());

    probe.set_frame_rate(40.0); // below 55: warning
    monitor.tick_at(t0 + Duration::from_millis(2000));
    probe.set_frame_rate(20.0); // below 55 / 2: critical
    monitor.tick_at(t0 + Duration::from_millis(3000));

    let alerts = dashboard.recent_alerts();
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].severity, AlertSeverity::Warning);
    assert_eq!(alerts[1].severity, AlertSeverity::Critical);
    assert!(alerts.iter().all(|a| a.kind == AlertKind::FrameRate));
}

#[test]
fn relaxed_thresholds_silence_a_noisy_scope() {
    let monitor =
        PerformanceMonitor::with_default_thresholds(Arc::new(FixedProbe::new(60.0, 20.0)));
    let scope = ScopeAdapter::activate(
        monitor.clone(),
        ScopeOptions::new("Import").with_alert_collection(true),
    );

    scope.record_render(30.0);
    assert_eq!(scope.recent_alerts().len(), 1);

    // Bulk imports are expected to be slow; raise the limit for them.
    monitor.update_thresholds(ThresholdsUpdate {
        max_operation_duration_ms: Some(100.0),
        ..Default::default()
    });
    scope.record_render(30.0);
    assert_eq!(scope.recent_alerts().len(), 1);
}

#[test]
fn frame_clock_drives_the_sysinfo_probe() {
    let clock = Arc::new(FrameClock::new());
    let monitor = PerformanceMonitor::with_default_thresholds(Arc::new(SysinfoProbe::new(
        Arc::clone(&clock),
    )));

    for _ in 0..30 {
        clock.mark_frame();
    }
    let snapshot = monitor.current_metrics();
    assert_eq!(snapshot.frame_rate, 30.0);
    assert!(snapshot.memory_usage_mb > 0.0);
}

#[test]
fn measurement_tokens_survive_scope_deactivation() {
    let monitor =
        PerformanceMonitor::with_default_thresholds(Arc::new(FixedProbe::new(60.0, 20.0)));
    let t0 = Instant::now();
    let mut scope = ScopeAdapter::activate_at(monitor.clone(), ScopeOptions::new("Export"), t0);

    let token = scope.start_measuring_at(t0);
    scope.deactivate();
    token.finish_at(t0 + Duration::from_millis(8));

    // The token was issued while the scope was active, so it still lands.
    let history = monitor.metrics_history();
    assert_eq!(history.len(), 1);
    assert!((history[0].operation_duration_ms - 8.0).abs() < 1e-9);
}
