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

//! A small host loop showing how the pieces are wired together: one
//! monitor, one scope per region, one recovery boundary around the flaky
//! region, everything pumped from a single cooperative loop.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use vigil_core::recovery::{
    BoundaryConfig, BoundaryLevel, CaptureOrigin, FailureInfo, RecoveryOptions, RenderPlan,
};
use vigil_recovery::{ErrorLogger, RecoveryBoundary};
use vigil_telemetry::{
    FrameClock, PerformanceMonitor, ScopeAdapter, ScopeOptions, SysinfoProbe,
};

/// A region that fails its first two renders, then behaves.
struct FlakyFeed {
    failures_left: u32,
}

impl FlakyFeed {
    fn render(&mut self, boundary: &mut RecoveryBoundary, scope: &ScopeAdapter, now: Instant) {
        match boundary.render_plan() {
            RenderPlan::Content => {
                if self.failures_left > 0 {
                    self.failures_left -= 1;
                    boundary.capture_at(
                        FailureInfo::new("feed item deserialization failed"),
                        CaptureOrigin {
                            component_trace: Some("App > Home > Feed".to_string()),
                            surface: Some("home".to_string()),
                            url: Some("/home".to_string()),
                        },
                        now,
                    );
                    return;
                }
                let token = scope.start_measuring();
                thread::sleep(Duration::from_millis(3));
                token.finish();
            }
            RenderPlan::Fallback(fallback) => {
                log::info!(
                    "feed fallback shown: {} (retry {}/{})",
                    fallback.error,
                    fallback.retry_count,
                    fallback.max_retries
                );
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let clock = Arc::new(FrameClock::new());
    let probe = Arc::new(SysinfoProbe::new(Arc::clone(&clock)));
    let monitor = PerformanceMonitor::with_default_thresholds(probe);
    monitor.start_monitoring();

    let _alerts = monitor.on_performance_alert(|alert| {
        log::warn!("[{}] {}", alert.severity, alert.message);
    });

    let feed_scope = ScopeAdapter::activate(
        monitor.clone(),
        ScopeOptions::new("Feed").with_alert_collection(true),
    );

    let config = BoundaryConfig::new("feed")
        .with_level(BoundaryLevel::Feature)
        .with_recovery(RecoveryOptions {
            max_retries: 3,
            retry_delay: Duration::from_millis(50),
            enable_auto_recovery: true,
            auto_recovery_delay: Duration::from_millis(200),
        });
    let mut boundary = RecoveryBoundary::new(config, ErrorLogger::console())
        .with_on_retry(|| log::info!("feed boundary retrying"));

    // Cooperative host loop: ~60 frames at 16ms each.
    let start = Instant::now();
    let mut feed = FlakyFeed { failures_left: 2 };
    for frame in 0..60u32 {
        let now = start + Duration::from_millis(u64::from(frame) * 16);
        clock.mark_frame_at(now);

        boundary.tick_at(now);
        monitor.tick_at(now);

        feed.render(&mut boundary, &feed_scope, now);
        feed_scope.record_render(2.5);
        thread::sleep(Duration::from_millis(1));
    }

    let summary = monitor.performance_summary();
    println!(
        "summary: {:.1} fps avg, {:.2}ms render avg, {:.1}MB avg, {} alerts",
        summary.avg_fps, summary.avg_render_time_ms, summary.avg_memory_mb, summary.alerts
    );
    println!(
        "feed recovered: {} (retries used: {})",
        !boundary.is_failed(),
        boundary.retry_count()
    );
    for alert in feed_scope.recent_alerts() {
        println!("recent alert: {}", alert.message);
    }

    Ok(())
}
