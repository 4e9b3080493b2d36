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

//! The failure-containment unit wrapping a bounded UI region.
//!
//! State machine: `Normal` → (capture) → `Failed` → (reset | retry firing |
//! auto-recovery firing) → `Normal`. Re-entering `Failed` while a recovery is
//! pending replaces the failure record but does not restart already-scheduled
//! timers. The retry counter measures attempts within one recovery effort and
//! is zeroed only by [`RecoveryBoundary::reset`], so a re-render that fails
//! again keeps the count.
//!
//! All time-dependent entry points take an explicit `now`; the plain-named
//! wrappers use the real clock. The host pumps [`RecoveryBoundary::tick`]
//! once per turn to observe due deadlines.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use vigil_core::recovery::{
    BoundaryConfig, BoundaryPhase, CaptureContext, CaptureOrigin, FailureCapture, FailureInfo,
    FallbackContext, Navigator, RecoveryAction, RenderPlan, ResetKey, RootNavigator,
};
use vigil_core::time::unix_timestamp_ms;

use crate::logger::ErrorLogger;

type ErrorObserver = Box<dyn Fn(&FailureInfo, &CaptureContext) + Send>;
type RecoveryObserver = Box<dyn Fn() + Send>;

/// Contains rendering failures to the smallest region possible and offers
/// deterministic recovery.
pub struct RecoveryBoundary {
    config: BoundaryConfig,
    logger: ErrorLogger,
    phase: BoundaryPhase,
    retry_count: u32,
    retry_deadline: Option<Instant>,
    auto_deadline: Option<Instant>,
    last_keys: Option<Vec<ResetKey>>,
    on_error: Option<ErrorObserver>,
    on_reset: Option<RecoveryObserver>,
    on_retry: Option<RecoveryObserver>,
    navigator: Box<dyn Navigator>,
    has_custom_navigator: bool,
}

impl RecoveryBoundary {
    /// Creates a boundary in the normal state.
    pub fn new(config: BoundaryConfig, logger: ErrorLogger) -> Self {
        Self {
            config,
            logger,
            phase: BoundaryPhase::Normal,
            retry_count: 0,
            retry_deadline: None,
            auto_deadline: None,
            last_keys: None,
            on_error: None,
            on_reset: None,
            on_retry: None,
            navigator: Box::new(RootNavigator),
            has_custom_navigator: false,
        }
    }

    /// Registers an observer invoked on every capture.
    pub fn with_on_error(mut self, observer: impl Fn(&FailureInfo, &CaptureContext) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(observer));
        self
    }

    /// Registers an observer invoked on every reset.
    pub fn with_on_reset(mut self, observer: impl Fn() + Send + 'static) -> Self {
        self.on_reset = Some(Box::new(observer));
        self
    }

    /// Registers an observer invoked on every honored retry.
    pub fn with_on_retry(mut self, observer: impl Fn() + Send + 'static) -> Self {
        self.on_retry = Some(Box::new(observer));
        self
    }

    /// Replaces the default root navigator used by the fallback's home action.
    pub fn with_navigator(mut self, navigator: impl Navigator) -> Self {
        self.navigator = Box::new(navigator);
        self.has_custom_navigator = true;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &BoundaryConfig {
        &self.config
    }

    /// Current phase.
    pub fn phase(&self) -> &BoundaryPhase {
        &self.phase
    }

    /// Returns `true` while a failure is being contained.
    pub fn is_failed(&self) -> bool {
        self.phase.is_failed()
    }

    /// Retries consumed in the current recovery effort.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Whether a retry request would currently be honored.
    pub fn can_retry(&self) -> bool {
        self.is_failed()
            && self.retry_count < self.config.recovery.max_retries
            && self.retry_deadline.is_none()
    }

    /// Captures a rendering failure at an explicit instant.
    ///
    /// Always transitions to `Failed` and always logs exactly one failure
    /// record. A capture while already failed replaces the record without
    /// touching pending timers; a capture from normal starts a new episode
    /// and arms the auto-recovery timer when enabled. This method never
    /// panics: observer panics are caught and logged.
    pub fn capture_at(&mut self, error: FailureInfo, origin: CaptureOrigin, now: Instant) {
        let context = self.build_context(origin);
        let record = self.logger.log_error(error.clone(), context.clone());

        if !self.phase.is_failed() {
            // New episode: the auto-recovery timer fires at most once per
            // episode, measured from entry.
            if self.config.recovery.enable_auto_recovery {
                self.auto_deadline = Some(now + self.config.recovery.auto_recovery_delay);
            }
        }
        self.phase = BoundaryPhase::Failed {
            error: error.clone(),
            record,
        };

        if let Some(observer) = &self.on_error {
            if catch_unwind(AssertUnwindSafe(|| observer(&error, &context))).is_err() {
                log::error!("[{}] on_error observer panicked; continuing", self.config.name);
            }
        }
    }

    /// Restores the normal state unconditionally.
    ///
    /// Cancels pending timers, zeroes the retry counter, invokes the reset
    /// observer, and logs the recovery outcome. A reset while already normal
    /// is a no-op.
    pub fn reset(&mut self) {
        if !self.phase.is_failed() {
            return;
        }
        self.phase = BoundaryPhase::Normal;
        self.retry_count = 0;
        self.retry_deadline = None;
        self.auto_deadline = None;
        if let Some(observer) = &self.on_reset {
            if catch_unwind(AssertUnwindSafe(observer)).is_err() {
                log::error!("[{}] on_reset observer panicked; continuing", self.config.name);
            }
        }
        self.logger.log_recovery(RecoveryAction::Reset, true);
    }

    /// Requests a re-render of the wrapped region at an explicit instant.
    ///
    /// Honored only while failed, under the retry limit, and with no retry
    /// already pending; returns whether the request was honored. The
    /// re-render itself happens `retry_delay` later, observed by
    /// [`tick_at`](Self::tick_at).
    pub fn retry_at(&mut self, now: Instant) -> bool {
        if !self.can_retry() {
            return false;
        }
        self.retry_count += 1;
        if let Some(observer) = &self.on_retry {
            if catch_unwind(AssertUnwindSafe(observer)).is_err() {
                log::error!("[{}] on_retry observer panicked; continuing", self.config.name);
            }
        }
        self.logger.log_recovery(RecoveryAction::Retry, true);
        self.retry_deadline = Some(now + self.config.recovery.retry_delay);
        true
    }

    /// Processes due deadlines.
    ///
    /// A due retry deadline exits the failed state so the host re-renders the
    /// wrapped region on its next pass; a due auto-recovery deadline invokes
    /// the same path as [`retry_at`](Self::retry_at), once per episode.
    pub fn tick_at(&mut self, now: Instant) {
        if !self.phase.is_failed() {
            return;
        }
        if let Some(deadline) = self.retry_deadline {
            if now >= deadline {
                // Leaving Failed cancels the episode's auto-recovery timer.
                self.retry_deadline = None;
                self.auto_deadline = None;
                self.phase = BoundaryPhase::Normal;
                return;
            }
        }
        if let Some(deadline) = self.auto_deadline {
            if now >= deadline {
                self.auto_deadline = None;
                self.retry_at(now);
            }
        }
    }

    /// Reconciles the observed reset keys.
    ///
    /// Must be called before every fallback render pass. Any element-wise
    /// change (value or length) while failed triggers an unconditional reset;
    /// unchanged keys never reset an existing failed state.
    pub fn reconcile_keys(&mut self, keys: &[ResetKey]) {
        let changed = match &self.last_keys {
            Some(previous) => previous.as_slice() != keys,
            None => false,
        };
        if changed && self.phase.is_failed() {
            self.reset();
        }
        self.last_keys = Some(keys.to_vec());
    }

    /// Reconciles a configuration change.
    ///
    /// When the incoming configuration opts in, a change to the boundary's
    /// own configuration while failed triggers a reset. Changes to the
    /// wrapped content are invisible here and never reset anything.
    pub fn reconcile_config(&mut self, config: BoundaryConfig) {
        let changed = config != self.config;
        let should_reset = config.reset_on_config_change && changed && self.phase.is_failed();
        self.config = config;
        if should_reset {
            self.reset();
        }
    }

    /// What the host should render on this pass.
    pub fn render_plan(&self) -> RenderPlan {
        match &self.phase {
            BoundaryPhase::Normal => RenderPlan::Content,
            BoundaryPhase::Failed { error, record } => RenderPlan::Fallback(FallbackContext {
                error: error.clone(),
                record: record.clone(),
                level: self.config.level,
                name: self.config.name.clone(),
                retry_count: self.retry_count,
                max_retries: self.config.recovery.max_retries,
                can_retry: self.can_retry(),
                has_home: self.has_custom_navigator,
            }),
        }
    }

    /// Invokes the home action (root navigation by default).
    pub fn go_home(&self) {
        self.navigator.navigate_home();
    }

    /// Cancels every timer this boundary owns.
    ///
    /// Called on unmount; safe to call repeatedly, and no further state is
    /// touched afterward.
    pub fn detach(&mut self) {
        self.retry_deadline = None;
        self.auto_deadline = None;
    }

    /// Capture with the real clock.
    pub fn capture_now(&mut self, error: FailureInfo, origin: CaptureOrigin) {
        self.capture_at(error, origin, Instant::now());
    }

    /// Retry with the real clock.
    pub fn retry(&mut self) -> bool {
        self.retry_at(Instant::now())
    }

    /// Tick with the real clock.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn build_context(&self, origin: CaptureOrigin) -> CaptureContext {
        let snapshot =
            serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null);
        CaptureContext {
            boundary_name: self.config.name.clone(),
            boundary_level: self.config.level,
            config_snapshot: snapshot,
            component_trace: origin.component_trace,
            surface: origin.surface,
            url: origin.url,
            timestamp_ms: unix_timestamp_ms(),
        }
    }
}

impl FailureCapture for RecoveryBoundary {
    fn capture(&mut self, error: FailureInfo, origin: CaptureOrigin) {
        self.capture_now(error, origin);
    }
}

impl fmt::Debug for RecoveryBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryBoundary")
            .field("name", &self.config.name)
            .field("failed", &self.phase.is_failed())
            .field("retry_count", &self.retry_count)
            .field("retry_pending", &self.retry_deadline.is_some())
            .field("auto_pending", &self.auto_deadline.is_some())
            .finish_non_exhaustive()
    }
}
