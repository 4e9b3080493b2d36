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

//! Trait contracts at the seams of the recovery subsystem.
//!
//! Intercepting a failure raised while constructing a UI region is a host
//! runtime capability, not something this crate can reimplement. The host
//! invokes [`FailureCapture::capture`]; everything downstream of that call is
//! ordinary state-machine logic.

use std::sync::Arc;

use crate::recovery::config::BoundaryLevel;
use crate::recovery::record::{
    CaptureContext, CaptureOrigin, FailureInfo, FailureRecord, RecoveryAction,
};

/// Capability invoked by the hosting rendering runtime when constructing the
/// wrapped region fails.
pub trait FailureCapture {
    /// Captures a rendering failure. Must never panic.
    fn capture(&mut self, error: FailureInfo, origin: CaptureOrigin);
}

/// Pluggable persistence target for failure and recovery-outcome records.
///
/// Implementations must not queue or retry; the logger forwards each event
/// exactly once, synchronously.
pub trait ErrorSink: Send + Sync + 'static {
    /// Receives one immutable failure record.
    fn log_error(&self, record: &FailureRecord);

    /// Receives one recovery outcome.
    fn log_recovery(&self, action: RecoveryAction, success: bool);
}

/// Navigation target for the fallback's "home" action.
pub trait Navigator: Send + Sync + 'static {
    /// Navigates the host application to its root.
    fn navigate_home(&self);
}

/// Default navigator: records the intent and leaves the actual navigation to
/// the host, which owns the routing surface.
#[derive(Debug, Default)]
pub struct RootNavigator;

impl Navigator for RootNavigator {
    fn navigate_home(&self) {
        log::info!("fallback requested navigation to application root");
    }
}

/// Everything a fallback presenter needs to render a failed boundary.
#[derive(Debug, Clone)]
pub struct FallbackContext {
    /// The failure currently being contained.
    pub error: FailureInfo,
    /// The record logged for that failure.
    pub record: Arc<FailureRecord>,
    /// Containment level, for leveled fallback copy.
    pub level: BoundaryLevel,
    /// Boundary name.
    pub name: String,
    /// Retries consumed so far in this recovery effort.
    pub retry_count: u32,
    /// Retries honored before the action is withdrawn.
    pub max_retries: u32,
    /// Whether a retry request would currently be honored.
    pub can_retry: bool,
    /// Whether the caller supplied a home action worth offering.
    pub has_home: bool,
}

impl FallbackContext {
    /// Context details for the presenter, in reduced form when the host
    /// supplied no origin information.
    pub fn context(&self) -> &CaptureContext {
        &self.record.context
    }
}

/// What the host should render for a boundary on this pass.
#[derive(Debug, Clone)]
pub enum RenderPlan {
    /// Render the wrapped region unmodified.
    Content,
    /// Render the fallback presenter from the given context.
    Fallback(FallbackContext),
}

impl RenderPlan {
    /// Returns `true` when the wrapped region should render.
    pub fn is_content(&self) -> bool {
        matches!(self, RenderPlan::Content)
    }
}
