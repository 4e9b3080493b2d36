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

//! Immutable records describing a captured rendering failure.

use std::fmt::{self, Display};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::recovery::config::BoundaryLevel;

/// The failure itself: a message plus an optional stack trace.
///
/// Boundaries treat the failing error as opaque data; whatever the host
/// rendering runtime can report is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureInfo {
    /// Human-readable description of the failure.
    pub message: String,
    /// Stack trace as reported by the host, if any.
    pub stack: Option<String>,
}

impl FailureInfo {
    /// Creates a failure description from a message alone.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
        }
    }

    /// Attaches a stack trace, returning the updated description.
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

impl Display for FailureInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Host-supplied origin details for a capture.
///
/// All fields are optional: a capture with no origin at all is tolerated and
/// simply produces a record (and a fallback) with reduced detail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureOrigin {
    /// Trace of the UI subtree that failed, as rendered by the host runtime.
    pub component_trace: Option<String>,
    /// The surface (screen, route, panel) the failure originated from.
    pub surface: Option<String>,
    /// The URL or location the host was presenting at capture time.
    pub url: Option<String>,
}

/// The full context stored with a [`FailureRecord`].
///
/// Combines the host-supplied [`CaptureOrigin`] with what the boundary knows
/// about itself at capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureContext {
    /// Name of the boundary that captured the failure.
    pub boundary_name: String,
    /// Containment level of the boundary.
    pub boundary_level: BoundaryLevel,
    /// Snapshot of the boundary configuration at capture time.
    pub config_snapshot: serde_json::Value,
    /// Trace of the failing UI subtree, if the host reported one.
    pub component_trace: Option<String>,
    /// Originating surface, if known.
    pub surface: Option<String>,
    /// Originating URL, if known.
    pub url: Option<String>,
    /// Wall-clock capture time, milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

/// A structured, immutable capture of one rendering failure.
///
/// Records are created by the error logger at capture time and never mutated
/// afterward. The sequence number is assigned monotonically by the logger;
/// the id is globally unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Globally unique identity of this record.
    pub id: Uuid,
    /// Monotonic sequence number assigned by the error logger.
    pub sequence: u64,
    /// The failure that was captured.
    pub error: FailureInfo,
    /// Everything known about where and when the failure happened.
    pub context: CaptureContext,
}

impl FailureRecord {
    /// Builds a new record with a fresh id.
    pub fn new(sequence: u64, error: FailureInfo, context: CaptureContext) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence,
            error,
            context,
        }
    }
}

/// The recovery action reported to the error logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryAction {
    /// The boundary was reset to its normal state.
    Reset,
    /// A re-render of the wrapped region was attempted.
    Retry,
}

impl Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryAction::Reset => write!(f, "reset"),
            RecoveryAction::Retry => write!(f, "retry"),
        }
    }
}

/// The observable state of a recovery boundary.
///
/// Transitions happen only inside the boundary; external collaborators read
/// the phase through the boundary's render plan.
#[derive(Debug, Clone)]
pub enum BoundaryPhase {
    /// The wrapped region renders unmodified.
    Normal,
    /// A failure is being contained; the fallback presenter takes over.
    Failed {
        /// The most recent failure (re-entering Failed replaces it).
        error: FailureInfo,
        /// The record logged for that failure.
        record: Arc<FailureRecord>,
    },
}

impl BoundaryPhase {
    /// Returns `true` while a failure is being contained.
    pub fn is_failed(&self) -> bool {
        matches!(self, BoundaryPhase::Failed { .. })
    }
}
