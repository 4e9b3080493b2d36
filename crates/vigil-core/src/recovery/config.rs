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

//! Configuration consumed by a recovery boundary.

use std::fmt::{self, Display};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Containment level of a boundary.
///
/// Descriptive only: it drives the fallback presenter's copy (a page-level
/// failure reads differently from a widget-level one) and is stored on every
/// failure record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryLevel {
    /// The boundary wraps an entire page or route.
    Page,
    /// The boundary wraps a feature area within a page.
    Feature,
    /// The boundary wraps a single component.
    Component,
}

impl Display for BoundaryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryLevel::Page => write!(f, "page"),
            BoundaryLevel::Feature => write!(f, "feature"),
            BoundaryLevel::Component => write!(f, "component"),
        }
    }
}

/// An opaque value whose change forces an unconditional recovery.
///
/// Boundaries never interpret the value; they only compare it against the
/// previously observed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetKey(String);

impl ResetKey {
    /// Creates a reset key from any string-like value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl From<&str> for ResetKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ResetKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for ResetKey {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// Recovery behavior of a boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryOptions {
    /// Retries honored per recovery effort before the action is withdrawn.
    pub max_retries: u32,
    /// Delay between a retry request and the re-render it triggers.
    pub retry_delay: Duration,
    /// Whether a failed episode schedules its own recovery attempt.
    pub enable_auto_recovery: bool,
    /// Delay between entering the failed state and the automatic attempt.
    pub auto_recovery_delay: Duration,
}

impl Default for RecoveryOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
            enable_auto_recovery: false,
            auto_recovery_delay: Duration::from_millis(5000),
        }
    }
}

/// Static configuration of a recovery boundary.
///
/// Reset keys are not part of this struct: they are observed per render pass
/// and reconciled separately, so a key change never counts as a configuration
/// change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// Name of the boundary, used in records and fallback copy.
    pub name: String,
    /// Containment level.
    pub level: BoundaryLevel,
    /// Accepted for callers that declare isolation intent; reserved, no
    /// observed behavior beyond appearing in the config snapshot.
    pub isolate: bool,
    /// Whether a change to this configuration while failed triggers a reset.
    pub reset_on_config_change: bool,
    /// Recovery behavior.
    pub recovery: RecoveryOptions,
}

impl BoundaryConfig {
    /// Creates a component-level configuration with default recovery options.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: BoundaryLevel::Component,
            isolate: false,
            reset_on_config_change: false,
            recovery: RecoveryOptions::default(),
        }
    }

    /// Sets the containment level.
    pub fn with_level(mut self, level: BoundaryLevel) -> Self {
        self.level = level;
        self
    }

    /// Declares isolation intent (reserved).
    pub fn with_isolate(mut self, isolate: bool) -> Self {
        self.isolate = isolate;
        self
    }

    /// Opts into reset-on-configuration-change reconciliation.
    pub fn with_reset_on_config_change(mut self, enabled: bool) -> Self {
        self.reset_on_config_change = enabled;
        self
    }

    /// Replaces the recovery options.
    pub fn with_recovery(mut self, recovery: RecoveryOptions) -> Self {
        self.recovery = recovery;
        self
    }
}
