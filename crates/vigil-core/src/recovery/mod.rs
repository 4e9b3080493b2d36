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

//! Core contracts for rendering-failure containment.
//!
//! This module defines the abstract "what" of failure recovery: the immutable
//! [`FailureRecord`] produced at capture time, the [`BoundaryConfig`] a caller
//! supplies, and the [`FallbackContext`] contract a fallback presenter renders
//! from. The boundary state machine itself lives in `vigil-recovery`.

pub mod config;
pub mod contract;
pub mod record;

pub use self::config::{BoundaryConfig, BoundaryLevel, RecoveryOptions, ResetKey};
pub use self::contract::{
    ErrorSink, FailureCapture, FallbackContext, Navigator, RenderPlan, RootNavigator,
};
pub use self::record::{
    BoundaryPhase, CaptureContext, CaptureOrigin, FailureInfo, FailureRecord, RecoveryAction,
};
