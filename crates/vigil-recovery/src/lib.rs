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

//! # Vigil Recovery
//!
//! Failure containment for a bounded region of a UI tree.
//!
//! A [`RecoveryBoundary`] wraps one region: the host rendering runtime
//! reports construction failures through the [`FailureCapture`] capability,
//! the boundary contains them and drives a deterministic recovery state
//! machine, and a fallback presenter renders from the boundary's
//! [`RenderPlan`](vigil_core::RenderPlan). Every capture and recovery outcome
//! is forwarded to an [`ErrorLogger`] backed by a pluggable sink.
//!
//! The subsystem is single-threaded and timer-driven: the host pumps
//! [`RecoveryBoundary::tick`] once per turn and the only suspension points
//! are the retry and auto-recovery deadlines.

#![warn(missing_docs)]

pub mod boundary;
pub mod logger;

pub use boundary::RecoveryBoundary;
pub use logger::{ConsoleSink, ErrorLogger, MemorySink, RecoveryEvent};
pub use vigil_core::recovery::FailureCapture;
