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

//! # Vigil Telemetry
//!
//! Runtime performance telemetry: a process-wide [`PerformanceMonitor`] that
//! samples frame rate, memory, and operation durations into a capped rolling
//! history and fans out threshold alerts, plus per-usage-site
//! [`ScopeAdapter`]s that bind one region's render activity to the monitor.
//!
//! The monitor is an explicitly constructed handle owned by the composition
//! root and injected where needed, not a hidden global: clones share state,
//! so initialization order stays visible and testable.

#![warn(missing_docs)]

pub mod adapter;
pub mod monitor;
pub mod probe;

pub use adapter::{MeasureToken, ScopeAdapter, ScopeOptions};
pub use monitor::{AlertSubscription, PerformanceMonitor, SYSTEM_ORIGIN_LABEL};
pub use probe::{FixedProbe, FrameClock, SysinfoProbe};
