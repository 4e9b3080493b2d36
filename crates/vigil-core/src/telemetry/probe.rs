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

//! Source of the sampled system metrics.

use std::fmt::Debug;

/// A probe the monitor reads frame rate and memory from.
///
/// Probing is distinct from recording: a probe answers "what is the state
/// right now", while recorded samples are discrete, event-based measurements.
/// Concrete implementations live in `vigil-telemetry`.
pub trait SystemProbe: Send + Sync + Debug + 'static {
    /// Current frame rate in frames per second.
    fn frame_rate(&self) -> f64;

    /// Current process memory usage in megabytes.
    fn memory_usage_mb(&self) -> f64;
}
