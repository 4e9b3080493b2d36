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

//! System probes backing the monitor's periodic sampler.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use sysinfo::{get_current_pid, Pid, ProcessesToUpdate, System};
use vigil_core::telemetry::SystemProbe;

/// Window over which the frame rate is counted.
const FRAME_WINDOW: Duration = Duration::from_secs(1);

/// Counts host-reported frame marks over a sliding one-second window.
///
/// The host marks every completed frame; the rate is simply the number of
/// marks inside the window. Shared with [`SysinfoProbe`] through an `Arc`.
#[derive(Debug, Default)]
pub struct FrameClock {
    marks: Mutex<VecDeque<Instant>>,
}

impl FrameClock {
    /// Creates an empty clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one completed frame at an explicit instant.
    pub fn mark_frame_at(&self, now: Instant) {
        let mut marks = self.marks.lock().unwrap_or_else(PoisonError::into_inner);
        marks.push_back(now);
        while let Some(&oldest) = marks.front() {
            if now.duration_since(oldest) > FRAME_WINDOW {
                marks.pop_front();
            } else {
                break;
            }
        }
    }

    /// Records one completed frame with the real clock.
    pub fn mark_frame(&self) {
        self.mark_frame_at(Instant::now());
    }

    /// Frames observed inside the window ending at `now`.
    pub fn rate_at(&self, now: Instant) -> f64 {
        let marks = self.marks.lock().unwrap_or_else(PoisonError::into_inner);
        marks
            .iter()
            .filter(|&&mark| now.saturating_duration_since(mark) <= FRAME_WINDOW)
            .count() as f64
    }

    /// Frame rate with the real clock.
    pub fn rate(&self) -> f64 {
        self.rate_at(Instant::now())
    }
}

/// Probe over the `sysinfo` crate for memory plus a [`FrameClock`] for fps.
pub struct SysinfoProbe {
    clock: Arc<FrameClock>,
    system: Mutex<System>,
    pid: Option<Pid>,
}

impl SysinfoProbe {
    /// Creates a probe bound to the current process.
    pub fn new(clock: Arc<FrameClock>) -> Self {
        let mut system = System::new_all();
        system.refresh_all();
        Self {
            clock,
            system: Mutex::new(system),
            pid: get_current_pid().ok(),
        }
    }
}

impl std::fmt::Debug for SysinfoProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SysinfoProbe")
            .field("pid", &self.pid)
            .finish_non_exhaustive()
    }
}

impl SystemProbe for SysinfoProbe {
    fn frame_rate(&self) -> f64 {
        self.clock.rate()
    }

    fn memory_usage_mb(&self) -> f64 {
        let Some(pid) = self.pid else {
            return 0.0;
        };
        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        match system.process(pid) {
            Some(process) => process.memory() as f64 / (1024.0 * 1024.0),
            None => 0.0,
        }
    }
}

/// A probe returning adjustable fixed values. Used by tests and demos.
#[derive(Debug)]
pub struct FixedProbe {
    frame_rate: Mutex<f64>,
    memory_mb: Mutex<f64>,
}

impl FixedProbe {
    /// Creates a probe that reports the given values until adjusted.
    pub fn new(frame_rate: f64, memory_mb: f64) -> Self {
        Self {
            frame_rate: Mutex::new(frame_rate),
            memory_mb: Mutex::new(memory_mb),
        }
    }

    /// Changes the reported frame rate.
    pub fn set_frame_rate(&self, frame_rate: f64) {
        *self
            .frame_rate
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = frame_rate;
    }

    /// Changes the reported memory usage.
    pub fn set_memory_mb(&self, memory_mb: f64) {
        *self
            .memory_mb
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = memory_mb;
    }
}

impl SystemProbe for FixedProbe {
    fn frame_rate(&self) -> f64 {
        *self
            .frame_rate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn memory_usage_mb(&self) -> f64 {
        *self
            .memory_mb
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_clock_counts_marks_inside_the_window() {
        let clock = FrameClock::new();
        let t0 = Instant::now();
        for i in 0..60 {
            clock.mark_frame_at(t0 + Duration::from_millis(i * 16));
        }
        let rate = clock.rate_at(t0 + Duration::from_millis(59 * 16));
        assert_eq!(rate, 60.0);
    }

    #[test]
    fn frame_clock_forgets_stale_marks() {
        let clock = FrameClock::new();
        let t0 = Instant::now();
        clock.mark_frame_at(t0);
        clock.mark_frame_at(t0 + Duration::from_millis(10));
        // Both marks fall outside the window two seconds later.
        let later = t0 + Duration::from_secs(2);
        clock.mark_frame_at(later);
        assert_eq!(clock.rate_at(later), 1.0);
    }

    #[test]
    fn fixed_probe_reports_adjusted_values() {
        let probe = FixedProbe::new(60.0, 42.0);
        assert_eq!(probe.frame_rate(), 60.0);
        assert_eq!(probe.memory_usage_mb(), 42.0);
        probe.set_frame_rate(24.0);
        probe.set_memory_mb(128.0);
        assert_eq!(probe.frame_rate(), 24.0);
        assert_eq!(probe.memory_usage_mb(), 128.0);
    }

    #[test]
    fn sysinfo_probe_reads_its_own_process() {
        let probe = SysinfoProbe::new(Arc::new(FrameClock::new()));
        assert!(probe.memory_usage_mb() > 0.0);
    }
}
