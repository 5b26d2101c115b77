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

//! Rolling aggregation of per-frame render statistics.

use std::collections::VecDeque;
use vellum_core::renderer::RenderStats;

/// Aggregated view over the recorded frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSummary {
    /// Frames recorded since creation.
    pub frames: u64,
    /// Draw calls issued since creation.
    pub total_draw_calls: u64,
    /// Draws skipped since creation.
    pub total_skipped_draws: u64,
    /// Post-process events emitted since creation.
    pub total_tracker_events: u64,
    /// Programs compiled since creation.
    pub total_programs_compiled: u64,
    /// Mean CPU time over the window, in milliseconds.
    pub average_cpu_time_ms: f32,
    /// Worst CPU time over the window, in milliseconds.
    pub peak_cpu_time_ms: f32,
    /// Mean draw calls per frame over the window.
    pub average_draw_calls: f32,
}

/// Keeps lifetime totals plus a sliding window of recent frames.
#[derive(Debug, Clone)]
pub struct FrameStatsCollector {
    window: VecDeque<RenderStats>,
    capacity: usize,
    totals: FrameSummary,
}

impl FrameStatsCollector {
    /// Averages over the last `window` frames.
    pub fn new(window: usize) -> Self {
        let capacity = window.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            totals: FrameSummary::default(),
        }
    }

    /// Records one frame.
    pub fn record(&mut self, stats: &RenderStats) {
        self.totals.frames += 1;
        self.totals.total_draw_calls += u64::from(stats.draw_calls);
        self.totals.total_skipped_draws += u64::from(stats.skipped_draws);
        self.totals.total_tracker_events += u64::from(stats.tracker_events);
        self.totals.total_programs_compiled += u64::from(stats.programs_compiled);

        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(stats.clone());
    }

    /// Number of frames currently in the window.
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// The most recent frame, if any.
    pub fn latest(&self) -> Option<&RenderStats> {
        self.window.back()
    }

    /// Totals plus window averages.
    pub fn summary(&self) -> FrameSummary {
        let mut summary = self.totals.clone();
        if self.window.is_empty() {
            return summary;
        }
        let count = self.window.len() as f32;
        let cpu: f32 = self.window.iter().map(|s| s.cpu_time_ms).sum();
        let draws: u32 = self.window.iter().map(|s| s.draw_calls).sum();
        summary.average_cpu_time_ms = cpu / count;
        summary.average_draw_calls = draws as f32 / count;
        summary.peak_cpu_time_ms = self
            .window
            .iter()
            .map(|s| s.cpu_time_ms)
            .fold(0.0, f32::max);
        summary
    }

    /// One-line report for periodic logging.
    pub fn report(&self) -> String {
        let s = self.summary();
        format!(
            "{} frames | {:.3} ms avg, {:.3} ms peak | {:.1} draws/frame | {} skipped | {} tracker events",
            s.frames,
            s.average_cpu_time_ms,
            s.peak_cpu_time_ms,
            s.average_draw_calls,
            s.total_skipped_draws,
            s.total_tracker_events
        )
    }
}

impl Default for FrameStatsCollector {
    fn default() -> Self {
        Self::new(120)
    }
}
