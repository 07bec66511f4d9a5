use std::time::{Duration, Instant};

/// Loop health over one logging window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct LoopMetricsSnapshot {
    pub(crate) fps: f32,
    pub(crate) frame_time_ms: f32,
    pub(crate) max_frame_time_ms: f32,
    /// Frames in the window whose wall-clock delta hit the clamp.
    pub(crate) clamped_frames: u32,
}

/// Per-frame tally that closes a window every `window` of wall time.
#[derive(Debug)]
pub(crate) struct LoopMetrics {
    window: Duration,
    opened_at: Instant,
    frames: u32,
    clamped_frames: u32,
    total: Duration,
    worst: Duration,
}

impl LoopMetrics {
    pub(crate) fn new(window: Duration, now: Instant) -> Self {
        Self {
            window,
            opened_at: now,
            frames: 0,
            clamped_frames: 0,
            total: Duration::ZERO,
            worst: Duration::ZERO,
        }
    }

    /// Counts a presented frame. Returns the summary of the window when the
    /// frame at `now` closes it, and opens the next one.
    pub(crate) fn record_frame(
        &mut self,
        now: Instant,
        frame_dt: Duration,
        clamped: bool,
    ) -> Option<LoopMetricsSnapshot> {
        self.frames = self.frames.saturating_add(1);
        self.total = self.total.saturating_add(frame_dt);
        self.worst = self.worst.max(frame_dt);
        self.clamped_frames += u32::from(clamped);

        let elapsed = now.saturating_duration_since(self.opened_at);
        if elapsed < self.window {
            return None;
        }

        let frames = self.frames as f32;
        let snapshot = LoopMetricsSnapshot {
            fps: frames / elapsed.as_secs_f32().max(f32::EPSILON),
            frame_time_ms: self.total.as_secs_f32() * 1000.0 / frames,
            max_frame_time_ms: self.worst.as_secs_f32() * 1000.0,
            clamped_frames: self.clamped_frames,
        };
        *self = Self::new(self.window, now);
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_summary_averages_recorded_frames() {
        let start = Instant::now();
        let mut metrics = LoopMetrics::new(Duration::from_secs(1), start);

        let frames = [(16, 16, false), (32, 16, false), (282, 250, true)];
        for (offset_ms, frame_ms, clamped) in frames {
            let at = start + Duration::from_millis(offset_ms);
            let summary = metrics.record_frame(at, Duration::from_millis(frame_ms), clamped);
            assert!(summary.is_none());
        }
        let end = start + Duration::from_secs(1);
        let snapshot = metrics
            .record_frame(end, Duration::from_millis(16), false)
            .expect("window should close");

        assert!((snapshot.fps - 4.0).abs() < 0.05);
        assert!((snapshot.frame_time_ms - 74.5).abs() < 0.001);
        assert!((snapshot.max_frame_time_ms - 250.0).abs() < 0.001);
        assert_eq!(snapshot.clamped_frames, 1);
    }

    #[test]
    fn closing_a_window_starts_the_next_from_scratch() {
        let start = Instant::now();
        let mut metrics = LoopMetrics::new(Duration::from_secs(1), start);
        let first_close = start + Duration::from_secs(1);
        metrics
            .record_frame(first_close, Duration::from_millis(300), true)
            .expect("first window");

        let second_close = start + Duration::from_secs(2);
        let second = metrics
            .record_frame(second_close, Duration::from_millis(10), false)
            .expect("second window");
        assert_eq!(second.clamped_frames, 0);
        assert!((second.max_frame_time_ms - 10.0).abs() < 0.001);
        assert!((second.fps - 1.0).abs() < 0.001);
    }
}
