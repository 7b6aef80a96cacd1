//! Per-frame clock sampling.

use std::time::{Duration, Instant};

/// Measures the elapsed time between render-loop iterations and keeps a
/// coarse FPS estimate for the overlay.
///
/// Single-caller by design: the render loop samples it exactly once per
/// iteration and everything else reads the cached values.
pub struct FrameTimer {
    last: Instant,
    delta: Duration,
    fps: f64,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            delta: Duration::ZERO,
            fps: 0.0,
        }
    }

    /// Reads the monotonic clock, updates the stored sample and returns the
    /// elapsed time since the previous call (since construction on the
    /// first call). Never blocks.
    pub fn sample(&mut self) -> Duration {
        let now = Instant::now();
        self.delta = now.duration_since(self.last);
        self.last = now;

        // keep the previous estimate across zero-length deltas
        if let Some(fps) = fps_from_delta(self.delta) {
            self.fps = fps;
        }
        self.delta
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn delta_ms(&self) -> f64 {
        self.delta.as_secs_f64() * 1000.0
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// FPS is derived from the delta expressed in seconds, so it stays correct
/// whatever unit the delta is displayed in. Returns `None` for a zero delta
/// instead of dividing by it.
fn fps_from_delta(delta: Duration) -> Option<f64> {
    if delta.is_zero() {
        None
    } else {
        Some(1.0 / delta.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_is_non_negative() {
        let mut timer = FrameTimer::new();
        let delta = timer.sample();
        assert!(delta >= Duration::ZERO);
        assert_eq!(delta, timer.delta());
    }

    #[test]
    fn zero_delta_does_not_recompute_fps() {
        assert_eq!(fps_from_delta(Duration::ZERO), None);
    }

    #[test]
    fn fps_matches_delta() {
        let fps = fps_from_delta(Duration::from_millis(16)).unwrap();
        assert!((fps - 62.5).abs() < 1e-9);

        let fps = fps_from_delta(Duration::from_secs(1)).unwrap();
        assert!((fps - 1.0).abs() < 1e-9);
    }

    #[test]
    fn sample_tracks_elapsed_time() {
        let mut timer = FrameTimer::new();
        timer.sample();
        std::thread::sleep(Duration::from_millis(2));
        let delta = timer.sample();
        assert!(delta >= Duration::from_millis(2));
        assert!(timer.fps() > 0.0);
    }
}
