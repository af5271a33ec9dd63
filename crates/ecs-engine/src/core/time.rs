/// Default cap on a single frame's delta time, in seconds.
pub const DEFAULT_MAX_FRAME_DT: f32 = 0.1;

/// Turns host frame timestamps (milliseconds, e.g. from
/// `requestAnimationFrame`) into per-frame delta times in seconds.
///
/// Deltas are clamped to `[0, max_dt]` so a backgrounded tab or a debugger
/// pause cannot produce one huge step.
pub struct FrameTimer {
    max_dt: f32,
    last_ms: Option<f64>,
}

impl FrameTimer {
    pub fn new(max_dt: f32) -> Self {
        Self {
            max_dt: if max_dt.is_finite() && max_dt > 0.0 { max_dt } else { DEFAULT_MAX_FRAME_DT },
            last_ms: None,
        }
    }

    /// Record a frame timestamp and return the clamped delta since the
    /// previous one. The first call returns 0.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        if dt.is_nan() {
            return 0.0;
        }
        dt.clamp(0.0, self.max_dt)
    }

    /// Forget the last timestamp, e.g. after the loop was paused.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    pub fn max_dt(&self) -> f32 {
        self.max_dt
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_DT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_zero() {
        let mut t = FrameTimer::default();
        assert_eq!(t.tick(1234.0), 0.0);
    }

    #[test]
    fn converts_milliseconds() {
        let mut t = FrameTimer::default();
        t.tick(1000.0);
        let dt = t.tick(1016.0);
        assert!((dt - 0.016).abs() < 1e-6, "dt was {}", dt);
    }

    #[test]
    fn clamps_long_pauses() {
        let mut t = FrameTimer::default();
        t.tick(0.0);
        assert_eq!(t.tick(5000.0), DEFAULT_MAX_FRAME_DT);
    }

    #[test]
    fn backwards_clock_gives_zero() {
        let mut t = FrameTimer::default();
        t.tick(500.0);
        assert_eq!(t.tick(400.0), 0.0);
    }

    #[test]
    fn reset_restarts_sequence() {
        let mut t = FrameTimer::new(0.5);
        t.tick(0.0);
        t.reset();
        assert_eq!(t.tick(300.0), 0.0);
        assert_eq!(t.max_dt(), 0.5);
    }
}
