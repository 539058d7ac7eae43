//! Wall-clock frame callbacks to bounded simulation deltas

use crate::tuning::Tuning;

/// Converts `requestAnimationFrame` timestamps (milliseconds) into dt seconds.
#[derive(Debug, Clone)]
pub struct SimClock {
    last_ms: Option<f64>,
    max_dt: f32,
}

impl SimClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_ms: None,
            max_dt,
        }
    }

    /// Seconds since the previous frame, clamped to `[0, max_dt]`.
    ///
    /// The first frame after construction or `reset` yields 0.
    pub fn tick(&mut self, timestamp_ms: f64) -> f32 {
        let dt = match self.last_ms {
            None => 0.0,
            Some(last) => ((timestamp_ms - last) / 1000.0) as f32,
        };
        self.last_ms = Some(timestamp_ms);
        if !dt.is_finite() {
            return 0.0;
        }
        dt.clamp(0.0, self.max_dt)
    }

    /// Forget the previous timestamp (after a pause or tab switch)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(Tuning::default().max_frame_dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_frame_has_no_delta() {
        let mut clock = SimClock::new(0.1);
        assert_eq!(clock.tick(5000.0), 0.0);
        assert!((clock.tick(5016.0) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_backgrounded_tab_is_clamped() {
        let mut clock = SimClock::new(0.1);
        clock.tick(0.0);
        assert_eq!(clock.tick(60_000.0), 0.1);
    }

    #[test]
    fn test_reset_skips_gap() {
        let mut clock = SimClock::new(0.1);
        clock.tick(0.0);
        clock.reset();
        assert_eq!(clock.tick(30.0), 0.0);
    }

    #[test]
    fn test_default_clock_advances() {
        let mut clock = SimClock::default();
        clock.tick(0.0);
        assert!((clock.tick(16.0) - 0.016).abs() < 1e-6);
        assert_eq!(clock.tick(10_000.0), Tuning::default().max_frame_dt);
    }

    proptest! {
        #[test]
        fn dt_always_bounded(stamps in proptest::collection::vec(-1.0e7f64..1.0e7, 1..50)) {
            let mut clock = SimClock::new(0.1);
            for t in stamps {
                let dt = clock.tick(t);
                prop_assert!((0.0..=0.1).contains(&dt));
            }
        }
    }
}
