//! Frame-delta countdowns owned by individual entities and subsystems

/// Seconds remaining until something happens. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Countdown(f32);

impl Countdown {
    pub const ZERO: Self = Self(0.0);

    pub fn secs(secs: f32) -> Self {
        Self(secs.max(0.0))
    }

    /// Decrease by `dt`, stopping at zero
    #[inline]
    pub fn tick(&mut self, dt: f32) {
        self.0 = (self.0 - dt).max(0.0);
    }

    /// Decrease by `dt` and report whether it just ran out (or was already out)
    #[inline]
    pub fn tick_done(&mut self, dt: f32) -> bool {
        self.tick(dt);
        self.is_done()
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.0 <= 0.0
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.0 > 0.0
    }

    #[inline]
    pub fn remaining(&self) -> f32 {
        self.0
    }

    pub fn set(&mut self, secs: f32) {
        self.0 = secs.max(0.0);
    }

    pub fn extend(&mut self, secs: f32) {
        self.0 = (self.0 + secs).max(0.0);
    }

    /// Whole seconds left, rounded up (HUD display)
    pub fn display_secs(&self) -> u32 {
        self.0.ceil() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_clamps_at_zero() {
        let mut t = Countdown::secs(0.5);
        assert!(!t.tick_done(0.2));
        assert!(t.tick_done(1.0));
        assert_eq!(t.remaining(), 0.0);
    }

    #[test]
    fn test_display_secs_rounds_up() {
        assert_eq!(Countdown::secs(4.1).display_secs(), 5);
        assert_eq!(Countdown::ZERO.display_secs(), 0);
    }
}
