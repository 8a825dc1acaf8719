use crate::timer::Timer;
use std::time::Duration;

/// Refresh rate assumed when the monitor does not report one.
pub const FALLBACK_REFRESH_HZ: f64 = 60.0;

/// Frames within this of the period are not slept on.
const SLACK: Duration = Duration::from_millis(1);

/// Holds every frame to at least one refresh period, which keeps
/// frame-counted phases at a fixed wall time on unsynced surfaces.
#[derive(Debug, Clone)]
pub struct FramePacer {
    period: Duration,
    frame_start: Option<u64>,
}

impl FramePacer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            frame_start: None,
        }
    }

    pub fn from_refresh_rate(hz: Option<f64>) -> Self {
        let hz = hz
            .filter(|hz| hz.is_finite() && *hz > 0.0)
            .unwrap_or(FALLBACK_REFRESH_HZ);
        Self::new(Duration::from_secs_f64(1.0 / hz))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn begin<T: Timer>(&mut self, timer: &T) {
        self.frame_start = Some(timer.now());
    }

    /// Sleeps out the rest of the period and returns the whole frame time.
    /// Without a matching `begin` this is a no-op.
    pub fn finish<T: Timer>(&mut self, timer: &T) -> Duration {
        let Some(start) = self.frame_start.take() else {
            return Duration::ZERO;
        };
        let remaining = self.period.saturating_sub(timer.elapsed(start));
        if remaining > SLACK {
            timer.sleep(remaining);
        }
        timer.elapsed(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualTimer;

    #[test]
    fn short_frames_are_stretched_to_the_period() {
        let timer = ManualTimer::new();
        let mut pacer = FramePacer::new(Duration::from_millis(16));
        pacer.begin(&timer);
        timer.advance_ms(4);
        assert_eq!(pacer.finish(&timer), Duration::from_millis(16));
        assert_eq!(timer.now(), 16_000_000);
    }

    #[test]
    fn long_or_nearly_full_frames_do_not_sleep() {
        let timer = ManualTimer::new();
        let mut pacer = FramePacer::new(Duration::from_millis(16));

        pacer.begin(&timer);
        timer.advance_ms(20);
        assert_eq!(pacer.finish(&timer), Duration::from_millis(20));

        pacer.begin(&timer);
        timer.advance(Duration::from_micros(15_500));
        assert_eq!(pacer.finish(&timer), Duration::from_micros(15_500));
    }

    #[test]
    fn finish_without_begin_does_nothing() {
        let timer = ManualTimer::new();
        let mut pacer = FramePacer::new(Duration::from_millis(16));
        assert_eq!(pacer.finish(&timer), Duration::ZERO);
        assert_eq!(timer.now(), 0);
    }

    #[test]
    fn period_follows_the_refresh_rate() {
        let pacer = FramePacer::from_refresh_rate(Some(120.0));
        assert_eq!(pacer.period(), Duration::from_secs_f64(1.0 / 120.0));
        let pacer = FramePacer::from_refresh_rate(None);
        assert_eq!(pacer.period(), Duration::from_secs_f64(1.0 / 60.0));
        let pacer = FramePacer::from_refresh_rate(Some(0.0));
        assert_eq!(pacer.period(), Duration::from_secs_f64(1.0 / 60.0));
    }
}
