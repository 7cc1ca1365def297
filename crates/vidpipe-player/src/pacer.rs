use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::slot::lock;

/// Throttles producer iterations to a target frame rate.
///
/// Each tick sleeps for whatever is left of the frame budget since the
/// previous tick. A late tick proceeds immediately; no frames are skipped to
/// catch up. The tick timestamp is taken after the wait.
#[derive(Debug, Clone, Default)]
pub struct Pacer {
    rate: f64,
    frame_duration: Option<Duration>,
    last_tick: Option<Instant>,
}

impl Pacer {
    /// A pacer targeting `fps`; `0` means unthrottled.
    pub fn new(fps: f64) -> Self {
        let mut pacer = Self::default();
        pacer.set_rate(fps);
        pacer
    }

    /// Change the target rate and restart timing.
    pub fn set_rate(&mut self, fps: f64) {
        self.last_tick = None;

        if fps == 0.0 {
            self.rate = 0.0;
            self.frame_duration = None;
            return;
        }
        if !fps.is_finite() || fps < 0.0 {
            warn!(fps, "ignoring invalid frame rate, pacing disabled");
            self.rate = 0.0;
            self.frame_duration = None;
            return;
        }

        match Duration::try_from_secs_f64(1.0 / fps) {
            Ok(budget) => {
                self.rate = fps;
                self.frame_duration = Some(budget);
            }
            Err(err) => {
                warn!(fps, error = %err, "frame budget out of range, pacing disabled");
                self.rate = 0.0;
                self.frame_duration = None;
            }
        }
    }

    /// Target frames per second, `0` when disabled.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn is_enabled(&self) -> bool {
        self.frame_duration.is_some()
    }

    pub fn frame_duration(&self) -> Option<Duration> {
        self.frame_duration
    }

    /// Seconds per frame at the current rate, `0` when disabled.
    pub fn seconds_per_frame(&self) -> f64 {
        self.frame_duration.map_or(0.0, |d| d.as_secs_f64())
    }

    /// How long a tick at `now` would have to wait.
    pub fn delay(&self, now: Instant) -> Option<Duration> {
        let budget = self.frame_duration?;
        let last = self.last_tick?;
        let elapsed = now.saturating_duration_since(last);
        budget.checked_sub(elapsed).filter(|d| !d.is_zero())
    }

    pub fn record(&mut self, now: Instant) {
        self.last_tick = Some(now);
    }

    /// Wait out the rest of the frame budget, then record the tick.
    pub fn tick(&mut self) -> Instant {
        if let Some(wait) = self.delay(Instant::now()) {
            std::thread::sleep(wait);
        }
        let now = Instant::now();
        self.record(now);
        now
    }
}

/// [`Pacer::tick`] for a pacer shared with another thread.
///
/// The lock is released while sleeping so the rate can change mid-wait.
pub fn paced_wait(pacer: &Mutex<Pacer>) -> Instant {
    let wait = lock(pacer).delay(Instant::now());
    if let Some(wait) = wait {
        std::thread::sleep(wait);
    }
    let now = Instant::now();
    lock(pacer).record(now);
    now
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_disables_pacing() {
        let mut pacer = Pacer::new(0.0);
        assert!(!pacer.is_enabled());
        assert_eq!(pacer.seconds_per_frame(), 0.0);

        let first = pacer.tick();
        let second = pacer.tick();
        assert!(second.duration_since(first) < Duration::from_millis(50));
    }

    #[test]
    fn ticks_are_at_least_one_budget_apart() {
        let mut pacer = Pacer::new(10.0);
        assert_eq!(pacer.frame_duration(), Some(Duration::from_millis(100)));

        let first = pacer.tick();
        let second = pacer.tick();
        let third = pacer.tick();

        assert!(second.duration_since(first) >= Duration::from_millis(100));
        assert!(third.duration_since(second) >= Duration::from_millis(100));
    }

    #[test]
    fn late_tick_does_not_wait() {
        let mut pacer = Pacer::new(100.0);
        let start = Instant::now();
        pacer.record(start);

        let later = start + Duration::from_millis(25);
        assert_eq!(pacer.delay(later), None);
        assert_eq!(
            pacer.delay(start + Duration::from_millis(4)),
            Some(Duration::from_millis(6))
        );
    }

    #[test]
    fn first_tick_after_rate_change_is_immediate() {
        let mut pacer = Pacer::new(1.0);
        pacer.record(Instant::now());
        assert!(pacer.delay(Instant::now()).is_some());

        pacer.set_rate(2.0);
        assert_eq!(pacer.delay(Instant::now()), None);
        assert!((pacer.seconds_per_frame() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn invalid_rates_disable_pacing() {
        for fps in [-5.0, f64::NAN, f64::INFINITY] {
            let pacer = Pacer::new(fps);
            assert!(!pacer.is_enabled(), "{fps} should disable pacing");
            assert_eq!(pacer.rate(), 0.0);
        }
    }

    #[test]
    fn unrepresentable_budget_disables_pacing() {
        let pacer = Pacer::new(1e-20);
        assert!(!pacer.is_enabled());
        assert_eq!(pacer.rate(), 0.0);

        let mut pacer = Pacer::new(10.0);
        pacer.set_rate(f64::MIN_POSITIVE);
        assert!(!pacer.is_enabled());
        assert_eq!(pacer.delay(Instant::now()), None);
    }

    #[test]
    fn shared_pacer_spaces_ticks() {
        let pacer = Mutex::new(Pacer::new(20.0));
        let first = paced_wait(&pacer);
        let second = paced_wait(&pacer);
        assert!(second.duration_since(first) >= Duration::from_millis(50));
    }
}
