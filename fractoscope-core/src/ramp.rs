use std::time::{Duration, Instant};

use tracing::debug;

/// One animation step of the ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampStep {
    /// Not running.
    Idle,
    /// Apply this value and schedule another frame.
    Continue(u32),
    /// Apply this value; the ramp is over.
    Finished(u32),
}

impl RampStep {
    pub fn max_iterations(self) -> Option<u32> {
        match self {
            Self::Idle => None,
            Self::Continue(n) | Self::Finished(n) => Some(n),
        }
    }
}

/// Fades detail in when the engine first comes up by ramping
/// `max_iterations` from 0 to its target.
///
/// Progress depends on wall-clock time, not on how many frames were drawn,
/// so the ramp ends on the exact target after `duration` whatever the frame
/// rate.
#[derive(Debug, Clone)]
pub struct StartupRamp {
    duration: Duration,
    target: u32,
    running: bool,
    start: Option<Instant>,
}

impl StartupRamp {
    pub const DEFAULT_DURATION: Duration = Duration::from_millis(500);

    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            target: 0,
            running: false,
            start: None,
        }
    }

    /// Arm the ramp. The start time is taken on the next [`tick`](Self::tick).
    pub fn start(&mut self, target: u32) {
        debug!(target, duration_ms = self.duration.as_millis() as u64, "Startup ramp armed");
        self.target = target;
        self.running = true;
        self.start = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    /// Advance to `now`.
    pub fn tick(&mut self, now: Instant) -> RampStep {
        if !self.running {
            return RampStep::Idle;
        }
        let start = *self.start.get_or_insert(now);
        let elapsed = now.saturating_duration_since(start);

        if elapsed < self.duration && self.target > 0 {
            let value = (elapsed.as_secs_f64() * self.target as f64
                / self.duration.as_secs_f64())
            .ceil() as u32;
            RampStep::Continue(value.min(self.target))
        } else {
            self.running = false;
            debug!(target = self.target, "Startup ramp finished");
            RampStep::Finished(self.target)
        }
    }
}

impl Default for StartupRamp {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(ramp: &mut StartupRamp, t0: Instant, step: Duration) -> Vec<RampStep> {
        let mut steps = Vec::new();
        let mut now = t0;
        loop {
            let s = ramp.tick(now);
            steps.push(s);
            if !matches!(s, RampStep::Continue(_)) || steps.len() > 100_000 {
                return steps;
            }
            now += step;
        }
    }

    #[test]
    fn idle_until_started() {
        let mut ramp = StartupRamp::default();
        assert_eq!(ramp.tick(Instant::now()), RampStep::Idle);
        assert!(!ramp.is_running());
    }

    #[test]
    fn first_tick_starts_at_zero() {
        let mut ramp = StartupRamp::default();
        ramp.start(100);
        assert_eq!(ramp.tick(Instant::now()), RampStep::Continue(0));
    }

    #[test]
    fn reference_values() {
        let mut ramp = StartupRamp::default();
        ramp.start(100);
        let t0 = Instant::now();
        ramp.tick(t0);
        assert_eq!(ramp.tick(t0 + Duration::from_millis(250)), RampStep::Continue(50));
        assert_eq!(ramp.tick(t0 + Duration::from_millis(251)), RampStep::Continue(51));
        assert_eq!(ramp.tick(t0 + Duration::from_millis(500)), RampStep::Finished(100));
        assert_eq!(ramp.tick(t0 + Duration::from_millis(600)), RampStep::Idle);
    }

    #[test]
    fn terminates_on_target_for_any_frame_rate() {
        let t0 = Instant::now();
        for target in [1, 7, 100, 250, 5000] {
            for step_ms in [1, 7, 16, 33, 120, 499, 900] {
                let mut ramp = StartupRamp::default();
                ramp.start(target);
                let steps = run(&mut ramp, t0, Duration::from_millis(step_ms));
                let values: Vec<u32> = steps.iter().filter_map(|s| s.max_iterations()).collect();

                assert!(
                    values.windows(2).all(|w| w[0] <= w[1]),
                    "non-monotonic for target {target}, step {step_ms}ms"
                );
                assert_eq!(steps.last(), Some(&RampStep::Finished(target)));
                // Frames after the first are at most one step late past the duration.
                let frames = steps.len() as u64;
                assert!((frames - 1) * step_ms < 500 + step_ms);
            }
        }
    }

    #[test]
    fn zero_target_finishes_immediately() {
        let mut ramp = StartupRamp::default();
        ramp.start(0);
        assert_eq!(ramp.tick(Instant::now()), RampStep::Finished(0));
    }

    #[test]
    fn restart_takes_a_fresh_start_time() {
        let mut ramp = StartupRamp::default();
        let t0 = Instant::now();
        ramp.start(10);
        ramp.tick(t0);
        ramp.tick(t0 + Duration::from_secs(1));

        ramp.start(10);
        let later = t0 + Duration::from_secs(5);
        assert_eq!(ramp.tick(later), RampStep::Continue(0));
    }
}
