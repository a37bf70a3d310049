// Fixed-timestep driver for anything implementing `Lifecycle`

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::{debug, info};

use super::lifecycle::Lifecycle;

/// Length of one simulation update in seconds
pub const FIXED_TIMESTEP: f64 = 1.0 / 60.0;
const STEP: Duration = Duration::from_micros(16_667);

/// Updates run per frame at most; any further backlog is discarded
pub const MAX_PHYSICS_STEPS: u32 = 5;

const FRAME_RATE_SAMPLES: usize = 60;

/// Rolling average over the most recent frame lengths
#[derive(Debug, Default)]
struct FrameRate {
    samples: VecDeque<Duration>,
    total: Duration,
}

impl FrameRate {
    fn record(&mut self, frame_time: Duration) {
        self.samples.push_back(frame_time);
        self.total += frame_time;
        if self.samples.len() > FRAME_RATE_SAMPLES {
            if let Some(oldest) = self.samples.pop_front() {
                self.total -= oldest;
            }
        }
    }

    fn per_second(&self) -> f64 {
        let seconds = self.total.as_secs_f64();
        if seconds > 0.0 {
            self.samples.len() as f64 / seconds
        } else {
            0.0
        }
    }
}

/// Turns variable frame times into a whole number of fixed updates
///
/// Frame time is banked in a backlog and spent one [`FIXED_TIMESTEP`] at a
/// time. Whatever is left over is exposed as [`GameLoop::alpha`] for
/// interpolated rendering.
#[derive(Debug)]
pub struct GameLoop {
    backlog: Duration,
    last_tick: Instant,
    started: Instant,
    paused: bool,
    frame_rate: FrameRate,
    frames: u64,
    updates: u64,
    last_frame: Duration,
}

impl GameLoop {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            backlog: Duration::ZERO,
            last_tick: now,
            started: now,
            paused: false,
            frame_rate: FrameRate::default(),
            frames: 0,
            updates: 0,
            last_frame: Duration::ZERO,
        }
    }

    /// Start a frame timed by the wall clock; returns the updates due
    pub fn begin_frame(&mut self) -> u32 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_tick);
        self.last_tick = now;
        self.advance(frame_time)
    }

    /// Start a frame of the given length; returns the updates due
    pub fn advance(&mut self, frame_time: Duration) -> u32 {
        self.frames += 1;
        self.last_frame = frame_time;
        self.frame_rate.record(frame_time);

        if self.paused {
            return 0;
        }

        self.backlog += frame_time;
        let due = self.backlog.as_nanos() / STEP.as_nanos();
        let steps = due.min(u128::from(MAX_PHYSICS_STEPS)) as u32;

        if due > u128::from(steps) {
            debug!("Discarding {:?} of backlog after {} updates", self.backlog, steps);
            self.backlog = Duration::ZERO;
        } else {
            self.backlog -= STEP * steps;
        }

        self.updates += u64::from(steps);
        steps
    }

    /// Wall-clock frame: the due updates, then one render
    pub fn run_frame<L: Lifecycle>(&mut self, target: &mut L) -> u32 {
        let steps = self.begin_frame();
        Self::drive(target, steps)
    }

    /// Frame of a fixed length: the due updates, then one render
    pub fn run_frame_for<L: Lifecycle>(&mut self, frame_time: Duration, target: &mut L) -> u32 {
        let steps = self.advance(frame_time);
        Self::drive(target, steps)
    }

    fn drive<L: Lifecycle>(target: &mut L, steps: u32) -> u32 {
        for _ in 0..steps {
            target.update(FIXED_TIMESTEP);
        }
        target.render();
        steps
    }

    pub fn fixed_timestep(&self) -> f64 {
        FIXED_TIMESTEP
    }

    /// Length of the last frame in seconds
    pub fn render_delta_time(&self) -> f64 {
        self.last_frame.as_secs_f64()
    }

    /// Fraction of a step waiting in the backlog, in `[0, 1)`
    pub fn alpha(&self) -> f64 {
        self.backlog.as_secs_f64() / STEP.as_secs_f64()
    }

    /// Frames per second over the last 60 frames
    pub fn fps(&self) -> f64 {
        self.frame_rate.per_second()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn update_count(&self) -> u64 {
        self.updates
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.set_paused(true);
    }

    /// Resume with an empty backlog so no burst of updates follows
    pub fn resume(&mut self) {
        self.set_paused(false);
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.paused);
    }

    fn set_paused(&mut self, paused: bool) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        if paused {
            info!("Simulation paused at frame {}", self.frames);
        } else {
            self.backlog = Duration::ZERO;
            info!("Simulation resumed at frame {}", self.frames);
        }
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct Recorder {
        updates: Vec<f64>,
        renders: u32,
    }

    impl Lifecycle for Recorder {
        fn update(&mut self, dt: f64) {
            self.updates.push(dt);
        }

        fn render(&mut self) {
            self.renders += 1;
        }
    }

    #[test]
    fn test_starts_idle() {
        let game_loop = GameLoop::new();
        assert_eq!(game_loop.frame_count(), 0);
        assert_eq!(game_loop.update_count(), 0);
        assert_eq!(game_loop.alpha(), 0.0);
        assert_eq!(game_loop.fps(), 0.0);
        assert!(!game_loop.is_paused());
        assert_relative_eq!(game_loop.fixed_timestep(), 1.0 / 60.0);
    }

    #[test]
    fn test_short_frames_bank_time() {
        let mut game_loop = GameLoop::new();
        assert_eq!(game_loop.advance(Duration::from_millis(10)), 0);
        assert!(game_loop.alpha() > 0.5 && game_loop.alpha() < 1.0);

        // 20ms banked: one update, a little left over
        assert_eq!(game_loop.advance(Duration::from_millis(10)), 1);
        assert_eq!(game_loop.update_count(), 1);
        assert!(game_loop.alpha() < 0.25);
    }

    #[test]
    fn test_long_frame_is_capped_and_backlog_dropped() {
        let mut game_loop = GameLoop::new();
        // 300ms is worth 18 updates
        assert_eq!(game_loop.advance(Duration::from_millis(300)), MAX_PHYSICS_STEPS);
        assert_eq!(game_loop.alpha(), 0.0);
        assert_eq!(game_loop.advance(Duration::ZERO), 0);
        assert_eq!(game_loop.update_count(), u64::from(MAX_PHYSICS_STEPS));
    }

    #[test]
    fn test_exactly_at_cap_keeps_remainder() {
        let mut game_loop = GameLoop::new();
        let frame = STEP * MAX_PHYSICS_STEPS + Duration::from_millis(5);
        assert_eq!(game_loop.advance(frame), MAX_PHYSICS_STEPS);
        assert!(game_loop.alpha() > 0.25);
    }

    #[test]
    fn test_pause_stops_updates_and_resume_clears_backlog() {
        let mut game_loop = GameLoop::new();
        game_loop.advance(Duration::from_millis(10));

        game_loop.toggle_pause();
        assert!(game_loop.is_paused());
        assert_eq!(game_loop.advance(Duration::from_millis(50)), 0);
        assert_eq!(game_loop.frame_count(), 2);

        game_loop.toggle_pause();
        assert!(!game_loop.is_paused());
        assert_eq!(game_loop.alpha(), 0.0);

        // Pausing twice is harmless
        game_loop.pause();
        game_loop.pause();
        assert!(game_loop.is_paused());
    }

    #[test]
    fn test_frame_rate_window() {
        let mut game_loop = GameLoop::new();
        for _ in 0..10 {
            game_loop.advance(Duration::from_millis(20));
        }
        assert_relative_eq!(game_loop.render_delta_time(), 0.02);
        assert_relative_eq!(game_loop.fps(), 50.0, epsilon = 1e-9);

        // Old samples fall out of the window
        for _ in 0..FRAME_RATE_SAMPLES {
            game_loop.advance(Duration::from_millis(10));
        }
        assert_relative_eq!(game_loop.fps(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_run_frame_for_drives_lifecycle() {
        let mut game_loop = GameLoop::new();
        let mut recorder = Recorder::default();

        assert_eq!(game_loop.run_frame_for(STEP * 2, &mut recorder), 2);
        assert_eq!(recorder.updates, vec![FIXED_TIMESTEP, FIXED_TIMESTEP]);
        assert_eq!(recorder.renders, 1);

        // Renders happen even when no update is due
        assert_eq!(game_loop.run_frame_for(Duration::ZERO, &mut recorder), 0);
        assert_eq!(recorder.renders, 2);
    }

    #[test]
    fn test_run_frame_uses_wall_clock() {
        let mut game_loop = GameLoop::new();
        let mut recorder = Recorder::default();
        let steps = game_loop.run_frame(&mut recorder);
        assert!(steps <= MAX_PHYSICS_STEPS);
        assert_eq!(recorder.renders, 1);
        assert_eq!(game_loop.frame_count(), 1);
    }
}
