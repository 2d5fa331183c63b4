//! Session lifecycle
//!
//! [`SessionController`] owns one simulation plus everything bound to its
//! transitions: the frame clock, the ambient-loop handle, the leaderboard and
//! the persister. The host drives it with timestamps (`frame`) and user
//! requests (`start`, `pause`, `resume`, `stop`); tests drive it the same way
//! with synthetic timestamps.
//!
//! ```text
//! Idle --start--> Playing --pause--> Paused --resume--> Playing
//!                    |                  |
//!                    +--collision/stop--+--> Ended --start--> Playing
//! ```

use crate::audio::{AudioBackend, AudioChannel, SoundCue};
use crate::error::{PersistError, SessionError};
use crate::highscores::HighScores;
use crate::persistence::SessionPersister;
use crate::renderer::{RenderSurface, SceneView, render};
use crate::settings::{Settings, VolumeLevel};
use crate::sim::{Clock, PlayField, ProceduralSpawner, SessionSummary, Simulation, tick};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Playing,
    Paused,
    Ended,
}

/// Result of offering the controller one animation frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Not playing, or nothing to draw on; no state changed
    Skipped,
    Advanced,
    /// The session ended on this frame
    Ended(SessionSummary),
}

pub struct SessionController<B: AudioBackend, P: SessionPersister> {
    phase: SessionPhase,
    clock: Clock,
    sim: Simulation,
    settings: Settings,
    audio: AudioChannel<B>,
    persister: P,
    highscores: HighScores,
    base_seed: u64,
    sessions_started: u64,
    spawn_obstacles: bool,
    last_summary: Option<SessionSummary>,
    persist_error: Option<PersistError>,
}

impl<B: AudioBackend, P: SessionPersister> SessionController<B, P> {
    pub fn new(settings: Settings, field: PlayField, backend: B, persister: P, seed: u64) -> Self {
        let audio = AudioChannel::new(backend, settings.volume);
        Self {
            phase: SessionPhase::Idle,
            clock: Clock::new(),
            sim: Simulation::new(field, ProceduralSpawner::disabled()),
            settings,
            audio,
            persister,
            highscores: HighScores::load(),
            base_seed: seed,
            sessions_started: 0,
            spawn_obstacles: true,
            last_summary: None,
            persist_error: None,
        }
    }

    /// Replace the leaderboard loaded at construction
    pub fn with_highscores(mut self, highscores: HighScores) -> Self {
        self.highscores = highscores;
        self
    }

    /// Sessions get clouds only (practice mode, scripted runs)
    pub fn without_obstacles(mut self) -> Self {
        self.spawn_obstacles = false;
        self
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether the host should keep requesting frames
    pub fn wants_frames(&self) -> bool {
        self.phase == SessionPhase::Playing
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Direct access for hosts and tests that script the scene
    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn audio(&self) -> &AudioChannel<B> {
        &self.audio
    }

    pub fn persister(&self) -> &P {
        &self.persister
    }

    pub fn persister_mut(&mut self) -> &mut P {
        &mut self.persister
    }

    pub fn highscores(&self) -> &HighScores {
        &self.highscores
    }

    /// Summary of the most recently finished session
    pub fn last_summary(&self) -> Option<SessionSummary> {
        self.last_summary
    }

    /// Persistence failure for a one-off notice, either from the last
    /// session end or reported later by a background write
    pub fn take_persist_error(&mut self) -> Option<PersistError> {
        self.persist_error
            .take()
            .or_else(|| self.persister.take_deferred_error())
    }

    /// Idle/Ended -> Playing. Everything from the previous session is dropped.
    pub fn start(&mut self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Idle | SessionPhase::Ended => {}
            from => {
                return Err(SessionError::InvalidTransition {
                    from,
                    action: "start",
                });
            }
        }

        let seed = self.base_seed.wrapping_add(self.sessions_started);
        self.sessions_started += 1;
        let mut spawner = ProceduralSpawner::new(seed);
        if !self.spawn_obstacles {
            spawner = spawner.without_obstacles();
        }
        self.sim.reset(spawner);
        self.clock.reset();
        self.persist_error = None;

        self.phase = SessionPhase::Playing;
        self.audio.start_ambient();
        self.audio.cue(SoundCue::Click);
        log::info!(
            "Session {} started (seed {}, {} breaths/min)",
            self.sessions_started,
            seed,
            self.settings.breathing_rate_per_minute
        );
        Ok(())
    }

    /// Playing -> Paused. Entities and player freeze where they are.
    pub fn pause(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Playing {
            return Err(SessionError::InvalidTransition {
                from: self.phase,
                action: "pause",
            });
        }
        self.phase = SessionPhase::Paused;
        self.audio.stop_ambient();
        self.audio.cue(SoundCue::Click);
        log::info!("Session paused at distance {:.1}", self.sim.score.distance());
        Ok(())
    }

    /// Paused -> Playing. Time spent paused is not simulated.
    pub fn resume(&mut self, now: f64) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Paused {
            return Err(SessionError::InvalidTransition {
                from: self.phase,
                action: "resume",
            });
        }
        self.clock.rebase(now);
        self.phase = SessionPhase::Playing;
        self.audio.start_ambient();
        self.audio.cue(SoundCue::Click);
        log::info!("Session resumed");
        Ok(())
    }

    /// User-initiated end from Playing or Paused
    pub fn stop(&mut self) -> Result<SessionSummary, SessionError> {
        match self.phase {
            SessionPhase::Playing | SessionPhase::Paused => Ok(self.finish()),
            from => Err(SessionError::InvalidTransition {
                from,
                action: "stop",
            }),
        }
    }

    /// Advance one frame at host `timestamp` (ms) and draw it.
    ///
    /// Frames that arrive while not playing, or before a surface exists, are
    /// ignored entirely.
    pub fn frame(
        &mut self,
        timestamp: f64,
        surface: Option<&mut dyn RenderSurface>,
    ) -> FrameOutcome {
        if self.phase != SessionPhase::Playing {
            return FrameOutcome::Skipped;
        }
        let Some(surface) = surface else {
            return FrameOutcome::Skipped;
        };

        let delta_ms = self.clock.tick(timestamp);
        let outcome = tick(
            &mut self.sim,
            delta_ms,
            self.settings.breathing_rate_per_minute,
        );

        surface.present(&render(&SceneView::of(&self.sim)));

        match outcome.collision {
            Some(kind) => {
                log::debug!("Collision: {:?}", kind);
                FrameOutcome::Ended(self.finish())
            }
            None => FrameOutcome::Advanced,
        }
    }

    /// Takes effect on the next frame without moving the balloon
    pub fn set_breathing_rate(&mut self, rate: u32) {
        self.settings.set_breathing_rate(rate);
    }

    pub fn set_volume(&mut self, volume: VolumeLevel) {
        self.settings.volume = volume;
        self.audio.set_volume(volume);
    }

    /// New surface size; nothing in flight is reset
    pub fn resize(&mut self, width: f32, height: f32) {
        self.sim.resize(width, height);
    }

    fn finish(&mut self) -> SessionSummary {
        self.phase = SessionPhase::Ended;
        self.audio.stop_ambient();

        let summary = self.sim.summary();
        if let Some(rank) = self.highscores.add_session(&summary, wall_clock_ms()) {
            log::info!("New high score, rank #{}", rank);
            self.highscores.save();
            self.audio.cue(SoundCue::Success);
        }

        if let Err(e) = self.persister.persist(summary) {
            log::warn!("Failed to save session: {}", e);
            self.persist_error = Some(e);
        }

        log::info!(
            "Session ended: score {}, distance {:.1}, {} obstacles avoided, {}s",
            summary.score,
            summary.distance_traveled,
            summary.obstacles_avoided,
            summary.time_elapsed_seconds
        );
        self.last_summary = Some(summary);
        summary
    }
}

#[cfg(target_arch = "wasm32")]
fn wall_clock_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn wall_clock_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::tests::{AudioEvent, RecordingAudio};
    use crate::persistence::{FailureSlot, MemoryPersister};
    use crate::renderer::HeadlessSurface;
    use crate::sim::{BreathPhase, Obstacle};
    use glam::Vec2;

    type TestController = SessionController<RecordingAudio, MemoryPersister>;

    fn controller(seed: u64) -> TestController {
        SessionController::new(
            Settings::default(),
            PlayField::default(),
            RecordingAudio::default(),
            MemoryPersister::new(Some("tester".into())),
            seed,
        )
        .with_highscores(HighScores::new())
    }

    /// Feed frames at `start, start + step, ...` until one ends the session
    fn run(
        c: &mut TestController,
        surface: &mut HeadlessSurface,
        start: f64,
        step: f64,
        frames: usize,
    ) -> Option<SessionSummary> {
        for i in 0..frames {
            let timestamp = start + step * i as f64;
            if let FrameOutcome::Ended(summary) = c.frame(timestamp, Some(&mut *surface)) {
                return Some(summary);
            }
        }
        None
    }

    fn wall(field: PlayField) -> Obstacle {
        Obstacle {
            pos: Vec2::new(0.0, 0.0),
            size: Vec2::new(200.0, field.ground_y()),
            speed: 2.0,
            passed: false,
        }
    }

    #[test]
    fn test_one_breathing_cycle_returns_to_start() {
        let mut c = controller(1).without_obstacles();
        let mut surface = HeadlessSurface::new();
        c.start().unwrap();

        // 1001 frames, 10ms apart: the first sets the baseline, 10000ms follow
        assert_eq!(run(&mut c, &mut surface, 0.0, 10.0, 1001), None);

        let breathing = &c.simulation().breathing;
        assert!((breathing.height_percent() - 50.0).abs() < 0.05);
        assert_eq!(breathing.cycles_completed(), 1);
        assert_eq!(breathing.direction(), BreathPhase::Exhale);
        assert!(c.simulation().entities.obstacles().is_empty());
        assert_eq!(surface.frames, 1001);
        assert_eq!(c.phase(), SessionPhase::Playing);
    }

    #[test]
    fn test_obstacle_over_player_ends_session() {
        let mut c = controller(2).without_obstacles();
        let mut surface = HeadlessSurface::new();
        c.start().unwrap();
        let field = c.simulation().field;
        c.simulation_mut().entities.push_obstacle(wall(field));

        let outcome = c.frame(1_000.0, Some(&mut surface));
        let FrameOutcome::Ended(summary) = outcome else {
            panic!("expected the session to end, got {:?}", outcome);
        };
        assert_eq!(summary.obstacles_avoided, 0);
        assert_eq!(c.phase(), SessionPhase::Ended);
        assert_eq!(c.persister().records().len(), 1);
        assert_eq!(c.last_summary(), Some(summary));
        // Final frame is still drawn
        assert_eq!(surface.frames, 1);
    }

    #[test]
    fn test_score_matches_distance_without_obstacles() {
        let mut c = controller(3).without_obstacles();
        let mut surface = HeadlessSurface::new();
        c.start().unwrap();

        assert_eq!(run(&mut c, &mut surface, 0.0, 16.0, 1001), None);

        let summary = c.simulation().summary();
        assert_eq!(summary.distance_traveled, 160.0);
        assert_eq!(summary.score, (summary.distance_traveled * 10.0).floor() as u64);
        assert_eq!(summary.score, 1600);
        assert_eq!(summary.time_elapsed_seconds, 16);
    }

    #[test]
    fn test_pause_time_is_not_simulated() {
        let played = |pause_ms: f64| {
            let mut c = controller(4).without_obstacles();
            let mut surface = HeadlessSurface::new();
            c.start().unwrap();
            assert_eq!(run(&mut c, &mut surface, 0.0, 16.0, 101), None);
            c.pause().unwrap();

            // Frames delivered while paused do nothing
            assert_eq!(c.frame(1_700.0, Some(&mut surface)), FrameOutcome::Skipped);

            let resumed_at = 1_600.0 + pause_ms;
            c.resume(resumed_at).unwrap();
            assert_eq!(run(&mut c, &mut surface, resumed_at + 16.0, 16.0, 100), None);
            (c.simulation().score.distance(), c.simulation().breathing.height_percent())
        };

        let (distance_long, height_long) = played(5_000.0);
        let (distance_none, height_none) = played(0.0);
        assert_eq!(distance_long, distance_none);
        assert_eq!(height_long, height_none);
        assert!((distance_none - 200.0 * 16.0 * 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_score_never_drops_while_playing() {
        let mut c = controller(5);
        let mut surface = HeadlessSurface::new();
        c.start().unwrap();

        let mut last = 0;
        for i in 0..5_000 {
            let outcome = c.frame(i as f64 * 16.0, Some(&mut surface));
            let score = c.simulation().score.score();
            assert!(score >= last);
            last = score;
            if matches!(outcome, FrameOutcome::Ended(_)) {
                break;
            }
        }
    }

    #[test]
    fn test_one_summary_per_session() {
        let mut c = controller(6).without_obstacles();
        let mut surface = HeadlessSurface::new();
        c.start().unwrap();
        run(&mut c, &mut surface, 0.0, 16.0, 50);
        let summary = c.stop().unwrap();
        assert!(summary.score > 0);

        assert_eq!(c.frame(2_000.0, Some(&mut surface)), FrameOutcome::Skipped);
        assert!(c.stop().is_err());
        assert!(c.pause().is_err());
        assert_eq!(c.persister().records().len(), 1);
        assert_eq!(c.persister().records()[0].score, summary.score);
    }

    #[test]
    fn test_restart_clears_previous_session() {
        let mut c = controller(7).without_obstacles();
        let mut surface = HeadlessSurface::new();
        c.start().unwrap();
        let field = c.simulation().field;
        c.simulation_mut().entities.push_obstacle(Obstacle {
            pos: Vec2::new(600.0, 0.0),
            ..wall(field)
        });
        run(&mut c, &mut surface, 0.0, 16.0, 10);
        c.stop().unwrap();
        assert!(!c.simulation().entities.obstacles().is_empty());

        c.start().unwrap();
        assert!(c.simulation().entities.is_empty());
        assert_eq!(c.simulation().score.score(), 0);
        assert_eq!(c.simulation().breathing.height_percent(), 50.0);

        // First frame of the new session is a baseline, not a 10s jump
        c.frame(10_000.0, Some(&mut surface));
        assert_eq!(c.simulation().score.survived_ms(), 0.0);
    }

    #[test]
    fn test_persist_failure_keeps_session_ended() {
        let mut c = controller(8).without_obstacles();
        c.persister_mut().fail_writes = true;
        let mut surface = HeadlessSurface::new();
        c.start().unwrap();
        run(&mut c, &mut surface, 0.0, 16.0, 20);

        let summary = c.stop().unwrap();
        assert_eq!(c.phase(), SessionPhase::Ended);
        assert_eq!(c.last_summary(), Some(summary));
        assert!(matches!(c.take_persist_error(), Some(PersistError::Storage(_))));
        assert!(c.take_persist_error().is_none());
        assert_eq!(c.frame(500.0, Some(&mut surface)), FrameOutcome::Skipped);
    }

    /// Accepts every write and reports the outcome later, like an upload
    #[derive(Default)]
    struct DeferredPersister {
        failures: FailureSlot,
        pending: Vec<SessionSummary>,
    }

    impl SessionPersister for DeferredPersister {
        fn persist(&mut self, summary: SessionSummary) -> Result<(), PersistError> {
            self.pending.push(summary);
            Ok(())
        }

        fn take_deferred_error(&mut self) -> Option<PersistError> {
            self.failures.take()
        }
    }

    #[test]
    fn test_late_persist_failure_reaches_the_notice() {
        let mut c = SessionController::new(
            Settings::default(),
            PlayField::default(),
            RecordingAudio::default(),
            DeferredPersister::default(),
            9,
        )
        .with_highscores(HighScores::new())
        .without_obstacles();
        let mut surface = HeadlessSurface::new();
        c.start().unwrap();
        for i in 0..20 {
            c.frame(i as f64 * 16.0, Some(&mut surface));
        }
        c.stop().unwrap();
        assert_eq!(c.persister().pending.len(), 1);
        assert!(c.take_persist_error().is_none());

        // The background write fails after the session already ended
        let background = c.persister().failures.clone();
        background.record(PersistError::Rejected { status: 502 });

        assert_eq!(c.phase(), SessionPhase::Ended);
        assert!(matches!(
            c.take_persist_error(),
            Some(PersistError::Rejected { status: 502 })
        ));
        assert!(c.take_persist_error().is_none());
    }

    #[test]
    fn test_invalid_transitions() {
        let mut c = controller(9);
        assert_eq!(
            c.pause(),
            Err(SessionError::InvalidTransition {
                from: SessionPhase::Idle,
                action: "pause"
            })
        );
        assert!(c.resume(0.0).is_err());
        assert!(c.stop().is_err());

        c.start().unwrap();
        assert!(c.start().is_err());
        assert!(c.resume(0.0).is_err());
        c.pause().unwrap();
        assert!(c.pause().is_err());
        assert_eq!(c.phase(), SessionPhase::Paused);
    }

    #[test]
    fn test_missing_surface_is_a_no_op() {
        let mut c = controller(10);
        c.start().unwrap();
        assert_eq!(c.frame(0.0, None), FrameOutcome::Skipped);
        assert_eq!(c.frame(16.0, None), FrameOutcome::Skipped);
        assert_eq!(c.simulation().ticks, 0);
        assert!(c.wants_frames());
    }

    #[test]
    fn test_audio_follows_lifecycle() {
        let mut c = controller(11).without_obstacles();
        let mut surface = HeadlessSurface::new();
        c.start().unwrap();
        assert!(c.audio().is_ambient_playing());
        c.pause().unwrap();
        assert!(!c.audio().is_ambient_playing());
        c.resume(0.0).unwrap();
        run(&mut c, &mut surface, 16.0, 16.0, 100);
        c.stop().unwrap();
        assert!(!c.audio().is_ambient_playing());

        assert_eq!(
            c.audio().backend().events,
            vec![
                AudioEvent::AmbientStarted(1),
                AudioEvent::Cue(SoundCue::Click),
                AudioEvent::AmbientStopped(1),
                AudioEvent::Cue(SoundCue::Click),
                AudioEvent::AmbientStarted(2),
                AudioEvent::Cue(SoundCue::Click),
                AudioEvent::AmbientStopped(2),
                // First non-zero score always makes an empty board
                AudioEvent::Cue(SoundCue::Success),
            ]
        );
    }

    #[test]
    fn test_zero_score_gets_no_success_cue() {
        let mut c = controller(12).without_obstacles();
        let mut surface = HeadlessSurface::new();
        c.start().unwrap();
        let field = c.simulation().field;
        c.simulation_mut().entities.push_obstacle(wall(field));
        let FrameOutcome::Ended(summary) = c.frame(0.0, Some(&mut surface)) else {
            panic!("expected collision");
        };
        assert_eq!(summary.score, 0);
        assert!(!c.audio().backend().cues().contains(&SoundCue::Success));
        assert!(c.highscores().is_empty());
    }

    #[test]
    fn test_muting_mid_session_stops_ambient() {
        let mut c = controller(13);
        c.start().unwrap();
        c.set_volume(VolumeLevel::Off);
        assert!(!c.audio().is_ambient_playing());
        assert_eq!(c.settings().volume, VolumeLevel::Off);
        c.set_volume(VolumeLevel::Low);
        assert!(c.audio().is_ambient_playing());
    }

    #[test]
    fn test_rate_change_keeps_position() {
        let mut c = controller(14).without_obstacles();
        let mut surface = HeadlessSurface::new();
        c.start().unwrap();
        run(&mut c, &mut surface, 0.0, 16.0, 60);
        let before = c.simulation().breathing.height_percent();

        c.set_breathing_rate(10);
        c.frame(60.0 * 16.0, Some(&mut surface));
        let after = c.simulation().breathing.height_percent();
        // One 16ms step at the fastest inhale slope (30% over 2400ms)
        assert!((before - after).abs() <= 30.0 / 2_400.0 * 16.0 + 1e-4);
        assert_eq!(c.settings().breathing_rate_per_minute, 10);
    }

    #[test]
    fn test_breath_prompt_matches_balloon_over_many_cycles() {
        let mut c = controller(16).without_obstacles();
        let mut surface = HeadlessSurface::new();
        c.start().unwrap();

        let mut turns = 0;
        let mut last_height = c.simulation().breathing.height_percent();
        let mut last_phase = c.simulation().breathing.cycle_state().phase;
        // 60s at 6 breaths/min
        for i in 0..=3_750 {
            assert_eq!(
                c.frame(i as f64 * 16.0, Some(&mut surface)),
                FrameOutcome::Advanced
            );
            let breathing = &c.simulation().breathing;
            let prompt = breathing.cycle_state().phase;
            assert_eq!(prompt, breathing.direction());

            // Away from the turning points the balloon moves the way the prompt says
            let height = breathing.height_percent();
            if prompt == last_phase {
                match prompt {
                    BreathPhase::Inhale => assert!(height <= last_height),
                    BreathPhase::Exhale => assert!(height >= last_height),
                }
            } else {
                turns += 1;
            }
            last_height = height;
            last_phase = prompt;
        }
        // Turns at 4s, 16s, 24s, 36s, 44s and 56s
        assert_eq!(turns, 6);
        assert_eq!(c.simulation().breathing.cycles_completed(), 6);
    }

    #[test]
    fn test_resize_mid_session() {
        let mut c = controller(15).without_obstacles();
        let mut surface = HeadlessSurface::new();
        c.start().unwrap();
        run(&mut c, &mut surface, 0.0, 16.0, 30);
        let distance = c.simulation().score.distance();
        c.resize(1024.0, 768.0);
        assert_eq!(c.simulation().field, PlayField::new(1024.0, 768.0));
        assert_eq!(c.simulation().score.distance(), distance);
        assert_eq!(c.phase(), SessionPhase::Playing);
    }

    #[test]
    fn test_same_seed_same_session() {
        let play = || {
            let mut c = controller(42);
            let mut surface = HeadlessSurface::new();
            c.start().unwrap();
            run(&mut c, &mut surface, 0.0, 16.0, 3_000)
                .unwrap_or_else(|| c.simulation().summary())
        };
        assert_eq!(play(), play());
    }
}
