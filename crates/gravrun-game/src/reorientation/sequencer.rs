//! The timed selection ritual, advanced once per frame in real time

use glam::{Vec2, Vec3};
use gravrun_core::{EntityId, GameTime};
use tracing::{debug, info, warn};

use super::tween::RotationTween;
use super::volume::{select_gravity, ReorientationVolume, VolumeKind, YawTurn};
use super::{ReorientationConfig, TimeoutPolicy};
use crate::player::MovementController;

/// Where the sequencer is in a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SequencerPhase {
    #[default]
    Idle,
    /// Session opened, time slowed
    SlowMotionActive,
    /// Input is ignored
    GraceWindow,
    /// Move input is read every frame
    Sampling,
    /// Outcome applied; a rotation tween may still be running
    Committed,
}

/// What a finished session picked
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionOutcome {
    /// New gravity direction, or `None` when the old one was kept
    Gravity(Option<Vec3>),
    Rotation(YawTurn),
}

/// Reported on the frame a session commits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Completion {
    /// Volume that opened the session, to be removed by the caller
    pub volume: EntityId,
    pub outcome: SessionOutcome,
    /// Whether the outcome is the timeout default
    pub timed_out: bool,
}

#[derive(Debug, Clone, Copy)]
struct Session {
    volume: EntityId,
    kind: VolumeKind,
    elapsed: f32,
}

#[derive(Debug, Clone, Copy)]
struct PendingTurn {
    tween: RotationTween,
    launch_speed: Option<f32>,
}

/// Runs at most one reorientation session at a time
///
/// All phase timing uses real (unscaled) time since the sequencer is what
/// slows simulated time down.
#[derive(Debug, Default)]
pub struct GravityReorientationSequencer {
    config: ReorientationConfig,
    phase: SequencerPhase,
    session: Option<Session>,
    turn: Option<PendingTurn>,
}

impl GravityReorientationSequencer {
    pub fn new(config: ReorientationConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &ReorientationConfig {
        &self.config
    }

    pub fn phase(&self) -> SequencerPhase {
        self.phase
    }

    /// Whether a session (or its tween) is in flight
    pub fn is_active(&self) -> bool {
        self.phase != SequencerPhase::Idle
    }

    /// Real seconds since the open session started
    pub fn elapsed(&self) -> Option<f32> {
        self.session.map(|session| session.elapsed)
    }

    /// Open a session for `volume`
    ///
    /// Ignored (returns false) while another session or its rotation tween is
    /// still running.
    pub fn try_begin(
        &mut self,
        volume: &ReorientationVolume,
        controller: &mut MovementController,
        time: &mut GameTime,
    ) -> bool {
        if self.is_active() {
            warn!(
                volume = ?volume.id,
                phase = ?self.phase,
                "reorientation already active, ignoring volume"
            );
            return false;
        }
        if let Err(err) = time.enter_slow_motion(self.config.slow_motion_scale) {
            warn!(%err, "could not enter slow motion");
            return false;
        }

        controller.set_directional_input_suspended(true);
        self.session = Some(Session {
            volume: volume.id,
            kind: volume.kind,
            elapsed: 0.0,
        });
        self.phase = SequencerPhase::SlowMotionActive;
        debug!(volume = ?volume.id, kind = ?volume.kind, "reorientation session opened");
        true
    }

    /// Advance by one frame of real time
    ///
    /// `move_input` is the input captured at the start of this frame. Returns
    /// the completion on the frame the session commits.
    pub fn advance(
        &mut self,
        real_dt: f32,
        move_input: Vec2,
        controller: &mut MovementController,
        time: &mut GameTime,
    ) -> Option<Completion> {
        if self.phase == SequencerPhase::Committed {
            self.advance_turn(real_dt, controller);
            return None;
        }
        let mut session = self.session?;
        session.elapsed += real_dt.max(0.0);
        self.session = Some(session);

        if self.phase == SequencerPhase::SlowMotionActive {
            self.set_phase(SequencerPhase::GraceWindow);
        }
        if self.phase == SequencerPhase::GraceWindow
            && session.elapsed >= self.config.grace_period
        {
            self.set_phase(SequencerPhase::Sampling);
        }

        if self.phase == SequencerPhase::Sampling {
            if let Some(outcome) = self.select(session.kind, move_input, controller) {
                return Some(self.commit(session, outcome, false, controller, time));
            }
        }
        if session.elapsed >= self.config.buffer_duration {
            let outcome = self.timeout_outcome(session.kind);
            return Some(self.commit(session, outcome, true, controller, time));
        }
        None
    }

    /// Tear down any open session and restore normal time flow
    ///
    /// Calling this with nothing in flight is a no-op.
    pub fn cancel(&mut self, controller: &mut MovementController, time: &mut GameTime) {
        if !self.is_active() {
            return;
        }
        time.restore_normal_flow();
        controller.set_directional_input_suspended(false);
        self.session = None;
        self.turn = None;
        self.set_phase(SequencerPhase::Idle);
        info!("reorientation session cancelled");
    }

    fn set_phase(&mut self, phase: SequencerPhase) {
        if phase != self.phase {
            debug!(from = ?self.phase, to = ?phase, "reorientation phase");
            self.phase = phase;
        }
    }

    fn select(
        &self,
        kind: VolumeKind,
        input: Vec2,
        controller: &MovementController,
    ) -> Option<SessionOutcome> {
        let threshold = self.config.selection_threshold;
        match kind {
            VolumeKind::Gravity => select_gravity(input, threshold, controller.right())
                .map(|direction| SessionOutcome::Gravity(Some(direction))),
            VolumeKind::Rotation { .. } => {
                YawTurn::select(input, threshold).map(SessionOutcome::Rotation)
            }
        }
    }

    fn timeout_outcome(&self, kind: VolumeKind) -> SessionOutcome {
        match kind {
            VolumeKind::Gravity => SessionOutcome::Gravity(match self.config.timeout_policy {
                TimeoutPolicy::KeepCurrent => None,
                TimeoutPolicy::WorldDown => Some(Vec3::NEG_Y),
            }),
            VolumeKind::Rotation { .. } => SessionOutcome::Rotation(YawTurn::Forward),
        }
    }

    fn commit(
        &mut self,
        session: Session,
        outcome: SessionOutcome,
        timed_out: bool,
        controller: &mut MovementController,
        time: &mut GameTime,
    ) -> Completion {
        time.restore_normal_flow();
        controller.set_directional_input_suspended(false);
        self.session = None;
        self.set_phase(SequencerPhase::Committed);
        info!(volume = ?session.volume, ?outcome, timed_out, "reorientation committed");

        match outcome {
            SessionOutcome::Gravity(Some(direction)) => {
                if let Err(err) = controller.set_gravity_direction(direction) {
                    warn!(%err, "selected gravity rejected");
                }
                self.set_phase(SequencerPhase::Idle);
            }
            SessionOutcome::Gravity(None) => self.set_phase(SequencerPhase::Idle),
            SessionOutcome::Rotation(turn) => {
                let launch_speed = match session.kind {
                    VolumeKind::Rotation { launch_speed } => launch_speed,
                    VolumeKind::Gravity => None,
                };
                self.turn = Some(PendingTurn {
                    tween: RotationTween::new(turn.radians(), self.config.rotation_duration),
                    launch_speed,
                });
            }
        }

        Completion {
            volume: session.volume,
            outcome,
            timed_out,
        }
    }

    fn advance_turn(&mut self, real_dt: f32, controller: &mut MovementController) {
        let Some(turn) = self.turn.as_mut() else {
            self.set_phase(SequencerPhase::Idle);
            return;
        };
        controller.rotate_yaw(turn.tween.advance(real_dt));
        if !turn.tween.is_finished() {
            return;
        }

        if let Some(speed) = turn.launch_speed {
            let forward = controller.forward();
            controller.set_horizontal_velocity(forward * speed);
            debug!(speed, "rotation launch");
        }
        self.turn = None;
        self.set_phase(SequencerPhase::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::MovementConfig;
    use gravrun_core::{TimeConfig, TriggerShape};

    const FRAME: f32 = 1.0 / 16.0;

    fn setup() -> (GravityReorientationSequencer, MovementController, GameTime) {
        let config = ReorientationConfig {
            buffer_duration: 0.5,
            grace_period: 0.125,
            rotation_duration: 0.25,
            ..Default::default()
        };
        (
            GravityReorientationSequencer::new(config),
            MovementController::new(MovementConfig::default(), Vec3::ZERO),
            GameTime::new(TimeConfig::default()),
        )
    }

    fn gravity_volume() -> ReorientationVolume {
        ReorientationVolume::gravity(TriggerShape::sphere(Vec3::ZERO, 2.0))
    }

    #[test]
    fn test_begin_slows_time_and_suspends_input() {
        let (mut sequencer, mut controller, mut time) = setup();
        assert!(
            sequencer.try_begin(&gravity_volume(), &mut controller, &mut time)
        );
        assert!(time.is_slowed());
        assert!((time.time_scale() - 0.1).abs() < 1e-6);
        assert!(controller.is_directional_input_suspended());
        assert_eq!(sequencer.phase(), SequencerPhase::SlowMotionActive);

        sequencer.advance(FRAME, Vec2::ZERO, &mut controller, &mut time);
        assert_eq!(sequencer.phase(), SequencerPhase::GraceWindow);
        sequencer.advance(FRAME, Vec2::ZERO, &mut controller, &mut time);
        assert_eq!(sequencer.phase(), SequencerPhase::Sampling);
    }

    #[test]
    fn test_timeout_keeps_current_gravity() {
        let (mut sequencer, mut controller, mut time) = setup();
        let volume = gravity_volume();
        sequencer.try_begin(&volume, &mut controller, &mut time);

        for _ in 0..7 {
            assert!(sequencer
                .advance(FRAME, Vec2::ZERO, &mut controller, &mut time)
                .is_none());
        }
        let completion = sequencer
            .advance(FRAME, Vec2::ZERO, &mut controller, &mut time)
            .unwrap();
        assert!(completion.timed_out);
        assert_eq!(completion.volume, volume.id);
        assert_eq!(completion.outcome, SessionOutcome::Gravity(None));
        assert_eq!(controller.gravity_direction(), Vec3::NEG_Y);
        assert!(!time.is_slowed());
        assert!(!controller.is_directional_input_suspended());
        assert_eq!(sequencer.phase(), SequencerPhase::Idle);
    }

    #[test]
    fn test_timeout_world_down() {
        let (mut sequencer, mut controller, mut time) = setup();
        sequencer.config.timeout_policy = TimeoutPolicy::WorldDown;
        controller.set_gravity_direction(Vec3::X).unwrap();
        sequencer.try_begin(&gravity_volume(), &mut controller, &mut time);
        let completion = (0..8)
            .find_map(|_| {
                sequencer.advance(FRAME, Vec2::ZERO, &mut controller, &mut time)
            })
            .unwrap();
        assert_eq!(
            completion.outcome,
            SessionOutcome::Gravity(Some(Vec3::NEG_Y))
        );
        assert_eq!(controller.gravity_direction(), Vec3::NEG_Y);
    }

    #[test]
    fn test_pick_after_grace_commits_direction() {
        let (mut sequencer, mut controller, mut time) = setup();
        sequencer.try_begin(&gravity_volume(), &mut controller, &mut time);
        sequencer.advance(FRAME, Vec2::ZERO, &mut controller, &mut time);
        sequencer.advance(FRAME, Vec2::ZERO, &mut controller, &mut time);

        let completion = sequencer
            .advance(FRAME, Vec2::new(0.8, 0.0), &mut controller, &mut time)
            .unwrap();
        assert!(!completion.timed_out);
        // Body right under default gravity, facing -Z
        assert!(controller.gravity_direction().abs_diff_eq(Vec3::X, 1e-6));
        assert_eq!(controller.vertical_velocity(), 0.0);
        assert!(!time.is_slowed());
    }

    #[test]
    fn test_down_picks_world_down_from_a_wall() {
        let (mut sequencer, mut controller, mut time) = setup();
        controller.set_gravity_direction(Vec3::X).unwrap();
        sequencer.try_begin(&gravity_volume(), &mut controller, &mut time);
        sequencer.advance(FRAME, Vec2::ZERO, &mut controller, &mut time);
        sequencer.advance(FRAME, Vec2::ZERO, &mut controller, &mut time);

        let completion = sequencer
            .advance(FRAME, Vec2::new(0.0, -1.0), &mut controller, &mut time)
            .unwrap();
        assert_eq!(
            completion.outcome,
            SessionOutcome::Gravity(Some(Vec3::NEG_Y))
        );
        assert_eq!(controller.gravity_direction(), Vec3::NEG_Y);
    }

    #[test]
    fn test_pick_during_grace_ignored() {
        let (mut sequencer, mut controller, mut time) = setup();
        sequencer.try_begin(&gravity_volume(), &mut controller, &mut time);
        assert!(sequencer
            .advance(FRAME, Vec2::new(0.0, 1.0), &mut controller, &mut time)
            .is_none());

        let completion = (0..7)
            .find_map(|_| {
                sequencer.advance(FRAME, Vec2::ZERO, &mut controller, &mut time)
            })
            .unwrap();
        assert!(completion.timed_out);
        assert_eq!(controller.gravity_direction(), Vec3::NEG_Y);
    }

    #[test]
    fn test_reentry_ignored_while_active() {
        let (mut sequencer, mut controller, mut time) = setup();
        assert!(
            sequencer.try_begin(&gravity_volume(), &mut controller, &mut time)
        );
        sequencer.advance(FRAME, Vec2::ZERO, &mut controller, &mut time);
        let elapsed = sequencer.elapsed();
        assert!(
            !sequencer.try_begin(&gravity_volume(), &mut controller, &mut time)
        );
        assert_eq!(sequencer.elapsed(), elapsed);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let (mut sequencer, mut controller, mut time) = setup();
        sequencer.try_begin(&gravity_volume(), &mut controller, &mut time);
        sequencer.cancel(&mut controller, &mut time);
        sequencer.cancel(&mut controller, &mut time);
        assert_eq!(sequencer.phase(), SequencerPhase::Idle);
        assert!(!time.is_slowed());
        assert!(!controller.is_directional_input_suspended());
        assert!(sequencer
            .advance(FRAME, Vec2::X, &mut controller, &mut time)
            .is_none());
    }

    #[test]
    fn test_rotation_tween_then_launch() {
        let (mut sequencer, mut controller, mut time) = setup();
        let volume =
            ReorientationVolume::rotation(TriggerShape::sphere(Vec3::ZERO, 2.0), Some(10.0));
        sequencer.try_begin(&volume, &mut controller, &mut time);
        sequencer.advance(FRAME, Vec2::ZERO, &mut controller, &mut time);
        sequencer.advance(FRAME, Vec2::ZERO, &mut controller, &mut time);

        let completion = sequencer
            .advance(FRAME, Vec2::new(1.0, 0.0), &mut controller, &mut time)
            .unwrap();
        assert_eq!(completion.outcome, SessionOutcome::Rotation(YawTurn::Right));
        assert_eq!(sequencer.phase(), SequencerPhase::Committed);
        assert!(!time.is_slowed());

        // Another volume during the tween is ignored
        assert!(!sequencer.try_begin(&volume, &mut controller, &mut time));

        for _ in 0..4 {
            sequencer.advance(FRAME, Vec2::ZERO, &mut controller, &mut time);
        }
        assert_eq!(sequencer.phase(), SequencerPhase::Idle);
        assert!(controller.forward().abs_diff_eq(Vec3::X, 1e-4));
        assert!(controller
            .horizontal_velocity()
            .abs_diff_eq(Vec3::X * 10.0, 1e-3));
    }

    #[test]
    fn test_rotation_timeout_keeps_facing_and_launches() {
        let (mut sequencer, mut controller, mut time) = setup();
        let volume =
            ReorientationVolume::rotation(TriggerShape::sphere(Vec3::ZERO, 2.0), Some(10.0));
        let facing = controller.forward();
        sequencer.try_begin(&volume, &mut controller, &mut time);

        for _ in 0..7 {
            assert!(sequencer
                .advance(FRAME, Vec2::ZERO, &mut controller, &mut time)
                .is_none());
        }
        let completion = sequencer
            .advance(FRAME, Vec2::ZERO, &mut controller, &mut time)
            .unwrap();
        assert!(completion.timed_out);
        assert_eq!(
            completion.outcome,
            SessionOutcome::Rotation(YawTurn::Forward)
        );
        assert_eq!(sequencer.phase(), SequencerPhase::Committed);

        for _ in 0..4 {
            sequencer.advance(FRAME, Vec2::ZERO, &mut controller, &mut time);
        }
        assert_eq!(sequencer.phase(), SequencerPhase::Idle);
        assert!(controller.forward().abs_diff_eq(facing, 1e-6));
        assert!(controller
            .horizontal_velocity()
            .abs_diff_eq(facing * 10.0, 1e-4));
    }
}
