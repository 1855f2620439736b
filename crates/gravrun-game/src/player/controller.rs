//! Kinematic movement controller under an arbitrary gravity axis

use glam::{Quat, Vec2, Vec3};
use gravrun_core::math::{move_towards, project_on_plane, rotate_towards, try_normalize};
use gravrun_physics::KinematicMotor;
use tracing::{debug, info, warn};

use super::body::Body;
use super::movement::{MovementConfig, SpeedCarryPolicy};
use super::state::{MovementState, MovementTimers};
use crate::events::{Landed, MoveInputChanged, Observers};

/// A gravity vector that cannot define a gravity plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GravityError {
    #[error("gravity direction has zero length")]
    ZeroLength,
    #[error("gravity direction is not finite")]
    NonFinite,
}

/// Player movement: run, slide, dash, jump and gravity integration
///
/// Velocity is kept split into a component in the gravity plane and a signed
/// scalar along `up`. Every write path projects onto the plane, so the
/// horizontal part never carries a gravity-axis component.
#[derive(Debug)]
pub struct MovementController {
    config: MovementConfig,
    body: Body,
    gravity: Vec3,
    horizontal_velocity: Vec3,
    vertical_velocity: f32,
    grounded: bool,
    state: MovementState,
    timers: MovementTimers,
    held_time: f32,
    slide_direction: Vec3,
    slide_speed: f32,
    dash_direction: Vec3,
    move_input: Vec2,
    look_input: Vec2,
    slide_held: bool,
    jump_requested: bool,
    dash_requested: bool,
    directional_input_suspended: bool,
    /// Fired on every ungrounded to grounded transition
    pub landed: Observers<Landed>,
    /// Fired whenever the latched move input changes value
    pub move_input_changed: Observers<MoveInputChanged>,
}

impl MovementController {
    /// Create a controller at `position` (capsule center) with default gravity
    pub fn new(config: MovementConfig, position: Vec3) -> Self {
        Self {
            config,
            body: Body::new(position),
            gravity: Vec3::NEG_Y,
            horizontal_velocity: Vec3::ZERO,
            vertical_velocity: 0.0,
            grounded: false,
            state: MovementState::Airborne,
            timers: MovementTimers::default(),
            held_time: 0.0,
            slide_direction: Vec3::ZERO,
            slide_speed: 0.0,
            dash_direction: Vec3::ZERO,
            move_input: Vec2::ZERO,
            look_input: Vec2::ZERO,
            slide_held: false,
            jump_requested: false,
            dash_requested: false,
            directional_input_suspended: false,
            landed: Observers::new(),
            move_input_changed: Observers::new(),
        }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    // -- input latching -----------------------------------------------------

    /// Latch the 2D move vector (x = strafe, y = forward)
    pub fn set_move_input(&mut self, input: Vec2) {
        let input = if input.is_finite() { input } else { Vec2::ZERO };
        if input != self.move_input {
            self.move_input = input;
            self.move_input_changed.emit(&MoveInputChanged(input));
        }
    }

    /// Latch a look delta, consumed on the next tick
    pub fn set_look_input(&mut self, delta: Vec2) {
        if delta.is_finite() {
            self.look_input += delta;
        }
    }

    pub fn set_slide_held(&mut self, held: bool) {
        self.slide_held = held;
    }

    /// Queue a jump for the next tick, where wall climbing is checked first
    pub fn request_jump(&mut self) {
        self.jump_requested = true;
    }

    /// Queue a dash for the next tick
    pub fn request_dash(&mut self) {
        self.dash_requested = true;
    }

    /// While suspended, move input neither steers nor changes the ground state
    pub fn set_directional_input_suspended(&mut self, suspended: bool) {
        self.directional_input_suspended = suspended;
    }

    pub fn is_directional_input_suspended(&self) -> bool {
        self.directional_input_suspended
    }

    // -- one-shot actions ---------------------------------------------------

    /// Jump from the ground, or spend an air jump
    ///
    /// Returns false when grounded jumping is unavailable and air jumps are
    /// exhausted (or disabled).
    pub fn try_jump(&mut self) -> bool {
        let air_jump = self.config.can_double_jump
            && self.timers.jump_count < 2
            && !(self.config.double_jump_requires_descent && self.vertical_velocity > 0.0);
        if !self.grounded && !air_jump {
            return false;
        }

        let from_ground = self.grounded;
        self.vertical_velocity = self.config.jump_velocity();
        self.timers.jump_count += 1;
        self.launch();

        if let Some(direction) = self.input_direction() {
            let previous = self.horizontal_velocity.length();
            let cap = self.config.run_speed.max(previous);
            let boosted = self.horizontal_velocity + direction * self.config.jump_forward_boost;
            self.horizontal_velocity = boosted.clamp_length_max(cap);
        }

        debug!(from_ground, jumps = self.timers.jump_count, "jump");
        true
    }

    /// Start a dash if the cooldown has elapsed
    pub fn try_dash(&mut self) -> bool {
        if self.timers.dash_cooldown > 0.0 || self.is_dashing() {
            return false;
        }

        let direction = self
            .input_direction()
            .unwrap_or_else(|| self.body.forward());
        self.dash_direction = direction;
        self.horizontal_velocity = direction * self.config.dash_speed;
        self.timers.dash_remaining = self.config.dash_duration;
        self.timers.dash_cooldown = self.config.dash_cooldown;
        self.timers.reset_slide();

        debug!(?direction, "dash");
        true
    }

    // -- gravity and velocity writes ----------------------------------------

    /// Replace the gravity axis
    ///
    /// Zeroes both velocity components, cancels any dash or slide and restarts
    /// the jump grace timer. Invalid vectors are rejected and leave the
    /// controller untouched.
    pub fn set_gravity_direction(&mut self, direction: Vec3) -> Result<(), GravityError> {
        if !direction.is_finite() {
            warn!(?direction, "rejected non-finite gravity direction");
            return Err(GravityError::NonFinite);
        }
        let Some(gravity) = try_normalize(direction) else {
            warn!(?direction, "rejected zero-length gravity direction");
            return Err(GravityError::ZeroLength);
        };

        let old_up = self.up();
        self.gravity = gravity;
        self.body.reorient(old_up, self.up());

        self.horizontal_velocity = Vec3::ZERO;
        self.vertical_velocity = 0.0;
        self.held_time = 0.0;
        self.timers.dash_remaining = 0.0;
        self.timers.reset_slide();
        self.launch();

        info!(?gravity, "gravity direction changed");
        Ok(())
    }

    /// Overwrite both velocity components from a world-space vector
    pub fn set_velocity(&mut self, velocity: Vec3) {
        let up = self.up();
        self.horizontal_velocity = project_on_plane(velocity, up);
        self.vertical_velocity = velocity.dot(up);
    }

    /// Overwrite the gravity-plane velocity, dropping any gravity-axis part
    pub fn set_horizontal_velocity(&mut self, velocity: Vec3) {
        self.horizontal_velocity = project_on_plane(velocity, self.up());
    }

    pub fn set_vertical_velocity(&mut self, velocity: f32) {
        self.vertical_velocity = velocity;
    }

    /// Add a world-space velocity change
    ///
    /// An impulse with an upward part lifts the body off the ground and starts
    /// the jump grace timer, like a jump does.
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        let up = self.up();
        let lift = impulse.dot(up);
        self.horizontal_velocity += project_on_plane(impulse, up);
        self.vertical_velocity += lift;
        if lift > 0.0 {
            self.launch();
        }
    }

    /// Replace the yaw from a world rotation
    pub fn set_orientation(&mut self, rotation: Quat) {
        let up = self.up();
        self.body.set_rotation(rotation, up);
    }

    /// Turn counter-clockwise about `up`
    pub fn rotate_yaw(&mut self, radians: f32) {
        let up = self.up();
        self.body.rotate_yaw(radians, up);
    }

    /// Place the body without sweeping
    pub fn set_position(&mut self, position: Vec3) {
        self.body.position = position;
    }

    // -- read accessors -----------------------------------------------------

    /// Horizontal speed
    pub fn speed(&self) -> f32 {
        self.horizontal_velocity.length()
    }

    /// Signed velocity along `up`
    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    pub fn horizontal_velocity(&self) -> Vec3 {
        self.horizontal_velocity
    }

    /// Combined world-space velocity
    pub fn velocity(&self) -> Vec3 {
        self.horizontal_velocity + self.up() * self.vertical_velocity
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn gravity_direction(&self) -> Vec3 {
        self.gravity
    }

    pub fn gravity_strength(&self) -> f32 {
        self.config.gravity_strength
    }

    pub fn up(&self) -> Vec3 {
        -self.gravity
    }

    pub fn is_sliding(&self) -> bool {
        self.state == MovementState::Sliding
    }

    pub fn is_dashing(&self) -> bool {
        self.timers.dash_remaining > 0.0
    }

    pub fn state(&self) -> MovementState {
        self.state
    }

    pub fn timers(&self) -> &MovementTimers {
        &self.timers
    }

    pub fn jump_count(&self) -> u32 {
        self.timers.jump_count
    }

    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    /// Yaw rotation of the body
    pub fn orientation(&self) -> Quat {
        self.body.rotation(self.up())
    }

    pub fn forward(&self) -> Vec3 {
        self.body.forward()
    }

    pub fn right(&self) -> Vec3 {
        self.body.right(self.up())
    }

    /// Camera pitch in degrees
    pub fn pitch(&self) -> f32 {
        self.body.pitch()
    }

    pub fn move_input(&self) -> Vec2 {
        self.move_input
    }

    // -- simulation ---------------------------------------------------------

    /// Advance one fixed step of simulated time
    ///
    /// Order: timers, look, grounding, landing, ceiling, queued actions,
    /// horizontal state machine, gravity integration, collision-resolved move.
    pub fn tick(&mut self, motor: &mut impl KinematicMotor, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }

        if self.timers.advance(dt) {
            self.end_dash();
        }
        self.apply_look();

        let was_grounded = self.grounded;
        self.grounded = self.probe_ground(&*motor);
        let landed = self.grounded && !was_grounded;
        if landed {
            self.timers.jump_count = 0;
        }

        if self.vertical_velocity > 0.0 && self.probe_ceiling(&*motor) {
            self.vertical_velocity = 0.0;
        }

        if std::mem::take(&mut self.jump_requested) && !self.try_wall_climb(&*motor) {
            self.try_jump();
        }
        if std::mem::take(&mut self.dash_requested) {
            self.try_dash();
        }

        let next = self.update_horizontal(dt);
        self.integrate_vertical(dt);

        let up = self.up();
        let outcome = motor.move_body(self.body.position, self.velocity() * dt, up, dt);
        self.body.position += outcome.translation;
        if outcome.contacts.above && self.vertical_velocity > 0.0 {
            self.vertical_velocity = 0.0;
        }

        if next != self.state {
            debug!(from = ?self.state, to = ?next, speed = self.speed(), "movement state");
            self.state = next;
        }
        if landed {
            self.landed.emit(&Landed);
        }
    }

    /// Lift off: the ground probe is skipped until the grace timer runs out
    fn launch(&mut self) {
        self.grounded = false;
        self.timers.jump_grace = self.config.jump_grace_time;
    }

    fn end_dash(&mut self) {
        self.horizontal_velocity = self
            .horizontal_velocity
            .clamp_length_max(self.config.run_speed);
        self.held_time = self.config.acceleration_time;
    }

    fn apply_look(&mut self) {
        let look = std::mem::take(&mut self.look_input);
        if look == Vec2::ZERO {
            return;
        }
        let sensitivity = self.config.look_sensitivity;
        self.rotate_yaw(-(look.x * sensitivity.x).to_radians());
        self.body
            .add_pitch(-look.y * sensitivity.y, self.config.pitch_limit);
    }

    fn probe_radius(&self, motor: &impl KinematicMotor) -> f32 {
        motor.shape().radius * self.config.probe_radius_scale
    }

    fn probe_distance(&self, motor: &impl KinematicMotor) -> f32 {
        let shape = motor.shape();
        (shape.half_height() - self.probe_radius(motor) + shape.skin_width).max(0.0)
    }

    fn probe_ground(&self, motor: &impl KinematicMotor) -> bool {
        if self.timers.jump_grace > 0.0 {
            return false;
        }
        motor.sphere_cast(
            self.body.position,
            self.gravity,
            self.probe_distance(motor),
            self.probe_radius(motor),
            self.config.ground_mask,
        )
    }

    fn probe_ceiling(&self, motor: &impl KinematicMotor) -> bool {
        motor.sphere_cast(
            self.body.position,
            self.up(),
            self.probe_distance(motor),
            self.probe_radius(motor),
            self.config.ground_mask,
        )
    }

    fn try_wall_climb(&mut self, motor: &impl KinematicMotor) -> bool {
        let Some(climb) = &self.config.wall_climb else {
            return false;
        };
        let up = self.up();
        let forward = self.body.forward();
        let origin = self.body.position + up * climb.height_offset;
        let fan = climb.fan_angle.to_radians();

        let touching = [0.0, -fan, fan].into_iter().any(|angle| {
            let direction = Quat::from_axis_angle(up, angle) * forward;
            motor.ray_cast(
                origin,
                direction,
                climb.check_distance,
                climb.climbable_mask,
            )
        });
        if !touching {
            return false;
        }

        self.vertical_velocity = self.config.launch_speed_for(climb.climb_height);
        self.horizontal_velocity += forward * climb.push_speed;
        self.launch();
        debug!("wall climb");
        true
    }

    /// Unit move direction in the gravity plane, if any input is held
    fn input_direction(&self) -> Option<Vec3> {
        if self.directional_input_suspended
            || self.move_input.length() < self.config.input_deadzone
        {
            return None;
        }
        let up = self.up();
        let wish =
            self.body.forward() * self.move_input.y + self.body.right(up) * self.move_input.x;
        try_normalize(project_on_plane(wish, up))
    }

    fn update_horizontal(&mut self, dt: f32) -> MovementState {
        if self.is_dashing() {
            self.horizontal_velocity = self.dash_direction * self.config.dash_speed;
            return MovementState::Dashing;
        }
        if self.directional_input_suspended {
            return match self.state {
                _ if !self.grounded => MovementState::Airborne,
                MovementState::Sliding => MovementState::Sliding,
                _ if self.horizontal_velocity.length_squared() > 0.0 => MovementState::GroundedRun,
                _ => MovementState::GroundedIdle,
            };
        }

        let input = self.input_direction();
        if !self.grounded {
            if let Some(direction) = input {
                let target = direction * self.config.run_speed * self.move_input.length().min(1.0);
                self.horizontal_velocity = move_towards(
                    self.horizontal_velocity,
                    target,
                    self.config.air_control * dt,
                );
            }
            return MovementState::Airborne;
        }

        if input.is_none() {
            self.timers.slide_locked = false;
        }
        let was_sliding = self.state == MovementState::Sliding;
        if self.slide_held && !self.timers.slide_locked && (was_sliding || input.is_some()) {
            self.slide(input, was_sliding, dt);
            return MovementState::Sliding;
        }
        if was_sliding {
            self.timers.reset_slide();
        }

        match input {
            Some(direction) if !self.timers.slide_locked => {
                self.run(direction, dt);
                MovementState::GroundedRun
            }
            _ => {
                self.horizontal_velocity = Vec3::ZERO;
                self.held_time = 0.0;
                MovementState::GroundedIdle
            }
        }
    }

    fn run(&mut self, direction: Vec3, dt: f32) {
        self.held_time += dt;
        let cap = self.config.run_speed;
        let progress = if self.config.acceleration_time > 0.0 {
            self.held_time / self.config.acceleration_time
        } else {
            1.0
        };
        let ramp = cap * self.config.acceleration_curve.evaluate(progress);

        let current = self.horizontal_velocity.length();
        let speed = if current > cap {
            match self.config.speed_carry {
                SpeedCarryPolicy::Clamp => cap,
                SpeedCarryPolicy::Decay { rate } => (current - rate * dt).max(cap),
            }
        } else {
            ramp.max(current)
        };
        self.horizontal_velocity = direction * speed;
    }

    fn slide(&mut self, input: Option<Vec3>, was_sliding: bool, dt: f32) {
        if !was_sliding {
            self.slide_direction = input.unwrap_or_else(|| self.body.forward());
            self.slide_speed = self.config.slide_speed;
            self.timers.reset_slide();
        } else {
            self.timers.slide_elapsed += dt;
            if let Some(target) = input {
                let max_turn = self.config.slide_turn_rate.to_radians() * dt;
                self.slide_direction =
                    rotate_towards(self.slide_direction, target, self.up(), max_turn);
            }
            if self.timers.slide_elapsed > self.config.slide_duration {
                self.slide_speed =
                    (self.slide_speed - self.config.slide_decay_rate() * dt).max(0.0);
                if self.slide_speed <= 0.0 {
                    self.timers.slide_locked = true;
                    debug!("slide decayed, locked until input release");
                }
            }
        }
        self.horizontal_velocity = self.slide_direction * self.slide_speed;
    }

    fn integrate_vertical(&mut self, dt: f32) {
        if self.grounded && self.vertical_velocity <= self.config.ground_stick_threshold {
            self.vertical_velocity = -self.config.ground_stick_velocity;
        } else {
            self.vertical_velocity -= self.config.gravity_strength * dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{SpeedCarryPolicy, SpeedCurve};
    use gravrun_physics::{CapsuleShape, PlaneMotor};
    use std::cell::Cell;
    use std::rc::Rc;

    const DT: f32 = 1.0 / 64.0;

    fn floor() -> PlaneMotor {
        PlaneMotor::new(CapsuleShape::default()).with_plane(Vec3::Y, Vec3::ZERO)
    }

    fn no_climb() -> MovementConfig {
        MovementConfig {
            wall_climb: None,
            ..Default::default()
        }
    }

    /// Controller resting on the floor after one settling tick
    fn grounded(config: MovementConfig) -> (MovementController, PlaneMotor) {
        let mut motor = floor();
        let mut controller = MovementController::new(config, Vec3::new(0.0, 1.0, 0.0));
        controller.tick(&mut motor, DT);
        assert!(controller.is_grounded());
        (controller, motor)
    }

    #[test]
    fn test_gravity_change_clears_velocity() {
        let directions = [
            Vec3::X,
            Vec3::NEG_Z,
            Vec3::new(1.0, 2.0, -3.0).normalize(),
            Vec3::new(-0.3, -0.9, 0.1).normalize(),
        ];
        for g in directions {
            let mut controller = MovementController::new(no_climb(), Vec3::ZERO);
            controller.set_velocity(Vec3::new(4.0, 7.0, -2.0));
            controller.set_gravity_direction(g).unwrap();
            assert!(controller.horizontal_velocity().dot(g).abs() < 1e-6);
            assert_eq!(controller.vertical_velocity(), 0.0);
            assert!(controller.forward().dot(g).abs() < 1e-5);

            // Injected velocity stays in the new gravity plane
            controller.set_velocity(Vec3::new(3.0, -1.0, 5.0));
            assert!(controller.horizontal_velocity().dot(g).abs() < 1e-5);
        }
    }

    #[test]
    fn test_invalid_gravity_rejected() {
        let mut controller = MovementController::new(no_climb(), Vec3::ZERO);
        controller.set_velocity(Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(
            controller.set_gravity_direction(Vec3::ZERO),
            Err(GravityError::ZeroLength)
        );
        assert_eq!(
            controller.set_gravity_direction(Vec3::new(f32::NAN, 0.0, 0.0)),
            Err(GravityError::NonFinite)
        );
        assert_eq!(controller.gravity_direction(), Vec3::NEG_Y);
        assert_eq!(controller.vertical_velocity(), 2.0);
    }

    #[test]
    fn test_airborne_without_input_preserves_momentum() {
        let mut motor = PlaneMotor::new(CapsuleShape::default());
        let mut controller = MovementController::new(no_climb(), Vec3::new(0.0, 50.0, 0.0));
        controller.set_horizontal_velocity(Vec3::new(3.5, 0.0, -1.25));
        let before = controller.horizontal_velocity();
        for _ in 0..40 {
            controller.tick(&mut motor, DT);
            assert_eq!(controller.state(), MovementState::Airborne);
            assert_eq!(controller.horizontal_velocity(), before);
        }
        assert!(controller.vertical_velocity() < 0.0);
    }

    #[test]
    fn test_run_ramp_linear_scenario() {
        let config = MovementConfig {
            run_speed: 12.0,
            acceleration_time: 0.5,
            acceleration_curve: SpeedCurve::Linear,
            ..no_climb()
        };
        let (mut controller, mut motor) = grounded(config);
        controller.set_move_input(Vec2::Y);
        for _ in 0..16 {
            controller.tick(&mut motor, DT);
        }
        assert_eq!(controller.state(), MovementState::GroundedRun);
        assert!((controller.speed() - 6.0).abs() < 1e-3);
        assert!(controller.horizontal_velocity().z < 0.0);

        // Releasing input stops instantly
        controller.set_move_input(Vec2::ZERO);
        controller.tick(&mut motor, DT);
        assert_eq!(controller.state(), MovementState::GroundedIdle);
        assert_eq!(controller.speed(), 0.0);
    }

    #[test]
    fn test_run_clamps_carried_speed() {
        let (mut controller, mut motor) = grounded(no_climb());
        controller.set_horizontal_velocity(Vec3::new(0.0, 0.0, -20.0));
        controller.set_move_input(Vec2::Y);
        controller.tick(&mut motor, DT);
        assert_eq!(controller.speed(), controller.config().run_speed);
    }

    #[test]
    fn test_run_decays_carried_speed() {
        let config = MovementConfig {
            speed_carry: SpeedCarryPolicy::Decay { rate: 64.0 },
            ..no_climb()
        };
        let (mut controller, mut motor) = grounded(config);
        controller.set_horizontal_velocity(Vec3::new(0.0, 0.0, -12.0));
        controller.set_move_input(Vec2::Y);
        controller.tick(&mut motor, DT);
        assert!((controller.speed() - 11.0).abs() < 1e-4);
        for _ in 0..10 {
            controller.tick(&mut motor, DT);
        }
        assert_eq!(controller.speed(), 8.0);
    }

    #[test]
    fn test_dash_respects_cooldown_and_ignores_slide() {
        let (mut controller, mut motor) = grounded(no_climb());
        assert!(controller.try_dash());
        assert_eq!(controller.speed(), 25.0);
        assert!(
            controller.timers().dash_cooldown >= controller.config().dash_cooldown
        );
        assert!(!controller.try_dash());

        let locked = controller.horizontal_velocity();
        controller.set_move_input(Vec2::X);
        controller.set_slide_held(true);
        controller.tick(&mut motor, DT);
        assert_eq!(controller.state(), MovementState::Dashing);
        assert_eq!(controller.horizontal_velocity(), locked);
        assert!(locked.abs_diff_eq(Vec3::NEG_Z * 25.0, 1e-4));
    }

    #[test]
    fn test_dash_hands_back_run_speed() {
        let (mut controller, mut motor) = grounded(no_climb());
        controller.set_move_input(Vec2::Y);
        controller.try_dash();
        for _ in 0..20 {
            controller.tick(&mut motor, DT);
        }
        assert!(!controller.is_dashing());
        assert_eq!(controller.state(), MovementState::GroundedRun);
        assert!(
            (controller.speed() - controller.config().run_speed).abs() < 1e-4
        );

        // Cooldown runs out eventually
        for _ in 0..64 {
            controller.tick(&mut motor, DT);
        }
        assert!(controller.try_dash());
    }

    #[test]
    fn test_double_jump_limit() {
        let (mut controller, mut motor) = grounded(no_climb());
        assert!(controller.try_jump());
        assert!(!controller.is_grounded());
        controller.tick(&mut motor, DT);
        assert!(controller.try_jump());
        assert_eq!(controller.jump_count(), 2);
        controller.tick(&mut motor, DT);
        assert!(!controller.try_jump());
    }

    #[test]
    fn test_double_jump_disabled() {
        let config = MovementConfig {
            can_double_jump: false,
            ..no_climb()
        };
        let (mut controller, mut motor) = grounded(config);
        assert!(controller.try_jump());
        controller.tick(&mut motor, DT);
        assert!(!controller.try_jump());
    }

    #[test]
    fn test_double_jump_requires_descent() {
        let config = MovementConfig {
            double_jump_requires_descent: true,
            ..no_climb()
        };
        let (mut controller, mut motor) = grounded(config);
        assert!(controller.try_jump());
        controller.tick(&mut motor, DT);
        assert!(!controller.try_jump());
        while controller.vertical_velocity() > 0.0 {
            controller.tick(&mut motor, DT);
        }
        assert!(controller.try_jump());
    }

    #[test]
    fn test_jump_grace_skips_ground_probe() {
        let (mut controller, mut motor) = grounded(no_climb());
        controller.request_jump();
        controller.tick(&mut motor, DT);
        assert!(!controller.is_grounded());
        assert!(controller.vertical_velocity() > 0.0);
        assert!(controller.position().y > 1.0);
    }

    #[test]
    fn test_landing_resets_jumps_and_fires_once() {
        let (mut controller, mut motor) = grounded(no_climb());
        let landings = Rc::new(Cell::new(0));
        let counter = Rc::clone(&landings);
        controller.landed.subscribe(move |_| counter.set(counter.get() + 1));

        controller.try_jump();
        let mut landed_tick = None;
        for tick in 0..200 {
            let was_grounded = controller.is_grounded();
            let before = landings.get();
            controller.tick(&mut motor, DT);
            if controller.is_grounded() && !was_grounded {
                assert_eq!(controller.jump_count(), 0);
                assert_eq!(landings.get(), before + 1);
                landed_tick.get_or_insert(tick);
            } else {
                assert_eq!(landings.get(), before);
            }
        }
        assert!(landed_tick.is_some());
        assert_eq!(landings.get(), 1);
        assert_eq!(controller.state(), MovementState::GroundedIdle);
    }

    #[test]
    fn test_jump_forward_boost_capped() {
        let (mut controller, mut motor) = grounded(no_climb());
        controller.set_move_input(Vec2::Y);
        for _ in 0..40 {
            controller.tick(&mut motor, DT);
        }
        assert!(controller.try_jump());
        assert!(
            (controller.speed() - controller.config().run_speed).abs() < 1e-4
        );
    }

    #[test]
    fn test_slide_holds_then_decays_then_locks() {
        let config = MovementConfig {
            slide_speed: 16.0,
            slide_duration: 0.25,
            slide_decay_time: 0.5,
            ..no_climb()
        };
        let (mut controller, mut motor) = grounded(config);
        controller.set_move_input(Vec2::Y);
        controller.set_slide_held(true);
        controller.tick(&mut motor, DT);
        assert_eq!(controller.state(), MovementState::Sliding);
        assert_eq!(controller.speed(), 16.0);

        for _ in 0..16 {
            controller.tick(&mut motor, DT);
        }
        assert_eq!(controller.speed(), 16.0);

        controller.tick(&mut motor, DT);
        assert!(controller.speed() < 16.0);

        for _ in 0..40 {
            controller.tick(&mut motor, DT);
        }
        assert!(controller.timers().slide_locked);
        assert_eq!(controller.state(), MovementState::GroundedIdle);
        assert_eq!(controller.speed(), 0.0);

        // Release and re-press clears the lock
        controller.set_move_input(Vec2::ZERO);
        controller.tick(&mut motor, DT);
        assert!(!controller.timers().slide_locked);
        controller.set_move_input(Vec2::Y);
        controller.tick(&mut motor, DT);
        assert_eq!(controller.state(), MovementState::Sliding);
    }

    #[test]
    fn test_slide_steers_at_bounded_rate() {
        let config = MovementConfig {
            slide_turn_rate: 90.0,
            ..no_climb()
        };
        let (mut controller, mut motor) = grounded(config);
        controller.set_move_input(Vec2::Y);
        controller.set_slide_held(true);
        controller.tick(&mut motor, DT);

        controller.set_move_input(Vec2::X);
        controller.tick(&mut motor, DT);
        let direction = controller.horizontal_velocity().normalize();
        let turned = gravrun_core::math::signed_angle(Vec3::NEG_Z, direction, Vec3::Y);
        assert!((turned.abs() - (90.0f32).to_radians() * DT).abs() < 1e-4);
    }

    #[test]
    fn test_ceiling_stops_ascent() {
        let mut motor = floor().with_plane(Vec3::NEG_Y, Vec3::new(0.0, 2.2, 0.0));
        let mut controller = MovementController::new(no_climb(), Vec3::new(0.0, 1.0, 0.0));
        controller.tick(&mut motor, DT);
        assert!(controller.try_jump());
        for _ in 0..4 {
            controller.tick(&mut motor, DT);
        }
        assert!(controller.vertical_velocity() <= 0.0);
        assert!(controller.position().y <= 1.2 + 1e-4);
    }

    #[test]
    fn test_wall_climb_on_jump_request() {
        let mut motor = floor().with_plane_in_groups(Vec3::Z, Vec3::new(0.0, 0.0, -0.8), 0b10);
        let mut controller =
            MovementController::new(MovementConfig::default(), Vec3::new(0.0, 1.0, 0.0));
        controller.tick(&mut motor, DT);

        controller.request_jump();
        controller.tick(&mut motor, DT);
        assert_eq!(controller.jump_count(), 0);
        assert!(
            controller.vertical_velocity() > controller.config().jump_velocity()
        );
    }

    #[test]
    fn test_move_input_changed_fires_on_change_only() {
        let mut controller = MovementController::new(no_climb(), Vec3::ZERO);
        let changes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&changes);
        controller
            .move_input_changed
            .subscribe(move |_| counter.set(counter.get() + 1));

        controller.set_move_input(Vec2::Y);
        controller.set_move_input(Vec2::Y);
        controller.set_move_input(Vec2::ZERO);
        assert_eq!(changes.get(), 2);
    }

    #[test]
    fn test_look_turns_and_clamps_pitch() {
        let (mut controller, mut motor) = grounded(no_climb());
        controller.set_look_input(Vec2::new(900.0, -2000.0));
        controller.tick(&mut motor, DT);
        // 90 degrees to the right
        assert!(controller.forward().abs_diff_eq(Vec3::X, 1e-4));
        assert_eq!(controller.pitch(), controller.config().pitch_limit);
    }

    #[test]
    fn test_impulse_lifts_off_ground() {
        let (mut controller, mut motor) = grounded(no_climb());
        controller.apply_impulse(Vec3::new(0.0, 5.0, -5.0));
        assert!(!controller.is_grounded());
        controller.tick(&mut motor, DT);
        assert_eq!(controller.state(), MovementState::Airborne);
        assert!(controller.position().y > 1.0);
    }

    #[test]
    fn test_suspended_input_still_rederives_state() {
        let (mut controller, mut motor) = grounded(no_climb());
        assert!(controller.try_dash());
        controller.set_directional_input_suspended(true);
        for _ in 0..40 {
            controller.tick(&mut motor, DT);
        }
        assert!(controller.is_grounded());
        assert!(!controller.is_dashing());
        assert_eq!(controller.state(), MovementState::GroundedRun);

        // Landing while suspended leaves the airborne state
        let mut motor = floor();
        let mut controller = MovementController::new(no_climb(), Vec3::new(0.0, 1.5, 0.0));
        controller.set_directional_input_suspended(true);
        for _ in 0..64 {
            controller.tick(&mut motor, DT);
        }
        assert!(controller.is_grounded());
        assert_eq!(controller.state(), MovementState::GroundedIdle);
    }

    #[test]
    fn test_sideways_gravity_grounds_on_wall() {
        let mut motor = PlaneMotor::new(CapsuleShape::default())
            .with_plane(Vec3::NEG_X, Vec3::new(5.0, 0.0, 0.0));
        let mut controller = MovementController::new(no_climb(), Vec3::new(3.0, 0.0, 0.0));
        controller.set_gravity_direction(Vec3::X).unwrap();
        for _ in 0..64 {
            controller.tick(&mut motor, DT);
        }
        assert!(controller.is_grounded());
        assert!((controller.position().x - 4.0).abs() < 0.05);
    }
}
