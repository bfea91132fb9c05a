//! The simulator: reset / set-action / step / observe.
//!
//! One [`QwopSim`] is one self-contained instance; the world is created
//! lazily on the first reset and persists across episodes. The step
//! sequence is strict and must not be reordered: score clock, head torque,
//! control translation, solver tick (contacts fire inside), score update,
//! terminal check.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ragdoll::{BodyPart, JointId};
use crate::rng::Mulberry32;
use crate::state::{GameState, KeyState, Observation};
use crate::world::RagdollWorld;

// ─── Stepping constants ───────────────────────────────────────────────

/// Fixed solver tick, seconds (25 Hz physics).
pub const PHYSICS_TIMESTEP: f32 = 0.04;

// Upright-head assist, applied until the runner falls.
const HEAD_TORQUE_GAIN: f32 = -4.0;
const HEAD_TORQUE_BIAS: f32 = 0.2;

// Motor speeds commanded by the four keys.
const HIP_DRIVE: f32 = 2.5;
const SHOULDER_DRIVE: f32 = 2.0;
const KNEE_DRIVE: f32 = 2.5;

// Hip ranges. O frees the left hip, P frees the right; with neither key
// held the defaults are rewritten every step.
const LEFT_HIP_DEFAULT: (f32, f32) = (-1.5, 0.5);
const RIGHT_HIP_DEFAULT: (f32, f32) = (-1.3, 0.7);
const LEFT_HIP_STRETCHED: (f32, f32) = (-1.0, 1.0);
const RIGHT_HIP_STRETCHED: (f32, f32) = (-0.8, 1.2);

// Off-course bounds reported by the observation, in score metres.
const DISTANCE_MIN: f32 = -10.0;
const DISTANCE_MAX: f32 = 105.0;
const SUCCESS_DISTANCE: f32 = 100.0;

pub struct QwopSim {
    world: Option<RagdollWorld>,
    state: Rc<RefCell<GameState>>,
    keys: KeyState,
    rng: Mulberry32,
    /// The original game gates stepping behind its start click; a headless
    /// instance is always "clicked".
    first_click: bool,
    hurdle_enabled: bool,
}

impl QwopSim {
    pub fn new() -> Self {
        QwopSim {
            world: None,
            state: Rc::new(RefCell::new(GameState::default())),
            keys: KeyState::default(),
            rng: Mulberry32::default(),
            first_click: true,
            hurdle_enabled: false,
        }
    }

    /// Rebuild the figure at the spawn pose. The world and track are
    /// created on the first call and reused afterwards; the high score
    /// survives. Returns a non-false sentinel like the original.
    pub fn reset(&mut self, seed: Option<u32>) -> bool {
        match self.world.as_mut() {
            Some(world) => world.clear_ragdoll(),
            None => self.world = Some(RagdollWorld::new(Rc::clone(&self.state))),
        }
        if let Some(seed) = seed {
            self.rng.reseed(seed);
        }

        let world = self.world.as_mut().expect("world exists after lazy init");
        world.build_ragdoll();
        if self.hurdle_enabled {
            world.build_hurdle();
        }

        self.state.borrow_mut().begin_episode();
        self.keys = KeyState::default();
        self.first_click = true;
        tracing::debug!(?seed, "Episode reset");
        true
    }

    /// Overwrite the held-key state.
    pub fn set_action(&mut self, q: bool, w: bool, o: bool, p: bool) -> bool {
        self.keys = KeyState { q, w, o, p };
        true
    }

    /// Advance exactly one tick. `dt` is the solver timestep (default
    /// 0.04 s); `time_dt` optionally decouples the score clock from the
    /// physics tick (default: `dt`). A no-op before the first reset.
    pub fn step(&mut self, dt: Option<f32>, time_dt: Option<f32>) -> bool {
        let Some(world) = self.world.as_mut() else {
            return true;
        };
        let dt = dt.unwrap_or(PHYSICS_TIMESTEP);
        let time_dt = time_dt.unwrap_or(dt);

        let (game_ended, fallen) = {
            let gs = self.state.borrow();
            (gs.game_ended, gs.fallen)
        };

        // 1. Score clock runs until the episode ends.
        if !game_ended {
            self.state.borrow_mut().score_time += time_dt;
        }

        // 2. Head-stabilising torque, until the runner is down.
        if !fallen {
            if let Some(angle) = world.body_angle(BodyPart::Head) {
                world.apply_torque(
                    BodyPart::Head,
                    HEAD_TORQUE_GAIN * (angle + HEAD_TORQUE_BIAS),
                );
            }
        }

        // 3. Keys become motor commands and hip limits.
        Self::apply_controls(world, self.keys);

        // 4. Solver tick; the contact listener mutates game state in here.
        if self.first_click {
            world.advance(dt);
        }

        // 5. Running score follows the torso while the episode is live.
        let torso_x = world.world_center_x(BodyPart::Torso);
        let mut gs = self.state.borrow_mut();
        if !gs.jump_landed && !gs.game_ended {
            if let Some(x) = torso_x {
                gs.record_score(x.round() / 10.0);
            }
        }

        // 6. Terminal check: a completed landing ends the run, otherwise a
        // fall does.
        if gs.jump_landed && !gs.game_ended {
            gs.finish();
        } else if !gs.jump_landed && !gs.game_ended && gs.fallen {
            gs.finish();
        }

        true
    }

    /// Q and W drive hips and shoulders against each other; O and P drive
    /// the knees and rewrite the hip ranges. Q beats W, O beats P, and the
    /// idle branches run every step, so hip limits are a pure function of
    /// the current keys.
    fn apply_controls(world: &mut RagdollWorld, keys: KeyState) {
        if keys.q {
            world.set_motor_target(JointId::RightHip, HIP_DRIVE);
            world.set_motor_target(JointId::LeftHip, -HIP_DRIVE);
            world.set_motor_target(JointId::RightShoulder, -SHOULDER_DRIVE);
            world.set_motor_target(JointId::LeftShoulder, SHOULDER_DRIVE);
        } else if keys.w {
            world.set_motor_target(JointId::RightHip, -HIP_DRIVE);
            world.set_motor_target(JointId::LeftHip, HIP_DRIVE);
            world.set_motor_target(JointId::RightShoulder, SHOULDER_DRIVE);
            world.set_motor_target(JointId::LeftShoulder, -SHOULDER_DRIVE);
        } else {
            world.set_motor_target(JointId::RightHip, 0.0);
            world.set_motor_target(JointId::LeftHip, 0.0);
            world.set_motor_target(JointId::RightShoulder, 0.0);
            world.set_motor_target(JointId::LeftShoulder, 0.0);
        }

        if keys.o {
            world.set_motor_target(JointId::RightKnee, KNEE_DRIVE);
            world.set_motor_target(JointId::LeftKnee, -KNEE_DRIVE);
            world.set_joint_limits(JointId::LeftHip, LEFT_HIP_STRETCHED.0, LEFT_HIP_STRETCHED.1);
            world.set_joint_limits(JointId::RightHip, RIGHT_HIP_DEFAULT.0, RIGHT_HIP_DEFAULT.1);
        } else if keys.p {
            world.set_motor_target(JointId::RightKnee, -KNEE_DRIVE);
            world.set_motor_target(JointId::LeftKnee, KNEE_DRIVE);
            world.set_joint_limits(JointId::LeftHip, LEFT_HIP_DEFAULT.0, LEFT_HIP_DEFAULT.1);
            world.set_joint_limits(JointId::RightHip, RIGHT_HIP_STRETCHED.0, RIGHT_HIP_STRETCHED.1);
        } else {
            world.set_motor_target(JointId::RightKnee, 0.0);
            world.set_motor_target(JointId::LeftKnee, 0.0);
            world.set_joint_limits(JointId::LeftHip, LEFT_HIP_DEFAULT.0, LEFT_HIP_DEFAULT.1);
            world.set_joint_limits(JointId::RightHip, RIGHT_HIP_DEFAULT.0, RIGHT_HIP_DEFAULT.1);
        }
    }

    /// Raw state record: 60 floats in construction order plus episode
    /// status. Read-only; tolerant of a missing figure (all zeros).
    pub fn observation(&self) -> Observation {
        let mut obs = vec![0.0f32; BodyPart::COUNT * 5];
        let mut torso_x = None;
        if let Some(world) = &self.world {
            for (i, part) in BodyPart::ALL.iter().enumerate() {
                if let Some(snapshot) = world.snapshot(*part) {
                    obs[i * 5..i * 5 + 5].copy_from_slice(&snapshot);
                }
            }
            torso_x = world.world_center_x(BodyPart::Torso);
        }

        let gs = self.state.borrow();
        let distance = torso_x.map_or(0.0, |x| x / 10.0);
        Observation {
            obs,
            distance,
            time: gs.score_time / 10.0,
            game_ended: gs.game_ended || distance < DISTANCE_MIN || distance > DISTANCE_MAX,
            success: distance > SUCCESS_DISTANCE,
            fallen: gs.fallen,
            jumped: gs.jumped,
            jump_landed: gs.jump_landed,
        }
    }

    /// Snapshot of the scoreboard and episode flags.
    pub fn game_state(&self) -> GameState {
        self.state.borrow().clone()
    }

    pub fn key_state(&self) -> KeyState {
        self.keys
    }

    /// Current angular limits of a joint; `None` before the first reset.
    pub fn joint_limits(&self, joint: JointId) -> Option<(f32, f32)> {
        self.world.as_ref()?.joint_limits(joint)
    }

    /// Currently commanded motor speed of a joint.
    pub fn motor_target(&self, joint: JointId) -> Option<f32> {
        self.world.as_ref()?.motor_target(joint)
    }

    /// Build the hurdle obstacle on subsequent resets. Off by default.
    pub fn enable_hurdle(&mut self, on: bool) {
        self.hurdle_enabled = on;
    }

    #[cfg(test)]
    fn place_torso(&mut self, x: f32) {
        if let Some(world) = self.world.as_mut() {
            world.place_part(BodyPart::Torso, x, -1.870951753395794, 0.0);
        }
    }
}

impl Default for QwopSim {
    fn default() -> Self {
        Self::new()
    }
}
