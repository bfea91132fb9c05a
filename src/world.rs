//! Physics world construction and access.
//!
//! [`RagdollWorld`] owns the Box2D world, the track, the twelve-part figure
//! and the optional hurdle. It is rebuilt per episode by the simulator:
//! the world and track persist, the figure (and hurdle) are torn down and
//! recreated from the tables in [`crate::ragdoll`].

use std::cell::RefCell;
use std::rc::Rc;

use wrapped2d::b2;
use wrapped2d::user_data::UserDataTypes;

use crate::contacts::TrackContactListener;
use crate::ragdoll::{BodyPart, JointId, JOINT_DEFS, PART_DEFS};
use crate::state::GameState;

// ─── World constants ──────────────────────────────────────────────────

/// Gravity, m/s². This world is screen-space: +y points down.
const GRAVITY: f32 = 10.0;

const TRACK_Y: f32 = 10.74275;
const TRACK_HALF_WIDTH: f32 = 16.0;
const TRACK_HALF_HEIGHT: f32 = 1.6;
const TRACK_SEGMENTS: usize = 3;
const TRACK_FRICTION: f32 = 0.2;
const TRACK_DENSITY: f32 = 30.0;

const VELOCITY_ITERATIONS: i32 = 5;
const POSITION_ITERATIONS: i32 = 5;

const CATEGORY_TRACK: u16 = 0x0001;
const CATEGORY_PLAYER: u16 = 0x0002;
const CATEGORY_HURDLE: u16 = 0x0004;
const MASK_ALL: u16 = 0xFFFF;
/// Everything except category 2: the figure does not self-collide.
const MASK_NO_SELF: u16 = 0xFFFD;
const MASK_HURDLE_BASE: u16 = 0xFFF9;
const MASK_HURDLE_TOP: u16 = 0xFFFB;

// Hurdle placement (original pixel values divided by the 20 px/m scale).
const HURDLE_BASE_POS: [f32; 2] = [500.0, 8.775];
const HURDLE_BASE_HALF: [f32; 2] = [1.675, 0.3];
const HURDLE_TOP_POS: [f32; 2] = [500.865, 5.0575];
const HURDLE_TOP_HALF: [f32; 2] = [0.5375, 3.65];
/// Pivot of the swinging top bar, in the top bar's local frame.
const HURDLE_PIVOT_LOCAL: [f32; 2] = [0.18, 3.73];

/// Body tags, read back by the contact listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyTag {
    Track,
    Part(BodyPart),
    HurdleBase,
    HurdleTop,
}

/// wrapped2d user-data wiring: every body carries a [`BodyTag`].
pub struct QwopUserData;

impl UserDataTypes for QwopUserData {
    type BodyData = BodyTag;
    type JointData = ();
    type FixtureData = ();
}

struct Hurdle {
    base: b2::BodyHandle,
    top: b2::BodyHandle,
    joint: b2::JointHandle,
}

pub struct RagdollWorld {
    world: b2::World<QwopUserData>,
    bodies: [Option<b2::BodyHandle>; BodyPart::COUNT],
    joints: [Option<b2::JointHandle>; JointId::COUNT],
    hurdle: Option<Hurdle>,
}

impl RagdollWorld {
    /// Create the world, the track and the contact listener. The figure is
    /// not built yet; call [`RagdollWorld::build_ragdoll`].
    pub fn new(state: Rc<RefCell<GameState>>) -> Self {
        let gravity = b2::Vec2 { x: 0.0, y: GRAVITY };
        let mut world = b2::World::<QwopUserData>::new(&gravity);
        world.set_contact_listener(Box::new(TrackContactListener::new(state)));

        let mut this = RagdollWorld {
            world,
            bodies: [None; BodyPart::COUNT],
            joints: [None; JointId::COUNT],
            hurdle: None,
        };
        this.create_track();
        this
    }

    fn create_track(&mut self) {
        for i in 0..TRACK_SEGMENTS {
            let def = b2::BodyDef {
                body_type: b2::BodyType::Static,
                position: b2::Vec2 {
                    x: i as f32 * 2.0 * TRACK_HALF_WIDTH,
                    y: TRACK_Y,
                },
                ..b2::BodyDef::new()
            };
            let handle = self.world.create_body_with(&def, BodyTag::Track);
            let shape = b2::PolygonShape::new_box(TRACK_HALF_WIDTH, TRACK_HALF_HEIGHT);
            self.world.body_mut(handle).create_fixture(
                &shape,
                &mut b2::FixtureDef {
                    friction: TRACK_FRICTION,
                    restitution: 0.0,
                    density: TRACK_DENSITY,
                    filter: b2::Filter {
                        category_bits: CATEGORY_TRACK,
                        mask_bits: MASK_ALL,
                        group_index: 0,
                    },
                    ..b2::FixtureDef::new()
                },
            );
        }
        tracing::debug!(segments = TRACK_SEGMENTS, "Track created");
    }

    /// Build the twelve parts, then the eleven joints, in table order.
    pub fn build_ragdoll(&mut self) {
        for def in &PART_DEFS {
            let body_def = b2::BodyDef {
                body_type: b2::BodyType::Dynamic,
                position: b2::Vec2 { x: def.x, y: def.y },
                angle: def.angle,
                ..b2::BodyDef::new()
            };
            let handle = self.world.create_body_with(&body_def, BodyTag::Part(def.part));
            let shape = b2::PolygonShape::new_box(def.half_width, def.half_height);
            self.world.body_mut(handle).create_fixture(
                &shape,
                &mut b2::FixtureDef {
                    density: def.density,
                    friction: def.friction,
                    restitution: 0.0,
                    filter: b2::Filter {
                        category_bits: CATEGORY_PLAYER,
                        mask_bits: MASK_NO_SELF,
                        group_index: 0,
                    },
                    ..b2::FixtureDef::new()
                },
            );
            self.bodies[def.part as usize] = Some(handle);
        }

        for def in &JOINT_DEFS {
            let body_a = self.bodies[def.body_a as usize].expect("bodies are built before joints");
            let body_b = self.bodies[def.body_b as usize].expect("bodies are built before joints");

            // Per-body world anchors become local anchors in each body's
            // spawn frame.
            let local_a = self.world.body(body_a).local_point(&b2::Vec2 {
                x: def.anchor_a[0],
                y: def.anchor_a[1],
            });
            let local_b = self.world.body(body_b).local_point(&b2::Vec2 {
                x: def.anchor_b[0],
                y: def.anchor_b[1],
            });

            let mut joint_def = b2::RevoluteJointDef::new(body_a, body_b);
            joint_def.local_anchor_a = local_a;
            joint_def.local_anchor_b = local_b;
            joint_def.reference_angle = def.reference_angle;
            joint_def.enable_limit = true;
            joint_def.lower_angle = def.lower_angle;
            joint_def.upper_angle = def.upper_angle;
            joint_def.enable_motor = def.enable_motor;
            joint_def.motor_speed = 0.0;
            joint_def.max_motor_torque = def.max_motor_torque;

            self.joints[def.joint as usize] = Some(self.world.create_joint(&joint_def));
        }

        tracing::debug!(
            bodies = PART_DEFS.len(),
            joints = JOINT_DEFS.len(),
            "Ragdoll assembled"
        );
    }

    /// Destroy the figure (joints first, then bodies) and the hurdle. The
    /// world and track stay.
    pub fn clear_ragdoll(&mut self) {
        for slot in self.joints.iter_mut() {
            if let Some(handle) = slot.take() {
                self.world.destroy_joint(handle);
            }
        }
        for slot in self.bodies.iter_mut() {
            if let Some(handle) = slot.take() {
                self.world.destroy_body(handle);
            }
        }
        self.clear_hurdle();
    }

    /// Two-part hurdle: an inert base and a top bar that swings on a hinge
    /// when the runner clips it. Both are dynamic props that spawn asleep,
    /// so the whole thing can be knocked loose on impact.
    pub fn build_hurdle(&mut self) {
        let base_def = b2::BodyDef {
            body_type: b2::BodyType::Dynamic,
            position: b2::Vec2 { x: HURDLE_BASE_POS[0], y: HURDLE_BASE_POS[1] },
            awake: false,
            ..b2::BodyDef::new()
        };
        let base = self.world.create_body_with(&base_def, BodyTag::HurdleBase);
        let base_shape = b2::PolygonShape::new_box(HURDLE_BASE_HALF[0], HURDLE_BASE_HALF[1]);
        self.world.body_mut(base).create_fixture(
            &base_shape,
            &mut b2::FixtureDef {
                friction: TRACK_FRICTION,
                restitution: 0.0,
                density: 1.0,
                filter: b2::Filter {
                    category_bits: CATEGORY_HURDLE,
                    mask_bits: MASK_HURDLE_BASE,
                    group_index: 0,
                },
                ..b2::FixtureDef::new()
            },
        );

        let top_def = b2::BodyDef {
            body_type: b2::BodyType::Dynamic,
            position: b2::Vec2 { x: HURDLE_TOP_POS[0], y: HURDLE_TOP_POS[1] },
            awake: false,
            ..b2::BodyDef::new()
        };
        let top = self.world.create_body_with(&top_def, BodyTag::HurdleTop);
        let top_shape = b2::PolygonShape::new_box(HURDLE_TOP_HALF[0], HURDLE_TOP_HALF[1]);
        self.world.body_mut(top).create_fixture(
            &top_shape,
            &mut b2::FixtureDef {
                friction: TRACK_FRICTION,
                restitution: 0.0,
                density: 1.0,
                filter: b2::Filter {
                    category_bits: CATEGORY_HURDLE,
                    mask_bits: MASK_HURDLE_TOP,
                    group_index: 0,
                },
                ..b2::FixtureDef::new()
            },
        );

        let pivot = self.world.body(top).world_point(&b2::Vec2 {
            x: HURDLE_PIVOT_LOCAL[0],
            y: HURDLE_PIVOT_LOCAL[1],
        });
        let local_a = self.world.body(top).local_point(&pivot);
        let local_b = self.world.body(base).local_point(&pivot);

        let mut joint_def = b2::RevoluteJointDef::new(top, base);
        joint_def.local_anchor_a = local_a;
        joint_def.local_anchor_b = local_b;
        // One half-turn each way, the original's exact constant.
        joint_def.enable_limit = true;
        joint_def.lower_angle = -3.14159;
        joint_def.upper_angle = 3.14159;
        let joint = self.world.create_joint(&joint_def);

        self.hurdle = Some(Hurdle { base, top, joint });
        tracing::debug!(x = HURDLE_BASE_POS[0], "Hurdle created");
    }

    fn clear_hurdle(&mut self) {
        if let Some(hurdle) = self.hurdle.take() {
            self.world.destroy_joint(hurdle.joint);
            self.world.destroy_body(hurdle.top);
            self.world.destroy_body(hurdle.base);
        }
    }

    /// One solver tick. Contact callbacks fire synchronously in here.
    pub fn advance(&mut self, dt: f32) {
        self.world.step(dt, VELOCITY_ITERATIONS, POSITION_ITERATIONS);
    }

    /// `(centre x, centre y, angle, velocity x, velocity y)` for one part.
    pub fn snapshot(&self, part: BodyPart) -> Option<[f32; 5]> {
        let handle = self.bodies[part as usize]?;
        let body = self.world.body(handle);
        let centre = *body.world_center();
        let velocity = *body.linear_velocity();
        Some([centre.x, centre.y, body.angle(), velocity.x, velocity.y])
    }

    pub fn world_center_x(&self, part: BodyPart) -> Option<f32> {
        let handle = self.bodies[part as usize]?;
        Some(self.world.body(handle).world_center().x)
    }

    pub fn body_angle(&self, part: BodyPart) -> Option<f32> {
        let handle = self.bodies[part as usize]?;
        Some(self.world.body(handle).angle())
    }

    pub fn apply_torque(&mut self, part: BodyPart, torque: f32) {
        if let Some(handle) = self.bodies[part as usize] {
            self.world.body_mut(handle).apply_torque(torque, true);
        }
    }

    pub fn set_motor_target(&mut self, joint: JointId, speed: f32) {
        self.with_revolute_mut(joint, |revolute| revolute.set_motor_speed(speed));
    }

    pub fn set_joint_limits(&mut self, joint: JointId, lower: f32, upper: f32) {
        self.with_revolute_mut(joint, |revolute| revolute.set_limits(lower, upper));
    }

    pub fn joint_limits(&self, joint: JointId) -> Option<(f32, f32)> {
        self.with_revolute(joint, |revolute| {
            (revolute.lower_limit(), revolute.upper_limit())
        })
    }

    /// Commanded motor speed (the target, not the measured joint speed).
    pub fn motor_target(&self, joint: JointId) -> Option<f32> {
        self.with_revolute(joint, |revolute| revolute.motor_speed())
    }

    fn with_revolute<R>(
        &self,
        joint: JointId,
        f: impl FnOnce(&b2::RevoluteJoint) -> R,
    ) -> Option<R> {
        let handle = self.joints[joint as usize]?;
        let joint_ref = self.world.joint(handle);
        if let b2::UnknownJoint::Revolute(ref revolute) = **joint_ref {
            Some(f(revolute))
        } else {
            None
        }
    }

    fn with_revolute_mut<R>(
        &mut self,
        joint: JointId,
        f: impl FnOnce(&mut b2::RevoluteJoint) -> R,
    ) -> Option<R> {
        let handle = self.joints[joint as usize]?;
        let mut joint_ref = self.world.joint_mut(handle);
        if let b2::UnknownJoint::Revolute(ref mut revolute) = **joint_ref {
            Some(f(revolute))
        } else {
            None
        }
    }

    #[cfg(test)]
    pub(crate) fn place_part(&mut self, part: BodyPart, x: f32, y: f32, angle: f32) {
        if let Some(handle) = self.bodies[part as usize] {
            self.world.body_mut(handle).set_transform(&b2::Vec2 { x, y }, angle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ragdoll::{JOINT_DEFS, PART_DEFS};

    fn fresh_world() -> RagdollWorld {
        let state = Rc::new(RefCell::new(GameState::default()));
        let mut world = RagdollWorld::new(state);
        world.build_ragdoll();
        world
    }

    #[test]
    fn test_spawn_pose_matches_tables() {
        let world = fresh_world();
        for def in &PART_DEFS {
            let snap = world.snapshot(def.part).unwrap();
            assert_eq!(snap[0], def.x, "{} x", def.part.name());
            assert_eq!(snap[1], def.y, "{} y", def.part.name());
            assert_eq!(snap[2], def.angle, "{} angle", def.part.name());
            assert_eq!(snap[3], 0.0, "{} vx", def.part.name());
            assert_eq!(snap[4], 0.0, "{} vy", def.part.name());
        }
    }

    #[test]
    fn test_joint_limits_match_tables() {
        let world = fresh_world();
        for def in &JOINT_DEFS {
            let (lower, upper) = world.joint_limits(def.joint).unwrap();
            assert_eq!(lower, def.lower_angle, "{}", def.joint.name());
            assert_eq!(upper, def.upper_angle, "{}", def.joint.name());
        }
    }

    #[test]
    fn test_motors_start_stopped() {
        let world = fresh_world();
        for def in &JOINT_DEFS {
            assert_eq!(world.motor_target(def.joint), Some(0.0), "{}", def.joint.name());
        }
    }

    #[test]
    fn test_rebuild_restores_spawn_pose() {
        let mut world = fresh_world();
        for _ in 0..10 {
            world.advance(0.04);
        }
        let moved = world.snapshot(BodyPart::Head).unwrap();
        assert_ne!(moved[1], PART_DEFS[1].y, "figure should move under gravity");

        world.clear_ragdoll();
        world.build_ragdoll();
        for def in &PART_DEFS {
            let snap = world.snapshot(def.part).unwrap();
            assert_eq!(snap[0], def.x, "{} x after rebuild", def.part.name());
            assert_eq!(snap[2], def.angle, "{} angle after rebuild", def.part.name());
        }
    }

    #[test]
    fn test_limit_overwrite_and_readback() {
        let mut world = fresh_world();
        world.set_joint_limits(JointId::LeftHip, -1.0, 1.0);
        assert_eq!(world.joint_limits(JointId::LeftHip), Some((-1.0, 1.0)));
        world.set_joint_limits(JointId::LeftHip, -1.5, 0.5);
        assert_eq!(world.joint_limits(JointId::LeftHip), Some((-1.5, 0.5)));
    }

    #[test]
    fn test_cleared_figure_reads_none() {
        let mut world = fresh_world();
        world.clear_ragdoll();
        assert!(world.snapshot(BodyPart::Torso).is_none());
        assert!(world.joint_limits(JointId::Neck).is_none());
    }

    #[test]
    fn test_hurdle_lifecycle() {
        let mut world = fresh_world();
        world.build_hurdle();
        assert!(world.hurdle.is_some());
        world.clear_ragdoll();
        assert!(world.hurdle.is_none());
        world.build_ragdoll();
        world.build_hurdle();
        for _ in 0..5 {
            world.advance(0.04);
        }
    }
}
