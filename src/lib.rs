//! Headless QWOP physics core in pure Rust using wrapped2d (Box2D).
//!
//! Reproduces the browser game's world exactly: a twelve-part ragdoll joined
//! by eleven revolute joints on a flat track, driven by the four-key Q/W/O/P
//! control scheme, stepped at a fixed 0.04 s tick with 5/5 solver iterations.
//! Contact analysis decides jumps, landings and falls; the exported
//! observation is the raw 60-float body state plus episode status.
//!
//! Every numeric constant here is load-bearing: training agents are
//! calibrated against the original game's trajectories, so spawn pose, joint
//! limits, motor torques and the fall/landing thresholds must not drift.
//!
//! One [`QwopSim`] instance is one independent world. Instances are not
//! `Send` (Box2D worlds contain raw pointers); for parallel rollouts create
//! one instance per thread.

pub mod contacts;
pub mod ragdoll;
pub mod rng;
pub mod sim;
pub mod state;
pub mod world;

pub use ragdoll::{BodyPart, JointId};
pub use rng::Mulberry32;
pub use sim::QwopSim;
pub use state::{GameState, KeyState, Observation};
