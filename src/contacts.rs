//! Begin-contact analysis.
//!
//! The solver calls into here synchronously during `World::step`; the
//! listener classifies track-vs-part pairs and forwards the rightmost
//! contact X to the game state. Everything else (part-vs-part, hurdle,
//! torso/thigh/calf scrapes) is ignored.

use std::cell::RefCell;
use std::rc::Rc;

use wrapped2d::b2;
use wrapped2d::dynamics::world::callbacks::ContactAccess;
use wrapped2d::user_data::UserData;

use crate::state::GameState;
use crate::world::{BodyTag, QwopUserData};

pub struct TrackContactListener {
    state: Rc<RefCell<GameState>>,
}

impl TrackContactListener {
    pub fn new(state: Rc<RefCell<GameState>>) -> Self {
        TrackContactListener { state }
    }
}

impl b2::ContactListener<QwopUserData> for TrackContactListener {
    fn begin_contact(&mut self, ca: ContactAccess<QwopUserData>) {
        let (part, part_body) = match (*ca.body_a.user_data(), *ca.body_b.user_data()) {
            (BodyTag::Track, BodyTag::Part(p)) => (p, &*ca.body_b),
            (BodyTag::Part(p), BodyTag::Track) => (p, &*ca.body_a),
            _ => return,
        };

        // Rightmost manifold point decides where the touch happened; an
        // empty manifold falls back to the part's centre of mass.
        let count = ca.contact.manifold().count.max(0) as usize;
        let max_x = if count == 0 {
            part_body.world_center().x
        } else {
            let world_manifold = ca.contact.world_manifold();
            world_manifold.points[..count.min(2)]
                .iter()
                .fold(f32::MIN, |max_x, p| max_x.max(p.x))
        };

        let mut gs = self.state.borrow_mut();
        if part.is_foot() {
            gs.on_foot_contact(max_x);
        } else if part.is_fall_part() {
            gs.on_upper_body_contact(max_x);
        }
    }

    fn end_contact(&mut self, _: ContactAccess<QwopUserData>) {
        // The original game does nothing on separation.
    }
}
