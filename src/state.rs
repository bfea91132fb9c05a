//! Episode state and the contact-driven transition rules.
//!
//! The jump/landing/fall decisions live here as plain methods on
//! [`GameState`] so they can be exercised without a physics world; the
//! contact listener only extracts a contact X and dispatches.

use serde::Serialize;

// ─── Course geometry (pixel space) ────────────────────────────────────

/// Pixels per metre. Contact thresholds below are defined in pixel space.
pub const WORLD_SCALE: f32 = 20.0;
/// Sand-pit X. A foot past this point completes the jump.
pub const SAND_PIT_X: f32 = 20000.0;
/// A foot within this many pixels before the pit arms the jump.
pub const JUMP_ARM_OFFSET: f32 = 220.0;

/// Per-episode scoreboard and flags. `high_score` is the only field that
/// survives a reset.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// In-world clock, seconds. Frozen once the game ends.
    pub score_time: f32,
    /// Distance score, metres (rounded to 0.1 m).
    pub score: f32,
    pub high_score: f32,
    pub game_ended: bool,
    pub fallen: bool,
    pub jumped: bool,
    pub jump_landed: bool,
}

impl GameState {
    /// Zero everything except the high score.
    pub(crate) fn begin_episode(&mut self) {
        *self = GameState {
            high_score: self.high_score,
            ..GameState::default()
        };
    }

    /// Write a new score, never letting the high score lag behind it.
    pub(crate) fn record_score(&mut self, metres: f32) {
        self.score = metres;
        if metres > self.high_score {
            self.high_score = metres;
        }
    }

    /// Terminal transition. Idempotent.
    pub(crate) fn finish(&mut self) {
        if self.game_ended {
            return;
        }
        self.game_ended = true;
        if self.score > self.high_score {
            self.high_score = self.score;
        }
        tracing::info!(
            score = self.score,
            high_score = self.high_score,
            time = self.score_time,
            fallen = self.fallen,
            landed = self.jump_landed,
            "Game over"
        );
    }

    /// A foot began touching the track at world X `max_x`.
    pub(crate) fn on_foot_contact(&mut self, max_x: f32) {
        if self.game_ended || self.fallen {
            return;
        }
        if !self.jumped && max_x * WORLD_SCALE > SAND_PIT_X - JUMP_ARM_OFFSET {
            self.jumped = true;
            tracing::debug!(x = max_x * WORLD_SCALE, "Jump armed");
        }
        if self.jumped && !self.jump_landed && max_x * WORLD_SCALE > SAND_PIT_X {
            self.jump_landed = true;
            self.record_score(max_x.round() / 10.0);
            tracing::info!(x = max_x * WORLD_SCALE, score = self.score, "Landed in the sand pit");
        }
    }

    /// Head, arm or forearm began touching the track at world X `max_x`.
    /// Bodies keep settling after the game ends; those late impacts must
    /// not touch the scoreboard.
    pub(crate) fn on_upper_body_contact(&mut self, max_x: f32) {
        if self.game_ended || self.fallen {
            return;
        }
        self.fallen = true;
        if self.jumped && !self.jump_landed {
            self.jump_landed = true;
        }
        self.record_score(max_x.round() / 10.0);
        tracing::info!(x = max_x * WORLD_SCALE, score = self.score, "Runner fell");
    }
}

/// The four control keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KeyState {
    pub q: bool,
    pub w: bool,
    pub o: bool,
    pub p: bool,
}

/// Fixed-shape state record handed to consumers. Units are raw world units;
/// callers do their own normalisation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// 60 floats: 12 parts x (centre x, centre y, angle, velocity x,
    /// velocity y), in construction order. Zeros before the first reset.
    pub obs: Vec<f32>,
    /// Torso X in score metres (world X / 10).
    pub distance: f32,
    /// Score time / 10.
    pub time: f32,
    /// Terminal flag, including the off-course distance bounds.
    pub game_ended: bool,
    /// Cleared the full course.
    pub success: bool,
    pub fallen: bool,
    pub jumped: bool,
    pub jump_landed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_arming_is_strictly_past_threshold() {
        let mut gs = GameState::default();
        // 989 * 20 == 19780 exactly: not armed yet.
        gs.on_foot_contact(989.0);
        assert!(!gs.jumped);
        gs.on_foot_contact(990.0);
        assert!(gs.jumped);
        assert!(!gs.jump_landed);
    }

    #[test]
    fn test_landing_is_strictly_past_pit() {
        let mut gs = GameState::default();
        gs.on_foot_contact(990.0);
        // 1000 * 20 == 20000 exactly: still airborne.
        gs.on_foot_contact(1000.0);
        assert!(gs.jumped && !gs.jump_landed);
        gs.on_foot_contact(1001.0);
        assert!(gs.jump_landed);
        assert_eq!(gs.score, 100.1);
        assert_eq!(gs.high_score, 100.1);
    }

    #[test]
    fn test_foot_contact_before_pit_scores_nothing() {
        let mut gs = GameState::default();
        gs.on_foot_contact(50.0);
        assert!(!gs.jumped && !gs.jump_landed);
        assert_eq!(gs.score, 0.0);
    }

    #[test]
    fn test_fall_sets_score_and_flags() {
        let mut gs = GameState::default();
        gs.on_upper_body_contact(4.6);
        assert!(gs.fallen);
        assert!(!gs.jump_landed, "no jump in flight, nothing to land");
        assert_eq!(gs.score, 0.5);
        assert_eq!(gs.high_score, 0.5);
    }

    #[test]
    fn test_fall_mid_jump_counts_as_landing() {
        let mut gs = GameState::default();
        gs.on_foot_contact(990.0);
        gs.on_upper_body_contact(995.0);
        assert!(gs.fallen && gs.jumped && gs.jump_landed);
        assert_eq!(gs.score, 99.5);
    }

    #[test]
    fn test_fall_transition_fires_once() {
        let mut gs = GameState::default();
        gs.on_upper_body_contact(10.0);
        let score = gs.score;
        gs.on_upper_body_contact(20.0);
        assert_eq!(gs.score, score, "second impact must not rescore");
    }

    #[test]
    fn test_terminal_state_ignores_late_impacts() {
        let mut gs = GameState::default();
        gs.on_foot_contact(990.0);
        gs.on_foot_contact(1001.0);
        gs.finish();
        let score = gs.score;
        gs.on_upper_body_contact(1005.0);
        assert!(!gs.fallen, "settling bodies must not flip flags");
        assert_eq!(gs.score, score);
    }

    #[test]
    fn test_feet_ignored_after_fall() {
        let mut gs = GameState::default();
        gs.on_upper_body_contact(10.0);
        gs.on_foot_contact(990.0);
        assert!(!gs.jumped);
    }

    #[test]
    fn test_finish_is_idempotent_and_raises_high_score() {
        let mut gs = GameState::default();
        gs.score = 3.0;
        gs.finish();
        assert!(gs.game_ended);
        assert_eq!(gs.high_score, 3.0);
        gs.score = 9.0;
        gs.finish();
        assert_eq!(gs.high_score, 3.0, "terminal state must not re-run");
    }

    #[test]
    fn test_begin_episode_keeps_high_score() {
        let mut gs = GameState::default();
        gs.on_upper_body_contact(12.0);
        gs.finish();
        gs.score_time = 4.0;
        let hs = gs.high_score;
        gs.begin_episode();
        assert_eq!(gs.high_score, hs);
        assert_eq!(gs.score, 0.0);
        assert_eq!(gs.score_time, 0.0);
        assert!(!gs.game_ended && !gs.fallen && !gs.jumped && !gs.jump_landed);
    }

    #[test]
    fn test_rounding_snaps_to_decimetres_away_from_zero() {
        let mut gs = GameState::default();
        gs.on_upper_body_contact(4.5);
        assert_eq!(gs.score, 0.5, "ties round away from zero");
    }

    #[test]
    fn test_record_shapes_use_game_field_names() {
        let gs = GameState::default();
        let v = serde_json::to_value(&gs).unwrap();
        for key in [
            "scoreTime",
            "score",
            "highScore",
            "gameEnded",
            "fallen",
            "jumped",
            "jumpLanded",
        ] {
            assert!(v.get(key).is_some(), "missing {key}");
        }

        let obs = Observation {
            obs: vec![0.0; 60],
            distance: 0.0,
            time: 0.0,
            game_ended: false,
            success: false,
            fallen: false,
            jumped: false,
            jump_landed: false,
        };
        let v = serde_json::to_value(&obs).unwrap();
        for key in ["obs", "distance", "time", "gameEnded", "success", "jumpLanded"] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
    }
}
