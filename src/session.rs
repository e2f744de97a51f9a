//! One run of the game: player, score, lives and the falling field
//!
//! Platform independent. The browser loop feeds it pointer/keyboard input and
//! frame deltas; the native build drives it headless.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::objects::{Catalogue, EntityFactory, Field, FieldEvent, Hitbox, Special};
use crate::render::Surface;
use crate::settings::Settings;

/// Player catcher dimensions (px)
pub const PLAYER_WIDTH: f32 = 80.0;
pub const PLAYER_HEIGHT: f32 = 24.0;
/// Gap between the catcher and the bottom edge
pub const PLAYER_BOTTOM_MARGIN: f32 = 20.0;
/// Keyboard movement per frame
pub const PLAYER_SPEED: f32 = 6.0;
/// Frames a speed boost lasts (5 seconds at 60 fps)
pub const SPEED_BOOST_FRAMES: f32 = 300.0;
/// Frames a bonus multiplier lasts
pub const BONUS_FRAMES: f32 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    GameOver,
}

/// The catcher at the bottom of the screen
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Center of the catcher
    pub pos: Vec2,
    pub size: Vec2,
}

impl Player {
    pub fn new(field_width: f32, field_height: f32) -> Self {
        Self {
            pos: Vec2::new(
                field_width / 2.0,
                field_height - PLAYER_BOTTOM_MARGIN - PLAYER_HEIGHT / 2.0,
            ),
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
        }
    }

    pub fn hitbox(&self) -> Hitbox {
        Hitbox::from_center(self.pos, self.size)
    }

    /// Jump to a pointer x, kept on screen
    pub fn move_to(&mut self, x: f32, field_width: f32) {
        let half = self.size.x / 2.0;
        self.pos.x = x.clamp(half, (field_width - half).max(half));
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        let hb = self.hitbox();
        surface.fill_rect(hb.min.x, hb.min.y, hb.width(), hb.height(), "#3b82f6");
    }
}

pub struct Session<R: Rng = Pcg32> {
    settings: Settings,
    pub factory: EntityFactory<R>,
    pub field: Field,
    pub player: Player,
    pub score: u64,
    pub lives: u32,
    pub phase: Phase,
    /// Frames survived
    pub frames: f32,
    boost_frames: f32,
    bonus_frames: f32,
}

impl Session<Pcg32> {
    pub fn new(settings: Settings, catalogue: Catalogue, seed: u64) -> Self {
        Self::with_factory(settings, EntityFactory::seeded(catalogue, seed))
    }
}

impl<R: Rng> Session<R> {
    pub fn with_factory(settings: Settings, factory: EntityFactory<R>) -> Self {
        let field = Field::new(settings.field_config());
        let player = Player::new(settings.canvas_width, settings.canvas_height);
        Self {
            lives: settings.lives,
            settings,
            factory,
            field,
            player,
            score: 0,
            phase: Phase::Playing,
            frames: 0.0,
            boost_frames: 0.0,
            bonus_frames: 0.0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Current global fall speed (60 frames per second of ramp)
    pub fn game_speed(&self) -> f32 {
        self.settings.game_speed_at(self.frames / 60.0)
    }

    pub fn speed_boosted(&self) -> bool {
        self.boost_frames > 0.0
    }

    pub fn pointer_at(&mut self, x: f32) {
        self.player.move_to(x, self.settings.canvas_width);
    }

    /// Keyboard steering: -1 left, +1 right
    pub fn steer(&mut self, direction: f32, delta_time: f32) {
        if direction == 0.0 || direction.is_nan() {
            return;
        }
        let mut speed = PLAYER_SPEED;
        if self.speed_boosted() {
            speed *= self.settings.speed_boost;
        }
        let x = self.player.pos.x + direction.signum() * speed * delta_time;
        self.player.move_to(x, self.settings.canvas_width);
    }

    /// Advance one frame (or `delta_time` frames). No-op after game over.
    pub fn step(&mut self, delta_time: f32) -> Vec<FieldEvent> {
        if self.phase == Phase::GameOver {
            return Vec::new();
        }

        self.frames += delta_time;
        self.boost_frames = (self.boost_frames - delta_time).max(0.0);
        self.bonus_frames = (self.bonus_frames - delta_time).max(0.0);

        let speed = self.game_speed();
        let player = self.player.hitbox();
        let events = self.field.step(&mut self.factory, &player, speed, delta_time);

        for event in &events {
            match event {
                FieldEvent::Hit { id, damage } => {
                    self.lives = self.lives.saturating_sub(*damage);
                    log::debug!("Hit by {} ({} lives left)", id, self.lives);
                }
                FieldEvent::Collected { points, special, .. } => {
                    let multiplier = if self.bonus_frames > 0.0 { 2 } else { 1 };
                    self.score += *points as u64 * multiplier;
                    match special {
                        Some(Special::SpeedBoost) => self.boost_frames = SPEED_BOOST_FRAMES,
                        Some(Special::BonusMultiplier) => self.bonus_frames = BONUS_FRAMES,
                        Some(Special::Other(name)) => log::debug!("Unhandled special: {}", name),
                        None => {}
                    }
                }
                FieldEvent::Spawned { .. } | FieldEvent::Missed { .. } => {}
            }
        }

        if self.lives == 0 {
            self.phase = Phase::GameOver;
            log::info!("Game over with score {}", self.score);
        }

        events
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        self.field.draw(surface);
        self.player.draw(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Category;
    use crate::render::CommandRecorder;

    fn quiet_settings() -> Settings {
        Settings {
            spawn_interval: 0.0,
            ..Default::default()
        }
    }

    /// Drop `key` directly above the player
    fn drop_on_player(session: &mut Session, category: Category, key: &str) {
        let entity = session.factory.create(category, Some(key)).unwrap();
        let lane = (session.player.pos.x / session.field.lane_width()) as u32;
        session.field.insert(entity, lane);
    }

    fn run_until_empty(session: &mut Session) -> Vec<FieldEvent> {
        let mut events = Vec::new();
        for _ in 0..2000 {
            events.extend(session.step(1.0));
            if session.field.is_empty() {
                break;
            }
        }
        events
    }

    #[test]
    fn test_player_starts_centered_at_bottom() {
        let session = Session::new(quiet_settings(), Catalogue::builtin(), 1);
        assert_eq!(session.player.pos, Vec2::new(200.0, 568.0));
        assert_eq!(session.lives, 3);
        assert_eq!(session.phase, Phase::Playing);
    }

    #[test]
    fn test_pointer_clamped_to_field() {
        let mut session = Session::new(quiet_settings(), Catalogue::builtin(), 1);
        session.pointer_at(-50.0);
        assert_eq!(session.player.pos.x, 40.0);
        session.pointer_at(1000.0);
        assert_eq!(session.player.pos.x, 360.0);
    }

    #[test]
    fn test_collect_scores_and_boosts() {
        let mut session = Session::new(quiet_settings(), Catalogue::builtin(), 1);
        drop_on_player(&mut session, Category::Collectible, "coffee");
        let events = run_until_empty(&mut session);
        assert!(events.iter().any(|e| matches!(e, FieldEvent::Collected { .. })));
        assert_eq!(session.score, 10);
        assert!(session.speed_boosted());
    }

    #[test]
    fn test_obstacles_end_the_run() {
        let mut session = Session::new(quiet_settings(), Catalogue::builtin(), 1);
        for _ in 0..3 {
            drop_on_player(&mut session, Category::Obstacle, "work");
            run_until_empty(&mut session);
        }
        assert_eq!(session.lives, 0);
        assert_eq!(session.phase, Phase::GameOver);
        assert!(session.step(1.0).is_empty());
    }

    #[test]
    fn test_steer_moves_player() {
        let mut session = Session::new(quiet_settings(), Catalogue::builtin(), 1);
        session.steer(1.0, 1.0);
        assert_eq!(session.player.pos.x, 200.0 + PLAYER_SPEED);
        session.steer(-1.0, 2.0);
        assert_eq!(session.player.pos.x, 200.0 - PLAYER_SPEED);
    }

    #[test]
    fn test_zero_steer_stays_put() {
        let mut session = Session::new(quiet_settings(), Catalogue::builtin(), 1);
        session.steer(0.0, 1.0);
        assert_eq!(session.player.pos.x, 200.0);
    }

    #[test]
    fn test_speed_ramps_with_time() {
        let mut session = Session::new(quiet_settings(), Catalogue::builtin(), 1);
        let start = session.game_speed();
        for _ in 0..600 {
            session.step(1.0);
        }
        assert!(session.game_speed() > start);
    }

    #[test]
    fn test_draw_includes_player() {
        let mut session = Session::new(Settings::default(), Catalogue::builtin(), 5);
        for _ in 0..120 {
            session.step(1.0);
        }
        let mut rec = CommandRecorder::default();
        session.draw(&mut rec);
        assert_eq!(rec.sprite_count(), session.field.len() + 1);
    }
}
