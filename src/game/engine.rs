use super::{
    action::{Action, Direction},
    config::GameConfig,
    particles::ParticleColor,
    state::{CollisionType, GameState, Position, PowerUp, PowerUpKind, Snake},
};
use crate::audio::SoundCue;
use crate::storage::HighScoreStore;
use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Information about a tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate food this tick
    pub ate_food: bool,
    /// Power-ups collected this tick, in pickup order
    pub collected: Vec<PowerUpKind>,
    /// Power-up placed on the board this tick
    pub spawned: Option<PowerUpKind>,
    /// Effects that ran out at the start of this tick
    pub expired: Vec<PowerUpKind>,
    /// Type of collision if one occurred
    pub collision_type: Option<CollisionType>,
    /// No free cell was left for food
    pub board_full: bool,
}

/// Result of a game tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepResult {
    /// Whether the simulation actually advanced (it does not while paused,
    /// over, or not yet started)
    pub advanced: bool,
    /// Whether the game ended on this tick
    pub terminated: bool,
    /// Sound cues to play, in the order they were triggered
    pub cues: Vec<SoundCue>,
    /// Additional information about the tick
    pub info: StepInfo,
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
    store: Box<dyn HighScoreStore>,
    next_power_up_id: u64,
}

impl GameEngine {
    /// Create a new game engine with the given configuration and high score slot
    ///
    /// Fails if the configuration does not pass [`GameConfig::validate`].
    pub fn new(config: GameConfig, store: Box<dyn HighScoreStore>) -> Result<Self> {
        Self::with_rng(config, store, StdRng::from_entropy())
    }

    /// Create an engine whose random choices are reproducible
    pub fn with_seed(
        config: GameConfig,
        store: Box<dyn HighScoreStore>,
        seed: u64,
    ) -> Result<Self> {
        Self::with_rng(config, store, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, store: Box<dyn HighScoreStore>, rng: StdRng) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            store,
            next_power_up_id: 0,
        })
    }

    /// Build the title-screen state, reading the persisted high score
    pub fn initial_state(&mut self) -> GameState {
        let high_score = self.store.load();
        info!(high_score, "Loaded high score");
        self.fresh_state(high_score)
    }

    /// A fresh, not yet started board that keeps `high_score`
    fn fresh_state(&mut self, high_score: u32) -> GameState {
        let snake = Snake::new(
            Position::new(self.config.start_x, self.config.start_y),
            Direction::Right,
            1,
        );
        let mut state = GameState::new(
            snake,
            Position::new(self.config.start_x, self.config.start_y),
            self.config.grid_size,
            self.config.initial_interval(),
            self.config.max_particles,
        );
        state.high_score = high_score;
        state.food = match self.random_free_cell(&state) {
            Some(pos) => pos,
            // validate() requires at least a 2x2 grid, so a one-segment
            // snake always leaves a free cell
            None => unreachable!(
                "no free cell on a fresh {}x{} board",
                state.grid_size, state.grid_size
            ),
        };
        state
    }

    /// Apply a logical input action
    ///
    /// Returns true if the action changed the state.
    pub fn apply(&mut self, state: &mut GameState, action: Action) -> bool {
        match action {
            Action::Move(direction) => {
                if !state.is_running() || state.snake.direction.is_opposite(direction) {
                    return false;
                }
                state.pending_direction = Some(direction);
                true
            }
            Action::TogglePause => {
                if !state.is_started || state.is_over {
                    return false;
                }
                state.set_paused(!state.is_paused);
                debug!(paused = state.is_paused, "Pause toggled");
                true
            }
            Action::Start => {
                *state = self.fresh_state(state.high_score);
                state.set_started(true);
                info!(
                    interval_ms = state.interval.as_millis() as u64,
                    "Game started"
                );
                true
            }
            Action::Reset => {
                *state = self.fresh_state(state.high_score);
                debug!("Game reset to title screen");
                true
            }
        }
    }

    /// Execute one tick of the game
    pub fn tick(&mut self, state: &mut GameState) -> StepResult {
        let mut result = StepResult::default();
        if !state.is_running() {
            return result;
        }
        result.advanced = true;

        state.clock += state.interval;
        result.info.expired = state.effects.expire(state.clock);
        for kind in &result.info.expired {
            debug!(?kind, "Effect expired");
        }

        // Queued turn, re-checked against the heading it is applied to
        if let Some(direction) = state.pending_direction.take() {
            if !state.snake.direction.is_opposite(direction) {
                state.snake.direction = direction;
            }
        }

        let new_head = state.snake.head().moved_in_direction(state.snake.direction);

        let collision = if state.effects.is_active(PowerUpKind::Shield) {
            None
        } else {
            self.check_collision(state, new_head)
        };
        if let Some(collision_type) = collision {
            result.info.collision_type = Some(collision_type);
            self.finish_game(state, new_head, &mut result);
            return result;
        }

        let ate_food = new_head == state.food;
        state.snake.advance(new_head, ate_food);

        if ate_food {
            result.info.ate_food = true;
            self.eat_food(state, &mut result);
            if result.terminated {
                return result;
            }
        }

        self.collect_power_ups(state, new_head, &mut result);

        result
    }

    /// Advance particle effects by one animation frame
    pub fn update_particles(&self, state: &mut GameState) {
        state.particles.update(self.config.particle_decay);
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, state: &GameState, pos: Position) -> Option<CollisionType> {
        // Check wall collision
        if !state.is_in_bounds(pos) {
            return Some(CollisionType::Wall);
        }

        // Check self-collision
        if state.is_occupied_by_snake(pos) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    fn eat_food(&mut self, state: &mut GameState, result: &mut StepResult) {
        let eaten_at = state.food;
        state.set_score(state.score + self.config.food_reward);
        result.cues.push(SoundCue::Eat);
        state.particles.burst(
            &mut self.rng,
            eaten_at,
            ParticleColor::Green,
            self.config.eat_particles,
        );
        state.interval = state
            .interval
            .saturating_sub(self.config.interval_step())
            .max(self.config.min_interval());

        debug!(
            score = state.score,
            length = state.snake.len(),
            interval_ms = state.interval.as_millis() as u64,
            "Food eaten"
        );

        match self.random_free_cell(state) {
            Some(pos) => state.food = pos,
            None => {
                result.info.board_full = true;
                info!(length = state.snake.len(), "No free cell left for food");
                self.finish_game(state, eaten_at, result);
                return;
            }
        }

        if self.rng.gen_bool(self.config.power_up_chance) {
            result.info.spawned = self.spawn_power_up(state);
        }
    }

    fn spawn_power_up(&mut self, state: &mut GameState) -> Option<PowerUpKind> {
        let kind = PowerUpKind::ALL[self.rng.gen_range(0..PowerUpKind::ALL.len())];
        let position = self.random_free_cell(state)?;

        let id = self.next_power_up_id;
        self.next_power_up_id += 1;
        state.add_power_up(PowerUp {
            id,
            kind,
            position,
            duration: self.config.power_up_duration(),
        });

        debug!(?kind, x = position.x, y = position.y, "Power-up spawned");
        Some(kind)
    }

    fn collect_power_ups(&mut self, state: &mut GameState, head: Position, result: &mut StepResult) {
        let hits: Vec<u64> = state
            .power_ups
            .iter()
            .filter(|p| p.position == head)
            .map(|p| p.id)
            .collect();

        for id in hits {
            let Some(power_up) = state.remove_power_up(id) else {
                continue;
            };

            state
                .effects
                .activate(power_up.kind, state.clock + power_up.duration);
            state.particles.burst(
                &mut self.rng,
                power_up.position,
                ParticleColor::Blue,
                self.config.pickup_particles,
            );
            result.cues.push(SoundCue::PowerUp);
            result.info.collected.push(power_up.kind);

            match power_up.kind {
                PowerUpKind::Speed => {
                    state.interval = state
                        .interval
                        .mul_f64(self.config.speed_multiplier)
                        .max(self.config.min_interval());
                }
                PowerUpKind::Slow => {
                    state.interval = state
                        .interval
                        .mul_f64(self.config.slow_multiplier)
                        .max(self.config.min_interval());
                }
                PowerUpKind::Points => {
                    state.set_score(state.score + self.config.points_bonus);
                }
                PowerUpKind::Shield => {}
            }

            debug!(
                kind = ?power_up.kind,
                score = state.score,
                interval_ms = state.interval.as_millis() as u64,
                "Power-up collected"
            );
        }
    }

    /// End the game: record the high score, burst at `at`, cue the sound
    ///
    /// A burst aimed off the grid is moved to the head so it stays visible.
    fn finish_game(&mut self, state: &mut GameState, at: Position, result: &mut StepResult) {
        state.set_over(true);
        result.terminated = true;

        if state.score > state.high_score {
            // set_high_score logs a failed write; play carries on
            if state.set_high_score(self.store.as_mut(), state.score).is_ok() {
                info!(high_score = state.high_score, "New high score");
            }
        }

        let origin = if state.is_in_bounds(at) {
            at
        } else {
            state.snake.head()
        };
        state.particles.burst(
            &mut self.rng,
            origin,
            ParticleColor::Red,
            self.config.death_particles,
        );
        result.cues.push(SoundCue::GameOver);

        info!(
            score = state.score,
            length = state.snake.len(),
            collision = ?result.info.collision_type,
            "Game over"
        );
    }

    /// Pick a random cell free of snake, food and power-ups
    ///
    /// Tries a bounded number of random draws, then falls back to choosing
    /// among the free cells directly. Returns None if the board is full.
    fn random_free_cell(&mut self, state: &GameState) -> Option<Position> {
        let size = self.config.grid_size as i32;

        for _ in 0..self.config.spawn_attempts {
            let pos = Position::new(self.rng.gen_range(0..size), self.rng.gen_range(0..size));
            if !state.is_occupied(pos) {
                return Some(pos);
            }
        }

        let free: Vec<Position> = (0..size)
            .flat_map(|y| (0..size).map(move |x| Position::new(x, y)))
            .filter(|pos| !state.is_occupied(*pos))
            .collect();

        if free.is_empty() {
            None
        } else {
            Some(free[self.rng.gen_range(0..free.len())])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryHighScoreStore;
    use std::time::Duration;

    fn quiet_config() -> GameConfig {
        GameConfig {
            power_up_chance: 0.0,
            ..GameConfig::default()
        }
    }

    fn engine_with(config: GameConfig, high_score: u32) -> GameEngine {
        GameEngine::with_seed(config, Box::new(MemoryHighScoreStore::new(high_score)), 42)
            .unwrap()
    }

    fn started(engine: &mut GameEngine) -> GameState {
        let mut state = engine.initial_state();
        engine.apply(&mut state, Action::Start);
        state
    }

    fn place_power_up(state: &mut GameState, id: u64, kind: PowerUpKind, position: Position) {
        state.add_power_up(PowerUp {
            id,
            kind,
            position,
            duration: Duration::from_millis(5000),
        });
    }

    fn assert_interval_ms(state: &GameState, expected: f64) {
        let actual = state.interval.as_secs_f64() * 1000.0;
        assert!(
            (actual - expected).abs() < 1e-3,
            "interval {actual}ms, expected {expected}ms"
        );
    }

    #[test]
    fn test_initial_state() {
        let mut engine = engine_with(quiet_config(), 70);
        let state = engine.initial_state();

        assert!(!state.is_started);
        assert!(!state.is_over);
        assert_eq!(state.score, 0);
        assert_eq!(state.high_score, 70);
        assert_eq!(state.snake.body, vec![Position::new(10, 10)]);
        assert_eq!(state.snake.direction, Direction::Right);
        assert_ne!(state.food, Position::new(10, 10));
    }

    #[test]
    fn test_tick_ignored_before_start() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = engine.initial_state();

        let result = engine.tick(&mut state);
        assert!(!result.advanced);
        assert_eq!(state.snake.head(), Position::new(10, 10));
    }

    #[test]
    fn test_basic_movement() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);
        state.food = Position::new(0, 0);

        let result = engine.tick(&mut state);

        assert!(result.advanced);
        assert!(!result.terminated);
        assert!(!result.info.ate_food);
        assert_eq!(state.snake.body, vec![Position::new(11, 10)]);
        assert_eq!(state.clock, Duration::from_millis(150));
    }

    #[test]
    fn test_eating_food_grows_and_scores() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);
        state.food = Position::new(11, 10);

        let result = engine.tick(&mut state);

        assert!(result.info.ate_food);
        assert_eq!(
            state.snake.body,
            vec![Position::new(11, 10), Position::new(10, 10)]
        );
        assert_eq!(state.score, 10);
        assert_ne!(state.food, Position::new(11, 10));
        assert_ne!(state.food, Position::new(10, 10));
        assert_eq!(state.interval, Duration::from_millis(145));
        assert_eq!(result.cues, vec![SoundCue::Eat]);
        assert_eq!(state.particles.len(), 10);
    }

    #[test]
    fn test_interval_floor_on_food() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);
        state.interval = Duration::from_millis(52);
        state.food = Position::new(11, 10);

        engine.tick(&mut state);
        assert_eq!(state.interval, Duration::from_millis(50));
    }

    #[test]
    fn test_wall_collision_updates_high_score() {
        let mut engine = engine_with(quiet_config(), 30);
        let mut state = started(&mut engine);
        state.snake = Snake::new(Position::new(0, 5), Direction::Left, 1);
        state.food = Position::new(15, 15);
        state.score = 50;

        let result = engine.tick(&mut state);

        assert!(result.terminated);
        assert!(state.is_over);
        assert_eq!(result.info.collision_type, Some(CollisionType::Wall));
        assert_eq!(state.high_score, 50);
        assert_eq!(engine.store.load(), 50);
        assert_eq!(result.cues, vec![SoundCue::GameOver]);
        assert_eq!(state.particles.len(), 20);
        // The burst is pulled back onto the grid, at the last head cell
        assert!(
            state
                .particles
                .particles()
                .iter()
                .all(|p| p.cell() == Position::new(0, 5))
        );
    }

    #[test]
    fn test_engine_rejects_invalid_config() {
        let config = GameConfig {
            grid_size: 1,
            start_x: 0,
            start_y: 0,
            ..quiet_config()
        };
        assert!(
            GameEngine::with_seed(config, Box::new(MemoryHighScoreStore::new(0)), 1).is_err()
        );

        let config = GameConfig {
            speed_multiplier: -0.5,
            ..quiet_config()
        };
        assert!(GameEngine::new(config, Box::new(MemoryHighScoreStore::new(0))).is_err());
    }

    #[test]
    fn test_smallest_board_food_avoids_snake() {
        let config = GameConfig {
            grid_size: 2,
            start_x: 0,
            start_y: 0,
            ..quiet_config()
        };
        let mut engine = engine_with(config, 0);

        for _ in 0..20 {
            let state = engine.initial_state();
            assert_ne!(state.food, state.snake.head());
            assert!(state.is_in_bounds(state.food));
        }
    }

    #[test]
    fn test_game_over_keeps_higher_high_score() {
        let mut engine = engine_with(quiet_config(), 100);
        let mut state = started(&mut engine);
        state.snake = Snake::new(Position::new(0, 5), Direction::Left, 1);
        state.score = 20;

        engine.tick(&mut state);

        assert!(state.is_over);
        assert_eq!(state.high_score, 100);
        assert_eq!(engine.store.load(), 100);
    }

    #[test]
    fn test_failed_high_score_write_keeps_old_value() {
        let mut store = MemoryHighScoreStore::new(10);
        store.fail_writes(true);
        let mut engine = GameEngine::with_seed(quiet_config(), Box::new(store), 1).unwrap();
        let mut state = started(&mut engine);
        state.snake = Snake::new(Position::new(19, 3), Direction::Right, 1);
        state.score = 90;

        let result = engine.tick(&mut state);

        assert!(result.terminated);
        assert_eq!(state.high_score, 10);
    }

    #[test]
    fn test_self_collision() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);

        // Body: (5,5), (4,5), (3,5), (2,5)
        state.snake = Snake::new(Position::new(5, 5), Direction::Right, 4);
        state.food = Position::new(18, 18);

        // Right: (6,5), (5,5), (4,5), (3,5)
        engine.tick(&mut state);
        // Down: (6,6), (6,5), (5,5), (4,5)
        engine.apply(&mut state, Action::Move(Direction::Down));
        engine.tick(&mut state);
        // Left: (5,6), (6,6), (6,5), (5,5)
        engine.apply(&mut state, Action::Move(Direction::Left));
        engine.tick(&mut state);
        // Up: (5,5) is still a body segment
        engine.apply(&mut state, Action::Move(Direction::Up));
        let result = engine.tick(&mut state);

        assert!(result.terminated);
        assert_eq!(
            result.info.collision_type,
            Some(CollisionType::SelfCollision)
        );
    }

    #[test]
    fn test_prevent_180_degree_turn() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);
        state.snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        state.food = Position::new(18, 18);

        assert!(!engine.apply(&mut state, Action::Move(Direction::Left)));
        engine.tick(&mut state);

        assert_eq!(state.snake.direction, Direction::Right);
        assert_eq!(state.snake.head(), Position::new(6, 5));
        assert!(!state.is_over);
    }

    #[test]
    fn test_direction_change_waits_for_tick() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);
        state.food = Position::new(0, 0);

        engine.apply(&mut state, Action::Move(Direction::Up));
        assert_eq!(state.snake.direction, Direction::Right);

        engine.tick(&mut state);
        assert_eq!(state.snake.direction, Direction::Up);
        assert_eq!(state.snake.head(), Position::new(10, 9));
    }

    #[test]
    fn test_input_ignored_while_paused() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);

        assert!(engine.apply(&mut state, Action::TogglePause));
        assert!(state.is_paused);
        assert!(!engine.apply(&mut state, Action::Move(Direction::Up)));
        assert_eq!(state.pending_direction, None);

        let result = engine.tick(&mut state);
        assert!(!result.advanced);
        assert_eq!(state.clock, Duration::ZERO);

        engine.apply(&mut state, Action::TogglePause);
        assert!(!state.is_paused);
    }

    #[test]
    fn test_start_resets_session() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);
        state.score = 80;
        state.high_score = 80;
        state.interval = Duration::from_millis(60);
        state.snake = Snake::new(Position::new(3, 3), Direction::Up, 5);
        state.effects.activate(PowerUpKind::Shield, Duration::from_secs(5));
        state.set_over(true);

        engine.apply(&mut state, Action::Start);

        assert!(state.is_started);
        assert!(!state.is_over);
        assert_eq!(state.score, 0);
        assert_eq!(state.high_score, 80);
        assert_eq!(state.interval, Duration::from_millis(150));
        assert_eq!(state.snake.body, vec![Position::new(10, 10)]);
        assert_eq!(state.snake.direction, Direction::Right);
        assert!(state.effects.is_empty());
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_reset_returns_to_title() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);

        engine.apply(&mut state, Action::Reset);

        assert!(!state.is_started);
        assert!(!engine.apply(&mut state, Action::TogglePause));
    }

    #[test]
    fn test_shield_suppresses_collisions() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);
        state.snake = Snake::new(Position::new(0, 5), Direction::Left, 1);
        state.food = Position::new(15, 15);
        state.effects.activate(PowerUpKind::Shield, Duration::from_secs(5));

        let result = engine.tick(&mut state);

        assert!(!result.terminated);
        assert_eq!(state.snake.head(), Position::new(-1, 5));
    }

    #[test]
    fn test_shield_allows_self_overlap() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);
        state.snake = Snake::new(Position::new(5, 5), Direction::Right, 5);
        state.snake.body = vec![
            Position::new(5, 5),
            Position::new(5, 6),
            Position::new(4, 6),
            Position::new(4, 5),
            Position::new(3, 5),
        ];
        state.snake.direction = Direction::Left;
        state.food = Position::new(15, 15);
        state.effects.activate(PowerUpKind::Shield, Duration::from_secs(5));

        let result = engine.tick(&mut state);
        assert!(!result.terminated);
        assert_eq!(state.snake.head(), Position::new(4, 5));
    }

    #[test]
    fn test_shield_expiry_restores_collisions() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);
        state.snake = Snake::new(Position::new(0, 5), Direction::Left, 1);
        state.food = Position::new(15, 15);
        // Expires exactly when the first tick's clock is reached
        state
            .effects
            .activate(PowerUpKind::Shield, Duration::from_millis(150));

        let result = engine.tick(&mut state);

        assert_eq!(result.info.expired, vec![PowerUpKind::Shield]);
        assert!(result.terminated);
    }

    #[test]
    fn test_collect_shield_power_up() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);
        state.food = Position::new(0, 0);
        place_power_up(&mut state, 7, PowerUpKind::Shield, Position::new(11, 10));

        let result = engine.tick(&mut state);

        assert_eq!(result.info.collected, vec![PowerUpKind::Shield]);
        assert_eq!(result.cues, vec![SoundCue::PowerUp]);
        assert!(state.power_ups.is_empty());
        assert!(state.effects.is_active(PowerUpKind::Shield));
        assert_eq!(state.interval, Duration::from_millis(150));
        assert_eq!(state.particles.len(), 15);
        assert_eq!(
            state.effects.remaining(PowerUpKind::Shield, state.clock),
            Some(Duration::from_millis(5000))
        );
    }

    #[test]
    fn test_effect_expires_after_its_duration() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);
        state.food = Position::new(0, 0);
        state.snake = Snake::new(Position::new(0, 10), Direction::Right, 1);
        place_power_up(&mut state, 1, PowerUpKind::Slow, Position::new(1, 10));

        engine.tick(&mut state);
        assert!(state.effects.is_active(PowerUpKind::Slow));
        let picked_at = state.clock;

        while state.clock < picked_at + Duration::from_millis(5000) {
            assert!(state.effects.is_active(PowerUpKind::Slow));
            state.snake = Snake::new(Position::new(0, 10), Direction::Right, 1);
            engine.tick(&mut state);
        }
        assert!(!state.effects.is_active(PowerUpKind::Slow));
    }

    #[test]
    fn test_points_power_up() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);
        state.food = Position::new(0, 0);
        place_power_up(&mut state, 1, PowerUpKind::Points, Position::new(11, 10));

        engine.tick(&mut state);
        assert_eq!(state.score, 50);
    }

    #[test]
    fn test_food_and_points_same_tick() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);
        state.food = Position::new(11, 10);
        place_power_up(&mut state, 1, PowerUpKind::Points, Position::new(11, 10));

        let result = engine.tick(&mut state);

        assert!(result.info.ate_food);
        assert_eq!(state.score, 60);
        assert_eq!(state.snake.len(), 2);
        assert_eq!(result.cues, vec![SoundCue::Eat, SoundCue::PowerUp]);
    }

    #[test]
    fn test_speed_and_slow_multipliers() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);
        state.food = Position::new(0, 0);
        place_power_up(&mut state, 1, PowerUpKind::Speed, Position::new(11, 10));
        place_power_up(&mut state, 2, PowerUpKind::Slow, Position::new(12, 10));

        engine.tick(&mut state);
        assert_interval_ms(&state, 105.0);

        engine.tick(&mut state);
        assert_interval_ms(&state, 136.5);
    }

    #[test]
    fn test_two_speed_power_ups_same_tick_compound() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);
        state.food = Position::new(0, 0);
        place_power_up(&mut state, 1, PowerUpKind::Speed, Position::new(11, 10));
        place_power_up(&mut state, 2, PowerUpKind::Speed, Position::new(11, 10));

        let result = engine.tick(&mut state);

        assert_eq!(
            result.info.collected,
            vec![PowerUpKind::Speed, PowerUpKind::Speed]
        );
        assert_interval_ms(&state, 150.0 * 0.49);
    }

    #[test]
    fn test_speed_power_ups_clamp_at_floor() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);
        state.interval = Duration::from_millis(90);
        state.food = Position::new(0, 0);
        place_power_up(&mut state, 1, PowerUpKind::Speed, Position::new(11, 10));
        place_power_up(&mut state, 2, PowerUpKind::Speed, Position::new(11, 10));

        engine.tick(&mut state);
        assert_eq!(state.interval, Duration::from_millis(50));
    }

    #[test]
    fn test_speed_then_slow_clamps_between_multipliers() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);
        state.interval = Duration::from_millis(60);
        state.food = Position::new(0, 0);
        place_power_up(&mut state, 1, PowerUpKind::Speed, Position::new(11, 10));
        place_power_up(&mut state, 2, PowerUpKind::Slow, Position::new(11, 10));

        let result = engine.tick(&mut state);

        // 60 * 0.7 = 42 clamps to 50 before SLOW applies: 50 * 1.3
        assert_eq!(
            result.info.collected,
            vec![PowerUpKind::Speed, PowerUpKind::Slow]
        );
        assert_interval_ms(&state, 65.0);
    }

    #[test]
    fn test_slow_then_speed_stays_above_floor() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);
        state.interval = Duration::from_millis(60);
        state.food = Position::new(0, 0);
        place_power_up(&mut state, 1, PowerUpKind::Slow, Position::new(11, 10));
        place_power_up(&mut state, 2, PowerUpKind::Speed, Position::new(11, 10));

        engine.tick(&mut state);

        // 60 * 1.3 = 78, then * 0.7
        assert_interval_ms(&state, 54.6);
    }

    #[test]
    fn test_power_up_spawns_on_free_cell() {
        let config = GameConfig {
            power_up_chance: 1.0,
            ..GameConfig::default()
        };
        let mut engine = engine_with(config, 0);
        let mut state = started(&mut engine);
        state.food = Position::new(11, 10);

        let result = engine.tick(&mut state);

        assert!(result.info.spawned.is_some());
        assert_eq!(state.power_ups.len(), 1);
        let placed = &state.power_ups[0];
        assert!(!state.snake.occupies(placed.position));
        assert_ne!(placed.position, state.food);
        assert!(state.is_in_bounds(placed.position));
        assert_eq!(placed.duration, Duration::from_millis(5000));
    }

    #[test]
    fn test_food_never_spawns_on_snake() {
        let config = GameConfig {
            grid_size: 4,
            start_x: 0,
            start_y: 0,
            spawn_attempts: 3,
            ..quiet_config()
        };
        let mut engine = engine_with(config, 0);
        let mut state = started(&mut engine);

        // Fill all but a handful of cells with snake
        state.snake.body = (0..4)
            .flat_map(|y| (0..3).map(move |x| Position::new(x, y)))
            .collect();

        for _ in 0..50 {
            let food = engine.random_free_cell(&state).unwrap();
            assert!(!state.snake.occupies(food));
            assert_eq!(food.x, 3);
            assert_ne!(food, state.food);
        }
    }

    #[test]
    fn test_full_board_ends_game() {
        let config = GameConfig {
            grid_size: 2,
            start_x: 0,
            start_y: 0,
            ..quiet_config()
        };
        let mut engine = engine_with(config, 0);
        let mut state = started(&mut engine);
        state.snake.body = vec![Position::new(0, 1), Position::new(0, 0), Position::new(1, 0)];
        state.snake.direction = Direction::Right;
        state.food = Position::new(1, 1);

        let result = engine.tick(&mut state);

        assert!(result.info.ate_food);
        assert!(result.info.board_full);
        assert!(result.terminated);
        assert!(state.is_over);
        assert_eq!(state.high_score, 10);
    }

    #[test]
    fn test_terminated_game_no_update() {
        let mut engine = engine_with(quiet_config(), 0);
        let mut state = started(&mut engine);
        state.set_over(true);
        let head = state.snake.head();

        let result = engine.tick(&mut state);

        assert!(!result.advanced);
        assert_eq!(state.snake.head(), head);
        assert!(!engine.apply(&mut state, Action::TogglePause));
    }

    #[test]
    fn test_particles_decay_through_engine() {
        let config = GameConfig {
            particle_decay: 0.5,
            ..quiet_config()
        };
        let mut engine = engine_with(config, 0);
        let mut state = started(&mut engine);
        state.food = Position::new(11, 10);
        engine.tick(&mut state);
        assert!(!state.particles.is_empty());

        engine.update_particles(&mut state);
        engine.update_particles(&mut state);
        assert!(state.particles.is_empty());
    }
}
