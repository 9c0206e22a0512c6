use std::time::Duration;

use tracing::warn;

use super::action::Direction;
use super::effects::ActiveEffects;
use super::particles::ParticleSystem;
use crate::storage::{HighScoreStore, StoreError};

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Current direction of movement
    pub direction: Direction,
}

impl Snake {
    /// Create a new snake with given starting position and direction
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];

        // Add initial body segments behind the head
        let (dx, dy) = direction.delta();
        let (back_dx, back_dy) = (-dx, -dy);

        for i in 1..length {
            let prev = body[i - 1];
            body.push(prev.moved_by(back_dx, back_dy));
        }

        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Check if position is occupied by any segment, head included
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Prepend `new_head`, dropping the tail unless the snake grows this tick
    pub fn advance(&mut self, new_head: Position, grow: bool) {
        self.body.insert(0, new_head);

        if !grow {
            self.body.pop();
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
}

/// Kind of power-up placed on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PowerUpKind {
    /// Shortens the tick interval
    Speed,
    /// Lengthens the tick interval
    Slow,
    /// Instant score bonus
    Points,
    /// Suppresses collisions while active
    Shield,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Speed,
        PowerUpKind::Slow,
        PowerUpKind::Points,
        PowerUpKind::Shield,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PowerUpKind::Speed => "SPEED",
            PowerUpKind::Slow => "SLOW",
            PowerUpKind::Points => "POINTS",
            PowerUpKind::Shield => "SHIELD",
        }
    }
}

/// A power-up waiting on the board to be collected
#[derive(Debug, Clone, PartialEq)]
pub struct PowerUp {
    pub id: u64,
    pub kind: PowerUpKind,
    pub position: Position,
    /// How long the effect lasts once collected
    pub duration: Duration,
}

/// Complete game state
///
/// This is both the session store the engine mutates and the snapshot the
/// renderer draws from. Nothing derived is cached here.
#[derive(Debug, Clone)]
pub struct GameState {
    pub snake: Snake,
    pub food: Position,
    pub power_ups: Vec<PowerUp>,
    pub grid_size: usize,
    pub score: u32,
    pub high_score: u32,
    pub is_paused: bool,
    pub is_over: bool,
    pub is_started: bool,
    /// Direction queued by input, applied on the next tick
    pub pending_direction: Option<Direction>,
    /// Current tick interval
    pub interval: Duration,
    /// Simulation time: the sum of every executed tick's interval
    pub clock: Duration,
    pub effects: ActiveEffects,
    pub particles: ParticleSystem,
}

impl GameState {
    /// Create a new game state
    pub fn new(
        snake: Snake,
        food: Position,
        grid_size: usize,
        interval: Duration,
        max_particles: usize,
    ) -> Self {
        Self {
            snake,
            food,
            power_ups: Vec::new(),
            grid_size,
            score: 0,
            high_score: 0,
            is_paused: false,
            is_over: false,
            is_started: false,
            pending_direction: None,
            interval,
            clock: Duration::ZERO,
            effects: ActiveEffects::new(),
            particles: ParticleSystem::new(max_particles),
        }
    }

    /// True while ticks should advance the simulation
    pub fn is_running(&self) -> bool {
        self.is_started && !self.is_paused && !self.is_over
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        let size = self.grid_size as i32;
        pos.x >= 0 && pos.x < size && pos.y >= 0 && pos.y < size
    }

    /// Check if a position is occupied by the snake
    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.occupies(pos)
    }

    /// Check if a position holds anything: snake, food or a placed power-up
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.is_occupied_by_snake(pos)
            || self.food == pos
            || self.power_ups.iter().any(|p| p.position == pos)
    }

    pub fn set_score(&mut self, score: u32) {
        self.score = score;
    }

    /// Persist `score` as the new high score, then reflect it in memory
    ///
    /// If the write fails the in-memory value is left untouched.
    pub fn set_high_score(
        &mut self,
        store: &mut dyn HighScoreStore,
        score: u32,
    ) -> Result<(), StoreError> {
        if let Err(err) = store.save(score) {
            warn!(score, error = %err, "Failed to persist high score");
            return Err(err);
        }
        self.high_score = score;
        Ok(())
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.is_paused = paused;
    }

    pub fn set_over(&mut self, over: bool) {
        self.is_over = over;
    }

    pub fn set_started(&mut self, started: bool) {
        self.is_started = started;
    }

    pub fn add_power_up(&mut self, power_up: PowerUp) {
        self.power_ups.push(power_up);
    }

    /// Remove the placed power-up with `id`, returning it if present
    pub fn remove_power_up(&mut self, id: u64) -> Option<PowerUp> {
        let index = self.power_ups.iter().position(|p| p.id == id)?;
        Some(self.power_ups.remove(index))
    }
}
