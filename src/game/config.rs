use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the game
///
/// Every field has a default, so a JSON file only needs to name the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width and height of the square grid, in cells
    pub grid_size: usize,
    /// Cell the single-segment snake starts on
    pub start_x: i32,
    pub start_y: i32,

    // Timing
    /// Tick interval at the start of every game
    pub initial_interval_ms: u64,
    /// Amount the interval shrinks each time food is eaten
    pub interval_step_ms: u64,
    /// Floor for the tick interval
    pub min_interval_ms: u64,

    // Scoring
    /// Points for eating food
    pub food_reward: u32,
    /// Points granted by a POINTS power-up
    pub points_bonus: u32,

    // Power-ups
    /// Probability a power-up spawns when food is eaten
    pub power_up_chance: f64,
    /// How long a collected power-up stays active
    pub power_up_duration_ms: u64,
    /// Interval multiplier applied by SPEED
    pub speed_multiplier: f64,
    /// Interval multiplier applied by SLOW
    pub slow_multiplier: f64,

    // Particles
    pub death_particles: usize,
    pub eat_particles: usize,
    pub pickup_particles: usize,
    /// Life lost by each particle per animation frame
    pub particle_decay: f32,
    /// Upper bound on live particles; oldest are dropped first
    pub max_particles: usize,

    /// Random draws tried before falling back to scanning for a free cell
    pub spawn_attempts: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            start_x: 10,
            start_y: 10,
            initial_interval_ms: 150,
            interval_step_ms: 5,
            min_interval_ms: 50,
            food_reward: 10,
            points_bonus: 50,
            power_up_chance: 0.1,
            power_up_duration_ms: 5000,
            speed_multiplier: 0.7,
            slow_multiplier: 1.3,
            death_particles: 20,
            eat_particles: 10,
            pickup_particles: 15,
            particle_decay: 0.05,
            max_particles: 200,
            spawn_attempts: 1000,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with a custom grid size
    pub fn new(grid_size: usize) -> Self {
        Self {
            grid_size,
            start_x: (grid_size / 2) as i32,
            start_y: (grid_size / 2) as i32,
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: GameConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        // Smaller boards leave no room for food beside the snake
        if self.grid_size < 2 {
            anyhow::bail!("grid_size must be at least 2, got {}", self.grid_size);
        }
        let size = self.grid_size as i32;
        if !(0..size).contains(&self.start_x) || !(0..size).contains(&self.start_y) {
            anyhow::bail!(
                "start position ({}, {}) is outside the {}x{} grid",
                self.start_x,
                self.start_y,
                size,
                size
            );
        }
        if self.min_interval_ms == 0 || self.initial_interval_ms < self.min_interval_ms {
            anyhow::bail!("initial_interval_ms must be at least min_interval_ms, which must be non-zero");
        }
        if !(0.0..=1.0).contains(&self.power_up_chance) {
            anyhow::bail!("power_up_chance must be within [0, 1]");
        }
        for (name, value) in [
            ("speed_multiplier", self.speed_multiplier),
            ("slow_multiplier", self.slow_multiplier),
        ] {
            if !value.is_finite() || value <= 0.0 {
                anyhow::bail!("{} must be a positive number, got {}", name, value);
            }
        }
        Ok(())
    }

    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    pub fn interval_step(&self) -> Duration {
        Duration::from_millis(self.interval_step_ms)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn power_up_duration(&self) -> Duration {
        Duration::from_millis(self.power_up_duration_ms)
    }
}
