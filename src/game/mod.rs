//! Core game logic module for Snake
//!
//! This module contains all the game logic without any terminal or rendering
//! dependencies, so the simulation can be driven headless.

pub mod action;
pub mod config;
pub mod effects;
pub mod engine;
pub mod particles;
pub mod state;

// Re-export commonly used types
pub use action::{Action, Direction};
pub use config::GameConfig;
pub use effects::ActiveEffects;
pub use engine::{GameEngine, StepInfo, StepResult};
pub use particles::{Particle, ParticleColor, ParticleSystem};
pub use state::{CollisionType, GameState, Position, PowerUp, PowerUpKind, Snake};
