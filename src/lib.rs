//! Snake Arcade - a terminal Snake game with power-ups
//!
//! This library provides:
//! - Core game logic and simulation (game module)
//! - High score persistence (storage module)
//! - Sound cues (audio module)
//! - TUI rendering and keyboard input (render, input modules)
//! - The interactive mode that ties them together (modes module)

pub mod audio;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod storage;
