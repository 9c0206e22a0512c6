use std::time::{Duration, Instant};

/// Per-session play statistics shown in the header
///
/// Only time spent actually playing is counted: the clock stands still on the
/// title screen, while paused, and after game over.
pub struct GameMetrics {
    last_update: Instant,
    pub elapsed_time: Duration,
    pub games_played: u32,
    pub best_session_score: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            elapsed_time: Duration::ZERO,
            games_played: 0,
            best_session_score: 0,
        }
    }

    pub fn update(&mut self, running: bool) {
        let now = Instant::now();
        if running {
            self.elapsed_time += now.duration_since(self.last_update);
        }
        self.last_update = now;
    }

    pub fn on_game_start(&mut self) {
        self.last_update = Instant::now();
        self.elapsed_time = Duration::ZERO;
    }

    pub fn on_game_over(&mut self, final_score: u32) {
        self.games_played += 1;
        if final_score > self.best_session_score {
            self.best_session_score = final_score;
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
