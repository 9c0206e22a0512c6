use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::{Instant, interval, sleep};
use tracing::info;

use crate::audio::{AudioSink, TerminalAudio};
use crate::game::{Action, GameEngine, GameState};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;

pub struct HumanMode {
    engine: GameEngine,
    state: GameState,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    audio: TerminalAudio<Stderr>,
    should_quit: bool,
    reschedule_tick: bool,
}

impl HumanMode {
    pub fn new(mut engine: GameEngine, muted: bool) -> Self {
        let state = engine.initial_state();

        Self {
            engine,
            state,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            audio: TerminalAudio::new(muted),
            should_quit: false,
            reschedule_tick: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        info!(
            games_played = self.metrics.games_played,
            best_session_score = self.metrics.best_session_score,
            high_score = self.state.high_score,
            "Session ended"
        );

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // The tick timer is re-armed after every tick with the current
        // interval, so speed changes apply from the next tick on
        let tick_timer = sleep(self.state.interval);
        tokio::pin!(tick_timer);

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                // Game logic tick
                _ = &mut tick_timer => {
                    self.update_game();
                    self.reschedule_tick = true;
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update(self.state.is_running());
                    self.engine.update_particles(&mut self.state);
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.state, &self.metrics);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.reschedule_tick {
                tick_timer
                    .as_mut()
                    .reset(Instant::now() + self.state.interval);
                self.reschedule_tick = false;
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            let action = self.input_handler.handle_key_event(key, &self.state);

            match action {
                KeyAction::GameAction(action) => self.apply_action(action),
                KeyAction::ToggleMute => {
                    self.audio.toggle_mute();
                }
                KeyAction::Quit => {
                    self.should_quit = true;
                }
                KeyAction::None => {}
            }
        }
    }

    fn apply_action(&mut self, action: Action) {
        if !self.engine.apply(&mut self.state, action) {
            return;
        }

        match action {
            Action::Start => {
                self.metrics.on_game_start();
                self.reschedule_tick = true;
            }
            Action::Reset | Action::TogglePause => {
                self.reschedule_tick = true;
            }
            Action::Move(_) => {}
        }
    }

    fn update_game(&mut self) {
        let result = self.engine.tick(&mut self.state);

        for cue in &result.cues {
            self.audio.play(*cue);
        }

        // Track game over
        if result.terminated {
            self.metrics.on_game_over(self.state.score);
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
