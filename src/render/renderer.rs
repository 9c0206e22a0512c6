use std::collections::HashMap;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{GameState, ParticleColor, Position, PowerUpKind};
use crate::metrics::GameMetrics;

/// What is drawn in a grid cell; particles sit on top of everything
#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell {
    Head,
    Body,
    Food,
    PowerUp(PowerUpKind),
    Particle(ParticleColor, f32),
    Empty,
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, state: &GameState, metrics: &GameMetrics) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        // Render header with score and active effects
        let stats = self.render_stats(chunks[0], state, metrics);
        frame.render_widget(stats, chunks[0]);

        // Center the game grid horizontally
        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        if !state.is_started {
            let title = self.render_title(game_area, state);
            frame.render_widget(title, game_area);
        } else if state.is_over {
            // Keep the board up so the death burst plays out above the panel
            let split = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(8)])
                .split(game_area);
            let grid = self.render_grid(split[0], state);
            frame.render_widget(grid, split[0]);
            let game_over = self.render_game_over(split[1], state);
            frame.render_widget(game_over, split[1]);
        } else {
            let grid = self.render_grid(game_area, state);
            frame.render_widget(grid, game_area);
        }

        // Render footer with controls
        let controls = self.render_controls(chunks[2]);
        frame.render_widget(controls, chunks[2]);
    }

    fn classify(
        state: &GameState,
        particles: &HashMap<Position, (ParticleColor, f32)>,
        pos: Position,
    ) -> Cell {
        if let Some(&(color, life)) = particles.get(&pos) {
            Cell::Particle(color, life)
        } else if pos == state.snake.head() {
            Cell::Head
        } else if state.snake.occupies(pos) {
            Cell::Body
        } else if pos == state.food {
            Cell::Food
        } else if let Some(p) = state.power_ups.iter().find(|p| p.position == pos) {
            Cell::PowerUp(p.kind)
        } else {
            Cell::Empty
        }
    }

    /// Brightest particle per cell
    fn particle_cells(state: &GameState) -> HashMap<Position, (ParticleColor, f32)> {
        let mut cells: HashMap<Position, (ParticleColor, f32)> = HashMap::new();
        for particle in state.particles.particles() {
            let entry = cells
                .entry(particle.cell())
                .or_insert((particle.color, particle.life));
            if particle.life > entry.1 {
                *entry = (particle.color, particle.life);
            }
        }
        cells
    }

    fn power_up_style(kind: PowerUpKind) -> (&'static str, Color) {
        match kind {
            PowerUpKind::Speed => ("» ", Color::Yellow),
            PowerUpKind::Slow => ("« ", Color::Magenta),
            PowerUpKind::Points => ("★ ", Color::LightGreen),
            PowerUpKind::Shield => ("◆ ", Color::Blue),
        }
    }

    fn particle_color(color: ParticleColor) -> Color {
        match color {
            ParticleColor::Red => Color::Red,
            ParticleColor::Green => Color::Green,
            ParticleColor::Blue => Color::Blue,
        }
    }

    fn render_grid(&self, _area: Rect, state: &GameState) -> Paragraph<'_> {
        let shielded = state.effects.is_active(PowerUpKind::Shield);
        let body_color = if shielded { Color::LightBlue } else { Color::Green };
        let particles = Self::particle_cells(state);
        let mut lines = Vec::new();

        for y in 0..state.grid_size {
            let mut spans = Vec::new();

            for x in 0..state.grid_size {
                let pos = Position::new(x as i32, y as i32);

                let cell = match Self::classify(state, &particles, pos) {
                    Cell::Head => Span::styled(
                        "■ ",
                        Style::default()
                            .fg(if shielded { Color::Blue } else { Color::Cyan })
                            .add_modifier(Modifier::BOLD),
                    ),
                    Cell::Body => Span::styled("□ ", Style::default().fg(body_color)),
                    Cell::Food => Span::styled(
                        "O ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    Cell::PowerUp(kind) => {
                        let (glyph, color) = Self::power_up_style(kind);
                        Span::styled(
                            glyph,
                            Style::default().fg(color).add_modifier(Modifier::BOLD),
                        )
                    }
                    Cell::Particle(color, life) => {
                        let (glyph, modifier) = if life > 0.5 {
                            ("* ", Modifier::BOLD)
                        } else {
                            ("· ", Modifier::DIM)
                        };
                        Span::styled(
                            glyph,
                            Style::default()
                                .fg(Self::particle_color(color))
                                .add_modifier(modifier),
                        )
                    }
                    Cell::Empty => Span::styled(". ", Style::default().fg(Color::DarkGray)),
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        let title = if state.is_paused {
            " Snake (PAUSED) "
        } else {
            " Snake "
        };

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(if state.is_paused {
                        Color::Yellow
                    } else {
                        Color::White
                    }))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, _area: Rect, state: &GameState, metrics: &GameMetrics) -> Paragraph<'_> {
        let mut effects = vec![Span::styled("Effects: ", Style::default().fg(Color::Yellow))];
        if state.effects.is_empty() {
            effects.push(Span::styled("none", Style::default().fg(Color::DarkGray)));
        }
        for kind in state.effects.kinds() {
            let remaining = state
                .effects
                .remaining(kind, state.clock)
                .map(|d| d.as_secs_f32())
                .unwrap_or(0.0);
            effects.push(Span::styled(
                format!(" {} {:.1}s ", kind.label(), remaining),
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            ));
            effects.push(Span::raw(" "));
        }

        let text = vec![
            Line::from(vec![
                Span::styled("Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("    "),
                Span::styled("High Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(state.high_score.to_string(), Style::default().fg(Color::White)),
                Span::raw("    "),
                Span::styled("Tick: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    format!("{}ms", state.interval.as_millis()),
                    Style::default().fg(Color::White),
                ),
                Span::raw("    "),
                Span::styled("Time: ", Style::default().fg(Color::Yellow)),
                Span::styled(metrics.format_time(), Style::default().fg(Color::White)),
            ]),
            Line::from(effects),
        ];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_title(&self, _area: Rect, state: &GameState) -> Paragraph<'_> {
        let mut text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "SNAKE",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from("Use the arrow keys to steer the snake."),
            Line::from("Collect power-ups and grow as long as you can!"),
            Line::from(""),
            Line::from(vec![
                Span::styled("» ", Style::default().fg(Color::Yellow)),
                Span::raw("speed  "),
                Span::styled("« ", Style::default().fg(Color::Magenta)),
                Span::raw("slow  "),
                Span::styled("★ ", Style::default().fg(Color::LightGreen)),
                Span::raw("points  "),
                Span::styled("◆ ", Style::default().fg(Color::Blue)),
                Span::raw("shield"),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Enter",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Space",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to start", Style::default().fg(Color::Gray)),
            ]),
        ];

        if state.high_score > 0 {
            text.push(Line::from(""));
            text.push(Line::from(vec![Span::styled(
                format!("High Score: {}", state.high_score),
                Style::default().fg(Color::Gray),
            )]));
        }

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Green)),
        )
    }

    fn render_game_over(&self, _area: Rect, state: &GameState) -> Paragraph<'_> {
        let new_record = state.score > 0 && state.score == state.high_score;
        let mut text = vec![
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ];

        if new_record {
            text.push(Line::from(vec![Span::styled(
                "New high score!",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )]));
        }

        text.push(Line::from(""));
        text.push(Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::Gray)),
            Span::styled(
                "Enter",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to play again, ", Style::default().fg(Color::Gray)),
            Span::styled(
                "R",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" for the title or ", Style::default().fg(Color::Gray)),
            Span::styled(
                "Q",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to quit", Style::default().fg(Color::Gray)),
        ]));

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, _area: Rect) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(" to pause | "),
            Span::styled("M", Style::default().fg(Color::Cyan)),
            Span::raw(" mute | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
