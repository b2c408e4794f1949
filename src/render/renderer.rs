use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{Position, Snapshot};
use crate::metrics::GameMetrics;

/// What occupies one grid cell in a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Head,
    Body,
    Food,
    Empty,
}

impl Cell {
    pub fn of(snapshot: &Snapshot, pos: Position) -> Self {
        if snapshot.head() == Some(pos) {
            Cell::Head
        } else if snapshot.snake.contains(&pos) {
            Cell::Body
        } else if snapshot.food == Some(pos) {
            Cell::Food
        } else {
            Cell::Empty
        }
    }

    fn span(self) -> Span<'static> {
        match self {
            Cell::Head => Span::styled(
                "■ ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Cell::Body => Span::styled("□ ", Style::default().fg(Color::Green)),
            Cell::Food => Span::styled(
                "O ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Cell::Empty => Span::styled(". ", Style::default().fg(Color::DarkGray)),
        }
    }
}

/// Viewer state drawn around the board
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayStatus {
    pub episode: usize,
    pub paused: bool,
    pub speed: &'static str,
    /// Episode over: lost, won or truncated
    pub finished: bool,
    pub won: bool,
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        snapshot: &Snapshot,
        status: &PlayStatus,
        metrics: &GameMetrics,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(chunks[0], snapshot, status, metrics);
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

        if status.finished {
            let game_over = self.render_game_over(game_area, snapshot, status);
            frame.render_widget(game_over, game_area);
        } else {
            let grid = self.render_grid(game_area, snapshot, status);
            frame.render_widget(grid, game_area);
        }

        let controls = self.render_controls(chunks[2]);
        frame.render_widget(controls, chunks[2]);
    }

    fn render_grid(&self, _area: Rect, snapshot: &Snapshot, status: &PlayStatus) -> Paragraph<'_> {
        let lines: Vec<Line> = (0..snapshot.rows)
            .map(|row| {
                let spans: Vec<Span> = (0..snapshot.columns)
                    .map(|col| Cell::of(snapshot, Position::new(row as i32, col as i32)).span())
                    .collect();
                Line::from(spans)
            })
            .collect();

        let title = if status.paused {
            " Snake (PAUSED) "
        } else {
            " Snake "
        };

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(
        &self,
        _area: Rect,
        snapshot: &Snapshot,
        status: &PlayStatus,
        metrics: &GameMetrics,
    ) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let text = vec![Line::from(vec![
            Span::styled("Episode: ", label),
            Span::styled(status.episode.to_string(), value),
            Span::raw("    "),
            Span::styled("Score: ", label),
            Span::styled(
                snapshot.score().to_string(),
                value.add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Moves: ", label),
            Span::styled(snapshot.moves.to_string(), value),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(metrics.high_score.to_string(), value),
            Span::raw("    "),
            Span::styled("Mean: ", label),
            Span::styled(format!("{:.1}", metrics.mean_score()), value),
            Span::raw("    "),
            Span::styled("Speed: ", label),
            Span::styled(status.speed, value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_game_over(&self, _area: Rect, snapshot: &Snapshot, status: &PlayStatus) -> Paragraph<'_> {
        let (headline, color) = if status.won {
            ("BOARD CLEARED", Color::Green)
        } else {
            ("GAME OVER", Color::Red)
        };

        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                headline,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    snapshot.score().to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  in {} moves", snapshot.moves),
                    Style::default().fg(Color::Gray),
                ),
            ]),
            Line::from(""),
            Line::from(vec![Span::styled(
                "Next episode starts on the next tick",
                Style::default().fg(Color::Gray),
            )]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
    }

    fn render_controls(&self, _area: Rect) -> Paragraph<'_> {
        let key = Style::default().fg(Color::Cyan);
        let text = vec![Line::from(vec![
            Span::styled("Space", key),
            Span::raw(" pause | "),
            Span::styled("N", key),
            Span::raw(" step | "),
            Span::styled("1-4", key),
            Span::raw(" speed | "),
            Span::styled("R", key),
            Span::raw(" restart | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Direction as Heading;
    use ratatui::{Terminal, backend::TestBackend};

    fn snapshot() -> Snapshot {
        Snapshot {
            rows: 4,
            columns: 4,
            moves: 7,
            snake: vec![Position::new(1, 1), Position::new(1, 2)],
            food: Some(Position::new(3, 0)),
            heading: Heading::Right,
        }
    }

    fn status() -> PlayStatus {
        PlayStatus {
            episode: 2,
            paused: true,
            speed: "Normal",
            finished: false,
            won: false,
        }
    }

    fn draw(status: &PlayStatus) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal
            .draw(|frame| Renderer::new().render(frame, &snapshot(), status, &GameMetrics::new()))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_cell_kinds() {
        let snapshot = snapshot();
        assert_eq!(Cell::of(&snapshot, Position::new(1, 2)), Cell::Head);
        assert_eq!(Cell::of(&snapshot, Position::new(1, 1)), Cell::Body);
        assert_eq!(Cell::of(&snapshot, Position::new(3, 0)), Cell::Food);
        assert_eq!(Cell::of(&snapshot, Position::new(0, 0)), Cell::Empty);
    }

    #[test]
    fn test_render_running_board() {
        let screen = draw(&status());
        assert!(screen.contains("PAUSED"));
        assert!(screen.contains("Episode:"));
        assert!(screen.contains("Normal"));
    }

    #[test]
    fn test_render_finished_board() {
        let mut status = status();
        status.finished = true;
        assert!(draw(&status).contains("GAME OVER"));

        status.won = true;
        assert!(draw(&status).contains("BOARD CLEARED"));
    }
}
