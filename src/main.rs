use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{
    io::{stdout, Stdout},
    time::{Duration, Instant},
};

use tetrix::game::{CellState, Game, GameState, GRID_HEIGHT, GRID_WIDTH};
use tetrix::input::{Controller, InputEvent, Key};
use tetrix::piece::PaletteColor;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Seed for the piece sequence. The same seed replays the same pieces.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Target frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";
const GRID_DOT: &str = " .";

fn palette_color(color: PaletteColor) -> Color {
    let (r, g, b) = color.rgb();
    Color::Rgb(r, g, b)
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, game: &Game) {
    let area = frame.size();

    match game.state {
        GameState::Playing => render_game(frame, game, area),
        GameState::Paused => render_paused(frame, game, area),
        GameState::GameOver => render_game_over(frame, game, area),
    }
}

fn render_game(frame: &mut Frame, game: &Game, area: Rect) {
    let grid_display_width = (GRID_WIDTH as u16 * CELL_WIDTH) + 2;
    let grid_display_height = GRID_HEIGHT as u16 + 2;
    let side_width = 14;
    let total_width = grid_display_width + side_width + 2;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    // [Grid][Next / Score]
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(side_width),
    ])
    .split(game_row);

    let side = Layout::vertical([Constraint::Length(7), Constraint::Fill(1)]).split(horizontal[1]);

    render_grid(frame, game, horizontal[0]);
    render_preview(frame, game, side[0]);
    render_info(frame, game, side[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←→/AD: Move | ↓/S: Down | ↑/W: Rotate | Space: Drop | P: Pause | R: Restart | Q: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Tetrix ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visual_grid = game.render_grid();

    let lines: Vec<Line> = visual_grid
        .iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|cell| match cell {
                    CellState::Empty => {
                        Span::styled(GRID_DOT, Style::default().fg(Color::Rgb(50, 50, 50)))
                    }
                    CellState::Filled(color) => {
                        Span::styled(BLOCK_CHAR, Style::default().fg(palette_color(*color)))
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_preview(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Next ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let piece = &game.next_piece;
    let style = Style::default().fg(palette_color(piece.color));

    let lines: Vec<Line> = piece
        .matrix()
        .iter()
        .map(|row| {
            let mut spans = vec![Span::raw(" ")];
            spans.extend(row.iter().map(|&filled| {
                if filled {
                    Span::styled(BLOCK_CHAR, style)
                } else {
                    Span::raw(EMPTY_CHAR)
                }
            }));
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", game.score)),
        Line::from(""),
        Line::from(Span::styled("Lines", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", game.lines_cleared)),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_game_over(frame: &mut Frame, game: &Game, area: Rect) {
    render_game(frame, game, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Final Score: {}", game.score)),
        Line::from(""),
        Line::from(Span::styled("R: Play Again", Style::default().fg(Color::Green))),
        Line::from(Span::styled("Q/ESC: Quit", Style::default().fg(Color::DarkGray))),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(24, 10, area);
    frame.render_widget(paragraph, popup_area);
}

fn render_paused(frame: &mut Frame, game: &Game, area: Rect) {
    render_game(frame, game, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("PAUSED", Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled(
            "Press P to continue",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Paused ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(24, 8, area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Input
// ============================================================================

enum Command {
    Quit,
    Pause,
    Restart,
    Play(Key),
}

fn map_key(code: KeyCode) -> Option<Command> {
    let command = match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Command::Quit,
        KeyCode::Char('p') | KeyCode::Char('P') => Command::Pause,
        KeyCode::Char('r') | KeyCode::Char('R') => Command::Restart,
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Command::Play(Key::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Command::Play(Key::Right),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Command::Play(Key::Down),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Command::Play(Key::Rotate),
        KeyCode::Char(' ') => Command::Play(Key::HardDrop),
        _ => return None,
    };
    Some(command)
}

// ============================================================================
// Main Loop
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    // Without release events every press is treated as a tap.
    let release_events = supports_keyboard_enhancement().unwrap_or(false);
    if release_events {
        stdout().execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))?;
    }

    let result = Terminal::new(CrosstermBackend::new(stdout()))
        .map_err(anyhow::Error::from)
        .and_then(|mut terminal| run(&mut terminal, &args, release_events));

    // Always try to restore terminal state.
    if release_events {
        let _ = stdout().execute(PopKeyboardEnhancementFlags);
    }
    let _ = disable_raw_mode();
    let _ = stdout().execute(LeaveAlternateScreen);

    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    args: &Args,
    release_events: bool,
) -> Result<()> {
    let mut game = match args.seed {
        Some(seed) => Game::seeded(seed),
        None => Game::new(),
    };
    let mut controller = Controller::new();

    let frame_duration = Duration::from_secs(1) / args.fps.max(1);
    let mut last_frame = Instant::now();

    loop {
        terminal.draw(|frame| render(frame, &game))?;

        // Drain input until the frame deadline.
        let mut inputs = Vec::new();
        let deadline = last_frame + frame_duration;
        while let Some(timeout) = deadline.checked_duration_since(Instant::now()) {
            if !event::poll(timeout)? {
                break;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            let Some(command) = map_key(key.code) else {
                continue;
            };

            match (key.kind, command) {
                (KeyEventKind::Press, Command::Quit) => return Ok(()),
                (KeyEventKind::Press, Command::Pause) => game.toggle_pause(),
                (KeyEventKind::Press, Command::Restart) => {
                    game = game.restart();
                    controller.reset();
                    inputs.clear();
                }
                (KeyEventKind::Press, Command::Play(key)) => {
                    inputs.push(InputEvent::Pressed(key));
                    if !release_events {
                        inputs.push(InputEvent::Released(key));
                    }
                }
                (KeyEventKind::Release, Command::Play(key)) => {
                    inputs.push(InputEvent::Released(key));
                }
                // Terminal auto-repeat; held keys repeat on their own timers.
                (KeyEventKind::Repeat, _) => {}
                (KeyEventKind::Release, _) => {}
            }
        }

        let now = Instant::now();
        let dt = now - last_frame;
        last_frame = now;

        controller.frame(&mut game, dt, inputs);
    }
}
