use anyhow::{Context, Result};
use clap::Parser;
use lockpick_core::{
    KeyColor, Path, State, cell::Cell, load_board, search, select_best_by_key,
};
use log::info;
use ratatui::{
    crossterm::{
        self,
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    io::{self, Stdout},
    path::PathBuf,
    process::ExitCode,
    time::{Duration, Instant},
};

#[derive(Parser, Debug)]
#[command(version, about = "Finds the best way through a lockpick board", long_about = None)]
struct Args {
    /// Board file to solve
    #[arg(short, long, value_name = "BOARD_FILE", default_value = "boards/level01.txt")]
    board: PathBuf,

    /// Key color whose final count is maximized
    #[arg(short, long, value_name = "COLOR", default_value_t = 'p')]
    score_color: KeyColor,

    /// Print every step of the best path instead of opening the viewer
    #[arg(long)]
    plain: bool,

    /// Write the best path as JSON to this file
    #[arg(long, value_name = "JSON_FILE")]
    export: Option<PathBuf>,
}

struct App {
    /// The state before the first step.
    initial: State,
    /// The selected solution.
    path: Path,
    /// 0 shows the initial state, `n` the state after step `n`.
    step: usize,
    /// Advance one step per tick.
    playing: bool,
    score_color: KeyColor,
    /// Flag to control the main loop.
    should_quit: bool,
}

impl App {
    fn new(initial: State, path: Path, score_color: KeyColor) -> Self {
        App {
            initial,
            path,
            step: 0,
            playing: false,
            score_color,
            should_quit: false,
        }
    }

    fn current_state(&self) -> &State {
        match self.step {
            0 => &self.initial,
            n => &self.path.steps()[n - 1].state,
        }
    }

    fn current_label(&self) -> String {
        match self.step {
            0 => "Start".to_string(),
            n => self.path.steps()[n - 1].label(),
        }
    }

    fn next(&mut self) {
        if self.step < self.path.len() {
            self.step += 1;
        } else {
            self.playing = false;
        }
    }

    fn previous(&mut self) {
        self.step = self.step.saturating_sub(1);
    }

    /// Handles one tick of autoplay.
    fn tick(&mut self) {
        if self.playing {
            self.next();
        }
    }

    /// Sets the quit flag.
    fn quit(&mut self) {
        self.should_quit = true;
    }
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let board_text = std::fs::read_to_string(&args.board)
        .with_context(|| format!("Failed to read board file {}", args.board.display()))?;
    let initial = load_board(&board_text)
        .with_context(|| format!("Failed to load board {}", args.board.display()))?;

    let paths = search(&initial);
    let best = match select_best_by_key(&paths, args.score_color) {
        Ok(best) => best.clone(),
        Err(err) => {
            println!("{err}");
            return Ok(ExitCode::FAILURE);
        }
    };
    let score = final_score(&best, args.score_color);
    info!(
        "Best of {} solutions scores {score} with {} steps",
        paths.len(),
        best.len()
    );

    if let Some(export) = &args.export {
        let json = serde_json::to_string_pretty(&best).context("Failed to serialize path")?;
        std::fs::write(export, json)
            .with_context(|| format!("Failed to write {}", export.display()))?;
    }

    if args.plain {
        print_plain(&best, args.score_color);
        return Ok(ExitCode::SUCCESS);
    }

    // Set up the terminal
    let mut terminal = setup_terminal()?;

    let mut app = App::new(initial, best, args.score_color);
    let result = run_app(&mut terminal, &mut app);

    // Restore the terminal state even if the loop failed
    restore_terminal(&mut terminal)?;
    result?;

    Ok(ExitCode::SUCCESS)
}

fn final_score(path: &Path, color: KeyColor) -> i32 {
    path.final_state().map_or(0, |state| state.keys().get(color))
}

/// Prints each step's board followed by its label.
fn print_plain(path: &Path, color: KeyColor) {
    println!("Best score: {}", final_score(path, color));
    for (state, label) in path.labelled_steps() {
        println!("\n{state}\n{label}");
    }
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the viewer.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(500);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                    KeyCode::Right | KeyCode::Char('l') => app.next(),
                    KeyCode::Left | KeyCode::Char('h') => app.previous(),
                    KeyCode::Home => app.step = 0,
                    KeyCode::End => app.step = app.path.len(),
                    KeyCode::Char(' ') => app.playing = !app.playing,
                    _ => {}
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(70), // Board and step list
            Constraint::Percentage(20), // Keys
            Constraint::Percentage(10), // Status/help
        ])
        .split(frame.area());
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(main_layout[0]);

    render_board(frame, top[0], app);
    render_steps(frame, top[1], app);
    render_keys(frame, main_layout[1], app);

    let help_text = Paragraph::new(format!(
        "Step {}/{}: {}    Total cost {}    ←/→ step, Home/End jump, Space play, q quit",
        app.step,
        app.path.len(),
        app.current_label(),
        app.path.total_cost()
    ))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

/// Terminal color for a key color character.
fn key_color(color: KeyColor) -> Color {
    match color {
        'r' => Color::Red,
        'g' => Color::Green,
        'b' => Color::Blue,
        'c' => Color::Cyan,
        'p' => Color::Magenta,
        'o' => Color::LightRed,
        'n' => Color::Yellow,
        'm' => Color::LightYellow,
        'u' => Color::LightMagenta,
        _ => Color::White,
    }
}

/// Renders the board of the current step.
fn render_board(frame: &mut Frame, area: Rect, app: &App) {
    let state = app.current_state();
    let target = match app.step {
        0 => None,
        n => Some(app.path.steps()[n - 1].action.target()),
    };

    let mut lines: Vec<Line> = Vec::with_capacity(state.grid().height());
    for (y, row) in state.grid().rows().enumerate() {
        let mut spans: Vec<Span> = Vec::with_capacity(row.len());
        for (x, cell) in row.iter().enumerate() {
            let here = lockpick_core::Position::new(x, y);
            let span = if here == state.position() {
                Span::styled(
                    Cell::START.to_string(),
                    Style::default().fg(Color::White).bg(Color::Magenta).bold(),
                )
            } else if Some(here) == target {
                Span::styled(
                    cell.to_string(),
                    Style::default().fg(Color::Yellow).bg(Color::DarkGray),
                )
            } else if *cell == Cell::WALL {
                Span::styled(cell.to_string(), Style::default().fg(Color::Blue))
            } else if cell.is_exit() {
                Span::styled(cell.to_string(), Style::default().fg(Color::Green).bold())
            } else {
                Span::styled(cell.to_string(), Style::default().fg(key_color(cell.color_req)))
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    let board = Paragraph::new(lines)
        .block(Block::default().title("Lockpick").borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(board, area);
}

/// Renders the list of steps with the current one selected.
fn render_steps(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = std::iter::once("Start".to_string())
        .chain(app.path.steps().iter().map(|edge| edge.label()))
        .enumerate()
        .map(|(i, label)| ListItem::new(format!("{i:>3} {label}")))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Steps"))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Yellow));
    let mut list_state = ListState::default().with_selected(Some(app.step));
    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Renders the key counts, starred colors and toggles of the current step.
fn render_keys(frame: &mut Frame, area: Rect, app: &App) {
    let state = app.current_state();
    let mut spans: Vec<Span> = Vec::new();
    for (color, count) in state.keys().iter() {
        let star = if state.is_starred(color) { "*" } else { "" };
        let style = Style::default().fg(key_color(color));
        let style = if color == app.score_color { style.bold() } else { style };
        spans.push(Span::styled(format!("{color}{star}={count}  "), style));
    }
    for color in state.starred().iter().filter(|&&c| state.keys().get(c) == 0) {
        spans.push(Span::styled(
            format!("{color}*=0  "),
            Style::default().fg(key_color(*color)),
        ));
    }

    let mut lines = vec![Line::from(spans)];
    if !state.toggles().is_empty() {
        let toggles: Vec<String> = state.toggles().iter().map(char::to_string).collect();
        lines.push(Line::from(format!("Toggles on: {}", toggles.join(", "))));
    }

    let keys_widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Keys"));
    frame.render_widget(keys_widget, area);
}
