//! The Count's Timepiece - Entry Point
//!
//! Initializes the terminal and audio output, then runs the frame loop
//! that samples the clock, advances chime timers, and redraws.

use std::fs::OpenOptions;
use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use timepiece::audio::KiraBackend;
use timepiece::settings::Settings;
use timepiece::ui::App;
use timepiece::Timepiece;

/// Target frames per second for the display loop
const TARGET_FPS: u64 = 30;
const FRAME_TIME: Duration = Duration::from_millis(1000 / TARGET_FPS);

fn main() -> Result<()> {
    // Log to a file so nothing interferes with the TUI
    let log_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("timepiece.log")
        .unwrap_or_else(|_| OpenOptions::new().write(true).open("/dev/null").unwrap());

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    log::info!("Starting Timepiece v{}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load();
    let backend = KiraBackend::new(&settings);
    if !backend.is_available() {
        log::warn!("No audio device; running with visual chimes only");
    }
    let mut clock = Timepiece::new(Box::new(backend), &settings);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(terminal_backend)?;

    let mut app = App::new();
    let result = run_loop(&mut terminal, &mut app, &mut clock);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("Exited with error: {}", e);
        eprintln!("Error: {}", e);
    }

    log::info!("Timepiece shut down cleanly");
    result
}

/// Main display loop
fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    clock: &mut Timepiece,
) -> Result<()> {
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();
        let delta = frame_start.duration_since(last_frame);
        last_frame = frame_start;

        // Handle input
        if event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events, not releases
                if key.kind == KeyEventKind::Press {
                    match app.handle_input(key, clock) {
                        Ok(should_quit) if should_quit => break,
                        Ok(_) => {}
                        Err(e) => log::warn!("Input handling error: {}", e),
                    }
                }
            }
        }

        // Advance the clock and chime timers
        clock.update(delta);

        // Render
        terminal.draw(|frame| {
            app.render(frame, clock);
        })?;

        // Frame rate limiting
        let frame_time = frame_start.elapsed();
        if frame_time < FRAME_TIME {
            std::thread::sleep(FRAME_TIME - frame_time);
        }
    }

    Ok(())
}
