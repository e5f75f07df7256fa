//! Terminal user interface (TUI) for pips.
//!
//! ## Entry points
//!
//! - [`run_dice_tui`]: full-screen die with roll history and statistics.

pub mod dice;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use dice::{DiceAction, DiceView};
use pips_core::RollController;
use pips_core::config::UserConfig;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::Instant;
use tracing::info;

/// Run the interactive dice view until the user quits.
pub fn run_dice_tui(config: &UserConfig) -> Result<()> {
    let controller = RollController::seeded(config.roll.seed, config.roll.delay());
    let mut view = DiceView::new(controller);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(err) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(err.into());
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(terminal) => terminal,
        Err(err) => {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            return Err(err.into());
        }
    };

    let result = event_loop(&mut terminal, &mut view, config);

    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    let history = view.controller().history();
    info!(rolls = history.len(), "dice view closed");
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    view: &mut DiceView,
    config: &UserConfig,
) -> Result<()> {
    let tick_rate = config.tui.tick();

    loop {
        if view.needs_redraw() {
            terminal.draw(|frame| {
                let area = frame.area();
                view.render(area, frame.buffer_mut());
            })?;
            view.mark_drawn();
        }

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(DiceAction::Quit) = view.handle_key(key, Instant::now()) {
                        return Ok(());
                    }
                }
                Event::Resize(..) => view.invalidate(),
                _ => {}
            }
        }

        view.tick(Instant::now());
    }
}
