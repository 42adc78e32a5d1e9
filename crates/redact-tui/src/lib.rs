//! Terminal review surface: findings table, document preview and key bindings

mod app;
mod host;
mod ui;

pub use app::{App, InputMode};
pub use host::{HostView, TuiHost};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;

/// Columns moved per `<` / `>` press
const RESIZE_STEP: i32 = 2;

pub fn run(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // the preview pane is gone; anything still sent to it is dropped
    app.view.borrow_mut().closed = true;
    app.session.detach_host();

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match app.input_mode {
                InputMode::Normal => match key.code {
                    KeyCode::Char('q') => {
                        if app.request_quit() {
                            return Ok(());
                        }
                    }
                    KeyCode::Char('?') => app.toggle_help(),
                    KeyCode::Char('j') | KeyCode::Down => app.next(),
                    KeyCode::Char('k') | KeyCode::Up => app.previous(),
                    KeyCode::Char('g') | KeyCode::Home => app.first(),
                    KeyCode::Char('G') | KeyCode::End => app.last(),
                    KeyCode::Enter => app.activate(),
                    KeyCode::Char('a') => app.accept_current(),
                    KeyCode::Char('s') => app.skip_current(),
                    KeyCode::Char('r') => app.revert_current(),
                    KeyCode::Char('e') => app.start_edit_replacement(),
                    KeyCode::Char('A') => app.apply_all(),
                    KeyCode::Char('S') => app.skip_all(),
                    KeyCode::Char('R') => app.revert_all(),
                    KeyCode::Char('o') => app.cycle_sort(),
                    KeyCode::Char('O') => app.flip_sort(),
                    KeyCode::Char('h') | KeyCode::Left => app.select_column(false),
                    KeyCode::Char('l') | KeyCode::Right => app.select_column(true),
                    KeyCode::Char('<') => app.resize_column(-RESIZE_STEP),
                    KeyCode::Char('>') => app.resize_column(RESIZE_STEP),
                    KeyCode::Char('w') => {
                        app.save();
                    }
                    _ => {}
                },
                InputMode::EditingReplacement => match key.code {
                    KeyCode::Enter => app.confirm_edit_replacement(),
                    KeyCode::Esc => app.cancel_input(),
                    KeyCode::Backspace => app.input_backspace(),
                    KeyCode::Char(c) => app.input_char(c),
                    _ => {}
                },
                InputMode::ShowingHelp => match key.code {
                    KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => app.toggle_help(),
                    _ => {}
                },
                InputMode::ConfirmQuit => match key.code {
                    KeyCode::Char('y') => return Ok(()),
                    KeyCode::Char('w') => {
                        if app.save() {
                            return Ok(());
                        }
                        app.cancel_input();
                    }
                    KeyCode::Char('n') | KeyCode::Esc => app.cancel_input(),
                    _ => {}
                },
            }
        }
    }
}
