use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use redact_config::LayoutConfig;
use redact_core::StringBuffer;
use redact_layout::{Breakpoint, ColumnLayout};
use redact_session::{ReviewSession, SortOrder};

use crate::host::{HostView, TuiHost};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    EditingReplacement,
    ShowingHelp,
    /// Quit requested with unwritten changes
    ConfirmQuit,
}

/// Layout cached for one table width so manual resizes stick until the
/// terminal is resized
struct CachedLayout {
    width: u32,
    breakpoint: Breakpoint,
    columns: ColumnLayout,
}

pub struct App {
    pub session: ReviewSession<StringBuffer>,
    pub view: Rc<RefCell<HostView>>,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub status_message: Option<String>,
    pub selected_column: usize,
    pub output_path: PathBuf,
    layout_config: LayoutConfig,
    layout: Option<CachedLayout>,
    resolved: Rc<Cell<bool>>,
    saved_revision: u64,
}

impl App {
    pub fn new(
        mut session: ReviewSession<StringBuffer>,
        layout_config: LayoutConfig,
        output_path: PathBuf,
    ) -> Self {
        let view = Rc::new(RefCell::new(HostView::default()));
        session.attach_host(TuiHost::new(view.clone()));

        let resolved = Rc::new(Cell::new(false));
        let flag = resolved.clone();
        session.on_resolved(move |_| flag.set(true));
        session.first();

        let saved_revision = session.buffer().revision();

        Self {
            session,
            view,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            status_message: None,
            selected_column: 0,
            output_path,
            layout_config,
            layout: None,
            resolved,
            saved_revision,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.session.buffer().revision() != self.saved_revision
    }

    /// Called after every action so the resolved notice shows up once
    fn after_action(&mut self) {
        if self.resolved.replace(false) {
            self.status_message = Some("All findings resolved - press w to write".to_string());
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn next(&mut self) {
        self.session.next();
    }

    pub fn previous(&mut self) {
        self.session.previous();
    }

    pub fn first(&mut self) {
        self.session.first();
    }

    pub fn last(&mut self) {
        self.session.last();
    }

    pub fn cycle_sort(&mut self) {
        let sort = self.session.sort();
        self.session
            .set_sort(SortOrder::new(sort.key.next(), sort.direction));
        self.status_message = Some(format!("Sorted by {}", sort.key.next().label()));
    }

    pub fn flip_sort(&mut self) {
        let sort = self.session.sort();
        self.session
            .set_sort(SortOrder::new(sort.key, sort.direction.flipped()));
    }

    // ------------------------------------------------------------------
    // Decisions
    // ------------------------------------------------------------------

    fn current_key(&self) -> Option<redact_core::OccurrenceKey> {
        self.session.current().map(|o| o.key.clone())
    }

    pub fn accept_current(&mut self) {
        if let Some(key) = self.current_key() {
            self.status_message = Some(match self.session.accept(&key) {
                Ok(outcome) => format!("Accepted: {} replacements", outcome.replacements),
                Err(e) => format!("Accept failed: {}", e),
            });
        }
        self.after_action();
    }

    pub fn skip_current(&mut self) {
        if let Some(key) = self.current_key() {
            self.status_message = Some(match self.session.skip(&key) {
                Ok(outcome) => format!("Marked {}", outcome.status.label()),
                Err(e) => format!("Skip failed: {}", e),
            });
        }
        self.after_action();
    }

    pub fn revert_current(&mut self) {
        if let Some(key) = self.current_key() {
            self.status_message = Some(match self.session.revert(&key) {
                Ok(outcome) => format!("Reverted: {} replacements", outcome.replacements),
                Err(e) => format!("Revert failed: {}", e),
            });
        }
        self.after_action();
    }

    /// Enter: accept if undecided, otherwise nothing
    pub fn activate(&mut self) {
        match self.session.activate_current() {
            Ok(Some(outcome)) => {
                self.status_message = Some(format!("Accepted: {} replacements", outcome.replacements));
            }
            Ok(None) => {}
            Err(e) => self.status_message = Some(format!("Accept failed: {}", e)),
        }
        self.after_action();
    }

    pub fn apply_all(&mut self) {
        self.status_message = Some(match self.session.apply_all() {
            Ok(outcome) => format!("Applied {} groups", outcome.groups),
            Err(e) => format!("Apply all failed: {}", e),
        });
        self.after_action();
    }

    pub fn skip_all(&mut self) {
        self.status_message = Some(match self.session.skip_all() {
            Ok(outcome) => format!("Skipped {} groups", outcome.groups),
            Err(e) => format!("Skip all failed: {}", e),
        });
        self.after_action();
    }

    pub fn revert_all(&mut self) {
        self.status_message = Some(match self.session.revert_all() {
            Ok(outcome) => format!("Reverted {} groups", outcome.groups),
            Err(e) => format!("Revert all failed: {}", e),
        });
        self.after_action();
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    pub fn start_edit_replacement(&mut self) {
        if let Some(current) = self.session.current() {
            self.input_buffer = self.session.effective_replacement(current).to_string();
            self.input_mode = InputMode::EditingReplacement;
        }
    }

    pub fn confirm_edit_replacement(&mut self) {
        let text = self.input_buffer.clone();
        if let Some(key) = self.current_key() {
            self.status_message = Some(match self.session.edit_replacement(&key, &text) {
                Ok(outcome) if outcome.replacements > 0 => {
                    format!("Replacement updated: {} replacements", outcome.replacements)
                }
                Ok(_) => "Replacement updated".to_string(),
                Err(e) => format!("Edit failed: {}", e),
            });
        }
        self.cancel_input();
        self.after_action();
    }

    pub fn toggle_help(&mut self) {
        self.input_mode = match self.input_mode {
            InputMode::ShowingHelp => InputMode::Normal,
            _ => InputMode::ShowingHelp,
        };
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    pub fn input_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn input_backspace(&mut self) {
        self.input_buffer.pop();
    }

    // ------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------

    /// Column widths for a table `width` cells wide
    pub fn columns_for(&mut self, width: u32) -> Result<&ColumnLayout> {
        let stale = self.layout.as_ref().is_none_or(|cached| cached.width != width);
        if stale {
            let breakpoint = Breakpoint::for_width(width, &self.layout_config.thresholds());
            let tables = self.layout_config.tables();
            let columns = ColumnLayout::allocate(
                tables.table(breakpoint),
                width,
                self.layout_config.min_column_width,
            )?;
            self.layout = Some(CachedLayout {
                width,
                breakpoint,
                columns,
            });
            self.clamp_selected_column();
        }

        self.layout
            .as_ref()
            .map(|cached| &cached.columns)
            .context("layout not allocated")
    }

    pub fn breakpoint(&self) -> Option<Breakpoint> {
        self.layout.as_ref().map(|cached| cached.breakpoint)
    }

    fn clamp_selected_column(&mut self) {
        let Some(cached) = &self.layout else {
            return;
        };
        if !cached.columns.is_visible(self.selected_column) {
            self.selected_column = cached.columns.visible().next().map_or(0, |(i, _, _)| i);
        }
    }

    pub fn select_column(&mut self, forward: bool) {
        let Some(cached) = &self.layout else {
            return;
        };
        let visible: Vec<usize> = cached.columns.visible().map(|(i, _, _)| i).collect();
        let Some(position) = visible.iter().position(|&i| i == self.selected_column) else {
            return;
        };
        let next = if forward {
            (position + 1).min(visible.len() - 1)
        } else {
            position.saturating_sub(1)
        };
        self.selected_column = visible[next];
    }

    pub fn resize_column(&mut self, delta: i32) {
        let Some(cached) = self.layout.as_mut() else {
            return;
        };
        match cached.columns.resize(self.selected_column, delta) {
            Ok(0) => self.status_message = Some("Column cannot be resized further".to_string()),
            Ok(_) => {}
            Err(e) => self.status_message = Some(format!("Resize failed: {}", e)),
        }
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    pub fn write_output(&mut self) -> Result<()> {
        std::fs::write(&self.output_path, self.session.buffer().as_str())
            .with_context(|| format!("Failed to write {}", self.output_path.display()))?;
        self.saved_revision = self.session.buffer().revision();
        self.status_message = Some(format!("Wrote {}", self.output_path.display()));
        Ok(())
    }

    /// Write the output, reporting a failure in the status line
    pub fn save(&mut self) -> bool {
        match self.write_output() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("{:#}", e);
                self.status_message = Some(format!("Write failed: {}", e));
                false
            }
        }
    }

    /// Whether the app may exit now. With unwritten changes this asks for
    /// confirmation first.
    pub fn request_quit(&mut self) -> bool {
        if !self.is_dirty() {
            return true;
        }
        self.input_mode = InputMode::ConfirmQuit;
        false
    }
}
