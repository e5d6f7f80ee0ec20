use std::io::{self, Stdout};
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use indexmap::IndexMap;
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::{
    domain::{FieldKey, FormSpec, recovery_request},
    draft::{DRAFT_TTL_HOURS, DraftStore},
    form::{EngineOutcome, FormCommand, FormEngine},
    ui::{self, FormRow, UiContext},
};

const HELP_TEXT: &str = "Tab/Shift+Tab move • Space cycle choice • Ctrl+N add recorder • Ctrl+T add time-frame • Ctrl+D/Ctrl+X remove • Ctrl+S submit • Ctrl+Q quit";
const READY_STATUS: &str = "Ready. Ctrl+S validates and submits.";

#[derive(Debug, Clone)]
pub struct UiOptions {
    pub tick_rate: Duration,
    pub autosave: bool,
    pub confirm_exit: bool,
    pub show_help: bool,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
            autosave: true,
            confirm_exit: true,
            show_help: true,
        }
    }
}

/// The terminal front-end: builds a [`FormEngine`] for a form spec, restores
/// any saved draft, and runs the event loop until submit or quit.
pub struct FormUi {
    spec: FormSpec,
    title: Option<String>,
    options: UiOptions,
    store: Option<Box<dyn DraftStore>>,
    draft_ttl: chrono::Duration,
}

impl FormUi {
    pub fn new(spec: FormSpec) -> Self {
        Self {
            spec,
            title: None,
            options: UiOptions::default(),
            store: None,
            draft_ttl: chrono::Duration::hours(DRAFT_TTL_HOURS),
        }
    }

    /// The built-in footage-recovery request form.
    pub fn recovery() -> Self {
        Self::new(recovery_request())
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_options(mut self, options: UiOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_store(mut self, store: Box<dyn DraftStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_draft_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.draft_ttl = ttl;
        self
    }

    /// Runs the form. Returns the collected address-to-value map on submit,
    /// or `None` when the user quits without submitting.
    pub fn run(self) -> Result<Option<IndexMap<String, String>>> {
        let FormUi {
            spec,
            title,
            options,
            store,
            draft_ttl,
        } = self;

        let form_id = spec.id.clone();
        let mut engine = FormEngine::new(spec, Local::now().naive_local());
        let mut status = READY_STATUS.to_string();

        if let Some(store) = &store {
            match store.load(&form_id, Utc::now())? {
                Some(snapshot) => match engine.restore_draft(&snapshot) {
                    Ok(report) => {
                        status = format!(
                            "Draft from {} restored ({} recorder(s))",
                            snapshot.saved_at.format("%Y-%m-%d %H:%M"),
                            report.groups
                        );
                    }
                    Err(err) => {
                        log::warn!("draft restore failed: {err}");
                        status = "Saved draft could not be restored; starting fresh.".to_string();
                    }
                },
                None => status = READY_STATUS.to_string(),
            }
        }

        let mut app = App {
            engine,
            options,
            store,
            draft_ttl,
            form_id,
            title,
            status,
            selected: 0,
            exit_armed: false,
            should_quit: false,
            result: None,
        };
        app.run()
    }
}

struct App {
    engine: FormEngine,
    options: UiOptions,
    store: Option<Box<dyn DraftStore>>,
    draft_ttl: chrono::Duration,
    form_id: String,
    title: Option<String>,
    status: String,
    selected: usize,
    exit_armed: bool,
    should_quit: bool,
    result: Option<IndexMap<String, String>>,
}

impl App {
    fn run(&mut self) -> Result<Option<IndexMap<String, String>>> {
        let mut terminal = TerminalGuard::new()?;
        while !self.should_quit {
            self.engine.set_wall_clock(Local::now().naive_local());
            let rows = ui::build_rows(self.engine.form(), self.engine.validator());
            self.clamp_selection(&rows);
            self.draw(&mut terminal, &rows)?;

            if event::poll(self.options.tick_rate).context("failed to poll terminal events")? {
                match event::read().context("failed to read terminal event")? {
                    Event::Key(key) => self.handle_key(key, &rows),
                    _ => {}
                }
            }

            let tick = self.engine.tick(Instant::now());
            if tick.autosave_due && self.options.autosave {
                self.autosave()?;
            }
        }
        Ok(self.result.take())
    }

    fn draw(&self, terminal: &mut TerminalGuard, rows: &[FormRow]) -> Result<()> {
        let error_count = self
            .engine
            .form()
            .fields()
            .filter(|field| field.error.is_some())
            .count();
        let help = self.options.show_help.then_some(HELP_TEXT);
        let title = self
            .title
            .as_deref()
            .unwrap_or(&self.engine.form().spec().title)
            .to_string();
        terminal
            .draw(|frame| {
                ui::draw(
                    frame,
                    UiContext {
                        title: &title,
                        rows,
                        selected: self.selected,
                        progress: self.engine.progress(),
                        status_message: &self.status,
                        dirty: self.engine.is_dirty(),
                        error_count,
                        help,
                    },
                )
            })
            .context("failed to draw frame")?;
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent, rows: &[FormRow]) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let now = Instant::now();

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') | KeyCode::Char('S') => self.on_submit(now),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Char('c')
                | KeyCode::Char('C') => self.on_exit(),
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.dispatch(FormCommand::AddGroup, now);
                    self.status = format!(
                        "Recorder #{} added",
                        self.engine.form().group_count()
                    );
                }
                KeyCode::Char('t') | KeyCode::Char('T') => self.on_add_item(rows, now),
                KeyCode::Char('d') | KeyCode::Char('D') => self.on_remove_group(rows, now),
                KeyCode::Char('x') | KeyCode::Char('X') => self.on_remove_item(rows, now),
                KeyCode::Char('r') | KeyCode::Char('R') => {
                    self.dispatch(FormCommand::Reset, now);
                    self.status = "Form reset".to_string();
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => self.move_selection(rows, 1, now),
            KeyCode::BackTab | KeyCode::Up => self.move_selection(rows, -1, now),
            KeyCode::Esc => {
                self.exit_armed = false;
                self.status = READY_STATUS.to_string();
            }
            KeyCode::Enter => {
                if let Some(field_key) = self.selected_key(rows) {
                    self.dispatch(FormCommand::Blur { key: field_key }, now);
                }
            }
            _ => self.edit_selected(key, rows, now),
        }
    }

    fn edit_selected(&mut self, key: KeyEvent, rows: &[FormRow], now: Instant) {
        let Some(field_key) = self.selected_key(rows) else {
            return;
        };
        let Some(field) = self.engine.form().field(&field_key) else {
            return;
        };

        if field.spec.kind.options().is_some() {
            let delta = match key.code {
                KeyCode::Left => -1,
                KeyCode::Right | KeyCode::Char(' ') => 1,
                _ => return,
            };
            if let Some(index) = field.cycled_option(delta) {
                self.dispatch(
                    FormCommand::SelectOption {
                        key: field_key,
                        index,
                    },
                    now,
                );
            }
            return;
        }

        let current = field.raw_value();
        let Some(edited) = edited_text(&current, &key) else {
            return;
        };
        let command = if field.spec.kind.is_picker_backed() {
            FormCommand::SetDateTime {
                key: field_key,
                value: edited,
            }
        } else {
            FormCommand::EditText {
                key: field_key,
                text: edited,
            }
        };
        self.dispatch(command, now);
    }

    fn on_submit(&mut self, now: Instant) {
        self.exit_armed = false;
        match self.engine.dispatch(FormCommand::Submit, now) {
            EngineOutcome::Submitted(values) => {
                if let Some(store) = &self.store {
                    if let Err(err) = store.clear(&self.form_id) {
                        log::warn!("failed to clear draft after submit: {err}");
                    }
                }
                self.status = format!("Submitted {} field(s)", values.len());
                self.result = Some(values);
                self.should_quit = true;
            }
            EngineOutcome::Blocked {
                issues,
                first_invalid,
            } => {
                self.status = format!("{issues} issue(s) block submission");
                if let Some(key) = first_invalid {
                    self.focus_key(&key);
                }
            }
            _ => {}
        }
    }

    fn on_exit(&mut self) {
        if self.options.confirm_exit && self.engine.is_dirty() && !self.exit_armed {
            self.exit_armed = true;
            self.status =
                "Unsaved changes. Press Ctrl+Q again to quit without submitting.".to_string();
            return;
        }
        self.should_quit = true;
    }

    fn on_add_item(&mut self, rows: &[FormRow], now: Instant) {
        let group = self
            .selected_key(rows)
            .and_then(|key| key.group_index())
            .unwrap_or(0);
        self.dispatch(FormCommand::AddItem { group }, now);
        self.status = format!("Time-frame added to recorder #{}", group + 1);
    }

    fn on_remove_group(&mut self, rows: &[FormRow], now: Instant) {
        match self.selected_key(rows).and_then(|key| key.group_index()) {
            Some(group) if group > 0 => {
                self.dispatch(FormCommand::RemoveGroup { group }, now);
                self.status = format!("Recorder #{} removed", group + 1);
            }
            _ => {
                self.status = "The first recorder cannot be removed".to_string();
            }
        }
    }

    fn on_remove_item(&mut self, rows: &[FormRow], now: Instant) {
        let coords = self.selected_key(rows).and_then(|key| {
            Some((key.group_index()?, key.item_index()?))
        });
        match coords {
            Some((group, item)) if item > 0 => {
                self.dispatch(FormCommand::RemoveItem { group, item }, now);
                self.status = format!("Time-frame #{} removed", item + 1);
            }
            _ => {
                self.status = "The first time-frame cannot be removed".to_string();
            }
        }
    }

    fn dispatch(&mut self, command: FormCommand, now: Instant) {
        self.exit_armed = false;
        if let EngineOutcome::Rejected(err) = self.engine.dispatch(command, now) {
            self.status = err.to_string();
        }
    }

    fn autosave(&mut self) -> Result<()> {
        let Some(store) = &self.store else {
            self.engine.mark_saved();
            return Ok(());
        };
        let snapshot = self.engine.serialize_draft(Utc::now(), self.draft_ttl);
        store
            .save(&self.form_id, &snapshot)
            .context("failed to autosave draft")?;
        self.engine.mark_saved();
        self.status = "Draft autosaved".to_string();
        Ok(())
    }

    fn selected_key(&self, rows: &[FormRow]) -> Option<FieldKey> {
        rows.get(self.selected).and_then(|row| row.key.clone())
    }

    /// Moves to the next/previous field row, skipping headers, blurring the
    /// field being left.
    fn move_selection(&mut self, rows: &[FormRow], delta: i32, now: Instant) {
        self.exit_armed = false;
        if let Some(key) = self.selected_key(rows) {
            self.dispatch(FormCommand::Blur { key }, now);
        }
        let selectable: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.key.is_some())
            .map(|(index, _)| index)
            .collect();
        if selectable.is_empty() {
            return;
        }
        let position = selectable
            .iter()
            .position(|index| *index >= self.selected)
            .unwrap_or(0);
        let len = selectable.len() as i32;
        let next = (position as i32 + delta).rem_euclid(len);
        self.selected = selectable[next as usize];
    }

    fn focus_key(&mut self, key: &FieldKey) {
        let rows = ui::build_rows(self.engine.form(), self.engine.validator());
        if let Some(index) = rows
            .iter()
            .position(|row| row.key.as_ref() == Some(key))
        {
            self.selected = index;
        }
    }

    fn clamp_selection(&mut self, rows: &[FormRow]) {
        let selectable: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.key.is_some())
            .map(|(index, _)| index)
            .collect();
        let Some(last) = selectable.last().copied() else {
            self.selected = 0;
            return;
        };
        if !selectable.contains(&self.selected) {
            self.selected = selectable
                .iter()
                .copied()
                .find(|index| *index >= self.selected)
                .unwrap_or(last);
        }
    }
}

fn edited_text(current: &str, key: &KeyEvent) -> Option<String> {
    match key.code {
        KeyCode::Char(c) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return None;
            }
            let mut next = current.to_string();
            next.push(c);
            Some(next)
        }
        KeyCode::Backspace => {
            let mut next = current.to_string();
            next.pop();
            Some(next)
        }
        KeyCode::Delete => Some(String::new()),
        _ => None,
    }
}

struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("failed to initialize terminal")?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

impl Deref for TerminalGuard {
    type Target = Terminal<CrosstermBackend<Stdout>>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for TerminalGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}
