use super::panel;
use crate::config::Config;
use crate::core::{AppCore, InputRouter};
use crate::data::{UiEvent, UiState, WidgetStore};
use crate::frontend::{Frontend, FrontendEvent};
use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// TUI Frontend using ratatui
///
/// Owns the terminal, the focus/grab state and the input router. Raw mode,
/// the alternate screen and mouse capture are released by `cleanup()`, which
/// `Drop` also calls.
pub struct TuiFrontend {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    ui: UiState,
    router: InputRouter,
    keyboard_enhanced: bool,
    /// Engine revision on screen
    drawn_revision: Option<u64>,
    /// Local UI state changed since the last draw
    dirty: bool,
    active: bool,
}

impl TuiFrontend {
    /// Initializes terminal in raw mode, enables mouse capture, and enters alternate screen.
    pub fn new(config: &Config) -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste
        )
        .context("Failed to setup terminal")?;

        // Kitty-protocol terminals can report key releases, which lets a held
        // key hold a momentary button
        let keyboard_enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
        if keyboard_enhanced {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                )
            )
            .context("Failed to enable keyboard enhancement")?;
        }
        // The Windows console reports releases natively
        let key_release_reported = keyboard_enhanced || cfg!(windows);
        info!(
            "Terminal ready (key release events: {})",
            if key_release_reported { "yes" } else { "no" }
        );

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor()?;

        Ok(Self {
            terminal,
            ui: UiState::new(&config.panel, &config.ui),
            router: InputRouter::new(key_release_reported),
            keyboard_enhanced,
            drawn_revision: None,
            dirty: true,
            active: true,
        })
    }

    pub fn load_history(&mut self, path: &Path) -> io::Result<()> {
        self.ui.text_input.load_history(path)
    }

    pub fn save_history(&self, path: &Path) -> io::Result<()> {
        self.ui.text_input.save_history(path)
    }

    /// Convert crossterm event to FrontendEvent
    fn convert_event(event: Event) -> Option<FrontendEvent> {
        match event {
            Event::Key(key_event) => Some(FrontendEvent::Key {
                code: key_event.code,
                modifiers: key_event.modifiers,
                kind: key_event.kind,
            }),
            Event::Mouse(mouse_event) => Some(FrontendEvent::mouse(
                mouse_event.kind,
                mouse_event.column,
                mouse_event.row,
                mouse_event.modifiers,
            )),
            Event::Resize(w, h) => Some(FrontendEvent::resize(w, h)),
            Event::Paste(text) => Some(FrontendEvent::paste(text)),
            _ => None,
        }
    }
}

impl Frontend for TuiFrontend {
    fn poll_event(
        &mut self,
        widgets: &mut WidgetStore,
        timeout: Duration,
    ) -> Result<Option<UiEvent>> {
        if let Some(event) = self.router.next_pending() {
            self.dirty = true;
            return Ok(Some(event));
        }

        if !event::poll(timeout).context("Failed to poll terminal events")? {
            return Ok(None);
        }
        let Some(event) = Self::convert_event(event::read()?) else {
            return Ok(None);
        };

        self.dirty = true;
        Ok(self.router.route(&event, &mut self.ui, widgets))
    }

    fn render(&mut self, core: &AppCore) -> Result<()> {
        if !self.dirty && self.drawn_revision == Some(core.revision()) {
            return Ok(());
        }

        let ui = &mut self.ui;
        self.terminal
            .draw(|f| panel::draw(f, core, ui))
            .context("Failed to draw panel")?;

        self.dirty = false;
        self.drawn_revision = Some(core.revision());
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        if self.keyboard_enhanced {
            execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
        }
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        let size = self.terminal.size().unwrap_or_default();
        (size.width, size.height)
    }
}

impl Drop for TuiFrontend {
    fn drop(&mut self) {
        // Ensure terminal is restored even if cleanup() wasn't called
        let _ = self.cleanup();
    }
}
