use crate::config::Config;
use crate::core::button_state::{ButtonState, ButtonStateMachine, ButtonTransition};
use crate::core::rx_assembler::RxLineAssembler;
use crate::data::{UiEvent, WidgetStore};
use crate::protocol::{self, LinkAction};
use crate::serial::LinkError;
use crate::widgets::ConsoleState;
use std::error::Error as _;
use tracing::{debug, info, warn};

/// Core application state (frontend-agnostic)
///
/// AppCore turns panel events into link actions and folds inbound bytes into
/// the console. It never touches the link or the terminal itself; the control
/// loop performs the I/O and reports the outcome back.
pub struct AppCore {
    /// Application configuration
    pub config: Config,

    /// Live toggle/slider values and the reset-enable flag
    pub widgets: WidgetStore,

    /// Device echo
    pub console: ConsoleState,

    /// Last link problem, shown in the status bar
    pub status: Option<String>,

    /// Human-readable link name for the status bar
    pub link_description: String,

    /// Frames and breaks successfully handed to the link
    pub frames_sent: u64,

    buttons: ButtonStateMachine,
    rx: RxLineAssembler,

    /// Bumped whenever something the frontend renders from this struct changes
    revision: u64,
}

impl AppCore {
    pub fn new(config: Config) -> Self {
        let widgets = WidgetStore::from_panel(&config.panel);
        let mut console = ConsoleState::new(config.ui.buffer_size);
        console.show_timestamps = config.ui.show_timestamps;

        Self {
            config,
            widgets,
            console,
            status: None,
            link_description: String::new(),
            frames_sent: 0,
            buttons: ButtonStateMachine::new(),
            rx: RxLineAssembler::new(),
            revision: 0,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn button_state(&self) -> ButtonState {
        self.buttons.state()
    }

    /// Bytes received from the device so far
    pub fn bytes_received(&self) -> u64 {
        self.rx.bytes_seen()
    }

    /// Complete lines received from the device so far
    pub fn lines_received(&self) -> u64 {
        self.rx.lines_completed()
    }

    pub fn set_link_description(&mut self, description: String) {
        self.link_description = description;
        self.touch();
    }

    /// Work out what the link must do for one panel event.
    ///
    /// Close events, disabled resets, out-of-range ids and out-of-sequence
    /// button events all yield `None`.
    pub fn handle_event(&mut self, event: &UiEvent) -> Option<LinkAction> {
        match event {
            UiEvent::WindowClosed | UiEvent::ExitRequested => return None,
            UiEvent::ResetRequested => return self.reset_action(),
            _ => {}
        }

        // Encode before touching the button state machine so a malformed id
        // can never leave a button held.
        let frame = match protocol::encode(event, &self.widgets) {
            Ok(Some(frame)) => frame,
            Ok(None) => return None,
            Err(e) => {
                warn!("Dropping malformed event {:?}: {}", event, e);
                return None;
            }
        };

        let transition = match event {
            UiEvent::ButtonDown(id) => Some(self.buttons.press(*id)),
            UiEvent::ButtonUp(id) => Some(self.buttons.release(*id)),
            _ => None,
        };
        if transition == Some(ButtonTransition::Ignored) {
            debug!(
                "Ignoring {:?} while buttons are {:?}",
                event,
                self.buttons.state()
            );
            return None;
        }

        self.touch();
        Some(LinkAction::Send(frame))
    }

    fn reset_action(&self) -> Option<LinkAction> {
        if self.widgets.reset_enable() {
            let duration = self.config.connection.break_duration();
            info!("Reset requested, asserting break for {:?}", duration);
            Some(LinkAction::Break(duration))
        } else {
            info!("Reset requested but reset is disabled");
            None
        }
    }

    /// Feed inbound bytes through the line assembler into the console.
    pub fn ingest(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        for &byte in bytes {
            let event = self.rx.feed(byte);
            self.console.apply(event);
        }
        self.touch();
    }

    pub fn record_sent(&mut self, action: &LinkAction) {
        self.frames_sent += 1;
        self.status = match action {
            LinkAction::Send(_) => None,
            LinkAction::Break(_) => Some("Reset pulse sent".to_string()),
        };
        self.touch();
    }

    pub fn record_link_error(&mut self, error: &LinkError) {
        let message = match error.source() {
            Some(source) => format!("{}: {}", error, source),
            None => error.to_string(),
        };
        self.status = Some(message);
        self.touch();
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
