//! Single-threaded control loop
//!
//! Each iteration polls the frontend for at most one event with a short
//! timeout, hands any resulting frame or break to the link, drains every
//! inbound byte that is waiting, and renders. Nothing blocks longer than the
//! poll timeout (plus a break pulse when one is requested).

use crate::core::AppCore;
use crate::frontend::Frontend;
use crate::protocol::LinkAction;
use crate::serial::Link;
use anyhow::Result;
use std::time::Duration;
use tracing::{info, warn};

/// Upper bound on link reads per iteration so a chattering device cannot
/// starve operator input
const MAX_DRAIN_READS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Closing,
}

pub struct ControlLoop {
    core: AppCore,
    state: LoopState,
    poll_timeout: Duration,
    rx_buf: Vec<u8>,
}

impl ControlLoop {
    pub fn new(core: AppCore) -> Self {
        let poll_timeout = core.config.ui.poll_timeout();
        Self {
            core,
            state: LoopState::Running,
            poll_timeout,
            rx_buf: Vec::with_capacity(256),
        }
    }

    /// Run one iteration and return the resulting state.
    pub fn step<F, L>(&mut self, frontend: &mut F, link: &mut L) -> Result<LoopState>
    where
        F: Frontend + ?Sized,
        L: Link + ?Sized,
    {
        if self.state == LoopState::Closing {
            return Ok(LoopState::Closing);
        }

        if let Some(event) = frontend.poll_event(&mut self.core.widgets, self.poll_timeout)? {
            if event.is_close() {
                info!("Closing on {:?}", event);
                self.state = LoopState::Closing;
                return Ok(LoopState::Closing);
            }
            if let Some(action) = self.core.handle_event(&event) {
                self.dispatch(link, action);
            }
        }

        self.drain(link);
        frontend.render(&self.core)?;
        Ok(self.state)
    }

    /// Iterate until a close event arrives.
    pub fn run<F, L>(&mut self, frontend: &mut F, link: &mut L) -> Result<()>
    where
        F: Frontend + ?Sized,
        L: Link + ?Sized,
    {
        self.core.set_link_description(link.describe());
        frontend.render(&self.core)?;

        while self.step(frontend, link)? == LoopState::Running {}

        info!(
            "Control loop stopped after {} frames sent, {} bytes ({} lines) received",
            self.core.frames_sent,
            self.core.bytes_received(),
            self.core.lines_received()
        );
        Ok(())
    }

    fn dispatch<L: Link + ?Sized>(&mut self, link: &mut L, action: LinkAction) {
        let result = match &action {
            LinkAction::Send(frame) => link.write_frame(frame),
            LinkAction::Break(duration) => link.send_break(*duration),
        };
        match result {
            Ok(()) => self.core.record_sent(&action),
            Err(e) => {
                warn!("Link error on {:?}: {}", action, e);
                self.core.record_link_error(&e);
            }
        }
    }

    fn drain<L: Link + ?Sized>(&mut self, link: &mut L) {
        for _ in 0..MAX_DRAIN_READS {
            self.rx_buf.clear();
            match link.read_available(&mut self.rx_buf) {
                Ok(0) => break,
                Ok(_) => self.core.ingest(&self.rx_buf),
                Err(e) => {
                    warn!("Link read error: {}", e);
                    self.core.record_link_error(&e);
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
impl ControlLoop {
    pub fn core(&self) -> &AppCore {
        &self.core
    }

    pub fn state(&self) -> LoopState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::data::{UiEvent, WidgetId, WidgetStore};
    use crate::protocol::Frame;
    use crate::serial::{LinkError, LoopbackLink};
    use std::collections::VecDeque;
    use std::io;

    enum Step {
        Event(UiEvent),
        /// Operator moves a slider; the store changes before the event is raised
        SetSlider(WidgetId, i32),
        Idle,
    }

    /// Frontend that replays a fixed script, then closes
    struct ScriptedFrontend {
        script: VecDeque<Step>,
        renders: usize,
    }

    impl ScriptedFrontend {
        fn new(script: Vec<Step>) -> Self {
            Self {
                script: script.into(),
                renders: 0,
            }
        }
    }

    impl Frontend for ScriptedFrontend {
        fn poll_event(
            &mut self,
            widgets: &mut WidgetStore,
            _timeout: Duration,
        ) -> Result<Option<UiEvent>> {
            Ok(match self.script.pop_front() {
                Some(Step::Event(event)) => Some(event),
                Some(Step::SetSlider(id, value)) => {
                    if let Some(slider) = widgets.slider_mut(id) {
                        slider.set_value(value);
                    }
                    Some(UiEvent::SliderChanged(id, value))
                }
                Some(Step::Idle) => None,
                None => Some(UiEvent::WindowClosed),
            })
        }

        fn render(&mut self, _core: &AppCore) -> Result<()> {
            self.renders += 1;
            Ok(())
        }

        fn cleanup(&mut self) -> Result<()> {
            Ok(())
        }

        fn size(&self) -> (u16, u16) {
            (80, 24)
        }
    }

    /// Link whose writes always fail but which still delivers inbound bytes
    #[derive(Default)]
    struct UnpluggedLink {
        inbound: Vec<u8>,
        write_attempts: usize,
    }

    impl Link for UnpluggedLink {
        fn write_frame(&mut self, _frame: &Frame) -> Result<(), LinkError> {
            self.write_attempts += 1;
            Err(LinkError::Write(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "device unplugged",
            )))
        }

        fn send_break(&mut self, _duration: Duration) -> Result<(), LinkError> {
            Err(LinkError::Break(serialport::Error::new(
                serialport::ErrorKind::NoDevice,
                "device unplugged",
            )))
        }

        fn bytes_available(&mut self) -> Result<usize, LinkError> {
            Ok(self.inbound.len())
        }

        fn read_available(&mut self, buf: &mut Vec<u8>) -> Result<usize, LinkError> {
            let n = self.inbound.len();
            buf.append(&mut self.inbound);
            Ok(n)
        }

        fn describe(&self) -> String {
            "unplugged".to_string()
        }
    }

    fn written(link: &LoopbackLink) -> Vec<&str> {
        link.written.iter().map(|f| f.as_str()).collect()
    }

    #[test]
    fn test_run_sends_frames_in_order() {
        let mut frontend = ScriptedFrontend::new(vec![
            Step::Event(UiEvent::ButtonDown(1)),
            Step::Event(UiEvent::ButtonUp(1)),
            Step::Event(UiEvent::ToggleChanged(2, true)),
            Step::SetSlider(1, 45000),
        ]);
        let mut link = LoopbackLink::silent();
        let mut control = ControlLoop::new(AppCore::new(Config::default()));

        control.run(&mut frontend, &mut link).unwrap();

        assert_eq!(control.state(), LoopState::Closing);
        assert_eq!(
            written(&link),
            vec!["b011\r", "b010\r", "t021\r", "s1 45000\r"]
        );
        assert_eq!(control.core().frames_sent, 4);
    }

    #[test]
    fn test_slider_frame_uses_current_value() {
        let mut frontend = ScriptedFrontend::new(vec![
            Step::SetSlider(1, 45000),
            // Stale payload from an earlier drag position
            Step::Event(UiEvent::SliderChanged(1, 31000)),
        ]);
        let mut link = LoopbackLink::silent();
        let mut control = ControlLoop::new(AppCore::new(Config::default()));

        control.run(&mut frontend, &mut link).unwrap();
        assert_eq!(written(&link), vec!["s1 45000\r", "s1 45000\r"]);
    }

    #[test]
    fn test_exit_stops_before_later_events() {
        let mut frontend = ScriptedFrontend::new(vec![
            Step::Event(UiEvent::ExitRequested),
            Step::Event(UiEvent::ButtonDown(1)),
        ]);
        let mut link = LoopbackLink::silent();
        let mut control = ControlLoop::new(AppCore::new(Config::default()));

        assert_eq!(
            control.step(&mut frontend, &mut link).unwrap(),
            LoopState::Closing
        );
        assert_eq!(
            control.step(&mut frontend, &mut link).unwrap(),
            LoopState::Closing
        );
        assert!(link.written.is_empty());
        assert_eq!(frontend.script.len(), 1);
    }

    #[test]
    fn test_echo_is_drained_every_iteration() {
        let mut frontend = ScriptedFrontend::new(vec![
            Step::Event(UiEvent::TextSubmitted("p 10".to_string())),
            Step::Idle,
        ]);
        let mut link = LoopbackLink::new();
        let mut control = ControlLoop::new(AppCore::new(Config::default()));

        assert_eq!(
            control.step(&mut frontend, &mut link).unwrap(),
            LoopState::Running
        );
        let console = &control.core().console;
        assert_eq!(console.lines.len(), 1);
        assert_eq!(console.lines[0].text, "$p 10");

        // Idle iterations still drain
        link.push_inbound(b"OK\r");
        control.step(&mut frontend, &mut link).unwrap();
        assert_eq!(control.core().console.lines.len(), 2);
        assert_eq!(frontend.renders, 2);
    }

    #[test]
    fn test_reset_gated_by_reset_enable() {
        let mut frontend = ScriptedFrontend::new(vec![Step::Event(UiEvent::ResetRequested)]);
        let mut link = LoopbackLink::silent();
        let mut control = ControlLoop::new(AppCore::new(Config::default()));
        control.run(&mut frontend, &mut link).unwrap();
        assert!(link.breaks.is_empty());

        let mut config = Config::default();
        config.panel.reset_enable_default = true;
        config.connection.break_ms = 250;
        let mut frontend = ScriptedFrontend::new(vec![Step::Event(UiEvent::ResetRequested)]);
        let mut link = LoopbackLink::silent();
        let mut control = ControlLoop::new(AppCore::new(config));
        control.run(&mut frontend, &mut link).unwrap();
        assert_eq!(link.breaks, vec![Duration::from_millis(250)]);
        assert!(link.written.is_empty());
    }

    #[test]
    fn test_write_failure_keeps_loop_running() {
        let mut frontend = ScriptedFrontend::new(vec![
            Step::Event(UiEvent::ButtonDown(1)),
            Step::Event(UiEvent::ButtonUp(1)),
        ]);
        let mut link = UnpluggedLink {
            inbound: b"boot\r".to_vec(),
            ..Default::default()
        };
        let mut control = ControlLoop::new(AppCore::new(Config::default()));

        assert_eq!(
            control.step(&mut frontend, &mut link).unwrap(),
            LoopState::Running
        );
        assert!(control
            .core()
            .status
            .as_deref()
            .is_some_and(|s| s.contains("device unplugged")));
        // Inbound bytes are still drained after a failed write
        assert_eq!(control.core().console.lines[0].text, "boot");

        control.run(&mut frontend, &mut link).unwrap();
        assert_eq!(link.write_attempts, 2);
        assert_eq!(control.core().frames_sent, 0);
    }
}
