//! Panel layout and drawing
//!
//! Lays out the control block, the console, the send field and the status
//! bar, and records every interactive item's screen rectangle into `UiState`
//! so mouse input can be resolved on the next event.

use super::slider_bar::SliderBar;
use crate::config::PanelConfig;
use crate::core::button_state::ButtonState;
use crate::core::AppCore;
use crate::data::{PanelItem, UiState, WidgetRegion};
use crate::widgets::ConsoleLine;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Width reserved for widget labels in front of sliders
const LABEL_WIDTH: u16 = 20;
const ITEM_GAP: u16 = 3;

pub fn draw(f: &mut Frame, core: &AppCore, ui: &mut UiState) {
    let panel = &core.config.panel;
    let control_rows = panel.buttons.len() + panel.toggles.len() + panel.sliders.len() + 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(control_rows as u16 + 2),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    ui.regions.clear();
    draw_controls(f, chunks[0], core, panel, ui);
    draw_console(f, chunks[1], core, ui);
    draw_text_input(f, chunks[2], ui);
    draw_status_bar(f, chunks[3], core);
}

fn item_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn check_box(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Row `index` inside `inner`, if it is on screen
fn row(inner: Rect, index: usize) -> Option<Rect> {
    let offset = u16::try_from(index).ok()?;
    if offset >= inner.height {
        return None;
    }
    Some(Rect::new(inner.x, inner.y + offset, inner.width, 1))
}

/// Write `text` at `(x, y)` clipped to `max_x`, register it as `item`, and
/// return the column just past it.
fn put_item(
    f: &mut Frame,
    ui: &mut UiState,
    item: PanelItem,
    (x, y): (u16, u16),
    max_x: u16,
    text: &str,
    style: Style,
) -> u16 {
    let width = (text.chars().count() as u16).min(max_x.saturating_sub(x));
    if width == 0 {
        return x;
    }
    f.buffer_mut().set_stringn(x, y, text, width as usize, style);
    ui.regions.push(WidgetRegion {
        item,
        x,
        y,
        width,
        height: 1,
    });
    x + width
}

fn focus_marker(f: &mut Frame, area: Rect, focused: bool) {
    if focused {
        f.buffer_mut()
            .set_string(area.x, area.y, ">", Style::default().fg(Color::Yellow));
    }
}

fn draw_controls(f: &mut Frame, area: Rect, core: &AppCore, panel: &PanelConfig, ui: &mut UiState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", panel.title));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let max_x = inner.right();
    let mut index = 0;

    for button in &panel.buttons {
        if let Some(rect) = row(inner, index) {
            let item = PanelItem::Button(button.id);
            let focused = ui.is_focused(item);
            focus_marker(f, rect, focused);

            let mut style = item_style(focused);
            if core.button_state() == ButtonState::Active(button.id) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            let text = format!("[ {} ]", button.label);
            put_item(f, ui, item, (rect.x + 2, rect.y), max_x, &text, style);
        }
        index += 1;
    }

    for toggle in &panel.toggles {
        if let Some(rect) = row(inner, index) {
            let item = PanelItem::Toggle(toggle.id);
            let focused = ui.is_focused(item);
            focus_marker(f, rect, focused);

            let on = core.widgets.toggle(toggle.id).unwrap_or(false);
            let text = format!("{} {}", check_box(on), toggle.label);
            put_item(f, ui, item, (rect.x + 2, rect.y), max_x, &text, item_style(focused));
        }
        index += 1;
    }

    for slider in &panel.sliders {
        if let Some(rect) = row(inner, index) {
            let item = PanelItem::Slider(slider.id);
            let focused = ui.is_focused(item);
            focus_marker(f, rect, focused);

            let label_width = LABEL_WIDTH.min(rect.width.saturating_sub(2));
            f.buffer_mut().set_stringn(
                rect.x + 2,
                rect.y,
                &slider.label,
                label_width.saturating_sub(1) as usize,
                item_style(focused),
            );

            let bar = Rect::new(
                rect.x + 2 + label_width,
                rect.y,
                rect.width.saturating_sub(2 + label_width),
                1,
            );
            if let Some(state) = core.widgets.slider(slider.id) {
                SliderBar::new(state)
                    .focused(focused)
                    .render(bar, f.buffer_mut());
                if bar.width > 0 {
                    ui.regions.push(WidgetRegion {
                        item,
                        x: bar.x,
                        y: bar.y,
                        width: bar.width,
                        height: 1,
                    });
                }
            }
        }
        index += 1;
    }

    if let Some(rect) = row(inner, index) {
        let mut x = rect.x + 2;

        let focused = ui.is_focused(PanelItem::ResetEnable);
        let text = format!("{} Reset enabled", check_box(core.widgets.reset_enable()));
        x = put_item(f, ui, PanelItem::ResetEnable, (x, rect.y), max_x, &text, item_style(focused));

        let focused = ui.is_focused(PanelItem::Reset);
        let mut style = item_style(focused);
        if core.widgets.reset_enable() {
            style = style.fg(Color::Red);
        } else {
            style = style.add_modifier(Modifier::DIM);
        }
        x = put_item(f, ui, PanelItem::Reset, (x + ITEM_GAP, rect.y), max_x, "[ RESET ]", style);

        let focused = ui.is_focused(PanelItem::Exit);
        put_item(f, ui, PanelItem::Exit, (x + ITEM_GAP, rect.y), max_x, "[ Exit ]", item_style(focused));
    }
}

fn printable(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { '.' } else { c })
        .collect()
}

fn console_line(line: &ConsoleLine, show_timestamps: bool) -> Line<'static> {
    let mut spans = Vec::with_capacity(2);
    if show_timestamps {
        spans.push(Span::styled(
            format!("[{}] ", line.received_at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    spans.push(Span::raw(printable(&line.text)));
    Line::from(spans)
}

fn draw_console(f: &mut Frame, area: Rect, core: &AppCore, ui: &mut UiState) {
    let console = &core.console;
    ui.console_scroll = ui.console_scroll.min(console.lines.len());

    let title = if ui.console_scroll > 0 {
        format!(" Console [+{}] ", ui.console_scroll)
    } else {
        " Console ".to_string()
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let height = inner.height as usize;
    let live = ui.console_scroll == 0;
    let history_rows = if live {
        height.saturating_sub(1)
    } else {
        height
    };

    let mut lines: Vec<Line> = console
        .visible_lines(history_rows, ui.console_scroll)
        .into_iter()
        .map(|line| console_line(line, console.show_timestamps))
        .collect();

    if live && height > 0 {
        // Show the tail of an overlong open line
        let open = printable(console.current_line());
        let skip = open
            .chars()
            .count()
            .saturating_sub(inner.width.saturating_sub(1) as usize);
        let tail: String = open.chars().skip(skip).collect();
        lines.push(Line::from(vec![
            Span::raw(tail),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_text_input(f: &mut Frame, area: Rect, ui: &mut UiState) {
    let focused = ui.is_focused(PanelItem::TextInput);
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" Send ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    ui.regions.push(WidgetRegion {
        item: PanelItem::TextInput,
        x: area.x,
        y: area.y,
        width: area.width,
        height: area.height,
    });

    if inner.width < 3 || inner.height == 0 {
        return;
    }

    let input = &ui.text_input;
    let visible_width = (inner.width - 2) as usize;
    let cursor = input.cursor_pos();
    let offset = cursor.saturating_sub(visible_width.saturating_sub(1));
    let visible: String = input.as_str().chars().skip(offset).take(visible_width).collect();

    let line = Line::from(vec![
        Span::styled("$ ", Style::default().fg(Color::Green)),
        Span::raw(visible),
    ]);
    f.render_widget(Paragraph::new(line), inner);

    if focused {
        let x = inner.x + 2 + (cursor - offset) as u16;
        f.set_cursor_position((x.min(inner.right().saturating_sub(1)), inner.y));
    }
}

fn draw_status_bar(f: &mut Frame, area: Rect, core: &AppCore) {
    let base = Style::default().bg(Color::DarkGray).fg(Color::White);

    let mut spans = vec![
        Span::styled(format!(" {} ", core.link_description), base.add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("| tx {} rx {} ", core.frames_sent, core.bytes_received()),
            base,
        ),
    ];
    if core.widgets.reset_enable() {
        spans.push(Span::styled("| RESET ARMED ", base.fg(Color::LightRed)));
    }
    if let Some(status) = &core.status {
        spans.push(Span::styled(format!("| {} ", status), base.fg(Color::LightYellow)));
    }
    spans.push(Span::styled(
        "| Tab focus  Space/Enter activate  Ctrl+Q quit",
        base.fg(Color::Gray),
    ));

    f.render_widget(Paragraph::new(Line::from(spans)).style(base), area);
}
