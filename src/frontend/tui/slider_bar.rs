//! Horizontal setpoint bar used for the panel sliders.
//!
//! Fills the bar proportionally to the slider position and centers the
//! current value over the fill.

use crate::widgets::SliderState;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
};

pub struct SliderBar<'a> {
    state: &'a SliderState,
    focused: bool,
    bar_fill: Color,
    bar_background: Color,
    text_color: Color,
}

impl<'a> SliderBar<'a> {
    pub fn new(state: &'a SliderState) -> Self {
        Self {
            state,
            focused: false,
            bar_fill: Color::Blue,
            bar_background: Color::DarkGray,
            text_color: Color::White,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        if focused {
            self.bar_fill = Color::Cyan;
            self.text_color = Color::Black;
        }
        self
    }

    /// Columns of `width` covered by the fill
    fn filled_width(&self, width: u16) -> u16 {
        ((width as f64) * self.state.fraction()).round() as u16
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let filled = self.filled_width(area.width);
        for row in area.top()..area.bottom() {
            for (i, col) in (area.left()..area.right()).enumerate() {
                let bg = if (i as u16) < filled {
                    self.bar_fill
                } else {
                    self.bar_background
                };
                if let Some(cell) = buf.cell_mut((col, row)) {
                    cell.set_symbol(" ");
                    cell.set_bg(bg);
                }
            }
        }

        let text = format!(
            "{} ({}..{})",
            self.state.display_text(),
            self.state.min,
            self.state.max
        );
        let text = if text.chars().count() as u16 > area.width {
            self.state.display_text()
        } else {
            text
        };
        let text_width = (text.chars().count() as u16).min(area.width);
        let x = area.x + (area.width - text_width) / 2;
        let y = area.y + area.height / 2;

        let mut style = Style::default().fg(self.text_color);
        if self.focused {
            style = style.add_modifier(Modifier::BOLD);
        }
        buf.set_stringn(x, y, &text, text_width as usize, style);
    }
}
