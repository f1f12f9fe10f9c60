//! Modal single-line input box.

use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::renderer::TerminalRenderer;
use crate::frames::TextFrame;
use crate::interaction::{Animate, InputCollector};
use crate::scheduler::RenderRequest;

/// Input box state; the cursor counts characters, not bytes.
#[derive(Debug, Clone, Default)]
pub(crate) struct PromptView {
    title: String,
    message: String,
    input: String,
    cursor: usize,
}

/// Result of feeding one key to the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KeyOutcome {
    Editing,
    Submit(String),
    Cancel,
}

impl PromptView {
    pub(crate) fn new(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            ..Self::default()
        }
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.input
            .char_indices()
            .nth(cursor)
            .map_or(self.input.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.input.chars().count()
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyOutcome::Cancel;
        }

        match key.code {
            KeyCode::Esc => return KeyOutcome::Cancel,
            KeyCode::Enter => {
                let text = self.input.trim();
                if !text.is_empty() {
                    return KeyOutcome::Submit(text.to_string());
                }
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let i = self.byte_index(self.cursor);
                    self.input.remove(i);
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.char_len() {
                    let i = self.byte_index(self.cursor);
                    self.input.remove(i);
                }
            }
            KeyCode::Left => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                }
            }
            KeyCode::Right => {
                if self.cursor < self.char_len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.char_len(),
            KeyCode::Char(c) => {
                let i = self.byte_index(self.cursor);
                self.input.insert(i, c);
                self.cursor += 1;
            }
            _ => {}
        }
        KeyOutcome::Editing
    }

    pub(crate) fn render(&self, frame: &mut Frame, area: Rect) {
        let width = (area.width / 5 * 3).max(30).min(area.width);
        let height = 4.min(area.height);
        let rect = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );

        let input_line = format!("> {}", self.input);
        let lines = vec![
            Line::styled(self.message.as_str(), Style::default().fg(Color::Gray)),
            Line::raw(input_line),
        ];

        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(lines).block(Block::bordered().title(self.title.as_str())),
            rect,
        );

        let before_cursor = &self.input[..self.byte_index(self.cursor)];
        let column = rect.x + 1 + 2 + before_cursor.width() as u16;
        if rect.height >= 4 && column < rect.right().saturating_sub(1) {
            frame.set_cursor_position((column, rect.y + 2));
        }
    }
}

/// Blocking modal prompt drawn over the pet. The pet keeps animating
/// underneath at the tick period while the prompt waits for keys.
pub struct TerminalPrompt<'a> {
    renderer: &'a mut TerminalRenderer,
    period: Duration,
}

impl<'a> TerminalPrompt<'a> {
    pub fn new(renderer: &'a mut TerminalRenderer, period: Duration) -> Self {
        Self { renderer, period }
    }
}

impl InputCollector<TextFrame> for TerminalPrompt<'_> {
    fn collect(
        &mut self,
        title: &str,
        message: &str,
        animate: &mut Animate<'_, TextFrame>,
    ) -> Option<String> {
        let mut view = PromptView::new(title, message);
        let mut next_frame = Instant::now();

        loop {
            if Instant::now() >= next_frame {
                next_frame = Instant::now() + self.period;
                if let Some(tick) = animate() {
                    self.renderer.stage(&RenderRequest {
                        frame: &tick.frame,
                        position: tick.position,
                        dimensions: tick.dimensions,
                        offset: tick.offset,
                        caption: None,
                    });
                }
            }

            if let Err(e) = self.renderer.draw(Some(&view)) {
                tracing::warn!("Prompt draw failed: {}", e);
                return None;
            }

            match event::poll(next_frame.saturating_duration_since(Instant::now())) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    tracing::warn!("Prompt input failed: {}", e);
                    return None;
                }
            }

            let event = match event::read() {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("Prompt input failed: {}", e);
                    return None;
                }
            };

            if let Event::Key(key) = event {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match view.handle_key(key) {
                    KeyOutcome::Editing => {}
                    KeyOutcome::Submit(text) => return Some(text),
                    KeyOutcome::Cancel => return None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(view: &mut PromptView, s: &str) {
        for c in s.chars() {
            view.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_typing_and_submit() {
        let mut view = PromptView::new("Chat", "Ask");
        type_str(&mut view, "hello");
        assert_eq!(
            view.handle_key(key(KeyCode::Enter)),
            KeyOutcome::Submit("hello".to_string())
        );
    }

    #[test]
    fn test_blank_input_does_not_submit() {
        let mut view = PromptView::new("Chat", "Ask");
        type_str(&mut view, "   ");
        assert_eq!(view.handle_key(key(KeyCode::Enter)), KeyOutcome::Editing);
    }

    #[test]
    fn test_escape_cancels() {
        let mut view = PromptView::new("Chat", "Ask");
        type_str(&mut view, "abc");
        assert_eq!(view.handle_key(key(KeyCode::Esc)), KeyOutcome::Cancel);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(view.handle_key(ctrl_c), KeyOutcome::Cancel);
    }

    #[test]
    fn test_editing_multibyte_input() {
        let mut view = PromptView::new("Chat", "Ask");
        type_str(&mut view, "olá");
        view.handle_key(key(KeyCode::Left));
        view.handle_key(key(KeyCode::Backspace));
        view.handle_key(key(KeyCode::Home));
        type_str(&mut view, "¡");
        assert_eq!(view.input, "¡oá");
        view.handle_key(key(KeyCode::End));
        view.handle_key(key(KeyCode::Delete));
        assert_eq!(view.input, "¡oá");
    }
}
