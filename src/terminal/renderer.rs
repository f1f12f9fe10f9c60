//! Draws the pet, its speech bubble and the status line.

use std::io;

use ratatui::{
    layout::{Position as Cell, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph},
    Frame,
};

use super::prompt::PromptView;
use super::Tui;
use crate::errors::{PetError, Result};
use crate::frames::TextFrame;
use crate::scheduler::{RenderRequest, Renderer};
use crate::types::Dimensions;

const STATUS_HINT: &str = "click the pet to interact · q to quit";
const BUBBLE_MAX_WIDTH: u16 = 36;

/// Last thing the pet drew, kept so overlays can redraw it.
#[derive(Debug, Clone)]
struct Scene {
    frame: TextFrame,
    x: i32,
    y: i32,
    dimensions: Dimensions,
    caption: Option<String>,
}

pub struct TerminalRenderer {
    terminal: Tui,
    scene: Option<Scene>,
    /// Visible pet rectangle from the last draw, for click hit-testing
    pet_area: Option<Rect>,
}

impl TerminalRenderer {
    pub fn new(terminal: Tui) -> Self {
        Self {
            terminal,
            scene: None,
            pet_area: None,
        }
    }

    /// Hand the terminal back, e.g. for restoring it on shutdown.
    pub fn into_terminal(self) -> Tui {
        self.terminal
    }

    /// Whether a click at (`column`, `row`) lands on the pet.
    pub fn hit(&self, column: u16, row: u16) -> bool {
        self.pet_area
            .is_some_and(|area| area.contains(Cell::new(column, row)))
    }

    /// Replace the scene without drawing it.
    pub(crate) fn stage(&mut self, request: &RenderRequest<'_, TextFrame>) {
        self.scene = Some(Scene {
            frame: request.frame.clone(),
            x: request.position.x.saturating_add(request.offset.dx),
            y: request.position.y.saturating_add(request.offset.dy),
            dimensions: request.dimensions,
            caption: request.caption.map(str::to_string),
        });
    }

    /// Redraw the last scene, optionally with the prompt on top.
    pub(crate) fn draw(&mut self, overlay: Option<&PromptView>) -> io::Result<()> {
        let Self {
            terminal,
            scene,
            pet_area,
        } = self;

        terminal.draw(|frame| {
            let area = frame.area();
            let body = Rect {
                height: area.height.saturating_sub(1),
                ..area
            };

            *pet_area = scene.as_ref().and_then(|s| draw_scene(frame, s, body));

            let status = Rect {
                y: area.bottom().saturating_sub(1),
                height: area.height.min(1),
                ..area
            };
            frame.render_widget(
                Paragraph::new(STATUS_HINT).style(Style::default().fg(Color::DarkGray)),
                status,
            );

            if let Some(prompt) = overlay {
                prompt.render(frame, area);
            }
        })?;
        Ok(())
    }
}

impl Renderer<TextFrame> for TerminalRenderer {
    fn render(&mut self, request: &RenderRequest<'_, TextFrame>) -> Result<()> {
        self.stage(request);
        self.draw(None).map_err(|e| PetError::Render(e.to_string()))
    }
}

/// Draw the pet and its bubble; returns the visible pet rectangle.
fn draw_scene(frame: &mut Frame, scene: &Scene, body: Rect) -> Option<Rect> {
    let Dimensions { w, h } = scene.dimensions;

    let visible = clip(scene.x, scene.y, w, h, body).map(|(rect, rows, cols)| {
        let lines: Vec<Line> = scene
            .frame
            .lines()
            .iter()
            .map(|l| Line::raw(l.as_str()))
            .collect();
        frame.render_widget(Paragraph::new(Text::from(lines)).scroll((rows, cols)), rect);
        rect
    });

    if let Some(caption) = scene.caption.as_deref() {
        draw_bubble(frame, caption, scene, body);
    }

    visible
}

/// Speech bubble above the pet, or below it when there is no room.
fn draw_bubble(frame: &mut Frame, caption: &str, scene: &Scene, body: Rect) {
    let width = BUBBLE_MAX_WIDTH.min(body.width);
    if width < 4 {
        return;
    }
    let wrapped = textwrap::wrap(caption, usize::from(width - 2));
    let height = wrapped.len() as u16 + 2;

    let above = scene.y - i32::from(height);
    let y = if above >= i32::from(body.y) {
        above
    } else {
        scene.y + i32::from(scene.dimensions.h)
    };

    let Some((rect, rows, cols)) = clip(scene.x, y, width, height, body) else {
        return;
    };

    let lines: Vec<Line> = wrapped.into_iter().map(Line::raw).collect();
    frame.render_widget(Clear, rect);
    // Clipped bubbles are drawn without a border.
    let paragraph = if rows == 0 && cols == 0 && rect.width == width && rect.height == height {
        Paragraph::new(Text::from(lines)).block(Block::bordered())
    } else {
        Paragraph::new(Text::from(lines)).scroll((rows, cols))
    };
    frame.render_widget(paragraph, rect);
}

/// Visible part of a `w`×`h` box at (`x`, `y`) inside `area`, with the number
/// of rows and columns cut off at the top and left.
fn clip(x: i32, y: i32, w: u16, h: u16, area: Rect) -> Option<(Rect, u16, u16)> {
    let left = x.max(i32::from(area.x));
    let top = y.max(i32::from(area.y));
    let right = (x + i32::from(w)).min(i32::from(area.right()));
    let bottom = (y + i32::from(h)).min(i32::from(area.bottom()));

    if right <= left || bottom <= top {
        return None;
    }

    Some((
        Rect::new(
            left as u16,
            top as u16,
            (right - left) as u16,
            (bottom - top) as u16,
        ),
        (top - y) as u16,
        (left - x) as u16,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const AREA: Rect = Rect {
        x: 0,
        y: 0,
        width: 80,
        height: 24,
    };

    #[test]
    fn test_clip_fully_visible() {
        let (rect, rows, cols) = clip(10, 5, 8, 4, AREA).unwrap();
        assert_eq!(rect, Rect::new(10, 5, 8, 4));
        assert_eq!((rows, cols), (0, 0));
    }

    #[test]
    fn test_clip_top_left_overhang() {
        let (rect, rows, cols) = clip(-3, -2, 8, 4, AREA).unwrap();
        assert_eq!(rect, Rect::new(0, 0, 5, 2));
        assert_eq!((rows, cols), (2, 3));
    }

    #[test]
    fn test_clip_bottom_right_overhang() {
        let (rect, _, _) = clip(76, 22, 8, 4, AREA).unwrap();
        assert_eq!(rect, Rect::new(76, 22, 4, 2));
    }

    #[test]
    fn test_clip_offscreen() {
        assert!(clip(100, 5, 8, 4, AREA).is_none());
        assert!(clip(-20, 5, 8, 4, AREA).is_none());
        assert!(clip(5, 30, 8, 4, AREA).is_none());
    }
}
