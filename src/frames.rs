//! Text-art frames.
//!
//! A frame source is a UTF-8 file holding one or more frames separated by a
//! line consisting only of `---`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use unicode_width::UnicodeWidthStr;

use crate::graph::FrameLoader;

pub const FRAME_SEPARATOR: &str = "---";

/// One frame of text art. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFrame {
    lines: Arc<[String]>,
}

impl TextFrame {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines: lines.into(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Widest line in terminal columns.
    pub fn width(&self) -> usize {
        self.lines.iter().map(|l| l.width()).max().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.lines.len()
    }
}

/// Split file content into frames. Frames with no visible content are dropped.
pub fn parse_frames(content: &str) -> Vec<TextFrame> {
    let mut frames = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in content.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim_end() == FRAME_SEPARATOR {
            push_frame(&mut frames, std::mem::take(&mut current));
        } else {
            current.push(line.to_string());
        }
    }
    push_frame(&mut frames, current);

    frames
}

fn push_frame(frames: &mut Vec<TextFrame>, lines: Vec<String>) {
    if lines.iter().any(|l| !l.trim().is_empty()) {
        frames.push(TextFrame::new(lines));
    }
}

/// Loads text-art frames relative to an asset directory.
#[derive(Debug, Clone)]
pub struct TextFrameLoader {
    root: PathBuf,
}

impl TextFrameLoader {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

impl FrameLoader for TextFrameLoader {
    type Frame = TextFrame;

    fn load_frames(&self, source: &str) -> Vec<TextFrame> {
        let path = self.root.join(source);
        match fs::read_to_string(&path) {
            Ok(content) => parse_frames(&content),
            Err(e) => {
                tracing::warn!("Failed to load frames from {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }
}
