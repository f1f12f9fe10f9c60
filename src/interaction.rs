//! Interaction collaborators
//!
//! Contracts the engine needs from the outside world to run a conversational
//! exchange: a modal input prompt, a query provider (see
//! [`crate::providers::Provider`]) and a speech synthesizer that reports
//! completion from a background worker.

use serde::{Deserialize, Serialize};

use crate::engine::Tick;
use crate::errors::Result;
use crate::providers::Provider;

/// Placeholder replaced by the collected input in a prompt template.
pub const PROMPT_PLACEHOLDER: &str = "%s";

pub const INPUT_TITLE: &str = "Chat";
pub const INPUT_MESSAGE: &str = "What do you want to ask?";

/// Parameters of one interaction sequence, as configured on an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRequest {
    pub prompt: String,
    #[serde(alias = "listening_state")]
    pub listen_state: String,
    pub response_state: String,
    pub end_state: String,
}

impl InteractionRequest {
    pub fn new(prompt: &str, listen_state: &str, response_state: &str, end_state: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            listen_state: listen_state.to_string(),
            response_state: response_state.to_string(),
            end_state: end_state.to_string(),
        }
    }

    /// Substitute `input` for every `%s`; `%%` is a literal percent sign.
    pub fn format_prompt(&self, input: &str) -> String {
        let mut out = String::with_capacity(self.prompt.len() + input.len());
        let mut chars = self.prompt.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '%' {
                match chars.peek() {
                    Some('s') => {
                        chars.next();
                        out.push_str(input);
                        continue;
                    }
                    Some('%') => {
                        chars.next();
                    }
                    _ => {}
                }
            }
            out.push(c);
        }
        out
    }

    /// The three states the sequence moves through.
    pub fn states(&self) -> [&str; 3] {
        [
            self.listen_state.as_str(),
            self.response_state.as_str(),
            self.end_state.as_str(),
        ]
    }
}

/// Advances the pet by one frame; `None` when no frame could be produced.
pub type Animate<'a, F> = dyn FnMut() -> Option<Tick<F>> + 'a;

/// Synchronous modal prompt. `None` means the user dismissed it.
///
/// The prompt blocks the control thread, so it owns the animation clock
/// while open: calling `animate` once per tick period keeps the listening
/// state playing.
pub trait InputCollector<F> {
    fn collect(&mut self, title: &str, message: &str, animate: &mut Animate<'_, F>)
        -> Option<String>;
}

/// Called exactly once when speech finishes, from the speech worker.
pub type Completion = Box<dyn FnOnce() + Send + 'static>;

/// Starts speaking `text` in the background.
///
/// Returning `Ok` promises that `on_complete` will be invoked exactly once.
/// Returning `Err` means nothing was started and `on_complete` is dropped.
pub trait SpeechSynthesizer {
    fn speak(&self, text: &str, on_complete: Completion) -> Result<()>;
}

/// Borrowed collaborators for one interaction.
pub struct Collaborators<'a, F> {
    pub input: &'a mut dyn InputCollector<F>,
    pub provider: &'a dyn Provider,
    pub speech: &'a dyn SpeechSynthesizer,
}

/// How an interaction sequence ended on the control thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// Input was dismissed; the pet stays in the listening state
    Cancelled,
    /// Speech is running; the end state arrives through the command queue
    Speaking,
}
