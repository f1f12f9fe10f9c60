//! Speech collaborators
//!
//! Synthesis blocks, so it runs on a background thread. The completion
//! callback fires from that thread exactly once, after the TTS process has
//! exited, whether or not it succeeded.

use std::process::{Command, Stdio};
use std::thread;

use crate::config::SpeechSettings;
use crate::errors::{PetError, Result};
use crate::interaction::{Completion, SpeechSynthesizer};

/// Speaks through an external TTS program such as `espeak` or `say`.
/// The text follows a `--` separator so it is never read as an option.
#[derive(Debug, Clone)]
pub struct CommandSpeech {
    program: String,
    args: Vec<String>,
}

impl CommandSpeech {
    pub fn new(program: &str, args: &[String]) -> Self {
        Self {
            program: program.to_string(),
            args: args.to_vec(),
        }
    }

    pub fn from_settings(settings: &SpeechSettings) -> Self {
        Self::new(&settings.command, &settings.args)
    }

    fn command(&self, text: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("--")
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl SpeechSynthesizer for CommandSpeech {
    fn speak(&self, text: &str, on_complete: Completion) -> Result<()> {
        let mut cmd = self.command(text);
        let program = self.program.clone();

        thread::Builder::new()
            .name("speech".to_string())
            .spawn(move || {
                match cmd.status() {
                    Ok(status) if status.success() => {
                        tracing::debug!("Speech finished");
                    }
                    Ok(status) => {
                        tracing::warn!("{} exited with {}", program, status);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to run {}: {}", program, e);
                    }
                }
                on_complete();
            })
            .map(|_| ())
            .map_err(|e| PetError::Speech(format!("Failed to start speech worker: {e}")))
    }
}

/// Completes immediately without producing sound.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSpeech;

impl SpeechSynthesizer for SilentSpeech {
    fn speak(&self, text: &str, on_complete: Completion) -> Result<()> {
        tracing::debug!("Silent speech: {} chars", text.len());
        on_complete();
        Ok(())
    }
}

/// Pick the synthesizer the settings ask for.
pub fn from_settings(settings: &SpeechSettings) -> Box<dyn SpeechSynthesizer> {
    if settings.enabled {
        Box::new(CommandSpeech::from_settings(settings))
    } else {
        Box::new(SilentSpeech)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_silent_speech_completes_once() {
        let (tx, rx) = mpsc::channel();
        SilentSpeech
            .speak("hello", Box::new(move || tx.send(()).unwrap()))
            .unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(1)).is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_missing_program_still_completes() {
        let speech = CommandSpeech::new("definitely-not-a-tts-program", &[]);
        let (tx, rx) = mpsc::channel();
        speech
            .speak("hello", Box::new(move || tx.send(()).unwrap()))
            .unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_text_is_last_argument() {
        let speech = CommandSpeech::new("espeak", &["-p".to_string(), "70".to_string()]);
        let cmd = speech.command("hi there");
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, vec!["-p", "70", "--", "hi there"]);
    }

    #[test]
    fn test_dash_prefixed_text_is_not_an_option() {
        let speech = CommandSpeech::new("espeak", &[]);
        let cmd = speech.command("-- sure! --help");
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, vec!["--", "-- sure! --help"]);
    }
}
