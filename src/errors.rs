use thiserror::Error;

use crate::providers::ProviderError;

/// Errors that can occur while building or running the pet
#[derive(Error, Debug)]
pub enum PetError {
    /// Malformed configuration (weight lists, event wiring, settings files)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A state names a successor that is not part of the graph
    #[error("Invalid transition from '{from_state}' to '{to_state}': no such state")]
    InvalidTransition { from_state: String, to_state: String },

    /// A forced transition targeted a state that does not exist
    #[error("Unknown state: '{name}'")]
    UnknownState { name: String },

    /// The current state has no frames to show
    #[error("State '{state}' has no frames")]
    EmptyAnimation { state: String },

    /// A second interaction was triggered while one is still running
    #[error("An interaction is already in progress")]
    InteractionInProgress,

    /// The query provider failed
    #[error("Query failed: {0}")]
    Provider(#[from] ProviderError),

    /// The speech collaborator could not be started
    #[error("Speech error: {0}")]
    Speech(String),

    /// The renderer failed to draw a frame
    #[error("Render error: {0}")]
    Render(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PetError {
    pub fn config(message: impl Into<String>) -> Self {
        PetError::Config(message.into())
    }

    /// Errors that mean the state graph or its wiring is structurally broken.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PetError::Config(_) | PetError::InvalidTransition { .. } | PetError::UnknownState { .. }
        )
    }
}

/// Type alias for Result with `PetError`
pub type Result<T> = std::result::Result<T, PetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_names_both_states() {
        let err = PetError::InvalidTransition {
            from_state: "idle".to_string(),
            to_state: "fly".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'idle'"));
        assert!(msg.contains("'fly'"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_runtime_errors_are_not_fatal() {
        assert!(!PetError::InteractionInProgress.is_fatal());
        assert!(!PetError::EmptyAnimation {
            state: "idle".to_string()
        }
        .is_fatal());
        assert!(!PetError::Render("glitch".to_string()).is_fatal());
    }

    #[test]
    fn test_provider_error_converts() {
        let err: PetError = ProviderError::RateLimited.into();
        assert!(matches!(err, PetError::Provider(ProviderError::RateLimited)));
    }
}
