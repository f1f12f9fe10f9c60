//! Asset pack configuration (`config.json`).

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{PetError, Result};
use crate::interaction::{InteractionRequest, PROMPT_PLACEHOLDER};
use crate::types::{Dimensions, Trigger, Vector};
use crate::weighted::WeightedEntry;

pub const CONFIG_FILE_NAME: &str = "config.json";

/// One state record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateConfig {
    pub state_name: String,
    /// Frame source, relative to the asset directory
    pub file_name: String,
    pub dims: Dimensions,
    /// Movement applied on every tick spent in this state
    #[serde(default, rename = "move")]
    pub movement: Vector,
    /// Render offset added to the live position
    #[serde(default)]
    pub offset: Vector,
    pub transitions_to: Vec<WeightedEntry>,
}

/// What an event does once its trigger fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventAction {
    #[serde(rename = "state_change")]
    StateChange { new_state: String },

    #[serde(rename = "chatgpt", alias = "chat", alias = "interaction")]
    Interaction(InteractionRequest),
}

/// One event record: a trigger plus its type-tagged action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    pub trigger: Trigger,
    #[serde(flatten)]
    pub action: EventAction,
}

/// Whole asset pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetConfig {
    pub states: Vec<StateConfig>,
    #[serde(default)]
    pub events: Vec<EventConfig>,
}

impl PetConfig {
    /// Load `config.json` from an asset directory.
    pub fn load(asset_dir: &Path) -> Result<Self> {
        let path = asset_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&path).map_err(|e| {
            PetError::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: PetConfig = serde_json::from_str(content)
            .map_err(|e| PetError::config(format!("Invalid JSON config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load-time checks that do not need the frame files.
    pub fn validate(&self) -> Result<()> {
        if self.states.is_empty() {
            return Err(PetError::config("config defines no states"));
        }

        let mut seen = HashSet::new();
        for state in &self.states {
            if !seen.insert(state.state_name.as_str()) {
                return Err(PetError::config(format!(
                    "duplicate state name '{}'",
                    state.state_name
                )));
            }
        }

        for event in &self.events {
            if let EventAction::Interaction(request) = &event.action {
                if !request.prompt.contains(PROMPT_PLACEHOLDER) {
                    return Err(PetError::config(format!(
                        "{} interaction prompt must contain '{PROMPT_PLACEHOLDER}'",
                        event.trigger
                    )));
                }
            }
        }

        Ok(())
    }

    /// Name of the state the pet starts in.
    pub fn initial_state(&self) -> Option<&str> {
        self.states.first().map(|s| s.state_name.as_str())
    }

    /// State names referenced by events but missing from `states`.
    ///
    /// These only fail when the event fires, so callers can warn about them
    /// up front.
    pub fn dangling_event_states(&self) -> Vec<&str> {
        let known: HashSet<&str> = self.states.iter().map(|s| s.state_name.as_str()).collect();
        let mut dangling = Vec::new();
        for event in &self.events {
            let targets: Vec<&str> = match &event.action {
                EventAction::StateChange { new_state } => vec![new_state.as_str()],
                EventAction::Interaction(r) => vec![
                    r.listen_state.as_str(),
                    r.response_state.as_str(),
                    r.end_state.as_str(),
                ],
            };
            for name in targets {
                if !known.contains(name) && !dangling.contains(&name) {
                    dangling.push(name);
                }
            }
        }
        dangling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "states": [
            {
                "state_name": "idle",
                "file_name": "idle.txt",
                "dims": [12, 6],
                "transitions_to": [
                    {"name": "idle", "probability": 3},
                    {"name": "walk", "probability": 1}
                ]
            },
            {
                "state_name": "walk",
                "file_name": "walk.txt",
                "dims": [12, 6],
                "move": [1, 0],
                "offset": [0, -1],
                "transitions_to": [{"name": "idle", "probability": 1}]
            }
        ],
        "events": [
            {"trigger": "click", "type": "state_change", "new_state": "walk"},
            {
                "trigger": "right_click",
                "type": "chatgpt",
                "prompt": "Answer as a purple gorilla: %s",
                "listen_state": "idle",
                "response_state": "walk",
                "end_state": "idle"
            }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let config = PetConfig::from_json(SAMPLE).unwrap();
        assert_eq!(config.states.len(), 2);
        assert_eq!(config.initial_state(), Some("idle"));

        let walk = &config.states[1];
        assert_eq!(walk.movement, Vector::new(1, 0));
        assert_eq!(walk.offset, Vector::new(0, -1));
        assert_eq!(config.states[0].movement, Vector::ZERO);

        assert_eq!(config.events.len(), 2);
        assert_eq!(
            config.events[0].action,
            EventAction::StateChange {
                new_state: "walk".to_string()
            }
        );
        match &config.events[1].action {
            EventAction::Interaction(r) => {
                assert_eq!(r.listen_state, "idle");
                assert_eq!(r.end_state, "idle");
            }
            other => panic!("unexpected action {other:?}"),
        }
        assert!(config.dangling_event_states().is_empty());
    }

    #[test]
    fn test_unknown_event_type_rejected_at_load() {
        let json = r#"{
            "states": [{"state_name": "a", "file_name": "a.txt", "dims": [1, 1],
                        "transitions_to": [{"name": "a", "probability": 1}]}],
            "events": [{"trigger": "click", "type": "dance", "new_state": "a"}]
        }"#;
        let err = PetConfig::from_json(json).unwrap_err();
        assert!(matches!(err, PetError::Config(_)));
    }

    #[test]
    fn test_prompt_without_placeholder_rejected() {
        let json = r#"{
            "states": [{"state_name": "a", "file_name": "a.txt", "dims": [1, 1],
                        "transitions_to": [{"name": "a", "probability": 1}]}],
            "events": [{"trigger": "click", "type": "chat", "prompt": "hello",
                        "listen_state": "a", "response_state": "a", "end_state": "a"}]
        }"#;
        let err = PetConfig::from_json(json).unwrap_err();
        assert!(err.to_string().contains("%s"));
    }

    #[test]
    fn test_empty_and_duplicate_states_rejected() {
        assert!(PetConfig::from_json(r#"{"states": []}"#).is_err());

        let json = r#"{"states": [
            {"state_name": "a", "file_name": "a.txt", "dims": [1, 1],
             "transitions_to": [{"name": "a", "probability": 1}]},
            {"state_name": "a", "file_name": "b.txt", "dims": [1, 1],
             "transitions_to": [{"name": "a", "probability": 1}]}
        ]}"#;
        let err = PetConfig::from_json(json).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_dangling_event_states_reported() {
        let json = r#"{
            "states": [{"state_name": "a", "file_name": "a.txt", "dims": [1, 1],
                        "transitions_to": [{"name": "a", "probability": 1}]}],
            "events": [{"trigger": "click", "type": "state_change", "new_state": "ghost"}]
        }"#;
        let config = PetConfig::from_json(json).unwrap();
        assert_eq!(config.dangling_event_states(), vec!["ghost"]);
    }
}
