//! Event router
//!
//! Maps external triggers to engine operations. Event types are checked when
//! the asset config is parsed, so every binding here is a known action.

use std::collections::HashMap;

use crate::config::{EventAction, EventConfig};
use crate::engine::PetEngine;
use crate::errors::Result;
use crate::interaction::{Collaborators, InteractionOutcome};
use crate::types::Trigger;

/// What a dispatch did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// Nothing is bound to the trigger
    Unbound,
    StateChanged,
    Interaction(InteractionOutcome),
}

#[derive(Debug, Clone, Default)]
pub struct EventRouter {
    bindings: HashMap<Trigger, EventAction>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every configured event. A later event for the same trigger
    /// replaces an earlier one.
    pub fn from_config(events: &[EventConfig]) -> Self {
        let mut router = Self::new();
        for event in events {
            if router.bind(event.trigger, event.action.clone()).is_some() {
                tracing::debug!("Event for '{}' replaced an earlier binding", event.trigger);
            }
        }
        router
    }

    /// Returns the previous binding, if any.
    pub fn bind(&mut self, trigger: Trigger, action: EventAction) -> Option<EventAction> {
        self.bindings.insert(trigger, action)
    }

    pub fn binding(&self, trigger: Trigger) -> Option<&EventAction> {
        self.bindings.get(&trigger)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Run whatever is bound to `trigger`.
    pub async fn dispatch<F: Clone>(
        &self,
        trigger: Trigger,
        engine: &mut PetEngine<F>,
        collaborators: &mut Collaborators<'_, F>,
    ) -> Result<Dispatched> {
        let Some(action) = self.bindings.get(&trigger) else {
            return Ok(Dispatched::Unbound);
        };

        tracing::debug!("Dispatching {}", trigger);
        match action {
            EventAction::StateChange { new_state } => {
                engine.force_state(new_state)?;
                Ok(Dispatched::StateChanged)
            }
            EventAction::Interaction(request) => {
                let outcome = engine.begin_interaction(request, collaborators).await?;
                Ok(Dispatched::Interaction(outcome))
            }
        }
    }
}
