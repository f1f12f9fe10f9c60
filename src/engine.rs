//! Pet engine
//!
//! Live animation state: current state name, frame cursor and position.
//! All mutation happens on the control thread. Background workers (speech)
//! reach the engine only through [`CommandSender`], whose queue is drained
//! once per tick by [`PetEngine::drain_commands`].

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;

use crate::errors::{PetError, Result};
use crate::graph::{State, StateGraph};
use crate::interaction::{
    Collaborators, InteractionOutcome, InteractionRequest, INPUT_MESSAGE, INPUT_TITLE,
};
use crate::types::{Dimensions, Position, Vector};

/// Mutations queued from outside the control thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    ForceState(String),
    /// Speech finished; close the interaction and move to `end_state`
    FinishInteraction { end_state: String },
}

/// Cloneable handle for queueing [`EngineCommand`]s from any thread.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: mpsc::UnboundedSender<EngineCommand>,
}

impl CommandSender {
    /// Queue a command. Returns `false` if the engine is gone.
    pub fn send(&self, command: EngineCommand) -> bool {
        self.tx.send(command).is_ok()
    }
}

/// Result of one [`PetEngine::advance`] call.
///
/// Geometry belongs to the state the frame was taken from.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick<F> {
    pub frame: F,
    pub position: Position,
    pub dimensions: Dimensions,
    pub offset: Vector,
}

pub struct PetEngine<F> {
    graph: Arc<StateGraph<F>>,
    current: String,
    frame_index: usize,
    position: Position,
    interacting: bool,
    speech_text: Option<String>,
    rng: StdRng,
    commands_tx: mpsc::UnboundedSender<EngineCommand>,
    commands_rx: mpsc::UnboundedReceiver<EngineCommand>,
}

impl<F: Clone> PetEngine<F> {
    /// Start in the graph's first configured state.
    pub fn new(graph: Arc<StateGraph<F>>, start: Position) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let current = graph.initial_state().to_string();
        Self {
            graph,
            current,
            frame_index: 0,
            position: start,
            interacting: false,
            speech_text: None,
            rng: StdRng::from_os_rng(),
            commands_tx,
            commands_rx,
        }
    }

    /// Replace the random source, e.g. with a seeded one for reproducible runs.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn graph(&self) -> &StateGraph<F> {
        &self.graph
    }

    pub fn current_state(&self) -> &str {
        &self.current
    }

    pub fn state(&self) -> Option<&State<F>> {
        self.graph.get(&self.current)
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn dimensions(&self) -> Dimensions {
        self.state().map(State::dimensions).unwrap_or_default()
    }

    pub fn offset(&self) -> Vector {
        self.state().map(State::offset).unwrap_or_default()
    }

    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    /// Text being spoken by the current interaction, if any.
    pub fn speech_text(&self) -> Option<&str> {
        self.speech_text.as_deref()
    }

    pub fn command_sender(&self) -> CommandSender {
        CommandSender {
            tx: self.commands_tx.clone(),
        }
    }

    /// Advance one tick.
    ///
    /// Returns the frame at the cursor, then moves the cursor. Completing a
    /// cycle picks a weighted successor and resets the cursor. Movement is
    /// applied from the state the frame came from.
    pub fn advance(&mut self) -> Result<Tick<F>> {
        let graph = Arc::clone(&self.graph);
        let state = graph.get(&self.current).ok_or_else(|| PetError::UnknownState {
            name: self.current.clone(),
        })?;

        let frame = state
            .frames()
            .get(self.frame_index)
            .cloned()
            .ok_or_else(|| PetError::EmptyAnimation {
                state: state.name().to_string(),
            })?;

        self.frame_index += 1;
        if self.frame_index >= state.frame_count() {
            let next = state.transitions().sample(&mut self.rng);
            if next != self.current {
                tracing::debug!("Transition {} -> {}", self.current, next);
            }
            self.current = next.to_string();
            self.frame_index = 0;
        }

        self.position = self.position + state.movement();

        Ok(Tick {
            frame,
            position: self.position,
            dimensions: state.dimensions(),
            offset: state.offset(),
        })
    }

    /// Jump to `name`, restarting its animation.
    ///
    /// Unknown names fail without touching the current state.
    pub fn force_state(&mut self, name: &str) -> Result<()> {
        if !self.graph.contains(name) {
            return Err(PetError::UnknownState {
                name: name.to_string(),
            });
        }
        tracing::debug!("Forced transition {} -> {}", self.current, name);
        self.current = name.to_string();
        self.frame_index = 0;
        Ok(())
    }

    /// Run the listen → respond → end sequence.
    ///
    /// Blocks the caller while input is collected and the query runs. On
    /// success the pet is in `response_state` and speech is running; the
    /// move to `end_state` is queued by the speech worker and applied by
    /// [`drain_commands`](Self::drain_commands). Only one interaction may be
    /// in flight; a second call is rejected with
    /// [`PetError::InteractionInProgress`].
    pub async fn begin_interaction(
        &mut self,
        request: &InteractionRequest,
        collaborators: &mut Collaborators<'_, F>,
    ) -> Result<InteractionOutcome> {
        if self.interacting {
            return Err(PetError::InteractionInProgress);
        }
        if let Some(missing) = request.states().into_iter().find(|s| !self.graph.contains(s)) {
            return Err(PetError::UnknownState {
                name: missing.to_string(),
            });
        }

        self.interacting = true;
        let result = self.run_interaction(request, collaborators).await;
        if !matches!(result, Ok(InteractionOutcome::Speaking)) {
            self.interacting = false;
        }
        result
    }

    async fn run_interaction(
        &mut self,
        request: &InteractionRequest,
        collaborators: &mut Collaborators<'_, F>,
    ) -> Result<InteractionOutcome> {
        self.force_state(&request.listen_state)?;

        let input = {
            let mut animate = || match self.advance() {
                Ok(tick) => Some(tick),
                Err(e) => {
                    tracing::debug!("No frame while listening: {}", e);
                    None
                }
            };
            collaborators
                .input
                .collect(INPUT_TITLE, INPUT_MESSAGE, &mut animate)
        };
        let Some(input) = input else {
            tracing::info!("Interaction cancelled at input");
            return Ok(InteractionOutcome::Cancelled);
        };

        let prompt = request.format_prompt(&input);
        tracing::info!(
            "Querying {} ({} chars)",
            collaborators.provider.name(),
            prompt.len()
        );
        let response = collaborators.provider.complete(&prompt).await.map_err(|e| {
            tracing::warn!("Query failed, staying in '{}': {}", request.listen_state, e);
            PetError::from(e)
        })?;
        let response = response.trim().to_string();

        self.force_state(&request.response_state)?;

        let sender = self.command_sender();
        let end_state = request.end_state.clone();
        collaborators.speech.speak(
            &response,
            Box::new(move || {
                if !sender.send(EngineCommand::FinishInteraction { end_state }) {
                    tracing::debug!("Speech finished after engine shut down");
                }
            }),
        )?;

        self.speech_text = Some(response);
        Ok(InteractionOutcome::Speaking)
    }

    /// Apply every queued command. Returns how many were applied.
    pub fn drain_commands(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.commands_rx.try_recv() {
            self.apply(command);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::ForceState(name) => {
                if let Err(e) = self.force_state(&name) {
                    tracing::warn!("Queued transition dropped: {}", e);
                }
            }
            EngineCommand::FinishInteraction { end_state } => {
                self.interacting = false;
                self.speech_text = None;
                if let Err(e) = self.force_state(&end_state) {
                    tracing::warn!("Interaction end dropped: {}", e);
                }
            }
        }
    }
}
