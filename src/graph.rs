//! State graph
//!
//! Immutable mapping from state name to [`State`], built once from the asset
//! configuration and validated for referential integrity before anything
//! runs on it.

use std::collections::HashMap;

use crate::config::StateConfig;
use crate::errors::{PetError, Result};
use crate::types::{Dimensions, Vector};
use crate::weighted::WeightedChoice;

/// Produces the frames for a state's frame source.
///
/// A source that cannot be loaded yields an empty sequence rather than an
/// error; the engine reports empty animations when it reaches them.
pub trait FrameLoader {
    type Frame;

    fn load_frames(&self, source: &str) -> Vec<Self::Frame>;
}

/// A named animation unit.
#[derive(Debug, Clone)]
pub struct State<F> {
    name: String,
    frames: Vec<F>,
    movement: Vector,
    offset: Vector,
    dimensions: Dimensions,
    transitions: WeightedChoice,
}

impl<F> State<F> {
    pub fn new(
        name: &str,
        frames: Vec<F>,
        movement: Vector,
        dimensions: Dimensions,
        transitions: WeightedChoice,
    ) -> Self {
        Self {
            name: name.to_string(),
            frames,
            movement,
            offset: Vector::ZERO,
            dimensions,
            transitions,
        }
    }

    pub fn with_offset(mut self, offset: Vector) -> Self {
        self.offset = offset;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frames(&self) -> &[F] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn movement(&self) -> Vector {
        self.movement
    }

    pub fn offset(&self) -> Vector {
        self.offset
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn transitions(&self) -> &WeightedChoice {
        &self.transitions
    }
}

/// Validated, closed-under-transition set of states.
#[derive(Debug, Clone)]
pub struct StateGraph<F> {
    states: HashMap<String, State<F>>,
    /// Configuration order; the first entry is the initial state
    order: Vec<String>,
}

impl<F> StateGraph<F> {
    /// Build states from configuration records, loading frames through
    /// `loader`, then validate every successor reference.
    pub fn build<L>(records: &[StateConfig], loader: &L) -> Result<Self>
    where
        L: FrameLoader<Frame = F>,
    {
        let mut states = Vec::with_capacity(records.len());
        for record in records {
            let transitions = WeightedChoice::new(&record.transitions_to).map_err(|e| match e {
                PetError::Config(msg) => {
                    PetError::config(format!("state '{}': {msg}", record.state_name))
                }
                other => other,
            })?;

            let frames = loader.load_frames(&record.file_name);
            if frames.is_empty() {
                tracing::warn!(
                    "State '{}' loaded no frames from '{}'",
                    record.state_name,
                    record.file_name
                );
            } else {
                tracing::debug!(
                    "State '{}' loaded {} frames",
                    record.state_name,
                    frames.len()
                );
            }

            states.push(
                State::new(
                    &record.state_name,
                    frames,
                    record.movement,
                    record.dims,
                    transitions,
                )
                .with_offset(record.offset),
            );
        }

        Self::from_states(states)
    }

    /// Assemble a graph from already-built states (first state is initial).
    pub fn from_states(states: Vec<State<F>>) -> Result<Self> {
        if states.is_empty() {
            return Err(PetError::config("state graph needs at least one state"));
        }

        let mut order = Vec::with_capacity(states.len());
        let mut map = HashMap::with_capacity(states.len());
        for state in states {
            let name = state.name.clone();
            if map.insert(name.clone(), state).is_some() {
                return Err(PetError::config(format!("duplicate state name '{name}'")));
            }
            order.push(name);
        }

        let graph = Self { states: map, order };
        graph.validate()?;
        Ok(graph)
    }

    /// Every successor must be a key of the graph.
    fn validate(&self) -> Result<()> {
        for state in self.iter() {
            for successor in state.transitions.names() {
                if !self.states.contains_key(successor) {
                    return Err(PetError::InvalidTransition {
                        from_state: state.name.clone(),
                        to_state: successor.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&State<F>> {
        self.states.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub fn initial_state(&self) -> &str {
        &self.order[0]
    }

    /// States in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &State<F>> {
        self.order.iter().filter_map(|name| self.states.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weighted::WeightedEntry;

    /// Loader that returns `n` numbered frames where `n` is parsed from the source.
    struct CountLoader;

    impl FrameLoader for CountLoader {
        type Frame = usize;

        fn load_frames(&self, source: &str) -> Vec<usize> {
            let n: usize = source.parse().unwrap_or(0);
            (0..n).collect()
        }
    }

    fn record(name: &str, frames: &str, successors: &[(&str, f64)]) -> StateConfig {
        StateConfig {
            state_name: name.to_string(),
            file_name: frames.to_string(),
            dims: Dimensions::new(4, 2),
            movement: Vector::ZERO,
            offset: Vector::ZERO,
            transitions_to: successors
                .iter()
                .map(|(n, p)| WeightedEntry::new(n, *p))
                .collect(),
        }
    }

    #[test]
    fn test_build_valid_graph() {
        let records = vec![
            record("idle", "2", &[("idle", 1.0), ("walk", 1.0)]),
            record("walk", "3", &[("idle", 1.0)]),
        ];
        let graph = StateGraph::build(&records, &CountLoader).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.initial_state(), "idle");
        assert_eq!(graph.get("walk").unwrap().frame_count(), 3);
        let names: Vec<&str> = graph.iter().map(State::name).collect();
        assert_eq!(names, vec!["idle", "walk"]);
    }

    #[test]
    fn test_dangling_successor_names_pair() {
        let records = vec![
            record("idle", "1", &[("idle", 1.0)]),
            record("walk", "1", &[("idle", 0.5), ("fly", 0.5)]),
            record("talk", "1", &[("swim", 1.0)]),
        ];
        let err = StateGraph::build(&records, &CountLoader).unwrap_err();
        match err {
            PetError::InvalidTransition {
                from_state,
                to_state,
            } => {
                assert_eq!(from_state, "walk");
                assert_eq!(to_state, "fly");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_zero_frame_state_is_built() {
        let records = vec![record("broken", "0", &[("broken", 1.0)])];
        let graph = StateGraph::build(&records, &CountLoader).unwrap();
        assert_eq!(graph.get("broken").unwrap().frame_count(), 0);
    }

    #[test]
    fn test_bad_weights_name_the_state() {
        let records = vec![record("idle", "1", &[("idle", 0.0)])];
        let err = StateGraph::build(&records, &CountLoader).unwrap_err();
        assert!(err.to_string().contains("state 'idle'"));
    }

    #[test]
    fn test_empty_graph_rejected() {
        let err = StateGraph::<usize>::build(&[], &CountLoader).unwrap_err();
        assert!(matches!(err, PetError::Config(_)));
    }
}
