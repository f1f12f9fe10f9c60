//! # Desktop Pet
//!
//! An animated character driven by a weighted state machine. Each state owns
//! a looping animation and a weighted list of successor states; when an
//! animation finishes the pet picks its next state at random. Clicking the pet
//! can force a state or start a chat: the pet listens, asks a language model,
//! speaks the reply and settles into an end state.
//!
//! The engine is generic over the frame type. The binary renders text-art
//! frames in the terminal with ratatui.

pub mod app;
pub mod config;
pub mod engine;
pub mod errors;
pub mod frames;
pub mod graph;
pub mod interaction;
pub mod providers;
pub mod router;
pub mod scheduler;
pub mod speech;
pub mod terminal;
pub mod types;
pub mod weighted;

pub use engine::{EngineCommand, PetEngine, Tick};
pub use errors::{PetError, Result};
pub use graph::{FrameLoader, State, StateGraph};
pub use interaction::{Collaborators, InputCollector, InteractionOutcome, InteractionRequest};
pub use router::{Dispatched, EventRouter};
pub use scheduler::{Renderer, TickScheduler, TickStatus};
pub use weighted::{WeightedChoice, WeightedEntry};
