//! Application loop
//!
//! Single-threaded cooperative loop: poll terminal events until the next tick
//! is due, route clicks on the pet to the event router, tick when due. Speech
//! workers only reach the engine through its command queue, which the tick
//! drains.

use std::path::Path;
use std::sync::Arc;

use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::config::PetConfig;
use crate::engine::PetEngine;
use crate::errors::{PetError, Result};
use crate::frames::{TextFrame, TextFrameLoader};
use crate::graph::StateGraph;
use crate::interaction::{Collaborators, SpeechSynthesizer};
use crate::providers::Provider;
use crate::router::{Dispatched, EventRouter};
use crate::scheduler::TickScheduler;
use crate::terminal::{TerminalPrompt, TerminalRenderer};
use crate::types::Trigger;

/// Loaded and validated asset pack.
pub struct PetSetup {
    pub config: PetConfig,
    pub graph: Arc<StateGraph<TextFrame>>,
}

impl PetSetup {
    /// Parse `config.json`, load frames and validate the state graph.
    pub fn load(asset_dir: &Path) -> Result<Self> {
        let config = PetConfig::load(asset_dir)?;
        let loader = TextFrameLoader::new(asset_dir);
        let graph = StateGraph::build(&config.states, &loader)?;
        tracing::info!(
            "Loaded {} states and {} events from {}",
            graph.len(),
            config.events.len(),
            asset_dir.display()
        );
        Ok(Self {
            config,
            graph: Arc::new(graph),
        })
    }

    pub fn router(&self) -> EventRouter {
        EventRouter::from_config(&self.config.events)
    }
}

pub struct PetApp {
    engine: PetEngine<TextFrame>,
    router: EventRouter,
    scheduler: TickScheduler,
    renderer: TerminalRenderer,
    provider: Box<dyn Provider>,
    speech: Box<dyn SpeechSynthesizer>,
    should_quit: bool,
}

impl PetApp {
    pub fn new(
        engine: PetEngine<TextFrame>,
        router: EventRouter,
        scheduler: TickScheduler,
        renderer: TerminalRenderer,
        provider: Box<dyn Provider>,
        speech: Box<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            engine,
            router,
            scheduler,
            renderer,
            provider,
            speech,
            should_quit: false,
        }
    }

    /// Give back the renderer (and its terminal) after the loop ends.
    pub fn into_renderer(self) -> TerminalRenderer {
        self.renderer
    }

    /// Run until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        tracing::info!(
            "Starting in '{}' at {}",
            self.engine.current_state(),
            self.engine.position()
        );

        while !self.should_quit {
            if self.scheduler.due() {
                self.scheduler.tick(&mut self.engine, &mut self.renderer);
            }

            let timeout = self.scheduler.time_until_next();
            if event::poll(timeout)? {
                let event = event::read()?;
                self.handle_event(event).await;
            }
        }

        tracing::info!("Stopped after {} ticks", self.scheduler.ticks());
        Ok(())
    }

    async fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.should_quit = true;
                }
                _ => {}
            },
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(button),
                column,
                row,
                ..
            }) if self.renderer.hit(column, row) => {
                let trigger = match button {
                    MouseButton::Left => Trigger::Click,
                    MouseButton::Right => Trigger::RightClick,
                    MouseButton::Middle => return,
                };
                self.handle_trigger(trigger).await;
            }
            Event::Resize(_, _) => {
                if let Err(e) = self.renderer.draw(None) {
                    tracing::warn!("Redraw after resize failed: {}", e);
                }
            }
            _ => {}
        }
    }

    /// Route a trigger. Failures are logged, never propagated.
    pub async fn handle_trigger(&mut self, trigger: Trigger) {
        let mut prompt = TerminalPrompt::new(&mut self.renderer, self.scheduler.period());
        let mut collaborators = Collaborators {
            input: &mut prompt,
            provider: self.provider.as_ref(),
            speech: self.speech.as_ref(),
        };

        match self
            .router
            .dispatch(trigger, &mut self.engine, &mut collaborators)
            .await
        {
            Ok(Dispatched::Unbound) => tracing::debug!("Nothing bound to {}", trigger),
            Ok(dispatched) => tracing::debug!("{} -> {:?}", trigger, dispatched),
            Err(PetError::InteractionInProgress) => {
                tracing::info!("Ignored {}: interaction already running", trigger);
            }
            Err(e) if e.is_fatal() => tracing::error!("Event {} misconfigured: {}", trigger, e),
            Err(e) => tracing::warn!("Event {} failed: {}", trigger, e),
        }
    }
}
