//! Tick scheduler
//!
//! Cooperative periodic driver: drains the engine's command queue, advances
//! one frame and hands the result to the renderer. The next tick is armed
//! before anything can fail, so neither an engine error nor a render error
//! stops the animation clock.

use std::time::{Duration, Instant};

use crate::engine::PetEngine;
use crate::errors::{PetError, Result};
use crate::types::{Dimensions, Position, Vector};

/// Everything the renderer needs to draw one tick.
#[derive(Debug)]
pub struct RenderRequest<'a, F> {
    pub frame: &'a F,
    pub position: Position,
    pub dimensions: Dimensions,
    pub offset: Vector,
    /// Text being spoken, shown next to the pet
    pub caption: Option<&'a str>,
}

/// Rendering collaborator. Expected to be best-effort and non-blocking.
pub trait Renderer<F> {
    fn render(&mut self, request: &RenderRequest<'_, F>) -> Result<()>;
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    Rendered,
    /// The engine could not produce a frame; nothing was drawn
    Skipped,
    /// A frame was produced but the renderer failed
    RenderFailed,
}

#[derive(Debug)]
pub struct TickScheduler {
    period: Duration,
    last_tick: Option<Instant>,
    ticks: u64,
    last_error: Option<String>,
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_tick: None,
            ticks: 0,
            last_error: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn due(&self) -> bool {
        self.time_until_next().is_zero()
    }

    /// Time left before the next tick; zero when one is due.
    pub fn time_until_next(&self) -> Duration {
        match self.last_tick {
            Some(last) => self.period.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Run one tick.
    pub fn tick<F, R>(&mut self, engine: &mut PetEngine<F>, renderer: &mut R) -> TickStatus
    where
        F: Clone,
        R: Renderer<F> + ?Sized,
    {
        self.last_tick = Some(Instant::now());
        self.ticks += 1;

        engine.drain_commands();

        let tick = match engine.advance() {
            Ok(tick) => tick,
            Err(e) => {
                self.report(&e);
                return TickStatus::Skipped;
            }
        };

        let request = RenderRequest {
            frame: &tick.frame,
            position: tick.position,
            dimensions: tick.dimensions,
            offset: tick.offset,
            caption: engine.speech_text(),
        };

        match renderer.render(&request) {
            Ok(()) => {
                self.last_error = None;
                TickStatus::Rendered
            }
            Err(e) => {
                self.report(&e);
                TickStatus::RenderFailed
            }
        }
    }

    // Repeated identical errors are logged once.
    fn report(&mut self, error: &PetError) {
        let message = error.to_string();
        if self.last_error.as_deref() != Some(message.as_str()) {
            tracing::error!("Tick {} skipped: {}", self.ticks, message);
            self.last_error = Some(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{State, StateGraph};
    use crate::weighted::{WeightedChoice, WeightedEntry};
    use std::sync::Arc;

    struct FlakyRenderer {
        drawn: Vec<u8>,
        fail_every: usize,
        calls: usize,
    }

    impl Renderer<u8> for FlakyRenderer {
        fn render(&mut self, request: &RenderRequest<'_, u8>) -> Result<()> {
            self.calls += 1;
            if self.calls % self.fail_every == 0 {
                return Err(PetError::Render("glitch".to_string()));
            }
            self.drawn.push(*request.frame);
            Ok(())
        }
    }

    fn engine(frames: Vec<u8>) -> PetEngine<u8> {
        let state = State::new(
            "only",
            frames,
            Vector::ZERO,
            Dimensions::new(1, 1),
            WeightedChoice::new(&[WeightedEntry::new("only", 1.0)]).unwrap(),
        );
        let graph = StateGraph::from_states(vec![state]).unwrap();
        PetEngine::new(Arc::new(graph), Position::default()).with_seed(3)
    }

    #[test]
    fn test_first_tick_is_due_immediately() {
        let scheduler = TickScheduler::new(Duration::from_millis(100));
        assert!(scheduler.due());
    }

    #[test]
    fn test_tick_rearms() {
        let mut scheduler = TickScheduler::new(Duration::from_secs(60));
        let mut engine = engine(vec![1]);
        let mut renderer = FlakyRenderer {
            drawn: Vec::new(),
            fail_every: usize::MAX,
            calls: 0,
        };
        assert_eq!(scheduler.tick(&mut engine, &mut renderer), TickStatus::Rendered);
        assert!(!scheduler.due());
        assert!(scheduler.time_until_next() > Duration::from_secs(59));
    }

    #[test]
    fn test_render_failure_does_not_stop_clock() {
        let mut scheduler = TickScheduler::new(Duration::ZERO);
        let mut engine = engine(vec![1, 2, 3]);
        let mut renderer = FlakyRenderer {
            drawn: Vec::new(),
            fail_every: 2,
            calls: 0,
        };
        let statuses: Vec<_> = (0..4)
            .map(|_| scheduler.tick(&mut engine, &mut renderer))
            .collect();
        assert_eq!(
            statuses,
            vec![
                TickStatus::Rendered,
                TickStatus::RenderFailed,
                TickStatus::Rendered,
                TickStatus::RenderFailed
            ]
        );
        assert_eq!(renderer.drawn, vec![1, 3]);
        assert_eq!(scheduler.ticks(), 4);
        assert!(scheduler.due());
    }

    #[test]
    fn test_empty_animation_is_skipped() {
        let mut scheduler = TickScheduler::new(Duration::ZERO);
        let mut engine = engine(Vec::new());
        let mut renderer = FlakyRenderer {
            drawn: Vec::new(),
            fail_every: usize::MAX,
            calls: 0,
        };
        assert_eq!(scheduler.tick(&mut engine, &mut renderer), TickStatus::Skipped);
        assert_eq!(scheduler.tick(&mut engine, &mut renderer), TickStatus::Skipped);
        assert_eq!(renderer.calls, 0);
    }
}
