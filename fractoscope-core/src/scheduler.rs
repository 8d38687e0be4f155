//! Serialises render calls to the engine.
//!
//! Changes only mark the scheduler dirty. Once per display frame the owner
//! calls [`RenderScheduler::run_frame`], which renders the *current* viewport
//! if nothing is in flight. There is no queue: any number of changes made
//! while a render runs collapse into at most one follow-up render.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::engine::{FractalEngine, RenderRequest};
use crate::error::{CoreError, EngineError};
use crate::params::GenerationParams;
use crate::viewport::Viewport;

/// What happened on one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Nothing changed since the last render.
    Idle,
    /// Changes are pending but the engine is not available yet.
    NoEngine,
    /// A render is already in flight.
    Busy,
    /// The minimum interval since the last render has not elapsed.
    Throttled,
    /// A render call was issued.
    Rendered,
}

#[derive(Debug, Clone)]
pub struct RenderScheduler {
    canvas_size: u32,
    min_interval: Duration,
    dirty: bool,
    generating: bool,
    last_render: Option<Instant>,
    renders_issued: u64,
    changes_coalesced: u64,
}

impl RenderScheduler {
    /// `min_interval` of zero means one render per frame at most.
    pub fn new(canvas_size: u32, min_interval: Duration) -> crate::Result<Self> {
        if canvas_size == 0 {
            return Err(CoreError::InvalidCanvasSize(canvas_size));
        }
        Ok(Self {
            canvas_size,
            min_interval,
            // The first frame with an engine renders the initial state.
            dirty: true,
            generating: false,
            last_render: None,
            renders_issued: 0,
            changes_coalesced: 0,
        })
    }

    pub fn canvas_size(&self) -> u32 {
        self.canvas_size
    }

    pub fn set_canvas_size(&mut self, canvas_size: u32) -> crate::Result<()> {
        if canvas_size == 0 {
            return Err(CoreError::InvalidCanvasSize(canvas_size));
        }
        if canvas_size != self.canvas_size {
            self.canvas_size = canvas_size;
            self.notify_change();
        }
        Ok(())
    }

    pub fn set_min_interval(&mut self, min_interval: Duration) {
        self.min_interval = min_interval;
    }

    /// Record that the viewport or parameters changed.
    pub fn notify_change(&mut self) {
        if self.dirty || self.generating {
            self.changes_coalesced += 1;
        }
        self.dirty = true;
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn renders_issued(&self) -> u64 {
        self.renders_issued
    }

    /// Changes that were folded into an already pending render.
    pub fn changes_coalesced(&self) -> u64 {
        self.changes_coalesced
    }

    /// Earliest instant the throttle allows the next render.
    pub fn next_allowed(&self) -> Option<Instant> {
        self.last_render.map(|t| t + self.min_interval)
    }

    fn check(&self, now: Instant) -> FrameOutcome {
        if !self.dirty {
            return FrameOutcome::Idle;
        }
        if self.generating {
            return FrameOutcome::Busy;
        }
        match self.next_allowed() {
            Some(allowed) if now < allowed => FrameOutcome::Throttled,
            _ => FrameOutcome::Rendered,
        }
    }

    /// Admit a render of the given state if the guard allows it.
    ///
    /// On success the scheduler is marked as generating until
    /// [`complete`](Self::complete) is called. Use this directly when the
    /// engine runs somewhere other than the calling thread.
    pub fn try_admit(
        &mut self,
        now: Instant,
        viewport: &Viewport,
        params: &GenerationParams,
    ) -> Result<RenderRequest, FrameOutcome> {
        match self.check(now) {
            FrameOutcome::Rendered => {}
            other => return Err(other),
        }
        self.generating = true;
        self.dirty = false;
        self.last_render = Some(now);
        self.renders_issued += 1;
        Ok(RenderRequest {
            viewport: *viewport,
            params: *params,
            output_size: self.canvas_size,
        })
    }

    /// Clear the in-flight flag after an admitted render returns.
    pub fn complete(&mut self) {
        self.generating = false;
    }

    /// Render the current state if it changed and the engine is free.
    ///
    /// Engine errors are returned after the in-flight flag is cleared.
    pub fn run_frame<E: FractalEngine + ?Sized>(
        &mut self,
        now: Instant,
        engine: Option<&mut E>,
        viewport: &Viewport,
        params: &GenerationParams,
    ) -> Result<FrameOutcome, EngineError> {
        let Some(engine) = engine else {
            return Ok(if self.dirty {
                FrameOutcome::NoEngine
            } else {
                FrameOutcome::Idle
            });
        };
        let request = match self.try_admit(now, viewport, params) {
            Ok(request) => request,
            Err(outcome) => return Ok(outcome),
        };

        let started = Instant::now();
        let result = engine.render(&request);
        self.complete();
        result?;

        debug!(
            min_re = request.viewport.min_re,
            max_im = request.viewport.max_im,
            view_size = request.viewport.view_size,
            max_iter = request.params.max_iterations,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Rendered frame"
        );
        Ok(FrameOutcome::Rendered)
    }
}
