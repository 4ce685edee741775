//! # Frame Scheduler
//!
//! Owns every collaborator of the menu and drives it through its lifecycle:
//!
//! ```text
//! Starting ──startup ok──► Running (one frame per step, forever)
//!     └──────startup failed──► Halted (exit status 1)
//! ```
//!
//! One Running step is strictly ordered: reset per-frame state, sample and
//! translate input, dispatch the event to the active strategy, then submit one
//! scene with one translucent list that the active strategy draws into. The
//! GPU ready wait at the start of the submission is the loop's only blocking point.

use chrono::{DateTime, Local};
use statum::{machine, state};
use std::convert::Infallible;
use tracing::{debug, error, info};

use crate::catalog::Catalog;
use crate::controller::{InputTranslator, LogicalEvent, PeripheralSampler};
use crate::gpu::{submit_frame, Canvas, DepthCounter, Gpu, GpuError, ListKind, PvrParams};
use crate::startup::{StartupReport, StartupSequencer, Subsystem};
use crate::ui::{StrategyRegistry, UiContext, UiStrategy};

// Frame loop errors
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("Frame submission failed: {0}")]
    Gpu(#[from] GpuError),
}

/// Frame counter with a periodic rate log
#[derive(Debug, Clone)]
pub struct FrameStats {
    frames: u64,
    window_frames: u64,
    window_start: DateTime<Local>,
    interval: chrono::Duration,
}

impl FrameStats {
    pub fn new(interval: chrono::Duration) -> Self {
        Self {
            frames: 0,
            window_frames: 0,
            window_start: Local::now(),
            interval,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn tick(&mut self) {
        self.tick_at(Local::now());
    }

    /// Counts one frame; returns the frame rate when a log window closed
    pub fn tick_at(&mut self, now: DateTime<Local>) -> Option<f64> {
        self.frames += 1;
        self.window_frames += 1;

        let elapsed = now - self.window_start;
        if elapsed < self.interval {
            return None;
        }

        let secs = elapsed.num_milliseconds() as f64 / 1000.0;
        let fps = if secs > 0.0 {
            self.window_frames as f64 / secs
        } else {
            0.0
        };
        info!(
            "Frame stats: {} frames in last {:.1} seconds (avg {:.2} fps, {} total)",
            self.window_frames, secs, fps, self.frames
        );
        self.window_frames = 0;
        self.window_start = now;
        Some(fps)
    }
}

#[state]
#[derive(Debug, Clone)]
pub enum LoopState {
    Starting,
    Running,
    Halted,
}

#[machine]
pub struct FrameLoop<S: LoopState> {
    registry: StrategyRegistry,
    sampler: Box<dyn PeripheralSampler>,
    translator: InputTranslator,
    gpu: Box<dyn Gpu>,
    params: PvrParams,

    // Per-frame transient state
    depth: DepthCounter,

    catalog: Catalog,
    report: StartupReport,
    stats: FrameStats,
}

/// Where `start` left the loop
pub enum LoopOutcome {
    Running(FrameLoop<Running>),
    Halted(FrameLoop<Halted>),
}

impl<S: LoopState> FrameLoop<S> {
    pub fn report(&self) -> &StartupReport {
        &self.report
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl FrameLoop<Starting> {
    pub fn create(
        registry: StrategyRegistry,
        sampler: Box<dyn PeripheralSampler>,
        translator: InputTranslator,
        gpu: Box<dyn Gpu>,
        params: PvrParams,
        stats: FrameStats,
    ) -> Self {
        info!("Creating frame loop with {} UI strategies", registry.len());
        Self::new(
            registry,
            sampler,
            translator,
            gpu,
            params,
            DepthCounter::default(),
            Catalog::default(),
            StartupReport::default(),
            stats,
        )
    }

    /// Initializes the GPU, runs startup once and picks the next state
    ///
    /// A failed GPU init is recorded as a failed [`Subsystem::Gpu`] step. It counts
    /// toward the startup result like any other step, so the loop halts with exit
    /// code 1 instead of stalling on the first frame.
    pub fn start(mut self, sequencer: &mut StartupSequencer) -> LoopOutcome {
        info!("Initializing GPU with {:?}", self.params);
        let gpu = self.gpu.init(&self.params);
        self.report.record(Subsystem::Gpu, &gpu);

        let startup = sequencer.run(&mut self.registry);
        self.report.absorb(startup.report);
        self.catalog = startup.catalog;

        if self.report.is_success() {
            info!("Startup succeeded, transitioning to Running state");
            LoopOutcome::Running(self.transition())
        } else {
            error!(
                "Startup failed with result {}, transitioning to Halted state",
                self.report.result()
            );
            LoopOutcome::Halted(self.transition())
        }
    }
}

impl FrameLoop<Running> {
    pub fn frames(&self) -> u64 {
        self.stats.frames()
    }

    /// Runs one frame and returns the event it dispatched
    pub fn step(&mut self) -> Result<LogicalEvent, FrameError> {
        self.depth.reset();

        let event = self.translator.translate(self.sampler.sample());
        if event != LogicalEvent::None {
            debug!("Dispatching {} to {}", event, self.registry.active().kind());
        }

        let ctx = UiContext::new(&self.catalog);
        let request = self.registry.active_mut().handle_event(&ctx, event);
        self.registry.apply(request, &ctx);

        let registry = &mut self.registry;
        let depth = &mut self.depth;
        submit_frame(self.gpu.as_mut(), ListKind::Translucent, |gpu| {
            let mut canvas = Canvas::new(gpu, depth);
            registry.active_mut().render(&ctx, &mut canvas);
        })?;

        self.stats.tick();
        Ok(event)
    }

    /// Runs frames until the GPU fails; never returns otherwise
    pub fn run(mut self) -> Result<Infallible, FrameError> {
        info!("Entering frame loop");
        loop {
            if let Err(e) = self.step() {
                error!("Frame loop stopped after {} frames: {}", self.frames(), e);
                return Err(e);
            }
        }
    }
}

impl FrameLoop<Halted> {
    pub fn exit_code(&self) -> i32 {
        self.report.exit_code()
    }
}
