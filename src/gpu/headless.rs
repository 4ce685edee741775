//! Host stand-in for the tile-deferred GPU
//!
//! Finished scenes are handed to a worker thread through a bounded channel; the
//! worker "renders" for one frame interval and then hands a ready token back.
//! `wait_ready` blocks on that token, which gives the loop the same backpressure
//! the real hardware applies.
//!
//! ```text
//! loop thread ──scene──► [cap 1] ──► worker ──ready──► [cap 1] ──► wait_ready
//! ```

use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::{Gpu, GpuError, ListKind, Primitive, PvrParams};

const BYTES_PER_VERTEX: usize = 32;

#[derive(Clone, Debug)]
pub struct HeadlessSettings {
    /// Time the worker spends on one scene
    pub frame_interval: Duration,
}

impl Default for HeadlessSettings {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
        }
    }
}

/// What one closed scene contained
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneSummary {
    pub frame: u64,
    pub lists: Vec<ListKind>,
    pub primitives: usize,
    pub vertices: usize,
    pub dropped: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Pass {
    Idle,
    Scene,
    List(ListKind),
}

impl Pass {
    fn describe(self) -> &'static str {
        match self {
            Pass::Idle => "no scene is open",
            Pass::Scene => "a scene is open",
            Pass::List(_) => "a list is open",
        }
    }
}

struct Worker {
    scene_tx: mpsc::Sender<SceneSummary>,
    ready_rx: mpsc::Receiver<()>,
    handle: JoinHandle<()>,
}

pub struct HeadlessGpu {
    settings: HeadlessSettings,
    params: Option<PvrParams>,
    pass: Pass,
    current: SceneSummary,
    last_scene: Option<SceneSummary>,
    frames: u64,
    worker: Option<Worker>,
}

impl HeadlessGpu {
    pub fn new(settings: HeadlessSettings) -> Self {
        debug!("Creating headless GPU with settings: {:?}", settings);
        Self {
            settings,
            params: None,
            pass: Pass::Idle,
            current: SceneSummary::default(),
            last_scene: None,
            frames: 0,
            worker: None,
        }
    }

    /// Scenes handed to the worker so far
    pub fn frames_submitted(&self) -> u64 {
        self.frames
    }

    pub fn last_scene(&self) -> Option<&SceneSummary> {
        self.last_scene.as_ref()
    }

    fn vertex_budget(&self) -> usize {
        self.params
            .as_ref()
            .map(|p| p.vertex_buffer_size / BYTES_PER_VERTEX)
            .unwrap_or(0)
    }

    fn expect_pass(&self, expected: Pass, op: &'static str) -> Result<(), GpuError> {
        if self.params.is_none() {
            return Err(GpuError::NotInitialized);
        }
        let matches = match (expected, self.pass) {
            (Pass::List(_), Pass::List(_)) => true,
            (a, b) => a == b,
        };
        if matches {
            Ok(())
        } else {
            Err(GpuError::Protocol {
                op,
                state: self.pass.describe(),
            })
        }
    }

    fn spawn_worker(&mut self) -> Result<(), GpuError> {
        let (scene_tx, mut scene_rx) = mpsc::channel::<SceneSummary>(1);
        let (ready_tx, ready_rx) = mpsc::channel::<()>(1);

        // The first frame does not wait for a previous one
        ready_tx
            .try_send(())
            .map_err(|e| GpuError::InitializationError(e.to_string()))?;

        let interval = self.settings.frame_interval;
        let handle = thread::Builder::new()
            .name("gpu-worker".to_string())
            .spawn(move || {
                debug!("GPU worker started");
                while let Some(scene) = scene_rx.blocking_recv() {
                    if !interval.is_zero() {
                        thread::sleep(interval);
                    }
                    debug!(
                        "Rendered frame {}: {} primitives, {} vertices",
                        scene.frame, scene.primitives, scene.vertices
                    );
                    if ready_tx.blocking_send(()).is_err() {
                        break;
                    }
                }
                debug!("GPU worker finished");
            })
            .map_err(|e| GpuError::InitializationError(e.to_string()))?;

        self.worker = Some(Worker {
            scene_tx,
            ready_rx,
            handle,
        });
        Ok(())
    }
}

impl Gpu for HeadlessGpu {
    fn init(&mut self, params: &PvrParams) -> Result<(), GpuError> {
        if self.worker.is_some() {
            warn!("Headless GPU initialized twice, keeping the running worker");
        } else {
            self.spawn_worker()?;
        }
        info!(
            "Headless GPU ready: vertex buffer {} KiB, autosort {}",
            params.vertex_buffer_size / 1024,
            params.autosort
        );
        self.params = Some(params.clone());
        Ok(())
    }

    fn wait_ready(&mut self) -> Result<(), GpuError> {
        let worker = self.worker.as_mut().ok_or(GpuError::NotInitialized)?;
        worker
            .ready_rx
            .blocking_recv()
            .ok_or_else(|| GpuError::Disconnected("ready channel closed".to_string()))
    }

    fn scene_begin(&mut self) -> Result<(), GpuError> {
        self.expect_pass(Pass::Idle, "scene_begin")?;
        self.current = SceneSummary {
            frame: self.frames,
            ..SceneSummary::default()
        };
        self.pass = Pass::Scene;
        Ok(())
    }

    fn list_begin(&mut self, list: ListKind) -> Result<(), GpuError> {
        self.expect_pass(Pass::Scene, "list_begin")?;
        let enabled = self
            .params
            .as_ref()
            .map(|p| p.list_enabled(list))
            .unwrap_or(false);
        if !enabled {
            return Err(GpuError::ListDisabled(list));
        }
        if self.current.lists.contains(&list) {
            return Err(GpuError::Protocol {
                op: "list_begin",
                state: "that list was already submitted in this scene",
            });
        }
        self.current.lists.push(list);
        self.pass = Pass::List(list);
        Ok(())
    }

    fn submit(&mut self, primitive: Primitive) {
        if !matches!(self.pass, Pass::List(_)) {
            warn!("Primitive submitted while {}, dropped", self.pass.describe());
            self.current.dropped += 1;
            return;
        }
        let vertices = primitive.vertex_count();
        if self.current.vertices + vertices > self.vertex_budget() {
            if self.current.dropped == 0 {
                warn!("Vertex buffer full in frame {}", self.current.frame);
            }
            self.current.dropped += 1;
            return;
        }
        self.current.vertices += vertices;
        self.current.primitives += 1;
    }

    fn list_finish(&mut self) -> Result<(), GpuError> {
        self.expect_pass(Pass::List(ListKind::Translucent), "list_finish")?;
        self.pass = Pass::Scene;
        Ok(())
    }

    fn scene_finish(&mut self) -> Result<(), GpuError> {
        self.expect_pass(Pass::Scene, "scene_finish")?;
        self.pass = Pass::Idle;

        let scene = std::mem::take(&mut self.current);
        let worker = self.worker.as_ref().ok_or(GpuError::NotInitialized)?;
        worker
            .scene_tx
            .blocking_send(scene.clone())
            .map_err(|e| GpuError::Disconnected(e.to_string()))?;

        self.frames += 1;
        self.last_scene = Some(scene);
        Ok(())
    }
}

impl Drop for HeadlessGpu {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let Worker {
                scene_tx,
                ready_rx,
                handle,
            } = worker;
            drop(ready_rx);
            drop(scene_tx);
            if handle.join().is_err() {
                error!("GPU worker panicked");
            }
        }
    }
}
