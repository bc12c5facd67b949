mod engine;
mod forces;
mod quadtree;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender, TryRecvError};
use std::thread;
use std::time::Duration;

use eframe::egui::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::view::VisualGraph;

pub use engine::ForceEngine;

/// Worker back-off while the engine reports no movement.
const SETTLED_POLL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RefineError {
    #[error("invalid refinement option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RefineOptions {
    pub iterations_per_render: u32,
    pub gravity: f32,
    pub edge_weight_influence: f32,
    pub lin_log_mode: bool,
    pub adjust_sizes: bool,
    pub worker: bool,
    pub restart_on_start: bool,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self {
            iterations_per_render: 10,
            gravity: 10.0,
            edge_weight_influence: 0.0,
            lin_log_mode: true,
            adjust_sizes: true,
            worker: false,
            restart_on_start: false,
        }
    }
}

impl RefineOptions {
    pub fn validate(&self) -> Result<(), RefineError> {
        if self.iterations_per_render == 0 {
            return Err(RefineError::InvalidOption {
                name: "iterations_per_render",
                reason: "must be at least 1".to_owned(),
            });
        }
        for (name, value) in [
            ("gravity", self.gravity),
            ("edge_weight_influence", self.edge_weight_influence),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(RefineError::InvalidOption {
                    name,
                    reason: format!("must be a finite non-negative number, got {value}"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RefineEdge {
    pub source: usize,
    pub target: usize,
    pub weight: f32,
}

/// Everything an engine needs from the visual graph, indexed in node order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RefineInput {
    pub positions: Vec<Vec2>,
    pub radii: Vec<f32>,
    pub edges: Vec<RefineEdge>,
}

impl RefineInput {
    pub fn from_graph(graph: &VisualGraph) -> Self {
        Self {
            positions: graph.positions(),
            radii: graph
                .nodes()
                .iter()
                .map(|node| graph.node_radius(node))
                .collect(),
            edges: graph
                .edges()
                .iter()
                .map(|edge| RefineEdge {
                    source: edge.source_index,
                    target: edge.target_index,
                    weight: edge.millivolts as f32,
                })
                .collect(),
        }
    }
}

/// An iterative layout algorithm. The controller only moves positions in and
/// out of it; what an iteration means is up to the engine.
pub trait RefinementEngine: Clone + Send + 'static {
    fn load(&mut self, input: RefineInput);
    /// Runs one iteration and reports whether any position changed.
    fn iterate(&mut self, options: &RefineOptions) -> bool;
    fn positions(&self) -> &[Vec2];
}

struct Worker {
    stop: Arc<AtomicBool>,
    snapshots: Receiver<Vec<Vec2>>,
    updates: Sender<RefineOptions>,
}

enum RunState {
    Idle,
    Inline,
    Worker(Worker),
}

pub struct RefinementController<E: RefinementEngine = ForceEngine> {
    engine: E,
    options: RefineOptions,
    state: RunState,
}

impl Default for RefinementController<ForceEngine> {
    fn default() -> Self {
        Self::new(ForceEngine::default())
    }
}

impl<E: RefinementEngine> RefinementController<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            options: RefineOptions::default(),
            state: RunState::Idle,
        }
    }

    pub fn options(&self) -> &RefineOptions {
        &self.options
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.state, RunState::Idle)
    }

    pub fn configure(&mut self, options: RefineOptions) -> Result<(), RefineError> {
        if let Err(error) = options.validate() {
            tracing::warn!(%error, "rejected refinement options");
            return Err(error);
        }

        if let RunState::Worker(worker) = &self.state {
            let _ = worker.updates.send(options.clone());
        }
        self.options = options;
        Ok(())
    }

    /// Starts from the graph's current positions. A second start is a no-op
    /// unless `restart_on_start` is set.
    pub fn start(&mut self, graph: &VisualGraph) {
        if self.is_running() {
            if !self.options.restart_on_start {
                return;
            }
            self.stop();
        }

        self.engine.load(RefineInput::from_graph(graph));
        self.state = if self.options.worker {
            RunState::Worker(self.spawn_worker())
        } else {
            RunState::Inline
        };
        tracing::info!(
            nodes = graph.nodes().len(),
            worker = self.options.worker,
            "layout refinement started"
        );
    }

    pub fn stop(&mut self) {
        match std::mem::replace(&mut self.state, RunState::Idle) {
            RunState::Idle => return,
            RunState::Inline => {}
            RunState::Worker(worker) => worker.stop.store(true, Ordering::Relaxed),
        }
        tracing::info!("layout refinement stopped");
    }

    /// Advances the layout and writes positions back. Returns whether the
    /// graph's positions were updated.
    pub fn tick(&mut self, graph: &mut VisualGraph) -> bool {
        let mut worker_gone = false;
        let updated = match &self.state {
            RunState::Idle => false,
            RunState::Inline => {
                let mut moved = false;
                for _ in 0..self.options.iterations_per_render {
                    moved |= self.engine.iterate(&self.options);
                }
                if moved {
                    graph.set_positions(self.engine.positions());
                }
                moved
            }
            RunState::Worker(worker) => {
                let mut latest = None;
                loop {
                    match worker.snapshots.try_recv() {
                        Ok(snapshot) => latest = Some(snapshot),
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            worker_gone = true;
                            break;
                        }
                    }
                }
                match latest {
                    Some(positions) => {
                        graph.set_positions(&positions);
                        true
                    }
                    None => false,
                }
            }
        };

        if worker_gone {
            tracing::warn!("refinement worker exited unexpectedly");
            self.state = RunState::Idle;
        }
        updated
    }

    fn spawn_worker(&self) -> Worker {
        let stop = Arc::new(AtomicBool::new(false));
        let (snapshot_tx, snapshots) = mpsc::sync_channel(1);
        let (updates, update_rx) = mpsc::channel();

        let engine = self.engine.clone();
        let options = self.options.clone();
        let flag = Arc::clone(&stop);
        thread::spawn(move || run_worker(engine, options, &flag, &snapshot_tx, &update_rx));

        Worker {
            stop,
            snapshots,
            updates,
        }
    }
}

impl<E: RefinementEngine> Drop for RefinementController<E> {
    fn drop(&mut self) {
        if let RunState::Worker(worker) = &self.state {
            worker.stop.store(true, Ordering::Relaxed);
        }
    }
}

fn run_worker<E: RefinementEngine>(
    mut engine: E,
    mut options: RefineOptions,
    stop: &AtomicBool,
    snapshots: &SyncSender<Vec<Vec2>>,
    updates: &Receiver<RefineOptions>,
) {
    while !stop.load(Ordering::Relaxed) {
        while let Ok(next) = updates.try_recv() {
            options = next;
        }
        let mut moved = false;
        for _ in 0..options.iterations_per_render {
            if stop.load(Ordering::Relaxed) {
                return;
            }
            moved |= engine.iterate(&options);
        }
        if !moved {
            thread::sleep(SETTLED_POLL);
            continue;
        }
        // Blocks until the UI takes the previous snapshot; fails once the
        // controller has dropped its receiver.
        if snapshots.send(engine.positions().to_vec()).is_err() {
            return;
        }
    }
}
