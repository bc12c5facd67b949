use thiserror::Error;

use crate::config::SessionConfig;
use crate::explore::{Direction, ExploreError, PathExplorer, WalkSummary};
use crate::layout::{Layout, LayoutError, assign_layout};
use crate::network::{Network, Role, RoleRule};
use crate::refine::{RefineError, RefineOptions, RefinementController};
use crate::view::{VisualGraph, build_visual_graph};

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Refine(#[from] RefineError),
}

/// One loaded network and everything derived from it. The UI drives it
/// through the command methods and redraws whenever [`Session::revision`]
/// moves.
pub struct Session {
    network: Network,
    roles: RoleRule,
    layout: Layout,
    graph: VisualGraph,
    explorer: PathExplorer,
    refinement: RefinementController,
    revision: u64,
}

impl Session {
    pub fn new(network: Network, config: &SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let layout = assign_layout(&network, &config.roles, &config.layout);
        let graph = build_visual_graph(&network, &layout, &config.style);
        let explorer = PathExplorer::new(config.explorer.max_depth, config.explorer.direction);
        let mut refinement = RefinementController::default();
        refinement.configure(config.refine.clone())?;

        Ok(Self {
            network,
            roles: config.roles.clone(),
            layout,
            graph,
            explorer,
            refinement,
            revision: 0,
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn graph(&self) -> &VisualGraph {
        &self.graph
    }

    pub fn explorer(&self) -> &PathExplorer {
        &self.explorer
    }

    pub fn refinement(&self) -> &RefinementController {
        &self.refinement
    }

    pub fn role_of(&self, cell_id: &str) -> Option<Role> {
        self.network.role_of(cell_id, &self.roles)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn select_focus(&mut self, cell_id: &str) -> Result<WalkSummary, ExploreError> {
        let summary = self
            .explorer
            .select_focus(&self.network, &mut self.graph, cell_id)?;
        self.touch();
        Ok(summary)
    }

    pub fn set_parameters(
        &mut self,
        max_depth: i64,
        direction: Direction,
    ) -> Result<Option<WalkSummary>, ExploreError> {
        let summary =
            self.explorer
                .set_parameters(&self.network, &mut self.graph, max_depth, direction)?;
        if summary.is_some() {
            self.touch();
        }
        Ok(summary)
    }

    pub fn clear(&mut self) {
        self.explorer.clear(&mut self.graph);
        self.touch();
    }

    pub fn hide_all(&mut self) {
        self.explorer.hide_all(&mut self.graph);
        self.touch();
    }

    pub fn configure_refinement(&mut self, options: RefineOptions) -> Result<(), RefineError> {
        self.refinement.configure(options)
    }

    pub fn start_refinement(&mut self) {
        self.refinement.start(&self.graph);
    }

    pub fn stop_refinement(&mut self) {
        self.refinement.stop();
    }

    /// Advances a running refinement; call once per frame.
    pub fn tick(&mut self) -> bool {
        let moved = self.refinement.tick(&mut self.graph);
        if moved {
            self.touch();
        }
        moved
    }
}
