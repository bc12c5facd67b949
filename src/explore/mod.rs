mod walk;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::Network;
use crate::view::VisualGraph;

pub use walk::reachable;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExploreError {
    #[error("no cell with id {0:?} in the network")]
    UnknownCell(String),
    #[error("invalid path parameter: {0}")]
    InvalidParameter(String),
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[value(alias = "fwd")]
    Forward,
    #[value(alias = "back")]
    Backward,
    #[default]
    Both,
}

impl Direction {
    pub const ALL: [Self; 3] = [Self::Forward, Self::Backward, Self::Both];

    pub fn includes_forward(self) -> bool {
        matches!(self, Self::Forward | Self::Both)
    }

    pub fn includes_backward(self) -> bool {
        matches!(self, Self::Backward | Self::Both)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Direction {
    type Err = ExploreError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim().to_ascii_lowercase().as_str() {
            "forward" | "fwd" => Ok(Self::Forward),
            "backward" | "back" => Ok(Self::Backward),
            "both" => Ok(Self::Both),
            other => Err(ExploreError::InvalidParameter(format!(
                "unrecognized direction {other:?}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkSummary {
    pub focus: String,
    pub reached: usize,
    pub total: usize,
}

/// Bounded reachability around a focus cell, written out as the visual
/// graph's visibility mask.
#[derive(Clone, Debug)]
pub struct PathExplorer {
    focus: Option<String>,
    max_depth: u32,
    direction: Direction,
    visited: HashSet<String>,
}

impl Default for PathExplorer {
    fn default() -> Self {
        Self::new(2, Direction::Both)
    }
}

impl PathExplorer {
    pub fn new(max_depth: u32, direction: Direction) -> Self {
        Self {
            focus: None,
            max_depth,
            direction,
            visited: HashSet::new(),
        }
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    pub fn select_focus(
        &mut self,
        network: &Network,
        graph: &mut VisualGraph,
        cell_id: &str,
    ) -> Result<WalkSummary, ExploreError> {
        if !network.contains_cell(cell_id) {
            return Err(ExploreError::UnknownCell(cell_id.to_owned()));
        }

        self.focus = Some(cell_id.to_owned());
        self.walk(network, graph)?
            .ok_or_else(|| ExploreError::UnknownCell(cell_id.to_owned()))
    }

    /// Stores new parameters and re-walks when a focus is set.
    pub fn set_parameters(
        &mut self,
        network: &Network,
        graph: &mut VisualGraph,
        max_depth: i64,
        direction: Direction,
    ) -> Result<Option<WalkSummary>, ExploreError> {
        let max_depth = u32::try_from(max_depth).map_err(|_| {
            ExploreError::InvalidParameter(format!("depth must be a non-negative integer, got {max_depth}"))
        })?;

        self.max_depth = max_depth;
        self.direction = direction;
        self.walk(network, graph)
    }

    pub fn walk(
        &mut self,
        network: &Network,
        graph: &mut VisualGraph,
    ) -> Result<Option<WalkSummary>, ExploreError> {
        let Some(focus) = self.focus.as_deref() else {
            return Ok(None);
        };
        if !network.contains_cell(focus) {
            return Err(ExploreError::UnknownCell(focus.to_owned()));
        }

        self.visited = reachable(network, focus, self.max_depth, self.direction);
        graph.apply_visibility(|id| self.visited.contains(id));

        let summary = WalkSummary {
            focus: focus.to_owned(),
            reached: self.visited.len(),
            total: network.cell_count(),
        };
        tracing::debug!(
            focus = %summary.focus,
            depth = self.max_depth,
            direction = %self.direction,
            "done walking path: {} / {} cells",
            summary.reached,
            summary.total
        );
        Ok(Some(summary))
    }

    pub fn clear(&mut self, graph: &mut VisualGraph) {
        self.focus = None;
        self.visited.clear();
        graph.set_all_visible(true);
    }

    pub fn hide_all(&self, graph: &mut VisualGraph) {
        graph.set_all_visible(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutConfig, assign_layout};
    use crate::network::RoleRule;
    use crate::network::fixtures::{cycle_network, sample_network};
    use crate::view::{ViewStyle, build_visual_graph};

    fn graph_for(network: &Network) -> VisualGraph {
        let layout = assign_layout(network, &RoleRule::default(), &LayoutConfig::default());
        build_visual_graph(network, &layout, &ViewStyle::default())
    }

    fn visible_ids(graph: &VisualGraph) -> Vec<&str> {
        graph
            .nodes()
            .iter()
            .filter(|node| node.visible)
            .map(|node| node.id.as_str())
            .collect()
    }

    #[test]
    fn select_focus_masks_unreached_nodes() {
        let network = sample_network();
        let mut graph = graph_for(&network);
        let mut explorer = PathExplorer::new(1, Direction::Forward);

        let summary = explorer.select_focus(&network, &mut graph, "A").unwrap();
        assert_eq!(summary.reached, 2);
        assert_eq!(summary.total, 3);
        assert_eq!(visible_ids(&graph), ["A", "B"]);

        explorer
            .set_parameters(&network, &mut graph, 2, Direction::Forward)
            .unwrap();
        assert_eq!(visible_ids(&graph), ["A", "B", "C"]);
    }

    #[test]
    fn changing_focus_leaves_no_stale_visibility() {
        let network = sample_network();
        let mut graph = graph_for(&network);
        let mut explorer = PathExplorer::new(1, Direction::Forward);

        explorer.select_focus(&network, &mut graph, "A").unwrap();
        explorer.select_focus(&network, &mut graph, "C").unwrap();
        assert_eq!(visible_ids(&graph), ["C"]);
    }

    #[test]
    fn rewalking_with_same_state_is_idempotent() {
        let network = cycle_network();
        let mut graph = graph_for(&network);
        let mut explorer = PathExplorer::new(5, Direction::Forward);

        explorer.select_focus(&network, &mut graph, "A").unwrap();
        let first = explorer.visited().clone();
        explorer
            .set_parameters(&network, &mut graph, 5, Direction::Forward)
            .unwrap();
        assert_eq!(explorer.visited(), &first);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn walk_without_focus_is_a_no_op() {
        let network = sample_network();
        let mut graph = graph_for(&network);
        let mut explorer = PathExplorer::default();

        assert_eq!(explorer.walk(&network, &mut graph), Ok(None));
        assert_eq!(
            explorer.set_parameters(&network, &mut graph, 3, Direction::Backward),
            Ok(None)
        );
        assert_eq!(graph.visible_count(), 3);
        assert_eq!(explorer.max_depth(), 3);
    }

    #[test]
    fn unknown_focus_is_reported_and_view_untouched() {
        let network = sample_network();
        let mut graph = graph_for(&network);
        let mut explorer = PathExplorer::new(1, Direction::Forward);
        explorer.select_focus(&network, &mut graph, "A").unwrap();
        let before = graph.clone();

        let error = explorer
            .select_focus(&network, &mut graph, "Z")
            .unwrap_err();
        assert_eq!(error, ExploreError::UnknownCell("Z".to_owned()));
        assert_eq!(graph, before);
        assert_eq!(explorer.focus(), Some("A"));
    }

    #[test]
    fn negative_depth_is_rejected_without_side_effects() {
        let network = sample_network();
        let mut graph = graph_for(&network);
        let mut explorer = PathExplorer::new(1, Direction::Forward);
        explorer.select_focus(&network, &mut graph, "A").unwrap();
        let before = graph.clone();

        let error = explorer
            .set_parameters(&network, &mut graph, -1, Direction::Both)
            .unwrap_err();
        assert!(matches!(error, ExploreError::InvalidParameter(_)));
        assert_eq!(graph, before);
        assert_eq!(explorer.max_depth(), 1);
        assert_eq!(explorer.direction(), Direction::Forward);
    }

    #[test]
    fn clear_shows_everything_and_hide_all_blanks() {
        let network = sample_network();
        let mut graph = graph_for(&network);
        let mut explorer = PathExplorer::new(0, Direction::Forward);
        explorer.select_focus(&network, &mut graph, "B").unwrap();
        assert_eq!(graph.visible_count(), 1);

        explorer.clear(&mut graph);
        assert_eq!(graph.visible_count(), 3);
        assert_eq!(explorer.focus(), None);
        assert!(explorer.visited().is_empty());

        explorer.hide_all(&mut graph);
        assert_eq!(graph.visible_count(), 0);
    }

    #[test]
    fn direction_tokens_parse() {
        assert_eq!("fwd".parse::<Direction>(), Ok(Direction::Forward));
        assert_eq!("Back".parse::<Direction>(), Ok(Direction::Backward));
        assert_eq!(" both ".parse::<Direction>(), Ok(Direction::Both));
        assert!(matches!(
            "sideways".parse::<Direction>(),
            Err(ExploreError::InvalidParameter(_))
        ));
    }
}
