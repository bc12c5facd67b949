mod export;
mod palette;

use std::collections::HashMap;

use eframe::egui::{Color32, Vec2};
use serde::{Deserialize, Serialize};

use crate::layout::Layout;
use crate::network::{Network, Polarity, Role};
use crate::util::normalize_log;

pub use palette::{NodeColoring, Palette, hashed_color, hex};

pub const MIN_NODE_RADIUS: f32 = 2.0;
pub const MAX_NODE_RADIUS: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CurveHint {
    CurvedArrow,
}

impl CurveHint {
    pub fn label(self) -> &'static str {
        match self {
            Self::CurvedArrow => "curvedArrow",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewStyle {
    pub node_coloring: NodeColoring,
    pub edge_curve: Option<CurveHint>,
    #[serde(skip)]
    pub palette: Palette,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VisualNode {
    pub id: String,
    pub label: String,
    pub role: Role,
    /// Total degree; the renderer maps it onto its own radius range.
    pub size: usize,
    pub color: Color32,
    pub position: Vec2,
    pub visible: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VisualEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_index: usize,
    pub target_index: usize,
    pub millivolts: i32,
    pub color: Color32,
    pub curve: Option<CurveHint>,
}

/// Renderer-facing graph. Visibility and positions are the only fields that
/// change after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualGraph {
    nodes: Vec<VisualNode>,
    edges: Vec<VisualEdge>,
    index_by_id: HashMap<String, usize>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
    min_size: usize,
    max_size: usize,
}

impl VisualGraph {
    pub fn nodes(&self) -> &[VisualNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[VisualEdge] {
        &self.edges
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&VisualNode> {
        self.node_index(id).map(|index| &self.nodes[index])
    }

    /// Edge indices leaving node `index`.
    pub fn outgoing(&self, index: usize) -> &[usize] {
        self.outgoing.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Edge indices entering node `index`.
    pub fn incoming(&self, index: usize) -> &[usize] {
        self.incoming.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn size_range(&self) -> (usize, usize) {
        (self.min_size, self.max_size)
    }

    /// World-space radius for a node, log-scaled between the graph's smallest
    /// and largest degree.
    pub fn node_radius(&self, node: &VisualNode) -> f32 {
        let (min_size, max_size) = self.size_range();
        MIN_NODE_RADIUS
            + normalize_log(node.size, min_size, max_size) * (MAX_NODE_RADIUS - MIN_NODE_RADIUS)
    }

    pub fn visible_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.visible).count()
    }

    /// Synapses whose endpoints are both visible, on screen or not.
    pub fn visible_edge_count(&self) -> usize {
        self.edges.iter().filter(|edge| self.is_edge_visible(edge)).count()
    }

    pub fn is_edge_visible(&self, edge: &VisualEdge) -> bool {
        self.nodes[edge.source_index].visible && self.nodes[edge.target_index].visible
    }

    pub fn set_all_visible(&mut self, visible: bool) {
        for node in &mut self.nodes {
            node.visible = visible;
        }
    }

    /// Overwrites every node's visibility.
    pub fn apply_visibility(&mut self, mut is_visible: impl FnMut(&str) -> bool) {
        for node in &mut self.nodes {
            node.visible = is_visible(&node.id);
        }
    }

    pub fn positions(&self) -> Vec<Vec2> {
        self.nodes.iter().map(|node| node.position).collect()
    }

    /// Writes positions back in node order; extra entries are ignored.
    pub fn set_positions(&mut self, positions: &[Vec2]) {
        for (node, position) in self.nodes.iter_mut().zip(positions) {
            node.position = *position;
        }
    }
}

fn node_color(network: &Network, id: &str, role: Role, style: &ViewStyle) -> Color32 {
    match style.node_coloring {
        NodeColoring::Role => style.palette.role(role),
        NodeColoring::Polarity => style
            .palette
            .polarity(Polarity::of(network.net_output_millivolts(id))),
        NodeColoring::Hashed => hashed_color(id),
    }
}

pub fn build_visual_graph(network: &Network, layout: &Layout, style: &ViewStyle) -> VisualGraph {
    let mut nodes = Vec::with_capacity(layout.len());
    let mut index_by_id = HashMap::with_capacity(layout.len());

    for placement in layout.placements() {
        let Some(cell) = network.cell(&placement.id) else {
            continue;
        };

        index_by_id.insert(cell.id.clone(), nodes.len());
        nodes.push(VisualNode {
            id: cell.id.clone(),
            label: cell.label().to_owned(),
            role: placement.role,
            size: cell.degree(),
            color: node_color(network, &cell.id, placement.role, style),
            position: placement.position,
            visible: true,
        });
    }

    let mut edges = Vec::with_capacity(network.synapse_count());
    let mut outgoing = vec![Vec::new(); nodes.len()];
    let mut incoming = vec![Vec::new(); nodes.len()];
    for synapse_id in network.sorted_synapse_ids() {
        let Some(synapse) = network.synapse(synapse_id) else {
            continue;
        };
        let (Some(&source_index), Some(&target_index)) = (
            index_by_id.get(&synapse.from_neuron_axon),
            index_by_id.get(&synapse.to_neuron_dendrite),
        ) else {
            continue;
        };

        outgoing[source_index].push(edges.len());
        incoming[target_index].push(edges.len());
        edges.push(VisualEdge {
            id: synapse.id.clone(),
            source: synapse.from_neuron_axon.clone(),
            target: synapse.to_neuron_dendrite.clone(),
            source_index,
            target_index,
            millivolts: synapse.millivolts,
            color: style.palette.polarity(synapse.polarity()),
            curve: style.edge_curve,
        });
    }

    let min_size = nodes.iter().map(|node| node.size).min().unwrap_or(0);
    let max_size = nodes.iter().map(|node| node.size).max().unwrap_or(0);

    VisualGraph {
        nodes,
        edges,
        index_by_id,
        outgoing,
        incoming,
        min_size,
        max_size,
    }
}
