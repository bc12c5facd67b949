use serde::Serialize;

use crate::network::Role;

use super::{VisualGraph, hex};

#[derive(Serialize)]
struct ExportNode<'a> {
    id: &'a str,
    label: &'a str,
    role: Role,
    size: usize,
    color: String,
    x: f32,
    y: f32,
    hidden: bool,
}

#[derive(Serialize)]
struct ExportEdge<'a> {
    id: &'a str,
    source: &'a str,
    target: &'a str,
    millivolts: i32,
    color: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    curve: Option<&'static str>,
}

#[derive(Serialize)]
struct ExportGraph<'a> {
    nodes: Vec<ExportNode<'a>>,
    edges: Vec<ExportEdge<'a>>,
}

impl VisualGraph {
    /// Stable JSON rendition of the graph (`{"nodes": [...], "edges": [...]}`).
    pub fn to_json(&self) -> serde_json::Result<String> {
        let export = ExportGraph {
            nodes: self
                .nodes
                .iter()
                .map(|node| ExportNode {
                    id: &node.id,
                    label: &node.label,
                    role: node.role,
                    size: node.size,
                    color: hex(node.color),
                    x: node.position.x,
                    y: node.position.y,
                    hidden: !node.visible,
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|edge| ExportEdge {
                    id: &edge.id,
                    source: &edge.source,
                    target: &edge.target,
                    millivolts: edge.millivolts,
                    color: hex(edge.color),
                    curve: edge.curve.map(|curve| curve.label()),
                })
                .collect(),
        };

        serde_json::to_string_pretty(&export)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use crate::layout::{LayoutConfig, assign_layout};
    use crate::network::RoleRule;
    use crate::network::fixtures::{numbered_network, sample_network};
    use crate::view::{ViewStyle, build_visual_graph};

    #[test]
    fn export_is_byte_identical_across_builds() {
        let network = numbered_network(30, &[(0, 1, 4), (1, 2, -4), (2, 0, 0), (9, 20, 1)]);
        let export = || {
            let layout = assign_layout(&network, &RoleRule::default(), &LayoutConfig::default());
            build_visual_graph(&network, &layout, &ViewStyle::default())
                .to_json()
                .unwrap()
        };
        assert_eq!(export().into_bytes(), export().into_bytes());
    }

    #[test]
    fn export_shape_matches_sample() {
        let network = sample_network();
        let layout = assign_layout(&network, &RoleRule::default(), &LayoutConfig::default());
        let mut graph = build_visual_graph(&network, &layout, &ViewStyle::default());
        graph.apply_visibility(|id| id != "C");

        let value: Value = serde_json::from_str(&graph.to_json().unwrap()).unwrap();
        assert_eq!(value["nodes"][0]["id"], "A");
        assert_eq!(value["nodes"][0]["role"], "input");
        assert_eq!(value["nodes"][0]["color"], "#ffffff");
        assert_eq!(value["nodes"][2]["hidden"], true);
        assert_eq!(value["edges"][0]["color"], "#00ff2d");
        assert_eq!(value["edges"][1]["millivolts"], -3);
        assert!(value["edges"][0].get("type").is_none());
    }
}
