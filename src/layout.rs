use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::{Network, Role, RoleRule};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OffsetPolicy {
    /// `offset_k = -offset_{k-1} + step`, with the step's sign flipping after each placement.
    #[default]
    #[value(name = "zigzag")]
    ZigZag,
    /// `offset_k = offset_{k-1} + fanout`.
    Monotonic,
}

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("invalid layout option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub fanout: f32,
    /// Interior offsets beyond this magnitude wrap onto a new band.
    pub wrap_width: f32,
    pub interior_depth: f32,
    pub input_depth: f32,
    pub output_depth: f32,
    pub offset_policy: OffsetPolicy,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            fanout: 10.0,
            wrap_width: 400.0,
            interior_depth: 1.0,
            input_depth: 1200.0,
            output_depth: -200.0,
            offset_policy: OffsetPolicy::ZigZag,
        }
    }
}

impl LayoutConfig {
    /// A zero fanout would stack every lane on one point.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if !self.fanout.is_finite() || self.fanout == 0.0 {
            return Err(LayoutError::InvalidOption {
                name: "fanout",
                reason: format!("must be a finite non-zero number, got {}", self.fanout),
            });
        }
        if !self.wrap_width.is_finite() || self.wrap_width <= 0.0 {
            return Err(LayoutError::InvalidOption {
                name: "wrap_width",
                reason: format!("must be a finite positive number, got {}", self.wrap_width),
            });
        }
        for (name, value) in [
            ("interior_depth", self.interior_depth),
            ("input_depth", self.input_depth),
            ("output_depth", self.output_depth),
        ] {
            if !value.is_finite() {
                return Err(LayoutError::InvalidOption {
                    name,
                    reason: format!("must be finite, got {value}"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub id: String,
    pub role: Role,
    pub position: Vec2,
}

/// Initial positions for every cell, in natural id order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
    placements: Vec<Placement>,
    index_by_id: HashMap<String, usize>,
}

impl Layout {
    pub fn placement(&self, id: &str) -> Option<&Placement> {
        self.index_by_id
            .get(id)
            .and_then(|&index| self.placements.get(index))
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn role_count(&self, role: Role) -> usize {
        self.placements
            .iter()
            .filter(|placement| placement.role == role)
            .count()
    }
}

struct Lane {
    depth: f32,
    offset: f32,
    step: f32,
    wraps: bool,
}

impl Lane {
    fn new(depth: f32, fanout: f32, wraps: bool) -> Self {
        Self {
            depth,
            offset: 0.0,
            step: fanout,
            wraps,
        }
    }

    fn place(&mut self, config: &LayoutConfig) -> Vec2 {
        self.offset = match config.offset_policy {
            OffsetPolicy::ZigZag => {
                let next = -self.offset + self.step;
                self.step = -self.step;
                next
            }
            OffsetPolicy::Monotonic => self.offset + self.step,
        };

        if self.wraps && self.offset.abs() > config.wrap_width {
            self.depth += 2.0 * config.fanout.abs();
            self.offset = 0.0;
        }

        vec2(self.offset, self.depth)
    }
}

/// Moves a pinned lane outward when the interior block reaches into it.
fn clear_of_block(pinned: f32, block_top: f32, block_bottom: f32, clearance: f32) -> f32 {
    if pinned >= block_top {
        pinned.max(block_bottom + clearance)
    } else {
        pinned.min(block_top - clearance)
    }
}

pub fn assign_layout(network: &Network, roles: &RoleRule, config: &LayoutConfig) -> Layout {
    let ids = network.sorted_cell_ids();
    let mut placements = Vec::with_capacity(ids.len());

    let mut interior = Lane::new(config.interior_depth, config.fanout, true);
    let mut pinned = Vec::new();
    for id in ids {
        let Some(role) = network.role_of(id, roles) else {
            continue;
        };
        let position = match role {
            Role::Interior => interior.place(config),
            Role::Input | Role::Output => {
                pinned.push(placements.len());
                Vec2::ZERO
            }
        };
        placements.push(Placement {
            id: id.to_owned(),
            role,
            position,
        });
    }

    let clearance = 2.0 * config.fanout.abs();
    let has_interior = placements.len() > pinned.len();
    let (input_depth, output_depth) = if has_interior {
        let block_top = config.interior_depth;
        let block_bottom = interior.depth;
        (
            clear_of_block(config.input_depth, block_top, block_bottom, clearance),
            clear_of_block(config.output_depth, block_top, block_bottom, clearance),
        )
    } else {
        (config.input_depth, config.output_depth)
    };

    let mut input = Lane::new(input_depth, config.fanout, false);
    let mut output = Lane::new(output_depth, config.fanout, false);
    for index in pinned {
        let placement = &mut placements[index];
        placement.position = match placement.role {
            Role::Input => input.place(config),
            _ => output.place(config),
        };
    }

    let index_by_id = placements
        .iter()
        .enumerate()
        .map(|(index, placement)| (placement.id.clone(), index))
        .collect();

    let layout = Layout {
        placements,
        index_by_id,
    };
    tracing::info!(
        input = layout.role_count(Role::Input),
        interior = layout.role_count(Role::Interior),
        output = layout.role_count(Role::Output),
        interior_bottom = interior.depth,
        "initial layout assigned"
    );
    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::fixtures::sample_network;

    fn interior_network(count: usize) -> Network {
        let mut builder = Network::builder();
        for index in 0..count {
            builder = builder.cell(format!("{index}"), None);
        }
        builder.build().unwrap()
    }

    fn positions(layout: &Layout) -> Vec<(f32, f32)> {
        layout
            .placements()
            .iter()
            .map(|placement| (placement.position.x, placement.position.y))
            .collect()
    }

    #[test]
    fn sample_cells_land_in_their_role_lanes() {
        let layout = assign_layout(&sample_network(), &RoleRule::default(), &LayoutConfig::default());

        let a = layout.placement("A").unwrap();
        let b = layout.placement("B").unwrap();
        let c = layout.placement("C").unwrap();
        assert_eq!((a.role, a.position), (Role::Input, vec2(10.0, 1200.0)));
        assert_eq!((b.role, b.position), (Role::Interior, vec2(10.0, 1.0)));
        assert_eq!((c.role, c.position), (Role::Output, vec2(10.0, -200.0)));
    }

    #[test]
    fn zigzag_offsets_alternate_and_grow() {
        let layout = assign_layout(
            &interior_network(4),
            &RoleRule::default(),
            &LayoutConfig::default(),
        );
        assert_eq!(
            positions(&layout),
            vec![(10.0, 1.0), (-20.0, 1.0), (30.0, 1.0), (-40.0, 1.0)]
        );
    }

    #[test]
    fn monotonic_offsets_increase() {
        let config = LayoutConfig {
            offset_policy: OffsetPolicy::Monotonic,
            ..LayoutConfig::default()
        };
        let layout = assign_layout(&interior_network(3), &RoleRule::default(), &config);
        assert_eq!(positions(&layout), vec![(10.0, 1.0), (20.0, 1.0), (30.0, 1.0)]);
    }

    #[test]
    fn interior_wraps_into_deeper_bands() {
        let config = LayoutConfig {
            wrap_width: 25.0,
            ..LayoutConfig::default()
        };
        let layout = assign_layout(&interior_network(4), &RoleRule::default(), &config);
        assert_eq!(
            positions(&layout),
            vec![(10.0, 1.0), (-20.0, 1.0), (0.0, 21.0), (-10.0, 21.0)]
        );
    }

    #[test]
    fn empty_lane_does_not_disturb_other_lanes() {
        let without_interior = Network::builder()
            .cell("a", Some("in-a"))
            .cell("b", Some("in-b"))
            .cell("x", Some("out-x"))
            .cell("y", Some("out-y"))
            .build()
            .unwrap();
        let with_interior = Network::builder()
            .cell("a", Some("in-a"))
            .cell("b", Some("in-b"))
            .cell("m", None)
            .cell("n", None)
            .cell("x", Some("out-x"))
            .cell("y", Some("out-y"))
            .build()
            .unwrap();

        let rule = RoleRule::default();
        let config = LayoutConfig::default();
        let first = assign_layout(&without_interior, &rule, &config);
        let second = assign_layout(&with_interior, &rule, &config);
        for id in ["a", "b", "x", "y"] {
            assert_eq!(
                first.placement(id).unwrap().position,
                second.placement(id).unwrap().position,
                "{id}"
            );
        }
        assert_eq!(first.role_count(Role::Interior), 0);
        assert_eq!(second.role_count(Role::Interior), 2);
    }

    #[test]
    fn layout_is_independent_of_insertion_order() {
        let forward = Network::builder()
            .cell("1", Some("in-1"))
            .cell("2", None)
            .cell("10", None)
            .cell("3", Some("out"))
            .synapse("s", "1", "2", 1)
            .build()
            .unwrap();
        let reversed = Network::builder()
            .cell("3", Some("out"))
            .cell("10", None)
            .cell("2", None)
            .cell("1", Some("in-1"))
            .synapse("s", "1", "2", 1)
            .build()
            .unwrap();

        let rule = RoleRule::default();
        let config = LayoutConfig::default();
        assert_eq!(
            assign_layout(&forward, &rule, &config),
            assign_layout(&reversed, &rule, &config)
        );
    }

    #[test]
    fn pinned_lane_is_pushed_clear_of_a_deep_interior_block() {
        let config = LayoutConfig {
            wrap_width: 15.0,
            input_depth: 25.0,
            ..LayoutConfig::default()
        };
        let network = Network::builder()
            .cell("0", None)
            .cell("1", None)
            .cell("2", None)
            .cell("3", None)
            .cell("in", Some("in-only"))
            .build()
            .unwrap();

        let layout = assign_layout(&network, &RoleRule::default(), &config);
        assert_eq!(layout.placement("3").unwrap().position, vec2(0.0, 41.0));
        assert_eq!(layout.placement("in").unwrap().position, vec2(10.0, 61.0));
    }

    #[test]
    fn degenerate_spacing_is_rejected() {
        assert_eq!(LayoutConfig::default().validate(), Ok(()));
        assert!(LayoutConfig { fanout: -5.0, ..LayoutConfig::default() }.validate().is_ok());

        let cases = [
            ("fanout", LayoutConfig { fanout: 0.0, ..LayoutConfig::default() }),
            ("fanout", LayoutConfig { fanout: f32::NAN, ..LayoutConfig::default() }),
            ("wrap_width", LayoutConfig { wrap_width: 0.0, ..LayoutConfig::default() }),
            ("wrap_width", LayoutConfig { wrap_width: f32::INFINITY, ..LayoutConfig::default() }),
            ("input_depth", LayoutConfig { input_depth: f32::NAN, ..LayoutConfig::default() }),
        ];
        for (expected, config) in cases {
            let Err(LayoutError::InvalidOption { name, .. }) = config.validate() else {
                panic!("{expected} should be rejected");
            };
            assert_eq!(name, expected);
        }
    }
}
