use eframe::egui::Vec2;

use super::forces::{Collision, Repulsion, attraction};
use super::quadtree::QuadTree;
use super::{RefineInput, RefineOptions, RefinementEngine};

const REPULSION_SCALING: f32 = 40.0;
const COLLISION_STRENGTH: f32 = 1.6;
const COLLISION_MARGIN: f32 = 2.0;
const TIME_STEP: f32 = 0.05;
const DAMPING: f32 = 0.82;
const MAX_SPEED: f32 = 30.0;
const REST_SPEED_SQ: f32 = 0.001 * 0.001;

/// Force-directed relaxation in the ForceAtlas2 family: degree-weighted charge
/// repulsion, edge attraction, gravity toward the origin and optional
/// overlap resolution.
#[derive(Clone, Debug, Default)]
pub struct ForceEngine {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    masses: Vec<f32>,
    radii: Vec<f32>,
    edges: Vec<(usize, usize, f32)>,
    forces: Vec<Vec2>,
}

impl ForceEngine {
    fn accumulate_forces(&mut self, options: &RefineOptions) {
        let node_count = self.positions.len();
        self.forces.clear();
        self.forces.resize(node_count, Vec2::ZERO);

        let Some(tree) = QuadTree::build(&self.positions, &self.masses) else {
            return;
        };

        let repulsion = Repulsion {
            positions: &self.positions,
            masses: &self.masses,
            scaling: REPULSION_SCALING,
        };
        for (index, force) in self.forces.iter_mut().enumerate() {
            repulsion.accumulate(&tree, index, force);
        }

        if options.adjust_sizes {
            let max_radius = self.radii.iter().copied().fold(0.0_f32, f32::max);
            let reach = max_radius * 2.0 + COLLISION_MARGIN;
            let collision = Collision {
                positions: &self.positions,
                radii: &self.radii,
                strength: COLLISION_STRENGTH,
                margin: COLLISION_MARGIN,
                reach_sq: reach * reach,
            };
            collision.accumulate(&tree, &tree, true, &mut self.forces);
        }

        for &(source, target, weight) in &self.edges {
            let delta = self.positions[target] - self.positions[source];
            let distance = delta.length();
            if distance <= 0.0001 {
                continue;
            }
            let pull = (delta / distance)
                * attraction(
                    distance,
                    weight,
                    options.edge_weight_influence,
                    options.lin_log_mode,
                );
            self.forces[source] += pull;
            self.forces[target] -= pull;
        }

        if options.gravity > 0.0 {
            for ((force, position), mass) in
                self.forces.iter_mut().zip(&self.positions).zip(&self.masses)
            {
                let distance = position.length();
                if distance > 0.0001 {
                    *force -= (*position / distance) * (options.gravity * mass);
                }
            }
        }
    }
}

impl RefinementEngine for ForceEngine {
    fn load(&mut self, input: RefineInput) {
        let node_count = input.positions.len();
        self.masses = vec![1.0; node_count];
        self.edges.clear();
        for edge in input.edges {
            if edge.source >= node_count || edge.target >= node_count || edge.source == edge.target
            {
                continue;
            }
            self.masses[edge.source] += 1.0;
            self.masses[edge.target] += 1.0;
            self.edges.push((edge.source, edge.target, edge.weight));
        }

        self.radii = input.radii;
        self.radii.resize(node_count, 0.0);
        self.velocities = vec![Vec2::ZERO; node_count];
        self.positions = input.positions;
    }

    fn iterate(&mut self, options: &RefineOptions) -> bool {
        if self.positions.len() < 2 {
            return false;
        }
        self.accumulate_forces(options);

        let mut moved = false;
        for ((position, velocity), force) in self
            .positions
            .iter_mut()
            .zip(&mut self.velocities)
            .zip(&self.forces)
        {
            let mut next = (*velocity + *force * TIME_STEP) * DAMPING;
            let speed_sq = next.length_sq();
            if speed_sq > MAX_SPEED * MAX_SPEED {
                next *= MAX_SPEED / speed_sq.sqrt();
            } else if speed_sq < REST_SPEED_SQ {
                next = Vec2::ZERO;
            }

            *velocity = next;
            *position += next;
            moved |= next != Vec2::ZERO;
        }
        moved
    }

    fn positions(&self) -> &[Vec2] {
        &self.positions
    }
}
