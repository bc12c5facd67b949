use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadTree;

const BARNES_HUT_THETA: f32 = 0.72;
const SOFTENING: f32 = 1.0;

/// Unit vector from `b` to `a`, with a fixed fallback for coincident points so
/// they still separate.
fn unit_between(a: Vec2, b: Vec2, from: usize, to: usize) -> (Vec2, f32) {
    let delta = a - b;
    let distance = delta.length();
    if distance > 0.0001 {
        return (delta / distance, distance);
    }

    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    (vec2(angle.cos(), angle.sin()), 0.0)
}

pub(super) struct Repulsion<'a> {
    pub(super) positions: &'a [Vec2],
    pub(super) masses: &'a [f32],
    pub(super) scaling: f32,
}

impl Repulsion<'_> {
    /// Charge repulsion `scaling * m_i * m_j / d`, approximated by each distant
    /// square's center of mass.
    pub(super) fn accumulate(&self, tree: &QuadTree, index: usize, force: &mut Vec2) {
        if tree.mass <= 0.0 {
            return;
        }
        let point = self.positions[index];
        let charge = self.scaling * self.masses[index];

        if tree.is_leaf() {
            for &other in &tree.members {
                if other == index {
                    continue;
                }
                let (direction, distance) =
                    unit_between(point, self.positions[other], index, other);
                *force += direction * (charge * self.masses[other] / (distance + SOFTENING));
            }
            return;
        }

        let delta = point - tree.center_of_mass;
        let distance = delta.length().max(0.0001);
        if !tree.square.contains(point) && tree.square.side() / distance < BARNES_HUT_THETA {
            *force += (delta / distance) * (charge * tree.mass / (distance + SOFTENING));
            return;
        }

        for child in tree.children() {
            self.accumulate(child, index, force);
        }
    }
}

pub(super) struct Collision<'a> {
    pub(super) positions: &'a [Vec2],
    pub(super) radii: &'a [f32],
    pub(super) strength: f32,
    pub(super) margin: f32,
    pub(super) reach_sq: f32,
}

impl Collision<'_> {
    fn push_apart(&self, from: usize, to: usize, forces: &mut [Vec2]) {
        let (direction, distance) =
            unit_between(self.positions[from], self.positions[to], from, to);
        let min_distance = self.radii[from] + self.radii[to] + self.margin;
        if distance < min_distance {
            let push = direction * ((min_distance - distance) * self.strength);
            forces[from] += push;
            forces[to] -= push;
        }
    }

    /// Pushes apart every overlapping pair drawn from `a` and `b` (or from
    /// within `a` when both are the same square).
    pub(super) fn accumulate(&self, a: &QuadTree, b: &QuadTree, same: bool, forces: &mut [Vec2]) {
        if a.square.gap_sq(b.square) > self.reach_sq {
            return;
        }

        if a.is_leaf() && b.is_leaf() {
            if same {
                for (offset, &from) in a.members.iter().enumerate() {
                    for &to in &a.members[offset + 1..] {
                        self.push_apart(from, to, forces);
                    }
                }
            } else {
                for &from in &a.members {
                    for &to in &b.members {
                        self.push_apart(from, to, forces);
                    }
                }
            }
            return;
        }

        if same {
            let children = a.children().collect::<Vec<_>>();
            for (offset, first) in children.iter().enumerate() {
                self.accumulate(first, first, true, forces);
                for second in &children[offset + 1..] {
                    self.accumulate(first, second, false, forces);
                }
            }
            return;
        }

        let split_a = !a.is_leaf() && (b.is_leaf() || a.square.half_extent >= b.square.half_extent);
        if split_a {
            for child in a.children() {
                self.accumulate(child, b, false, forces);
            }
        } else {
            for child in b.children() {
                self.accumulate(a, child, false, forces);
            }
        }
    }
}

/// Edge pull, linear in distance or `ln(1 + d)` in lin-log mode, scaled by
/// the edge weight raised to `influence`.
pub(super) fn attraction(distance: f32, weight: f32, influence: f32, lin_log: bool) -> f32 {
    let factor = if influence == 0.0 {
        1.0
    } else {
        weight.abs().powf(influence)
    };
    let pull = if lin_log { distance.ln_1p() } else { distance };
    pull * factor
}
