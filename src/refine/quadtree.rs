use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 12;
const MAX_DEPTH: usize = 10;

/// Axis-aligned square region of the plane.
#[derive(Clone, Copy, Debug)]
pub(super) struct Square {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let (min, max) = points.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(min, max), point| (min.min(*point), max.max(*point)),
        );
        if !(min.is_finite() && max.is_finite()) {
            return None;
        }

        let span = (max - min).max(Vec2::splat(1.0));
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: span.max_elem() * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let offset = (point - self.center).abs();
        offset.x <= self.half_extent && offset.y <= self.half_extent
    }

    pub(super) fn side(self) -> f32 {
        self.half_extent * 2.0
    }

    /// Squared gap between two squares; zero when they touch or overlap.
    pub(super) fn gap_sq(self, other: Self) -> f32 {
        let reach = self.half_extent + other.half_extent;
        let gap = ((self.center - other.center).abs() - Vec2::splat(reach)).max(Vec2::ZERO);
        gap.length_sq()
    }

    fn quadrant_of(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn quadrant(self, index: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let sign = |bit: usize| if index & bit == 0 { -quarter } else { quarter };
        Self {
            center: self.center + vec2(sign(1), sign(2)),
            half_extent: quarter,
        }
    }
}

/// Barnes–Hut tree over node positions. Each node's mass is its share of the
/// repulsion charge.
pub(super) struct QuadTree {
    pub(super) square: Square,
    pub(super) center_of_mass: Vec2,
    pub(super) mass: f32,
    pub(super) members: Vec<usize>,
    pub(super) children: [Option<Box<QuadTree>>; 4],
}

impl QuadTree {
    pub(super) fn build(positions: &[Vec2], masses: &[f32]) -> Option<Self> {
        let square = Square::enclosing(positions)?;
        Some(Self::subdivide(
            square,
            (0..positions.len()).collect(),
            positions,
            masses,
            0,
        ))
    }

    fn subdivide(
        square: Square,
        members: Vec<usize>,
        positions: &[Vec2],
        masses: &[f32],
        depth: usize,
    ) -> Self {
        let mass = members.iter().map(|&index| masses[index]).sum::<f32>();
        let weighted = members
            .iter()
            .fold(Vec2::ZERO, |sum, &index| sum + positions[index] * masses[index]);
        let center_of_mass = if mass > 0.0 { weighted / mass } else { square.center };

        let mut tree = Self {
            square,
            center_of_mass,
            mass,
            members,
            children: std::array::from_fn(|_| None),
        };
        if depth >= MAX_DEPTH || tree.members.len() <= LEAF_CAPACITY {
            return tree;
        }

        let mut buckets: [Vec<usize>; 4] = std::array::from_fn(|_| Vec::new());
        for &index in &tree.members {
            buckets[square.quadrant_of(positions[index])].push(index);
        }
        // Coincident points would otherwise recurse to MAX_DEPTH for nothing.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return tree;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if !bucket.is_empty() {
                tree.children[quadrant] = Some(Box::new(Self::subdivide(
                    square.quadrant(quadrant),
                    bucket,
                    positions,
                    masses,
                    depth + 1,
                )));
            }
        }
        tree.members.clear();
        tree
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &QuadTree> {
        self.children.iter().filter_map(|child| child.as_deref())
    }
}
