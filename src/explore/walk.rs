use std::collections::{HashSet, VecDeque};

use crate::network::Network;

use super::Direction;

/// Cells within `max_depth` hops of `focus`, following synapses in `direction`.
///
/// Breadth-first, so every cell is first reached along a shortest path and the
/// visited guard never hides a cell that a shorter route would have admitted.
pub fn reachable(
    network: &Network,
    focus: &str,
    max_depth: u32,
    direction: Direction,
) -> HashSet<String> {
    let mut visited = HashSet::new();
    if !network.contains_cell(focus) {
        return visited;
    }

    let mut queue = VecDeque::from([(focus, 0u32)]);
    while let Some((cell_id, depth)) = queue.pop_front() {
        if depth > max_depth || visited.contains(cell_id) {
            continue;
        }
        let Some(cell) = network.cell(cell_id) else {
            continue;
        };
        visited.insert(cell_id.to_owned());

        let next_depth = depth + 1;
        if next_depth > max_depth {
            continue;
        }

        if direction.includes_forward() {
            for synapse in cell
                .axon_synapses
                .iter()
                .filter_map(|id| network.synapse(id))
            {
                let next = synapse.to_neuron_dendrite.as_str();
                if !visited.contains(next) {
                    queue.push_back((next, next_depth));
                }
            }
        }

        if direction.includes_backward() {
            for synapse in cell
                .dendrite_synapses
                .iter()
                .filter_map(|id| network.synapse(id))
            {
                let next = synapse.from_neuron_axon.as_str();
                if !visited.contains(next) {
                    queue.push_back((next, next_depth));
                }
            }
        }
    }

    visited
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;
    use crate::network::fixtures::{arb_numbered, cycle_network, numbered_network, sample_network};

    fn set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|id| (*id).to_owned()).collect()
    }

    #[test]
    fn sample_forward_depths() {
        let network = sample_network();
        assert_eq!(reachable(&network, "A", 0, Direction::Forward), set(&["A"]));
        assert_eq!(reachable(&network, "A", 1, Direction::Forward), set(&["A", "B"]));
        assert_eq!(
            reachable(&network, "A", 2, Direction::Forward),
            set(&["A", "B", "C"])
        );
    }

    #[test]
    fn backward_follows_dendrites() {
        let network = sample_network();
        assert_eq!(
            reachable(&network, "C", 1, Direction::Backward),
            set(&["C", "B"])
        );
        assert_eq!(reachable(&network, "A", 9, Direction::Backward), set(&["A"]));
        assert_eq!(
            reachable(&network, "B", 1, Direction::Both),
            set(&["A", "B", "C"])
        );
    }

    #[test]
    fn cycle_terminates_with_both_cells() {
        let network = cycle_network();
        assert_eq!(
            reachable(&network, "A", 5, Direction::Forward),
            set(&["A", "B"])
        );
    }

    #[test]
    fn shortest_route_wins_over_long_detour() {
        // 0 -> 1 -> 2 -> 3 and a shortcut 0 -> 3 -> 4
        let network = numbered_network(5, &[(0, 1, 1), (1, 2, 1), (2, 3, 1), (0, 3, 1), (3, 4, 1)]);
        assert!(reachable(&network, "0", 2, Direction::Forward).contains("4"));
    }

    #[test]
    fn unknown_focus_reaches_nothing() {
        assert!(reachable(&sample_network(), "nope", 3, Direction::Both).is_empty());
    }

    fn arb_network() -> impl Strategy<Value = (crate::network::Network, usize)> {
        arb_numbered().prop_flat_map(|(cells, edges)| {
            (0..cells).prop_map(move |focus| (numbered_network(cells, &edges), focus))
        })
    }

    proptest! {
        #[test]
        fn depth_zero_visits_only_the_focus((network, focus) in arb_network()) {
            let focus = focus.to_string();
            for direction in [Direction::Forward, Direction::Backward, Direction::Both] {
                prop_assert_eq!(reachable(&network, &focus, 0, direction), set(&[focus.as_str()]));
            }
        }

        #[test]
        fn visited_set_grows_with_depth((network, focus) in arb_network(), depth in 0u32..6) {
            let focus = focus.to_string();
            for direction in [Direction::Forward, Direction::Backward, Direction::Both] {
                let shallow = reachable(&network, &focus, depth, direction);
                let deep = reachable(&network, &focus, depth + 1, direction);
                prop_assert!(shallow.is_subset(&deep));
            }
        }

        #[test]
        fn both_covers_each_single_direction((network, focus) in arb_network(), depth in 0u32..6) {
            let focus = focus.to_string();
            let both = reachable(&network, &focus, depth, Direction::Both);
            prop_assert!(reachable(&network, &focus, depth, Direction::Forward).is_subset(&both));
            prop_assert!(reachable(&network, &focus, depth, Direction::Backward).is_subset(&both));
        }
    }
}
