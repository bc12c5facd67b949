mod integrity;
mod load;
mod model;
mod parse;

pub use integrity::{IntegrityPolicy, IntegrityReport};
pub use load::{LoadError, LoadOptions, decode_network, is_compressed, load_network};
pub use model::{Cell, Network, NetworkBuilder, NetworkTotals, Polarity, Role, RoleRule, Synapse};

#[cfg(test)]
pub(crate) mod fixtures {
    use proptest::prelude::*;
    use serde_json::json;

    use super::Network;

    /// A (in-1) -> B (untagged) -> C (out-1), +5 then -3.
    pub(crate) const SAMPLE_JSON: &str = r#"{
        "Cells": {
            "A": {"ID": "A", "Tag": "in-1", "AxonSynapses": {"S1": true}, "DendriteSynapses": {}},
            "B": {"ID": "B", "AxonSynapses": {"S2": true}, "DendriteSynapses": {"S1": true}},
            "C": {"ID": "C", "Tag": "out-1", "AxonSynapses": {}, "DendriteSynapses": {"S2": true}}
        },
        "Synapses": {
            "S1": {"ID": "S1", "FromNeuronAxon": "A", "ToNeuronDendrite": "B", "Millivolts": 5},
            "S2": {"ID": "S2", "FromNeuronAxon": "B", "ToNeuronDendrite": "C", "Millivolts": -3}
        }
    }"#;

    pub(crate) fn sample_network() -> Network {
        Network::builder()
            .cell("A", Some("in-1"))
            .cell("B", None)
            .cell("C", Some("out-1"))
            .synapse("S1", "A", "B", 5)
            .synapse("S2", "B", "C", -3)
            .build()
            .expect("sample network is consistent")
    }

    /// A -> B -> A.
    pub(crate) fn cycle_network() -> Network {
        Network::builder()
            .cell("A", None)
            .cell("B", None)
            .synapse("AB", "A", "B", 1)
            .synapse("BA", "B", "A", 1)
            .build()
            .expect("cycle network is consistent")
    }

    /// Builds a network of `cells` numbered cells from `(from, to, millivolts)` triples,
    /// wrapping endpoints into range.
    pub(crate) fn numbered_network(cells: usize, edges: &[(usize, usize, i32)]) -> Network {
        let cells = cells.max(1);
        let mut builder = Network::builder();
        for index in 0..cells {
            let tag = match index % 3 {
                0 => Some(format!("in-{index}")),
                1 => None,
                _ => Some(format!("out-{index}")),
            };
            builder = builder.cell(index.to_string(), tag.as_deref());
        }
        for (number, &(from, to, millivolts)) in edges.iter().enumerate() {
            builder = builder.synapse(
                format!("s{number}"),
                (from % cells).to_string(),
                (to % cells).to_string(),
                millivolts,
            );
        }
        builder.build().expect("numbered network is consistent")
    }

    /// Cell counts and synapse triples for [`numbered_network`] and [`numbered_json`].
    pub(crate) fn arb_numbered() -> impl Strategy<Value = (usize, Vec<(usize, usize, i32)>)> {
        (1usize..14).prop_flat_map(|cells| {
            (
                Just(cells),
                prop::collection::vec((0..cells, 0..cells, -5i32..5), 0..40),
            )
        })
    }

    /// The document form of [`numbered_network`]: listed cells with integer
    /// ids, keyed synapses.
    pub(crate) fn numbered_json(cells: usize, edges: &[(usize, usize, i32)]) -> String {
        let mut axons = vec![Vec::new(); cells];
        let mut dendrites = vec![Vec::new(); cells];
        let mut synapses = serde_json::Map::new();
        for (number, &(from, to, millivolts)) in edges.iter().enumerate() {
            let id = format!("s{number}");
            axons[from].push(id.clone());
            dendrites[to].push(id.clone());
            synapses.insert(
                id.clone(),
                json!({
                    "ID": id,
                    "FromNeuronAxon": from,
                    "ToNeuronDendrite": to,
                    "Millivolts": millivolts,
                }),
            );
        }

        let cells = (0..cells)
            .map(|index| {
                let mut cell = json!({
                    "ID": index,
                    "AxonSynapses": axons[index],
                    "DendriteSynapses": dendrites[index],
                });
                if index % 3 == 0 {
                    cell["Tag"] = json!(format!("in-{index}"));
                }
                cell
            })
            .collect::<Vec<_>>();

        json!({ "Cells": cells, "Synapses": synapses }).to_string()
    }
}
