use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use serde::de::Error as _;
use serde_json::Value;

use super::model::NetworkBuilder;

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value,
        }
    }
}

/// Either an id → flag map (the saved-network encoding) or a plain id list.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum RawSynapseSet {
    Flags(BTreeMap<String, Value>),
    Ids(Vec<RawId>),
}

impl Default for RawSynapseSet {
    fn default() -> Self {
        Self::Ids(Vec::new())
    }
}

impl RawSynapseSet {
    fn into_ids(self) -> Vec<String> {
        match self {
            Self::Flags(flags) => flags
                .into_iter()
                .filter(|(_, flag)| !matches!(flag, Value::Bool(false)))
                .map(|(id, _)| id)
                .collect(),
            Self::Ids(ids) => ids.into_iter().map(RawId::into_string).collect(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawCell {
    #[serde(default, rename = "ID")]
    pub(super) id: Option<RawId>,
    #[serde(default, rename = "Tag")]
    pub(super) tag: Option<String>,
    #[serde(default, rename = "AxonSynapses")]
    pub(super) axon_synapses: Option<RawSynapseSet>,
    #[serde(default, rename = "DendriteSynapses")]
    pub(super) dendrite_synapses: Option<RawSynapseSet>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawSynapse {
    #[serde(default, rename = "ID")]
    pub(super) id: Option<RawId>,
    #[serde(rename = "FromNeuronAxon")]
    pub(super) from_neuron_axon: RawId,
    #[serde(rename = "ToNeuronDendrite")]
    pub(super) to_neuron_dendrite: RawId,
    #[serde(default, rename = "Millivolts")]
    pub(super) millivolts: i32,
}

/// Collections appear keyed by id or as arrays with `null` holes.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum RawCollection<T> {
    Keyed(BTreeMap<String, Option<T>>),
    Listed(Vec<Option<T>>),
}

impl<T> RawCollection<T> {
    fn into_entries(self) -> Vec<(String, T)> {
        match self {
            Self::Keyed(entries) => entries
                .into_iter()
                .filter_map(|(key, entry)| entry.map(|entry| (key, entry)))
                .collect(),
            Self::Listed(entries) => entries
                .into_iter()
                .enumerate()
                .filter_map(|(index, entry)| entry.map(|entry| (index.to_string(), entry)))
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawNetwork {
    #[serde(rename = "Cells")]
    pub(super) cells: RawCollection<RawCell>,
    #[serde(rename = "Synapses")]
    pub(super) synapses: RawCollection<RawSynapse>,
}

fn resolve_id(key: String, id: Option<RawId>, kind: &str) -> String {
    match id.map(RawId::into_string) {
        Some(id) => {
            if id != key && key.parse::<usize>().is_err() {
                tracing::warn!(%key, %id, "{kind} entry key differs from its ID; using ID");
            }
            id
        }
        None => key,
    }
}

pub(super) fn parse_network_document(json: &[u8]) -> serde_json::Result<RawNetwork> {
    serde_json::from_slice(json)
}

impl RawNetwork {
    /// Two entries resolving to the same `ID` make the document malformed.
    pub(super) fn into_builder(self) -> serde_json::Result<NetworkBuilder> {
        let mut builder = NetworkBuilder::default();

        let mut seen = HashSet::new();
        for (key, cell) in self.cells.into_entries() {
            let id = resolve_id(key, cell.id, "cell");
            if !seen.insert(id.clone()) {
                return Err(serde_json::Error::custom(format!("duplicate cell ID `{id}`")));
            }
            let axon = cell.axon_synapses.unwrap_or_default().into_ids();
            let dendrite = cell.dendrite_synapses.unwrap_or_default().into_ids();
            builder = builder.cell_with_synapses(id, cell.tag.as_deref(), axon, dendrite);
        }

        seen.clear();
        for (key, synapse) in self.synapses.into_entries() {
            let id = resolve_id(key, synapse.id, "synapse");
            if !seen.insert(id.clone()) {
                return Err(serde_json::Error::custom(format!("duplicate synapse ID `{id}`")));
            }
            builder = builder.raw_synapse(
                id,
                synapse.from_neuron_axon.into_string(),
                synapse.to_neuron_dendrite.into_string(),
                synapse.millivolts,
            );
        }

        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(json: &str) -> crate::network::Network {
        parse_network_document(json.as_bytes())
            .expect("valid document")
            .into_builder()
            .expect("unique ids")
            .build()
            .expect("consistent network")
    }

    #[test]
    fn keyed_collections_with_flag_sets() {
        let network = build(
            r#"{
                "Cells": {
                    "1": {"ID": 1, "Tag": "in-a", "AxonSynapses": {"10": true}, "DendriteSynapses": {}},
                    "2": {"ID": 2, "AxonSynapses": {}, "DendriteSynapses": {"10": true}}
                },
                "Synapses": {
                    "10": {"ID": 10, "FromNeuronAxon": 1, "ToNeuronDendrite": 2, "Millivolts": -4}
                }
            }"#,
        );

        assert_eq!(network.cell_count(), 2);
        let synapse = network.synapse("10").unwrap();
        assert_eq!(synapse.from_neuron_axon, "1");
        assert_eq!(synapse.to_neuron_dendrite, "2");
        assert_eq!(synapse.millivolts, -4);
        assert_eq!(network.cell("1").unwrap().tag.as_deref(), Some("in-a"));
    }

    #[test]
    fn listed_collections_skip_null_holes() {
        let network = build(
            r#"{
                "Cells": [null, {"ID": "x", "AxonSynapses": ["s"]}, {"ID": "y", "DendriteSynapses": ["s"]}],
                "Synapses": [{"ID": "s", "FromNeuronAxon": "x", "ToNeuronDendrite": "y", "Millivolts": 3}, null]
            }"#,
        );

        assert_eq!(network.cell_count(), 2);
        assert_eq!(network.synapse_count(), 1);
        assert!(network.cell("x").unwrap().axon_synapses.contains("s"));
    }

    #[test]
    fn missing_id_falls_back_to_key_and_false_flags_are_ignored() {
        let network = build(
            r#"{
                "Cells": {"a": {"AxonSynapses": {"s": true, "old": false}}, "b": {"DendriteSynapses": {"s": true}}},
                "Synapses": {"s": {"FromNeuronAxon": "a", "ToNeuronDendrite": "b"}}
            }"#,
        );

        let a = network.cell("a").unwrap();
        assert_eq!(a.axon_synapses.len(), 1);
        assert_eq!(network.synapse("s").unwrap().millivolts, 0);
    }

    #[test]
    fn wrong_shape_is_rejected() {
        assert!(parse_network_document(br#"{"Cells": 12}"#).is_err());
        assert!(parse_network_document(b"not json").is_err());
    }

    #[test]
    fn both_collections_are_required() {
        assert!(parse_network_document(b"{}").is_err());
        assert!(parse_network_document(br#"{"Cells": {}}"#).is_err());
        assert!(parse_network_document(br#"{"cells": {"A": {"ID": "A"}}, "synapses": {}}"#).is_err());
        assert!(parse_network_document(br#"{"Cells": [], "Synapses": []}"#).is_ok());
    }

    #[test]
    fn repeated_ids_are_rejected() {
        let cells = parse_network_document(
            br#"{
                "Cells": [
                    {"ID": "A", "Tag": "in-1", "AxonSynapses": ["S1"]},
                    {"ID": "A", "DendriteSynapses": ["S1"]}
                ],
                "Synapses": []
            }"#,
        )
        .unwrap()
        .into_builder()
        .unwrap_err();
        assert!(cells.to_string().contains("duplicate cell ID `A`"), "{cells}");

        let synapses = parse_network_document(
            br#"{
                "Cells": {"A": {}, "B": {}},
                "Synapses": {
                    "x": {"ID": "S1", "FromNeuronAxon": "A", "ToNeuronDendrite": "B"},
                    "y": {"ID": "S1", "FromNeuronAxon": "B", "ToNeuronDendrite": "A"}
                }
            }"#,
        )
        .unwrap()
        .into_builder()
        .unwrap_err();
        assert!(synapses.to_string().contains("duplicate synapse ID `S1`"), "{synapses}");
    }
}
