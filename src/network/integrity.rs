use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::{Cell, Synapse};

/// What to do with dangling references found while building a network.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrityPolicy {
    #[default]
    Strict,
    Prune,
}

/// Every dangling reference in a network, keyed by the entity that holds it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    pub cell_missing_axon_synapse: BTreeMap<String, BTreeSet<String>>,
    pub cell_missing_dendrite_synapse: BTreeMap<String, BTreeSet<String>>,
    pub synapse_missing_axon_cell: BTreeMap<String, String>,
    pub synapse_missing_dendrite_cell: BTreeMap<String, String>,
}

impl IntegrityReport {
    pub(super) fn check(
        cells: &HashMap<String, Cell>,
        synapses: &HashMap<String, Synapse>,
    ) -> Self {
        let mut report = Self::default();

        for (cell_id, cell) in cells {
            for synapse_id in &cell.axon_synapses {
                if !synapses.contains_key(synapse_id) {
                    report
                        .cell_missing_axon_synapse
                        .entry(cell_id.clone())
                        .or_default()
                        .insert(synapse_id.clone());
                }
            }
            for synapse_id in &cell.dendrite_synapses {
                if !synapses.contains_key(synapse_id) {
                    report
                        .cell_missing_dendrite_synapse
                        .entry(cell_id.clone())
                        .or_default()
                        .insert(synapse_id.clone());
                }
            }
        }

        for (synapse_id, synapse) in synapses {
            if !cells.contains_key(&synapse.from_neuron_axon) {
                report
                    .synapse_missing_axon_cell
                    .insert(synapse_id.clone(), synapse.from_neuron_axon.clone());
            }
            if !cells.contains_key(&synapse.to_neuron_dendrite) {
                report
                    .synapse_missing_dendrite_cell
                    .insert(synapse_id.clone(), synapse.to_neuron_dendrite.clone());
            }
        }

        report
    }

    pub fn is_ok(&self) -> bool {
        self.cell_missing_axon_synapse.is_empty()
            && self.cell_missing_dendrite_synapse.is_empty()
            && self.synapse_missing_axon_cell.is_empty()
            && self.synapse_missing_dendrite_cell.is_empty()
    }

    /// Synapses that point at a cell which does not exist.
    pub fn offending_synapses(&self) -> BTreeSet<&str> {
        self.synapse_missing_axon_cell
            .keys()
            .chain(self.synapse_missing_dendrite_cell.keys())
            .map(String::as_str)
            .collect()
    }

    /// Cells that list a synapse which does not exist.
    pub fn offending_cells(&self) -> BTreeSet<&str> {
        self.cell_missing_axon_synapse
            .keys()
            .chain(self.cell_missing_dendrite_synapse.keys())
            .map(String::as_str)
            .collect()
    }

    pub fn problem_count(&self) -> usize {
        self.cell_missing_axon_synapse
            .values()
            .chain(self.cell_missing_dendrite_synapse.values())
            .map(BTreeSet::len)
            .sum::<usize>()
            + self.synapse_missing_axon_cell.len()
            + self.synapse_missing_dendrite_cell.len()
    }
}

impl fmt::Display for IntegrityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let synapses = self.offending_synapses();
        let cells = self.offending_cells();

        write!(f, "{} dangling reference(s)", self.problem_count())?;
        if !synapses.is_empty() {
            let ids = synapses.into_iter().collect::<Vec<_>>().join(", ");
            write!(f, "; synapses with missing cells: {ids}")?;
        }
        if !cells.is_empty() {
            let ids = cells.into_iter().collect::<Vec<_>>().join(", ");
            write!(f, "; cells with missing synapses: {ids}")?;
        }
        Ok(())
    }
}
