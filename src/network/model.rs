use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::util::sort_ids;

use super::integrity::{IntegrityPolicy, IntegrityReport};

pub const DEFAULT_INPUT_PREFIX: &str = "in-";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Input,
    Interior,
    Output,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Interior => "interior",
            Self::Output => "output",
        }
    }
}

/// Tag convention used to derive a cell's [`Role`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoleRule {
    pub input_prefix: String,
}

impl Default for RoleRule {
    fn default() -> Self {
        Self {
            input_prefix: DEFAULT_INPUT_PREFIX.to_owned(),
        }
    }
}

impl RoleRule {
    pub fn classify(&self, tag: Option<&str>) -> Role {
        match tag {
            None => Role::Interior,
            Some(tag) if tag.is_empty() => Role::Interior,
            Some(tag) if tag.starts_with(self.input_prefix.as_str()) => Role::Input,
            Some(_) => Role::Output,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub id: String,
    pub tag: Option<String>,
    pub axon_synapses: BTreeSet<String>,
    pub dendrite_synapses: BTreeSet<String>,
}

impl Cell {
    pub fn degree(&self) -> usize {
        self.axon_synapses.len() + self.dendrite_synapses.len()
    }

    pub fn label(&self) -> &str {
        self.tag.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Synapse {
    pub id: String,
    pub from_neuron_axon: String,
    pub to_neuron_dendrite: String,
    pub millivolts: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    Excitatory,
    Inhibitory,
    Neutral,
}

impl Polarity {
    pub fn of(millivolts: i64) -> Self {
        match millivolts.signum() {
            1 => Self::Excitatory,
            -1 => Self::Inhibitory,
            _ => Self::Neutral,
        }
    }
}

impl Synapse {
    pub fn polarity(&self) -> Polarity {
        Polarity::of(i64::from(self.millivolts))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NetworkTotals {
    pub cells: usize,
    pub synapses: usize,
    pub excitatory: usize,
    pub inhibitory: usize,
    pub neutral: usize,
}

/// Immutable cell/synapse network. Built through [`NetworkBuilder`], which
/// enforces referential integrity.
#[derive(Clone, Debug)]
pub struct Network {
    cells: HashMap<String, Cell>,
    synapses: HashMap<String, Synapse>,
}

impl Network {
    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::default()
    }

    pub fn cell(&self, id: &str) -> Option<&Cell> {
        self.cells.get(id)
    }

    pub fn synapse(&self, id: &str) -> Option<&Synapse> {
        self.synapses.get(id)
    }

    pub fn contains_cell(&self, id: &str) -> bool {
        self.cells.contains_key(id)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn synapse_count(&self) -> usize {
        self.synapses.len()
    }

    pub fn sorted_cell_ids(&self) -> Vec<&str> {
        let mut ids = self.cells.keys().map(String::as_str).collect::<Vec<_>>();
        sort_ids(&mut ids);
        ids
    }

    pub fn sorted_synapse_ids(&self) -> Vec<&str> {
        let mut ids = self.synapses.keys().map(String::as_str).collect::<Vec<_>>();
        sort_ids(&mut ids);
        ids
    }

    pub fn degree(&self, id: &str) -> usize {
        self.cells.get(id).map(Cell::degree).unwrap_or(0)
    }

    pub fn role_of(&self, id: &str, rule: &RoleRule) -> Option<Role> {
        self.cells.get(id).map(|cell| rule.classify(cell.tag.as_deref()))
    }

    /// Sum of the weights of the cell's outgoing synapses.
    pub fn net_output_millivolts(&self, id: &str) -> i64 {
        let Some(cell) = self.cells.get(id) else {
            return 0;
        };

        cell.axon_synapses
            .iter()
            .filter_map(|synapse_id| self.synapses.get(synapse_id))
            .map(|synapse| i64::from(synapse.millivolts))
            .sum()
    }

    pub fn totals(&self) -> NetworkTotals {
        let mut totals = NetworkTotals {
            cells: self.cells.len(),
            synapses: self.synapses.len(),
            ..NetworkTotals::default()
        };

        for synapse in self.synapses.values() {
            match synapse.polarity() {
                Polarity::Excitatory => totals.excitatory += 1,
                Polarity::Inhibitory => totals.inhibitory += 1,
                Polarity::Neutral => totals.neutral += 1,
            }
        }

        totals
    }
}

#[derive(Clone, Debug, Default)]
pub struct NetworkBuilder {
    cells: HashMap<String, Cell>,
    synapses: HashMap<String, Synapse>,
}

impl NetworkBuilder {
    /// Inserts a cell with explicit synapse sets. A later insert with the same id replaces it.
    pub fn cell_with_synapses<I, J>(
        mut self,
        id: impl Into<String>,
        tag: Option<&str>,
        axon_synapses: I,
        dendrite_synapses: J,
    ) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        J: IntoIterator,
        J::Item: Into<String>,
    {
        let id = id.into();
        let tag = tag.filter(|tag| !tag.is_empty()).map(str::to_owned);
        self.cells.insert(
            id.clone(),
            Cell {
                id,
                tag,
                axon_synapses: axon_synapses.into_iter().map(Into::into).collect(),
                dendrite_synapses: dendrite_synapses.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    pub fn cell(self, id: impl Into<String>, tag: Option<&str>) -> Self {
        self.cell_with_synapses(id, tag, Vec::<String>::new(), Vec::<String>::new())
    }

    /// Inserts a synapse without touching the cells' synapse sets.
    pub fn raw_synapse(
        mut self,
        id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        millivolts: i32,
    ) -> Self {
        let id = id.into();
        self.synapses.insert(
            id.clone(),
            Synapse {
                id,
                from_neuron_axon: from.into(),
                to_neuron_dendrite: to.into(),
                millivolts,
            },
        );
        self
    }

    /// Inserts a synapse and records it on both endpoint cells when they exist.
    pub fn synapse(
        self,
        id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        millivolts: i32,
    ) -> Self {
        let id = id.into();
        let from = from.into();
        let to = to.into();

        let mut builder = self.raw_synapse(id.clone(), from.clone(), to.clone(), millivolts);
        if let Some(cell) = builder.cells.get_mut(&from) {
            cell.axon_synapses.insert(id.clone());
        }
        if let Some(cell) = builder.cells.get_mut(&to) {
            cell.dendrite_synapses.insert(id);
        }
        builder
    }

    pub fn integrity_report(&self) -> IntegrityReport {
        IntegrityReport::check(&self.cells, &self.synapses)
    }

    /// Strict build: any dangling reference fails with the full report.
    pub fn build(self) -> Result<Network, IntegrityReport> {
        self.build_with(IntegrityPolicy::Strict)
            .map(|(network, _report)| network)
    }

    /// Builds under `policy`, returning the (possibly non-empty, when pruning) report.
    pub fn build_with(
        mut self,
        policy: IntegrityPolicy,
    ) -> Result<(Network, IntegrityReport), IntegrityReport> {
        let report = self.integrity_report();
        if report.is_ok() {
            return Ok((self.finish(), report));
        }

        match policy {
            IntegrityPolicy::Strict => Err(report),
            IntegrityPolicy::Prune => {
                let dropped = report.offending_synapses();
                self.synapses.retain(|id, _| !dropped.contains(id.as_str()));

                let known = &self.synapses;
                for cell in self.cells.values_mut() {
                    cell.axon_synapses.retain(|id| known.contains_key(id));
                    cell.dendrite_synapses.retain(|id| known.contains_key(id));
                }

                Ok((self.finish(), report))
            }
        }
    }

    fn finish(self) -> Network {
        Network {
            cells: self.cells,
            synapses: self.synapses,
        }
    }
}
