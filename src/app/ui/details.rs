use eframe::egui::{self, RichText, Ui};

use crate::util::{short_label, sort_ids};
use crate::view::hex;

use super::super::ViewModel;

struct SynapseRow {
    synapse_id: String,
    other_id: String,
    millivolts: i32,
}

impl ViewModel {
    fn synapse_rows(&self, synapse_ids: &[&str], outgoing: bool) -> Vec<SynapseRow> {
        let network = self.session.network();
        synapse_ids
            .iter()
            .filter_map(|id| network.synapse(id))
            .map(|synapse| SynapseRow {
                synapse_id: synapse.id.clone(),
                other_id: if outgoing {
                    synapse.to_neuron_dendrite.clone()
                } else {
                    synapse.from_neuron_axon.clone()
                },
                millivolts: synapse.millivolts,
            })
            .collect()
    }

    fn draw_synapse_list(&self, ui: &mut Ui, salt: &str, rows: &[SynapseRow]) -> Option<String> {
        if rows.is_empty() {
            ui.label("none");
            return None;
        }

        let mut picked = None;
        egui::ScrollArea::vertical()
            .id_salt(salt)
            .max_height(200.0)
            .auto_shrink([false, true])
            .show_rows(ui, 20.0, rows.len(), |ui, row_range| {
                for row in &rows[row_range] {
                    let label = format!(
                        "{}  {:+} mV  via {}",
                        short_label(&row.other_id, 20),
                        row.millivolts,
                        short_label(&row.synapse_id, 16)
                    );
                    if ui.link(label).on_hover_text(row.other_id.as_str()).clicked() {
                        picked = Some(row.other_id.clone());
                    }
                }
            });
        picked
    }

    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Focus");
        ui.add_space(6.0);

        let explorer = self.session.explorer();
        let Some(focus) = explorer.focus().map(str::to_owned) else {
            ui.label("Click a cell in the graph or a search result to walk its paths.");
            return;
        };
        let reached = explorer.visited().len();
        let depth = explorer.max_depth();
        let direction = explorer.direction();

        let Some(cell) = self.session.network().cell(&focus) else {
            ui.label("Focused cell no longer exists in the network.");
            return;
        };

        let mut axon = cell.axon_synapses.iter().map(String::as_str).collect::<Vec<_>>();
        let mut dendrite = cell
            .dendrite_synapses
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>();
        sort_ids(&mut axon);
        sort_ids(&mut dendrite);
        let tag = cell.tag.clone();
        let outgoing = self.synapse_rows(&axon, true);
        let incoming = self.synapse_rows(&dendrite, false);
        let net_output = self.session.network().net_output_millivolts(&focus);
        let role = self.session.role_of(&focus);
        let color = self.session.graph().node(&focus).map(|node| node.color);
        let seeded_at = self
            .session
            .layout()
            .placement(&focus)
            .map(|placement| placement.position);

        ui.label(RichText::new(short_label(&focus, 40)).strong());
        if let Some(tag) = &tag {
            ui.small(format!("tag: {tag}"));
        }
        if let Some(role) = role {
            ui.label(format!("role: {}", role.label()));
        }
        if let Some(color) = color {
            ui.label(format!("color: {}", hex(color)));
        }
        if let Some(seeded_at) = seeded_at {
            ui.small(format!("lane position: ({:.0}, {:.0})", seeded_at.x, seeded_at.y));
        }
        ui.label(format!("net output: {net_output:+} mV"));
        ui.label(format!(
            "walked {reached} / {} cells ({}, depth {depth})",
            self.session.network().cell_count(),
            direction.label()
        ));

        let mut picked = None;

        ui.separator();
        ui.label(RichText::new(format!("Axon synapses ({})", outgoing.len())).strong());
        picked = picked.or(self.draw_synapse_list(ui, "axon_synapses", &outgoing));

        ui.separator();
        ui.label(RichText::new(format!("Dendrite synapses ({})", incoming.len())).strong());
        picked = picked.or(self.draw_synapse_list(ui, "dendrite_synapses", &incoming));

        if let Some(id) = picked {
            self.select_focus(&id);
        }
    }
}
