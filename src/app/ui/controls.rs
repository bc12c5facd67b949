use eframe::egui::{self, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::explore::Direction;
use crate::util::short_label;

use super::super::{SearchMatch, SearchMatchCache, ViewModel};

const MAX_SEARCH_ROWS: usize = 40;
const MAX_DEPTH_SLIDER: i64 = 64;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    fn search_matches(&mut self) -> &[SearchMatch] {
        let query = self.search.trim();
        let stale = self
            .search_cache
            .as_ref()
            .is_none_or(|cache| cache.query != query);

        if stale {
            let matcher = SkimMatcherV2::default();
            let mut matches = if query.is_empty() {
                Vec::new()
            } else {
                self.session
                    .graph()
                    .nodes()
                    .iter()
                    .filter_map(|node| {
                        let by_id = fuzzy_match_score(&matcher, &node.id, query);
                        let by_label = fuzzy_match_score(&matcher, &node.label, query);
                        by_id.max(by_label).map(|score| SearchMatch {
                            id: node.id.clone(),
                            label: node.label.clone(),
                            score,
                        })
                    })
                    .collect::<Vec<_>>()
            };
            matches.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
            matches.truncate(MAX_SEARCH_ROWS);

            self.search_cache = Some(SearchMatchCache {
                query: query.to_owned(),
                matches,
            });
        }

        self.search_cache
            .as_ref()
            .map(|cache| cache.matches.as_slice())
            .unwrap_or_default()
    }

    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Path Explorer");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Find cell")
            .on_hover_text("Fuzzy search over cell ids and tags. Click a result to focus it.");
        ui.text_edit_singleline(&mut self.search);

        let mut picked = None;
        let matches = self.search_matches();
        if !matches.is_empty() {
            egui::ScrollArea::vertical()
                .id_salt("search_results")
                .max_height(180.0)
                .show(ui, |ui| {
                    for entry in matches {
                        let text = if entry.label == entry.id {
                            short_label(&entry.id, 36)
                        } else {
                            format!("{}  ({})", short_label(&entry.id, 24), short_label(&entry.label, 16))
                        };
                        if ui.link(text).clicked() {
                            picked = Some(entry.id.clone());
                        }
                    }
                });
        }
        if let Some(id) = picked {
            self.select_focus(&id);
        }

        ui.separator();

        let mut parameters_changed = ui
            .add(
                egui::Slider::new(&mut self.depth, 0..=MAX_DEPTH_SLIDER)
                    .text("depth")
                    .integer(),
            )
            .on_hover_text("Maximum number of synapse hops from the focus cell.")
            .changed();

        ui.horizontal(|ui| {
            for direction in Direction::ALL {
                parameters_changed |= ui
                    .selectable_value(&mut self.direction, direction, direction.label())
                    .changed();
            }
        });
        if parameters_changed {
            self.apply_parameters();
        }

        ui.horizontal(|ui| {
            if ui
                .button("Clear")
                .on_hover_text("Drop the focus and show every cell.")
                .clicked()
            {
                self.session.clear();
                self.status = None;
            }
            if ui
                .button("Hide all")
                .on_hover_text("Hide every cell; click a search result to start a new walk.")
                .clicked()
            {
                self.session.hide_all();
            }
        });

        ui.add_space(8.0);
        ui.heading("Layout");
        ui.separator();

        ui.horizontal(|ui| {
            let running = self.session.refinement().is_running();
            if ui
                .add_enabled(!running || self.refine_options.restart_on_start, egui::Button::new("Start"))
                .clicked()
            {
                self.session.start_refinement();
            }
            if ui.add_enabled(running, egui::Button::new("Stop")).clicked() {
                self.session.stop_refinement();
            }
            if ui.button("Fit view").clicked() {
                self.fit_pending = true;
            }
        });

        let options = &mut self.refine_options;
        let mut options_changed = false;
        options_changed |= ui
            .add(egui::Slider::new(&mut options.iterations_per_render, 1..=50).text("iterations / frame"))
            .changed();
        options_changed |= ui
            .add(egui::Slider::new(&mut options.gravity, 0.0..=50.0).text("gravity"))
            .changed();
        options_changed |= ui
            .add(
                egui::Slider::new(&mut options.edge_weight_influence, 0.0..=3.0)
                    .text("weight influence"),
            )
            .on_hover_text("Exponent applied to |mV| when pulling connected cells together.")
            .changed();
        options_changed |= ui.checkbox(&mut options.lin_log_mode, "lin-log attraction").changed();
        options_changed |= ui.checkbox(&mut options.adjust_sizes, "prevent overlap").changed();
        options_changed |= ui
            .checkbox(&mut options.worker, "background thread")
            .on_hover_text("Takes effect on the next start.")
            .changed();
        options_changed |= ui
            .checkbox(&mut options.restart_on_start, "restart on start")
            .changed();
        if options_changed {
            self.apply_refine_options();
        }

        ui.add_space(8.0);
        ui.checkbox(&mut self.show_fps_bar, "Show FPS");
    }
}
