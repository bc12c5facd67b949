use std::collections::VecDeque;
use std::path::PathBuf;

use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::session::Session;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(
        session: Session,
        source: PathBuf,
        startup_focus: Option<String>,
    ) -> Self {
        let explorer = session.explorer();
        let depth = i64::from(explorer.max_depth());
        let direction = explorer.direction();
        let refine_options = session.refinement().options().clone();

        let mut model = Self {
            session,
            source,
            search: String::new(),
            search_cache: None,
            depth,
            direction,
            refine_options,
            status: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            fit_pending: true,
            drawn_revision: None,
            open_requested: false,
            show_fps_bar: true,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        };

        if let Some(focus) = startup_focus {
            model.select_focus(&focus);
        }
        model
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        self.update_fps_counter(ctx);
        if self.session.tick() {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("nurviz");
                    ui.separator();
                    let file_name = self
                        .source
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| self.source.display().to_string());
                    ui.label(file_name)
                        .on_hover_text(self.source.display().to_string());
                    ui.label(format!("cells: {}", self.session.network().cell_count()));
                    ui.label(format!("synapses: {}", self.session.network().synapse_count()));
                    if ui.button("Open network…").clicked() {
                        self.open_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.visible_graph_text());
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                    });
                });
            });

        if let Some(status) = self.status.clone() {
            egui::TopBottomPanel::bottom("status_bar")
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.colored_label(egui::Color32::LIGHT_RED, status);
                        if ui.small_button("dismiss").clicked() {
                            self.status = None;
                        }
                    });
                });
        }

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }

    /// Focuses a cell; failures end up in the status bar and leave the view as it was.
    pub(in crate::app) fn select_focus(&mut self, cell_id: &str) {
        match self.session.select_focus(cell_id) {
            Ok(_) => self.status = None,
            Err(error) => self.status = Some(error.to_string()),
        }
    }

    pub(in crate::app) fn apply_parameters(&mut self) {
        match self.session.set_parameters(self.depth, self.direction) {
            Ok(_) => self.status = None,
            Err(error) => self.status = Some(error.to_string()),
        }
    }

    pub(in crate::app) fn apply_refine_options(&mut self) {
        if let Err(error) = self.session.configure_refinement(self.refine_options.clone()) {
            self.status = Some(error.to_string());
            self.refine_options = self.session.refinement().options().clone();
        }
    }
}
