use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, vec2};

use crate::util::short_label;
use crate::view::CurveHint;

use super::super::ViewModel;
use super::super::render_utils::{
    circle_visible, draw_background, draw_edge, segment_visible, with_alpha, world_to_screen,
};

const FOCUS_COLOR: Color32 = Color32::from_rgb(245, 206, 93);

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.fit_if_pending(rect);
        draw_background(&painter, rect, self.pan, self.zoom);
        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let pan = self.pan;
        let zoom = self.zoom;
        let graph = self.session.graph();
        let focus = self.session.explorer().focus();

        let radius_scale = zoom.sqrt().clamp(0.5, 4.0);
        let screen_positions = graph
            .nodes()
            .iter()
            .map(|node| world_to_screen(rect, pan, zoom, node.position))
            .collect::<Vec<_>>();
        let screen_radii = graph
            .nodes()
            .iter()
            .map(|node| graph.node_radius(node) * radius_scale)
            .collect::<Vec<_>>();
        let on_screen = graph
            .nodes()
            .iter()
            .enumerate()
            .filter(|(index, node)| {
                node.visible && circle_visible(rect, screen_positions[*index], screen_radii[*index])
            })
            .map(|(index, _)| index)
            .collect::<Vec<_>>();

        let hovered = Self::hovered_index(ui, &on_screen, &screen_positions, &screen_radii);
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let hovered_edges = hovered
            .map(|index| [graph.outgoing(index), graph.incoming(index)].concat())
            .unwrap_or_default();

        let edge_width = (0.9 * radius_scale).clamp(0.6, 2.4);
        for (edge_index, edge) in graph.edges().iter().enumerate() {
            if !graph.is_edge_visible(edge) {
                continue;
            }
            let start = screen_positions[edge.source_index];
            let end = screen_positions[edge.target_index];
            if !segment_visible(rect, start, end, 4.0) {
                continue;
            }

            draw_edge(
                &painter,
                start,
                end,
                if hovered_edges.contains(&edge_index) {
                    Stroke::new(edge_width * 2.0, edge.color)
                } else {
                    Stroke::new(edge_width, with_alpha(edge.color, 170))
                },
                edge.curve == Some(CurveHint::CurvedArrow),
                screen_radii[edge.target_index] + 1.0,
            );
        }

        for &index in &on_screen {
            let node = &graph.nodes()[index];
            let position = screen_positions[index];
            let radius = screen_radii[index];
            let is_focus = focus == Some(node.id.as_str());
            let is_hovered = hovered == Some(index);

            painter.circle_filled(position, radius, node.color);
            let outline = if is_focus {
                Stroke::new(2.2, FOCUS_COLOR)
            } else if is_hovered {
                Stroke::new(1.6, Color32::from_gray(230))
            } else {
                Stroke::new(0.8, Color32::from_rgba_unmultiplied(0, 0, 0, 170))
            };
            painter.circle_stroke(position, radius, outline);

            if is_focus || is_hovered || zoom > 2.5 {
                painter.text(
                    position + vec2(radius + 4.0, 0.0),
                    Align2::LEFT_CENTER,
                    short_label(&node.label, 28),
                    FontId::proportional(12.0),
                    Color32::from_gray(235),
                );
            }
        }

        let clicked = response
            .clicked_by(egui::PointerButton::Primary)
            .then(|| hovered.map(|index| graph.nodes()[index].id.clone()))
            .flatten();

        let revision = self.session.revision();
        if self.drawn_revision != Some(revision) {
            self.drawn_revision = Some(revision);
            ui.ctx().request_repaint();
        }

        if let Some(id) = clicked {
            self.select_focus(&id);
        }
    }
}
