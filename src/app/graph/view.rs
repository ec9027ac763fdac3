use std::collections::HashSet;

use eframe::egui::{self, Align2, Color32, FontId, PointerButton, Pos2, Sense, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::info;

use super::super::ViewModel;
use super::super::camera::ViewTransform;
use super::super::render::{FrameInput, PainterSurface, render};
use super::Interaction;

impl ViewModel {
    /// Indices of nodes matching the search box, or None when no search is
    /// active. Graphs are depth-bounded, so a per-frame scan is fine.
    fn search_matches(&self) -> Option<HashSet<usize>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        let matcher = SkimMatcherV2::default();
        Some(
            self.graph
                .nodes
                .iter()
                .enumerate()
                .filter_map(|(index, node)| {
                    matcher
                        .fuzzy_match(&node.name, query)
                        .or_else(|| matcher.fuzzy_match(&node.id, query))
                        .map(|_| index)
                })
                .collect(),
        )
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        self.canvas_size = rect.size();

        if !self.view_initialized {
            self.transform = ViewTransform::centered(rect.size());
            self.view_initialized = true;
        }

        let local = |pos: Pos2| pos - rect.min.to_vec2();

        if response.drag_started_by(PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.interaction
                .pointer_down(&mut self.graph, &self.transform, local(pointer));
        }

        let pointer = ui.input(|input| input.pointer.hover_pos());
        if let Some(pointer) = pointer
            && (rect.contains(pointer) || response.dragged())
        {
            self.interaction.pointer_move(
                &mut self.graph,
                &mut self.sim,
                &mut self.transform,
                local(pointer),
                response.drag_delta(),
            );
        }

        if response.drag_stopped() {
            self.interaction.pointer_up(&mut self.graph);
        }

        if response.hovered() {
            let scroll = ui.input(|input| input.raw_scroll_delta.y);
            if scroll.abs() > f32::EPSILON {
                let anchor = pointer.unwrap_or_else(|| rect.center());
                self.interaction
                    .wheel(&mut self.transform, local(anchor), scroll);
            }
        }

        if response.double_clicked()
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.interaction
                .double_activate(&self.graph, &self.transform, local(pointer));
        } else if response.clicked() {
            self.selected_id = response.interact_pointer_pos().and_then(|pointer| {
                Interaction::hit_test(&self.graph, &self.transform, local(pointer))
                    .map(|index| self.graph.nodes[index].id.clone())
            });
        }

        let mut moving = false;
        if self.frame_loop.is_live(self.frame) && !self.sim.is_idle() {
            moving = self.sim.step(&mut self.graph);
        }

        let matches = self.search_matches();
        let input = FrameInput {
            graph: &self.graph,
            transform: &self.transform,
            hovered: self.interaction.hovered,
            selected: self.selected_index(),
            search_matches: matches.as_ref(),
        };
        let mut surface = PainterSurface::new(&painter, rect);
        render(&input, &mut surface);

        if self.graph.is_empty() {
            let notice = self
                .query_error
                .as_deref()
                .unwrap_or("No configuration items in this traversal.");
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                notice,
                FontId::proportional(14.0),
                Color32::from_gray(180),
            );
        }

        if let Some(index) = self.interaction.hovered
            && let Some(node) = self.graph.nodes.get(index)
        {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
            let anchor = self
                .interaction
                .tooltip_anchor
                .map_or(rect.left_top() + vec2(10.0, 10.0), |anchor| {
                    anchor + rect.min.to_vec2() + vec2(14.0, 18.0)
                });
            painter.text(
                anchor,
                Align2::LEFT_TOP,
                format!("{}  |  {}  |  depth {}", node.name, node.ci_class, node.depth),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if let Some(target) = self.interaction.take_navigation() {
            info!(ci = %target, "navigation requested");
            self.selected_id = Some(target.clone());
            self.last_navigation = Some(target);
        }

        if moving || self.interaction.is_dragging() || response.dragged() {
            ui.ctx().request_repaint();
        }
    }
}
