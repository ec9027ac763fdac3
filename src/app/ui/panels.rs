use eframe::egui::{self, Color32, Context, RichText, Sense, vec2};

use crate::cmdb::TraversalMode;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn side_panel(
        &mut self,
        ctx: &Context,
        snapshot_path: &str,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        egui::SidePanel::left("atlas-controls")
            .default_width(270.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.heading("CI relationship atlas");
                ui.label(RichText::new(snapshot_path).small().weak());
                ui.add_space(8.0);

                let mut requery = false;

                ui.horizontal(|ui| {
                    ui.label("Root");
                    let edit = ui.text_edit_singleline(&mut self.root_input);
                    let submitted =
                        edit.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
                    if (submitted || ui.button("Go").clicked())
                        && self.root_input.trim() != self.root_id
                    {
                        self.root_id = self.root_input.trim().to_owned();
                        requery = true;
                    }
                });

                ui.horizontal(|ui| {
                    ui.label("Mode");
                    for mode in [TraversalMode::Forward, TraversalMode::Impact] {
                        if ui
                            .selectable_value(&mut self.mode, mode, mode.label())
                            .changed()
                        {
                            requery = true;
                        }
                    }
                });

                ui.horizontal(|ui| {
                    ui.label("Depth");
                    if ui
                        .add(egui::Slider::new(&mut self.max_depth, 1..=8))
                        .drag_stopped()
                    {
                        requery = true;
                    }
                });

                ui.horizontal(|ui| {
                    ui.label("Search");
                    ui.text_edit_singleline(&mut self.search);
                });

                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui.button("Fit view").clicked() {
                        self.interaction.reset_view(
                            &self.graph,
                            &mut self.transform,
                            self.canvas_size,
                        );
                    }
                    if is_reloading {
                        ui.spinner();
                    } else if ui.button("Reload snapshot").clicked() {
                        *reload_requested = true;
                    }
                });

                if requery {
                    self.selected_id = None;
                    self.run_query();
                }

                if let Some(error) = &self.query_error {
                    ui.add_space(6.0);
                    ui.colored_label(Color32::from_rgb(235, 110, 100), error);
                }

                ui.separator();
                ui.label(format!(
                    "{} items, {} relationships in snapshot",
                    self.snapshot.item_count(),
                    self.snapshot.relationship_count()
                ));
                ui.label(format!(
                    "{} nodes, {} edges in view — {}",
                    self.graph.nodes.len(),
                    self.graph.edges.len(),
                    if self.sim.is_idle() { "settled" } else { "settling" }
                ));
                if let Some(root) = self.graph.root() {
                    ui.label(format!("Root: {}  ({})", root.name, root.ci_class));
                }

                ui.separator();
                ui.label(RichText::new("Legend").strong());
                for (class, color) in self.graph.legend() {
                    ui.horizontal(|ui| {
                        let (dot, _) = ui.allocate_exact_size(vec2(12.0, 12.0), Sense::hover());
                        ui.painter().circle_filled(dot.center(), 5.0, color);
                        ui.label(class);
                    });
                }

                if let Some(index) = self.selected_index() {
                    let node = &self.graph.nodes[index];
                    ui.separator();
                    ui.label(RichText::new("Selected").strong());
                    ui.label(node.name.clone());
                    ui.label(RichText::new(node.id.clone()).small().weak());
                    ui.label(format!(
                        "{}  ·  depth {}  ·  {} neighbors",
                        node.ci_class,
                        node.depth,
                        self.graph.neighbor_count(index)
                    ));
                }

                if let Some(target) = &self.last_navigation {
                    ui.separator();
                    ui.label(format!("Open detail view: {target}"));
                }
            });
    }
}
