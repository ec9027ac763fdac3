use eframe::egui::{Pos2, Vec2};

use super::super::camera::ViewTransform;
use super::super::physics::Simulation;
use super::SimGraph;

const ZOOM_STEP: f32 = 0.0018;

/// Maps pointer and wheel input to world-space operations on the graph:
/// drag pins a node and feeds its position straight from the pointer, a
/// miss pans the canvas, wheel zooms toward the pointer, and a double
/// activation surfaces a navigation request for the embedder.
#[derive(Default)]
pub(in crate::app) struct Interaction {
    drag: Option<usize>,
    panning: bool,
    pub hovered: Option<usize>,
    pub tooltip_anchor: Option<Pos2>,
    navigation: Option<String>,
}

impl Interaction {
    /// World-space hit test in reverse draw order, so of two overlapping
    /// circles the one drawn last wins. Total over an empty graph.
    pub fn hit_test(graph: &SimGraph, transform: &ViewTransform, pointer: Pos2) -> Option<usize> {
        let world = transform.screen_to_world(pointer);
        graph
            .nodes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, node)| (node.pos - world).length_sq() <= node.radius * node.radius)
            .map(|(index, _)| index)
    }

    pub fn pointer_down(&mut self, graph: &mut SimGraph, transform: &ViewTransform, pointer: Pos2) {
        match Self::hit_test(graph, transform, pointer) {
            Some(index) => {
                graph.nodes[index].pinned = true;
                self.drag = Some(index);
            }
            None => self.panning = true,
        }
    }

    pub fn pointer_move(
        &mut self,
        graph: &mut SimGraph,
        sim: &mut Simulation,
        transform: &mut ViewTransform,
        pointer: Pos2,
        delta: Vec2,
    ) {
        if let Some(index) = self.drag {
            let node = &mut graph.nodes[index];
            node.pos = transform.screen_to_world(pointer);
            node.velocity = Vec2::ZERO;
            sim.wake();
        } else if self.panning {
            transform.pan += delta;
        } else {
            self.hovered = Self::hit_test(graph, transform, pointer);
            self.tooltip_anchor = self.hovered.map(|_| pointer);
        }
    }

    pub fn pointer_up(&mut self, graph: &mut SimGraph) {
        if let Some(index) = self.drag.take() {
            if let Some(node) = graph.nodes.get_mut(index) {
                node.pinned = false;
            }
        }
        self.panning = false;
    }

    pub fn wheel(&mut self, transform: &mut ViewTransform, pointer: Pos2, scroll: f32) {
        let factor = (1.0 + (scroll * ZOOM_STEP)).clamp(0.85, 1.15);
        transform.zoom_toward(pointer, factor);
    }

    /// Double activation emits a navigation request and touches nothing in
    /// the simulation.
    pub fn double_activate(
        &mut self,
        graph: &SimGraph,
        transform: &ViewTransform,
        pointer: Pos2,
    ) {
        if let Some(index) = Self::hit_test(graph, transform, pointer) {
            self.navigation = Some(graph.nodes[index].id.clone());
        }
    }

    /// Consumed by the embedder, which routes to the item's detail view.
    pub fn take_navigation(&mut self) -> Option<String> {
        self.navigation.take()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn reset_view(&self, graph: &SimGraph, transform: &mut ViewTransform, surface: Vec2) {
        transform.fit_to_view(graph, surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::graph::build_graph;
    use crate::app::physics::{SimConfig, Simulation};
    use crate::cmdb::TraversalNode;
    use eframe::egui::{pos2, vec2};

    fn two_node_graph() -> SimGraph {
        let traversal = vec![
            TraversalNode {
                ci_id: "root".to_owned(),
                name: "root".to_owned(),
                ci_class: "server".to_owned(),
                depth: 0,
                path: vec!["root".to_owned()],
            },
            TraversalNode {
                ci_id: "leaf".to_owned(),
                name: "leaf".to_owned(),
                ci_class: "server".to_owned(),
                depth: 1,
                path: vec!["root".to_owned(), "leaf".to_owned()],
            },
        ];
        build_graph(&traversal, &[])
    }

    fn screen_of(graph: &SimGraph, transform: &ViewTransform, index: usize) -> Pos2 {
        transform.world_to_screen(graph.nodes[index].pos)
    }

    #[test]
    fn hit_test_prefers_the_node_drawn_last() {
        let mut graph = two_node_graph();
        graph.nodes[1].pos = graph.nodes[0].pos;
        let transform = ViewTransform::default();

        let hit = Interaction::hit_test(&graph, &transform, screen_of(&graph, &transform, 0));
        assert_eq!(hit, Some(1));
    }

    #[test]
    fn hit_test_is_total_over_an_empty_graph() {
        let graph = SimGraph::default();
        let transform = ViewTransform::default();
        assert_eq!(
            Interaction::hit_test(&graph, &transform, pos2(10.0, 10.0)),
            None
        );
    }

    #[test]
    fn drag_pins_moves_and_wakes_then_unpins() {
        let mut graph = two_node_graph();
        let mut transform = ViewTransform::default();
        let mut sim = Simulation::new(SimConfig::default());
        let mut interaction = Interaction::default();

        // settle so the wake is observable
        for _ in 0..2000 {
            if sim.is_idle() {
                break;
            }
            sim.step(&mut graph);
        }
        assert!(sim.is_idle());

        let start = screen_of(&graph, &transform, 1);
        interaction.pointer_down(&mut graph, &transform, start);
        assert!(graph.nodes[1].pinned);
        assert!(interaction.is_dragging());

        let target = pos2(400.0, 250.0);
        interaction.pointer_move(&mut graph, &mut sim, &mut transform, target, vec2(0.0, 0.0));
        assert!(!sim.is_idle());
        assert_eq!(graph.nodes[1].velocity, Vec2::ZERO);
        let expected = transform.screen_to_world(target);
        assert!((graph.nodes[1].pos - expected).length() < 1.0e-3);

        interaction.pointer_up(&mut graph);
        assert!(!graph.nodes[1].pinned);
        assert!(!interaction.is_dragging());
    }

    #[test]
    fn missing_a_node_pans_the_canvas() {
        let mut graph = two_node_graph();
        let mut transform = ViewTransform::default();
        let mut sim = Simulation::new(SimConfig::default());
        let mut interaction = Interaction::default();
        let pan_before = transform.pan;

        interaction.pointer_down(&mut graph, &transform, pos2(5000.0, 5000.0));
        interaction.pointer_move(
            &mut graph,
            &mut sim,
            &mut transform,
            pos2(5010.0, 4990.0),
            vec2(10.0, -10.0),
        );
        interaction.pointer_up(&mut graph);

        assert_eq!(transform.pan, pan_before + vec2(10.0, -10.0));
    }

    #[test]
    fn hover_updates_node_and_tooltip_anchor() {
        let mut graph = two_node_graph();
        let mut transform = ViewTransform::default();
        let mut sim = Simulation::new(SimConfig::default());
        let mut interaction = Interaction::default();

        let over = screen_of(&graph, &transform, 0);
        interaction.pointer_move(&mut graph, &mut sim, &mut transform, over, vec2(0.0, 0.0));
        assert_eq!(interaction.hovered, Some(0));
        assert_eq!(interaction.tooltip_anchor, Some(over));

        interaction.pointer_move(
            &mut graph,
            &mut sim,
            &mut transform,
            pos2(-4000.0, -4000.0),
            vec2(0.0, 0.0),
        );
        assert_eq!(interaction.hovered, None);
        assert_eq!(interaction.tooltip_anchor, None);
    }

    #[test]
    fn wheel_zoom_keeps_the_pointer_fixed_in_world_space() {
        let mut transform = ViewTransform::default();
        let mut interaction = Interaction::default();
        let pointer = pos2(123.0, 456.0);
        let before = transform.screen_to_world(pointer);

        interaction.wheel(&mut transform, pointer, 40.0);
        assert!(transform.zoom > 1.0);
        let after = transform.screen_to_world(pointer);
        assert!((after - before).length() < 1.0e-3);
    }

    #[test]
    fn double_activation_emits_one_navigation_request() {
        let mut graph = two_node_graph();
        let transform = ViewTransform::default();
        let mut interaction = Interaction::default();

        interaction.double_activate(&graph, &transform, screen_of(&graph, &transform, 1));
        assert_eq!(interaction.take_navigation().as_deref(), Some("leaf"));
        assert_eq!(interaction.take_navigation(), None);

        let before = graph.nodes.iter().map(|n| n.pos).collect::<Vec<_>>();
        interaction.double_activate(&graph, &transform, pos2(9000.0, 9000.0));
        assert_eq!(interaction.take_navigation(), None);
        assert_eq!(before, graph.nodes.iter().map(|n| n.pos).collect::<Vec<_>>());
    }
}
