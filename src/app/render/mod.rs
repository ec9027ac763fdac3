use std::collections::HashSet;

use eframe::egui::{Align2, Color32, Pos2, Vec2, vec2};

use crate::util::truncate_label;

use super::camera::ViewTransform;
use super::graph::SimGraph;

mod surface;

pub(in crate::app) use surface::{DrawSurface, PainterSurface};

const BACKGROUND: Color32 = Color32::from_rgb(21, 24, 31);
const NODE_OUTLINE: Color32 = Color32::from_rgb(15, 15, 15);
const LABEL_COLOR: Color32 = Color32::from_rgb(222, 226, 232);
const HOVER_RING: Color32 = Color32::from_rgb(255, 164, 101);
const SELECTED_RING: Color32 = Color32::from_rgb(245, 206, 93);

const EDGE_WIDTH: f32 = 1.2;
const ARROW_SIZE: f32 = 7.0;
const LABEL_MAX_CHARS: usize = 22;

/// Everything one frame reads. The renderer mutates none of it.
pub(in crate::app) struct FrameInput<'a> {
    pub graph: &'a SimGraph,
    pub transform: &'a ViewTransform,
    pub hovered: Option<usize>,
    pub selected: Option<usize>,
    /// When a search is active, nodes outside this set are dimmed.
    pub search_matches: Option<&'a HashSet<usize>>,
}

/// Draws one frame: edges first, then directional markers, then nodes in
/// arena order with their decorations and labels. Stroke widths and font
/// sizes are screen-space constants, so line and text weight stay visually
/// stable across zoom levels.
pub(in crate::app) fn render(input: &FrameInput<'_>, surface: &mut dyn DrawSurface) {
    surface.clear(BACKGROUND);
    draw_edges(input, surface);
    draw_nodes(input, surface);
}

fn circle_visible(size: Vec2, center: Pos2, radius: f32) -> bool {
    !(center.x + radius < 0.0
        || center.x - radius > size.x
        || center.y + radius < 0.0
        || center.y - radius > size.y)
}

fn segment_visible(size: Vec2, from: Pos2, to: Pos2, padding: f32) -> bool {
    !(from.x.max(to.x) + padding < 0.0
        || from.x.min(to.x) - padding > size.x
        || from.y.max(to.y) + padding < 0.0
        || from.y.min(to.y) - padding > size.y)
}

fn draw_edges(input: &FrameInput<'_>, surface: &mut dyn DrawSurface) {
    let size = surface.size();
    let edge_color = Color32::from_rgba_unmultiplied(96, 104, 118, 200);
    let arrow_color = Color32::from_rgba_unmultiplied(132, 142, 158, 220);

    for &(a, b) in &input.graph.edges {
        let from = input.transform.world_to_screen(input.graph.nodes[a].pos);
        let to = input.transform.world_to_screen(input.graph.nodes[b].pos);
        let delta = to - from;
        let length = delta.length();
        if length < 1.0 || !segment_visible(size, from, to, ARROW_SIZE) {
            continue;
        }

        surface.line(from, to, EDGE_WIDTH, edge_color);

        let direction = delta / length;
        let normal = vec2(-direction.y, direction.x);
        let mid = from + delta * 0.5;
        let tip = mid + direction * (ARROW_SIZE * 0.6);
        let back = mid - direction * (ARROW_SIZE * 0.4);
        surface.triangle(
            [
                tip,
                back + normal * (ARROW_SIZE * 0.45),
                back - normal * (ARROW_SIZE * 0.45),
            ],
            arrow_color,
        );
    }
}

fn draw_nodes(input: &FrameInput<'_>, surface: &mut dyn DrawSurface) {
    let size = surface.size();
    let zoom = input.transform.zoom;

    for (index, node) in input.graph.nodes.iter().enumerate() {
        let center = input.transform.world_to_screen(node.pos);
        let radius = (node.radius * zoom).max(1.5);
        if !circle_visible(size, center, radius + 8.0) {
            continue;
        }
        let is_hovered = input.hovered == Some(index);
        let is_root = input.graph.root_index == Some(index);

        let dimmed = input
            .search_matches
            .is_some_and(|matches| !matches.contains(&index));
        let fill = if dimmed {
            dim_color(node.color, 0.4)
        } else {
            node.color
        };

        let (shadow_offset, shadow_alpha) = if is_hovered { (3.0, 110) } else { (2.0, 70) };
        surface.circle_filled(
            center + vec2(shadow_offset * 0.6, shadow_offset),
            radius,
            Color32::from_black_alpha(shadow_alpha),
        );

        surface.circle_filled(center, radius, fill);
        surface.circle_stroke(center, radius, 1.0, NODE_OUTLINE);

        if is_root {
            surface.circle_stroke(center, radius + 3.0, 2.0, Color32::WHITE);
            surface.circle_stroke(center, radius + 6.0, 2.0, node.color);
        }

        if input.selected == Some(index) {
            surface.circle_stroke(center, radius + 4.0, 2.0, SELECTED_RING);
        }

        if is_hovered {
            surface.circle_stroke(center, radius + 3.0, 2.0, HOVER_RING);
        }

        if radius >= 5.0 {
            surface.text(
                center,
                Align2::CENTER_CENTER,
                &node.depth.to_string(),
                10.0,
                Color32::WHITE,
            );
            surface.text(
                center + vec2(0.0, radius + 4.0),
                Align2::CENTER_TOP,
                &truncate_label(&node.name, LABEL_MAX_CHARS),
                12.0,
                if dimmed {
                    dim_color(LABEL_COLOR, 0.4)
                } else {
                    LABEL_COLOR
                },
            );
        }
    }
}

fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::graph::build_graph;
    use crate::cmdb::{Relationship, TraversalNode};

    #[derive(Debug, PartialEq)]
    enum Op {
        Clear,
        Line,
        CircleFill,
        CircleStroke,
        Triangle,
        Text(String),
    }

    #[derive(Default)]
    struct RecordingSurface {
        ops: Vec<Op>,
    }

    impl RecordingSurface {
        fn count(&self, matcher: impl Fn(&Op) -> bool) -> usize {
            self.ops.iter().filter(|op| matcher(op)).count()
        }
    }

    impl DrawSurface for RecordingSurface {
        fn size(&self) -> Vec2 {
            vec2(800.0, 600.0)
        }

        fn clear(&mut self, _color: Color32) {
            self.ops.push(Op::Clear);
        }

        fn line(&mut self, _from: Pos2, _to: Pos2, _width: f32, _color: Color32) {
            self.ops.push(Op::Line);
        }

        fn circle_filled(&mut self, _center: Pos2, _radius: f32, _color: Color32) {
            self.ops.push(Op::CircleFill);
        }

        fn circle_stroke(&mut self, _center: Pos2, _radius: f32, _width: f32, _color: Color32) {
            self.ops.push(Op::CircleStroke);
        }

        fn triangle(&mut self, _corners: [Pos2; 3], _color: Color32) {
            self.ops.push(Op::Triangle);
        }

        fn text(&mut self, _pos: Pos2, _anchor: Align2, text: &str, _size: f32, _color: Color32) {
            self.ops.push(Op::Text(text.to_owned()));
        }
    }

    fn sample_graph() -> SimGraph {
        let traversal = vec![
            TraversalNode {
                ci_id: "root".to_owned(),
                name: "Payments".to_owned(),
                ci_class: "business_service".to_owned(),
                depth: 0,
                path: vec!["root".to_owned()],
            },
            TraversalNode {
                ci_id: "api".to_owned(),
                name: "payments-api".to_owned(),
                ci_class: "application".to_owned(),
                depth: 1,
                path: vec!["root".to_owned(), "api".to_owned()],
            },
        ];
        let relationships = vec![Relationship {
            source_ci_id: "root".to_owned(),
            target_ci_id: "api".to_owned(),
        }];
        build_graph(&traversal, &relationships)
    }

    fn frame<'a>(graph: &'a SimGraph, transform: &'a ViewTransform) -> FrameInput<'a> {
        FrameInput {
            graph,
            transform,
            hovered: None,
            selected: None,
            search_matches: None,
        }
    }

    // world origin on the canvas center, like the shell's initial view
    fn canvas_transform() -> ViewTransform {
        ViewTransform::centered(vec2(800.0, 600.0))
    }

    #[test]
    fn empty_graph_renders_only_the_clear() {
        let graph = SimGraph::default();
        let transform = canvas_transform();
        let mut surface = RecordingSurface::default();

        render(&frame(&graph, &transform), &mut surface);
        assert_eq!(surface.ops, vec![Op::Clear]);
    }

    #[test]
    fn offscreen_geometry_is_culled() {
        let graph = sample_graph();
        let transform = ViewTransform {
            pan: vec2(50_000.0, 50_000.0),
            zoom: 1.0,
        };
        let mut surface = RecordingSurface::default();

        render(&frame(&graph, &transform), &mut surface);
        assert_eq!(surface.ops, vec![Op::Clear]);
    }

    #[test]
    fn edges_draw_before_nodes() {
        let graph = sample_graph();
        let transform = canvas_transform();
        let mut surface = RecordingSurface::default();

        render(&frame(&graph, &transform), &mut surface);

        assert_eq!(surface.ops[0], Op::Clear);
        let first_line = surface.ops.iter().position(|op| *op == Op::Line).unwrap();
        let first_fill = surface
            .ops
            .iter()
            .position(|op| *op == Op::CircleFill)
            .unwrap();
        assert!(first_line < first_fill);
        assert_eq!(surface.count(|op| *op == Op::Triangle), graph.edges.len());
    }

    #[test]
    fn every_node_gets_shadow_fill_and_labels() {
        let graph = sample_graph();
        let transform = canvas_transform();
        let mut surface = RecordingSurface::default();

        render(&frame(&graph, &transform), &mut surface);

        // shadow + fill per node
        assert_eq!(
            surface.count(|op| *op == Op::CircleFill),
            graph.nodes.len() * 2
        );
        assert!(surface.ops.contains(&Op::Text("0".to_owned())));
        assert!(surface.ops.contains(&Op::Text("1".to_owned())));
        assert!(surface.ops.contains(&Op::Text("Payments".to_owned())));
        assert!(surface.ops.contains(&Op::Text("payments-api".to_owned())));
    }

    #[test]
    fn root_rings_and_hover_ring_are_extra_strokes() {
        let graph = sample_graph();
        let transform = canvas_transform();

        let mut plain = RecordingSurface::default();
        render(&frame(&graph, &transform), &mut plain);

        let mut hovered = RecordingSurface::default();
        let input = FrameInput {
            hovered: Some(1),
            ..frame(&graph, &transform)
        };
        render(&input, &mut hovered);

        // outline per node + two root rings
        assert_eq!(
            plain.count(|op| *op == Op::CircleStroke),
            graph.nodes.len() + 2
        );
        assert_eq!(
            hovered.count(|op| *op == Op::CircleStroke),
            plain.count(|op| *op == Op::CircleStroke) + 1
        );
    }

    #[test]
    fn renderer_does_not_mutate_simulation_state() {
        let graph = sample_graph();
        let transform = canvas_transform();
        let before = graph.nodes.iter().map(|n| n.pos).collect::<Vec<_>>();

        let mut surface = RecordingSurface::default();
        render(&frame(&graph, &transform), &mut surface);

        let after = graph.nodes.iter().map(|n| n.pos).collect::<Vec<_>>();
        assert_eq!(before, after);
    }
}
