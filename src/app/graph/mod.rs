use std::collections::{BTreeMap, HashMap};

use eframe::egui::{Color32, Vec2};

use crate::util::stable_hash;

mod build;
mod interaction;
mod view;

pub(in crate::app) use build::build_graph;
pub(in crate::app) use interaction::Interaction;

pub(in crate::app) const ROOT_RADIUS: f32 = 26.0;
pub(in crate::app) const NODE_RADIUS: f32 = 16.0;

/// One configuration item in the layout arena. Position, velocity and the
/// pin flag are rewritten every frame; everything else is fixed at build
/// time.
pub(in crate::app) struct SimNode {
    pub id: String,
    pub name: String,
    pub ci_class: String,
    pub depth: u32,
    pub pos: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub color: Color32,
    pub pinned: bool,
}

/// Node arena plus deduplicated undirected edges, addressed by index.
/// Arena order is draw order; hit-testing scans it in reverse so the
/// top-most drawn node wins.
#[derive(Default)]
pub(in crate::app) struct SimGraph {
    pub nodes: Vec<SimNode>,
    pub edges: Vec<(usize, usize)>,
    pub index_by_id: HashMap<String, usize>,
    pub root_index: Option<usize>,
}

impl SimGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<&SimNode> {
        self.root_index.and_then(|index| self.nodes.get(index))
    }

    /// Distinct class → color pairs present in the graph, sorted by class.
    pub fn legend(&self) -> Vec<(String, Color32)> {
        let mut entries = BTreeMap::new();
        for node in &self.nodes {
            entries.entry(node.ci_class.clone()).or_insert(node.color);
        }
        entries.into_iter().collect()
    }

    pub fn neighbor_count(&self, index: usize) -> usize {
        self.edges
            .iter()
            .filter(|(a, b)| *a == index || *b == index)
            .count()
    }
}

const CLASS_PALETTE: [Color32; 10] = [
    Color32::from_rgb(31, 119, 180),
    Color32::from_rgb(255, 127, 14),
    Color32::from_rgb(44, 160, 44),
    Color32::from_rgb(214, 39, 40),
    Color32::from_rgb(148, 103, 189),
    Color32::from_rgb(140, 86, 75),
    Color32::from_rgb(227, 119, 194),
    Color32::from_rgb(127, 127, 127),
    Color32::from_rgb(188, 189, 34),
    Color32::from_rgb(23, 190, 207),
];

/// Color for a CI class: named colors for the common classes, otherwise a
/// stable hash into a fixed palette so re-runs look the same.
pub(in crate::app) fn class_color(ci_class: &str) -> Color32 {
    match ci_class {
        "business_service" => Color32::from_rgb(245, 206, 93),
        "application" => Color32::from_rgb(86, 156, 214),
        "database" => Color32::from_rgb(236, 118, 82),
        "server" => Color32::from_rgb(106, 196, 140),
        "network_gear" => Color32::from_rgb(167, 139, 250),
        "storage" => Color32::from_rgb(94, 200, 213),
        _ => CLASS_PALETTE[(stable_hash(ci_class) % CLASS_PALETTE.len() as u64) as usize],
    }
}
