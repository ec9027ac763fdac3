use std::collections::HashMap;
use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::cmdb::{Relationship, TraversalNode};
use crate::util::stable_pair;

use super::{NODE_RADIUS, ROOT_RADIUS, SimGraph, SimNode, class_color};

const RING_BASE: f32 = 150.0;
const RING_STEP: f32 = 120.0;
const JITTER: f32 = 26.0;

/// Turns a traversal result and its relationship list into an initial
/// simulation state: the root at the world origin, every other node on a
/// depth-proportional ring with a per-id jitter so no two start stacked,
/// all velocities zero.
pub(in crate::app) fn build_graph(
    traversal: &[TraversalNode],
    relationships: &[Relationship],
) -> SimGraph {
    if traversal.is_empty() {
        return SimGraph::default();
    }

    let mut nodes: Vec<SimNode> = Vec::with_capacity(traversal.len());
    let mut index_by_id = HashMap::with_capacity(traversal.len());
    let mut root_index = None;

    for raw in traversal {
        if index_by_id.contains_key(&raw.ci_id) {
            continue;
        }

        let index = nodes.len();
        let is_root = raw.depth == 0 && root_index.is_none();
        if is_root {
            root_index = Some(index);
        }

        let pos = if is_root {
            Vec2::ZERO
        } else {
            let angle = (index as f32) * TAU / (traversal.len() as f32);
            let ring = RING_BASE + (raw.depth as f32) * RING_STEP;
            let (jx, jy) = stable_pair(&raw.ci_id);
            (vec2(angle.cos(), angle.sin()) * ring) + (vec2(jx, jy) * JITTER)
        };

        index_by_id.insert(raw.ci_id.clone(), index);
        nodes.push(SimNode {
            id: raw.ci_id.clone(),
            name: raw.name.clone(),
            ci_class: raw.ci_class.clone(),
            depth: raw.depth,
            pos,
            velocity: Vec2::ZERO,
            radius: if is_root { ROOT_RADIUS } else { NODE_RADIUS },
            color: class_color(&raw.ci_class),
            pinned: false,
        });
    }

    let mut edges = collect_edges(relationships, &index_by_id);
    if edges.is_empty() && nodes.len() > 1 {
        edges = path_fallback_edges(traversal, &index_by_id);
    }

    SimGraph {
        nodes,
        edges,
        index_by_id,
        root_index,
    }
}

fn collect_edges(
    relationships: &[Relationship],
    index_by_id: &HashMap<String, usize>,
) -> Vec<(usize, usize)> {
    let mut edges = Vec::new();
    for relation in relationships {
        let (Some(&source), Some(&target)) = (
            index_by_id.get(&relation.source_ci_id),
            index_by_id.get(&relation.target_ci_id),
        ) else {
            continue;
        };

        if source == target {
            continue;
        }
        edges.push((source.min(target), source.max(target)));
    }
    edges.sort_unstable();
    edges.dedup();
    edges
}

/// Sparse relationship data still has to render as a connected picture, so
/// every node falls back to an edge toward its immediate path predecessor.
fn path_fallback_edges(
    traversal: &[TraversalNode],
    index_by_id: &HashMap<String, usize>,
) -> Vec<(usize, usize)> {
    let mut edges = Vec::new();
    for raw in traversal {
        let Some(&index) = index_by_id.get(&raw.ci_id) else {
            continue;
        };
        let Some(prev) = raw.path.iter().rev().find(|step| **step != raw.ci_id) else {
            continue;
        };
        let Some(&prev_index) = index_by_id.get(prev.as_str()) else {
            continue;
        };

        if prev_index == index {
            continue;
        }
        edges.push((index.min(prev_index), index.max(prev_index)));
    }
    edges.sort_unstable();
    edges.dedup();
    edges
}
