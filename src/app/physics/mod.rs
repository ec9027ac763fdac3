use eframe::egui::Vec2;

use super::graph::SimGraph;

mod forces;

use forces::{pair_repulsion, spring_force};

/// Tunable constants for one simulation run.
#[derive(Clone, Copy, Debug)]
pub(in crate::app) struct SimConfig {
    pub repulsion: f32,
    pub rest_length: f32,
    pub attraction: f32,
    pub damping: f32,
    pub min_velocity: f32,
    pub stable_frames: u32,
    pub center_gravity: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            repulsion: 2400.0,
            rest_length: 110.0,
            attraction: 0.06,
            damping: 0.85,
            min_velocity: 0.02,
            stable_frames: 60,
            center_gravity: 0.0012,
        }
    }
}

/// Force-directed relaxation with a sleep detector: once peak motion stays
/// under `min_velocity` for more than `stable_frames` consecutive frames,
/// stepping suspends until `wake` is called.
pub(in crate::app) struct Simulation {
    config: SimConfig,
    forces: Vec<Vec2>,
    calm_frames: u32,
    idle: bool,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            forces: Vec::new(),
            calm_frames: 0,
            idle: false,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }

    /// Resumes stepping after a drag or rebuild.
    pub fn wake(&mut self) {
        self.calm_frames = 0;
        self.idle = false;
    }

    /// Advances the layout one frame. Returns true while nodes are still in
    /// motion; an idle simulation is a no-op.
    pub fn step(&mut self, graph: &mut SimGraph) -> bool {
        let node_count = graph.nodes.len();
        if self.idle || node_count < 2 {
            return false;
        }

        self.forces.resize(node_count, Vec2::ZERO);
        self.forces.fill(Vec2::ZERO);

        // O(n²) pairwise repulsion; traversal depth keeps n small. A pinned
        // node still pushes its neighbors but accumulates nothing itself.
        for a in 0..node_count {
            for b in (a + 1)..node_count {
                let push = pair_repulsion(
                    graph.nodes[a].pos,
                    graph.nodes[b].pos,
                    a,
                    b,
                    self.config.repulsion,
                );
                if !graph.nodes[a].pinned {
                    self.forces[a] += push;
                }
                if !graph.nodes[b].pinned {
                    self.forces[b] -= push;
                }
            }
        }

        for &(a, b) in &graph.edges {
            let pull = spring_force(
                graph.nodes[a].pos,
                graph.nodes[b].pos,
                self.config.rest_length,
                self.config.attraction,
            );
            if !graph.nodes[a].pinned {
                self.forces[a] -= pull;
            }
            if !graph.nodes[b].pinned {
                self.forces[b] += pull;
            }
        }

        for (index, node) in graph.nodes.iter().enumerate() {
            if !node.pinned {
                self.forces[index] -= node.pos * self.config.center_gravity;
            }
        }

        let mut peak = 0.0_f32;
        for (node, force) in graph.nodes.iter_mut().zip(&self.forces) {
            if node.pinned {
                continue;
            }

            node.velocity = (node.velocity + *force) * self.config.damping;
            node.pos += node.velocity;
            peak = peak.max(node.velocity.x.abs()).max(node.velocity.y.abs());
        }

        if peak < self.config.min_velocity {
            self.calm_frames += 1;
            if self.calm_frames > self.config.stable_frames {
                self.idle = true;
                return false;
            }
        } else {
            self.calm_frames = 0;
        }

        true
    }
}
