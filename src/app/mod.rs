use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2, vec2};
use tracing::info;

use crate::cmdb::{CmdbSnapshot, GraphSource, TraversalMode};

mod camera;
mod frame;
mod graph;
mod physics;
mod render;
mod ui;

use camera::ViewTransform;
use frame::{FrameHandle, FrameLoop};
use graph::{Interaction, SimGraph, build_graph};
use physics::{SimConfig, Simulation};

type LoadResult = Result<CmdbSnapshot, String>;

/// What the explorer is currently asking of the CMDB.
#[derive(Clone, Debug)]
pub struct GraphQuery {
    pub root_id: Option<String>,
    pub mode: TraversalMode,
    pub max_depth: u32,
}

pub struct CiAtlasApp {
    snapshot_path: String,
    initial_query: GraphQuery,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    snapshot: CmdbSnapshot,
    root_id: String,
    root_input: String,
    mode: TraversalMode,
    max_depth: u32,
    graph: SimGraph,
    sim: Simulation,
    transform: ViewTransform,
    view_initialized: bool,
    canvas_size: Vec2,
    interaction: Interaction,
    frame_loop: FrameLoop,
    frame: FrameHandle,
    search: String,
    selected_id: Option<String>,
    last_navigation: Option<String>,
    query_error: Option<String>,
}

impl CiAtlasApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        snapshot_path: String,
        initial_query: GraphQuery,
    ) -> Self {
        let state = Self::start_load(snapshot_path.clone());
        Self {
            snapshot_path,
            initial_query,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(snapshot_path: String) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = CmdbSnapshot::load(&snapshot_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(snapshot_path: String) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(snapshot_path),
        }
    }
}

impl eframe::App for CiAtlasApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(snapshot) => AppState::Ready(Box::new(ViewModel::new(
                            snapshot,
                            self.initial_query.clone(),
                        ))),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading CMDB snapshot...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load CMDB snapshot");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.snapshot_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.snapshot_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.snapshot_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            let query = model.query();
                            transition = Some(match result {
                                Ok(snapshot) => {
                                    AppState::Ready(Box::new(ViewModel::new(snapshot, query)))
                                }
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Background load worker disconnected".to_owned(),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}

impl ViewModel {
    fn new(snapshot: CmdbSnapshot, query: GraphQuery) -> Self {
        let root_id = query
            .root_id
            .or_else(|| snapshot.default_root().map(str::to_owned))
            .unwrap_or_default();

        let mut model = Self {
            snapshot,
            root_input: root_id.clone(),
            root_id,
            mode: query.mode,
            max_depth: query.max_depth.clamp(1, 8),
            graph: SimGraph::default(),
            sim: Simulation::new(SimConfig::default()),
            transform: ViewTransform::default(),
            view_initialized: false,
            canvas_size: vec2(1280.0, 800.0),
            interaction: Interaction::default(),
            frame_loop: FrameLoop::default(),
            frame: FrameHandle::default(),
            search: String::new(),
            selected_id: None,
            last_navigation: None,
            query_error: None,
        };
        model.frame = model.frame_loop.restart();
        model.run_query();
        model
    }

    fn query(&self) -> GraphQuery {
        GraphQuery {
            root_id: Some(self.root_id.clone()),
            mode: self.mode,
            max_depth: self.max_depth,
        }
    }

    /// Re-queries the source and replaces the simulation state. The old
    /// frame handle dies with the restart, so nothing steps the discarded
    /// graph.
    fn run_query(&mut self) {
        let result = self
            .snapshot
            .traversal(&self.root_id, self.mode, self.max_depth)
            .and_then(|traversal| {
                let relationships = self.snapshot.relationships(&self.root_id)?;
                Ok((traversal, relationships))
            });

        match result {
            Ok((traversal, relationships)) => {
                self.graph = build_graph(&traversal, &relationships);
                self.sim = Simulation::new(SimConfig::default());
                self.frame = self.frame_loop.restart();
                self.interaction = Interaction::default();
                self.query_error = None;
                info!(
                    root = %self.root_id,
                    mode = self.mode.label(),
                    nodes = self.graph.nodes.len(),
                    edges = self.graph.edges.len(),
                    "rebuilt relationship graph"
                );
            }
            Err(error) => {
                self.graph = SimGraph::default();
                self.frame_loop.cancel();
                self.query_error = Some(format!("{error:#}"));
            }
        }
    }

    fn selected_index(&self) -> Option<usize> {
        self.selected_id
            .as_ref()
            .and_then(|id| self.graph.index_by_id.get(id))
            .copied()
    }

    fn show(
        &mut self,
        ctx: &Context,
        snapshot_path: &str,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        self.side_panel(ctx, snapshot_path, reload_requested, is_reloading);
        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_graph(ui);
        });
    }
}

impl Drop for ViewModel {
    fn drop(&mut self) {
        self.frame_loop.cancel();
    }
}
