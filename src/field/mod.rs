use glam::{Vec2, vec2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::Graph;

mod forces;
mod grid;

pub use forces::{DefaultForceLaw, ForceKind, ForceLaw};
pub use grid::{Cell, Grid, PointLink};

pub type Color = [f32; 4];

pub const SELECT_RED: Color = [1.0, 0.0, 0.0, 1.0];
pub const SELECT_GREEN: Color = [0.0, 1.0, 0.0, 1.0];
pub const SELECT_BLUE: Color = [0.0, 0.0, 1.0, 1.0];
pub const SELECT_YELLOW: Color = [1.0, 1.0, 0.0, 1.0];

pub const DEFAULT_GRAPH_CENTER: Vec2 = Vec2::new(200.0, 200.0);
pub const DEFAULT_GRAPH_RADIUS: f32 = 100.0;

const DAMPING: f32 = 0.95;
const MAX_SPEED: f32 = 1000.0;
const SLEEP_SPEED: f32 = 0.5;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Grid cell size; doubles as the rest distance of every force curve.
    pub cell_size: f32,
    pub bounds: Vec2,
    pub bound_forces: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            cell_size: 200.0,
            bounds: vec2(1280.0, 720.0),
            bound_forces: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection {
    pub selected: bool,
    pub color: Color,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            selected: false,
            color: SELECT_RED,
        }
    }
}

/// A graph under simulation. Owns the structure plus parallel per-node and
/// per-edge state; the edge mutators keep the parallel vectors aligned with
/// the graph's edge list.
#[derive(Clone, Debug)]
pub struct SimulatedGraph {
    graph: Graph,
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    node_selection: Vec<Selection>,
    edge_selection: Vec<Selection>,
    edge_annotations: Vec<String>,
}

impl SimulatedGraph {
    fn new(graph: Graph) -> Self {
        let node_count = graph.node_count();
        let edge_count = graph.edge_count();
        Self {
            graph,
            positions: vec![Vec2::ZERO; node_count],
            velocities: vec![Vec2::ZERO; node_count],
            node_selection: vec![Selection::default(); node_count],
            edge_selection: vec![Selection::default(); edge_count],
            edge_annotations: vec![String::new(); edge_count],
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub fn position(&self, node: usize) -> Vec2 {
        self.positions[node]
    }

    pub fn node_selection(&self) -> &[Selection] {
        &self.node_selection
    }

    pub fn edge_selection(&self) -> &[Selection] {
        &self.edge_selection
    }

    pub fn edge_annotations(&self) -> &[String] {
        &self.edge_annotations
    }

    pub(crate) fn add_edge(&mut self, from: usize, to: usize, weight: i32) {
        self.graph.add_edge(from, to, weight);
        self.edge_selection.push(Selection::default());
        self.edge_annotations.push(String::new());
    }

    pub(crate) fn remove_edge(&mut self, edge_id: usize) {
        self.graph.remove_edge(edge_id);
        self.edge_selection.remove(edge_id);
        self.edge_annotations.remove(edge_id);
    }
}

/// Outcome of [`Field::load_graph`]. `Replaced` carries the id the reloaded
/// graph now lives under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Synced,
    Replaced(usize),
}

/// The simulation arena: every graph's points share one spatial grid, so
/// points of different graphs repel each other too.
pub struct Field {
    config: FieldConfig,
    grid: Grid,
    graphs: Vec<SimulatedGraph>,
    force_law: Box<dyn ForceLaw + Send + Sync>,
    physics_enabled: bool,
    playback_lock: bool,
}

impl Field {
    pub fn new(config: FieldConfig) -> Self {
        Self::with_force_law(config, Box::new(DefaultForceLaw))
    }

    pub fn with_force_law(config: FieldConfig, force_law: Box<dyn ForceLaw + Send + Sync>) -> Self {
        Self {
            grid: Grid::new(config.cell_size),
            config,
            graphs: Vec::new(),
            force_law,
            physics_enabled: true,
            playback_lock: false,
        }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn graph(&self, graph_id: usize) -> &SimulatedGraph {
        &self.graphs[graph_id]
    }

    pub fn graph_count(&self) -> usize {
        self.graphs.len()
    }

    pub fn physics_enabled(&self) -> bool {
        self.physics_enabled
    }

    /// Lays the graph's nodes out on a circle and registers them in the
    /// grid. Returns the new graph's id.
    pub fn add_graph(&mut self, graph: Graph, center: Vec2, radius: f32) -> usize {
        debug!(nodes = graph.node_count(), edges = graph.edge_count(), "adding graph");
        let graph_id = self.graphs.len();
        self.graphs.push(SimulatedGraph::new(graph));
        self.place_on_circle(graph_id, center, radius, false);
        graph_id
    }

    /// Drops the graph. Ids of later graphs shift down, so the whole grid is
    /// rebuilt; callers must not hold ids across a removal.
    pub fn remove_graph(&mut self, graph_id: usize) {
        debug!(graph_id, "removing graph");
        self.graphs.remove(graph_id);
        self.grid.clear();
        for (graph_id, sim) in self.graphs.iter().enumerate() {
            for (node, &position) in sim.positions.iter().enumerate() {
                self.grid.insert(PointLink { graph: graph_id, node }, position);
            }
        }
    }

    pub fn reset_layout(&mut self, graph_id: usize, center: Vec2, radius: f32) {
        self.place_on_circle(graph_id, center, radius, true);
    }

    fn place_on_circle(&mut self, graph_id: usize, center: Vec2, radius: f32, relocate: bool) {
        let sim = &mut self.graphs[graph_id];
        let n = sim.positions.len();
        for node in 0..n {
            let link = PointLink { graph: graph_id, node };
            let old_cell = self.grid.cell_of(sim.positions[node]);
            let alpha = std::f32::consts::TAU * node as f32 / n as f32;
            sim.positions[node] = vec2(alpha.cos(), alpha.sin()) * radius + center;
            sim.velocities[node] = Vec2::ZERO;
            if relocate {
                self.grid.relocate(old_cell, link, sim.positions[node]);
            } else {
                self.grid.insert(link, sim.positions[node]);
            }
        }
    }

    /// The paste policy: when the new structure only adds or only removes
    /// edges relative to what is already loaded, the edges are synced in
    /// place and positions survive; anything else replaces the graph at the
    /// default layout.
    pub fn load_graph(&mut self, graph_id: usize, parsed: Graph) -> LoadOutcome {
        let current = &self.graphs[graph_id].graph;
        let keep_layout = current.includes(&parsed)
            || (parsed.includes(current) && parsed.node_count() == current.node_count());

        if keep_layout {
            debug!(graph_id, "syncing graph edges in place");
            let sim = &mut self.graphs[graph_id];
            for edge_id in (0..sim.graph.edge_count()).rev() {
                sim.remove_edge(edge_id);
            }
            for edge in parsed.edges().to_vec() {
                sim.add_edge(edge.first, edge.second, edge.weight);
            }
            LoadOutcome::Synced
        } else {
            debug!(graph_id, "replacing graph");
            self.remove_graph(graph_id);
            let new_id = self.add_graph(parsed, DEFAULT_GRAPH_CENTER, DEFAULT_GRAPH_RADIUS);
            LoadOutcome::Replaced(new_id)
        }
    }

    /// One simulation step. Forces are accumulated for every point from
    /// start-of-tick positions, then integrated, so in-tick movement never
    /// feeds back into the same tick's forces.
    pub fn tick(&mut self, dt: f32) {
        if !self.physics_enabled {
            return;
        }

        let cell_size = self.config.cell_size;
        let mut forces = self
            .graphs
            .iter()
            .map(|sim| vec![Vec2::ZERO; sim.positions.len()])
            .collect::<Vec<_>>();

        for (graph_id, sim) in self.graphs.iter().enumerate() {
            let n = sim.positions.len();
            for node in 0..n {
                let point = sim.positions[node];
                let mut force = Vec2::ZERO;

                for other in 0..n {
                    if other == node || !sim.graph.connection(node, other).connected {
                        continue;
                    }
                    force += self.force_law.compute(
                        sim.positions[other] - point,
                        cell_size,
                        ForceKind::ConnectedNode,
                    );
                }

                let this = PointLink { graph: graph_id, node };
                for link in self.grid.neighbors(self.grid.cell_of(point)) {
                    if link == this {
                        continue;
                    }
                    if link.graph == graph_id
                        && sim.graph.connection(node, link.node).connected
                    {
                        continue;
                    }
                    let other_point = self.graphs[link.graph].positions[link.node];
                    force +=
                        self.force_law
                            .compute(other_point - point, cell_size, ForceKind::Node);
                }

                if self.config.bound_forces {
                    let bounds = self.config.bounds;
                    force += self.force_law.compute(
                        vec2(point.x, 0.0),
                        cell_size,
                        ForceKind::LeftBound,
                    ) + self.force_law.compute(
                        vec2(point.x - bounds.x, 0.0),
                        cell_size,
                        ForceKind::RightBound,
                    ) + self.force_law.compute(
                        vec2(0.0, point.y),
                        cell_size,
                        ForceKind::UpBound,
                    ) + self.force_law.compute(
                        vec2(0.0, point.y - bounds.y),
                        cell_size,
                        ForceKind::DownBound,
                    );
                }

                forces[graph_id][node] = force;
            }
        }

        for (graph_id, sim) in self.graphs.iter_mut().enumerate() {
            for node in 0..sim.positions.len() {
                let old_cell = self.grid.cell_of(sim.positions[node]);

                let mut velocity = sim.velocities[node] + forces[graph_id][node] * dt;
                velocity *= DAMPING;
                let speed = velocity.length();
                if speed > MAX_SPEED {
                    velocity *= MAX_SPEED / speed;
                }
                if speed < SLEEP_SPEED {
                    velocity = Vec2::ZERO;
                }
                sim.velocities[node] = velocity;
                sim.positions[node] += velocity * dt;

                self.grid.relocate(
                    old_cell,
                    PointLink { graph: graph_id, node },
                    sim.positions[node],
                );
            }
        }
    }

    /// External drag support.
    pub fn set_node_position(&mut self, graph_id: usize, node: usize, position: Vec2) {
        let sim = &mut self.graphs[graph_id];
        let old_cell = self.grid.cell_of(sim.positions[node]);
        sim.positions[node] = position;
        self.grid
            .relocate(old_cell, PointLink { graph: graph_id, node }, position);
    }

    pub fn node_distance(&self, graph_id: usize, a: usize, b: usize) -> f32 {
        let sim = &self.graphs[graph_id];
        sim.positions[a].distance(sim.positions[b])
    }

    pub fn select_node(&mut self, graph_id: usize, node: usize, color: Color) {
        self.graphs[graph_id].node_selection[node] = Selection {
            selected: true,
            color,
        };
    }

    pub fn deselect_node(&mut self, graph_id: usize, node: usize) {
        self.graphs[graph_id].node_selection[node].selected = false;
    }

    /// Returns the new selection state.
    pub fn toggle_node_selection(&mut self, graph_id: usize, node: usize, color: Color) -> bool {
        let selection = &mut self.graphs[graph_id].node_selection[node];
        if selection.selected {
            selection.selected = false;
        } else {
            *selection = Selection {
                selected: true,
                color,
            };
        }
        selection.selected
    }

    pub fn deselect_all_nodes(&mut self, graph_id: usize) {
        for selection in &mut self.graphs[graph_id].node_selection {
            selection.selected = false;
        }
    }

    pub fn select_edge(&mut self, graph_id: usize, edge_id: usize, color: Color) {
        self.graphs[graph_id].edge_selection[edge_id] = Selection {
            selected: true,
            color,
        };
    }

    /// Tolerant variant: selecting an edge that does not exist is a no-op.
    pub fn select_edge_between(&mut self, graph_id: usize, a: usize, b: usize, color: Color) {
        if let Some(edge_id) = self.graphs[graph_id].graph.edge_id(a, b) {
            self.select_edge(graph_id, edge_id, color);
        }
    }

    pub fn deselect_edge(&mut self, graph_id: usize, edge_id: usize) {
        self.graphs[graph_id].edge_selection[edge_id].selected = false;
    }

    pub fn toggle_edge_selection(&mut self, graph_id: usize, edge_id: usize, color: Color) -> bool {
        let selection = &mut self.graphs[graph_id].edge_selection[edge_id];
        if selection.selected {
            selection.selected = false;
        } else {
            *selection = Selection {
                selected: true,
                color,
            };
        }
        selection.selected
    }

    pub fn deselect_all_edges(&mut self, graph_id: usize) {
        for selection in &mut self.graphs[graph_id].edge_selection {
            selection.selected = false;
        }
    }

    pub fn annotate_edge(&mut self, graph_id: usize, edge_id: usize, text: String) {
        self.graphs[graph_id].edge_annotations[edge_id] = text;
    }

    pub fn annotate_edge_between(&mut self, graph_id: usize, a: usize, b: usize, text: String) {
        if let Some(edge_id) = self.graphs[graph_id].graph.edge_id(a, b) {
            self.annotate_edge(graph_id, edge_id, text);
        }
    }

    pub fn clear_annotations(&mut self, graph_id: usize) {
        for annotation in &mut self.graphs[graph_id].edge_annotations {
            annotation.clear();
        }
    }

    pub fn set_physics_enabled(&mut self, enabled: bool) {
        self.physics_enabled = enabled && !self.playback_lock;
    }

    /// Locking switches physics off so a step trace's node correspondence
    /// cannot drift while the user scrubs. Unlocking does not switch it back
    /// on.
    pub fn set_playback_lock(&mut self, locked: bool) {
        self.playback_lock = locked;
        if locked {
            self.physics_enabled = false;
        }
    }

    pub fn playback_lock(&self) -> bool {
        self.playback_lock
    }
}
