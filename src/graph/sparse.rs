use std::collections::BTreeMap;
use std::fmt;

use glam::{Vec2, vec2};

use super::{Connection, Edge, ParseError, collect_edge_lines, parse_edge_line};

/// Edge-map representation for graphs where an adjacency matrix would be
/// wasteful. Keys are normalized `(first, second)` pairs.
#[derive(Clone, Debug, Default)]
pub struct SparseGraph {
    node_count: usize,
    edge_count: usize,
    edges: BTreeMap<(usize, usize), Edge>,
}

impl SparseGraph {
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            edge_count: 0,
            edges: BTreeMap::new(),
        }
    }

    pub fn from_edges(node_count: usize, edges: impl IntoIterator<Item = Edge>) -> Self {
        let edges = edges
            .into_iter()
            .map(|edge| ((edge.first, edge.second), edge))
            .collect::<BTreeMap<_, _>>();
        Self {
            node_count,
            edge_count: edges.len(),
            edges,
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_connected(&self, from: usize, to: usize) -> bool {
        self.edges.contains_key(&ordered(from, to))
    }

    pub fn edge(&self, from: usize, to: usize) -> Option<&Edge> {
        self.edges.get(&ordered(from, to))
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// A connected `Connection` inserts or updates the edge; a disconnected
    /// one removes it. Removing an absent edge is a no-op.
    pub fn set_edge(&mut self, from: usize, to: usize, connection: Connection) {
        let key = ordered(from, to);
        if connection.connected {
            match self.edges.entry(key) {
                std::collections::btree_map::Entry::Occupied(mut entry) => {
                    entry.get_mut().weight = connection.weight;
                }
                std::collections::btree_map::Entry::Vacant(entry) => {
                    entry.insert(Edge::new(from, to, connection.weight));
                    self.edge_count += 1;
                }
            }
        } else if self.edges.remove(&key).is_some() {
            self.edge_count -= 1;
        }
    }

    pub fn info_string(&self) -> String {
        format!(
            "SparseGraph(n={}; m={})",
            self.node_count, self.edge_count
        )
    }

    /// Same grammar as [`super::Graph::from_edge_list_text`].
    pub fn from_edge_list_text(text: &str) -> Result<Self, ParseError> {
        let (node_count, edges) = collect_edge_lines(text.lines())?;
        Ok(Self::from_edges(node_count, edges))
    }

    /// Per-node `(neighbor, cost)` lists for the bidirectional searches.
    pub(crate) fn adjacency(&self) -> Vec<Vec<(usize, i32)>> {
        let mut adjacency = vec![Vec::new(); self.node_count];
        for edge in self.edges.values() {
            let cost = edge.weight.max(1);
            adjacency[edge.first].push((edge.second, cost));
            adjacency[edge.second].push((edge.first, cost));
        }
        adjacency
    }
}

impl fmt::Display for SparseGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for edge in self.edges.values() {
            writeln!(f, "{} {} {}", edge.first, edge.second, edge.weight)?;
        }
        Ok(())
    }
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// A sparse graph annotated with planar node coordinates, used by the
/// bidirectional path algorithms and drawn by the (external) UI layer.
#[derive(Clone, Debug, Default)]
pub struct SparseGraphView {
    pub graph: SparseGraph,
    coordinates: Vec<Vec2>,
    bounds: Vec2,
    current_path: Vec<usize>,
    selected_nodes: Vec<bool>,
}

impl SparseGraphView {
    pub const FIRST_NODE_INDEX: usize = 1;

    /// Parses the coordinate-annotated format: a `<n> <m>` header line, then
    /// exactly `n` `<x> <y>` coordinate lines (stored starting at
    /// `first_node_index`), then edge triples in the plain edge-list grammar.
    /// This format is deliberately distinct from the plain edge list; a
    /// caller must know which parser to invoke. Failure leaves the view
    /// untouched.
    pub fn load(&mut self, text: &str, first_node_index: usize) -> Result<(), ParseError> {
        let mut lines = text.lines().filter(|line| !line.trim().is_empty());

        let header = lines.next().ok_or(ParseError::Header)?;
        let (coordinate_count, _edge_count) = parse_pair(header).ok_or(ParseError::Header)?;

        let node_count = first_node_index + coordinate_count;
        let mut coordinates = vec![Vec2::ZERO; node_count];
        let mut bounds = Vec2::ZERO;
        for offset in 0..coordinate_count {
            let node = first_node_index + offset;
            let line = lines.next().ok_or(ParseError::Coordinate(node))?;
            let (x, y) = parse_pair(line).ok_or(ParseError::Coordinate(node))?;
            coordinates[node] = vec2(x as f32, y as f32);
            bounds = bounds.max(coordinates[node]);
        }

        let mut edges = BTreeMap::new();
        for line in lines {
            let Some(edge) = parse_edge_line(line) else {
                continue;
            };
            edges.entry((edge.first, edge.second)).or_insert(edge);
        }

        self.graph = SparseGraph::from_edges(node_count, edges.into_values());
        self.coordinates = coordinates;
        self.bounds = bounds;
        self.current_path = Vec::new();
        self.selected_nodes = vec![false; node_count];
        Ok(())
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn coordinate(&self, node: usize) -> Option<Vec2> {
        self.coordinates.get(node).copied()
    }

    /// Euclidean distance between two node coordinates; zero when either
    /// coordinate is missing, which degrades A* to plain Dijkstra.
    pub fn distance(&self, a: usize, b: usize) -> f32 {
        match (self.coordinates.get(a), self.coordinates.get(b)) {
            (Some(&first), Some(&second)) => first.distance(second),
            _ => 0.0,
        }
    }

    pub fn set_current_path(&mut self, path: Vec<usize>) {
        self.current_path = path;
    }

    pub fn current_path(&self) -> &[usize] {
        &self.current_path
    }

    pub fn set_node_selection(&mut self, node: usize, selected: bool) {
        if let Some(slot) = self.selected_nodes.get_mut(node) {
            *slot = selected;
        }
    }

    pub fn selected_nodes(&self) -> &[bool] {
        &self.selected_nodes
    }

    pub fn clear_selection(&mut self) {
        self.current_path.clear();
        self.selected_nodes.fill(false);
    }
}

fn parse_pair(line: &str) -> Option<(usize, usize)> {
    let mut tokens = line.split_whitespace();
    let first = tokens.next()?.parse::<usize>().ok()?;
    let second = tokens.next()?.parse::<usize>().ok()?;
    if tokens.next().is_some() {
        return None;
    }
    Some((first, second))
}
