use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod sparse;

pub use sparse::{SparseGraph, SparseGraphView};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no edge definitions found")]
    NoEdges,
    #[error("missing or malformed `<n> <m>` header line")]
    Header,
    #[error("malformed coordinate line for node {0}")]
    Coordinate(usize),
}

/// One cell of the adjacency matrix. The weight is meaningless while
/// `connected` is false.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub weight: i32,
    pub connected: bool,
}

impl Connection {
    pub fn new(weight: i32) -> Self {
        Self {
            weight,
            connected: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// Pathfinding cost. A connected cell can carry weight 0 ("no info"),
    /// which counts as 1 here.
    pub fn cost(self) -> i32 {
        self.weight.max(1)
    }
}

/// A normalized undirected edge: `first <= second` always holds, so a
/// reversed duplicate compares and hashes equal to the original.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Edge {
    pub first: usize,
    pub second: usize,
    pub weight: i32,
}

impl Edge {
    pub fn new(a: usize, b: usize, weight: i32) -> Self {
        Self {
            first: a.min(b),
            second: a.max(b),
            weight,
        }
    }

    pub fn unweighted(a: usize, b: usize) -> Self {
        Self::new(a, b, 1)
    }

    fn key(self) -> (usize, usize) {
        (self.first, self.second)
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Edge {}

impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Dense adjacency-matrix graph with a parallel edge list. Both
/// representations are kept in sync by `add_edge`/`remove_edge`.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    connections: Vec<Vec<Connection>>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new(node_count: usize) -> Self {
        Self {
            connections: vec![vec![Connection::none(); node_count]; node_count],
            edges: Vec::new(),
        }
    }

    pub fn from_edges(node_count: usize, edges: Vec<Edge>) -> Self {
        let mut graph = Self::new(node_count);
        for edge in &edges {
            graph.connections[edge.first][edge.second] = Connection::new(edge.weight);
            graph.connections[edge.second][edge.first] = Connection::new(edge.weight);
        }
        graph.edges = edges;
        graph
    }

    pub fn node_count(&self) -> usize {
        self.connections.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn connection(&self, a: usize, b: usize) -> Connection {
        self.connections[a][b]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn add_edge(&mut self, from: usize, to: usize, weight: i32) {
        let edge = Edge::new(from, to, weight);
        self.connections[edge.first][edge.second] = Connection::new(weight);
        self.connections[edge.second][edge.first] = Connection::new(weight);
        self.edges.push(edge);
    }

    /// Removes the matrix entry and erases the edge from the list. Edge ids
    /// after `edge_id` shift down; callers removing several edges must go
    /// back-to-front or re-resolve ids between removals.
    pub fn remove_edge(&mut self, edge_id: usize) {
        let edge = self.edges.remove(edge_id);
        self.connections[edge.first][edge.second].connected = false;
        self.connections[edge.second][edge.first].connected = false;
    }

    pub fn edge_id(&self, from: usize, to: usize) -> Option<usize> {
        let probe = Edge::unweighted(from, to);
        self.edges.iter().position(|edge| *edge == probe)
    }

    /// True when every edge of `other` is present here and `other` is not
    /// the larger graph.
    pub fn includes(&self, other: &Graph) -> bool {
        if other.node_count() > self.node_count() {
            return false;
        }

        let mine = self.edges.iter().collect::<BTreeSet<_>>();
        other.edges.iter().all(|edge| mine.contains(edge))
    }

    pub fn info_string(&self) -> String {
        format!("Graph(n={}; m={})", self.node_count(), self.edge_count())
    }

    /// Parses the plain edge-list format: one `<from> <to> [<weight>]` line
    /// per edge, weight defaulting to 1. Lines that are not edge triples are
    /// skipped; repeated pairs collapse keeping the first weight seen. Fails
    /// only when no valid edge line is found.
    pub fn from_edge_list_text(text: &str) -> Result<Self, ParseError> {
        let (node_count, edges) = collect_edge_lines(text.lines())?;
        Ok(Self::from_edges(node_count, edges))
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for edge in &self.edges {
            writeln!(f, "{} {} {}", edge.first, edge.second, edge.weight)?;
        }
        Ok(())
    }
}

pub(crate) fn parse_edge_line(line: &str) -> Option<Edge> {
    let mut tokens = line.split_whitespace();
    let first = tokens.next()?.parse::<usize>().ok()?;
    let second = tokens.next()?.parse::<usize>().ok()?;
    let weight = match tokens.next() {
        Some(token) => {
            let weight = token.parse::<u32>().ok()?;
            i32::try_from(weight).ok()?
        }
        None => 1,
    };
    if tokens.next().is_some() {
        return None;
    }
    Some(Edge::new(first, second, weight))
}

pub(crate) fn collect_edge_lines<'a>(
    lines: impl Iterator<Item = &'a str>,
) -> Result<(usize, Vec<Edge>), ParseError> {
    let mut edges = BTreeSet::new();
    let mut max_node = None;

    for line in lines {
        let Some(edge) = parse_edge_line(line) else {
            continue;
        };
        max_node = Some(max_node.unwrap_or(0).max(edge.second));
        edges.insert(edge);
    }

    let Some(max_node) = max_node else {
        return Err(ParseError::NoEdges);
    };
    Ok((max_node + 1, edges.into_iter().collect()))
}
