//! The algorithms engine. Every algorithm reports its expansion events
//! through a [`StepTrace`]; step playback truncates the trace and replays
//! the whole run, so scrubbing is a re-execution, never a resumption.

use thiserror::Error;
use tracing::debug;

use crate::field::{Field, SELECT_GREEN, SELECT_RED};
use crate::graph::SparseGraphView;

mod bidirectional;
mod max_flow;
mod mst;
mod shortest_path;
mod traversal;

pub use bidirectional::BidirectionalResult;
pub use max_flow::MaxFlowResult;
pub use shortest_path::AStarResult;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("incorrect input data")]
    IncorrectInput,
    #[error("algorithm needs a loaded coordinate graph")]
    MissingSparseView,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    Bfs,
    Dfs,
    PrimsMst,
    Dijkstra,
    AStar,
    FordFulkerson,
    BidirectionalDijkstra,
    BidirectionalAStar,
}

impl Algorithm {
    pub const ALL: [Algorithm; 8] = [
        Algorithm::Bfs,
        Algorithm::Dfs,
        Algorithm::PrimsMst,
        Algorithm::Dijkstra,
        Algorithm::AStar,
        Algorithm::FordFulkerson,
        Algorithm::BidirectionalDijkstra,
        Algorithm::BidirectionalAStar,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Algorithm::Bfs => "BFS",
            Algorithm::Dfs => "DFS",
            Algorithm::PrimsMst => "Prim's min tree",
            Algorithm::Dijkstra => "Dijkstra's min path",
            Algorithm::AStar => "A* min path",
            Algorithm::FordFulkerson => "FordFulkerson max flow",
            Algorithm::BidirectionalDijkstra => "Bidirect Dijkstra's min path",
            Algorithm::BidirectionalAStar => "Bidirect A* min path",
        }
    }

    pub fn needs_endpoints(self) -> bool {
        !matches!(
            self,
            Algorithm::Bfs | Algorithm::Dfs | Algorithm::PrimsMst
        )
    }

    pub fn uses_sparse_view(self) -> bool {
        matches!(
            self,
            Algorithm::BidirectionalDijkstra | Algorithm::BidirectionalAStar
        )
    }
}

/// Counts expansion events and reports, per event, whether its side effects
/// are still within the replay window.
#[derive(Clone, Copy, Debug)]
pub struct StepTrace {
    limit: Option<usize>,
    taken: usize,
}

impl StepTrace {
    pub fn unlimited() -> Self {
        Self {
            limit: None,
            taken: 0,
        }
    }

    pub fn limited(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            taken: 0,
        }
    }

    /// Registers one expansion event. True while the event falls inside the
    /// replay window.
    pub fn record(&mut self) -> bool {
        let within = self.limit.is_none_or(|limit| self.taken < limit);
        self.taken += 1;
        within
    }

    pub fn total(&self) -> usize {
        self.taken
    }

    pub fn truncated(&self) -> bool {
        self.limit.is_some_and(|limit| self.taken > limit)
    }
}

/// Scrub state for stepped playback. `max_steps` is refreshed after every
/// execution; a cursor of `None` means "show everything".
#[derive(Clone, Copy, Debug, Default)]
pub struct Playback {
    show_steps: bool,
    max_steps: usize,
    cursor: Option<usize>,
}

impl Playback {
    pub fn show_steps(&self) -> bool {
        self.show_steps
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn cursor(&self) -> usize {
        self.cursor.unwrap_or(self.max_steps)
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = Some(cursor.min(self.max_steps));
    }

    pub fn step_forward(&mut self) {
        self.set_cursor(self.cursor() + 1);
    }

    pub fn step_back(&mut self) {
        self.set_cursor(self.cursor().saturating_sub(1));
    }

    pub fn reset(&mut self) {
        *self = Playback::default();
    }

    /// A cursor that was never scrubbed means "show everything", so the
    /// first stepped run after enabling step display is not truncated.
    fn trace(&self) -> StepTrace {
        match self.cursor {
            Some(cursor) if self.show_steps => StepTrace::limited(cursor),
            _ => StepTrace::unlimited(),
        }
    }
}

/// Owns the playback state and the diagnostic log, and drives algorithm
/// execution against a field (and optionally a sparse view).
#[derive(Debug, Default)]
pub struct Runner {
    pub playback: Playback,
    log: String,
}

impl Runner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &str {
        &self.log
    }

    /// Enabling step display locks the field so the layout the user scrubs
    /// over cannot drift; the lock lifts when stepping is turned off.
    pub fn set_show_steps(&mut self, field: &mut Field, enabled: bool) {
        self.playback.show_steps = enabled;
        field.set_playback_lock(enabled);
    }

    pub fn reset(&mut self, field: &mut Field) {
        self.playback.reset();
        self.log.clear();
        field.set_playback_lock(false);
    }

    /// Runs `algorithm` under the current playback window. Selections,
    /// annotations, and the log are cleared up front; endpoint text is
    /// validated before anything is dispatched.
    pub fn execute(
        &mut self,
        field: &mut Field,
        graph_id: usize,
        mut view: Option<&mut SparseGraphView>,
        algorithm: Algorithm,
        from_text: &str,
        to_text: &str,
    ) -> Result<(), InputError> {
        field.deselect_all_nodes(graph_id);
        field.deselect_all_edges(graph_id);
        field.clear_annotations(graph_id);
        if let Some(view) = view.as_deref_mut() {
            view.clear_selection();
        }
        self.log.clear();

        let node_count = if algorithm.uses_sparse_view() {
            view.as_deref()
                .ok_or(InputError::MissingSparseView)?
                .graph
                .node_count()
        } else {
            field.graph(graph_id).graph().node_count()
        };

        let (from, to) = if algorithm.needs_endpoints() {
            (
                parse_endpoint(from_text, node_count)?,
                parse_endpoint(to_text, node_count)?,
            )
        } else {
            (0, 0)
        };

        debug!(algorithm = algorithm.label(), from, to, "executing");
        let mut trace = self.playback.trace();

        match algorithm {
            Algorithm::Bfs => {
                traversal::bfs(field, graph_id, 0, &mut trace);
            }
            Algorithm::Dfs => {
                traversal::dfs(field, graph_id, 0, &mut trace);
            }
            Algorithm::PrimsMst => {
                mst::prims_mst(field, graph_id, &mut trace);
            }
            Algorithm::Dijkstra => {
                shortest_path::dijkstra_path(field, graph_id, from, to, &mut trace);
            }
            Algorithm::AStar => {
                let result = shortest_path::astar_path(field, graph_id, from, to, &mut trace);
                self.log.push_str("The checked nodes:\n");
                for node in &result.checked {
                    self.log.push_str(&format!("{node}\n"));
                }
            }
            Algorithm::FordFulkerson => {
                let result = max_flow::ford_fulkerson(field, graph_id, from, to, &mut trace);
                self.log = format!("The maximum flow: {}", result.max_flow);
                field.select_node(graph_id, from, SELECT_RED);
                field.select_node(graph_id, to, SELECT_GREEN);
                if !trace.truncated() {
                    annotate_flow(field, graph_id, &result.residual);
                }
            }
            Algorithm::BidirectionalDijkstra | Algorithm::BidirectionalAStar => {
                let view = view.ok_or(InputError::MissingSparseView)?;
                let result = match algorithm {
                    Algorithm::BidirectionalDijkstra => {
                        bidirectional::bidirectional_dijkstra(&view.graph, from, to, &mut trace)
                    }
                    _ => bidirectional::bidirectional_astar(view, from, to, &mut trace),
                };
                for &node in &result.checked {
                    view.set_node_selection(node, true);
                }
                self.log = format!(
                    "Checked nodes: {}\nThe path distance: {}",
                    result.checked.len(),
                    result.distance
                );
                view.set_current_path(result.path);
            }
        }

        self.playback.max_steps = trace.total();
        if let Some(cursor) = self.playback.cursor {
            self.playback.cursor = Some(cursor.min(self.playback.max_steps));
        }
        Ok(())
    }
}

/// Labels every edge `"<capacity>/<flow>"`. The residual matrix is seeded
/// symmetrically, so the difference across an edge is twice the net flow.
fn annotate_flow(field: &mut Field, graph_id: usize, residual: &[Vec<i32>]) {
    let annotations = field
        .graph(graph_id)
        .graph()
        .edges()
        .iter()
        .enumerate()
        .map(|(edge_id, edge)| {
            let flow = (residual[edge.second][edge.first] - residual[edge.first][edge.second])
                .abs()
                / 2;
            (edge_id, format!("{}/{}", edge.weight.max(1), flow))
        })
        .collect::<Vec<_>>();
    for (edge_id, text) in annotations {
        field.annotate_edge(graph_id, edge_id, text);
    }
}

pub(crate) fn parse_endpoint(text: &str, node_count: usize) -> Result<usize, InputError> {
    let node = text
        .trim()
        .parse::<usize>()
        .map_err(|_| InputError::IncorrectInput)?;
    if node >= node_count {
        return Err(InputError::IncorrectInput);
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{DEFAULT_GRAPH_CENTER, DEFAULT_GRAPH_RADIUS, FieldConfig};
    use crate::graph::{Graph, SparseGraph};

    fn field_with(text: &str) -> Field {
        let mut field = Field::new(FieldConfig::default());
        let graph = Graph::from_edge_list_text(text).expect("valid edge list");
        field.add_graph(graph, DEFAULT_GRAPH_CENTER, DEFAULT_GRAPH_RADIUS);
        field
    }

    #[test]
    fn bidirectional_distance_matches_single_source_dijkstra() {
        let text = "0 1 2\n1 2 2\n2 3 2\n0 3 7\n1 3 9\n";
        let mut field = field_with(text);
        let path =
            shortest_path::dijkstra_path(&mut field, 0, 0, 3, &mut StepTrace::unlimited());
        let graph = field.graph(0).graph();
        let weight: i64 = path
            .windows(2)
            .map(|w| graph.connection(w[0], w[1]).cost() as i64)
            .sum();
        assert!(weight > 0);

        let sparse = SparseGraph::from_edge_list_text(text).expect("valid edge list");
        let result =
            bidirectional::bidirectional_dijkstra(&sparse, 0, 3, &mut StepTrace::unlimited());
        assert_eq!(result.distance, weight);
    }

    #[test]
    fn first_stepped_run_is_not_truncated() {
        let mut field = field_with("0 1\n1 2\n");
        let mut runner = Runner::new();
        runner.set_show_steps(&mut field, true);
        runner
            .execute(&mut field, 0, None, Algorithm::Bfs, "", "")
            .expect("valid input");

        let selected = |field: &Field| {
            field
                .graph(0)
                .node_selection()
                .iter()
                .filter(|s| s.selected)
                .count()
        };
        assert_eq!(selected(&field), 3);
        assert_eq!(runner.playback.max_steps(), 3);

        // Scrubbing afterwards still truncates the replay.
        runner.playback.set_cursor(1);
        runner
            .execute(&mut field, 0, None, Algorithm::Bfs, "", "")
            .expect("valid input");
        assert_eq!(selected(&field), 1);
    }

    #[test]
    fn step_trace_counts_past_its_limit() {
        let mut trace = StepTrace::limited(2);
        assert!(trace.record());
        assert!(trace.record());
        assert!(!trace.record());
        assert_eq!(trace.total(), 3);
        assert!(trace.truncated());

        let mut trace = StepTrace::unlimited();
        for _ in 0..5 {
            assert!(trace.record());
        }
        assert!(!trace.truncated());
    }

    #[test]
    fn playback_cursor_defaults_to_the_end() {
        let mut playback = Playback {
            max_steps: 7,
            ..Playback::default()
        };
        assert_eq!(playback.cursor(), 7);

        playback.set_cursor(3);
        playback.step_forward();
        assert_eq!(playback.cursor(), 4);
        playback.step_back();
        playback.step_back();
        assert_eq!(playback.cursor(), 2);

        playback.set_cursor(99);
        assert_eq!(playback.cursor(), 7);
    }

    #[test]
    fn endpoint_text_is_validated_before_dispatch() {
        assert_eq!(parse_endpoint(" 3 ", 5), Ok(3));
        assert_eq!(parse_endpoint("abc", 5), Err(InputError::IncorrectInput));
        assert_eq!(parse_endpoint("5", 5), Err(InputError::IncorrectInput));
        assert_eq!(parse_endpoint("-1", 5), Err(InputError::IncorrectInput));
    }

    #[test]
    fn algorithm_metadata_is_consistent() {
        for algorithm in Algorithm::ALL {
            if algorithm.uses_sparse_view() {
                assert!(algorithm.needs_endpoints());
            }
        }
        assert!(!Algorithm::Bfs.needs_endpoints());
        assert!(Algorithm::Dijkstra.needs_endpoints());
        assert!(Algorithm::BidirectionalAStar.uses_sparse_view());
    }
}
