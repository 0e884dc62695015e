use std::collections::VecDeque;

use super::StepTrace;
use crate::field::{Field, SELECT_BLUE};

pub struct MaxFlowResult {
    pub max_flow: i32,
    /// Residual capacities after the run, seeded with `cost()` in both
    /// directions of every connected pair.
    pub residual: Vec<Vec<i32>>,
}

/// Edmonds-Karp flavored Ford-Fulkerson: BFS augmenting paths on a dense
/// residual matrix. One step per augmenting path; the path's edges light
/// up while the step is within the replay window.
pub(crate) fn ford_fulkerson(
    field: &mut Field,
    graph_id: usize,
    source: usize,
    sink: usize,
    trace: &mut StepTrace,
) -> MaxFlowResult {
    let n = field.graph(graph_id).graph().node_count();
    let mut residual = vec![vec![0i32; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let connection = field.graph(graph_id).graph().connection(i, j);
            if connection.connected {
                residual[i][j] = connection.cost();
                residual[j][i] = connection.cost();
            }
        }
    }

    let mut max_flow = 0;
    if source == sink {
        return MaxFlowResult { max_flow, residual };
    }

    while let Some(path) = augmenting_path(&residual, source, sink) {
        let bottleneck = path
            .windows(2)
            .map(|w| residual[w[0]][w[1]])
            .min()
            .unwrap_or(0);
        for window in path.windows(2) {
            residual[window[0]][window[1]] -= bottleneck;
            residual[window[1]][window[0]] += bottleneck;
        }
        max_flow += bottleneck;

        if trace.record() {
            for window in path.windows(2) {
                field.select_edge_between(graph_id, window[0], window[1], SELECT_BLUE);
            }
        }
    }

    MaxFlowResult { max_flow, residual }
}

fn augmenting_path(residual: &[Vec<i32>], source: usize, sink: usize) -> Option<Vec<usize>> {
    let n = residual.len();
    let mut prev = vec![usize::MAX; n];
    let mut visited = vec![false; n];
    let mut queue = VecDeque::new();

    visited[source] = true;
    queue.push_back(source);
    while let Some(node) = queue.pop_front() {
        if node == sink {
            break;
        }
        for next in 0..n {
            if !visited[next] && residual[node][next] > 0 {
                visited[next] = true;
                prev[next] = node;
                queue.push_back(next);
            }
        }
    }

    if !visited[sink] {
        return None;
    }
    let mut path = vec![sink];
    let mut node = sink;
    while node != source {
        node = prev[node];
        path.push(node);
    }
    path.reverse();
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{DEFAULT_GRAPH_CENTER, DEFAULT_GRAPH_RADIUS, FieldConfig};
    use crate::graph::Graph;

    fn field_with(text: &str) -> Field {
        let mut field = Field::new(FieldConfig::default());
        let graph = Graph::from_edge_list_text(text).expect("valid edge list");
        field.add_graph(graph, DEFAULT_GRAPH_CENTER, DEFAULT_GRAPH_RADIUS);
        field
    }

    #[test]
    fn saturates_a_triangle() {
        let mut field = field_with("0 1 3\n1 2 2\n0 2 1\n");
        let result = ford_fulkerson(&mut field, 0, 0, 2, &mut StepTrace::unlimited());
        assert_eq!(result.max_flow, 3);
    }

    #[test]
    fn residual_matrix_encodes_the_net_flow() {
        let mut field = field_with("0 1 3\n1 2 2\n0 2 1\n");
        let result = ford_fulkerson(&mut field, 0, 0, 2, &mut StepTrace::unlimited());

        let flow =
            |i: usize, j: usize| (result.residual[j][i] - result.residual[i][j]).abs() / 2;
        assert_eq!(flow(0, 1), 2);
        assert_eq!(flow(1, 2), 2);
        assert_eq!(flow(0, 2), 1);
    }

    #[test]
    fn disconnected_sink_means_zero_flow() {
        let mut field = field_with("0 1 3\n2 3 1\n");
        let result = ford_fulkerson(&mut field, 0, 0, 3, &mut StepTrace::unlimited());
        assert_eq!(result.max_flow, 0);
    }

    #[test]
    fn source_equal_to_sink_is_a_guarded_no_op() {
        let mut field = field_with("0 1 3\n1 2 2\n");
        let result = ford_fulkerson(&mut field, 0, 1, 1, &mut StepTrace::unlimited());
        assert_eq!(result.max_flow, 0);
        // Residual still carries the seeded capacities.
        assert_eq!(result.residual[0][1], 3);
    }

    #[test]
    fn one_step_per_augmenting_path() {
        let mut field = field_with("0 1 3\n1 2 2\n0 2 1\n");
        let mut trace = StepTrace::unlimited();
        ford_fulkerson(&mut field, 0, 0, 2, &mut trace);
        // Two disjoint-ish routes from 0 to 2: through 1 and direct.
        assert_eq!(trace.total(), 2);
    }
}
