use super::StepTrace;
use crate::field::{Field, SELECT_GREEN};

/// Prim's algorithm from node 0, scanning the edge list directly. Each
/// round accepts the first strictly-lightest edge crossing the tree
/// boundary, so the result is deterministic for a fixed edge insertion
/// order. Returns the accepted edge ids; one step per accepted edge.
pub(crate) fn prims_mst(field: &mut Field, graph_id: usize, trace: &mut StepTrace) -> Vec<usize> {
    let n = field.graph(graph_id).graph().node_count();
    if n == 0 {
        return Vec::new();
    }

    let mut in_tree = vec![false; n];
    in_tree[0] = true;
    let mut picked = Vec::new();

    loop {
        let best = {
            let graph = field.graph(graph_id).graph();
            let mut best: Option<(i32, usize)> = None;
            for (edge_id, edge) in graph.edges().iter().enumerate() {
                if in_tree[edge.first] == in_tree[edge.second] {
                    continue;
                }
                if best.is_none_or(|(weight, _)| edge.weight < weight) {
                    best = Some((edge.weight, edge_id));
                }
            }
            best
        };
        let Some((_, edge_id)) = best else {
            break;
        };

        let edge = field.graph(graph_id).graph().edges()[edge_id];
        in_tree[edge.first] = true;
        in_tree[edge.second] = true;
        picked.push(edge_id);

        if trace.record() {
            field.select_edge(graph_id, edge_id, SELECT_GREEN);
            field.select_node(graph_id, edge.first, SELECT_GREEN);
            field.select_node(graph_id, edge.second, SELECT_GREEN);
        }
    }
    picked
}
