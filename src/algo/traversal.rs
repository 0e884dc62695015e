use std::collections::VecDeque;

use super::StepTrace;
use crate::field::{Field, SELECT_YELLOW};

/// Breadth-first traversal from `start`. One step per first visit; the
/// visited node and its discovery edge light up while the step is within
/// the replay window. Returns the visit order.
pub(crate) fn bfs(
    field: &mut Field,
    graph_id: usize,
    start: usize,
    trace: &mut StepTrace,
) -> Vec<usize> {
    let n = field.graph(graph_id).graph().node_count();
    if start >= n {
        return Vec::new();
    }

    let mut visited = vec![false; n];
    let mut order = Vec::new();
    let mut queue = VecDeque::new();

    visited[start] = true;
    queue.push_back((start, None));

    while let Some((node, discovered_from)) = queue.pop_front() {
        order.push(node);
        if trace.record() {
            field.select_node(graph_id, node, SELECT_YELLOW);
            if let Some(parent) = discovered_from {
                field.select_edge_between(graph_id, parent, node, SELECT_YELLOW);
            }
        }

        for next in 0..n {
            if visited[next] || !field.graph(graph_id).graph().connection(node, next).connected {
                continue;
            }
            visited[next] = true;
            queue.push_back((next, Some(node)));
        }
    }
    order
}

/// Depth-first traversal from `start`, iterative. Neighbors are pushed in
/// reverse so lower-numbered nodes are explored first.
pub(crate) fn dfs(
    field: &mut Field,
    graph_id: usize,
    start: usize,
    trace: &mut StepTrace,
) -> Vec<usize> {
    let n = field.graph(graph_id).graph().node_count();
    if start >= n {
        return Vec::new();
    }

    let mut visited = vec![false; n];
    let mut order = Vec::new();
    let mut stack = vec![(start, None)];

    while let Some((node, discovered_from)) = stack.pop() {
        if visited[node] {
            continue;
        }
        visited[node] = true;
        order.push(node);
        if trace.record() {
            field.select_node(graph_id, node, SELECT_YELLOW);
            if let Some(parent) = discovered_from {
                field.select_edge_between(graph_id, parent, node, SELECT_YELLOW);
            }
        }

        for next in (0..n).rev() {
            if !visited[next] && field.graph(graph_id).graph().connection(node, next).connected {
                stack.push((next, Some(node)));
            }
        }
    }
    order
}
