use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::StepTrace;
use crate::field::{Field, SELECT_GREEN, SELECT_YELLOW};

/// Single-pair Dijkstra over `Connection::cost()` weights. One step per
/// settled node; the settled node lights up yellow. When the trace is not
/// truncated the final path is highlighted green. Unreachable targets
/// yield an empty path.
pub(crate) fn dijkstra_path(
    field: &mut Field,
    graph_id: usize,
    from: usize,
    to: usize,
    trace: &mut StepTrace,
) -> Vec<usize> {
    let n = field.graph(graph_id).graph().node_count();
    let mut dist = vec![i64::MAX; n];
    let mut prev = vec![usize::MAX; n];
    let mut settled = vec![false; n];
    let mut heap = BinaryHeap::new();

    dist[from] = 0;
    heap.push(Reverse((0i64, from)));

    while let Some(Reverse((d, node))) = heap.pop() {
        if settled[node] {
            continue;
        }
        settled[node] = true;
        if trace.record() {
            field.select_node(graph_id, node, SELECT_YELLOW);
        }
        if node == to {
            break;
        }

        for next in 0..n {
            let connection = field.graph(graph_id).graph().connection(node, next);
            if next == node || !connection.connected || settled[next] {
                continue;
            }
            let candidate = d + connection.cost() as i64;
            if candidate < dist[next] {
                dist[next] = candidate;
                prev[next] = node;
                heap.push(Reverse((candidate, next)));
            }
        }
    }

    if dist[to] == i64::MAX {
        return Vec::new();
    }
    let path = rebuild_path(&prev, from, to);
    if !trace.truncated() {
        highlight_path(field, graph_id, &path);
    }
    path
}

pub struct AStarResult {
    pub path: Vec<usize>,
    pub checked: Vec<usize>,
}

#[derive(Clone, Copy)]
struct QueueEntry {
    priority: f32,
    node: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then(self.node.cmp(&other.node))
    }
}

/// Geometric A*: both the edge costs and the heuristic are Euclidean
/// distances between the simulated node positions, so the answer depends
/// on the current layout. Records every dequeued node as checked.
pub(crate) fn astar_path(
    field: &mut Field,
    graph_id: usize,
    from: usize,
    to: usize,
    trace: &mut StepTrace,
) -> AStarResult {
    let n = field.graph(graph_id).graph().node_count();
    let mut best_cost = vec![f32::INFINITY; n];
    let mut prev = vec![usize::MAX; n];
    let mut settled = vec![false; n];
    let mut checked = Vec::new();
    let mut heap = BinaryHeap::new();

    best_cost[from] = 0.0;
    heap.push(Reverse(QueueEntry {
        priority: field.node_distance(graph_id, from, to),
        node: from,
    }));

    while let Some(Reverse(QueueEntry { node, .. })) = heap.pop() {
        if settled[node] {
            continue;
        }
        settled[node] = true;
        checked.push(node);
        if trace.record() {
            field.select_node(graph_id, node, SELECT_YELLOW);
        }
        if node == to {
            break;
        }

        for next in 0..n {
            if next == node
                || settled[next]
                || !field.graph(graph_id).graph().connection(node, next).connected
            {
                continue;
            }
            let candidate = best_cost[node] + field.node_distance(graph_id, node, next);
            if candidate < best_cost[next] {
                best_cost[next] = candidate;
                prev[next] = node;
                heap.push(Reverse(QueueEntry {
                    priority: candidate + field.node_distance(graph_id, next, to),
                    node: next,
                }));
            }
        }
    }

    let path = if best_cost[to].is_finite() {
        let path = rebuild_path(&prev, from, to);
        if !trace.truncated() {
            highlight_path(field, graph_id, &path);
        }
        path
    } else {
        Vec::new()
    };
    AStarResult { path, checked }
}

fn rebuild_path(prev: &[usize], from: usize, to: usize) -> Vec<usize> {
    let mut path = vec![to];
    let mut node = to;
    while node != from {
        node = prev[node];
        path.push(node);
    }
    path.reverse();
    path
}

fn highlight_path(field: &mut Field, graph_id: usize, path: &[usize]) {
    for window in path.windows(2) {
        field.select_edge_between(graph_id, window[0], window[1], SELECT_GREEN);
    }
    for &node in path {
        field.select_node(graph_id, node, SELECT_GREEN);
    }
}
