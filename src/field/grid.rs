use std::collections::HashMap;

use glam::Vec2;

/// Identifies one simulated point: graph `graph` in the field, node `node`
/// within that graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointLink {
    pub graph: usize,
    pub node: usize,
}

pub type Cell = (i32, i32);

const NEIGHBORHOOD: [(i32, i32); 9] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 0),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Uniform spatial hash over square cells. Each occupied cell holds the
/// links of the points currently inside it; empty buckets are dropped.
#[derive(Debug, Default)]
pub struct Grid {
    cell_size: f32,
    cells: HashMap<Cell, Vec<PointLink>>,
}

impl Grid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cell_of(&self, position: Vec2) -> Cell {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    pub fn insert(&mut self, link: PointLink, position: Vec2) -> Cell {
        let cell = self.cell_of(position);
        self.cells.entry(cell).or_default().push(link);
        cell
    }

    /// Idempotent: removing a link that is not in `cell` does nothing.
    pub fn remove(&mut self, cell: Cell, link: PointLink) {
        let Some(bucket) = self.cells.get_mut(&cell) else {
            return;
        };
        if let Some(index) = bucket.iter().position(|entry| *entry == link) {
            bucket.swap_remove(index);
        }
        if bucket.is_empty() {
            self.cells.remove(&cell);
        }
    }

    /// Moves `link` to the cell containing `position` and returns that cell.
    pub fn relocate(&mut self, old_cell: Cell, link: PointLink, position: Vec2) -> Cell {
        let new_cell = self.cell_of(position);
        if new_cell != old_cell {
            self.remove(old_cell, link);
            self.cells.entry(new_cell).or_default().push(link);
        }
        new_cell
    }

    /// Every link in the 3x3 block of cells around `cell`, the cell itself
    /// included.
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = PointLink> + '_ {
        NEIGHBORHOOD
            .iter()
            .filter_map(move |(dx, dy)| self.cells.get(&(cell.0 + dx, cell.1 + dy)))
            .flatten()
            .copied()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, cell: Cell, link: PointLink) -> bool {
        self.cells
            .get(&cell)
            .is_some_and(|bucket| bucket.contains(&link))
    }

    #[cfg(test)]
    pub(crate) fn link_count(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    #[cfg(test)]
    pub(crate) fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;

    fn link(node: usize) -> PointLink {
        PointLink { graph: 0, node }
    }

    #[test]
    fn cell_indexing_floors_both_axes() {
        let grid = Grid::new(200.0);
        assert_eq!(grid.cell_of(vec2(0.0, 0.0)), (0, 0));
        assert_eq!(grid.cell_of(vec2(199.9, 199.9)), (0, 0));
        assert_eq!(grid.cell_of(vec2(200.0, 0.0)), (1, 0));
        assert_eq!(grid.cell_of(vec2(-0.1, -250.0)), (-1, -2));
    }

    #[test]
    fn insert_relocate_remove_keep_grid_consistent() {
        let mut grid = Grid::new(100.0);
        let cell = grid.insert(link(0), vec2(50.0, 50.0));
        assert!(grid.contains(cell, link(0)));

        let moved = grid.relocate(cell, link(0), vec2(150.0, 50.0));
        assert_eq!(moved, (1, 0));
        assert!(!grid.contains(cell, link(0)));
        assert!(grid.contains(moved, link(0)));
        assert_eq!(grid.link_count(), 1);

        // Relocation within the same cell leaves the bucket alone.
        let stayed = grid.relocate(moved, link(0), vec2(160.0, 60.0));
        assert_eq!(stayed, moved);
        assert_eq!(grid.link_count(), 1);

        grid.remove(moved, link(0));
        assert_eq!(grid.link_count(), 0);
        assert_eq!(grid.occupied_cells(), 0);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut grid = Grid::new(100.0);
        let cell = grid.insert(link(3), vec2(10.0, 10.0));
        grid.remove(cell, link(3));
        grid.remove(cell, link(3));
        grid.remove((5, 5), link(3));
        assert_eq!(grid.link_count(), 0);
    }

    #[test]
    fn neighbors_cover_the_three_by_three_block() {
        let mut grid = Grid::new(100.0);
        grid.insert(link(0), vec2(150.0, 150.0)); // (1, 1), the center
        grid.insert(link(1), vec2(50.0, 50.0)); // (0, 0), corner neighbor
        grid.insert(link(2), vec2(250.0, 150.0)); // (2, 1), side neighbor
        grid.insert(link(3), vec2(450.0, 150.0)); // (4, 1), out of range

        let mut seen = grid.neighbors((1, 1)).map(|l| l.node).collect::<Vec<_>>();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);
    }
}
