//! Depression filling by priority flood.
//!
//! Outlets (ocean cells and the pole rows) seed a min-heap in index order.
//! Each popped cell raises its unvisited neighbours to at least its own
//! level, so every cell ends up on a surface that drains to an outlet
//! without climbing. Heap order is `(level, push sequence)`, which makes the
//! pop order total and independent of scheduling.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::config::WorldConfig;
use crate::heightfield::{HeightField, SEA_LEVEL};

/// Result of one flood over the whole grid.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorityFlood {
    /// `max(h, spill level)` per cell.
    pub filled: Vec<f32>,
    /// Cell that flooded this one; `None` for outlets.
    pub parent: Vec<Option<usize>>,
    /// Cells in pop order. Levels are non-decreasing along it.
    pub order: Vec<usize>,
    /// Position of each cell in `order`.
    pub rank: Vec<u32>,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    level: f32,
    seq: u64,
    index: usize,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so `BinaryHeap` pops the lowest level first.
    fn cmp(&self, other: &Self) -> Ordering {
        other.level.total_cmp(&self.level).then_with(|| other.seq.cmp(&self.seq))
    }
}

pub fn is_outlet(config: &WorldConfig, height: &HeightField, index: usize) -> bool {
    let r = index / config.width() as usize;
    height.data[index] < SEA_LEVEL || r == 0 || r + 1 == config.height() as usize
}

pub fn priority_flood(config: &WorldConfig, height: &HeightField) -> PriorityFlood {
    let n = height.len();
    let mut filled = height.data.clone();
    let mut parent = vec![None; n];
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;

    for index in 0..n {
        if is_outlet(config, height, index) {
            visited[index] = true;
            heap.push(Entry { level: filled[index], seq, index });
            seq += 1;
        }
    }

    while let Some(Entry { level, index, .. }) = heap.pop() {
        order.push(index);
        for nb in config.neighbor_indices(index).into_iter().flatten() {
            if visited[nb] {
                continue;
            }
            visited[nb] = true;
            filled[nb] = filled[nb].max(level);
            parent[nb] = Some(index);
            heap.push(Entry { level: filled[nb], seq, index: nb });
            seq += 1;
        }
    }

    let mut rank = vec![0u32; n];
    for (pos, &index) in order.iter().enumerate() {
        rank[index] = pos as u32;
    }
    PriorityFlood { filled, parent, order, rank }
}
