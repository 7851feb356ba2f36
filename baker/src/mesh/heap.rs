use std::collections::HashMap;

use super::edge::Edge;

#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    edge: Edge,
    cost: f32,
}

/// Binary min-heap of collapse candidates with decrease-key support. A slot
/// table maps each edge to its current heap position and is maintained on
/// every swap, so `update` and `remove` run in O(log n).
///
/// Costs are never NaN: the metric yields either a finite value or positive
/// infinity.
#[derive(Default, Debug, Clone)]
pub struct CollapseCostHeap {
    entries: Vec<HeapEntry>,
    slots: HashMap<Edge, usize>,
}

impl CollapseCostHeap {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            slots: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, edge: Edge) -> bool {
        self.slots.contains_key(&edge)
    }

    /// The cheapest candidate, without removing it.
    pub fn peek(&self) -> Option<(Edge, f32)> {
        self.entries.first().map(|e| (e.edge, e.cost))
    }

    pub fn push(&mut self, edge: Edge, cost: f32) {
        debug_assert!(!self.slots.contains_key(&edge));
        let slot = self.entries.len();
        self.entries.push(HeapEntry { edge, cost });
        self.slots.insert(edge, slot);
        self.sift_up(slot);
    }

    /// Re-key an existing candidate. Returns false if the edge is not queued.
    pub fn update(&mut self, edge: Edge, cost: f32) -> bool {
        let Some(&slot) = self.slots.get(&edge) else {
            return false;
        };
        self.entries[slot].cost = cost;
        let slot = self.sift_up(slot);
        self.sift_down(slot);
        true
    }

    pub fn push_or_update(&mut self, edge: Edge, cost: f32) {
        if !self.update(edge, cost) {
            self.push(edge, cost);
        }
    }

    /// Drop a candidate wherever it sits. Absent edges are ignored.
    pub fn remove(&mut self, edge: Edge) -> bool {
        let Some(slot) = self.slots.remove(&edge) else {
            return false;
        };
        let last = self.entries.len() - 1;
        if slot != last {
            self.entries.swap(slot, last);
            self.slots.insert(self.entries[slot].edge, slot);
        }
        self.entries.pop();
        if slot < self.entries.len() {
            let slot = self.sift_up(slot);
            self.sift_down(slot);
        }
        true
    }

    pub fn pop(&mut self) -> Option<(Edge, f32)> {
        let (edge, cost) = self.peek()?;
        self.remove(edge);
        Some((edge, cost))
    }

    fn sift_up(&mut self, mut slot: usize) -> usize {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.entries[slot].cost >= self.entries[parent].cost {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
        slot
    }

    fn sift_down(&mut self, mut slot: usize) {
        loop {
            let mut smallest = slot;
            for child in [2 * slot + 1, 2 * slot + 2] {
                if child < self.entries.len()
                    && self.entries[child].cost < self.entries[smallest].cost
                {
                    smallest = child;
                }
            }
            if smallest == slot {
                return;
            }
            self.swap(slot, smallest);
            slot = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        self.slots.insert(self.entries[a].edge, a);
        self.slots.insert(self.entries[b].edge, b);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mesh::vertex::VertID;

    fn edge(a: u32, b: u32) -> Edge {
        Edge::new(VertID(a), VertID(b))
    }

    impl CollapseCostHeap {
        fn assert_valid(&self) {
            assert_eq!(self.entries.len(), self.slots.len());
            for (slot, entry) in self.entries.iter().enumerate() {
                assert_eq!(self.slots[&entry.edge], slot);
                if slot > 0 {
                    assert!(self.entries[(slot - 1) / 2].cost <= entry.cost);
                }
            }
        }
    }

    #[test]
    fn pops_in_cost_order() {
        let mut heap = CollapseCostHeap::with_capacity(8);
        for (i, cost) in [5.0, 1.0, 4.0, 2.0, 3.0, f32::INFINITY].iter().enumerate() {
            heap.push(edge(i as u32, 100), *cost);
        }
        heap.assert_valid();

        let mut costs = Vec::new();
        while let Some((_, cost)) = heap.pop() {
            heap.assert_valid();
            costs.push(cost);
        }
        assert_eq!(costs, vec![1.0, 2.0, 3.0, 4.0, 5.0, f32::INFINITY]);
    }

    #[test]
    fn decrease_key_bubbles_to_root() {
        let mut heap = CollapseCostHeap::default();
        heap.push(edge(0, 1), 10.0);
        heap.push(edge(1, 2), 20.0);
        heap.push(edge(2, 3), 30.0);

        assert!(heap.update(edge(2, 3), 1.0));
        heap.assert_valid();
        assert_eq!(heap.peek(), Some((edge(2, 3), 1.0)));
    }

    #[test]
    fn increase_key_sinks() {
        let mut heap = CollapseCostHeap::default();
        heap.push(edge(0, 1), 1.0);
        heap.push(edge(1, 2), 2.0);
        heap.push(edge(2, 3), 3.0);

        assert!(heap.update(edge(0, 1), f32::INFINITY));
        heap.assert_valid();
        assert_eq!(heap.peek(), Some((edge(1, 2), 2.0)));
    }

    #[test]
    fn remove_from_the_middle() {
        let mut heap = CollapseCostHeap::default();
        for i in 0..10 {
            heap.push(edge(i, i + 1), (i as f32) * 0.5);
        }

        assert!(heap.remove(edge(4, 5)));
        assert!(!heap.remove(edge(4, 5)));
        assert!(!heap.contains(edge(4, 5)));
        heap.assert_valid();
        assert_eq!(heap.len(), 9);
    }

    #[test]
    fn push_or_update_covers_both_paths() {
        let mut heap = CollapseCostHeap::default();
        heap.push_or_update(edge(0, 1), 5.0);
        heap.push_or_update(edge(0, 1), 2.0);

        assert_eq!(heap.len(), 1);
        assert_eq!(heap.peek(), Some((edge(0, 1), 2.0)));
    }
}
