//! Arena-backed N-dimensional R-tree
//!
//! Nodes live in a flat arena and refer to each other by index. Inserts
//! descend by least volume enlargement; an overflowing node is split along
//! the axis and position that minimize the summed volume of the two halves,
//! evaluated in one pass per axis with prefix/suffix bounding boxes.

use kvcache_core::QueryBox;

use super::regions_touch;
use super::traits::{EngineKind, EngineStats, IndexId, IndexedRegion, SpatialEngine};

/// Bounding box of a node or entry, as inclusive lower / exclusive upper bounds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Bounds {
    low: Vec<u64>,
    high: Vec<u64>,
}

impl Bounds {
    fn of(region: &QueryBox) -> Self {
        Self {
            low: region.start().to_vec(),
            high: region.uppers().collect(),
        }
    }

    fn union(&self, other: &Bounds) -> Bounds {
        let mut merged = self.clone();
        merged.extend(other);
        merged
    }

    fn extend(&mut self, other: &Bounds) {
        for (lo, olo) in self.low.iter_mut().zip(&other.low) {
            *lo = (*lo).min(*olo);
        }
        for (hi, ohi) in self.high.iter_mut().zip(&other.high) {
            *hi = (*hi).max(*ohi);
        }
    }

    fn volume(&self) -> f64 {
        self.low
            .iter()
            .zip(&self.high)
            .map(|(lo, hi)| (hi - lo) as f64)
            .product()
    }

    fn touches(&self, query: &QueryBox) -> bool {
        self.low
            .iter()
            .zip(&self.high)
            .zip(query.start().iter().zip(query.uppers()))
            .all(|((lo, hi), (qlo, qhi))| *lo <= qhi && *qlo <= *hi)
    }
}

#[derive(Debug)]
enum Child {
    Node(usize),
    Item(IndexedRegion),
}

#[derive(Debug)]
struct Node {
    bounds: Bounds,
    leaf: bool,
    children: Vec<Child>,
}

fn bounds_of(arena: &[Node], child: &Child) -> Bounds {
    match child {
        Child::Node(idx) => arena[*idx].bounds.clone(),
        Child::Item(entry) => Bounds::of(&entry.region),
    }
}

fn enclose(arena: &[Node], children: &[Child]) -> Bounds {
    let mut it = children.iter().map(|c| bounds_of(arena, c));
    match it.next() {
        Some(first) => it.fold(first, |acc, b| acc.union(&b)),
        None => Bounds::default(),
    }
}

/// Split an overflowing child list into two lists of at least `min_children`.
fn split_children(
    arena: &[Node],
    children: Vec<Child>,
    min_children: usize,
) -> (Vec<Child>, Vec<Child>) {
    let n = children.len();
    let mut keyed: Vec<(Bounds, Child)> = children
        .into_iter()
        .map(|c| (bounds_of(arena, &c), c))
        .collect();
    let dim = keyed.first().map_or(0, |(b, _)| b.low.len());

    let sort_on = |keyed: &mut Vec<(Bounds, Child)>, axis: usize| {
        keyed.sort_by(|(a, _), (b, _)| {
            (a.low[axis], a.high[axis]).cmp(&(b.low[axis], b.high[axis]))
        });
    };

    let mut best: Option<(f64, usize, usize)> = None;
    for axis in 0..dim {
        sort_on(&mut keyed, axis);

        let mut prefix: Vec<Bounds> = Vec::with_capacity(n);
        for (b, _) in &keyed {
            let next = match prefix.last() {
                Some(prev) => prev.union(b),
                None => b.clone(),
            };
            prefix.push(next);
        }
        let mut suffix: Vec<Bounds> = Vec::with_capacity(n);
        for (b, _) in keyed.iter().rev() {
            let next = match suffix.last() {
                Some(prev) => prev.union(b),
                None => b.clone(),
            };
            suffix.push(next);
        }
        suffix.reverse();

        for k in min_children..=(n - min_children) {
            let cost = prefix[k - 1].volume() + suffix[k].volume();
            if best.map_or(true, |(c, _, _)| cost < c) {
                best = Some((cost, axis, k));
            }
        }
    }

    let (axis, k) = best.map_or((0, n / 2), |(_, axis, k)| (axis, k));
    if dim > 0 {
        sort_on(&mut keyed, axis);
    }
    let right = keyed.split_off(k).into_iter().map(|(_, c)| c).collect();
    let left = keyed.into_iter().map(|(_, c)| c).collect();
    (left, right)
}

/// N-dimensional R-tree engine
#[derive(Debug)]
pub struct RTreeEngine {
    max_children: usize,
    min_children: usize,
    root: Option<usize>,
    arena: Vec<Node>,
    len: usize,
}

impl RTreeEngine {
    /// Create a tree whose nodes hold at most `max_children` entries.
    /// Values below 2 are raised to 2.
    pub fn new(max_children: usize) -> Self {
        let max_children = max_children.max(2);
        Self {
            max_children,
            min_children: (max_children * 3 / 10).max(1),
            root: None,
            arena: Vec::new(),
            len: 0,
        }
    }

    fn choose_child(arena: &[Node], children: &[Child], bounds: &Bounds) -> usize {
        let mut best_idx = 0;
        let mut best_cost: Option<(f64, f64)> = None;
        for (i, child) in children.iter().enumerate() {
            let current = bounds_of(arena, child);
            let volume = current.volume();
            let cost = (current.union(bounds).volume() - volume, volume);
            if best_cost.map_or(true, |bc| cost < bc) {
                best_cost = Some(cost);
                best_idx = i;
            }
        }
        best_idx
    }

    /// Insert into the subtree at `node_idx`. Returns the index of a new
    /// sibling when the node had to split.
    fn insert_node(&mut self, node_idx: usize, entry: IndexedRegion, bounds: &Bounds) -> Option<usize> {
        if self.arena[node_idx].leaf {
            let node = &mut self.arena[node_idx];
            node.children.push(Child::Item(entry));
            node.bounds.extend(bounds);
            if node.children.len() <= self.max_children {
                return None;
            }
        } else {
            let slot = Self::choose_child(&self.arena, &self.arena[node_idx].children, bounds);
            let child = match &self.arena[node_idx].children[slot] {
                Child::Node(idx) => Some(*idx),
                Child::Item(_) => None,
            };
            let split = child.and_then(|idx| self.insert_node(idx, entry, bounds));
            self.arena[node_idx].bounds.extend(bounds);

            let sibling = split?;
            self.arena[node_idx]
                .children
                .insert(slot + 1, Child::Node(sibling));
            if self.arena[node_idx].children.len() <= self.max_children {
                return None;
            }
        }
        Some(self.split_node(node_idx))
    }

    fn split_node(&mut self, node_idx: usize) -> usize {
        let children = std::mem::take(&mut self.arena[node_idx].children);
        let (left, right) = split_children(&self.arena, children, self.min_children);
        let left_bounds = enclose(&self.arena, &left);
        let right_bounds = enclose(&self.arena, &right);
        let leaf = self.arena[node_idx].leaf;

        let node = &mut self.arena[node_idx];
        node.children = left;
        node.bounds = left_bounds;

        self.arena.push(Node {
            bounds: right_bounds,
            leaf,
            children: right,
        });
        self.arena.len() - 1
    }

    fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(idx) = current {
            height += 1;
            current = self.arena[idx].children.iter().find_map(|c| match c {
                Child::Node(next) => Some(*next),
                Child::Item(_) => None,
            });
        }
        height
    }
}

impl SpatialEngine for RTreeEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::RTree
    }

    fn insert(&mut self, id: IndexId, region: QueryBox) {
        let bounds = Bounds::of(&region);
        let entry = IndexedRegion { id, region };
        self.len += 1;

        let Some(root) = self.root else {
            self.arena.push(Node {
                bounds,
                leaf: true,
                children: vec![Child::Item(entry)],
            });
            self.root = Some(self.arena.len() - 1);
            return;
        };

        if let Some(sibling) = self.insert_node(root, entry, &bounds) {
            let bounds = self.arena[root].bounds.union(&self.arena[sibling].bounds);
            self.arena.push(Node {
                bounds,
                leaf: false,
                children: vec![Child::Node(root), Child::Node(sibling)],
            });
            self.root = Some(self.arena.len() - 1);
        }
    }

    fn intersecting(&self, query: &QueryBox) -> Vec<IndexedRegion> {
        let mut found = Vec::new();
        let Some(root) = self.root else {
            return found;
        };

        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let node = &self.arena[idx];
            if !node.bounds.touches(query) {
                continue;
            }
            for child in &node.children {
                match child {
                    Child::Node(next) => stack.push(*next),
                    Child::Item(entry) => {
                        if regions_touch(&entry.region, query) {
                            found.push(entry.clone());
                        }
                    }
                }
            }
        }
        found
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.len = 0;
    }

    fn stats(&self) -> EngineStats {
        EngineStats {
            entries: self.len,
            nodes: self.arena.len(),
            height: self.height(),
        }
    }
}
