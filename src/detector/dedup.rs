//! Duplicate suppression across scale passes
use crate::config::{DedupConfig, DedupStrategy};
use crate::models::FinderPatternCandidate;

/// Union-Find over candidate indices
struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
        }
    }

    fn find(&mut self, x: u32) -> u32 {
        if self.parent[x as usize] != x {
            self.parent[x as usize] = self.find(self.parent[x as usize]);
        }
        self.parent[x as usize]
    }

    /// Merge, keeping the smaller index as the root so groups are led by their first member
    fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x != root_y {
            let (keep, drop) = if root_x < root_y { (root_x, root_y) } else { (root_y, root_x) };
            self.parent[drop as usize] = keep;
        }
    }
}

/// Collapse candidates closer than `config.distance` using the configured strategy
pub fn dedupe(candidates: Vec<FinderPatternCandidate>, config: &DedupConfig) -> Vec<FinderPatternCandidate> {
    match config.strategy {
        DedupStrategy::Greedy => dedupe_greedy(candidates, config.distance),
        DedupStrategy::Cluster => dedupe_clustered(candidates, config.distance),
    }
}

/// First-seen wins.
///
/// Walks the list in order; each kept candidate suppresses every later candidate
/// whose center is strictly closer than `distance`. Not transitive: in a chain
/// A–B–C where only neighbors are close, A suppresses B and C survives.
pub fn dedupe_greedy(candidates: Vec<FinderPatternCandidate>, distance: f32) -> Vec<FinderPatternCandidate> {
    let mut taken = vec![false; candidates.len()];
    for i in 0..candidates.len() {
        if taken[i] {
            continue;
        }
        for j in i + 1..candidates.len() {
            if !taken[j] && candidates[i].center.distance(&candidates[j].center) < distance {
                taken[j] = true;
            }
        }
    }

    candidates
        .into_iter()
        .zip(taken)
        .filter_map(|(c, dup)| (!dup).then_some(c))
        .collect()
}

/// Transitive grouping: connected components of the "closer than `distance`" graph.
///
/// Each group is represented by its earliest member; output keeps first-seen order.
pub fn dedupe_clustered(candidates: Vec<FinderPatternCandidate>, distance: f32) -> Vec<FinderPatternCandidate> {
    let n = candidates.len();
    let mut uf = UnionFind::new(n);
    for i in 0..n {
        for j in i + 1..n {
            if candidates[i].center.distance(&candidates[j].center) < distance {
                uf.union(i as u32, j as u32);
            }
        }
    }

    let roots: Vec<bool> = (0..n as u32).map(|i| uf.find(i) == i).collect();
    candidates
        .into_iter()
        .zip(roots)
        .filter_map(|(c, root)| root.then_some(c))
        .collect()
}
