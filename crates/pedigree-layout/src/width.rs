use pedigree_core::PersonGraph;
use rustc_hash::{FxHashMap, FxHashSet};

/// Memoized horizontal footprint of a person and all descendants.
///
/// Pure function of graph structure; computed once per id and cached. The
/// in-progress set cuts parent/child reference cycles so malformed datasets
/// cannot recurse forever.
pub struct SubtreeWidthEstimator<'a> {
    graph: &'a PersonGraph,
    person_width: f64,
    sibling_gap: f64,
    memo: FxHashMap<String, f64>,
    in_progress: FxHashSet<String>,
}

impl<'a> SubtreeWidthEstimator<'a> {
    pub fn new(graph: &'a PersonGraph, person_width: f64, sibling_gap: f64) -> Self {
        Self {
            graph,
            person_width,
            sibling_gap,
            memo: FxHashMap::default(),
            in_progress: FxHashSet::default(),
        }
    }

    /// Width needed to lay out `person_id`'s subtree without sibling overlap.
    /// Always at least one person width, so a childless card reserves its own
    /// room.
    pub fn width(&mut self, person_id: &str) -> f64 {
        if let Some(&w) = self.memo.get(person_id) {
            return w;
        }
        let Some(person) = self.graph.get(person_id) else {
            return self.person_width;
        };
        if !self.in_progress.insert(person_id.to_string()) {
            // Cyclic reference: treat the re-entered node as a leaf.
            return self.person_width;
        }

        let children = self.graph.children_sorted(person);
        let mut total = 0.0;
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                total += self.sibling_gap;
            }
            total += self.width(&child.id);
        }
        let width = total.max(self.person_width);

        self.in_progress.remove(person_id);
        self.memo.insert(person_id.to_string(), width);
        width
    }

    /// Width of a row of subtrees with sibling gaps between them.
    pub fn row_width<I>(&mut self, ids: I) -> f64
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut total = 0.0;
        for (i, id) in ids.into_iter().enumerate() {
            if i > 0 {
                total += self.sibling_gap;
            }
            total += self.width(id.as_ref());
        }
        total
    }
}
