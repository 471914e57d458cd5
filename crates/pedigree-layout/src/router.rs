use crate::config::LayoutConfig;
use crate::engine::Position;
use crate::model::LinkSegment;
use pedigree_core::{Couple, CoupleSet, Person, PersonGraph};
use rustc_hash::{FxHashMap, FxHashSet};

/// Emits the orthogonal connector segments for a finished placement:
/// spouse-to-spouse lines, and parent-to-children T-junctions with a
/// horizontal bus over the children row.
pub(crate) struct LinkRouter<'a> {
    graph: &'a PersonGraph,
    couples: &'a CoupleSet,
    config: &'a LayoutConfig,
    positions: &'a FxHashMap<String, Position>,
}

impl<'a> LinkRouter<'a> {
    pub fn new(
        graph: &'a PersonGraph,
        couples: &'a CoupleSet,
        config: &'a LayoutConfig,
        positions: &'a FxHashMap<String, Position>,
    ) -> Self {
        Self {
            graph,
            couples,
            config,
            positions,
        }
    }

    pub fn route(&self) -> Vec<LinkSegment> {
        let mut segments: Vec<LinkSegment> = Vec::new();
        // Keyed by couple id or person id; both spouses referencing the same
        // child set must not route it twice.
        let mut processed: FxHashSet<String> = FxHashSet::default();

        for person in self.graph.persons() {
            match self.couples.couple_of(&person.id) {
                Some(couple) => {
                    if processed.insert(couple.id.clone()) {
                        self.route_couple(couple, &mut segments);
                    }
                }
                None => {
                    if processed.insert(person.id.clone()) {
                        self.route_solo(person, &mut segments);
                    }
                }
            }
        }
        segments
    }

    fn route_couple(&self, couple: &Couple, segments: &mut Vec<LinkSegment>) {
        let (Some(p1), Some(p2)) = (
            self.positions.get(&couple.person1),
            self.positions.get(&couple.person2),
        ) else {
            return;
        };

        // Spousal connector through the couple marker.
        push_segment(segments, p1.x, p1.y, p2.x, p2.y);

        let children = self.positioned_children(&self.couple_child_ids(couple));
        if children.is_empty() {
            return;
        }

        let mid_x = (p1.x + p2.x) / 2.0;
        let parent_bottom = p1.y.max(p2.y) + self.config.card_height / 2.0;
        let (mid_y, bus_y, child_top) = self.junction_rows(parent_bottom, &children);

        // Both parents drop to a shared midline, joined across.
        push_segment(segments, p1.x, parent_bottom, p1.x, mid_y);
        push_segment(segments, p2.x, parent_bottom, p2.x, mid_y);
        push_segment(segments, p1.x, mid_y, p2.x, mid_y);

        if let [(only_x, _)] = children.as_slice() {
            if *only_x == mid_x {
                // Single child directly below the pair: one straight drop.
                push_segment(segments, mid_x, mid_y, mid_x, child_top);
                return;
            }
        }

        push_segment(segments, mid_x, mid_y, mid_x, bus_y);
        self.route_bus(segments, mid_x, bus_y, &children);
    }

    fn route_solo(&self, person: &Person, segments: &mut Vec<LinkSegment>) {
        let Some(parent) = self.positions.get(&person.id) else {
            return;
        };
        let child_ids: Vec<String> = self
            .graph
            .children_sorted(person)
            .into_iter()
            .map(|c| c.id.clone())
            .collect();
        let children = self.positioned_children(&child_ids);
        if children.is_empty() {
            return;
        }

        let parent_bottom = parent.y + self.config.card_height / 2.0;
        let (_, bus_y, child_top) = self.junction_rows(parent_bottom, &children);

        if let [(only_x, _)] = children.as_slice() {
            if *only_x == parent.x {
                push_segment(segments, parent.x, parent_bottom, parent.x, child_top);
                return;
            }
        }

        push_segment(segments, parent.x, parent_bottom, parent.x, bus_y);
        self.route_bus(segments, parent.x, bus_y, &children);
    }

    /// Horizontal bus over the children row plus a stub down into each child.
    /// The bus is widened to reach the drop point so the connector always
    /// stays connected, even when a tightened couple drifted off-center.
    fn route_bus(
        &self,
        segments: &mut Vec<LinkSegment>,
        drop_x: f64,
        bus_y: f64,
        children: &[(f64, f64)],
    ) {
        let mut min_x = drop_x;
        let mut max_x = drop_x;
        for &(x, _) in children {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
        }
        push_segment(segments, min_x, bus_y, max_x, bus_y);
        for &(x, y) in children {
            push_segment(segments, x, bus_y, x, y - self.config.card_height / 2.0);
        }
    }

    /// The three horizontal reference rows of a T-junction: parent midline,
    /// children bus, and the top edge of the children row.
    fn junction_rows(&self, parent_bottom: f64, children: &[(f64, f64)]) -> (f64, f64, f64) {
        let child_top = children
            .iter()
            .map(|&(_, y)| y)
            .fold(f64::INFINITY, f64::min)
            - self.config.card_height / 2.0;
        let drop = (child_top - parent_bottom).max(0.0);
        (
            parent_bottom + drop / 3.0,
            parent_bottom + drop * 2.0 / 3.0,
            child_top,
        )
    }

    fn couple_child_ids(&self, couple: &Couple) -> Vec<String> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut out: Vec<String> = Vec::new();
        for member_id in [&couple.person1, &couple.person2] {
            let Some(member) = self.graph.get(member_id) else {
                continue;
            };
            for child_id in &member.children {
                let Some(child) = self.graph.get(child_id) else {
                    continue;
                };
                if seen.insert(child.id.as_str()) {
                    out.push(child.id.clone());
                }
            }
        }
        out
    }

    fn positioned_children(&self, ids: &[String]) -> Vec<(f64, f64)> {
        ids.iter()
            .filter_map(|id| self.positions.get(id.as_str()))
            .map(|p| (p.x, p.y))
            .collect()
    }
}

fn push_segment(segments: &mut Vec<LinkSegment>, x1: f64, y1: f64, x2: f64, y2: f64) {
    if x1 == x2 && y1 == y2 {
        return;
    }
    segments.push(LinkSegment { x1, y1, x2, y2 });
}
