use crate::config::LayoutConfig;
use crate::model::LayoutNode;
use crate::width::SubtreeWidthEstimator;
use crate::{Error, Result};
use pedigree_core::{CoupleSet, PersonGraph};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Position {
    pub x: f64,
    pub y: f64,
    pub generation: i32,
}

pub(crate) struct Placement {
    pub positions: FxHashMap<String, Position>,
    pub nodes: Vec<LayoutNode>,
}

/// Pending child-positioning work. A couple's children wait here until both
/// members have confirmed coordinates, so they end up centered under the
/// pair's midpoint instead of under whichever spouse was reached first.
enum Task {
    CoupleChildren { person1: String, person2: String },
    SoloChildren(String),
}

/// Mutable state of one layout run. Owned by the engine, discarded with it;
/// re-running a layout always starts from scratch.
struct LayoutContext {
    positions: FxHashMap<String, Position>,
    pending: VecDeque<Task>,
    queued_couples: FxHashSet<String>,
}

/// Assigns absolute coordinates to every person and couple marker, walking
/// generations top-down and centering children under their parent pair.
pub(crate) struct TreeLayoutEngine<'a> {
    graph: &'a PersonGraph,
    couples: &'a CoupleSet,
    config: &'a LayoutConfig,
    widths: SubtreeWidthEstimator<'a>,
    ctx: LayoutContext,
}

enum RootUnit {
    Couple { person1: String, person2: String },
    Solo(String),
}

impl<'a> TreeLayoutEngine<'a> {
    pub fn new(graph: &'a PersonGraph, couples: &'a CoupleSet, config: &'a LayoutConfig) -> Self {
        Self {
            graph,
            couples,
            config,
            widths: SubtreeWidthEstimator::new(graph, config.card_width, config.sibling_gap),
            ctx: LayoutContext {
                positions: FxHashMap::default(),
                pending: VecDeque::new(),
                queued_couples: FxHashSet::default(),
            },
        }
    }

    pub fn run(mut self) -> Result<Placement> {
        if self.graph.is_empty() {
            return Ok(Placement {
                positions: FxHashMap::default(),
                nodes: Vec::new(),
            });
        }

        let units = self.root_units();
        if units.is_empty() {
            // The graph cuts ancestry cycles into level-0 roots, so a
            // non-empty dataset without a root row is structurally broken.
            return Err(Error::NoRootGeneration);
        }

        let unit_widths: Vec<f64> = units.iter().map(|u| self.unit_width(u)).collect();
        let total: f64 = unit_widths.iter().sum::<f64>()
            + self.config.family_gap * (units.len() - 1) as f64;
        let left = self
            .config
            .min_margin
            .max((self.config.canvas_width - total) / 2.0);

        let mut cursor = left;
        for (unit, width) in units.iter().zip(&unit_widths) {
            let center = cursor + width / 2.0;
            match unit {
                RootUnit::Couple {
                    person1, person2, ..
                } => {
                    let half = self.config.couple_spacing / 2.0;
                    self.place_person(person1, center - half);
                    self.place_person(person2, center + half);
                }
                RootUnit::Solo(id) => {
                    self.place_person(id, center);
                }
            }
            cursor += width + self.config.family_gap;
            self.drain();
        }

        self.marry_in_pass();
        self.final_sweep();
        self.tighten_couples();
        Ok(self.into_placement())
    }

    /// Root family units in dataset order: couples whose members sit on
    /// generation 0, and unpartnered generation-0 individuals.
    fn root_units(&self) -> Vec<RootUnit> {
        let couples = self.couples;
        let mut seen_couples: FxHashSet<&str> = FxHashSet::default();
        let mut units: Vec<RootUnit> = Vec::new();
        for person in self.graph.persons() {
            if self.graph.level(&person.id) != Some(0) {
                continue;
            }
            match couples.couple_of(&person.id) {
                Some(couple) => {
                    if seen_couples.insert(couple.id.as_str()) {
                        units.push(RootUnit::Couple {
                            person1: couple.person1.clone(),
                            person2: couple.person2.clone(),
                        });
                    }
                }
                None => units.push(RootUnit::Solo(person.id.clone())),
            }
        }
        units
    }

    fn unit_width(&mut self, unit: &RootUnit) -> f64 {
        match unit {
            RootUnit::Couple {
                person1, person2, ..
            } => {
                let children = self.couple_children(person1, person2);
                let row = self.widths.row_width(&children);
                self.config.couple_footprint().max(row)
            }
            RootUnit::Solo(id) => self.widths.width(id),
        }
    }

    /// Combined, de-duplicated, dob-sorted children of a couple. A child is
    /// attributed to the couple if it is a child of either resolved member.
    fn couple_children(&self, person1: &str, person2: &str) -> Vec<String> {
        let graph = self.graph;
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut children: Vec<&pedigree_core::Person> = Vec::new();
        for member_id in [person1, person2] {
            let Some(member) = graph.get(member_id) else {
                continue;
            };
            for child_id in &member.children {
                let Some(child) = graph.get(child_id) else {
                    continue;
                };
                if seen.insert(child.id.as_str()) {
                    children.push(child);
                }
            }
        }
        children.sort_by(|a, b| pedigree_core::dob_order(a.dob.as_deref(), b.dob.as_deref()));
        children.into_iter().map(|c| c.id.clone()).collect()
    }

    /// Position a person at `x` on their generation row. A second attempt on
    /// an already-positioned person is a no-op; this is what keeps shared-
    /// child anomalies and diamond traversals from double-placing anyone.
    fn place_person(&mut self, id: &str, x: f64) -> bool {
        if self.ctx.positions.contains_key(id) {
            return false;
        }
        let Some(generation) = self.graph.level(id) else {
            return false;
        };
        let y = self.config.row_y(generation);
        self.ctx
            .positions
            .insert(id.to_string(), Position { x, y, generation });

        let couples = self.couples;
        match couples.couple_of(id) {
            Some(couple) => {
                // Children of a couple are deferred until the second member
                // lands, whichever traversal path gets there.
                let other = couple.other(id).unwrap_or_default();
                if self.ctx.positions.contains_key(other)
                    && self.ctx.queued_couples.insert(couple.id.clone())
                {
                    self.ctx.pending.push_back(Task::CoupleChildren {
                        person1: couple.person1.clone(),
                        person2: couple.person2.clone(),
                    });
                }
            }
            None => {
                let has_children = self
                    .graph
                    .get(id)
                    .is_some_and(|p| p.children.iter().any(|c| self.graph.contains(c)));
                if has_children {
                    self.ctx.pending.push_back(Task::SoloChildren(id.to_string()));
                }
            }
        }
        true
    }

    fn drain(&mut self) {
        while let Some(task) = self.ctx.pending.pop_front() {
            match task {
                Task::CoupleChildren { person1, person2 } => {
                    let p1 = self.ctx.positions.get(&person1).copied();
                    let p2 = self.ctx.positions.get(&person2).copied();
                    let (Some(p1), Some(p2)) = (p1, p2) else {
                        continue;
                    };
                    let children = self.couple_children(&person1, &person2);
                    self.place_children_row(&children, (p1.x + p2.x) / 2.0);
                }
                Task::SoloChildren(parent_id) => {
                    let Some(parent) = self.ctx.positions.get(&parent_id).copied() else {
                        continue;
                    };
                    let children: Vec<String> = match self.graph.get(&parent_id) {
                        Some(person) => self
                            .graph
                            .children_sorted(person)
                            .into_iter()
                            .map(|c| c.id.clone())
                            .collect(),
                        None => continue,
                    };
                    self.place_children_row(&children, parent.x);
                }
            }
        }
    }

    fn place_children_row(&mut self, children: &[String], center_x: f64) {
        if children.is_empty() {
            return;
        }
        let total = self.widths.row_width(children);
        let mut cursor = center_x - total / 2.0;
        for child_id in children {
            let width = self.widths.width(child_id);
            self.place_person(child_id, cursor + width / 2.0);
            cursor += width + self.config.sibling_gap;
        }
    }

    /// Spouses who married into the tree have no parent lineage of their own
    /// and are never reached by the descent; park each one next to their
    /// already-positioned partner, then let the freed-up couples place their
    /// children.
    fn marry_in_pass(&mut self) {
        let couples = self.couples;
        loop {
            let mut progress = false;
            for couple in couples.couples() {
                let p1 = self.ctx.positions.get(&couple.person1).copied();
                let p2 = self.ctx.positions.get(&couple.person2).copied();
                match (p1, p2) {
                    (Some(anchor), None) => {
                        progress |= self
                            .place_person(&couple.person2, anchor.x + self.config.couple_spacing);
                    }
                    (None, Some(anchor)) => {
                        progress |= self
                            .place_person(&couple.person1, anchor.x - self.config.couple_spacing);
                    }
                    _ => {}
                }
            }
            self.drain();
            if !progress {
                break;
            }
        }
    }

    /// Defensive: anything the traversal could not reach (only possible with
    /// pathological data) is parked at the right edge of its generation row,
    /// so the output always contains every person exactly once.
    fn final_sweep(&mut self) {
        let unplaced: Vec<String> = self
            .graph
            .persons()
            .iter()
            .filter(|p| !self.ctx.positions.contains_key(p.id.as_str()))
            .map(|p| p.id.clone())
            .collect();
        if unplaced.is_empty() {
            return;
        }

        let mut edge = self
            .ctx
            .positions
            .values()
            .map(|p| p.x)
            .fold(f64::NEG_INFINITY, f64::max);
        if !edge.is_finite() {
            edge = self.config.min_margin;
        }
        for id in unplaced {
            edge += self.config.card_width + self.config.sibling_gap;
            if self.place_person(&id, edge) {
                tracing::warn!(id = %id, "person unreachable from any root, parked at row edge");
                self.drain();
            }
        }
    }

    /// Re-center every couple around its own midpoint at exactly the
    /// configured spacing. Spouses reached via different parent edges drift
    /// apart during the main pass; this corrects that.
    fn tighten_couples(&mut self) {
        let couples = self.couples;
        let half = self.config.couple_spacing / 2.0;
        for couple in couples.couples() {
            let p1 = self.ctx.positions.get(&couple.person1).copied();
            let p2 = self.ctx.positions.get(&couple.person2).copied();
            let (Some(p1), Some(p2)) = (p1, p2) else {
                continue;
            };
            let mid = (p1.x + p2.x) / 2.0;
            if let Some(pos) = self.ctx.positions.get_mut(&couple.person1) {
                pos.x = mid - half;
            }
            if let Some(pos) = self.ctx.positions.get_mut(&couple.person2) {
                pos.x = mid + half;
            }
        }
    }

    fn into_placement(self) -> Placement {
        let mut nodes: Vec<LayoutNode> = Vec::with_capacity(self.graph.len() + self.couples.len());
        for person in self.graph.persons() {
            if let Some(pos) = self.ctx.positions.get(person.id.as_str()) {
                nodes.push(LayoutNode::Person {
                    id: person.id.clone(),
                    x: pos.x,
                    y: pos.y,
                    generation: pos.generation,
                });
            }
        }
        for couple in self.couples.couples() {
            let p1 = self.ctx.positions.get(&couple.person1);
            let p2 = self.ctx.positions.get(&couple.person2);
            let (Some(p1), Some(p2)) = (p1, p2) else {
                continue;
            };
            nodes.push(LayoutNode::CoupleMarker {
                x: (p1.x + p2.x) / 2.0,
                y: (p1.y + p2.y) / 2.0,
                members: [couple.person1.clone(), couple.person2.clone()],
            });
        }
        Placement {
            positions: self.ctx.positions,
            nodes,
        }
    }
}
