#![forbid(unsafe_code)]

//! Headless generation layout + link routing for family trees.
//!
//! Input is a normalized [`pedigree_core::Person`] list; output is a complete
//! [`FamilyTreeLayout`] — positioned person cards, couple markers, and
//! orthogonal connector segments — that a renderer can draw without
//! recomputing any layout decision. The whole pass is a pure, synchronous
//! function of the dataset and the [`LayoutConfig`].

pub mod config;
mod engine;
pub mod model;
mod router;
pub mod width;

pub use config::LayoutConfig;
pub use model::{Bounds, FamilyTreeLayout, LayoutNode, LinkSegment};
pub use width::SubtreeWidthEstimator;

use engine::TreeLayoutEngine;
use pedigree_core::{CoupleSet, Person, PersonGraph};
use router::LinkRouter;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("dataset has no root generation (cyclic parent data)")]
    NoRootGeneration,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Lay out a whole dataset: build the relation graph, resolve couples,
/// position everyone, route the connectors.
pub fn layout_family_tree(persons: Vec<Person>, config: &LayoutConfig) -> Result<FamilyTreeLayout> {
    let graph = PersonGraph::new(persons);
    let couples = CoupleSet::resolve(&graph);
    layout_graph(&graph, &couples, config)
}

/// Lay out a pre-built graph + couple set. Useful when the caller also runs
/// relation queries (audits, detail popups) against the same graph.
pub fn layout_graph(
    graph: &PersonGraph,
    couples: &CoupleSet,
    config: &LayoutConfig,
) -> Result<FamilyTreeLayout> {
    let placement = TreeLayoutEngine::new(graph, couples, config).run()?;
    let links = LinkRouter::new(graph, couples, config, &placement.positions).route();
    let bounds = compute_bounds(&placement.nodes, &links, config);
    Ok(FamilyTreeLayout {
        nodes: placement.nodes,
        links,
        couples: couples.couples().to_vec(),
        bounds,
    })
}

fn compute_bounds(
    nodes: &[LayoutNode],
    links: &[LinkSegment],
    config: &LayoutConfig,
) -> Option<Bounds> {
    let half_w = config.card_width / 2.0;
    let half_h = config.card_height / 2.0;
    let mut points: Vec<(f64, f64)> = Vec::new();
    for node in nodes {
        let (x, y) = node.position();
        match node {
            LayoutNode::Person { .. } => {
                points.push((x - half_w, y - half_h));
                points.push((x + half_w, y + half_h));
            }
            LayoutNode::CoupleMarker { .. } => points.push((x, y)),
        }
    }
    for seg in links {
        points.push((seg.x1, seg.y1));
        points.push((seg.x2, seg.y2));
    }
    Bounds::from_points(points)
}
