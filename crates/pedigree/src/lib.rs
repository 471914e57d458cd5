#![forbid(unsafe_code)]

//! One-stop facade over the pedigree workspace: load a dataset, lay it out.
//!
//! ```
//! let text = r#"[
//!   {"id": "a", "firstName": "Ada", "spouse": "b", "children": ["c"]},
//!   {"id": "b", "firstName": "Ben", "spouse": "a", "children": ["c"]},
//!   {"id": "c", "firstName": "Cal", "parents": ["a", "b"]}
//! ]"#;
//! let layout = pedigree::layout_json(text, &pedigree::LayoutConfig::default()).unwrap();
//! assert_eq!(layout.couples.len(), 1);
//! ```

pub use pedigree_core::{
    Anomaly, Couple, CoupleSet, Person, PersonGraph, Sex, audit, dob_order, loader,
};
pub use pedigree_layout::{
    Bounds, FamilyTreeLayout, LayoutConfig, LayoutNode, LinkSegment, layout_family_tree,
    layout_graph,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Dataset(#[from] pedigree_core::Error),
    #[error(transparent)]
    Layout(#[from] pedigree_layout::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Parse a JSON dataset and lay it out.
pub fn layout_json(text: &str, config: &LayoutConfig) -> Result<FamilyTreeLayout> {
    let persons = loader::parse_json(text)?;
    Ok(layout_family_tree(persons, config)?)
}

/// Parse a delimited tabular dataset and lay it out.
pub fn layout_delimited(
    text: &str,
    delimiter: char,
    config: &LayoutConfig,
) -> Result<FamilyTreeLayout> {
    let persons = loader::parse_delimited(text, delimiter)?;
    Ok(layout_family_tree(persons, config)?)
}
