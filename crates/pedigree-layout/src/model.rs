use pedigree_core::Couple;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }
}

/// One entry of the positioned node list: either a person card or the
/// decorative midpoint marker between a couple's cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LayoutNode {
    Person {
        id: String,
        x: f64,
        y: f64,
        generation: i32,
    },
    CoupleMarker {
        x: f64,
        y: f64,
        members: [String; 2],
    },
}

impl LayoutNode {
    pub fn position(&self) -> (f64, f64) {
        match self {
            LayoutNode::Person { x, y, .. } | LayoutNode::CoupleMarker { x, y, .. } => (*x, *y),
        }
    }
}

/// A routed straight line. Parent-child and spousal edges usually expand to
/// several segments forming an orthogonal connector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl LinkSegment {
    pub fn is_horizontal(&self) -> bool {
        self.y1 == self.y2
    }

    pub fn is_vertical(&self) -> bool {
        self.x1 == self.x2
    }
}

/// Everything a renderer needs to draw the tree without recomputing any
/// layout decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyTreeLayout {
    pub nodes: Vec<LayoutNode>,
    pub links: Vec<LinkSegment>,
    pub couples: Vec<Couple>,
    pub bounds: Option<Bounds>,
}
