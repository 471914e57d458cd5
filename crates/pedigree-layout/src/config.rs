/// Layout tunables. All distances are in the same abstract unit the renderer
/// maps to pixels; positions refer to card centers.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Person card footprint.
    pub card_width: f64,
    pub card_height: f64,
    /// Center-to-center distance between the two members of a couple.
    pub couple_spacing: f64,
    /// Horizontal whitespace between adjacent sibling subtrees.
    pub sibling_gap: f64,
    /// Horizontal whitespace between independent root family units.
    pub family_gap: f64,
    /// Center-to-center vertical distance between generation rows.
    pub level_separation: f64,
    /// Width the root row is centered within.
    pub canvas_width: f64,
    /// Minimum distance from the canvas edge to any card center.
    pub min_margin: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            card_width: 120.0,
            card_height: 150.0,
            couple_spacing: 150.0,
            sibling_gap: 30.0,
            family_gap: 80.0,
            level_separation: 230.0,
            canvas_width: 1600.0,
            min_margin: 60.0,
        }
    }
}

impl LayoutConfig {
    /// Horizontal footprint of a couple's two cards, used when packing root
    /// family units so childless couples cannot collide.
    pub(crate) fn couple_footprint(&self) -> f64 {
        self.couple_spacing + self.card_width
    }

    /// Y coordinate of a generation row (card centers).
    pub(crate) fn row_y(&self, level: i32) -> f64 {
        self.min_margin + self.card_height / 2.0 + f64::from(level) * self.level_separation
    }
}
