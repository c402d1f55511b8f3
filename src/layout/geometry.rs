use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Point2D / Rect
// ---------------------------------------------------------------------------

/// A screen-space point (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Point2D { x, y }
    }
}

/// Axis-aligned rectangle given by its min and max corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Rect {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn from_origin_size(origin: Point2D, width: f64, height: f64) -> Self {
        Rect::new(origin.x, origin.y, origin.x + width, origin.y + height)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Whether `other` lies entirely inside `self` (edges included).
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.min_x >= self.min_x
            && other.min_y >= self.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }

    /// Area of the intersection; touching edges count as zero.
    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let w = self.max_x.min(other.max_x) - self.min_x.max(other.min_x);
        let h = self.max_y.min(other.max_y) - self.min_y.max(other.min_y);
        if w <= 0.0 || h <= 0.0 {
            0.0
        } else {
            w * h
        }
    }
}

// ---------------------------------------------------------------------------
// LabelPos – candidate placement templates
// ---------------------------------------------------------------------------

/// Where a label sits relative to its anchor.
///
/// Tier `n` stacks the box `n` label-heights above the anchor, offset
/// `space` to the right (or left) of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPos {
    Above,
    AboveRight1,
    AboveLeft1,
    AboveRight2,
    AboveLeft2,
    AboveRight3,
    AboveLeft3,
    AboveRight4,
    AboveLeft4,
}

impl LabelPos {
    /// The "above" family, most preferred first.
    pub const ABOVE: [LabelPos; 9] = [
        LabelPos::Above,
        LabelPos::AboveRight1,
        LabelPos::AboveLeft1,
        LabelPos::AboveRight2,
        LabelPos::AboveLeft2,
        LabelPos::AboveRight3,
        LabelPos::AboveLeft3,
        LabelPos::AboveRight4,
        LabelPos::AboveLeft4,
    ];

    /// Intrinsic preference penalty (lower is better).
    pub fn penalty(&self) -> f64 {
        match self {
            LabelPos::Above => 0.0,
            LabelPos::AboveRight1 => 0.3,
            LabelPos::AboveLeft1 => 0.4,
            LabelPos::AboveRight2 => 0.7,
            LabelPos::AboveLeft2 => 0.8,
            LabelPos::AboveRight3 => 1.1,
            LabelPos::AboveLeft3 => 1.2,
            LabelPos::AboveRight4 => 1.5,
            LabelPos::AboveLeft4 => 1.6,
        }
    }

    fn tier(&self) -> u32 {
        match self {
            LabelPos::Above | LabelPos::AboveRight1 | LabelPos::AboveLeft1 => 1,
            LabelPos::AboveRight2 | LabelPos::AboveLeft2 => 2,
            LabelPos::AboveRight3 | LabelPos::AboveLeft3 => 3,
            LabelPos::AboveRight4 | LabelPos::AboveLeft4 => 4,
        }
    }

    /// Top-left corner of a `width` x `height` label placed at this template.
    pub fn offset(&self, anchor: Point2D, width: f64, height: f64, space: f64) -> Point2D {
        let y = anchor.y - space - self.tier() as f64 * height;
        let x = match self {
            LabelPos::Above => anchor.x - width / 2.0,
            LabelPos::AboveRight1
            | LabelPos::AboveRight2
            | LabelPos::AboveRight3
            | LabelPos::AboveRight4 => anchor.x + space,
            LabelPos::AboveLeft1
            | LabelPos::AboveLeft2
            | LabelPos::AboveLeft3
            | LabelPos::AboveLeft4 => anchor.x - width - space,
        };
        Point2D::new(x, y)
    }

    fn is_right(&self) -> bool {
        matches!(
            self,
            LabelPos::AboveRight1
                | LabelPos::AboveRight2
                | LabelPos::AboveRight3
                | LabelPos::AboveRight4
        )
    }
}

// ---------------------------------------------------------------------------
// PointLabel – one candidate (or chosen) label box
// ---------------------------------------------------------------------------

/// A label box instantiated for an anchor at a given template.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLabel {
    pub anchor: Point2D,
    pub pos: LabelPos,
    pub width: f64,
    pub height: f64,
    pub space: f64,
    rect: Rect,
    penalty: f64,
}

impl PointLabel {
    pub fn new(anchor: Point2D, pos: LabelPos, width: f64, height: f64, space: f64) -> Self {
        debug_assert!(
            width > 0.0 && height > 0.0,
            "label dimensions must be positive"
        );
        let origin = pos.offset(anchor, width, height, space);
        PointLabel {
            anchor,
            pos,
            width,
            height,
            space,
            rect: Rect::from_origin_size(origin, width, height),
            penalty: pos.penalty(),
        }
    }

    /// Top-left corner of the box.
    pub fn min_loc(&self) -> Point2D {
        Point2D::new(self.rect.min_x, self.rect.min_y)
    }

    /// Bottom-right corner of the box.
    pub fn max_loc(&self) -> Point2D {
        Point2D::new(self.rect.max_x, self.rect.max_y)
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn penalty(&self) -> f64 {
        self.penalty
    }

    pub(crate) fn add_penalty(&mut self, delta: f64) {
        self.penalty += delta;
    }

    pub(crate) fn reset_penalty(&mut self) {
        self.penalty = self.pos.penalty();
    }

    /// Fraction of this box covered by `other`.
    pub fn overlap_fraction(&self, other: &PointLabel) -> f64 {
        self.rect.intersection_area(&other.rect) / self.area()
    }

    /// Box corner nearest the anchor, for drawing a leader line. `None` when
    /// the label sits centred directly above its anchor.
    pub fn link_point(&self) -> Option<Point2D> {
        match self.pos {
            LabelPos::Above => None,
            pos if pos.is_right() => Some(Point2D::new(self.rect.min_x, self.rect.max_y)),
            _ => Some(Point2D::new(self.rect.max_x, self.rect.max_y)),
        }
    }
}
