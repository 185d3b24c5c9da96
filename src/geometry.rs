use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Grow by `pad` on every side.
    pub fn padded(self, pad: f32) -> Self {
        Size::new(self.width + pad * 2.0, self.height + pad * 2.0)
    }
}

/// Axis-aligned rectangle stored as origin plus extent.
///
/// Storing the extent rather than the far corner keeps
/// `Rect::from_position_size(p, s).size() == s` exact in floating point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn from_position_size(position: Point, size: Size) -> Self {
        Self {
            x: position.x,
            y: position.y,
            width: size.width.max(0.0),
            height: size.height.max(0.0),
        }
    }

    /// Build from edges. Swapped edges are normalized so `right >= left` and
    /// `bottom >= top` always hold.
    pub fn from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        let (x0, x1) = if right < left { (right, left) } else { (left, right) };
        let (y0, y1) = if bottom < top { (bottom, top) } else { (top, bottom) };
        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self::from_position_size(Point::default(), size)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn translate(&self, offset: Point) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
            ..*self
        }
    }

    /// True when the interiors intersect with positive area. Touching edges
    /// and zero-area rectangles never overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub fn inflate(&self, pad: f32) -> Self {
        Self::from_edges(
            self.left() - pad,
            self.top() - pad,
            self.right() + pad,
            self.bottom() + pad,
        )
    }

    pub fn union(&self, other: &Rect) -> Self {
        Self::from_edges(
            self.left().min(other.left()),
            self.top().min(other.top()),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Intersection with `other`; an empty rectangle at `self`'s origin when
    /// the two are disjoint.
    pub fn intersect(&self, other: &Rect) -> Self {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return Self::from_position_size(self.position(), Size::default());
        }
        Self::from_edges(left, top, right, bottom)
    }
}
