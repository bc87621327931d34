//! Plane geometry in PDF user space.
//!
//! Coordinates follow the PDF convention: the origin is at the bottom-left of
//! the page and Y grows upwards. Matrices use the `[a b c d e f]` layout of the
//! PDF `cm` operator, with points as row vectors (`p' = p × M`).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A point in user space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A quadrilateral given by four vertices in annotation order.
///
/// The vertex order is kept as delivered by the annotation but only the
/// bounding rectangle is ever used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub points: [Point; 4],
}

impl Quad {
    pub const fn new(points: [Point; 4]) -> Self {
        Self { points }
    }

    /// Axis-aligned rectangle minimally enclosing the four vertices.
    pub fn rect(&self) -> Rect {
        let [first, rest @ ..] = &self.points;
        rest.iter().fold(Rect::from_point(*first), |r, p| r.include(*p))
    }
}

/// An axis-aligned rectangle, normalized so that `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    /// Create a rectangle from two opposite corners in any order.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Degenerate rectangle covering a single point.
    pub fn from_point(p: Point) -> Self {
        Self {
            x0: p.x,
            y0: p.y,
            x1: p.x,
            y1: p.y,
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.x0 + self.width() / 2.0,
            self.y0 + self.height() / 2.0,
        )
    }

    /// True when the rectangle has zero area.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Inclusive containment test.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y <= self.y1
    }

    /// Smallest rectangle containing `self` and `p`.
    pub fn include(self, p: Point) -> Self {
        Self {
            x0: self.x0.min(p.x),
            y0: self.y0.min(p.y),
            x1: self.x1.max(p.x),
            y1: self.y1.max(p.y),
        }
    }

    fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x0, self.y0),
            Point::new(self.x1, self.y0),
            Point::new(self.x0, self.y1),
            Point::new(self.x1, self.y1),
        ]
    }

    /// Bounding rectangle of the four transformed corners.
    pub fn transform(&self, m: &Matrix) -> Rect {
        let [first, rest @ ..] = self.corners();
        rest.iter()
            .fold(Rect::from_point(m.transform_point(first)), |r, p| {
                r.include(m.transform_point(*p))
            })
    }

    /// Enlarge or shrink the rectangle about its own center.
    ///
    /// The translation to the origin, the scale and the translation back are
    /// composed into one matrix, so a `(1, 1)` scale returns `self` unchanged.
    pub fn scale_about_center(&self, scale: ScaleFactors) -> Rect {
        let c = self.center();
        let m = Matrix::translate(-c.x, -c.y)
            .concat(&Matrix::scale(scale.width, scale.height))
            .concat(&Matrix::translate(c.x, c.y));
        self.transform(&m)
    }
}

/// Affine transform `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub const fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn concat(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn transform_point(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Transform a displacement (ignores translation).
    pub fn transform_vector(&self, dx: f64, dy: f64) -> (f64, f64) {
        (self.a * dx + self.c * dy, self.b * dx + self.d * dy)
    }
}

/// Independent width and height factors for [`Rect::scale_about_center`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleFactors {
    pub width: f64,
    pub height: f64,
}

impl ScaleFactors {
    /// Both factors must be finite and strictly positive.
    pub fn new(width: f64, height: f64) -> Result<Self> {
        for factor in [width, height] {
            if !factor.is_finite() || factor <= 0.0 {
                return Err(Error::InvalidScale(factor));
            }
        }
        Ok(Self { width, height })
    }

    pub fn is_identity(&self) -> bool {
        self.width == 1.0 && self.height == 1.0
    }

    /// Factors that undo `self`.
    pub fn inverse(&self) -> Self {
        Self {
            width: 1.0 / self.width,
            height: 1.0 / self.height,
        }
    }
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
        }
    }
}
