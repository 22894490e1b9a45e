//! Fundamental geometric types for planar truss modelling.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Position in the plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Distance along the global X axis.
    pub x: f64,
    /// Distance along the global Y axis.
    pub y: f64,
}

impl Point {
    /// Create a [`Point`] with explicit coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert the point into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

/// Planar force with horizontal and vertical components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Force {
    /// Force component acting along the global X axis.
    pub x: f64,
    /// Force component acting along the global Y axis.
    pub y: f64,
}

impl Force {
    /// Create a [`Force`] with explicit components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Translation of a joint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Displacement {
    /// Displacement component along the global X axis.
    pub x: f64,
    /// Displacement component along the global Y axis.
    pub y: f64,
}

impl Displacement {
    /// Create a [`Displacement`] with explicit components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Length and orientation of a member.
///
/// Direction cosines are measured from the end joint towards the start joint,
/// i.e. `cos = (x_start - x_end) / length`. The same convention is carried into
/// the transformation matrix, so the two must never be changed independently.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MemberGeometry {
    /// Distance between the two joints.
    pub length: f64,
    /// Direction cosine of the member axis.
    pub cos: f64,
    /// Direction sine of the member axis.
    pub sin: f64,
}

impl MemberGeometry {
    /// Resolve the geometry of a member spanning `start` to `end`.
    ///
    /// Returns `Err(length)` when the joints coincide or the coordinates are not
    /// finite, since no orientation can be derived in that case.
    ///
    /// # Examples
    /// ```
    /// use planar_truss::{point, MemberGeometry};
    ///
    /// let geometry = MemberGeometry::between(point(3.0, 4.0), point(0.0, 0.0)).unwrap();
    /// assert_eq!(geometry.length, 5.0);
    /// assert_eq!(geometry.cos, 0.6);
    /// assert_eq!(geometry.sin, 0.8);
    /// ```
    pub fn between(start: Point, end: Point) -> Result<Self, f64> {
        let delta = start.to_vector() - end.to_vector();
        let length = delta.norm();
        if !length.is_finite() || length <= 0.0 {
            return Err(length);
        }
        Ok(Self {
            length,
            cos: delta.x / length,
            sin: delta.y / length,
        })
    }
}

/// Convenience helper for creating [`Point`] instances.
///
/// # Examples
/// ```
/// use planar_truss::point;
///
/// let origin = point(0.0, 0.0);
/// assert_eq!(origin.x, 0.0);
/// ```
#[must_use]
pub const fn point(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Convenience helper for creating [`Force`] instances.
///
/// # Examples
/// ```
/// use planar_truss::force;
///
/// let load = force(1.0, -5.0);
/// assert_eq!(load.y, -5.0);
/// ```
#[must_use]
pub const fn force(x: f64, y: f64) -> Force {
    Force::new(x, y)
}
