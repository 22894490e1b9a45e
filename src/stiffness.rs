//! Element stiffness matrices for two-node axial members.
//!
//! A truss member only resists stretching along its own axis, so its local
//! stiffness has no transverse terms. See
//! <https://en.wikipedia.org/wiki/Direct_stiffness_method>.

use nalgebra::SMatrix;

use crate::geometry::MemberGeometry;

/// Four-by-four matrix over the (u_start, v_start, u_end, v_end) DOFs.
pub type Matrix4 = SMatrix<f64, 4, 4>;

/// Local-axis stiffness `(A·E/L)·[[1,0,-1,0],[0,0,0,0],[-1,0,1,0],[0,0,0,0]]`.
#[must_use]
pub fn local_stiffness(area: f64, elastic_modulus: f64, length: f64) -> Matrix4 {
    let ea_over_l = area * elastic_modulus / length;
    #[rustfmt::skip]
    let unit = Matrix4::new(
         1.0, 0.0, -1.0, 0.0,
         0.0, 0.0,  0.0, 0.0,
        -1.0, 0.0,  1.0, 0.0,
         0.0, 0.0,  0.0, 0.0,
    );
    unit * ea_over_l
}

/// Rotation from local (axial, transverse) to global (horizontal, vertical) components.
#[must_use]
pub fn transformation(geometry: &MemberGeometry) -> Matrix4 {
    let (c, s) = (geometry.cos, geometry.sin);
    #[rustfmt::skip]
    let matrix = Matrix4::new(
        c,  -s,  0.0, 0.0,
        s,   c,  0.0, 0.0,
        0.0, 0.0, c,  -s,
        0.0, 0.0, s,   c,
    );
    matrix
}

/// A member's matrices, ready to be scattered into the global system.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// Identifier of the member the element was built from.
    pub member: String,
    /// 1-based global DOFs of (u_start, v_start, u_end, v_end).
    pub dofs: [usize; 4],
    /// Length and orientation of the member.
    pub geometry: MemberGeometry,
    /// Local-to-global rotation `T`.
    pub transformation: Matrix4,
    /// Stiffness in global coordinates, `T·K_local·Tᵗ`.
    pub stiffness: Matrix4,
}

impl Element {
    /// Build the element matrices for one member.
    ///
    /// # Examples
    /// ```
    /// use planar_truss::{point, Element, MemberGeometry};
    ///
    /// let geometry = MemberGeometry::between(point(0.0, 0.0), point(2.0, 0.0)).unwrap();
    /// let element = Element::new("1", [1, 2, 3, 4], 0.5, 8.0, geometry);
    /// assert_eq!(element.stiffness[(0, 0)], 2.0);
    /// assert_eq!(element.stiffness[(0, 2)], -2.0);
    /// ```
    #[must_use]
    pub fn new(
        member: impl Into<String>,
        dofs: [usize; 4],
        area: f64,
        elastic_modulus: f64,
        geometry: MemberGeometry,
    ) -> Self {
        let local = local_stiffness(area, elastic_modulus, geometry.length);
        let transformation = transformation(&geometry);
        let stiffness = transformation * local * transformation.transpose();
        Self {
            member: member.into(),
            dofs,
            geometry,
            transformation,
            stiffness,
        }
    }
}
