//! Member force recovery from solved joint displacements.

use nalgebra::{DVector, Vector4};
use serde::{Deserialize, Serialize};

use crate::solver::round_to;
use crate::stiffness::Element;

/// Whether a member is reported as pulled or pushed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    /// Reported as `"T"`.
    #[serde(rename = "T")]
    Tension,
    /// Reported as `"C"`.
    #[serde(rename = "C")]
    Compression,
}

/// Reported force in a member: an unsigned magnitude plus its condition.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberForce {
    /// Magnitude of the axial force, never negative.
    pub value: f64,
    /// Tension or compression.
    pub condition: Condition,
}

impl MemberForce {
    /// Classify a signed local axial force after rounding it to `decimals` places.
    ///
    /// A positive rounded value is compression; zero and negative values are tension.
    ///
    /// # Examples
    /// ```
    /// use planar_truss::{Condition, MemberForce};
    ///
    /// let force = MemberForce::from_axial(-12.34567, 3);
    /// assert_eq!(force.value, 12.346);
    /// assert_eq!(force.condition, Condition::Tension);
    /// assert_eq!(MemberForce::from_axial(0.0, 3).condition, Condition::Tension);
    /// ```
    #[must_use]
    pub fn from_axial(axial: f64, decimals: u32) -> Self {
        let rounded = round_to(axial, decimals);
        let condition = if rounded > 0.0 {
            Condition::Compression
        } else {
            Condition::Tension
        };
        Self {
            value: rounded.abs(),
            condition,
        }
    }
}

/// Signed axial force of `element` given the full displacement vector.
///
/// The element's global end forces `K·u_e` are rotated back onto the member
/// axis with `Tᵗ`; the first local component is the axial force.
#[must_use]
pub fn axial_force(element: &Element, displacements: &DVector<f64>) -> f64 {
    let local_displacements = Vector4::from_fn(|row, _| displacements[element.dofs[row] - 1]);
    let global_forces = element.stiffness * local_displacements;
    let local_forces = element.transformation.transpose() * global_forces;
    local_forces[0]
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::{point, MemberGeometry};

    #[test]
    fn stretching_gives_positive_axial_force() {
        // Start at the origin, end at x = 2; pulling the end away stretches the bar.
        let geometry =
            MemberGeometry::between(point(0.0, 0.0), point(2.0, 0.0)).expect("distinct joints");
        let element = Element::new("1", [3, 4, 1, 2], 0.01, 200.0e9, geometry);
        let displacements = DVector::from_vec(vec![1.0e-6, 0.0, 0.0, 0.0]);

        let axial = axial_force(&element, &displacements);
        assert_relative_eq!(axial, 1_000.0, max_relative = 1.0e-12);
        // Positive local axial force is reported as compression.
        let force = MemberForce::from_axial(axial, 3);
        assert_eq!(force.condition, Condition::Compression);
        assert_relative_eq!(force.value, 1_000.0);
    }

    #[test]
    fn transverse_motion_carries_no_force() {
        let geometry =
            MemberGeometry::between(point(0.0, 0.0), point(0.0, 3.0)).expect("distinct joints");
        let element = Element::new("1", [1, 2, 3, 4], 1.0, 1.0, geometry);
        let displacements = DVector::from_vec(vec![0.5, 0.0, -0.5, 0.0]);
        assert_relative_eq!(axial_force(&element, &displacements), 0.0, epsilon = 1.0e-15);
    }

    #[test]
    fn rounding_happens_before_classification() {
        let tiny = MemberForce::from_axial(4.0e-4, 3);
        assert_eq!(tiny.value, 0.0);
        assert_eq!(tiny.condition, Condition::Tension);

        let pushed = MemberForce::from_axial(2.5, 3);
        assert_eq!(pushed.condition, Condition::Compression);
        assert_eq!(pushed.value, 2.5);
    }

    #[test]
    fn condition_uses_single_letter_codes() {
        let force = MemberForce {
            value: 1.5,
            condition: Condition::Compression,
        };
        assert_eq!(
            serde_json::to_string(&force).unwrap(),
            r#"{"value":1.5,"condition":"C"}"#
        );
    }
}
